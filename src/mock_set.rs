//! Mock set resolution.
//!
//! Starting from annotated seed types, walk the type references appearing
//! in member signatures and pull every declared protocol (and open class)
//! they mention into the set, transitively, until a fixed point. Names are
//! alias-resolved in the referencing type's own scope before lookup, so a
//! parameter typed through an alias still widens the set.

use crate::model::{annotations::MOCKABLE_KEY, TypeInfo, TypeModel};
use crate::resolve::{scope_chain, AliasResolver};
use crate::syntax::{AccessLevel, TypeKind, TypeName};
use log::{debug, warn};
use std::collections::{HashSet, VecDeque};

/// Types to generate mocks for, in deterministic order: annotated seeds in
/// declaration order, then discovered types in discovery order.
pub fn resolve_mock_set(model: &TypeModel) -> Vec<TypeInfo> {
    let resolver = AliasResolver::new(&model.aliases);
    let mut queue: VecDeque<String> = VecDeque::new();
    let mut selected: HashSet<String> = HashSet::new();
    let mut order: Vec<String> = Vec::new();

    for info in model.iter() {
        if !is_seed(info) {
            continue;
        }
        if !info.is_mockable_kind() {
            warn!(
                "ignoring mock annotation on {} ({:?} is not mockable)",
                info.name, info.kind
            );
            continue;
        }
        if selected.insert(info.name.clone()) {
            order.push(info.name.clone());
            queue.push_back(info.name.clone());
        }
    }

    while let Some(name) = queue.pop_front() {
        let Some(info) = model.get(&name) else {
            continue;
        };
        for referenced in referenced_type_names(info, &resolver) {
            let Some(found) = lookup(model, &referenced, info.member_scope()) else {
                continue;
            };
            if !auto_widens(found) {
                continue;
            }
            if selected.insert(found.name.clone()) {
                debug!("mock set grows: {} referenced by {}", found.name, name);
                order.push(found.name.clone());
                queue.push_back(found.name.clone());
            }
        }
    }

    order
        .iter()
        .filter_map(|name| model.get(name))
        .cloned()
        .collect()
}

fn is_seed(info: &TypeInfo) -> bool {
    info.annotations.is_mockable() || info.inherited.iter().any(|n| n == MOCKABLE_KEY)
}

/// Only protocols and open classes join the set by reference; classes
/// below open stay out unless annotated directly.
fn auto_widens(info: &TypeInfo) -> bool {
    match info.kind {
        TypeKind::Protocol => true,
        TypeKind::Class => info.access == AccessLevel::Open,
        _ => false,
    }
}

/// Every name mentioned in the type's mockable member signatures,
/// alias-resolved in the type's scope. Generic requirement right-hand
/// sides are constraints, not references, and do not contribute.
fn referenced_type_names(info: &TypeInfo, resolver: &AliasResolver) -> Vec<String> {
    let scope = info.member_scope();
    let mut raw_references: Vec<String> = Vec::new();

    for method in info.methods.iter().filter(|m| !m.is_static) {
        for parameter in &method.parameters {
            raw_references.push(parameter.ty.name.clone());
        }
        raw_references.push(method.return_type.name.clone());
    }
    for property in info.properties.iter().filter(|p| !p.is_static) {
        raw_references.push(property.ty.name.clone());
    }
    for subscript in &info.subscripts {
        for parameter in &subscript.parameters {
            raw_references.push(parameter.ty.name.clone());
        }
        raw_references.push(subscript.ty.name.clone());
    }
    for associated in &info.associated_types {
        raw_references.extend(associated.inherited.iter().cloned());
        if let Some(default) = &associated.default_type {
            raw_references.push(default.name.clone());
        }
    }

    let mut names = Vec::new();
    for raw in raw_references {
        let resolved = resolver.resolve(&raw, scope);
        names.extend(TypeName::parse(&resolved).referenced_names());
    }
    names
}

/// Find a declared type for a possibly-unqualified name used inside
/// `scope`, innermost enclosing scope first.
fn lookup<'a>(model: &'a TypeModel, name: &str, scope: &str) -> Option<&'a TypeInfo> {
    for enclosing in scope_chain(scope) {
        let candidate = crate::model::qualify(&enclosing, name);
        if let Some(info) = model.get(&candidate) {
            return Some(info);
        }
    }
    None
}
