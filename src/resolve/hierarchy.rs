//! Inheritance flattening over the raw model.
//!
//! Duplicate declarations of one type merge into the first-seen entry.
//! Extensions contribute their annotations to the base type; an annotated
//! extension of a type we never saw declared synthesizes a members-empty
//! class entry so third-party types can be mocked by extension. Protocols
//! then absorb the members of everything they refine, and classes absorb
//! superclass members they do not override.

use crate::model::{builder::RawModel, TypeInfo, TypeModel};
use crate::syntax::TypeKind;
use crate::synth::identifier::{
    method_identifier, property_getter_identifier, subscript_getter_identifier,
};
use log::debug;
use std::collections::{HashMap, HashSet};

pub fn resolve_hierarchy(raw: RawModel) -> TypeModel {
    let mut model = TypeModel::default();
    let mut extension_order: Vec<String> = Vec::new();
    let mut extensions: HashMap<String, Vec<TypeInfo>> = HashMap::new();

    for info in raw.types {
        if info.is_extension {
            if !extensions.contains_key(&info.name) {
                extension_order.push(info.name.clone());
            }
            extensions.entry(info.name.clone()).or_default().push(info);
        } else if let Some(existing) = model.get_mut(&info.name) {
            merge_duplicate(existing, info);
        } else {
            model.insert(info);
        }
    }

    for name in extension_order {
        let attached = extensions.remove(&name).unwrap_or_default();
        if let Some(base) = model.get_mut(&name) {
            for ext in &attached {
                base.annotations.merge_from(&ext.annotations);
            }
        } else if let Some(synthetic) = synthetic_type(&attached) {
            debug!("synthesized mockable entry for extended type {}", name);
            model.insert(synthetic);
        }
    }

    flatten_protocols(&mut model);
    flatten_classes(&mut model);

    model.aliases = raw.aliases;
    model
}

/// Re-declarations append members; the first declaration keeps its
/// metadata.
fn merge_duplicate(base: &mut TypeInfo, other: TypeInfo) {
    base.methods.extend(other.methods);
    base.properties.extend(other.properties);
    base.subscripts.extend(other.subscripts);
    base.associated_types.extend(other.associated_types);
    base.generic_requirements.extend(other.generic_requirements);
}

/// An extension of an undeclared type stands in for it when annotated for
/// mocking: a class-kind entry with no members of its own.
fn synthetic_type(extensions: &[TypeInfo]) -> Option<TypeInfo> {
    if !extensions.iter().any(|e| e.annotations.is_mockable()) {
        return None;
    }
    let sample = extensions.first()?;
    let mut info = TypeInfo::new(sample.name.clone(), TypeKind::Class);
    info.access = sample.access;
    info.inherited = sample.inherited.clone();
    info.generic_parameters = sample.generic_parameters.clone();
    info.associated_types = sample.associated_types.clone();
    info.generic_requirements = sample.generic_requirements.clone();
    for ext in extensions {
        info.annotations.merge_from(&ext.annotations);
    }
    Some(info)
}

fn flatten_protocols(model: &mut TypeModel) {
    let mut cache: HashMap<String, TypeInfo> = HashMap::new();
    let names: Vec<String> = model.names().to_vec();
    for name in &names {
        let mut visiting = HashSet::new();
        if let Some(flattened) = flatten_protocol(model, name, &mut cache, &mut visiting) {
            if let Some(slot) = model.get_mut(name) {
                *slot = flattened;
            }
        }
    }
}

fn flatten_protocol(
    model: &TypeModel,
    name: &str,
    cache: &mut HashMap<String, TypeInfo>,
    visiting: &mut HashSet<String>,
) -> Option<TypeInfo> {
    if let Some(cached) = cache.get(name) {
        return Some(cached.clone());
    }
    let info = model.get(name)?;
    if info.kind != TypeKind::Protocol {
        return Some(info.clone());
    }
    if visiting.contains(name) {
        return Some(info.clone());
    }
    visiting.insert(name.to_string());

    let mut flattened = info.clone();
    let mut seen_associated: HashSet<String> = flattened
        .associated_types
        .iter()
        .map(|a| a.name.clone())
        .collect();

    for inherited_name in &info.inherited {
        let Some(inherited) = flatten_protocol(model, inherited_name, cache, visiting) else {
            continue;
        };
        if inherited.kind != TypeKind::Protocol {
            continue;
        }
        flattened.methods.extend(inherited.methods.iter().cloned());
        flattened.properties.extend(inherited.properties.iter().cloned());
        flattened.subscripts.extend(inherited.subscripts.iter().cloned());
        for associated in &inherited.associated_types {
            if seen_associated.insert(associated.name.clone()) {
                flattened.associated_types.push(associated.clone());
            }
        }
    }

    visiting.remove(name);
    cache.insert(name.to_string(), flattened.clone());
    Some(flattened)
}

fn flatten_classes(model: &mut TypeModel) {
    let mut cache: HashMap<String, TypeInfo> = HashMap::new();
    let names: Vec<String> = model.names().to_vec();
    for name in &names {
        let mut visiting = HashSet::new();
        if let Some(flattened) = flatten_class(model, name, &mut cache, &mut visiting) {
            if let Some(slot) = model.get_mut(name) {
                *slot = flattened;
            }
        }
    }
}

fn flatten_class(
    model: &TypeModel,
    name: &str,
    cache: &mut HashMap<String, TypeInfo>,
    visiting: &mut HashSet<String>,
) -> Option<TypeInfo> {
    if let Some(cached) = cache.get(name) {
        return Some(cached.clone());
    }
    let info = model.get(name)?;
    if info.kind != TypeKind::Class {
        return Some(info.clone());
    }
    if visiting.contains(name) {
        return Some(info.clone());
    }
    visiting.insert(name.to_string());

    let superclass_name = info
        .inherited
        .iter()
        .find(|n| model.get(n).map(|t| t.kind) == Some(TypeKind::Class));

    let flattened = match superclass_name {
        Some(superclass_name) => {
            match flatten_class(model, superclass_name, cache, visiting) {
                Some(superclass) => merge_superclass(info.clone(), &superclass),
                None => info.clone(),
            }
        }
        None => info.clone(),
    };

    visiting.remove(name);
    cache.insert(name.to_string(), flattened.clone());
    Some(flattened)
}

/// Inherit every superclass member the subclass does not itself declare,
/// keyed by stub identifier so overloads stay distinct.
fn merge_superclass(mut info: TypeInfo, superclass: &TypeInfo) -> TypeInfo {
    let method_ids: HashSet<String> = info.methods.iter().map(method_identifier).collect();
    for method in &superclass.methods {
        if !method_ids.contains(&method_identifier(method)) {
            info.methods.push(method.clone());
        }
    }

    let mut property_ids: HashSet<String> =
        info.properties.iter().map(property_getter_identifier).collect();
    for property in &superclass.properties {
        if property_ids.insert(property_getter_identifier(property)) {
            info.properties.push(property.clone());
        }
    }

    let subscript_ids: HashSet<String> =
        info.subscripts.iter().map(subscript_getter_identifier).collect();
    for subscript in &superclass.subscripts {
        if !subscript_ids.contains(&subscript_getter_identifier(subscript)) {
            info.subscripts.push(subscript.clone());
        }
    }
    info
}
