//! Per-type assembly of what a mock declares.
//!
//! [`MockedType`] filters the flattened member lists down to what the mock
//! implements, separates initializers from ordinary methods, and derives
//! the generic surface a protocol's associated types impose on the mock
//! class. Rendering of the assembled pieces lives in [`super::template`].

use crate::model::{qualify, Method, TypeInfo, TypeModel};
use crate::resolve::scope_chain;
use crate::syntax::{AccessLevel, RequirementRelation, TypeKind};
use crate::synth::identifier::{method_identifier, unbackticked};
use crate::synth::method::MockedMethod;
use crate::synth::property::MockedProperty;
use crate::synth::subscripts::MockedSubscript;
use crate::synth::{call_attributes, generic_clause, implementation_param, member_access};
use std::collections::{BTreeMap, HashMap, HashSet};

pub struct MockedType<'a> {
    pub info: &'a TypeInfo,
    /// Dots stripped from nested names so the mock is a single identifier.
    pub mock_type_name: String,
}

impl<'a> MockedType<'a> {
    pub fn new(info: &'a TypeInfo) -> Self {
        let mock_type_name = format!("{}Mock", info.name.replace('.', ""));
        MockedType {
            info,
            mock_type_name,
        }
    }

    pub fn is_class(&self) -> bool {
        self.info.kind == TypeKind::Class
    }

    pub fn mock_access(&self) -> &'static str {
        member_access(self.info.access)
    }

    fn skipped(&self) -> HashSet<&str> {
        self.info
            .annotations
            .skipped_members()
            .iter()
            .map(String::as_str)
            .collect()
    }

    /// Instance methods the mock records. Initializers and `deinit` never
    /// go through the recorder; private members cannot be seen from the
    /// generated file.
    pub fn methods(&self) -> Vec<MockedMethod<'_>> {
        let skipped = self.skipped();
        self.info
            .methods
            .iter()
            .filter(|m| {
                !m.is_static
                    && !m.is_initializer
                    && m.name != "deinit"
                    && m.access > AccessLevel::Fileprivate
                    && !skipped.contains(unbackticked(&m.name).as_str())
            })
            .map(|m| MockedMethod::new(m, &self.mock_type_name))
            .collect()
    }

    pub fn properties(&self) -> Vec<MockedProperty<'_>> {
        let skipped = self.skipped();
        self.info
            .properties
            .iter()
            .filter(|p| !p.is_static && !skipped.contains(unbackticked(&p.name).as_str()))
            .map(MockedProperty::new)
            .collect()
    }

    /// Subscripts collapsed by getter signature, a writable declaration
    /// winning over a read-only one at the first occurrence's position.
    pub fn subscripts(&self) -> Vec<MockedSubscript<'_>> {
        let mut indexes: HashMap<String, usize> = HashMap::new();
        let mut uniqued: Vec<MockedSubscript<'_>> = Vec::new();
        for subscript in self.info.subscripts.iter().filter(|s| !s.is_static) {
            let mocked = MockedSubscript::new(subscript, &self.mock_type_name);
            match indexes.get(&mocked.getter_signature()) {
                Some(&index) => {
                    if uniqued[index].is_read_only() && !mocked.is_read_only() {
                        uniqued[index] = mocked;
                    }
                }
                None => {
                    indexes.insert(mocked.getter_signature(), uniqued.len());
                    uniqued.push(mocked);
                }
            }
        }
        uniqued
    }

    /// Initializers of the mocked class itself (superclass ones included
    /// after flattening), each of which becomes a forwarding initializer.
    pub fn forwarding_initializers(&self) -> Vec<&Method> {
        if !self.is_class() {
            return Vec::new();
        }
        self.info
            .methods
            .iter()
            .filter(|m| m.is_initializer)
            .collect()
    }

    /// Initializer requirements the mock must declare but never serve.
    ///
    /// Protocol targets carry theirs in the flattened member list; class
    /// targets collect them from conformed protocols. Requirements already
    /// covered by a forwarding initializer are dropped.
    pub fn initializer_traps(&self, model: &TypeModel) -> Vec<Method> {
        let mut seen: HashSet<String> = self
            .forwarding_initializers()
            .iter()
            .map(|m| method_identifier(m))
            .collect();
        let mut traps = Vec::new();
        if self.is_class() {
            for inherited in &self.info.inherited {
                let Some(found) = lookup(model, inherited, self.info.member_scope()) else {
                    continue;
                };
                if found.kind != TypeKind::Protocol {
                    continue;
                }
                for method in found.methods.iter().filter(|m| m.is_initializer) {
                    if seen.insert(method_identifier(method)) {
                        traps.push(method.clone());
                    }
                }
            }
        } else {
            for method in self.info.methods.iter().filter(|m| m.is_initializer) {
                if seen.insert(method_identifier(method)) {
                    traps.push(method.clone());
                }
            }
        }
        traps
    }

    fn conformance_constraints(&self) -> HashMap<&str, &str> {
        self.info
            .generic_requirements
            .iter()
            .filter(|r| r.relation == RequirementRelation::Conformance)
            .map(|r| (r.left.as_str(), r.right.as_str()))
            .collect()
    }

    /// Same-type constraints collapse associated types: the later-declared
    /// name is witnessed by a typealias onto its partner instead of
    /// becoming a generic parameter. A dotted side stays as written and
    /// its plain partner aliases it.
    pub fn refined_associated_types(&self) -> BTreeMap<String, String> {
        let mut refined = BTreeMap::new();
        if self.info.kind != TypeKind::Protocol {
            return refined;
        }
        let order: HashMap<&str, usize> = self
            .info
            .associated_types
            .iter()
            .enumerate()
            .map(|(index, associated)| (associated.name.as_str(), index))
            .collect();
        for requirement in &self.info.generic_requirements {
            if requirement.relation != RequirementRelation::SameType {
                continue;
            }
            let left = requirement.left.as_str();
            let right = requirement.right.as_str();
            let left_plain = !left.contains('.') && order.contains_key(left);
            let right_plain = !right.contains('.') && order.contains_key(right);
            match (left_plain, right_plain) {
                (true, true) => {
                    if order[left] >= order[right] {
                        refined.insert(left.to_string(), right.to_string());
                    } else {
                        refined.insert(right.to_string(), left.to_string());
                    }
                }
                (true, false) => {
                    refined.insert(left.to_string(), right.to_string());
                }
                (false, true) => {
                    refined.insert(right.to_string(), left.to_string());
                }
                (false, false) => {}
            }
        }
        refined
    }

    /// `<A: Bound, B>` for protocol targets, from unrefined associated
    /// types; the class target's own clause otherwise.
    pub fn generic_parameter_clause(&self) -> String {
        if self.is_class() {
            return generic_clause(&self.info.generic_parameters);
        }
        let refined = self.refined_associated_types();
        let constraints = self.conformance_constraints();
        let parameters: Vec<String> = self
            .info
            .associated_types
            .iter()
            .filter(|a| !refined.contains_key(&a.name))
            .map(|a| {
                let mut bounds: Vec<&str> = a.inherited.iter().map(String::as_str).collect();
                if let Some(extra) = constraints.get(a.name.as_str()) {
                    if !bounds.contains(extra) {
                        bounds.push(extra);
                    }
                }
                if bounds.is_empty() {
                    a.name.clone()
                } else {
                    format!("{}: {}", a.name, bounds.join(" & "))
                }
            })
            .collect();
        if parameters.is_empty() {
            String::new()
        } else {
            format!("<{}>", parameters.join(", "))
        }
    }

    /// What the mock subclasses or conforms to, spelled with generic
    /// arguments when the class target is generic.
    pub fn conformed_spelling(&self) -> String {
        if self.is_class() && !self.info.generic_parameters.is_empty() {
            let arguments: Vec<&str> = self
                .info
                .generic_parameters
                .iter()
                .map(|p| p.name.as_str())
                .collect();
            format!("{}<{}>", self.info.name, arguments.join(", "))
        } else {
            self.info.name.clone()
        }
    }

    /// Typealias lines witnessing each associated type, sorted by name.
    pub fn typealias_reexports(&self) -> Vec<String> {
        if self.info.kind != TypeKind::Protocol {
            return Vec::new();
        }
        let refined = self.refined_associated_types();
        let mut names: Vec<&str> = self
            .info
            .associated_types
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        names.sort_unstable();
        names
            .iter()
            .map(|name| {
                let target = refined.get(*name).map(String::as_str).unwrap_or(name);
                format!("    public typealias {} = {}", name, target)
            })
            .collect()
    }
}

fn effects_suffix(method: &Method) -> String {
    format!(
        "{}{}",
        if method.is_async { " async" } else { "" },
        if method.is_throwing { " throws" } else { "" }
    )
}

fn initializer_head(method: &Method) -> String {
    format!(
        "init{}{}",
        if method.is_failable { "?" } else { "" },
        generic_clause(&method.generic_parameters)
    )
}

/// `@available(*, unavailable)` initializer satisfying a requirement the
/// mock refuses to serve.
pub fn initializer_trap(method: &Method) -> String {
    let parameters: Vec<String> = method
        .parameters
        .iter()
        .map(|p| implementation_param(p, None))
        .collect();
    format!(
        "@available(*, unavailable)\nrequired {}({}){} {{\n    fatalError()\n}}",
        initializer_head(method),
        parameters.join(", "),
        effects_suffix(method)
    )
}

/// Initializer that forwards to `super` with auto-forwarding switched on
/// for the duration of the call.
pub fn forwarding_initializer(method: &Method, mock_type_name: &str) -> String {
    let parameters: Vec<String> = method
        .parameters
        .iter()
        .map(|p| implementation_param(p, None))
        .collect();
    let separator = if parameters.is_empty() { "" } else { ", " };
    let forwarded = MockedMethod::new(method, mock_type_name).forwarded_labeled_parameters();
    format!(
        "public {}({}{}file: StaticString = #filePath, line: UInt = #line){} {{\n    self.file = file\n    self.line = line\n    self.autoForwardingEnabled = true\n    {}super.init({})\n    self.autoForwardingEnabled = false\n}}",
        initializer_head(method),
        parameters.join(", "),
        separator,
        effects_suffix(method),
        call_attributes(method.is_throwing, method.is_async),
        forwarded
    )
}

fn lookup<'m>(model: &'m TypeModel, name: &str, scope: &str) -> Option<&'m TypeInfo> {
    for enclosing in scope_chain(scope) {
        if let Some(info) = model.get(&qualify(&enclosing, name)) {
            return Some(info);
        }
    }
    None
}
