//! Semantic type model, the pipeline's working representation.
//!
//! The builder flattens raw declarations into [`TypeInfo`] values keyed by
//! qualified name. Nested declarations are lifted to the top level with
//! dot-joined names; type references are parsed [`TypeName`]s with IUO
//! already normalized away.

pub mod annotations;
pub mod builder;

pub use annotations::Annotations;
pub use builder::build_model;

use crate::syntax::{
    AccessLevel, GenericParameter, GenericRequirement, TypeKind, TypeName,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A flattened type declaration (or extension of one).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Qualified name, dot-joined through enclosing types.
    pub name: String,
    /// Last component of `name`.
    pub local_name: String,
    pub kind: TypeKind,
    pub access: AccessLevel,
    pub inherited: Vec<String>,
    pub generic_parameters: Vec<GenericParameter>,
    pub generic_requirements: Vec<GenericRequirement>,
    pub methods: Vec<Method>,
    pub properties: Vec<Property>,
    pub subscripts: Vec<Subscript>,
    pub associated_types: Vec<AssociatedType>,
    pub annotations: Annotations,
    pub is_extension: bool,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        let name = name.into();
        let local_name = name.rsplit('.').next().unwrap_or(&name).to_string();
        TypeInfo {
            name,
            local_name,
            kind,
            access: AccessLevel::default(),
            inherited: Vec::new(),
            generic_parameters: Vec::new(),
            generic_requirements: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            subscripts: Vec::new(),
            associated_types: Vec::new(),
            annotations: Annotations::default(),
            is_extension: false,
        }
    }

    /// Scope key for resolving names mentioned inside this type's members.
    pub fn member_scope(&self) -> &str {
        &self.name
    }

    pub fn is_mockable_kind(&self) -> bool {
        matches!(self.kind, TypeKind::Protocol | TypeKind::Class)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeName,
    pub is_async: bool,
    pub is_throwing: bool,
    pub is_static: bool,
    pub is_initializer: bool,
    pub is_required: bool,
    pub is_failable: bool,
    pub access: AccessLevel,
    pub generic_parameters: Vec<GenericParameter>,
    pub generic_requirements: Vec<GenericRequirement>,
    /// Declaration attributes as written, `@discardableResult` and friends.
    pub attributes: Vec<String>,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Method {
            name: name.into(),
            parameters: Vec::new(),
            return_type: TypeName::void(),
            is_async: false,
            is_throwing: false,
            is_static: false,
            is_initializer: false,
            is_required: false,
            is_failable: false,
            access: AccessLevel::default(),
            generic_parameters: Vec::new(),
            generic_requirements: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// External label; None renders as `_`.
    pub label: Option<String>,
    pub name: String,
    pub ty: TypeName,
    pub is_inout: bool,
    pub is_variadic: bool,
}

impl Parameter {
    pub fn new(label: Option<&str>, name: &str, ty: &str) -> Self {
        Parameter {
            label: label.map(str::to_string),
            name: name.to_string(),
            ty: TypeName::parse(ty),
            is_inout: false,
            is_variadic: false,
        }
    }

    /// Label as written at the call site, falling back to the internal name.
    pub fn call_label(&self) -> Option<&str> {
        self.label.as_deref().or(Some(self.name.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub ty: TypeName,
    pub is_read_only: bool,
    pub is_async: bool,
    pub is_throwing: bool,
    pub is_static: bool,
    pub access: AccessLevel,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscript {
    pub parameters: Vec<Parameter>,
    pub ty: TypeName,
    pub is_read_only: bool,
    pub is_static: bool,
    pub access: AccessLevel,
    pub generic_parameters: Vec<GenericParameter>,
    pub generic_requirements: Vec<GenericRequirement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociatedType {
    pub name: String,
    pub inherited: Vec<String>,
    pub default_type: Option<TypeName>,
}

/// `typealias` definition as collected into the scope table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasDef {
    pub name: String,
    pub generic_parameters: Vec<String>,
    pub target: String,
}

/// Alias definitions keyed by scope, then by alias name.
///
/// Scope is the dot-joined path of enclosing type names; `""` is file scope.
/// Later definitions of the same name in the same scope win, matching how
/// re-declarations shadow during collection.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    scopes: HashMap<String, HashMap<String, AliasDef>>,
}

impl AliasTable {
    pub fn insert(&mut self, scope: &str, def: AliasDef) {
        self.scopes
            .entry(scope.to_string())
            .or_default()
            .insert(def.name.clone(), def);
    }

    pub fn lookup(&self, scope: &str, name: &str) -> Option<&AliasDef> {
        self.scopes.get(scope)?.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.values().all(HashMap::is_empty)
    }

    pub fn len(&self) -> usize {
        self.scopes.values().map(HashMap::len).sum()
    }
}

/// The built model: merged types in first-seen order plus the alias table.
#[derive(Debug, Clone, Default)]
pub struct TypeModel {
    order: Vec<String>,
    types: HashMap<String, TypeInfo>,
    pub aliases: AliasTable,
}

impl TypeModel {
    pub fn get(&self, qualified_name: &str) -> Option<&TypeInfo> {
        self.types.get(qualified_name)
    }

    pub fn get_mut(&mut self, qualified_name: &str) -> Option<&mut TypeInfo> {
        self.types.get_mut(qualified_name)
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.types.contains_key(qualified_name)
    }

    /// Insert preserving first-seen order; replaces any previous entry.
    pub fn insert(&mut self, info: TypeInfo) {
        if !self.types.contains_key(&info.name) {
            self.order.push(info.name.clone());
        }
        self.types.insert(info.name.clone(), info);
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> {
        self.order.iter().filter_map(|name| self.types.get(name))
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Dot-join an enclosing scope and a local name.
pub fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}
