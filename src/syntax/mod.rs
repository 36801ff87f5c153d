//! Declaration-level syntax model loaded from frontend dumps.
//!
//! A frontend (typically a thin wrapper around the host language's own
//! parser) serializes every declaration relevant to mocking into JSON.
//! This module defines that contract. Type references stay raw strings
//! here; the model builder parses them into [`TypeName`]s.

pub mod type_name;

pub use type_name::TypeName;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One parsed source file worth of declarations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    /// Aliases declared at file scope, outside any type.
    #[serde(default)]
    pub aliases: Vec<AliasDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Protocol,
    Class,
    Struct,
    Enum,
    Actor,
    Extension,
}

impl TypeKind {
    pub fn is_extension(self) -> bool {
        matches!(self, TypeKind::Extension)
    }
}

/// Declaration access, ordered from least to most visible.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Private,
    Fileprivate,
    #[default]
    Internal,
    Package,
    Public,
    Open,
}

impl AccessLevel {
    /// Keyword spelling, or None for the implicit internal level.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            AccessLevel::Private => Some("private"),
            AccessLevel::Fileprivate => Some("fileprivate"),
            AccessLevel::Internal => None,
            AccessLevel::Package => Some("package"),
            AccessLevel::Public => Some("public"),
            AccessLevel::Open => Some("open"),
        }
    }
}

/// A type declaration or an extension of one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub access: AccessLevel,
    /// Inherited types as spelled: protocol conformances and, for classes,
    /// the superclass first.
    #[serde(default)]
    pub inherited: Vec<String>,
    #[serde(default)]
    pub generic_parameters: Vec<GenericParameter>,
    #[serde(default)]
    pub generic_requirements: Vec<GenericRequirement>,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
    #[serde(default)]
    pub nested: Vec<TypeDecl>,
    /// Leading comment block, where annotation pragmas live.
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberDecl {
    Method(MethodDecl),
    Property(PropertyDecl),
    Subscript(SubscriptDecl),
    TypeAlias(AliasDecl),
    AssociatedType(AssociatedTypeDecl),
}

impl MemberDecl {
    pub fn comment(&self) -> Option<&str> {
        match self {
            MemberDecl::Method(m) => m.comment.as_deref(),
            MemberDecl::Property(p) => p.comment.as_deref(),
            MemberDecl::Subscript(s) => s.comment.as_deref(),
            MemberDecl::TypeAlias(a) => a.comment.as_deref(),
            MemberDecl::AssociatedType(a) => a.comment.as_deref(),
        }
    }
}

/// A function or initializer declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub is_throwing: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_initializer: bool,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_failable: bool,
    #[serde(default)]
    pub access: AccessLevel,
    #[serde(default)]
    pub generic_parameters: Vec<GenericParameter>,
    #[serde(default)]
    pub generic_requirements: Vec<GenericRequirement>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterDecl {
    /// External label; None for `_`.
    #[serde(default)]
    pub label: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub is_inout: bool,
    #[serde(default)]
    pub is_variadic: bool,
    #[serde(default)]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub has_setter: bool,
    /// Effectful read accessor, `var x: T { get async }`.
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub is_throwing: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub access: AccessLevel,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptDecl {
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub has_setter: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub access: AccessLevel,
    #[serde(default)]
    pub generic_parameters: Vec<GenericParameter>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// `typealias Name<Params> = Target`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AliasDecl {
    pub name: String,
    pub target: String,
    #[serde(default)]
    pub generic_parameters: Vec<String>,
    #[serde(default)]
    pub access: AccessLevel,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssociatedTypeDecl {
    pub name: String,
    #[serde(default)]
    pub inherited: Vec<String>,
    #[serde(default)]
    pub default_type: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericParameter {
    pub name: String,
    /// Inline conformance bound, the part after the colon.
    #[serde(default)]
    pub bound: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementRelation {
    Conformance,
    SameType,
    Layout,
}

/// One clause of a `where` list, `Left relation Right`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericRequirement {
    pub left: String,
    pub relation: RequirementRelation,
    pub right: String,
}

impl GenericRequirement {
    pub fn conformance(left: &str, right: &str) -> Self {
        GenericRequirement {
            left: left.to_string(),
            relation: RequirementRelation::Conformance,
            right: right.to_string(),
        }
    }

    pub fn same_type(left: &str, right: &str) -> Self {
        GenericRequirement {
            left: left.to_string(),
            relation: RequirementRelation::SameType,
            right: right.to_string(),
        }
    }

    /// Source spelling of the clause, e.g. `T: Equatable` or `T == Int`.
    pub fn display(&self) -> String {
        match self.relation {
            RequirementRelation::Conformance | RequirementRelation::Layout => {
                format!("{}: {}", self.left, self.right)
            }
            RequirementRelation::SameType => format!("{} == {}", self.left, self.right),
        }
    }
}
