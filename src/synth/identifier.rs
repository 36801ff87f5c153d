//! Stub identifier derivation.
//!
//! Every mockable member gets a stable identifier that is a valid source
//! identifier in the generated code and unique per overload: name, effect
//! tag, labeled parameter list and return type all participate, plus a
//! suffix for `where` clauses. Type spellings pass through a fixed escape
//! table; the same spelling always produces the same tag.

use crate::model::{Method, Parameter, Property, Subscript};
use crate::syntax::{GenericRequirement, RequirementRelation, TypeName};

/// Escape one type spelling into an identifier fragment.
///
/// Replacement order is significant: arrows collapse before `<`/`>` so a
/// function type keeps its `_ret_` marker, and spaces vanish before the
/// bracket rules run.
pub fn escape_type_name(raw: &str) -> String {
    raw.replace("->", "_ret_")
        .replace('@', "_at_")
        .replace(' ', "")
        .replace('<', "_lab_")
        .replace('>', "_rab_")
        .replace('[', "_lsb_")
        .replace(']', "_rsb_")
        .replace('(', "_lp_")
        .replace(')', "_rp_")
        .replace(':', "_col_")
        .replace('?', "_opt_")
        .replace('!', "_impopt_")
        .replace('.', "_")
        .replace(',', "_")
        .replace("==", "_eq_")
}

pub fn unbackticked(name: &str) -> String {
    name.replace('`', "")
}

fn type_tag(ty: &TypeName) -> String {
    escape_type_name(&ty.attributed_name())
}

fn effect_tag(is_async: bool) -> &'static str {
    if is_async {
        "async"
    } else {
        "sync"
    }
}

/// `{label}_{name}_{tag}` per parameter, joined by `_`. An absent label
/// contributes its empty spot, so unlabeled parameters start with `_`.
pub fn params_part(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|p| {
            format!(
                "{}_{}_{}",
                p.label.as_deref().map(unbackticked).unwrap_or_default(),
                unbackticked(&p.name),
                type_tag(&p.ty)
            )
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// `_where_{left}_{relation}_{right}` fragments joined by `_and_`; empty
/// when the member has no `where` clause.
pub fn where_suffix(requirements: &[GenericRequirement]) -> String {
    if requirements.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = requirements
        .iter()
        .map(|req| {
            let left = escape_type_name(&req.left);
            let right = escape_type_name(&req.right);
            let relation = match req.relation {
                RequirementRelation::Conformance => "conforms",
                RequirementRelation::SameType => "equals",
                RequirementRelation::Layout => "layout",
            };
            format!("{}_{}_{}", left, relation, right)
        })
        .collect();
    format!("_where_{}", parts.join("_and_"))
}

pub fn method_identifier(method: &Method) -> String {
    format!(
        "{}_{}{}_ret_{}{}",
        unbackticked(&method.name),
        effect_tag(method.is_async),
        params_part(&method.parameters),
        type_tag(&method.return_type),
        where_suffix(&method.generic_requirements)
    )
}

pub fn property_getter_identifier(property: &Property) -> String {
    format!(
        "{}_{}_ret_{}",
        unbackticked(&property.name),
        effect_tag(property.is_async),
        type_tag(&property.ty)
    )
}

pub fn property_setter_identifier(property: &Property) -> String {
    format!("set_{}", property_getter_identifier(property))
}

pub fn subscript_getter_identifier(subscript: &Subscript) -> String {
    format!(
        "subscript_get_by_{}_{}",
        params_part(&subscript.parameters),
        type_tag(&subscript.ty)
    )
}

pub fn subscript_setter_identifier(subscript: &Subscript) -> String {
    format!(
        "subscript_set_by_{}_{}",
        params_part(&subscript.parameters),
        type_tag(&subscript.ty)
    )
}
