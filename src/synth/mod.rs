//! Swift mock source synthesis.
//!
//! Takes the closed mock set and renders one generated source file. Each
//! member kind has its own emitter; [`template`] stitches the per-type
//! blocks together and [`identifier`] supplies the stable stub names that
//! tie expectation constructors to recorded invocations.

pub mod identifier;
pub mod method;
pub mod mock_type;
pub mod property;
pub mod subscripts;
pub mod template;
pub mod writer;

pub use template::render_mock_file;

use crate::model::Parameter;
use crate::resolve::aliases::replace_identifier;
use crate::syntax::{AccessLevel, GenericParameter};

/// Parameter names that collide with declaration keywords when forwarded
/// bare and so need backticks at use sites.
const PARAMETER_NAME_KEYWORDS: &[&str] = &["internal"];

/// Access keyword for generated members. `open` declarations surface as
/// `public` on the mock; everything else keeps its own keyword.
pub(crate) fn member_access(access: AccessLevel) -> &'static str {
    match access {
        AccessLevel::Open => "public",
        other => other.keyword().unwrap_or("internal"),
    }
}

/// `try await ` / `try ` / `await ` / `` prefix for call sites, trailing
/// space included.
pub(crate) fn call_attributes(is_throwing: bool, is_async: bool) -> &'static str {
    match (is_throwing, is_async) {
        (true, true) => "try await ",
        (true, false) => "try ",
        (false, true) => "await ",
        (false, false) => "",
    }
}

/// Declaration-position parameter name: `label name`, collapsed when both
/// match, `_ name` when the label is absent.
pub(crate) fn definition_name(param: &Parameter) -> String {
    match param.label.as_deref() {
        Some(label) if label == param.name => label.to_string(),
        Some(label) => format!("{} {}", label, param.name),
        None => format!("_ {}", param.name),
    }
}

pub(crate) fn forwarded_name(param: &Parameter) -> String {
    if PARAMETER_NAME_KEYWORDS.contains(&param.name.as_str()) {
        format!("`{}`", param.name)
    } else {
        param.name.clone()
    }
}

/// Name as passed through to a perform closure, `&`-prefixed for `inout`.
pub(crate) fn forwarded_string(param: &Parameter) -> String {
    if param.is_inout {
        format!("&{}", forwarded_name(param))
    } else {
        forwarded_name(param)
    }
}

/// One argument of a recorded-invocation description. String parameters
/// render quoted, everything else through `??` with a `nil` fallback; the
/// `$0[index]` lookups are spelled for the generated closure, not for us.
pub(crate) fn param_description(param: &Parameter, index: usize) -> String {
    let value = if param.ty.name == "String" {
        format!("\\\"\\($0[{}]!)\\\"", index)
    } else {
        format!("\\($0[{}] ?? \"nil\")", index)
    };
    match param.label.as_deref() {
        Some(label) => format!("{}: {}", label, value),
        None => value,
    }
}

/// `Self` mentions rewritten to the concrete mock name. Token-aware so
/// member paths like `Base.Self` or identifiers containing the word are
/// left alone.
pub(crate) fn substitute_self(spelling: &str, mock_type_name: &str) -> String {
    replace_identifier(spelling, "Self", mock_type_name)
}

/// Opaque parameter types flip to existentials so `Parameter<...>` and the
/// perform closures stay expressible.
pub(crate) fn erase_opaque(spelling: &str) -> String {
    replace_identifier(spelling, "some", "any")
}

/// Type spelling for closure signatures: normalized, `Self` substituted,
/// opaque types erased, `inout`/variadic shapes restored.
pub(crate) fn closure_param_spelling(param: &Parameter, mock_type_name: &str) -> String {
    let mut spelling = param.ty.signature_spelling();
    spelling = substitute_self(&spelling, mock_type_name);
    spelling = erase_opaque(&spelling);
    if param.is_variadic {
        spelling = format!("[{}]", spelling);
    }
    if param.is_inout {
        spelling = format!("inout {}", spelling);
    }
    spelling
}

/// `name: Parameter<T>` piece of an expectation constructor. Matchers take
/// the plain value type: no `inout`, implicit optionals flattened.
pub(crate) fn expectation_param(param: &Parameter, mock_type_name: &str) -> String {
    let mut spelling = param.ty.signature_spelling();
    spelling = substitute_self(&spelling, mock_type_name);
    spelling = erase_opaque(&spelling);
    if param.is_variadic {
        spelling = format!("[{}]", spelling);
    }
    format!("{}: Parameter<{}>", definition_name(param), spelling)
}

/// Parameter as it appears in the mock's own declaration. Non-optional
/// closures become `@escaping` because the value is stored for the perform
/// call.
pub(crate) fn implementation_param(param: &Parameter, mock_type_name: Option<&str>) -> String {
    let escaping = param.ty.is_closure() && !param.ty.normalized().is_optional;
    let mut spelling = param.ty.signature_spelling();
    if let Some(mock) = mock_type_name {
        spelling = substitute_self(&spelling, mock);
    }
    if param.is_variadic {
        spelling = format!("{}...", spelling);
    }
    if param.is_inout {
        spelling = format!("inout {}", spelling);
    }
    format!(
        "{}: {}{}",
        definition_name(param),
        if escaping { "@escaping " } else { "" },
        spelling
    )
}

/// `<T: A, U>` clause from a member's own generic parameters.
pub(crate) fn generic_clause(parameters: &[GenericParameter]) -> String {
    if parameters.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = parameters
        .iter()
        .map(|p| match p.bound.as_deref() {
            Some(bound) => format!("{}: {}", p.name, bound),
            None => p.name.clone(),
        })
        .collect();
    format!("<{}>", parts.join(", "))
}

/// Collapse the artifacts of pasting spellings into a function type:
/// `@escaping` is not legal there and doubled spaces read as noise.
pub(crate) fn sanitize_function_type(function_type: &str) -> String {
    let mut sanitized = function_type.replace("@escaping", "");
    while sanitized.contains("  ") {
        sanitized = sanitized.replace("  ", " ");
    }
    sanitized
        .replace("( ", "(")
        .replace(" )", ")")
        .replace(" ,", ",")
        .trim()
        .to_string()
}

/// Attribute name without the `@` or any argument list.
pub(crate) fn attribute_name(attribute: &str) -> &str {
    let bare = attribute.trim_start_matches('@');
    match bare.find('(') {
        Some(open) => &bare[..open],
        None => bare,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_access_keywords() {
        assert_eq!(member_access(AccessLevel::Open), "public");
        assert_eq!(member_access(AccessLevel::Public), "public");
        assert_eq!(member_access(AccessLevel::Internal), "internal");
        assert_eq!(member_access(AccessLevel::Private), "private");
    }

    #[test]
    fn test_definition_name_forms() {
        assert_eq!(definition_name(&Parameter::new(Some("for"), "id", "Int")), "for id");
        assert_eq!(definition_name(&Parameter::new(Some("id"), "id", "Int")), "id");
        assert_eq!(definition_name(&Parameter::new(None, "id", "Int")), "_ id");
    }

    #[test]
    fn test_forwarded_name_backticks_keywords() {
        assert_eq!(forwarded_name(&Parameter::new(None, "internal", "Int")), "`internal`");
        assert_eq!(forwarded_name(&Parameter::new(None, "value", "Int")), "value");
    }

    #[test]
    fn test_forwarded_string_inout() {
        let mut p = Parameter::new(Some("into"), "buffer", "Data");
        p.is_inout = true;
        assert_eq!(forwarded_string(&p), "&buffer");
    }

    #[test]
    fn test_param_description_string_vs_other() {
        let s = Parameter::new(Some("name"), "name", "String");
        assert_eq!(param_description(&s, 0), "name: \\\"\\($0[0]!)\\\"");
        let i = Parameter::new(None, "count", "Int");
        assert_eq!(param_description(&i, 2), "\\($0[2] ?? \"nil\")");
    }

    #[test]
    fn test_expectation_param_flattens_shapes() {
        let mut p = Parameter::new(Some("with"), "maker", "Self!");
        p.ty = crate::syntax::TypeName::parse("Self!");
        assert_eq!(expectation_param(&p, "ApiMock"), "with maker: Parameter<ApiMock?>");

        let opaque = Parameter::new(None, "task", "some Task");
        assert_eq!(expectation_param(&opaque, "ApiMock"), "_ task: Parameter<any Task>");
    }

    #[test]
    fn test_implementation_param_escaping_closure() {
        let closure = Parameter::new(Some("handler"), "handler", "(Int) -> Void");
        assert_eq!(
            implementation_param(&closure, Some("ApiMock")),
            "handler: @escaping (Int) -> Void"
        );
        let optional = Parameter::new(Some("handler"), "handler", "((Int) -> Void)?");
        assert_eq!(
            implementation_param(&optional, Some("ApiMock")),
            "handler: ((Int) -> Void)?"
        );
    }

    #[test]
    fn test_implementation_param_restores_variadic_and_inout() {
        let mut variadic = Parameter::new(None, "items", "Int");
        variadic.is_variadic = true;
        assert_eq!(implementation_param(&variadic, None), "_ items: Int...");

        let mut inout = Parameter::new(Some("counter"), "counter", "Int");
        inout.is_inout = true;
        assert_eq!(implementation_param(&inout, None), "counter: inout Int");
    }

    #[test]
    fn test_generic_clause() {
        assert_eq!(generic_clause(&[]), "");
        let params = vec![
            GenericParameter { name: "T".into(), bound: Some("Equatable".into()) },
            GenericParameter { name: "U".into(), bound: None },
        ];
        assert_eq!(generic_clause(&params), "<T: Equatable, U>");
    }

    #[test]
    fn test_sanitize_function_type() {
        assert_eq!(
            sanitize_function_type("(_ f: @escaping (Int) -> Void) -> Void"),
            "(_ f: (Int) -> Void) -> Void"
        );
        assert_eq!(sanitize_function_type("( Int , String )"), "(Int, String)");
    }

    #[test]
    fn test_attribute_name() {
        assert_eq!(attribute_name("@discardableResult"), "discardableResult");
        assert_eq!(attribute_name("@available(iOS 15, *)"), "available");
    }
}
