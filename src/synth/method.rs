//! Method emission.
//!
//! Each mocked method contributes four blocks to the generated type: a
//! `MockMethod` static describing invocations, an expectation constructor,
//! an `expect` overload and the conforming implementation that routes the
//! call through the recorder.

use crate::model::Method;
use crate::synth::identifier;
use crate::synth::{
    attribute_name, call_attributes, closure_param_spelling, expectation_param, forwarded_name,
    forwarded_string, generic_clause, implementation_param, member_access, param_description,
    sanitize_function_type, substitute_self,
};

/// A method paired with the mock type it is generated into.
pub struct MockedMethod<'a> {
    pub method: &'a Method,
    mock_type_name: &'a str,
}

impl<'a> MockedMethod<'a> {
    pub fn new(method: &'a Method, mock_type_name: &'a str) -> Self {
        MockedMethod { method, mock_type_name }
    }

    pub fn identifier(&self) -> String {
        identifier::method_identifier(self.method)
    }

    fn where_constraints(&self) -> Option<String> {
        if self.method.generic_requirements.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .method
            .generic_requirements
            .iter()
            .map(|req| req.display())
            .collect();
        Some(parts.join(", "))
    }

    fn post_parameters_definition(&self, self_substitute: Option<&str>) -> String {
        let mut return_type = self.method.return_type.signature_spelling();
        if let Some(substitute) = self_substitute {
            return_type = substitute_self(&return_type, substitute);
        }
        format!(
            "{}{}-> {}",
            if self.method.is_async { "async " } else { "" },
            if self.method.is_throwing { "throws " } else { "" },
            return_type
        )
    }

    fn closure_definition_with(
        &self,
        mock: &str,
        named: bool,
        substitute_return_self: bool,
        forwarding: bool,
    ) -> String {
        let mut parameters = Vec::new();
        if forwarding {
            parameters.push(format!(
                "_ forwardToOriginal: {}",
                self.closure_definition_with(mock, true, substitute_return_self, false)
            ));
        }
        for param in &self.method.parameters {
            let spelling = closure_param_spelling(param, mock);
            if named {
                parameters.push(format!("_ {}: {}", param.name, spelling));
            } else {
                parameters.push(format!("_ {}", spelling));
            }
        }
        format!(
            "({}) {}",
            parameters.join(", "),
            self.post_parameters_definition(substitute_return_self.then_some(mock))
        )
    }

    /// Perform closure type as it appears in `expect` and the `as!` cast.
    pub fn closure_definition(&self, substitute_return_self: bool, forwarding: bool) -> String {
        self.closure_definition_with(self.mock_type_name, true, substitute_return_self, forwarding)
    }

    /// The `Signature` phantom type for this method's expectations.
    pub fn signature(&self, substitute_return_self: bool) -> String {
        sanitize_function_type(&self.closure_definition_with(
            self.mock_type_name,
            true,
            substitute_return_self,
            false,
        ))
    }

    /// Signature without parameter names or `Self` substitution; overloads
    /// that share this share one `expect`.
    pub fn raw_signature(&self) -> String {
        sanitize_function_type(&self.closure_definition_with("Self", false, false, false))
    }

    /// The `Methods` static holding this method's invocation description.
    pub fn definition(&self) -> String {
        let descriptions: Vec<String> = self
            .method
            .parameters
            .iter()
            .enumerate()
            .map(|(index, param)| param_description(param, index))
            .collect();
        format!(
            "static var {}: MockMethod {{\n    .init {{{}\n        \"{}({})\"\n    }}\n}}",
            self.identifier(),
            if self.method.parameters.is_empty() { " _ in" } else { "" },
            self.method.name,
            descriptions.join(", ")
        )
    }

    fn parameter_placeholders(&self) -> String {
        if self.method.parameters.is_empty() {
            return String::new();
        }
        let blanks: Vec<&str> = self.method.parameters.iter().map(|_| "_").collect();
        format!(" {} in ", blanks.join(", "))
    }

    fn perform_closure_parameters(&self, prepending: &[&str]) -> String {
        let mut names: Vec<String> = prepending.iter().map(|s| s.to_string()).collect();
        names.extend(self.method.parameters.iter().map(|p| p.name.clone()));
        if names.is_empty() {
            String::new()
        } else {
            format!(" {} in", names.join(", "))
        }
    }

    /// Static constructor on `MethodExpectation` for this method.
    pub fn expectation_constructor(&self) -> String {
        let parameters: Vec<String> = self
            .method
            .parameters
            .iter()
            .map(|p| expectation_param(p, self.mock_type_name))
            .collect();
        let recorded: Vec<String> = self
            .method
            .parameters
            .iter()
            .map(|p| format!("{}.anyParameter", forwarded_name(p)))
            .collect();
        let constraints = self
            .where_constraints()
            .map(|c| format!(", {}", c))
            .unwrap_or_default();

        let mut lines: Vec<String> = self
            .method
            .attributes
            .iter()
            .filter(|a| attribute_name(a) != "objc")
            .cloned()
            .collect();
        lines.push(format!(
            "{} static func {}{}({}) -> Self\nwhere Signature == {}{} {{\n    .init(\n        method: Methods.{},\n        parameters: [{}]\n    )\n}}",
            member_access(self.method.access),
            self.method.name,
            generic_clause(&self.method.generic_parameters),
            parameters.join(", "),
            self.signature(true),
            constraints,
            self.identifier(),
            recorded.join(", ")
        ));
        lines.join("\n")
    }

    /// The `expect` overload. Emitted once per raw signature; members of an
    /// overload set reuse the same one through their constructors.
    pub fn mock_expect(&self, forwarding: bool) -> String {
        let mut lines: Vec<String> = self
            .method
            .attributes
            .iter()
            .filter(|a| !matches!(attribute_name(a), "discardableResult" | "objc"))
            .map(|a| format!("    {}", a))
            .collect();
        lines.push(format!(
            "    {} func expect{}(\n        _ expectation: MethodExpectation<{}>,\n        file: StaticString = #filePath,\n        line: UInt = #line,\n        perform: @escaping {}{}\n    ) {{\n        _record(expectation.expectation, file, line, perform)\n    }}",
            member_access(self.method.access),
            generic_clause(&self.method.generic_parameters),
            self.signature(true),
            self.closure_definition(true, forwarding),
            self.default_perform_closure(forwarding)
        ));
        lines.join("\n")
    }

    fn default_perform_closure(&self, forwarding: bool) -> String {
        if !forwarding {
            if !self.method.return_type.is_void() {
                return String::new();
            }
            return format!(" = {{{}}}", self.parameter_placeholders());
        }
        let forward = "_forwardToSuper";
        format!(
            " = {{{}\n            {}{}({})\n        }}",
            self.perform_closure_parameters(&[forward]),
            call_attributes(self.method.is_throwing, self.method.is_async),
            forward,
            self.forwarded_parameters(&[])
        )
    }

    fn full_definition(&self, is_override: bool) -> String {
        let parameters: Vec<String> = self
            .method
            .parameters
            .iter()
            .map(|p| implementation_param(p, Some(self.mock_type_name)))
            .collect();
        let mut lines: Vec<String> = self.method.attributes.clone();
        lines.push(format!(
            "{}{} func {}{}({}) {}",
            member_access(self.method.access),
            if is_override { " override" } else { "" },
            self.method.name,
            generic_clause(&self.method.generic_parameters),
            parameters.join(", "),
            self.post_parameters_definition(None)
        ));
        lines.join("\n")
    }

    /// The conforming implementation. Class mocks guard on the forwarding
    /// flag so construction-time calls reach `super` untouched.
    pub fn implementation(&self, is_override: bool) -> String {
        let call_attrs = call_attributes(self.method.is_throwing, self.method.is_async);
        let mut lines = vec![format!("{} {{", self.full_definition(is_override))];
        if is_override {
            lines.push(format!(
                "    guard !autoForwardingEnabled else {{\n        return {}super.{}({})\n    }}",
                call_attrs,
                self.method.name,
                self.forwarded_labeled_parameters()
            ));
        }
        let cast = self.closure_definition(false, is_override);
        if self.method.parameters.is_empty() {
            lines.push(format!(
                "    let perform = _perform(Methods.{}) as! {}\n    return {}perform({})\n}}",
                self.identifier(),
                cast,
                call_attrs,
                self.forwarded_parameters_with_super(is_override)
            ));
        } else {
            lines.push(format!(
                "    let perform = _perform(\n        Methods.{},\n        [{}]\n    ) as! {}\n    return {}perform({})\n}}",
                self.identifier(),
                self.recorded_parameters(),
                cast,
                call_attrs,
                self.forwarded_parameters_with_super(is_override)
            ));
        }
        lines.join("\n")
    }

    fn forwarded_parameters(&self, prepending: &[&str]) -> String {
        let mut parts: Vec<String> = prepending.iter().map(|s| s.to_string()).collect();
        parts.extend(self.method.parameters.iter().map(forwarded_string));
        parts.join(", ")
    }

    fn forwarded_parameters_with_super(&self, call_to_super: bool) -> String {
        if !call_to_super {
            return self.forwarded_parameters(&[]);
        }
        let selector = self.selector_name();
        let forward = if selector == "`self`" {
            "{ self }".to_string()
        } else {
            format!("super.{}", selector)
        };
        self.forwarded_parameters(&[&forward])
    }

    fn selector_name(&self) -> String {
        if self.method.parameters.is_empty() {
            return self.method.name.clone();
        }
        let labels: String = self
            .method
            .parameters
            .iter()
            .map(|p| format!("{}:", p.label.as_deref().unwrap_or("_")))
            .collect();
        format!("{}({})", self.method.name, labels)
    }

    fn recorded_parameters(&self) -> String {
        self.method
            .parameters
            .iter()
            .map(forwarded_name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn forwarded_labeled_parameters(&self) -> String {
        self.method
            .parameters
            .iter()
            .map(|p| match p.label.as_deref() {
                Some(label) => format!("{}: {}", label, forwarded_string(p)),
                None => forwarded_string(p),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
