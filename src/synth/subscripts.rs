//! Subscript emission.
//!
//! Subscript expectations are built through a nested `SubscriptExpectations`
//! value so call sites read `.subscript[key]`. Getter and setter variants of
//! the same parameter list share constructors distinguished only by the
//! signature phantom type.

use crate::model::Subscript;
use crate::synth::identifier;
use crate::synth::writer::indented;
use crate::synth::{
    closure_param_spelling, expectation_param, forwarded_name, forwarded_string,
    implementation_param, member_access, param_description,
};

/// A subscript being generated into a mock.
pub struct MockedSubscript<'a> {
    pub subscript: &'a Subscript,
    mock_type_name: &'a str,
}

impl<'a> MockedSubscript<'a> {
    pub fn new(subscript: &'a Subscript, mock_type_name: &'a str) -> Self {
        MockedSubscript { subscript, mock_type_name }
    }

    pub fn getter_identifier(&self) -> String {
        identifier::subscript_getter_identifier(self.subscript)
    }

    pub fn setter_identifier(&self) -> String {
        identifier::subscript_setter_identifier(self.subscript)
    }

    pub fn is_read_only(&self) -> bool {
        self.subscript.is_read_only
    }

    fn type_spelling(&self) -> String {
        self.subscript.ty.signature_spelling()
    }

    fn parameter_spellings(&self, named: bool) -> Vec<String> {
        self.subscript
            .parameters
            .iter()
            .map(|p| {
                let spelling = closure_param_spelling(p, "Self");
                if named {
                    format!("_ {}: {}", p.name, spelling)
                } else {
                    format!("_ {}", spelling)
                }
            })
            .collect()
    }

    pub fn getter_perform_definition(&self) -> String {
        format!(
            "({}) -> {}",
            self.parameter_spellings(true).join(", "),
            self.type_spelling()
        )
    }

    pub fn setter_perform_definition(&self) -> String {
        let mut parameters = self.parameter_spellings(false);
        parameters.push(format!("_ newValue: {}", self.type_spelling()));
        format!("({}) -> Void", parameters.join(", "))
    }

    /// Key for collapsing getter-only and read-write declarations of the
    /// same subscript.
    pub fn getter_signature(&self) -> String {
        self.getter_perform_definition()
    }

    pub fn setter_signature(&self) -> Option<String> {
        if self.subscript.is_read_only {
            None
        } else {
            Some(self.setter_perform_definition())
        }
    }

    fn descriptions(&self) -> String {
        self.subscript
            .parameters
            .iter()
            .enumerate()
            .map(|(index, param)| param_description(param, index))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `Methods` statics, setter included when writable.
    pub fn definitions(&self) -> Vec<String> {
        let mut definitions = vec![format!(
            "static var {}: MockMethod {{\n    .init {{{}\n        \"[{}]\"\n    }}\n}}",
            self.getter_identifier(),
            if self.subscript.parameters.is_empty() { " _ in" } else { "" },
            self.descriptions()
        )];
        if !self.subscript.is_read_only {
            definitions.push(format!(
                "static var {}: MockMethod {{\n    .init {{\n        \"[{}] = \\($0.last! ?? \"nil\")\"\n    }}\n}}",
                self.setter_identifier(),
                self.descriptions()
            ));
        }
        definitions
    }

    fn full_definition(&self) -> String {
        let parameters: Vec<String> = self
            .subscript
            .parameters
            .iter()
            .map(|p| implementation_param(p, None))
            .collect();
        format!(
            "{} subscript({}) -> {}",
            member_access(self.subscript.access),
            parameters.join(", "),
            self.type_spelling()
        )
    }

    fn recorded_parameters(&self) -> String {
        self.subscript
            .parameters
            .iter()
            .map(forwarded_name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn forwarded_parameters(&self) -> String {
        self.subscript
            .parameters
            .iter()
            .map(forwarded_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn getter(&self) -> String {
        format!(
            "let perform = _perform(\n    Methods.{},\n    [{}]\n) as! {}\nreturn perform({})",
            self.getter_identifier(),
            self.recorded_parameters(),
            self.getter_perform_definition(),
            self.forwarded_parameters()
        )
    }

    fn setter(&self) -> String {
        format!(
            "let perform = _perform(\n    Methods.{},\n    [{}, newValue]\n) as! {}\nreturn perform({}, newValue)",
            self.setter_identifier(),
            self.recorded_parameters(),
            self.setter_perform_definition(),
            self.forwarded_parameters()
        )
    }

    /// The conforming implementation. Read-only subscripts inline the
    /// getter body without an accessor block.
    pub fn implementation(&self) -> String {
        let mut lines = vec![format!("{} {{", self.full_definition())];
        if self.subscript.is_read_only {
            lines.push(indented(&self.getter(), 1));
        } else {
            lines.push("    get {".to_string());
            lines.push(indented(&self.getter(), 2));
            lines.push("    }".to_string());
            lines.push("    set {".to_string());
            lines.push(indented(&self.setter(), 2));
            lines.push("    }".to_string());
        }
        lines.push("}".to_string());
        lines.join("\n")
    }

    fn expectation_definition_parameters(&self) -> String {
        self.subscript
            .parameters
            .iter()
            .map(|p| expectation_param(p, self.mock_type_name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn any_parameters(&self) -> String {
        self.subscript
            .parameters
            .iter()
            .map(|p| format!("{}.anyParameter", forwarded_name(p)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Subscript declarations on `SubscriptExpectations`, one per signature.
    pub fn expectation_constructor(&self) -> String {
        let mut blocks = vec![format!(
            "{} subscript({}) -> {}.SubscriptExpectation<{}> {{\n    .init(\n        method: Methods.{},\n        parameters: [{}]\n    )\n}}",
            member_access(self.subscript.access),
            self.expectation_definition_parameters(),
            self.mock_type_name,
            self.getter_signature(),
            self.getter_identifier(),
            self.any_parameters()
        )];
        if let Some(setter_signature) = self.setter_signature() {
            blocks.push(format!(
                "\n{} subscript({}) -> {}.SubscriptExpectation<{}> {{\n    .init(\n        method: Methods.{},\n        parameters: [{}]\n    )\n}}",
                member_access(self.subscript.access),
                self.expectation_definition_parameters(),
                self.mock_type_name,
                setter_signature,
                self.setter_identifier(),
                self.any_parameters()
            ));
        }
        blocks.join("\n")
    }

    fn default_setter_perform_closure(&self) -> String {
        let mut placeholders: Vec<&str> = self.subscript.parameters.iter().map(|_| "_").collect();
        placeholders.push("_");
        format!(" = {{ {} in }}", placeholders.join(", "))
    }

    pub fn mock_expect_getter(&self) -> String {
        format!(
            "    public func expect(\n        _ expectation: SubscriptExpectation<{}>,\n        file: StaticString = #filePath,\n        line: UInt = #line,\n        perform: @escaping {}\n    ) {{\n        _record(expectation.getterExpectation, file, line, perform)\n    }}",
            self.getter_signature(),
            self.getter_perform_definition()
        )
    }

    pub fn mock_expect_setter(&self) -> Option<String> {
        let setter_signature = self.setter_signature()?;
        Some(format!(
            "    public func expect(\n        set expectation: SubscriptExpectation<{}>,\n        to newValue: Parameter<{}>,\n        file: StaticString = #filePath,\n        line: UInt = #line,\n        perform: @escaping {}{}\n    ) {{\n        _record(expectation.setterExpectation(newValue.anyParameter), file, line, perform)\n    }}",
            setter_signature,
            self.type_spelling(),
            self.setter_perform_definition(),
            self.default_setter_perform_closure()
        ))
    }
}
