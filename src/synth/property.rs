//! Property emission.
//!
//! Properties split into getter and setter stubs with separate identifiers.
//! Expectation constructors live in file-scope extensions constrained on
//! the signature phantom type, so `.value` resolves against the right stub
//! for both reads and writes.

use crate::model::Property;
use crate::synth::identifier;
use crate::synth::writer::indented;
use crate::synth::{attribute_name, call_attributes, member_access};

/// A property being generated into a mock.
pub struct MockedProperty<'a> {
    pub property: &'a Property,
}

impl<'a> MockedProperty<'a> {
    pub fn new(property: &'a Property) -> Self {
        MockedProperty { property }
    }

    pub fn getter_identifier(&self) -> String {
        identifier::property_getter_identifier(self.property)
    }

    pub fn setter_identifier(&self) -> String {
        identifier::property_setter_identifier(self.property)
    }

    pub fn is_read_only(&self) -> bool {
        self.property.is_read_only
    }

    fn type_spelling(&self) -> String {
        self.property.ty.signature_spelling()
    }

    /// `async throws ` effect keywords of the getter, trailing space kept.
    fn getter_specifiers(&self) -> String {
        match (self.property.is_async, self.property.is_throwing) {
            (true, true) => "async throws ".to_string(),
            (true, false) => "async ".to_string(),
            (false, true) => "throws ".to_string(),
            (false, false) => String::new(),
        }
    }

    pub fn getter_perform_definition(&self, forwarding: bool) -> String {
        let parameters = if forwarding {
            format!(
                "_ forwardToOriginal: {}",
                self.getter_perform_definition(false)
            )
        } else {
            String::new()
        };
        format!(
            "({}) {}-> {}",
            parameters,
            self.getter_specifiers(),
            self.type_spelling()
        )
    }

    pub fn setter_perform_definition(&self, forwarding: bool) -> String {
        let mut parameters = Vec::new();
        if forwarding {
            parameters.push(format!(
                "_ forwardToOriginal: {}",
                self.setter_perform_definition(false)
            ));
        }
        parameters.push(format!("_ newValue: {}", self.type_spelling()));
        format!("({}) -> Void", parameters.join(", "))
    }

    pub fn getter_signature(&self) -> String {
        self.getter_perform_definition(false)
    }

    pub fn setter_signature(&self) -> Option<String> {
        if self.property.is_read_only {
            None
        } else {
            Some(self.setter_perform_definition(false))
        }
    }

    /// `Methods` statics for this property, setter included when writable.
    pub fn definitions(&self) -> Vec<String> {
        let mut definitions = vec![format!(
            "static var {}: MockMethod {{\n    .init {{ _ in\n        \"{}\"\n    }}\n}}",
            self.getter_identifier(),
            self.property.name
        )];
        if !self.property.is_read_only {
            definitions.push(format!(
                "static var {}: MockMethod {{\n    .init {{\n        \"{} = \\($0[0] ?? \"nil\")\"\n    }}\n}}",
                self.setter_identifier(),
                self.property.name
            ));
        }
        definitions
    }

    fn full_definition(&self, is_override: bool) -> String {
        let mut lines: Vec<String> = self
            .property
            .attributes
            .iter()
            .filter(|a| attribute_name(a) != "NSCopying")
            .cloned()
            .collect();
        lines.push(format!(
            "{}{} var {}: {}",
            member_access(self.property.access),
            if is_override { " override" } else { "" },
            self.property.name,
            self.type_spelling()
        ));
        lines.join("\n")
    }

    fn getter(&self, is_override: bool) -> String {
        let mut lines = Vec::new();
        if is_override {
            lines.push(format!(
                "guard !autoForwardingEnabled else {{\n    return super.{}\n}}",
                self.property.name
            ));
        }
        lines.push(format!(
            "let perform = _perform(Methods.{}) as! {}\nreturn {}perform({})",
            self.getter_identifier(),
            self.getter_perform_definition(is_override),
            call_attributes(self.property.is_throwing, self.property.is_async),
            if is_override {
                format!("{{ super.{} }}", self.property.name)
            } else {
                String::new()
            }
        ));
        lines.join("\n")
    }

    fn setter(&self, is_override: bool) -> String {
        let mut lines = Vec::new();
        if is_override {
            lines.push(format!(
                "guard !autoForwardingEnabled else {{\n    super.{} = newValue\n    return\n}}",
                self.property.name
            ));
        }
        lines.push(format!(
            "let perform = _perform(\n    Methods.{},\n    [newValue]\n) as! {}\nreturn perform({}newValue)",
            self.setter_identifier(),
            self.setter_perform_definition(is_override),
            if is_override {
                format!("{{ super.{} = $0 }}, ", self.property.name)
            } else {
                String::new()
            }
        ));
        lines.join("\n")
    }

    /// The conforming implementation. The getter block always spells out
    /// `get` so effect specifiers have somewhere to live.
    pub fn implementation(&self, is_override: bool) -> String {
        let mut lines = vec![format!("{} {{", self.full_definition(is_override))];
        lines.push(format!("    get {}{{", self.getter_specifiers()));
        lines.push(indented(&self.getter(is_override), 2));
        lines.push("    }".to_string());
        if !self.property.is_read_only {
            lines.push("    set {".to_string());
            lines.push(indented(&self.setter(is_override), 2));
            lines.push("    }".to_string());
        }
        lines.push("}".to_string());
        lines.join("\n")
    }

    pub fn mock_expect_getter(&self, forwarding: bool) -> String {
        format!(
            "    public func expect(\n        _ expectation: PropertyExpectation<{}>,\n        file: StaticString = #filePath,\n        line: UInt = #line,\n        perform: @escaping {}{}\n    ) {{\n        _record(expectation.getterExpectation, file, line, perform)\n    }}",
            self.getter_signature(),
            self.getter_perform_definition(forwarding),
            if forwarding { " = { $0() }" } else { "" }
        )
    }

    pub fn mock_expect_setter(&self, forwarding: bool) -> Option<String> {
        let setter_signature = self.setter_signature()?;
        Some(format!(
            "    public func expect(\n        set expectation: PropertyExpectation<{}>,\n        to newValue: Parameter<{}>,\n        file: StaticString = #filePath,\n        line: UInt = #line,\n        perform: @escaping {}{}\n    ) {{\n        _record(expectation.setterExpectation(newValue.anyParameter), file, line, perform)\n    }}",
            setter_signature,
            self.type_spelling(),
            self.setter_perform_definition(forwarding),
            if forwarding { " = { $0($1) }" } else { " = { _ in }" }
        ))
    }

    /// File-scope extensions binding `.name` constructors to this
    /// property's signatures.
    pub fn expectation_extensions(
        &self,
        mock_access: &str,
        mock_type_name: &str,
    ) -> Vec<String> {
        let mut extensions = vec![format!(
            "{} extension {}.PropertyExpectation where Signature == {} {{\n    static var {}: Self {{\n        .init(method: {}.Methods.{})\n    }}\n}}",
            mock_access,
            mock_type_name,
            self.getter_signature(),
            self.property.name,
            mock_type_name,
            self.getter_identifier()
        )];
        if !self.property.is_read_only {
            extensions.push(format!(
                "{} extension {}.PropertyExpectation where Signature == {} {{\n    static var {}: Self {{\n        .init(method: {}.Methods.{})\n    }}\n}}",
                mock_access,
                mock_type_name,
                self.setter_perform_definition(false),
                self.property.name,
                mock_type_name,
                self.setter_identifier()
            ));
        }
        extensions
    }
}
