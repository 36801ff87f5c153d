//! Whole-file rendering of generated mock source.
//!
//! One output file per run: imports, a generation marker, then one mock
//! class per target followed by its file-scope expectation extensions.
//! Blocks that need a blank separator carry their own leading newline so
//! assembly stays a plain newline join.

use std::collections::{BTreeSet, HashSet};

use crate::model::{TypeInfo, TypeModel};
use crate::synth::mock_type::{forwarding_initializer, initializer_trap, MockedType};
use crate::synth::writer::{indented, Blocks};

/// Modules every generated file needs regardless of configuration.
const BASELINE_IMPORTS: &[&str] = &["XCTest", "Mocksmith"];

const GENERATED_MARKER: &str = "\n// Generated by Mocksmith. DO NOT EDIT!";

/// Closes the `Methods` enum and opens `MethodExpectation`; the per-method
/// constructors follow and the struct is closed by the caller.
const METHOD_EXPECTATION_OPEN: &str = concat!(
    "    }\n",
    "\n",
    "    public struct MethodExpectation<Signature> {\n",
    "        public let expectation: Recorder.Expectation\n",
    "\n",
    "        init(method: MockMethod, parameters: [AnyParameter]) {\n",
    "            self.expectation = .init(\n",
    "                method: method,\n",
    "                parameters: parameters\n",
    "            )\n",
    "        }"
);

const PROPERTY_EXPECTATION: &str = concat!(
    "    public struct PropertyExpectation<Signature> {\n",
    "        private let method: MockMethod\n",
    "\n",
    "        init(method: MockMethod) {\n",
    "            self.method = method\n",
    "        }\n",
    "\n",
    "        public var getterExpectation: Recorder.Expectation {\n",
    "            .init(\n",
    "                method: method,\n",
    "                parameters: []\n",
    "            )\n",
    "        }\n",
    "\n",
    "        public func setterExpectation(_ newValue: AnyParameter) -> Recorder.Expectation {\n",
    "            .init(\n",
    "                method: method,\n",
    "                parameters: [newValue]\n",
    "            )\n",
    "        }\n",
    "    }"
);

const RECORDER_FIELDS: &str = concat!(
    "\n    public let recorder = Recorder()\n",
    "\n",
    "    private let file: StaticString\n",
    "    private let line: UInt\n"
);

const PROTOCOL_INIT: &str = concat!(
    "    public init(file: StaticString = #filePath, line: UInt = #line) {\n",
    "        self.file = file\n",
    "        self.line = line\n",
    "    }"
);

const CLASS_FORWARDING_STATE: &str = concat!(
    "\n    public var autoForwardingEnabled: Bool\n",
    "\n",
    "    public var isEnabled: Bool {\n",
    "        !autoForwardingEnabled\n",
    "    }"
);

const RECORD_PERFORM: &str = concat!(
    "    private func _record<P>(_ expectation: Recorder.Expectation, _ file: StaticString, _ line: UInt, _ perform: P) {\n",
    "        guard isEnabled else {\n",
    "            handleFatalFailure(\"Setting expectation on disabled mock is not allowed\", file: file, line: line)\n",
    "        }\n",
    "        recorder.record(.init(expectation, perform, file, line))\n",
    "    }\n",
    "\n",
    "    private func _perform(_ method: MockMethod, _ parameters: [Any?] = []) -> Any {\n",
    "        let invocation = Invocation(\n",
    "            method: method,\n",
    "            parameters: parameters\n",
    "        )\n",
    "        guard let stub = recorder.next() else {\n",
    "            handleFatalFailure(\"Expected no calls but received `\\(invocation)`\", file: file, line: line)\n",
    "        }\n",
    "\n",
    "        guard stub.matches(invocation) else {\n",
    "            handleFatalFailure(\n",
    "                \"Unexpected call: expected `\\(stub.expectation)`, but received `\\(invocation)`\",\n",
    "                file: stub.file,\n",
    "                line: stub.line\n",
    "            )\n",
    "        }\n",
    "\n",
    "        return stub.perform\n",
    "    }"
);

/// Renders the complete generated file for a closed mock set.
///
/// `targets` is the resolved set in model order; `model` supplies the
/// conformed protocols consulted for initializer traps.
pub fn render_mock_file(
    targets: &[TypeInfo],
    model: &TypeModel,
    imports: &[String],
    testable_imports: &[String],
) -> String {
    let mut blocks = Blocks::new();

    let mut plain: BTreeSet<&str> = BASELINE_IMPORTS.iter().copied().collect();
    plain.extend(imports.iter().map(String::as_str));
    blocks.extend(plain.iter().map(|module| format!("import {}", module)));

    let testable: BTreeSet<&str> = testable_imports.iter().map(String::as_str).collect();
    blocks.extend(
        testable
            .iter()
            .map(|module| format!("@testable import {}", module)),
    );

    blocks.push(GENERATED_MARKER);

    for info in targets {
        render_type(&MockedType::new(info), model, &mut blocks);
    }

    blocks.push("\n");
    blocks.render()
}

fn render_type(mocked: &MockedType<'_>, model: &TypeModel, blocks: &mut Blocks) {
    let mock = mocked.mock_type_name.as_str();
    let mocks_class = mocked.is_class();
    let methods = mocked.methods();
    let properties = mocked.properties();
    let subscripts = mocked.subscripts();

    blocks.push(format!(
        "\npublic final class {}{}: {}, Mock {{",
        mock,
        mocked.generic_parameter_clause(),
        mocked.conformed_spelling()
    ));
    blocks.extend(mocked.typealias_reexports());

    blocks.push("\n    enum Methods {");
    for method in &methods {
        blocks.push(indented(&method.definition(), 2));
    }
    for property in &properties {
        blocks.extend(property.definitions().iter().map(|d| indented(d, 2)));
    }
    for subscript in &subscripts {
        blocks.extend(subscript.definitions().iter().map(|d| indented(d, 2)));
    }

    blocks.push(METHOD_EXPECTATION_OPEN);
    for method in &methods {
        blocks.push(format!(
            "\n{}",
            indented(&method.expectation_constructor(), 2)
        ));
    }
    blocks.push("    }");

    if !properties.is_empty() {
        blocks.push(PROPERTY_EXPECTATION);
    }
    if !subscripts.is_empty() {
        blocks.push(subscript_expectation_struct(mock));
    }

    blocks.push(RECORDER_FIELDS);

    if !mocks_class {
        blocks.push(PROTOCOL_INIT);
    }

    for trap in mocked.initializer_traps(model) {
        blocks.push(format!("\n{}", indented(&initializer_trap(&trap), 1)));
    }
    for init in mocked.forwarding_initializers() {
        blocks.push(format!("\n{}", indented(&forwarding_initializer(init, mock), 1)));
    }

    if mocks_class {
        blocks.push(CLASS_FORWARDING_STATE);
    }

    blocks.push(RECORD_PERFORM);

    for method in &methods {
        blocks.push(format!(
            "\n{}",
            indented(&method.implementation(mocks_class), 1)
        ));
    }
    for property in &properties {
        blocks.push(format!(
            "\n{}",
            indented(&property.implementation(mocks_class), 1)
        ));
    }
    for subscript in &subscripts {
        blocks.push(format!("\n{}", indented(&subscript.implementation(), 1)));
    }

    // Overload sets share one expect per distinct perform shape.
    for method in unique_by(&methods, |m| m.raw_signature()) {
        blocks.push(format!("\n{}", method.mock_expect(mocks_class)));
    }
    for property in unique_by(&properties, |p| p.getter_signature()) {
        blocks.push(format!("\n{}", property.mock_expect_getter(mocks_class)));
    }
    let writable: Vec<_> = properties.iter().filter(|p| !p.is_read_only()).collect();
    for property in unique_by(&writable, |p| p.setter_signature().unwrap_or_default()) {
        if let Some(expect) = property.mock_expect_setter(mocks_class) {
            blocks.push(format!("\n{}", expect));
        }
    }
    for subscript in &subscripts {
        blocks.push(format!("\n{}", subscript.mock_expect_getter()));
        if let Some(expect) = subscript.mock_expect_setter() {
            blocks.push(format!("\n{}", expect));
        }
    }

    if !subscripts.is_empty() {
        blocks.push("\n    public struct SubscriptExpectations {");
        for subscript in &subscripts {
            blocks.push(indented(&subscript.expectation_constructor(), 2));
        }
        blocks.push("    }");
    }

    blocks.push("}");

    for property in &properties {
        blocks.push(format!(
            "\n{}",
            property
                .expectation_extensions(mocked.mock_access(), mock)
                .join("\n\n")
        ));
    }
}

/// `SubscriptExpectation` carries the index parameters alongside the
/// method so getter and setter expectations share one constructor; the
/// static `subscript` member routes `.subscript[...]` sugar to the
/// constructors struct.
fn subscript_expectation_struct(mock_type_name: &str) -> String {
    format!(
        concat!(
            "    public struct SubscriptExpectation<Signature> {{\n",
            "        private let method: MockMethod\n",
            "        private let parameters: [AnyParameter]\n",
            "\n",
            "        init(method: MockMethod, parameters: [AnyParameter]) {{\n",
            "            self.method = method\n",
            "            self.parameters = parameters\n",
            "        }}\n",
            "\n",
            "        public var getterExpectation: Recorder.Expectation {{\n",
            "            .init(\n",
            "                method: method,\n",
            "                parameters: parameters\n",
            "            )\n",
            "        }}\n",
            "\n",
            "        public func setterExpectation(_ newValue: AnyParameter) -> Recorder.Expectation {{\n",
            "            .init(\n",
            "                method: method,\n",
            "                parameters: parameters + [newValue]\n",
            "            )\n",
            "        }}\n",
            "\n",
            "        public static var `subscript`: {mock}.SubscriptExpectations {{\n",
            "            .init()\n",
            "        }}\n",
            "    }}"
        ),
        mock = mock_type_name
    )
}

fn unique_by<'a, T>(items: &'a [T], key: impl Fn(&T) -> String) -> Vec<&'a T> {
    let mut seen = HashSet::new();
    items.iter().filter(|item| seen.insert(key(item))).collect()
}
