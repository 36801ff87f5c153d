//! Whole-pipeline synthesis: declaration dumps in, generated Swift out.

use indoc::indoc;
use mocksmith::model::{Method, Parameter, Property, TypeInfo, TypeModel};
use mocksmith::syntax::{AccessLevel, TypeKind, TypeName};
use mocksmith::{build_model, render_mock_file, resolve_hierarchy, resolve_mock_set, SourceFile};
use pretty_assertions::assert_eq;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn render_dump(json: &str, imports: &[&str], testable: &[&str]) -> String {
    let file: SourceFile = serde_json::from_str(json).unwrap();
    let model = resolve_hierarchy(build_model(&[file]));
    let targets = resolve_mock_set(&model);
    render_mock_file(&targets, &model, &strings(imports), &strings(testable))
}

#[test]
fn test_empty_mock_set_renders_header_only() {
    let rendered = render_dump(
        r#"{"path": "Sources/Empty.swift", "types": []}"#,
        &[],
        &[],
    );

    assert_eq!(
        rendered,
        indoc! {"
            import Mocksmith
            import XCTest

            // Generated by Mocksmith. DO NOT EDIT!

        "}
    );
}

// The dump decoder, model builder, and hierarchy pass together must land
// on the same shapes a hand-built model has, or generated files would
// depend on which path produced the model.
#[test]
fn test_dump_pipeline_matches_handbuilt_model() {
    let from_dump = render_dump(
        r#"{
            "path": "Sources/Api.swift",
            "types": [
                {
                    "name": "Api",
                    "kind": "protocol",
                    "access": "public",
                    "comment": "/// mocksmith: AutoMockable",
                    "members": [
                        {
                            "kind": "method",
                            "name": "fetch",
                            "access": "public",
                            "parameters": [
                                {"label": "id", "name": "id", "type": "String"}
                            ],
                            "return_type": "Int"
                        },
                        {
                            "kind": "property",
                            "name": "name",
                            "access": "public",
                            "type": "String"
                        }
                    ]
                }
            ]
        }"#,
        &["Domain"],
        &["App"],
    );

    let mut api = TypeInfo::new("Api", TypeKind::Protocol);
    api.access = AccessLevel::Public;
    let mut fetch = Method::new("fetch");
    fetch.parameters = vec![Parameter::new(Some("id"), "id", "String")];
    fetch.return_type = TypeName::parse("Int");
    fetch.access = AccessLevel::Public;
    api.methods.push(fetch);
    api.properties.push(Property {
        name: "name".to_string(),
        ty: TypeName::parse("String").normalized(),
        is_read_only: true,
        is_async: false,
        is_throwing: false,
        is_static: false,
        access: AccessLevel::Public,
        attributes: vec![],
    });
    let from_model = render_mock_file(
        &[api],
        &TypeModel::default(),
        &strings(&["Domain"]),
        &strings(&["App"]),
    );

    assert_eq!(from_dump, from_model);
}

#[test]
fn test_class_dump_emits_forwarding_mock() {
    let rendered = render_dump(
        r#"{
            "path": "Sources/Service.swift",
            "types": [
                {
                    "name": "Service",
                    "kind": "class",
                    "access": "open",
                    "comment": "/// mocksmith: AutoMockable",
                    "members": [
                        {
                            "kind": "method",
                            "name": "init",
                            "access": "public",
                            "is_initializer": true,
                            "parameters": [
                                {"label": "name", "name": "name", "type": "String"}
                            ]
                        },
                        {"kind": "method", "name": "stop", "access": "public"}
                    ]
                }
            ]
        }"#,
        &[],
        &[],
    );

    assert!(rendered.contains("public final class ServiceMock: Service, Mock {"));
    assert!(rendered.contains("    public var autoForwardingEnabled: Bool"));
    assert!(rendered
        .contains("    public init(name: String, file: StaticString = #filePath, line: UInt = #line) {"));
    assert!(rendered.contains("super.init(name: name)"));
    assert!(rendered.contains("public override func stop() -> Void {"));
}

#[test]
fn test_associated_types_reexport_and_member_alias_keeps_spelling() {
    let rendered = render_dump(
        r#"{
            "path": "Sources/Loader.swift",
            "types": [
                {
                    "name": "Loader",
                    "kind": "protocol",
                    "access": "public",
                    "comment": "/// mocksmith: AutoMockable",
                    "members": [
                        {"kind": "associated_type", "name": "Entity"},
                        {"kind": "type_alias", "name": "Payload", "target": "String"},
                        {
                            "kind": "method",
                            "name": "load",
                            "access": "public",
                            "return_type": "Payload"
                        }
                    ]
                }
            ]
        }"#,
        &[],
        &[],
    );

    assert!(rendered.contains("    public typealias Entity = Entity"));
    assert!(rendered.contains("public func load() -> Payload {"));
    assert!(rendered.contains("load_sync_ret_Payload"));
}

#[test]
fn test_skipped_members_stay_out_of_the_mock() {
    let rendered = render_dump(
        r#"{
            "path": "Sources/Api.swift",
            "types": [
                {
                    "name": "Api",
                    "kind": "protocol",
                    "access": "public",
                    "comment": "/// mocksmith: AutoMockable\n/// mocksmith: skip = legacy",
                    "members": [
                        {"kind": "method", "name": "fresh", "access": "public"},
                        {"kind": "method", "name": "legacy", "access": "public"}
                    ]
                }
            ]
        }"#,
        &[],
        &[],
    );

    assert!(rendered.contains("public func fresh()"));
    assert!(!rendered.contains("public func legacy()"));
}

#[test]
fn test_two_targets_render_in_set_order() {
    let rendered = render_dump(
        r#"{
            "path": "Sources/Pair.swift",
            "types": [
                {
                    "name": "First",
                    "kind": "protocol",
                    "access": "public",
                    "comment": "/// mocksmith: AutoMockable"
                },
                {
                    "name": "Second",
                    "kind": "protocol",
                    "access": "public",
                    "comment": "/// mocksmith: AutoMockable"
                }
            ]
        }"#,
        &[],
        &[],
    );

    let first = rendered.find("class FirstMock").unwrap();
    let second = rendered.find("class SecondMock").unwrap();
    assert!(first < second);
}
