//! Mock set closure behavior, driven through the full model pipeline.

use mocksmith::{build_model, resolve_hierarchy, resolve_mock_set, SourceFile};

fn mock_set_names(json: &str) -> Vec<String> {
    let file: SourceFile = serde_json::from_str(json).unwrap();
    let model = resolve_hierarchy(build_model(&[file]));
    resolve_mock_set(&model)
        .into_iter()
        .map(|info| info.name)
        .collect()
}

#[test]
fn test_annotated_protocol_seeds_the_set() {
    let names = mock_set_names(
        r#"{
            "path": "Sources/Api.swift",
            "types": [
                {
                    "name": "Api",
                    "kind": "protocol",
                    "comment": "/// mocksmith: AutoMockable"
                },
                {"name": "Unrelated", "kind": "protocol"}
            ]
        }"#,
    );

    assert_eq!(names, vec!["Api"]);
}

#[test]
fn test_marker_conformance_seeds_the_set() {
    let names = mock_set_names(
        r#"{
            "path": "Sources/Api.swift",
            "types": [
                {"name": "Api", "kind": "protocol", "inherited": ["AutoMockable"]}
            ]
        }"#,
    );

    assert_eq!(names, vec!["Api"]);
}

#[test]
fn test_signature_references_widen_to_protocols_only() {
    let names = mock_set_names(
        r#"{
            "path": "Sources/Checkout.swift",
            "types": [
                {
                    "name": "Checkout",
                    "kind": "protocol",
                    "comment": "/// mocksmith: AutoMockable",
                    "members": [
                        {
                            "kind": "method",
                            "name": "pay",
                            "parameters": [{"name": "gateway", "type": "Gateway"}],
                            "return_type": "Receipt"
                        }
                    ]
                },
                {"name": "Gateway", "kind": "protocol"},
                {"name": "Receipt", "kind": "struct"}
            ]
        }"#,
    );

    assert_eq!(names, vec!["Checkout", "Gateway"]);
}

#[test]
fn test_open_class_widens_but_public_class_does_not() {
    let names = mock_set_names(
        r#"{
            "path": "Sources/Analytics.swift",
            "types": [
                {
                    "name": "Analytics",
                    "kind": "protocol",
                    "comment": "/// mocksmith: AutoMockable",
                    "members": [
                        {
                            "kind": "method",
                            "name": "attach",
                            "parameters": [
                                {"name": "tracker", "type": "Tracker"},
                                {"name": "store", "type": "Store"}
                            ]
                        }
                    ]
                },
                {"name": "Tracker", "kind": "class", "access": "open"},
                {"name": "Store", "kind": "class", "access": "public"}
            ]
        }"#,
    );

    assert_eq!(names, vec!["Analytics", "Tracker"]);
}

#[test]
fn test_alias_resolved_references_widen() {
    let names = mock_set_names(
        r#"{
            "path": "Sources/Feed.swift",
            "aliases": [
                {"name": "Source", "target": "Gateway"}
            ],
            "types": [
                {
                    "name": "Feed",
                    "kind": "protocol",
                    "comment": "/// mocksmith: AutoMockable",
                    "members": [
                        {
                            "kind": "method",
                            "name": "refresh",
                            "parameters": [{"name": "from", "type": "Source"}]
                        }
                    ]
                },
                {"name": "Gateway", "kind": "protocol"}
            ]
        }"#,
    );

    assert_eq!(names, vec!["Feed", "Gateway"]);
}

#[test]
fn test_requirement_bounds_do_not_widen() {
    let names = mock_set_names(
        r#"{
            "path": "Sources/Batch.swift",
            "types": [
                {
                    "name": "Batch",
                    "kind": "protocol",
                    "comment": "/// mocksmith: AutoMockable",
                    "members": [
                        {
                            "kind": "method",
                            "name": "run",
                            "generic_parameters": [{"name": "T"}],
                            "generic_requirements": [
                                {"left": "T", "relation": "conformance", "right": "Job"}
                            ],
                            "parameters": [{"name": "value", "type": "T"}]
                        }
                    ]
                },
                {"name": "Job", "kind": "protocol"}
            ]
        }"#,
    );

    assert_eq!(names, vec!["Batch"]);
}

#[test]
fn test_property_and_associated_type_references_widen() {
    let names = mock_set_names(
        r#"{
            "path": "Sources/Session.swift",
            "types": [
                {
                    "name": "Session",
                    "kind": "protocol",
                    "comment": "/// mocksmith: AutoMockable",
                    "members": [
                        {"kind": "property", "name": "auth", "type": "Authenticator"},
                        {"kind": "associated_type", "name": "Transport", "inherited": ["Channel"]}
                    ]
                },
                {"name": "Authenticator", "kind": "protocol"},
                {"name": "Channel", "kind": "protocol"}
            ]
        }"#,
    );

    assert_eq!(names, vec!["Session", "Authenticator", "Channel"]);
}

#[test]
fn test_reference_cycle_reaches_fixed_point() {
    let names = mock_set_names(
        r#"{
            "path": "Sources/Pair.swift",
            "types": [
                {
                    "name": "Left",
                    "kind": "protocol",
                    "comment": "/// mocksmith: AutoMockable",
                    "members": [
                        {"kind": "method", "name": "other", "return_type": "Right"}
                    ]
                },
                {
                    "name": "Right",
                    "kind": "protocol",
                    "members": [
                        {"kind": "method", "name": "other", "return_type": "Left"}
                    ]
                }
            ]
        }"#,
    );

    assert_eq!(names, vec!["Left", "Right"]);
}

#[test]
fn test_set_orders_seeds_before_discoveries() {
    let names = mock_set_names(
        r#"{
            "path": "Sources/Many.swift",
            "types": [
                {
                    "name": "First",
                    "kind": "protocol",
                    "comment": "/// mocksmith: AutoMockable",
                    "members": [
                        {"kind": "method", "name": "helper", "return_type": "Found"}
                    ]
                },
                {"name": "Found", "kind": "protocol"},
                {
                    "name": "Second",
                    "kind": "protocol",
                    "comment": "/// mocksmith: AutoMockable"
                }
            ]
        }"#,
    );

    assert_eq!(names, vec!["First", "Second", "Found"]);
}

#[test]
fn test_annotation_on_struct_is_ignored() {
    let names = mock_set_names(
        r#"{
            "path": "Sources/Value.swift",
            "types": [
                {
                    "name": "Point",
                    "kind": "struct",
                    "comment": "/// mocksmith: AutoMockable"
                }
            ]
        }"#,
    );

    assert!(names.is_empty());
}

#[test]
fn test_static_member_references_do_not_widen() {
    let names = mock_set_names(
        r#"{
            "path": "Sources/Registry.swift",
            "types": [
                {
                    "name": "Registry",
                    "kind": "protocol",
                    "comment": "/// mocksmith: AutoMockable",
                    "members": [
                        {
                            "kind": "method",
                            "name": "shared",
                            "is_static": true,
                            "return_type": "Gateway"
                        }
                    ]
                },
                {"name": "Gateway", "kind": "protocol"}
            ]
        }"#,
    );

    assert_eq!(names, vec!["Registry"]);
}
