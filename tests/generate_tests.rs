//! Generate command end-to-end against real directories.

use mocksmith::commands::{handle_generate, GenerateParams};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn checkout_dump() -> &'static str {
    r#"{
        "path": "Sources/Checkout.swift",
        "types": [
            {
                "name": "Checkout",
                "kind": "protocol",
                "access": "public",
                "comment": "/// mocksmith: AutoMockable",
                "members": [
                    {
                        "kind": "method",
                        "name": "pay",
                        "access": "public",
                        "parameters": [
                            {"label": "with", "name": "gateway", "type": "Gateway"}
                        ]
                    }
                ]
            }
        ]
    }"#
}

#[test]
fn test_dependency_types_widen_but_do_not_seed() {
    let project = TempDir::new().unwrap();
    write(
        &project.path().join("mocksmith.json"),
        r#"{"sources": ["decls"], "dependencies": ["sdk"], "output": "Mocks.swift"}"#,
    );
    write(&project.path().join("decls/checkout.json"), checkout_dump());
    write(
        &project.path().join("sdk/gateway.json"),
        r#"{
            "path": "SDK/Gateway.swift",
            "types": [
                {
                    "name": "Gateway",
                    "kind": "protocol",
                    "access": "public",
                    "members": [
                        {"kind": "method", "name": "charge", "access": "public"}
                    ]
                },
                {
                    "name": "Ledger",
                    "kind": "protocol",
                    "access": "public",
                    "comment": "/// mocksmith: AutoMockable"
                }
            ]
        }"#,
    );

    handle_generate(GenerateParams {
        config_path: project.path().join("mocksmith.json"),
        ..GenerateParams::default()
    })
    .unwrap();

    let output = fs::read_to_string(project.path().join("Mocks.swift")).unwrap();
    assert!(output.contains("public final class CheckoutMock: Checkout, Mock {"));
    // Referenced from a source signature, so the dependency type is mocked.
    assert!(output.contains("public final class GatewayMock: Gateway, Mock {"));
    // Its own annotation was stripped, so it cannot seed.
    assert!(!output.contains("LedgerMock"));
}

#[test]
fn test_imports_flag_replaces_configured_imports() {
    let project = TempDir::new().unwrap();
    write(
        &project.path().join("mocksmith.json"),
        r#"{"sources": ["decls"], "imports": ["Alpha"], "output": "Mocks.swift"}"#,
    );
    write(&project.path().join("decls/checkout.json"), checkout_dump());

    handle_generate(GenerateParams {
        config_path: project.path().join("mocksmith.json"),
        imports: vec!["Combine".to_string()],
        ..GenerateParams::default()
    })
    .unwrap();

    let output = fs::read_to_string(project.path().join("Mocks.swift")).unwrap();
    assert!(output.contains("import Combine"));
    assert!(!output.contains("import Alpha"));
}

#[test]
fn test_regeneration_overwrites_previous_output() {
    let project = TempDir::new().unwrap();
    write(
        &project.path().join("mocksmith.json"),
        r#"{"sources": ["decls"], "output": "Mocks.swift"}"#,
    );
    write(&project.path().join("decls/checkout.json"), checkout_dump());
    let params = || GenerateParams {
        config_path: project.path().join("mocksmith.json"),
        ..GenerateParams::default()
    };

    handle_generate(params()).unwrap();
    let first = fs::read_to_string(project.path().join("Mocks.swift")).unwrap();
    handle_generate(params()).unwrap();
    let second = fs::read_to_string(project.path().join("Mocks.swift")).unwrap();

    assert_eq!(first, second);
}
