//! The generate command: configuration in, one generated mock file out.

use anyhow::Result;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{config_root, override_or, resolve_config_path, resolve_output, Config};
use crate::errors::GenerateError;
use crate::io;
use crate::mock_set::resolve_mock_set;
use crate::model::build_model;
use crate::resolve::resolve_hierarchy;
use crate::synth::render_mock_file;
use crate::syntax::{SourceFile, TypeDecl};

/// Arguments to [`handle_generate`], mirroring the CLI surface.
#[derive(Debug, Default)]
pub struct GenerateParams {
    pub config_path: PathBuf,
    pub sources: Vec<String>,
    pub imports: Vec<String>,
    pub testable_imports: Vec<String>,
    pub output: Option<PathBuf>,
}

pub fn handle_generate(params: GenerateParams) -> Result<()> {
    let start = Instant::now();

    let config_path = resolve_config_path(&params.config_path);
    let config = Config::load(&config_path)?;
    let root = config_root(&config_path);

    let source_roots = resolve_roots(root, override_or(&params.sources, &config.sources));
    let dependency_roots = resolve_roots(root, &config.dependencies);
    let output = resolve_output(root, params.output.as_deref(), config.output.as_deref())?;

    let mut files = load_declaration_roots(&source_roots)?;
    if files.is_empty() {
        return Err(GenerateError::NoInputFiles.into());
    }

    let mut dependency_files = load_declaration_roots(&dependency_roots)?;
    for file in &mut dependency_files {
        strip_annotations(file);
    }
    debug!(
        "Loaded {} source and {} dependency declaration files",
        files.len(),
        dependency_files.len()
    );
    files.append(&mut dependency_files);

    let raw = build_model(&files);
    let model = resolve_hierarchy(raw);
    let targets = resolve_mock_set(&model);

    let rendered = render_mock_file(
        &targets,
        &model,
        override_or(&params.imports, &config.imports),
        override_or(&params.testable_imports, &config.testable_imports),
    );
    io::write_file(&output, &rendered)?;

    info!(
        "Generated {} mock(s) to {} in {:.2}s",
        targets.len(),
        output.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Joins relative entries onto the configuration root; absolute entries
/// stand as written.
fn resolve_roots(root: &Path, entries: &[String]) -> Vec<PathBuf> {
    entries.iter().map(|entry| root.join(entry)).collect()
}

/// Reads every declaration file under the roots in parallel. A file that
/// fails to read or decode is skipped with a warning so one bad dump does
/// not sink the run.
fn load_declaration_roots(roots: &[PathBuf]) -> Result<Vec<SourceFile>> {
    let paths = io::find_declaration_files(roots)?;
    let files = paths
        .par_iter()
        .filter_map(|path| match io::load_declarations(path) {
            Ok(file) => Some(file),
            Err(error) => {
                warn!("Skipping {}: {:#}", path.display(), error);
                None
            }
        })
        .collect();
    Ok(files)
}

/// Pragmas in dependency dumps never seed generation here.
fn strip_annotations(file: &mut SourceFile) {
    for decl in &mut file.types {
        strip_type_annotations(decl);
    }
}

fn strip_type_annotations(decl: &mut TypeDecl) {
    decl.comment = None;
    for nested in &mut decl.nested {
        strip_type_annotations(nested);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn api_dump() -> &'static str {
        r#"{
            "path": "Sources/Api.swift",
            "types": [
                {
                    "name": "Api",
                    "kind": "protocol",
                    "access": "public",
                    "comment": "/// mocksmith: AutoMockable",
                    "members": [
                        {"kind": "method", "name": "ping"}
                    ]
                }
            ]
        }"#
    }

    fn params(project: &Path) -> GenerateParams {
        GenerateParams {
            config_path: project.to_path_buf(),
            ..GenerateParams::default()
        }
    }

    #[test]
    fn test_generate_writes_mock_file() {
        let project = TempDir::new().unwrap();
        write(
            &project.path().join("mocksmith.json"),
            r#"{"sources": ["decls"], "output": "Mocks.swift", "testable_imports": ["App"]}"#,
        );
        write(&project.path().join("decls/api.json"), api_dump());

        handle_generate(params(project.path())).unwrap();

        let output = fs::read_to_string(project.path().join("Mocks.swift")).unwrap();
        assert!(output.contains("// Generated by Mocksmith. DO NOT EDIT!"));
        assert!(output.contains("@testable import App"));
        assert!(output.contains("public final class ApiMock: Api, Mock {"));
        assert!(output.contains("public func ping()"));
    }

    #[test]
    fn test_generate_output_directory_gets_default_name() {
        let project = TempDir::new().unwrap();
        write(
            &project.path().join("mocksmith.json"),
            r#"{"sources": ["decls"], "output": "."}"#,
        );
        write(&project.path().join("decls/api.json"), api_dump());

        handle_generate(params(project.path())).unwrap();

        assert!(project.path().join("Mock.generated.swift").is_file());
    }

    #[test]
    fn test_generate_without_output_fails() {
        let project = TempDir::new().unwrap();
        write(&project.path().join("mocksmith.json"), r#"{"sources": ["decls"]}"#);
        write(&project.path().join("decls/api.json"), api_dump());

        let error = handle_generate(params(project.path())).unwrap_err();

        assert_eq!(
            error.downcast_ref::<GenerateError>(),
            Some(&GenerateError::MissingOutput)
        );
    }

    #[test]
    fn test_generate_without_declaration_files_fails() {
        let project = TempDir::new().unwrap();
        write(
            &project.path().join("mocksmith.json"),
            r#"{"sources": ["decls"], "output": "Mocks.swift"}"#,
        );
        fs::create_dir_all(project.path().join("decls")).unwrap();

        let error = handle_generate(params(project.path())).unwrap_err();

        assert_eq!(
            error.downcast_ref::<GenerateError>(),
            Some(&GenerateError::NoInputFiles)
        );
    }

    #[test]
    fn test_generate_skips_malformed_dump() {
        let project = TempDir::new().unwrap();
        write(
            &project.path().join("mocksmith.json"),
            r#"{"sources": ["decls"], "output": "Mocks.swift"}"#,
        );
        write(&project.path().join("decls/api.json"), api_dump());
        write(&project.path().join("decls/broken.json"), "{not json");

        handle_generate(params(project.path())).unwrap();

        let output = fs::read_to_string(project.path().join("Mocks.swift")).unwrap();
        assert!(output.contains("class ApiMock"));
    }

    #[test]
    fn test_generate_ignores_annotations_in_dependencies() {
        let project = TempDir::new().unwrap();
        write(
            &project.path().join("mocksmith.json"),
            r#"{"sources": ["decls"], "dependencies": ["sdk"], "output": "Mocks.swift"}"#,
        );
        write(&project.path().join("decls/api.json"), api_dump());
        write(
            &project.path().join("sdk/vendor.json"),
            r#"{
                "path": "SDK/Vendor.swift",
                "types": [
                    {
                        "name": "Vendored",
                        "kind": "protocol",
                        "comment": "/// mocksmith: AutoMockable"
                    }
                ]
            }"#,
        );

        handle_generate(params(project.path())).unwrap();

        let output = fs::read_to_string(project.path().join("Mocks.swift")).unwrap();
        assert!(output.contains("class ApiMock"));
        assert!(!output.contains("VendoredMock"));
    }

    #[test]
    fn test_generate_sources_flag_replaces_configured_sources() {
        let project = TempDir::new().unwrap();
        write(
            &project.path().join("mocksmith.json"),
            r#"{"sources": ["decls"], "output": "Mocks.swift"}"#,
        );
        write(&project.path().join("decls/api.json"), api_dump());
        write(
            &project.path().join("other/service.json"),
            r#"{
                "path": "Sources/Service.swift",
                "types": [
                    {
                        "name": "Service",
                        "kind": "protocol",
                        "comment": "/// mocksmith: AutoMockable"
                    }
                ]
            }"#,
        );

        let mut params = params(project.path());
        params.sources = vec!["other".to_string()];
        handle_generate(params).unwrap();

        let output = fs::read_to_string(project.path().join("Mocks.swift")).unwrap();
        assert!(output.contains("class ServiceMock"));
        assert!(!output.contains("class ApiMock"));
    }
}
