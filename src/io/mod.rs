//! Filesystem plumbing: declaration discovery, reading, and output writing.

pub mod walker;

pub use walker::{find_declaration_files, DeclarationWalker};

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::syntax::SourceFile;

pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Writes `content`, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

/// Reads and decodes one declaration dump.
pub fn load_declarations(path: &Path) -> Result<SourceFile> {
    let text = read_file(path)?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse declarations: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_write_file_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/mocks/Mock.generated.swift");

        write_file(&path, "// generated\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "// generated\n");
    }

    #[test]
    fn test_load_declarations_decodes_dump() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api.json");
        fs::write(
            &path,
            r#"{"path": "Sources/Api.swift", "types": [{"name": "Api", "kind": "protocol"}]}"#,
        )
        .unwrap();

        let file = load_declarations(&path).unwrap();

        assert_eq!(file.types.len(), 1);
        assert_eq!(file.types[0].name, "Api");
    }

    #[test]
    fn test_load_declarations_reports_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let error = load_declarations(&path).unwrap_err();

        assert!(error.to_string().contains("Failed to parse declarations"));
    }
}
