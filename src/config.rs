//! Project configuration.
//!
//! A project keeps a `mocksmith.json` next to its sources. Every relative
//! path inside it, and relative paths passed on the command line, resolve
//! against the configuration file's directory so the tool behaves the same
//! from any working directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::GenerateError;
use crate::io;

/// Default configuration file name, used when the command is pointed at a
/// directory instead of a file.
pub const CONFIG_FILENAME: &str = "mocksmith.json";

/// Default output file name, used when the output path is a directory.
pub const GENERATED_FILENAME: &str = "Mock.generated.swift";

/// File-level schema of `mocksmith.json`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Declaration roots whose types are eligible for mocking.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Extra declaration roots that feed the type graph without being
    /// mocked themselves.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Plain imports added to the generated file.
    #[serde(default)]
    pub imports: Vec<String>,
    /// `@testable` imports added to the generated file.
    #[serde(default)]
    pub testable_imports: Vec<String>,
    /// Output file or directory.
    #[serde(default)]
    pub output: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = io::read_file(path)?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse configuration: {}", path.display()))
    }
}

/// Applies the directory convention: pointing the command at a directory
/// means the `mocksmith.json` inside it.
pub fn resolve_config_path(argument: &Path) -> PathBuf {
    if argument.is_dir() {
        argument.join(CONFIG_FILENAME)
    } else {
        argument.to_path_buf()
    }
}

/// Directory that relative configuration paths resolve against.
pub fn config_root(config_path: &Path) -> &Path {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Command-line lists replace their configured counterparts entirely.
pub fn override_or<'a>(flag: &'a [String], configured: &'a [String]) -> &'a [String] {
    if flag.is_empty() {
        configured
    } else {
        flag
    }
}

/// Final output location. The command-line flag wins over the configured
/// path; both resolve against `root`, and a directory gets the default
/// file name appended.
pub fn resolve_output(
    root: &Path,
    flag: Option<&Path>,
    configured: Option<&str>,
) -> Result<PathBuf, GenerateError> {
    let raw = match (flag, configured) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(path)) => PathBuf::from(path),
        (None, None) => return Err(GenerateError::MissingOutput),
    };
    let resolved = root.join(raw);
    if resolved.is_dir() {
        Ok(resolved.join(GENERATED_FILENAME))
    } else {
        Ok(resolved)
    }
}
