//! Declaration file discovery.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension the frontend gives its declaration dumps.
const DECLARATION_EXTENSION: &str = "json";

/// Files carrying this suffix are prior generator output and never count
/// as input, even when a dump directory contains them.
const GENERATED_SUFFIX: &str = ".generated.json";

/// Recursive walker over the configured declaration roots.
pub struct DeclarationWalker {
    roots: Vec<PathBuf>,
}

impl DeclarationWalker {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Collects every declaration file under the roots, sorted and
    /// deduplicated. A root that is itself a file is taken as given,
    /// subject to the same filtering as walked entries.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for root in &self.roots {
            if root.is_file() {
                files.push(root.clone());
                continue;
            }
            for entry in WalkDir::new(root).follow_links(true) {
                let entry = entry.with_context(|| {
                    format!("Failed to walk declaration root: {}", root.display())
                })?;
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
        }

        files.retain(|path| is_declaration_file(path));
        files.sort();
        files.dedup();
        Ok(files)
    }
}

/// Convenience wrapper for the common one-shot walk.
pub fn find_declaration_files(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    DeclarationWalker::new(roots.to_vec()).walk()
}

fn is_declaration_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    if name.ends_with(GENERATED_SUFFIX) {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DECLARATION_EXTENSION))
}
