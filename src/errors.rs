//! Generation failure taxonomy.
//!
//! Most per-file problems are recovered in place with a logged warning so
//! one malformed declaration dump cannot sink a whole run. The variants
//! here are the conditions that leave nothing sensible to generate.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    /// The configured sources matched no readable declaration files.
    #[error("no declaration files found under the configured sources")]
    NoInputFiles,

    /// Neither the command line nor the configuration named an output path.
    #[error("the output path is missing; pass --output or set the `output` configuration field")]
    MissingOutput,
}
