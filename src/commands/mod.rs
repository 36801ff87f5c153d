//! Command implementations behind the CLI.

pub mod generate;

pub use generate::{handle_generate, GenerateParams};
