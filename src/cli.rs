//! Command line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mocksmith")]
#[command(about = "Mock generator for statically typed interface declarations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the mock source file for a configured project
    #[command(visible_alias = "gen")]
    Generate {
        /// Configuration file, or a directory containing `mocksmith.json`
        #[arg(default_value = ".")]
        config: PathBuf,

        /// Declaration roots to read, replacing the configured sources
        #[arg(long, value_delimiter = ',')]
        sources: Vec<String>,

        /// Imports for the generated file, replacing the configured list
        #[arg(long, value_delimiter = ',')]
        imports: Vec<String>,

        /// `@testable` imports, replacing the configured list
        #[arg(long, value_delimiter = ',')]
        testable_imports: Vec<String>,

        /// Output file, or a directory for the default `Mock.generated.swift`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
