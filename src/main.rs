use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use mocksmith::cli::{Cli, Commands};
use mocksmith::commands::{handle_generate, GenerateParams};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            sources,
            imports,
            testable_imports,
            output,
        } => handle_generate(GenerateParams {
            config_path: config,
            sources,
            imports,
            testable_imports,
            output,
        }),
    }
}
