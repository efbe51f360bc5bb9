mod commands;
mod manifest;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wirec_codegen::Engine;

use commands::graph::GraphFormat;
use manifest::Manifest;

#[derive(Parser)]
#[command(name = "wirec")]
#[command(about = "Compile-time dependency-injection wiring with fingerprinted artifact caching")]
#[command(version)]
struct Cli {
    /// Project directory containing wirec.toml
    #[arg(long, short = 'C', default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the project and print the diagnostic report
    Analyze {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the registry; exits non-zero on errors
    Validate {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the dependency chain rooted at a token
    Trace {
        /// Registration token to start from
        token: String,
    },

    /// Dump the dependency graph
    Graph {
        /// Output format
        #[arg(long, value_enum, default_value = "dot")]
        format: GraphFormat,
    },

    /// Run one full generation pass
    Generate {
        /// Delete the artifact directory and rebuild unconditionally
        #[arg(long)]
        force: bool,
    },

    /// Watch scan roots and regenerate on changes
    Serve,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    let dir = std::path::absolute(&cli.dir)?;
    let mut options = Manifest::load(&dir)?.into_options(&dir);
    tracing::debug!(project = %options.project, dir = %dir.display(), "manifest loaded");

    match cli.command {
        Commands::Analyze { json } => {
            commands::analyze::run(&Engine::new(options), json)?;
        }
        Commands::Validate { json } => {
            if !commands::validate::run(&Engine::new(options), json)? {
                std::process::exit(1);
            }
        }
        Commands::Trace { token } => {
            commands::trace::run(&Engine::new(options), &token)?;
        }
        Commands::Graph { format } => {
            commands::graph::run(&Engine::new(options), format)?;
        }
        Commands::Generate { force } => {
            options.force_regenerate = force;
            commands::generate::run(&Engine::new(options))?;
        }
        Commands::Serve => {
            commands::serve::run(Engine::new(options))?;
        }
    }
    Ok(())
}
