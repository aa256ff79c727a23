mod check;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::check::{CheckOptions, CheckStatus};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolves declarations and types of a serialized syntax tree
    Check {
        /// JSON file holding the syntax tree.
        tree: PathBuf,
        /// Only declare class fields and function parameters.
        #[arg(long)]
        members_only: bool,
        /// Print the scope tree after analysis.
        #[arg(long)]
        scopes: bool,
        /// Directory holding toyscript.toml, defaults to the tree's directory.
        #[arg(long)]
        config_dir: Option<PathBuf>,
    },
    /// Creates a toyscript.toml on the current working directory or on the specified path
    Init {
        /// The path to create the toyscript.toml file in.
        path: Option<PathBuf>,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Init { path } => match check::init(path.as_deref()) {
            Ok(path) => {
                println!("Initialised {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        },
        Commands::Check {
            tree,
            members_only,
            scopes,
            config_dir,
        } => {
            let options = CheckOptions {
                tree,
                members_only,
                scopes,
                config_dir,
            };
            match check::run(&options) {
                Ok(CheckStatus::Clean) => ExitCode::SUCCESS,
                Ok(CheckStatus::Diagnostics) => ExitCode::from(2),
                Err(e) => {
                    tracing::error!("check failed: {e}");
                    eprintln!("error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
