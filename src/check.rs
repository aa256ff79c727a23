use std::path::{Path, PathBuf};

use toy_config::Config;
use toy_semantic::AnnotatedTree;
use toy_syntax::SyntaxTree;

use crate::error::{CliError, Result};

pub struct CheckOptions {
    pub tree: PathBuf,
    pub members_only: bool,
    pub scopes: bool,
    pub config_dir: Option<PathBuf>,
}

/// Outcome of a `check` run, mapped to the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Clean,
    Diagnostics,
}

pub fn read_tree(path: &Path) -> Result<SyntaxTree> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| CliError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn effective_config(options: &CheckOptions) -> Config {
    let config_dir = options
        .config_dir
        .clone()
        .or_else(|| options.tree.parent().map(Path::to_path_buf));
    let mut config = toy_config::load_config(config_dir);

    if options.members_only {
        config.enter_local_variables = false;
    }
    if options.scopes {
        config.dump_scope_tree = true;
    }

    config
}

pub fn run(options: &CheckOptions) -> Result<CheckStatus> {
    let tree = read_tree(&options.tree)?;
    let config = effective_config(options);
    tracing::debug!(?config, nodes = tree.len(), "checking {}", options.tree.display());

    let annotated = toy_semantic::analyze(&tree, &config)?;
    report(&annotated, &config);

    if annotated.diagnostics().is_empty() {
        Ok(CheckStatus::Clean)
    } else {
        Ok(CheckStatus::Diagnostics)
    }
}

fn report(annotated: &AnnotatedTree, config: &Config) {
    for diagnostic in annotated.diagnostics() {
        println!("{diagnostic}");
    }

    if config.dump_scope_tree {
        print!("{}", annotated.scope_tree_string());
    }
}

pub fn init(path: Option<&Path>) -> Result<PathBuf> {
    let path = path.unwrap_or(Path::new(".")).join(toy_config::CONFIG_FILE);
    if path.exists() {
        return Err(CliError::AlreadyInitialised { path });
    }

    std::fs::write(&path, Config::default_toml()).map_err(|source| CliError::Write {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}
