use std::path::Path;

use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "toyscript.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Run the local-variable pass over function bodies after the members
    /// pass.
    pub enter_local_variables: bool,
    pub dump_scope_tree: bool,
    /// Name given to the root namespace of each compilation unit.
    pub namespace: String,
}

impl From<RawConfig> for Config {
    fn from(raw_config: RawConfig) -> Self {
        let default = Config::default();
        Self {
            enter_local_variables: raw_config
                .enter_local_variables
                .unwrap_or(default.enter_local_variables),
            dump_scope_tree: raw_config.dump_scope_tree.unwrap_or(default.dump_scope_tree),
            namespace: raw_config.namespace.unwrap_or(default.namespace),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RawConfig {
    enter_local_variables: Option<bool>,
    dump_scope_tree: Option<bool>,
    namespace: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enter_local_variables: true,
            dump_scope_tree: false,
            namespace: "global".into(),
        }
    }
}

impl Config {
    /// Contents written by `toyscript init`.
    pub fn default_toml() -> String {
        let default = Config::default();
        let raw = RawConfig {
            enter_local_variables: Some(default.enter_local_variables),
            dump_scope_tree: Some(default.dump_scope_tree),
            namespace: Some(default.namespace),
        };
        toml::to_string(&raw).unwrap_or_default()
    }
}

fn load_project_config<P: AsRef<Path>>(root_dir: P) -> Option<Config> {
    let config_path = root_dir.as_ref().join(CONFIG_FILE);
    if !config_path.exists() {
        return None;
    };

    let config = std::fs::read_to_string(config_path).ok()?;

    convert_from_toml(&config)
}

fn convert_from_toml(config: &str) -> Option<Config> {
    let raw_config: RawConfig = toml::from_str(config).ok()?;
    Some(raw_config.into())
}

pub fn load_config<P: AsRef<Path>>(root_dir: Option<P>) -> Config {
    match root_dir {
        Some(root_dir) => load_project_config(root_dir).unwrap_or_default(),
        None => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = convert_from_toml("dump_scope_tree = true").unwrap();
        assert!(config.dump_scope_tree);
        assert!(config.enter_local_variables);
        assert_eq!(config.namespace, "global");
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert_eq!(convert_from_toml("enter_local_variables = 3"), None);
    }

    #[test]
    fn test_default_toml_round_trips() {
        let config = convert_from_toml(&Config::default_toml()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_project_dir_falls_back() {
        let config = load_config(Some("/definitely/not/a/project"));
        assert_eq!(config, Config::default());
        assert_eq!(load_config(None::<&str>), Config::default());
    }
}
