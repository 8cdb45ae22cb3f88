#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::collections::HashMap;
use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::BackendName;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    AdminToken,
    Backend,
    BackendTimeout,
    BackendURL,
    ConfigFile,
    ConnectRetries,
    ConnectRetryDelay,
    Identity,
    OutputDir,
    PollInterval,
}

/// Base directory for everything Empire writes locally (logs, profiles).
pub fn cache_dir() -> path::PathBuf {
    return dirs::cache_dir()
        .unwrap_or_else(|| return env::temp_dir())
        .join("empire");
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    /// Numeric config value, falling back to the default when unset or
    /// unparsable.
    pub fn get_u64(key: ConfigKey) -> u64 {
        if let Ok(val) = Config::get(key).parse::<u64>() {
            return val;
        }

        return Config::default(key).parse::<u64>().unwrap_or_default();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        #[cfg(not(target_os = "macos"))]
        let config_path = dirs::config_dir()
            .unwrap_or_else(|| return env::temp_dir())
            .join("empire/config.toml");
        #[cfg(target_os = "macos")]
        let config_path = path::PathBuf::from(env::var("HOME").unwrap_or_default())
            .join(".config/empire/config.toml");

        let output_dir = cache_dir().join("artifacts");
        let default_backend = BackendName::Http.to_string();

        let res = match key {
            ConfigKey::Backend => default_backend.as_str(),
            ConfigKey::BackendTimeout => "5000",
            ConfigKey::BackendURL => "http://localhost:4943",
            ConfigKey::ConnectRetries => "2",
            ConfigKey::ConnectRetryDelay => "1000",
            ConfigKey::OutputDir => output_dir.to_str().unwrap_or("./artifacts"),
            ConfigKey::PollInterval => "3000",

            // Special
            ConfigKey::AdminToken => "",
            ConfigKey::ConfigFile => config_path.to_str().unwrap_or("./config.toml"),
            ConfigKey::Identity => "",
        };

        return res.to_string();
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        // Resolved in full before anything is committed, so a bad file leaves
        // the current config untouched.
        let mut values = ConfigKey::iter()
            .map(|key| return (key, Config::default(key)))
            .collect::<HashMap<ConfigKey, String>>();

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    // Use clap value parsers to do validation.
                    let mut possible_values = vec![];
                    if let Some(arg) = cmd
                        .get_arguments()
                        .find(|e| return e.get_long() == Some(key.to_string().as_str()))
                    {
                        possible_values = arg
                            .get_possible_values()
                            .iter()
                            .map(|e| return e.get_name().to_string())
                            .collect::<Vec<String>>();
                    }

                    if let Some(val_int) = val.as_integer() {
                        values.insert(key, val_int.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        if !possible_values.is_empty()
                            && !possible_values.contains(&val_str.to_string())
                        {
                            bail!(format!(
                                "Config value {val_str} for {key} is invalid. Possible values: {}",
                                possible_values.join(", ")
                            ));
                        }
                        values.insert(key, val_str.to_string());
                    } else {
                        bail!(format!("Config value for {key} must be a string or an integer"));
                    }
                }
            }
        }

        // Command line flags and environment variables win over the file.
        for matches in clap_arg_matches.as_slice() {
            for key in ConfigKey::iter() {
                if key == ConfigKey::ConfigFile {
                    continue;
                }
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    values.insert(key, val.to_string());
                }
            }
        }

        for (key, val) in values {
            Config::set(key, &val);
        }

        tracing::debug!(
            backend = Config::get(ConfigKey::Backend),
            backend_url = Config::get(ConfigKey::BackendURL),
            identity = Config::get(ConfigKey::Identity),
            output_dir = Config::get(ConfigKey::OutputDir),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile || key == ConfigKey::AdminToken {
                    return None;
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg
                    .get_help()
                    .map(|help| return help.to_string())
                    .unwrap_or_default();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i32>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
