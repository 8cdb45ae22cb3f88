use std::fs;

use anyhow::Result;
use tempdir::TempDir;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

#[test]
fn it_serializes_to_valid_toml() {
    let res = Config::serialize_default(cli::build());
    let toml_res = res.parse::<toml_edit::Document>();
    assert!(toml_res.is_ok());

    assert!(res.contains("backend = \"http\""));
    assert!(res.contains("connect-retries = 2"));
    assert!(res.contains("# identity = \"\""));
    assert!(!res.contains("admin-token"));
}

#[tokio::test]
async fn it_loads_config_from_file_and_lets_flags_win() -> Result<()> {
    let tmp_dir = TempDir::new("empire-config")?;
    let config_path = tmp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "backend = \"memory\"\nbackend-url = \"http://file.local\"\npoll-interval = 500\n",
    )?;

    let matches = cli::build().try_get_matches_from(vec![
        "empire",
        "-c",
        config_path.to_str().unwrap(),
        "--backend-url",
        "http://flag.local",
        "providers",
        "list",
    ])?;
    Config::load(cli::build(), vec![&matches]).await?;

    assert_eq!(Config::get(ConfigKey::Backend), "memory");
    assert_eq!(Config::get(ConfigKey::BackendURL), "http://flag.local");
    assert_eq!(Config::get(ConfigKey::PollInterval), "500");
    assert_eq!(Config::get_u64(ConfigKey::PollInterval), 500);
    return Ok(());
}

#[tokio::test]
async fn it_fails_to_load_config_with_invalid_backend() -> Result<()> {
    let tmp_dir = TempDir::new("empire-config")?;
    let config_path = tmp_dir.path().join("bad-config.toml");
    fs::write(&config_path, "backend = \"carrier-pigeon\"\n")?;

    let matches = cli::build().try_get_matches_from(vec![
        "empire",
        "-c",
        config_path.to_str().unwrap(),
        "providers",
        "list",
    ])?;
    let res = Config::load(cli::build(), vec![&matches]).await;
    assert!(res.is_err());
    return Ok(());
}

#[test]
fn it_names_keys_in_kebab_case() {
    assert_eq!(ConfigKey::BackendURL.to_string(), "backend-url");
    assert_eq!(ConfigKey::ConnectRetryDelay.to_string(), "connect-retry-delay");
}
