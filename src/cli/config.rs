use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::session::{FileSessionStore, Session};
use crate::client::ApiClient;
use crate::config;

/// Per-user CLI state kept next to the session file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Overrides the configured backend URL when set
    pub server_url: Option<String>,
    pub current_user: Option<String>,
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("PROEDUC_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("proeduc").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn session_file() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join("session.json"))
}

pub fn load_environment_config() -> anyhow::Result<EnvironmentConfig> {
    let env_file = get_config_dir()?.join("env.json");

    if !env_file.exists() {
        return Ok(EnvironmentConfig::default());
    }

    let content = fs::read_to_string(env_file)?;
    let config: EnvironmentConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_environment_config(config: &EnvironmentConfig) -> anyhow::Result<()> {
    let env_file = get_config_dir()?.join("env.json");

    let content = serde_json::to_string_pretty(config)?;
    fs::write(env_file, content)?;
    Ok(())
}

pub fn open_session() -> anyhow::Result<Session> {
    let store = FileSessionStore::new(session_file()?);
    Ok(Session::new(Arc::new(store)))
}

/// Backend URL: CLI override first, then the environment-driven config
pub fn server_url() -> anyhow::Result<String> {
    let env_config = load_environment_config()?;
    Ok(env_config
        .server_url
        .unwrap_or_else(|| config::config().api.server_url.clone()))
}

pub fn build_client() -> anyhow::Result<ApiClient> {
    let session = open_session()?;
    let client = ApiClient::new(&server_url()?, session)?;
    Ok(client)
}
