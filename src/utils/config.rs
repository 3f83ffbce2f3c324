use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::models::Settings;

const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";
const ENV_MAIL_TOKEN: &str = "GMAIL_ACCESS_TOKEN";
const ENV_CONFIG_PATH: &str = "MAILMIND_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "mailmind.json";

pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn api_key_from_env() -> Option<String> {
    env_value(ENV_API_KEY)
}

pub fn mail_token_from_env() -> Option<String> {
    env_value(ENV_MAIL_TOKEN)
}

/// Secrets left blank in the settings file are taken from the environment.
pub fn apply_env_defaults(settings: &mut Settings) {
    if settings.ai.api_key.trim().is_empty() {
        settings.ai.api_key = api_key_from_env().unwrap_or_default();
    }
    if settings.mail.access_token.trim().is_empty() {
        settings.mail.access_token = mail_token_from_env().unwrap_or_default();
    }
}

pub fn config_path() -> PathBuf {
    env_value(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Reads settings from `path`; a missing file yields the defaults.
pub fn read_settings(path: &Path) -> Result<Settings> {
    let mut settings = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str::<Settings>(&content)
            .with_context(|| format!("invalid settings in {}", path.display()))?
    } else {
        log::debug!("no settings file at {}, using defaults", path.display());
        Settings::default()
    };
    apply_env_defaults(&mut settings);
    Ok(settings)
}

pub fn write_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Write the default settings to `path`, refusing to overwrite a file.
/// Secrets stay blank so they keep coming from the environment.
pub fn init_settings(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    write_settings(path, &Settings::default())
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("wrote default settings to {}", path.display());
    Ok(())
}
