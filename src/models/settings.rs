use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub ai: AISettings,
    #[serde(default)]
    pub mail: MailSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Cap on the first sync for a user, which has no lower time bound.
    pub initial_limit: usize,
    /// Cap on catch-up syncs bounded by the previous sync time.
    pub incremental_limit: usize,
    /// Messages fetched and analyzed at the same time.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            initial_limit: 30,
            incremental_limit: 100,
            max_concurrency: default_max_concurrency(),
        }
    }
}

fn default_max_concurrency() -> usize {
    8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AISettings {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
}

impl Default for AISettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "claude-3-opus-20240229".to_string(),
            max_tokens: 300,
            base_url: "https://api.anthropic.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailSettings {
    pub access_token: String,
    pub base_url: String,
    pub user_id: String,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            base_url: "https://gmail.googleapis.com/gmail/v1".to_string(),
            user_id: "me".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    pub database_path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: "mailmind.db".to_string(),
        }
    }
}
