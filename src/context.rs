use std::sync::Arc;

use crate::database::Store;
use crate::error::Result;
use crate::models::Settings;
use crate::services::anthropic::AnthropicAnalyzer;
use crate::services::capabilities::{ContentAnalyzer, MessageSource};
use crate::services::gmail::GmailSource;

/// Everything an operation needs: storage, the two external capabilities
/// and the settings they were built from.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<Store>,
    pub source: Arc<dyn MessageSource>,
    pub analyzer: Arc<dyn ContentAnalyzer>,
    pub settings: Settings,
}

impl AppContext {
    pub fn new(
        store: Arc<Store>,
        source: Arc<dyn MessageSource>,
        analyzer: Arc<dyn ContentAnalyzer>,
        settings: Settings,
    ) -> Self {
        Self {
            store,
            source,
            analyzer,
            settings,
        }
    }

    /// Context backed by Gmail, the Anthropic API and the configured database file.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let store = Store::open(std::path::Path::new(&settings.storage.database_path))?;
        let source = GmailSource::new(&settings.mail)?;
        let analyzer = AnthropicAnalyzer::new(&settings.ai)?;
        Ok(Self::new(
            Arc::new(store),
            Arc::new(source),
            Arc::new(analyzer),
            settings,
        ))
    }
}
