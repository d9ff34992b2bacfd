use std::sync::Arc;
use std::time::Duration;

use crate::chat::{ChatBackend, ChatService, ChatStore};
use crate::config::Config;
use crate::osdr::OsdrLinks;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http_client: reqwest::Client,
    pub links: Arc<OsdrLinks>,
    pub chat: Arc<ChatService>,
}

impl AppState {
    /// Fails on an HTTP client build error or an unknown chat backend.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()?;

        let backend = ChatBackend::from_config(&config, http_client.clone())?;
        let links = OsdrLinks::from_config(&config);

        Ok(Self {
            config: Arc::new(config),
            http_client,
            links: Arc::new(links),
            chat: Arc::new(ChatService::new(ChatStore::new(), backend)),
        })
    }

    pub fn osdr_timeout(&self) -> Duration {
        Duration::from_secs(self.config.osdr.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_defaults() {
        let state = AppState::new(Config::default()).unwrap();
        assert_eq!(state.chat.backend_name(), "dummy");
        assert_eq!(state.osdr_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_unknown_backend_is_fatal() {
        let mut config = Config::default();
        config.chat.backend = "nope".into();
        assert!(AppState::new(config).is_err());
    }
}
