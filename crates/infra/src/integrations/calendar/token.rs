//! Access token sources for the calendar API

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use autojoin_domain::{AutoJoinError, CalendarConfig, Result};

/// Supplies a bearer token for each calendar request
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// A fixed token from configuration
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// A token file re-read on every request, so an external helper can rotate
/// it without restarting the daemon.
pub struct FileTokenProvider {
    path: PathBuf,
}

impl FileTokenProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AccessTokenProvider for FileTokenProvider {
    async fn access_token(&self) -> Result<String> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AutoJoinError::Auth(format!("cannot read token file {}: {e}", self.path.display()))
        })?;
        let token = contents.trim();
        if token.is_empty() {
            return Err(AutoJoinError::Auth(format!(
                "token file {} is empty",
                self.path.display()
            )));
        }
        Ok(token.to_string())
    }
}

/// Pick the token source configured for the calendar, if any.
///
/// An inline `access_token` wins over `token_file`.
pub fn token_provider_from_config(
    config: &CalendarConfig,
) -> Option<Arc<dyn AccessTokenProvider>> {
    if let Some(token) = config.access_token.as_deref().filter(|t| !t.trim().is_empty()) {
        return Some(Arc::new(StaticTokenProvider::new(token.trim())));
    }
    config
        .token_file
        .as_deref()
        .map(|path| Arc::new(FileTokenProvider::new(path)) as Arc<dyn AccessTokenProvider>)
}
