pub mod http;
pub mod mock;

pub use http::*;
pub use mock::*;

use crate::config::AssistantConfig;
use crate::core::ChatClient;

/// Which remote client the assistant delegates to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    /// No remote delegation; local heuristic only
    Offline,
    Http,
}

impl ClientType {
    pub fn from_config(config: &AssistantConfig) -> Self {
        if config.use_backend {
            Self::Http
        } else {
            Self::Offline
        }
    }

    pub fn build(self, config: &AssistantConfig) -> Option<Box<dyn ChatClient>> {
        match self {
            Self::Offline => None,
            Self::Http => Some(Box::new(HttpClient::new(config))),
        }
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientType::Offline => write!(f, "offline"),
            ClientType::Http => write!(f, "http"),
        }
    }
}
