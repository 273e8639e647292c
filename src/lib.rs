pub mod chat;
pub mod clients;
pub mod config;
pub mod core;
pub mod error;
pub mod heuristic;
pub mod quiz;
pub mod session;

// Convenient re-exports
pub use crate::core::{Assistant, AssistantPayload, ChatClient, NoContext, QuestionContextProvider, QuizContext};
pub use config::AssistantConfig;
pub use quiz::QuizController;
pub use session::Session;
