use thiserror::Error;

/// Failures of the remote chat endpoint. The assistant treats all of them as
/// "no remote answer" and falls back to the local heuristic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Chat endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed response body: {0}")]
    MalformedBody(String),
    #[error("Chat endpoint returned an empty reply")]
    EmptyReply,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("Unknown topic: '{0}'")]
    UnknownTopic(String),
    #[error("No quiz round is being played")]
    NotPlaying,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid boolean for {name}: '{value}'")]
    InvalidFlag { name: &'static str, value: String },
    #[error("Invalid timeout for {name}: '{value}'")]
    InvalidTimeout { name: &'static str, value: String },
}
