//! Assistant core: the request payload, the quiz-context capability, the
//! remote-delegation client abstraction and the `Assistant` responder.
//!
//! Reply selection, in order:
//! - blank message → a prompt asking for input
//! - direct-answer-seeking message → fixed refusal (even with a remote client)
//! - remote client configured → its reply, if it produced a non-empty one
//! - otherwise the local heuristic (hint paraphrase or a generic study tip)

use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::clients::ClientType;
use crate::config::AssistantConfig;
use crate::error::ClientError;
use crate::heuristic::{is_direct_answer_request, LocalHeuristic, EMPTY_MESSAGE_PROMPT, REFUSAL};

/// The current question as seen by the assistant. All fields are empty when
/// no round is being played.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizContext {
    pub question: String,
    pub hint: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
}

impl QuizContext {
    pub fn new(question: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            hint: hint.into(),
            question_type: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.question.trim().is_empty() && self.hint.trim().is_empty()
    }
}

/// One assistant request. Serialized as the JSON body sent to the chat endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantPayload {
    pub message: String,
    #[serde(default)]
    pub quiz_question: String,
    #[serde(default)]
    pub quiz_hint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
}

impl AssistantPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.quiz_question = question.into();
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.quiz_hint = hint.into();
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: QuizContext) -> Self {
        self.quiz_question = context.question;
        self.quiz_hint = context.hint;
        self.question_type = context.question_type;
        self
    }
}

/// Read-only access to the question currently on screen.
pub trait QuestionContextProvider: Send + Sync + Debug {
    fn current_context(&self) -> QuizContext;
}

impl<T: QuestionContextProvider + ?Sized> QuestionContextProvider for Arc<T> {
    fn current_context(&self) -> QuizContext {
        self.as_ref().current_context()
    }
}

impl<T: QuestionContextProvider> QuestionContextProvider for Mutex<T> {
    fn current_context(&self) -> QuizContext {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current_context()
    }
}

/// Provider for an assistant that is used outside of any quiz
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContext;

impl QuestionContextProvider for NoContext {
    fn current_context(&self) -> QuizContext {
        QuizContext::default()
    }
}

/// Remote reply generator.
///
/// Implementors send the full payload somewhere and return the reply text.
/// Any error means "no remote answer"; the assistant never surfaces it.
#[async_trait]
pub trait ChatClient: Send + Sync + Debug {
    async fn ask(&self, payload: &AssistantPayload) -> Result<String, ClientError>;

    /// Clone this client into a boxed trait object
    fn clone_box(&self) -> Box<dyn ChatClient>;
}

impl Clone for Box<dyn ChatClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[async_trait]
impl ChatClient for Box<dyn ChatClient> {
    async fn ask(&self, payload: &AssistantPayload) -> Result<String, ClientError> {
        self.as_ref().ask(payload).await
    }

    fn clone_box(&self) -> Box<dyn ChatClient> {
        self.as_ref().clone_box()
    }
}

/// Computes chat replies from user input and quiz context.
#[derive(Debug)]
pub struct Assistant {
    provider: Arc<dyn QuestionContextProvider>,
    client: Option<Box<dyn ChatClient>>,
    heuristic: LocalHeuristic,
}

impl Assistant {
    /// Offline assistant reading quiz context from `provider`
    pub fn new(provider: Arc<dyn QuestionContextProvider>) -> Self {
        info!("Creating new offline Assistant");
        Self {
            provider,
            client: None,
            heuristic: LocalHeuristic::new(StdRng::from_entropy()),
        }
    }

    /// Assistant whose remote delegation follows `config`
    pub fn from_config(provider: Arc<dyn QuestionContextProvider>, config: &AssistantConfig) -> Self {
        let client_type = ClientType::from_config(config);
        info!(client = %client_type, "Creating new Assistant from config");
        Self {
            provider,
            client: client_type.build(config),
            heuristic: LocalHeuristic::new(StdRng::from_entropy()),
        }
    }

    /// Enable remote delegation through `client`
    #[must_use]
    pub fn with_client(mut self, client: Box<dyn ChatClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Disable remote delegation
    #[must_use]
    pub fn offline(mut self) -> Self {
        self.client = None;
        self
    }

    /// Replace the randomness used to pick generic study tips
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.heuristic = LocalHeuristic::new(rng);
        self
    }

    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn is_remote_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Reply to `message` about whatever question the provider reports
    pub async fn ask(&self, message: &str) -> String {
        let context = self.provider.current_context();
        self.respond(AssistantPayload::new(message).with_context(context))
            .await
    }

    /// Compute the reply for one request. Never fails and never returns an
    /// empty string.
    #[instrument(skip(self, payload), fields(message_len = payload.message.len(), remote = self.client.is_some()))]
    pub async fn respond(&self, payload: AssistantPayload) -> String {
        let message = payload.message.trim();
        if message.is_empty() {
            debug!("Empty message");
            return EMPTY_MESSAGE_PROMPT.to_string();
        }

        if is_direct_answer_request(message) {
            debug!("Refusing direct answer request");
            return REFUSAL.to_string();
        }

        if let Some(client) = &self.client {
            match client.ask(&payload).await {
                Ok(reply) if !reply.trim().is_empty() => {
                    debug!(reply_len = reply.len(), "Using remote reply");
                    return reply;
                }
                Ok(_) => warn!("Remote client returned an empty reply, using local heuristic"),
                Err(e) => warn!(error = %e, "Remote client unavailable, using local heuristic"),
            }
        }

        self.heuristic.reply(&payload)
    }
}
