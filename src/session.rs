//! UI-event glue: one quiz, one assistant and one chat log driven by discrete
//! user actions. Every action runs to completion before the next one.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::chat::{ChatLog, Sender};
use crate::config::AssistantConfig;
use crate::core::{Assistant, QuestionContextProvider};
use crate::error::QuizError;
use crate::quiz::{AnswerOutcome, Phase, QuizController};

pub type SharedQuiz = Arc<Mutex<QuizController>>;

pub const SENDING_NOTICE: &str = "sending to assistant...";

/// Verdict of a pre-send hook on one chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeforeSend {
    Allow,
    /// Drop the message; the assistant is not asked
    Block,
    /// Send this text instead of what the user typed
    Rewrite(String),
}

/// Runs after the user line is logged and before the assistant is asked,
/// e.g. to cap how many hints a round may use.
pub type BeforeSendHook = Box<dyn Fn(&str) -> BeforeSend + Send + Sync>;

pub struct Session {
    quiz: SharedQuiz,
    assistant: Assistant,
    log: ChatLog,
    before_send: Option<BeforeSendHook>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("quiz", &self.quiz)
            .field("assistant", &self.assistant)
            .field("log", &self.log)
            .field("before_send", &self.before_send.is_some())
            .finish()
    }
}

impl Session {
    /// Session over `quiz` with an assistant configured by `config`
    pub fn new(quiz: QuizController, config: &AssistantConfig) -> Self {
        let quiz: SharedQuiz = Arc::new(Mutex::new(quiz));
        let provider: Arc<dyn QuestionContextProvider> = quiz.clone();
        let assistant = Assistant::from_config(provider, config);
        Self::with_assistant(quiz, assistant)
    }

    /// Session with a caller-built assistant. The assistant should read its
    /// context from the same `quiz`.
    pub fn with_assistant(quiz: SharedQuiz, assistant: Assistant) -> Self {
        Self {
            quiz,
            assistant,
            log: ChatLog::new(),
            before_send: None,
        }
    }

    /// Install a hook that may block or rewrite chat messages
    #[must_use]
    pub fn with_before_send(mut self, hook: BeforeSendHook) -> Self {
        self.before_send = Some(hook);
        self
    }

    /// Read the quiz state. The lock is released when `f` returns, so it is
    /// never held while the assistant reads the current question.
    pub fn with_quiz<R>(&self, f: impl FnOnce(&QuizController) -> R) -> R {
        f(&self.quiz.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn score(&self) -> u32 {
        self.with_quiz(QuizController::score)
    }

    pub fn phase(&self) -> Phase {
        self.with_quiz(|quiz| quiz.phase().clone())
    }

    fn quiz_mut<R>(&mut self, f: impl FnOnce(&mut QuizController) -> R) -> R {
        f(&mut self.quiz.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn log(&self) -> &ChatLog {
        &self.log
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn start(&mut self, topic: &str) -> Result<(), QuizError> {
        self.quiz_mut(|quiz| quiz.start(topic))
    }

    pub fn submit_answer(&mut self, answer: &str) -> Result<AnswerOutcome, QuizError> {
        self.quiz_mut(|quiz| quiz.submit_answer(answer))
    }

    pub fn restart(&mut self) {
        self.quiz_mut(QuizController::restart);
    }

    /// Send a chat message. Blank input is ignored and leaves the log as is.
    /// Returns `None` when nothing was sent.
    pub async fn send_message(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring blank chat input");
            return None;
        }

        self.log.push(Sender::User, text);

        let message = match self.before_send.as_ref().map(|hook| hook(text)) {
            None | Some(BeforeSend::Allow) => text.to_string(),
            Some(BeforeSend::Rewrite(rewritten)) => {
                debug!(rewritten_len = rewritten.len(), "Pre-send hook rewrote message");
                rewritten
            }
            Some(BeforeSend::Block) => {
                info!("Pre-send hook blocked message");
                return None;
            }
        };

        self.log.push(Sender::System, SENDING_NOTICE);
        let reply = self.assistant.ask(&message).await;
        self.log.push(Sender::Assistant, reply.clone());
        Some(reply)
    }
}
