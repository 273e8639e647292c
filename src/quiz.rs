//! Quiz progression and scoring over a small fixed question bank.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{QuestionContextProvider, QuizContext};
use crate::error::QuizError;

pub const POINTS_PER_CORRECT: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub answer: String,
    pub hint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
}

impl Question {
    pub fn new(text: impl Into<String>, answer: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            answer: answer.into(),
            hint: hint.into(),
            question_type: None,
        }
    }

    /// Trimmed, case-insensitive exact match. No fuzzy matching.
    pub fn is_correct(&self, answer: &str) -> bool {
        answer.trim().to_lowercase() == self.answer.trim().to_lowercase()
    }

    fn context(&self) -> QuizContext {
        QuizContext {
            question: self.text.clone(),
            hint: self.hint.clone(),
            question_type: self.question_type.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub questions: Vec<Question>,
}

impl Topic {
    pub fn new(name: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            name: name.into(),
            questions,
        }
    }
}

/// The two topics the game ships with
pub fn builtin_topics() -> Vec<Topic> {
    vec![
        Topic::new(
            "circulatory",
            vec![
                Question::new(
                    "What is the main function of red blood cells?",
                    "transport oxygen",
                    "Think about oxygen transport.",
                ),
                Question::new(
                    "Which organ pumps blood throughout the body?",
                    "heart",
                    "It's the main circulatory organ.",
                ),
            ],
        ),
        Topic::new(
            "digestive",
            vec![
                Question::new(
                    "Which organ breaks down food chemically?",
                    "stomach",
                    "It uses acids and enzymes.",
                ),
                Question::new(
                    "Where does nutrient absorption mainly occur?",
                    "small intestine",
                    "Long, coiled tube.",
                ),
            ],
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Playing { topic: usize, index: usize },
    Finished,
}

/// Result of one submitted answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub points_awarded: u32,
    /// Hint of the answered question, shown after a wrong answer
    pub hint: Option<String>,
    pub score: u32,
    /// The round ended with this answer
    pub finished: bool,
}

/// Owns the current topic, question index and score.
#[derive(Debug, Clone)]
pub struct QuizController {
    topics: Vec<Topic>,
    phase: Phase,
    score: u32,
}

impl Default for QuizController {
    fn default() -> Self {
        Self::new(builtin_topics())
    }
}

impl QuizController {
    pub fn new(topics: Vec<Topic>) -> Self {
        Self {
            topics,
            phase: Phase::Menu,
            score: 0,
        }
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|t| t.name.as_str())
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.phase, Phase::Playing { .. })
    }

    /// Begin a round on `topic`, resetting index and score
    pub fn start(&mut self, topic: &str) -> Result<(), QuizError> {
        let topic_idx = self
            .topics
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(topic.trim()))
            .ok_or_else(|| QuizError::UnknownTopic(topic.to_string()))?;

        self.score = 0;
        self.phase = if self.topics[topic_idx].questions.is_empty() {
            Phase::Finished
        } else {
            Phase::Playing {
                topic: topic_idx,
                index: 0,
            }
        };
        info!(topic = %self.topics[topic_idx].name, "Quiz round started");
        Ok(())
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::Playing { topic, index } => self.topics.get(topic)?.questions.get(index),
            _ => None,
        }
    }

    /// Context for the assistant; empty unless a round is being played
    pub fn current_context(&self) -> QuizContext {
        self.current_question()
            .map(Question::context)
            .unwrap_or_default()
    }

    pub fn submit_answer(&mut self, answer: &str) -> Result<AnswerOutcome, QuizError> {
        let Phase::Playing { topic, index } = self.phase else {
            return Err(QuizError::NotPlaying);
        };
        let questions = &self.topics[topic].questions;
        let question = questions.get(index).ok_or(QuizError::NotPlaying)?;

        let correct = question.is_correct(answer);
        let points_awarded = if correct { POINTS_PER_CORRECT } else { 0 };
        let hint = (!correct).then(|| question.hint.clone());
        self.score += points_awarded;

        let next = index + 1;
        let finished = next >= questions.len();
        self.phase = if finished {
            Phase::Finished
        } else {
            Phase::Playing { topic, index: next }
        };

        debug!(correct, score = self.score, finished, "Answer submitted");
        if finished {
            info!(score = self.score, "Quiz round finished");
        }

        Ok(AnswerOutcome {
            correct,
            points_awarded,
            hint,
            score: self.score,
            finished,
        })
    }

    /// Back to the topic menu
    pub fn restart(&mut self) {
        self.phase = Phase::Menu;
    }
}

impl QuestionContextProvider for QuizController {
    fn current_context(&self) -> QuizContext {
        QuizController::current_context(self)
    }
}
