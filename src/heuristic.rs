//! Offline replies: answer-leak detection, hint paraphrasing and generic study tips.

use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use regex::Regex;
use tracing::debug;

use crate::core::AssistantPayload;

pub const EMPTY_MESSAGE_PROMPT: &str = "Please enter a message.";

pub const REFUSAL: &str =
    "I can't provide the exact quiz answer. I can explain concepts or give step-by-step hints.";

pub const HINT_LABEL: &str = "Here is a study hint:";

pub const STUDY_STRATEGY: &str = "Try to define terms and connect cause → process → outcome.";

pub const GENERIC_TIPS: [&str; 4] = [
    "Break the question into smaller parts. What process or organ is central here?",
    "Search for definitions, functions, inputs/outputs, and typical disorders related to the topic.",
    "Compare similar terms and list differences; then map them back to the question.",
    "Look for keywords: function / location / mechanism / examples / related symptoms.",
];

// "answer:" has no trailing word boundary so that "answer: heart" matches too.
static DIRECT_ANSWER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:give me the answer|what is the answer|tell me the answer|just tell me)\b|\banswer:")
        .expect("Invalid regex")
});

/// True when the message asks for the literal quiz answer
pub fn is_direct_answer_request(message: &str) -> bool {
    DIRECT_ANSWER_RE.is_match(message)
}

/// Uniform choice among the generic study tips, driven by an injectable RNG.
#[derive(Debug)]
pub struct TipPicker {
    rng: Mutex<StdRng>,
}

impl TipPicker {
    pub fn new(rng: StdRng) -> Self {
        Self { rng: Mutex::new(rng) }
    }

    pub fn pick(&self) -> &'static str {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        GENERIC_TIPS.choose(&mut *rng).copied().unwrap_or(GENERIC_TIPS[0])
    }
}

#[derive(Debug)]
pub struct LocalHeuristic {
    tips: TipPicker,
}

impl LocalHeuristic {
    pub fn new(rng: StdRng) -> Self {
        Self { tips: TipPicker::new(rng) }
    }

    pub fn reply(&self, payload: &AssistantPayload) -> String {
        if is_direct_answer_request(&payload.message) {
            return REFUSAL.to_string();
        }

        if !payload.quiz_hint.trim().is_empty() {
            debug!("Replying with the question hint");
            return hint_reply(&payload.quiz_hint);
        }

        let tip = self.tips.pick();
        let question = payload.quiz_question.trim();
        debug!(with_question = !question.is_empty(), "Replying with a generic tip");
        if question.is_empty() {
            tip.to_string()
        } else {
            format!("About this question: \"{}\". {}", question, tip)
        }
    }
}

pub fn hint_reply(hint: &str) -> String {
    format!("{} {}\n{}", HINT_LABEL, hint, STUDY_STRATEGY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_direct_answer_phrases() {
        for message in [
            "give me the answer",
            "What is the answer?",
            "please TELL ME THE ANSWER now",
            "answer: heart",
            "Just tell me!",
            "ok, final answer:",
        ] {
            assert!(is_direct_answer_request(message), "should refuse: {message}");
        }
    }

    #[test]
    fn test_conceptual_questions_pass() {
        for message in [
            "give me a clue",
            "what does the heart do?",
            "answers are hard",
            "tell me about oxygen",
            "the answer is not obvious",
        ] {
            assert!(!is_direct_answer_request(message), "should not refuse: {message}");
        }
    }

    #[test]
    fn test_heuristic_refuses_before_using_hint() {
        let heuristic = LocalHeuristic::new(StdRng::seed_from_u64(1));
        for message in ["Just Tell Me", "what is the answer", "answer: stomach"] {
            let payload = AssistantPayload::new(message)
                .with_question("Which organ breaks down food chemically?")
                .with_hint("It uses acids and enzymes.");
            assert_eq!(heuristic.reply(&payload), REFUSAL, "message: {message}");
        }
        assert_eq!(heuristic.reply(&AssistantPayload::new("just tell me")), REFUSAL);
    }

    #[test]
    fn test_hint_takes_priority_over_question() {
        let heuristic = LocalHeuristic::new(StdRng::seed_from_u64(7));
        let payload = AssistantPayload::new("help")
            .with_question("Which organ pumps blood?")
            .with_hint("It's the main circulatory organ.");
        assert_eq!(
            heuristic.reply(&payload),
            "Here is a study hint: It's the main circulatory organ.\nTry to define terms and connect cause → process → outcome."
        );
    }

    #[test]
    fn test_whitespace_hint_counts_as_absent() {
        let heuristic = LocalHeuristic::new(StdRng::seed_from_u64(7));
        let reply = heuristic.reply(&AssistantPayload::new("help").with_hint("  "));
        assert!(GENERIC_TIPS.contains(&reply.as_str()));
    }

    #[test]
    fn test_seeded_picker_is_deterministic() {
        let a = TipPicker::new(StdRng::seed_from_u64(42));
        let b = TipPicker::new(StdRng::seed_from_u64(42));
        for _ in 0..10 {
            assert_eq!(a.pick(), b.pick());
        }
    }

    #[test]
    fn test_picker_covers_all_tips() {
        let picker = TipPicker::new(StdRng::seed_from_u64(3));
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(picker.pick());
        }
        assert_eq!(seen.len(), GENERIC_TIPS.len());
    }
}
