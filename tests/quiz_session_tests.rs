use std::sync::{Arc, Mutex};

use quiz_assistant::chat::Sender;
use quiz_assistant::clients::mock::MockClient;
use quiz_assistant::core::{Assistant, QuestionContextProvider, QuizContext};
use quiz_assistant::error::QuizError;
use quiz_assistant::heuristic::{GENERIC_TIPS, REFUSAL};
use quiz_assistant::quiz::{Phase, QuizController, POINTS_PER_CORRECT};
use quiz_assistant::session::{BeforeSend, Session, SharedQuiz, SENDING_NOTICE};
use quiz_assistant::AssistantConfig;

fn seeded_session(seed: u64) -> Session {
    let quiz: SharedQuiz = Arc::new(Mutex::new(QuizController::default()));
    let provider: Arc<dyn QuestionContextProvider> = quiz.clone();
    Session::with_assistant(quiz, Assistant::new(provider).with_seed(seed))
}

#[test]
fn test_full_round_scoring() {
    let mut quiz = QuizController::default();
    quiz.start("circulatory").unwrap();

    let first = quiz.submit_answer("  Transport Oxygen ").unwrap();
    assert!(first.correct);
    assert_eq!(first.points_awarded, POINTS_PER_CORRECT);
    assert_eq!(first.hint, None);
    assert!(!first.finished);

    let second = quiz.submit_answer("lungs").unwrap();
    assert!(!second.correct);
    assert_eq!(second.hint.as_deref(), Some("It's the main circulatory organ."));
    assert_eq!(second.score, 10);
    assert!(second.finished);

    assert_eq!(quiz.phase(), &Phase::Finished);
    assert_eq!(quiz.score(), 10);
}

#[test]
fn test_submit_outside_round_fails() {
    let mut quiz = QuizController::default();
    assert_eq!(quiz.submit_answer("heart"), Err(QuizError::NotPlaying));

    quiz.start("digestive").unwrap();
    quiz.submit_answer("stomach").unwrap();
    quiz.submit_answer("small intestine").unwrap();
    assert_eq!(quiz.score(), 20);
    assert_eq!(quiz.submit_answer("stomach"), Err(QuizError::NotPlaying));
}

#[test]
fn test_unknown_topic_rejected() {
    let mut quiz = QuizController::default();
    assert_eq!(quiz.start("skeletal"), Err(QuizError::UnknownTopic("skeletal".to_string())));
    assert_eq!(quiz.phase(), &Phase::Menu);
    assert_eq!(quiz.topics().collect::<Vec<_>>(), ["circulatory", "digestive"]);
}

#[test]
fn test_context_only_while_playing() {
    let mut quiz = QuizController::default();
    assert_eq!(quiz.current_context(), QuizContext::default());

    quiz.start("digestive").unwrap();
    assert_eq!(
        quiz.current_context(),
        QuizContext::new("Which organ breaks down food chemically?", "It uses acids and enzymes.")
    );

    quiz.submit_answer("stomach").unwrap();
    assert_eq!(quiz.current_context().hint, "Long, coiled tube.");

    quiz.submit_answer("colon").unwrap();
    assert_eq!(quiz.current_context(), QuizContext::default());

    quiz.restart();
    assert_eq!(quiz.phase(), &Phase::Menu);
    assert_eq!(quiz.current_context(), QuizContext::default());
}

#[tokio::test]
async fn test_blank_chat_input_is_ignored() {
    let mut session = seeded_session(1);
    assert_eq!(session.send_message("   ").await, None);
    assert!(session.log().is_empty());
}

#[tokio::test]
async fn test_chat_follows_current_question() {
    let mut session = seeded_session(1);
    session.start("circulatory").unwrap();

    let reply = session.send_message("I need a nudge").await.unwrap();
    assert!(reply.contains("Think about oxygen transport."));

    session.submit_answer("transport oxygen").unwrap();
    let reply = session.send_message("and this one?").await.unwrap();
    assert!(reply.contains("It's the main circulatory organ."));

    let senders: Vec<Sender> = session.log().entries().iter().map(|m| m.sender).collect();
    assert_eq!(
        senders,
        [
            Sender::User,
            Sender::System,
            Sender::Assistant,
            Sender::User,
            Sender::System,
            Sender::Assistant
        ]
    );
    assert_eq!(session.log().entries()[1].text, SENDING_NOTICE);
    assert_eq!(session.log().last().unwrap().text, reply);
}

#[tokio::test]
async fn test_chat_after_round_uses_generic_tip() {
    let mut session = seeded_session(8);
    session.start("digestive").unwrap();
    session.submit_answer("stomach").unwrap();
    session.submit_answer("small intestine").unwrap();

    let reply = session.send_message("what should I review?").await.unwrap();
    assert!(GENERIC_TIPS.contains(&reply.as_str()), "unexpected reply: {reply}");
}

#[tokio::test]
async fn test_chat_refuses_answer_requests_mid_round() {
    let mut session = seeded_session(1);
    session.start("circulatory").unwrap();

    assert_eq!(session.send_message("Just tell me").await.as_deref(), Some(REFUSAL));
    assert_eq!(session.score(), 0);
}

#[tokio::test]
async fn test_session_from_default_config_is_offline() {
    let session = Session::new(QuizController::default(), &AssistantConfig::default());
    assert!(!session.assistant().is_remote_enabled());
}

#[tokio::test]
async fn test_before_send_hook_blocks_message() {
    let mut session = seeded_session(1).with_before_send(Box::new(|message: &str| {
        if message.contains("hint") {
            BeforeSend::Block
        } else {
            BeforeSend::Allow
        }
    }));
    session.start("circulatory").unwrap();

    assert_eq!(session.send_message("one more hint please").await, None);
    let senders: Vec<Sender> = session.log().entries().iter().map(|m| m.sender).collect();
    assert_eq!(senders, [Sender::User]);

    let reply = session.send_message("I'm stuck").await.unwrap();
    assert!(reply.contains("Think about oxygen transport."));
    assert_eq!(session.log().len(), 4);
}

#[tokio::test]
async fn test_before_send_hook_rewrites_message() {
    let mut session = seeded_session(1)
        .with_before_send(Box::new(|_: &str| BeforeSend::Rewrite("just tell me".to_string())));
    session.start("digestive").unwrap();

    let reply = session.send_message("how do enzymes work?").await;
    assert_eq!(reply.as_deref(), Some(REFUSAL));

    let entries = session.log().entries();
    assert_eq!(entries[0].sender, Sender::User);
    assert_eq!(entries[0].text, "how do enzymes work?");
    assert_eq!(entries[2].text, REFUSAL);
}

#[tokio::test]
async fn test_before_send_hook_controls_what_remote_receives() {
    let quiz: SharedQuiz = Arc::new(Mutex::new(QuizController::default()));
    let provider: Arc<dyn QuestionContextProvider> = quiz.clone();
    let (client, handle) = MockClient::new();
    handle.push_reply("Think about which organ moves blood.");
    let assistant = Assistant::new(provider).with_seed(1).with_client(Box::new(client));
    let mut session = Session::with_assistant(quiz, assistant).with_before_send(Box::new(
        |message: &str| match message {
            "skip" => BeforeSend::Block,
            other => BeforeSend::Rewrite(format!("{other} (no spoilers)")),
        },
    ));
    session.start("circulatory").unwrap();

    assert_eq!(session.send_message("skip").await, None);
    assert_eq!(handle.call_count(), 0);

    let reply = session.send_message("give me a clue").await;
    assert_eq!(reply.as_deref(), Some("Think about which organ moves blood."));
    let sent = handle.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message, "give me a clue (no spoilers)");
    assert_eq!(sent[0].quiz_hint, "Think about oxygen transport.");
}

#[tokio::test]
async fn test_phase_and_score_views() {
    let mut session = seeded_session(1);
    assert_eq!(session.phase(), Phase::Menu);

    session.start("circulatory").unwrap();
    session.submit_answer("transport oxygen").unwrap();
    assert_eq!(session.phase(), Phase::Playing { topic: 0, index: 1 });
    assert_eq!(session.score(), POINTS_PER_CORRECT);

    // No lock is held between reads, so chatting right after works
    let hint = session.with_quiz(|quiz| quiz.current_context().hint);
    let reply = session.send_message("clue?").await.unwrap();
    assert!(reply.contains(&hint));
}
