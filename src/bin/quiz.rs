use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use quiz_assistant::chat::Sender;
use quiz_assistant::quiz::Phase;
use quiz_assistant::session::SharedQuiz;
use quiz_assistant::{Assistant, AssistantConfig, QuestionContextProvider, QuizController, Session};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Health quiz with a study-hint assistant", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    QUIZ_ASSISTANT_USE_BACKEND    Delegate chat replies to the remote endpoint (true|false)
    QUIZ_ASSISTANT_BASE_URL       Base URL of the chat endpoint [default: http://localhost:3000]
    QUIZ_ASSISTANT_TIMEOUT_SECS   Remote request timeout in seconds [default: 15]
    RUST_LOG                      Log filter, e.g. quiz_assistant=debug

WHILE PLAYING:
    <text>          Submit an answer
    /ask <text>     Ask the assistant for help
    /restart        Back to the topic menu
    /quit           Exit")]
struct Args {
    /// Start directly on this topic
    #[arg(short, long)]
    topic: Option<String>,

    /// Enable remote delegation regardless of QUIZ_ASSISTANT_USE_BACKEND
    #[arg(long)]
    backend: bool,

    /// Override the chat endpoint base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Seed for study-tip selection (reproducible replies)
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = AssistantConfig::from_env().context("Invalid assistant configuration")?;
    if args.backend {
        config = config.with_backend(true);
    }
    if let Some(url) = args.base_url {
        config = config.with_base_url(url);
    }

    let quiz: SharedQuiz = Arc::new(Mutex::new(QuizController::default()));
    let provider: Arc<dyn QuestionContextProvider> = quiz.clone();
    let mut assistant = Assistant::from_config(provider, &config);
    if let Some(seed) = args.seed {
        assistant = assistant.with_seed(seed);
    }
    let mut session = Session::with_assistant(quiz, assistant);

    println!(
        "Health Quiz (assistant: {})",
        if session.assistant().is_remote_enabled() { "online" } else { "offline" }
    );

    if let Some(topic) = &args.topic {
        if let Err(e) = session.start(topic) {
            println!("{e}");
        }
    }
    show_screen(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let input = line.trim();

        if input == "/quit" {
            break;
        }
        if input == "/restart" {
            session.restart();
            show_screen(&session);
            continue;
        }
        if let Some(message) = ask_command(input) {
            if let Some(reply) = session.send_message(message).await {
                println!("{}: {}", Sender::Assistant.label(), reply);
            }
            continue;
        }

        match session.phase() {
            Phase::Menu => {
                if let Err(e) = session.start(input) {
                    println!("{e}");
                }
            }
            Phase::Playing { .. } => {
                let outcome = session.submit_answer(input)?;
                if outcome.correct {
                    println!("Correct! +{} points", outcome.points_awarded);
                } else {
                    println!("Incorrect! Hint: {}", outcome.hint.unwrap_or_default());
                }
                println!("Score: {}", outcome.score);
            }
            Phase::Finished => session.restart(),
        }
        show_screen(&session);
    }

    Ok(())
}

/// Chat text of an `/ask` command; `None` for anything else (e.g. `/askew`)
fn ask_command(input: &str) -> Option<&str> {
    if input == "/ask" {
        Some("")
    } else {
        input.strip_prefix("/ask ")
    }
}

fn show_screen(session: &Session) {
    session.with_quiz(|quiz| match quiz.phase() {
        Phase::Menu => {
            let topics: Vec<&str> = quiz.topics().collect();
            println!("\nChoose a topic: {}", topics.join(", "));
        }
        Phase::Playing { .. } => {
            if let Some(question) = quiz.current_question() {
                println!("\n{}", question.text);
            }
        }
        Phase::Finished => {
            println!("\nYour final score: {}", quiz.score());
            println!("Press Enter to return to the menu.");
        }
    });
}
