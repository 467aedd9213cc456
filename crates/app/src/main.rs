use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use quiz_core::model::TopicId;
use quiz_core::session::{AnswerFeedback, QuizPhase, QuizSession, QuizStateError};
use services::{
    Clock, HttpScoreSink, InMemoryCatalog, QuestionView, QuizFlowService, ResultsView,
    ScoreSinkConfig,
};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct Args {
    topics_file: Option<String>,
    sink_url: Option<String>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--topics <json_file>] [--sink-url <url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  built-in sample topics; scores are not saved unless a sink is configured");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_TOPICS_FILE, QUIZ_SINK_URL, RUST_LOG");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut topics_file = std::env::var("QUIZ_TOPICS_FILE").ok();
        let mut sink_url = std::env::var("QUIZ_SINK_URL").ok();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--topics" => topics_file = Some(require_value(args, "--topics")?),
                "--sink-url" => sink_url = Some(require_value(args, "--sink-url")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            topics_file,
            sink_url,
        })
    }
}

/// Catalog used when no --topics file is given.
const SAMPLE_TOPICS: &str = r#"[
    {
        "id": 1,
        "title": "Science",
        "description": "Physics, chemistry, and the natural world",
        "icon": "🔬",
        "questions": [
            {
                "question": "What planet is known as the Red Planet?",
                "options": ["Venus", "Mars", "Jupiter", "Saturn"],
                "correct_answer": 1,
                "explanation": "Iron oxide dust gives Mars its reddish color."
            },
            {
                "question": "What gas do plants absorb from the atmosphere?",
                "options": ["Oxygen", "Nitrogen", "Carbon dioxide", "Hydrogen"],
                "correct_answer": 2,
                "explanation": "Photosynthesis consumes carbon dioxide."
            },
            {
                "question": "What is the chemical symbol for gold?",
                "options": ["Go", "Gd", "Au", "Ag"],
                "correct_answer": 2,
                "explanation": "Au comes from the Latin aurum."
            }
        ]
    },
    {
        "id": 2,
        "title": "History",
        "description": "People and events that shaped the world",
        "icon": "📜",
        "questions": [
            {
                "question": "In which year did World War II end?",
                "options": ["1943", "1945", "1947", "1950"],
                "correct_answer": 1,
                "explanation": "Japan surrendered in September 1945."
            },
            {
                "question": "Who was the first president of the United States?",
                "options": ["Thomas Jefferson", "John Adams", "George Washington"],
                "correct_answer": 2,
                "explanation": "Washington took office in 1789."
            }
        ]
    }
]"#;

fn load_catalog(args: &Args) -> Result<InMemoryCatalog, Box<dyn std::error::Error>> {
    match &args.topics_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            Ok(InMemoryCatalog::from_json(&raw)?)
        }
        None => Ok(InMemoryCatalog::from_json(SAMPLE_TOPICS)?),
    }
}

fn build_sink(args: &Args) -> HttpScoreSink {
    let config = args
        .sink_url
        .clone()
        .map(|endpoint| ScoreSinkConfig { endpoint })
        .or_else(ScoreSinkConfig::from_env);
    HttpScoreSink::new(config)
}

fn prompt(text: &str) -> io::Result<String> {
    print!("{text}");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim().to_lowercase())
}

fn option_index(input: &str) -> Option<usize> {
    match input {
        "a" => Some(0),
        "b" => Some(1),
        "c" => Some(2),
        "d" => Some(3),
        _ => None,
    }
}

fn render_question(view: &QuestionView) {
    println!();
    println!("[{}] {}", view.topic_title, view.counter);
    println!("{}", view.prompt);
    for option in &view.options {
        let marker = if option.is_pending { ">" } else { " " };
        println!(" {marker} {}. {}", option.label, option.text);
    }
    if let Some(feedback) = &view.committed {
        render_feedback(feedback);
    }
    let next_hint = if view.is_last { "view results" } else { "next" };
    println!("(a-d answer, n {next_hint}, p previous, x back to topics)");
}

fn render_feedback(feedback: &AnswerFeedback) {
    if feedback.is_correct {
        println!("   ✓ Correct! {}", feedback.explanation);
    } else {
        println!("   ✗ Incorrect. {}", feedback.explanation);
    }
}

fn render_results(view: &ResultsView) {
    println!();
    println!("── Results: {} ──", view.topic_title);
    println!("Score:     {} / {}", view.score, view.total_questions);
    println!("Percent:   {}%", view.percentage);
    println!("Incorrect: {}", view.incorrect_count);
    println!("Grade:     {}", view.grade);
}

fn answer_current(session: &mut QuizSession, index: usize) {
    let feedback = session
        .stage_selection(index)
        .and_then(|()| session.submit_pending());
    match feedback {
        Ok(feedback) => render_feedback(&feedback),
        Err(QuizStateError::AlreadyAnswered) => {
            println!("Already answered; move on with n or revisit with p.");
        }
        Err(QuizStateError::OptionOutOfRange { options, .. }) => {
            println!("This question only has {options} options.");
        }
        Err(err) => println!("{err}"),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let catalog = load_catalog(&args)?;
    let sink = build_sink(&args);
    if !sink.enabled() {
        log::info!("no score sink configured; results will not be saved");
    }

    let flow = QuizFlowService::new(
        Clock::default_clock(),
        Arc::new(catalog),
        Arc::new(sink),
    );

    loop {
        let topics = flow.list_topics().await?;
        println!();
        println!("Topics:");
        for topic in &topics {
            println!(
                "  {} {} {} — {} ({} questions)",
                topic.id(),
                topic.icon(),
                topic.title(),
                topic.description(),
                topic.question_count()
            );
        }

        let input = prompt("Pick a topic id (q to quit): ")?;
        if input == "q" {
            return Ok(());
        }
        let Ok(topic_id) = input.parse::<TopicId>() else {
            println!("Not a topic id: {input}");
            continue;
        };

        let mut session = match flow.start_quiz(topic_id).await {
            Ok(session) => session,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        while session.phase() != QuizPhase::SelectingTopic {
            while session.phase() == QuizPhase::InProgress {
                let Some(view) = QuestionView::from_session(&session) else {
                    break;
                };
                render_question(&view);

                let input = prompt("> ")?;
                if let Some(index) = option_index(&input) {
                    answer_current(&mut session, index);
                } else {
                    match input.as_str() {
                        "n" => {
                            flow.advance(&mut session)?;
                        }
                        "p" => session.retreat()?,
                        "x" => session.exit_to_topics(),
                        other => println!("Unknown command: {other}"),
                    }
                }
            }

            if session.phase() == QuizPhase::ShowingResults {
                if let Some(view) = ResultsView::from_session(&session) {
                    render_results(&view);
                }
                let input = prompt("r to retry, anything else for topics: ")?;
                if input == "r" {
                    flow.restart(&mut session)?;
                } else {
                    session.exit_to_topics();
                }
            }
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
