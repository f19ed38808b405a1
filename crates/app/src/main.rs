use std::fmt;
use std::sync::Arc;

use gateway::{ApiConfig, HttpGateway, Page, QuizGateway, RequestContext, StatsGateway};
use quiz_core::model::QuizId;
use quiz_core::{Clock, MonotonicTimer, QuizResult};
use services::sessions::KeyInput;
use services::{
    DEFAULT_WEAK_TAG_LIMIT, QuizSessionLoop, QuizSource, SessionAction, SessionConfig,
    SessionError, StatsService, StepOutcome,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod demo;
mod render;

const RECENT_QUIZ_LIMIT: u32 = 5;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidQuizId { raw: String },
    MissingQuizId,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuizId { raw } => write!(f, "invalid --id value: {raw}"),
            ArgsError::MissingQuizId => write!(f, "quiz requires --id <n>"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- daily [--base-url <url>] [--offline]");
    eprintln!("  cargo run -p app -- quiz --id <n> [--offline]");
    eprintln!("  cargo run -p app -- stats [--base-url <url>] [--offline]");
    eprintln!("  cargo run -p app -- demo");
    eprintln!();
    eprintln!("The REST backend serves only the daily quiz; quiz --id needs --offline,");
    eprintln!("which uses the seeded in-memory backend (quiz 1).");
    eprintln!();
    eprintln!("While answering:");
    eprintln!("  1-4 pick a choice, t/f answer true/false, any other text answers a cloze");
    eprintln!("  =<text> answers literally, enter advances, esc skips");
    eprintln!("  :prev  :next  :submit  :quit");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_API_BASE_URL, QUIZ_API_TOKEN, QUIZ_API_TIMEOUT_SECS,");
    eprintln!("  QUIZ_SUBMIT_TIMEOUT_SECS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Daily,
    Quiz(QuizId),
    Stats,
    Demo,
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    command: Command,
    base_url: Option<String>,
    offline: bool,
}

impl Args {
    /// Parses `<subcommand> [flags]`; `None` means help was requested.
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let name = match args.next() {
            None => "daily".to_string(),
            Some(first) => first,
        };
        if matches!(name.as_str(), "--help" | "-h" | "help") {
            return Ok(None);
        }

        let mut base_url = None;
        let mut offline = false;
        let mut quiz_id = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--base-url" => base_url = Some(require_value(&mut args, "--base-url")?),
                "--offline" => offline = true,
                "--id" => {
                    let value = require_value(&mut args, "--id")?;
                    let parsed = value
                        .parse::<QuizId>()
                        .map_err(|_| ArgsError::InvalidQuizId { raw: value.clone() })?;
                    quiz_id = Some(parsed);
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = match name.as_str() {
            "daily" => Command::Daily,
            "quiz" => Command::Quiz(quiz_id.ok_or(ArgsError::MissingQuizId)?),
            "stats" => Command::Stats,
            "demo" => Command::Demo,
            _ => return Err(ArgsError::UnknownArg(name)),
        };
        Ok(Some(Self {
            command,
            base_url,
            offline,
        }))
    }
}

/// One line typed by the user during a session.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Action(SessionAction),
    Quit,
}

fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    if let Some(literal) = trimmed.strip_prefix('=') {
        return Input::Action(SessionAction::Answer(literal.to_string()));
    }
    let action = match trimmed {
        "" => SessionAction::Key(KeyInput::Enter),
        ":quit" | ":q" => return Input::Quit,
        ":prev" | ":p" => SessionAction::Previous,
        ":next" | ":n" => SessionAction::Next,
        ":submit" | ":s" => SessionAction::Submit,
        "esc" | ":skip" => SessionAction::Key(KeyInput::Escape),
        _ => match KeyInput::parse(trimmed) {
            KeyInput::Char(c) => SessionAction::Key(KeyInput::Char(c)),
            _ => SessionAction::Answer(trimmed.to_string()),
        },
    };
    Input::Action(action)
}

struct Backend {
    quizzes: Arc<dyn QuizGateway>,
    stats: Arc<dyn StatsGateway>,
    ctx: RequestContext,
}

impl Backend {
    fn http(base_url: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = ApiConfig::from_env();
        if let Some(url) = base_url {
            config = config.with_base_url(url);
        }
        let ctx = RequestContext::from_token(config.token.as_deref());
        tracing::debug!(base_url = %config.base_url, authenticated = ctx.bearer().is_some(), "using http backend");

        let gateway = Arc::new(HttpGateway::new(config)?);
        Ok(Self {
            quizzes: gateway.clone(),
            stats: gateway,
            ctx,
        })
    }

    fn demo() -> Result<Self, Box<dyn std::error::Error>> {
        let gateway = Arc::new(demo::seeded_gateway(Clock::default())?);
        Ok(Self {
            quizzes: gateway.clone(),
            stats: gateway,
            ctx: RequestContext::anonymous(),
        })
    }
}

async fn play(backend: &Backend, source: QuizSource) -> Result<(), Box<dyn std::error::Error>> {
    let session = QuizSessionLoop::new(Arc::clone(&backend.quizzes), Arc::new(MonotonicTimer::new()))
        .with_config(SessionConfig::from_env());
    let ctx = &backend.ctx;

    let started = session.start(ctx, source).await?;
    if let Some(status) = started.daily {
        println!("{}", render::daily_banner(status));
    }
    let mut controller = started.controller;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if let (Some(progress), Some(item)) = (controller.progress(), controller.current_item()) {
            println!("{}", render::item(progress, item, controller.current_answer()));
        }

        let Some(line) = lines.next_line().await? else {
            tracing::info!(quiz_id = ?controller.quiz_id(), "input closed; quiz abandoned");
            return Ok(());
        };
        let action = match parse_input(&line) {
            Input::Quit => {
                println!("Quiz abandoned; answers were not submitted.");
                return Ok(());
            }
            Input::Action(action) => action,
        };

        match session.dispatch(ctx, &mut controller, action).await {
            Ok(StepOutcome::Completed(graded)) => {
                let result = QuizResult::from_graded(&graded).map_err(SessionError::from)?;
                println!("{}", render::result(&result));
                return Ok(());
            }
            Ok(_) => {}
            Err(err @ SessionError::SubmitFailure(_)) => {
                eprintln!("{err}. Answers kept; use :submit to retry.");
            }
            Err(err) if err.is_invalid_transition() => eprintln!("{err}"),
            Err(err) => return Err(err.into()),
        }
    }
}

async fn show_stats(backend: &Backend) -> Result<(), Box<dyn std::error::Error>> {
    let service = StatsService::new(Arc::clone(&backend.stats), Arc::clone(&backend.quizzes));
    let stats = service.overview(&backend.ctx).await?;
    println!("{}", render::stats(&stats, DEFAULT_WEAK_TAG_LIMIT));

    let page = Page {
        skip: 0,
        limit: RECENT_QUIZ_LIMIT,
    };
    let recent = service.recent_quizzes(&backend.ctx, page).await?;
    if !recent.is_empty() {
        println!("Recent quizzes:");
        for quiz in recent {
            let score = quiz.score.unwrap_or(0.0) * 100.0;
            let when = quiz
                .completed_at
                .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string());
            println!("  #{} {when} {score:.0}%", quiz.id);
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let parsed = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let Some(args) = parsed else {
        print_usage();
        return Ok(());
    };

    let backend = || {
        if args.offline {
            Backend::demo()
        } else {
            Backend::http(args.base_url.clone())
        }
    };

    match args.command {
        Command::Daily => play(&backend()?, QuizSource::Daily).await,
        Command::Quiz(id) => play(&backend()?, QuizSource::ById(id)).await,
        Command::Stats => show_stats(&backend()?).await,
        Command::Demo => {
            let backend = Backend::demo()?;
            play(&backend, QuizSource::Daily).await?;
            println!();
            show_stats(&backend).await
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
