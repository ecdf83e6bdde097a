//! academy: command-line front end for the trading academy.
//!
//! Usage:
//!   cargo run -p academy-cli -- lessons --user anna --category risk-management
//!   cargo run -p academy-cli -- quiz --user anna --lesson 1 --answers 1,2
//!   cargo run -p academy-cli -- chart --bars 90 --seed 7
//!   cargo run -p academy-cli -- report --user admin
//!   cargo run -p academy-cli -- author --user admin --file draft.json

mod config;

use academy_core::{AcademyError, Category, Difficulty, KeyValueStore};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use config::AcademyConfig;
use quiz_engine::{
    build_report, summary, JsonFileStore, LessonCatalog, LessonDraft, LessonFilter, LessonSession,
    MemoryStore, ProgressTracker,
};
use std::sync::Arc;
use technical_analysis::{generate_bars, ChartPayload, Level, SampleConfig};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "academy_cli=info,quiz_engine=info,technical_analysis=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = AcademyConfig::from_env()?;

    match args.first().map(String::as_str) {
        Some("lessons") => list_lessons(&config, &args),
        Some("quiz") => take_quiz(&config, &args),
        Some("chart") => print_chart(&config, &args),
        Some("report") => print_report(&config, &args),
        Some("author") => author_lesson(&config, &args),
        _ => {
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  academy lessons --user NAME [--category C] [--difficulty D]");
    eprintln!("  academy quiz --user NAME --lesson ID --answers 1,0,2");
    eprintln!("  academy chart [--bars N] [--seed S]");
    eprintln!("  academy report --user ADMIN");
    eprintln!("  academy author --user ADMIN --file DRAFT.json");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ACADEMY_CATALOG_PATH   lesson catalog JSON (default: built-in sample)");
    eprintln!("  ACADEMY_PROGRESS_PATH  progress JSON file (default: in memory)");
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn required_flag<'a>(args: &'a [String], name: &str) -> Result<&'a str> {
    flag(args, name).with_context(|| format!("missing {} <value>", name))
}

fn load_catalog(config: &AcademyConfig) -> Result<LessonCatalog> {
    let catalog = match &config.catalog_path {
        Some(path) => LessonCatalog::load(path)?,
        None => LessonCatalog::builtin()?,
    };
    Ok(catalog)
}

fn open_tracker(config: &AcademyConfig) -> Result<ProgressTracker> {
    let store: Arc<dyn KeyValueStore> = match &config.progress_path {
        Some(path) => Arc::new(
            JsonFileStore::open(path)
                .with_context(|| format!("opening progress file {}", path.display()))?,
        ),
        None => {
            tracing::warn!("ACADEMY_PROGRESS_PATH not set, progress will not be kept");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(ProgressTracker::new(store))
}

fn list_lessons(config: &AcademyConfig, args: &[String]) -> Result<()> {
    let catalog = load_catalog(config)?;
    let user = catalog.resolve_user(required_flag(args, "--user")?)?;
    let filter = LessonFilter {
        category: flag(args, "--category").map(str::parse::<Category>).transpose()?,
        difficulty: flag(args, "--difficulty").map(str::parse::<Difficulty>).transpose()?,
    };
    let tracker = open_tracker(config)?;

    for lesson in catalog.filtered(&user, filter) {
        let status = match tracker.get(&user.name, lesson.id)? {
            Some(record) => format!("{}% after {} attempt(s)", record.percentage, record.attempt_count),
            None => "not attempted".to_string(),
        };
        println!(
            "[{}] {} ({}, {}) - {} question(s), {}",
            lesson.id,
            lesson.title,
            lesson.category,
            lesson.difficulty,
            lesson.questions.len(),
            status
        );
    }
    Ok(())
}

fn parse_answers(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().with_context(|| format!("invalid answer '{}'", s)))
        .collect()
}

fn take_quiz(config: &AcademyConfig, args: &[String]) -> Result<()> {
    let catalog = load_catalog(config)?;
    let user = catalog.resolve_user(required_flag(args, "--user")?)?;
    let lesson_id: u32 = required_flag(args, "--lesson")?
        .parse()
        .context("--lesson must be a lesson id")?;
    let answers = parse_answers(required_flag(args, "--answers")?)?;

    let mut session = LessonSession::start(&catalog, &user, lesson_id)?;
    let lesson = session.lesson();
    println!("{} ({})", lesson.title, lesson.video_ref);

    for (question, option) in answers.into_iter().enumerate() {
        session.select(question, option)?;
    }

    let result = match session.submit() {
        Ok(result) => result,
        Err((_, AcademyError::IncompleteSubmission { missing })) => {
            let numbers: Vec<String> = missing.iter().map(|i| (i + 1).to_string()).collect();
            bail!("answer every question before submitting (missing: {})", numbers.join(", "));
        }
        Err((_, e)) => return Err(e.into()),
    };

    for (i, (question, outcome)) in lesson
        .questions
        .iter()
        .zip(&result.per_question)
        .enumerate()
    {
        println!();
        println!("Question {}: {}", i + 1, question.prompt);
        println!("  Your answer: {}", outcome.chosen_text);
        if !outcome.is_correct {
            println!("  Correct answer: {}", outcome.correct_text);
        }
        println!("  {}", outcome.explanation);
    }
    println!();
    println!("{}", summary(&result));

    let tracker = open_tracker(config)?;
    tracker.record(&user, lesson_id, &result, Utc::now())?;
    Ok(())
}

fn print_chart(config: &AcademyConfig, args: &[String]) -> Result<()> {
    let bars: usize = match flag(args, "--bars") {
        Some(v) => v.parse().context("--bars must be a count")?,
        None => config.sample_bars,
    };
    let seed: u64 = match flag(args, "--seed") {
        Some(v) => v.parse().context("--seed must be an integer")?,
        None => config.sample_seed,
    };

    let sample = SampleConfig {
        bars,
        seed,
        start_price: config.start_price,
        ..SampleConfig::default()
    };
    let bars = generate_bars(&sample);

    let mut chart = ChartPayload::analysis(&bars, &config.chart_settings())?;
    chart.add_levels([
        Level::support("Support 1", 1.1750),
        Level::resistance("Resistance 1", 1.1900),
        Level::support("Support 2", 1.1700),
    ])?;

    println!("{}", serde_json::to_string_pretty(&chart)?);
    Ok(())
}

fn print_report(config: &AcademyConfig, args: &[String]) -> Result<()> {
    let catalog = load_catalog(config)?;
    let user = catalog.resolve_user(required_flag(args, "--user")?)?;
    let tracker = open_tracker(config)?;

    let report = build_report(&user, &catalog, &tracker, Utc::now())?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn author_lesson(config: &AcademyConfig, args: &[String]) -> Result<()> {
    let Some(catalog_path) = &config.catalog_path else {
        bail!("ACADEMY_CATALOG_PATH must be set to save authored lessons");
    };
    let mut catalog = load_catalog(config)?;
    let author = catalog.resolve_user(required_flag(args, "--user")?)?;

    let draft_path = required_flag(args, "--file")?;
    let json = std::fs::read_to_string(draft_path)
        .with_context(|| format!("reading lesson draft {}", draft_path))?;
    let draft: LessonDraft = serde_json::from_str(&json).context("parsing lesson draft")?;

    let lesson = catalog.add_lesson(&author, draft)?;
    println!("Saved lesson [{}] {}", lesson.id, lesson.title);

    catalog.save(catalog_path)?;
    Ok(())
}
