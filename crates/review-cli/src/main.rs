//! Command-line game review.
//!
//! Reads a game record (FENs plus played moves) from a JSON file, drives
//! a UCI engine through a full review, and prints the results. Engine
//! path and search settings come from `review.toml`, overridable per
//! flag. Ctrl-C cancels the run and prints the partial series.

mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use engine_session::EngineSession;
use review::{count_annotations, Annotation, GameRecord, ReviewOutcome, Reviewer, SchedulerConfig};
use tracing::warn;

use config::ReviewConfig;

#[derive(Parser, Debug)]
#[command(name = "review-cli")]
#[command(about = "Analyze a chess game with a UCI engine")]
struct Args {
    /// JSON file holding the game record (fens + moves).
    game: PathBuf,

    /// UCI engine executable (overrides the config file).
    #[arg(long)]
    engine: Option<String>,

    /// Target search depth per position.
    #[arg(long)]
    depth: Option<u32>,

    /// Number of candidate lines to request.
    #[arg(long)]
    multipv: Option<u32>,

    /// Configuration file.
    #[arg(long, default_value = "review.toml")]
    config: PathBuf,

    /// Write the full review as JSON to this file.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = ReviewConfig::load(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    if let Some(engine) = args.engine {
        config.engine_path = engine;
    }
    if let Some(depth) = args.depth {
        config.depth = depth;
    }
    if let Some(multipv) = args.multipv {
        config.multipv = multipv;
    }

    let game: GameRecord = {
        let content = std::fs::read_to_string(&args.game)
            .with_context(|| format!("reading game file {}", args.game.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing game file {}", args.game.display()))?
    };

    let session = EngineSession::spawn(&config.engine_path)
        .with_context(|| format!("spawning engine {}", config.engine_path))?;

    let scheduler_config = SchedulerConfig {
        target_depth: config.depth,
        multipv: config.multipv,
        ..SchedulerConfig::default()
    };
    let reviewer = Reviewer::new(session.clone(), scheduler_config);

    let cancel = reviewer.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling analysis...");
            cancel.cancel();
        }
    });

    let mut progress = reviewer.progress();
    let printer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let status = progress.borrow().status.clone();
            eprintln!("{status}");
        }
    });

    let outcome = reviewer.review(&game).await;

    if let Err(error) = session.quit().await {
        warn!(%error, "engine did not quit cleanly");
    }
    printer.abort();

    match outcome? {
        ReviewOutcome::Complete(analysis) => {
            print_summary(&analysis);
            if let Some(path) = args.output {
                let json = serde_json::to_string_pretty(&analysis)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("writing review to {}", path.display()))?;
                println!("\nFull review written to {}", path.display());
            }
        }
        ReviewOutcome::Cancelled { evaluations, .. } => {
            eprintln!(
                "Cancelled after {} of {} positions",
                evaluations.len(),
                game.fens.len()
            );
        }
    }

    Ok(())
}

fn print_summary(analysis: &review::GameReview) {
    println!();
    if let Some(opening) = &analysis.opening {
        println!("Opening: {}", opening.description());
    }
    println!("White accuracy: {:.1}%", analysis.white_accuracy.overall);
    println!("Black accuracy: {:.1}%", analysis.black_accuracy.overall);

    let counts = count_annotations(&analysis.annotations);
    if !counts.is_empty() {
        println!("\nMove quality:");
        for annotation in Annotation::ALL {
            if let Some(count) = counts.get(&annotation) {
                println!("  {annotation:>10}: {count}");
            }
        }
    }
}
