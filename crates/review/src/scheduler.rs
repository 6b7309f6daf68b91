//! Batch analysis scheduler.
//!
//! Walks a game's positions one at a time over a single engine session
//! and decides, per position, when the search has converged enough to
//! take its evaluation. The scheduler is the session's sole client
//! during a run and must terminate in bounded time even if the engine
//! never answers; the per-position ceiling is what guarantees that.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use engine_session::{EngineSession, SessionSnapshot, SessionState};
use tokio::sync::watch;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uci::Score;

use crate::error::ReviewError;

/// Cooperative cancellation handle, checked once per poll tick.
///
/// Not preemptive: a command already sent to the engine may still be
/// acknowledged after cancellation, but its result is discarded.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Re-arms the token for a new run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Progress of a batch run, published after every poll tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewProgress {
    /// 0-based index of the position being analyzed.
    pub current: usize,
    pub total: usize,
    /// Human-readable status line.
    pub status: String,
}

impl Default for ReviewProgress {
    fn default() -> Self {
        Self {
            current: 0,
            total: 0,
            status: "idle".to_string(),
        }
    }
}

/// Scheduler timings and search parameters.
///
/// Everything is explicit so tests can shrink the clock.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Search depth requested from the engine.
    pub target_depth: u32,
    /// Candidate lines requested (MultiPV).
    pub multipv: u32,
    /// Poll interval.
    pub tick: Duration,
    /// How long depth and score may sit unchanged before a position at
    /// usable depth is taken as converged.
    pub stall_timeout: Duration,
    /// Hard wall-clock ceiling per position.
    pub position_ceiling: Duration,
    /// Pause between positions.
    pub inter_position_delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_depth: 18,
            multipv: 1,
            tick: Duration::from_millis(150),
            stall_timeout: Duration::from_millis(1800),
            position_ceiling: Duration::from_secs(10),
            inter_position_delay: Duration::from_millis(100),
        }
    }
}

impl SchedulerConfig {
    /// Depth at which a stalled search is still worth resolving.
    fn usable_depth(&self) -> u32 {
        self.target_depth.min(12)
    }
}

/// What a batch run collected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchEvaluations {
    /// White-positive centipawns, one per resolved position. Mate
    /// scores saturate at +/-10000.
    pub evaluations: Vec<i32>,
    /// Engine best move per resolved position, "" where none was seen.
    pub best_moves: Vec<String>,
    /// True when the run stopped early on the cancel token; the
    /// in-flight position contributed no entry.
    pub cancelled: bool,
}

enum PositionOutcome {
    Resolved { evaluation: i32, best_move: String },
    Cancelled,
}

/// Maps an engine score to the centipawn scale the pipeline works in.
#[must_use]
pub fn score_to_centipawns(score: Option<Score>) -> i32 {
    match score {
        Some(Score::Cp(value)) => value,
        Some(Score::Mate(n)) if n > 0 => 10_000,
        Some(Score::Mate(_)) => -10_000,
        None => 0,
    }
}

/// Analyzes every position in `fens` and collects one evaluation and
/// best move per position.
///
/// Progress is published through `progress` after every tick; the
/// cancel token is honored once per tick and stops the run without an
/// entry for the position in flight.
pub async fn collect_evaluations(
    session: &EngineSession,
    fens: &[String],
    config: &SchedulerConfig,
    cancel: &CancelToken,
    progress: &watch::Sender<ReviewProgress>,
) -> Result<BatchEvaluations, ReviewError> {
    let total = fens.len();
    let mut batch = BatchEvaluations::default();
    info!(positions = total, depth = config.target_depth, "batch analysis started");

    for (index, fen) in fens.iter().enumerate() {
        if cancel.is_cancelled() {
            batch.cancelled = true;
            break;
        }
        match analyze_position(session, fen, index, total, config, cancel, progress).await? {
            PositionOutcome::Resolved {
                evaluation,
                best_move,
            } => {
                batch.evaluations.push(evaluation);
                batch.best_moves.push(best_move);
            }
            PositionOutcome::Cancelled => {
                batch.cancelled = true;
                break;
            }
        }
        if index + 1 < total {
            tokio::time::sleep(config.inter_position_delay).await;
        }
    }

    info!(
        resolved = batch.evaluations.len(),
        cancelled = batch.cancelled,
        "batch analysis finished"
    );
    Ok(batch)
}

async fn analyze_position(
    session: &EngineSession,
    fen: &str,
    index: usize,
    total: usize,
    config: &SchedulerConfig,
    cancel: &CancelToken,
    progress: &watch::Sender<ReviewProgress>,
) -> Result<PositionOutcome, ReviewError> {
    session.set_position(Some(fen.to_string()), vec![]).await?;
    session.go(config.target_depth, config.multipv).await?;

    let started = Instant::now();
    let mut ticker = interval(config.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut top_depth = 0u32;
    let mut signature = String::new();
    let mut last_change = Instant::now();

    loop {
        ticker.tick().await;

        // Cancellation outranks every resolution condition.
        if cancel.is_cancelled() {
            debug!(position = index, "analysis cancelled mid-position");
            let _ = session.stop().await;
            return Ok(PositionOutcome::Cancelled);
        }

        let snapshot = session.snapshot();
        if snapshot.state == SessionState::Terminated {
            let reason = snapshot
                .error
                .clone()
                .unwrap_or_else(|| "engine terminated".to_string());
            return Err(ReviewError::SessionLost(reason));
        }

        if let Some(report) = &snapshot.last_info {
            let depth = report.depth.unwrap_or(0);
            let score_signature = report
                .score
                .map(|score| score.signature())
                .unwrap_or_default();
            if depth > top_depth || score_signature != signature {
                top_depth = top_depth.max(depth);
                signature = score_signature;
                last_change = Instant::now();
            }
        }

        let _ = progress.send(ReviewProgress {
            current: index,
            total,
            status: format!(
                "Analyzing position {}/{} (depth {})",
                index + 1,
                total,
                top_depth
            ),
        });

        // True completion: the engine finished on its own.
        if !snapshot.is_busy() && snapshot.best_move.is_some() {
            return Ok(resolve(&snapshot));
        }
        // Target depth reached.
        if top_depth >= config.target_depth {
            return stop_and_capture(session, config).await;
        }
        // Stalled at a usable depth; marginal depth gains are not worth
        // an unbounded wait.
        if top_depth >= config.usable_depth() && last_change.elapsed() >= config.stall_timeout {
            debug!(position = index, depth = top_depth, "search stalled, resolving");
            return stop_and_capture(session, config).await;
        }
        // Hard ceiling: take whatever exists, even nothing.
        if started.elapsed() > config.position_ceiling {
            warn!(position = index, "position hit the analysis ceiling");
            return stop_and_capture(session, config).await;
        }
    }
}

/// Stops the search, waits one grace tick for the engine's final
/// report, and resolves from whatever the snapshot then holds.
async fn stop_and_capture(
    session: &EngineSession,
    config: &SchedulerConfig,
) -> Result<PositionOutcome, ReviewError> {
    session.stop().await?;
    tokio::time::sleep(config.tick).await;
    Ok(resolve(&session.snapshot()))
}

fn resolve(snapshot: &SessionSnapshot) -> PositionOutcome {
    let evaluation = score_to_centipawns(snapshot.last_info.as_ref().and_then(|info| info.score));
    let best_move = snapshot
        .best_move
        .as_ref()
        .map(|best| best.mv.clone())
        .or_else(|| {
            snapshot
                .last_info
                .as_ref()
                .and_then(|info| info.pv.first().cloned())
        })
        .unwrap_or_default();
    PositionOutcome::Resolved {
        evaluation,
        best_move,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mate_scores_saturate() {
        assert_eq!(score_to_centipawns(Some(Score::Mate(3))), 10_000);
        assert_eq!(score_to_centipawns(Some(Score::Mate(-2))), -10_000);
        assert_eq!(score_to_centipawns(Some(Score::Mate(0))), -10_000);
    }

    #[test]
    fn centipawn_scores_pass_through() {
        assert_eq!(score_to_centipawns(Some(Score::Cp(-42))), -42);
        assert_eq!(score_to_centipawns(None), 0);
    }

    #[test]
    fn usable_depth_is_capped_at_twelve() {
        let mut config = SchedulerConfig::default();
        assert_eq!(config.usable_depth(), 12);
        config.target_depth = 8;
        assert_eq!(config.usable_depth(), 8);
    }

    #[test]
    fn cancel_token_is_sticky_until_reset() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        let clone = token.clone();
        assert!(clone.is_cancelled());
        token.reset();
        assert!(!clone.is_cancelled());
    }
}
