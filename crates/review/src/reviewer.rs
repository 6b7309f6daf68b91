//! The orchestrator: one call from a game to a finished review.

use engine_session::EngineSession;
use openings::OpeningBook;
use tokio::sync::watch;
use tracing::info;

use crate::accuracy::game_accuracy;
use crate::annotations::annotate_game;
use crate::error::ReviewError;
use crate::scheduler::{self, CancelToken, ReviewProgress, SchedulerConfig};
use crate::types::{GameRecord, GameReview, ReviewOutcome};

/// Drives a full-game review over one engine session.
///
/// The reviewer validates input, marks the session as batch-running for
/// the duration of the run, collects evaluations through the scheduler,
/// and derives annotations, accuracy, and the opening from the result.
/// Progress and cancellation are exposed to the caller; the result is
/// immutable once produced.
pub struct Reviewer {
    session: EngineSession,
    config: SchedulerConfig,
    book: OpeningBook,
    cancel: CancelToken,
    progress: watch::Sender<ReviewProgress>,
}

impl Reviewer {
    #[must_use]
    pub fn new(session: EngineSession, config: SchedulerConfig) -> Self {
        let (progress, _) = watch::channel(ReviewProgress::default());
        Self {
            session,
            config,
            book: OpeningBook::builtin(),
            cancel: CancelToken::new(),
            progress,
        }
    }

    /// Replaces the built-in opening book.
    #[must_use]
    pub fn with_book(mut self, book: OpeningBook) -> Self {
        self.book = book;
        self
    }

    /// Handle for cooperative cancellation of the current run.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Subscribes to progress updates.
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<ReviewProgress> {
        self.progress.subscribe()
    }

    /// Analyzes the whole game.
    ///
    /// Rejects malformed input before touching the engine. The session's
    /// batch flag is held for the duration and released on every exit
    /// path. Cancellation yields the partial series collected so far.
    pub async fn review(&self, game: &GameRecord) -> Result<ReviewOutcome, ReviewError> {
        validate(game)?;
        self.cancel.reset();

        let _batch = self.session.begin_batch();
        self.session.ready().await?;

        let batch = scheduler::collect_evaluations(
            &self.session,
            &game.fens,
            &self.config,
            &self.cancel,
            &self.progress,
        )
        .await?;

        if batch.cancelled {
            let _ = self.progress.send(ReviewProgress {
                current: batch.evaluations.len(),
                total: game.fens.len(),
                status: "Analysis cancelled".to_string(),
            });
            return Ok(ReviewOutcome::Cancelled {
                evaluations: batch.evaluations,
                best_moves: batch.best_moves,
            });
        }

        let annotations = annotate_game(&game.moves, &batch.evaluations, &batch.best_moves);
        // The evaluation series doubles as the best-reachable series; the
        // engine's own line is the reference play from every position.
        let accuracy = game_accuracy(game.moves.len(), &batch.evaluations, &batch.evaluations);
        let sans: Vec<&str> = game.moves.iter().map(|mv| mv.san.as_str()).collect();
        let opening = self.book.lookup(&sans).cloned();

        info!(
            moves = game.moves.len(),
            annotations = annotations.len(),
            opening = opening.as_ref().map(|o| o.name.as_str()),
            "review complete"
        );
        let _ = self.progress.send(ReviewProgress {
            current: game.fens.len(),
            total: game.fens.len(),
            status: "Analysis complete".to_string(),
        });

        Ok(ReviewOutcome::Complete(GameReview {
            evaluations: batch.evaluations,
            best_moves: batch.best_moves,
            annotations,
            white_accuracy: accuracy.white,
            black_accuracy: accuracy.black,
            opening,
        }))
    }
}

fn validate(game: &GameRecord) -> Result<(), ReviewError> {
    if game.fens.is_empty() {
        return Err(ReviewError::InvalidInput(
            "game has no positions".to_string(),
        ));
    }
    if game.fens.len() != game.moves.len() + 1 {
        return Err(ReviewError::InvalidInput(format!(
            "expected {} positions for {} moves, got {}",
            game.moves.len() + 1,
            game.moves.len(),
            game.fens.len()
        )));
    }
    if game.fens.iter().any(|fen| fen.trim().is_empty()) {
        return Err(ReviewError::InvalidInput("empty FEN string".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayedMove;

    fn mv(from: &str, to: &str, san: &str) -> PlayedMove {
        PlayedMove {
            from: from.to_string(),
            to: to.to_string(),
            promotion: None,
            san: san.to_string(),
        }
    }

    #[test]
    fn validate_rejects_empty_games() {
        let game = GameRecord {
            fens: vec![],
            moves: vec![],
        };
        assert!(matches!(
            validate(&game),
            Err(ReviewError::InvalidInput(_))
        ));
    }

    #[test]
    fn validate_rejects_mismatched_lengths() {
        let game = GameRecord {
            fens: vec!["8/8/8/8/8/8/8/8 w - - 0 1".to_string()],
            moves: vec![mv("e2", "e4", "e4")],
        };
        assert!(matches!(
            validate(&game),
            Err(ReviewError::InvalidInput(_))
        ));
    }

    #[test]
    fn validate_rejects_blank_fens() {
        let game = GameRecord {
            fens: vec!["8/8/8/8/8/8/8/8 w - - 0 1".to_string(), " ".to_string()],
            moves: vec![mv("e2", "e4", "e4")],
        };
        assert!(matches!(
            validate(&game),
            Err(ReviewError::InvalidInput(_))
        ));
    }

    #[test]
    fn validate_accepts_a_consistent_game() {
        let game = GameRecord {
            fens: vec![
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".to_string(),
                "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1".to_string(),
            ],
            moves: vec![mv("e2", "e4", "e4")],
        };
        assert!(validate(&game).is_ok());
    }
}
