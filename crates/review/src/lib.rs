//! Full-game analysis on top of a single UCI engine session.
//!
//! The pipeline walks a game position by position through the
//! [`scheduler`], turning the engine's evaluation stream into one
//! centipawn number and one best move per position, then derives the
//! human-facing judgments: per-move [`annotations`], per-player
//! [`accuracy`] percentages, and the opening played. The [`Reviewer`]
//! composes all of it behind one call.

pub mod accuracy;
pub mod annotations;
pub mod error;
pub mod reviewer;
pub mod scheduler;
pub mod types;

pub use accuracy::{game_accuracy, AccuracyMetrics, GameAccuracy};
pub use annotations::{annotate_game, classify_move, count_annotations, Annotation, MoveAnnotation};
pub use error::ReviewError;
pub use reviewer::Reviewer;
pub use scheduler::{BatchEvaluations, CancelToken, ReviewProgress, SchedulerConfig};
pub use types::{GameRecord, GameReview, PlayedMove, ReviewOutcome};
