//! Game input and analysis result types.

use openings::OpeningMatch;
use serde::{Deserialize, Serialize};

use crate::accuracy::AccuracyMetrics;
use crate::annotations::MoveAnnotation;

/// One played move, as supplied by the collaborator that owns the rules.
///
/// Colors are inferred from position parity: even indices are White.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedMove {
    /// Source square (e.g. "e2").
    pub from: String,
    /// Destination square (e.g. "e4").
    pub to: String,
    /// Promotion piece letter, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
    /// The move in SAN (e.g. "Nf3"), used for opening lookup.
    pub san: String,
}

impl PlayedMove {
    /// The move in UCI coordinate notation, the form engines report.
    #[must_use]
    pub fn uci(&self) -> String {
        match &self.promotion {
            Some(promotion) => format!("{}{}{}", self.from, self.to, promotion),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

/// A full game to review: every position as FEN plus the moves between
/// them. `fens.len()` must equal `moves.len() + 1`; index 0 is the
/// starting position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub fens: Vec<String>,
    pub moves: Vec<PlayedMove>,
}

/// The finished analysis of a game. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameReview {
    /// One White-positive centipawn evaluation per position,
    /// `moves.len() + 1` entries.
    pub evaluations: Vec<i32>,
    /// Engine best move per position, empty string where none was seen.
    pub best_moves: Vec<String>,
    /// Annotations for the moves that warrant one.
    pub annotations: Vec<MoveAnnotation>,
    pub white_accuracy: AccuracyMetrics,
    pub black_accuracy: AccuracyMetrics,
    /// The opening played, when the book knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening: Option<OpeningMatch>,
}

/// How a review run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    Complete(GameReview),
    /// The run was cancelled; carries whatever was collected, with no
    /// entry for the position that was in flight.
    Cancelled {
        evaluations: Vec<i32>,
        best_moves: Vec<String>,
    },
}
