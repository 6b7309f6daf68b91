//! Move classification from evaluation swings.
//!
//! Pure functions, no engine access. Evaluations are absolute
//! (White-positive) centipawns; the cascade works on the mover-relative
//! change and the mover-relative view of the position.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::PlayedMove;

/// Quality tag for a single move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Annotation {
    /// Unexpected improvement in an already good position.
    Brilliant,
    /// Saving move that rescues a bad position.
    Critical,
    /// The engine's top choice.
    Best,
    /// Within 20cp of best.
    Excellent,
    /// Within 50cp of best.
    Okay,
    /// 50-100cp loss.
    Inaccuracy,
    /// 100-200cp loss.
    Mistake,
    /// More than 200cp loss that objectively worsens the position.
    Blunder,
    /// Early move close to best; book territory.
    Theory,
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Annotation::Brilliant => "brilliant",
            Annotation::Critical => "critical",
            Annotation::Best => "best",
            Annotation::Excellent => "excellent",
            Annotation::Okay => "okay",
            Annotation::Inaccuracy => "inaccuracy",
            Annotation::Mistake => "mistake",
            Annotation::Blunder => "blunder",
            Annotation::Theory => "theory",
        };
        f.pad(label)
    }
}

impl Annotation {
    /// Every tag, in display order from strongest praise to worst error.
    pub const ALL: [Annotation; 9] = [
        Annotation::Brilliant,
        Annotation::Critical,
        Annotation::Best,
        Annotation::Excellent,
        Annotation::Okay,
        Annotation::Theory,
        Annotation::Inaccuracy,
        Annotation::Mistake,
        Annotation::Blunder,
    ];
}

/// An annotated move within a reviewed game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAnnotation {
    /// Half-move index into the game, 0 = White's first move.
    pub move_index: usize,
    pub annotation: Annotation,
    pub eval_before: i32,
    pub eval_after: i32,
    /// Evaluation change from the mover's perspective.
    pub eval_change: i32,
    /// The engine's preferred move, when one was recorded.
    pub best_move: Option<String>,
    /// The move actually played, in UCI notation.
    pub played: String,
    pub white_move: bool,
}

/// Classifies one move.
///
/// `ply` is the 0-based half-move index; the theory window covers the
/// first ten full moves (ply < 20). The cascade order is fixed: theory
/// shadows best, the upgrade rules (brilliant, critical) shadow the
/// closeness buckets, and the downgrade guards keep hopeless positions
/// from collecting blunder after blunder. Returns `None` for a neutral
/// move.
#[must_use]
pub fn classify_move(
    eval_before: i32,
    eval_after: i32,
    white_move: bool,
    ply: usize,
    is_engine_best: bool,
) -> Option<Annotation> {
    let change = if white_move {
        eval_after - eval_before
    } else {
        eval_before - eval_after
    };
    // The position as the mover sees it, before and after.
    let (pre, post) = if white_move {
        (eval_before, eval_after)
    } else {
        (-eval_before, -eval_after)
    };

    if ply < 20 && change.abs() <= 50 {
        return Some(Annotation::Theory);
    }
    if is_engine_best {
        return Some(Annotation::Best);
    }
    if change > 80 && post > 100 {
        return Some(Annotation::Brilliant);
    }
    if pre < -100 && change > 150 && post.abs() < 100 {
        return Some(Annotation::Critical);
    }
    if change.abs() <= 20 {
        return Some(Annotation::Excellent);
    }
    if change.abs() <= 50 {
        return Some(Annotation::Okay);
    }

    let already_lost = pre < -300;

    if (-100..-50).contains(&change) {
        return Some(Annotation::Inaccuracy);
    }
    if (-200..-100).contains(&change) {
        // Holding on in a lost position is not penalized.
        if already_lost && post > -500 {
            return None;
        }
        return Some(Annotation::Mistake);
    }
    if change < -200 {
        if already_lost && post > -600 {
            return Some(Annotation::Mistake);
        }
        // Still clearly winning afterwards; just less winning.
        if post > 200 {
            return Some(Annotation::Mistake);
        }
        return Some(Annotation::Blunder);
    }

    None
}

/// Annotates every move of a game that warrants a tag.
///
/// `evaluations` holds one entry per position (`moves.len() + 1`);
/// `best_moves` holds the engine's choice per position, empty string
/// where none was recorded.
#[must_use]
pub fn annotate_game(
    moves: &[PlayedMove],
    evaluations: &[i32],
    best_moves: &[String],
) -> Vec<MoveAnnotation> {
    let mut annotations = Vec::new();
    if evaluations.len() < 2 {
        return annotations;
    }

    for (index, mv) in moves.iter().enumerate() {
        let (Some(&eval_before), Some(&eval_after)) =
            (evaluations.get(index), evaluations.get(index + 1))
        else {
            break;
        };
        let white_move = index % 2 == 0;
        let played = mv.uci();
        let best_move = best_moves
            .get(index)
            .filter(|best| !best.is_empty())
            .cloned();
        let is_engine_best = best_move.as_deref() == Some(played.as_str());

        if let Some(annotation) =
            classify_move(eval_before, eval_after, white_move, index, is_engine_best)
        {
            let eval_change = if white_move {
                eval_after - eval_before
            } else {
                eval_before - eval_after
            };
            annotations.push(MoveAnnotation {
                move_index: index,
                annotation,
                eval_before,
                eval_after,
                eval_change,
                best_move,
                played,
                white_move,
            });
        }
    }

    annotations
}

/// Tallies annotations by tag.
#[must_use]
pub fn count_annotations(annotations: &[MoveAnnotation]) -> HashMap<Annotation, usize> {
    let mut counts = HashMap::new();
    for annotation in annotations {
        *counts.entry(annotation.annotation).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    // Past the theory window unless a test says otherwise.
    const MIDGAME_PLY: usize = 24;

    #[test]
    fn early_move_near_best_is_theory() {
        assert_eq!(
            classify_move(20, 30, true, 0, false),
            Some(Annotation::Theory)
        );
        assert_eq!(
            classify_move(20, 30, true, 19, true),
            Some(Annotation::Theory)
        );
    }

    #[test]
    fn theory_window_closes_at_ply_twenty() {
        assert_eq!(
            classify_move(20, 30, true, 20, false),
            Some(Annotation::Excellent)
        );
    }

    #[test]
    fn engine_choice_is_best_after_theory_window() {
        assert_eq!(
            classify_move(0, -120, true, MIDGAME_PLY, true),
            Some(Annotation::Best)
        );
    }

    #[test]
    fn big_improvement_in_winning_position_is_brilliant() {
        // Change +90, post-move eval 150.
        assert_eq!(
            classify_move(60, 150, true, MIDGAME_PLY, false),
            Some(Annotation::Brilliant)
        );
    }

    #[test]
    fn rescue_from_lost_position_is_critical() {
        // Pre -150, change +160, post +10.
        assert_eq!(
            classify_move(-150, 10, true, MIDGAME_PLY, false),
            Some(Annotation::Critical)
        );
    }

    #[test]
    fn small_changes_are_excellent_then_okay() {
        assert_eq!(
            classify_move(0, 10, true, MIDGAME_PLY, false),
            Some(Annotation::Excellent)
        );
        assert_eq!(
            classify_move(0, -45, true, MIDGAME_PLY, false),
            Some(Annotation::Okay)
        );
    }

    #[test]
    fn inaccuracy_band() {
        assert_eq!(
            classify_move(0, -51, true, MIDGAME_PLY, false),
            Some(Annotation::Inaccuracy)
        );
        assert_eq!(
            classify_move(0, -100, true, MIDGAME_PLY, false),
            Some(Annotation::Inaccuracy)
        );
    }

    #[test]
    fn mistake_band() {
        assert_eq!(
            classify_move(0, -101, true, MIDGAME_PLY, false),
            Some(Annotation::Mistake)
        );
        assert_eq!(
            classify_move(0, -200, true, MIDGAME_PLY, false),
            Some(Annotation::Mistake)
        );
    }

    #[test]
    fn holding_a_lost_position_is_not_a_mistake() {
        // Already at -350, drifts to -480: no annotation.
        assert_eq!(classify_move(-350, -480, true, MIDGAME_PLY, false), None);
        // But collapsing past -500 still counts.
        assert_eq!(
            classify_move(-350, -510, true, MIDGAME_PLY, false),
            Some(Annotation::Mistake)
        );
    }

    #[test]
    fn big_loss_is_a_blunder() {
        assert_eq!(
            classify_move(0, -250, true, MIDGAME_PLY, false),
            Some(Annotation::Blunder)
        );
    }

    #[test]
    fn blunder_downgrades_when_already_lost_or_still_winning() {
        // Already lost, not catastrophic: mistake.
        assert_eq!(
            classify_move(-350, -590, true, MIDGAME_PLY, false),
            Some(Annotation::Mistake)
        );
        // Was +500, still +250 after: mistake, not blunder.
        assert_eq!(
            classify_move(500, 250, true, MIDGAME_PLY, false),
            Some(Annotation::Mistake)
        );
    }

    #[test]
    fn black_perspective_mirrors_white() {
        // Black improves: eval drops from +150 to -160 in absolute terms.
        assert_eq!(
            classify_move(150, -160, false, MIDGAME_PLY, false),
            Some(Annotation::Brilliant)
        );
        // Black blunders: eval jumps from 0 to +250.
        assert_eq!(
            classify_move(0, 250, false, MIDGAME_PLY, false),
            Some(Annotation::Blunder)
        );
    }

    #[test]
    fn neutral_moves_get_no_annotation() {
        // +60 gain without a winning post position matches nothing.
        assert_eq!(classify_move(0, 60, true, MIDGAME_PLY, false), None);
    }

    fn mv(from: &str, to: &str, san: &str) -> PlayedMove {
        PlayedMove {
            from: from.to_string(),
            to: to.to_string(),
            promotion: None,
            san: san.to_string(),
        }
    }

    #[test]
    fn annotate_game_tags_each_move_with_parity() {
        let moves = vec![mv("e2", "e4", "e4"), mv("e7", "e5", "e5")];
        let evaluations = vec![20, 30, 25];
        let best_moves = vec!["e2e4".to_string(), "e7e5".to_string()];

        let annotations = annotate_game(&moves, &evaluations, &best_moves);
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].annotation, Annotation::Theory);
        assert!(annotations[0].white_move);
        assert_eq!(annotations[0].eval_change, 10);
        assert!(!annotations[1].white_move);
        assert_eq!(annotations[1].eval_change, 5);
        assert_eq!(annotations[1].best_move.as_deref(), Some("e7e5"));
    }

    #[test]
    fn annotate_game_skips_neutral_moves() {
        let moves = vec![mv("g1", "f3", "Nf3")];
        // A +60 swing misses the 50cp theory window and every other rule.
        let evaluations = vec![0, 60];
        let annotations = annotate_game(&moves, &evaluations, &[String::new()]);
        assert!(annotations.is_empty());
    }

    #[test]
    fn annotate_game_without_evaluations_is_empty() {
        let moves = vec![mv("e2", "e4", "e4")];
        assert!(annotate_game(&moves, &[0], &[]).is_empty());
    }

    #[test]
    fn count_annotations_tallies_by_tag() {
        let moves = vec![mv("e2", "e4", "e4"), mv("e7", "e5", "e5")];
        let evaluations = vec![20, 30, 25];
        let annotations = annotate_game(&moves, &evaluations, &[]);
        let counts = count_annotations(&annotations);
        assert_eq!(counts.get(&Annotation::Theory), Some(&2));
    }
}
