//! Accuracy scoring from the evaluation series.
//!
//! Centipawn evaluations are mapped to expected points with a logistic
//! transform, and per-move accuracy follows the published
//! WintrChess/Chess.com curve: `103.16 * exp(-4 * loss) - 3.17`,
//! clamped to 0..=100.

use serde::{Deserialize, Serialize};

/// Gradient of the centipawns-to-expected-points logistic.
const CENTIPAWN_GRADIENT: f64 = 0.0035;

/// Accuracy summary for one player.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    /// Mean accuracy over all of the player's moves, 0-100.
    pub overall: f64,
    /// Mean accuracy over full moves 0-9; 0 if the player made none.
    pub opening: f64,
    /// Mean accuracy over full moves 10-29.
    pub middlegame: f64,
    /// Mean accuracy over full moves 30+.
    pub endgame: f64,
    /// Moves within 10cp of best.
    pub best_moves: usize,
    /// Moves within 25cp of best; best moves count here too.
    pub good_moves: usize,
    /// 25-100cp loss.
    pub inaccuracies: usize,
    /// 100-200cp loss.
    pub mistakes: usize,
    /// More than 200cp loss.
    pub blunders: usize,
}

/// Both players' metrics for one game.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameAccuracy {
    pub white: AccuracyMetrics,
    pub black: AccuracyMetrics,
}

/// Expected points (win probability, 0-1) for a White-positive eval.
fn expected_points(evaluation: f64) -> f64 {
    1.0 / (1.0 + (-CENTIPAWN_GRADIENT * evaluation).exp())
}

/// Expected-points loss of a move against the best available eval.
///
/// Both evals are White-positive; the loss is taken from the mover's
/// side and never negative.
fn point_loss(eval_after: i32, best_eval: i32, white_move: bool) -> f64 {
    let sign = if white_move { 1.0 } else { -1.0 };
    let best = expected_points(f64::from(best_eval) * sign);
    let actual = expected_points(f64::from(eval_after) * sign);
    (best - actual).max(0.0)
}

/// Accuracy of a single move, 0-100.
#[must_use]
pub fn move_accuracy(eval_after: i32, best_eval: i32, white_move: bool) -> f64 {
    let loss = point_loss(eval_after, best_eval, white_move);
    (103.16 * (-4.0 * loss).exp() - 3.17).clamp(0.0, 100.0)
}

fn game_phase(full_move: usize) -> usize {
    if full_move < 10 {
        0
    } else if full_move < 30 {
        1
    } else {
        2
    }
}

/// Computes one player's metrics.
///
/// `evaluations` has `move_count + 1` entries; `best_evals` carries the
/// eval reachable with the engine's best move from each position (in
/// practice the scheduler supplies the evaluation series itself).
#[must_use]
pub fn player_accuracy(
    move_count: usize,
    evaluations: &[i32],
    best_evals: &[i32],
    white: bool,
) -> AccuracyMetrics {
    let mut metrics = AccuracyMetrics::default();
    let mut total = 0.0;
    let mut counted = 0usize;
    let mut phases: [Vec<f64>; 3] = [Vec::new(), Vec::new(), Vec::new()];

    for index in 0..move_count {
        if (index % 2 == 0) != white {
            continue;
        }
        let (Some(&before), Some(&after), Some(&best)) = (
            evaluations.get(index),
            evaluations.get(index + 1),
            best_evals.get(index),
        ) else {
            break;
        };

        let accuracy = move_accuracy(after, best, white);
        total += accuracy;
        counted += 1;
        phases[game_phase(index / 2)].push(accuracy);

        // Raw centipawn loss against the best move, mover-relative.
        let actual_change = if white { after - before } else { before - after };
        let best_change = if white { best - before } else { before - best };
        let eval_loss = (best_change - actual_change).max(0);

        if eval_loss <= 10 {
            metrics.best_moves += 1;
            metrics.good_moves += 1;
        } else if eval_loss <= 25 {
            metrics.good_moves += 1;
        } else if eval_loss <= 100 {
            metrics.inaccuracies += 1;
        } else if eval_loss <= 200 {
            metrics.mistakes += 1;
        } else {
            metrics.blunders += 1;
        }
    }

    if counted == 0 {
        return metrics;
    }

    let mean = |values: &[f64]| {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    };
    metrics.overall = total / counted as f64;
    metrics.opening = mean(&phases[0]);
    metrics.middlegame = mean(&phases[1]);
    metrics.endgame = mean(&phases[2]);
    metrics
}

/// Computes both players' metrics.
#[must_use]
pub fn game_accuracy(move_count: usize, evaluations: &[i32], best_evals: &[i32]) -> GameAccuracy {
    GameAccuracy {
        white: player_accuracy(move_count, evaluations, best_evals, true),
        black: player_accuracy(move_count, evaluations, best_evals, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.05
    }

    #[test]
    fn zero_loss_is_maximal_accuracy() {
        // Best achieved: the curve tops out at 103.16 - 3.17.
        assert!(close(move_accuracy(110, 110, true), 99.99));
        assert!(close(move_accuracy(-110, -110, false), 99.99));
    }

    #[test]
    fn hundred_cp_loss_accuracy() {
        // P(100) - P(0) = 0.0866 loss on the logistic curve.
        assert!(close(move_accuracy(0, 100, true), 69.78));
    }

    #[test]
    fn gaining_over_best_never_exceeds_the_cap() {
        let accuracy = move_accuracy(300, 100, true);
        assert!(accuracy <= 100.0);
        assert!(close(accuracy, 99.99));
    }

    #[test]
    fn black_loss_mirrors_white() {
        // Black letting the eval rise from their best of -100 to 0 loses
        // exactly what White loses in the mirrored case.
        assert!(close(
            move_accuracy(0, -100, false),
            move_accuracy(0, 100, true)
        ));
    }

    #[test]
    fn huge_loss_floors_at_zero() {
        assert_eq!(move_accuracy(-10_000, 10_000, true), 0.0);
    }

    #[test]
    fn player_without_moves_has_zeroed_metrics() {
        let metrics = player_accuracy(1, &[0, 0], &[0, 0], false);
        assert_eq!(metrics, AccuracyMetrics::default());
    }

    #[test]
    fn perfect_play_counts_every_move_as_best() {
        // Four moves, no eval movement at all.
        let evaluations = vec![0, 0, 0, 0, 0];
        let accuracy = game_accuracy(4, &evaluations, &evaluations);
        assert_eq!(accuracy.white.best_moves, 2);
        assert_eq!(accuracy.white.good_moves, 2);
        assert_eq!(accuracy.black.best_moves, 2);
        assert!(close(accuracy.white.overall, 99.99));
    }

    #[test]
    fn categories_follow_eval_loss_thresholds() {
        // White's two moves: first loses 80cp (inaccuracy), second loses
        // 300cp (blunder). Black stands pat.
        let evaluations = vec![0, -80, -80, -380, -380];
        let accuracy = game_accuracy(4, &evaluations, &evaluations);
        assert_eq!(accuracy.white.inaccuracies, 1);
        assert_eq!(accuracy.white.blunders, 1);
        assert_eq!(accuracy.white.best_moves, 0);
        assert_eq!(accuracy.black.best_moves, 2);
    }

    #[test]
    fn phase_buckets_split_by_full_move_number() {
        // 22 full moves of no-op evals: White has 10 opening moves and
        // 12 middlegame moves, nothing in the endgame bucket.
        let move_count = 44;
        let evaluations = vec![0; move_count + 1];
        let metrics = player_accuracy(move_count, &evaluations, &evaluations, true);
        assert!(close(metrics.opening, 99.99));
        assert!(close(metrics.middlegame, 99.99));
        assert_eq!(metrics.endgame, 0.0);
    }

    #[test]
    fn overall_is_the_mean_over_the_players_moves() {
        // White: one perfect move, one 100cp loss.
        let evaluations = vec![100, 100, 100, 0, 0];
        let metrics = player_accuracy(4, &evaluations, &evaluations, true);
        let expected = (99.99 + 69.78) / 2.0;
        assert!((metrics.overall - expected).abs() < 0.1);
    }
}
