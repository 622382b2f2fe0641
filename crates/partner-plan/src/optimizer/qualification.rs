use crate::plan::{QualificationRank, QualificationThreshold};
use crate::predictor::PredictionHints;

/// Threshold rule: the highest rank whose volume requirement is met. Pure and
/// monotonic in `volume`. Expects the table ladder-ascending (see
/// `PlanConfig::sorted_thresholds`).
pub(crate) fn estimate(thresholds: &[QualificationThreshold], volume: f64) -> QualificationRank {
    let mut rank = QualificationRank::None;
    for entry in thresholds {
        if volume >= entry.min_volume {
            rank = entry.rank;
        } else {
            break;
        }
    }
    rank
}

/// Applies a predictor hint on top of the threshold rule. An absent or
/// out-of-range hint leaves the threshold estimate untouched, so the pure
/// path is always the fallback.
pub(crate) fn refine(
    thresholds: &[QualificationThreshold],
    volume: f64,
    hints: Option<&PredictionHints>,
) -> (QualificationRank, bool) {
    let fallback = estimate(thresholds, volume);
    match hints {
        Some(hints) if hints.in_range() => match hints.qualification_rank() {
            Some(rank) => (rank, true),
            None => (fallback, false),
        },
        _ => (fallback, false),
    }
}
