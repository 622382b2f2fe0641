//! Pluggable learned-predictor seam. The engine is fully correct with the
//! threshold rules alone; a predictor can only refine estimates, never gate
//! them.

use crate::plan::{PlayerProfile, QualificationRank};

pub const FEATURE_LEN: usize = 8;

/// Fixed-length numeric encoding of an optimization request. The same profile
/// and allocation always encode to the same vector.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_LEN]);

impl FeatureVector {
    pub fn encode(
        profile: &PlayerProfile,
        partner_volumes: &[f64],
        qualifications: &[QualificationRank],
    ) -> Self {
        let count = partner_volumes.len();
        let total: f64 = partner_volumes.iter().sum();
        let mean = if count > 0 { total / count as f64 } else { 0.0 };
        let top_share = if total > 0.0 {
            partner_volumes.iter().cloned().fold(0.0, f64::max) / total
        } else {
            0.0
        };
        let qualified_fraction = if count > 0 {
            qualifications
                .iter()
                .filter(|rank| **rank > QualificationRank::None)
                .count() as f64
                / count as f64
        } else {
            0.0
        };

        Self([
            profile.personal_volume,
            profile.qualification.index() as f64,
            profile.target_income,
            count as f64,
            total,
            mean,
            top_share,
            qualified_fraction,
        ])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Raw predictor output. Hints are validated by the engine before use:
/// `qualification` must round to a ladder index, `growth` and `risk` must lie
/// in `[0, 1]`, `income` must be non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionHints {
    pub qualification: f64,
    pub income: f64,
    pub growth: f64,
    pub risk: f64,
}

impl PredictionHints {
    /// Decodes the qualification hint, or `None` when it is out of range.
    pub fn qualification_rank(&self) -> Option<QualificationRank> {
        if !self.qualification.is_finite() || self.qualification < 0.0 {
            return None;
        }
        QualificationRank::from_index(self.qualification.round() as usize)
    }

    pub fn in_range(&self) -> bool {
        self.qualification_rank().is_some()
            && self.income.is_finite()
            && self.income >= 0.0
            && (0.0..=1.0).contains(&self.growth)
            && (0.0..=1.0).contains(&self.risk)
    }
}

/// Internal, recoverable failure of the learned predictor. Converted into a
/// threshold-rule fallback by the engine and never surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("prediction declined")]
    Declined,
    #[error("prediction timed out after {0}ms")]
    Timeout(u64),
    #[error("predictor backend failed: {0}")]
    Backend(String),
}

/// A single fallible prediction operation over an encoded feature vector.
pub trait StructurePredictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<PredictionHints, PredictorError>;
}

/// Default predictor: always declines, leaving the engine on the pure
/// threshold path.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPredictor;

impl StructurePredictor for NoopPredictor {
    fn predict(&self, _features: &FeatureVector) -> Result<PredictionHints, PredictorError> {
        Err(PredictorError::Declined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Region;

    fn profile() -> PlayerProfile {
        PlayerProfile {
            personal_volume: 200.0,
            qualification: QualificationRank::M1,
            target_income: 5_000.0,
            region: Region::Ru,
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let volumes = [400.0, 100.0];
        let quals = [QualificationRank::M2, QualificationRank::None];
        let a = FeatureVector::encode(&profile(), &volumes, &quals);
        let b = FeatureVector::encode(&profile(), &volumes, &quals);
        assert_eq!(a, b);
        assert_eq!(a.as_slice()[3], 2.0);
        assert_eq!(a.as_slice()[4], 500.0);
        assert_eq!(a.as_slice()[6], 0.8);
        assert_eq!(a.as_slice()[7], 0.5);
    }

    #[test]
    fn noop_predictor_declines() {
        let features = FeatureVector::encode(&profile(), &[], &[]);
        assert!(matches!(
            NoopPredictor.predict(&features),
            Err(PredictorError::Declined)
        ));
    }

    #[test]
    fn out_of_range_hints_are_detected() {
        let valid = PredictionHints {
            qualification: 3.0,
            income: 100.0,
            growth: 0.5,
            risk: 0.2,
        };
        assert!(valid.in_range());
        assert_eq!(valid.qualification_rank(), Some(QualificationRank::M3));

        let out_of_ladder = PredictionHints {
            qualification: 99.0,
            ..valid
        };
        assert!(!out_of_ladder.in_range());

        let bad_risk = PredictionHints { risk: 1.5, ..valid };
        assert!(!bad_risk.in_range());
    }
}
