//! The structure optimization pipeline: volume sizing, two-tier allocation,
//! qualification inference, income computation, and structure scoring,
//! orchestrated by [`StructureOptimizer`].

pub(crate) mod allocation;
pub(crate) mod income;
pub(crate) mod metrics;
pub(crate) mod qualification;
pub(crate) mod sizing;

use crate::plan::{
    OptimizationRequest, OptimizationResult, Partner, PlanConfig, PlanConfigError, PlayerProfile,
    PredictorOutcome, QualificationRank, StructureAssessment, StructureScores,
};
use crate::predictor::{FeatureVector, NoopPredictor, PredictorError, StructurePredictor};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// Caller-supplied values that violate a precondition. Surfaced immediately,
/// never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInput {
    #[error("target income must be positive (got {0})")]
    NonPositiveTargetIncome(f64),
    #[error("personal volume must be non-negative (got {0})")]
    NegativePersonalVolume(f64),
    #[error("partner volume must be non-negative (got {0})")]
    NegativePartnerVolume(f64),
    #[error("total volume must be non-negative (got {0})")]
    NegativeTotalVolume(f64),
    #[error("partner count must be at least 1")]
    EmptyPartnerCount,
    #[error("{volumes} partner volumes against {qualifications} qualifications")]
    LengthMismatch {
        volumes: usize,
        qualifications: usize,
    },
}

/// Boundary error taxonomy of the engine: bad caller input or a malformed
/// plan. Predictor failures are handled internally and never reach here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimizeError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
    #[error(transparent)]
    Configuration(#[from] PlanConfigError),
}

/// Stateless engine applying one plan configuration. Every call constructs
/// fresh values and leaves no state behind, so a single instance is safe to
/// share across threads.
pub struct StructureOptimizer {
    config: PlanConfig,
    predictor: Arc<dyn StructurePredictor>,
}

impl StructureOptimizer {
    /// Engine over the given plan with the default (always declining)
    /// predictor.
    pub fn new(config: PlanConfig) -> Result<Self, PlanConfigError> {
        Self::with_predictor(config, Arc::new(NoopPredictor))
    }

    pub fn with_predictor(
        config: PlanConfig,
        predictor: Arc<dyn StructurePredictor>,
    ) -> Result<Self, PlanConfigError> {
        config.validate()?;
        Ok(Self { config, predictor })
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Group volume needed to fund `target_income` at `target_rank`, safety
    /// margin included.
    pub fn required_volume(
        &self,
        target_income: f64,
        target_rank: QualificationRank,
    ) -> Result<f64, OptimizeError> {
        sizing::required_volume(&self.config, target_income, target_rank)
    }

    /// Splits a total volume across partners using the two-tier policy; key
    /// partners come first.
    pub fn allocate(&self, total_volume: f64, partner_count: usize) -> Result<Vec<f64>, OptimizeError> {
        allocation::allocate(&self.config.allocation, total_volume, partner_count)
            .map_err(OptimizeError::from)
    }

    /// Threshold-rule qualification for a group volume.
    pub fn estimate_qualification(&self, volume: f64) -> QualificationRank {
        qualification::estimate(&self.config.sorted_thresholds(), volume)
    }

    pub fn compute_income(
        &self,
        player_rank: QualificationRank,
        personal_volume: f64,
        partner_volumes: &[f64],
        qualifications: &[QualificationRank],
    ) -> Result<crate::plan::IncomeBreakdown, OptimizeError> {
        income::compute(
            &self.config,
            player_rank,
            personal_volume,
            partner_volumes,
            qualifications,
        )
    }

    pub fn evaluate_structure(
        &self,
        player_rank: QualificationRank,
        partner_volumes: &[f64],
        qualifications: &[QualificationRank],
    ) -> Result<StructureScores, OptimizeError> {
        metrics::evaluate(&self.config, player_rank, partner_volumes, qualifications)
            .map_err(OptimizeError::from)
    }

    /// Runs the full pipeline for one request. Any stage failure aborts the
    /// call; no partial results are produced.
    pub fn optimize(&self, request: &OptimizationRequest) -> Result<OptimizationResult, OptimizeError> {
        let profile = &request.profile;
        validate_profile(profile)?;

        let target_rank = match request.target_qualification {
            Some(rank) => rank,
            None => self.derive_target_rank(profile)?,
        };
        debug!(rank = %target_rank, "sizing structure");

        let required_volume = self.required_volume(profile.target_income, target_rank)?;

        let partner_count = match request.partner_count {
            Some(0) => return Err(InvalidInput::EmptyPartnerCount.into()),
            Some(count) => count,
            None => allocation::optimal_partner_count(&self.config, required_volume, target_rank),
        };

        let volumes = self.allocate(required_volume, partner_count)?;
        let thresholds = self.config.sorted_thresholds();
        let qualifications: Vec<QualificationRank> = volumes
            .iter()
            .map(|volume| qualification::estimate(&thresholds, *volume))
            .collect();

        let group_volume = profile.personal_volume + required_volume;
        let (projected, predictor_outcome) =
            self.projected_rank(profile, &volumes, &qualifications, group_volume);

        let expected_income = income::compute(
            &self.config,
            projected,
            profile.personal_volume,
            &volumes,
            &qualifications,
        )?;
        let scores = metrics::evaluate(&self.config, projected, &volumes, &qualifications)?;

        let partners = volumes
            .iter()
            .zip(&qualifications)
            .map(|(volume, rank)| Partner {
                volume: *volume,
                qualification: *rank,
                active: true,
                region: profile.region,
            })
            .collect();

        debug!(
            partners = partner_count,
            projected = %projected,
            income = expected_income.total,
            "structure optimized"
        );

        Ok(OptimizationResult {
            profile: profile.clone(),
            partners,
            target_qualification: target_rank,
            projected_qualification: projected,
            required_volume,
            expected_income,
            metrics: scores,
            currency: profile.region.currency().to_string(),
            total_in_currency: expected_income.total_in(profile.region),
            predictor: predictor_outcome,
            generated_at: Utc::now(),
        })
    }

    /// Income and metrics for an existing frontline, without reallocation.
    /// Inactive partners are excluded entirely; the player's qualification is
    /// re-estimated from the roster's group volume, never lower than the
    /// profile's current rank.
    pub fn assess(
        &self,
        profile: &PlayerProfile,
        partners: &[Partner],
    ) -> Result<StructureAssessment, OptimizeError> {
        if !profile.personal_volume.is_finite() || profile.personal_volume < 0.0 {
            return Err(InvalidInput::NegativePersonalVolume(profile.personal_volume).into());
        }

        let active: Vec<&Partner> = partners.iter().filter(|partner| partner.active).collect();
        let volumes: Vec<f64> = active.iter().map(|partner| partner.volume).collect();
        let qualifications: Vec<QualificationRank> =
            active.iter().map(|partner| partner.qualification).collect();

        let group_volume = profile.personal_volume + volumes.iter().sum::<f64>();
        let qualification = self
            .estimate_qualification(group_volume)
            .max(profile.qualification);

        let expected_income = income::compute(
            &self.config,
            qualification,
            profile.personal_volume,
            &volumes,
            &qualifications,
        )?;
        let scores = metrics::evaluate(&self.config, qualification, &volumes, &qualifications)?;

        Ok(StructureAssessment {
            qualification,
            group_volume,
            expected_income,
            metrics: scores,
            currency: profile.region.currency().to_string(),
            total_in_currency: expected_income.total_in(profile.region),
            generated_at: Utc::now(),
        })
    }

    /// Highest rank that is self-consistent for the income goal: sizing the
    /// volume at the rank's own coefficients must produce a group volume that
    /// qualifies for the rank. Falls back to M1 when no rank closes the loop.
    fn derive_target_rank(&self, profile: &PlayerProfile) -> Result<QualificationRank, OptimizeError> {
        if !(profile.target_income > 0.0) {
            return Err(InvalidInput::NonPositiveTargetIncome(profile.target_income).into());
        }

        let thresholds = self.config.sorted_thresholds();
        for rank in QualificationRank::ordered().into_iter().rev() {
            let rates = self.config.rates(rank)?;
            if rates.coefficient_sum() <= 0.0 {
                continue;
            }
            let volume = sizing::required_volume(&self.config, profile.target_income, rank)?;
            let projected = qualification::estimate(&thresholds, profile.personal_volume + volume);
            if projected >= rank {
                return Ok(rank);
            }
        }

        Ok(QualificationRank::M1)
    }

    fn projected_rank(
        &self,
        profile: &PlayerProfile,
        partner_volumes: &[f64],
        qualifications: &[QualificationRank],
        group_volume: f64,
    ) -> (QualificationRank, PredictorOutcome) {
        let features = FeatureVector::encode(profile, partner_volumes, qualifications);
        let thresholds = self.config.sorted_thresholds();

        match self.predictor.predict(&features) {
            Ok(hints) => {
                let (rank, refined) =
                    qualification::refine(&thresholds, group_volume, Some(&hints));
                if refined {
                    (rank, PredictorOutcome::Refined)
                } else {
                    warn!("predictor returned out-of-range hints, using threshold estimate");
                    (rank, PredictorOutcome::Degraded)
                }
            }
            Err(PredictorError::Declined) => {
                debug!("predictor declined, using threshold estimate");
                (
                    qualification::estimate(&thresholds, group_volume),
                    PredictorOutcome::Declined,
                )
            }
            Err(err) => {
                warn!(error = %err, "predictor unavailable, using threshold estimate");
                (
                    qualification::estimate(&thresholds, group_volume),
                    PredictorOutcome::Degraded,
                )
            }
        }
    }
}

fn validate_profile(profile: &PlayerProfile) -> Result<(), InvalidInput> {
    if !profile.personal_volume.is_finite() || profile.personal_volume < 0.0 {
        return Err(InvalidInput::NegativePersonalVolume(profile.personal_volume));
    }
    if !(profile.target_income > 0.0) {
        return Err(InvalidInput::NonPositiveTargetIncome(profile.target_income));
    }
    Ok(())
}
