use super::domain::QualificationRank;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-rank coefficients for the three volume-driven bonus channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusRates {
    pub group: f64,
    pub partner: f64,
    pub club: f64,
}

impl BonusRates {
    pub fn coefficient_sum(&self) -> f64 {
        self.group + self.partner + self.club
    }
}

/// Group-volume requirement and minimum frontline size for one rank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualificationThreshold {
    pub rank: QualificationRank,
    pub min_volume: f64,
    pub min_partners: usize,
}

/// Two-tier allocation policy. The key tier anchors most of the structure's
/// volume; shares and tier sizing are business policy, not derived values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationPolicy {
    /// Fraction of the total volume given to the key tier.
    pub key_volume_share: f64,
    /// Fraction of the partner count placed in the key tier.
    pub key_count_fraction: f64,
    /// Lower bound on key-tier size; structures at or below it are all-key.
    pub min_key_partners: usize,
}

/// Club-bonus gate: the structure must hold at least `min_partners` partners
/// at `min_rank` or better before the club channel pays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClubRule {
    pub min_rank: QualificationRank,
    pub min_partners: usize,
}

/// Weights of the three risk sub-scores; must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    pub dependency: f64,
    pub compression: f64,
    pub stability: f64,
}

impl RiskWeights {
    pub fn sum(&self) -> f64 {
        self.dependency + self.compression + self.stability
    }
}

/// Raised when the injected plan tables are malformed. Indicates a setup
/// defect, never a transient condition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanConfigError {
    #[error("no bonus rates configured for rank {0}")]
    MissingRates(QualificationRank),
    #[error("negative {channel} rate configured for rank {rank}")]
    NegativeRate {
        rank: QualificationRank,
        channel: &'static str,
    },
    #[error("bonus coefficient sum for rank {0} is zero")]
    ZeroCoefficientSum(QualificationRank),
    #[error("no qualification threshold configured for rank {0}")]
    MissingThreshold(QualificationRank),
    #[error("qualification thresholds must not decrease along the ladder (rank {0})")]
    UnorderedThresholds(QualificationRank),
    #[error("allocation policy invalid: {0}")]
    InvalidAllocation(&'static str),
    #[error("club rule invalid: {0}")]
    InvalidClubRule(&'static str),
    #[error("risk weights must be non-negative and sum to 1.0 (sum is {0})")]
    InvalidRiskWeights(f64),
    #[error("sizing policy invalid: {0}")]
    InvalidSizing(&'static str),
}

/// Complete compensation-plan configuration, injected into the engine at
/// construction time. `Default` carries the published plan tables; any field
/// can be overridden for alternative plan variants or tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub rates: BTreeMap<QualificationRank, BonusRates>,
    pub thresholds: Vec<QualificationThreshold>,
    pub allocation: AllocationPolicy,
    pub club: ClubRule,
    pub risk_weights: RiskWeights,
    /// Volume uplift absorbing compression and attrition between sizing and
    /// settlement. Policy constant, not a derived truth.
    pub safety_margin: f64,
    /// Assumed average contribution of one frontline partner, used only to
    /// choose a partner count.
    pub average_partner_volume: f64,
    /// Minimum viable network size regardless of volume.
    pub min_network_size: usize,
    /// Personal volume below which the personal channel pays nothing.
    pub min_active_volume: f64,
    /// Rank at or above which a partner counts as stable.
    pub stable_rank: QualificationRank,
    /// Stable-partner count at which stability risk reaches zero.
    pub recommended_stable_partners: usize,
}

impl PlanConfig {
    pub fn rates(&self, rank: QualificationRank) -> Result<&BonusRates, PlanConfigError> {
        self.rates
            .get(&rank)
            .ok_or(PlanConfigError::MissingRates(rank))
    }

    pub fn threshold(
        &self,
        rank: QualificationRank,
    ) -> Result<&QualificationThreshold, PlanConfigError> {
        self.thresholds
            .iter()
            .find(|entry| entry.rank == rank)
            .ok_or(PlanConfigError::MissingThreshold(rank))
    }

    /// Threshold table sorted ladder-ascending, for monotonic estimation.
    pub(crate) fn sorted_thresholds(&self) -> Vec<QualificationThreshold> {
        let mut sorted = self.thresholds.clone();
        sorted.sort_by_key(|entry| entry.rank);
        sorted
    }

    pub fn validate(&self) -> Result<(), PlanConfigError> {
        for rank in QualificationRank::ordered() {
            let rates = self.rates(rank)?;
            for (channel, value) in [
                ("group", rates.group),
                ("partner", rates.partner),
                ("club", rates.club),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(PlanConfigError::NegativeRate { rank, channel });
                }
            }
            self.threshold(rank)?;
        }

        let sorted = self.sorted_thresholds();
        for pair in sorted.windows(2) {
            if pair[1].min_volume < pair[0].min_volume {
                return Err(PlanConfigError::UnorderedThresholds(pair[1].rank));
            }
        }

        let allocation = &self.allocation;
        if !(allocation.key_volume_share > 0.0 && allocation.key_volume_share <= 1.0) {
            return Err(PlanConfigError::InvalidAllocation(
                "key volume share must be in (0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&allocation.key_count_fraction) {
            return Err(PlanConfigError::InvalidAllocation(
                "key count fraction must be in [0, 1]",
            ));
        }
        if allocation.min_key_partners == 0 {
            return Err(PlanConfigError::InvalidAllocation(
                "key tier needs at least one partner",
            ));
        }

        if self.club.min_partners == 0 {
            return Err(PlanConfigError::InvalidClubRule(
                "club gate needs at least one partner",
            ));
        }

        let weights = &self.risk_weights;
        let negative = weights.dependency < 0.0 || weights.compression < 0.0 || weights.stability < 0.0;
        if negative || (weights.sum() - 1.0).abs() > 1e-9 {
            return Err(PlanConfigError::InvalidRiskWeights(weights.sum()));
        }

        if !self.safety_margin.is_finite() || self.safety_margin < 0.0 {
            return Err(PlanConfigError::InvalidSizing(
                "safety margin must be non-negative",
            ));
        }
        if !(self.average_partner_volume > 0.0) {
            return Err(PlanConfigError::InvalidSizing(
                "average partner volume must be positive",
            ));
        }
        if self.min_network_size == 0 {
            return Err(PlanConfigError::InvalidSizing(
                "minimum network size must be at least one",
            ));
        }
        if !self.min_active_volume.is_finite() || self.min_active_volume < 0.0 {
            return Err(PlanConfigError::InvalidSizing(
                "activity volume must be non-negative",
            ));
        }
        if self.recommended_stable_partners == 0 {
            return Err(PlanConfigError::InvalidSizing(
                "recommended stable partner count must be at least one",
            ));
        }

        Ok(())
    }
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            rates: default_rates(),
            thresholds: default_thresholds(),
            allocation: AllocationPolicy {
                key_volume_share: 0.70,
                key_count_fraction: 0.30,
                min_key_partners: 3,
            },
            club: ClubRule {
                min_rank: QualificationRank::M3,
                min_partners: 3,
            },
            risk_weights: RiskWeights {
                dependency: 0.4,
                compression: 0.3,
                stability: 0.3,
            },
            safety_margin: 0.20,
            average_partner_volume: 50_000.0,
            min_network_size: 4,
            min_active_volume: 70.0,
            stable_rank: QualificationRank::M3,
            recommended_stable_partners: 5,
        }
    }
}

fn default_rates() -> BTreeMap<QualificationRank, BonusRates> {
    use QualificationRank::*;

    let table = [
        (None, 0.0, 0.0, 0.0),
        (M1, 0.05, 0.05, 0.0),
        (M2, 0.10, 0.05, 0.0),
        (M3, 0.15, 0.05, 0.02),
        (B1, 0.20, 0.06, 0.05),
        (B2, 0.25, 0.07, 0.05),
        (B3, 0.30, 0.08, 0.06),
        (Top, 0.35, 0.10, 0.06),
        (Top1, 0.37, 0.10, 0.06),
        (Top2, 0.39, 0.10, 0.06),
        (Top3, 0.41, 0.10, 0.06),
        (Top4, 0.43, 0.10, 0.06),
        (Top5, 0.45, 0.10, 0.06),
        (Ac1, 0.47, 0.10, 0.06),
        (Ac2, 0.49, 0.10, 0.06),
        (Ac3, 0.51, 0.10, 0.06),
        (Ac4, 0.53, 0.10, 0.06),
        (Ac5, 0.55, 0.10, 0.06),
        (Ac6, 0.57, 0.10, 0.06),
    ];

    table
        .into_iter()
        .map(|(rank, group, partner, club)| (rank, BonusRates { group, partner, club }))
        .collect()
}

fn default_thresholds() -> Vec<QualificationThreshold> {
    use QualificationRank::*;

    let table = [
        (None, 0.0, 0),
        (M1, 750.0, 2),
        (M2, 1_500.0, 3),
        (M3, 3_000.0, 4),
        (B1, 5_500.0, 5),
        (B2, 8_000.0, 6),
        (B3, 10_000.0, 7),
        (Top, 16_000.0, 8),
        (Top1, 23_000.0, 9),
        (Top2, 30_000.0, 10),
        (Top3, 37_000.0, 11),
        (Top4, 44_000.0, 12),
        (Top5, 51_000.0, 13),
        (Ac1, 200_000.0, 15),
        (Ac2, 350_000.0, 17),
        (Ac3, 500_000.0, 20),
        (Ac4, 1_000_000.0, 25),
        (Ac5, 2_500_000.0, 30),
        (Ac6, 5_000_000.0, 35),
    ];

    table
        .into_iter()
        .map(|(rank, min_volume, min_partners)| QualificationThreshold {
            rank,
            min_volume,
            min_partners,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_plan_validates() {
        PlanConfig::default().validate().expect("default plan is well formed");
    }

    #[test]
    fn missing_rank_rates_are_rejected() {
        let mut config = PlanConfig::default();
        config.rates.remove(&QualificationRank::Top3);
        assert_eq!(
            config.validate(),
            Err(PlanConfigError::MissingRates(QualificationRank::Top3))
        );
    }

    #[test]
    fn decreasing_thresholds_are_rejected() {
        let mut config = PlanConfig::default();
        for entry in &mut config.thresholds {
            if entry.rank == QualificationRank::B1 {
                entry.min_volume = 100.0;
            }
        }
        assert_eq!(
            config.validate(),
            Err(PlanConfigError::UnorderedThresholds(QualificationRank::B1))
        );
    }

    #[test]
    fn risk_weights_must_sum_to_one() {
        let mut config = PlanConfig::default();
        config.risk_weights.stability = 0.5;
        assert!(matches!(
            config.validate(),
            Err(PlanConfigError::InvalidRiskWeights(_))
        ));
    }

    #[test]
    fn zero_key_share_is_rejected() {
        let mut config = PlanConfig::default();
        config.allocation.key_volume_share = 0.0;
        assert!(matches!(
            config.validate(),
            Err(PlanConfigError::InvalidAllocation(_))
        ));
    }
}
