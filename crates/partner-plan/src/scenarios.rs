//! Side-by-side comparison of allocation strategies for one income goal.
//! Each strategy reshapes the two-tier policy and the network size, and the
//! resulting structures are scored on income efficiency against risk.

use crate::optimizer::{OptimizeError, StructureOptimizer};
use crate::plan::{
    AllocationPolicy, IncomeBreakdown, PlayerProfile, QualificationRank, StructureScores,
};
use serde::{Deserialize, Serialize};

/// Weight of income efficiency in the scenario score; risk takes the rest.
const SCORE_INCOME_WEIGHT: f64 = 0.7;
const SCORE_RISK_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// The plan's published tier policy as configured.
    Balanced,
    /// Fewer, heavier partners: a larger key share on a tighter frontline.
    Aggressive,
    /// More, lighter partners: a flatter split over a wider frontline.
    Conservative,
}

impl AllocationStrategy {
    pub const fn ordered() -> [Self; 3] {
        [Self::Balanced, Self::Aggressive, Self::Conservative]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Balanced => "Balanced",
            Self::Aggressive => "Aggressive",
            Self::Conservative => "Conservative",
        }
    }

    fn policy(self, base: &AllocationPolicy) -> AllocationPolicy {
        match self {
            Self::Balanced => *base,
            Self::Aggressive => AllocationPolicy {
                key_volume_share: (base.key_volume_share + 0.10).min(1.0),
                key_count_fraction: (base.key_count_fraction * 0.5).max(0.1),
                min_key_partners: base.min_key_partners,
            },
            Self::Conservative => AllocationPolicy {
                key_volume_share: (base.key_volume_share - 0.10).max(0.5),
                key_count_fraction: (base.key_count_fraction * 1.5).min(0.6),
                min_key_partners: base.min_key_partners,
            },
        }
    }

    fn partner_count(self, base: usize) -> usize {
        match self {
            Self::Balanced => base,
            Self::Aggressive => (base / 2).max(1),
            Self::Conservative => base * 2,
        }
    }
}

/// One analyzed strategy: the structure it yields and how it scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub strategy: AllocationStrategy,
    pub partner_count: usize,
    pub required_volume: f64,
    pub projected_qualification: QualificationRank,
    pub expected_income: IncomeBreakdown,
    pub metrics: StructureScores,
    /// Income per unit of structure volume.
    pub efficiency: f64,
    /// Composite ranking score: efficiency against risk.
    pub score: f64,
}

/// Generates one report per strategy and returns them best-first.
pub fn generate(
    optimizer: &StructureOptimizer,
    profile: &PlayerProfile,
    target_rank: QualificationRank,
) -> Result<Vec<ScenarioReport>, OptimizeError> {
    let config = optimizer.config();
    let required_volume = optimizer.required_volume(profile.target_income, target_rank)?;
    let base_count = ((required_volume / config.average_partner_volume).ceil() as usize)
        .max(config.min_network_size)
        .max(config.threshold(target_rank)?.min_partners)
        .max(1);

    let thresholds = config.sorted_thresholds();
    let mut reports = Vec::with_capacity(AllocationStrategy::ordered().len());

    for strategy in AllocationStrategy::ordered() {
        let policy = strategy.policy(&config.allocation);
        let partner_count = strategy.partner_count(base_count);

        let volumes =
            crate::optimizer::allocation::allocate(&policy, required_volume, partner_count)?;
        let qualifications: Vec<QualificationRank> = volumes
            .iter()
            .map(|volume| crate::optimizer::qualification::estimate(&thresholds, *volume))
            .collect();

        let group_volume = profile.personal_volume + required_volume;
        let projected = crate::optimizer::qualification::estimate(&thresholds, group_volume);

        let expected_income = optimizer.compute_income(
            projected,
            profile.personal_volume,
            &volumes,
            &qualifications,
        )?;
        let metrics = optimizer.evaluate_structure(projected, &volumes, &qualifications)?;

        let efficiency = if group_volume > 0.0 {
            expected_income.total / group_volume
        } else {
            0.0
        };
        let score =
            efficiency * SCORE_INCOME_WEIGHT + (1.0 - metrics.risk_score) * SCORE_RISK_WEIGHT;

        reports.push(ScenarioReport {
            strategy,
            partner_count,
            required_volume,
            projected_qualification: projected,
            expected_income,
            metrics,
            efficiency,
            score,
        });
    }

    reports.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{PlanConfig, Region};

    fn profile() -> PlayerProfile {
        PlayerProfile {
            personal_volume: 200.0,
            qualification: QualificationRank::M1,
            target_income: 5_000.0,
            region: Region::Ru,
        }
    }

    #[test]
    fn produces_one_report_per_strategy_sorted_best_first() {
        let optimizer = StructureOptimizer::new(PlanConfig::default()).expect("plan valid");
        let reports =
            generate(&optimizer, &profile(), QualificationRank::B3).expect("scenarios build");

        assert_eq!(reports.len(), 3);
        for pair in reports.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        let strategies: Vec<_> = reports.iter().map(|report| report.strategy).collect();
        for strategy in AllocationStrategy::ordered() {
            assert!(strategies.contains(&strategy));
        }
    }

    #[test]
    fn aggressive_structures_are_tighter_than_conservative_ones() {
        let optimizer = StructureOptimizer::new(PlanConfig::default()).expect("plan valid");
        let reports =
            generate(&optimizer, &profile(), QualificationRank::B3).expect("scenarios build");

        let count = |wanted: AllocationStrategy| {
            reports
                .iter()
                .find(|report| report.strategy == wanted)
                .map(|report| report.partner_count)
                .expect("strategy present")
        };
        assert!(count(AllocationStrategy::Aggressive) < count(AllocationStrategy::Conservative));
    }

    #[test]
    fn every_scenario_conserves_the_sized_volume() {
        let optimizer = StructureOptimizer::new(PlanConfig::default()).expect("plan valid");
        let reports =
            generate(&optimizer, &profile(), QualificationRank::M3).expect("scenarios build");
        for report in reports {
            assert!(report.required_volume > 0.0);
            assert!((0.0..=1.0).contains(&report.metrics.risk_score));
        }
    }
}
