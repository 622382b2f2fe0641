use super::InvalidInput;
use crate::plan::{PlanConfig, QualificationRank, StructureScores};

/// Gini coefficient of a volume distribution: 0 for perfect equality,
/// approaching 1 as a single partner concentrates everything. Defined as 0
/// for empty, single-partner, and all-zero distributions.
pub(crate) fn gini(volumes: &[f64]) -> f64 {
    let n = volumes.len();
    if n <= 1 {
        return 0.0;
    }
    let total: f64 = volumes.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }

    let mut sorted = volumes.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, volume)| (2.0 * (i as f64 + 1.0) - n as f64 - 1.0) * volume)
        .sum();

    (weighted / (n as f64 * total)).clamp(0.0, 1.0)
}

/// Balance, risk, and growth scores for a finished allocation. The risk score
/// weighs volume concentration, compressed volume, and the shortage of stable
/// partners; growth headroom shrinks as the frontline climbs the ladder.
pub(crate) fn evaluate(
    config: &PlanConfig,
    player_rank: QualificationRank,
    partner_volumes: &[f64],
    qualifications: &[QualificationRank],
) -> Result<StructureScores, InvalidInput> {
    if partner_volumes.len() != qualifications.len() {
        return Err(InvalidInput::LengthMismatch {
            volumes: partner_volumes.len(),
            qualifications: qualifications.len(),
        });
    }
    for volume in partner_volumes {
        if !volume.is_finite() || *volume < 0.0 {
            return Err(InvalidInput::NegativePartnerVolume(*volume));
        }
    }

    let total: f64 = partner_volumes.iter().sum();

    let dependency_risk = if total > 0.0 {
        partner_volumes.iter().cloned().fold(0.0, f64::max) / total
    } else {
        0.0
    };

    let compression_risk = if total > 0.0 {
        let compressed: f64 = partner_volumes
            .iter()
            .zip(qualifications)
            .filter(|(_, rank)| **rank >= player_rank)
            .map(|(volume, _)| volume)
            .sum();
        compressed / total
    } else {
        0.0
    };

    let stable_count = qualifications
        .iter()
        .filter(|rank| **rank >= config.stable_rank)
        .count();
    let stability_risk = (1.0
        - stable_count as f64 / config.recommended_stable_partners as f64)
        .clamp(0.0, 1.0);

    let weights = &config.risk_weights;
    let risk_score = (weights.dependency * dependency_risk
        + weights.compression * compression_risk
        + weights.stability * stability_risk)
        .clamp(0.0, 1.0);

    let growth_potential = if qualifications.is_empty() {
        1.0
    } else {
        let max_index = QualificationRank::highest().index() as f64;
        let mean_index = qualifications
            .iter()
            .map(|rank| rank.index() as f64)
            .sum::<f64>()
            / qualifications.len() as f64;
        (1.0 - mean_index / max_index).clamp(0.0, 1.0)
    };

    Ok(StructureScores {
        structure_balance: gini(partner_volumes),
        risk_score,
        growth_potential,
    })
}
