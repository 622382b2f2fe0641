use super::InvalidInput;
use crate::plan::{AllocationPolicy, PlanConfig, QualificationRank};

/// Number of partners placed in the key tier. Structures at or below the
/// configured minimum are all-key.
pub(crate) fn key_tier_size(policy: &AllocationPolicy, partner_count: usize) -> usize {
    if partner_count <= policy.min_key_partners {
        partner_count
    } else {
        let by_fraction = (partner_count as f64 * policy.key_count_fraction) as usize;
        by_fraction.max(policy.min_key_partners)
    }
}

/// Splits a total volume across `partner_count` partners: the key tier takes
/// the configured volume share split evenly, the ordinary tier the remainder.
/// Key partners come first in the returned sequence. With an empty ordinary
/// tier the whole volume is split across the key partners, so the sum is
/// conserved in every case.
pub(crate) fn allocate(
    policy: &AllocationPolicy,
    total_volume: f64,
    partner_count: usize,
) -> Result<Vec<f64>, InvalidInput> {
    if !total_volume.is_finite() || total_volume < 0.0 {
        return Err(InvalidInput::NegativeTotalVolume(total_volume));
    }
    if partner_count == 0 {
        return Err(InvalidInput::EmptyPartnerCount);
    }

    let key_count = key_tier_size(policy, partner_count);
    let ordinary_count = partner_count - key_count;

    let mut volumes = Vec::with_capacity(partner_count);
    if ordinary_count == 0 {
        let share = total_volume / key_count as f64;
        volumes.resize(key_count, share);
    } else {
        let key_share = total_volume * policy.key_volume_share / key_count as f64;
        let ordinary_share =
            total_volume * (1.0 - policy.key_volume_share) / ordinary_count as f64;
        volumes.resize(key_count, key_share);
        volumes.resize(partner_count, ordinary_share);
    }

    Ok(volumes)
}

/// Chooses how many frontline partners the structure should carry: required
/// volume over the assumed per-partner contribution, floored by the minimum
/// viable network size and the target rank's frontline requirement.
pub(crate) fn optimal_partner_count(
    config: &PlanConfig,
    required_volume: f64,
    target_rank: QualificationRank,
) -> usize {
    let by_volume = (required_volume / config.average_partner_volume).ceil() as usize;
    let rank_floor = config
        .threshold(target_rank)
        .map(|entry| entry.min_partners)
        .unwrap_or(0);
    by_volume.max(config.min_network_size).max(rank_floor).max(1)
}
