use super::{InvalidInput, OptimizeError};
use crate::plan::{IncomeBreakdown, PlanConfig, QualificationRank};

/// Computes the four bonus channels for a player at `player_rank` over an
/// allocated frontline.
///
/// Compression: volume held by a partner whose rank has reached the player's
/// own is excluded from the group-bonus base. The club channel pays only when
/// the configured count of partners at the club rank is met, and the personal
/// channel only from the configured activity volume upward.
pub(crate) fn compute(
    config: &PlanConfig,
    player_rank: QualificationRank,
    personal_volume: f64,
    partner_volumes: &[f64],
    qualifications: &[QualificationRank],
) -> Result<IncomeBreakdown, OptimizeError> {
    if partner_volumes.len() != qualifications.len() {
        return Err(InvalidInput::LengthMismatch {
            volumes: partner_volumes.len(),
            qualifications: qualifications.len(),
        }
        .into());
    }
    if !personal_volume.is_finite() || personal_volume < 0.0 {
        return Err(InvalidInput::NegativePersonalVolume(personal_volume).into());
    }

    let player_rates = *config.rates(player_rank)?;

    let personal_bonus = if personal_volume >= config.min_active_volume {
        personal_volume * player_rates.partner
    } else {
        0.0
    };

    let mut partner_bonus = 0.0;
    let mut structure_volume = personal_volume;
    let mut compressed_base = personal_volume;
    for (volume, rank) in partner_volumes.iter().zip(qualifications) {
        if !volume.is_finite() || *volume < 0.0 {
            return Err(InvalidInput::NegativePartnerVolume(*volume).into());
        }
        partner_bonus += volume * config.rates(*rank)?.partner;
        structure_volume += volume;
        if *rank < player_rank {
            compressed_base += volume;
        }
    }

    let group_bonus = compressed_base * player_rates.group;

    let club_partners = qualifications
        .iter()
        .filter(|rank| **rank >= config.club.min_rank)
        .count();
    let club_bonus = if club_partners >= config.club.min_partners {
        structure_volume * player_rates.club
    } else {
        0.0
    };

    Ok(IncomeBreakdown::new(
        personal_bonus,
        partner_bonus,
        group_bonus,
        club_bonus,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use QualificationRank::{B1, B3, M1, M2, M3, None as NoRank};

    fn config() -> PlanConfig {
        PlanConfig::default()
    }

    #[test]
    fn total_is_the_exact_channel_sum() {
        let volumes = [4_000.0, 2_500.0, 900.0];
        let quals = [M3, M2, NoRank];
        let income = compute(&config(), B3, 200.0, &volumes, &quals).expect("income computes");
        assert_eq!(
            income.total,
            income.personal_bonus + income.partner_bonus + income.group_bonus + income.club_bonus
        );
        assert!(income.personal_bonus >= 0.0);
        assert!(income.partner_bonus >= 0.0);
        assert!(income.group_bonus >= 0.0);
        assert!(income.club_bonus >= 0.0);
    }

    #[test]
    fn partner_channel_uses_each_partners_rate() {
        let income = compute(&config(), B3, 0.0, &[1_000.0, 1_000.0], &[M1, B1])
            .expect("income computes");
        assert!((income.partner_bonus - (1_000.0 * 0.05 + 1_000.0 * 0.06)).abs() < 1e-9);
    }

    #[test]
    fn compression_excludes_peer_volume_from_group_base() {
        let volumes = [5_000.0, 3_000.0];
        let below = compute(&config(), B3, 200.0, &volumes, &[M3, M3]).unwrap();
        let compressed = compute(&config(), B3, 200.0, &volumes, &[B3, M3]).unwrap();
        assert!(
            compressed.group_bonus < below.group_bonus,
            "a partner reaching the player's rank must shrink the group bonus"
        );
        let expected_drop = 5_000.0 * 0.30;
        assert!((below.group_bonus - compressed.group_bonus - expected_drop).abs() < 1e-9);
    }

    #[test]
    fn club_channel_requires_the_configured_gate() {
        let volumes = [3_000.0, 3_000.0, 3_000.0];
        let gated = compute(&config(), B3, 200.0, &volumes, &[M3, M3, M1]).unwrap();
        assert_eq!(gated.club_bonus, 0.0);

        let qualified = compute(&config(), B3, 200.0, &volumes, &[M3, M3, M3]).unwrap();
        let structure_volume = 200.0 + 9_000.0;
        assert!((qualified.club_bonus - structure_volume * 0.06).abs() < 1e-9);
    }

    #[test]
    fn personal_channel_gates_on_activity_volume() {
        let idle = compute(&config(), M3, 50.0, &[], &[]).unwrap();
        assert_eq!(idle.personal_bonus, 0.0);

        let active = compute(&config(), M3, 200.0, &[], &[]).unwrap();
        assert!((active.personal_bonus - 200.0 * 0.05).abs() < 1e-9);
    }

    #[test]
    fn rejects_mismatched_inputs() {
        let err = compute(&config(), M3, 100.0, &[1.0, 2.0], &[M1]).unwrap_err();
        assert!(matches!(
            err,
            OptimizeError::InvalidInput(InvalidInput::LengthMismatch {
                volumes: 2,
                qualifications: 1
            })
        ));

        let err = compute(&config(), M3, -5.0, &[], &[]).unwrap_err();
        assert!(matches!(
            err,
            OptimizeError::InvalidInput(InvalidInput::NegativePersonalVolume(_))
        ));
    }
}
