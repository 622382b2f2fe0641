use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualification ladder of the compensation plan, lowest to highest.
///
/// Declaration order is the ladder order, so the derived `Ord` gives the
/// plan's total ordering directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualificationRank {
    None,
    M1,
    M2,
    M3,
    B1,
    B2,
    B3,
    Top,
    Top1,
    Top2,
    Top3,
    Top4,
    Top5,
    Ac1,
    Ac2,
    Ac3,
    Ac4,
    Ac5,
    Ac6,
}

impl QualificationRank {
    pub const fn ordered() -> [Self; 19] {
        [
            Self::None,
            Self::M1,
            Self::M2,
            Self::M3,
            Self::B1,
            Self::B2,
            Self::B3,
            Self::Top,
            Self::Top1,
            Self::Top2,
            Self::Top3,
            Self::Top4,
            Self::Top5,
            Self::Ac1,
            Self::Ac2,
            Self::Ac3,
            Self::Ac4,
            Self::Ac5,
            Self::Ac6,
        ]
    }

    pub const fn highest() -> Self {
        Self::Ac6
    }

    /// Zero-based position on the ladder.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ordered().get(index).copied()
    }

    /// Plan code as printed on statements, e.g. `B3` or `TOP2`.
    pub const fn code(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::M1 => "M1",
            Self::M2 => "M2",
            Self::M3 => "M3",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::B3 => "B3",
            Self::Top => "TOP",
            Self::Top1 => "TOP1",
            Self::Top2 => "TOP2",
            Self::Top3 => "TOP3",
            Self::Top4 => "TOP4",
            Self::Top5 => "TOP5",
            Self::Ac1 => "AC1",
            Self::Ac2 => "AC2",
            Self::Ac3 => "AC3",
            Self::Ac4 => "AC4",
            Self::Ac5 => "AC5",
            Self::Ac6 => "AC6",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Some(Self::None);
        }
        Self::ordered()
            .into_iter()
            .find(|rank| rank.code() == normalized)
    }
}

impl fmt::Display for QualificationRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Sales region, used for pass-through display only. Volumes and incomes are
/// denominated in plan units; the region carries the display currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Ru,
    Kz,
    Uz,
    Kg,
}

impl Region {
    pub const fn ordered() -> [Self; 4] {
        [Self::Ru, Self::Kz, Self::Uz, Self::Kg]
    }

    pub const fn currency(self) -> &'static str {
        match self {
            Self::Ru => "RUB",
            Self::Kz => "KZT",
            Self::Uz => "UZS",
            Self::Kg => "KGS",
        }
    }

    /// Display conversion rate from plan units to the regional currency.
    pub const fn currency_rate(self) -> f64 {
        match self {
            Self::Ru => 35.0,
            Self::Kz => 175.0,
            Self::Uz => 3850.0,
            Self::Kg => 35.0,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "RU" => Some(Self::Ru),
            "KZ" => Some(Self::Kz),
            "UZ" => Some(Self::Uz),
            "KG" => Some(Self::Kg),
            _ => None,
        }
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::Ru
    }
}

/// A frontline partner in a recommended or assessed structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub volume: f64,
    pub qualification: QualificationRank,
    pub active: bool,
    #[serde(default)]
    pub region: Region,
}

/// Immutable optimization input describing the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub personal_volume: f64,
    pub qualification: QualificationRank,
    pub target_income: f64,
    #[serde(default)]
    pub region: Region,
}

/// Optimization request: a profile plus optional policy overrides. When the
/// target qualification is omitted the engine derives one from the income
/// goal; when the partner count is omitted the sizing policy chooses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub profile: PlayerProfile,
    #[serde(default)]
    pub target_qualification: Option<QualificationRank>,
    #[serde(default)]
    pub partner_count: Option<usize>,
}

impl OptimizationRequest {
    pub fn for_profile(profile: PlayerProfile) -> Self {
        Self {
            profile,
            target_qualification: None,
            partner_count: None,
        }
    }
}

/// Per-channel income projection. `total` is always the exact sum of the four
/// channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeBreakdown {
    pub personal_bonus: f64,
    pub partner_bonus: f64,
    pub group_bonus: f64,
    pub club_bonus: f64,
    pub total: f64,
}

impl IncomeBreakdown {
    pub fn new(personal_bonus: f64, partner_bonus: f64, group_bonus: f64, club_bonus: f64) -> Self {
        Self {
            personal_bonus,
            partner_bonus,
            group_bonus,
            club_bonus,
            total: personal_bonus + partner_bonus + group_bonus + club_bonus,
        }
    }

    /// Total converted into the region's display currency.
    pub fn total_in(&self, region: Region) -> f64 {
        self.total * region.currency_rate()
    }
}

/// Balance and risk scores for a finished allocation. All three values are
/// bounded to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureScores {
    pub structure_balance: f64,
    pub risk_score: f64,
    pub growth_potential: f64,
}

/// How the learned predictor participated in an optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictorOutcome {
    /// An in-range hint was accepted.
    Refined,
    /// The predictor declined; the threshold rule was used.
    Declined,
    /// The predictor failed, timed out, or returned an out-of-range hint.
    Degraded,
}

impl PredictorOutcome {
    pub const fn is_fallback(self) -> bool {
        !matches!(self, Self::Refined)
    }
}

/// Output aggregate of a full optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub profile: PlayerProfile,
    pub partners: Vec<Partner>,
    pub target_qualification: QualificationRank,
    pub projected_qualification: QualificationRank,
    pub required_volume: f64,
    pub expected_income: IncomeBreakdown,
    pub metrics: StructureScores,
    pub currency: String,
    pub total_in_currency: f64,
    pub predictor: PredictorOutcome,
    pub generated_at: DateTime<Utc>,
}

/// Income and metrics for an existing roster, without reallocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureAssessment {
    pub qualification: QualificationRank,
    pub group_volume: f64,
    pub expected_income: IncomeBreakdown,
    pub metrics: StructureScores,
    pub currency: String,
    pub total_in_currency: f64,
    pub generated_at: DateTime<Utc>,
}
