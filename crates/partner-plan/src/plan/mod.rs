//! Compensation-plan vocabulary: domain types, the injected plan
//! configuration, and roster ingestion.

pub mod config;
pub mod domain;
pub mod roster;

pub use config::{
    AllocationPolicy, BonusRates, ClubRule, PlanConfig, PlanConfigError, QualificationThreshold,
    RiskWeights,
};
pub use domain::{
    IncomeBreakdown, OptimizationRequest, OptimizationResult, Partner, PlayerProfile,
    PredictorOutcome, QualificationRank, Region, StructureAssessment, StructureScores,
};
pub use roster::{partners_from_reader, RosterError};
