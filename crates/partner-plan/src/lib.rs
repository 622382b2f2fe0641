//! Structure optimization engine for a direct-sales compensation plan.
//!
//! Given a target income the engine sizes the group volume that must be
//! generated, splits it across a two-tier frontline, infers the resulting
//! qualifications, projects income across the plan's bonus channels, and
//! scores the structure's balance and risk. The whole pipeline is pure and
//! synchronous; an optional learned predictor can refine the qualification
//! estimate but is never required for correctness.

pub mod config;
pub mod error;
pub mod optimizer;
pub mod plan;
pub mod predictor;
pub mod scenarios;
pub mod telemetry;
