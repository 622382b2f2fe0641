use super::{InvalidInput, OptimizeError};
use crate::plan::{PlanConfig, PlanConfigError, QualificationRank};

/// Converts a target income into the group volume that must be generated at
/// the target rank's coefficients, with the configured safety uplift applied.
pub(crate) fn required_volume(
    config: &PlanConfig,
    target_income: f64,
    target_rank: QualificationRank,
) -> Result<f64, OptimizeError> {
    if !(target_income > 0.0) {
        return Err(InvalidInput::NonPositiveTargetIncome(target_income).into());
    }

    let rates = config.rates(target_rank)?;
    let coefficient_sum = rates.coefficient_sum();
    if coefficient_sum <= 0.0 {
        return Err(PlanConfigError::ZeroCoefficientSum(target_rank).into());
    }

    Ok(target_income / coefficient_sum * (1.0 + config.safety_margin))
}
