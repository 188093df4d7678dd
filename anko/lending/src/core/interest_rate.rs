use {
    anko_math::{MathResult, Udec128},
    anko_types::lending::InterestRateModel,
};

/// Compute the annualized borrow and supply rates at the given utilization.
///
/// Below the optimal utilization the borrow rate climbs along the first
/// slope; above it, along the (steeper) second slope. The supply rate is the
/// borrow rate scaled by utilization, less the reserve factor.
pub fn calculate_rates(
    model: &InterestRateModel,
    utilization: Udec128,
) -> MathResult<(Udec128, Udec128)> {
    let borrow_rate = if utilization <= model.optimal_utilization {
        model.base_rate.checked_add(
            model
                .first_slope
                .checked_mul(utilization.checked_div(model.optimal_utilization)?)?,
        )?
    } else {
        let excess = utilization
            .checked_sub(model.optimal_utilization)?
            .checked_div(Udec128::ONE.checked_sub(model.optimal_utilization)?)?;

        model
            .base_rate
            .checked_add(model.first_slope)?
            .checked_add(model.second_slope.checked_mul(excess)?)?
    };

    let supply_rate = borrow_rate
        .checked_mul(utilization)?
        .checked_mul(Udec128::ONE.checked_sub(model.reserve_factor)?)?;

    Ok((borrow_rate, supply_rate))
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, test_case::test_case};

    // Default model: base 1%, optimal 80%, first slope 4%, second slope 75%.
    #[test_case(0, 1; "zero utilization pays the base rate")]
    #[test_case(40, 3; "half of optimal adds half the first slope")]
    #[test_case(80, 5; "optimal utilization adds the full first slope")]
    #[test_case(100, 80; "full utilization adds the full second slope")]
    fn borrow_rate_along_both_slopes(utilization: u128, expect_percent: u128) {
        let model = InterestRateModel::default();
        let (borrow_rate, _) =
            calculate_rates(&model, Udec128::new_percent(utilization)).unwrap();
        assert_eq!(borrow_rate, Udec128::new_percent(expect_percent));
    }

    #[test]
    fn supply_rate_is_scaled_by_utilization_and_reserve_factor() {
        let model = InterestRateModel::default().with_no_reserve_factor();
        let (borrow_rate, supply_rate) =
            calculate_rates(&model, Udec128::new_percent(80)).unwrap();
        assert_eq!(
            supply_rate,
            borrow_rate.checked_mul(Udec128::new_percent(80)).unwrap(),
        );
    }
}
