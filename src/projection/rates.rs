//! Single-period rate formulas: NPV, CAPM cost of equity, WACC

use crate::inputs::{finite, DiscountApproach, DiscountRateConfig};

/// Net present value of `cashflows` at a decimal `rate`, first flow undiscounted
pub fn calculate_npv(rate: f64, cashflows: &[f64]) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// CAPM cost of equity, all rates as decimals
pub fn cost_of_equity(riskless_rate: f64, beta: f64, market_risk_premium: f64) -> f64 {
    riskless_rate + beta * market_risk_premium
}

/// Weighted average cost of capital with after-tax debt, all rates as decimals
pub fn wacc(cost_of_equity: f64, debt_ratio: f64, cost_of_borrowing: f64, tax_rate: f64) -> f64 {
    let equity_ratio = 1.0 - debt_ratio;
    equity_ratio * cost_of_equity + debt_ratio * cost_of_borrowing * (1.0 - tax_rate)
}

/// Resolve the configured discount rate to a single percent
///
/// An unset approach resolves to 0% rather than failing.
pub fn resolve_discount_rate(config: &DiscountRateConfig) -> f64 {
    match config.approach {
        DiscountApproach::Direct => finite(config.direct_rate),
        DiscountApproach::Capm => {
            let capm = &config.capm;
            let ke = cost_of_equity(
                finite(capm.riskless_rate) / 100.0,
                finite(capm.beta),
                finite(capm.market_risk_premium) / 100.0,
            );
            wacc(
                ke,
                finite(capm.debt_ratio) / 100.0,
                finite(capm.cost_of_borrowing) / 100.0,
                finite(capm.tax_rate) / 100.0,
            ) * 100.0
        }
        DiscountApproach::Unset => 0.0,
    }
}
