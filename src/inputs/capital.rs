//! Initial investment and working capital parameters

use serde::{Deserialize, Serialize};

use super::lenient;

/// Default project lifetime used when none is configured
pub const DEFAULT_LIFETIME: u32 = 5;

/// Longest lifetime modeled; larger configured values are clamped
pub const MAX_LIFETIME: u32 = 100;

/// Default declining-balance factor (percent), i.e. double-declining
pub const DEFAULT_DDB_FACTOR: f64 = 200.0;

/// Depreciation schedule applied to the initial asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>")]
pub enum DepreciationMethod {
    /// Equal charge of amount / lifetime every operating year
    #[serde(rename = "straight-line")]
    StraightLine,
    /// Declining balance at `ddb_factor` percent of the straight-line rate
    #[serde(rename = "ddb")]
    DecliningBalance,
    /// No depreciation (also used for unrecognized methods)
    #[default]
    #[serde(rename = "none")]
    None,
}

impl From<Option<String>> for DepreciationMethod {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref().map(str::trim) {
            Some("straight-line") => DepreciationMethod::StraightLine,
            Some("ddb") => DepreciationMethod::DecliningBalance,
            _ => DepreciationMethod::None,
        }
    }
}

/// Up-front capital outlay and the asset it buys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialInvestment {
    /// Purchase amount of the depreciable asset
    #[serde(deserialize_with = "lenient::number")]
    pub amount: f64,

    #[serde(alias = "opportunityCost", deserialize_with = "lenient::number")]
    pub opportunity_cost: f64,

    /// Operating lifetime in years (0 means "use the default")
    #[serde(deserialize_with = "lenient::whole")]
    pub lifetime: u32,

    /// Equipment salvage recovered in the final year
    #[serde(alias = "salvageValue", deserialize_with = "lenient::number")]
    pub salvage_value: f64,

    #[serde(alias = "depreciationMethod")]
    pub depreciation_method: DepreciationMethod,

    /// Declining-balance factor in percent (200 = double-declining)
    #[serde(alias = "ddbFactor", deserialize_with = "lenient::number")]
    pub ddb_factor: f64,

    /// Investment tax credit in percent of `amount`
    #[serde(alias = "taxCredit", deserialize_with = "lenient::number")]
    pub tax_credit: f64,

    #[serde(alias = "otherInvestments", deserialize_with = "lenient::number")]
    pub other_investments: f64,
}

impl InitialInvestment {
    /// Lifetime actually modeled: [`DEFAULT_LIFETIME`] when unset, at most [`MAX_LIFETIME`]
    pub fn effective_lifetime(&self) -> u32 {
        if self.lifetime == 0 {
            DEFAULT_LIFETIME
        } else {
            self.lifetime.min(MAX_LIFETIME)
        }
    }

    /// Declining-balance factor as a multiplier (2.0 for 200%)
    pub fn effective_ddb_factor(&self) -> f64 {
        if self.ddb_factor.is_finite() && self.ddb_factor != 0.0 {
            self.ddb_factor / 100.0
        } else {
            DEFAULT_DDB_FACTOR / 100.0
        }
    }
}

impl Default for InitialInvestment {
    fn default() -> Self {
        Self {
            amount: 0.0,
            opportunity_cost: 0.0,
            lifetime: DEFAULT_LIFETIME,
            salvage_value: 0.0,
            depreciation_method: DepreciationMethod::None,
            ddb_factor: DEFAULT_DDB_FACTOR,
            tax_credit: 0.0,
            other_investments: 0.0,
        }
    }
}

/// Working capital tied up by the project
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkingCapital {
    /// Day-one working capital outlay
    #[serde(deserialize_with = "lenient::number")]
    pub initial: f64,

    /// Ongoing working capital as a percent of revenue
    #[serde(alias = "percentageOfRevenue", deserialize_with = "lenient::number")]
    pub percentage_of_revenue: f64,

    /// Fraction (0..1) of working capital recovered in the final year
    #[serde(alias = "salvageFraction", deserialize_with = "lenient::number")]
    pub salvage_fraction: f64,
}

/// Breakdown of the year-0 outlay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentSummary {
    pub investment: f64,
    pub tax_credit: f64,
    pub net_investment: f64,
    pub working_capital: f64,
    pub opportunity_cost: f64,
    pub other_investments: f64,
    pub total_initial_outlay: f64,
}

impl InvestmentSummary {
    pub fn new(investment: &InitialInvestment, working_capital: &WorkingCapital) -> Self {
        let amount = finite(investment.amount);
        let tax_credit = amount * finite(investment.tax_credit) / 100.0;
        let net_investment = amount - tax_credit;
        let wc = finite(working_capital.initial);
        let opportunity_cost = finite(investment.opportunity_cost);
        let other_investments = finite(investment.other_investments);

        Self {
            investment: amount,
            tax_credit,
            net_investment,
            working_capital: wc,
            opportunity_cost,
            other_investments,
            total_initial_outlay: net_investment + wc + opportunity_cost + other_investments,
        }
    }
}

/// Treat non-finite inputs as zero at the point of use
pub(crate) fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depreciation_method_parsing() {
        let inv: InitialInvestment =
            serde_json::from_str(r#"{"depreciationMethod": "straight-line"}"#).unwrap();
        assert_eq!(inv.depreciation_method, DepreciationMethod::StraightLine);

        let inv: InitialInvestment =
            serde_json::from_str(r#"{"depreciation_method": "ddb"}"#).unwrap();
        assert_eq!(inv.depreciation_method, DepreciationMethod::DecliningBalance);

        let inv: InitialInvestment =
            serde_json::from_str(r#"{"depreciation_method": ""}"#).unwrap();
        assert_eq!(inv.depreciation_method, DepreciationMethod::None);
    }

    #[test]
    fn test_defaults_for_missing_lifetime_and_factor() {
        let inv: InitialInvestment =
            serde_json::from_str(r#"{"lifetime": 0, "ddbFactor": ""}"#).unwrap();
        assert_eq!(inv.effective_lifetime(), 5);
        assert_eq!(inv.effective_ddb_factor(), 2.0);

        let inv = InitialInvestment { ddb_factor: 150.0, lifetime: 8, ..Default::default() };
        assert_eq!(inv.effective_lifetime(), 8);
        assert_eq!(inv.effective_ddb_factor(), 1.5);
    }

    #[test]
    fn test_oversized_lifetime_is_clamped() {
        let inv: InitialInvestment = serde_json::from_str(r#"{"lifetime": 1e9}"#).unwrap();
        assert_eq!(inv.lifetime, 1_000_000_000);
        assert_eq!(inv.effective_lifetime(), MAX_LIFETIME);

        let inv = InitialInvestment { lifetime: MAX_LIFETIME, ..Default::default() };
        assert_eq!(inv.effective_lifetime(), MAX_LIFETIME);
    }

    #[test]
    fn test_investment_summary() {
        let inv = InitialInvestment {
            amount: 1_000_000.0,
            tax_credit: 10.0,
            opportunity_cost: 50_000.0,
            other_investments: 25_000.0,
            ..Default::default()
        };
        let wc = WorkingCapital { initial: 100_000.0, ..Default::default() };

        let summary = InvestmentSummary::new(&inv, &wc);
        assert_eq!(summary.tax_credit, 100_000.0);
        assert_eq!(summary.net_investment, 900_000.0);
        assert_eq!(summary.total_initial_outlay, 1_075_000.0);
    }
}
