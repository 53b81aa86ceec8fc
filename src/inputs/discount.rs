//! Discount rate configuration (direct rate or CAPM/WACC build-up)

use serde::{Deserialize, Serialize};

use super::lenient;
use crate::projection::resolve_discount_rate;

/// How the discount rate is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>")]
pub enum DiscountApproach {
    /// Use `direct_rate` as given
    #[serde(rename = "direct")]
    Direct,
    /// Cost of equity via CAPM, blended with after-tax debt into a WACC
    #[serde(rename = "capm")]
    Capm,
    /// Not yet configured; resolves to 0%
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl From<Option<String>> for DiscountApproach {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref().map(str::trim) {
            Some("direct") => DiscountApproach::Direct,
            Some("capm") => DiscountApproach::Capm,
            _ => DiscountApproach::Unset,
        }
    }
}

/// CAPM and capital-structure inputs, all percents except `beta`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CapmParams {
    #[serde(deserialize_with = "lenient::number")]
    pub beta: f64,

    #[serde(alias = "risklessRate", deserialize_with = "lenient::number")]
    pub riskless_rate: f64,

    #[serde(alias = "marketRiskPremium", deserialize_with = "lenient::number")]
    pub market_risk_premium: f64,

    #[serde(alias = "debtRatio", deserialize_with = "lenient::number")]
    pub debt_ratio: f64,

    #[serde(alias = "costOfBorrowing", deserialize_with = "lenient::number")]
    pub cost_of_borrowing: f64,

    /// Corporate tax rate; also the rate applied to EBIT in the projection
    #[serde(alias = "taxRate", deserialize_with = "lenient::number")]
    pub tax_rate: f64,
}

/// Discount rate section of the model
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscountRateConfig {
    pub approach: DiscountApproach,

    #[serde(alias = "directRate", deserialize_with = "lenient::number")]
    pub direct_rate: f64,

    pub capm: CapmParams,

    /// Resolved rate (percent) consumed by the projection engine
    #[serde(alias = "calculatedRate", deserialize_with = "lenient::number")]
    pub calculated_rate: f64,
}

impl DiscountRateConfig {
    /// Direct-rate configuration, already resolved
    pub fn direct(rate_pct: f64) -> Self {
        let mut config = Self {
            approach: DiscountApproach::Direct,
            direct_rate: rate_pct,
            ..Default::default()
        };
        config.refresh();
        config
    }

    /// CAPM configuration, already resolved
    pub fn capm(params: CapmParams) -> Self {
        let mut config = Self {
            approach: DiscountApproach::Capm,
            capm: params,
            ..Default::default()
        };
        config.refresh();
        config
    }

    /// Recompute `calculated_rate` from the current approach and inputs
    pub fn refresh(&mut self) -> f64 {
        self.calculated_rate = resolve_discount_rate(self);
        self.calculated_rate
    }
}
