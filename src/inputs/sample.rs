//! Bundled sample project (ARRC1 waste facility)

use super::{
    CapmParams, DepreciationMethod, DiscountRateConfig, InitialInvestment, ItemKind, LineItem,
    ModelInputs, WorkingCapital,
};

/// The ARRC1 reference case: 11.25M facility over 15 years at a 12% direct rate
///
/// CAPM fields are populated too (their tax rate drives the tax line), but the
/// direct approach is selected.
pub fn arrc1_sample() -> ModelInputs {
    let mut discount_rate = DiscountRateConfig::direct(12.0);
    discount_rate.capm = CapmParams {
        beta: 1.0,
        riskless_rate: 4.0,
        market_risk_premium: 8.0,
        debt_ratio: 50.0,
        cost_of_borrowing: 8.0,
        tax_rate: 30.0,
    };

    let mut inputs = ModelInputs {
        initial_investment: InitialInvestment {
            amount: 11_250_000.0,
            lifetime: 15,
            tax_credit: 0.0,
            opportunity_cost: 0.0,
            depreciation_method: DepreciationMethod::StraightLine,
            ..Default::default()
        },
        working_capital: WorkingCapital {
            initial: 0.0,
            percentage_of_revenue: 0.0,
            salvage_fraction: 0.0,
        },
        discount_rate,
        revenue_items: Vec::new(),
        expense_items: Vec::new(),
    };

    inputs.add_item(ItemKind::Revenue, LineItem::new("Gate Fee", 6_000_000.0, 2.5));
    inputs.add_item(ItemKind::Revenue, LineItem::new("Recyclable", 55_740.0, 0.0));
    inputs.add_item(ItemKind::Revenue, LineItem::new("Energy", -4_875_621.0, 0.0));

    inputs.add_item(ItemKind::Expense, LineItem::new("O&M Variable", 2_250_000.0, 2.5));
    inputs.add_item(ItemKind::Expense, LineItem::new("O&M Fixed", 0.0, 2.5));

    inputs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_shape() {
        let sample = arrc1_sample();
        assert_eq!(sample.lifetime(), 15);
        assert_eq!(sample.discount_rate.calculated_rate, 12.0);
        assert_eq!(sample.revenue_items.len(), 3);
        assert_eq!(sample.expense_items.len(), 2);
        assert_eq!(sample.revenue_items[2].label, "Energy");
    }
}
