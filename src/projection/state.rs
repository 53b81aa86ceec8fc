//! Carry-forward state between projection years

/// Values one year hands to the next during the forward pass
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current projection year (0 = investment year)
    pub year: u32,

    /// Book value at the start of the current year
    pub book_value: f64,

    /// Prior year's total revenue (0 before year 1)
    pub prior_total_revenue: f64,

    /// Prior year's total expense (0 before year 1)
    pub prior_total_expense: f64,

    /// Prior year's working capital requirement
    pub prior_working_capital: f64,

    /// Running sum of adjusted cash flow through the prior year
    pub cumulative_cf: f64,

    /// Prior year's value per revenue item
    pub prior_revenue_values: Vec<f64>,

    /// Prior year's value per expense item
    pub prior_expense_values: Vec<f64>,
}

impl ProjectionState {
    /// Initial state at year 0: book value seeded with the asset amount
    pub fn new(initial_book_value: f64, revenue_items: usize, expense_items: usize) -> Self {
        Self {
            year: 0,
            book_value: initial_book_value,
            prior_total_revenue: 0.0,
            prior_total_expense: 0.0,
            prior_working_capital: 0.0,
            cumulative_cf: 0.0,
            prior_revenue_values: vec![0.0; revenue_items],
            prior_expense_values: vec![0.0; expense_items],
        }
    }

    /// Roll the closing values of the current year into the next one
    pub fn advance(&mut self, closing: YearClose) {
        self.year += 1;
        self.book_value = closing.book_value_end;
        self.prior_total_revenue = closing.total_revenue;
        self.prior_total_expense = closing.total_expense;
        self.prior_working_capital = closing.working_capital;
        self.cumulative_cf = closing.cumulative_cf;
        self.prior_revenue_values = closing.revenue_values;
        self.prior_expense_values = closing.expense_values;
    }
}

/// Closing values of one projected year
#[derive(Debug, Clone)]
pub struct YearClose {
    pub book_value_end: f64,
    pub total_revenue: f64,
    pub total_expense: f64,
    pub working_capital: f64,
    pub cumulative_cf: f64,
    pub revenue_values: Vec<f64>,
    pub expense_values: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_rolls_values_forward() {
        let mut state = ProjectionState::new(1_000.0, 2, 1);
        assert_eq!(state.year, 0);
        assert_eq!(state.prior_revenue_values, vec![0.0, 0.0]);

        state.advance(YearClose {
            book_value_end: 800.0,
            total_revenue: 50.0,
            total_expense: 20.0,
            working_capital: 5.0,
            cumulative_cf: -900.0,
            revenue_values: vec![30.0, 20.0],
            expense_values: vec![20.0],
        });

        assert_eq!(state.year, 1);
        assert_eq!(state.book_value, 800.0);
        assert_eq!(state.prior_total_revenue, 50.0);
        assert_eq!(state.prior_working_capital, 5.0);
        assert_eq!(state.cumulative_cf, -900.0);
        assert_eq!(state.prior_revenue_values, vec![30.0, 20.0]);
    }
}
