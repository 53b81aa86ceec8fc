//! Projection output: year-by-year rows, the display grid and CSV export

use serde::{Deserialize, Serialize};
use std::io::Write;

use super::metrics::Metrics;
use super::trace::Trace;
use crate::error::Result;

/// Everything computed for a single projection year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRow {
    pub year: u32,
    pub lifetime_index: u8,

    // Line items
    pub revenue_values: Vec<f64>,
    pub revenue_growth_rates: Vec<f64>,
    pub expense_values: Vec<f64>,
    pub expense_growth_rates: Vec<f64>,
    pub total_revenue: f64,
    pub total_expense: f64,
    pub revenue_growth: f64,
    pub expense_growth: f64,

    // Operating results
    pub ebitda: f64,
    pub book_value_start: f64,
    pub depreciation: f64,
    pub book_value_end: f64,
    pub ebit: f64,
    pub tax: f64,
    pub nopat: f64,

    // Investment flows
    pub working_capital: f64,
    pub delta_working_capital: f64,
    pub capex: f64,
    pub equipment_salvage: f64,
    pub working_capital_salvage: f64,
    pub natcf: f64,
    pub total_cash_flow: f64,

    // Valuation
    pub discount_factor: f64,
    pub discounted_cf: f64,
    pub compounding_factor: f64,
    pub adjusted_cash_flow: f64,
    pub cumulative_cf: f64,
}

/// Values of one line item across all years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    pub label: String,
    pub values: Vec<f64>,
}

/// Realized growth per item per year (decimals)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthRates {
    pub revenue_items: Vec<Vec<f64>>,
    pub expense_items: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookValueRows {
    pub start: Vec<f64>,
    pub depreciation: Vec<f64>,
    pub end: Vec<f64>,
}

/// Terminal-year recoveries (zero except in the final year)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalvageRows {
    pub equipment: Vec<f64>,
    pub working_capital: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subtotals {
    pub lifetime_index: Vec<u8>,
    pub total_revenue: Vec<f64>,
    pub total_expense: Vec<f64>,
    pub revenue_growth: Vec<f64>,
    pub expense_growth: Vec<f64>,
    pub ebitda: Vec<f64>,
    pub depreciation: Vec<f64>,
    pub ebit: Vec<f64>,
    pub tax: Vec<f64>,
    pub nopat: Vec<f64>,
    pub depreciation_add_back: Vec<f64>,
    pub delta_working_capital: Vec<f64>,
    pub capex: Vec<f64>,
    pub natcf: Vec<f64>,
    /// Display only; NPV uses the adjusted cash flow
    pub discount_factor: Vec<f64>,
    /// Display only; NPV uses the adjusted cash flow
    pub discounted_cf: Vec<f64>,
    pub compounding_factor: Vec<f64>,
    pub adjusted_cash_flow: Vec<f64>,
    pub cumulative_cf: Vec<f64>,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Year indices 0..=lifetime
    pub years: Vec<u32>,
    pub revenue_items: Vec<ItemRow>,
    pub expense_items: Vec<ItemRow>,
    pub growth_rates: GrowthRates,
    pub book_value: BookValueRows,
    pub salvage_value: SalvageRows,
    pub subtotals: Subtotals,
    /// NATCF plus salvages per year; the IRR input
    pub total_cash_flows: Vec<f64>,
    pub trace: Trace,
    pub metrics: Metrics,
}

impl ProjectionResult {
    pub fn new(revenue_labels: &[&str], expense_labels: &[&str]) -> Self {
        let item_rows = |labels: &[&str]| -> Vec<ItemRow> {
            labels
                .iter()
                .map(|label| ItemRow { label: label.to_string(), values: Vec::new() })
                .collect()
        };

        Self {
            years: Vec::new(),
            revenue_items: item_rows(revenue_labels),
            expense_items: item_rows(expense_labels),
            growth_rates: GrowthRates {
                revenue_items: vec![Vec::new(); revenue_labels.len()],
                expense_items: vec![Vec::new(); expense_labels.len()],
            },
            book_value: BookValueRows::default(),
            salvage_value: SalvageRows::default(),
            subtotals: Subtotals::default(),
            total_cash_flows: Vec::new(),
            trace: Trace::new(),
            metrics: Metrics::default(),
        }
    }

    /// Append one year's values to every row
    pub fn add_year(&mut self, row: &YearRow) {
        self.years.push(row.year);

        for (item, &value) in self.revenue_items.iter_mut().zip(&row.revenue_values) {
            item.values.push(value);
        }
        for (item, &value) in self.expense_items.iter_mut().zip(&row.expense_values) {
            item.values.push(value);
        }
        for (rates, &rate) in self.growth_rates.revenue_items.iter_mut().zip(&row.revenue_growth_rates) {
            rates.push(rate);
        }
        for (rates, &rate) in self.growth_rates.expense_items.iter_mut().zip(&row.expense_growth_rates) {
            rates.push(rate);
        }

        self.book_value.start.push(row.book_value_start);
        self.book_value.depreciation.push(row.depreciation);
        self.book_value.end.push(row.book_value_end);

        self.salvage_value.equipment.push(row.equipment_salvage);
        self.salvage_value.working_capital.push(row.working_capital_salvage);

        let s = &mut self.subtotals;
        s.lifetime_index.push(row.lifetime_index);
        s.total_revenue.push(row.total_revenue);
        s.total_expense.push(row.total_expense);
        s.revenue_growth.push(row.revenue_growth);
        s.expense_growth.push(row.expense_growth);
        s.ebitda.push(row.ebitda);
        s.depreciation.push(row.depreciation);
        s.ebit.push(row.ebit);
        s.tax.push(row.tax);
        s.nopat.push(row.nopat);
        s.depreciation_add_back.push(row.depreciation);
        s.delta_working_capital.push(row.delta_working_capital);
        s.capex.push(row.capex);
        s.natcf.push(row.natcf);
        s.discount_factor.push(row.discount_factor);
        s.discounted_cf.push(row.discounted_cf);
        s.compounding_factor.push(row.compounding_factor);
        s.adjusted_cash_flow.push(row.adjusted_cash_flow);
        s.cumulative_cf.push(row.cumulative_cf);

        self.total_cash_flows.push(row.total_cash_flow);
    }

    /// Number of projected years including year 0
    pub fn year_count(&self) -> usize {
        self.years.len()
    }

    /// Rows in display order, grouped into sections
    pub fn grid(&self) -> Vec<GridRow> {
        let s = &self.subtotals;
        let mut rows = Vec::new();

        let lifetime_index = s.lifetime_index.iter().map(|&v| f64::from(v)).collect();
        rows.push(GridRow::index("", "Lifetime Index", lifetime_index).untraced());

        for item in &self.revenue_items {
            rows.push(GridRow::amount("REVENUES", &format!("+ {}", item.label), &item.values));
        }
        rows.push(GridRow::amount("REVENUES", "Total Revenues", &s.total_revenue));

        for item in &self.expense_items {
            rows.push(GridRow::amount("OPERATING EXPENSES", &format!("- {}", item.label), &item.values));
        }
        rows.push(GridRow::amount("OPERATING EXPENSES", "Total Expenses", &s.total_expense));

        let ops = "OPERATING CASH FLOWS";
        rows.push(GridRow::amount(ops, "EBITDA", &s.ebitda));
        rows.push(GridRow::amount(ops, "- Depreciation", &s.depreciation).traced_as("Depreciation"));
        rows.push(GridRow::amount(ops, "EBIT", &s.ebit));
        rows.push(GridRow::amount(ops, "- Tax", &s.tax));
        rows.push(GridRow::amount(ops, "EBT(1-t) / NOPAT", &s.nopat));
        rows.push(GridRow::amount(ops, "+ Depreciation", &s.depreciation_add_back));
        rows.push(GridRow::amount(ops, "- Δ Working Capital", &s.delta_working_capital));
        rows.push(
            GridRow::amount(ops, "- Capital Expenditure / Net Investment", &s.capex)
                .traced_as("- CapEx / Net Inv."),
        );
        rows.push(GridRow::amount(ops, "NATCF", &s.natcf));

        let val = "VALUATION";
        rows.push(GridRow::factor(val, "Discount Factor", &s.discount_factor).display_only());
        rows.push(GridRow::amount(val, "Discounted Cash Flows", &s.discounted_cf).display_only());
        rows.push(GridRow::factor(val, "Compounding Factor", &s.compounding_factor));
        rows.push(GridRow::amount(val, "Adjusted Cash Flow", &s.adjusted_cash_flow));
        rows.push(GridRow::amount(val, "Cumulative Cash Flows", &s.cumulative_cf));

        rows.push(GridRow::amount("SALVAGE VALUE", "Equipment", &self.salvage_value.equipment));
        rows.push(GridRow::amount("SALVAGE VALUE", "Working Capital", &self.salvage_value.working_capital));

        rows.push(GridRow::amount("BOOK VALUE", "Book Value (Initial)", &self.book_value.start));
        rows.push(GridRow::amount("BOOK VALUE", "Depreciation", &self.book_value.depreciation));
        rows.push(GridRow::amount("BOOK VALUE", "Book Value (End)", &self.book_value.end));

        let growth = "GROWTH RATES";
        for (item, rates) in self.revenue_items.iter().zip(&self.growth_rates.revenue_items) {
            rows.push(GridRow::rate(growth, &format!("+ {}", item.label), rates).untraced());
        }
        rows.push(GridRow::rate(growth, "Total Revenues", &s.revenue_growth).untraced());
        for (item, rates) in self.expense_items.iter().zip(&self.growth_rates.expense_items) {
            rows.push(GridRow::rate(growth, &format!("- {}", item.label), rates).untraced());
        }
        rows.push(GridRow::rate(growth, "Total Expenses", &s.expense_growth).untraced());

        rows
    }

    /// Write the grid as CSV: one row per line, one column per year
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec!["Section".to_string(), "Row".to_string()];
        header.extend(self.years.iter().map(|y| y.to_string()));
        csv_writer.write_record(&header)?;

        for row in self.grid() {
            let mut record = vec![row.section.to_string(), row.label.clone()];
            record.extend(row.values.iter().map(|v| v.to_string()));
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

/// How a grid row's values are meant to be displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFormat {
    Amount,
    Factor,
    Rate,
    Index,
}

/// One labeled row of the display grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub section: &'static str,
    pub label: String,
    /// Row name the trace and dependency references use for these cells
    pub trace_row: Option<String>,
    pub format: RowFormat,
    /// Kept for display but superseded (the discount factor convention)
    pub display_only: bool,
    pub values: Vec<f64>,
}

impl GridRow {
    fn new(section: &'static str, label: &str, format: RowFormat, values: Vec<f64>) -> Self {
        Self {
            section,
            label: label.to_string(),
            trace_row: Some(label.to_string()),
            format,
            display_only: false,
            values,
        }
    }

    fn amount(section: &'static str, label: &str, values: &[f64]) -> Self {
        Self::new(section, label, RowFormat::Amount, values.to_vec())
    }

    fn factor(section: &'static str, label: &str, values: &[f64]) -> Self {
        Self::new(section, label, RowFormat::Factor, values.to_vec())
    }

    fn rate(section: &'static str, label: &str, values: &[f64]) -> Self {
        Self::new(section, label, RowFormat::Rate, values.to_vec())
    }

    fn index(section: &'static str, label: &str, values: Vec<f64>) -> Self {
        Self::new(section, label, RowFormat::Index, values)
    }

    fn traced_as(mut self, trace_row: &str) -> Self {
        self.trace_row = Some(trace_row.to_string());
        self
    }

    fn untraced(mut self) -> Self {
        self.trace_row = None;
        self
    }

    fn display_only(mut self) -> Self {
        self.display_only = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year_row(year: u32, revenue: f64) -> YearRow {
        YearRow {
            year,
            lifetime_index: u8::from(year > 0),
            revenue_values: vec![revenue],
            revenue_growth_rates: vec![0.0],
            expense_values: vec![],
            expense_growth_rates: vec![],
            total_revenue: revenue,
            total_expense: 0.0,
            revenue_growth: 0.0,
            expense_growth: 0.0,
            ebitda: revenue,
            book_value_start: 0.0,
            depreciation: 0.0,
            book_value_end: 0.0,
            ebit: revenue,
            tax: 0.0,
            nopat: revenue,
            working_capital: 0.0,
            delta_working_capital: 0.0,
            capex: 0.0,
            equipment_salvage: 0.0,
            working_capital_salvage: 0.0,
            natcf: revenue,
            total_cash_flow: revenue,
            discount_factor: 1.0,
            discounted_cf: revenue,
            compounding_factor: 1.0,
            adjusted_cash_flow: revenue,
            cumulative_cf: revenue,
        }
    }

    #[test]
    fn test_add_year_fills_every_row() {
        let mut result = ProjectionResult::new(&["Gate Fee"], &[]);
        result.add_year(&year_row(0, 0.0));
        result.add_year(&year_row(1, 100.0));

        assert_eq!(result.years, vec![0, 1]);
        assert_eq!(result.revenue_items[0].values, vec![0.0, 100.0]);
        assert_eq!(result.growth_rates.revenue_items[0].len(), 2);
        assert_eq!(result.subtotals.lifetime_index, vec![0, 1]);
        assert_eq!(result.subtotals.depreciation_add_back.len(), 2);
        assert_eq!(result.total_cash_flows, vec![0.0, 100.0]);
    }

    #[test]
    fn test_grid_order_and_labels() {
        let mut result = ProjectionResult::new(&["Gate Fee"], &[]);
        result.add_year(&year_row(0, 0.0));

        let grid = result.grid();
        let labels: Vec<_> = grid.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels[0], "Lifetime Index");
        assert_eq!(labels[1], "+ Gate Fee");
        assert_eq!(labels[2], "Total Revenues");

        let capex = grid.iter().find(|r| r.label.starts_with("- Capital")).unwrap();
        assert_eq!(capex.trace_row.as_deref(), Some("- CapEx / Net Inv."));

        let discounted = grid.iter().find(|r| r.label == "Discounted Cash Flows").unwrap();
        assert!(discounted.display_only);
    }

    #[test]
    fn test_write_csv() {
        let mut result = ProjectionResult::new(&["Gate Fee"], &[]);
        result.add_year(&year_row(0, 0.0));
        result.add_year(&year_row(1, 250.0));

        let mut buf = Vec::new();
        result.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Section,Row,0,1"));
        assert_eq!(lines.next(), Some(",Lifetime Index,0,1"));
        assert!(text.contains("REVENUES,+ Gate Fee,0,250"));
    }
}
