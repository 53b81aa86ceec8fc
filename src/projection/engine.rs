//! Core projection engine for yearly investment cash flow projections

use log::debug;

use super::metrics::Metrics;
use super::schedule::{ProjectionResult, YearRow};
use super::state::{ProjectionState, YearClose};
use super::trace::{fmt_amount, fmt_factor, CellRef, Trace, TraceEntry};
use crate::inputs::{finite, DepreciationMethod, ItemKind, LineItem, ModelInputs};

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Whether to record per-cell trace entries (formula, values, dependencies)
    pub record_trace: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { record_trace: true }
    }
}

/// Model inputs resolved once per run: percents as decimals, non-finite as zero
#[derive(Debug, Clone)]
struct Parameters {
    lifetime: u32,
    tax_rate: f64,
    discount_rate: f64,
    asset_amount: f64,
    salvage_value: f64,
    depreciation_method: DepreciationMethod,
    ddb_factor: f64,
    tax_credit: f64,
    opportunity_cost: f64,
    other_investments: f64,
    wc_initial: f64,
    wc_pct: f64,
    wc_salvage_fraction: f64,
}

impl Parameters {
    fn from_inputs(inputs: &ModelInputs) -> Self {
        let inv = &inputs.initial_investment;
        let wc = &inputs.working_capital;
        Self {
            lifetime: inv.effective_lifetime(),
            tax_rate: finite(inputs.discount_rate.capm.tax_rate) / 100.0,
            discount_rate: finite(inputs.discount_rate.calculated_rate) / 100.0,
            asset_amount: finite(inv.amount),
            salvage_value: finite(inv.salvage_value),
            depreciation_method: inv.depreciation_method,
            ddb_factor: inv.effective_ddb_factor(),
            tax_credit: finite(inv.tax_credit) / 100.0,
            opportunity_cost: finite(inv.opportunity_cost),
            other_investments: finite(inv.other_investments),
            wc_initial: finite(wc.initial),
            wc_pct: finite(wc.percentage_of_revenue) / 100.0,
            wc_salvage_fraction: finite(wc.salvage_fraction),
        }
    }
}

/// Main projection engine
///
/// Holds no state between runs; one engine can project any number of
/// inputs, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project years 0..=lifetime and aggregate the metrics
    ///
    /// Uses `discount_rate.calculated_rate` as the discount rate; callers that
    /// edit the rate inputs should `refresh()` it first.
    pub fn project(&self, inputs: &ModelInputs) -> ProjectionResult {
        let params = Parameters::from_inputs(inputs);
        debug!(
            "Projecting {} years at {:.4} with {} revenue and {} expense items",
            params.lifetime,
            params.discount_rate,
            inputs.revenue_items.len(),
            inputs.expense_items.len()
        );

        let revenue_labels: Vec<&str> = inputs.revenue_items.iter().map(|i| i.label.as_str()).collect();
        let expense_labels: Vec<&str> = inputs.expense_items.iter().map(|i| i.label.as_str()).collect();
        let mut result = ProjectionResult::new(&revenue_labels, &expense_labels);
        let mut state = ProjectionState::new(
            params.asset_amount,
            inputs.revenue_items.len(),
            inputs.expense_items.len(),
        );

        for _year in 0..=params.lifetime {
            let row = self.calculate_year(&params, inputs, &state);

            if self.config.record_trace {
                record_trace(&mut result.trace, &params, inputs, &state, &row);
            }
            result.add_year(&row);

            state.advance(YearClose {
                book_value_end: row.book_value_end,
                total_revenue: row.total_revenue,
                total_expense: row.total_expense,
                working_capital: row.working_capital,
                cumulative_cf: row.cumulative_cf,
                revenue_values: row.revenue_values,
                expense_values: row.expense_values,
            });
        }

        result.metrics = Metrics::aggregate(
            &result.subtotals.adjusted_cash_flow,
            &result.total_cash_flows,
            &result.subtotals.nopat,
            &result.book_value.end,
            params.discount_rate,
        );

        debug!(
            "Projection complete: NPV={:.2} IRR={:?} ROC={:.4}",
            result.metrics.npv, result.metrics.irr, result.metrics.roc
        );

        result
    }

    /// Calculate every row for one year from the carried-forward state
    fn calculate_year(&self, params: &Parameters, inputs: &ModelInputs, state: &ProjectionState) -> YearRow {
        let t = state.year;
        let lifetime_index = u8::from(t > 0 && t <= params.lifetime);

        // Line items
        let (revenue_values, revenue_growth_rates) =
            project_items(&inputs.revenue_items, &state.prior_revenue_values, t);
        let (expense_values, expense_growth_rates) =
            project_items(&inputs.expense_items, &state.prior_expense_values, t);
        let total_revenue: f64 = revenue_values.iter().sum();
        let total_expense: f64 = expense_values.iter().sum();

        let (revenue_growth, expense_growth) = if t > 1 {
            (
                aggregate_growth(total_revenue, state.prior_total_revenue),
                aggregate_growth(total_expense, state.prior_total_expense),
            )
        } else {
            (0.0, 0.0)
        };

        let ebitda = total_revenue - total_expense;

        // Depreciation and book value
        let book_value_start = state.book_value;
        let depreciation = self.calculate_depreciation(params, t, book_value_start);
        let book_value_end = book_value_start - depreciation;

        // No operations in the investment year
        let ebit = if t == 0 { 0.0 } else { ebitda - depreciation };
        // Signed: a loss yields a tax shield
        let tax = ebit * params.tax_rate;
        let nopat = ebit - tax;

        // Working capital: day-one outlay in year 0, then the yearly change
        let working_capital = total_revenue * params.wc_pct;
        let delta_working_capital = if t == 0 {
            params.wc_initial
        } else {
            working_capital - state.prior_working_capital
        };

        let capex = if t == 0 {
            params.asset_amount - params.asset_amount * params.tax_credit
                + params.opportunity_cost
                + params.other_investments
        } else {
            0.0
        };

        let (equipment_salvage, working_capital_salvage) = if t == params.lifetime {
            (
                params.salvage_value,
                (params.wc_initial + working_capital) * params.wc_salvage_fraction,
            )
        } else {
            (0.0, 0.0)
        };

        let natcf = if t == 0 {
            -(capex + delta_working_capital)
        } else {
            nopat + depreciation - delta_working_capital
        };
        let total_cash_flow = natcf + equipment_salvage + working_capital_salvage;

        // Two discounting conventions: the discounted CF is display only,
        // the adjusted cash flow (salvage included) feeds NPV.
        let compounding_factor = (1.0 + params.discount_rate).powi(t as i32);
        let discount_factor = 1.0 / compounding_factor;
        let discounted_cf = natcf * discount_factor;
        let adjusted_cash_flow = total_cash_flow / compounding_factor;
        let cumulative_cf = state.cumulative_cf + adjusted_cash_flow;

        YearRow {
            year: t,
            lifetime_index,
            revenue_values,
            revenue_growth_rates,
            expense_values,
            expense_growth_rates,
            total_revenue,
            total_expense,
            revenue_growth,
            expense_growth,
            ebitda,
            book_value_start,
            depreciation,
            book_value_end,
            ebit,
            tax,
            nopat,
            working_capital,
            delta_working_capital,
            capex,
            equipment_salvage,
            working_capital_salvage,
            natcf,
            total_cash_flow,
            discount_factor,
            discounted_cf,
            compounding_factor,
            adjusted_cash_flow,
            cumulative_cf,
        }
    }

    /// Depreciation charged in year `t`
    fn calculate_depreciation(&self, params: &Parameters, t: u32, book_value_start: f64) -> f64 {
        if t == 0 || t > params.lifetime {
            return 0.0;
        }

        let lifetime = f64::from(params.lifetime);
        match params.depreciation_method {
            DepreciationMethod::StraightLine => params.asset_amount / lifetime,
            DepreciationMethod::DecliningBalance => {
                let charge = book_value_start * (params.ddb_factor / lifetime);
                // Never depreciate below zero
                if book_value_start - charge < 0.0 {
                    book_value_start
                } else {
                    charge
                }
            }
            DepreciationMethod::None => 0.0,
        }
    }
}

/// Values and realized growth rates (decimal) of each item in year `t`
fn project_items(items: &[LineItem], prior_values: &[f64], t: u32) -> (Vec<f64>, Vec<f64>) {
    items
        .iter()
        .zip(prior_values)
        .map(|(item, &prior)| match t {
            0 => (0.0, 0.0),
            1 => (finite(item.base_value), 0.0),
            _ => {
                let growth = finite(item.growth_rate_for(t)) / 100.0;
                (prior * (1.0 + growth), growth)
            }
        })
        .unzip()
}

fn aggregate_growth(current: f64, prior: f64) -> f64 {
    if prior > 0.0 {
        current / prior - 1.0
    } else {
        0.0
    }
}

fn item_rows(kind: ItemKind, items: &[LineItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| format!("{} {}", kind.row_prefix(), item.label))
        .collect()
}

/// Record the provenance of every derived cell for year `row.year`
fn record_trace(
    trace: &mut Trace,
    params: &Parameters,
    inputs: &ModelInputs,
    state: &ProjectionState,
    row: &YearRow,
) {
    let t = row.year;
    let at = |label: &str| CellRef::new(label, t);
    let joined = |values: &[f64]| {
        values
            .iter()
            .map(|&v| fmt_amount(v))
            .collect::<Vec<_>>()
            .join(" + ")
    };

    trace.record(
        "Total Revenues",
        t,
        TraceEntry::new(
            "Sum of all Revenue items",
            joined(&row.revenue_values),
            item_rows(ItemKind::Revenue, &inputs.revenue_items)
                .into_iter()
                .map(|label| CellRef::new(label, t))
                .collect(),
        ),
    );
    trace.record(
        "Total Expenses",
        t,
        TraceEntry::new(
            "Sum of all Operating Expense items",
            joined(&row.expense_values),
            item_rows(ItemKind::Expense, &inputs.expense_items)
                .into_iter()
                .map(|label| CellRef::new(label, t))
                .collect(),
        ),
    );
    trace.record(
        "EBITDA",
        t,
        TraceEntry::new(
            "Total Revenue - Total Expense",
            format!("{} - {}", fmt_amount(row.total_revenue), fmt_amount(row.total_expense)),
            vec![at("Total Revenues"), at("Total Expenses")],
        ),
    );

    // Book value and depreciation
    trace.record(
        "Book Value (Initial)",
        t,
        if t == 0 {
            TraceEntry::new("Initial Investment", fmt_amount(row.book_value_start), vec![])
        } else {
            TraceEntry::new(
                "Previous Year End Book Value",
                fmt_amount(row.book_value_start),
                vec![CellRef::new("Book Value (End)", t - 1)],
            )
        },
    );
    let depreciation_entry = match params.depreciation_method {
        DepreciationMethod::StraightLine => TraceEntry::new(
            "Initial Investment / Lifetime",
            format!("{} / {}", fmt_amount(params.asset_amount), params.lifetime),
            vec![],
        ),
        DepreciationMethod::DecliningBalance => TraceEntry::new(
            "Start Book Value * (DDB Factor / Lifetime)",
            format!(
                "{} * ({} / {})",
                fmt_amount(row.book_value_start),
                params.ddb_factor,
                params.lifetime
            ),
            vec![at("Book Value (Initial)")],
        ),
        DepreciationMethod::None => TraceEntry::new("No depreciation", "0", vec![]),
    };
    trace.record("Depreciation", t, depreciation_entry);
    trace.record(
        "Book Value (End)",
        t,
        TraceEntry::new(
            "Start Book Value - Depreciation",
            format!("{} - {}", fmt_amount(row.book_value_start), fmt_amount(row.depreciation)),
            vec![at("Book Value (Initial)"), at("Depreciation")],
        ),
    );

    // Operating results
    trace.record(
        "EBIT",
        t,
        TraceEntry::new(
            "EBITDA - Depreciation",
            format!("{} - {}", fmt_amount(row.ebitda), fmt_amount(row.depreciation)),
            vec![at("EBITDA"), at("Depreciation")],
        ),
    );
    trace.record(
        "- Tax",
        t,
        TraceEntry::new(
            "EBIT * Tax Rate",
            format!("{} * {:.1}%", fmt_amount(row.ebit), params.tax_rate * 100.0),
            vec![at("EBIT")],
        ),
    );
    trace.record(
        "EBT(1-t) / NOPAT",
        t,
        TraceEntry::new(
            "EBIT - Tax",
            format!("{} - {}", fmt_amount(row.ebit), fmt_amount(row.tax)),
            vec![at("EBIT"), at("- Tax")],
        ),
    );

    // Salvage
    let final_year = t == params.lifetime;
    trace.record(
        "Equipment",
        t,
        TraceEntry::new(
            if final_year { "Salvage Value at End" } else { "N/A" },
            fmt_amount(row.equipment_salvage),
            vec![],
        ),
    );
    trace.record(
        "Working Capital",
        t,
        if final_year {
            TraceEntry::new(
                "(Initial WC + Current Year WC) * Salvage Fraction",
                format!(
                    "({} + {}) * {}",
                    fmt_amount(params.wc_initial),
                    fmt_amount(row.working_capital),
                    params.wc_salvage_fraction
                ),
                vec![at("Total Revenues")],
            )
        } else {
            TraceEntry::new("N/A", "0", vec![at("Total Revenues")])
        },
    );

    // Cash flow
    trace.record(
        "NATCF",
        t,
        if t == 0 {
            TraceEntry::new(
                "-(CapEx + ΔWC)",
                format!("-({} + {})", fmt_amount(row.capex), fmt_amount(row.delta_working_capital)),
                vec![at("- CapEx / Net Inv."), at("- Δ Working Capital")],
            )
        } else {
            TraceEntry::new(
                "NOPAT + Depr - ΔWC",
                format!(
                    "{} + {} - {}",
                    fmt_amount(row.nopat),
                    fmt_amount(row.depreciation),
                    fmt_amount(row.delta_working_capital)
                ),
                vec![at("EBT(1-t) / NOPAT"), at("+ Depreciation"), at("- Δ Working Capital")],
            )
        },
    );

    // Valuation
    let rate = fmt_factor(params.discount_rate);
    trace.record(
        "Discount Factor",
        t,
        TraceEntry::new("1 / (1 + r)^t", format!("1 / (1 + {rate})^{t}"), vec![]),
    );
    trace.record(
        "Discounted Cash Flows",
        t,
        TraceEntry::new(
            "NATCF * Discount Factor",
            format!("{} * {}", fmt_amount(row.natcf), fmt_factor(row.discount_factor)),
            vec![at("NATCF"), at("Discount Factor")],
        ),
    );
    trace.record(
        "Compounding Factor",
        t,
        TraceEntry::new("(1 + r)^t", format!("(1 + {rate})^{t}"), vec![]),
    );
    trace.record(
        "Adjusted Cash Flow",
        t,
        TraceEntry::new(
            "(NATCF + Salvages) / Compounding Factor",
            format!(
                "({} + {}) / {}",
                fmt_amount(row.natcf),
                fmt_amount(row.equipment_salvage + row.working_capital_salvage),
                fmt_factor(row.compounding_factor)
            ),
            vec![at("NATCF"), at("Equipment"), at("Working Capital"), at("Compounding Factor")],
        ),
    );
    trace.record(
        "Cumulative Cash Flows",
        t,
        TraceEntry::new(
            "Running sum of Adjusted Cash Flows",
            if t == 0 {
                fmt_amount(row.adjusted_cash_flow)
            } else {
                format!("{} + {}", fmt_amount(state.cumulative_cf), fmt_amount(row.adjusted_cash_flow))
            },
            (0..=t).map(|year| CellRef::new("Adjusted Cash Flow", year)).collect(),
        ),
    );
}
