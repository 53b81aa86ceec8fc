//! Projection engine: yearly schedule, trace and investment metrics

mod engine;
mod irr;
mod metrics;
mod rates;
mod schedule;
mod state;
mod trace;

pub use engine::{ProjectionConfig, ProjectionEngine};
pub use irr::{calculate_irr, DEFAULT_GUESS, NPV_TOLERANCE};
pub use metrics::{calculate_roc, Metrics};
pub use rates::{calculate_npv, cost_of_equity, resolve_discount_rate, wacc};
pub use schedule::{
    BookValueRows, GridRow, GrowthRates, ItemRow, ProjectionResult, RowFormat, SalvageRows,
    Subtotals, YearRow,
};
pub use state::{ProjectionState, YearClose};
pub use trace::{fmt_amount, fmt_factor, CellRef, Trace, TraceEntry};
