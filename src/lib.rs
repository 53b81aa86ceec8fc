//! DCF Model - discounted cash flow projections for capital investments
//!
//! This library provides:
//! - Year-by-year projection of revenues, expenses, depreciation, tax and cash flow
//! - Investment metrics: NPV, IRR (Newton-Raphson with bisection fallback), return on capital
//! - Discount rate resolution (direct rate or CAPM/WACC build-up)
//! - Per-cell calculation trace (formula, substituted values, dependencies)
//! - Named project snapshots and parallel batch projection

pub mod error;
pub mod inputs;
pub mod projection;
pub mod scenario;
pub mod store;

// Re-export commonly used types
pub use error::{ModelError, Result};
pub use inputs::{arrc1_sample, ItemKind, LineItem, ModelInputs};
pub use projection::{Metrics, ProjectionConfig, ProjectionEngine, ProjectionResult, Trace};
pub use scenario::ScenarioRunner;
pub use store::{ProjectStore, SavedProject};
