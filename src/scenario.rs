//! Scenario runner for batch projections
//!
//! Holds one engine configuration and projects any number of inputs with it,
//! in parallel for batches.

use rayon::prelude::*;

use crate::inputs::ModelInputs;
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};
use crate::store::SavedProject;

/// Runs projections with a shared engine configuration
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let results = runner.run_batch(&[arrc1_sample(), other_inputs]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    /// Runner with the default config (trace recorded)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProjectionConfig) -> Self {
        Self { engine: ProjectionEngine::new(config) }
    }

    pub fn config(&self) -> &ProjectionConfig {
        self.engine.config()
    }

    /// Project one set of inputs
    ///
    /// The discount rate is re-resolved on a copy first, so stale
    /// `calculated_rate` values in stored inputs never leak into the result.
    pub fn run(&self, inputs: &ModelInputs) -> ProjectionResult {
        let mut resolved = inputs.clone();
        resolved.discount_rate.refresh();
        self.engine.project(&resolved)
    }

    /// Project many inputs in parallel; results keep the input order
    pub fn run_batch(&self, inputs: &[ModelInputs]) -> Vec<ProjectionResult> {
        inputs.par_iter().map(|i| self.run(i)).collect()
    }

    /// Project saved projects in parallel, paired with their names
    pub fn run_projects(&self, projects: &[SavedProject]) -> Vec<(String, ProjectionResult)> {
        projects
            .par_iter()
            .map(|project| (project.name.clone(), self.run(&project.data)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::{arrc1_sample, CapmParams, DiscountRateConfig};
    use approx::assert_abs_diff_eq;
    use chrono::Utc;

    #[test]
    fn test_run_refreshes_discount_rate() {
        let runner = ScenarioRunner::new();
        let mut inputs = arrc1_sample();
        inputs.discount_rate.direct_rate = 8.0;
        // calculated_rate still says 12

        let result = runner.run(&inputs);
        assert_abs_diff_eq!(result.subtotals.compounding_factor[1], 1.08, epsilon = 1e-12);
        assert_eq!(inputs.discount_rate.calculated_rate, 12.0);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let runner = ScenarioRunner::with_config(ProjectionConfig { record_trace: false });

        let base = arrc1_sample();
        let mut capm = base.clone();
        capm.discount_rate = DiscountRateConfig::capm(CapmParams {
            beta: 1.0,
            riskless_rate: 4.0,
            market_risk_premium: 8.0,
            debt_ratio: 50.0,
            cost_of_borrowing: 8.0,
            tax_rate: 30.0,
        });
        let mut short = base.clone();
        short.initial_investment.lifetime = 10;

        let batch = vec![base, capm, short];
        let results = runner.run_batch(&batch);

        assert_eq!(results.len(), 3);
        for (inputs, result) in batch.iter().zip(&results) {
            assert_eq!(result, &runner.run(inputs));
        }
        assert_eq!(results[2].year_count(), 11);
        // 8.8% WACC discounts less than the direct 12%
        assert!(results[1].metrics.npv > results[0].metrics.npv);
    }

    #[test]
    fn test_run_projects_keeps_names() {
        let runner = ScenarioRunner::new();
        let projects = vec![
            SavedProject { name: "a".into(), timestamp: Utc::now(), data: arrc1_sample() },
            SavedProject { name: "b".into(), timestamp: Utc::now(), data: ModelInputs::default() },
        ];

        let results = runner.run_projects(&projects);
        assert_eq!(results[0].0, "a");
        assert_eq!(results[1].0, "b");
        assert_eq!(results[1].1.year_count(), 6);
    }
}
