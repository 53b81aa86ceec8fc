//! Model inputs: investment, working capital, discount rate and line items
//!
//! `ModelInputs` is a plain caller-owned value. The engine only reads it;
//! edits go through the methods below on whichever instance the caller holds.

mod capital;
mod discount;
mod items;
pub mod lenient;
pub mod loader;
mod sample;

pub use capital::{
    DepreciationMethod, InitialInvestment, InvestmentSummary, WorkingCapital, DEFAULT_DDB_FACTOR,
    DEFAULT_LIFETIME, MAX_LIFETIME,
};
pub use discount::{CapmParams, DiscountApproach, DiscountRateConfig};
pub use items::{ItemKind, ItemUpdate, LineItem};
pub use loader::{load_inputs, load_items_csv};
pub use sample::arrc1_sample;

pub(crate) use capital::finite;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ModelError, Result};

/// Complete configuration for one projection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelInputs {
    #[serde(alias = "initialInvestment")]
    pub initial_investment: InitialInvestment,

    #[serde(alias = "workingCapital")]
    pub working_capital: WorkingCapital,

    #[serde(alias = "discountRate")]
    pub discount_rate: DiscountRateConfig,

    #[serde(alias = "revenue")]
    pub revenue_items: Vec<LineItem>,

    #[serde(alias = "operatingExpenses")]
    pub expense_items: Vec<LineItem>,
}

impl ModelInputs {
    /// Lifetime actually modeled (configured value, or the default)
    pub fn lifetime(&self) -> u32 {
        self.initial_investment.effective_lifetime()
    }

    /// Year-0 outlay breakdown
    pub fn investment_summary(&self) -> InvestmentSummary {
        InvestmentSummary::new(&self.initial_investment, &self.working_capital)
    }

    pub fn items(&self, kind: ItemKind) -> &[LineItem] {
        match kind {
            ItemKind::Revenue => &self.revenue_items,
            ItemKind::Expense => &self.expense_items,
        }
    }

    fn items_mut(&mut self, kind: ItemKind) -> &mut Vec<LineItem> {
        match kind {
            ItemKind::Revenue => &mut self.revenue_items,
            ItemKind::Expense => &mut self.expense_items,
        }
    }

    fn item_mut(&mut self, kind: ItemKind, id: &str) -> Result<&mut LineItem> {
        self.items_mut(kind)
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| ModelError::ItemNotFound { kind: kind.as_str(), id: id.to_string() })
    }

    /// Next free numeric id across both lists
    ///
    /// One past the largest numeric id; if that would overflow, the smallest
    /// unused positive id.
    fn next_item_id(&self) -> String {
        let used: BTreeSet<u64> = self
            .revenue_items
            .iter()
            .chain(&self.expense_items)
            .filter_map(|item| item.id.parse::<u64>().ok())
            .collect();

        let max = used.last().copied().unwrap_or(0);
        let id = max
            .checked_add(1)
            .unwrap_or_else(|| (1..).find(|id| !used.contains(id)).unwrap_or(0));
        id.to_string()
    }

    /// Append an item to the end of its list, assigning a fresh id (returned)
    ///
    /// Any overrides already on `item` are discarded.
    pub fn add_item(&mut self, kind: ItemKind, mut item: LineItem) -> String {
        let id = self.next_item_id();
        item.id = id.clone();
        item.yearly_growth_overrides = BTreeMap::new();
        self.items_mut(kind).push(item);
        id
    }

    /// Remove an item by id, returning it if it existed
    pub fn remove_item(&mut self, kind: ItemKind, id: &str) -> Option<LineItem> {
        let list = self.items_mut(kind);
        let pos = list.iter().position(|item| item.id == id)?;
        Some(list.remove(pos))
    }

    /// Reorder a list to follow `id_order`
    ///
    /// Unknown ids are ignored; items missing from `id_order` keep their
    /// relative order after the listed ones.
    pub fn reorder_items(&mut self, kind: ItemKind, id_order: &[&str]) {
        let list = self.items_mut(kind);
        let mut remaining = std::mem::take(list);
        for id in id_order {
            if let Some(pos) = remaining.iter().position(|item| item.id == *id) {
                list.push(remaining.remove(pos));
            }
        }
        list.append(&mut remaining);
    }

    pub fn update_item(&mut self, kind: ItemKind, id: &str, update: ItemUpdate) -> Result<()> {
        update.apply(self.item_mut(kind, id)?);
        Ok(())
    }

    /// Merge per-year growth overrides (percent) into an item
    pub fn set_yearly_growth(
        &mut self,
        kind: ItemKind,
        id: &str,
        overrides: impl IntoIterator<Item = (u32, f64)>,
    ) -> Result<()> {
        self.item_mut(kind, id)?.set_yearly_growth(overrides);
        Ok(())
    }

    /// Override every operating year (1..=lifetime) with the same rate
    pub fn set_growth_all_years(&mut self, kind: ItemKind, id: &str, rate_pct: f64) -> Result<()> {
        let lifetime = self.lifetime();
        self.set_yearly_growth(kind, id, (1..=lifetime).map(|year| (year, rate_pct)))
    }
}
