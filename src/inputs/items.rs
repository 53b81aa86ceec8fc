//! Revenue and operating expense line items

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::lenient;

/// Which list a line item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Revenue,
    #[serde(alias = "operating_expense")]
    Expense,
}

impl ItemKind {
    /// Sign prefix used for the item's row label in the schedule grid
    pub fn row_prefix(self) -> &'static str {
        match self {
            ItemKind::Revenue => "+",
            ItemKind::Expense => "-",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Revenue => "revenue",
            ItemKind::Expense => "expense",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A revenue or expense stream with compound growth
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    pub id: String,

    pub label: String,

    /// Value in year 1
    #[serde(alias = "value", deserialize_with = "lenient::number")]
    pub base_value: f64,

    /// Growth applied each year after year 1 (percent)
    #[serde(alias = "growthRate", deserialize_with = "lenient::number")]
    pub default_growth_rate: f64,

    /// Year-specific growth (percent) taking precedence over the default
    #[serde(alias = "yearlyGrowth", deserialize_with = "lenient::overrides")]
    pub yearly_growth_overrides: BTreeMap<u32, f64>,
}

impl LineItem {
    pub fn new(label: impl Into<String>, base_value: f64, default_growth_rate: f64) -> Self {
        Self {
            id: String::new(),
            label: label.into(),
            base_value,
            default_growth_rate,
            yearly_growth_overrides: BTreeMap::new(),
        }
    }

    /// Growth rate (percent) in effect for `year`: override first, then default
    pub fn growth_rate_for(&self, year: u32) -> f64 {
        self.yearly_growth_overrides
            .get(&year)
            .copied()
            .unwrap_or(self.default_growth_rate)
    }

    /// Merge year overrides into the existing map
    pub fn set_yearly_growth(&mut self, overrides: impl IntoIterator<Item = (u32, f64)>) {
        self.yearly_growth_overrides.extend(overrides);
    }
}

/// Partial update of a line item; `None` fields are left as they are
#[derive(Debug, Clone, Default)]
pub struct ItemUpdate {
    pub label: Option<String>,
    pub base_value: Option<f64>,
    pub default_growth_rate: Option<f64>,
}

impl ItemUpdate {
    pub(crate) fn apply(self, item: &mut LineItem) {
        if let Some(label) = self.label {
            item.label = label;
        }
        if let Some(value) = self.base_value {
            item.base_value = value;
        }
        if let Some(rate) = self.default_growth_rate {
            item.default_growth_rate = rate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_precedence() {
        let mut item = LineItem::new("Gate Fee", 100.0, 2.5);
        item.set_yearly_growth([(3, 10.0)]);

        assert_eq!(item.growth_rate_for(2), 2.5);
        assert_eq!(item.growth_rate_for(3), 10.0);
        assert_eq!(item.growth_rate_for(4), 2.5);

        item.set_yearly_growth([(3, 0.0), (4, 1.0)]);
        assert_eq!(item.growth_rate_for(3), 0.0);
        assert_eq!(item.growth_rate_for(4), 1.0);
    }

    #[test]
    fn test_parse_camel_case_item() {
        let json = r#"{"id": "17", "label": "Energy", "value": "-4875621",
                       "growthRate": "", "yearlyGrowth": {"2": 3}, "type": "revenue"}"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.base_value, -4_875_621.0);
        assert_eq!(item.default_growth_rate, 0.0);
        assert_eq!(item.growth_rate_for(2), 3.0);
    }

    #[test]
    fn test_update_keeps_unset_fields() {
        let mut item = LineItem::new("O&M Fixed", 10.0, 2.5);
        ItemUpdate { base_value: Some(20.0), ..Default::default() }.apply(&mut item);
        assert_eq!(item.label, "O&M Fixed");
        assert_eq!(item.base_value, 20.0);
        assert_eq!(item.default_growth_rate, 2.5);
    }
}
