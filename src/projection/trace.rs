//! Per-cell provenance: formula, substituted values and dependency cells
//!
//! Entries are keyed by `"{row label}-{year}"`, the same key the schedule grid
//! uses for its cells, so a renderer can highlight a cell's inputs on hover.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference to one schedule cell: (row label, year)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellRef(pub String, pub u32);

impl CellRef {
    pub fn new(row: impl Into<String>, year: u32) -> Self {
        Self(row.into(), year)
    }

    pub fn row(&self) -> &str {
        &self.0
    }

    pub fn year(&self) -> u32 {
        self.1
    }

    pub fn key(&self) -> String {
        cell_key(&self.0, self.1)
    }
}

fn cell_key(row: &str, year: u32) -> String {
    format!("{row}-{year}")
}

/// How one cell was computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Formula in words, e.g. `EBITDA - Depreciation`
    pub formula: String,
    /// Formula with the (rounded) values substituted in
    pub substituted: String,
    pub deps: Vec<CellRef>,
}

impl TraceEntry {
    pub fn new(formula: impl Into<String>, substituted: impl Into<String>, deps: Vec<CellRef>) -> Self {
        Self {
            formula: formula.into(),
            substituted: substituted.into(),
            deps,
        }
    }
}

/// Trace entries for a whole projection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace {
    entries: BTreeMap<String, TraceEntry>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, row: &str, year: u32, entry: TraceEntry) {
        self.entries.insert(cell_key(row, year), entry);
    }

    pub fn get(&self, row: &str, year: u32) -> Option<&TraceEntry> {
        self.entries.get(&cell_key(row, year))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TraceEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }
}

/// Round half up to a whole amount and group thousands: `-1234567.5` -> `-1,234,567`
pub fn fmt_amount(value: f64) -> String {
    let rounded = (value + 0.5).floor();
    if !rounded.is_finite() {
        return value.to_string();
    }
    if rounded == 0.0 {
        return "0".to_string();
    }

    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Fixed four-decimal rendering used for rates and factors
pub fn fmt_factor(value: f64) -> String {
    format!("{value:.4}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_amount() {
        assert_eq!(fmt_amount(0.0), "0");
        assert_eq!(fmt_amount(999.4), "999");
        assert_eq!(fmt_amount(999.5), "1,000");
        assert_eq!(fmt_amount(1_234_567.0), "1,234,567");
        assert_eq!(fmt_amount(-4_875_621.0), "-4,875,621");
        assert_eq!(fmt_amount(-0.4), "0");
        assert_eq!(fmt_amount(-2.5), "-2");
        assert_eq!(fmt_amount(750_000.0), "750,000");
    }

    #[test]
    fn test_fmt_factor() {
        assert_eq!(fmt_factor(0.12), "0.1200");
        assert_eq!(fmt_factor(1.0 / 1.12), "0.8929");
    }

    #[test]
    fn test_record_and_lookup() {
        let mut trace = Trace::new();
        trace.record(
            "EBIT",
            3,
            TraceEntry::new(
                "EBITDA - Depreciation",
                "10 - 2",
                vec![CellRef::new("EBITDA", 3), CellRef::new("Depreciation", 3)],
            ),
        );

        let entry = trace.get("EBIT", 3).unwrap();
        assert_eq!(entry.deps[1].row(), "Depreciation");
        assert_eq!(entry.deps[1].key(), "Depreciation-3");
        assert!(trace.get("EBIT", 2).is_none());
        assert_eq!(trace.len(), 1);
    }

    #[test]
    fn test_serializes_like_the_grid_keys() {
        let mut trace = Trace::new();
        trace.record("- Tax", 0, TraceEntry::new("EBIT * Tax Rate", "0 * 30.0%", vec![CellRef::new("EBIT", 0)]));

        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["- Tax-0"]["deps"][0][0], "EBIT");
        assert_eq!(json["- Tax-0"]["deps"][0][1], 0);
    }
}
