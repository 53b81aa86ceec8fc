//! Permissive numeric deserialization for form-style inputs
//!
//! Model files are often written by a partially-filled form: numbers may
//! arrive as numbers, numeric strings, empty strings, `null`, or not at all.
//! Anything that does not parse becomes `0.0` rather than an error.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Number(f64),
    Text(String),
    Flag(bool),
}

fn coerce(raw: Option<Raw>) -> f64 {
    match raw {
        Some(Raw::Number(value)) => value,
        Some(Raw::Text(text)) => text.trim().parse().unwrap_or(0.0),
        Some(Raw::Flag(_)) | None => 0.0,
    }
}

/// Deserialize an `f64`, coercing unparsable values to zero
pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(coerce(Option::<Raw>::deserialize(deserializer)?))
}

/// Deserialize a non-negative whole number (e.g. a lifetime in years)
///
/// Fractions are truncated; negative or non-finite values become zero.
pub fn whole<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = number(deserializer)?;
    if value.is_finite() && value > 0.0 {
        Ok(value.min(u32::MAX as f64) as u32)
    } else {
        Ok(0)
    }
}

#[derive(Deserialize)]
struct Lenient(#[serde(deserialize_with = "number")] f64);

/// Deserialize a sparse year -> percent map (`{"3": "4.5"}` style keys and values)
pub fn overrides<'de, D>(deserializer: D) -> Result<BTreeMap<u32, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<u32, Lenient>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(year, rate)| (year, rate.0))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "number")]
        value: f64,
        #[serde(default, deserialize_with = "whole")]
        years: u32,
        #[serde(default, deserialize_with = "overrides")]
        growth: BTreeMap<u32, f64>,
    }

    #[test]
    fn test_numbers_and_strings() {
        let probe: Probe = serde_json::from_str(r#"{"value": "12.5", "years": 15}"#).unwrap();
        assert_eq!(probe.value, 12.5);
        assert_eq!(probe.years, 15);

        let probe: Probe = serde_json::from_str(r#"{"value": 3, "years": "7"}"#).unwrap();
        assert_eq!(probe.value, 3.0);
        assert_eq!(probe.years, 7);
    }

    #[test]
    fn test_missing_and_garbage_become_zero() {
        let probe: Probe = serde_json::from_str(r#"{"value": "", "years": null}"#).unwrap();
        assert_eq!(probe.value, 0.0);
        assert_eq!(probe.years, 0);

        let probe: Probe = serde_json::from_str(r#"{"value": "abc", "years": -4}"#).unwrap();
        assert_eq!(probe.value, 0.0);
        assert_eq!(probe.years, 0);

        let probe: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(probe.value, 0.0);
        assert!(probe.growth.is_empty());
    }

    #[test]
    fn test_override_map_keys_are_years() {
        let probe: Probe =
            serde_json::from_str(r#"{"growth": {"3": "4.5", "5": 1, "7": ""}}"#).unwrap();
        assert_eq!(probe.growth.get(&3), Some(&4.5));
        assert_eq!(probe.growth.get(&5), Some(&1.0));
        assert_eq!(probe.growth.get(&7), Some(&0.0));
        assert_eq!(probe.growth.len(), 3);
    }
}
