//! Load model inputs from JSON and line items from CSV

use csv::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{lenient, LineItem, ModelInputs};
use crate::error::Result;

/// Raw CSV row: `label,value,growth_rate`
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(alias = "Label")]
    label: String,
    #[serde(alias = "Value", alias = "base_value", deserialize_with = "lenient::number")]
    value: f64,
    #[serde(
        default,
        alias = "GrowthRate",
        alias = "growth",
        deserialize_with = "lenient::number"
    )]
    growth_rate: f64,
}

impl CsvRow {
    fn into_item(self) -> LineItem {
        LineItem::new(self.label.trim(), self.value, self.growth_rate)
    }
}

/// Load line items from any CSV reader
///
/// Items come back without ids; add them through
/// [`ModelInputs::add_item`](super::ModelInputs::add_item) to assign one.
pub fn load_items_from_reader<R: Read>(reader: R) -> Result<Vec<LineItem>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut items = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        items.push(row.into_item());
    }

    Ok(items)
}

/// Load line items from a CSV file
pub fn load_items_csv<P: AsRef<Path>>(path: P) -> Result<Vec<LineItem>> {
    load_items_from_reader(File::open(path)?)
}

/// Load a complete model from a JSON file
pub fn load_inputs<P: AsRef<Path>>(path: P) -> Result<ModelInputs> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_items_from_csv() {
        let data = "label,value,growth_rate\n\
                    Gate Fee,6000000,2.5\n\
                    Energy,-4875621,\n";
        let items = load_items_from_reader(data.as_bytes()).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label, "Gate Fee");
        assert_eq!(items[0].default_growth_rate, 2.5);
        assert_eq!(items[1].base_value, -4_875_621.0);
        assert_eq!(items[1].default_growth_rate, 0.0);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let data = "name,amount\nA,1\n";
        assert!(load_items_from_reader(data.as_bytes()).is_err());
    }
}
