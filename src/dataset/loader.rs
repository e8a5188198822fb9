use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use super::{PriceBins, Record};
use crate::error::{Result, TreemapError};

/// One CSV row as exported by the listing generator. Columns not named here
/// (coordinates, bedrooms, year built, ...) are ignored.
#[derive(Debug, Deserialize)]
struct ListingRow {
    #[serde(rename = "Property_ID", default)]
    id: String,
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Price")]
    price: f64,
    #[serde(rename = "Area_SqFt")]
    area: f64,
}

/// Load listings from a CSV file, bucketing prices with `bins`.
pub fn load_records(path: &Path, bins: &PriceBins) -> Result<Vec<Record>> {
    let file = File::open(path)?;
    let records = read_records(file, bins)?;
    tracing::info!("Loaded {} listings from {}", records.len(), path.display());
    Ok(records)
}

/// Read listings from any CSV source with a header row.
pub fn read_records<R: Read>(reader: R, bins: &PriceBins) -> Result<Vec<Record>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let mut records = Vec::new();
    for (i, row) in rdr.deserialize::<ListingRow>().enumerate() {
        // header is line 1
        let line = i + 2;
        let row = row?;

        if row.kind.is_empty() || row.location.is_empty() {
            return Err(TreemapError::InvalidRecord {
                row: line,
                message: "missing Type or Location".to_string(),
            });
        }
        for (column, value) in [("Price", row.price), ("Area_SqFt", row.area)] {
            if !value.is_finite() || value < 0.0 {
                return Err(TreemapError::InvalidRecord {
                    row: line,
                    message: format!("{column} must be a non-negative number, got {value}"),
                });
            }
        }

        let id = if row.id.is_empty() {
            format!("PROP_{:04}", i + 1)
        } else {
            row.id
        };
        records.push(Record::with_bins(
            &id,
            &row.kind,
            &row.location,
            row.price,
            row.area,
            bins,
        ));
    }

    tracing::debug!("Parsed {} CSV rows", records.len());
    Ok(records)
}
