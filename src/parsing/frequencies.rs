
use anyhow::Context;
use log::debug;
use serde::Deserialize;
use std::path::Path;

use crate::data_types::frequencies::{AlleleCounts, FrequencyTable, VariantFrequency};
use crate::data_types::parse_error::ParseError;
use crate::parsing::table_reader::open_table;

pub const COL_VARIANT_ID: &str = "variant ID";
pub const COL_AF_ALL: &str = "AF (all tiers)";
pub const COL_COVERAGE_GOOD: &str = "cvrg (tiers 1.1-2.5)";
pub const COL_ALT_COUNT_GOOD: &str = "AC alt (tiers 1.1-2.5)";
pub const COL_AF_GOOD: &str = "AF (tiers 1.1-2.5)";

/// One row of the frequency table; other columns such as the all-tier counts are ignored.
/// Counts are read as floats because spreadsheet exports often write "12.0".
#[derive(Debug, Deserialize)]
struct FrequencyRow {
    #[serde(rename = "variant ID")]
    variant_id: String,
    #[serde(rename = "AF (all tiers)")]
    all_tiers_af: f64,
    #[serde(rename = "cvrg (tiers 1.1-2.5)")]
    good_coverage: f64,
    #[serde(rename = "AC alt (tiers 1.1-2.5)")]
    good_alt_count: f64,
    #[serde(rename = "AF (tiers 1.1-2.5)")]
    good_af: f64,
}

/// Converts a float cell into a count
fn to_count(column: &'static str, value: f64) -> Result<u64, ParseError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(ParseError::InvalidCount { column, value });
    }
    Ok(value as u64)
}

/// Makes sure a frequency cell is usable
fn to_frequency(column: &'static str, value: f64) -> Result<f64, ParseError> {
    if !value.is_finite() {
        return Err(ParseError::InvalidFrequency { column, value });
    }
    Ok(value)
}

impl FrequencyRow {
    /// Validates the raw row and converts it into the typed representation
    fn into_frequency(self) -> Result<(String, VariantFrequency), ParseError> {
        let coverage = to_count(COL_COVERAGE_GOOD, self.good_coverage)?;
        let alt_count = to_count(COL_ALT_COUNT_GOOD, self.good_alt_count)?;
        if alt_count > coverage {
            return Err(ParseError::AltExceedsCoverage {
                variant_id: self.variant_id, alt_count, coverage
            });
        }

        let good_tiers = AlleleCounts::new(coverage, alt_count, to_frequency(COL_AF_GOOD, self.good_af)?);
        let frequency = VariantFrequency::new(to_frequency(COL_AF_ALL, self.all_tiers_af)?, good_tiers);
        Ok((self.variant_id.trim().to_string(), frequency))
    }
}

/// Loads the variant analyser frequency table, indexed by the `variant ID` column.
/// # Arguments
/// * `filename` - the frequency table (CSV/TSV, optionally gzipped)
/// # Errors
/// * if the file cannot be opened
/// * if a row is missing a required column or has a non-numeric value
/// * if counts are negative, fractional, or inconsistent with each other
/// * if a variant is listed twice
pub fn load_frequencies(filename: &Path) -> anyhow::Result<FrequencyTable> {
    let mut csv_reader = open_table(filename)?;

    let mut table = FrequencyTable::default();
    for (row_index, result) in csv_reader.deserialize().enumerate() {
        let row: FrequencyRow = result
            .with_context(|| format!("Error while reading row {} of {filename:?}:", row_index + 1))?;
        let (variant_id, frequency) = row.into_frequency()
            .with_context(|| format!("Error while parsing row {} of {filename:?}:", row_index + 1))?;
        table.insert(variant_id, frequency)
            .with_context(|| format!("Error while parsing row {} of {filename:?}:", row_index + 1))?;
    }

    debug!("Loaded {} variant frequencies from {filename:?}", table.len());
    Ok(table)
}
