
use anyhow::Context;
use log::debug;
use std::path::Path;

use crate::data_types::observation::Observation;
use crate::parsing::table_reader::open_table;

/// Loads every row of the variant analyser summary table.
/// Required columns are `variant ID`, `tag`, `tier`, and `in phase`; anything else is ignored.
/// Empty identifiers are kept here and treated as placeholders downstream.
/// # Arguments
/// * `filename` - the summary table (CSV/TSV, optionally gzipped)
/// # Errors
/// * if the file cannot be opened
/// * if a row cannot be deserialized, including a missing tier column
/// * if a tier value on a row with a variant and a tag is not a valid rank
pub fn load_summary(filename: &Path) -> anyhow::Result<Vec<Observation>> {
    let mut csv_reader = open_table(filename)?;

    let mut observations = vec![];
    for (row_index, result) in csv_reader.deserialize().enumerate() {
        let obs: Observation = result
            .with_context(|| format!("Error while reading row {} of {filename:?}:", row_index + 1))?;

        // rows without a variant or tag never reach the tier lookup, so their tier is not checked
        if obs.variant_id().is_some() && obs.tag().is_some() {
            obs.tier()
                .with_context(|| format!("Error while parsing row {} of {filename:?}:", row_index + 1))?;
        }
        observations.push(obs);
    }

    debug!("Loaded {} summary rows from {filename:?}", observations.len());
    Ok(observations)
}
