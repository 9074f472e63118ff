
use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::data_types::frequencies::AlleleTable;
use crate::parsing::frequencies::{COL_ALT_COUNT_GOOD, COL_AF_GOOD, COL_COVERAGE_GOOD, COL_VARIANT_ID};

/// Contains all the data written to each row of the reconciled frequency file
#[derive(Serialize)]
struct AlleleFrequencyRow<'a> {
    #[serde(rename = "variant ID")]
    variant_id: &'a str,
    #[serde(rename = "cvrg (tiers 1.1-2.5)")]
    coverage: u64,
    #[serde(rename = "AC alt (tiers 1.1-2.5)")]
    alt_count: u64,
    #[serde(rename = "AF (tiers 1.1-2.5)")]
    frequency: f64,
}

/// Writes the reconciled good-tier frequencies, one row per variant in table order
/// # Arguments
/// * `filename` - the output path, ".csv" switches to comma-delimited
/// * `table` - the reconciled table
pub fn write_allele_frequencies(filename: &Path, table: &AlleleTable) -> csv::Result<()> {
    let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
    let delimiter: u8 = if is_csv { b',' } else { b'\t' };
    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(filename)?;

    // serialize only writes headers with the first row; force them for an empty table
    if table.is_empty() {
        csv_writer.write_record([COL_VARIANT_ID, COL_COVERAGE_GOOD, COL_ALT_COUNT_GOOD, COL_AF_GOOD])?;
    }

    for (variant_id, counts) in table.iter() {
        let row = AlleleFrequencyRow {
            variant_id,
            coverage: counts.coverage(),
            alt_count: counts.alt_count(),
            frequency: counts.frequency(),
        };
        csv_writer.serialize(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::frequencies::AlleleCounts;
    use crate::parsing::table_reader::open_table;

    #[test]
    fn test_write_allele_frequencies() {
        let out_dir = std::env::temp_dir().join(format!("haplotier_af_{}", std::process::id()));
        std::fs::create_dir_all(&out_dir).unwrap();
        let out_fn = out_dir.join("af.csv");

        let table: AlleleTable = [
            ("chr1:100A>G".to_string(), AlleleCounts::from_counts(97, 2)),
            ("chr1:105C>T".to_string(), AlleleCounts::from_counts(50, 10)),
        ].into_iter().collect();
        write_allele_frequencies(&out_fn, &table).unwrap();

        // read it back with the same reader the loaders use
        let mut reader = open_table(&out_fn).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec!["variant ID", "cvrg (tiers 1.1-2.5)", "AC alt (tiers 1.1-2.5)", "AF (tiers 1.1-2.5)"]);
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[1][0], "chr1:105C>T");
        assert_eq!(&records[1][2], "10");
        assert_eq!(&records[1][3], "0.2");

        std::fs::remove_dir_all(&out_dir).unwrap();
    }

    #[test]
    fn test_write_empty() {
        let out_dir = std::env::temp_dir().join(format!("haplotier_af_empty_{}", std::process::id()));
        std::fs::create_dir_all(&out_dir).unwrap();
        let out_fn = out_dir.join("af.tsv");

        write_allele_frequencies(&out_fn, &AlleleTable::default()).unwrap();
        let contents = std::fs::read_to_string(&out_fn).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.starts_with("variant ID\t"));

        std::fs::remove_dir_all(&out_dir).unwrap();
    }
}
