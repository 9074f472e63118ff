
use anyhow::Context;
use itertools::Itertools;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

use crate::data_types::haplotypes::{ClassifiedSets, FrequencySource, HaplotypeCategory, HaplotypeSets};
use crate::data_types::observation::Tier;

/// Variant labels in the header are cut to this many characters
pub const MAX_LABEL_LENGTH: usize = 18;
/// Label of the first column
const TAG_HEADER: &str = "tag";
/// Label of the frequency row
const AF_ROW: &str = "AF";
/// Label of the frequency band row
const AF_BAND_ROW: &str = "AF band";

/// Coarse frequency bands used to highlight the AF row.
/// The bands are contiguous: anything above 0.4 is `High`, including values between 0.4 and 0.41
/// that a two-decimal colour scale would leave unmarked.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum_macros::Display)]
pub enum FrequencyBand {
    /// below 0.01
    #[strum(serialize = "low")]
    Low,
    /// 0.01 to 0.4
    #[strum(serialize = "mid")]
    Mid,
    /// above 0.4
    #[strum(serialize = "high")]
    High,
}

impl FrequencyBand {
    pub fn from_frequency(frequency: f64) -> Self {
        if frequency < 0.01 {
            FrequencyBand::Low
        } else if frequency <= 0.4 {
            FrequencyBand::Mid
        } else {
            FrequencyBand::High
        }
    }
}

/// What goes in the cells of a matrix
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CellContent {
    /// The alt base of the variant, i.e. the last character of "chr1:100A>G"
    AltBase,
    /// The tier of the variant on that tag
    TierNumber,
}

/// The three frequency dictionaries a sheet can be labelled with
#[derive(Clone, Debug, Default)]
pub struct FrequencyDictionaries {
    pub all_tiers: BTreeMap<String, f64>,
    pub good_tiers: BTreeMap<String, f64>,
    pub reconciled: BTreeMap<String, f64>,
}

impl FrequencyDictionaries {
    pub fn get(&self, source: FrequencySource) -> &BTreeMap<String, f64> {
        match source {
            FrequencySource::AllTiers => &self.all_tiers,
            FrequencySource::GoodTiers => &self.good_tiers,
            FrequencySource::Reconciled => &self.reconciled,
        }
    }
}

/// Tag x variant matrix for one classified category
#[derive(Clone, Debug, PartialEq)]
pub struct HaplotypeSheet {
    /// Sheet name, e.g. "HapHQ"
    name: String,
    /// All variants in the category, sorted
    variants: Vec<String>,
    /// Frequency of each variant, None if the dictionary lacks it
    frequencies: Vec<Option<f64>>,
    /// One row per tag: the tag and one cell per variant
    rows: Vec<(String, Vec<String>)>,
}

impl HaplotypeSheet {
    /// Builds the matrix for a category.
    /// # Arguments
    /// * `name` - the sheet name
    /// * `haplotypes` - tag -> variants for the category
    /// * `frequencies` - variant -> AF used for the AF row
    /// * `tier_by_tag` - tag -> variant -> tier, only used for `CellContent::TierNumber`
    /// * `content` - what to put in the cells
    pub fn new(
        name: &str,
        haplotypes: &HaplotypeSets,
        frequencies: &BTreeMap<String, f64>,
        tier_by_tag: &BTreeMap<String, BTreeMap<String, Tier>>,
        content: CellContent
    ) -> Self {
        let variants: Vec<String> = haplotypes.values().flatten()
            .unique()
            .sorted()
            .cloned()
            .collect();

        let frequencies: Vec<Option<f64>> = variants.iter()
            .map(|v| {
                let af = frequencies.get(v).copied();
                if af.is_none() {
                    warn!("No frequency for {v} in sheet {name:?}, leaving it blank");
                }
                af
            })
            .collect();

        let rows = haplotypes.iter()
            .map(|(tag, haplotype)| {
                let cells = variants.iter()
                    .map(|v| {
                        if !haplotype.contains(v) {
                            return String::new();
                        }
                        match content {
                            CellContent::AltBase => v.chars().last().map(String::from).unwrap_or_default(),
                            CellContent::TierNumber => tier_by_tag.get(tag)
                                .and_then(|tiers| tiers.get(v))
                                .map(|t| t.to_string())
                                .unwrap_or_default(),
                        }
                    })
                    .collect();
                (tag.clone(), cells)
            })
            .collect();

        Self {
            name: name.to_string(),
            variants,
            frequencies,
            rows
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_variants(&self) -> usize {
        self.variants.len()
    }

    pub fn num_tags(&self) -> usize {
        self.rows.len()
    }

    /// Returns a reason if this sheet is too small to be a meaningful matrix
    pub fn skip_reason(&self) -> Option<String> {
        if self.rows.is_empty() {
            Some("no tags".to_string())
        } else if self.variants.len() < 2 {
            Some(format!("only {} variant column(s)", self.variants.len()))
        } else {
            None
        }
    }

    /// Writes the sheet as a delimited table
    /// # Arguments
    /// * `filename` - the output path, ".csv" switches to comma-delimited
    pub fn write(&self, filename: &Path) -> csv::Result<()> {
        let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
        let delimiter: u8 = if is_csv { b',' } else { b'\t' };
        let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(filename)?;

        // header with truncated variant labels
        let header: Vec<String> = std::iter::once(TAG_HEADER.to_string())
            .chain(self.variants.iter().map(|v| v.chars().take(MAX_LABEL_LENGTH).collect()))
            .collect();
        csv_writer.write_record(&header)?;

        // frequency and band rows
        let af_row: Vec<String> = std::iter::once(AF_ROW.to_string())
            .chain(self.frequencies.iter().map(|f| f.map(|af| af.to_string()).unwrap_or_default()))
            .collect();
        csv_writer.write_record(&af_row)?;

        let band_row: Vec<String> = std::iter::once(AF_BAND_ROW.to_string())
            .chain(self.frequencies.iter().map(|f| {
                f.map(|af| FrequencyBand::from_frequency(af).to_string()).unwrap_or_default()
            }))
            .collect();
        csv_writer.write_record(&band_row)?;

        for (tag, cells) in self.rows.iter() {
            csv_writer.write_record(std::iter::once(tag).chain(cells.iter()))?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

/// Returns the path for a sheet next to the user-provided output, e.g. "haps.tsv" -> "haps.hapHQ.tsv"
/// # Arguments
/// * `base` - the user-provided output path
/// * `slug` - file-name friendly sheet name
pub fn sheet_path(base: &Path, slug: &str) -> PathBuf {
    let stem = base.file_stem().unwrap_or_default().to_string_lossy();
    let extension = base.extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "tsv".to_string());
    base.with_file_name(format!("{stem}.{slug}.{extension}"))
}

/// Writes one file per non-empty category for both the alt-base and the tier-number matrices.
/// Degenerate sheets are skipped with a log message.
/// # Arguments
/// * `classified` - the six classified sets
/// * `tier_by_tag` - tag -> variant -> tier
/// * `frequencies` - the three frequency dictionaries
/// * `haplotype_fn` - base output path for the alt-base matrices
/// * `tier_fn` - base output path for the tier-number matrices
/// # Errors
/// * if any file fails to write
pub fn write_haplotype_reports(
    classified: &ClassifiedSets,
    tier_by_tag: &BTreeMap<String, BTreeMap<String, Tier>>,
    frequencies: &FrequencyDictionaries,
    haplotype_fn: &Path,
    tier_fn: &Path
) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = vec![];
    for category in HaplotypeCategory::iter() {
        let haplotypes = classified.get(category);
        let name = category.to_string();
        if haplotypes.is_empty() {
            debug!("Category {name:?} is empty, no sheet written");
            continue;
        }

        let category_frequencies = frequencies.get(category.frequency_source());
        for (content, base_fn) in [(CellContent::AltBase, haplotype_fn), (CellContent::TierNumber, tier_fn)] {
            let sheet = HaplotypeSheet::new(&name, haplotypes, category_frequencies, tier_by_tag, content);
            if let Some(reason) = sheet.skip_reason() {
                info!("Skipping sheet {name:?}: {reason}");
                continue;
            }

            let out_fn = sheet_path(base_fn, &category.slug());
            debug!("Writing sheet {name:?} ({} tags x {} variants) to {out_fn:?}", sheet.num_tags(), sheet.num_variants());
            sheet.write(&out_fn)
                .with_context(|| format!("Error while writing {out_fn:?}:"))?;
            written.push(out_fn);
        }
    }
    Ok(written)
}
