/*!
# Pipeline
Wires the stages together in their fixed order:
linkage -> tag aggregation -> same-molecule filter -> tier classification -> frequency reconciliation.
Each stage consumes the previous stage's output and nothing is modified after handoff.
*/
use anyhow::Context;
use log::info;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::data_types::frequencies::{AlleleTable, FrequencyTable};
use crate::data_types::haplotypes::{ClassifiedSets, TierLookup};
use crate::data_types::observation::Observation;
use crate::frequency_reconciler::reconcile_frequencies;
use crate::linkage::{aggregate_tags, same_molecule_filter};
use crate::tier_classifier::{classify_haplotypes, high_frequency_variants, ClassifierConfig};
use crate::writers::haplotype_matrix::FrequencyDictionaries;

/// Everything produced by a single run
#[derive(Clone, Debug)]
pub struct PipelineResult {
    /// variant -> tag -> tier
    pub tier_lookup: TierLookup,
    /// The six classified sets
    pub classified: ClassifiedSets,
    /// Variants treated as near-universal
    pub high_freq: BTreeSet<String>,
    /// Good-tier frequencies after reconciliation
    pub reconciled: AlleleTable,
    /// Number of tags with a candidate haplotype before the same-molecule filter
    pub candidate_tags: usize,
    /// Linked variants dropped because they were called, but not on that tag
    pub off_tag_removed: usize,
    /// Linked variants dropped because they were never called
    pub untiered_removed: usize,
}

/// Runs the full classification on loaded inputs.
/// # Arguments
/// * `observations` - rows from the summary table
/// * `frequencies` - the frequency table
/// * `config` - classification thresholds
/// # Errors
/// * if a tier cannot be parsed
pub fn run_pipeline(
    observations: &[Observation],
    frequencies: &FrequencyTable,
    config: &ClassifierConfig
) -> anyhow::Result<PipelineResult> {
    let tier_lookup = TierLookup::from_observations(observations)
        .context("Error while building the tier lookup:")?;
    info!("Variants with tier records: {}", tier_lookup.num_variants());

    let candidate_sets = aggregate_tags(observations);
    let candidate_tags = candidate_sets.len();
    info!("Tags with candidate haplotypes: {candidate_tags}");

    let same_molecule = same_molecule_filter(&candidate_sets, &tier_lookup);
    info!("Tags with same-molecule haplotypes: {}", same_molecule.haplotypes.len());

    let high_freq = high_frequency_variants(frequencies, config);
    info!("High-frequency variants (AF >= {}): {}", config.high_frequency_cutoff(), high_freq.len());

    let classified = classify_haplotypes(same_molecule.haplotypes, &tier_lookup, frequencies, &high_freq, config);
    for (category, count) in classified.tag_counts() {
        info!("\t{category}: {count}");
    }

    let reconciled = reconcile_frequencies(&frequencies.good_tiers_table(), &high_freq, &classified.filtered_out);

    Ok(PipelineResult {
        tier_lookup,
        classified,
        high_freq,
        reconciled,
        candidate_tags,
        off_tag_removed: same_molecule.off_tag_removed,
        untiered_removed: same_molecule.untiered_removed,
    })
}

/// Serializable overview of a run, saved to the debug folder
#[derive(Debug, Serialize)]
pub struct PipelineSummary {
    pub version: String,
    pub summary_rows: usize,
    pub frequency_rows: usize,
    pub candidate_tags: usize,
    pub off_tag_removed: usize,
    pub untiered_removed: usize,
    pub high_frequency_variants: usize,
    pub reconciled_variants: usize,
    /// Sheet name -> number of tags
    pub category_tags: BTreeMap<String, usize>,
}

impl PipelineResult {
    /// Collects the three frequency dictionaries the report writers need
    pub fn frequency_dictionaries(&self, frequencies: &FrequencyTable) -> FrequencyDictionaries {
        FrequencyDictionaries {
            all_tiers: frequencies.all_tiers_frequencies(),
            good_tiers: frequencies.good_tiers_frequencies(),
            reconciled: self.reconciled.frequencies(),
        }
    }

    /// Builds the run overview
    pub fn summary(&self, version: &str, summary_rows: usize, frequency_rows: usize) -> PipelineSummary {
        PipelineSummary {
            version: version.to_string(),
            summary_rows,
            frequency_rows,
            candidate_tags: self.candidate_tags,
            off_tag_removed: self.off_tag_removed,
            untiered_removed: self.untiered_removed,
            high_frequency_variants: self.high_freq.len(),
            reconciled_variants: self.reconciled.len(),
            category_tags: self.classified.tag_counts().into_iter()
                .map(|(c, n)| (c.to_string(), n))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::frequencies::{AlleleCounts, VariantFrequency};
    use crate::data_types::observation::Tier;

    #[test]
    fn test_run_pipeline() {
        let obs = |v: &str, tag: &str, tier: f64, in_phase: &str| {
            Observation::new(Some(v), Some(tag), Tier::new(tier).unwrap(), Some(in_phase))
        };
        let observations = vec![
            obs("chr1:100A>G", "T1", 1.0, "chr1:105C>T"),
            obs("chr1:105C>T", "T1", 4.0, "chr1:100A>G"),
            obs("chr1:100A>G", "T2", 1.0, "chr1:150G>C"),
            obs("chr1:150G>C", "T2", 1.0, "chr1:100A>G"),
        ];
        let frequencies: FrequencyTable = [
            ("chr1:100A>G".to_string(), VariantFrequency::new(0.006, AlleleCounts::new(1000, 5, 0.005))),
            ("chr1:105C>T".to_string(), VariantFrequency::new(0.03, AlleleCounts::new(1000, 20, 0.02))),
            ("chr1:150G>C".to_string(), VariantFrequency::new(0.003, AlleleCounts::new(1000, 3, 0.003))),
        ].into_iter().collect();

        let result = run_pipeline(&observations, &frequencies, &ClassifierConfig::default()).unwrap();
        assert_eq!(result.candidate_tags, 2);
        assert_eq!(result.classified.all_tiers.len(), 2);
        assert!(result.classified.filtered_out.contains_key("T2"));
        assert!(!result.classified.min_one_good_tier_filtered.contains_key("T1"));

        // both T2 variants lose one alt allele
        assert_eq!(result.reconciled.get("chr1:100A>G").unwrap().alt_count(), 4);
        assert_eq!(result.reconciled.get("chr1:150G>C").unwrap().alt_count(), 2);
        assert_eq!(result.reconciled.get("chr1:105C>T").unwrap().alt_count(), 20);

        let summary = result.summary("test", observations.len(), frequencies.len());
        assert_eq!(summary.category_tags["lowfreq >1"], 1);
        assert_eq!(summary.category_tags["lowfreq 0r1"], 0);
        assert_eq!(summary.reconciled_variants, 3);

        let dictionaries = result.frequency_dictionaries(&frequencies);
        assert_eq!(dictionaries.all_tiers["chr1:100A>G"], 0.006);
        assert_eq!(dictionaries.good_tiers["chr1:100A>G"], 0.005);
        assert_eq!(dictionaries.reconciled["chr1:100A>G"], 4.0 / 999.0);
    }
}
