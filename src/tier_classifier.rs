/*!
# Tier Classifier
Sorts the same-molecule haplotypes into the six reported categories.

Variants without a frequency row are removed from every haplotype first, so every
variant in a classified set has frequency data. Then, for each tag in `all_tiers`:
1. any high-frequency variants are removed, recording the original haplotype in `high_frequency_excluded`
2. if at least one variant has a good tier, the haplotype goes into `min_one_good_tier`
3. the bad-tier variants are removed; if it is still a haplotype it goes into `min_one_good_tier_filtered`
4. if fewer than two of those variants are low-frequency, the haplotype is accepted into `final_haplotypes`
5. everything in `min_one_good_tier_filtered` that was not accepted is `filtered_out`

## Example usage
```rust
use haplotier::data_types::frequencies::{AlleleCounts, FrequencyTable, VariantFrequency};
use haplotier::data_types::haplotypes::{HaplotypeSets, TierLookup};
use haplotier::data_types::observation::Tier;
use haplotier::tier_classifier::{classify_haplotypes, high_frequency_variants, ClassifierConfig};

let mut tier_lookup = TierLookup::default();
tier_lookup.insert("chr1:100A>G", "T2", Tier::new(1.0).unwrap());
tier_lookup.insert("chr1:150G>C", "T2", Tier::new(1.0).unwrap());

// both variants are rare, so the haplotype is rejected
let frequencies: FrequencyTable = [
    ("chr1:100A>G".to_string(), VariantFrequency::new(0.005, AlleleCounts::new(1000, 5, 0.005))),
    ("chr1:150G>C".to_string(), VariantFrequency::new(0.003, AlleleCounts::new(1000, 3, 0.003))),
].into_iter().collect();

let all_tiers: HaplotypeSets = [
    ("T2".to_string(), ["chr1:100A>G".to_string(), "chr1:150G>C".to_string()].into_iter().collect())
].into_iter().collect();

let config = ClassifierConfig::default();
let high_freq = high_frequency_variants(&frequencies, &config);
let classified = classify_haplotypes(all_tiers, &tier_lookup, &frequencies, &high_freq, &config);
assert!(classified.final_haplotypes.is_empty());
assert!(classified.filtered_out.contains_key("T2"));
```
*/
use derive_builder::Builder;
use log::{debug, warn};
use std::collections::BTreeSet;

use crate::data_types::frequencies::FrequencyTable;
use crate::data_types::haplotypes::{ClassifiedSets, HaplotypeSets, TierLookup};
use crate::linkage::MIN_HAPLOTYPE_SIZE;

/// Tiers strictly below this are "good"
pub const GOOD_TIER_CUTOFF: f64 = 3.0;
/// Good-tier AF at or above this marks a near-universal (SWIT) variant
pub const HIGH_FREQUENCY_CUTOFF: f64 = 0.6;
/// Good-tier AF strictly below this marks a low-frequency variant
pub const LOW_FREQUENCY_CUTOFF: f64 = 0.01;
/// A haplotype with this many low-frequency variants is rejected
pub const MAX_LOW_FREQUENCY_VARIANTS: usize = 2;

/// Thresholds that control the classification
#[derive(Builder, Clone, Copy, Debug)]
#[builder(default)]
pub struct ClassifierConfig {
    /// Tiers strictly below this value are considered good
    good_tier_cutoff: f64,
    /// Variants with good-tier AF >= this value are removed from haplotypes
    high_frequency_cutoff: f64,
    /// Variants with good-tier AF < this value count as low-frequency
    low_frequency_cutoff: f64,
    /// Haplotypes with at least this many low-frequency variants are filtered out
    max_low_frequency_variants: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            good_tier_cutoff: GOOD_TIER_CUTOFF,
            high_frequency_cutoff: HIGH_FREQUENCY_CUTOFF,
            low_frequency_cutoff: LOW_FREQUENCY_CUTOFF,
            max_low_frequency_variants: MAX_LOW_FREQUENCY_VARIANTS,
        }
    }
}

impl ClassifierConfig {
    // getters
    pub fn good_tier_cutoff(&self) -> f64 {
        self.good_tier_cutoff
    }

    pub fn high_frequency_cutoff(&self) -> f64 {
        self.high_frequency_cutoff
    }

    pub fn low_frequency_cutoff(&self) -> f64 {
        self.low_frequency_cutoff
    }

    pub fn max_low_frequency_variants(&self) -> usize {
        self.max_low_frequency_variants
    }
}

/// Returns every variant whose good-tier allele frequency is at or above the high-frequency cutoff.
/// # Arguments
/// * `frequencies` - the full frequency table
/// * `config` - classification thresholds
pub fn high_frequency_variants(frequencies: &FrequencyTable, config: &ClassifierConfig) -> BTreeSet<String> {
    frequencies.iter()
        .filter(|(_v, f)| f.good_tiers_af() >= config.high_frequency_cutoff())
        .map(|(v, _f)| v.clone())
        .collect()
}

/// Removes variants that have no row in the frequency table, dropping tags that are no longer haplotypes.
/// Returns the remaining sets and the number of variant occurrences removed.
/// # Arguments
/// * `haplotypes` - tag -> variants
/// * `frequencies` - the frequency table
pub fn remove_unmeasured_variants(haplotypes: HaplotypeSets, frequencies: &FrequencyTable) -> (HaplotypeSets, usize) {
    let mut removed: usize = 0;
    let mut measured = HaplotypeSets::default();
    for (tag, mut variants) in haplotypes.into_iter() {
        variants.retain(|v| {
            let found = frequencies.get(v).is_some();
            if !found {
                debug!("Variant {v} on tag {tag} has no frequency record");
                removed += 1;
            }
            found
        });
        if variants.len() >= MIN_HAPLOTYPE_SIZE {
            measured.insert(tag, variants);
        }
    }

    if removed > 0 {
        warn!("{removed} haplotype variant occurrences had no frequency record and were removed");
    }
    (measured, removed)
}

/// Classifies the same-molecule haplotypes into all six categories at once.
/// Variants missing from `frequencies` are removed first (see `remove_unmeasured_variants`),
/// what remains becomes `all_tiers`.
/// # Arguments
/// * `all_tiers` - tag -> variants, every set with at least two variants
/// * `tier_lookup` - the variant -> tag -> tier records
/// * `frequencies` - the frequency table, good-tier AF drives the low-frequency count
/// * `high_freq` - output from `high_frequency_variants`
/// * `config` - classification thresholds
pub fn classify_haplotypes(
    all_tiers: HaplotypeSets,
    tier_lookup: &TierLookup,
    frequencies: &FrequencyTable,
    high_freq: &BTreeSet<String>,
    config: &ClassifierConfig
) -> ClassifiedSets {
    let (all_tiers, _removed) = remove_unmeasured_variants(all_tiers, frequencies);

    let mut high_frequency_excluded = HaplotypeSets::default();
    let mut min_one_good_tier = HaplotypeSets::default();
    let mut min_one_good_tier_filtered = HaplotypeSets::default();
    let mut final_haplotypes = HaplotypeSets::default();

    let is_good = |variant_id: &str, tag: &str| -> bool {
        tier_lookup.get(variant_id, tag)
            .map(|t| t.is_below(config.good_tier_cutoff()))
            .unwrap_or(false)
    };

    for (tag, original) in all_tiers.iter() {
        // step 1: remove the SWIT variants
        let haplotype: BTreeSet<String> = if original.iter().any(|v| high_freq.contains(v)) {
            high_frequency_excluded.insert(tag.clone(), original.clone());
            let remaining: BTreeSet<String> = original.difference(high_freq).cloned().collect();
            if remaining.len() < MIN_HAPLOTYPE_SIZE {
                debug!("Tag {tag} has fewer than {MIN_HAPLOTYPE_SIZE} variants after high-frequency removal");
                continue;
            }
            remaining
        } else {
            original.clone()
        };

        // step 2: need at least one good tier
        if !haplotype.iter().any(|v| is_good(v, tag)) {
            continue;
        }
        min_one_good_tier.insert(tag.clone(), haplotype.clone());

        // step 3: only keep the good tiers
        let filtered: BTreeSet<String> = haplotype.into_iter()
            .filter(|v| is_good(v, tag))
            .collect();
        if filtered.len() < MIN_HAPLOTYPE_SIZE {
            continue;
        }

        // step 4: frequency gate
        let low_frequency_count = filtered.iter()
            .filter_map(|v| frequencies.get(v))
            .filter(|f| f.good_tiers_af() < config.low_frequency_cutoff())
            .count();
        if low_frequency_count < config.max_low_frequency_variants() {
            final_haplotypes.insert(tag.clone(), filtered.clone());
        } else {
            debug!("Tag {tag} has {low_frequency_count} low-frequency variants");
        }
        min_one_good_tier_filtered.insert(tag.clone(), filtered);
    }

    // step 5: anything that passed the tiers but not the frequency gate
    let filtered_out: HaplotypeSets = min_one_good_tier_filtered.iter()
        .filter(|(tag, _h)| !final_haplotypes.contains_key(*tag))
        .map(|(tag, h)| (tag.clone(), h.clone()))
        .collect();

    ClassifiedSets {
        all_tiers,
        min_one_good_tier,
        min_one_good_tier_filtered,
        final_haplotypes,
        filtered_out,
        high_frequency_excluded,
    }
}
