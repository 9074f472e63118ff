/*!
# Frequency Reconciler
Recomputes the good-tier allele counts once the rejected haplotypes are known.
The steps are:
1. `filtered_occurrences` - count how many filtered-out haplotypes each variant belongs to
2. `reconcile_frequencies` - skip high-frequency and zero-AF variants, remove one alt allele and one unit of coverage per occurrence,
   drop variants with no alt alleles left, and recompute the frequency
*/
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};

use crate::data_types::frequencies::{AlleleCounts, AlleleTable};
use crate::data_types::haplotypes::HaplotypeSets;

/// Counts, for every variant, how many filtered-out haplotypes it belongs to.
/// # Arguments
/// * `filtered_out` - the rejected haplotypes from the classifier
pub fn filtered_occurrences(filtered_out: &HaplotypeSets) -> BTreeMap<String, u64> {
    let mut occurrences: BTreeMap<String, u64> = Default::default();
    for variant_id in filtered_out.values().flatten() {
        *occurrences.entry(variant_id.clone()).or_default() += 1;
    }
    occurrences
}

/// Builds the revised good-tier frequency table after removing the molecules absorbed by filtered-out haplotypes.
/// Only variants outside `high_freq` with a nonzero AF are considered.
/// Each occurrence in a filtered-out haplotype removes one alt allele (and one unit of coverage);
/// a variant with no alt alleles left is dropped from the output.
/// Variants that were not filtered out pass through untouched, so applying this to its own output
/// with no filtered-out haplotypes returns the same table.
/// # Arguments
/// * `good_tiers` - the original good-tier counts
/// * `high_freq` - variants excluded as near-universal
/// * `filtered_out` - the rejected haplotypes from the classifier
pub fn reconcile_frequencies(
    good_tiers: &AlleleTable,
    high_freq: &BTreeSet<String>,
    filtered_out: &HaplotypeSets
) -> AlleleTable {
    let occurrences = filtered_occurrences(filtered_out);

    let mut updated: usize = 0;
    let mut dropped: usize = 0;
    let reconciled: AlleleTable = good_tiers.iter()
        .filter(|(variant_id, counts)| !high_freq.contains(*variant_id) && counts.frequency() != 0.0)
        .filter_map(|(variant_id, counts)| {
            let removed = occurrences.get(variant_id).copied().unwrap_or(0);
            if removed == 0 || counts.alt_count() == 0 {
                // nothing to adjust
                return Some((variant_id.clone(), *counts));
            }

            let alt_count = counts.alt_count().saturating_sub(removed);
            if alt_count == 0 {
                debug!("{variant_id} has no independent observations left, dropping it");
                dropped += 1;
                return None;
            }

            let coverage = counts.coverage().saturating_sub(counts.alt_count() - alt_count);
            updated += 1;
            Some((variant_id.clone(), AlleleCounts::from_counts(coverage, alt_count)))
        })
        .collect();

    info!("Reconciled frequencies: {} variants kept, {updated} updated, {dropped} dropped", reconciled.len());
    reconciled
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    fn table(entries: &[(&str, u64, u64)]) -> AlleleTable {
        entries.iter()
            .map(|&(v, coverage, alt_count)| (v.to_string(), AlleleCounts::from_counts(coverage, alt_count)))
            .collect()
    }

    fn haps(entries: &[(&str, &[&str])]) -> HaplotypeSets {
        entries.iter()
            .map(|(tag, variants)| (tag.to_string(), variants.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_filtered_occurrences() {
        let filtered_out = haps(&[("T1", &["a1", "b2"]), ("T2", &["a1", "c3"]), ("T3", &["a1", "b2"])]);
        let occurrences = filtered_occurrences(&filtered_out);
        assert_eq!(occurrences["a1"], 3);
        assert_eq!(occurrences["b2"], 2);
        assert_eq!(occurrences["c3"], 1);
        assert!(!occurrences.contains_key("d4"));
    }

    #[test]
    fn test_occurrence_count_additive() {
        let good_tiers = table(&[("a1", 100, 5), ("b2", 200, 2), ("c3", 50, 10)]);
        let filtered_out = haps(&[("T1", &["a1", "b2"]), ("T2", &["a1", "b2"]), ("T3", &["a1", "d4"])]);

        let reconciled = reconcile_frequencies(&good_tiers, &Default::default(), &filtered_out);

        // a1 removed from 3 haplotypes
        let a1 = reconciled.get("a1").unwrap();
        assert_eq!(a1.alt_count(), 2);
        assert_eq!(a1.coverage(), 97);
        assert_approx_eq!(a1.frequency(), 2.0 / 97.0);

        // b2 removed from 2 haplotypes, nothing left
        assert!(!reconciled.contains("b2"));

        // c3 untouched
        assert_eq!(reconciled.get("c3"), good_tiers.get("c3"));
        assert_eq!(reconciled.len(), 2);
    }

    #[test]
    fn test_clamped_at_zero() {
        let good_tiers = table(&[("a1", 100, 1)]);
        let filtered_out = haps(&[("T1", &["a1", "b2"]), ("T2", &["a1", "c3"])]);
        let reconciled = reconcile_frequencies(&good_tiers, &Default::default(), &filtered_out);
        assert!(reconciled.is_empty());
    }

    #[test]
    fn test_restricted_input() {
        let good_tiers: AlleleTable = [
            ("a1".to_string(), AlleleCounts::from_counts(100, 70)),
            ("b2".to_string(), AlleleCounts::from_counts(100, 0)),
            ("c3".to_string(), AlleleCounts::from_counts(100, 4)),
        ].into_iter().collect();
        let high_freq: BTreeSet<String> = ["a1".to_string()].into_iter().collect();

        let reconciled = reconcile_frequencies(&good_tiers, &high_freq, &HaplotypeSets::default());
        assert_eq!(reconciled.len(), 1);
        assert!(reconciled.contains("c3"));
    }

    #[test]
    fn test_idempotent() {
        let good_tiers = table(&[("a1", 100, 5), ("b2", 200, 2), ("c3", 50, 10)]);
        let filtered_out = haps(&[("T1", &["a1", "c3"])]);
        let high_freq = BTreeSet::default();

        let first = reconcile_frequencies(&good_tiers, &high_freq, &filtered_out);
        let second = reconcile_frequencies(&first, &high_freq, &HaplotypeSets::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_reported_frequency_passthrough() {
        // frequency from the input is kept as-is when nothing is removed, even if it is not alt/coverage
        let good_tiers: AlleleTable = [
            ("a1".to_string(), AlleleCounts::new(100, 5, 0.06)),
        ].into_iter().collect();
        let reconciled = reconcile_frequencies(&good_tiers, &BTreeSet::default(), &HaplotypeSets::default());
        assert_approx_eq!(reconciled.get("a1").unwrap().frequency(), 0.06);
    }
}
