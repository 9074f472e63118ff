/*!
# Linkage
Turns the summary observations into per-tag candidate haplotypes.
The steps are:
1. `build_linkage` - each observation links its own variant to everything listed as "in phase"
2. `aggregate_tags` - the links of all observations on a tag are merged, degenerate tags are removed
3. `same_molecule_filter` - only variants with a tier record on the tag itself are kept
*/
use log::{debug, warn};
use std::collections::BTreeSet;

use crate::data_types::haplotypes::{HaplotypeSets, TierLookup};
use crate::data_types::observation::{is_placeholder, Observation};

/// The smallest group of variants we call a haplotype
pub const MIN_HAPLOTYPE_SIZE: usize = 2;

/// Returns the set of variant keys linked by a single observation: its own key plus the in-phase keys.
/// The in-phase annotation may use commas, whitespace, or both as separators.
/// Blank tokens and placeholders such as "NA" are discarded.
/// Missing values are treated as empty, so this never fails.
/// # Arguments
/// * `observation` - the summary row to link
pub fn build_linkage(observation: &Observation) -> BTreeSet<String> {
    observation.in_phase()
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !is_placeholder(token))
        .map(String::from)
        .chain(observation.variant_id().map(String::from))
        .collect()
}

/// Returns true for tokens that cannot be a variant key, e.g. single-character leftovers of placeholders
fn is_malformed(variant_id: &str) -> bool {
    variant_id.len() < 2
}

/// Groups the linkages by tag and unions them.
/// Observations without a usable tag are skipped, malformed tokens are removed,
/// and any tag left with fewer than two variants is dropped.
/// # Arguments
/// * `observations` - all rows from the summary table
pub fn aggregate_tags(observations: &[Observation]) -> HaplotypeSets {
    let mut candidate_sets = HaplotypeSets::default();
    let mut skipped_rows: usize = 0;
    for obs in observations.iter() {
        let Some(tag) = obs.tag() else {
            skipped_rows += 1;
            continue;
        };
        candidate_sets.entry(tag.to_string()).or_default()
            .extend(build_linkage(obs));
    }

    if skipped_rows > 0 {
        debug!("Skipped {skipped_rows} summary rows without a tag");
    }

    let total_tags = candidate_sets.len();
    candidate_sets.retain(|_tag, variants| {
        variants.retain(|v| !is_malformed(v));
        variants.len() >= MIN_HAPLOTYPE_SIZE
    });
    debug!("Tags with candidate haplotypes: {} / {total_tags}", candidate_sets.len());

    candidate_sets
}

/// Result of the same-molecule filter, with counters describing what was removed
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SameMoleculeResult {
    /// The filtered sets, each with at least two variants
    pub haplotypes: HaplotypeSets,
    /// Variants removed because they have a tier record, but not on this tag
    pub off_tag_removed: usize,
    /// Variants removed because they have no tier record at all
    pub untiered_removed: usize,
}

/// Restricts each tag's candidate set to the variants actually observed on that tag.
/// An in-phase annotation can name a variant that was never called on the tag, or never called at all;
/// both are dropped rather than treated as errors.
/// Tags left with fewer than two variants are removed.
/// # Arguments
/// * `candidate_sets` - output from `aggregate_tags`
/// * `tier_lookup` - the variant -> tag -> tier records
pub fn same_molecule_filter(candidate_sets: &HaplotypeSets, tier_lookup: &TierLookup) -> SameMoleculeResult {
    let mut result = SameMoleculeResult::default();
    for (tag, variants) in candidate_sets.iter() {
        let mut kept: BTreeSet<String> = Default::default();
        for v in variants.iter() {
            if tier_lookup.get(v, tag).is_some() {
                kept.insert(v.clone());
            } else if tier_lookup.contains_variant(v) {
                result.off_tag_removed += 1;
            } else {
                debug!("Variant {v} on tag {tag} has no tier record");
                result.untiered_removed += 1;
            }
        }

        if kept.len() >= MIN_HAPLOTYPE_SIZE {
            result.haplotypes.insert(tag.clone(), kept);
        }
    }

    if result.untiered_removed > 0 {
        warn!(
            "{} linked variant occurrences had no tier record and were removed; the summary may be inconsistent",
            result.untiered_removed
        );
    }
    debug!("Off-tag variant occurrences removed: {}", result.off_tag_removed);

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::observation::Tier;

    fn obs(variant_id: Option<&str>, tag: Option<&str>, tier: f64, in_phase: Option<&str>) -> Observation {
        Observation::new(variant_id, tag, Tier::new(tier).unwrap(), in_phase)
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_linkage() {
        let linkage = build_linkage(&obs(Some("v1"), Some("T1"), 1.0, Some("v2, v3 ,,v4  v2")));
        assert_eq!(linkage, set(&["v1", "v2", "v3", "v4"]));

        // missing in-phase just gives back the variant
        let linkage = build_linkage(&obs(Some("v1"), Some("T1"), 1.0, None));
        assert_eq!(linkage, set(&["v1"]));

        // missing variant just gives back the in-phase
        let linkage = build_linkage(&obs(None, Some("T1"), 1.0, Some("v2")));
        assert_eq!(linkage, set(&["v2"]));

        // nothing at all
        let linkage = build_linkage(&obs(None, None, 1.0, None));
        assert!(linkage.is_empty());

        // placeholder annotations are not variants
        let linkage = build_linkage(&obs(Some("v1"), Some("T1"), 1.0, Some("NA")));
        assert_eq!(linkage, set(&["v1"]));
        let linkage = build_linkage(&obs(Some("v1"), Some("T1"), 1.0, Some("v2, nan")));
        assert_eq!(linkage, set(&["v1", "v2"]));
    }

    #[test]
    fn test_aggregate_tags() {
        let observations = vec![
            obs(Some("chr1:100A>G"), Some("T1"), 1.0, Some("chr1:105C>T")),
            obs(Some("chr1:105C>T"), Some("T1"), 4.0, Some("chr1:100A>G")),
            // singleton tag is dropped
            obs(Some("chr1:200G>A"), Some("T2"), 1.0, None),
            // malformed leftover token does not count towards the size
            obs(Some("chr1:300T>C"), Some("T3"), 1.0, Some(",")),
            obs(Some("x"), Some("T3"), 1.0, None),
            // no tag, skipped entirely
            obs(Some("chr1:400A>C"), None, 1.0, Some("chr1:401A>C")),
            obs(Some("chr1:400A>C"), Some("NA"), 1.0, Some("chr1:401A>C")),
        ];

        let candidate_sets = aggregate_tags(&observations);
        assert_eq!(candidate_sets.len(), 1);
        assert_eq!(candidate_sets["T1"], set(&["chr1:100A>G", "chr1:105C>T"]));
    }

    #[test]
    fn test_same_molecule_filter() {
        let mut tier_lookup = TierLookup::default();
        tier_lookup.insert("v1", "T1", Tier::new(1.0).unwrap());
        tier_lookup.insert("v2", "T1", Tier::new(2.0).unwrap());
        tier_lookup.insert("v3", "T2", Tier::new(1.0).unwrap());
        tier_lookup.insert("v4", "T2", Tier::new(1.0).unwrap());

        let candidate_sets: HaplotypeSets = [
            // v3 is only on T2, v9 is not known at all
            ("T1".to_string(), set(&["v1", "v2", "v3", "v9"])),
            // v1 is not on T2, leaving only one variant
            ("T2".to_string(), set(&["v1", "v3"])),
        ].into_iter().collect();

        let result = same_molecule_filter(&candidate_sets, &tier_lookup);
        assert_eq!(result.haplotypes.len(), 1);
        assert_eq!(result.haplotypes["T1"], set(&["v1", "v2"]));
        assert_eq!(result.off_tag_removed, 2);
        assert_eq!(result.untiered_removed, 1);
    }

    #[test]
    fn test_placeholder_phase_is_not_linkage() {
        let observations = vec![
            obs(Some("chr1:100A>G"), Some("T1"), 1.0, Some("NA")),
        ];
        let tier_lookup = TierLookup::from_observations(&observations).unwrap();
        let candidate_sets = aggregate_tags(&observations);
        assert!(candidate_sets.is_empty());
        let result = same_molecule_filter(&candidate_sets, &tier_lookup);
        assert_eq!(result.untiered_removed, 0);
    }

    #[test]
    fn test_all_sets_are_haplotypes() {
        let observations = vec![
            obs(Some("a1"), Some("T1"), 1.0, Some("b2 c3")),
            obs(Some("b2"), Some("T1"), 1.0, None),
            obs(Some("c3"), Some("T2"), 1.0, Some("a1")),
            obs(Some("d4"), Some("T3"), 1.0, Some("e5")),
            obs(Some("e5"), Some("T3"), 6.0, Some("d4")),
        ];
        let tier_lookup = TierLookup::from_observations(&observations).unwrap();
        let candidate_sets = aggregate_tags(&observations);
        let result = same_molecule_filter(&candidate_sets, &tier_lookup);
        assert!(result.haplotypes.values().all(|h| h.len() >= MIN_HAPLOTYPE_SIZE));
        assert_eq!(result.haplotypes.keys().collect::<Vec<_>>(), vec!["T1", "T3"]);
        assert_eq!(result.haplotypes["T1"], set(&["a1", "b2"]));
    }
}
