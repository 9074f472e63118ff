
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use strum_macros::EnumIter;

use crate::data_types::observation::{Observation, Tier};
use crate::data_types::parse_error::ParseError;

/// Tag -> set of variant keys believed to be on that molecule.
/// BTree containers keep every output deterministic.
pub type HaplotypeSets = BTreeMap<String, BTreeSet<String>>;

/// Two-level lookup of variant -> tag -> tier, built from the summary observations
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TierLookup {
    tiers: BTreeMap<String, BTreeMap<String, Tier>>,
}

impl TierLookup {
    /// Builds the lookup from the summary rows.
    /// Rows with a missing variant or tag carry no tier information and are skipped.
    /// If a (variant, tag) pair is repeated, the last row wins.
    /// # Errors
    /// * if a tier on a usable row cannot be parsed
    pub fn from_observations(observations: &[Observation]) -> Result<Self, ParseError> {
        let mut lookup = Self::default();
        for obs in observations.iter() {
            let (Some(variant_id), Some(tag)) = (obs.variant_id(), obs.tag()) else {
                continue;
            };
            let tier = obs.tier()?;
            if let Some(previous) = lookup.insert(variant_id, tag, tier) {
                debug!("Tier for {variant_id} on {tag} replaced: {previous} -> {tier}");
            }
        }
        Ok(lookup)
    }

    /// Adds a tier, returning the previous value if one was present
    pub fn insert(&mut self, variant_id: &str, tag: &str, tier: Tier) -> Option<Tier> {
        self.tiers.entry(variant_id.to_string()).or_default()
            .insert(tag.to_string(), tier)
    }

    /// Returns the tier of a variant on a tag
    pub fn get(&self, variant_id: &str, tag: &str) -> Option<Tier> {
        self.tiers.get(variant_id)
            .and_then(|tags| tags.get(tag))
            .copied()
    }

    /// Returns true if this variant was observed on at least one tag
    pub fn contains_variant(&self, variant_id: &str) -> bool {
        self.tiers.contains_key(variant_id)
    }

    /// Number of distinct variants in the lookup
    pub fn num_variants(&self) -> usize {
        self.tiers.len()
    }

    /// Inverts the lookup into tag -> variant -> tier for every variant in the provided sets
    pub fn by_tag(&self, sets: &HaplotypeSets) -> BTreeMap<String, BTreeMap<String, Tier>> {
        sets.iter()
            .map(|(tag, variants)| {
                let tiers = variants.iter()
                    .filter_map(|v| self.get(v, tag).map(|t| (v.clone(), t)))
                    .collect();
                (tag.clone(), tiers)
            })
            .collect()
    }
}

/// The six classified haplotype categories, in report order
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, EnumIter, strum_macros::Display)]
pub enum HaplotypeCategory {
    /// Every haplotype that survived the same-molecule filter
    #[strum(serialize = "All_tiers")]
    AllTiers,
    /// At least one variant has a good tier
    #[strum(serialize = "Hap_1+")]
    MinOneGoodTier,
    /// Only good-tier variants kept, still a haplotype
    #[strum(serialize = "HapHQ")]
    MinOneGoodTierFiltered,
    /// Accepted: zero or one low-frequency variant
    #[strum(serialize = "lowfreq 0r1")]
    Final,
    /// Rejected: two or more low-frequency variants
    #[strum(serialize = "lowfreq >1")]
    FilteredOut,
    /// Contained a high-frequency variant, recorded before its removal
    #[strum(serialize = "swit_haps")]
    HighFrequencyExcluded,
}

/// Which frequency dictionary labels a category in the reports
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FrequencySource {
    /// AF across all tiers
    AllTiers,
    /// AF across tiers 1.1-2.5
    GoodTiers,
    /// AF after reconciliation
    Reconciled,
}

impl HaplotypeCategory {
    /// The frequency dictionary the reports use for this category
    pub fn frequency_source(&self) -> FrequencySource {
        match self {
            HaplotypeCategory::AllTiers |
            HaplotypeCategory::MinOneGoodTier |
            HaplotypeCategory::HighFrequencyExcluded => FrequencySource::AllTiers,
            HaplotypeCategory::MinOneGoodTierFiltered |
            HaplotypeCategory::FilteredOut => FrequencySource::GoodTiers,
            HaplotypeCategory::Final => FrequencySource::Reconciled,
        }
    }

    /// File-name friendly version of the sheet name
    pub fn slug(&self) -> String {
        let slug: String = self.to_string().to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        // "hap_1+" -> "hap_1_"; trailing separators look like a typo in file names
        slug.trim_end_matches('_').to_string()
    }
}

/// All six classified sets, produced together by the tier classifier
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassifiedSets {
    pub all_tiers: HaplotypeSets,
    pub min_one_good_tier: HaplotypeSets,
    pub min_one_good_tier_filtered: HaplotypeSets,
    pub final_haplotypes: HaplotypeSets,
    pub filtered_out: HaplotypeSets,
    pub high_frequency_excluded: HaplotypeSets,
}

impl ClassifiedSets {
    /// Returns the set for a given category
    pub fn get(&self, category: HaplotypeCategory) -> &HaplotypeSets {
        match category {
            HaplotypeCategory::AllTiers => &self.all_tiers,
            HaplotypeCategory::MinOneGoodTier => &self.min_one_good_tier,
            HaplotypeCategory::MinOneGoodTierFiltered => &self.min_one_good_tier_filtered,
            HaplotypeCategory::Final => &self.final_haplotypes,
            HaplotypeCategory::FilteredOut => &self.filtered_out,
            HaplotypeCategory::HighFrequencyExcluded => &self.high_frequency_excluded,
        }
    }

    /// Number of tags in each category, in report order
    pub fn tag_counts(&self) -> BTreeMap<HaplotypeCategory, usize> {
        use strum::IntoEnumIterator;
        HaplotypeCategory::iter()
            .map(|c| (c, self.get(c).len()))
            .collect()
    }
}
