
use indexmap::IndexMap;
use std::collections::BTreeMap;

use crate::data_types::parse_error::ParseError;

/// Coverage, alt allele count, and allele frequency for one variant in one tier subset
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlleleCounts {
    /// Total number of molecules covering the position
    coverage: u64,
    /// Number of molecules carrying the alt allele
    alt_count: u64,
    /// Allele frequency, usually `alt_count / coverage`
    frequency: f64,
}

impl AlleleCounts {
    /// Constructor, the frequency is taken as-is from the input rather than recomputed
    pub fn new(coverage: u64, alt_count: u64, frequency: f64) -> Self {
        Self { coverage, alt_count, frequency }
    }

    /// Builds the counts from a coverage and alt count, computing the frequency.
    /// A coverage of 0 gives a frequency of 0.
    pub fn from_counts(coverage: u64, alt_count: u64) -> Self {
        let frequency = if coverage == 0 {
            0.0
        } else {
            alt_count as f64 / coverage as f64
        };
        Self { coverage, alt_count, frequency }
    }

    // getters
    pub fn coverage(&self) -> u64 {
        self.coverage
    }

    pub fn alt_count(&self) -> u64 {
        self.alt_count
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }
}

/// Ordered lookup from a variant key to its counts, preserves input order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlleleTable {
    counts: IndexMap<String, AlleleCounts>,
}

impl AlleleTable {
    /// Inserts a new entry, duplicates are not allowed
    /// # Errors
    /// * if the variant is already present
    pub fn insert(&mut self, variant_id: String, counts: AlleleCounts) -> Result<(), ParseError> {
        if self.counts.contains_key(&variant_id) {
            return Err(ParseError::DuplicateVariant { variant_id });
        }
        self.counts.insert(variant_id, counts);
        Ok(())
    }

    pub fn get(&self, variant_id: &str) -> Option<&AlleleCounts> {
        self.counts.get(variant_id)
    }

    pub fn contains(&self, variant_id: &str) -> bool {
        self.counts.contains_key(variant_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AlleleCounts)> {
        self.counts.iter()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Flattens the table into a variant -> frequency lookup
    pub fn frequencies(&self) -> BTreeMap<String, f64> {
        self.counts.iter()
            .map(|(v, c)| (v.clone(), c.frequency()))
            .collect()
    }
}

impl FromIterator<(String, AlleleCounts)> for AlleleTable {
    /// Later duplicates overwrite earlier ones; use [`AlleleTable::insert`] when that matters
    fn from_iter<T: IntoIterator<Item = (String, AlleleCounts)>>(iter: T) -> Self {
        Self {
            counts: iter.into_iter().collect()
        }
    }
}

/// Population-level values for a single variant from the frequency table
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VariantFrequency {
    /// Allele frequency across all tiers
    all_tiers_af: f64,
    /// Counts restricted to the good tiers (1.1-2.5)
    good_tiers: AlleleCounts,
}

impl VariantFrequency {
    /// Constructor
    pub fn new(all_tiers_af: f64, good_tiers: AlleleCounts) -> Self {
        Self { all_tiers_af, good_tiers }
    }

    pub fn all_tiers_af(&self) -> f64 {
        self.all_tiers_af
    }

    pub fn good_tiers_af(&self) -> f64 {
        self.good_tiers.frequency()
    }

    pub fn good_tiers(&self) -> &AlleleCounts {
        &self.good_tiers
    }
}

/// The full frequency table, keyed by variant in file order
#[derive(Clone, Debug, Default)]
pub struct FrequencyTable {
    variants: IndexMap<String, VariantFrequency>,
}

impl FrequencyTable {
    /// Inserts a new entry, duplicates are not allowed
    /// # Errors
    /// * if the variant is already present
    pub fn insert(&mut self, variant_id: String, frequency: VariantFrequency) -> Result<(), ParseError> {
        if self.variants.contains_key(&variant_id) {
            return Err(ParseError::DuplicateVariant { variant_id });
        }
        self.variants.insert(variant_id, frequency);
        Ok(())
    }

    pub fn get(&self, variant_id: &str) -> Option<&VariantFrequency> {
        self.variants.get(variant_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &VariantFrequency)> {
        self.variants.iter()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Variant -> all-tier allele frequency
    pub fn all_tiers_frequencies(&self) -> BTreeMap<String, f64> {
        self.variants.iter()
            .map(|(v, f)| (v.clone(), f.all_tiers_af()))
            .collect()
    }

    /// Variant -> good-tier allele frequency
    pub fn good_tiers_frequencies(&self) -> BTreeMap<String, f64> {
        self.variants.iter()
            .map(|(v, f)| (v.clone(), f.good_tiers_af()))
            .collect()
    }

    /// The good-tier counts as a standalone table
    pub fn good_tiers_table(&self) -> AlleleTable {
        self.variants.iter()
            .map(|(v, f)| (v.clone(), *f.good_tiers()))
            .collect()
    }
}

impl FromIterator<(String, VariantFrequency)> for FrequencyTable {
    fn from_iter<T: IntoIterator<Item = (String, VariantFrequency)>>(iter: T) -> Self {
        Self {
            variants: iter.into_iter().collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_from_counts() {
        let counts = AlleleCounts::from_counts(40, 10);
        assert_eq!(counts.coverage(), 40);
        assert_eq!(counts.alt_count(), 10);
        assert_approx_eq!(counts.frequency(), 0.25);

        // no coverage should not divide by zero
        let counts = AlleleCounts::from_counts(0, 0);
        assert_eq!(counts.frequency(), 0.0);
    }

    #[test]
    fn test_duplicate_insert() {
        let mut table = AlleleTable::default();
        table.insert("chr1:100A>G".to_string(), AlleleCounts::from_counts(10, 1)).unwrap();
        let result = table.insert("chr1:100A>G".to_string(), AlleleCounts::from_counts(10, 2));
        assert_eq!(result, Err(ParseError::DuplicateVariant { variant_id: "chr1:100A>G".to_string() }));
        assert_eq!(table.get("chr1:100A>G").unwrap().alt_count(), 1);
    }

    #[test]
    fn test_frequency_views() {
        let table: FrequencyTable = [
            ("chr1:100A>G".to_string(), VariantFrequency::new(0.5, AlleleCounts::new(100, 40, 0.4))),
            ("chr1:105C>T".to_string(), VariantFrequency::new(0.1, AlleleCounts::new(100, 5, 0.05))),
        ].into_iter().collect();

        let all = table.all_tiers_frequencies();
        assert_approx_eq!(all["chr1:100A>G"], 0.5);
        let good = table.good_tiers_frequencies();
        assert_approx_eq!(good["chr1:105C>T"], 0.05);

        let good_table = table.good_tiers_table();
        assert_eq!(good_table.len(), 2);
        assert_eq!(good_table.get("chr1:100A>G").unwrap().alt_count(), 40);
        // insertion order is preserved
        let order: Vec<&String> = good_table.iter().map(|(v, _c)| v).collect();
        assert_eq!(order, vec!["chr1:100A>G", "chr1:105C>T"]);
    }
}
