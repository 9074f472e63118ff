
use serde::Deserialize;
use std::fmt;

use crate::data_types::parse_error::ParseError;

/// Values that the variant analyser (or a spreadsheet export of it) uses for "nothing here"
const PLACEHOLDERS: [&str; 4] = [".", "NA", "nan", "NaN"];

/// Returns true if a raw identifier is missing or is one of the known placeholders.
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || PLACEHOLDERS.contains(&trimmed)
}

/// Confidence rank of a variant call on a tag; lower is better.
/// Stored as a decimal so sub-tiers like `2.5` are representable.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Tier(f64);

impl Tier {
    /// Constructor
    /// # Errors
    /// * if the rank is not a finite, positive number
    pub fn new(rank: f64) -> Result<Self, ParseError> {
        if !rank.is_finite() || rank <= 0.0 {
            return Err(ParseError::InvalidTier { value: rank.to_string() });
        }
        Ok(Self(rank))
    }

    pub fn rank(&self) -> f64 {
        self.0
    }

    /// Returns true if this tier is strictly better (lower) than the provided cutoff
    pub fn is_below(&self, cutoff: f64) -> bool {
        self.0 < cutoff
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // whole tiers are written without a trailing ".0"
        if self.0.fract() == 0.0 {
            write!(f, "{}", self.0 as u64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rank: f64 = s.trim().parse()
            .map_err(|_| ParseError::InvalidTier { value: s.to_string() })?;
        Tier::new(rank)
    }
}

/// A single row of the variant analyser summary table
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Observation {
    /// The variant key, e.g. "chr1:100A>G"; None when the cell was empty
    #[serde(rename = "variant ID")]
    variant_id: Option<String>,
    /// The molecule tag this call was observed on
    tag: Option<String>,
    /// Raw tier text, parsed into a [`Tier`] on demand
    tier: String,
    /// Free text listing the variants reported in phase with this one
    #[serde(rename = "in phase")]
    in_phase: Option<String>,
}

impl Observation {
    /// Constructor, mostly for testing
    pub fn new(variant_id: Option<&str>, tag: Option<&str>, tier: Tier, in_phase: Option<&str>) -> Self {
        Self {
            variant_id: variant_id.map(String::from),
            tag: tag.map(String::from),
            tier: tier.to_string(),
            in_phase: in_phase.map(String::from),
        }
    }

    /// Returns the variant key if it is present and not a placeholder
    pub fn variant_id(&self) -> Option<&str> {
        self.variant_id.as_deref()
            .map(str::trim)
            .filter(|v| !is_placeholder(v))
    }

    /// Returns the tag if it is present and not a placeholder
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
            .map(str::trim)
            .filter(|t| !is_placeholder(t))
    }

    /// Parses the tier for this observation
    /// # Errors
    /// * if the tier text is not a valid rank
    pub fn tier(&self) -> Result<Tier, ParseError> {
        self.tier.parse()
    }

    /// The raw in-phase annotation, empty if it was missing
    pub fn in_phase(&self) -> &str {
        self.in_phase.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_parse() {
        assert_eq!("1".parse::<Tier>().unwrap().rank(), 1.0);
        assert_eq!(" 2.5 ".parse::<Tier>().unwrap().rank(), 2.5);
        assert!("abc".parse::<Tier>().is_err());
        assert!("0".parse::<Tier>().is_err());
        assert!("".parse::<Tier>().is_err());
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(Tier::new(4.0).unwrap().to_string(), "4");
        assert_eq!(Tier::new(2.5).unwrap().to_string(), "2.5");
    }

    #[test]
    fn test_tier_is_below() {
        assert!(Tier::new(2.9).unwrap().is_below(3.0));
        assert!(!Tier::new(3.0).unwrap().is_below(3.0));
    }

    #[test]
    fn test_placeholders() {
        let obs = Observation::new(Some("  "), Some("NA"), Tier::new(1.0).unwrap(), None);
        assert_eq!(obs.variant_id(), None);
        assert_eq!(obs.tag(), None);
        assert_eq!(obs.in_phase(), "");

        let obs = Observation::new(Some("chr1:100A>G"), Some("TAG1"), Tier::new(1.0).unwrap(), Some("chr1:105C>T"));
        assert_eq!(obs.variant_id(), Some("chr1:100A>G"));
        assert_eq!(obs.tag(), Some("TAG1"));
        assert_eq!(obs.in_phase(), "chr1:105C>T");
    }
}
