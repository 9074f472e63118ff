
/// Row-level problems found while parsing the input tables
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("tier must be a positive number, found {value:?}")]
    InvalidTier { value: String },
    #[error("{column} must be a non-negative whole number, found {value}")]
    InvalidCount { column: &'static str, value: f64 },
    #[error("{column} must be a finite number, found {value}")]
    InvalidFrequency { column: &'static str, value: f64 },
    #[error("variant {variant_id:?} is listed more than once")]
    DuplicateVariant { variant_id: String },
    #[error("alt count ({alt_count}) is greater than coverage ({coverage}) for {variant_id:?}")]
    AltExceedsCoverage { variant_id: String, alt_count: u64, coverage: u64 },
}
