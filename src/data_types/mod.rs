
/// Frequency table rows and the allele count tables derived from them
pub mod frequencies;
/// Haplotype sets, the tier lookup, and the classified categories
pub mod haplotypes;
/// Summary observations and tier ranks
pub mod observation;
/// Row-level parsing errors
pub mod parse_error;
