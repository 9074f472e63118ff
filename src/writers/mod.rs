/*!
# Writers module
Contains the logic for writing the haplotype matrices and the updated allele frequencies.
*/
/// Generates the reconciled allele frequency table
pub mod allele_frequency;
/// Generates the tag x variant matrices for each classified category
pub mod haplotype_matrix;
