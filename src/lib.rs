
/// Command line interface functionality
pub mod cli;
/// Contains various shared data types
pub mod data_types;
/// Recomputes allele frequencies after rejected haplotypes are removed
pub mod frequency_reconciler;
/// Builds per-tag candidate haplotypes from the summary observations
pub mod linkage;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Runs all stages in order on loaded inputs
pub mod pipeline;
/// Core logic for sorting haplotypes into quality categories
pub mod tier_classifier;
/// Various utility functions that tend to be very generic
pub mod util;
/// All output writers
pub mod writers;
