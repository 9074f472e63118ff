/*!
# CLI module
Command line interface functionality that is specific to haplotier.
*/

/// The main CLI module that contains the top-level CLI parser and shared file checks
pub mod core;
/// The haplotype classification settings
pub mod settings;
