/*!
# Parsing module
Contains the logic for parsing the variant analyser tables into meaningful structs / data.
*/
/// Loader for the per-variant frequency table
pub mod frequencies;
/// Loader for the per-observation summary table
pub mod summary;
/// Shared delimited-text reader setup (delimiter and gzip detection)
pub mod table_reader;
