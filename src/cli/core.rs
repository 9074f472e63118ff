
use anyhow::bail;
use clap::Parser;
use chrono::Datelike;
use lazy_static::lazy_static;
use std::path::Path;

use crate::cli::settings::HaplotypeSettings;

lazy_static! {
    /// Stores the full version string we plan to use, which is generated in build.rs
    /// # Examples
    /// * `0.4.1-6bb9635-dirty` - while on a dirty branch
    /// * `0.4.1-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));

    /// Shared after help string containing the legalese.
    pub static ref AFTER_HELP: String = format!("Copyright (C) 2022-{}     haplotier contributors
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
Research Use Only and not for use in diagnostic procedures.", chrono::Utc::now().year());
}

/// Haplotier, finds haplotypes within tagged molecules and sorts them into quality tiers.
/// It also updates the allele frequencies of variants absorbed by rejected haplotypes.
#[derive(Parser)]
#[clap(author,
    version = &**FULL_VERSION,
    about,
    after_help = &**AFTER_HELP)]
pub struct Cli {
    #[command(flatten)]
    pub settings: HaplotypeSettings
}

pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_required_filename(filename: &Path, label: &str) -> anyhow::Result<()> {
    if !filename.exists() {
        bail!("{} does not exist: \"{}\"", label, filename.display());
    }

    // file exists
    Ok(())
}

/// Checks that an output file can be created, i.e. that the parent folder exists
/// # Arguments
/// * `filename` - the output file path to check
/// * `label` - the label to use for error messages
pub fn check_output_filename(filename: &Path, label: &str) -> anyhow::Result<()> {
    if filename.file_name().is_none() {
        bail!("{} is not a file path: \"{}\"", label, filename.display());
    }

    if let Some(parent) = filename.parent() {
        // an empty parent is the current directory
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            bail!("{} folder does not exist: \"{}\"", label, parent.display());
        }
    }

    // output location is usable
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_required_filename() {
        assert!(check_required_filename(Path::new("Cargo.toml"), "Manifest").is_ok());
        assert!(check_required_filename(Path::new("does_not_exist.tsv"), "Summary").is_err());
    }

    #[test]
    fn test_check_output_filename() {
        assert!(check_output_filename(Path::new("out.tsv"), "Output").is_ok());
        assert!(check_output_filename(Path::new("src/out.tsv"), "Output").is_ok());
        assert!(check_output_filename(Path::new("no_such_folder/out.tsv"), "Output").is_err());
        assert!(check_output_filename(Path::new(".."), "Output").is_err());
    }
}
