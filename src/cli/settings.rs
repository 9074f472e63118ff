
use anyhow::ensure;
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_output_filename, check_required_filename, FULL_VERSION};

#[derive(Args, Clone, Debug, Default, Serialize)]
pub struct HaplotypeSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    haplotier_version: String,

    /// Variant analyser summary table (CSV/TSV, optionally gzipped)
    #[clap(required = true)]
    #[clap(short = 's')]
    #[clap(long = "summary-file")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub summary_fn: PathBuf,

    /// Variant analyser frequency table (CSV/TSV, optionally gzipped)
    #[clap(required = true)]
    #[clap(short = 'f')]
    #[clap(long = "freq-file")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub frequency_fn: PathBuf,

    /// Output haplotype matrices in Ref > Alt format, one file per category
    #[clap(long = "output-haplotypes")]
    #[clap(value_name = "TSV")]
    #[clap(default_value = "haplotypes.tsv")]
    #[clap(help_heading = Some("Input/Output"))]
    pub haplotype_fn: PathBuf,

    /// Output haplotype matrices in tier number format, one file per category
    #[clap(long = "output-tiers")]
    #[clap(value_name = "TSV")]
    #[clap(default_value = "haplotype_tiers.tsv")]
    #[clap(help_heading = Some("Input/Output"))]
    pub tier_fn: PathBuf,

    /// Output table of updated allele frequencies
    #[clap(long = "output-frequencies")]
    #[clap(value_name = "TSV")]
    #[clap(default_value = "allele_frequencies.tsv")]
    #[clap(help_heading = Some("Input/Output"))]
    pub allele_frequency_fn: PathBuf,

    /// Optional output debug folder
    #[clap(long = "output-debug")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub debug_folder: Option<PathBuf>,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl HaplotypeSettings {
    pub fn haplotier_version(&self) -> &str {
        &self.haplotier_version
    }
}

pub fn check_settings(mut settings: HaplotypeSettings) -> anyhow::Result<HaplotypeSettings> {
    // hard code the version in
    settings.haplotier_version = FULL_VERSION.clone();
    info!("Haplotier version: {:?}", &settings.haplotier_version);
    info!("Inputs:");

    // check for all the required input files
    check_required_filename(&settings.summary_fn, "Summary file")?;
    info!("\tSummary: {:?}", &settings.summary_fn);
    check_required_filename(&settings.frequency_fn, "Frequency file")?;
    info!("\tFrequencies: {:?}", &settings.frequency_fn);

    // outputs
    info!("Outputs:");
    check_output_filename(&settings.haplotype_fn, "Haplotype output")?;
    info!("\tHaplotypes: {:?}", &settings.haplotype_fn);
    check_output_filename(&settings.tier_fn, "Tier output")?;
    info!("\tTiers: {:?}", &settings.tier_fn);
    check_output_filename(&settings.allele_frequency_fn, "Allele frequency output")?;
    info!("\tAllele frequencies: {:?}", &settings.allele_frequency_fn);
    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        info!("\tDebug folder: {debug_folder:?}");
    }

    // the matrix outputs fan out into per-category files, so they must not collide
    ensure!(settings.haplotype_fn != settings.tier_fn, "--output-haplotypes and --output-tiers must be different");
    ensure!(
        settings.allele_frequency_fn != settings.haplotype_fn && settings.allele_frequency_fn != settings.tier_fn,
        "--output-frequencies must differ from the haplotype outputs"
    );

    Ok(settings)
}
