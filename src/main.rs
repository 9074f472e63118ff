
use log::{LevelFilter, error, info};
use std::time::Instant;

use haplotier::cli::core::get_cli;
use haplotier::cli::settings::{HaplotypeSettings, check_settings};
use haplotier::parsing::frequencies::load_frequencies;
use haplotier::parsing::summary::load_summary;
use haplotier::pipeline::run_pipeline;
use haplotier::tier_classifier::ClassifierConfigBuilder;
use haplotier::util::json_io::save_json;
use haplotier::writers::allele_frequency::write_allele_frequencies;
use haplotier::writers::haplotype_matrix::write_haplotype_reports;

fn run_analysis(settings: HaplotypeSettings) {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    let settings = match check_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    // create a debug folder if specified
    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        info!("Creating debug folder at {debug_folder:?}...");
        if let Err(e) = std::fs::create_dir_all(debug_folder) {
            error!("Error while creating debug folder: {e}");
            std::process::exit(exitcode::IOERR);
        }

        // save the CLI options
        let cli_json = debug_folder.join("cli_settings.json");
        info!("Saving CLI options to {cli_json:?}...");
        if let Err(e) = save_json(&settings, &cli_json) {
            error!("Error while saving CLI options: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }

    // load both inputs fully before doing anything else
    info!("Loading summary table...");
    let observations = match load_summary(&settings.summary_fn) {
        Ok(o) => o,
        Err(e) => {
            error!("Error while loading summary table: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    };
    info!("Loaded {} observations.", observations.len());

    info!("Loading frequency table...");
    let frequencies = match load_frequencies(&settings.frequency_fn) {
        Ok(f) => f,
        Err(e) => {
            error!("Error while loading frequency table: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    };
    info!("Loaded {} variant frequencies.", frequencies.len());

    // the thresholds are fixed, the builder just gives us the defaults
    let classifier_config = match ClassifierConfigBuilder::default().build() {
        Ok(cc) => cc,
        Err(e) => {
            error!("Error while building classifier config: {e:?}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    info!("Classifying haplotypes...");
    let result = match run_pipeline(&observations, &frequencies, &classifier_config) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while classifying haplotypes: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    };

    // now write things
    info!("Saving allele frequencies to {:?}...", settings.allele_frequency_fn);
    if let Err(e) = write_allele_frequencies(&settings.allele_frequency_fn, &result.reconciled) {
        error!("Error while saving allele frequencies: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Saving haplotype matrices...");
    let tier_by_tag = result.tier_lookup.by_tag(&result.classified.all_tiers);
    let dictionaries = result.frequency_dictionaries(&frequencies);
    match write_haplotype_reports(
        &result.classified, &tier_by_tag, &dictionaries, &settings.haplotype_fn, &settings.tier_fn
    ) {
        Ok(written) => {
            for out_fn in written.iter() {
                info!("\t{out_fn:?}");
            }
        },
        Err(e) => {
            error!("Error while saving haplotype matrices: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };

    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        let summary_json = debug_folder.join("classification_summary.json");
        info!("Saving classification summary to {summary_json:?}...");
        let summary = result.summary(settings.haplotier_version(), observations.len(), frequencies.len());
        if let Err(e) = save_json(&summary, &summary_json) {
            error!("Error while saving classification summary: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }

    info!("Analysis completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn main() {
    let cli = get_cli();
    run_analysis(cli.settings);
    info!("Process finished successfully.");
}
