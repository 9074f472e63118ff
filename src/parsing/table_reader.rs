
use anyhow::Context;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Returns true if the path ends in ".gz"
pub fn is_gzipped(filename: &Path) -> bool {
    filename.extension().unwrap_or_default() == "gz"
}

/// Picks the delimiter from the file name: ".csv" (optionally gzipped) is comma, anything else is tab.
pub fn delimiter_for(filename: &Path) -> u8 {
    let base = if is_gzipped(filename) {
        // strip the .gz and look at the inner extension
        filename.file_stem().map(Path::new).unwrap_or(filename)
    } else {
        filename
    };
    if base.extension().unwrap_or_default() == "csv" {
        b','
    } else {
        b'\t'
    }
}

/// Opens a delimited table with a header row, transparently decompressing ".gz" inputs.
/// # Arguments
/// * `filename` - the table to open
/// # Errors
/// * if the file cannot be opened
pub fn open_table(filename: &Path) -> anyhow::Result<csv::Reader<Box<dyn Read>>> {
    let file = File::open(filename)
        .with_context(|| format!("Error while opening {filename:?}:"))?;
    let fp: Box<dyn Read> = if is_gzipped(filename) {
        Box::new(flate2::read::MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_for(filename))
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(fp);
    Ok(reader)
}
