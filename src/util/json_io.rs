
use anyhow::Context;
use std::io::{BufWriter, Write};
use std::fs::File;
use std::path::Path;

/// Saves a serializable struct as pretty JSON, gzip-compressed if the path ends in ".gz".
/// # Arguments
/// * `data` - the data in memory
/// * `out_filename` - user provided path to write to
/// # Errors
/// * if opening or writing to the file throw errors
/// * if JSON serialization throws errors
pub fn save_json<T: serde::Serialize>(data: &T, out_filename: &Path) -> anyhow::Result<()> {
    let file = File::create(out_filename)
        .with_context(|| format!("Error while creating {out_filename:?}:"))?;
    let file: Box<dyn std::io::Write> = if out_filename.extension().unwrap_or_default() == "gz" {
        Box::new(flate2::write::GzEncoder::new(file, flate2::Compression::best()))
    } else {
        Box::new(file)
    };
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .with_context(|| format!("Error while serializing {out_filename:?}:"))?;
    writer.flush()
        .with_context(|| format!("Error while flushing output to {out_filename:?}:"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Read;

    #[test]
    fn test_save_json_gz() {
        let out_dir = std::env::temp_dir().join(format!("haplotier_json_{}", std::process::id()));
        std::fs::create_dir_all(&out_dir).unwrap();

        let data: BTreeMap<String, usize> = [("HapHQ".to_string(), 3)].into_iter().collect();
        let plain_fn = out_dir.join("summary.json");
        save_json(&data, &plain_fn).unwrap();
        let plain: BTreeMap<String, usize> = serde_json::from_str(&std::fs::read_to_string(&plain_fn).unwrap()).unwrap();
        assert_eq!(plain, data);

        let gz_fn = out_dir.join("summary.json.gz");
        save_json(&data, &gz_fn).unwrap();
        let mut decoded = String::new();
        flate2::read::MultiGzDecoder::new(File::open(&gz_fn).unwrap())
            .read_to_string(&mut decoded).unwrap();
        let compressed: BTreeMap<String, usize> = serde_json::from_str(&decoded).unwrap();
        assert_eq!(compressed, data);

        std::fs::remove_dir_all(&out_dir).unwrap();
    }
}
