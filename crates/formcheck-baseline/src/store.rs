//! Baseline file persistence (pretty-printed JSON)

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use formcheck_core::{Baseline, FormError, FormResult};

/// Write a baseline, creating parent directories as needed
pub fn save_baseline(baseline: &Baseline, path: impl AsRef<Path>) -> FormResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, baseline).map_err(|e| {
        if e.is_io() {
            FormError::Io(io::Error::new(io::ErrorKind::Other, e))
        } else {
            FormError::Serialize(e.to_string())
        }
    })?;
    writer.flush()?;

    tracing::info!(
        path = %path.display(),
        method = %baseline.method(),
        samples = baseline.metadata.num_images_processed,
        "Baseline saved"
    );
    Ok(())
}

/// Read and structurally check a baseline file.
///
/// A missing file is [`FormError::BaselineNotFound`]; anything that does
/// not parse, or parses into a shape that disagrees with its declared
/// method, is [`FormError::MalformedBaseline`].
pub fn load_baseline(path: impl AsRef<Path>) -> FormResult<Baseline> {
    let path = path.as_ref();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(FormError::BaselineNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let malformed = |reason: String| FormError::MalformedBaseline {
        path: path.to_path_buf(),
        reason,
    };

    let baseline: Baseline =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| malformed(e.to_string()))?;
    baseline.check_consistency().map_err(malformed)?;

    tracing::info!(
        path = %path.display(),
        method = %baseline.method(),
        samples = baseline.metadata.num_images_processed,
        "Baseline loaded"
    );
    Ok(baseline)
}
