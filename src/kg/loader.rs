//! Line-delimited KG file loading.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use tracing::{debug, info};

use crate::error::AppError;

use super::{KgRecord, PairSets};

/// Read every record of a JSONL KG file.
///
/// Blank lines are skipped. The first line that fails to decode aborts the
/// load with [`AppError::MalformedRecord`] naming the file, the 1-based line
/// number and the line itself.
pub fn load_records(path: &Path) -> Result<Vec<KgRecord>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::Config(format!("cannot open KG file {}: {e}", path.display()))
    })?;

    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| match e.kind() {
            ErrorKind::InvalidData => AppError::MalformedRecord {
                path: path.to_path_buf(),
                line_no: idx + 1,
                reason: e.to_string(),
                line: String::new(),
            },
            _ => AppError::Io(e),
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let record = KgRecord::parse(&line).map_err(|e| AppError::MalformedRecord {
            path: path.to_path_buf(),
            line_no: idx + 1,
            reason: e.to_string(),
            line: line.clone(),
        })?;
        records.push(record);
    }

    debug!(path = %path.display(), records = records.len(), "KG file read");
    Ok(records)
}

/// Log the deduplicated relation counts of a loaded KG.
pub fn log_counts(name: &str, path: &Path, records: usize, sets: &PairSets) {
    info!(
        kg = name,
        path = %path.display(),
        records,
        relations = sets.full.len(),
        type_relations = sets.types.len(),
        instance_relations = sets.instances.len(),
        "KG loaded"
    );
}
