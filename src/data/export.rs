//! CSV persistence for classified plays and model features

use crate::features::{ClassifiedPlay, FeatureRow};
use crate::Result;
use serde::Serialize;
use std::path::Path;

fn write_records<P: AsRef<Path>, T: Serialize>(path: P, records: &[T]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    log::debug!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

/// Write classified plays, one row per play
pub fn write_plays<P: AsRef<Path>>(path: P, plays: &[ClassifiedPlay]) -> Result<()> {
    write_records(path, plays)
}

/// Load classified plays written by [`write_plays`]
pub fn read_plays<P: AsRef<Path>>(path: P) -> Result<Vec<ClassifiedPlay>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let plays = reader
        .deserialize()
        .collect::<std::result::Result<Vec<ClassifiedPlay>, _>>()?;
    Ok(plays)
}

/// Write the final feature table
pub fn write_features<P: AsRef<Path>>(path: P, rows: &[FeatureRow]) -> Result<()> {
    write_records(path, rows)
}
