//! Copies per-identity artifacts from one identity to another.

use super::layout::DataStore;
use crate::core::{ArtifactKind, Identity, RestoreError, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct FileMigrator {
    store: DataStore,
}

impl FileMigrator {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Copies every artifact `source` has over the matching artifact of `dest`.
    ///
    /// Returns how many artifact kinds were copied. Kinds missing on the source
    /// side are skipped. Every kind is attempted even when an earlier one fails;
    /// the first failure is returned.
    pub fn migrate(&self, source: Identity, dest: Identity) -> Result<usize> {
        if source == dest {
            debug!(identity = %source, "source and destination identical; nothing to migrate");
            return Ok(0);
        }

        let mut copied = 0;
        let mut first_error = None;

        for kind in ArtifactKind::ALL {
            let from = self.store.artifact_path(kind, &source);
            let to = self.store.artifact_path(kind, &dest);

            match copy_replacing(&from, &to) {
                Ok(true) => {
                    info!(kind = %kind, from = %from.display(), to = %to.display(), "copied artifact");
                    copied += 1;
                }
                Ok(false) => {
                    debug!(kind = %kind, path = %from.display(), "no source artifact");
                }
                Err(err) => {
                    if first_error.is_none() {
                        first_error = Some(RestoreError::MigrationFailed {
                            source_id: source,
                            dest_id: dest,
                            path: to,
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(copied),
        }
    }
}

/// Replaces `to` with the bytes of `from` through a temp file in the
/// destination directory, so `to` is either the old file or the full copy.
fn copy_replacing(from: &Path, to: &Path) -> io::Result<bool> {
    let mut source = match File::open(from) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };

    let dir = to
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent"))?;
    fs::create_dir_all(dir)?;

    let temp = NamedTempFile::new_in(dir)?;
    let mut writer = BufWriter::new(temp);
    io::copy(&mut source, &mut writer)?;
    writer.flush()?;
    let temp = writer.into_inner().map_err(|e| e.into_error())?;
    temp.as_file().sync_all()?;
    temp.persist(to).map_err(|e| e.error)?;
    Ok(true)
}
