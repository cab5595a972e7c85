use crate::core::{ArtifactKind, Identity, RestoreError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk layout of a world folder's per-identity data.
#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artifact_dir(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.directory())
    }

    pub fn artifact_path(&self, kind: ArtifactKind, identity: &Identity) -> PathBuf {
        self.artifact_dir(kind).join(kind.file_name(identity))
    }

    pub fn has_artifact(&self, kind: ArtifactKind, identity: &Identity) -> bool {
        self.artifact_path(kind, identity).is_file()
    }

    /// Creates every artifact directory that does not exist yet.
    pub fn ensure_directories(&self) -> Result<()> {
        for kind in ArtifactKind::ALL {
            let dir = self.artifact_dir(kind);
            fs::create_dir_all(&dir).map_err(|e| RestoreError::storage(&dir, e))?;
        }
        Ok(())
    }

    /// Every identity with a player-state file, sorted.
    ///
    /// Files whose stem is not an identity are ignored.
    pub fn list_identities(&self) -> Result<Vec<Identity>> {
        let dir = self.artifact_dir(ArtifactKind::PlayerState);
        fs::create_dir_all(&dir).map_err(|e| RestoreError::storage(&dir, e))?;

        let extension = ArtifactKind::PlayerState.extension();
        let mut identities = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| RestoreError::storage(&dir, e))? {
            let path = entry.map_err(|e| RestoreError::storage(&dir, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
                continue;
            }
            if let Some(identity) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(Identity::parse)
            {
                identities.push(identity);
            }
        }

        identities.sort();
        Ok(identities)
    }
}
