use std::path::PathBuf;

use tracing::debug;

use crate::error::{TrainingError, TrainingResult};
use crate::version::{VersionId, VersionRecord};

/// Append-only store of version records, persisted as pretty-printed JSON.
///
/// The manifest is rewritten in full on every append through a temp file
/// plus rename, so readers never observe a half-written manifest. Records
/// form a linear chain: each one's `parent_version` is the previous record.
#[derive(Debug)]
pub struct VersionStore {
    path: PathBuf,
    records: Vec<VersionRecord>,
}

impl VersionStore {
    /// Load the store at `path`. A missing manifest is an empty store;
    /// unparseable content is a corrupt-state error naming the file.
    pub fn load(path: PathBuf) -> TrainingResult<Self> {
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let records: Vec<VersionRecord> = serde_json::from_str(&content)
                    .map_err(|source| TrainingError::CorruptManifest { path: path.clone(), source })?;
                debug!(versions = records.len(), path = %path.display(), "loaded version manifest");
                Ok(Self { path, records })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self { path, records: Vec::new() })
            }
            Err(e) => Err(e.into()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[VersionRecord] {
        &self.records
    }

    #[must_use]
    pub fn latest(&self) -> Option<&VersionRecord> {
        self.records.last()
    }

    pub fn get(&self, id: &VersionId) -> TrainingResult<&VersionRecord> {
        self.records
            .iter()
            .find(|r| &r.version == id)
            .ok_or_else(|| TrainingError::VersionNotFound(id.clone()))
    }

    /// Identifier the next appended record will get.
    #[must_use]
    pub fn next_version_id(&self) -> VersionId {
        VersionId::from_index(self.records.len() + 1)
    }

    /// Append a record and persist. The record's `parent_version` is
    /// overwritten with the current tail; on a persistence failure the
    /// store (file and memory) is left as it was.
    pub fn append(&mut self, mut record: VersionRecord) -> TrainingResult<VersionId> {
        record.parent_version = self.latest().map(|r| r.version.clone());
        let id = record.version.clone();
        self.records.push(record);
        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }
        Ok(id)
    }

    fn persist(&self) -> TrainingResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.records)?;
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}
