use std::path::{Path, PathBuf};

use crate::error::TrainingResult;
use crate::version::VersionId;

/// Filesystem layout for trained model versions.
///
/// ```text
/// <root>/versions/versions.json      append-only manifest
/// <root>/versions/LATEST             pointer to the newest version id
/// <root>/versions/<id>/train/        trainer run dir (weights/, results.csv)
/// <root>/versions/<id>/best.pt       checkpoint owned by the version
/// <root>/versions/<id>/exports/      converted artifacts
/// ```
#[derive(Debug, Clone)]
pub struct ModelLayout {
    root: PathBuf,
}

impl ModelLayout {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn versions_root(&self) -> PathBuf {
        self.root.join("versions")
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.versions_root().join("versions.json")
    }

    #[must_use]
    pub fn latest_pointer_path(&self) -> PathBuf {
        self.versions_root().join("LATEST")
    }

    #[must_use]
    pub fn version_dir(&self, id: &VersionId) -> PathBuf {
        self.versions_root().join(id.as_str())
    }

    /// Directory handed to the trainer as its run dir.
    #[must_use]
    pub fn run_dir(&self, id: &VersionId) -> PathBuf {
        self.version_dir(id).join("train")
    }

    /// Where the trainer must leave its best weights.
    #[must_use]
    pub fn run_weights_path(&self, id: &VersionId) -> PathBuf {
        self.run_dir(id).join("weights").join("best.pt")
    }

    #[must_use]
    pub fn run_results_path(&self, id: &VersionId) -> PathBuf {
        self.run_dir(id).join("results.csv")
    }

    /// The checkpoint copied out of the run dir, owned by the version record.
    #[must_use]
    pub fn checkpoint_path(&self, id: &VersionId) -> PathBuf {
        self.version_dir(id).join("best.pt")
    }

    #[must_use]
    pub fn exports_dir(&self, id: &VersionId) -> PathBuf {
        self.version_dir(id).join("exports")
    }

    pub fn ensure_version_dirs(&self, id: &VersionId) -> TrainingResult<()> {
        std::fs::create_dir_all(self.version_dir(id))?;
        std::fs::create_dir_all(self.run_dir(id))?;
        Ok(())
    }

    /// Rewrite the plain-text pointer naming the latest version. The JSON
    /// manifest stays the source of truth; this file exists for shell
    /// scripts and humans.
    pub fn write_latest_pointer(&self, id: &VersionId) -> TrainingResult<()> {
        std::fs::create_dir_all(self.versions_root())?;
        std::fs::write(self.latest_pointer_path(), format!("{id}\n"))?;
        Ok(())
    }

    pub fn read_latest_pointer(&self) -> TrainingResult<Option<VersionId>> {
        match std::fs::read_to_string(self.latest_pointer_path()) {
            Ok(content) => {
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(VersionId(trimmed.to_string())))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let layout = ModelLayout::new(PathBuf::from("models"));
        let v1 = VersionId::from_index(1);

        assert_eq!(layout.manifest_path(), PathBuf::from("models/versions/versions.json"));
        assert_eq!(
            layout.run_weights_path(&v1),
            PathBuf::from("models/versions/v1/train/weights/best.pt")
        );
        assert_eq!(layout.checkpoint_path(&v1), PathBuf::from("models/versions/v1/best.pt"));
        assert_eq!(layout.exports_dir(&v1), PathBuf::from("models/versions/v1/exports"));
    }

    #[test]
    fn test_latest_pointer_round_trip() {
        let temp = TempDir::new().unwrap();
        let layout = ModelLayout::new(temp.path().to_path_buf());

        assert_eq!(layout.read_latest_pointer().unwrap(), None);
        layout.write_latest_pointer(&VersionId::from_index(3)).unwrap();
        assert_eq!(layout.read_latest_pointer().unwrap(), Some(VersionId::from("v3")));

        layout.write_latest_pointer(&VersionId::from_index(4)).unwrap();
        assert_eq!(layout.read_latest_pointer().unwrap(), Some(VersionId::from("v4")));
    }
}
