use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::DatasetResult;
use crate::layout::DatasetLayout;

/// Number of hex characters kept from the full digest. Fingerprints are only
/// ever compared for equality, never used cryptographically.
const FINGERPRINT_LEN: usize = 12;

/// Stable content fingerprint of a dataset's label files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetFingerprint(pub String);

impl fmt::Display for DatasetFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint every `.txt` label file under the dataset's `labels/` tree.
///
/// Files are visited in sorted path order, so the digest is independent of
/// directory enumeration order and of file timestamps. A dataset with no
/// labels directory fingerprints the same as one with zero label files.
pub fn fingerprint_labels(layout: &DatasetLayout) -> DatasetResult<DatasetFingerprint> {
    let labels_root = layout.labels_root();

    let mut files: Vec<PathBuf> = Vec::new();
    if labels_root.is_dir() {
        for entry in WalkDir::new(&labels_root).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "txt")
            {
                files.push(entry.path().to_path_buf());
            }
        }
    }
    files.sort();

    let mut hasher = Sha256::new();
    for path in &files {
        hasher.update(std::fs::read(path)?);
    }

    let digest = hex::encode(hasher.finalize());
    Ok(DatasetFingerprint(digest[..FINGERPRINT_LEN].to_string()))
}
