use std::path::{Path, PathBuf};

use crate::error::DatasetResult;

/// Image extensions the annotation tools emit, in lookup order.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Filesystem layout of a split dataset ready for training.
///
/// ```text
/// <root>/images/train/*.png   <root>/labels/train/*.txt
/// <root>/images/val/*.png     <root>/labels/val/*.txt
/// <root>/dataset.yaml
/// ```
#[derive(Debug, Clone)]
pub struct DatasetLayout {
    root: PathBuf,
}

impl DatasetLayout {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn labels_root(&self) -> PathBuf {
        self.root.join("labels")
    }

    #[must_use]
    pub fn images_dir(&self, split: &str) -> PathBuf {
        self.root.join("images").join(split)
    }

    #[must_use]
    pub fn labels_dir(&self, split: &str) -> PathBuf {
        self.root.join("labels").join(split)
    }

    #[must_use]
    pub fn data_config_path(&self) -> PathBuf {
        self.root.join("dataset.yaml")
    }

    /// Create (or recreate, empty) the train/val split directories.
    pub fn reset_split_dirs(&self) -> DatasetResult<()> {
        for split in ["train", "val"] {
            for dir in [self.images_dir(split), self.labels_dir(split)] {
                if dir.exists() {
                    std::fs::remove_dir_all(&dir)?;
                }
                std::fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}

/// Filesystem layout of a flat annotation export (pre-split).
///
/// ```text
/// <root>/images/*.png   <root>/labels/*.txt
/// ```
#[derive(Debug, Clone)]
pub struct ExportLayout {
    root: PathBuf,
}

impl ExportLayout {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    #[must_use]
    pub fn labels_dir(&self) -> PathBuf {
        self.root.join("labels")
    }
}

/// Look up the image file matching a label stem, trying each known extension.
#[must_use]
pub fn find_image_for_stem(images_dir: &Path, stem: &str) -> Option<PathBuf> {
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| images_dir.join(format!("{stem}.{ext}")))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let layout = DatasetLayout::new(PathBuf::from("/data"));
        assert_eq!(layout.images_dir("train"), PathBuf::from("/data/images/train"));
        assert_eq!(layout.labels_dir("val"), PathBuf::from("/data/labels/val"));
        assert_eq!(layout.data_config_path(), PathBuf::from("/data/dataset.yaml"));
    }

    #[test]
    fn test_reset_split_dirs_clears_stale_files() {
        let temp = TempDir::new().unwrap();
        let layout = DatasetLayout::new(temp.path().to_path_buf());
        let stale = layout.images_dir("train").join("old.png");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, b"x").unwrap();

        layout.reset_split_dirs().unwrap();

        assert!(layout.images_dir("train").is_dir());
        assert!(!stale.exists());
    }

    #[test]
    fn test_find_image_prefers_known_extensions() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("frame_001.jpg"), b"x").unwrap();

        let found = find_image_for_stem(temp.path(), "frame_001").unwrap();
        assert!(found.ends_with("frame_001.jpg"));
        assert!(find_image_for_stem(temp.path(), "frame_002").is_none());
    }
}
