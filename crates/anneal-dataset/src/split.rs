use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{DatasetError, DatasetResult};
use crate::labels::tally_label_file;
use crate::layout::{find_image_for_stem, DatasetLayout, ExportLayout};

/// YOLO-style data config written next to the split dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub path: PathBuf,
    pub train: String,
    pub val: String,
    pub nc: usize,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct SplitOptions {
    pub train_ratio: f64,
    pub val_ratio: f64,
    pub seed: u64,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self { train_ratio: 0.8, val_ratio: 0.2, seed: 42 }
    }
}

impl SplitOptions {
    pub fn validate(&self) -> DatasetResult<()> {
        if self.train_ratio <= 0.0 || self.val_ratio <= 0.0 {
            return Err(DatasetError::SplitRatio(
                "train and val ratios must both be positive".to_string(),
            ));
        }
        if (self.train_ratio + self.val_ratio - 1.0).abs() > 1e-6 {
            return Err(DatasetError::SplitRatio(format!(
                "ratios must sum to 1.0, got {}",
                self.train_ratio + self.val_ratio
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SplitSummary {
    pub train_pairs: usize,
    pub val_pairs: usize,
    /// Label files with no matching image in the export; they are left out
    /// of the split rather than failing it.
    pub unmatched_labels: usize,
    pub train_classes: BTreeMap<u32, u64>,
    pub val_classes: BTreeMap<u32, u64>,
}

/// Split a flat annotation export into seeded train/val halves and write the
/// dataset's data config.
///
/// The shuffle is seeded so re-running on the same export reproduces the
/// same split. Existing train/val contents are replaced wholesale.
pub fn split_dataset(
    export: &ExportLayout,
    dataset: &DatasetLayout,
    classes: &[String],
    opts: &SplitOptions,
) -> DatasetResult<SplitSummary> {
    opts.validate()?;

    let mut pairs: Vec<(PathBuf, PathBuf)> = Vec::new();
    let mut summary = SplitSummary::default();

    let labels_dir = export.labels_dir();
    let mut label_files: Vec<PathBuf> = Vec::new();
    if labels_dir.is_dir() {
        for entry in std::fs::read_dir(&labels_dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
                label_files.push(path);
            }
        }
    }
    label_files.sort();

    for label in label_files {
        let stem = label
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match find_image_for_stem(&export.images_dir(), &stem) {
            Some(image) => pairs.push((image, label)),
            None => summary.unmatched_labels += 1,
        }
    }

    let mut rng = StdRng::seed_from_u64(opts.seed);
    pairs.shuffle(&mut rng);

    let n_train = (pairs.len() as f64 * opts.train_ratio) as usize;
    dataset.reset_split_dirs()?;

    for (idx, (image, label)) in pairs.iter().enumerate() {
        let split = if idx < n_train { "train" } else { "val" };
        copy_into(image, &dataset.images_dir(split))?;
        copy_into(label, &dataset.labels_dir(split))?;

        let tally = tally_label_file(label)?;
        let classes = if idx < n_train {
            &mut summary.train_classes
        } else {
            &mut summary.val_classes
        };
        for class_id in tally.class_ids {
            *classes.entry(class_id).or_insert(0) += 1;
        }
    }
    summary.train_pairs = n_train;
    summary.val_pairs = pairs.len() - n_train;

    let config = DataConfig {
        path: std::path::absolute(dataset.root())?,
        train: "images/train".to_string(),
        val: "images/val".to_string(),
        nc: classes.len(),
        names: classes.to_vec(),
    };
    let yaml = serde_yaml::to_string(&config)?;
    std::fs::write(dataset.data_config_path(), yaml)?;

    info!(
        train = summary.train_pairs,
        val = summary.val_pairs,
        unmatched = summary.unmatched_labels,
        "dataset split written"
    );
    Ok(summary)
}

fn copy_into(file: &Path, dir: &Path) -> DatasetResult<()> {
    let name = file
        .file_name()
        .ok_or_else(|| DatasetError::Layout(format!("not a file: {}", file.display())))?;
    std::fs::copy(file, dir.join(name))?;
    Ok(())
}
