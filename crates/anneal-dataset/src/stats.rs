use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DatasetResult;
use crate::labels::tally_label_file;
use crate::layout::DatasetLayout;

/// Aggregate counts over a split dataset's training half.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total_images: u64,
    pub total_annotations: u64,
    #[serde(default)]
    pub class_distribution: BTreeMap<u32, u64>,
}

impl DatasetStats {
    #[must_use]
    pub fn class_count(&self, class_id: u32) -> u64 {
        self.class_distribution.get(&class_id).copied().unwrap_or(0)
    }
}

/// Count images, annotation lines, and per-class boxes under
/// `images/train` and `labels/train`.
///
/// Counting is lenient: empty label files contribute zero annotations and a
/// malformed line still counts toward the total (its class is dropped).
/// Missing split directories read as a dataset of zero.
pub fn collect_stats(layout: &DatasetLayout) -> DatasetResult<DatasetStats> {
    let mut stats = DatasetStats::default();

    let images_dir = layout.images_dir("train");
    if images_dir.is_dir() {
        for entry in std::fs::read_dir(&images_dir)? {
            if entry?.file_type()?.is_file() {
                stats.total_images += 1;
            }
        }
    }

    let labels_dir = layout.labels_dir("train");
    if labels_dir.is_dir() {
        for entry in std::fs::read_dir(&labels_dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != "txt") {
                continue;
            }
            let tally = tally_label_file(&path)?;
            stats.total_annotations += tally.annotations;
            for class_id in tally.class_ids {
                *stats.class_distribution.entry(class_id).or_insert(0) += 1;
            }
        }
    }

    Ok(stats)
}
