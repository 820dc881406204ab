use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::DatasetResult;
use crate::labels::BoxAnnotation;
use crate::layout::{find_image_for_stem, ExportLayout, IMAGE_EXTENSIONS};

/// Boxes narrower than this many pixels (at the training image size) are
/// flagged; they rarely survive augmentation.
const MIN_BOX_PIXELS: f64 = 10.0;
/// Normalized margin inside which a box is considered to hug the frame edge.
const EDGE_MARGIN: f64 = 0.02;
/// Classes holding less than this share of all boxes get an imbalance warning.
const MIN_CLASS_SHARE: f64 = 0.05;

/// Outcome of the strict annotation audit, serialized to
/// `validation_report.json` next to the export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub total_images: u64,
    pub total_labels: u64,
    pub empty_labels: u64,
    pub total_annotations: u64,
    pub class_distribution: BTreeMap<u32, u64>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Audit a flat annotation export strictly.
///
/// Errors break training (malformed lines, out-of-range classes, labels
/// without images); warnings are quality signals (tiny or edge-hugging
/// boxes, class imbalance, unlabeled images).
pub fn validate_export(
    export: &ExportLayout,
    class_names: &[String],
    img_size: u32,
) -> DatasetResult<ValidationReport> {
    let mut report = ValidationReport::default();

    let mut label_files: Vec<PathBuf> = Vec::new();
    let labels_dir = export.labels_dir();
    if labels_dir.is_dir() {
        for entry in std::fs::read_dir(&labels_dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
                label_files.push(path);
            }
        }
    }
    label_files.sort();

    for label in &label_files {
        report.total_labels += 1;
        let name = label.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        let stem = label.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();

        if find_image_for_stem(&export.images_dir(), &stem).is_none() {
            report.errors.push(format!("{name}: no matching image in export"));
        }

        let content = std::fs::read_to_string(label)?;
        if content.trim().is_empty() {
            report.empty_labels += 1;
            continue;
        }

        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let lineno = lineno + 1;
            match BoxAnnotation::parse(line) {
                Ok(ann) => {
                    if ann.class_id as usize >= class_names.len() {
                        report.errors.push(format!(
                            "{name}:{lineno}: class id {} out of range (0-{})",
                            ann.class_id,
                            class_names.len().saturating_sub(1)
                        ));
                        continue;
                    }
                    report.total_annotations += 1;
                    *report.class_distribution.entry(ann.class_id).or_insert(0) += 1;
                    if ann.min_side() * f64::from(img_size) < MIN_BOX_PIXELS {
                        report
                            .warnings
                            .push(format!("{name}:{lineno}: box under {MIN_BOX_PIXELS}px at {img_size}px"));
                    }
                    if ann.touches_edge(EDGE_MARGIN) {
                        report.warnings.push(format!("{name}:{lineno}: box touches frame edge"));
                    }
                }
                Err(reason) => report.errors.push(format!("{name}:{lineno}: {reason}")),
            }
        }
    }

    let images_dir = export.images_dir();
    if images_dir.is_dir() {
        for entry in std::fs::read_dir(&images_dir)? {
            let path = entry?.path();
            let is_image = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext == *known));
            if !is_image {
                continue;
            }
            report.total_images += 1;
            let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
            if !labels_dir.join(format!("{stem}.txt")).is_file() {
                report.warnings.push(format!(
                    "{}: image has no label file",
                    path.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
                ));
            }
        }
    }

    if report.total_annotations > 0 {
        for (class_id, count) in &report.class_distribution {
            let share = *count as f64 / report.total_annotations as f64;
            if share < MIN_CLASS_SHARE {
                let class = class_names
                    .get(*class_id as usize)
                    .map_or_else(|| class_id.to_string(), Clone::clone);
                report.warnings.push(format!(
                    "class '{class}' underrepresented: {:.1}% of boxes",
                    share * 100.0
                ));
            }
        }
    }

    Ok(report)
}
