use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use crate::error::{DatasetError, DatasetResult};
use crate::layout::{find_image_for_stem, ExportLayout};

/// A label file plus the image it annotates, when that image exists.
#[derive(Debug, Clone)]
pub struct LabeledPair {
    pub label: PathBuf,
    pub image: Option<PathBuf>,
}

/// Computed removal plan; nothing is touched until [`apply_sanitize`].
#[derive(Debug, Clone, Default)]
pub struct SanitizePlan {
    pub annotated: usize,
    pub empty_total: usize,
    pub keep: usize,
    pub remove: Vec<LabeledPair>,
}

/// Plan the removal of image/label pairs whose label file is empty, keeping
/// `keep_percent` of them as negative examples.
///
/// Which empty pairs survive is decided by a seeded shuffle, so the same
/// export and seed always produce the same plan.
pub fn plan_sanitize(
    export: &ExportLayout,
    keep_percent: f64,
    seed: u64,
) -> DatasetResult<SanitizePlan> {
    if !(0.0..=100.0).contains(&keep_percent) {
        return Err(DatasetError::Layout(format!(
            "keep percentage must be in [0, 100], got {keep_percent}"
        )));
    }

    let mut plan = SanitizePlan::default();
    let labels_dir = export.labels_dir();
    if !labels_dir.is_dir() {
        return Err(DatasetError::Layout(format!(
            "no labels directory at {}",
            labels_dir.display()
        )));
    }

    let mut empties: Vec<PathBuf> = Vec::new();
    let mut label_files: Vec<PathBuf> = std::fs::read_dir(&labels_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    label_files.sort();

    for label in label_files {
        let content = std::fs::read_to_string(&label)?;
        if content.trim().is_empty() {
            empties.push(label);
        } else {
            plan.annotated += 1;
        }
    }
    plan.empty_total = empties.len();

    let mut rng = StdRng::seed_from_u64(seed);
    empties.shuffle(&mut rng);
    plan.keep = (empties.len() as f64 * keep_percent / 100.0).round() as usize;

    for label in empties.into_iter().skip(plan.keep) {
        let stem = label
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let image = find_image_for_stem(&export.images_dir(), &stem);
        plan.remove.push(LabeledPair { label, image });
    }

    Ok(plan)
}

/// Delete every pair in the plan. Returns the number of files removed.
pub fn apply_sanitize(plan: &SanitizePlan) -> DatasetResult<usize> {
    let mut removed = 0;
    for pair in &plan.remove {
        std::fs::remove_file(&pair.label)?;
        removed += 1;
        if let Some(image) = &pair.image {
            std::fs::remove_file(image)?;
            removed += 1;
        }
    }
    info!(removed, kept = plan.keep, "sanitized empty-label pairs");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed_export(root: &std::path::Path, annotated: usize, empty: usize) -> ExportLayout {
        let export = ExportLayout::new(root.to_path_buf());
        std::fs::create_dir_all(export.images_dir()).unwrap();
        std::fs::create_dir_all(export.labels_dir()).unwrap();
        for i in 0..annotated {
            std::fs::write(export.images_dir().join(format!("a{i:03}.png")), b"png").unwrap();
            std::fs::write(
                export.labels_dir().join(format!("a{i:03}.txt")),
                "0 0.5 0.5 0.1 0.1\n",
            )
            .unwrap();
        }
        for i in 0..empty {
            std::fs::write(export.images_dir().join(format!("e{i:03}.png")), b"png").unwrap();
            std::fs::write(export.labels_dir().join(format!("e{i:03}.txt")), "").unwrap();
        }
        export
    }

    #[test]
    fn test_plan_keeps_requested_share_of_empties() {
        let temp = TempDir::new().unwrap();
        let export = seed_export(temp.path(), 5, 10);

        let plan = plan_sanitize(&export, 20.0, 42).unwrap();
        assert_eq!(plan.annotated, 5);
        assert_eq!(plan.empty_total, 10);
        assert_eq!(plan.keep, 2);
        assert_eq!(plan.remove.len(), 8);
    }

    #[test]
    fn test_plan_never_touches_annotated_pairs() {
        let temp = TempDir::new().unwrap();
        let export = seed_export(temp.path(), 3, 4);

        let plan = plan_sanitize(&export, 0.0, 42).unwrap();
        for pair in &plan.remove {
            let name = pair.label.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with('e'), "annotated pair in plan: {name}");
        }
    }

    #[test]
    fn test_plan_is_deterministic_for_same_seed() {
        let temp = TempDir::new().unwrap();
        let export = seed_export(temp.path(), 0, 10);

        let a = plan_sanitize(&export, 50.0, 7).unwrap();
        let b = plan_sanitize(&export, 50.0, 7).unwrap();
        let labels =
            |plan: &SanitizePlan| plan.remove.iter().map(|p| p.label.clone()).collect::<Vec<_>>();
        assert_eq!(labels(&a), labels(&b));
    }

    #[test]
    fn test_apply_removes_label_and_image() {
        let temp = TempDir::new().unwrap();
        let export = seed_export(temp.path(), 1, 2);

        let plan = plan_sanitize(&export, 0.0, 42).unwrap();
        let removed = apply_sanitize(&plan).unwrap();
        assert_eq!(removed, 4);
        assert_eq!(std::fs::read_dir(export.labels_dir()).unwrap().count(), 1);
        assert_eq!(std::fs::read_dir(export.images_dir()).unwrap().count(), 1);
    }

    #[test]
    fn test_plan_rejects_out_of_range_percentage() {
        let temp = TempDir::new().unwrap();
        let export = seed_export(temp.path(), 0, 0);
        assert!(plan_sanitize(&export, 120.0, 42).is_err());
    }
}
