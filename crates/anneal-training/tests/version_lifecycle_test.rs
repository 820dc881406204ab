//! Integration tests for the version lifecycle through the public API.
//!
//! These tests verify end-to-end behavior across store reloads:
//! - Parent lineage over successive training runs
//! - Store and pointer state after a trainer failure
//! - Compare and export over a multi-version history

use std::path::{Path, PathBuf};

use anneal_training::{
    DetectionTrainer, ExportFormat, IncrementalTrainer, PathsConfig, PipelineConfig, Strategy,
    TrainOutcome, TrainRequest, TrainingError, TrainingResult, VersionId, VersionStore,
};
use async_trait::async_trait;
use tempfile::TempDir;

/// In-process trainer: drops best weights and a two-column results log into
/// the requested run directory.
struct StubTrainer {
    map50: f64,
    fail: bool,
}

#[async_trait]
impl DetectionTrainer for StubTrainer {
    fn id(&self) -> &'static str {
        "stub"
    }

    async fn train(&self, request: &TrainRequest) -> TrainingResult<()> {
        if self.fail {
            return Err(TrainingError::ExternalTool {
                command: "stub train".to_string(),
                status: "exit status: 1".to_string(),
            });
        }
        let weights_dir = request.run_dir.join("weights");
        std::fs::create_dir_all(&weights_dir)?;
        std::fs::write(weights_dir.join("best.pt"), b"weights")?;
        std::fs::write(
            request.run_dir.join("results.csv"),
            format!("epoch, metrics/mAP50(B), metrics/mAP50-95(B)\n0, {}, 0.40\n", self.map50),
        )?;
        Ok(())
    }

    async fn export(
        &self,
        checkpoint: &Path,
        format: ExportFormat,
        _img_size: u32,
    ) -> TrainingResult<PathBuf> {
        let artifact = checkpoint.with_extension(format.extension());
        std::fs::write(&artifact, b"converted")?;
        Ok(artifact)
    }
}

fn pipeline_config(root: &Path) -> PipelineConfig {
    PipelineConfig {
        classes: vec!["ball".to_string(), "robot".to_string()],
        paths: PathsConfig {
            dataset: root.join("data"),
            models: root.join("models"),
            ..PathsConfig::default()
        },
        ..PipelineConfig::default()
    }
}

fn pipeline(config: &PipelineConfig, map50: f64) -> IncrementalTrainer {
    IncrementalTrainer::new(config.clone(), Box::new(StubTrainer { map50, fail: false }))
}

fn write_labels(config: &PipelineConfig, files: &[(&str, &str)]) {
    let layout = config.dataset_layout();
    let labels = layout.labels_dir("train");
    let images = layout.images_dir("train");
    std::fs::create_dir_all(&labels).unwrap();
    std::fs::create_dir_all(&images).unwrap();
    for (name, content) in files {
        std::fs::write(labels.join(format!("{name}.txt")), content).unwrap();
        std::fs::write(images.join(format!("{name}.png")), b"png").unwrap();
    }
}

#[tokio::test]
async fn test_lineage_survives_store_reloads() {
    let temp = TempDir::new().unwrap();
    let config = pipeline_config(temp.path());

    // Three runs, each from a freshly constructed orchestrator, each with a
    // dataset change small enough to stay incremental.
    write_labels(&config, &[("a", "0 0.5 0.5 0.1 0.1\n1 0.2 0.2 0.1 0.1\n")]);
    pipeline(&config, 0.5).train().await.unwrap();

    // 2 -> 3 annotations: ratio 0.5, the boundary stays incremental.
    write_labels(&config, &[("b", "1 0.3 0.3 0.1 0.1\n")]);
    pipeline(&config, 0.6).train().await.unwrap();

    // 3 -> 4 annotations: ratio 1/3.
    write_labels(&config, &[("c", "0 0.4 0.4 0.1 0.1\n")]);
    pipeline(&config, 0.7).train().await.unwrap();

    let models = config.model_layout();
    let store = VersionStore::load(models.manifest_path()).unwrap();
    assert_eq!(store.len(), 3);

    let records = store.records();
    assert_eq!(records[0].strategy, Strategy::New);
    assert_eq!(records[0].parent_version, None);
    assert_eq!(records[1].strategy, Strategy::Incremental);
    assert_eq!(records[1].parent_version, Some(VersionId::from("v1")));
    assert_eq!(records[2].parent_version, Some(VersionId::from("v2")));

    for record in records {
        assert!(record.checkpoint_path.is_file(), "missing {:?}", record.checkpoint_path);
    }
    assert_eq!(models.read_latest_pointer().unwrap(), Some(VersionId::from("v3")));
}

#[tokio::test]
async fn test_retrain_keeps_linear_parent_chain() {
    let temp = TempDir::new().unwrap();
    let config = pipeline_config(temp.path());

    write_labels(&config, &[("a", "0 0.5 0.5 0.1 0.1\n")]);
    pipeline(&config, 0.5).train().await.unwrap();

    // 1 -> 4 annotations: ratio 3.0 forces a retrain from the base model,
    // but the recorded lineage is still v1 -> v2.
    write_labels(
        &config,
        &[("big", "0 0.3 0.3 0.1 0.1\n0 0.4 0.4 0.1 0.1\n1 0.6 0.6 0.1 0.1\n")],
    );
    let outcome = pipeline(&config, 0.6).train().await.unwrap();

    let TrainOutcome::Trained { record } = outcome else {
        panic!("expected a trained version");
    };
    assert_eq!(record.strategy, Strategy::Retrain);
    assert_eq!(record.parent_version, Some(VersionId::from("v1")));
}

#[tokio::test]
async fn test_failed_run_leaves_history_untouched() {
    let temp = TempDir::new().unwrap();
    let config = pipeline_config(temp.path());

    write_labels(&config, &[("a", "0 0.5 0.5 0.1 0.1\n")]);
    pipeline(&config, 0.5).train().await.unwrap();

    write_labels(&config, &[("b", "1 0.3 0.3 0.1 0.1\n")]);
    let failing =
        IncrementalTrainer::new(config.clone(), Box::new(StubTrainer { map50: 0.0, fail: true }));
    failing.train().await.unwrap_err();

    let models = config.model_layout();
    let store = VersionStore::load(models.manifest_path()).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.latest().unwrap().version, VersionId::from("v1"));
    assert_eq!(models.read_latest_pointer().unwrap(), Some(VersionId::from("v1")));

    // The next successful run still becomes v2.
    let outcome = pipeline(&config, 0.6).train().await.unwrap();
    let TrainOutcome::Trained { record } = outcome else {
        panic!("expected a trained version");
    };
    assert_eq!(record.version, VersionId::from("v2"));
}

#[tokio::test]
async fn test_compare_and_export_over_history() {
    let temp = TempDir::new().unwrap();
    let config = pipeline_config(temp.path());

    write_labels(&config, &[("a", "0 0.5 0.5 0.1 0.1\n1 0.2 0.2 0.1 0.1\n")]);
    pipeline(&config, 0.5).train().await.unwrap();
    write_labels(&config, &[("b", "1 0.3 0.3 0.1 0.1\n")]);
    pipeline(&config, 0.7).train().await.unwrap();

    let driver = pipeline(&config, 0.0);
    let comparison = driver.compare(None, None).unwrap();
    assert_eq!(comparison.baseline, VersionId::from("v1"));
    assert_eq!(comparison.candidate, VersionId::from("v2"));
    assert_eq!(comparison.annotation_delta, 1);

    let map50 = comparison.metrics.iter().find(|m| m.name == "mAP50").unwrap();
    assert!((map50.diff.unwrap() - 0.2).abs() < 1e-9);
    assert!((map50.pct_change.unwrap() - 40.0).abs() < 1e-9);
    // Metrics the stub never writes stay absent rather than zeroed.
    let precision = comparison.metrics.iter().find(|m| m.name == "precision").unwrap();
    assert_eq!(precision.diff, None);

    let artifact = driver.export(None, ExportFormat::Torchscript).await.unwrap();
    assert!(artifact.is_file());
    assert!(artifact.ends_with("v2/exports/model.torchscript"));
}
