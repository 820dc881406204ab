use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::ExtractionConfig;
use crate::error::{TrainingError, TrainingResult};

/// Video containers the extractor is pointed at.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];

/// Substitute `{placeholder}` tokens into a command template.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, String)]) -> String {
    let mut rendered = template.to_string();
    for (key, value) in vars {
        rendered = rendered.replace(&format!("{{{key}}}"), value);
    }
    rendered
}

/// Run one configured pipeline stage command through the shell with
/// inherited stdio. Non-zero exit surfaces as an external-tool error
/// carrying the rendered command; there are no retries.
pub async fn run_stage_command(
    stage: &str,
    template: &str,
    vars: &[(&str, String)],
) -> TrainingResult<()> {
    let rendered = render_template(template, vars);
    info!(stage, command = %rendered, "running stage command");

    let status = Command::new("sh").arg("-c").arg(&rendered).status().await.map_err(|e| {
        TrainingError::ExternalTool { command: rendered.clone(), status: e.to_string() }
    })?;
    if !status.success() {
        return Err(TrainingError::ExternalTool { command: rendered, status: status.to_string() });
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionSummary {
    pub videos: usize,
    pub extracted: usize,
    /// Videos whose frames already exist; the extractor is not re-run.
    pub skipped: usize,
    /// Stems that failed; one bad video does not abort the batch.
    pub failed: Vec<String>,
}

/// Fan the configured extractor command out over every video, at most
/// `workers` at a time. Workers share no mutable state; each one owns its
/// video and writes `{stem}_*`-prefixed frames into `frames_dir`.
pub async fn extract_frames(
    videos_dir: &Path,
    frames_dir: &Path,
    config: &ExtractionConfig,
) -> TrainingResult<ExtractionSummary> {
    std::fs::create_dir_all(frames_dir)?;

    let mut videos: Vec<PathBuf> = Vec::new();
    if videos_dir.is_dir() {
        for entry in std::fs::read_dir(videos_dir)? {
            let path = entry?.path();
            let is_video = path.is_file()
                && path.extension().is_some_and(|ext| {
                    VIDEO_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known))
                });
            if is_video {
                videos.push(path);
            }
        }
    }
    videos.sort();

    let existing: HashSet<String> = std::fs::read_dir(frames_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();

    let mut summary = ExtractionSummary { videos: videos.len(), ..Default::default() };
    let semaphore = Arc::new(Semaphore::new(config.workers));
    let mut handles = Vec::new();

    for video in videos {
        let stem = video
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let prefix = format!("{stem}_");
        if existing.iter().any(|name| name.starts_with(&prefix)) {
            summary.skipped += 1;
            continue;
        }

        let command = render_template(
            &config.command,
            &[
                ("video", video.display().to_string()),
                ("stem", stem.clone()),
                ("output", frames_dir.display().to_string()),
                ("fps", config.fps.to_string()),
            ],
        );

        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    return (
                        stem,
                        Err(TrainingError::ExternalTool {
                            command,
                            status: format!("semaphore closed: {e}"),
                        }),
                    );
                }
            };
            info!(video = %stem, "extracting frames");
            (stem, run_captured(&command).await)
        }));
    }

    for handle in handles {
        match handle.await {
            Ok((_, Ok(()))) => summary.extracted += 1,
            Ok((stem, Err(e))) => {
                warn!(video = %stem, error = %e, "frame extraction failed");
                summary.failed.push(stem);
            }
            Err(e) => {
                warn!(error = %e, "extraction task aborted");
                summary.failed.push(format!("<task: {e}>"));
            }
        }
    }

    info!(
        videos = summary.videos,
        extracted = summary.extracted,
        skipped = summary.skipped,
        failed = summary.failed.len(),
        "frame extraction finished"
    );
    Ok(summary)
}

/// Shell out with captured output so parallel workers do not interleave;
/// a failure carries the tail of stderr.
async fn run_captured(command: &str) -> TrainingResult<()> {
    let output = Command::new("sh").arg("-c").arg(command).output().await.map_err(|e| {
        TrainingError::ExternalTool { command: command.to_string(), status: e.to_string() }
    })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TrainingError::ExternalTool {
            command: command.to_string(),
            status: format!("{}; {}", output.status, stderr.trim()),
        });
    }
    Ok(())
}
