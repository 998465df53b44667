//! Per-folder annotation pipeline and batch driver.
//!
//! A folder is an all-or-nothing unit: any failure aborts that folder and
//! leaves the others untouched. The batch driver keeps going after a
//! failure and reports every outcome at the end.

use std::path::PathBuf;

use serde::Serialize;

use clickbox_common::clock::epoch_ms_to_rfc3339;
use clickbox_common::config::OutOfRangePolicy;
use clickbox_common::error::{ClickboxError, ClickboxResult};
use clickbox_session::job::{FolderJob, LoadedSession};
use clickbox_session::timeline::{align_all, apply_policy, AlignedClick, PolicyOutcome};

use crate::export::{ProgressCallback, RenderBackend, RenderRequest, VideoInfo};
use crate::overlay::{build_overlays, BoxOverlay};

/// Everything decided for a folder before the render runs.
#[derive(Debug, Clone)]
pub struct FolderPlan {
    pub session: LoadedSession,
    pub video: Option<VideoInfo>,
    pub aligned: Vec<AlignedClick>,
    pub outcome: PolicyOutcome,
    pub overlays: Vec<BoxOverlay>,
}

/// Summary of one annotated folder.
#[derive(Debug, Clone, Serialize)]
pub struct FolderReport {
    pub folder: PathBuf,
    pub output: PathBuf,
    pub clicks_read: usize,
    pub overlays_drawn: usize,
    pub dropped: usize,
    pub clamped: usize,
    pub duration_secs: Option<f64>,
    pub elapsed_secs: f64,
}

/// A folder that could not be annotated.
#[derive(Debug)]
pub struct FolderFailure {
    pub folder: PathBuf,
    pub error: ClickboxError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<FolderReport>,
    pub failed: Vec<FolderFailure>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Load a folder and compute its markers without rendering.
///
/// `video` is the probed metadata of the source, if any; its duration feeds
/// the out-of-range policy.
pub fn plan_folder(
    job: &FolderJob,
    video: Option<VideoInfo>,
    policy: OutOfRangePolicy,
) -> ClickboxResult<FolderPlan> {
    let session = job.load()?;

    let video_start =
        epoch_ms_to_rfc3339(session.reference_ms).unwrap_or_else(|| "?".to_string());
    tracing::info!(
        folder = %job.folder.display(),
        clicks = session.events.len(),
        reference_ms = session.reference_ms,
        video_start = %video_start,
        "Session loaded"
    );

    let aligned = align_all(&session.events, session.reference_ms);
    let outcome = apply_policy(
        aligned.clone(),
        policy,
        video.and_then(|v| v.duration_secs),
    );
    let overlays = build_overlays(&outcome.clicks);

    Ok(FolderPlan {
        session,
        video,
        aligned,
        outcome,
        overlays,
    })
}

/// Annotate one folder: read, align, build markers, render.
pub fn annotate_folder(
    job: &FolderJob,
    backend: &mut dyn RenderBackend,
    policy: OutOfRangePolicy,
    progress: Option<&ProgressCallback>,
) -> ClickboxResult<FolderReport> {
    let started = std::time::Instant::now();

    job.ensure_inputs()?;
    let video = backend.probe(&job.video_path);
    match video {
        Some(info) => tracing::debug!(
            width = info.width,
            height = info.height,
            duration_secs = ?info.duration_secs,
            "Probed source video"
        ),
        None => tracing::debug!(
            path = %job.video_path.display(),
            "Source video metadata unavailable"
        ),
    }

    let plan = plan_folder(job, video, policy)?;

    let request = RenderRequest {
        input: job.video_path.clone(),
        output: job.output_path.clone(),
        overlays: plan.overlays,
        duration_secs: plan.video.and_then(|v| v.duration_secs),
    };

    tracing::info!(
        backend = backend.name(),
        overlays = request.overlays.len(),
        output = %request.output.display(),
        "Rendering click markers"
    );
    let output = backend.render(&request, progress)?;

    let report = FolderReport {
        folder: job.folder.clone(),
        output,
        clicks_read: plan.session.events.len(),
        overlays_drawn: request.overlays.len(),
        dropped: plan.outcome.dropped,
        clamped: plan.outcome.clamped,
        duration_secs: request.duration_secs,
        elapsed_secs: started.elapsed().as_secs_f64(),
    };

    tracing::info!(
        folder = %report.folder.display(),
        overlays = report.overlays_drawn,
        elapsed_secs = report.elapsed_secs,
        "Folder annotated"
    );

    Ok(report)
}

/// Annotate every job in order, continuing past failures.
pub fn annotate_all(
    jobs: &[FolderJob],
    backend: &mut dyn RenderBackend,
    policy: OutOfRangePolicy,
    progress: Option<&ProgressCallback>,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for job in jobs {
        match annotate_folder(job, backend, policy, progress) {
            Ok(report) => summary.succeeded.push(report),
            Err(error) => {
                tracing::error!(
                    folder = %job.folder.display(),
                    error = %error,
                    "Folder failed"
                );
                summary.failed.push(FolderFailure {
                    folder: job.folder.clone(),
                    error,
                });
            }
        }
    }

    summary
}
