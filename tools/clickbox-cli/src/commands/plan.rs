//! Show the markers planned for one session folder.

use std::path::PathBuf;

use clickbox_common::config::AppConfig;
use clickbox_render::export::{probe_video, FfmpegBackend, FilterArg, RenderRequest};
use clickbox_render::overlay::build_filter_chain;
use clickbox_render::pipeline::plan_folder;
use clickbox_session::job::FolderJob;

pub fn run(config: &AppConfig, folder: PathBuf, json: bool) -> anyhow::Result<()> {
    let job = FolderJob::new(&folder);
    job.ensure_inputs()
        .map_err(|e| anyhow::anyhow!("Folder is incomplete: {e}"))?;

    let video = probe_video(&config.ffmpeg.ffprobe_path, &job.video_path);
    let plan = plan_folder(&job, video, config.out_of_range)
        .map_err(|e| anyhow::anyhow!("Failed to plan folder: {e}"))?;

    if json {
        let value = serde_json::json!({
            "folder": job.folder,
            "reference_ms": plan.session.reference_ms,
            "video": plan.video.map(|v| serde_json::json!({
                "width": v.width,
                "height": v.height,
                "duration_secs": v.duration_secs,
            })),
            "policy": config.out_of_range.as_str(),
            "clicks": plan.aligned,
            "dropped": plan.outcome.dropped,
            "clamped": plan.outcome.clamped,
            "overlays": plan.overlays,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Session: {}", job.folder.display());
    println!("  Alignment reference: {} ms", plan.session.reference_ms);
    match plan.video {
        Some(v) => println!(
            "  Video: {}x{} ({})",
            v.width,
            v.height,
            v.duration_secs
                .map(|d| format!("{d:.2}s"))
                .unwrap_or_else(|| "unknown duration".to_string())
        ),
        None => println!("  Video: metadata unavailable"),
    }
    println!("  Clicks: {}", plan.aligned.len());
    println!(
        "  Policy: {} ({} dropped, {} clamped)",
        config.out_of_range.as_str(),
        plan.outcome.dropped,
        plan.outcome.clamped
    );
    println!();

    for (i, overlay) in plan.overlays.iter().enumerate() {
        println!(
            "  #{:<4} box ({}, {}) {}x{}  t=[{}, {}]",
            i + 1,
            overlay.x,
            overlay.y,
            overlay.width,
            overlay.height,
            overlay.start_secs,
            overlay.end_secs
        );
    }

    let filter = build_filter_chain(&plan.overlays).map(FilterArg::Inline);
    if filter.is_none() {
        println!("  No markers; the output is a plain re-encode.");
    }

    let backend = FfmpegBackend::new(config.ffmpeg.clone());
    let request = RenderRequest {
        input: job.video_path.clone(),
        output: job.output_path.clone(),
        overlays: plan.overlays,
        duration_secs: plan.video.and_then(|v| v.duration_secs),
    };
    let args = backend.build_args(&request, filter.as_ref());
    println!();
    println!("{} {}", config.ffmpeg.ffmpeg_path, args.join(" "));

    Ok(())
}
