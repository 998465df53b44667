//! Annotate every session folder under the output root.

use std::io::Write;

use clickbox_common::config::AppConfig;
use clickbox_render::export::{FfmpegBackend, ProgressCallback, RenderBackend};
use clickbox_render::pipeline::annotate_all;
use clickbox_session::job::discover_jobs;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let root = config.resolve_output_root()?;
    tracing::debug!(
        root = %root.display(),
        ffmpeg = %config.ffmpeg.ffmpeg_path,
        policy = config.out_of_range.as_str(),
        "Resolved annotate settings"
    );
    println!("Annotating sessions under: {}", root.display());

    let jobs = discover_jobs(&root)
        .map_err(|e| anyhow::anyhow!("Failed to list session folders: {e}"))?;
    if jobs.is_empty() {
        println!("  No session folders found.");
        return Ok(());
    }

    let mut backend = FfmpegBackend::new(config.ffmpeg.clone());
    if !backend.is_available() {
        anyhow::bail!(
            "ffmpeg not found (looked for '{}'); install it or set ffmpeg.ffmpeg_path",
            config.ffmpeg.ffmpeg_path
        );
    }

    println!("  Folders: {}", jobs.len());
    println!("  Out-of-range policy: {}", config.out_of_range.as_str());

    let progress_cb: ProgressCallback = Box::new(|p| {
        eprint!(
            "\r  Progress: {:.1}% ({:.1}s rendered, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.out_time_secs,
            p.eta_secs,
        );
        std::io::stderr().flush().ok();
    });

    let summary = annotate_all(
        &jobs,
        &mut backend,
        config.out_of_range,
        Some(&progress_cb),
    );
    eprintln!();

    println!();
    for report in &summary.succeeded {
        println!(
            "[OK]   {} ({} markers, {} dropped, {:.1}s)",
            report.folder.display(),
            report.overlays_drawn,
            report.dropped,
            report.elapsed_secs
        );
    }
    for failure in &summary.failed {
        println!("[FAIL] {}: {}", failure.folder.display(), failure.error);
    }

    println!(
        "\n{} of {} folder(s) annotated.",
        summary.succeeded.len(),
        summary.total()
    );

    if !summary.all_succeeded() {
        anyhow::bail!("{} folder(s) failed", summary.failed.len());
    }

    Ok(())
}
