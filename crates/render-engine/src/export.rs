//! Render requests and the ffmpeg render backend.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;

use clickbox_common::config::FfmpegConfig;
use clickbox_common::error::{ClickboxError, ClickboxResult};

use crate::overlay::{build_filter_chain, BoxOverlay};

/// Filter chains longer than this are passed through a script file instead
/// of the command line.
const MAX_INLINE_FILTER_LEN: usize = 16 * 1024;

/// Everything a backend needs to draw markers onto one video.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Source video.
    pub input: PathBuf,

    /// Destination file, overwritten if present.
    pub output: PathBuf,

    /// Markers to draw, in application order.
    pub overlays: Vec<BoxOverlay>,

    /// Source duration when known, used for progress reporting.
    pub duration_secs: Option<f64>,
}

/// Basic stream metadata of a video file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub duration_secs: Option<f64>,
}

/// Progress callback for rendering.
pub type ProgressCallback = Box<dyn Fn(RenderProgress) + Send>;

/// Render progress report.
#[derive(Debug, Clone)]
pub struct RenderProgress {
    /// Current progress [0.0, 1.0], zero when the duration is unknown.
    pub progress: f64,

    /// Output timestamp reached so far.
    pub out_time_secs: f64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: RenderStage,
}

/// Stages of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Preparing,
    Rendering,
    Finalizing,
    Complete,
}

/// Trait for render backends.
///
/// The folder pipeline only talks to this trait, so alignment and overlay
/// planning can run against a fake backend.
pub trait RenderBackend {
    /// Draw the requested markers and write the output file. Blocks until
    /// the render finishes.
    fn render(
        &mut self,
        request: &RenderRequest,
        progress: Option<&ProgressCallback>,
    ) -> ClickboxResult<PathBuf>;

    /// Read stream metadata. `None` when the backend cannot probe.
    fn probe(&self, _path: &Path) -> Option<VideoInfo> {
        None
    }

    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// How the filter chain reaches ffmpeg.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterArg {
    /// `-vf <chain>`
    Inline(String),
    /// `-filter_script:v <file>`
    Script(PathBuf),
}

/// Renders by spawning ffmpeg with a `drawbox` filter chain.
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    config: FfmpegConfig,
}

impl FfmpegBackend {
    pub fn new(config: FfmpegConfig) -> Self {
        Self { config }
    }

    /// Full ffmpeg argument list for a request.
    pub fn build_args(&self, request: &RenderRequest, filter: Option<&FilterArg>) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-nostats".to_string(),
            "-progress".to_string(),
            "pipe:1".to_string(),
            "-i".to_string(),
            request.input.display().to_string(),
        ];

        match filter {
            Some(FilterArg::Inline(chain)) => {
                args.push("-vf".to_string());
                args.push(chain.clone());
            }
            Some(FilterArg::Script(path)) => {
                args.push("-filter_script:v".to_string());
                args.push(path.display().to_string());
            }
            None => {}
        }

        if let Some(codec) = &self.config.video_codec {
            args.push("-c:v".to_string());
            args.push(codec.clone());
        }

        args.push(request.output.display().to_string());
        args
    }

    /// Decide how to pass the chain, writing a script file for long chains.
    fn prepare_filter(&self, overlays: &[BoxOverlay]) -> ClickboxResult<Option<FilterArg>> {
        let Some(chain) = build_filter_chain(overlays) else {
            return Ok(None);
        };

        if chain.len() <= MAX_INLINE_FILTER_LEN {
            return Ok(Some(FilterArg::Inline(chain)));
        }

        let script_path =
            std::env::temp_dir().join(format!("clickbox-filter-{}.txt", std::process::id()));
        std::fs::write(&script_path, &chain).map_err(|e| {
            ClickboxError::render(format!(
                "Failed to write filter script {}: {e}",
                script_path.display()
            ))
        })?;
        tracing::debug!(
            path = %script_path.display(),
            filter_len = chain.len(),
            "Filter chain written to script file"
        );
        Ok(Some(FilterArg::Script(script_path)))
    }

    fn run_ffmpeg(
        &self,
        args: &[String],
        expected_duration_secs: Option<f64>,
        progress: Option<&ProgressCallback>,
    ) -> ClickboxResult<()> {
        tracing::debug!(args = ?args, "Running ffmpeg");
        let mut cmd = Command::new(&self.config.ffmpeg_path);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let start = std::time::Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| ClickboxError::render(format!("Failed to start ffmpeg: {e}")))?;

        tracing::info!(pid = child.id(), args_len = args.len(), "ffmpeg process started");

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ClickboxError::render("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ClickboxError::render("Failed to capture ffmpeg stderr"))?;

        // Drain stderr on its own thread so ffmpeg never blocks on a full pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        let mut state = ProgressState::default();
        let mut read_error = None;
        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(err) => {
                    read_error = Some(err);
                    break;
                }
            }

            if let Some((key, value)) = line.trim().split_once('=') {
                state.update(key, value);
                if key == "progress" {
                    if let Some(cb) = progress {
                        cb(progress_report(
                            &state,
                            expected_duration_secs,
                            start.elapsed().as_secs_f64(),
                        ));
                    }
                }
            }
        }

        // Undrained stdout would block ffmpeg forever; stop it before waiting.
        if let Some(err) = &read_error {
            tracing::warn!(
                error = %err,
                pid = child.id(),
                "Lost ffmpeg progress stream, stopping ffmpeg"
            );
            if let Err(kill_err) = child.kill() {
                tracing::debug!(error = %kill_err, "ffmpeg already exited");
            }
        }
        drop(reader);

        let status = child
            .wait()
            .map_err(|e| ClickboxError::render(format!("Failed to wait on ffmpeg: {e}")))?;

        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if let Some(err) = read_error {
            return Err(ClickboxError::render(format!(
                "Failed reading ffmpeg progress: {err}"
            )));
        }

        if !status.success() {
            return Err(ClickboxError::render(format!(
                "ffmpeg failed (status {}): {}",
                status,
                stderr_output.trim()
            )));
        }

        if let Some(cb) = progress {
            cb(RenderProgress {
                progress: 1.0,
                out_time_secs: state.out_time_secs,
                eta_secs: 0.0,
                stage: RenderStage::Complete,
            });
        }

        Ok(())
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new(FfmpegConfig::default())
    }
}

impl RenderBackend for FfmpegBackend {
    fn render(
        &mut self,
        request: &RenderRequest,
        progress: Option<&ProgressCallback>,
    ) -> ClickboxResult<PathBuf> {
        if !request.input.exists() {
            return Err(ClickboxError::FileNotFound {
                path: request.input.clone(),
            });
        }

        if let Some(cb) = progress {
            cb(RenderProgress {
                progress: 0.0,
                out_time_secs: 0.0,
                eta_secs: 0.0,
                stage: RenderStage::Preparing,
            });
        }

        let filter = self.prepare_filter(&request.overlays)?;
        let args = self.build_args(request, filter.as_ref());
        let result = self.run_ffmpeg(&args, request.duration_secs, progress);

        if let Some(FilterArg::Script(path)) = &filter {
            if let Err(err) = std::fs::remove_file(path) {
                tracing::warn!(error = %err, path = %path.display(), "Failed to remove filter script");
            }
        }

        result?;
        Ok(request.output.clone())
    }

    fn probe(&self, path: &Path) -> Option<VideoInfo> {
        probe_video(&self.config.ffprobe_path, path)
    }

    fn is_available(&self) -> bool {
        command_exists(&self.config.ffmpeg_path)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Whether an executable can be run, by name on `PATH` or by path.
pub fn command_exists(binary: &str) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Probe the first video stream with ffprobe.
pub fn probe_video(ffprobe: &str, path: &Path) -> Option<VideoInfo> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height:format=duration",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .ok()?;

    if !output.status.success() {
        tracing::debug!(
            path = %path.display(),
            status = %output.status,
            "ffprobe failed"
        );
        return None;
    }

    parse_probe_output(&output.stdout)
}

fn parse_probe_output(raw: &[u8]) -> Option<VideoInfo> {
    let parsed: ProbeOutput = serde_json::from_slice(raw).ok()?;
    let stream = parsed.streams.first()?;
    let width = stream.width?;
    let height = stream.height?;
    if width == 0 || height == 0 {
        return None;
    }

    // Matroska captures written live often carry no container duration.
    let duration_secs = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0);

    Some(VideoInfo {
        width,
        height,
        duration_secs,
    })
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            // ffmpeg reports microseconds under both keys.
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

fn progress_report(
    state: &ProgressState,
    expected_duration_secs: Option<f64>,
    elapsed_secs: f64,
) -> RenderProgress {
    let progress = match expected_duration_secs {
        Some(d) if d > 0.0 => (state.out_time_secs / d).clamp(0.0, 1.0),
        _ => 0.0,
    };

    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    RenderProgress {
        progress: if state.complete { 1.0 } else { progress },
        out_time_secs: state.out_time_secs,
        eta_secs,
        stage: if state.complete {
            RenderStage::Finalizing
        } else {
            RenderStage::Rendering
        },
    }
}
