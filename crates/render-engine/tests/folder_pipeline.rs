use std::path::{Path, PathBuf};

use clickbox_common::config::{LoggingConfig, OutOfRangePolicy};
use clickbox_common::error::{ClickboxError, ClickboxResult};
use clickbox_render::export::{ProgressCallback, RenderBackend, RenderRequest, VideoInfo};
use clickbox_render::pipeline::{annotate_all, annotate_folder, plan_folder};
use clickbox_render::overlay::build_filter_chain;
use clickbox_session::job::{discover_jobs, FolderJob};

/// Backend that records requests and writes a marker file instead of video.
#[derive(Default)]
struct RecordingBackend {
    requests: Vec<RenderRequest>,
    video: Option<VideoInfo>,
    fail_on: Option<PathBuf>,
}

impl RenderBackend for RecordingBackend {
    fn render(
        &mut self,
        request: &RenderRequest,
        _progress: Option<&ProgressCallback>,
    ) -> ClickboxResult<PathBuf> {
        self.requests.push(request.clone());
        if self.fail_on.as_deref() == Some(request.input.as_path()) {
            return Err(ClickboxError::render("ffmpeg failed (status 1): broken input"));
        }
        let body = format!("{} overlays", request.overlays.len());
        std::fs::write(&request.output, body)?;
        Ok(request.output.clone())
    }

    fn probe(&self, _path: &Path) -> Option<VideoInfo> {
        self.video
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "recording"
    }
}

fn scratch_root(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("clickbox_pipeline_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_session(dir: &Path, events_csv: &str, timestamps: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("recording.mkv"), b"fake matroska").unwrap();
    std::fs::write(dir.join("events.csv"), events_csv).unwrap();
    std::fs::write(dir.join("timestamps.txt"), timestamps).unwrap();
}

const HEADER: &str = "timestamp,event_type,details,mouse_x,mouse_y\n";

#[test]
fn single_click_end_to_end() {
    clickbox_common::logging::init_logging(&LoggingConfig::default());
    let root = scratch_root("single_click");
    let folder = root.join("session");
    write_session(
        &folder,
        &format!("{HEADER}2500,ButtonPress(Left),Left,50,60\n"),
        "# timestamp format v2\n1000\n",
    );
    std::fs::write(folder.join("output_with_boxes.mp4"), b"stale output").unwrap();

    let mut backend = RecordingBackend {
        video: Some(VideoInfo {
            width: 1920,
            height: 1080,
            duration_secs: Some(5.0),
        }),
        ..RecordingBackend::default()
    };
    let job = FolderJob::new(&folder);
    let report = annotate_folder(&job, &mut backend, OutOfRangePolicy::Drop, None).unwrap();

    assert_eq!(backend.requests.len(), 1);
    let request = &backend.requests[0];
    assert_eq!(request.input, folder.join("recording.mkv"));
    assert_eq!(request.output, folder.join("output_with_boxes.mp4"));
    assert_eq!(request.duration_secs, Some(5.0));
    assert_eq!(request.overlays.len(), 1);

    let overlay = &request.overlays[0];
    assert_eq!(overlay.start_secs, 1.5);
    assert_eq!(overlay.end_secs, 1.5 + 0.1);
    assert_eq!((overlay.x, overlay.y), (35.0, 45.0));
    assert_eq!((overlay.width, overlay.height), (30.0, 30.0));
    assert_eq!(
        build_filter_chain(&request.overlays).unwrap(),
        "drawbox=x=35:y=45:w=30:h=30:color=red:thickness=2:enable='gte(t,1.5)*lte(t,1.6)'"
    );

    assert_eq!(report.clicks_read, 1);
    assert_eq!(report.overlays_drawn, 1);
    assert_eq!(
        std::fs::read_to_string(&report.output).unwrap(),
        "1 overlays"
    );

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn no_clicks_renders_without_markers() {
    let root = scratch_root("no_clicks");
    let folder = root.join("session");
    write_session(
        &folder,
        &format!("{HEADER}2500,KeyPress(KeyA),KeyA,50,60\n"),
        "header\n1000\n",
    );

    let mut backend = RecordingBackend::default();
    let report =
        annotate_folder(&FolderJob::new(&folder), &mut backend, OutOfRangePolicy::Drop, None)
            .unwrap();

    assert_eq!(report.overlays_drawn, 0);
    assert!(backend.requests[0].overlays.is_empty());
    assert!(build_filter_chain(&backend.requests[0].overlays).is_none());

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn zero_byte_event_log_renders_without_markers() {
    let root = scratch_root("zero_byte_log");
    let folder = root.join("session");
    write_session(&folder, "", "header\n1000\n");

    let mut backend = RecordingBackend::default();
    let report =
        annotate_folder(&FolderJob::new(&folder), &mut backend, OutOfRangePolicy::Drop, None)
            .unwrap();

    assert_eq!(report.clicks_read, 0);
    assert_eq!(backend.requests.len(), 1);
    assert!(backend.requests[0].overlays.is_empty());

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn duplicate_clicks_are_all_drawn() {
    let root = scratch_root("duplicates");
    let folder = root.join("session");
    write_session(
        &folder,
        &format!(
            "{HEADER}2000,ButtonPress(Left),Left,10,10\n2000,ButtonPress(Left),Left,10,10\n2000,ButtonPress(Left),Left,10,10\n"
        ),
        "header\n1000\n",
    );

    let mut backend = RecordingBackend::default();
    annotate_folder(&FolderJob::new(&folder), &mut backend, OutOfRangePolicy::Keep, None).unwrap();
    assert_eq!(backend.requests[0].overlays.len(), 3);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn missing_video_aborts_before_render() {
    let root = scratch_root("missing_video");
    let folder = root.join("session");
    write_session(
        &folder,
        &format!("{HEADER}2500,ButtonPress(Left),Left,50,60\n"),
        "header\n1000\n",
    );
    std::fs::remove_file(folder.join("recording.mkv")).unwrap();

    let mut backend = RecordingBackend::default();
    let err = annotate_folder(&FolderJob::new(&folder), &mut backend, OutOfRangePolicy::Drop, None)
        .unwrap_err();
    assert!(matches!(err, ClickboxError::FileNotFound { ref path } if path.ends_with("recording.mkv")));
    assert!(backend.requests.is_empty());

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn malformed_reference_aborts_before_render() {
    let root = scratch_root("bad_reference");
    let folder = root.join("session");
    write_session(
        &folder,
        &format!("{HEADER}2500,ButtonPress(Left),Left,50,60\n"),
        "header\nnot-a-number\n",
    );

    let mut backend = RecordingBackend::default();
    let err = annotate_folder(&FolderJob::new(&folder), &mut backend, OutOfRangePolicy::Drop, None)
        .unwrap_err();
    assert!(matches!(err, ClickboxError::Session { .. }));
    assert!(backend.requests.is_empty());

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn drop_policy_uses_probed_duration() {
    let root = scratch_root("drop_policy");
    let folder = root.join("session");
    write_session(
        &folder,
        &format!(
            "{HEADER}500,ButtonPress(Left),Left,1,1\n2000,ButtonPress(Left),Left,2,2\n60000,ButtonPress(Left),Left,3,3\n"
        ),
        "header\n1000\n",
    );
    let video = Some(VideoInfo {
        width: 640,
        height: 480,
        duration_secs: Some(5.0),
    });

    let plan = plan_folder(&FolderJob::new(&folder), video, OutOfRangePolicy::Drop).unwrap();
    assert_eq!(plan.video, video);
    assert_eq!(plan.aligned.len(), 3);
    assert_eq!(plan.outcome.dropped, 2);
    assert_eq!(plan.overlays.len(), 1);
    assert_eq!(plan.overlays[0].start_secs, 1.0);

    let keep = plan_folder(&FolderJob::new(&folder), video, OutOfRangePolicy::Keep).unwrap();
    assert_eq!(keep.overlays.len(), 3);
    assert_eq!(keep.overlays[0].start_secs, -0.5);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn batch_continues_after_failures() {
    let root = scratch_root("batch");
    let good = root.join("a_good");
    let broken_csv = root.join("b_broken_csv");
    let engine_fails = root.join("c_engine_fails");
    let also_good = root.join("d_also_good");

    let events = format!("{HEADER}2500,ButtonPress(Left),Left,50,60\n");
    write_session(&good, &events, "header\n1000\n");
    write_session(
        &broken_csv,
        &format!("{HEADER}oops,ButtonPress(Left),Left,50,60\n"),
        "header\n1000\n",
    );
    write_session(&engine_fails, &events, "header\n1000\n");
    write_session(&also_good, &events, "header\n1000\n");
    std::fs::create_dir_all(root.join("e_empty")).unwrap();

    let jobs = discover_jobs(&root).unwrap();
    assert_eq!(jobs.len(), 5);

    let mut backend = RecordingBackend {
        fail_on: Some(engine_fails.join("recording.mkv")),
        ..RecordingBackend::default()
    };
    let summary = annotate_all(&jobs, &mut backend, OutOfRangePolicy::Drop, None);

    assert_eq!(summary.total(), 5);
    assert!(!summary.all_succeeded());
    let ok: Vec<&PathBuf> = summary.succeeded.iter().map(|r| &r.folder).collect();
    assert_eq!(ok, vec![&good, &also_good]);

    let failed: Vec<&PathBuf> = summary.failed.iter().map(|f| &f.folder).collect();
    assert_eq!(failed, vec![&broken_csv, &engine_fails, &root.join("e_empty")]);
    assert!(summary.failed[1].error.is_engine_failure());
    assert!(!summary.failed[0].error.is_engine_failure());

    // Only folders that got past loading reach the backend.
    assert_eq!(backend.requests.len(), 3);
    assert!(good.join("output_with_boxes.mp4").exists());
    assert!(!broken_csv.join("output_with_boxes.mp4").exists());

    std::fs::remove_dir_all(&root).ok();
}
