//! Session folders and job discovery.
//!
//! Each immediate subdirectory of the output root is one recorded session:
//!
//! ```text
//! <root>/<session>/recording.mkv        source video
//! <root>/<session>/events.csv           input event log
//! <root>/<session>/timestamps.txt       alignment reference
//! <root>/<session>/output_with_boxes.mp4   annotated result (written)
//! ```

use std::path::{Path, PathBuf};

use crate::error::SessionError;
use crate::event::{read_click_events, ClickEvent, TimestampMs};
use crate::timeline::read_alignment_reference;

pub const VIDEO_FILE: &str = "recording.mkv";
pub const EVENTS_FILE: &str = "events.csv";
pub const TIMESTAMPS_FILE: &str = "timestamps.txt";
pub const OUTPUT_FILE: &str = "output_with_boxes.mp4";

/// The set of sibling files that make up one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderJob {
    pub folder: PathBuf,
    pub video_path: PathBuf,
    pub events_path: PathBuf,
    pub timestamps_path: PathBuf,
    pub output_path: PathBuf,
}

/// A session whose event log and alignment reference have been read.
#[derive(Debug, Clone)]
pub struct LoadedSession {
    pub job: FolderJob,
    pub events: Vec<ClickEvent>,
    pub reference_ms: TimestampMs,
}

impl FolderJob {
    /// Build the job for a session folder using the fixed file names.
    pub fn new(folder: impl AsRef<Path>) -> Self {
        let folder = folder.as_ref().to_path_buf();
        Self {
            video_path: folder.join(VIDEO_FILE),
            events_path: folder.join(EVENTS_FILE),
            timestamps_path: folder.join(TIMESTAMPS_FILE),
            output_path: folder.join(OUTPUT_FILE),
            folder,
        }
    }

    /// Folder name for display.
    pub fn name(&self) -> String {
        self.folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.folder.display().to_string())
    }

    /// Required inputs that are absent, in video/events/timestamps order.
    pub fn missing_inputs(&self) -> Vec<PathBuf> {
        [&self.video_path, &self.events_path, &self.timestamps_path]
            .into_iter()
            .filter(|p| !p.is_file())
            .cloned()
            .collect()
    }

    /// Fail with the first missing input, if any.
    pub fn ensure_inputs(&self) -> Result<(), SessionError> {
        match self.missing_inputs().into_iter().next() {
            Some(path) => Err(SessionError::MissingInput { path }),
            None => Ok(()),
        }
    }

    /// Check inputs and read the event log and alignment reference.
    pub fn load(&self) -> Result<LoadedSession, SessionError> {
        self.ensure_inputs()?;
        let events = read_click_events(&self.events_path)?;
        let reference_ms = read_alignment_reference(&self.timestamps_path)?;
        Ok(LoadedSession {
            job: self.clone(),
            events,
            reference_ms,
        })
    }
}

/// List every immediate subdirectory of `root` as a job, sorted by path.
pub fn discover_jobs(root: impl AsRef<Path>) -> Result<Vec<FolderJob>, SessionError> {
    let root = root.as_ref();
    let io_error = |e: std::io::Error| SessionError::Io {
        path: root.to_path_buf(),
        source: e,
    };

    if !root.is_dir() {
        return Err(SessionError::MissingInput {
            path: root.to_path_buf(),
        });
    }

    let mut folders = Vec::new();
    for entry in std::fs::read_dir(root).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let path = entry.path();
        if path.is_dir() {
            folders.push(path);
        }
    }
    folders.sort();

    tracing::debug!(root = %root.display(), folders = folders.len(), "Discovered session folders");

    Ok(folders.into_iter().map(FolderJob::new).collect())
}
