//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory whose immediate subdirectories are session folders.
    /// `None` means the `output` directory next to the executable.
    pub output_root: Option<PathBuf>,

    /// External media engine settings.
    pub ffmpeg: FfmpegConfig,

    /// What to do with clicks that fall outside the video timeline.
    pub out_of_range: OutOfRangePolicy,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// External media engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegConfig {
    /// ffmpeg executable name or path.
    pub ffmpeg_path: String,

    /// ffprobe executable name or path.
    pub ffprobe_path: String,

    /// Video encoder override (e.g. "libx264"). ffmpeg picks the
    /// container default when unset.
    pub video_codec: Option<String>,
}

/// Policy for clicks whose visibility window lies outside the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangePolicy {
    /// Pass every click through untouched, even if its box can never show.
    Keep,
    /// Drop clicks whose window ends before the video starts or begins
    /// after it ends.
    #[default]
    Drop,
    /// Shift clicks that start before the video to time zero.
    Clamp,
}

impl OutOfRangePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Drop => "drop",
            Self::Clamp => "clamp",
        }
    }
}

impl std::str::FromStr for OutOfRangePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep" => Ok(Self::Keep),
            "drop" => Ok(Self::Drop),
            "clamp" => Ok(Self::Clamp),
            other => Err(format!("unknown policy '{other}' (expected keep|drop|clamp)")),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for the clickbox crates ("info", "debug") or a full filter
    /// directive ("clickbox_render=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            video_codec: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Resolve the session root: the configured directory, or `output`
    /// next to the running executable.
    pub fn resolve_output_root(&self) -> std::io::Result<PathBuf> {
        if let Some(root) = &self.output_root {
            return Ok(root.clone());
        }
        let exe = std::env::current_exe()?;
        let dir = exe
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(dir.join("output"))
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("clickbox").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.output_root.is_none());
        assert_eq!(config.ffmpeg.ffmpeg_path, "ffmpeg");
        assert_eq!(config.ffmpeg.ffprobe_path, "ffprobe");
        assert_eq!(config.out_of_range, OutOfRangePolicy::Drop);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let raw = r#"{ "out_of_range": "clamp", "ffmpeg": { "ffmpeg_path": "/opt/ffmpeg" } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.out_of_range, OutOfRangePolicy::Clamp);
        assert_eq!(config.ffmpeg.ffmpeg_path, "/opt/ffmpeg");
        assert_eq!(config.ffmpeg.ffprobe_path, "ffprobe");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("keep".parse::<OutOfRangePolicy>(), Ok(OutOfRangePolicy::Keep));
        assert_eq!("clamp".parse::<OutOfRangePolicy>(), Ok(OutOfRangePolicy::Clamp));
        assert!("sometimes".parse::<OutOfRangePolicy>().is_err());
        assert_eq!(OutOfRangePolicy::Drop.as_str(), "drop");
    }

    #[test]
    fn test_explicit_output_root_wins() {
        let config = AppConfig {
            output_root: Some(PathBuf::from("/data/sessions")),
            ..AppConfig::default()
        };
        assert_eq!(
            config.resolve_output_root().unwrap(),
            PathBuf::from("/data/sessions")
        );
    }
}
