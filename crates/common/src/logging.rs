//! Logging and tracing initialization.
//!
//! Logs go to stderr; stdout is reserved for command output such as
//! `clickbox plan --json`.

use crate::config::LoggingConfig;

/// Crate targets that receive the configured level. Everything else stays at
/// `warn`.
const CLICKBOX_TARGETS: &[&str] = &[
    "clickbox_common",
    "clickbox_session",
    "clickbox_render",
    "clickbox_cli",
];

/// Turn the configured level into an `EnvFilter` directive string.
///
/// A bare level such as `debug` applies to the clickbox crates only. Anything
/// containing `=` or `,` is already a full directive and is used verbatim.
pub fn filter_directive(config: &LoggingConfig) -> String {
    let level = config.level.trim();
    if level.is_empty() {
        return filter_directive(&LoggingConfig {
            level: LoggingConfig::default().level,
            json: config.json,
        });
    }
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }

    let mut directive = String::from("warn");
    for target in CLICKBOX_TARGETS {
        directive.push(',');
        directive.push_str(target);
        directive.push('=');
        directive.push_str(level);
    }
    directive
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level` when set. Returns `false`
/// when a subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let installed = if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    };

    if installed {
        tracing::debug!(json = config.json, level = %config.level, "Logging initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(level: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            json: false,
        }
    }

    #[test]
    fn test_bare_level_is_scoped_to_clickbox_crates() {
        let directive = filter_directive(&level("debug"));
        assert!(directive.starts_with("warn,"));
        assert!(directive.contains("clickbox_render=debug"));
        assert!(directive.contains("clickbox_cli=debug"));
        assert_eq!(directive.matches("=debug").count(), CLICKBOX_TARGETS.len());
    }

    #[test]
    fn test_full_directive_is_used_verbatim() {
        assert_eq!(
            filter_directive(&level("clickbox_render=trace,info")),
            "clickbox_render=trace,info"
        );
    }

    #[test]
    fn test_blank_level_falls_back_to_default() {
        assert_eq!(filter_directive(&level("  ")), filter_directive(&level("info")));
    }
}
