//! Configuration loading and parsing.
//!
//! Defines the head-unit config schema and resolves defaults; CLI flags
//! take precedence over file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level head-unit configuration loaded from TOML.
#[derive(Debug, Default, Deserialize)]
pub struct HeadUnitConfig {
    /// Media library root directory.
    pub media_dir: Option<String>,
    /// Drive-side preference file path.
    pub prefs_path: Option<String>,
    /// Position update interval in milliseconds.
    pub tick_ms: Option<u64>,
}

impl HeadUnitConfig {
    /// Load configuration from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        let cfg = toml::from_str::<HeadUnitConfig>(&raw)
            .with_context(|| format!("parse config {:?}", path))?;
        Ok(cfg)
    }
}

/// Extract the media directory from config.
pub fn media_dir_from_config(cfg: &HeadUnitConfig) -> Result<PathBuf> {
    let dir = cfg
        .media_dir
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("media_dir is required; set it in config or pass --media-dir"))?;
    Ok(PathBuf::from(dir))
}

/// Resolve the drive-side preference file path.
///
/// Falls back to `driveside.toml` next to the config file, or in the current
/// directory when no config file is in play.
pub fn prefs_path_from_config(cfg: &HeadUnitConfig, config_path: Option<&Path>) -> PathBuf {
    if let Some(path) = cfg.prefs_path.as_deref() {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    config_path
        .and_then(Path::parent)
        .map(|dir| dir.join("driveside.toml"))
        .unwrap_or_else(|| PathBuf::from("driveside.toml"))
}

/// Position tick interval, defaulting to the session's cadence.
pub fn tick_from_config(cfg: &HeadUnitConfig) -> Duration {
    cfg.tick_ms
        .map(Duration::from_millis)
        .unwrap_or(dashtune_session::session::DEFAULT_TICK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_dir_is_required() {
        let cfg = HeadUnitConfig::default();
        assert!(media_dir_from_config(&cfg).is_err());

        let cfg = HeadUnitConfig {
            media_dir: Some("/media/usb0/music".to_string()),
            ..HeadUnitConfig::default()
        };
        assert_eq!(
            media_dir_from_config(&cfg).unwrap(),
            PathBuf::from("/media/usb0/music")
        );
    }

    #[test]
    fn prefs_path_prefers_explicit_value() {
        let cfg = HeadUnitConfig {
            prefs_path: Some("/data/driveside.toml".to_string()),
            ..HeadUnitConfig::default()
        };
        assert_eq!(
            prefs_path_from_config(&cfg, Some(Path::new("/etc/dashtune/config.toml"))),
            PathBuf::from("/data/driveside.toml")
        );
    }

    #[test]
    fn prefs_path_defaults_next_to_config() {
        let cfg = HeadUnitConfig::default();
        assert_eq!(
            prefs_path_from_config(&cfg, Some(Path::new("/etc/dashtune/config.toml"))),
            PathBuf::from("/etc/dashtune/driveside.toml")
        );
        assert_eq!(
            prefs_path_from_config(&cfg, None),
            PathBuf::from("driveside.toml")
        );
    }

    #[test]
    fn tick_defaults_when_unset() {
        let cfg = HeadUnitConfig::default();
        assert_eq!(
            tick_from_config(&cfg),
            dashtune_session::session::DEFAULT_TICK
        );

        let cfg = HeadUnitConfig {
            tick_ms: Some(250),
            ..HeadUnitConfig::default()
        };
        assert_eq!(tick_from_config(&cfg), Duration::from_millis(250));
    }

    #[test]
    fn config_parses_from_toml() {
        let cfg: HeadUnitConfig =
            toml::from_str("media_dir = \"/media/music\"\ntick_ms = 200\n").unwrap();
        assert_eq!(cfg.media_dir.as_deref(), Some("/media/music"));
        assert_eq!(cfg.tick_ms, Some(200));
        assert!(cfg.prefs_path.is_none());
    }
}
