// ── Bootstrap configuration ───────────────────────────────────────────────────
//
// Optional JSON file named by `BLOCKFORGE_CONFIG`; every field has a default,
// so an absent variable simply means "all defaults".  `BLOCKFORGE_VIDEO_DRIVER`
// overrides the driver choice.
// No `unsafe` — pure safe Rust + serde_json.

use std::{ffi::OsString, fs, path::Path};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging;

/// Environment variable holding the config file path.
pub(crate) const CONFIG_ENV: &str = "BLOCKFORGE_CONFIG";

/// Environment variable selecting the video driver.
pub(crate) const DRIVER_ENV: &str = "BLOCKFORGE_VIDEO_DRIVER";

/// Largest accepted window width or height, in logical units.
pub(crate) const MAX_WINDOW_EXTENT: i32 = 16384;

// ── Types ─────────────────────────────────────────────────────────────────────

/// Which `WindowSystem` backs the bootstrap window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum VideoDriver {
    /// Win32 windows with per-monitor DPI awareness.
    Native,
    /// In-memory windows; no display server needed.
    Headless,
}

impl VideoDriver {
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "native" | "win32" | "windows" => Some(Self::Native),
            "headless" | "dummy" => Some(Self::Headless),
            _ => None,
        }
    }
}

/// Root of the JSON config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct BootstrapConfig {
    pub(crate) window_title: String,
    /// Logical client width.
    pub(crate) window_width: i32,
    /// Logical client height.
    pub(crate) window_height: i32,
    /// How long the event loop runs before shutting down on its own.
    pub(crate) run_time_ms: u64,
    /// Sleep between event-poll passes.
    pub(crate) poll_interval_ms: u64,
    /// `trace`, `debug`, `info`, `warning`, `error`, `critical` or `off`.
    pub(crate) log_level: String,
    pub(crate) video_driver: VideoDriver,
    /// Pixels per logical unit for headless windows.
    pub(crate) headless_scale: f32,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            window_title: "Blockforge Prototype".to_owned(),
            window_width: 1280,
            window_height: 720,
            run_time_ms: 2000,
            poll_interval_ms: 16,
            log_level: "info".to_owned(),
            video_driver: VideoDriver::Headless,
            headless_scale: 1.0,
        }
    }
}

impl BootstrapConfig {
    /// Parse and validate a config document; `origin` names it in errors.
    pub(crate) fn from_json(json: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: origin.to_owned(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse the file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let origin = path.display().to_string();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: origin.clone(),
            source,
        })?;
        Self::from_json(&json, &origin)
    }

    /// Load from `BLOCKFORGE_CONFIG` (or defaults), then apply
    /// `BLOCKFORGE_VIDEO_DRIVER`.
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    /// `from_env` with variables read through `lookup`.
    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<OsString>,
    ) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        if let Some(name) = lookup(DRIVER_ENV) {
            let name = name.to_string_lossy();
            config.apply_driver_override(&name)?;
        }
        Ok(config)
    }

    fn apply_driver_override(&mut self, name: &str) -> Result<(), ConfigError> {
        self.video_driver = VideoDriver::parse(name).ok_or_else(|| ConfigError::InvalidValue {
            field: "video_driver",
            reason: format!("unknown driver {name:?}"),
        })?;
        Ok(())
    }

    /// The configured level as a `log` filter.
    pub(crate) fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        logging::parse_level(&self.log_level).ok_or_else(|| ConfigError::InvalidValue {
            field: "log_level",
            reason: format!("unknown level {:?}", self.log_level),
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_WINDOW_EXTENT).contains(&self.window_width) {
            return Err(ConfigError::InvalidValue {
                field: "window_width",
                reason: format!(
                    "{} is outside 1..={MAX_WINDOW_EXTENT}",
                    self.window_width
                ),
            });
        }
        if !(1..=MAX_WINDOW_EXTENT).contains(&self.window_height) {
            return Err(ConfigError::InvalidValue {
                field: "window_height",
                reason: format!(
                    "{} is outside 1..={MAX_WINDOW_EXTENT}",
                    self.window_height
                ),
            });
        }
        if !self.headless_scale.is_finite() || self.headless_scale < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "headless_scale",
                reason: format!("{} is not a finite value >= 1.0", self.headless_scale),
            });
        }
        self.level_filter()?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = BootstrapConfig::from_json("{}", "inline").expect("parse");
        assert_eq!(config, BootstrapConfig::default());
        assert_eq!(config.video_driver, VideoDriver::Headless);
        assert_eq!(config.run_time_ms, 2000);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let json = r#"{"window_width":1920,"video_driver":"native","headless_scale":2.0}"#;
        let config = BootstrapConfig::from_json(json, "inline").expect("parse");
        assert_eq!(config.window_width, 1920);
        assert_eq!(config.window_height, 720);
        assert_eq!(config.video_driver, VideoDriver::Native);
        assert_eq!(config.headless_scale, 2.0);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = BootstrapConfig::from_json("{", "bad.json").expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == "bad.json"));
    }

    #[test]
    fn non_positive_size_is_rejected() {
        let err = BootstrapConfig::from_json(r#"{"window_height":0}"#, "inline")
            .expect_err("must fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "window_height",
                ..
            }
        ));
    }

    #[test]
    fn unknown_level_is_rejected() {
        let err = BootstrapConfig::from_json(r#"{"log_level":"loud"}"#, "inline")
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidValue { field: "log_level", .. }));
    }

    #[test]
    fn sub_unit_scale_is_rejected() {
        let err = BootstrapConfig::from_json(r#"{"headless_scale":0.5}"#, "inline")
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidValue { field: "headless_scale", .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = BootstrapConfig::load(Path::new("/nonexistent/blockforge.json"))
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn driver_override_accepts_aliases() {
        let mut config = BootstrapConfig::default();
        config.apply_driver_override("Win32").expect("alias");
        assert_eq!(config.video_driver, VideoDriver::Native);
        config.apply_driver_override("dummy").expect("alias");
        assert_eq!(config.video_driver, VideoDriver::Headless);
        assert!(config.apply_driver_override("x11").is_err());
    }

    #[test]
    fn oversized_window_is_rejected() {
        let json = format!(r#"{{"window_width":{}}}"#, MAX_WINDOW_EXTENT + 1);
        let err = BootstrapConfig::from_json(&json, "inline").expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidValue { field: "window_width", .. }));

        let json = format!(r#"{{"window_height":{MAX_WINDOW_EXTENT}}}"#);
        let config = BootstrapConfig::from_json(&json, "inline").expect("upper bound");
        assert_eq!(config.window_height, MAX_WINDOW_EXTENT);
    }

    fn write_temp_config(name: &str, json: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "blockforge-{}-{name}.json",
            std::process::id()
        ));
        fs::write(&path, json).expect("write temp config");
        path
    }

    fn vars(pairs: &[(&str, OsString)]) -> impl Fn(&str) -> Option<OsString> {
        let pairs: Vec<(String, OsString)> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect();
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn no_variables_means_defaults() {
        let config = BootstrapConfig::from_lookup(vars(&[])).expect("defaults");
        assert_eq!(config, BootstrapConfig::default());
    }

    #[test]
    fn config_variable_names_the_file() {
        let path = write_temp_config("load", r#"{"window_width":1024,"run_time_ms":50}"#);
        let config = BootstrapConfig::from_lookup(vars(&[(CONFIG_ENV, path.clone().into())]))
            .expect("load");
        let _ = fs::remove_file(&path);
        assert_eq!(config.window_width, 1024);
        assert_eq!(config.run_time_ms, 50);
    }

    #[test]
    fn unreadable_config_file_is_fatal() {
        let missing = OsString::from("/nonexistent/blockforge.json");
        let err = BootstrapConfig::from_lookup(vars(&[(CONFIG_ENV, missing)]))
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::Io { ref path, .. } if path.contains("nonexistent")));
    }

    #[test]
    fn driver_variable_overrides_the_file() {
        let path = write_temp_config("driver", r#"{"video_driver":"native"}"#);
        let config = BootstrapConfig::from_lookup(vars(&[
            (CONFIG_ENV, path.clone().into()),
            (DRIVER_ENV, OsString::from("HEADLESS")),
        ]))
        .expect("load");
        let _ = fs::remove_file(&path);
        assert_eq!(config.video_driver, VideoDriver::Headless);
    }

    #[test]
    fn unknown_driver_variable_is_rejected() {
        let err = BootstrapConfig::from_lookup(vars(&[(DRIVER_ENV, OsString::from("x11"))]))
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidValue { field: "video_driver", .. }));
    }
}
