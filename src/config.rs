// Live settings.
//
// Every tick takes a fresh `Settings` snapshot from a `ConfigProvider`, so edits to
// the settings file show up in the running tool without a restart.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const CONFIG_ENV: &str = "SPRITEGRAB_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "spritegrab.json";

pub const MAX_VIEWPORT: u32 = 256;
pub const MAX_DIVIDER: f64 = 32.0;
pub const MAX_GRAB: u32 = 64;
pub const MAX_LOOKAHEAD: usize = 20;
pub const MAX_FPS: u32 = 60;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Screen pixels per preview pixel.
    pub scale_divider: f64,
    pub grab_width: u32,
    pub grab_height: u32,
    /// How many ticks a sample waits before it can be committed.
    pub lookahead: usize,
    pub fps: u32,
    pub record_delay_secs: f64,
    pub snap_align_x: i32,
    pub snap_align_y: i32,
    pub export_path: PathBuf,
    pub confirm_overwrite: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            viewport_width: 128,
            viewport_height: 128,
            scale_divider: 1.0,
            grab_width: 16,
            grab_height: 16,
            lookahead: 5,
            fps: 30,
            record_delay_secs: 5.0,
            snap_align_x: 0,
            snap_align_y: 0,
            export_path: PathBuf::from("./export"),
            confirm_overwrite: true,
        }
    }
}

impl Settings {
    /// Clamp every value into the range the tool can work with.
    pub fn sanitized(mut self) -> Self {
        self.viewport_width = self.viewport_width.clamp(1, MAX_VIEWPORT);
        self.viewport_height = self.viewport_height.clamp(1, MAX_VIEWPORT);
        self.scale_divider = if self.scale_divider.is_finite() {
            self.scale_divider.clamp(1.0, MAX_DIVIDER)
        } else {
            1.0
        };
        self.grab_width = self.grab_width.clamp(1, MAX_GRAB);
        self.grab_height = self.grab_height.clamp(1, MAX_GRAB);
        self.lookahead = self.lookahead.clamp(1, MAX_LOOKAHEAD);
        self.fps = self.fps.clamp(1, MAX_FPS);
        if !self.record_delay_secs.is_finite() || self.record_delay_secs < 0.0 {
            self.record_delay_secs = 0.0;
        }
        self
    }

    /// Integer step used by pixel snapping.
    pub fn snap_step(&self) -> i32 {
        (self.scale_divider as i32).max(1)
    }
}

/// Where the live settings come from.
pub trait ConfigProvider {
    /// Current values, already sanitized.
    fn snapshot(&mut self) -> Settings;

    /// Persist new values; the next snapshot returns them.
    fn store(&mut self, settings: Settings) -> Result<()>;
}

/// JSON settings file, reloaded whenever its modification time changes.
pub struct FileConfig {
    path: PathBuf,
    current: Settings,
    modified: Option<SystemTime>,
}

impl FileConfig {
    /// Path from `SPRITEGRAB_CONFIG`, else `spritegrab.json` in the working directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load the file, writing defaults first if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut cfg = Self { path, current: Settings::default(), modified: None };

        if cfg.path.exists() {
            cfg.current = read_settings(&cfg.path)?;
            cfg.modified = modified_time(&cfg.path);
        } else {
            info!("writing default settings to {}", cfg.path.display());
            cfg.store(Settings::default())?;
        }
        Ok(cfg)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn reload_if_changed(&mut self) {
        let modified = modified_time(&self.path);
        if modified.is_none() || modified == self.modified {
            return;
        }
        match read_settings(&self.path) {
            Ok(settings) => {
                debug!("reloaded settings from {}", self.path.display());
                self.current = settings;
                self.modified = modified;
            }
            // Half-written file from an editor; keep the last good values.
            Err(e) => warn!("{e}"),
        }
    }
}

impl ConfigProvider for FileConfig {
    fn snapshot(&mut self) -> Settings {
        self.reload_if_changed();
        self.current.clone().sanitized()
    }

    fn store(&mut self, settings: Settings) -> Result<()> {
        let text = serde_json::to_string_pretty(&settings).map_err(|e| Error::Config {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&self.path, text).map_err(|e| Error::Config {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        self.current = settings;
        self.modified = modified_time(&self.path);
        Ok(())
    }
}

fn read_settings(path: &Path) -> Result<Settings> {
    let text = fs::read_to_string(path).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        let mut cfg = FileConfig::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.snapshot(), Settings::default());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{ "grab_width": 32, "fps": 12 }"#).unwrap();

        let mut cfg = FileConfig::open(&path).unwrap();
        let s = cfg.snapshot();
        assert_eq!(s.grab_width, 32);
        assert_eq!(s.fps, 12);
        assert_eq!(s.viewport_width, 128);
        assert!(s.confirm_overwrite);
    }

    #[test]
    fn store_round_trips_through_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        let mut cfg = FileConfig::open(&path).unwrap();

        let mut s = cfg.snapshot();
        s.fps = 45;
        cfg.store(s).unwrap();

        let mut reopened = FileConfig::open(&path).unwrap();
        assert_eq!(reopened.snapshot().fps, 45);
    }

    #[test]
    fn fixed_file_is_picked_up_after_a_bad_edit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{ "fps": 12 }"#).unwrap();
        let mut cfg = FileConfig::open(&path).unwrap();

        // Pin the mtime so both edits look identical to the change check.
        let stamp = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        let edit = |text: &str| {
            fs::write(&path, text).unwrap();
            fs::File::options().write(true).open(&path).unwrap().set_modified(stamp).unwrap();
        };

        edit(r#"{ "fps": "#);
        assert_eq!(cfg.snapshot().fps, 12);

        edit(r#"{ "fps": 24 }"#);
        assert_eq!(cfg.snapshot().fps, 24);
    }

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let s = Settings {
            viewport_width: 0,
            scale_divider: 100.0,
            grab_height: 500,
            lookahead: 0,
            fps: 0,
            record_delay_secs: -3.0,
            ..Settings::default()
        }
        .sanitized();

        assert_eq!(s.viewport_width, 1);
        assert_eq!(s.scale_divider, MAX_DIVIDER);
        assert_eq!(s.grab_height, MAX_GRAB);
        assert_eq!(s.lookahead, 1);
        assert_eq!(s.fps, 1);
        assert_eq!(s.record_delay_secs, 0.0);
    }

    #[test]
    fn snap_step_truncates_fractional_divider() {
        let s = Settings { scale_divider: 2.7, ..Settings::default() };
        assert_eq!(s.snap_step(), 2);
    }
}
