//! Configuration loading and parsing.
//!
//! Parses `petri.toml` (or an override path provided by the binary),
//! extracting startup defaults for the engine: initial rule, run-loop
//! cadence, history ring sizing and heatmap dynamics. Raw parsed values are
//! retained separately from their clamped *effective* counterparts so a
//! future live-reload can re-clamp without re-reading the file.
//!
//! Unknown fields are ignored (TOML deserialization tolerance) so the file
//! format can grow without breaking older binaries, and a file that fails
//! to parse degrades to built-in defaults rather than refusing to start.
//! Nothing is ever written back; preference persistence belongs to the
//! Presenter.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone)]
pub struct EngineSection {
    #[serde(default = "EngineSection::default_rule")]
    pub rule: String,
    #[serde(default = "EngineSection::default_target_fps")]
    pub target_fps: f64,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            rule: Self::default_rule(),
            target_fps: Self::default_target_fps(),
        }
    }
}

impl EngineSection {
    fn default_rule() -> String {
        "B3/S23".to_string()
    }
    const fn default_target_fps() -> f64 {
        10.0
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistorySection {
    #[serde(default = "HistorySection::default_enabled")]
    pub enabled: bool,
    #[serde(default = "HistorySection::default_size")]
    pub size: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            size: Self::default_size(),
        }
    }
}

impl HistorySection {
    const fn default_enabled() -> bool {
        true
    }
    const fn default_size() -> usize {
        20
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OverlaySection {
    #[serde(default = "OverlaySection::default_heatmap_boost")]
    pub heatmap_boost: u8,
    #[serde(default = "OverlaySection::default_heatmap_decay_interval")]
    pub heatmap_decay_interval: u32,
}

impl Default for OverlaySection {
    fn default() -> Self {
        Self {
            heatmap_boost: Self::default_heatmap_boost(),
            heatmap_decay_interval: Self::default_heatmap_decay_interval(),
        }
    }
}

impl OverlaySection {
    const fn default_heatmap_boost() -> u8 {
        5
    }
    const fn default_heatmap_decay_interval() -> u32 {
        10
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub history: HistorySection,
    #[serde(default)]
    pub overlay: OverlaySection,
}

/// Parsed configuration plus clamped effective values.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub effective_fps: f64,
    pub effective_history_size: usize,
}

/// Best-effort config path: working directory `petri.toml` first, then the
/// platform config dir (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("petri.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("petri").join("petri.toml");
    }
    PathBuf::from("petri.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let mut config = if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => Config {
                raw: Some(content),
                file,
                effective_fps: 0.0,
                effective_history_size: 0,
            },
            Err(e) => {
                warn!(target: "config", path = %path.display(), error = %e, "config parse failed, using defaults");
                Config::default()
            }
        }
    } else {
        Config::default()
    };
    config.apply_clamps();
    Ok(config)
}

impl Config {
    /// Clamp raw values into the ranges the engine accepts: fps in
    /// `(0, 60]`, ring size in `[5, 100]`.
    pub fn apply_clamps(&mut self) -> (f64, usize) {
        let raw_fps = self.file.engine.target_fps;
        self.effective_fps = if raw_fps.is_finite() && raw_fps > 0.0 {
            raw_fps.min(60.0)
        } else {
            EngineSection::default_target_fps()
        };

        let raw_size = self.file.history.size;
        self.effective_history_size = raw_size.clamp(5, 100);

        if self.effective_fps != raw_fps || self.effective_history_size != raw_size {
            info!(
                target: "config",
                raw_fps,
                effective_fps = self.effective_fps,
                raw_size,
                effective_size = self.effective_history_size,
                "clamped configured values"
            );
        }
        (self.effective_fps, self.effective_history_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_str(content: &str) -> Config {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        load_from(Some(file.path().to_path_buf())).unwrap()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_from(Some(PathBuf::from("/nonexistent/petri.toml"))).unwrap();
        assert_eq!(config.file.engine.rule, "B3/S23");
        assert_eq!(config.effective_fps, 10.0);
        assert_eq!(config.effective_history_size, 20);
        assert!(config.file.history.enabled);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config = load_str("[engine]\nrule = \"B36/S23\"\n");
        assert_eq!(config.file.engine.rule, "B36/S23");
        assert_eq!(config.effective_fps, 10.0);
        assert_eq!(config.file.overlay.heatmap_boost, 5);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = load_str(
            "[engine]\ntarget_fps = 500.0\n[history]\nsize = 3\n",
        );
        assert_eq!(config.effective_fps, 60.0);
        assert_eq!(config.effective_history_size, 5);

        let config = load_str("[engine]\ntarget_fps = -2.0\n[history]\nsize = 900\n");
        assert_eq!(config.effective_fps, 10.0, "nonpositive fps falls back");
        assert_eq!(config.effective_history_size, 100);
    }

    #[test]
    fn fractional_fps_survives() {
        let config = load_str("[engine]\ntarget_fps = 0.5\n");
        assert_eq!(config.effective_fps, 0.5);
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let config = load_str("[engine]\nfuture_knob = true\n[brand_new_section]\nx = 1\n");
        assert_eq!(config.file.engine.rule, "B3/S23");
    }

    #[test]
    fn malformed_file_degrades_to_defaults() {
        let config = load_str("this is { not toml");
        assert_eq!(config.effective_fps, 10.0);
        assert!(config.raw.is_none());
    }
}
