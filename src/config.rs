// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use crate::drivers::{DetectionMethod, SynthesisMethod, MAX_FIGURE_SIDE};
use crate::types::ParameterBounds;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "ECGSCOPE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bounds: ParameterBounds,
    pub synthesis_method: SynthesisMethod,
    pub detection_method: DetectionMethod,
    pub noise_amplitude: f64,
    /// Start with the seed locked to this value.
    pub seed: Option<u64>,
    pub export: ExportConfig,
    pub reference_image: Option<ReferenceImage>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bounds: ParameterBounds::default(),
            synthesis_method: SynthesisMethod::default(),
            detection_method: DetectionMethod::default(),
            noise_amplitude: 0.01,
            seed: None,
            export: ExportConfig::default(),
            reference_image: None,
        }
    }
}

// "Save figure" 输出设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("ecg_figure.png"), width: 1200, height: 480 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceImage {
    pub path: PathBuf,
    #[serde(default)]
    pub caption: String,
}

impl AppConfig {
    /// Reads the file named by `ECGSCOPE_CONFIG`, or falls back to defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut config: AppConfig = serde_json::from_str(text).context("malformed JSON")?;
        config.validate()?;
        // 默认值超出范围时夹到边界
        let b = &mut config.bounds;
        for range in [&mut b.duration_secs, &mut b.sampling_rate_hz, &mut b.heart_rate_bpm, &mut b.hrv_std_bpm] {
            range.default = range.clamp(range.default);
        }
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, range) in self.bounds.ranges() {
            if !range.is_ordered() {
                bail!("bounds for `{name}` are not an ordered finite range");
            }
        }
        let b = &self.bounds;
        if b.duration_secs.min <= 0.0 || b.sampling_rate_hz.min < 1.0 || b.heart_rate_bpm.min <= 0.0 {
            bail!("duration, sampling rate and heart rate bounds must be positive");
        }
        if b.hrv_std_bpm.min < 0.0 {
            bail!("heart rate variability bounds must be non-negative");
        }
        if !(self.noise_amplitude.is_finite() && self.noise_amplitude >= 0.0) {
            bail!("noise_amplitude must be non-negative");
        }
        let (w, h) = (self.export.width, self.export.height);
        if w == 0 || h == 0 || w > MAX_FIGURE_SIDE || h > MAX_FIGURE_SIDE {
            bail!("export size {w}x{h} must be within 1..={MAX_FIGURE_SIDE} per side");
        }
        Ok(())
    }
}
