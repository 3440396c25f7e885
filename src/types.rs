// src/types.rs
use serde::{Deserialize, Serialize};
use crate::drivers::SimulationParameters;

// 单个滑块的取值范围
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64, default: f64) -> Self {
        Self { min, max, default }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() { return self.default.clamp(self.min, self.max); }
        value.clamp(self.min, self.max)
    }

    pub fn is_ordered(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

// 四个滑块：时长 / 采样率 / 心率 / 心率变异
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterBounds {
    pub duration_secs: ParamRange,
    pub sampling_rate_hz: ParamRange,
    pub heart_rate_bpm: ParamRange,
    pub hrv_std_bpm: ParamRange,
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            duration_secs: ParamRange::new(5.0, 15.0, 10.0),
            sampling_rate_hz: ParamRange::new(100.0, 1000.0, 500.0),
            heart_rate_bpm: ParamRange::new(40.0, 200.0, 80.0),
            hrv_std_bpm: ParamRange::new(0.0, 20.0, 5.0),
        }
    }
}

impl ParameterBounds {
    pub fn ranges(&self) -> [(&'static str, ParamRange); 4] {
        [
            ("duration", self.duration_secs),
            ("sampling_rate", self.sampling_rate_hz),
            ("heart_rate", self.heart_rate_bpm),
            ("heart_rate_std", self.hrv_std_bpm),
        ]
    }

    /// Slider defaults, each pulled inside its range.
    pub fn defaults(&self) -> SimulationParameters {
        self.clamp(SimulationParameters {
            duration_secs: self.duration_secs.default,
            sampling_rate_hz: self.sampling_rate_hz.default.round() as u32,
            heart_rate_bpm: self.heart_rate_bpm.default,
            hrv_std_bpm: self.hrv_std_bpm.default,
        })
    }

    pub fn clamp(&self, p: SimulationParameters) -> SimulationParameters {
        SimulationParameters {
            duration_secs: self.duration_secs.clamp(p.duration_secs),
            sampling_rate_hz: self.sampling_rate_hz.clamp(f64::from(p.sampling_rate_hz)).round() as u32,
            heart_rate_bpm: self.heart_rate_bpm.clamp(p.heart_rate_bpm),
            hrv_std_bpm: self.hrv_std_bpm.clamp(p.hrv_std_bpm),
        }
    }
}
