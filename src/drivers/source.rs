use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::drivers::EcgError;
/// The four user-facing knobs of one simulation pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub duration_secs: f64,
    pub sampling_rate_hz: u32,
    pub heart_rate_bpm: f64,
    /// Standard deviation of the heart rate, in BPM.
    pub hrv_std_bpm: f64,
}
impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            duration_secs: 10.0,
            sampling_rate_hz: 500,
            heart_rate_bpm: 80.0,
            hrv_std_bpm: 5.0,
        }
    }
}
impl SimulationParameters {
    pub fn validate(&self) -> Result<(), EcgError> {
        if self.sampling_rate_hz == 0 {
            return Err(EcgError::invalid(
                "sampling_rate",
                "sampling rate must be greater than zero",
            ));
        }
        if !(self.duration_secs.is_finite() && self.duration_secs > 0.0) {
            return Err(EcgError::invalid(
                "duration",
                format!("duration must be positive, got {}", self.duration_secs),
            ));
        }
        if !(self.heart_rate_bpm.is_finite() && self.heart_rate_bpm > 0.0) {
            return Err(EcgError::invalid(
                "heart_rate",
                format!("heart rate must be positive, got {}", self.heart_rate_bpm),
            ));
        }
        if !(self.hrv_std_bpm.is_finite() && self.hrv_std_bpm >= 0.0) {
            return Err(EcgError::invalid(
                "heart_rate_std",
                format!("variability must be non-negative, got {}", self.hrv_std_bpm),
            ));
        }
        Ok(())
    }
    pub fn sampling_rate(&self) -> f64 {
        f64::from(self.sampling_rate_hz)
    }
    /// Number of samples a waveform for these parameters must contain.
    pub fn sample_count(&self) -> usize {
        (self.duration_secs * self.sampling_rate()).round() as usize
    }
}
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SynthesisMethod {
    /// McSharry dynamical model.
    #[default]
    EcgSyn,
    /// Repeated Gaussian PQRST template.
    Simple,
}
impl SynthesisMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SynthesisMethod::EcgSyn => "ecgsyn",
            SynthesisMethod::Simple => "simple",
        }
    }
}
impl fmt::Display for SynthesisMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
impl FromStr for SynthesisMethod {
    type Err = EcgError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ecgsyn" | "mcsharry" => Ok(SynthesisMethod::EcgSyn),
            "simple" | "gaussian" => Ok(SynthesisMethod::Simple),
            other => Err(EcgError::invalid(
                "method",
                format!("unrecognized synthesis method `{other}`"),
            )),
        }
    }
}
impl TryFrom<String> for SynthesisMethod {
    type Error = EcgError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
impl From<SynthesisMethod> for String {
    fn from(method: SynthesisMethod) -> Self {
        method.as_str().to_owned()
    }
}
/// Everything a synthesizer needs for one waveform.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesisRequest {
    pub params: SimulationParameters,
    pub method: SynthesisMethod,
    /// `None` draws a fresh seed from OS entropy.
    pub seed: Option<u64>,
    /// Noise scale relative to the clean signal's standard deviation.
    pub noise_amplitude: f64,
}
impl SynthesisRequest {
    pub fn new(params: SimulationParameters) -> Self {
        Self {
            params,
            method: SynthesisMethod::default(),
            seed: None,
            noise_amplitude: 0.01,
        }
    }
    pub fn with_method(mut self, method: SynthesisMethod) -> Self {
        self.method = method;
        self
    }
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
    pub fn with_noise(mut self, noise_amplitude: f64) -> Self {
        self.noise_amplitude = noise_amplitude;
        self
    }
    pub fn validate(&self) -> Result<(), EcgError> {
        self.params.validate()?;
        if !(self.noise_amplitude.is_finite() && self.noise_amplitude >= 0.0) {
            return Err(EcgError::invalid(
                "noise",
                format!("noise amplitude must be non-negative, got {}", self.noise_amplitude),
            ));
        }
        Ok(())
    }
}
/// Anything that can turn simulation parameters into a sampled ECG trace.
pub trait SignalSynthesizer {
    fn synthesize(&mut self, request: &SynthesisRequest) -> Result<Vec<f64>, EcgError>;
    /// Seed behind the most recent waveform, when the synthesizer is seeded.
    fn last_seed(&self) -> Option<u64> {
        None
    }
}
/// In-memory synthesizer useful for tests and deterministic playback.
pub struct ManualSynthesizer {
    queue: VecDeque<Vec<f64>>,
}
impl ManualSynthesizer {
    pub fn new(waveforms: impl IntoIterator<Item = Vec<f64>>) -> Self {
        Self {
            queue: waveforms.into_iter().collect(),
        }
    }
}
impl SignalSynthesizer for ManualSynthesizer {
    fn synthesize(&mut self, request: &SynthesisRequest) -> Result<Vec<f64>, EcgError> {
        request.validate()?;
        self.queue
            .pop_front()
            .ok_or_else(|| EcgError::invalid("waveform", "no fixture waveform left"))
    }
}
