use crate::drivers::detector::DetectionOutcome;
use crate::drivers::source::SimulationParameters;
/// Whether a frame carries enough beats for rhythm measures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetectionStatus {
    #[default]
    Ok,
    /// Fewer than two R-peaks were found.
    Degenerate,
}
/// One simulate-and-detect pass, ready to plot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EcgFrame {
    pub params: SimulationParameters,
    /// Seed that reproduces `waveform`, when the synthesizer reports one.
    pub seed: Option<u64>,
    pub waveform: Vec<f64>,
    /// Seconds, one entry per waveform sample.
    pub time: Vec<f64>,
    pub detection: DetectionOutcome,
    pub status: DetectionStatus,
}
impl EcgFrame {
    pub fn r_peaks(&self) -> &[usize] {
        &self.detection.r_peaks
    }
    pub fn duration_seconds(&self) -> f64 {
        self.time.last().copied().unwrap_or(0.0)
    }
    /// (time, amplitude) pairs of the full trace.
    pub fn signal_points(&self) -> Vec<[f64; 2]> {
        self.time
            .iter()
            .zip(&self.waveform)
            .map(|(&t, &v)| [t, v])
            .collect()
    }
    /// (time, amplitude) pairs at each detected R-peak.
    pub fn peak_points(&self) -> Vec<[f64; 2]> {
        self.detection
            .r_peaks
            .iter()
            .filter_map(|&i| Some([*self.time.get(i)?, *self.waveform.get(i)?]))
            .collect()
    }
}
/// `n` evenly spaced instants from 0 to `duration_secs`, both ends included.
pub fn time_axis(n: usize, duration_secs: f64) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let step = duration_secs / (n - 1) as f64;
            let mut axis: Vec<f64> = (0..n).map(|i| i as f64 * step).collect();
            axis[n - 1] = duration_secs;
            axis
        }
    }
}
