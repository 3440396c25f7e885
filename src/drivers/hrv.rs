//! Time-domain rhythm measures derived from detected R-peaks.
//!
//! - mean heart rate from the mean RR interval
//! - SDNN: standard deviation of RR intervals
//! - RMSSD: root mean square of successive RR differences
/// Rhythm measured from one set of R-peaks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RhythmSummary {
    pub rr_intervals_secs: Vec<f64>,
    pub mean_heart_rate_bpm: Option<f64>,
    pub sdnn_ms: Option<f64>,
    pub rmssd_ms: Option<f64>,
}
impl RhythmSummary {
    pub fn from_peaks(peaks: &[usize], sampling_rate_hz: f64) -> Self {
        let rr = rr_intervals(peaks, sampling_rate_hz);
        Self {
            mean_heart_rate_bpm: mean_heart_rate(&rr),
            sdnn_ms: sdnn(&rr).map(|s| s * 1e3),
            rmssd_ms: rmssd(&rr).map(|s| s * 1e3),
            rr_intervals_secs: rr,
        }
    }
}
/// RR intervals in seconds between consecutive peaks.
pub fn rr_intervals(peaks: &[usize], sampling_rate_hz: f64) -> Vec<f64> {
    if peaks.len() < 2 || sampling_rate_hz <= 0.0 {
        return vec![];
    }
    peaks
        .windows(2)
        .map(|w| (w[1] as f64 - w[0] as f64) / sampling_rate_hz)
        .collect()
}
pub fn mean_heart_rate(rr: &[f64]) -> Option<f64> {
    if rr.is_empty() {
        return None;
    }
    let mean_rr = rr.iter().sum::<f64>() / rr.len() as f64;
    (mean_rr > 0.0).then(|| 60.0 / mean_rr)
}
/// Sample standard deviation; needs at least two intervals.
pub fn sdnn(rr: &[f64]) -> Option<f64> {
    if rr.len() < 2 {
        return None;
    }
    let mean = rr.iter().sum::<f64>() / rr.len() as f64;
    let var = rr.iter().map(|&r| (r - mean).powi(2)).sum::<f64>() / (rr.len() - 1) as f64;
    Some(var.sqrt())
}
pub fn rmssd(rr: &[f64]) -> Option<f64> {
    if rr.len() < 2 {
        return None;
    }
    let sum_sq: f64 = rr.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();
    Some((sum_sq / (rr.len() - 1) as f64).sqrt())
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn steady_rhythm_has_no_variability() {
        let summary = RhythmSummary::from_peaks(&[100, 600, 1100, 1600], 500.0);
        assert_eq!(summary.rr_intervals_secs, vec![1.0, 1.0, 1.0]);
        assert_eq!(summary.mean_heart_rate_bpm, Some(60.0));
        assert_eq!(summary.sdnn_ms, Some(0.0));
        assert_eq!(summary.rmssd_ms, Some(0.0));
    }
    #[test]
    fn rmssd_and_sdnn_of_alternating_intervals() {
        let rr = [0.8, 1.0, 0.8, 1.0];
        let rmssd = rmssd(&rr).unwrap();
        assert!((rmssd - 0.2).abs() < 1e-12);
        let sdnn = sdnn(&rr).unwrap();
        assert!((sdnn - (0.04_f64 / 3.0).sqrt()).abs() < 1e-12);
    }
    #[test]
    fn too_few_peaks_yield_nothing() {
        let summary = RhythmSummary::from_peaks(&[42], 250.0);
        assert!(summary.rr_intervals_secs.is_empty());
        assert_eq!(summary.mean_heart_rate_bpm, None);
        assert_eq!(summary.sdnn_ms, None);
        assert!(sdnn(&[0.9]).is_none());
        assert!(rmssd(&[]).is_none());
    }
}
