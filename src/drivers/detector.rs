use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::drivers::filter::{moving_average_filtfilt, FilterChain, FilterKind};
use crate::drivers::hrv::RhythmSummary;
use crate::drivers::EcgError;
const BASELINE_CUTOFF_HZ: f64 = 0.5;
const BASELINE_ORDER: usize = 5;
const POWERLINE_HZ: f64 = 50.0;
/// Processed signals plus the detected beats.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectionOutcome {
    /// Baseline- and power-line-filtered copy of the input, same length.
    pub cleaned: Vec<f64>,
    /// Strictly increasing R-peak sample indices.
    pub r_peaks: Vec<usize>,
    pub rhythm: RhythmSummary,
}
impl DetectionOutcome {
    /// Fewer than two beats: no rhythm can be measured.
    pub fn is_degenerate(&self) -> bool {
        self.r_peaks.len() < 2
    }
}
/// Anything that can locate R-peaks in a sampled ECG trace.
pub trait PeakDetector {
    fn detect(&mut self, signal: &[f64], sampling_rate_hz: f64)
        -> Result<DetectionOutcome, EcgError>;
}
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DetectionMethod {
    /// Gradient-envelope QRS regions, prominence-picked maxima.
    #[default]
    NeuroKit,
    /// Band-pass, derivative, squaring, integration, adaptive threshold.
    PanTompkins,
}
impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::NeuroKit => "neurokit",
            DetectionMethod::PanTompkins => "pantompkins",
        }
    }
}
impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
impl FromStr for DetectionMethod {
    type Err = EcgError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neurokit" => Ok(DetectionMethod::NeuroKit),
            "pantompkins" | "pan-tompkins" => Ok(DetectionMethod::PanTompkins),
            other => Err(EcgError::invalid(
                "detection_method",
                format!("unrecognized detection method `{other}`"),
            )),
        }
    }
}
impl TryFrom<String> for DetectionMethod {
    type Error = EcgError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
impl From<DetectionMethod> for String {
    fn from(method: DetectionMethod) -> Self {
        method.as_str().to_owned()
    }
}
/// Built-in detector: cleans the trace, then runs the configured method.
#[derive(Clone, Copy, Debug, Default)]
pub struct EcgDetector {
    method: DetectionMethod,
}
impl EcgDetector {
    pub fn new(method: DetectionMethod) -> Self {
        Self { method }
    }
    pub fn set_method(&mut self, method: DetectionMethod) {
        self.method = method;
    }
}
impl PeakDetector for EcgDetector {
    fn detect(
        &mut self,
        signal: &[f64],
        sampling_rate_hz: f64,
    ) -> Result<DetectionOutcome, EcgError> {
        if !(sampling_rate_hz.is_finite() && sampling_rate_hz > 0.0) {
            return Err(EcgError::invalid(
                "sampling_rate",
                format!("sampling rate must be positive, got {sampling_rate_hz}"),
            ));
        }
        let cleaned = clean(signal, sampling_rate_hz);
        let r_peaks = match self.method {
            DetectionMethod::NeuroKit => neurokit_peaks(&cleaned, sampling_rate_hz),
            DetectionMethod::PanTompkins => pan_tompkins_peaks(&cleaned, sampling_rate_hz),
        };
        let rhythm = RhythmSummary::from_peaks(&r_peaks, sampling_rate_hz);
        Ok(DetectionOutcome {
            cleaned,
            r_peaks,
            rhythm,
        })
    }
}
/// Replays fixed peak sets; the cleaned signal is the input unchanged.
pub struct ManualDetector {
    queue: VecDeque<Vec<usize>>,
}
impl ManualDetector {
    pub fn new(peak_sets: impl IntoIterator<Item = Vec<usize>>) -> Self {
        Self {
            queue: peak_sets.into_iter().collect(),
        }
    }
}
impl PeakDetector for ManualDetector {
    fn detect(
        &mut self,
        signal: &[f64],
        sampling_rate_hz: f64,
    ) -> Result<DetectionOutcome, EcgError> {
        let r_peaks = self.queue.pop_front().unwrap_or_default();
        Ok(DetectionOutcome {
            cleaned: signal.to_vec(),
            rhythm: RhythmSummary::from_peaks(&r_peaks, sampling_rate_hz),
            r_peaks,
        })
    }
}
/// 0.5 Hz high-pass for baseline wander, then a mains-period moving average.
pub fn clean(signal: &[f64], sampling_rate_hz: f64) -> Vec<f64> {
    let baseline = FilterChain::from_kinds(
        sampling_rate_hz,
        &[FilterKind::Highpass {
            cutoff_hz: BASELINE_CUTOFF_HZ,
            order: BASELINE_ORDER,
        }],
    );
    let cleaned = baseline.filtfilt(signal);
    if sampling_rate_hz >= 100.0 {
        moving_average_filtfilt(&cleaned, (sampling_rate_hz / POWERLINE_HZ) as usize)
    } else {
        cleaned
    }
}
fn neurokit_peaks(signal: &[f64], sampling_rate_hz: f64) -> Vec<usize> {
    const SMOOTH_WINDOW_SECS: f64 = 0.1;
    const AVG_WINDOW_SECS: f64 = 0.75;
    const GRAD_THRESHOLD_WEIGHT: f64 = 1.5;
    const MIN_LEN_WEIGHT: f64 = 0.4;
    // at low rates the R sample can sit just outside the gradient region
    const SEARCH_MARGIN_SECS: f64 = 0.02;
    if signal.len() < 3 {
        return vec![];
    }
    let abs_grad: Vec<f64> = gradient(signal).iter().map(|g| g.abs()).collect();
    let smooth_grad = boxcar_smooth(&abs_grad, seconds_to_samples(SMOOTH_WINDOW_SECS, sampling_rate_hz));
    if smooth_grad.iter().all(|g| *g <= f64::EPSILON) {
        return vec![];
    }
    let avg_grad = boxcar_smooth(&smooth_grad, seconds_to_samples(AVG_WINDOW_SECS, sampling_rate_hz));
    let qrs: Vec<bool> = smooth_grad
        .iter()
        .zip(&avg_grad)
        .map(|(s, a)| *s > GRAD_THRESHOLD_WEIGHT * a)
        .collect();
    let beg_qrs: Vec<usize> = qrs
        .windows(2)
        .enumerate()
        .filter(|(_, w)| !w[0] && w[1])
        .map(|(i, _)| i)
        .collect();
    let Some(&first_beg) = beg_qrs.first() else {
        return vec![];
    };
    let end_qrs: Vec<usize> = qrs
        .windows(2)
        .enumerate()
        .filter(|(i, w)| w[0] && !w[1] && *i > first_beg)
        .map(|(i, _)| i)
        .collect();
    let regions: Vec<(usize, usize)> = beg_qrs.into_iter().zip(end_qrs).collect();
    if regions.is_empty() {
        return vec![];
    }
    let mean_len =
        regions.iter().map(|(b, e)| (e - b) as f64).sum::<f64>() / regions.len() as f64;
    let min_len = mean_len * MIN_LEN_WEIGHT;
    let regions: Vec<(usize, usize)> = regions
        .into_iter()
        .filter(|(b, e)| (e - b) as f64 >= min_len)
        .collect();
    let starts: Vec<usize> = regions.iter().map(|(b, _)| *b).collect();
    let min_delay = min_beat_spacing(&starts, sampling_rate_hz);
    let reach = seconds_to_samples(SEARCH_MARGIN_SECS, sampling_rate_hz);
    let mut peaks: Vec<usize> = Vec::new();
    for (beg, end) in regions {
        let lo = beg.saturating_sub(reach);
        let hi = (end + reach + 1).min(signal.len());
        let Some(offset) = most_prominent_peak(&signal[lo..hi]) else {
            continue;
        };
        let peak = lo + offset;
        if peaks.last().map_or(true, |&last| peak >= last + min_delay) {
            peaks.push(peak);
        }
    }
    peaks
}
/// Shortest accepted beat spacing: half the median QRS-region spacing, kept within
/// 150..300 ms so fast rhythms keep every beat and slow ones still reject T waves.
fn min_beat_spacing(region_starts: &[usize], sampling_rate_hz: f64) -> usize {
    const MAX_DELAY_SECS: f64 = 0.3;
    const MIN_DELAY_SECS: f64 = 0.15;
    let ceiling = MAX_DELAY_SECS * sampling_rate_hz;
    let floor = MIN_DELAY_SECS * sampling_rate_hz;
    let mut gaps: Vec<usize> = region_starts.windows(2).map(|w| w[1] - w[0]).collect();
    if gaps.is_empty() {
        return (ceiling.round() as usize).max(1);
    }
    gaps.sort_unstable();
    let median = gaps[gaps.len() / 2] as f64;
    ((0.5 * median).clamp(floor, ceiling).round() as usize).max(1)
}
/// One integrator maximum mapped back onto the trace.
#[derive(Clone, Copy, Debug)]
struct QrsCandidate {
    /// R-peak index in the cleaned signal.
    r: usize,
    /// Integrator value at the maximum.
    energy: f64,
    /// Squared slope at the steepest point of the complex.
    slope: f64,
}
/// Running signal and noise levels (SPKI / NPKI).
#[derive(Clone, Copy, Debug)]
struct PeakLevels {
    signal: f64,
    noise: f64,
}
impl PeakLevels {
    fn threshold(&self) -> f64 {
        self.noise + 0.25 * (self.signal - self.noise)
    }
    fn update_signal(&mut self, energy: f64, weight: f64) {
        self.signal = weight * energy + (1.0 - weight) * self.signal;
    }
    fn update_noise(&mut self, energy: f64) {
        self.noise = 0.125 * energy + 0.875 * self.noise;
    }
}
struct BeatTracker {
    levels: PeakLevels,
    beats: Vec<QrsCandidate>,
    /// Last eight RR intervals, in samples.
    rr: VecDeque<usize>,
    /// Sub-threshold candidates since the last beat, kept for search-back.
    pending: Vec<QrsCandidate>,
    refractory: usize,
}
impl BeatTracker {
    const RR_HISTORY: usize = 8;
    const MISSED_BEAT_RR: f64 = 1.66;
    fn last_r(&self) -> Option<usize> {
        self.beats.last().map(|b| b.r)
    }
    fn accept(&mut self, beat: QrsCandidate) {
        if let Some(last) = self.last_r() {
            if self.rr.len() == Self::RR_HISTORY {
                self.rr.pop_front();
            }
            self.rr.push_back(beat.r - last);
        }
        self.beats.push(beat);
    }
    /// A candidate within `window` of the last beat with under half its slope.
    fn is_t_wave(&self, candidate: &QrsCandidate, window: usize) -> bool {
        self.beats.last().map_or(false, |last| {
            candidate.r - last.r < window && candidate.slope < 0.25 * last.slope
        })
    }
    /// While the gap since the last beat exceeds 1.66 mean RR, promote the strongest
    /// pending candidate above half the threshold.
    fn search_back(&mut self, now: usize) {
        loop {
            let Some(last) = self.last_r() else {
                return;
            };
            if self.rr.is_empty() {
                return;
            }
            let rr_mean = self.rr.iter().sum::<usize>() as f64 / self.rr.len() as f64;
            if (now.saturating_sub(last) as f64) <= Self::MISSED_BEAT_RR * rr_mean {
                return;
            }
            let floor = 0.5 * self.levels.threshold();
            let earliest = last + self.refractory;
            let Some(best) = self
                .pending
                .iter()
                .filter(|c| c.r >= earliest && c.energy > floor)
                .copied()
                .max_by(|a, b| a.energy.total_cmp(&b.energy))
            else {
                return;
            };
            self.levels.update_signal(best.energy, 0.25);
            self.accept(best);
            self.pending.retain(|c| c.r > best.r);
        }
    }
}
fn pan_tompkins_peaks(signal: &[f64], sampling_rate_hz: f64) -> Vec<usize> {
    const EDGE_SECS: f64 = 0.25;
    const TRAINING_SECS: f64 = 4.0;
    const INTEGRATION_SECS: f64 = 0.15;
    const REFRACTORY_SECS: f64 = 0.2;
    const T_WAVE_SECS: f64 = 0.36;
    const R_SEARCH_SECS: f64 = 0.05;
    let n = signal.len();
    // filter transients at both ends are never candidates
    let edge = seconds_to_samples(EDGE_SECS, sampling_rate_hz);
    if n <= 2 * edge + 4 {
        return vec![];
    }
    let band = FilterChain::from_kinds(
        sampling_rate_hz,
        &[FilterKind::Bandpass {
            low_hz: 5.0,
            high_hz: 15.0,
            order: 2,
        }],
    );
    let bp = band.filtfilt(signal);
    // five-point derivative, squared
    let mut squared = vec![0.0; n];
    for i in 2..n - 2 {
        let d = (-bp[i - 2] - 2.0 * bp[i - 1] + 2.0 * bp[i + 1] + bp[i + 2]) * sampling_rate_hz / 8.0;
        squared[i] = d * d;
    }
    let window = seconds_to_samples(INTEGRATION_SECS, sampling_rate_hz);
    let mwi = boxcar_smooth(&squared, window);
    let half = window / 2;
    let r_reach = seconds_to_samples(R_SEARCH_SECS, sampling_rate_hz);
    let locate = |i: usize| {
        let lo = i.saturating_sub(half);
        let steepest = lo + argmax(&squared[lo..=(i + half).min(n - 1)]);
        let lo = steepest.saturating_sub(r_reach);
        let r = lo + argmax(&signal[lo..=(steepest + r_reach).min(n - 1)]);
        QrsCandidate {
            r,
            energy: mwi[i],
            slope: squared[steepest],
        }
    };
    let train_end = (edge + seconds_to_samples(TRAINING_SECS, sampling_rate_hz)).min(n - edge);
    let training = &mwi[edge..train_end];
    let peak = training.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mean = training.iter().sum::<f64>() / training.len() as f64;
    let refractory = seconds_to_samples(REFRACTORY_SECS, sampling_rate_hz);
    let t_wave = seconds_to_samples(T_WAVE_SECS, sampling_rate_hz);
    let mut tracker = BeatTracker {
        levels: PeakLevels {
            signal: peak / 3.0,
            noise: mean / 2.0,
        },
        beats: Vec::new(),
        rr: VecDeque::with_capacity(BeatTracker::RR_HISTORY),
        pending: Vec::new(),
        refractory,
    };
    for i in edge..n - edge {
        if !(mwi[i] > mwi[i - 1] && mwi[i] >= mwi[i + 1]) {
            continue;
        }
        let candidate = locate(i);
        tracker.search_back(candidate.r);
        if tracker.last_r().map_or(false, |last| candidate.r < last + refractory) {
            continue;
        }
        if candidate.r == 0 || candidate.r == n - 1 {
            continue;
        }
        if candidate.energy > tracker.levels.threshold() {
            if tracker.is_t_wave(&candidate, t_wave) {
                tracker.levels.update_noise(candidate.energy);
                continue;
            }
            tracker.levels.update_signal(candidate.energy, 0.125);
            tracker.accept(candidate);
            tracker.pending.clear();
        } else {
            tracker.levels.update_noise(candidate.energy);
            tracker.pending.push(candidate);
        }
    }
    tracker.search_back(n - edge);
    tracker.beats.iter().map(|b| b.r).collect()
}
fn seconds_to_samples(secs: f64, sampling_rate_hz: f64) -> usize {
    ((secs * sampling_rate_hz).round() as usize).max(1)
}
/// Central differences inside, one-sided at the ends.
fn gradient(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    (0..n)
        .map(|i| {
            if i == 0 {
                signal[1] - signal[0]
            } else if i == n - 1 {
                signal[n - 1] - signal[n - 2]
            } else {
                (signal[i + 1] - signal[i - 1]) / 2.0
            }
        })
        .collect()
}
/// Centered boxcar average, ends padded with the edge values.
fn boxcar_smooth(signal: &[f64], size: usize) -> Vec<f64> {
    let n = signal.len();
    if n == 0 || size <= 1 {
        return signal.to_vec();
    }
    let left = (size / 2) as isize;
    let right = (size - 1) as isize - left;
    let last = n as isize - 1;
    let at = |j: isize| signal[j.clamp(0, last) as usize];
    let mut sum: f64 = (-left..=right).map(at).sum();
    let mut out = Vec::with_capacity(n);
    out.push(sum / size as f64);
    for i in 1..n as isize {
        sum += at(i + right) - at(i - 1 - left);
        out.push(sum / size as f64);
    }
    out
}
fn argmax(data: &[f64]) -> usize {
    data.iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
        .0
}
/// Index of the interior local maximum with the largest topographic prominence.
fn most_prominent_peak(data: &[f64]) -> Option<usize> {
    local_maxima(data)
        .into_iter()
        .map(|p| (p, prominence(data, p)))
        .fold(None, |best: Option<(usize, f64)>, (p, prom)| match best {
            Some((_, b)) if b >= prom => best,
            _ => Some((p, prom)),
        })
        .map(|(p, _)| p)
}
/// Interior maxima; a flat top counts once, at its middle.
fn local_maxima(data: &[f64]) -> Vec<usize> {
    let m = data.len();
    let mut peaks = Vec::new();
    let mut i = 1;
    while i + 1 < m {
        if data[i - 1] < data[i] {
            let mut j = i;
            while j + 1 < m && data[j + 1] == data[i] {
                j += 1;
            }
            if j + 1 < m && data[j + 1] < data[i] {
                peaks.push((i + j) / 2);
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }
    peaks
}
fn prominence(data: &[f64], peak: usize) -> f64 {
    let height = data[peak];
    let mut left_min = height;
    for &v in data[..peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }
    let mut right_min = height;
    for &v in &data[peak + 1..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }
    height - left_min.max(right_min)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ecgsyn::EcgSynthesizer;
    use crate::drivers::source::{SignalSynthesizer, SimulationParameters, SynthesisRequest};
    const RATE: f64 = 500.0;
    /// Narrow Gaussian "R waves" every 0.75 s from 0.5 s to 9.5 s (13 beats).
    fn pulse_train() -> (Vec<f64>, Vec<usize>) {
        let centers: Vec<usize> = (0..13).map(|k| 250 + 375 * k).collect();
        let signal = (0..5000)
            .map(|i| {
                centers
                    .iter()
                    .map(|&c| {
                        let x = (i as f64 - c as f64) / 5.0;
                        (-0.5 * x * x).exp()
                    })
                    .sum::<f64>()
            })
            .collect();
        (signal, centers)
    }
    fn assert_matches_truth(found: &[usize], truth: &[usize]) {
        assert_eq!(found.len(), truth.len(), "found {found:?}");
        for (f, t) in found.iter().zip(truth) {
            assert!(f.abs_diff(*t) <= 3, "peak {f} too far from {t}");
        }
    }
    #[test]
    fn neurokit_finds_every_pulse() {
        let (signal, truth) = pulse_train();
        let outcome = EcgDetector::default().detect(&signal, RATE).unwrap();
        assert_eq!(outcome.cleaned.len(), signal.len());
        assert_matches_truth(&outcome.r_peaks, &truth);
        let bpm = outcome.rhythm.mean_heart_rate_bpm.unwrap();
        assert!((bpm - 80.0).abs() < 1.0);
        assert!(!outcome.is_degenerate());
    }
    #[test]
    fn pan_tompkins_finds_every_pulse() {
        let (signal, truth) = pulse_train();
        let outcome = EcgDetector::new(DetectionMethod::PanTompkins)
            .detect(&signal, RATE)
            .unwrap();
        assert_matches_truth(&outcome.r_peaks, &truth);
    }
    /// Same train with the seventh R wave scaled down to `amplitude`.
    fn pulse_train_with_weak_beat(amplitude: f64) -> Vec<f64> {
        let (mut signal, centers) = pulse_train();
        let weak = centers[6];
        for (i, v) in signal.iter_mut().enumerate() {
            let x = (i as f64 - weak as f64) / 5.0;
            *v -= (1.0 - amplitude) * (-0.5 * x * x).exp();
        }
        signal
    }
    fn synthetic_trace(bpm: f64, hrv: f64) -> Vec<f64> {
        let request = SynthesisRequest::new(SimulationParameters {
            duration_secs: 5.0,
            sampling_rate_hz: 500,
            heart_rate_bpm: bpm,
            hrv_std_bpm: hrv,
        })
        .with_seed(Some(42));
        EcgSynthesizer::new().synthesize(&request).unwrap()
    }
    #[test]
    fn neurokit_keeps_every_beat_at_200_bpm() {
        // 0.3 s spacing exactly: a fixed 300 ms delay would drop every other beat
        let signal = synthetic_trace(200.0, 0.0);
        let outcome = EcgDetector::default().detect(&signal, RATE).unwrap();
        let n = outcome.r_peaks.len();
        assert!((14..=20).contains(&n), "found {n} peaks");
        let rr = &outcome.rhythm.rr_intervals_secs;
        assert!(rr.iter().all(|&r| (r - 0.3).abs() < 0.05), "rr {rr:?}");
    }
    #[test]
    fn pan_tompkins_on_synthetic_trace_avoids_the_edges() {
        for (bpm, hrv) in [(40.0, 0.0), (80.0, 5.0), (200.0, 0.0)] {
            let signal = synthetic_trace(bpm, hrv);
            let outcome = EcgDetector::new(DetectionMethod::PanTompkins)
                .detect(&signal, RATE)
                .unwrap();
            let peaks = &outcome.r_peaks;
            let expected = 5.0 * bpm / 60.0;
            assert!(
                (peaks.len() as f64 - expected).abs() <= 3.0,
                "{bpm} bpm: found {peaks:?}"
            );
            assert!(peaks.first().map_or(false, |&p| p > 0));
            assert!(peaks.last().map_or(false, |&p| p < signal.len() - 1));
            assert!(peaks.windows(2).all(|w| w[0] < w[1]));
        }
    }
    #[test]
    fn pan_tompkins_searches_back_for_a_weak_beat() {
        let (_, truth) = pulse_train();
        let outcome = EcgDetector::new(DetectionMethod::PanTompkins)
            .detect(&pulse_train_with_weak_beat(0.32), RATE)
            .unwrap();
        assert_matches_truth(&outcome.r_peaks, &truth);
    }
    #[test]
    fn beat_spacing_follows_the_rhythm() {
        // 0.3 s regions at 500 Hz: half of 150 samples, at the 75-sample floor
        assert_eq!(min_beat_spacing(&[0, 150, 300, 450], RATE), 75);
        assert_eq!(min_beat_spacing(&[0, 200, 400, 600], RATE), 100);
        // slow rhythm stays at 300 ms
        assert_eq!(min_beat_spacing(&[0, 750, 1500], RATE), 150);
        assert_eq!(min_beat_spacing(&[10], RATE), 150);
    }
    #[test]
    fn method_names_round_trip_through_serde() {
        let method: DetectionMethod = serde_json::from_str("\"Pan-Tompkins\"").unwrap();
        assert_eq!(method, DetectionMethod::PanTompkins);
        assert_eq!(serde_json::to_string(&method).unwrap(), "\"pantompkins\"");
        let err = serde_json::from_str::<DetectionMethod>("\"hamilton\"").unwrap_err();
        assert!(err.to_string().contains("unrecognized detection method"));
    }
    #[test]
    fn flat_and_tiny_inputs_are_degenerate_not_errors() {
        let mut detector = EcgDetector::default();
        for signal in [vec![], vec![0.3], vec![1.0; 2000]] {
            let outcome = detector.detect(&signal, RATE).unwrap();
            assert!(outcome.r_peaks.is_empty());
            assert!(outcome.is_degenerate());
            assert_eq!(outcome.cleaned.len(), signal.len());
        }
    }
    #[test]
    fn non_positive_rate_is_invalid() {
        let err = EcgDetector::default().detect(&[0.0; 10], 0.0).unwrap_err();
        assert!(matches!(err, EcgError::InvalidParameter { name: "sampling_rate", .. }));
    }
    #[test]
    fn method_names_parse() {
        assert_eq!("NeuroKit".parse::<DetectionMethod>().unwrap(), DetectionMethod::NeuroKit);
        assert_eq!(
            "pan-tompkins".parse::<DetectionMethod>().unwrap(),
            DetectionMethod::PanTompkins
        );
        assert!("hamilton".parse::<DetectionMethod>().is_err());
    }
    #[test]
    fn prominence_prefers_the_tall_isolated_peak() {
        let data = [0.0, 0.2, 0.1, 0.15, 0.1, 1.0, 0.0, 0.05, 0.0];
        assert_eq!(local_maxima(&data), vec![1, 3, 5, 7]);
        assert_eq!(most_prominent_peak(&data), Some(5));
        assert_eq!(local_maxima(&[0.0, 1.0, 1.0, 1.0, 0.0]), vec![2]);
        assert_eq!(most_prominent_peak(&[1.0, 2.0, 3.0]), None);
    }
    #[test]
    fn boxcar_keeps_constants_and_length() {
        let out = boxcar_smooth(&[2.0; 7], 4);
        assert_eq!(out.len(), 7);
        assert!(out.iter().all(|v| (v - 2.0).abs() < 1e-12));
        let ramp = boxcar_smooth(&[0.0, 0.0, 3.0, 0.0, 0.0], 3);
        assert_eq!(ramp, vec![0.0, 1.0, 1.0, 1.0, 0.0]);
    }
    #[test]
    fn manual_detector_replays_fixture() {
        let mut detector = ManualDetector::new(vec![vec![10, 20]]);
        let outcome = detector.detect(&[0.0; 30], 10.0).unwrap();
        assert_eq!(outcome.r_peaks, vec![10, 20]);
        assert_eq!(outcome.rhythm.mean_heart_rate_bpm, Some(60.0));
        assert!(detector.detect(&[0.0; 30], 10.0).unwrap().r_peaks.is_empty());
    }
}
