//! Waveform synthesis.
//!
//! `ecgsyn` follows the McSharry, Clifford, Tarassenko & Smith dynamical model: a point
//! travels around a limit cycle in the (x, y) plane while the z coordinate is pushed by
//! five Gaussian attractors (P, Q, R, S, T) placed at fixed angles. The angular speed of
//! each turn comes from an RR tachogram with a bimodal (Mayer wave + respiratory) spectrum.
//! `simple` sums a Gaussian PQRST template per beat.
use std::f64::consts::PI;
use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Exp1, Normal};
use rustfft::{num_complex::Complex64, FftPlanner};
use crate::drivers::source::{SignalSynthesizer, SimulationParameters, SynthesisMethod, SynthesisRequest};
use crate::drivers::EcgError;
/// Attractor angles (degrees), amplitudes and widths for P, Q, R, S, T.
const ATTRACTOR_ANGLES_DEG: [f64; 5] = [-70.0, -15.0, 0.0, 15.0, 100.0];
const ATTRACTOR_AMPLITUDES: [f64; 5] = [1.2, -5.0, 30.0, -7.5, 0.75];
const ATTRACTOR_WIDTHS: [f64; 5] = [0.25, 0.1, 0.1, 0.1, 0.4];
const LF_HZ: f64 = 0.1;
const HF_HZ: f64 = 0.25;
const LF_STD_HZ: f64 = 0.01;
const HF_STD_HZ: f64 = 0.01;
const LF_HF_RATIO: f64 = 0.5;
const RESPIRATION_HZ: f64 = 0.25;
/// The ODE is integrated at an integer multiple of the output rate, at least this fast.
const MIN_INTERNAL_RATE_HZ: f64 = 1000.0;
const MIN_RR_SECS: f64 = 0.2;
const OUTPUT_MIN_MV: f64 = -0.4;
const OUTPUT_SPAN_MV: f64 = 1.6;
const NOISE_COMPONENTS_HZ: [f64; 3] = [5.0, 10.0, 100.0];
/// Built-in synthesizer covering every [`SynthesisMethod`].
#[derive(Debug, Default)]
pub struct EcgSynthesizer {
    last_seed: Option<u64>,
}
impl EcgSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }
}
impl SignalSynthesizer for EcgSynthesizer {
    fn synthesize(&mut self, request: &SynthesisRequest) -> Result<Vec<f64>, EcgError> {
        request.validate()?;
        let seed = request.seed.unwrap_or_else(rand::random);
        self.last_seed = Some(seed);
        let mut rng = StdRng::seed_from_u64(seed);
        let params = &request.params;
        let n = params.sample_count();
        let mut ecg = match request.method {
            SynthesisMethod::EcgSyn => ecgsyn(params, n, &mut rng),
            SynthesisMethod::Simple => gaussian_beats(params, n, &mut rng)?,
        };
        if request.noise_amplitude > 0.0 {
            add_noise(&mut ecg, params.sampling_rate(), request.noise_amplitude, &mut rng);
        }
        debug!(
            "synthesized {} samples with {} (seed {seed})",
            ecg.len(),
            request.method
        );
        Ok(ecg)
    }
    fn last_seed(&self) -> Option<u64> {
        self.last_seed
    }
}
struct Attractors {
    angles: [f64; 5],
    widths: [f64; 5],
}
impl Attractors {
    /// Narrow the waves and pull them toward R as the heart speeds up.
    fn for_heart_rate(heart_rate_bpm: f64) -> Self {
        let hrfact = (heart_rate_bpm / 60.0).sqrt();
        let hrfact2 = hrfact.sqrt();
        let angle_scale = [hrfact2, hrfact, 1.0, hrfact, hrfact2];
        let mut angles = [0.0; 5];
        let mut widths = [0.0; 5];
        for k in 0..5 {
            angles[k] = ATTRACTOR_ANGLES_DEG[k].to_radians() * angle_scale[k];
            widths[k] = ATTRACTOR_WIDTHS[k] * hrfact;
        }
        Self { angles, widths }
    }
}
struct Dynamics<'a> {
    attractors: Attractors,
    /// RR interval (seconds) in force at each internal sample.
    rr_per_sample: &'a [f64],
    internal_rate_hz: f64,
}
impl Dynamics<'_> {
    fn derivatives(&self, state: [f64; 3], t: f64) -> [f64; 3] {
        let [x, y, z] = state;
        let theta = y.atan2(x);
        let alpha = 1.0 - (x * x + y * y).sqrt();
        let idx = ((t * self.internal_rate_hz).floor().max(0.0) as usize)
            .min(self.rr_per_sample.len() - 1);
        let omega = 2.0 * PI / self.rr_per_sample[idx];
        let baseline = 0.005 * (2.0 * PI * RESPIRATION_HZ * t).sin();
        let mut dz = -(z - baseline);
        for k in 0..5 {
            let d = theta - self.attractors.angles[k];
            let dtheta = d - (d / (2.0 * PI)).round() * 2.0 * PI;
            let w = dtheta / self.attractors.widths[k];
            dz -= ATTRACTOR_AMPLITUDES[k] * dtheta * (-0.5 * w * w).exp();
        }
        [alpha * x - omega * y, alpha * y + omega * x, dz]
    }
    fn rk4_step(&self, state: [f64; 3], t: f64, dt: f64) -> [f64; 3] {
        let add = |s: [f64; 3], k: [f64; 3], h: f64| [s[0] + h * k[0], s[1] + h * k[1], s[2] + h * k[2]];
        let k1 = self.derivatives(state, t);
        let k2 = self.derivatives(add(state, k1, dt / 2.0), t + dt / 2.0);
        let k3 = self.derivatives(add(state, k2, dt / 2.0), t + dt / 2.0);
        let k4 = self.derivatives(add(state, k3, dt), t + dt);
        let mut next = state;
        for i in 0..3 {
            next[i] += dt / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
        }
        next
    }
}
fn ecgsyn(params: &SimulationParameters, n: usize, rng: &mut StdRng) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let sample_rate = params.sampling_rate();
    let decimation = (MIN_INTERNAL_RATE_HZ / sample_rate).ceil().max(1.0) as usize;
    let internal_rate_hz = sample_rate * decimation as f64;
    let rr_mean = 60.0 / params.heart_rate_bpm;
    // 1 Hz tachogram covering the trace plus two beats of headroom
    let tachogram_secs = params.duration_secs + 2.0 * rr_mean;
    let rr_len = (tachogram_secs.ceil() as usize).next_power_of_two().max(4);
    let tachogram = rr_process(rr_len, params.heart_rate_bpm, params.hrv_std_bpm, rng);
    let total = n * decimation;
    let rr_per_sample = hold_per_beat(&tachogram, internal_rate_hz, total);
    let dynamics = Dynamics {
        attractors: Attractors::for_heart_rate(params.heart_rate_bpm),
        rr_per_sample: &rr_per_sample,
        internal_rate_hz,
    };
    let dt = 1.0 / internal_rate_hz;
    let mut state = [1.0, 0.0, 0.04];
    let mut z = Vec::with_capacity(n);
    for i in 0..total {
        if i % decimation == 0 {
            z.push(state[2]);
        }
        state = dynamics.rk4_step(state, i as f64 * dt, dt);
    }
    rescale(&mut z);
    z
}
/// RR tachogram sampled at 1 Hz: bimodal spectrum, random phases, inverse FFT.
fn rr_process(len: usize, heart_rate_bpm: f64, hrv_std_bpm: f64, rng: &mut StdRng) -> Vec<f64> {
    let rr_mean = 60.0 / heart_rate_bpm;
    let rr_std = 60.0 * hrv_std_bpm / (heart_rate_bpm * heart_rate_bpm);
    if rr_std <= 0.0 {
        return vec![rr_mean; len];
    }
    let w1 = 2.0 * PI * LF_HZ;
    let w2 = 2.0 * PI * HF_HZ;
    let c1 = 2.0 * PI * LF_STD_HZ;
    let c2 = 2.0 * PI * HF_STD_HZ;
    let df = 1.0 / len as f64;
    let spectrum: Vec<f64> = (0..len)
        .map(|k| {
            let w = k as f64 * 2.0 * PI * df;
            let lf = LF_HF_RATIO * (-0.5 * ((w - w1) / c1).powi(2)).exp()
                / (2.0 * PI * c1 * c1).sqrt();
            let hf = (-0.5 * ((w - w2) / c2).powi(2)).exp() / (2.0 * PI * c2 * c2).sqrt();
            lf + hf
        })
        .collect();
    let half = len / 2;
    // mirror the lower half onto the upper half
    let mirrored = (0..len).map(|k| if k < half { spectrum[k] } else { spectrum[len - 1 - k] });
    let phases_half: Vec<f64> = (0..half - 1).map(|_| 2.0 * PI * rng.gen::<f64>()).collect();
    let mut phases = Vec::with_capacity(len);
    phases.push(0.0);
    phases.extend_from_slice(&phases_half);
    phases.push(0.0);
    phases.extend(phases_half.iter().rev().map(|p| -p));
    let mut buffer: Vec<Complex64> = mirrored
        .zip(&phases)
        .map(|(h, &ph)| Complex64::from_polar(0.5 * h.sqrt(), ph))
        .collect();
    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_inverse(len).process(&mut buffer);
    let scale = 1.0 / (len * len) as f64;
    let x: Vec<f64> = buffer.iter().map(|c| c.re * scale).collect();
    let x_std = std_dev(&x);
    if x_std <= f64::EPSILON {
        return vec![rr_mean; len];
    }
    let ratio = rr_std / x_std;
    x.iter()
        .map(|v| (rr_mean + v * ratio).max(MIN_RR_SECS))
        .collect()
}
/// Expand a 1 Hz tachogram into one RR value per internal sample, held for a whole beat.
fn hold_per_beat(tachogram: &[f64], internal_rate_hz: f64, total: usize) -> Vec<f64> {
    let dt = 1.0 / internal_rate_hz;
    let mut out = Vec::with_capacity(total);
    let mut beat_end_secs = 0.0;
    while out.len() < total {
        let start = out.len();
        let rr = interpolate(tachogram, start as f64 * dt);
        beat_end_secs += rr;
        let end = ((beat_end_secs / dt).round() as usize).max(start + 1).min(total);
        out.resize(end, rr);
    }
    out
}
/// Linear interpolation into a series sampled at 1 Hz; clamps past either end.
fn interpolate(series: &[f64], t_secs: f64) -> f64 {
    let last = series.len() - 1;
    if t_secs <= 0.0 {
        return series[0];
    }
    let i = t_secs.floor() as usize;
    if i >= last {
        return series[last];
    }
    let frac = t_secs - i as f64;
    series[i] * (1.0 - frac) + series[i + 1] * frac
}
fn rescale(z: &mut [f64]) {
    let (min, max) = z
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if !range.is_finite() || range <= f64::EPSILON {
        z.iter_mut().for_each(|v| *v = 0.0);
        return;
    }
    for v in z.iter_mut() {
        *v = (*v - min) * OUTPUT_SPAN_MV / range + OUTPUT_MIN_MV;
    }
}
/// One Gaussian wave of the template: offset from R (s), width (s), amplitude (mV).
struct Wave {
    offset: f64,
    width: f64,
    amplitude: f64,
}
const TEMPLATE: [Wave; 5] = [
    Wave { offset: -0.20, width: 0.025, amplitude: 0.15 },
    Wave { offset: -0.03, width: 0.008, amplitude: -0.15 },
    Wave { offset: 0.0, width: 0.010, amplitude: 1.0 },
    Wave { offset: 0.03, width: 0.008, amplitude: -0.25 },
    Wave { offset: 0.30, width: 0.050, amplitude: 0.30 },
];
/// Gaussian PQRST template per beat. RR intervals are drawn from a normal distribution
/// with the same mean and spread `ecgsyn` derives from the heart rate settings.
fn gaussian_beats(params: &SimulationParameters, n: usize, rng: &mut StdRng) -> Result<Vec<f64>, EcgError> {
    let sample_rate = params.sampling_rate();
    let rr_mean = 60.0 / params.heart_rate_bpm;
    let rr_std = 60.0 * params.hrv_std_bpm / (params.heart_rate_bpm * params.heart_rate_bpm);
    let rr_dist = Normal::new(rr_mean, rr_std)
        .map_err(|e| EcgError::invalid("heart_rate_std", e.to_string()))?;
    // waves narrower than a sample would alias away at low rates
    let min_width = 1.0 / sample_rate;
    // (R time, template stretch) per beat
    let mut beats = Vec::new();
    let mut r_time = 0.3 * rr_mean;
    while r_time < params.duration_secs + 0.5 {
        let rr = rr_dist.sample(rng).max(MIN_RR_SECS);
        beats.push((r_time, rr.sqrt()));
        r_time += rr;
    }
    let ecg = (0..n)
        .map(|i| {
            let t = i as f64 / sample_rate;
            beats
                .iter()
                .filter(|(r, stretch)| (t - r).abs() < 0.6 * stretch)
                .map(|&(r, stretch)| {
                    TEMPLATE
                        .iter()
                        .map(|w| {
                            let width = (w.width * stretch).max(min_width);
                            let x = (t - r - w.offset * stretch) / width;
                            w.amplitude * (-0.5 * x * x).exp()
                        })
                        .sum::<f64>()
                })
                .sum()
        })
        .collect();
    Ok(ecg)
}
/// Sum of Laplace noise components, each drawn at its own rate and interpolated up.
fn add_noise(signal: &mut [f64], sample_rate: f64, amplitude: f64, rng: &mut StdRng) {
    let n = signal.len();
    if n < 2 {
        return;
    }
    let std = std_dev(signal);
    let scale = amplitude * if std > f64::EPSILON { std } else { 1.0 };
    let duration = n as f64 / sample_rate;
    for &freq in &NOISE_COMPONENTS_HZ {
        if freq > sample_rate / 2.0 {
            debug!("skipping {freq} Hz noise component above Nyquist");
            continue;
        }
        let knots: Vec<f64> = (0..((duration * freq).ceil() as usize).max(2))
            .map(|_| laplace(rng))
            .collect();
        let step = (knots.len() - 1) as f64 / (n - 1) as f64;
        for (i, v) in signal.iter_mut().enumerate() {
            *v += scale * interpolate(&knots, i as f64 * step);
        }
    }
}
/// Standard Laplace draw: difference of two unit exponentials.
fn laplace(rng: &mut StdRng) -> f64 {
    let a: f64 = Exp1.sample(rng);
    let b: f64 = Exp1.sample(rng);
    a - b
}
pub(crate) fn std_dev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mean = data.iter().sum::<f64>() / data.len() as f64;
    let variance = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / data.len() as f64;
    variance.sqrt()
}
#[cfg(test)]
mod tests {
    use super::*;
    fn request(duration: f64, rate: u32, bpm: f64, hrv: f64) -> SynthesisRequest {
        SynthesisRequest::new(SimulationParameters {
            duration_secs: duration,
            sampling_rate_hz: rate,
            heart_rate_bpm: bpm,
            hrv_std_bpm: hrv,
        })
        .with_seed(Some(7))
    }
    #[test]
    fn waveform_length_matches_duration_times_rate() {
        let mut synth = EcgSynthesizer::new();
        for (duration, rate) in [(5.0, 100), (10.0, 500), (7.3, 333), (15.0, 1000)] {
            let ecg = synth.synthesize(&request(duration, rate, 80.0, 5.0)).unwrap();
            assert_eq!(ecg.len(), (duration * rate as f64).round() as usize);
            assert!(ecg.iter().all(|v| v.is_finite()));
        }
    }
    #[test]
    fn ecgsyn_output_spans_the_millivolt_range() {
        let mut synth = EcgSynthesizer::new();
        let ecg = synth
            .synthesize(&request(10.0, 500, 80.0, 5.0).with_noise(0.0))
            .unwrap();
        let max = ecg.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = ecg.iter().cloned().fold(f64::INFINITY, f64::min);
        assert!((max - 1.2).abs() < 1e-9);
        assert!((min + 0.4).abs() < 1e-9);
    }
    #[test]
    fn same_seed_same_waveform() {
        let mut synth = EcgSynthesizer::new();
        let a = synth.synthesize(&request(5.0, 250, 70.0, 10.0)).unwrap();
        let b = synth.synthesize(&request(5.0, 250, 70.0, 10.0)).unwrap();
        assert_eq!(a, b);
        assert_eq!(synth.last_seed(), Some(7));
        let c = synth
            .synthesize(&request(5.0, 250, 70.0, 10.0).with_seed(Some(8)))
            .unwrap();
        assert_ne!(a, c);
    }
    #[test]
    fn zero_variability_is_a_steady_rhythm() {
        let mut rng = StdRng::seed_from_u64(1);
        let rr = rr_process(16, 60.0, 0.0, &mut rng);
        assert!(rr.iter().all(|&v| (v - 1.0).abs() < 1e-12));
        let mut synth = EcgSynthesizer::new();
        let ecg = synth.synthesize(&request(5.0, 100, 40.0, 0.0)).unwrap();
        assert_eq!(ecg.len(), 500);
        assert!(ecg.iter().all(|v| v.is_finite()));
    }
    #[test]
    fn tachogram_has_requested_mean_and_spread() {
        let mut rng = StdRng::seed_from_u64(3);
        let rr = rr_process(256, 80.0, 5.0, &mut rng);
        let mean = rr.iter().sum::<f64>() / rr.len() as f64;
        assert!((mean - 0.75).abs() < 1e-6);
        let expected_std = 60.0 * 5.0 / (80.0 * 80.0);
        assert!((std_dev(&rr) - expected_std).abs() < 1e-6);
    }
    #[test]
    fn beats_hold_their_interval() {
        let held = hold_per_beat(&[0.5, 0.5, 0.5, 0.5], 100.0, 120);
        assert_eq!(held.len(), 120);
        assert!(held.iter().all(|&v| v == 0.5));
    }
    #[test]
    fn simple_method_produces_one_r_wave_per_beat() {
        let mut synth = EcgSynthesizer::new();
        let ecg = synth
            .synthesize(
                &request(6.0, 500, 60.0, 0.0)
                    .with_method(SynthesisMethod::Simple)
                    .with_noise(0.0),
            )
            .unwrap();
        assert_eq!(ecg.len(), 3000);
        let tall = ecg
            .windows(3)
            .filter(|w| w[1] > 0.5 && w[1] > w[0] && w[1] >= w[2])
            .count();
        assert_eq!(tall, 6);
    }
    #[test]
    fn simple_method_spreads_beats_by_the_variability() {
        let mut synth = EcgSynthesizer::new();
        let ecg = synth
            .synthesize(
                &request(30.0, 250, 60.0, 10.0)
                    .with_method(SynthesisMethod::Simple)
                    .with_noise(0.0),
            )
            .unwrap();
        let r_times: Vec<f64> = ecg
            .windows(3)
            .enumerate()
            .filter(|(_, w)| w[1] > 0.5 && w[1] > w[0] && w[1] >= w[2])
            .map(|(i, _)| (i + 1) as f64 / 250.0)
            .collect();
        let rr: Vec<f64> = r_times.windows(2).map(|w| w[1] - w[0]).collect();
        let mean = rr.iter().sum::<f64>() / rr.len() as f64;
        // 10 bpm around 60 bpm: RR spread of about 0.17 s around 1 s
        assert!((mean - 1.0).abs() < 0.15, "mean rr {mean}");
        assert!(std_dev(&rr) > 0.05, "rr spread {}", std_dev(&rr));
    }
    #[test]
    fn simple_method_keeps_every_r_wave_at_low_rates() {
        let mut synth = EcgSynthesizer::new();
        let ecg = synth
            .synthesize(
                &request(6.0, 125, 200.0, 0.0)
                    .with_method(SynthesisMethod::Simple)
                    .with_noise(0.0),
            )
            .unwrap();
        let tall = ecg
            .windows(3)
            .filter(|w| w[1] > 0.5 && w[1] > w[0] && w[1] >= w[2])
            .count();
        assert_eq!(tall, 20);
    }
    #[test]
    fn laplace_noise_is_centered() {
        let mut rng = StdRng::seed_from_u64(11);
        let draws: Vec<f64> = (0..20_000).map(|_| laplace(&mut rng)).collect();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        assert!(mean.abs() < 0.05);
        // unit Laplace has variance 2
        assert!((std_dev(&draws) - 2f64.sqrt()).abs() < 0.05);
    }
    #[test]
    fn invalid_request_is_rejected() {
        let mut synth = EcgSynthesizer::new();
        let mut bad = request(10.0, 500, 80.0, 5.0);
        bad.params.sampling_rate_hz = 0;
        assert!(matches!(
            synth.synthesize(&bad),
            Err(EcgError::InvalidParameter { .. })
        ));
        assert!(synth.synthesize(&request(10.0, 500, 80.0, 5.0).with_noise(-1.0)).is_err());
    }
}
