use std::f64::consts::PI;
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterKind {
    /// Butterworth high-pass of the given order.
    Highpass { cutoff_hz: f64, order: usize },
    /// High-pass at `low_hz` followed by low-pass at `high_hz`.
    Bandpass {
        low_hz: f64,
        high_hz: f64,
        order: usize,
    },
}
#[derive(Clone, Copy, Debug)]
struct BiquadCoeffs {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}
impl BiquadCoeffs {
    fn dc_gain(&self) -> f64 {
        let den = 1.0 + self.a1 + self.a2;
        if den.abs() < f64::EPSILON {
            0.0
        } else {
            (self.b0 + self.b1 + self.b2) / den
        }
    }
}
#[derive(Clone, Copy, Debug, Default)]
struct BiquadState {
    z1: f64,
    z2: f64,
}
#[derive(Clone, Copy, Debug)]
struct BiquadFilter {
    coeffs: BiquadCoeffs,
    state: BiquadState,
}
impl BiquadFilter {
    fn new(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            state: BiquadState::default(),
        }
    }
    fn process(&mut self, input: f64) -> f64 {
        // Transposed direct form II
        let y = self.coeffs.b0 * input + self.state.z1;
        self.state.z1 = self.coeffs.b1 * input - self.coeffs.a1 * y + self.state.z2;
        self.state.z2 = self.coeffs.b2 * input - self.coeffs.a2 * y;
        y
    }
    /// Load the state a constant input `x0` would settle into; returns the settled output.
    fn prime(&mut self, x0: f64) -> f64 {
        let c = self.coeffs;
        let y0 = c.dc_gain() * x0;
        self.state = BiquadState {
            z1: y0 - c.b0 * x0,
            z2: c.b2 * x0 - c.a2 * y0,
        };
        y0
    }
}
#[derive(Clone, Default, Debug)]
pub struct FilterChain {
    sections: Vec<BiquadFilter>,
}
impl FilterChain {
    pub fn from_kinds(sample_rate_hz: f64, kinds: &[FilterKind]) -> Self {
        let mut sections = Vec::new();
        for kind in kinds {
            sections.extend(design_sections(sample_rate_hz, *kind));
        }
        Self { sections }
    }
    fn reset(&mut self) {
        for section in &mut self.sections {
            section.state = BiquadState::default();
        }
    }
    /// Put every section in steady state for a constant input `x0`.
    fn prime(&mut self, x0: f64) {
        let mut value = x0;
        for section in &mut self.sections {
            value = section.prime(value);
        }
    }
    fn process_sample(&mut self, mut value: f64) -> f64 {
        for section in &mut self.sections {
            value = section.process(value);
        }
        value
    }
    /// Causal pass over a whole block, starting from the steady state of its first sample.
    fn filter(&mut self, signal: &[f64]) -> Vec<f64> {
        let Some(&first) = signal.first() else {
            return Vec::new();
        };
        self.reset();
        self.prime(first);
        signal.iter().map(|&v| self.process_sample(v)).collect()
    }
    /// Forward-backward pass: zero phase, squared magnitude response.
    pub fn filtfilt(&self, signal: &[f64]) -> Vec<f64> {
        let padlen = 3 * (2 * self.sections.len() + 1);
        let mut chain = self.clone();
        zero_phase(signal, padlen, |block| chain.filter(block))
    }
}
/// Forward-backward moving average over `width` samples.
///
/// Used as the power-line filter: a boxcar `sample_rate / mains_hz` wide nulls the mains
/// frequency and its harmonics.
pub fn moving_average_filtfilt(signal: &[f64], width: usize) -> Vec<f64> {
    if width <= 1 {
        return signal.to_vec();
    }
    zero_phase(signal, 3 * width, |block| causal_moving_average(block, width))
}
fn causal_moving_average(signal: &[f64], width: usize) -> Vec<f64> {
    let Some(&first) = signal.first() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(signal.len());
    // history starts full of the first sample
    let mut sum = first * width as f64;
    for (i, &v) in signal.iter().enumerate() {
        let leaving = if i >= width { signal[i - width] } else { first };
        sum += v - leaving;
        out.push(sum / width as f64);
    }
    out
}
fn zero_phase(
    signal: &[f64],
    padlen: usize,
    mut pass: impl FnMut(&[f64]) -> Vec<f64>,
) -> Vec<f64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }
    let pad = padlen.min(n - 1);
    let extended = odd_extension(signal, pad);
    let mut forward = pass(&extended);
    forward.reverse();
    let mut backward = pass(&forward);
    backward.reverse();
    backward[pad..pad + n].to_vec()
}
/// Mirror `pad` samples around each end point, flipped in sign about that end point.
fn odd_extension(signal: &[f64], pad: usize) -> Vec<f64> {
    let n = signal.len();
    let first = signal[0];
    let last = signal[n - 1];
    let mut out = Vec::with_capacity(n + 2 * pad);
    out.extend((1..=pad).rev().map(|i| 2.0 * first - signal[i]));
    out.extend_from_slice(signal);
    out.extend((1..=pad).map(|i| 2.0 * last - signal[n - 1 - i]));
    out
}
fn design_sections(sample_rate_hz: f64, kind: FilterKind) -> Vec<BiquadFilter> {
    let nyquist = sample_rate_hz * 0.5;
    match kind {
        FilterKind::Highpass { cutoff_hz, order } => {
            butterworth(nyquist_clamp(cutoff_hz, nyquist), sample_rate_hz, order, true)
        }
        FilterKind::Bandpass {
            low_hz,
            high_hz,
            order,
        } => {
            let (low, high) = band_edges(low_hz, high_hz, nyquist);
            let mut sections = butterworth(low, sample_rate_hz, order, true);
            sections.extend(butterworth(high, sample_rate_hz, order, false));
            sections
        }
    }
}
fn butterworth(freq_hz: f64, sample_rate_hz: f64, order: usize, highpass: bool) -> Vec<BiquadFilter> {
    let order = order.max(1);
    let mut sections = Vec::with_capacity(order / 2 + 1);
    for k in 0..order / 2 {
        let q = 1.0 / (2.0 * (PI * (2 * k + 1) as f64 / (2 * order) as f64).sin());
        let coeffs = if highpass {
            highpass_biquad(freq_hz, sample_rate_hz, q)
        } else {
            lowpass_biquad(freq_hz, sample_rate_hz, q)
        };
        sections.push(BiquadFilter::new(coeffs));
    }
    if order % 2 == 1 {
        sections.push(BiquadFilter::new(first_order(freq_hz, sample_rate_hz, highpass)));
    }
    sections
}
fn nyquist_clamp(freq_hz: f64, nyquist: f64) -> f64 {
    freq_hz.clamp(0.01, nyquist - 0.01)
}
fn band_edges(low_hz: f64, high_hz: f64, nyquist: f64) -> (f64, f64) {
    let low = nyquist_clamp(low_hz.min(high_hz), nyquist);
    let high = nyquist_clamp(low_hz.max(high_hz), nyquist);
    (low, high)
}
fn lowpass_biquad(freq_hz: f64, sample_rate_hz: f64, q: f64) -> BiquadCoeffs {
    let w0 = 2.0 * PI * freq_hz / sample_rate_hz;
    let alpha = w0.sin() / (2.0 * q);
    let cos_w0 = w0.cos();
    let b0 = (1.0 - cos_w0) * 0.5;
    let b1 = 1.0 - cos_w0;
    let b2 = b0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_w0;
    let a2 = 1.0 - alpha;
    normalize(b0, b1, b2, a0, a1, a2)
}
fn highpass_biquad(freq_hz: f64, sample_rate_hz: f64, q: f64) -> BiquadCoeffs {
    let w0 = 2.0 * PI * freq_hz / sample_rate_hz;
    let alpha = w0.sin() / (2.0 * q);
    let cos_w0 = w0.cos();
    let b0 = (1.0 + cos_w0) * 0.5;
    let b1 = -(1.0 + cos_w0);
    let b2 = b0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_w0;
    let a2 = 1.0 - alpha;
    normalize(b0, b1, b2, a0, a1, a2)
}
/// Bilinear first-order section, stored as a biquad with zero second-order taps.
fn first_order(freq_hz: f64, sample_rate_hz: f64, highpass: bool) -> BiquadCoeffs {
    let k = (PI * freq_hz / sample_rate_hz).tan();
    let a1 = (k - 1.0) / (k + 1.0);
    let (b0, b1) = if highpass {
        let b0 = 1.0 / (1.0 + k);
        (b0, -b0)
    } else {
        let b0 = k / (1.0 + k);
        (b0, b0)
    };
    BiquadCoeffs {
        b0,
        b1,
        b2: 0.0,
        a1,
        a2: 0.0,
    }
}
fn normalize(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> BiquadCoeffs {
    let a0_inv = 1.0 / a0;
    BiquadCoeffs {
        b0: b0 * a0_inv,
        b1: b1 * a0_inv,
        b2: b2 * a0_inv,
        a1: a1 * a0_inv,
        a2: a2 * a0_inv,
    }
}
