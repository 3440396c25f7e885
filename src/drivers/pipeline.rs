use log::{debug, info, warn};
use crate::drivers::detector::{EcgDetector, PeakDetector};
use crate::drivers::ecgsyn::EcgSynthesizer;
use crate::drivers::frame::{time_axis, DetectionStatus, EcgFrame};
use crate::drivers::hrv::RhythmSummary;
use crate::drivers::source::{SignalSynthesizer, SynthesisRequest};
use crate::drivers::EcgError;
/// Synthesizes a trace, finds its R-peaks and lays it on a time axis.
pub struct EcgPipeline<S: SignalSynthesizer, D: PeakDetector> {
    synthesizer: S,
    detector: D,
}
impl Default for EcgPipeline<EcgSynthesizer, EcgDetector> {
    fn default() -> Self {
        Self::new(EcgSynthesizer::new(), EcgDetector::default())
    }
}
impl<S: SignalSynthesizer, D: PeakDetector> EcgPipeline<S, D> {
    pub fn new(synthesizer: S, detector: D) -> Self {
        Self {
            synthesizer,
            detector,
        }
    }
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }
    pub fn run(&mut self, request: &SynthesisRequest) -> Result<EcgFrame, EcgError> {
        request.validate()?;
        let params = request.params;
        debug!(
            "simulating {:.1}s @ {} Hz, {:.0}±{:.1} bpm ({})",
            params.duration_secs,
            params.sampling_rate_hz,
            params.heart_rate_bpm,
            params.hrv_std_bpm,
            request.method
        );
        let waveform = self.synthesizer.synthesize(request)?;
        if waveform.len() != params.sample_count() {
            warn!(
                "synthesizer returned {} samples, expected {}",
                waveform.len(),
                params.sample_count()
            );
        }
        let mut detection = self.detector.detect(&waveform, params.sampling_rate())?;
        if normalize_peaks(&mut detection.r_peaks, waveform.len()) {
            warn!("detector returned unordered or out-of-range peaks; normalized");
            detection.rhythm = RhythmSummary::from_peaks(
                &detection.r_peaks,
                params.sampling_rate(),
            );
        }
        let status = if detection.is_degenerate() {
            warn!(
                "only {} R-peak(s) found; rhythm measures unavailable",
                detection.r_peaks.len()
            );
            DetectionStatus::Degenerate
        } else {
            DetectionStatus::Ok
        };
        let time = time_axis(waveform.len(), params.duration_secs);
        info!(
            "{} samples, {} R-peaks, mean HR {}",
            waveform.len(),
            detection.r_peaks.len(),
            detection
                .rhythm
                .mean_heart_rate_bpm
                .map(|hr| format!("{hr:.1} bpm"))
                .unwrap_or_else(|| "n/a".into())
        );
        Ok(EcgFrame {
            params,
            seed: self.synthesizer.last_seed(),
            waveform,
            time,
            detection,
            status,
        })
    }
}
/// Sorts, dedups and bounds-checks peaks in place; true if anything changed.
fn normalize_peaks(peaks: &mut Vec<usize>, len: usize) -> bool {
    let before = peaks.clone();
    peaks.retain(|&i| i < len);
    peaks.sort_unstable();
    peaks.dedup();
    *peaks != before
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::detector::{DetectionMethod, ManualDetector};
    use crate::drivers::source::{ManualSynthesizer, SimulationParameters, SynthesisMethod};
    fn request(duration: f64, rate: u32, bpm: f64, hrv: f64) -> SynthesisRequest {
        SynthesisRequest::new(SimulationParameters {
            duration_secs: duration,
            sampling_rate_hz: rate,
            heart_rate_bpm: bpm,
            hrv_std_bpm: hrv,
        })
        .with_seed(Some(42))
    }
    #[test]
    fn default_session_finds_about_thirteen_beats() {
        let mut pipeline = EcgPipeline::default();
        let frame = pipeline.run(&request(10.0, 500, 80.0, 5.0)).unwrap();
        assert_eq!(frame.waveform.len(), 5000);
        assert_eq!(frame.time.len(), 5000);
        assert_eq!(frame.time[0], 0.0);
        assert_eq!(frame.time[4999], 10.0);
        let n = frame.r_peaks().len();
        assert!((10..=16).contains(&n), "found {n} peaks");
        assert!(frame.r_peaks().windows(2).all(|w| w[0] < w[1]));
        assert!(frame.r_peaks().iter().all(|&i| i < 5000));
        assert_eq!(frame.status, DetectionStatus::Ok);
        assert_eq!(frame.seed, Some(42));
    }
    #[test]
    fn slow_steady_rhythm_at_low_rate() {
        let mut pipeline = EcgPipeline::default();
        let frame = pipeline.run(&request(5.0, 100, 40.0, 0.0)).unwrap();
        assert_eq!(frame.waveform.len(), 500);
        let n = frame.r_peaks().len();
        assert!((2..=5).contains(&n), "found {n} peaks");
    }
    #[test]
    fn short_low_rate_trace_still_has_peaks() {
        let mut pipeline = EcgPipeline::default();
        let frame = pipeline.run(&request(5.0, 100, 80.0, 5.0)).unwrap();
        assert_eq!(frame.waveform.len(), 500);
        assert!(!frame.r_peaks().is_empty());
    }
    #[test]
    fn beat_count_tracks_heart_rate_across_settings() {
        let mut pipeline = EcgPipeline::default();
        let cases = [(SynthesisMethod::EcgSyn, [0.0, 20.0]), (SynthesisMethod::Simple, [0.0, 5.0])];
        for detection in [DetectionMethod::NeuroKit, DetectionMethod::PanTompkins] {
            pipeline.detector_mut().set_method(detection);
            for (synthesis, hrvs) in cases {
                for duration in [5.0, 15.0] {
                    for rate in [100, 1000] {
                        for bpm in [40.0, 200.0] {
                            for hrv in hrvs {
                                let req = request(duration, rate, bpm, hrv).with_method(synthesis);
                                let frame = pipeline.run(&req).unwrap();
                                let found = frame.r_peaks().len() as f64;
                                let expected = duration * bpm / 60.0;
                                assert!(
                                    (found - expected).abs() <= 3.0,
                                    "{detection}/{synthesis} {duration}s {rate}Hz {bpm}±{hrv} bpm: \
                                     {found} peaks, expected {expected:.1}"
                                );
                            }
                        }
                    }
                }
            }
        }
    }
    #[test]
    fn fixed_seed_is_reproducible() {
        let mut pipeline = EcgPipeline::default();
        let req = request(4.0, 250, 70.0, 3.0).with_method(SynthesisMethod::Simple);
        let a = pipeline.run(&req).unwrap();
        let b = pipeline.run(&req).unwrap();
        assert_eq!(a, b);
    }
    #[test]
    fn invalid_request_fails_before_synthesis() {
        let mut pipeline = EcgPipeline::new(ManualSynthesizer::new(vec![]), ManualDetector::new(vec![]));
        let err = pipeline.run(&request(10.0, 0, 80.0, 5.0)).unwrap_err();
        assert!(matches!(err, EcgError::InvalidParameter { name: "sampling_rate", .. }));
    }
    #[test]
    fn external_peaks_are_normalized() {
        let synth = ManualSynthesizer::new(vec![vec![0.0; 20]]);
        let detector = ManualDetector::new(vec![vec![12, 3, 3, 99, 7]]);
        let mut pipeline = EcgPipeline::new(synth, detector);
        let frame = pipeline.run(&request(0.2, 100, 60.0, 0.0)).unwrap();
        assert_eq!(frame.r_peaks(), &[3, 7, 12]);
        assert_eq!(frame.detection.rhythm.rr_intervals_secs.len(), 2);
        assert_eq!(frame.seed, None);
    }
    #[test]
    fn single_peak_marks_frame_degenerate() {
        let synth = ManualSynthesizer::new(vec![vec![0.0; 20]]);
        let detector = ManualDetector::new(vec![vec![5]]);
        let mut pipeline = EcgPipeline::new(synth, detector);
        let frame = pipeline.run(&request(0.2, 100, 60.0, 0.0)).unwrap();
        assert_eq!(frame.status, DetectionStatus::Degenerate);
        assert_eq!(frame.detection.rhythm.mean_heart_rate_bpm, None);
    }
}
