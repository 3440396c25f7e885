// src/drivers/mod.rs
// 信号合成、R 峰检测与绘图
pub mod detector;
pub mod ecgsyn;
pub mod error;
pub mod filter;
pub mod frame;
pub mod hrv;
pub mod pipeline;
pub mod plot;
pub mod source;
// 公开导出常用类型，方便外部调用
pub use detector::{DetectionMethod, DetectionOutcome, EcgDetector, ManualDetector, PeakDetector};
pub use ecgsyn::EcgSynthesizer;
pub use error::EcgError;
pub use frame::{time_axis, DetectionStatus, EcgFrame};
pub use hrv::RhythmSummary;
pub use pipeline::EcgPipeline;
pub use plot::{render_ecg_png, save_ecg_png, PlotStyle, MAX_FIGURE_SIDE};
pub use source::{
    ManualSynthesizer, SignalSynthesizer, SimulationParameters, SynthesisMethod, SynthesisRequest,
};
