// src/gui.rs
use eframe::egui;
use egui::{Color32, RichText, TextureHandle};
use egui_plot::{Legend, Line, MarkerShape, Plot, PlotPoints, Points};
use log::{error, info, warn};
use crate::config::{AppConfig, ReferenceImage};
use crate::content::{InfoSection, SECTIONS};
use crate::drivers::plot::{FIGURE_TITLE, PEAKS_LABEL, SIGNAL_LABEL, X_LABEL, Y_LABEL};
use crate::drivers::{
    save_ecg_png, DetectionMethod, DetectionStatus, EcgDetector, EcgFrame, EcgPipeline,
    EcgSynthesizer, PlotStyle, SimulationParameters, SynthesisMethod, SynthesisRequest,
};

const APP_TITLE: &str = "ECG Simulation with QRS Detection";
const SIGNAL_COLOR: Color32 = Color32::from_rgb(31, 119, 180);
const PEAK_COLOR: Color32 = Color32::from_rgb(214, 39, 40);
const MAX_LOG_LINES: usize = 8;

pub struct EcgScopeApp {
    config: AppConfig,
    params: SimulationParameters,
    synthesis_method: SynthesisMethod,
    detection_method: DetectionMethod,
    // 种子锁定：勾选后每次重算得到同一波形
    seed_locked: bool,
    seed: u64,
    pipeline: EcgPipeline<EcgSynthesizer, EcgDetector>,
    frame: Option<EcgFrame>,
    last_error: Option<String>,
    reference: Option<TextureHandle>,
    reference_error: Option<String>,
    log_messages: Vec<String>,
}

impl EcgScopeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut app = Self::from_config(config);
        if let Some(image) = app.config.reference_image.clone() {
            match load_reference_texture(&cc.egui_ctx, &image) {
                Ok(texture) => app.reference = Some(texture),
                Err(e) => {
                    warn!("reference image unavailable: {e}");
                    app.reference_error = Some(e);
                }
            }
        }
        app
    }

    /// Builds the app state and runs the first pass; no UI context needed.
    pub fn from_config(config: AppConfig) -> Self {
        let mut app = Self {
            params: config.bounds.defaults(),
            synthesis_method: config.synthesis_method,
            detection_method: config.detection_method,
            seed_locked: config.seed.is_some(),
            seed: config.seed.unwrap_or_default(),
            pipeline: EcgPipeline::new(EcgSynthesizer::new(), EcgDetector::new(config.detection_method)),
            frame: None,
            last_error: None,
            reference: None,
            reference_error: None,
            log_messages: vec![format!("{APP_TITLE} ready.")],
            config,
        };
        app.recompute();
        app
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > MAX_LOG_LINES { self.log_messages.remove(0); }
    }

    fn request(&self) -> SynthesisRequest {
        SynthesisRequest::new(self.params)
            .with_method(self.synthesis_method)
            .with_seed(self.seed_locked.then_some(self.seed))
            .with_noise(self.config.noise_amplitude)
    }

    // 参数变化后立即重算（同步，在 UI 线程上）
    fn recompute(&mut self) {
        let request = self.request();
        self.pipeline.detector_mut().set_method(self.detection_method);
        match self.pipeline.run(&request) {
            Ok(frame) => {
                if let Some(seed) = frame.seed { self.seed = seed; }
                if frame.status == DetectionStatus::Degenerate {
                    self.log("Fewer than two R-peaks detected.");
                }
                self.last_error = None;
                self.frame = Some(frame);
            }
            Err(e) => {
                error!("simulation failed: {e}");
                self.log(&format!("Error: {e}"));
                self.last_error = Some(e.to_string());
                self.frame = None;
            }
        }
    }

    fn save_figure(&mut self) {
        let Some(frame) = &self.frame else { return; };
        let export = &self.config.export;
        let style = PlotStyle { width: export.width, height: export.height, ..Default::default() };
        let path = export.path.clone();
        match save_ecg_png(frame, &style, &path) {
            Ok(()) => {
                info!("figure saved to {}", path.display());
                self.log(&format!("Saved {}", path.display()));
                self.last_error = None;
            }
            Err(e) => {
                error!("figure export failed: {e}");
                self.log(&format!("Error: {e}"));
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) -> bool {
        let b = self.config.bounds;
        let mut changed = false;
        changed |= ui.add(egui::Slider::new(&mut self.params.duration_secs, b.duration_secs.min..=b.duration_secs.max)
            .step_by(1.0).text("Duration (seconds)")).changed();
        changed |= ui.add(egui::Slider::new(&mut self.params.sampling_rate_hz,
            b.sampling_rate_hz.min as u32..=b.sampling_rate_hz.max as u32).text("Sampling Rate (Hz)")).changed();
        changed |= ui.add(egui::Slider::new(&mut self.params.heart_rate_bpm, b.heart_rate_bpm.min..=b.heart_rate_bpm.max)
            .step_by(1.0).text("Heart Rate (BPM)")).changed();
        changed |= ui.add(egui::Slider::new(&mut self.params.hrv_std_bpm, b.hrv_std_bpm.min..=b.hrv_std_bpm.max)
            .step_by(1.0).text("Heart Rate Variability (Std in BPM)")).changed();

        ui.horizontal(|ui| {
            let before = (self.synthesis_method, self.detection_method);
            egui::ComboBox::from_label("Synthesis")
                .selected_text(self.synthesis_method.as_str())
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.synthesis_method, SynthesisMethod::EcgSyn, "ecgsyn");
                    ui.selectable_value(&mut self.synthesis_method, SynthesisMethod::Simple, "simple");
                });
            egui::ComboBox::from_label("Detection")
                .selected_text(self.detection_method.as_str())
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.detection_method, DetectionMethod::NeuroKit, "neurokit");
                    ui.selectable_value(&mut self.detection_method, DetectionMethod::PanTompkins, "pantompkins");
                });
            changed |= before != (self.synthesis_method, self.detection_method);
        });

        ui.horizontal(|ui| {
            changed |= ui.checkbox(&mut self.seed_locked, "Lock seed").changed();
            changed |= ui.add_enabled(self.seed_locked, egui::DragValue::new(&mut self.seed).prefix("seed ")).changed();
            if ui.button("🔄 Regenerate").clicked() { changed = true; }
            if ui.add_enabled(self.frame.is_some(), egui::Button::new("💾 Save figure")).clicked() {
                self.save_figure();
            }
        });
        changed
    }

    fn draw_figure(&self, ui: &mut egui::Ui) {
        ui.label(RichText::new(FIGURE_TITLE).strong());
        let Some(frame) = &self.frame else {
            ui.label("No signal.");
            return;
        };
        Plot::new("ecg_plot")
            .legend(Legend::default())
            .x_axis_label(X_LABEL)
            .y_axis_label(Y_LABEL)
            .view_aspect(2.5)
            .include_x(0.0)
            .include_x(frame.params.duration_secs)
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new(PlotPoints::new(frame.signal_points()))
                    .name(SIGNAL_LABEL).color(SIGNAL_COLOR));
                plot_ui.points(Points::new(PlotPoints::new(frame.peak_points()))
                    .name(PEAKS_LABEL).shape(MarkerShape::Circle).filled(false)
                    .radius(5.0).color(PEAK_COLOR));
            });
        let summary = summary_line(frame);
        let color = if frame.status == DetectionStatus::Degenerate { Color32::YELLOW } else { Color32::GRAY };
        ui.label(RichText::new(summary).color(color));
    }

    fn draw_reference(&self, ui: &mut egui::Ui) {
        let Some(image) = &self.config.reference_image else { return; };
        ui.separator();
        match (&self.reference, &self.reference_error) {
            (Some(texture), _) => {
                let size = texture.size_vec2();
                let scale = (ui.available_width() / size.x).min(1.0);
                ui.image((texture.id(), size * scale));
            }
            (None, Some(e)) => { ui.label(RichText::new(e).color(Color32::RED).small()); }
            (None, None) => {}
        }
        if !image.caption.is_empty() { ui.label(RichText::new(&image.caption).italics()); }
    }
}

impl eframe::App for EcgScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut visuals = egui::Visuals::dark();
        visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(10, 10, 15);
        ctx.set_visuals(visuals);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading(APP_TITLE);
                ui.separator();
                if self.draw_controls(ui) { self.recompute(); }
                if let Some(e) = &self.last_error {
                    ui.label(RichText::new(e).color(Color32::RED));
                }
                ui.add_space(10.0);
                self.draw_figure(ui);
                ui.add_space(10.0);
                for section in SECTIONS { draw_section(ui, section); }
                self.draw_reference(ui);
                ui.add_space(10.0);
                ui.collapsing("Log", |ui| {
                    for m in &self.log_messages { ui.monospace(m); }
                });
            });
        });
    }
}

fn draw_section(ui: &mut egui::Ui, section: &InfoSection) {
    ui.collapsing(section.title, |ui| {
        ui.label(section.intro);
        for bullet in section.bullets {
            ui.label(format!("• {}", bullet.text));
            if !bullet.children.is_empty() {
                ui.indent(bullet.text, |ui| {
                    for child in bullet.children { ui.label(format!("– {child}")); }
                });
            }
        }
        if let Some(heading) = section.outro_heading { ui.label(RichText::new(heading).strong()); }
        for line in section.outro { ui.label(format!("• {line}")); }
    });
}

fn load_reference_texture(ctx: &egui::Context, image: &ReferenceImage) -> Result<TextureHandle, String> {
    let img = image::open(&image.path)
        .map_err(|e| format!("cannot open {}: {e}", image.path.display()))?;
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
    Ok(ctx.load_texture("reference_image", color, egui::TextureOptions::default()))
}

pub fn summary_line(frame: &EcgFrame) -> String {
    let rhythm = &frame.detection.rhythm;
    let fmt = |v: Option<f64>, unit: &str| v.map(|v| format!("{v:.1} {unit}")).unwrap_or_else(|| "n/a".into());
    format!(
        "{} R-peaks · mean HR {} · SDNN {} · RMSSD {}",
        frame.r_peaks().len(),
        fmt(rhythm.mean_heart_rate_bpm, "bpm"),
        fmt(rhythm.sdnn_ms, "ms"),
        fmt(rhythm.rmssd_ms, "ms"),
    )
}
