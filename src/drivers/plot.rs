use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use log::{debug, warn};
use once_cell::sync::OnceCell;
use plotters::prelude::*;
use plotters::style::FontStyle;
use crate::drivers::frame::EcgFrame;
use crate::drivers::EcgError;
pub const FIGURE_TITLE: &str = "ECG Signal with Detected QRS Complexes";
pub const SIGNAL_LABEL: &str = "ECG Signal";
pub const PEAKS_LABEL: &str = "Detected R-peaks";
pub const X_LABEL: &str = "Time (seconds)";
pub const Y_LABEL: &str = "Amplitude";
/// Largest accepted figure side, in pixels.
pub const MAX_FIGURE_SIDE: u32 = 8192;
const FONT_FAMILY: &str = "sans-serif";
const MARKER_RADIUS: u32 = 5;
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub signal_color: RGBColor,
    pub peak_color: RGBColor,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 480,
            background: WHITE,
            signal_color: BLUE,
            peak_color: RED,
        }
    }
}
/// Registers the UI's bundled sans font with plotters, once per process.
fn ensure_font() {
    static REGISTERED: OnceCell<()> = OnceCell::new();
    REGISTERED.get_or_init(|| {
        let Some(data) = eframe::egui::FontDefinitions::default()
            .font_data
            .remove("Ubuntu-Light")
        else {
            warn!("bundled plot font missing; labels may not render");
            return;
        };
        let bytes: &'static [u8] = match data.font {
            Cow::Borrowed(bytes) => bytes,
            Cow::Owned(bytes) => Box::leak(bytes.into_boxed_slice()),
        };
        if plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_err() {
            warn!("plot font could not be parsed");
        }
    });
}
/// Draws the trace with hollow circles on each R-peak and returns PNG bytes.
pub fn render_ecg_png(frame: &EcgFrame, style: &PlotStyle) -> Result<Vec<u8>, EcgError> {
    if frame.waveform.is_empty() || frame.time.len() != frame.waveform.len() {
        return Err(EcgError::Render("frame has no samples to draw".into()));
    }
    let mut buffer = vec![0u8; rgb_buffer_len(style.width, style.height)?];
    ensure_font();
    let signal = frame.signal_points();
    let peaks = frame.peak_points();
    let (y_min, y_max) = amplitude_bounds(&frame.waveform);
    let x_max = frame.duration_seconds().max(f64::EPSILON);
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(15)
            .caption(FIGURE_TITLE, (FONT_FAMILY, 22))
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 45)
            .build_cartesian_2d(0f64..x_max, y_min..y_max)?;
        chart
            .configure_mesh()
            .x_desc(X_LABEL)
            .y_desc(Y_LABEL)
            .light_line_style(&BLACK.mix(0.05))
            .draw()?;
        let line_color = style.signal_color;
        chart
            .draw_series(LineSeries::new(
                signal.iter().map(|p| (p[0], p[1])),
                line_color.stroke_width(1),
            ))?
            .label(SIGNAL_LABEL)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_color));
        let marker_color = style.peak_color;
        chart
            .draw_series(
                peaks
                    .iter()
                    .map(|p| Circle::new((p[0], p[1]), MARKER_RADIUS, marker_color.stroke_width(2))),
            )?
            .label(PEAKS_LABEL)
            .legend(move |(x, y)| Circle::new((x + 10, y), MARKER_RADIUS, marker_color.stroke_width(2)));
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .border_style(&BLACK.mix(0.3))
            .background_style(&WHITE.mix(0.8))
            .draw()?;
        root.present()?;
    }
    debug!(
        "rendered {}x{} figure with {} peaks",
        style.width,
        style.height,
        peaks.len()
    );
    encode_png(&buffer, style.width, style.height)
}
/// Renders and writes the figure to `path`.
pub fn save_ecg_png(frame: &EcgFrame, style: &PlotStyle, path: &Path) -> Result<(), EcgError> {
    let png = render_ecg_png(frame, style)?;
    std::fs::write(path, png)?;
    Ok(())
}
/// Padded y-range; flat traces get a fixed window around their level.
fn amplitude_bounds(samples: &[f64]) -> (f64, f64) {
    let (lo, hi) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.08;
    (lo - pad, hi + pad)
}
fn rgb_buffer_len(width: u32, height: u32) -> Result<usize, EcgError> {
    if width == 0 || height == 0 || width > MAX_FIGURE_SIDE || height > MAX_FIGURE_SIDE {
        return Err(EcgError::Render(format!(
            "figure size {width}x{height} outside 1..={MAX_FIGURE_SIDE}"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(3))
        .ok_or_else(|| EcgError::Render(format!("figure size {width}x{height} too large")))
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EcgError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| EcgError::Render("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
