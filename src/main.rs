// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod config;
mod content;
mod drivers;
mod gui;
mod types;
use anyhow::{anyhow, Context, Result};
use eframe::egui;
use log::info;
use config::AppConfig;
// 入口函数
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = AppConfig::from_env().context("failed to load configuration")?;
    info!(
        "starting with {} synthesis, {} detection",
        config.synthesis_method, config.detection_method
    );
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1280.0, 900.0])
        .with_min_inner_size([900.0, 640.0])
        .with_title("ECG Simulation with QRS Detection");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "ecgscope",
        options,
        Box::new(move |cc| Box::new(gui::EcgScopeApp::new(cc, config))),
    )
    .map_err(|e| anyhow!("UI event loop failed: {e}"))
}
