//! Orrery viewer entry point

use std::path::PathBuf;

use clap::Parser;

/// Render a declarative glow scene
#[derive(Debug, Parser)]
#[command(name = "orrery", version, about)]
struct Args {
    /// Scene document (.ron) to open
    scene: Option<PathBuf>,

    /// Start with bloom disabled
    #[arg(long)]
    no_bloom: bool,

    /// Start with the scene clock paused
    #[arg(long)]
    paused: bool,
}

fn main() -> eframe::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orrery_viewer=debug,orrery_renderer=info,orrery_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    tracing::info!("Starting Orrery");

    let config = orrery_viewer::config::create_shared_config();
    let (width, height) = {
        let config = config.read();
        (config.config().window.width, config.config().window.height)
    };

    let wgpu_options = egui_wgpu::WgpuConfiguration {
        wgpu_setup: egui_wgpu::WgpuSetup::CreateNew {
            supported_backends: wgpu::Backends::PRIMARY | wgpu::Backends::GL,
            power_preference: wgpu::PowerPreference::HighPerformance,
            device_descriptor: std::sync::Arc::new(|_adapter| wgpu::DeviceDescriptor {
                label: Some("orrery device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
            }),
        },
        ..Default::default()
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Orrery"),
        wgpu_options,
        ..Default::default()
    };

    eframe::run_native(
        "orrery",
        native_options,
        Box::new(move |cc| {
            let options = orrery_viewer::LaunchOptions {
                scene: args.scene,
                bloom: !args.no_bloom,
                paused: args.paused,
            };
            Ok(Box::new(orrery_viewer::OrreryApp::new(cc, config, options)))
        }),
    )
}
