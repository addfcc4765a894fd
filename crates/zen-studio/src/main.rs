mod app;
mod args;
mod simulated;

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use clap::Parser;
use winit::dpi::LogicalSize;
use zen_engine::device::GpuInit;
use zen_engine::logging::{init_logging, LoggingConfig};
use zen_engine::window::{Runtime, RuntimeConfig};
use zen_flow::{Flow, GestureService, ShapeGenerator, StateUpdate};
use zen_flow::shape::TextRaster;

use app::StudioApp;
use args::StudioArgs;
use simulated::{SimHand, SimulatedTracker, SimulatedVideo};

fn main() -> Result<()> {
    let args = StudioArgs::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    // Startup banner, printed before the window opens.
    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║          ZEN PARTICLE FLOW v0.1        ║");
    println!("  ╠════════════════════════════════════════╣");
    println!("  ║  1-0   shapes       +/-  particles     ║");
    println!("  ║  [ ]   size         ; '  noise         ║");
    println!("  ║  C     camera       B    bow sequence  ║");
    println!("  ║  drag  orbit        wheel zoom         ║");
    println!("  ╠════════════════════════════════════════╣");
    println!("  ║  camera on: F1-F5 hold 0-4 fingers     ║");
    println!("  ║  Up/Down open · Left/Right spread · H  ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    let mut flow = Flow::new(args.flow_config(), shape_generator());
    if let Some(color) = args.color {
        flow.submit(StateUpdate::color(color));
    }

    let hand = Rc::new(Cell::new(SimHand::default()));
    flow.attach_gestures(GestureService::new(
        Box::new(SimulatedTracker::new(hand.clone())),
        Box::new(SimulatedVideo::default()),
    ));

    Runtime::run(
        RuntimeConfig {
            title: "Zen Particle Flow".to_string(),
            initial_size: LogicalSize::new(1280.0, 800.0),
        },
        GpuInit::default(),
        StudioApp::new(flow, hand),
    )
}

/// Text shapes need a font; without one they fall back to a sphere.
fn shape_generator() -> ShapeGenerator {
    let Some(bytes) = load_font() else {
        log::warn!("no system font found; text shapes will render as spheres");
        return ShapeGenerator::new();
    };
    match TextRaster::from_font_bytes(&bytes) {
        Ok(raster) => ShapeGenerator::with_raster(raster),
        Err(e) => {
            log::warn!("{e}; text shapes will render as spheres");
            ShapeGenerator::new()
        }
    }
}

fn load_font() -> Option<Vec<u8>> {
    let candidates = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
        "/Library/Fonts/Arial Bold.ttf",
        "C:\\Windows\\Fonts\\arialbd.ttf",
    ];
    candidates.iter().find_map(|p| std::fs::read(p).ok())
}
