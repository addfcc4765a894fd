use clap::Parser;
use zen_flow::{FlowConfig, Rgb, ShapeId};

/// Interactive particle cloud steered by (simulated) hand gestures.
#[derive(Parser, Debug)]
#[command(name = "zen-studio", version, about)]
pub struct StudioArgs {
    /// Particle count (clamped to 1000-20000)
    #[arg(long, value_name = "N")]
    pub particles: Option<usize>,

    /// Initial shape: sphere, heart, flower, saturn, buddha, fireworks,
    /// jagannath, bow, text-a or text-b
    #[arg(long, value_name = "NAME", value_parser = parse_shape)]
    pub shape: Option<ShapeId>,

    /// Particle color, e.g. #3b82f6 (default: shape theme)
    #[arg(long, value_name = "HEX", value_parser = parse_color)]
    pub color: Option<Rgb>,

    /// Start with the simulated camera on
    #[arg(long, default_value_t = false)]
    pub camera: bool,

    /// env_logger filter, e.g. debug or zen_flow=debug
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,
}

impl StudioArgs {
    /// Startup config; out-of-range values are clamped when the flow applies them.
    pub fn flow_config(&self) -> FlowConfig {
        let mut config = FlowConfig::default();
        if let Some(n) = self.particles {
            config.particle_count = n;
        }
        if let Some(s) = self.shape {
            config.shape = s;
        }
        config.camera_enabled = self.camera;
        config
    }
}

fn parse_shape(s: &str) -> Result<ShapeId, String> {
    ShapeId::from_name(s).ok_or_else(|| format!("unknown shape {s:?}"))
}

fn parse_color(s: &str) -> Result<Rgb, String> {
    Rgb::parse_hex(s).ok_or_else(|| format!("expected #rrggbb, got {s:?}"))
}
