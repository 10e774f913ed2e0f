use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fogconfig::{ConfigOverrides, Preset};
use renderer::PointerState;

use crate::bootstrap::{parse_pointer, parse_size};

#[derive(Parser, Debug)]
#[command(
    name = "herofog",
    author,
    version,
    about = "Animated fog background for hero sections",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub fog: FogArgs,
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Palette selection shared by every subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct FogArgs {
    /// Fog configuration file; defaults to `fog.toml` in the config directory.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Base palette: `default` or `hero`.
    #[arg(long, value_name = "NAME", value_parser = parse_preset, global = true)]
    pub preset: Option<Preset>,

    /// Opacity curve exponent (> 0).
    #[arg(long, value_name = "FLOAT", global = true)]
    pub density: Option<f32>,

    /// Time-scale multiplier.
    #[arg(long, value_name = "FLOAT", global = true)]
    pub speed: Option<f32>,

    /// Domain-warp strength.
    #[arg(long, value_name = "FLOAT", global = true)]
    pub warp: Option<f32>,

    /// Highlight tint as `#RRGGBB` or `#RGB`.
    #[arg(long, value_name = "HEX", global = true)]
    pub tint: Option<String>,

    /// Pointer displacement strength.
    #[arg(long, value_name = "FLOAT", global = true)]
    pub pointer_strength: Option<f32>,

    /// Pointer influence radius in UV units (> 0).
    #[arg(long, value_name = "FLOAT", global = true)]
    pub pointer_radius: Option<f32>,

    /// Background color as `#RRGGBB` or `#RGB`.
    #[arg(long, value_name = "HEX", global = true)]
    pub background: Option<String>,
}

impl FogArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            density: self.density,
            speed: self.speed,
            warp: self.warp,
            tint: self.tint.clone(),
            pointer_strength: self.pointer_strength,
            pointer_radius: self.pointer_radius,
            background: self.background.clone(),
        }
    }
}

/// Options for the preview window (the default command).
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Preview window size in logical pixels.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size_arg, default_value = "1280x720")]
    pub window_size: (u32, u32),

    /// Render one still frame instead of animating, as a reduced-motion preference would.
    #[arg(long, env = "HEROFOG_REDUCED_MOTION")]
    pub reduced_motion: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resolved configuration.
    Config(ConfigArgs),
    /// Render one frame on the CPU and write it as a PNG.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print JSON instead of TOML.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Destination PNG path.
    #[arg(long, short, value_name = "PATH")]
    pub output: PathBuf,

    /// Output size in pixels.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size_arg, default_value = "1920x1080")]
    pub size: (u32, u32),

    /// Shader time in seconds.
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    pub time: f32,

    /// Pointer position in shader space, `X,Y` with both in 0..=1 (origin bottom-left).
    #[arg(long, value_name = "X,Y", value_parser = parse_pointer_arg)]
    pub pointer: Option<PointerState>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_preset(value: &str) -> Result<Preset, String> {
    value.parse::<Preset>().map_err(|err| err.to_string())
}

fn parse_size_arg(value: &str) -> Result<(u32, u32), String> {
    parse_size(value).map_err(|err| err.to_string())
}

fn parse_pointer_arg(value: &str) -> Result<PointerState, String> {
    parse_pointer(value).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_parser_accepts_known_names() {
        assert_eq!(parse_preset("hero"), Ok(Preset::Hero));
        assert_eq!(parse_preset(" Default "), Ok(Preset::Default));
        assert!(parse_preset("mist").unwrap_err().contains("unknown preset"));
    }

    #[test]
    fn palette_flags_are_global() {
        let cli = Cli::try_parse_from(["herofog", "export", "--output", "fog.png", "--tint", "#fff"])
            .expect("parse");
        assert_eq!(cli.fog.tint.as_deref(), Some("#fff"));
        match cli.command {
            Some(Command::Export(args)) => {
                assert_eq!(args.size, (1920, 1080));
                assert_eq!(args.time, 0.0);
                assert!(args.pointer.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn defaults_to_preview_window() {
        let cli = Cli::try_parse_from(["herofog"]).expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.run.window_size, (1280, 720));
        assert_eq!(cli.fog.overrides(), ConfigOverrides::default());
    }

    #[test]
    fn rejects_bad_size() {
        assert!(Cli::try_parse_from(["herofog", "--window-size", "0x10"]).is_err());
    }
}
