use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use fogconfig::{ConfigFile, RenderConfig};
use renderer::PointerState;

use crate::cli::FogArgs;
use crate::paths::AppPaths;

/// Parses `WIDTHxHEIGHT`.
pub fn parse_size(spec: &str) -> Result<(u32, u32)> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| anyhow::anyhow!("expected WxH format, e.g. 1920x1080"))?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid width in size specification"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid height in size specification"))?;

    if width == 0 || height == 0 {
        bail!("dimensions must be greater than zero");
    }

    Ok((width, height))
}

/// Parses `X,Y` in shader space.
pub fn parse_pointer(spec: &str) -> Result<PointerState> {
    let (x, y) = spec
        .trim()
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("expected X,Y format, e.g. 0.5,0.5"))?;
    let parse_axis = |raw: &str, axis: &str| -> Result<f32> {
        let value: f32 = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid pointer {axis} '{}'", raw.trim()))?;
        if !(0.0..=1.0).contains(&value) {
            bail!("pointer {axis} must be within 0..=1, got {value}");
        }
        Ok(value)
    };
    Ok(PointerState {
        x: parse_axis(x, "x")?,
        y: parse_axis(y, "y")?,
    })
}

/// Picks the config file to load: `--config` wins, then `fog.toml` in the
/// config directory when it exists.
pub fn locate_config(args: &FogArgs, paths: &AppPaths) -> Option<PathBuf> {
    if let Some(path) = &args.config {
        return Some(path.clone());
    }
    let candidate = paths.config_file();
    candidate.is_file().then_some(candidate)
}

/// Layers preset, file and command-line values, then validates the result once.
pub fn resolve_fog_config(args: &FogArgs, config_path: Option<&Path>) -> Result<RenderConfig> {
    let file = match config_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read fog config {}", path.display()))?;
            let file = ConfigFile::from_toml_str(&text)
                .with_context(|| format!("invalid fog config {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded fog config");
            file
        }
        None => ConfigFile::default(),
    };

    file.resolve_with(args.preset, &args.overrides())
        .context("invalid fog configuration")
}
