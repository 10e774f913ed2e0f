use std::io::{self, Write};

use anyhow::{Context, Result};
use fogconfig::RenderConfig;
use renderer::{ExportTarget, RenderMode, Renderer, RendererConfig};
use tracing_subscriber::EnvFilter;

use crate::bootstrap::{locate_config, resolve_fog_config};
use crate::cli::{Cli, Command, ConfigArgs, ExportArgs, RunArgs};
use crate::paths::AppPaths;

pub fn run(cli: Cli) -> Result<()> {
    initialise_tracing();

    let paths = AppPaths::discover()?;
    let config_path = locate_config(&cli.fog, &paths);
    tracing::debug!(
        config_dir = %paths.config_dir().display(),
        config = ?config_path,
        "resolved herofog paths"
    );
    let fog = resolve_fog_config(&cli.fog, config_path.as_deref())?;

    match cli.command {
        None => run_preview(fog, cli.run),
        Some(Command::Config(args)) => print_config(&fog, &args),
        Some(Command::Export(args)) => run_export(fog, args),
    }
}

// Logs go to stderr so `config` output stays machine-readable.
fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run_preview(fog: RenderConfig, args: RunArgs) -> Result<()> {
    tracing::info!(
        width = args.window_size.0,
        height = args.window_size.1,
        reduced_motion = args.reduced_motion,
        "launching fog preview"
    );
    Renderer::new(RendererConfig {
        fog,
        window_size: args.window_size,
        reduced_motion: args.reduced_motion,
        mode: RenderMode::Windowed,
    })
    .run()
}

fn run_export(fog: RenderConfig, args: ExportArgs) -> Result<()> {
    let target = ExportTarget {
        path: args.output,
        size: args.size,
        time: args.time,
        pointer: args.pointer.unwrap_or_default(),
    };
    Renderer::new(RendererConfig {
        fog,
        mode: RenderMode::Export(target),
        ..RendererConfig::default()
    })
    .run()
}

fn print_config(fog: &RenderConfig, args: &ConfigArgs) -> Result<()> {
    let rendered = if args.json {
        serde_json::to_string_pretty(fog).context("failed to encode config as JSON")?
    } else {
        toml::to_string_pretty(fog).context("failed to encode config as TOML")?
    };
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", rendered.trim_end()).context("failed to write config")?;
    Ok(())
}
