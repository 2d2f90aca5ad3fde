//! Binary entrypoint for the poster dither viewer.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use poster_dither::config::Configuration;
use poster_dither::processing::DitherStrategy;
use poster_dither::processing::color::InkColor;
use poster_dither::tasks::viewer;

/// Dithered poster background viewer
#[derive(Debug, Parser)]
#[command(name = "poster-dither", about = "Dithered, tilted poster backgrounds")]
struct Cli {
    /// Path to YAML config file; defaults apply when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Image to show on start
    #[arg(value_name = "IMAGE")]
    image: Option<PathBuf>,

    /// Dither strategy (error-diffusion or ordered)
    #[arg(long, value_name = "STRATEGY")]
    strategy: Option<DitherStrategy>,

    /// Initial ink color as #rrggbb
    #[arg(long, value_name = "COLOR")]
    ink: Option<InkColor>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("poster_dither={level}").parse()?)
        .add_directive("wgpu=warn".parse()?)
        .add_directive("winit=warn".parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = match &cli.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Configuration::default(),
    };
    if let Some(strategy) = cli.strategy {
        cfg.strategy = strategy;
    }
    if let Some(ink) = cli.ink {
        cfg.ink_color = ink;
    }
    let cfg = cfg.validated().context("validating configuration")?;
    info!(strategy = %cfg.strategy, ink = %cfg.ink_color, "configuration loaded");

    // The event loop owns the main thread; async work runs on the runtime.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let cancel = CancellationToken::new();

    let ctrl_c = {
        let cancel = cancel.clone();
        runtime.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received; shutting down");
                cancel.cancel();
            }
        })
    };

    let result = viewer::run_windowed(cfg, cli.image, runtime.handle().clone(), cancel);
    ctrl_c.abort();
    runtime.shutdown_background();
    result
}
