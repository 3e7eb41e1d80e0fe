//! rigcap - one-shot depth + color frame capture for a camera rig.
//!
//! `rigcap <num_frames> <device_label>` captures the requested number of
//! synchronized frame-sets and writes each frame plus a metadata sidecar
//! under the working directory.

use color_eyre::{eyre::eyre, Result};
use tracing::info;

use rigcap::capture::realsense::RealSenseSource;
use rigcap::{pipeline, Config, RunParameters};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    // stdout carries the "Saved <path>" lines; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter("rigcap=info")
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    // Base-10 parse; a non-numeric count falls back to zero frames.
    let num_frames = args.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let device_label = args
        .next()
        .ok_or_else(|| eyre!("usage: rigcap <num_frames> <device_label>"))?;

    let params = RunParameters {
        num_frames,
        device_label,
    };
    let config = Config::default();

    info!(
        num_frames = params.num_frames,
        label = %params.device_label,
        "starting capture"
    );

    let source = RealSenseSource::open(&config)?;
    pipeline::run(source, &params, &config).await?;

    Ok(())
}
