//! Capture pipeline: warm-up, capture loop, bounded fan-out of persistence
//! tasks, join-all.
//!
//! Acquisition runs on a dedicated blocking thread that owns the source and
//! feeds a bounded channel, so the capture loop only ever blocks on the
//! camera, never on disk. Each frame-set fans out into two independent save
//! tasks (depth, color) with no ordering guarantee between them; the number
//! of tasks in flight is capped instead of spawning one thread per frame.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::capture::frame::FrameSet;
use crate::capture::FrameSource;
use crate::filters::DepthFilterChain;
use crate::persist::{save_color_frame, save_depth_frame, OutputLayout};
use crate::{Config, Error, Result, RunParameters};

pub async fn run<S>(source: S, params: &RunParameters, config: &Config) -> Result<()>
where
    S: FrameSource + 'static,
{
    let layout = OutputLayout::new(&config.pipeline.output_root);
    layout.ensure_dirs()?;

    let chain = Arc::new(DepthFilterChain::new(&config.filter));
    let label: Arc<str> = Arc::from(params.device_label.as_str());

    let (tx, rx) = flume::bounded::<FrameSet>(config.pipeline.channel_capacity.max(1));
    let warmup = config.warmup_frames;
    let num_frames = params.num_frames;

    // Acquisition thread. Owns the source for the whole run; captures
    // strictly in order. Any device error ends the run.
    let mut source = source;
    let capture = tokio::task::spawn_blocking(move || -> Result<()> {
        for _ in 0..warmup {
            source.wait_for_frames()?;
        }
        debug!(warmup, "warm-up window drained");

        for _ in 0..num_frames {
            let set = source.wait_for_frames()?;
            if tx.send(set).is_err() {
                return Err(Error::ChannelClosed);
            }
        }
        Ok(())
    });

    let max_inflight = config.pipeline.max_inflight_saves.max(2);
    let mut saves: JoinSet<Result<()>> = JoinSet::new();

    while let Ok(set) = rx.recv_async().await {
        let FrameSet { depth, color } = set;

        // Cap the fan-out: once the in-flight set is full, retire the
        // oldest finished task before dispatching more. A failed save is
        // fatal; in-flight siblings are abandoned with it.
        while saves.len() >= max_inflight {
            join_one(&mut saves).await?;
        }

        let depth_layout = layout.clone();
        let depth_label = Arc::clone(&label);
        let depth_chain = Arc::clone(&chain);
        saves.spawn_blocking(move || {
            save_depth_frame(&depth_layout, &depth_label, depth, &depth_chain)
        });

        let color_layout = layout.clone();
        let color_label = Arc::clone(&label);
        saves.spawn_blocking(move || save_color_frame(&color_layout, &color_label, color));
    }

    // Channel drained: the acquisition thread is done. Surface its error
    // before waiting on stragglers.
    capture
        .await
        .map_err(|e| Error::device("capture thread", e))??;

    while !saves.is_empty() {
        join_one(&mut saves).await?;
    }

    info!(num_frames, label = %params.device_label, "capture complete");
    Ok(())
}

async fn join_one(saves: &mut JoinSet<Result<()>>) -> Result<()> {
    match saves.join_next().await {
        Some(Ok(result)) => result,
        Some(Err(join_err)) => Err(Error::device("persistence task", join_err)),
        None => Ok(()),
    }
}
