pub mod capture;
pub mod error;
pub mod filters;
pub mod persist;
pub mod pipeline;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use capture::frame::{PixelFormat, StreamKind};
pub use error::{Error, Result};

/// Warm-up acquisitions discarded before recorded capture so autoexposure
/// and auto-gain settle. Fixed policy, not configurable at runtime.
pub const WARMUP_FRAMES: u32 = 30;

/// Decimation filter magnitude applied to every depth frame.
pub const DECIMATION_MAGNITUDE: u32 = 3;

/// Smoothing weight of the spatial filter (lower = stronger smoothing).
pub const SMOOTH_ALPHA: f32 = 0.6;

/// Step threshold of the spatial filter, in disparity units. Steps larger
/// than this are treated as true edges and left alone.
pub const SMOOTH_DELTA: f32 = 20.0;

/// Cap on concurrently running persistence tasks.
pub const MAX_INFLIGHT_SAVES: usize = 8;

/// System configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub streams: StreamsConfig,
    pub warmup_frames: u32,
    pub filter: FilterConfig,
    pub pipeline: PipelineConfig,
}

/// One fixed stream configuration, applied before session start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    pub kind: StreamKind,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub fps: u32,
}

/// Exactly one config per stream kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamsConfig {
    pub depth: StreamConfig,
    pub color: StreamConfig,
}

/// Knobs of the depth post-processing chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub decimation_magnitude: u32,
    pub smooth_alpha: f32,
    pub smooth_delta: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum persistence tasks in flight at once.
    pub max_inflight_saves: usize,
    /// Bound of the acquisition -> dispatch channel.
    pub channel_capacity: usize,
    /// Root the output tree is written under.
    pub output_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            streams: StreamsConfig {
                depth: StreamConfig {
                    kind: StreamKind::Depth,
                    width: 1280,
                    height: 720,
                    format: PixelFormat::Z16,
                    fps: 15,
                },
                color: StreamConfig {
                    kind: StreamKind::Color,
                    width: 424,
                    height: 240,
                    format: PixelFormat::Rgb8,
                    fps: 15,
                },
            },
            warmup_frames: WARMUP_FRAMES,
            filter: FilterConfig {
                decimation_magnitude: DECIMATION_MAGNITUDE,
                smooth_alpha: SMOOTH_ALPHA,
                smooth_delta: SMOOTH_DELTA,
            },
            pipeline: PipelineConfig {
                max_inflight_saves: MAX_INFLIGHT_SAVES,
                channel_capacity: 4,
                output_root: PathBuf::from("."),
            },
        }
    }
}

/// Per-run parameters taken from the command line, immutable after parse.
#[derive(Debug, Clone)]
pub struct RunParameters {
    pub num_frames: u64,
    /// Used verbatim as the filename prefix, no sanitization.
    pub device_label: String,
}
