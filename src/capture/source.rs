//! Acquisition backends. `FrameSource` is the seam between the pipeline
//! and whatever produces frame-sets: the RealSense backend on a rig, the
//! synthetic source in tests and dry runs.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;

use crate::capture::frame::{
    Frame, FrameAttribute, FrameAttributes, FramePayload, FrameSet, StreamKind, VideoPlane,
};
use crate::{Result, StreamsConfig};

/// Blocking frame-set producer. One acquisition per call; errors are fatal
/// to the run (the pipeline never retries or skips).
pub trait FrameSource: Send {
    fn wait_for_frames(&mut self) -> Result<FrameSet>;
}

/// In-process source producing deterministic frame-sets. Used by the
/// integration tests and useful for exercising the output layout without
/// a camera attached.
pub struct SyntheticSource {
    streams: StreamsConfig,
    acquisitions: Arc<AtomicU64>,
    non_video: HashSet<(StreamKind, u64)>,
}

impl SyntheticSource {
    pub fn new(streams: StreamsConfig) -> Self {
        Self {
            streams,
            acquisitions: Arc::new(AtomicU64::new(0)),
            non_video: HashSet::new(),
        }
    }

    /// Make acquisition `index` (0-based, warm-up included) yield a
    /// non-image payload on `stream`.
    pub fn mark_non_video(&mut self, stream: StreamKind, index: u64) {
        self.non_video.insert((stream, index));
    }

    /// Shared acquisition counter, clonable before the source moves into
    /// the pipeline.
    pub fn acquisition_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.acquisitions)
    }

    fn make_frame(&self, stream: StreamKind, index: u64) -> Frame {
        let cfg = match stream {
            StreamKind::Depth => &self.streams.depth,
            StreamKind::Color => &self.streams.color,
        };
        // Depth and color sensors count independently; model that with
        // disjoint number ranges.
        let number = match stream {
            StreamKind::Depth => 100 + index,
            StreamKind::Color => 500 + index,
        };

        let mut attributes = FrameAttributes::new();
        attributes.set(FrameAttribute::FrameCounter, number as i64);
        attributes.set(FrameAttribute::FrameTimestamp, (index as i64) * 66_667);
        attributes.set(FrameAttribute::TimeOfArrival, 1_700_000_000 + index as i64);
        match stream {
            StreamKind::Depth => {
                attributes.set(FrameAttribute::GainLevel, 16);
            }
            StreamKind::Color => {
                attributes.set(FrameAttribute::ActualExposure, 156);
                attributes.set(FrameAttribute::WhiteBalance, 4600);
            }
        }

        let payload = if self.non_video.contains(&(stream, index)) {
            FramePayload::Other
        } else {
            let bpp = cfg.format.bytes_per_pixel();
            let len = (cfg.width * cfg.height * bpp) as usize;
            let data: Vec<u8> = (0..len).map(|i| (i as u64 + number) as u8).collect();
            FramePayload::Video(VideoPlane::packed(
                cfg.width,
                cfg.height,
                bpp,
                Bytes::from(data),
            ))
        };

        Frame {
            stream,
            number,
            attributes,
            payload,
        }
    }
}

impl FrameSource for SyntheticSource {
    fn wait_for_frames(&mut self) -> Result<FrameSet> {
        let index = self.acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(FrameSet {
            depth: self.make_frame(StreamKind::Depth, index),
            color: self.make_frame(StreamKind::Color, index),
        })
    }
}
