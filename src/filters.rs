//! Depth post-processing chain: decimation, depth/disparity transforms and
//! edge-preserving spatial smoothing. Runs on Z16 planes in the fixed order
//! decimate -> to-disparity -> smooth -> to-depth; smoothing in disparity
//! space keeps the blur from bleeding across depth discontinuities.

use bytes::Bytes;

use crate::capture::frame::{Frame, FramePayload, VideoPlane};
use crate::FilterConfig;

/// Scale of the depth <-> disparity mapping. Any positive constant round
/// trips; this one keeps disparity values in a range where the smoothing
/// delta threshold behaves like the vendor default.
const DISPARITY_SCALE: f32 = 150_000.0;

pub struct DepthFilterChain {
    magnitude: u32,
    alpha: f32,
    delta: f32,
}

impl DepthFilterChain {
    pub fn new(cfg: &FilterConfig) -> Self {
        Self {
            magnitude: cfg.decimation_magnitude.max(1),
            alpha: cfg.smooth_alpha,
            delta: cfg.smooth_delta,
        }
    }

    /// Filter one depth frame. Non-image frames and non-Z16 planes pass
    /// through untouched; the persistence layer decides what to skip.
    pub fn process(&self, frame: Frame) -> Frame {
        let plane = match frame.as_video() {
            Some(p) if p.bytes_per_pixel == 2 => p,
            _ => return frame,
        };

        let (depth, width, height) = plane_to_u16(plane);
        let (decimated, width, height) = decimate_median(&depth, width, height, self.magnitude);

        let mut disparity: Vec<f32> = decimated.iter().map(|&d| to_disparity(d)).collect();
        smooth(&mut disparity, width, height, self.alpha, self.delta);
        let restored: Vec<u16> = disparity.iter().map(|&d| to_depth(d)).collect();

        let mut data = Vec::with_capacity(restored.len() * 2);
        for v in &restored {
            data.extend_from_slice(&v.to_le_bytes());
        }

        Frame {
            stream: frame.stream,
            number: frame.number,
            attributes: frame.attributes,
            payload: FramePayload::Video(VideoPlane::packed(
                width as u32,
                height as u32,
                2,
                Bytes::from(data),
            )),
        }
    }
}

fn plane_to_u16(plane: &VideoPlane) -> (Vec<u16>, usize, usize) {
    let mut out = Vec::with_capacity((plane.width * plane.height) as usize);
    for row in plane.rows() {
        for px in row.chunks_exact(2) {
            out.push(u16::from_le_bytes([px[0], px[1]]));
        }
    }
    (out, plane.width as usize, plane.height as usize)
}

fn to_disparity(depth: u16) -> f32 {
    // Zero depth marks a hole and stays a hole.
    if depth == 0 {
        0.0
    } else {
        DISPARITY_SCALE / depth as f32
    }
}

fn to_depth(disparity: f32) -> u16 {
    if disparity <= 0.0 {
        0
    } else {
        (DISPARITY_SCALE / disparity).round().clamp(0.0, u16::MAX as f32) as u16
    }
}

/// Downsample by `magnitude` taking the median of the valid (non-zero)
/// depths in each block. Edge blocks are clamped to the image bounds.
fn decimate_median(
    depth: &[u16],
    width: usize,
    height: usize,
    magnitude: u32,
) -> (Vec<u16>, usize, usize) {
    let m = magnitude as usize;
    if m <= 1 {
        return (depth.to_vec(), width, height);
    }

    let out_w = width.div_ceil(m);
    let out_h = height.div_ceil(m);
    let mut out = Vec::with_capacity(out_w * out_h);
    let mut block = Vec::with_capacity(m * m);

    for by in 0..out_h {
        for bx in 0..out_w {
            block.clear();
            for y in (by * m)..((by * m + m).min(height)) {
                for x in (bx * m)..((bx * m + m).min(width)) {
                    let v = depth[y * width + x];
                    if v != 0 {
                        block.push(v);
                    }
                }
            }
            if block.is_empty() {
                out.push(0);
            } else {
                block.sort_unstable();
                out.push(block[block.len() / 2]);
            }
        }
    }
    (out, out_w, out_h)
}

/// One iteration of recursive edge-preserving smoothing: a forward and a
/// backward pass along each row, then along each column. A pixel is pulled
/// toward its predecessor only when both are valid and the step between
/// them is within `delta`.
fn smooth(disparity: &mut [f32], width: usize, height: usize, alpha: f32, delta: f32) {
    let blend = |v: f32, prev: f32| -> f32 {
        if v == 0.0 || prev == 0.0 {
            return v;
        }
        if (v - prev).abs() <= delta {
            alpha * v + (1.0 - alpha) * prev
        } else {
            v
        }
    };

    for y in 0..height {
        let row = &mut disparity[y * width..(y + 1) * width];
        for x in 1..width {
            row[x] = blend(row[x], row[x - 1]);
        }
        for x in (0..width.saturating_sub(1)).rev() {
            row[x] = blend(row[x], row[x + 1]);
        }
    }
    for x in 0..width {
        for y in 1..height {
            disparity[y * width + x] = blend(disparity[y * width + x], disparity[(y - 1) * width + x]);
        }
        for y in (0..height.saturating_sub(1)).rev() {
            disparity[y * width + x] = blend(disparity[y * width + x], disparity[(y + 1) * width + x]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::frame::{FrameAttributes, StreamKind};
    use crate::Config;

    fn depth_frame(width: u32, height: u32, fill: impl Fn(usize) -> u16) -> Frame {
        let mut data = Vec::with_capacity((width * height * 2) as usize);
        for i in 0..(width * height) as usize {
            data.extend_from_slice(&fill(i).to_le_bytes());
        }
        Frame {
            stream: StreamKind::Depth,
            number: 7,
            attributes: FrameAttributes::new(),
            payload: FramePayload::Video(VideoPlane::packed(width, height, 2, Bytes::from(data))),
        }
    }

    #[test]
    fn decimation_shrinks_dimensions() {
        let chain = DepthFilterChain::new(&Config::default().filter);
        let out = chain.process(depth_frame(12, 9, |_| 1000));
        let plane = out.as_video().unwrap();
        assert_eq!((plane.width, plane.height), (4, 3));
        assert_eq!(plane.data.len(), 4 * 3 * 2);
    }

    #[test]
    fn uneven_dimensions_round_up() {
        let chain = DepthFilterChain::new(&Config::default().filter);
        let out = chain.process(depth_frame(10, 7, |_| 1000));
        let plane = out.as_video().unwrap();
        assert_eq!((plane.width, plane.height), (4, 3));
    }

    #[test]
    fn flat_plane_survives_the_chain() {
        let chain = DepthFilterChain::new(&Config::default().filter);
        let out = chain.process(depth_frame(9, 9, |_| 2000));
        let plane = out.as_video().unwrap();
        for px in plane.data.chunks_exact(2) {
            let v = u16::from_le_bytes([px[0], px[1]]);
            assert!((1999..=2001).contains(&v), "got {v}");
        }
    }

    #[test]
    fn holes_stay_holes() {
        let chain = DepthFilterChain::new(&Config::default().filter);
        // all-zero frame: every block median is 0
        let out = chain.process(depth_frame(9, 9, |_| 0));
        let plane = out.as_video().unwrap();
        assert!(plane.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn disparity_round_trip_is_lossless_enough() {
        for d in [1u16, 100, 1000, 40_000, u16::MAX] {
            let back = to_depth(to_disparity(d));
            assert!((back as i32 - d as i32).abs() <= 1, "{d} -> {back}");
        }
        assert_eq!(to_depth(to_disparity(0)), 0);
    }

    #[test]
    fn non_video_frame_passes_through() {
        let chain = DepthFilterChain::new(&Config::default().filter);
        let frame = Frame {
            stream: StreamKind::Depth,
            number: 3,
            attributes: FrameAttributes::new(),
            payload: FramePayload::Other,
        };
        assert!(chain.process(frame).as_video().is_none());
    }
}
