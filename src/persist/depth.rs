//! Depth persistence: filter chain, raw dump, metadata sidecar.

use std::fs::File;
use std::io::{BufWriter, Write};

use tracing::debug;

use crate::capture::frame::Frame;
use crate::filters::DepthFilterChain;
use crate::persist::layout::OutputLayout;
use crate::persist::metadata::write_metadata;
use crate::Result;

/// Filter one depth frame and write its raw buffer plus sidecar. Non-image
/// frames are skipped silently; that is the only recovered condition in
/// the program. The frame number in both filenames is the one carried by
/// the frame *after* filtering.
pub fn save_depth_frame(
    layout: &OutputLayout,
    label: &str,
    frame: Frame,
    chain: &DepthFilterChain,
) -> Result<()> {
    let filtered = chain.process(frame);
    let Some(plane) = filtered.as_video() else {
        debug!("skipping non-image depth frame");
        return Ok(());
    };

    let raw_path = layout.depth_raw(label, filtered.number);
    let mut out = BufWriter::new(File::create(&raw_path)?);
    // width * height * bytes_per_pixel bytes, row-major, no header
    for row in plane.rows() {
        out.write_all(row)?;
    }
    out.flush()?;

    println!("Saved {}", raw_path.display());

    write_metadata(&filtered, &layout.depth_metadata(label, filtered.number))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::frame::{FrameAttributes, FramePayload, StreamKind, VideoPlane};
    use crate::Config;
    use bytes::Bytes;

    fn chain() -> DepthFilterChain {
        DepthFilterChain::new(&Config::default().filter)
    }

    fn layout() -> (tempfile::TempDir, OutputLayout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        layout.ensure_dirs().unwrap();
        (dir, layout)
    }

    #[test]
    fn raw_length_matches_filtered_dimensions() {
        let (_dir, layout) = layout();
        let width = 12u32;
        let height = 9u32;
        let data: Vec<u8> = std::iter::repeat(1500u16.to_le_bytes())
            .take((width * height) as usize)
            .flatten()
            .collect();
        let frame = Frame {
            stream: StreamKind::Depth,
            number: 3,
            attributes: FrameAttributes::new(),
            payload: FramePayload::Video(VideoPlane::packed(width, height, 2, Bytes::from(data))),
        };

        save_depth_frame(&layout, "rig1", frame, &chain()).unwrap();

        // magnitude 3: 12x9 decimates to 4x3
        let raw = std::fs::read(layout.depth_raw("rig1", 3)).unwrap();
        assert_eq!(raw.len(), 4 * 3 * 2);
        assert!(layout.depth_metadata("rig1", 3).exists());
    }

    #[test]
    fn non_image_frame_writes_nothing() {
        let (_dir, layout) = layout();
        let frame = Frame {
            stream: StreamKind::Depth,
            number: 9,
            attributes: FrameAttributes::new(),
            payload: FramePayload::Other,
        };

        save_depth_frame(&layout, "rig1", frame, &chain()).unwrap();

        assert!(!layout.depth_raw("rig1", 9).exists());
        assert!(!layout.depth_metadata("rig1", 9).exists());
    }
}
