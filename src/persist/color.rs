//! Color persistence: PNG encode, metadata sidecar. No filtering is
//! applied to color frames; the frame number is read before encoding.

use image::ExtendedColorType;
use tracing::debug;

use crate::capture::frame::Frame;
use crate::persist::layout::OutputLayout;
use crate::persist::metadata::write_metadata;
use crate::{Error, Result};

pub fn save_color_frame(layout: &OutputLayout, label: &str, frame: Frame) -> Result<()> {
    let Some(plane) = frame.as_video() else {
        debug!("skipping non-image color frame");
        return Ok(());
    };

    let color_type = match plane.bytes_per_pixel {
        1 => ExtendedColorType::L8,
        3 => ExtendedColorType::Rgb8,
        4 => ExtendedColorType::Rgba8,
        other => return Err(Error::UnsupportedPixelLayout(other)),
    };

    // Repack rows in case the buffer carries stride padding; the encoder
    // expects tightly packed pixels.
    let mut pixels = Vec::with_capacity(plane.row_len() * plane.height as usize);
    for row in plane.rows() {
        pixels.extend_from_slice(row);
    }

    let png_path = layout.colour_png(label, frame.number);
    image::save_buffer(&png_path, &pixels, plane.width, plane.height, color_type)?;

    println!("Saved {}", png_path.display());

    write_metadata(&frame, &layout.colour_metadata(label, frame.number))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::frame::{FrameAttributes, FramePayload, StreamKind, VideoPlane};
    use bytes::Bytes;

    fn layout() -> (tempfile::TempDir, OutputLayout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        layout.ensure_dirs().unwrap();
        (dir, layout)
    }

    fn rgb_frame(number: u64, width: u32, height: u32, stride: u32) -> Frame {
        let mut data = Vec::new();
        for y in 0..height {
            let mut row = vec![0u8; stride as usize];
            for x in 0..(width * 3) as usize {
                row[x] = (x as u32 + y) as u8;
            }
            data.extend_from_slice(&row);
        }
        Frame {
            stream: StreamKind::Color,
            number,
            attributes: FrameAttributes::new(),
            payload: FramePayload::Video(VideoPlane {
                width,
                height,
                bytes_per_pixel: 3,
                stride,
                data: Bytes::from(data),
            }),
        }
    }

    #[test]
    fn writes_decodable_png_and_sidecar() {
        let (_dir, layout) = layout();
        save_color_frame(&layout, "rig1", rgb_frame(5, 8, 4, 8 * 3)).unwrap();

        let png = image::open(layout.colour_png("rig1", 5)).unwrap();
        assert_eq!((png.width(), png.height()), (8, 4));
        assert!(layout.colour_metadata("rig1", 5).exists());
    }

    #[test]
    fn stride_padding_does_not_leak_into_pixels() {
        let (_dir, layout) = layout();
        // 16 bytes of padding per row
        save_color_frame(&layout, "rig1", rgb_frame(6, 8, 4, 8 * 3 + 16)).unwrap();

        let padded = image::open(layout.colour_png("rig1", 6)).unwrap().into_rgb8();

        let (_dir2, layout2) = self::layout();
        save_color_frame(&layout2, "rig1", rgb_frame(6, 8, 4, 8 * 3)).unwrap();
        let tight = image::open(layout2.colour_png("rig1", 6)).unwrap().into_rgb8();

        assert_eq!(padded.as_raw(), tight.as_raw());
    }

    #[test]
    fn non_image_frame_writes_nothing() {
        let (_dir, layout) = layout();
        let frame = Frame {
            stream: StreamKind::Color,
            number: 2,
            attributes: FrameAttributes::new(),
            payload: FramePayload::Other,
        };

        save_color_frame(&layout, "rig1", frame).unwrap();

        assert!(!layout.colour_png("rig1", 2).exists());
        assert!(!layout.colour_metadata("rig1", 2).exists());
    }
}
