//! Hardware backend over librealsense2. Opens the device, applies the two
//! fixed stream profiles and exposes blocking frame-set acquisition.

use std::collections::HashSet;

use bytes::Bytes;
use realsense_rust::{
    config::Config as RsConfig,
    context::Context,
    frame::{ColorFrame, DepthFrame, FrameEx, PixelKind},
    kind::{Rs2Format, Rs2FrameMetadata, Rs2ProductLine, Rs2StreamKind},
    pipeline::{ActivePipeline, InactivePipeline},
};
use tracing::info;

use crate::capture::frame::{
    Frame, FrameAttribute, FrameAttributes, FramePayload, FrameSet, StreamKind, VideoPlane,
};
use crate::capture::source::FrameSource;
use crate::{Config, Error, PixelFormat, Result};

pub struct RealSenseSource {
    pipeline: ActivePipeline,
    // The session must outlive every frame handed out; keep the SDK
    // context alive alongside the pipeline.
    _context: Context,
}

impl RealSenseSource {
    /// Enumerate devices, apply the fixed dual-stream configuration and
    /// start the session. Fails fast when no device is attached.
    pub fn open(config: &Config) -> Result<Self> {
        let context = Context::new().map_err(|e| Error::device("Context::new", e))?;

        let mut product_lines = HashSet::new();
        product_lines.insert(Rs2ProductLine::Any);
        let devices = context.query_devices(product_lines);
        if devices.is_empty() {
            return Err(Error::NoDeviceFound);
        }
        info!(count = devices.len(), "depth camera(s) found");

        let pipeline = InactivePipeline::try_from(&context)
            .map_err(|e| Error::device("InactivePipeline::try_from", e))?;

        let mut rs_config = RsConfig::new();
        rs_config
            .disable_all_streams()
            .map_err(|e| Error::device("disable_all_streams", e))?;
        for stream in [&config.streams.depth, &config.streams.color] {
            let (kind, format) = match stream.format {
                PixelFormat::Z16 => (Rs2StreamKind::Depth, Rs2Format::Z16),
                PixelFormat::Rgb8 => (Rs2StreamKind::Color, Rs2Format::Rgb8),
            };
            rs_config
                .enable_stream(
                    kind,
                    None,
                    stream.width as usize,
                    stream.height as usize,
                    format,
                    stream.fps as usize,
                )
                .map_err(|e| Error::device("enable_stream", e))?;
        }

        let pipeline = pipeline
            .start(Some(rs_config))
            .map_err(|e| Error::device("pipeline start", e))?;

        Ok(Self {
            pipeline,
            _context: context,
        })
    }
}

impl FrameSource for RealSenseSource {
    fn wait_for_frames(&mut self) -> Result<FrameSet> {
        let frames = self
            .pipeline
            .wait(None)
            .map_err(|e| Error::device("wait_for_frames", e))?;

        let depth = frames
            .frames_of_type::<DepthFrame>()
            .pop()
            .map(|f| convert_depth(&f))
            .unwrap_or_else(|| empty_frame(StreamKind::Depth));
        let color = frames
            .frames_of_type::<ColorFrame>()
            .pop()
            .map(|f| convert_color(&f))
            .unwrap_or_else(|| empty_frame(StreamKind::Color));

        Ok(FrameSet { depth, color })
    }
}

/// A frame-set slot with no image payload; the persistence tasks skip it.
fn empty_frame(stream: StreamKind) -> Frame {
    Frame {
        stream,
        number: 0,
        attributes: FrameAttributes::new(),
        payload: FramePayload::Other,
    }
}

fn convert_depth(frame: &DepthFrame) -> Frame {
    let width = frame.width() as u32;
    let height = frame.height() as u32;
    let mut data = Vec::with_capacity((width * height * 2) as usize);
    for pixel in frame.iter() {
        if let PixelKind::Z16 { depth } = pixel {
            data.extend_from_slice(&depth.to_le_bytes());
        }
    }

    Frame {
        stream: StreamKind::Depth,
        number: frame.frame_number(),
        attributes: read_attributes(frame),
        payload: FramePayload::Video(VideoPlane::packed(width, height, 2, Bytes::from(data))),
    }
}

fn convert_color(frame: &ColorFrame) -> Frame {
    let width = frame.width() as u32;
    let height = frame.height() as u32;
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for pixel in frame.iter() {
        if let PixelKind::Rgb8 { r, g, b } = pixel {
            data.extend_from_slice(&[*r, *g, *b]);
        }
    }

    Frame {
        stream: StreamKind::Color,
        number: frame.frame_number(),
        attributes: read_attributes(frame),
        payload: FramePayload::Video(VideoPlane::packed(width, height, 3, Bytes::from(data))),
    }
}

fn read_attributes(frame: &impl FrameEx) -> FrameAttributes {
    let mut attributes = FrameAttributes::new();
    for attr in FrameAttribute::ALL {
        let kind = match attr {
            FrameAttribute::FrameCounter => Rs2FrameMetadata::FrameCounter,
            FrameAttribute::FrameTimestamp => Rs2FrameMetadata::FrameTimestamp,
            FrameAttribute::SensorTimestamp => Rs2FrameMetadata::SensorTimestamp,
            FrameAttribute::ActualExposure => Rs2FrameMetadata::ActualExposure,
            FrameAttribute::GainLevel => Rs2FrameMetadata::GainLevel,
            FrameAttribute::AutoExposure => Rs2FrameMetadata::AutoExposure,
            FrameAttribute::WhiteBalance => Rs2FrameMetadata::WhiteBalance,
            FrameAttribute::TimeOfArrival => Rs2FrameMetadata::TimeOfArrival,
            FrameAttribute::Temperature => Rs2FrameMetadata::Temperature,
            FrameAttribute::BackendTimestamp => Rs2FrameMetadata::BackendTimestamp,
            FrameAttribute::ActualFps => Rs2FrameMetadata::ActualFps,
            FrameAttribute::FrameLaserPower => Rs2FrameMetadata::FrameLaserPower,
            FrameAttribute::FrameLaserPowerMode => Rs2FrameMetadata::FrameLaserPowerMode,
            FrameAttribute::ExposurePriority => Rs2FrameMetadata::ExposurePriority,
            FrameAttribute::ExposureRoiLeft => Rs2FrameMetadata::ExposureRoiLeft,
            FrameAttribute::ExposureRoiRight => Rs2FrameMetadata::ExposureRoiRight,
            FrameAttribute::ExposureRoiTop => Rs2FrameMetadata::ExposureRoiTop,
            FrameAttribute::ExposureRoiBottom => Rs2FrameMetadata::ExposureRoiBottom,
            FrameAttribute::Brightness => Rs2FrameMetadata::Brightness,
            FrameAttribute::Contrast => Rs2FrameMetadata::Contrast,
            FrameAttribute::Saturation => Rs2FrameMetadata::Saturation,
            FrameAttribute::Sharpness => Rs2FrameMetadata::Sharpness,
            FrameAttribute::AutoWhiteBalanceTemperature => {
                Rs2FrameMetadata::AutoWhiteBalanceTemperature
            }
            FrameAttribute::BacklightCompensation => Rs2FrameMetadata::BacklightCompensation,
            FrameAttribute::Hue => Rs2FrameMetadata::Hue,
            FrameAttribute::Gamma => Rs2FrameMetadata::Gamma,
            FrameAttribute::ManualWhiteBalance => Rs2FrameMetadata::ManualWhiteBalance,
            FrameAttribute::PowerLineFrequency => Rs2FrameMetadata::PowerLineFrequency,
            FrameAttribute::LowLightCompensation => Rs2FrameMetadata::LowLightCompensation,
            FrameAttribute::FrameEmitterMode => Rs2FrameMetadata::FrameEmitterMode,
            FrameAttribute::FrameLedPower => Rs2FrameMetadata::FrameLedPower,
            FrameAttribute::RawFrameSize => Rs2FrameMetadata::RawFrameSize,
            FrameAttribute::GpioInputData => Rs2FrameMetadata::GpioInputData,
            FrameAttribute::SequenceName => Rs2FrameMetadata::SequenceName,
            FrameAttribute::SequenceId => Rs2FrameMetadata::SequenceId,
            FrameAttribute::SequenceSize => Rs2FrameMetadata::SequenceSize,
        };
        if frame.supports_metadata(kind) {
            if let Some(value) = frame.metadata(kind) {
                attributes.set(attr, value);
            }
        }
    }
    attributes
}
