//! Frame model shared by every backend: one captured image (or non-image
//! payload) plus its capability-gated metadata attributes.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamKind {
    Depth,
    Color,
}

impl StreamKind {
    /// Name written into the first line of a metadata sidecar.
    pub fn name(self) -> &'static str {
        match self {
            StreamKind::Depth => "Depth",
            StreamKind::Color => "Color",
        }
    }
}

/// Pixel formats the rig streams in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 16-bit depth, little endian.
    Z16,
    /// 8-bit RGB, 3 bytes per pixel.
    Rgb8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Z16 => 2,
            PixelFormat::Rgb8 => 3,
        }
    }
}

/// Per-frame sensor attributes, the SDK's full metadata table in its
/// canonical enumeration order. Not every frame supports every attribute;
/// the sidecar writer walks `ALL` in order and keeps only the supported
/// ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum FrameAttribute {
    FrameCounter,
    FrameTimestamp,
    SensorTimestamp,
    ActualExposure,
    GainLevel,
    AutoExposure,
    WhiteBalance,
    TimeOfArrival,
    Temperature,
    BackendTimestamp,
    ActualFps,
    FrameLaserPower,
    FrameLaserPowerMode,
    ExposurePriority,
    ExposureRoiLeft,
    ExposureRoiRight,
    ExposureRoiTop,
    ExposureRoiBottom,
    Brightness,
    Contrast,
    Saturation,
    Sharpness,
    AutoWhiteBalanceTemperature,
    BacklightCompensation,
    Hue,
    Gamma,
    ManualWhiteBalance,
    PowerLineFrequency,
    LowLightCompensation,
    FrameEmitterMode,
    FrameLedPower,
    RawFrameSize,
    GpioInputData,
    SequenceName,
    SequenceId,
    SequenceSize,
}

impl FrameAttribute {
    pub const COUNT: usize = 36;

    /// Canonical enumeration order. Sidecar row order follows this, never
    /// insertion order.
    pub const ALL: [FrameAttribute; Self::COUNT] = [
        FrameAttribute::FrameCounter,
        FrameAttribute::FrameTimestamp,
        FrameAttribute::SensorTimestamp,
        FrameAttribute::ActualExposure,
        FrameAttribute::GainLevel,
        FrameAttribute::AutoExposure,
        FrameAttribute::WhiteBalance,
        FrameAttribute::TimeOfArrival,
        FrameAttribute::Temperature,
        FrameAttribute::BackendTimestamp,
        FrameAttribute::ActualFps,
        FrameAttribute::FrameLaserPower,
        FrameAttribute::FrameLaserPowerMode,
        FrameAttribute::ExposurePriority,
        FrameAttribute::ExposureRoiLeft,
        FrameAttribute::ExposureRoiRight,
        FrameAttribute::ExposureRoiTop,
        FrameAttribute::ExposureRoiBottom,
        FrameAttribute::Brightness,
        FrameAttribute::Contrast,
        FrameAttribute::Saturation,
        FrameAttribute::Sharpness,
        FrameAttribute::AutoWhiteBalanceTemperature,
        FrameAttribute::BacklightCompensation,
        FrameAttribute::Hue,
        FrameAttribute::Gamma,
        FrameAttribute::ManualWhiteBalance,
        FrameAttribute::PowerLineFrequency,
        FrameAttribute::LowLightCompensation,
        FrameAttribute::FrameEmitterMode,
        FrameAttribute::FrameLedPower,
        FrameAttribute::RawFrameSize,
        FrameAttribute::GpioInputData,
        FrameAttribute::SequenceName,
        FrameAttribute::SequenceId,
        FrameAttribute::SequenceSize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FrameAttribute::FrameCounter => "FRAME_COUNTER",
            FrameAttribute::FrameTimestamp => "FRAME_TIMESTAMP",
            FrameAttribute::SensorTimestamp => "SENSOR_TIMESTAMP",
            FrameAttribute::ActualExposure => "ACTUAL_EXPOSURE",
            FrameAttribute::GainLevel => "GAIN_LEVEL",
            FrameAttribute::AutoExposure => "AUTO_EXPOSURE",
            FrameAttribute::WhiteBalance => "WHITE_BALANCE",
            FrameAttribute::TimeOfArrival => "TIME_OF_ARRIVAL",
            FrameAttribute::Temperature => "TEMPERATURE",
            FrameAttribute::BackendTimestamp => "BACKEND_TIMESTAMP",
            FrameAttribute::ActualFps => "ACTUAL_FPS",
            FrameAttribute::FrameLaserPower => "FRAME_LASER_POWER",
            FrameAttribute::FrameLaserPowerMode => "FRAME_LASER_POWER_MODE",
            FrameAttribute::ExposurePriority => "EXPOSURE_PRIORITY",
            FrameAttribute::ExposureRoiLeft => "EXPOSURE_ROI_LEFT",
            FrameAttribute::ExposureRoiRight => "EXPOSURE_ROI_RIGHT",
            FrameAttribute::ExposureRoiTop => "EXPOSURE_ROI_TOP",
            FrameAttribute::ExposureRoiBottom => "EXPOSURE_ROI_BOTTOM",
            FrameAttribute::Brightness => "BRIGHTNESS",
            FrameAttribute::Contrast => "CONTRAST",
            FrameAttribute::Saturation => "SATURATION",
            FrameAttribute::Sharpness => "SHARPNESS",
            FrameAttribute::AutoWhiteBalanceTemperature => "AUTO_WHITE_BALANCE_TEMPERATURE",
            FrameAttribute::BacklightCompensation => "BACKLIGHT_COMPENSATION",
            FrameAttribute::Hue => "HUE",
            FrameAttribute::Gamma => "GAMMA",
            FrameAttribute::ManualWhiteBalance => "MANUAL_WHITE_BALANCE",
            FrameAttribute::PowerLineFrequency => "POWER_LINE_FREQUENCY",
            FrameAttribute::LowLightCompensation => "LOW_LIGHT_COMPENSATION",
            FrameAttribute::FrameEmitterMode => "FRAME_EMITTER_MODE",
            FrameAttribute::FrameLedPower => "FRAME_LED_POWER",
            FrameAttribute::RawFrameSize => "RAW_FRAME_SIZE",
            FrameAttribute::GpioInputData => "GPIO_INPUT_DATA",
            FrameAttribute::SequenceName => "SEQUENCE_NAME",
            FrameAttribute::SequenceId => "SEQUENCE_ID",
            FrameAttribute::SequenceSize => "SEQUENCE_SIZE",
        }
    }
}

/// Attribute table of one frame, indexed by `FrameAttribute`.
#[derive(Debug, Clone)]
pub struct FrameAttributes {
    values: [Option<i64>; FrameAttribute::COUNT],
}

impl Default for FrameAttributes {
    fn default() -> Self {
        Self {
            values: [None; FrameAttribute::COUNT],
        }
    }
}

impl FrameAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, attr: FrameAttribute, value: i64) {
        self.values[attr as usize] = Some(value);
    }

    pub fn get(&self, attr: FrameAttribute) -> Option<i64> {
        self.values[attr as usize]
    }

    pub fn supports(&self, attr: FrameAttribute) -> bool {
        self.values[attr as usize].is_some()
    }
}

/// Pixel payload of a 2D video frame. `stride` is the row pitch in bytes
/// and may exceed `width * bytes_per_pixel` on padded buffers.
#[derive(Debug, Clone)]
pub struct VideoPlane {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u32,
    pub stride: u32,
    pub data: Bytes,
}

impl VideoPlane {
    /// Tightly packed plane (stride == row length).
    pub fn packed(width: u32, height: u32, bytes_per_pixel: u32, data: Bytes) -> Self {
        Self {
            width,
            height,
            bytes_per_pixel,
            stride: width * bytes_per_pixel,
            data,
        }
    }

    pub fn row_len(&self) -> usize {
        (self.width * self.bytes_per_pixel) as usize
    }

    /// Iterate rows without the stride padding.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let stride = self.stride as usize;
        let row_len = self.row_len();
        self.data
            .chunks(stride)
            .take(self.height as usize)
            .map(move |row| &row[..row_len])
    }
}

#[derive(Debug, Clone)]
pub enum FramePayload {
    Video(VideoPlane),
    /// Motion, pose or otherwise non-image frames. Persistence tasks skip
    /// these silently.
    Other,
}

/// One captured frame: sequence number, stream, attributes, payload.
/// Handed to exactly one persistence task, which is its sole consumer.
#[derive(Debug, Clone)]
pub struct Frame {
    pub stream: StreamKind,
    pub number: u64,
    pub attributes: FrameAttributes,
    pub payload: FramePayload,
}

impl Frame {
    pub fn as_video(&self) -> Option<&VideoPlane> {
        match &self.payload {
            FramePayload::Video(plane) => Some(plane),
            FramePayload::Other => None,
        }
    }
}

/// One synchronized acquisition: a depth frame and a color frame captured
/// at the same logical moment, each with its own sequence number.
#[derive(Debug, Clone)]
pub struct FrameSet {
    pub depth: Frame,
    pub color: Frame,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_order_is_stable() {
        for (i, attr) in FrameAttribute::ALL.iter().enumerate() {
            assert_eq!(*attr as usize, i);
        }
    }

    #[test]
    fn attribute_table_spans_the_full_sdk_range() {
        assert_eq!(FrameAttribute::ALL.len(), FrameAttribute::COUNT);
        // spot-check the canonical SDK positions
        assert_eq!(FrameAttribute::FrameCounter as usize, 0);
        assert_eq!(FrameAttribute::ActualFps as usize, 10);
        assert_eq!(FrameAttribute::FrameLaserPower as usize, 11);
        assert_eq!(FrameAttribute::Brightness as usize, 18);
        assert_eq!(FrameAttribute::SequenceSize as usize, 35);

        let names: std::collections::HashSet<&str> =
            FrameAttribute::ALL.iter().map(|a| a.name()).collect();
        assert_eq!(names.len(), FrameAttribute::COUNT);
    }

    #[test]
    fn rows_strip_stride_padding() {
        // 2x2 RGB plane with 2 bytes of padding per row
        let stride = 2 * 3 + 2;
        let mut data = Vec::new();
        for row in 0..2u8 {
            data.extend_from_slice(&[row; 6]);
            data.extend_from_slice(&[0xEE, 0xEE]);
        }
        let plane = VideoPlane {
            width: 2,
            height: 2,
            bytes_per_pixel: 3,
            stride: stride as u32,
            data: Bytes::from(data),
        };

        let rows: Vec<&[u8]> = plane.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], &[0u8; 6][..]);
        assert_eq!(rows[1], &[1u8; 6][..]);
    }
}
