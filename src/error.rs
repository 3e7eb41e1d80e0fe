use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no depth camera found")]
    NoDeviceFound,

    #[error("device error calling {op}: {message}")]
    Device { op: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encode error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("unsupported pixel layout: {0} bytes per pixel")]
    UnsupportedPixelLayout(u32),

    #[error("capture channel closed before all frames were delivered")]
    ChannelClosed,
}

impl Error {
    /// Wraps a failure from the device/session layer, keeping the name of
    /// the operation that failed for the top-level report.
    pub fn device(op: impl Into<String>, message: impl ToString) -> Self {
        Error::Device {
            op: op.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
