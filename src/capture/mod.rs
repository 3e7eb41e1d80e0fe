pub mod frame;
#[cfg(feature = "realsense")]
pub mod realsense;
pub mod source;

pub use frame::{Frame, FrameSet, StreamKind};
pub use source::{FrameSource, SyntheticSource};
