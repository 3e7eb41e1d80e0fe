pub mod color;
pub mod depth;
pub mod layout;
pub mod metadata;

pub use color::save_color_frame;
pub use depth::save_depth_frame;
pub use layout::OutputLayout;
pub use metadata::write_metadata;
