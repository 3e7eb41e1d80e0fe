//! Output tree layout. All paths hang off one root (the working directory
//! in production runs, a tempdir in tests).

use std::path::{Path, PathBuf};

pub const DEPTH_DIR: &str = "depth";
pub const DEPTH_METADATA_DIR: &str = "depth_metadata";
pub const COLOUR_DIR: &str = "colour";
pub const COLOUR_METADATA_DIR: &str = "colour_metadata";

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the four output directories. The companion tooling that used
    /// to pre-create them is not part of this program, so we make them
    /// ourselves before capture starts.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [DEPTH_DIR, DEPTH_METADATA_DIR, COLOUR_DIR, COLOUR_METADATA_DIR] {
            std::fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn depth_raw(&self, label: &str, frame_number: u64) -> PathBuf {
        self.root
            .join(DEPTH_DIR)
            .join(format!("{label}_depth_{frame_number}.raw"))
    }

    pub fn depth_metadata(&self, label: &str, frame_number: u64) -> PathBuf {
        self.root
            .join(DEPTH_METADATA_DIR)
            .join(format!("{label}_depth_metadata_{frame_number}.txt"))
    }

    pub fn colour_png(&self, label: &str, frame_number: u64) -> PathBuf {
        self.root
            .join(COLOUR_DIR)
            .join(format!("{label}_colour_{frame_number}.png"))
    }

    pub fn colour_metadata(&self, label: &str, frame_number: u64) -> PathBuf {
        self.root
            .join(COLOUR_METADATA_DIR)
            .join(format!("{label}_colour_metadata_{frame_number}.txt"))
    }
}
