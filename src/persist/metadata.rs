//! Shared metadata sidecar writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::capture::frame::{Frame, FrameAttribute};
use crate::Result;

/// Write the sidecar for one frame: a stream header, a column header, then
/// one row per supported attribute in canonical enumeration order. An
/// existing file at `path` is overwritten.
pub fn write_metadata(frame: &Frame, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "Stream,{}", frame.stream.name())?;
    writeln!(out, "Metadata Attribute,Value")?;

    for attr in FrameAttribute::ALL {
        if let Some(value) = frame.attributes.get(attr) {
            writeln!(out, "{},{}", attr.name(), value)?;
        }
    }

    out.flush()?;
    Ok(())
}
