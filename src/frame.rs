//! Frame buffers flowing through the step/convert/present pipeline.
//!
//! The engine emits raw 3-bytes-per-pixel RGB; presentation surfaces expect
//! 4-bytes-per-pixel RGBA with opaque alpha. Both buffers are transient, one
//! per step, with no state retained between frames.
use anyhow::ensure;
use anyhow::Result;

/// Fixed dimensions of the presentation target.
pub const FRAME_WIDTH: usize = 256;
pub const FRAME_HEIGHT: usize = 240;

const RAW_FRAME_LEN: usize = FRAME_WIDTH * FRAME_HEIGHT * 3;
const DISPLAY_FRAME_LEN: usize = FRAME_WIDTH * FRAME_HEIGHT * 4;

/// One emulation step's raw pixel output. 3 bytes per pixel, row-major, no
/// padding.
#[derive(Clone, PartialEq, Eq)]
pub struct RawFrame(Vec<u8>);

impl RawFrame {
    /// Wraps the bytes handed back by a step call. The engine contract is
    /// exactly `FRAME_WIDTH * FRAME_HEIGHT * 3` bytes; anything else is
    /// rejected rather than truncated.
    pub fn from_engine(bytes: Vec<u8>) -> Result<RawFrame> {
        ensure!(
            bytes.len() == RAW_FRAME_LEN,
            "Raw frame is {} bytes, expected {}",
            bytes.len(),
            RAW_FRAME_LEN
        );
        Ok(RawFrame(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Converts to a presentable RGBA image. Pure transform: RGB channels
    /// are copied verbatim and alpha is forced to 255. Runs once per frame
    /// at refresh cadence, so the pixel loop allocates once and never
    /// branches.
    pub fn to_display(&self) -> DisplayFrame {
        let mut data = Vec::with_capacity(DISPLAY_FRAME_LEN);
        for rgb in self.0.chunks_exact(3) {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        DisplayFrame(data)
    }
}

/// A presentable 256x240 RGBA image. Alpha is always 255; surfaces may treat
/// the image as fully opaque.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayFrame(Vec<u8>);

impl DisplayFrame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
