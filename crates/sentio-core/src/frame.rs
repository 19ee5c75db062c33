//! RGB frame buffer — region cropping and the low-power desaturation effect.

use crate::types::Region;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid RGB buffer length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// A single captured color frame, packed RGB24 (3 bytes/pixel, row-major).
#[derive(Debug, Clone, PartialEq)]
pub struct RgbFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RgbFrame {
    /// Wrap an RGB24 buffer, validating its length against the dimensions.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self, FrameError> {
        let expected = (width as usize) * (height as usize) * 3;
        if data.len() != expected {
            return Err(FrameError::InvalidLength { expected, actual: data.len() });
        }
        Ok(Self { data, width, height })
    }

    /// Uniform-color frame, mostly useful in tests and diagnostics.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(pixels * 3);
        for _ in 0..pixels {
            data.extend_from_slice(&rgb);
        }
        Self { data, width, height }
    }

    /// Extract the pixels under `region`, clamped to the frame bounds.
    ///
    /// Returns `None` when the clamped intersection is empty (region fully
    /// outside the frame or degenerate).
    pub fn crop(&self, region: &Region) -> Option<RgbFrame> {
        let x0 = region.x.min(self.width);
        let y0 = region.y.min(self.height);
        let x1 = region.x.saturating_add(region.width).min(self.width);
        let y1 = region.y.saturating_add(region.height).min(self.height);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        let (cw, ch) = ((x1 - x0) as usize, (y1 - y0) as usize);
        let stride = self.width as usize * 3;
        let mut data = Vec::with_capacity(cw * ch * 3);

        for row in y0 as usize..y1 as usize {
            let start = row * stride + x0 as usize * 3;
            data.extend_from_slice(&self.data[start..start + cw * 3]);
        }

        Some(RgbFrame { data, width: cw as u32, height: ch as u32 })
    }

    /// Collapse the frame to its luma, written back to all three channels.
    ///
    /// Visual indicator of reduced processing in low-power mode; analysis
    /// results are never derived from a desaturated frame.
    pub fn desaturate(&mut self) {
        for px in self.data.chunks_exact_mut(3) {
            let y = luma(px[0], px[1], px[2]);
            px[0] = y;
            px[1] = y;
            px[2] = y;
        }
    }
}

/// Rec.601 luma from an RGB triple.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}
