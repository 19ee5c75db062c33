//! YUYV to RGB conversion for captured camera buffers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("invalid YUYV length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Convert packed YUYV (4:2:2) to packed RGB24.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V], with chroma shared
/// across the pixel pair. Conversion uses full-range BT.601 coefficients.
pub fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ConvertError> {
    let pixels = (width as usize) * (height as usize);
    let expected = pixels * 2;
    if yuyv.len() < expected {
        return Err(ConvertError::InvalidLength { expected, actual: yuyv.len() });
    }

    let mut rgb = Vec::with_capacity(pixels * 3);

    for chunk in yuyv[..expected].chunks_exact(4) {
        let [y0, u, y1, v] = [chunk[0], chunk[1], chunk[2], chunk[3]];
        push_rgb(&mut rgb, y0, u, v);
        push_rgb(&mut rgb, y1, u, v);
    }

    Ok(rgb)
}

fn push_rgb(out: &mut Vec<u8>, y: u8, u: u8, v: u8) {
    let y = y as f32;
    let cb = u as f32 - 128.0;
    let cr = v as f32 - 128.0;

    let r = y + 1.402 * cr;
    let g = y - 0.344_136 * cb - 0.714_136 * cr;
    let b = y + 1.772 * cb;

    out.push(r.round().clamp(0.0, 255.0) as u8);
    out.push(g.round().clamp(0.0, 255.0) as u8);
    out.push(b.round().clamp(0.0, 255.0) as u8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_chroma_gives_gray() {
        // U = V = 128 means zero chroma: R = G = B = Y.
        let yuyv = vec![100, 128, 200, 128];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert_eq!(rgb, vec![100, 100, 100, 200, 200, 200]);
    }

    #[test]
    fn test_chroma_shared_across_pixel_pair() {
        // Both pixels of one pair get the same chroma contribution.
        let yuyv = vec![128, 90, 128, 200];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert_eq!(&rgb[0..3], &rgb[3..6]);
        // Strong positive Cr pushes red above luma.
        assert!(rgb[0] > 128);
    }

    #[test]
    fn test_output_length() {
        let yuyv = vec![0u8; 4 * 2 * 2]; // 4x2 frame
        let rgb = yuyv_to_rgb(&yuyv, 4, 2).unwrap();
        assert_eq!(rgb.len(), 4 * 2 * 3);
    }

    #[test]
    fn test_rejects_short_buffer() {
        let yuyv = vec![100, 128];
        let err = yuyv_to_rgb(&yuyv, 2, 1).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidLength { expected: 4, actual: 2 }));
    }

    #[test]
    fn test_values_clamped() {
        // Extreme chroma must clamp instead of wrapping.
        let yuyv = vec![255, 255, 0, 255];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert!(rgb.iter().all(|&c| c <= 255));
        assert_eq!(rgb[0], 255); // saturated red channel
    }
}
