//! Annotation rendering — draws pipeline output onto a frame.
//!
//! This is the renderer collaborator: it consumes a frame plus annotation
//! instructions, mutates pixels, and produces nothing else. Labeled faces
//! get green boxes, presence-only faces amber ones; banner text goes to
//! the log since the CLI has no font rasterizer.

use sentio_core::{Annotation, Region, RgbFrame};

const LABELED_COLOR: [u8; 3] = [0, 255, 0];
const PRESENCE_COLOR: [u8; 3] = [255, 165, 0];
const BOX_THICKNESS: u32 = 2;

/// Draw all annotations onto the frame.
pub fn draw_annotations(frame: &mut RgbFrame, annotations: &[Annotation]) {
    for annotation in annotations {
        match (&annotation.region, &annotation.text) {
            (Some(region), Some(text)) => {
                draw_box(frame, region, LABELED_COLOR);
                tracing::info!(?region, label = %text, "face");
            }
            (Some(region), None) => {
                draw_box(frame, region, PRESENCE_COLOR);
            }
            (None, Some(banner)) => {
                tracing::info!("{banner}");
            }
            (None, None) => {}
        }
    }
}

/// Draw a rectangle outline of fixed thickness, clipped to the frame.
fn draw_box(frame: &mut RgbFrame, region: &Region, color: [u8; 3]) {
    let x1 = region.x.saturating_add(region.width);
    let y1 = region.y.saturating_add(region.height);

    for t in 0..BOX_THICKNESS {
        for x in region.x..x1 {
            put_pixel(frame, x, region.y.saturating_add(t), color);
            put_pixel(frame, x, y1.saturating_sub(t + 1), color);
        }
        for y in region.y..y1 {
            put_pixel(frame, region.x.saturating_add(t), y, color);
            put_pixel(frame, x1.saturating_sub(t + 1), y, color);
        }
    }
}

fn put_pixel(frame: &mut RgbFrame, x: u32, y: u32, color: [u8; 3]) {
    if x >= frame.width || y >= frame.height {
        return;
    }
    let idx = ((y * frame.width + x) * 3) as usize;
    frame.data[idx..idx + 3].copy_from_slice(&color);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(frame: &RgbFrame, x: u32, y: u32) -> [u8; 3] {
        let idx = ((y * frame.width + x) * 3) as usize;
        [frame.data[idx], frame.data[idx + 1], frame.data[idx + 2]]
    }

    #[test]
    fn test_labeled_face_drawn_green() {
        let mut frame = RgbFrame::filled(40, 40, [0, 0, 0]);
        let region = Region::new(10, 10, 20, 20);
        draw_annotations(&mut frame, &[Annotation::face(region, "happy (80%)".into())]);

        assert_eq!(pixel(&frame, 10, 10), LABELED_COLOR); // corner
        assert_eq!(pixel(&frame, 20, 10), LABELED_COLOR); // top edge
        assert_eq!(pixel(&frame, 20, 20), [0, 0, 0]); // interior untouched
    }

    #[test]
    fn test_presence_box_drawn_amber() {
        let mut frame = RgbFrame::filled(40, 40, [0, 0, 0]);
        draw_annotations(&mut frame, &[Annotation::presence(Region::new(5, 5, 10, 10))]);
        assert_eq!(pixel(&frame, 5, 5), PRESENCE_COLOR);
    }

    #[test]
    fn test_banner_leaves_pixels_untouched() {
        let mut frame = RgbFrame::filled(8, 8, [7, 7, 7]);
        let before = frame.clone();
        draw_annotations(&mut frame, &[Annotation::banner("MODE: ENERGY SAVER")]);
        assert_eq!(frame, before);
    }

    #[test]
    fn test_box_clipped_at_frame_edge() {
        let mut frame = RgbFrame::filled(20, 20, [0, 0, 0]);
        // Region extends past the frame; drawing must not panic.
        draw_annotations(&mut frame, &[Annotation::presence(Region::new(15, 15, 10, 10))]);
        assert_eq!(pixel(&frame, 15, 15), PRESENCE_COLOR);
    }
}
