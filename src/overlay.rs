//! Frame annotation: skeleton and classification text overlays
//!
//! Drawing always happens on a copy of the originally decoded frame so
//! the returned image keeps the source color space untouched by any
//! detector-side conversion.

use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut};

use crate::engine::classifier::Classification;
use crate::engine::landmarker::{LandmarkSet, POSE_CONNECTIONS};

/// Joint (keypoint) color
const JOINT_COLOR: Rgb<u8> = Rgb([245, 117, 66]);
/// Connecting segment color
const SEGMENT_COLOR: Rgb<u8> = Rgb([245, 66, 230]);
/// Successful prediction text color
const PREDICTION_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
/// Classification failure marker color
const ERROR_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

const JOINT_RADIUS: i32 = 3;
const FONT_SIZE: f32 = 24.0;
/// Fixed anchor for the status text, top-left corner
const TEXT_ANCHOR: (i32, i32) = (10, 10);

pub struct Overlay {
    font: FontRef<'static>,
}

impl Default for Overlay {
    fn default() -> Self {
        let font_data = include_bytes!("../assets/DejaVuSans.ttf");
        let font = FontRef::try_from_slice(font_data).expect("embedded font is valid");
        Self { font }
    }
}

impl Overlay {
    /// Draw the detected skeleton: segments first, joints on top, in the
    /// fixed two-tone style.
    pub fn draw_skeleton(&self, image: &mut RgbImage, landmarks: &LandmarkSet) {
        let (w, h) = (image.width() as f32, image.height() as f32);
        let points: Vec<(f32, f32)> = landmarks
            .landmarks()
            .iter()
            .map(|lm| (lm.x * w, lm.y * h))
            .collect();

        for &(a, b) in POSE_CONNECTIONS.iter() {
            let start = points[a];
            let end = points[b];
            draw_line_segment_mut(image, start, end, SEGMENT_COLOR);
            // second pass one pixel down for a 2px stroke
            draw_line_segment_mut(
                image,
                (start.0, start.1 + 1.0),
                (end.0, end.1 + 1.0),
                SEGMENT_COLOR,
            );
        }

        for &(x, y) in &points {
            if x >= 0.0 && y >= 0.0 && x < w && y < h {
                draw_filled_circle_mut(image, (x as i32, y as i32), JOINT_RADIUS, JOINT_COLOR);
            }
        }
    }

    /// Render `Pose: {label} ({confidence:.2})` at the fixed anchor.
    pub fn draw_prediction(&self, image: &mut RgbImage, classification: &Classification) {
        let text = format!(
            "Pose: {} ({:.2})",
            classification.label, classification.confidence
        );
        self.draw_text(image, &text, PREDICTION_COLOR);
    }

    /// Render the fixed classification failure marker.
    pub fn draw_classification_error(&self, image: &mut RgbImage) {
        self.draw_text(image, "Classification error", ERROR_COLOR);
    }

    fn draw_text(&self, image: &mut RgbImage, text: &str, color: Rgb<u8>) {
        draw_text_mut(
            image,
            color,
            TEXT_ANCHOR.0,
            TEXT_ANCHOR.1,
            PxScale::from(FONT_SIZE),
            &self.font,
            text,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::landmarker::{Landmark, LANDMARK_COUNT};

    fn centered_landmarks() -> LandmarkSet {
        LandmarkSet::new(
            (0..LANDMARK_COUNT)
                .map(|i| Landmark {
                    x: 0.2 + (i as f32) * 0.01,
                    y: 0.2 + (i as f32) * 0.01,
                    z: 0.0,
                    visibility: 1.0,
                })
                .collect(),
        )
    }

    #[test]
    fn test_skeleton_changes_pixels() {
        let overlay = Overlay::default();
        let mut image = RgbImage::from_pixel(320, 240, Rgb([0, 0, 0]));
        overlay.draw_skeleton(&mut image, &centered_landmarks());
        assert!(image.pixels().any(|p| *p != Rgb([0, 0, 0])));
    }

    #[test]
    fn test_skeleton_preserves_dimensions() {
        let overlay = Overlay::default();
        let mut image = RgbImage::from_pixel(320, 240, Rgb([7, 7, 7]));
        overlay.draw_skeleton(&mut image, &centered_landmarks());
        assert_eq!(image.width(), 320);
        assert_eq!(image.height(), 240);
    }

    #[test]
    fn test_out_of_bounds_landmarks_do_not_panic() {
        let overlay = Overlay::default();
        let mut image = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
        let set = LandmarkSet::new(
            (0..LANDMARK_COUNT)
                .map(|i| Landmark {
                    x: -0.5 + i as f32 * 0.1,
                    y: 1.5,
                    z: 0.0,
                    visibility: 0.1,
                })
                .collect(),
        );
        overlay.draw_skeleton(&mut image, &set);
    }

    #[test]
    fn test_prediction_text_drawn() {
        let overlay = Overlay::default();
        let mut image = RgbImage::from_pixel(320, 240, Rgb([0, 0, 0]));
        overlay.draw_prediction(
            &mut image,
            &Classification {
                label: "squat".to_string(),
                confidence: 0.93,
            },
        );
        assert!(image.pixels().any(|p| *p != Rgb([0, 0, 0])));
    }

    #[test]
    fn test_error_marker_drawn() {
        let overlay = Overlay::default();
        let mut image = RgbImage::from_pixel(320, 240, Rgb([0, 0, 0]));
        overlay.draw_classification_error(&mut image);
        assert!(image.pixels().any(|p| *p != Rgb([0, 0, 0])));
    }
}
