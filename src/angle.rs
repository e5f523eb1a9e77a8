//! Angle of a detected notch around the image center.
//!
//! Zero points straight up (12 o'clock) and angles grow clockwise, as seen in
//! image coordinates where the vertical axis increases downward.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::types::PointAnnotation;

// Rotation that moves the zero reference from 3 o'clock to 12 o'clock
const REFERENCE_ROTATION: f64 = 90.0;

/// An angle in [0, 360) carrying exactly the value of its 3-decimal form.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Degrees(f64);

impl Degrees {
    /// Round to the canonical 3-decimal value. Anything that rounds up to
    /// 360.000 wraps to 0.000.
    fn canonical(value: f64) -> Self {
        let text = format!("{:.3}", value);
        match text.parse::<f64>() {
            Ok(v) if (0.0..360.0).contains(&v) => Degrees(v),
            _ => Degrees(0.0),
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl Serialize for Degrees {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Angle of one annotation on an image of `width` x `height` pixels.
///
/// The center is taken with integer division. A point exactly on the center
/// has no direction; it is treated as 0 degrees before the rotation, so it
/// reports 90.000.
pub fn calculate_angle(point: &PointAnnotation, width: u32, height: u32) -> Degrees {
    let px = point.x_norm * f64::from(width);
    let py = point.y_norm * f64::from(height);
    let cx = f64::from(width / 2);
    let cy = f64::from(height / 2);

    let (dx, dy) = (px - cx, py - cy);
    let raw = if dx == 0.0 && dy == 0.0 {
        0.0
    } else {
        dy.atan2(dx).to_degrees()
    };
    let normalized = if raw < 0.0 { raw + 360.0 } else { raw };

    Degrees::canonical((normalized + REFERENCE_ROTATION) % 360.0)
}

/// Angles for every annotation, in the same order.
pub fn calculate_angles(annotations: &[PointAnnotation], width: u32, height: u32) -> Vec<Degrees> {
    annotations
        .iter()
        .map(|point| calculate_angle(point, width, height))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angle_at(x: f64, y: f64, width: u32, height: u32) -> String {
        calculate_angle(&PointAnnotation::new(0, x, y), width, height).to_string()
    }

    #[test]
    fn test_reference_points() {
        assert_eq!(angle_at(0.5, 0.0, 640, 640), "0.000");
        assert_eq!(angle_at(1.0, 0.5, 640, 640), "90.000");
        assert_eq!(angle_at(0.5, 1.0, 640, 640), "180.000");
        assert_eq!(angle_at(0.0, 0.5, 640, 640), "270.000");
    }

    #[test]
    fn test_diagonals() {
        assert_eq!(angle_at(1.0, 0.0, 640, 640), "45.000");
        assert_eq!(angle_at(1.0, 1.0, 640, 640), "135.000");
        assert_eq!(angle_at(0.0, 1.0, 640, 640), "225.000");
        assert_eq!(angle_at(0.0, 0.0, 640, 640), "315.000");
    }

    #[test]
    fn test_center_reports_ninety() {
        assert_eq!(angle_at(0.5, 0.5, 640, 640), "90.000");
    }

    #[test]
    fn test_center_uses_integer_division() {
        // 641 / 2 == 320, so x = 320.5px sits right of the center
        assert_eq!(angle_at(320.5 / 641.0, 0.5, 641, 640), "90.000");
        assert_eq!(angle_at(319.0 / 641.0, 0.5, 641, 640), "270.000");
    }

    #[test]
    fn test_rounding_up_to_full_turn_wraps_to_zero() {
        // A hair left of top-center gives 359.9998..., which rounds to 360.000
        let x = (320.0 - 0.001) / 640.0;
        let angle = calculate_angle(&PointAnnotation::new(0, x, 0.0), 640, 640);
        assert_eq!(angle.to_string(), "0.000");
        assert_eq!(angle.value(), 0.0);
    }

    #[test]
    fn test_value_matches_canonical_text() {
        let angle = calculate_angle(&PointAnnotation::new(0, 0.8, 0.1), 640, 480);
        let reparsed: f64 = angle.to_string().parse().unwrap();
        assert_eq!(angle.value(), reparsed);
    }

    #[test]
    fn test_angle_range_over_grid() {
        for &(w, h) in &[(640, 640), (641, 479), (1, 1), (1920, 1080)] {
            for i in 0..=20 {
                for j in 0..=20 {
                    let point = PointAnnotation::new(0, i as f64 / 20.0, j as f64 / 20.0);
                    let angle = calculate_angle(&point, w, h);
                    assert!(
                        (0.0..360.0).contains(&angle.value()),
                        "{} out of range for ({}, {}) on {}x{}",
                        angle,
                        i,
                        j,
                        w,
                        h
                    );
                }
            }
        }
    }

    #[test]
    fn test_calculate_angles_keeps_order() {
        let points = vec![
            PointAnnotation::new(0, 0.5, 1.0),
            PointAnnotation::new(1, 0.5, 0.0),
            PointAnnotation::new(2, 0.0, 0.5),
        ];
        let angles: Vec<String> = calculate_angles(&points, 640, 640)
            .iter()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(angles, vec!["180.000", "0.000", "270.000"]);
    }

    #[test]
    fn test_serializes_as_string() {
        let angle = calculate_angle(&PointAnnotation::new(0, 1.0, 0.5), 640, 640);
        assert_eq!(serde_json::to_string(&angle).unwrap(), "\"90.000\"");
    }
}
