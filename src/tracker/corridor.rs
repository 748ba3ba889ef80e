//! Crossing corridor around the configured reference line.
//!
//! The corridor is the line segment buffered by a fixed radius with round
//! caps, approximated by a polygon (16 segments per quarter circle). A box is
//! considered for tracking only when its centroid lies strictly inside the
//! polygon: points on the boundary are outside.

use nalgebra::{Point2, Vector2};
use tracing::info;

use crate::error::GeometryError;

/// Buffer radius in pixels used when none is configured.
pub const DEFAULT_BUFFER_RADIUS: f64 = 5.0;

/// Segments used to approximate a quarter circle of each round cap.
const QUAD_SEGMENTS: usize = 16;

/// Tolerance for treating a point as lying on a polygon edge.
const BOUNDARY_EPS: f64 = 1e-9;

/// Polygon corridor around a line segment in pixel space.
#[derive(Debug, Clone)]
pub struct Corridor {
    start: Point2<i32>,
    end: Point2<i32>,
    radius: f64,
    vertices: Vec<Point2<f64>>,
}

impl Corridor {
    /// Build a corridor with the default 5 px radius.
    ///
    /// `coords` holds the two line endpoints in 0-100 normalized units.
    pub fn build(coords: [[f64; 2]; 2], width: u32, height: u32) -> Result<Self, GeometryError> {
        Self::with_radius(coords, width, height, DEFAULT_BUFFER_RADIUS)
    }

    /// Build a corridor with an explicit buffer radius in pixels.
    pub fn with_radius(
        coords: [[f64; 2]; 2],
        width: u32,
        height: u32,
        radius: f64,
    ) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::InvalidFrame { width, height });
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GeometryError::InvalidRadius(radius));
        }
        for &c in coords.iter().flatten() {
            if !c.is_finite() || !(0.0..=100.0).contains(&c) {
                return Err(GeometryError::CoordOutOfRange(c));
            }
        }

        let scale = |p: [f64; 2]| {
            Point2::new(
                (p[0] * f64::from(width) / 100.0) as i32,
                (p[1] * f64::from(height) / 100.0) as i32,
            )
        };
        let start = scale(coords[0]);
        let end = scale(coords[1]);
        if start == end {
            return Err(GeometryError::DegenerateLine {
                x: start.x,
                y: start.y,
            });
        }

        let vertices = buffer_segment(to_f64(start), to_f64(end), radius);
        info!(
            "Corridor built from ({}, {}) to ({}, {}) with radius {} px ({} vertices)",
            start.x,
            start.y,
            end.x,
            end.y,
            radius,
            vertices.len()
        );

        Ok(Self {
            start,
            end,
            radius,
            vertices,
        })
    }

    /// Line endpoints in pixel space.
    pub fn line(&self) -> (Point2<i32>, Point2<i32>) {
        (self.start, self.end)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    /// Whether a pixel centroid lies strictly inside the corridor.
    #[inline]
    pub fn contains(&self, centroid: (i32, i32)) -> bool {
        self.contains_point(Point2::new(f64::from(centroid.0), f64::from(centroid.1)))
    }

    /// Strict point-in-polygon test: boundary points return `false`.
    pub fn contains_point(&self, p: Point2<f64>) -> bool {
        let n = self.vertices.len();
        let mut inside = false;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            if on_segment(p, a, b) {
                return false;
            }
            // Even-odd rule with a horizontal ray towards +x.
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

fn to_f64(p: Point2<i32>) -> Point2<f64> {
    Point2::new(f64::from(p.x), f64::from(p.y))
}

/// Round-capped buffer polygon of segment `a -> b`.
///
/// Walks the cap around `b` from the right-hand normal to the left-hand
/// normal, then the cap around `a` back to the right-hand normal. The ring is
/// implicitly closed.
fn buffer_segment(a: Point2<f64>, b: Point2<f64>, radius: f64) -> Vec<Point2<f64>> {
    let dir: Vector2<f64> = b - a;
    let heading = dir.y.atan2(dir.x);
    let half_turn = 2 * QUAD_SEGMENTS;
    let step = std::f64::consts::PI / half_turn as f64;

    let mut vertices = Vec::with_capacity(2 * (half_turn + 1));
    for (center, base) in [
        (b, heading - std::f64::consts::FRAC_PI_2),
        (a, heading + std::f64::consts::FRAC_PI_2),
    ] {
        for k in 0..=half_turn {
            let theta = base + k as f64 * step;
            vertices.push(center + Vector2::new(theta.cos(), theta.sin()) * radius);
        }
    }
    vertices
}

fn on_segment(p: Point2<f64>, a: Point2<f64>, b: Point2<f64>) -> bool {
    let ab = b - a;
    let ap = p - a;
    let cross = ab.x * ap.y - ab.y * ap.x;
    if cross.abs() > BOUNDARY_EPS * ab.norm().max(1.0) {
        return false;
    }
    let dot = ap.dot(&ab);
    dot >= -BOUNDARY_EPS && dot <= ab.norm_squared() + BOUNDARY_EPS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizontal() -> Corridor {
        // (64, 240) -> (576, 240)
        Corridor::build([[10.0, 50.0], [90.0, 50.0]], 640, 480).unwrap()
    }

    #[test]
    fn test_line_scaled_to_pixels() {
        let corridor = Corridor::build([[100.0, 70.0], [5.0, 57.0]], 640, 480).unwrap();
        let (start, end) = corridor.line();
        assert_eq!((start.x, start.y), (640, 336));
        assert_eq!((end.x, end.y), (32, 273));
        assert_eq!(corridor.vertices().len(), 66);
    }

    #[test]
    fn test_contains_inside() {
        let corridor = horizontal();
        assert!(corridor.contains((300, 240)));
        assert!(corridor.contains((300, 244)));
        assert!(corridor.contains((300, 236)));
        // Inside the round cap beyond the endpoint.
        assert!(corridor.contains((579, 240)));
    }

    #[test]
    fn test_contains_far_outside() {
        let corridor = horizontal();
        assert!(!corridor.contains((300, 100)));
        assert!(!corridor.contains((300, 246)));
        assert!(!corridor.contains((600, 240)));
        assert!(!corridor.contains((0, 0)));
    }

    #[test]
    fn test_boundary_is_outside() {
        let corridor = horizontal();
        // Exactly on the straight edges, 5 px from the line.
        assert!(!corridor.contains((300, 245)));
        assert!(!corridor.contains((300, 235)));
        // Exactly on the cap tip.
        assert!(!corridor.contains((581, 240)));
    }

    #[test]
    fn test_custom_radius() {
        let corridor = Corridor::with_radius([[10.0, 50.0], [90.0, 50.0]], 640, 480, 20.0).unwrap();
        assert!(corridor.contains((300, 259)));
        assert!(!corridor.contains((300, 261)));
    }

    #[test]
    fn test_degenerate_line_rejected() {
        let err = Corridor::build([[50.0, 50.0], [50.0, 50.0]], 640, 480).unwrap_err();
        assert_eq!(err, GeometryError::DegenerateLine { x: 320, y: 240 });
    }

    #[test]
    fn test_line_collapsing_after_truncation_rejected() {
        // 10.0 and 10.1 percent of 640 both truncate to 64.
        let err = Corridor::build([[10.0, 50.0], [10.1, 50.0]], 640, 480).unwrap_err();
        assert!(matches!(err, GeometryError::DegenerateLine { .. }));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(matches!(
            Corridor::build([[10.0, 50.0], [90.0, 50.0]], 0, 480),
            Err(GeometryError::InvalidFrame { .. })
        ));
        assert!(matches!(
            Corridor::build([[10.0, 50.0], [190.0, 50.0]], 640, 480),
            Err(GeometryError::CoordOutOfRange(_))
        ));
        assert!(matches!(
            Corridor::with_radius([[10.0, 50.0], [90.0, 50.0]], 640, 480, 0.0),
            Err(GeometryError::InvalidRadius(_))
        ));
    }
}
