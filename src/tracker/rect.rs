/// Pixel-space bounding box with integer corners.
///
/// Corners come from normalized detector output scaled by the frame size and
/// truncated toward zero. Decoding rejects inverted or out-of-range corners,
/// so boxes built from samples satisfy `xmin <= xmax` and `ymin <= ymax`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    /// Left edge
    pub xmin: i32,
    /// Top edge
    pub ymin: i32,
    /// Right edge
    pub xmax: i32,
    /// Bottom edge
    pub ymax: i32,
}

impl Rect {
    /// Create a Rect from pixel corners (xmin, ymin, xmax, ymax).
    #[inline]
    pub fn new(xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Scale normalized corners (0-1 range) to a `width` x `height` frame.
    #[inline]
    pub fn from_normalized(x1: f32, y1: f32, x2: f32, y2: f32, width: u32, height: u32) -> Self {
        let w = f64::from(width);
        let h = f64::from(height);
        Self {
            xmin: (f64::from(x1) * w) as i32,
            ymin: (f64::from(y1) * h) as i32,
            xmax: (f64::from(x2) * w) as i32,
            ymax: (f64::from(y2) * h) as i32,
        }
    }

    /// Integer midpoint of the box, truncated toward zero.
    #[inline]
    pub fn centroid(&self) -> (i32, i32) {
        (midpoint(self.xmin, self.xmax), midpoint(self.ymin, self.ymax))
    }
}

#[inline]
fn midpoint(a: i32, b: i32) -> i32 {
    // The mean of two i32 values always fits back into an i32.
    ((i64::from(a) + i64::from(b)) / 2) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_normalized() {
        let rect = Rect::from_normalized(0.25, 0.5, 0.75, 1.0, 640, 480);
        assert_eq!(rect, Rect::new(160, 240, 480, 480));
    }

    #[test]
    fn test_from_normalized_truncates() {
        // 0.001 * 640 = 0.64, 0.999 * 480 = 479.52
        let rect = Rect::from_normalized(0.001, 0.001, 0.999, 0.999, 640, 480);
        assert_eq!(rect, Rect::new(0, 0, 639, 479));
    }

    #[test]
    fn test_centroid_is_integer_midpoint() {
        assert_eq!(Rect::new(10, 20, 30, 40).centroid(), (20, 30));
        // (10 + 13) / 2 = 11.5 -> 11
        assert_eq!(Rect::new(10, 10, 13, 13).centroid(), (11, 11));
    }

    #[test]
    fn test_centroid_negative_truncates_toward_zero() {
        // (-10 + 5) / 2 = -2.5 -> -2
        assert_eq!(Rect::new(-10, -10, 5, 5).centroid(), (-2, -2));
    }

    #[test]
    fn test_centroid_of_saturated_corners() {
        let rect = Rect::from_normalized(1e9, 0.5, 1e9, 0.5, 640, 480);
        assert_eq!(rect.centroid(), (i32::MAX, 240));
        assert_eq!(Rect::new(i32::MIN, 0, i32::MAX, 0).centroid(), (0, 0));
    }
}
