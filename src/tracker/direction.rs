//! Net-displacement direction classifier.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::tracker::tracked_object::TrackedObject;

/// Movement axis measured by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Image y axis, labels up/down.
    Vertical,
    /// Image x axis, labels left/right.
    Horizontal,
}

impl Axis {
    /// Axis along which objects are expected to cross the line `start -> end`.
    ///
    /// A line at least as wide as it is tall is crossed by vertical movement.
    pub fn from_line(start: Point2<i32>, end: Point2<i32>) -> Self {
        let dx = (end.x - start.x).abs();
        let dy = (end.y - start.y).abs();
        if dx >= dy {
            Axis::Vertical
        } else {
            Axis::Horizontal
        }
    }

    #[inline]
    fn coord(self, centroid: (i32, i32)) -> f64 {
        match self {
            Axis::Vertical => f64::from(centroid.1),
            Axis::Horizontal => f64::from(centroid.0),
        }
    }
}

/// Direction of a confirmed crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Classify the sign of a displacement along `axis`.
    ///
    /// Image coordinates grow downwards and rightwards.
    pub fn from_displacement(axis: Axis, displacement: f64) -> Self {
        match (axis, displacement > 0.0) {
            (Axis::Vertical, true) => Direction::Down,
            (Axis::Vertical, false) => Direction::Up,
            (Axis::Horizontal, true) => Direction::Right,
            (Axis::Horizontal, false) => Direction::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides from a centroid history whether an object has moved far enough
/// along the axis to report a direction.
#[derive(Debug, Clone)]
pub struct DirectionClassifier {
    axis: Axis,
    samples_quantity: usize,
    threshold_displacement: f64,
}

impl DirectionClassifier {
    pub fn new(axis: Axis, samples_quantity: usize, threshold_displacement: f64) -> Self {
        Self {
            axis,
            samples_quantity,
            threshold_displacement,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Net displacement along the axis: mean of the last two samples minus
    /// the first sample. `None` when the history is empty.
    pub fn displacement(&self, history: &[(i32, i32)]) -> Option<f64> {
        let first = self.axis.coord(*history.first()?);
        let tail = &history[history.len().saturating_sub(2)..];
        let recent = tail.iter().map(|&c| self.axis.coord(c)).sum::<f64>() / tail.len() as f64;
        Some(recent - first)
    }

    /// Evaluate a track. Pure: the caller decides what to do with repeats.
    pub fn evaluate(&self, track: &TrackedObject) -> Option<Direction> {
        self.classify(track.centroid_history())
    }

    /// Evaluate a raw centroid history.
    pub fn classify(&self, history: &[(i32, i32)]) -> Option<Direction> {
        if history.len() <= self.samples_quantity {
            return None;
        }
        let displacement = self.displacement(history)?;
        // No net movement has no direction, even with a zero threshold.
        if displacement == 0.0 || displacement.abs() < self.threshold_displacement {
            return None;
        }
        Some(Direction::from_displacement(self.axis, displacement))
    }
}
