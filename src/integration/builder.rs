//! Builder for turning decoded detection boxes into tracking candidates.

use crate::integration::sample::DetectionBox;
use crate::tracker::{Rect, TrackedObject};

/// Builder for creating candidate `TrackedObject`s from normalized boxes.
#[derive(Debug, Clone, Default)]
pub struct CandidateBuilder {
    id: String,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl CandidateBuilder {
    /// Create a new candidate builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a decoded detection box.
    pub fn from_box(detection: &DetectionBox) -> Self {
        Self::new()
            .id(detection.obj_id.to_string())
            .tlbr(detection.x1, detection.y1, detection.x2, detection.y2)
    }

    /// Set the upstream object id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set normalized corners in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.x1 = x1;
        self.y1 = y1;
        self.x2 = x2;
        self.y2 = y2;
        self
    }

    /// Scaled pixel box for a `width` x `height` frame.
    pub fn rect(&self, width: u32, height: u32) -> Rect {
        Rect::from_normalized(self.x1, self.y1, self.x2, self.y2, width, height)
    }

    /// Build the candidate for a `width` x `height` frame.
    pub fn build(self, width: u32, height: u32) -> TrackedObject {
        let rect = self.rect(width, height);
        TrackedObject::new(self.id, rect)
    }
}
