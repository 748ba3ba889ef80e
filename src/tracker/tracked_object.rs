//! A single tracked physical object and its centroid history.

use crate::tracker::direction::Direction;
use crate::tracker::rect::Rect;

/// One physical object currently or recently observed.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObject {
    /// Identifier assigned upstream
    pub id: String,
    /// Last known bounding box in pixels
    pub bbox: Rect,
    /// One centroid per observed frame, oldest first
    centroid_history: Vec<(i32, i32)>,
    /// Whether the current frame's detections matched this id
    pub(crate) seen_this_frame: bool,
    /// Last direction reported for this track, if any
    pub(crate) reported: Option<Direction>,
}

impl TrackedObject {
    /// Create a candidate from a single observation.
    pub fn new(id: impl Into<String>, bbox: Rect) -> Self {
        Self {
            id: id.into(),
            bbox,
            centroid_history: vec![bbox.centroid()],
            seen_this_frame: false,
            reported: None,
        }
    }

    /// Centroids in observation order.
    pub fn centroid_history(&self) -> &[(i32, i32)] {
        &self.centroid_history
    }

    /// Most recent centroid.
    pub fn centroid(&self) -> (i32, i32) {
        // History is never empty: every track starts from one observation.
        self.centroid_history
            .last()
            .copied()
            .unwrap_or_else(|| self.bbox.centroid())
    }

    pub fn seen_this_frame(&self) -> bool {
        self.seen_this_frame
    }

    /// Direction already emitted for this track.
    pub fn reported(&self) -> Option<Direction> {
        self.reported
    }

    /// Fold a new observation of the same object into this track.
    pub(crate) fn observe(&mut self, observation: &TrackedObject) {
        self.bbox = observation.bbox;
        self.centroid_history.push(observation.centroid());
        self.seen_this_frame = true;
    }
}
