mod corridor;
mod direction;
mod rect;
mod track_store;
mod tracked_object;

pub use corridor::{Corridor, DEFAULT_BUFFER_RADIUS};
pub use direction::{Axis, Direction, DirectionClassifier};
pub use rect::Rect;
pub use track_store::{DEFAULT_MAX_DISAPPEARED, Reconciliation, TrackStore};
pub use tracked_object::TrackedObject;
