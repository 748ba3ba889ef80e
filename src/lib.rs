//! Line-crossing direction sensor.
//!
//! Tracks detection boxes across frames by their upstream object id and
//! reports, once per track, the direction in which it crosses a configured
//! virtual line.

pub mod config;
pub mod error;
pub mod integration;
pub mod tracker;

pub use config::{DirectionLabels, EmitPolicy, SensorConfig};
pub use error::{ConfigError, DecodeError, GeometryError, ProcessError, SinkError, SourceError};
pub use integration::{
    ChannelSink, ChannelSource, DetectionSample, DirectionEvent, DirectionRecord, DirectionSink,
    Field, FlowState, FrameProcessor, FrameReport, RunStats, SampleSource, TagValue,
};
pub use tracker::{Axis, Corridor, Direction, DirectionClassifier, Rect, TrackStore, TrackedObject};
