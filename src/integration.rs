//! Integration module connecting the tracker core to its data-flow boundary.
//!
//! This module decodes incoming detection samples, drives the frame
//! processor, and hands direction records to a sink.

mod builder;
mod endpoint;
mod processor;
mod runner;
mod sample;

pub use builder::CandidateBuilder;
pub use endpoint::{ChannelSink, ChannelSource, DirectionRecord, DirectionSink, SampleSource};
pub use processor::{DirectionEvent, FrameProcessor, FrameReport};
pub use runner::{POLL_TIMEOUT, RunStats, run};
pub use sample::{
    DetectionBox, DetectionSample, FIELD_TABLE, Field, FieldKind, FlowState, TagValue, field_kind,
};
