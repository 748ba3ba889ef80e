//! Error types shared across the tracker core and its integration boundary.

use thiserror::Error;

use crate::integration::FrameReport;

/// Failure to build the line corridor from static configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("frame dimensions must be non-zero, got {width}x{height}")]
    InvalidFrame { width: u32, height: u32 },
    #[error("line coordinate {0} is outside the 0-100 range")]
    CoordOutOfRange(f64),
    #[error("buffer radius must be positive and finite, got {0}")]
    InvalidRadius(f64),
    #[error("line collapses to a single point at ({x}, {y}) after scaling")]
    DegenerateLine { x: i32, y: i32 },
}

/// Failure to decode a single detection object. Only that object is skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("unrecognized field `{0}`")]
    UnrecognizedField(String),
    #[error("field `{field}` expected {expected}, found {found}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("required field `{0}` is missing")]
    MissingField(&'static str),
    #[error("field `{field}` is {value}, expected a value in 0-1")]
    OutOfRange { field: &'static str, value: f32 },
    #[error("box corners are inverted: ({x1}, {y1}) > ({x2}, {y2})")]
    InvertedBox { x1: f32, y1: f32, x2: f32, y2: f32 },
}

/// Failure to load or validate a sensor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid line geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure to publish a record to the output sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink disconnected")]
    Disconnected,
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to read the next batch of samples.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source is closed for good; the polling loop stops.
    #[error("source disconnected")]
    Disconnected,
    #[error("source I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed sample: {0}")]
    Malformed(String),
}

/// Failure surfaced to the caller of the frame processor.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// One or more events were derived but could not be delivered.
    ///
    /// `report` describes the frame as processed; its `events` hold only the
    /// events that were delivered.
    #[error("failed to deliver {failed} direction event(s): {source}")]
    Delivery {
        failed: usize,
        #[source]
        source: SinkError,
        report: Box<FrameReport>,
    },
}
