//! Wire-level detection samples and the static field decode table.

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Liveness of the flow a sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    #[default]
    Alive,
    NotAlive,
}

/// Typed value of one field record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagValue {
    Int32(i32),
    Float32(f32),
    Float64(f64),
    String(String),
}

impl TagValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            TagValue::Int32(_) => FieldKind::Int32,
            TagValue::Float32(_) => FieldKind::Float32,
            TagValue::Float64(_) => FieldKind::Float64,
            TagValue::String(_) => FieldKind::String,
        }
    }
}

/// Semantic type expected for a recognized field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int32,
    Float32,
    Float64,
    String,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Int32 => "int32",
            FieldKind::Float32 => "float32",
            FieldKind::Float64 => "float64",
            FieldKind::String => "string",
        }
    }
}

/// One named field of a detected object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: TagValue,
}

impl Field {
    pub fn new(name: impl Into<String>, value: TagValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A batch of detected objects for one frame of one flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSample {
    pub flow_id: String,
    #[serde(default)]
    pub flow_state: FlowState,
    /// Field records, one list per detected object
    #[serde(default)]
    pub objects: Vec<Vec<Field>>,
}

impl DetectionSample {
    /// Whether this sample should drive a reconciliation pass.
    pub fn is_actionable(&self) -> bool {
        self.flow_state == FlowState::Alive && !self.objects.is_empty()
    }
}

/// Every field name a detection object may carry, with its expected type.
pub const FIELD_TABLE: &[(&str, FieldKind)] = &[
    ("obj_id", FieldKind::Int32),
    ("obj_label", FieldKind::String),
    ("class_id", FieldKind::Int32),
    ("class_label", FieldKind::String),
    ("x1", FieldKind::Float32),
    ("y1", FieldKind::Float32),
    ("x2", FieldKind::Float32),
    ("y2", FieldKind::Float32),
    ("probability", FieldKind::Float32),
    ("meta", FieldKind::String),
    ("dist_x", FieldKind::Float64),
    ("dist_y", FieldKind::Float64),
    ("dist_z", FieldKind::Float64),
];

/// Look up a field name in [`FIELD_TABLE`].
pub fn field_kind(name: &str) -> Option<(&'static str, FieldKind)> {
    FIELD_TABLE
        .iter()
        .find(|(known, _)| *known == name)
        .map(|&(known, kind)| (known, kind))
}

/// A decoded detection box in normalized coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectionBox {
    pub obj_id: i32,
    pub obj_label: Option<String>,
    pub class_id: Option<i32>,
    pub class_label: Option<String>,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub probability: Option<f32>,
    pub meta: Option<String>,
    pub dist: [Option<f64>; 3],
}

impl DetectionBox {
    /// Decode one object's field records.
    ///
    /// Fails on the first unrecognized name or type mismatch, when any of
    /// `obj_id`, `x1`, `y1`, `x2`, `y2` is absent, when a corner is not a
    /// finite value in 0-1, or when `x1 > x2` or `y1 > y2`.
    pub fn decode(fields: &[Field]) -> Result<Self, DecodeError> {
        let mut obj_id = None;
        let mut corners: [Option<f32>; 4] = [None; 4];
        let mut decoded = DetectionBox::default();

        for field in fields {
            let (name, expected) = field_kind(&field.name)
                .ok_or_else(|| DecodeError::UnrecognizedField(field.name.clone()))?;
            let mismatch = || DecodeError::TypeMismatch {
                field: name,
                expected: expected.as_str(),
                found: field.value.kind().as_str(),
            };

            match (name, &field.value) {
                ("obj_id", TagValue::Int32(v)) => obj_id = Some(*v),
                ("obj_label", TagValue::String(v)) => decoded.obj_label = Some(v.clone()),
                ("class_id", TagValue::Int32(v)) => decoded.class_id = Some(*v),
                ("class_label", TagValue::String(v)) => decoded.class_label = Some(v.clone()),
                ("x1", TagValue::Float32(v)) => corners[0] = Some(*v),
                ("y1", TagValue::Float32(v)) => corners[1] = Some(*v),
                ("x2", TagValue::Float32(v)) => corners[2] = Some(*v),
                ("y2", TagValue::Float32(v)) => corners[3] = Some(*v),
                ("probability", TagValue::Float32(v)) => decoded.probability = Some(*v),
                ("meta", TagValue::String(v)) => decoded.meta = Some(v.clone()),
                ("dist_x", TagValue::Float64(v)) => decoded.dist[0] = Some(*v),
                ("dist_y", TagValue::Float64(v)) => decoded.dist[1] = Some(*v),
                ("dist_z", TagValue::Float64(v)) => decoded.dist[2] = Some(*v),
                _ => return Err(mismatch()),
            }
        }

        decoded.obj_id = obj_id.ok_or(DecodeError::MissingField("obj_id"))?;
        decoded.x1 = corner("x1", corners[0])?;
        decoded.y1 = corner("y1", corners[1])?;
        decoded.x2 = corner("x2", corners[2])?;
        decoded.y2 = corner("y2", corners[3])?;
        if decoded.x1 > decoded.x2 || decoded.y1 > decoded.y2 {
            return Err(DecodeError::InvertedBox {
                x1: decoded.x1,
                y1: decoded.y1,
                x2: decoded.x2,
                y2: decoded.y2,
            });
        }
        Ok(decoded)
    }
}

/// A present, finite, normalized corner coordinate.
fn corner(field: &'static str, value: Option<f32>) -> Result<f32, DecodeError> {
    let value = value.ok_or(DecodeError::MissingField(field))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(DecodeError::OutOfRange { field, value });
    }
    Ok(value)
}
