//! Static per-sensor configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tracker::{Axis, Corridor, DEFAULT_BUFFER_RADIUS, DEFAULT_MAX_DISAPPEARED, Direction};

/// How often a track may report a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitPolicy {
    /// At most one event per track lifetime.
    #[default]
    Once,
    /// One event each time the verdict changes to a new direction.
    OnTransition,
}

/// Output labels for each direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionLabels {
    pub up: String,
    pub down: String,
    pub left: String,
    pub right: String,
}

impl Default for DirectionLabels {
    fn default() -> Self {
        Self {
            up: Direction::Up.as_str().to_string(),
            down: Direction::Down.as_str().to_string(),
            left: Direction::Left.as_str().to_string(),
            right: Direction::Right.as_str().to_string(),
        }
    }
}

impl DirectionLabels {
    pub fn label(&self, direction: Direction) -> &str {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }
}

fn default_max_disappeared() -> u32 {
    DEFAULT_MAX_DISAPPEARED
}

fn default_samples_quantity() -> usize {
    10
}

fn default_threshold_displacement() -> f64 {
    20.0
}

fn default_buffer_radius() -> f64 {
    DEFAULT_BUFFER_RADIUS
}

/// Configuration for one direction sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Class id attached to every emitted record
    pub class_id: i32,
    /// Class label attached to every emitted record
    pub class_label: String,
    /// Reference line endpoints in 0-100 normalized units
    pub coords: [[f64; 2]; 2],
    /// Movement axis; derived from `coords` when absent
    #[serde(default)]
    pub axis: Option<Axis>,
    #[serde(default = "default_max_disappeared")]
    pub max_disappeared: u32,
    /// History length that must be exceeded before a track is evaluated
    #[serde(default = "default_samples_quantity")]
    pub samples_quantity: usize,
    /// Minimum net displacement in pixels
    #[serde(default = "default_threshold_displacement")]
    pub threshold_displacement: f64,
    /// Corridor half-width in pixels
    #[serde(default = "default_buffer_radius")]
    pub buffer_radius: f64,
    #[serde(default)]
    pub emit_policy: EmitPolicy,
    #[serde(default)]
    pub labels: DirectionLabels,
}

impl SensorConfig {
    /// Config with default tuning for the given frame, sensor and line.
    pub fn new(
        width: u32,
        height: u32,
        class_id: i32,
        class_label: impl Into<String>,
        coords: [[f64; 2]; 2],
    ) -> Self {
        Self {
            width,
            height,
            class_id,
            class_label: class_label.into(),
            coords,
            axis: None,
            max_disappeared: default_max_disappeared(),
            samples_quantity: default_samples_quantity(),
            threshold_displacement: default_threshold_displacement(),
            buffer_radius: default_buffer_radius(),
            emit_policy: EmitPolicy::default(),
            labels: DirectionLabels::default(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: SensorConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check tuning values and that the line yields a usable corridor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold_displacement.is_finite() || self.threshold_displacement < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "threshold_displacement must be a non-negative number, got {}",
                self.threshold_displacement
            )));
        }
        self.corridor()?;
        Ok(())
    }

    /// Build the crossing corridor described by this config.
    pub fn corridor(&self) -> Result<Corridor, ConfigError> {
        Ok(Corridor::with_radius(
            self.coords,
            self.width,
            self.height,
            self.buffer_radius,
        )?)
    }

    /// Configured axis, or the one implied by the corridor's line.
    pub fn resolve_axis(&self, corridor: &Corridor) -> Axis {
        self.axis.unwrap_or_else(|| {
            let (start, end) = corridor.line();
            Axis::from_line(start, end)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_defaults() {
        let config = SensorConfig::from_yaml_str(
            r#"
width: 640
height: 480
class_id: 1
class_label: person
coords: [[100, 70], [5, 57]]
"#,
        )
        .unwrap();

        assert_eq!(config, SensorConfig::new(640, 480, 1, "person", [[100.0, 70.0], [5.0, 57.0]]));
        assert_eq!(config.max_disappeared, 30);
        assert_eq!(config.samples_quantity, 10);
        assert_eq!(config.threshold_displacement, 20.0);
        assert_eq!(config.buffer_radius, 5.0);
        assert_eq!(config.emit_policy, EmitPolicy::Once);

        let corridor = config.corridor().unwrap();
        assert_eq!(config.resolve_axis(&corridor), Axis::Vertical);
    }

    #[test]
    fn test_yaml_overrides() {
        let config = SensorConfig::from_yaml_str(
            r#"
width: 1280
height: 720
class_id: 2
class_label: car
coords: [[50, 0], [50, 100]]
axis: vertical
max_disappeared: 5
samples_quantity: 3
threshold_displacement: 40
buffer_radius: 12.5
emit_policy: on_transition
labels:
  up: northbound
"#,
        )
        .unwrap();

        assert_eq!(config.axis, Some(Axis::Vertical));
        assert_eq!(config.max_disappeared, 5);
        assert_eq!(config.emit_policy, EmitPolicy::OnTransition);
        assert_eq!(config.labels.label(Direction::Up), "northbound");
        assert_eq!(config.labels.label(Direction::Down), "down");

        let corridor = config.corridor().unwrap();
        assert_eq!(config.resolve_axis(&corridor), Axis::Vertical);
    }

    #[test]
    fn test_derived_axis_for_vertical_line() {
        let config = SensorConfig::new(1280, 720, 2, "car", [[50.0, 0.0], [50.0, 100.0]]);
        let corridor = config.corridor().unwrap();
        assert_eq!(config.resolve_axis(&corridor), Axis::Horizontal);
    }

    #[test]
    fn test_degenerate_line_fails_validation() {
        let result = SensorConfig::from_yaml_str(
            r#"
width: 640
height: 480
class_id: 1
class_label: person
coords: [[20, 20], [20, 20]]
"#,
        );
        assert!(matches!(result, Err(ConfigError::Geometry(_))));
    }

    #[test]
    fn test_missing_field_fails_parse() {
        let result = SensorConfig::from_yaml_str("width: 640\nheight: 480\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let mut config = SensorConfig::new(640, 480, 1, "person", [[0.0, 50.0], [100.0, 50.0]]);
        config.threshold_displacement = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
