//! FrameProcessor combining gating, reconciliation and direction evaluation.

use tracing::{debug, warn};

use crate::config::{EmitPolicy, SensorConfig};
use crate::error::{ConfigError, ProcessError};
use crate::integration::builder::CandidateBuilder;
use crate::integration::endpoint::{DirectionRecord, DirectionSink};
use crate::integration::sample::{DetectionBox, DetectionSample};
use crate::tracker::{
    Corridor, Direction, DirectionClassifier, Reconciliation, TrackStore, TrackedObject,
};

/// A confirmed crossing of the reference line by one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionEvent {
    pub flow_id: String,
    pub track_id: String,
    pub direction: Direction,
}

/// Summary of one processed sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Whether the sample drove a reconciliation pass
    pub reconciled: bool,
    /// Objects that passed the corridor gate
    pub candidates: usize,
    /// Objects decoded but outside the corridor
    pub gated_out: usize,
    /// Objects skipped because they failed to decode
    pub skipped: usize,
    pub reconciliation: Reconciliation,
    /// Events derived and delivered this frame
    pub events: Vec<DirectionEvent>,
}

/// Per-frame orchestration of the tracker core.
///
/// The processor exclusively owns its [`TrackStore`]; each call to
/// [`FrameProcessor::process`] reconciles, evaluates and emits before
/// returning, so no partially reconciled state is ever evaluated.
pub struct FrameProcessor {
    config: SensorConfig,
    corridor: Corridor,
    classifier: DirectionClassifier,
    store: TrackStore,
}

impl FrameProcessor {
    /// Validate the config and build the corridor. Fails fast on bad geometry.
    pub fn new(config: SensorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let corridor = config.corridor()?;
        let axis = config.resolve_axis(&corridor);
        debug!(?axis, policy = ?config.emit_policy, "Frame processor ready");

        Ok(Self {
            classifier: DirectionClassifier::new(
                axis,
                config.samples_quantity,
                config.threshold_displacement,
            ),
            store: TrackStore::new(config.max_disappeared),
            corridor,
            config,
        })
    }

    /// Process one sample and publish any resulting direction records.
    ///
    /// Samples from a flow that is not alive, or with no objects, are a
    /// no-op. Objects that fail to decode are skipped. Delivery failures are
    /// reported after every event of the frame has been attempted; tracking
    /// state is not rolled back.
    pub fn process<S: DirectionSink + ?Sized>(
        &mut self,
        sample: &DetectionSample,
        sink: &mut S,
    ) -> Result<FrameReport, ProcessError> {
        let mut report = FrameReport::default();
        if !sample.is_actionable() {
            return Ok(report);
        }

        let mut candidates = Vec::with_capacity(sample.objects.len());
        for fields in &sample.objects {
            let detection = match DetectionBox::decode(fields) {
                Ok(detection) => detection,
                Err(e) => {
                    warn!(flow_id = %sample.flow_id, "Skipping detection object: {}", e);
                    report.skipped += 1;
                    continue;
                }
            };
            let candidate = CandidateBuilder::from_box(&detection)
                .build(self.config.width, self.config.height);
            if self.corridor.contains(candidate.centroid()) {
                candidates.push(candidate);
            } else {
                report.gated_out += 1;
            }
        }

        report.reconciled = true;
        report.candidates = candidates.len();
        let (reconciliation, events) = self.process_candidates(&sample.flow_id, candidates);
        report.reconciliation = reconciliation;

        let mut failed = 0;
        let mut first_error = None;
        for event in events {
            match sink.publish(self.record(&event)) {
                Ok(()) => report.events.push(event),
                Err(e) => {
                    warn!(
                        flow_id = %event.flow_id,
                        track_id = %event.track_id,
                        "Failed to deliver direction event: {}",
                        e
                    );
                    failed += 1;
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(source) => Err(ProcessError::Delivery {
                failed,
                source,
                report: Box::new(report),
            }),
            None => Ok(report),
        }
    }

    /// Reconcile already-gated candidates and evaluate every live track.
    pub fn process_candidates(
        &mut self,
        flow_id: &str,
        candidates: Vec<TrackedObject>,
    ) -> (Reconciliation, Vec<DirectionEvent>) {
        let reconciliation = self.store.reconcile(candidates);
        let events = self.evaluate(flow_id);
        (reconciliation, events)
    }

    fn evaluate(&mut self, flow_id: &str) -> Vec<DirectionEvent> {
        let verdicts: Vec<(String, Option<Direction>)> = self
            .store
            .tracks()
            .map(|(id, track)| (id.to_string(), self.classifier.evaluate(track)))
            .collect();

        let mut events = Vec::new();
        for (track_id, verdict) in verdicts {
            let Some(track) = self.store.get_mut(&track_id) else {
                continue;
            };
            let emit = match self.config.emit_policy {
                EmitPolicy::Once => {
                    if track.reported.is_some() || verdict.is_none() {
                        continue;
                    }
                    verdict
                }
                EmitPolicy::OnTransition => {
                    if track.reported == verdict {
                        continue;
                    }
                    track.reported = verdict;
                    verdict
                }
            };
            let Some(direction) = emit else {
                continue;
            };
            track.reported = Some(direction);
            debug!(%track_id, %direction, "Direction confirmed");
            events.push(DirectionEvent {
                flow_id: flow_id.to_string(),
                track_id,
                direction,
            });
        }
        events
    }

    /// Output record for an event, labelled from the static sensor config.
    pub fn record(&self, event: &DirectionEvent) -> DirectionRecord {
        DirectionRecord {
            flow_id: event.flow_id.clone(),
            class_id: self.config.class_id,
            class_label: self.config.class_label.clone(),
            id: event.track_id.clone(),
            direction: self.config.labels.label(event.direction).to_string(),
        }
    }

    /// Drop every track, e.g. when the upstream stream restarts.
    pub fn reset(&mut self) {
        self.store.clear();
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    pub fn corridor(&self) -> &Corridor {
        &self.corridor
    }

    pub fn classifier(&self) -> &DirectionClassifier {
        &self.classifier
    }

    /// Read-only view of the live tracks.
    pub fn store(&self) -> &TrackStore {
        &self.store
    }
}
