//! Polling loop driving a FrameProcessor from a sample source.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{ProcessError, SourceError};
use crate::integration::endpoint::{DirectionSink, SampleSource};
use crate::integration::processor::{FrameProcessor, FrameReport};

/// Default bounded wait for the next batch of samples.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Polls that returned no samples
    pub idle_polls: u64,
    /// Samples that drove a reconciliation pass
    pub frames: u64,
    pub events: u64,
    pub skipped_objects: u64,
    /// Records the sink failed to accept
    pub delivery_failures: u64,
    pub source_errors: u64,
}

impl RunStats {
    fn record(&mut self, report: &FrameReport) {
        if report.reconciled {
            self.frames += 1;
        }
        self.events += report.events.len() as u64;
        self.skipped_objects += report.skipped as u64;
    }
}

/// Poll `source` until it disconnects or `shutdown` is set.
///
/// Samples are processed strictly in arrival order. Source errors other than
/// disconnection and delivery failures are logged and the loop carries on.
pub fn run<Src, Snk>(
    source: &mut Src,
    processor: &mut FrameProcessor,
    sink: &mut Snk,
    shutdown: &AtomicBool,
    poll_timeout: Duration,
) -> RunStats
where
    Src: SampleSource + ?Sized,
    Snk: DirectionSink + ?Sized,
{
    let mut stats = RunStats::default();
    info!("Running");

    while !shutdown.load(Ordering::Relaxed) {
        let samples = match source.read(poll_timeout) {
            Ok(samples) => samples,
            Err(SourceError::Disconnected) => {
                info!("Sample source disconnected");
                break;
            }
            Err(e) => {
                warn!("Failed to read samples: {}", e);
                stats.source_errors += 1;
                continue;
            }
        };

        if samples.is_empty() {
            stats.idle_polls += 1;
            continue;
        }

        for sample in &samples {
            match processor.process(sample, sink) {
                Ok(report) => stats.record(&report),
                Err(ProcessError::Delivery {
                    failed,
                    source: e,
                    report,
                }) => {
                    warn!(flow_id = %sample.flow_id, failed, "Delivery failed: {}", e);
                    stats.record(&report);
                    stats.delivery_failures += failed as u64;
                }
            }
        }
    }

    info!(
        frames = stats.frames,
        events = stats.events,
        skipped = stats.skipped_objects,
        "Stopped"
    );
    stats
}
