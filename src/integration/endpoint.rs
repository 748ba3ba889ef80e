//! Traits for the sample source and direction sink around the frame processor.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};

use crate::error::{SinkError, SourceError};
use crate::integration::sample::DetectionSample;

/// Output record published for every direction event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionRecord {
    /// Routing tag copied from the originating sample
    pub flow_id: String,
    pub class_id: i32,
    pub class_label: String,
    /// Track id
    pub id: String,
    /// Direction label
    pub direction: String,
}

/// Pull-based provider of detection samples.
///
/// # Example
///
/// ```ignore
/// use direction_sensor::{DetectionSample, SampleSource, SourceError};
/// use std::time::Duration;
///
/// struct Replay(Vec<DetectionSample>);
///
/// impl SampleSource for Replay {
///     fn read(&mut self, _timeout: Duration) -> Result<Vec<DetectionSample>, SourceError> {
///         if self.0.is_empty() {
///             return Err(SourceError::Disconnected);
///         }
///         Ok(vec![self.0.remove(0)])
///     }
/// }
/// ```
pub trait SampleSource {
    /// Wait up to `timeout` for the next batch of samples.
    ///
    /// An empty batch is a normal outcome. [`SourceError::Disconnected`]
    /// means no further samples will ever arrive.
    fn read(&mut self, timeout: Duration) -> Result<Vec<DetectionSample>, SourceError>;
}

/// Consumer of direction records.
pub trait DirectionSink {
    fn publish(&mut self, record: DirectionRecord) -> Result<(), SinkError>;
}

impl DirectionSink for Vec<DirectionRecord> {
    fn publish(&mut self, record: DirectionRecord) -> Result<(), SinkError> {
        self.push(record);
        Ok(())
    }
}

/// Source reading samples from a crossbeam channel.
pub struct ChannelSource {
    rx: Receiver<DetectionSample>,
}

impl ChannelSource {
    pub fn new(rx: Receiver<DetectionSample>) -> Self {
        Self { rx }
    }
}

impl SampleSource for ChannelSource {
    fn read(&mut self, timeout: Duration) -> Result<Vec<DetectionSample>, SourceError> {
        match self.rx.recv_timeout(timeout) {
            Ok(first) => {
                let mut batch = vec![first];
                batch.extend(self.rx.try_iter());
                Ok(batch)
            }
            Err(RecvTimeoutError::Timeout) => Ok(Vec::new()),
            Err(RecvTimeoutError::Disconnected) => Err(SourceError::Disconnected),
        }
    }
}

/// Sink forwarding records into a crossbeam channel.
pub struct ChannelSink {
    tx: Sender<DirectionRecord>,
}

impl ChannelSink {
    pub fn new(tx: Sender<DirectionRecord>) -> Self {
        Self { tx }
    }
}

impl DirectionSink for ChannelSink {
    fn publish(&mut self, record: DirectionRecord) -> Result<(), SinkError> {
        self.tx.send(record).map_err(|_| SinkError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::sample::FlowState;

    fn sample(flow_id: &str) -> DetectionSample {
        DetectionSample {
            flow_id: flow_id.to_string(),
            flow_state: FlowState::Alive,
            objects: vec![],
        }
    }

    #[test]
    fn test_channel_source_batches() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut source = ChannelSource::new(rx);

        tx.send(sample("a")).unwrap();
        tx.send(sample("b")).unwrap();
        let batch = source.read(Duration::from_millis(10)).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1].flow_id, "b");

        assert!(source.read(Duration::from_millis(10)).unwrap().is_empty());

        drop(tx);
        assert!(matches!(
            source.read(Duration::from_millis(10)),
            Err(SourceError::Disconnected)
        ));
    }

    #[test]
    fn test_channel_sink_disconnected() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut sink = ChannelSink::new(tx);
        let record = DirectionRecord {
            flow_id: "cam".into(),
            class_id: 1,
            class_label: "person".into(),
            id: "7".into(),
            direction: "down".into(),
        };

        sink.publish(record.clone()).unwrap();
        assert_eq!(rx.try_recv().unwrap(), record);

        drop(rx);
        assert!(matches!(sink.publish(record), Err(SinkError::Disconnected)));
    }
}
