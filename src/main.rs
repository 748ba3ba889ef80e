// src/main.rs
//
// Reads detection samples as JSON lines on stdin and writes direction
// records as JSON lines on stdout. Logs go to stderr.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use direction_sensor::integration::{self, POLL_TIMEOUT};
use direction_sensor::{
    ChannelSource, DetectionSample, DirectionRecord, DirectionSink, FrameProcessor, SensorConfig,
    SinkError,
};
use tracing::{info, warn};

/// Line-crossing direction sensor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sensor configuration (YAML)
    #[arg(short, long, default_value = "sensor.yaml")]
    config: PathBuf,

    /// Bounded wait for the next sample, in milliseconds
    #[arg(long, default_value_t = POLL_TIMEOUT.as_millis() as u64)]
    poll_ms: u64,
}

struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> DirectionSink for JsonLinesSink<W> {
    fn publish(&mut self, record: DirectionRecord) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.out, &record).map_err(io::Error::from)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "direction_sensor=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = SensorConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    info!(
        "Sensor {} ({}) on {}x{} frame, line {:?}",
        config.class_label, config.class_id, config.width, config.height, config.coords
    );
    let mut processor = FrameProcessor::new(config)?;

    let (tx, rx) = crossbeam_channel::bounded::<DetectionSample>(256);
    let reader = thread::spawn(move || {
        let stdin = io::stdin();
        for (lineno, line) in stdin.lock().lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<DetectionSample>(&line) {
                Ok(sample) => {
                    if tx.send(sample).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("Ignoring malformed sample on line {}: {}", lineno + 1, e),
            }
        }
    });

    // EOF on stdin ends the reader thread, which disconnects the source and
    // stops the run. Nothing else sets this flag.
    let shutdown = AtomicBool::new(false);
    let mut sink = JsonLinesSink {
        out: io::stdout().lock(),
    };
    let stats = integration::run(
        &mut ChannelSource::new(rx),
        &mut processor,
        &mut sink,
        &shutdown,
        Duration::from_millis(args.poll_ms),
    );

    if reader.join().is_err() {
        warn!("Sample reader thread panicked");
    }
    info!(
        "Processed {} frames, emitted {} events ({} delivery failures)",
        stats.frames, stats.events, stats.delivery_failures
    );
    Ok(())
}
