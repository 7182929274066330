//! Replay of recorded tracks.
//!
//! A track is a JSON-lines file. Each line is one step, scheduled `t`
//! seconds after the replay starts:
//!
//! ```text
//! {"t": 0.0, "lat": 53.5511, "lon": 9.9937, "accuracy": 65.0}
//! {"t": 0.5, "lat": 53.5511, "lon": 9.9937, "accuracy": 40.0, "age": 30.0}
//! {"t": 1.0, "error": "location_unknown"}
//! ```
//!
//! Samples are re-stamped relative to the replay clock: a step at `t` with
//! `age` gets the timestamp `replay_start + t - age`, so an `age` above the
//! filter's maximum reproduces a cached reading. Blank lines and lines
//! starting with `#` are skipped.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::task::JoinHandle;

use super::types::{LocationProvider, ProviderError, ProviderSink};
use crate::coord::Coordinate;
use crate::fix::RawSample;

/// One scheduled step of a track.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayStep {
    /// Offset from the start of the replay.
    pub at: Duration,
    pub kind: ReplayStepKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplayStepKind {
    Sample {
        coordinate: Coordinate,
        horizontal_accuracy: f64,
        /// How old the reading already is when delivered.
        age: Duration,
    },
    Error(ProviderError),
}

#[derive(Debug, Deserialize)]
struct TrackLine {
    t: f64,
    lat: Option<f64>,
    lon: Option<f64>,
    accuracy: Option<f64>,
    #[serde(default)]
    age: f64,
    error: Option<TrackError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TrackError {
    LocationUnknown,
    Denied,
    Network,
}

/// Provider that replays a recorded track with its original timing.
#[derive(Debug)]
pub struct ReplayProvider {
    steps: Vec<ReplayStep>,
    task: Option<JoinHandle<()>>,
}

impl ReplayProvider {
    /// Create a provider from already parsed steps.
    pub fn new(mut steps: Vec<ReplayStep>) -> Self {
        steps.sort_by_key(|step| step.at);
        Self { steps, task: None }
    }

    /// Load a track file.
    pub fn from_path(path: &Path) -> Result<Self, ProviderError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse track content.
    pub fn parse(content: &str) -> Result<Self, ProviderError> {
        let mut steps = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            steps.push(parse_line(line, index + 1)?);
        }
        Ok(Self::new(steps))
    }

    pub fn steps(&self) -> &[ReplayStep] {
        &self.steps
    }

    /// Whether the replay task is still delivering steps.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl LocationProvider for ReplayProvider {
    fn start(&mut self, sink: ProviderSink) -> Result<(), ProviderError> {
        self.stop();

        let steps = self.steps.clone();
        tracing::debug!(steps = steps.len(), "Starting track replay");
        self.task = Some(tokio::spawn(replay(steps, sink)));
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ReplayProvider {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn replay(steps: Vec<ReplayStep>, sink: ProviderSink) {
    let started = tokio::time::Instant::now();
    let wall_start = Utc::now();

    for step in steps {
        tokio::time::sleep_until(started + step.at).await;

        let delivered = match step.kind {
            ReplayStepKind::Sample {
                coordinate,
                horizontal_accuracy,
                age,
            } => {
                let timestamp = stamp(wall_start, step.at, age);
                sink.sample(RawSample::new(timestamp, coordinate, horizontal_accuracy))
            }
            ReplayStepKind::Error(error) => sink.error(error),
        };

        if !delivered {
            tracing::debug!("Replay receiver gone, stopping");
            return;
        }
    }
    tracing::debug!("Track replay finished");
}

fn stamp(wall_start: DateTime<Utc>, at: Duration, age: Duration) -> DateTime<Utc> {
    let at = chrono::Duration::from_std(at).unwrap_or(chrono::Duration::zero());
    let age = chrono::Duration::from_std(age).unwrap_or(chrono::Duration::zero());
    wall_start + at - age
}

fn parse_line(line: &str, number: usize) -> Result<ReplayStep, ProviderError> {
    let parse_error = |message: String| ProviderError::Parse {
        line: number,
        message,
    };

    let entry: TrackLine = serde_json::from_str(line).map_err(|e| parse_error(e.to_string()))?;
    let at = seconds(entry.t).ok_or_else(|| parse_error(format!("invalid offset {}", entry.t)))?;

    if let Some(error) = entry.error {
        let error = match error {
            TrackError::LocationUnknown => ProviderError::LocationUnknown,
            TrackError::Denied => ProviderError::Denied,
            TrackError::Network => ProviderError::Network("replayed network failure".into()),
        };
        return Ok(ReplayStep {
            at,
            kind: ReplayStepKind::Error(error),
        });
    }

    let (Some(lat), Some(lon), Some(accuracy)) = (entry.lat, entry.lon, entry.accuracy) else {
        return Err(parse_error(
            "sample needs lat, lon and accuracy".to_string(),
        ));
    };
    let coordinate = Coordinate::new(lat, lon).map_err(|e| parse_error(e.to_string()))?;
    let age = seconds(entry.age).ok_or_else(|| parse_error(format!("invalid age {}", entry.age)))?;

    Ok(ReplayStep {
        at,
        kind: ReplayStepKind::Sample {
            coordinate,
            horizontal_accuracy: accuracy,
            age,
        },
    })
}

fn seconds(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value).ok()
}
