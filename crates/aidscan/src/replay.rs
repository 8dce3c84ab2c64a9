//! Offline replay of recorded detector output through a [`ScanSession`].
//!
//! A replay config names a JSON frame log plus the scanner box, processor
//! settings and (optionally) the camera viewport. Every record is fed to a
//! fresh session and the outcome of each frame ends up in the report.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::barcode::{
    ActivityChange, Detection, DetectorError, FrameOutcome, ProcessorParams, ScanSession,
};
use crate::core::{
    IdentityMapper, MapError, Rect, SourceGeometry, TargetGeometry, ViewportMapper,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum ReplayError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid viewport: {0}")]
    Map(#[from] MapError),
}

/// Camera and overlay geometry used to build a [`ViewportMapper`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub source: SourceGeometry,
    pub target: TargetGeometry,
}

/// Replay configuration, usually loaded from JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Frame log; relative paths are resolved against the config file.
    pub frames_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    /// Scanner box in overlay coordinates.
    pub region: Rect,
    #[serde(default)]
    pub processor: ProcessorParams,
    /// Without a viewport, detector boxes are already in overlay space.
    #[serde(default)]
    pub viewport: Option<ViewportConfig>,
}

impl ReplayConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Report path, defaulting to `aidscan_replay_report.json`.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("aidscan_replay_report.json"))
    }

    /// Frame log location for a config loaded from `config_path`.
    pub fn resolve_frames_path(&self, config_path: &Path) -> PathBuf {
        let frames = PathBuf::from(&self.frames_path);
        match config_path.parent() {
            Some(dir) if frames.is_relative() => dir.join(frames),
            _ => frames,
        }
    }

    /// Session with the configured region, processor and mapper.
    pub fn build_session(&self) -> Result<ScanSession, ReplayError> {
        let mut session = ScanSession::new(self.processor.clone(), self.region);
        match self.viewport {
            Some(v) => session.set_mapper(Box::new(ViewportMapper::new(v.source, v.target)?)),
            None => session.set_mapper(Box::new(IdentityMapper)),
        }
        Ok(session)
    }
}

/// One entry of a recorded frame log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameRecord {
    /// Detector output for one frame.
    Detections { detections: Vec<Detection> },
    /// The detector failed on this frame.
    Failure { message: String },
    /// Camera paused (app backgrounded, screen left).
    Pause,
    /// Camera resumed.
    Resume,
}

pub fn load_frames(path: impl AsRef<Path>) -> Result<Vec<FrameRecord>, ReplayError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayEvent {
    Frame { outcome: FrameOutcome },
    Activity { change: ActivityChange },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub index: usize,
    #[serde(flatten)]
    pub event: ReplayEvent,
}

/// A confirmed scan that would trigger a lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub frame: usize,
    pub payload: Option<String>,
    pub bounding_box: Rect,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayReport {
    pub target_frames: u32,
    pub num_frames: usize,
    pub frames: Vec<FrameReport>,
    pub scans: Vec<ScanRecord>,
}

impl ReplayReport {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Feed `frames` through `session` in order.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(frames = frames.len()))
)]
pub fn replay(session: &mut ScanSession, frames: &[FrameRecord]) -> ReplayReport {
    let mut reports = Vec::with_capacity(frames.len());
    let mut scans = Vec::new();

    for (index, record) in frames.iter().enumerate() {
        let event = match record {
            FrameRecord::Detections { detections } => ReplayEvent::Frame {
                outcome: session.submit(Ok(detections.clone())),
            },
            FrameRecord::Failure { message } => ReplayEvent::Frame {
                outcome: session.submit(Err(DetectorError::new(message.clone()))),
            },
            FrameRecord::Pause => ReplayEvent::Activity {
                change: session.set_active(false),
            },
            FrameRecord::Resume => ReplayEvent::Activity {
                change: session.set_active(true),
            },
        };

        if let ReplayEvent::Frame { outcome } = &event {
            if let Some(detection) = outcome.new_scan() {
                info!("frame {index}: scanned {:?}", detection.payload);
                scans.push(ScanRecord {
                    frame: index,
                    payload: detection.payload.clone(),
                    bounding_box: detection.bounding_box,
                });
            }
        }
        debug!("frame {index}: {event:?}");
        reports.push(FrameReport { index, event });
    }

    ReplayReport {
        target_frames: session.processor().target_frames(),
        num_frames: frames.len(),
        frames: reports,
        scans,
    }
}

/// Load a config and its frame log, then replay it.
pub fn replay_config_file(
    config_path: impl AsRef<Path>,
) -> Result<(ReplayConfig, ReplayReport), ReplayError> {
    let config_path = config_path.as_ref();
    let cfg = ReplayConfig::load_json(config_path)?;
    let frames = load_frames(cfg.resolve_frames_path(config_path))?;
    info!("loaded {} frame records", frames.len());
    let mut session = cfg.build_session()?;
    let report = replay(&mut session, &frames);
    Ok((cfg, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::ProcessorState;

    const REGION: Rect = Rect::new(0.0, 0.0, 300.0, 200.0);

    fn seen(payload: &str) -> FrameRecord {
        FrameRecord::Detections {
            detections: vec![Detection::new(payload, Rect::new(20.0, 20.0, 280.0, 180.0))],
        }
    }

    fn config() -> ReplayConfig {
        ReplayConfig {
            frames_path: "frames.json".into(),
            output_path: None,
            region: REGION,
            processor: ProcessorParams::default(),
            viewport: None,
        }
    }

    #[test]
    fn replay_records_one_scan_per_streak() {
        let mut frames: Vec<FrameRecord> = (0..8).map(|_| seen("IBUPROFEN")).collect();
        frames.push(FrameRecord::Detections {
            detections: Vec::new(),
        });
        frames.extend((0..6).map(|_| seen("IBUPROFEN")));

        let mut session = config().build_session().expect("session");
        let report = replay(&mut session, &frames);
        let frames_with_scans: Vec<usize> = report.scans.iter().map(|s| s.frame).collect();
        assert_eq!(frames_with_scans, vec![5, 14]);
        assert_eq!(report.num_frames, 15);
        assert_eq!(report.target_frames, 5);
    }

    #[test]
    fn pause_and_failure_records_reset_progress() {
        let frames = vec![
            seen("A"),
            seen("A"),
            FrameRecord::Pause,
            seen("A"),
            FrameRecord::Resume,
            seen("A"),
            FrameRecord::Failure {
                message: "camera closed".into(),
            },
            seen("A"),
        ];
        let mut session = config().build_session().expect("session");
        let report = replay(&mut session, &frames);

        let progress = |i: usize| match &report.frames[i].event {
            ReplayEvent::Frame { outcome } => outcome.state().and_then(ProcessorState::progress),
            _ => None,
        };
        assert_eq!(progress(1), Some(0.4));
        assert_eq!(
            report.frames[3].event,
            ReplayEvent::Frame {
                outcome: FrameOutcome::Dropped
            }
        );
        assert_eq!(
            report.frames[4].event,
            ReplayEvent::Activity {
                change: ActivityChange::Resumed
            }
        );
        assert_eq!(progress(5), Some(0.2));
        assert_eq!(progress(7), Some(0.2));
        assert!(report.scans.is_empty());
    }

    #[test]
    fn invalid_viewport_is_reported() {
        let mut cfg = config();
        cfg.viewport = Some(ViewportConfig {
            source: SourceGeometry {
                width: 0.0,
                height: 480.0,
                rotation: Default::default(),
            },
            target: TargetGeometry {
                width: 300.0,
                height: 200.0,
                scale: Default::default(),
            },
        });
        assert!(matches!(cfg.build_session(), Err(ReplayError::Map(_))));
    }

    #[test]
    fn frames_path_is_relative_to_config() {
        let cfg = config();
        assert_eq!(
            cfg.resolve_frames_path(Path::new("/data/run/config.json")),
            PathBuf::from("/data/run/frames.json")
        );
        let mut abs = config();
        abs.frames_path = "/elsewhere/frames.json".into();
        assert_eq!(
            abs.resolve_frames_path(Path::new("/data/run/config.json")),
            PathBuf::from("/elsewhere/frames.json")
        );
    }

    #[test]
    fn frame_log_uses_kind_tags() {
        let raw = r#"[
            {"kind": "detections", "detections": [
                {"payload": "X", "bounding_box": {"left": 0, "top": 0, "right": 10, "bottom": 10}},
                {"bounding_box": {"left": 5, "top": 5, "right": 9, "bottom": 9}}
            ]},
            {"kind": "failure", "message": "boom"},
            {"kind": "pause"},
            {"kind": "resume"}
        ]"#;
        let frames: Vec<FrameRecord> = serde_json::from_str(raw).expect("parse");
        assert_eq!(frames.len(), 4);
        match &frames[0] {
            FrameRecord::Detections { detections } => {
                assert_eq!(detections[0].payload.as_deref(), Some("X"));
                assert_eq!(detections[1].payload, None);
            }
            other => panic!("unexpected record {other:?}"),
        }
        assert_eq!(frames[2], FrameRecord::Pause);
    }
}
