//! Caller-side driver around [`BarcodeProcessor`].
//!
//! The session owns the current scanner box and the camera mapper, turns
//! detector and transform failures into the processor's reset path, and
//! flags the first `Communicate` of every streak so a lookup fires once per
//! stable scan.

use aidscan_core::{CoordinateMapper, Rect};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::params::ProcessorParams;
use crate::processor::BarcodeProcessor;
use crate::types::{ActivityChange, Detection, ProcessorState};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Error reported by the external barcode detector for one frame.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("barcode detector failed: {message}")]
pub struct DetectorError {
    pub message: String,
}

impl DetectorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Why a frame ended up on the failure path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "message", rename_all = "snake_case")]
pub enum FrameFailure {
    Detector(String),
    Transform(String),
}

/// What happened to one submitted frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FrameOutcome {
    /// The session is paused; the frame was ignored.
    Dropped,
    /// No mapper is available yet; the frame was ignored.
    Skipped,
    /// The frame produced a state.
    State {
        state: ProcessorState,
        /// First `Communicate` of the current streak.
        new_scan: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        failure: Option<FrameFailure>,
    },
}

impl FrameOutcome {
    pub fn state(&self) -> Option<&ProcessorState> {
        match self {
            FrameOutcome::State { state, .. } => Some(state),
            _ => None,
        }
    }

    /// The detection to look up, if this frame completed a scan.
    pub fn new_scan(&self) -> Option<&Detection> {
        match self {
            FrameOutcome::State {
                state: ProcessorState::Communicate { payload },
                new_scan: true,
                ..
            } => Some(payload),
            _ => None,
        }
    }
}

/// One live scanning session.
pub struct ScanSession {
    processor: BarcodeProcessor,
    region: Rect,
    mapper: Option<Box<dyn CoordinateMapper + Send>>,
    communicated: bool,
}

impl ScanSession {
    pub fn new(params: ProcessorParams, region: Rect) -> Self {
        Self {
            processor: BarcodeProcessor::new(params),
            region,
            mapper: None,
            communicated: false,
        }
    }

    pub fn processor(&self) -> &BarcodeProcessor {
        &self.processor
    }

    /// Replace the scanner box, e.g. after a re-layout.
    pub fn set_region(&mut self, region: Rect) {
        if region.is_empty() {
            warn!("scanner box {region} is empty, no code will qualify");
        }
        self.region = region;
    }

    pub fn has_mapper(&self) -> bool {
        self.mapper.is_some()
    }

    /// Install the mapper for the current camera geometry.
    pub fn set_mapper(&mut self, mapper: Box<dyn CoordinateMapper + Send>) {
        self.mapper = Some(mapper);
    }

    /// Forget the mapper (camera geometry no longer valid).
    pub fn clear_mapper(&mut self) {
        self.mapper = None;
    }

    pub fn set_active(&mut self, active: bool) -> ActivityChange {
        let change = self.processor.set_active(active);
        if change != ActivityChange::Unchanged {
            self.communicated = false;
        }
        change
    }

    /// Feed the detector's result for one frame.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn submit(&mut self, frame: Result<Vec<Detection>, DetectorError>) -> FrameOutcome {
        if !self.processor.is_active() {
            return FrameOutcome::Dropped;
        }
        let Some(mapper) = self.mapper.as_deref() else {
            debug!("no coordinate mapper yet, skipping frame");
            return FrameOutcome::Skipped;
        };

        let detections = match frame {
            Ok(detections) => detections,
            Err(err) => {
                warn!("{err}");
                return self.fail(FrameFailure::Detector(err.message));
            }
        };

        match self.processor.process(&detections, mapper, &self.region) {
            Ok(Some(state)) => self.emit(state),
            Ok(None) => FrameOutcome::Dropped,
            Err(err) => {
                warn!("coordinate mapping failed: {err}");
                self.fail(FrameFailure::Transform(err.to_string()))
            }
        }
    }

    fn fail(&mut self, failure: FrameFailure) -> FrameOutcome {
        let state = self.processor.failure();
        self.communicated = false;
        FrameOutcome::State {
            state,
            new_scan: false,
            failure: Some(failure),
        }
    }

    fn emit(&mut self, state: ProcessorState) -> FrameOutcome {
        let new_scan = match &state {
            ProcessorState::Communicate { .. } => !std::mem::replace(&mut self.communicated, true),
            _ => {
                self.communicated = false;
                false
            }
        };
        FrameOutcome::State {
            state,
            new_scan,
            failure: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidscan_core::{AffineMapper, IdentityMapper, MapError};

    const REGION: Rect = Rect::new(0.0, 0.0, 300.0, 200.0);

    fn frame(payload: &str) -> Result<Vec<Detection>, DetectorError> {
        Ok(vec![Detection::new(
            payload,
            Rect::new(20.0, 20.0, 280.0, 180.0),
        )])
    }

    fn session() -> ScanSession {
        let mut s = ScanSession::new(ProcessorParams::default(), REGION);
        s.set_mapper(Box::new(IdentityMapper));
        s
    }

    struct Unavailable;

    impl CoordinateMapper for Unavailable {
        fn map_rect(&self, _rect: &Rect) -> Result<Rect, MapError> {
            Err(MapError::NonFinite)
        }
    }

    #[test]
    fn frames_without_mapper_are_skipped() {
        let mut s = ScanSession::new(ProcessorParams::default(), REGION);
        assert_eq!(s.submit(frame("A")), FrameOutcome::Skipped);
        assert_eq!(s.processor().frame_count(), 0);

        s.set_mapper(Box::new(AffineMapper::identity()));
        assert!(s.has_mapper());
        assert_eq!(
            s.submit(frame("A")).state().and_then(ProcessorState::progress),
            Some(0.2)
        );
        s.clear_mapper();
        assert_eq!(s.submit(frame("A")), FrameOutcome::Skipped);
    }

    #[test]
    fn new_scan_fires_once_per_streak() {
        let mut s = session();
        let scans: Vec<bool> = (0..9)
            .map(|_| s.submit(frame("SPLINT")).new_scan().is_some())
            .collect();
        assert_eq!(
            scans,
            vec![false, false, false, false, false, true, false, false, false]
        );

        // Leaving the box rearms the trigger.
        assert_eq!(
            s.submit(Ok(Vec::new())).state(),
            Some(&ProcessorState::Sense)
        );
        let rescans = (0..6)
            .filter(|_| s.submit(frame("SPLINT")).new_scan().is_some())
            .count();
        assert_eq!(rescans, 1);
    }

    #[test]
    fn detector_error_resets_to_sense() {
        let mut s = session();
        s.submit(frame("A"));
        s.submit(frame("A"));
        let outcome = s.submit(Err(DetectorError::new("model not loaded")));
        assert_eq!(
            outcome,
            FrameOutcome::State {
                state: ProcessorState::Sense,
                new_scan: false,
                failure: Some(FrameFailure::Detector("model not loaded".into())),
            }
        );
        assert_eq!(s.processor().frame_count(), 0);
    }

    #[test]
    fn transform_error_resets_to_sense() {
        let mut s = session();
        s.submit(frame("A"));
        s.set_mapper(Box::new(Unavailable));
        let outcome = s.submit(frame("A"));
        assert_eq!(outcome.state(), Some(&ProcessorState::Sense));
        assert!(matches!(
            outcome,
            FrameOutcome::State {
                failure: Some(FrameFailure::Transform(_)),
                ..
            }
        ));
        assert_eq!(s.processor().frame_count(), 0);
    }

    #[test]
    fn paused_session_drops_frames() {
        let mut s = session();
        s.submit(frame("A"));
        assert_eq!(s.set_active(false), ActivityChange::Paused);
        assert_eq!(s.submit(frame("A")), FrameOutcome::Dropped);
        assert_eq!(s.set_active(true), ActivityChange::Resumed);
        assert_eq!(
            s.submit(frame("A")).state().and_then(ProcessorState::progress),
            Some(0.2)
        );
    }

    #[test]
    fn outcome_serializes_with_tags() {
        let outcome = FrameOutcome::State {
            state: ProcessorState::Recognize { progress: 0.5 },
            new_scan: false,
            failure: None,
        };
        let json = serde_json::to_value(&outcome).expect("serialize");
        assert_eq!(json["outcome"], "state");
        assert_eq!(json["state"]["state"], "recognize");
        assert!(json.get("failure").is_none());
    }

    #[test]
    fn session_can_move_to_a_worker_thread() {
        fn assert_send<T: Send>() {}
        assert_send::<ScanSession>();

        let mut s = session();
        let handle = std::thread::spawn(move || s.submit(frame("A")));
        let outcome = handle.join().expect("worker");
        assert_eq!(outcome.state().and_then(ProcessorState::progress), Some(0.2));
    }
}
