use aidscan_core::Rect;
use serde::{Deserialize, Serialize};

/// One barcode sighting in a single camera frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Raw decoded value, if the detector could read it.
    #[serde(default)]
    pub payload: Option<String>,
    /// Box in camera-image coordinates.
    pub bounding_box: Rect,
}

impl Detection {
    pub fn new(payload: impl Into<String>, bounding_box: Rect) -> Self {
        Self {
            payload: Some(payload.into()),
            bounding_box,
        }
    }

    /// A sighting whose value could not be decoded.
    pub fn unreadable(bounding_box: Rect) -> Self {
        Self {
            payload: None,
            bounding_box,
        }
    }
}

/// Stabilized output of one processed frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProcessorState {
    /// No eligible candidate in this frame.
    Sense,
    /// A candidate is being confirmed; `progress` is in `(0, 1]`.
    Recognize { progress: f32 },
    /// The candidate has been stable long enough to act on.
    Communicate { payload: Detection },
}

impl ProcessorState {
    pub fn progress(&self) -> Option<f32> {
        match self {
            ProcessorState::Recognize { progress } => Some(*progress),
            _ => None,
        }
    }

    pub fn communicated(&self) -> Option<&Detection> {
        match self {
            ProcessorState::Communicate { payload } => Some(payload),
            _ => None,
        }
    }
}

/// How many detections of a frame ended up inside the scanner box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CandidateCount {
    None,
    One,
    /// Ambiguous: several codes inside the box at once.
    Many(usize),
}

impl CandidateCount {
    pub fn from_len(n: usize) -> Self {
        match n {
            0 => CandidateCount::None,
            1 => CandidateCount::One,
            n => CandidateCount::Many(n),
        }
    }
}

/// Result of toggling the processor's activity flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityChange {
    /// The flag already had the requested value; nothing was reset.
    Unchanged,
    /// Now inactive; confirmation progress was cleared.
    Paused,
    /// Now active again; confirmation progress was cleared.
    Resumed,
}
