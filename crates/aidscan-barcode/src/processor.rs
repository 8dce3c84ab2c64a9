//! Frame-to-frame stabilization of barcode detections.
//!
//! A code is only reported once the same single candidate has been seen
//! inside the scanner box, large enough, for `target_frames` consecutive
//! frames. Anything else (nothing in the box, several codes, a different
//! payload, a failed frame) drops the streak back to zero.

use aidscan_core::{is_inside, is_large_enough, CoordinateMapper, MapError, Rect};
use log::{debug, info};

use crate::params::ProcessorParams;
use crate::types::{ActivityChange, CandidateCount, Detection, ProcessorState};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Scan stabilization state machine.
///
/// Frames must be fed in capture order from a single execution context.
#[derive(Clone, Debug)]
pub struct BarcodeProcessor {
    target_frames: u32,
    active: bool,
    frame_count: u32,
    last_payload: Option<String>,
}

impl Default for BarcodeProcessor {
    fn default() -> Self {
        Self::new(ProcessorParams::default())
    }
}

impl BarcodeProcessor {
    pub fn new(params: ProcessorParams) -> Self {
        Self {
            target_frames: params.effective_target_frames(),
            active: true,
            frame_count: 0,
            last_payload: None,
        }
    }

    /// Processor requiring `target_frames` frames (at least 5).
    pub fn configure(target_frames: u32) -> Self {
        Self::new(ProcessorParams::with_target_frames(target_frames))
    }

    pub fn target_frames(&self) -> u32 {
        self.target_frames
    }

    /// Consecutive eligible frames seen for the current candidate.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn last_payload(&self) -> Option<&str> {
        self.last_payload.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Pause or resume processing.
    ///
    /// Any change of the flag clears confirmation progress so a resumed
    /// session never inherits a stale streak.
    pub fn set_active(&mut self, active: bool) -> ActivityChange {
        if self.active == active {
            return ActivityChange::Unchanged;
        }
        self.active = active;
        self.reset();
        if active {
            info!("barcode processor resumed");
            ActivityChange::Resumed
        } else {
            info!("barcode processor paused");
            ActivityChange::Paused
        }
    }

    /// Clear the streak counter and the remembered payload.
    pub fn reset(&mut self) {
        self.frame_count = 0;
        self.last_payload = None;
    }

    /// Process the detections of one frame.
    ///
    /// Returns `Ok(None)` while inactive (the frame is dropped). A mapping
    /// error is returned before any internal state is touched; callers are
    /// expected to route it to [`BarcodeProcessor::failure`].
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(detections = detections.len()))
    )]
    pub fn process<M: CoordinateMapper + ?Sized>(
        &mut self,
        detections: &[Detection],
        mapper: &M,
        region: &Rect,
    ) -> Result<Option<ProcessorState>, MapError> {
        if !self.active {
            return Ok(None);
        }

        let mut inside = Vec::with_capacity(detections.len());
        for detection in detections {
            let mapped = mapper.map_rect(&detection.bounding_box)?;
            if is_inside(region, &mapped) {
                inside.push((detection, mapped));
            }
        }

        let candidate = match CandidateCount::from_len(inside.len()) {
            CandidateCount::One => Some(inside[0]),
            CandidateCount::None => None,
            CandidateCount::Many(n) => {
                debug!("{n} codes inside the scanner box, ignoring frame");
                None
            }
        };

        let eligible = candidate.filter(|(detection, mapped)| {
            is_large_enough(region, mapped)
                && (self.frame_count == 0 || detection.payload == self.last_payload)
        });

        let state = match eligible {
            None => {
                if self.frame_count > 0 {
                    debug!("streak broken after {} frames", self.frame_count);
                }
                self.reset();
                ProcessorState::Sense
            }
            Some((detection, _)) if self.frame_count < self.target_frames => {
                self.frame_count += 1;
                self.last_payload = detection.payload.clone();
                let progress = self.frame_count as f32 / self.target_frames as f32;
                debug!(
                    "recognizing {:?}: {}/{}",
                    detection.payload, self.frame_count, self.target_frames
                );
                ProcessorState::Recognize { progress }
            }
            // The counter is left at the target: further eligible frames keep
            // reporting the same code until it leaves the box.
            Some((detection, _)) => {
                info!("scan confirmed: {:?}", detection.payload);
                ProcessorState::Communicate {
                    payload: detection.clone(),
                }
            }
        };
        Ok(Some(state))
    }

    /// Record a failed frame (detector or transform error).
    ///
    /// Always yields `Sense` and clears progress.
    pub fn failure(&mut self) -> ProcessorState {
        self.reset();
        ProcessorState::Sense
    }
}
