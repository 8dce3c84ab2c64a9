//! Barcode scan stabilization.
//!
//! Camera detectors report every code they see on every frame, with boxes
//! that jitter and payloads that occasionally misread. [`BarcodeProcessor`]
//! smooths that stream into three states:
//!
//! - [`ProcessorState::Sense`]: nothing usable in the scanner box;
//! - [`ProcessorState::Recognize`]: one code is being confirmed;
//! - [`ProcessorState::Communicate`]: the code was stable long enough.
//!
//! [`ScanSession`] wraps the processor with what a camera callback needs:
//! the current scanner box, the camera-to-overlay mapper, failure routing
//! and a one-shot trigger per confirmed scan.
//!
//! ```
//! use aidscan_barcode::{BarcodeProcessor, Detection, ProcessorState};
//! use aidscan_core::{IdentityMapper, Rect};
//!
//! let region = Rect::new(0.0, 0.0, 300.0, 200.0);
//! let frame = [Detection::new("4006381333931", Rect::new(20.0, 20.0, 280.0, 180.0))];
//! let mut processor = BarcodeProcessor::configure(5);
//!
//! let mut state = ProcessorState::Sense;
//! for _ in 0..6 {
//!     state = processor.process(&frame, &IdentityMapper, &region)?.unwrap_or(state);
//! }
//! assert!(matches!(state, ProcessorState::Communicate { .. }));
//! # Ok::<(), aidscan_core::MapError>(())
//! ```

mod params;
mod processor;
mod session;
mod types;

pub use params::{ProcessorParams, MIN_TARGET_FRAMES};
pub use processor::BarcodeProcessor;
pub use session::{DetectorError, FrameFailure, FrameOutcome, ScanSession};
pub use types::{ActivityChange, CandidateCount, Detection, ProcessorState};
