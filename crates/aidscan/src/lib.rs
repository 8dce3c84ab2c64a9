//! Facade crate for the `aidscan-*` workspace.
//!
//! This crate provides:
//! - re-exports of the geometry (`aidscan-core`) and stabilization
//!   (`aidscan-barcode`) crates;
//! - [`logging`]: `env_logger` (or `tracing`) setup honoring `RUST_LOG`;
//! - [`replay`]: JSON config and frame-log replay through a scan session;
//! - (feature `cli`) the `aidscan` binary.
//!
//! ## Quickstart
//!
//! ```
//! use aidscan::barcode::{Detection, FrameOutcome, ProcessorParams, ScanSession};
//! use aidscan::core::{IdentityMapper, Rect};
//!
//! let region = Rect::new(0.0, 0.0, 300.0, 200.0);
//! let mut session = ScanSession::new(ProcessorParams::default(), region);
//! session.set_mapper(Box::new(IdentityMapper));
//!
//! let frame = vec![Detection::new("0123456789012", Rect::new(10.0, 10.0, 290.0, 190.0))];
//! let scanned = (0..6)
//!     .filter_map(|_| session.submit(Ok(frame.clone())).new_scan().cloned())
//!     .collect::<Vec<_>>();
//! assert_eq!(scanned.len(), 1);
//! ```
//!
//! ## API map
//! - `aidscan::core`: `Rect`, containment/fill predicates, coordinate mappers.
//! - `aidscan::barcode`: `BarcodeProcessor`, `ProcessorState`, `ScanSession`.
//! - `aidscan::replay`: offline replay of recorded detector output.

pub use aidscan_barcode as barcode;
pub use aidscan_core as core;

pub use aidscan_barcode::{
    BarcodeProcessor, Detection, ProcessorParams, ProcessorState, ScanSession,
};
pub use aidscan_core::{CoordinateMapper, Rect};

pub mod logging;
pub mod replay;
