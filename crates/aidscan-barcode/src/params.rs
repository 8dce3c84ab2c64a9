use serde::{Deserialize, Serialize};

/// Lowest accepted number of consecutive frames before a scan is confirmed.
pub const MIN_TARGET_FRAMES: u32 = 5;

fn default_target_frames() -> u32 {
    MIN_TARGET_FRAMES
}

/// Configuration for [`crate::BarcodeProcessor`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorParams {
    /// Consecutive qualifying frames required before `Communicate`.
    ///
    /// Values below [`MIN_TARGET_FRAMES`] are raised to it when the
    /// processor is built.
    #[serde(default = "default_target_frames")]
    pub target_frames: u32,
}

impl Default for ProcessorParams {
    fn default() -> Self {
        Self {
            target_frames: default_target_frames(),
        }
    }
}

impl ProcessorParams {
    pub fn with_target_frames(target_frames: u32) -> Self {
        Self { target_frames }
    }

    /// Target frame count with the floor applied.
    pub fn effective_target_frames(&self) -> u32 {
        self.target_frames.max(MIN_TARGET_FRAMES)
    }
}
