//! Single-slot storage for the most recent capture
//!
//! Every successful `screen.capture` / `screen.capture_region` replaces the
//! slot; `screen.latest` reads it. The slot is swapped whole under a write
//! lock, so readers see either the previous capture or the new one.

use chrono::Utc;
use parking_lot::RwLock;

use crate::model::{CaptureOutput, StoredCapture};

/// Holds zero or one [`StoredCapture`]
///
/// Share between tasks with `Arc<StorageService>`.
#[derive(Debug, Default)]
pub struct StorageService {
    slot: RwLock<Option<StoredCapture>>,
}

impl StorageService {
    /// Creates an empty storage service
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored capture, stamping `capturedAt` with the current time
    pub fn put(&self, output: CaptureOutput) {
        let stored = StoredCapture {
            image_base64: output.image_base64,
            metadata:     output.metadata,
            captured_at:  Utc::now(),
        };
        *self.slot.write() = Some(stored);
    }

    /// Returns a copy of the stored capture, if any
    pub fn get(&self) -> Option<StoredCapture> {
        self.slot.read().clone()
    }

    /// True until the first capture is stored
    pub fn is_empty(&self) -> bool {
        self.slot.read().is_none()
    }
}
