// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraError, Frame};
use core::time::Duration;
use derive_more::Display;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum CameraBackend {
    #[display("android")]
    Android,
    #[display("synthetic")]
    Synthetic,
}

/// A backend that owns a configured capture session.
///
/// Completed images land in a single-slot holder asynchronously; `capture`
/// only submits the request. Callers compare [`frame_generation`] before and
/// after to tell a fresh image from the previous one.
///
/// [`frame_generation`]: CameraDriver::frame_generation
pub trait CameraDriver: dogma::Named + Send {
    fn backend(&self) -> CameraBackend;

    /// Submits one capture request.
    fn capture(&mut self) -> Result<(), CameraError>;

    /// Generation counter of the image slot; bumps on every completed image.
    fn frame_generation(&self) -> u64;

    /// Waits until an image newer than generation `seen` is available.
    fn wait_for_frame(&self, seen: u64, timeout: Duration) -> bool;

    /// Copies the most recent image out of the slot.
    fn latest_frame(&self) -> Result<Option<Frame>, CameraError>;

    /// Releases the session. Calling it again is a no-op.
    fn close(&mut self) -> Result<(), CameraError> {
        Ok(())
    }
}
