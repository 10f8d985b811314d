//! Platform seam: everything the controller needs from the camera subsystem.
//!
//! All device access is asynchronous. A backend accepts an operation, and the
//! terminal result arrives later as a [`CameraEvent`] on the supplied sender.
//! Backends must serialize the events they emit for a given device.

#[cfg(feature = "native")]
pub mod native;

use crate::errors::PlatformError;
use crate::types::{CameraEvent, CaptureRequest, DeviceHandle, FrameEvent, Resolution, SessionHandle};
use crossbeam_channel::Sender;

pub trait CameraPlatform: Send + Sync {
    /// Enumerate available camera identifiers, in platform order.
    fn list_camera_ids(&self) -> Result<Vec<String>, PlatformError>;

    /// Supported output sizes for preview streaming on the given camera, in
    /// the platform-reported (unspecified) order.
    fn preview_sizes(&self, camera_id: &str) -> Result<Vec<Resolution>, PlatformError>;

    /// Begin opening `camera_id`. The terminal result is delivered on
    /// `events` as `Opened`, `Disconnected` or `Error`. Synchronous errors
    /// are access/security denials and backend faults only.
    fn open_device(
        &self,
        camera_id: &str,
        events: Sender<CameraEvent>,
    ) -> Result<(), PlatformError>;

    /// Begin configuring a capture session binding `device` to the request's
    /// preview target. The result arrives as `SessionConfigured` or
    /// `SessionConfigureFailed`.
    fn create_session(
        &self,
        device: &DeviceHandle,
        request: &CaptureRequest,
        events: Sender<CameraEvent>,
    ) -> Result<(), PlatformError>;

    /// Submit `request` as a repeating request on `session`: the platform
    /// re-issues it every frame until the session is discarded. Per-frame
    /// callbacks go to `frames`.
    fn submit_repeating(
        &self,
        session: &SessionHandle,
        request: &CaptureRequest,
        frames: Sender<FrameEvent>,
    ) -> Result<(), PlatformError>;

    /// Invalidate a session. Implicitly cancels its repeating request.
    fn discard_session(&self, session: SessionHandle);

    /// Release an open device handle.
    fn close_device(&self, device: DeviceHandle);
}
