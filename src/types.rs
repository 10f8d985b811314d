//! Shared types for the session controller and its platform backends.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// An output frame size, selected once at set-up time and immutable for the
/// lifetime of the capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel count, used by area-based selection policies.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Opaque identity of a renderable surface supplied by the display host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceHandle(Uuid);

impl SurfaceHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// The destination the camera streams frames into: a host surface with its
/// buffer sized to the selected resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewTarget {
    pub surface: SurfaceHandle,
    pub buffer_size: Resolution,
}

impl PreviewTarget {
    pub fn new(surface: SurfaceHandle, buffer_size: Resolution) -> Self {
        Self {
            surface,
            buffer_size,
        }
    }
}

/// Capture request template. Only continuous preview is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTemplate {
    Preview,
}

/// Automatic focus/exposure/white-balance control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    Off,
    Auto,
}

/// A capture request bound to a single preview target.
///
/// Built with control mode off; the controller switches it to [`ControlMode::Auto`]
/// once the session reports configured, before submitting it as repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    pub template: RequestTemplate,
    pub control_mode: ControlMode,
    pub target: PreviewTarget,
}

impl CaptureRequest {
    pub fn preview(target: PreviewTarget) -> Self {
        Self {
            template: RequestTemplate::Preview,
            control_mode: ControlMode::Off,
            target,
        }
    }
}

/// The exclusively-owned open camera device, minted by the platform backend
/// when the open callback fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    pub id: Uuid,
    pub camera_id: String,
}

impl DeviceHandle {
    pub fn new(camera_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            camera_id: camera_id.into(),
        }
    }
}

/// The active streaming configuration binding a device to a preview target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub id: Uuid,
    pub device_id: Uuid,
}

impl SessionHandle {
    pub fn new(device_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            device_id,
        }
    }
}

/// Asynchronous results delivered by the platform backend.
///
/// The controller applies exactly one state transition per event; it never
/// polls device state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraEvent {
    /// Device open completed; the handle is now usable.
    Opened(DeviceHandle),
    /// The device went away. Release the handle immediately.
    Disconnected,
    /// The device reported a fault, with the platform's numeric error code.
    Error(i32),
    /// Session configuration succeeded.
    SessionConfigured(SessionHandle),
    /// Session configuration failed. No retry is attempted.
    SessionConfigureFailed,
}

/// Per-frame capture callbacks, delivered to the background executor and
/// used only for diagnostic logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    Started { frame_number: u64, timestamp_ns: i64 },
    Completed { frame_number: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_display_and_area() {
        let r = Resolution::new(1920, 1080);
        assert_eq!(r.to_string(), "1920x1080");
        assert_eq!(r.area(), 1920 * 1080);
    }

    #[test]
    fn preview_request_starts_with_controls_off() {
        let target = PreviewTarget::new(SurfaceHandle::new(), Resolution::new(640, 480));
        let request = CaptureRequest::preview(target);
        assert_eq!(request.template, RequestTemplate::Preview);
        assert_eq!(request.control_mode, ControlMode::Off);
        assert_eq!(request.target.buffer_size, Resolution::new(640, 480));
    }

    #[test]
    fn handles_are_unique() {
        let a = DeviceHandle::new("0");
        let b = DeviceHandle::new("0");
        assert_ne!(a.id, b.id);
        assert_eq!(a.camera_id, b.camera_id);

        let s1 = SessionHandle::new(a.id);
        let s2 = SessionHandle::new(a.id);
        assert_ne!(s1.id, s2.id);
        assert_eq!(s1.device_id, s2.device_id);
    }

    #[test]
    fn resolution_serde_round_trip() {
        let r = Resolution::new(1280, 720);
        let json = serde_json::to_string(&r).unwrap();
        let back: Resolution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
