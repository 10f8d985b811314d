//! camsession: callback-driven camera device and preview session control
//!
//! This crate implements the camera acquisition protocol used for live
//! preview: discover a device, negotiate an output resolution, open the
//! device asynchronously and establish a repeating capture request streaming
//! into a display surface.
//!
//! # Features
//! - Explicit state machine over the platform's asynchronous callbacks
//! - Pluggable platform backends behind the [`CameraPlatform`] trait
//! - Injectable device and resolution selection policies
//! - Dedicated background worker for per-frame capture callbacks
//! - Optional `native` backend built on nokhwa
//!
//! # Usage
//! ```rust,no_run
//! use camsession::{CameraController, SurfaceHandle};
//! use camsession::testing::ScriptedPlatform;
//! use std::sync::Arc;
//!
//! let platform = Arc::new(ScriptedPlatform::new());
//! let mut controller = CameraController::new(platform);
//! controller.set_up().expect("camera set-up failed");
//! controller.surface_available(SurfaceHandle::new());
//! controller.pump_events().expect("camera event handling failed");
//! assert!(controller.is_streaming());
//! controller.tear_down();
//! ```

pub mod config;
pub mod controller;
pub mod errors;
pub mod executor;
pub mod notify;
pub mod platform;
pub mod selection;
pub mod types;

// Testing utilities - scripted backend for offline testing
pub mod testing;

// Re-exports for convenience
pub use config::ControllerConfig;
pub use controller::{CameraController, ControllerState};
pub use errors::{ControllerError, PlatformError};
pub use notify::{LogNotice, NoticeSink};
pub use platform::CameraPlatform;
pub use selection::{DevicePolicy, FirstEnumerated, PreferSize, ResolutionPolicy};
pub use types::{
    CameraEvent, CaptureRequest, ControlMode, DeviceHandle, FrameEvent, PreviewTarget,
    RequestTemplate, Resolution, SessionHandle, SurfaceHandle,
};

#[cfg(feature = "native")]
pub use platform::native::NativePlatform;

/// Initialize logging for the camera session controller
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "camsession=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_crate_metadata() {
        assert_eq!(NAME, "camsession");
        assert!(!VERSION.is_empty());
        assert!(!DESCRIPTION.is_empty());
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
    }
}
