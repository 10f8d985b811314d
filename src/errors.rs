use thiserror::Error;

/// Terminal failures surfaced to the lifecycle host.
///
/// Everything that happens after a device is open (disconnects, device
/// errors, configuration failures, rejected repeating requests) is handled
/// inside the controller and reported through the [`NoticeSink`] and the log,
/// never through this type.
///
/// [`NoticeSink`]: crate::notify::NoticeSink
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("no camera available: device enumeration returned an empty set")]
    NoCameraAvailable,
    #[error("camera access denied: {0}")]
    AccessDenied(String),
    #[error("camera access not authorized: {0}")]
    SecurityDenied(String),
    #[error("device open timed out after {0} ms")]
    DeviceOpenTimeout(u64),
    #[error("contract violation: {0}")]
    ContractViolation(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("platform error: {0}")]
    Platform(String),
}

/// Errors reported synchronously by a platform backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("not authorized: {0}")]
    SecurityDenied(String),
    #[error("device not found: {0}")]
    NotFound(String),
    #[error("backend failure: {0}")]
    Backend(String),
}

impl From<PlatformError> for ControllerError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::AccessDenied(msg) => ControllerError::AccessDenied(msg),
            PlatformError::SecurityDenied(msg) => ControllerError::SecurityDenied(msg),
            PlatformError::NotFound(msg) | PlatformError::Backend(msg) => {
                ControllerError::Platform(msg)
            }
        }
    }
}
