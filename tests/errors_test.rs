use camsession::{ControllerError, PlatformError};
use std::error::Error;

#[test]
fn controller_error_display_messages() {
    let cases: Vec<(ControllerError, &str)> = vec![
        (ControllerError::NoCameraAvailable, "no camera available"),
        (
            ControllerError::AccessDenied("permission".to_string()),
            "camera access denied",
        ),
        (
            ControllerError::SecurityDenied("not authorized".to_string()),
            "camera access not authorized",
        ),
        (
            ControllerError::DeviceOpenTimeout(5000),
            "timed out after 5000 ms",
        ),
        (
            ControllerError::ContractViolation("double set_up".to_string()),
            "contract violation",
        ),
        (
            ControllerError::Config("bad toml".to_string()),
            "configuration error",
        ),
        (
            ControllerError::Platform("backend".to_string()),
            "platform error",
        ),
    ];

    for (error, expected) in cases {
        let display = error.to_string();
        assert!(
            display.contains(expected),
            "'{display}' should contain '{expected}'"
        );
    }
}

#[test]
fn platform_errors_map_to_controller_errors() {
    let access: ControllerError = PlatformError::AccessDenied("denied".to_string()).into();
    assert!(matches!(access, ControllerError::AccessDenied(_)));

    let security: ControllerError = PlatformError::SecurityDenied("denied".to_string()).into();
    assert!(matches!(security, ControllerError::SecurityDenied(_)));

    let not_found: ControllerError = PlatformError::NotFound("camera 9".to_string()).into();
    assert!(matches!(not_found, ControllerError::Platform(_)));

    let backend: ControllerError = PlatformError::Backend("ioctl failed".to_string()).into();
    assert!(matches!(backend, ControllerError::Platform(_)));
}

#[test]
fn errors_are_std_errors_and_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ControllerError>();
    assert_send_sync::<PlatformError>();

    let boxed: Box<dyn Error> = Box::new(ControllerError::NoCameraAvailable);
    assert!(boxed.source().is_none());
}

#[test]
fn errors_propagate_with_question_mark() {
    fn set_up() -> Result<(), ControllerError> {
        Err(PlatformError::AccessDenied("camera permission not granted".to_string()).into())
    }

    fn host() -> Result<(), ControllerError> {
        set_up()?;
        Ok(())
    }

    match host() {
        Err(ControllerError::AccessDenied(msg)) => {
            assert!(msg.contains("permission"));
        }
        other => panic!("expected AccessDenied, got {other:?}"),
    }
}
