//! Property tests for the controller's device-handle invariant: the handle
//! is held if and only if the most recent terminal event was a successful
//! open not yet followed by close, disconnect or error.

use camsession::testing::ScriptedPlatform;
use camsession::{
    CameraController, CameraEvent, CameraPlatform, ControllerState, SurfaceHandle,
};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum HostAction {
    SetUp,
    TearDown,
    SurfaceAvailable,
    SurfaceDestroyed,
    Disconnect,
    DeviceError,
}

fn action_strategy() -> impl Strategy<Value = HostAction> {
    prop_oneof![
        Just(HostAction::SetUp),
        Just(HostAction::TearDown),
        Just(HostAction::SurfaceAvailable),
        Just(HostAction::SurfaceDestroyed),
        Just(HostAction::Disconnect),
        Just(HostAction::DeviceError),
    ]
}

proptest! {
    #[test]
    fn device_held_iff_last_terminal_event_was_open(actions in proptest::collection::vec(action_strategy(), 1..40)) {
        let platform = Arc::new(ScriptedPlatform::new());
        let mut controller =
            CameraController::new(Arc::clone(&platform) as Arc<dyn CameraPlatform>);

        // Reference model of the invariant.
        let mut expect_open = false;

        for action in actions {
            match action {
                HostAction::SetUp => {
                    // Succeeds only from idle; the scripted open always
                    // completes successfully once pumped.
                    if controller.set_up().is_ok() {
                        expect_open = true;
                    }
                }
                HostAction::TearDown => {
                    controller.tear_down();
                    expect_open = false;
                }
                HostAction::SurfaceAvailable => {
                    controller.surface_available(SurfaceHandle::new());
                }
                HostAction::SurfaceDestroyed => {
                    controller.surface_destroyed();
                }
                HostAction::Disconnect => {
                    platform.push_event(CameraEvent::Disconnected);
                    expect_open = false;
                }
                HostAction::DeviceError => {
                    platform.push_event(CameraEvent::Error(3));
                    expect_open = false;
                }
            }

            let _ = controller.pump_events();

            prop_assert_eq!(controller.device().is_some(), expect_open);

            // A session is valid only while its device handle is open.
            if controller.session().is_some() {
                prop_assert!(controller.device().is_some());
            }

            // The handle is held exactly in the post-open states.
            let state_holds_device = matches!(
                controller.state(),
                ControllerState::DeviceOpen
                    | ControllerState::SessionConfiguring
                    | ControllerState::Streaming
            );
            prop_assert_eq!(state_holds_device, expect_open);
        }
    }
}
