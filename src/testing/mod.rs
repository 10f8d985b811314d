//! Testing utilities: a scripted platform backend and a recording notice
//! sink for driving the controller without camera hardware.

use crate::errors::PlatformError;
use crate::notify::NoticeSink;
use crate::platform::CameraPlatform;
use crate::types::{
    CameraEvent, CaptureRequest, DeviceHandle, FrameEvent, Resolution, SessionHandle,
};
use crossbeam_channel::Sender;
use std::collections::HashMap;
use std::sync::Mutex;

/// How the scripted backend answers an open request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenBehavior {
    /// Accept and deliver `Opened` immediately.
    Succeed,
    /// Fail synchronously with an access denial.
    DenyAccess,
    /// Fail synchronously with a security denial.
    DenySecurity,
    /// Accept and never deliver a result (hung platform callback).
    Hang,
}

/// How the scripted backend answers a session configuration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigureBehavior {
    /// Deliver `SessionConfigured` immediately.
    Configure,
    /// Deliver `SessionConfigureFailed` immediately.
    Fail,
    /// Accept and deliver nothing; the test injects the result later.
    Pend,
}

/// How the scripted backend answers a repeating-request submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBehavior {
    /// Accept and deliver one started/completed frame pair.
    Accept,
    /// Reject, as when the device closed mid-submission.
    Reject,
}

struct ScriptInner {
    camera_ids: Vec<String>,
    sizes: HashMap<String, Vec<Resolution>>,
    open_behavior: OpenBehavior,
    configure_behavior: ConfigureBehavior,
    submit_behavior: SubmitBehavior,
    events: Option<Sender<CameraEvent>>,
    open_calls: u32,
    submitted: Vec<CaptureRequest>,
    pending_session: Option<SessionHandle>,
    discarded: Vec<SessionHandle>,
    closed: Vec<DeviceHandle>,
}

/// Scripted in-memory platform backend.
///
/// Defaults to one camera (`"0"`) reporting sizes 1920x1080 then 640x480,
/// with every operation succeeding.
pub struct ScriptedPlatform {
    inner: Mutex<ScriptInner>,
}

impl Default for ScriptedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedPlatform {
    pub fn new() -> Self {
        let mut sizes = HashMap::new();
        sizes.insert(
            "0".to_string(),
            vec![Resolution::new(1920, 1080), Resolution::new(640, 480)],
        );
        Self {
            inner: Mutex::new(ScriptInner {
                camera_ids: vec!["0".to_string()],
                sizes,
                open_behavior: OpenBehavior::Succeed,
                configure_behavior: ConfigureBehavior::Configure,
                submit_behavior: SubmitBehavior::Accept,
                events: None,
                open_calls: 0,
                submitted: Vec::new(),
                pending_session: None,
                discarded: Vec::new(),
                closed: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptInner> {
        self.inner.lock().expect("lock poisoned")
    }

    pub fn set_camera_ids(&self, ids: Vec<String>) {
        self.lock().camera_ids = ids;
    }

    pub fn set_sizes(&self, camera_id: &str, sizes: Vec<Resolution>) {
        self.lock().sizes.insert(camera_id.to_string(), sizes);
    }

    pub fn set_open_behavior(&self, behavior: OpenBehavior) {
        self.lock().open_behavior = behavior;
    }

    pub fn set_configure_behavior(&self, behavior: ConfigureBehavior) {
        self.lock().configure_behavior = behavior;
    }

    pub fn set_submit_behavior(&self, behavior: SubmitBehavior) {
        self.lock().submit_behavior = behavior;
    }

    /// Number of open requests received.
    pub fn open_calls(&self) -> u32 {
        self.lock().open_calls
    }

    /// Repeating requests actually submitted.
    pub fn submitted(&self) -> Vec<CaptureRequest> {
        self.lock().submitted.clone()
    }

    /// Sessions invalidated by the controller.
    pub fn discarded(&self) -> Vec<SessionHandle> {
        self.lock().discarded.clone()
    }

    /// Device handles released by the controller.
    pub fn closed(&self) -> Vec<DeviceHandle> {
        self.lock().closed.clone()
    }

    /// Session created by a pending (`ConfigureBehavior::Pend`) configure.
    pub fn pending_session(&self) -> Option<SessionHandle> {
        self.lock().pending_session.clone()
    }

    /// Deliver an event on the sender captured from the last open/configure
    /// call. Returns `false` when no sender was captured.
    pub fn push_event(&self, event: CameraEvent) -> bool {
        let guard = self.lock();
        match &guard.events {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }
}

impl CameraPlatform for ScriptedPlatform {
    fn list_camera_ids(&self) -> Result<Vec<String>, PlatformError> {
        Ok(self.lock().camera_ids.clone())
    }

    fn preview_sizes(&self, camera_id: &str) -> Result<Vec<Resolution>, PlatformError> {
        self.lock()
            .sizes
            .get(camera_id)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(format!("camera {camera_id}")))
    }

    fn open_device(
        &self,
        camera_id: &str,
        events: Sender<CameraEvent>,
    ) -> Result<(), PlatformError> {
        let mut guard = self.lock();
        guard.open_calls += 1;
        match guard.open_behavior {
            OpenBehavior::Succeed => {
                let _ = events.send(CameraEvent::Opened(DeviceHandle::new(camera_id)));
                guard.events = Some(events);
                Ok(())
            }
            OpenBehavior::DenyAccess => Err(PlatformError::AccessDenied(
                "camera permission not granted".to_string(),
            )),
            OpenBehavior::DenySecurity => Err(PlatformError::SecurityDenied(
                "caller lacks camera authorization".to_string(),
            )),
            OpenBehavior::Hang => {
                guard.events = Some(events);
                Ok(())
            }
        }
    }

    fn create_session(
        &self,
        device: &DeviceHandle,
        _request: &CaptureRequest,
        events: Sender<CameraEvent>,
    ) -> Result<(), PlatformError> {
        let mut guard = self.lock();
        match guard.configure_behavior {
            ConfigureBehavior::Configure => {
                let _ = events.send(CameraEvent::SessionConfigured(SessionHandle::new(
                    device.id,
                )));
            }
            ConfigureBehavior::Fail => {
                let _ = events.send(CameraEvent::SessionConfigureFailed);
            }
            ConfigureBehavior::Pend => {
                guard.pending_session = Some(SessionHandle::new(device.id));
            }
        }
        guard.events = Some(events);
        Ok(())
    }

    fn submit_repeating(
        &self,
        _session: &SessionHandle,
        request: &CaptureRequest,
        frames: Sender<FrameEvent>,
    ) -> Result<(), PlatformError> {
        let mut guard = self.lock();
        match guard.submit_behavior {
            SubmitBehavior::Accept => {
                guard.submitted.push(*request);
                let timestamp_ns = chrono::Utc::now()
                    .timestamp_nanos_opt()
                    .unwrap_or_default();
                let _ = frames.send(FrameEvent::Started {
                    frame_number: 1,
                    timestamp_ns,
                });
                let _ = frames.send(FrameEvent::Completed { frame_number: 1 });
                Ok(())
            }
            SubmitBehavior::Reject => Err(PlatformError::Backend(
                "device closed mid-submission".to_string(),
            )),
        }
    }

    fn discard_session(&self, session: SessionHandle) {
        self.lock().discarded.push(session);
    }

    fn close_device(&self, device: DeviceHandle) {
        self.lock().closed.push(device);
    }
}

/// Notice sink that records every message for assertions.
#[derive(Default)]
pub struct RecordingNotice {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("lock poisoned").clone()
    }
}

impl NoticeSink for RecordingNotice {
    fn notify(&self, message: &str) {
        self.messages
            .lock()
            .expect("lock poisoned")
            .push(message.to_string());
    }
}
