//! Camera session controller.
//!
//! A flat state machine over the five asynchronous camera callbacks: open
//! success / disconnect / error, session configured / configure failed, plus
//! the per-frame capture callbacks handled by the background executor.
//!
//! The host drives it with `set_up` on resume, `tear_down` on pause, the
//! surface callbacks as the display surface comes and goes, and `pump_events`
//! whenever platform events may be pending. All state mutation happens on the
//! host thread; platform callbacks only enqueue events.

use crate::config::ControllerConfig;
use crate::errors::ControllerError;
use crate::executor::BackgroundExecutor;
use crate::notify::{LogNotice, NoticeSink};
use crate::platform::CameraPlatform;
use crate::selection::{DevicePolicy, FirstEnumerated, ResolutionPolicy};
use crate::types::{
    CameraEvent, CaptureRequest, ControlMode, DeviceHandle, PreviewTarget, Resolution,
    SessionHandle, SurfaceHandle,
};
use crossbeam_channel::{Receiver, Sender};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

const EXECUTOR_JOIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Controller state. Error and disconnect transitions from any non-idle
/// state pass through `Closing` back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    DeviceOpening,
    DeviceOpen,
    SessionConfiguring,
    Streaming,
    Closing,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerState::Idle => "idle",
            ControllerState::DeviceOpening => "device-opening",
            ControllerState::DeviceOpen => "device-open",
            ControllerState::SessionConfiguring => "session-configuring",
            ControllerState::Streaming => "streaming",
            ControllerState::Closing => "closing",
        };
        f.write_str(name)
    }
}

pub struct CameraController {
    platform: Arc<dyn CameraPlatform>,
    config: ControllerConfig,
    device_policy: Box<dyn DevicePolicy>,
    resolution_policy: Box<dyn ResolutionPolicy>,
    notices: Box<dyn NoticeSink>,

    state: ControllerState,
    event_tx: Sender<CameraEvent>,
    event_rx: Receiver<CameraEvent>,
    device: Option<DeviceHandle>,
    session: Option<SessionHandle>,
    resolution: Option<Resolution>,
    surface: Option<SurfaceHandle>,
    pending_request: Option<CaptureRequest>,
    executor: Option<BackgroundExecutor>,
    opening_since: Option<Instant>,
}

impl CameraController {
    pub fn new(platform: Arc<dyn CameraPlatform>) -> Self {
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        Self {
            platform,
            config: ControllerConfig::default(),
            device_policy: Box::new(FirstEnumerated),
            resolution_policy: Box::new(FirstEnumerated),
            notices: Box::new(LogNotice),
            state: ControllerState::Idle,
            event_tx,
            event_rx,
            device: None,
            session: None,
            resolution: None,
            surface: None,
            pending_request: None,
            executor: None,
            opening_since: None,
        }
    }

    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_device_policy(mut self, policy: Box<dyn DevicePolicy>) -> Self {
        self.device_policy = policy;
        self
    }

    pub fn with_resolution_policy(mut self, policy: Box<dyn ResolutionPolicy>) -> Self {
        self.resolution_policy = policy;
        self
    }

    pub fn with_notice_sink(mut self, sink: Box<dyn NoticeSink>) -> Self {
        self.notices = sink;
        self
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn device(&self) -> Option<&DeviceHandle> {
        self.device.as_ref()
    }

    pub fn session(&self) -> Option<&SessionHandle> {
        self.session.as_ref()
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    pub fn is_streaming(&self) -> bool {
        self.state == ControllerState::Streaming
    }

    /// Set up the camera: enumerate devices, pick one, pick a resolution,
    /// start the frame worker and request an asynchronous open.
    ///
    /// Must alternate strictly with [`tear_down`](Self::tear_down); calling it
    /// while not idle is a contract violation.
    pub fn set_up(&mut self) -> Result<(), ControllerError> {
        if self.state != ControllerState::Idle {
            return Err(ControllerError::ContractViolation(format!(
                "set_up called in state {}",
                self.state
            )));
        }

        let camera_ids = self.platform.list_camera_ids().map_err(ControllerError::from)?;
        log::debug!("available camera ids: {:?}", camera_ids);
        let camera_id = self
            .device_policy
            .select(&camera_ids)
            .ok_or(ControllerError::NoCameraAvailable)?
            .to_string();
        log::info!("using camera id: {}", camera_id);

        let sizes = self
            .platform
            .preview_sizes(&camera_id)
            .map_err(ControllerError::from)?;
        log::debug!("available preview sizes: {:?}", sizes);
        let resolution = self.resolution_policy.select(&sizes).ok_or_else(|| {
            ControllerError::Platform(format!("camera {camera_id} reports no preview sizes"))
        })?;
        log::info!("using preview size: {}", resolution);

        // The worker may still be running after a disconnect returned us to
        // idle without an intervening tear_down.
        if self.executor.is_none() {
            self.executor = Some(BackgroundExecutor::start(
                &self.config.session.worker_thread_name,
                self.config.diagnostics.verbose_frame_logging,
            )?);
        }

        if let Err(err) = self.platform.open_device(&camera_id, self.event_tx.clone()) {
            let err = ControllerError::from(err);
            let msg = format!("cannot set up camera: {err}");
            log::error!("{}", msg);
            self.notices.notify(&msg);
            self.stop_executor();
            return Err(err);
        }

        self.resolution = Some(resolution);
        self.opening_since = Some(Instant::now());
        self.state = ControllerState::DeviceOpening;
        Ok(())
    }

    /// Tear down: discard any session, release the device, join the frame
    /// worker. Logged no-op when nothing is open.
    pub fn tear_down(&mut self) {
        if self.state == ControllerState::Idle && self.device.is_none() {
            log::warn!("tear_down: camera not opened");
            self.stop_executor();
            return;
        }
        self.close_device();
        self.stop_executor();
    }

    /// The display surface became available.
    pub fn surface_available(&mut self, surface: SurfaceHandle) {
        log::info!("surface available: {}", surface);
        self.surface = Some(surface);
        self.try_bind_preview();
    }

    /// The display surface was resized. The active session keeps its
    /// negotiated buffer size.
    pub fn surface_resized(&mut self, surface: SurfaceHandle, size: Resolution) {
        log::info!("surface resized: {} -> {}", surface, size);
    }

    /// The display surface was destroyed. Tears the session down without
    /// closing the device.
    pub fn surface_destroyed(&mut self) {
        log::info!("surface destroyed");
        self.surface = None;
        self.unbind_preview();
    }

    /// Drain pending platform events, applying one transition per event, and
    /// enforce the open timeout. Returns the first error encountered.
    pub fn pump_events(&mut self) -> Result<(), ControllerError> {
        let mut first_err: Option<ControllerError> = None;
        while let Ok(event) = self.event_rx.try_recv() {
            if let Err(e) = self.handle_event(event) {
                first_err.get_or_insert(e);
            }
        }

        if let Err(e) = self.check_open_timeout() {
            first_err.get_or_insert(e);
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Apply a single platform event.
    pub fn handle_event(&mut self, event: CameraEvent) -> Result<(), ControllerError> {
        match event {
            CameraEvent::Opened(device) => self.on_opened(device),
            CameraEvent::Disconnected => {
                self.on_disconnected();
                Ok(())
            }
            CameraEvent::Error(code) => {
                self.on_device_error(code);
                Ok(())
            }
            CameraEvent::SessionConfigured(session) => {
                self.on_session_configured(session);
                Ok(())
            }
            CameraEvent::SessionConfigureFailed => {
                self.on_configure_failed();
                Ok(())
            }
        }
    }

    fn on_opened(&mut self, device: DeviceHandle) -> Result<(), ControllerError> {
        if self.device.is_some() {
            let err = ControllerError::ContractViolation(
                "open completed while a device handle is already held".to_string(),
            );
            log::error!("{}", err);
            // Release the duplicate handle; the held one stays valid.
            self.platform.close_device(device);
            return Err(err);
        }
        if self.state != ControllerState::DeviceOpening {
            log::warn!("open completed in state {}; releasing handle", self.state);
            self.platform.close_device(device);
            return Ok(());
        }

        log::info!("device opened: {}", device.camera_id);
        self.device = Some(device);
        self.opening_since = None;
        self.state = ControllerState::DeviceOpen;
        self.try_bind_preview();
        Ok(())
    }

    fn on_disconnected(&mut self) {
        if self.state == ControllerState::Idle {
            log::warn!("disconnect reported while idle");
            return;
        }
        // Not surfaced to the user beyond the log.
        log::info!("device disconnected");
        self.close_device();
    }

    fn on_device_error(&mut self, code: i32) {
        if self.state == ControllerState::Idle {
            log::warn!("device error {} reported while idle", code);
            return;
        }
        log::error!("device error reported by platform: code {}", code);
        self.close_device();
    }

    fn on_session_configured(&mut self, session: SessionHandle) {
        if self.state != ControllerState::SessionConfiguring
            || self.device.is_none()
            || self.surface.is_none()
        {
            log::warn!(
                "stale session configuration ({}) in state {}; discarding",
                session.id,
                self.state
            );
            self.platform.discard_session(session);
            return;
        }

        let Some(mut request) = self.pending_request.take() else {
            log::warn!("session configured with no pending request; discarding");
            self.platform.discard_session(session);
            self.state = ControllerState::DeviceOpen;
            return;
        };
        log::info!("capture session configured: {}", session.id);

        // Auto focus/exposure/white-balance for the repeating preview.
        request.control_mode = ControlMode::Auto;

        let frames = self.executor.as_ref().and_then(BackgroundExecutor::frame_sender);
        let Some(frames) = frames else {
            log::error!("frame worker not running; cannot start preview");
            self.platform.discard_session(session);
            self.state = ControllerState::DeviceOpen;
            return;
        };

        match self.platform.submit_repeating(&session, &request, frames) {
            Ok(()) => {
                log::info!("repeating preview request active");
                self.session = Some(session);
                self.state = ControllerState::Streaming;
            }
            Err(err) => {
                let msg = format!("cannot update preview: {err}");
                log::error!("{}", msg);
                self.notices.notify(&msg);
                self.platform.discard_session(session);
                self.state = ControllerState::DeviceOpen;
            }
        }
    }

    fn on_configure_failed(&mut self) {
        log::warn!("capture session configuration failed; preview will not start");
        self.pending_request = None;
        if self.state == ControllerState::SessionConfiguring {
            self.state = ControllerState::DeviceOpen;
        }
    }

    /// Bind the preview target once both the device handle and a live
    /// surface exist. Any active session is invalidated first.
    fn try_bind_preview(&mut self) {
        if self.state != ControllerState::DeviceOpen {
            log::debug!("preview bind deferred in state {}", self.state);
            return;
        }
        let (Some(surface), Some(resolution)) = (self.surface, self.resolution) else {
            log::debug!("preview bind deferred: surface or resolution missing");
            return;
        };

        if let Some(old) = self.session.take() {
            log::info!("invalidating previous capture session {}", old.id);
            self.platform.discard_session(old);
        }

        let request = CaptureRequest::preview(PreviewTarget::new(surface, resolution));
        log::info!("requesting capture session configuration ({})", resolution);

        let Some(device) = self.device.clone() else {
            log::error!("preview bind in state {} with no device handle", self.state);
            return;
        };
        match self
            .platform
            .create_session(&device, &request, self.event_tx.clone())
        {
            Ok(()) => {
                self.pending_request = Some(request);
                self.state = ControllerState::SessionConfiguring;
            }
            Err(err) => {
                let msg = format!("cannot set up preview: {err}");
                log::error!("{}", msg);
                self.notices.notify(&msg);
            }
        }
    }

    /// Discard the session, keeping the device open.
    fn unbind_preview(&mut self) {
        self.pending_request = None;
        if let Some(session) = self.session.take() {
            log::info!("discarding capture session {}", session.id);
            self.platform.discard_session(session);
        }
        if matches!(
            self.state,
            ControllerState::SessionConfiguring | ControllerState::Streaming
        ) {
            self.state = ControllerState::DeviceOpen;
        }
    }

    /// Release everything camera-side and return to idle. The frame worker
    /// keeps running; only `tear_down` joins it.
    fn close_device(&mut self) {
        self.state = ControllerState::Closing;
        self.pending_request = None;
        if let Some(session) = self.session.take() {
            log::info!("discarding capture session {}", session.id);
            self.platform.discard_session(session);
        }
        if let Some(device) = self.device.take() {
            log::info!("closing camera device {}", device.camera_id);
            self.platform.close_device(device);
        }
        self.resolution = None;
        self.opening_since = None;
        self.state = ControllerState::Idle;
    }

    fn check_open_timeout(&mut self) -> Result<(), ControllerError> {
        let timeout_ms = self.config.session.open_timeout_ms;
        if timeout_ms == 0 || self.state != ControllerState::DeviceOpening {
            return Ok(());
        }
        let Some(since) = self.opening_since else {
            return Ok(());
        };
        if since.elapsed() < Duration::from_millis(timeout_ms) {
            return Ok(());
        }

        let err = ControllerError::DeviceOpenTimeout(timeout_ms);
        let msg = format!("cannot set up camera: {err}");
        log::error!("{}", msg);
        self.notices.notify(&msg);
        self.close_device();
        Err(err)
    }

    fn stop_executor(&mut self) {
        if let Some(mut executor) = self.executor.take() {
            if !executor.stop(EXECUTOR_JOIN_TIMEOUT) {
                log::warn!(
                    "frame worker did not stop within {:?}",
                    EXECUTOR_JOIN_TIMEOUT
                );
            }
        }
    }
}

impl Drop for CameraController {
    fn drop(&mut self) {
        if self.state != ControllerState::Idle || self.device.is_some() {
            self.tear_down();
        } else {
            self.stop_executor();
        }
    }
}
