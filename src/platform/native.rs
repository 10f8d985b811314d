//! Native platform backend built on nokhwa.
//!
//! Maps the asynchronous platform contract onto nokhwa's synchronous API:
//! open results are delivered on the event sender as soon as the device is
//! initialized, session configuration succeeds once the device is known, and
//! the repeating request maps to an open stream with a per-buffer callback
//! that emits frame events.

use crate::errors::PlatformError;
use crate::platform::CameraPlatform;
use crate::types::{
    CameraEvent, CaptureRequest, DeviceHandle, FrameEvent, Resolution, SessionHandle,
};
use crossbeam_channel::Sender;
use nokhwa::{
    pixel_format::RgbFormat,
    query,
    utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType},
    CallbackCamera,
};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Preview sizes advertised when the hardware does not report its own.
const COMMON_PREVIEW_SIZES: [(u32, u32); 3] = [(1920, 1080), (1280, 720), (640, 480)];

pub struct NativePlatform {
    cameras: Mutex<HashMap<Uuid, CallbackCamera>>,
}

impl Default for NativePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl NativePlatform {
    pub fn new() -> Self {
        Self {
            cameras: Mutex::new(HashMap::new()),
        }
    }
}

impl CameraPlatform for NativePlatform {
    fn list_camera_ids(&self) -> Result<Vec<String>, PlatformError> {
        let cameras = query(ApiBackend::Auto)
            .map_err(|e| PlatformError::Backend(format!("failed to query cameras: {e}")))?;
        Ok(cameras
            .into_iter()
            .map(|info| info.index().to_string())
            .collect())
    }

    fn preview_sizes(&self, _camera_id: &str) -> Result<Vec<Resolution>, PlatformError> {
        Ok(COMMON_PREVIEW_SIZES
            .iter()
            .map(|&(w, h)| Resolution::new(w, h))
            .collect())
    }

    fn open_device(
        &self,
        camera_id: &str,
        events: Sender<CameraEvent>,
    ) -> Result<(), PlatformError> {
        let index = camera_id
            .parse::<u32>()
            .map_err(|_| PlatformError::NotFound(format!("invalid camera id {camera_id}")))?;

        let requested_format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::None);
        let camera = CallbackCamera::new(CameraIndex::Index(index), requested_format, |_| {})
            .map_err(|e| PlatformError::Backend(format!("failed to initialize camera: {e}")))?;

        let handle = DeviceHandle::new(camera_id);
        self.cameras
            .lock()
            .expect("lock poisoned")
            .insert(handle.id, camera);
        let _ = events.send(CameraEvent::Opened(handle));
        Ok(())
    }

    fn create_session(
        &self,
        device: &DeviceHandle,
        _request: &CaptureRequest,
        events: Sender<CameraEvent>,
    ) -> Result<(), PlatformError> {
        let cameras = self.cameras.lock().expect("lock poisoned");
        if cameras.contains_key(&device.id) {
            let _ = events.send(CameraEvent::SessionConfigured(SessionHandle::new(
                device.id,
            )));
        } else {
            let _ = events.send(CameraEvent::SessionConfigureFailed);
        }
        Ok(())
    }

    fn submit_repeating(
        &self,
        session: &SessionHandle,
        _request: &CaptureRequest,
        frames: Sender<FrameEvent>,
    ) -> Result<(), PlatformError> {
        let mut cameras = self.cameras.lock().expect("lock poisoned");
        let camera = cameras
            .get_mut(&session.device_id)
            .ok_or_else(|| PlatformError::Backend("device closed mid-submission".to_string()))?;

        let mut frame_number: u64 = 0;
        camera
            .set_callback(move |_buffer: nokhwa::Buffer| {
                frame_number += 1;
                let timestamp_ns = chrono::Utc::now()
                    .timestamp_nanos_opt()
                    .unwrap_or_default();
                let _ = frames.send(FrameEvent::Started {
                    frame_number,
                    timestamp_ns,
                });
                let _ = frames.send(FrameEvent::Completed { frame_number });
            })
            .map_err(|e| PlatformError::Backend(format!("failed to set callback: {e}")))?;

        camera
            .open_stream()
            .map_err(|e| PlatformError::Backend(format!("failed to start stream: {e}")))?;
        Ok(())
    }

    fn discard_session(&self, session: SessionHandle) {
        let mut cameras = self.cameras.lock().expect("lock poisoned");
        if let Some(camera) = cameras.get_mut(&session.device_id) {
            let _ = camera.stop_stream();
        }
    }

    fn close_device(&self, device: DeviceHandle) {
        let mut cameras = self.cameras.lock().expect("lock poisoned");
        if let Some(mut camera) = cameras.remove(&device.id) {
            let _ = camera.stop_stream();
        }
    }
}

// nokhwa's CallbackCamera is not Sync on every backend; access is serialized
// through the mutex above.
unsafe impl Send for NativePlatform {}
unsafe impl Sync for NativePlatform {}
