// This is free and unencumbered software released into the public domain.

use super::{CameraDevice, CameraResult, CameraStatus, CaptureRequest, CaptureSessionOutputContainer};
use core::{ffi::c_void, ptr::null_mut};
use ndk_sys::{
    ACameraCaptureSession, ACameraCaptureSession_capture, ACameraCaptureSession_close,
    ACameraCaptureSession_stateCallbacks, ACameraDevice_createCaptureSession,
};

#[derive(Debug)]
pub struct CameraCaptureSession {
    handle: *mut ACameraCaptureSession,
    state_callbacks: Box<ACameraCaptureSession_stateCallbacks>,
}

impl Drop for CameraCaptureSession {
    fn drop(&mut self) {
        self.close()
    }
}

impl CameraCaptureSession {
    /// See: https://developer.android.com/ndk/reference/group/camera#acameradevice_createcapturesession
    pub fn open(
        device: &CameraDevice,
        outputs: &CaptureSessionOutputContainer,
    ) -> CameraResult<Self> {
        let mut result = Self {
            handle: null_mut(),
            state_callbacks: Box::new(ACameraCaptureSession_stateCallbacks {
                context: null_mut(),
                onClosed: Some(on_closed),
                onReady: Some(on_ready),
                onActive: Some(on_active),
            }),
        };
        CameraStatus::check(unsafe {
            ACameraDevice_createCaptureSession(
                device.handle,
                outputs.handle,
                &*result.state_callbacks,
                &mut result.handle,
            )
        })?;
        Ok(result)
    }

    /// Submits `request` once; the result arrives through the image reader.
    pub fn capture(&mut self, request: &CaptureRequest) -> CameraResult {
        let mut requests = request.handle;
        CameraStatus::check(unsafe {
            ACameraCaptureSession_capture(self.handle, null_mut(), 1, &mut requests, null_mut())
        })
    }

    pub fn close(&mut self) {
        if !self.handle.is_null() {
            unsafe { ACameraCaptureSession_close(self.handle) };
            self.handle = null_mut();
        }
    }
}

unsafe extern "C" fn on_ready(_context: *mut c_void, session: *mut ACameraCaptureSession) {
    info!("session is ready: {session:?}");
}

unsafe extern "C" fn on_active(_context: *mut c_void, session: *mut ACameraCaptureSession) {
    info!("session is active: {session:?}");
}

unsafe extern "C" fn on_closed(_context: *mut c_void, session: *mut ACameraCaptureSession) {
    info!("session is closed: {session:?}");
}
