// This is free and unencumbered software released into the public domain.

use super::{CameraDevice, CameraOutputTarget, CameraResult, CameraStatus};
use core::ptr::null_mut;
use ndk_sys::{
    ACameraDevice_createCaptureRequest, ACameraDevice_request_template, ACaptureRequest,
    ACaptureRequest_addTarget, ACaptureRequest_free,
};

#[derive(Debug)]
pub struct CaptureRequest {
    pub(crate) handle: *mut ACaptureRequest,
}

impl Drop for CaptureRequest {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ACaptureRequest_free(self.handle) };
            self.handle = null_mut();
        }
    }
}

impl CaptureRequest {
    /// Creates a request from the still-capture template.
    pub fn still_capture(device: &CameraDevice) -> CameraResult<Self> {
        let mut result = Self { handle: null_mut() };
        CameraStatus::check(unsafe {
            ACameraDevice_createCaptureRequest(
                device.handle,
                ACameraDevice_request_template::TEMPLATE_STILL_CAPTURE,
                &mut result.handle,
            )
        })?;
        Ok(result)
    }

    /// See: https://developer.android.com/ndk/reference/group/camera#acapturerequest_addtarget
    pub fn add_target(&mut self, target: &CameraOutputTarget) -> CameraResult {
        CameraStatus::check(unsafe { ACaptureRequest_addTarget(self.handle, target.handle) })
    }
}
