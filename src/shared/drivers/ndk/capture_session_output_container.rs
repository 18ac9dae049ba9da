// This is free and unencumbered software released into the public domain.

use super::{CameraResult, CameraStatus, CaptureSessionOutput};
use core::ptr::null_mut;
use ndk_sys::{
    ACaptureSessionOutputContainer, ACaptureSessionOutputContainer_add,
    ACaptureSessionOutputContainer_create, ACaptureSessionOutputContainer_free,
};

#[derive(Debug)]
pub struct CaptureSessionOutputContainer {
    pub(crate) handle: *mut ACaptureSessionOutputContainer,
}

impl Drop for CaptureSessionOutputContainer {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ACaptureSessionOutputContainer_free(self.handle) };
            self.handle = null_mut();
        }
    }
}

impl CaptureSessionOutputContainer {
    pub fn new() -> CameraResult<Self> {
        let mut result = Self { handle: null_mut() };
        CameraStatus::check(unsafe { ACaptureSessionOutputContainer_create(&mut result.handle) })?;
        Ok(result)
    }

    /// The container keeps a reference to `output`, which must outlive it.
    pub fn add(&mut self, output: &CaptureSessionOutput) -> CameraResult {
        CameraStatus::check(unsafe { ACaptureSessionOutputContainer_add(self.handle, output.handle) })
    }
}
