// This is free and unencumbered software released into the public domain.

use super::{CameraDevice, CameraResult, CameraStatus};
use core::{ffi::CStr, ptr::null_mut};
use ndk_sys::{
    ACameraManager, ACameraManager_create, ACameraManager_delete,
    ACameraManager_deleteCameraIdList, ACameraManager_getCameraIdList, ACameraManager_openCamera,
};
use scopeguard::defer;
use std::ffi::CString;

#[derive(Debug)]
pub struct CameraManager {
    pub(crate) handle: *mut ACameraManager,
}

impl Drop for CameraManager {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ACameraManager_delete(self.handle) };
            self.handle = null_mut();
            debug!("camera manager deleted");
        }
    }
}

impl CameraManager {
    pub fn new() -> Self {
        Self {
            handle: unsafe { ACameraManager_create() },
        }
    }

    /// See: https://developer.android.com/ndk/reference/group/camera#acameramanager_getcameraidlist
    pub fn camera_ids(&self) -> CameraResult<Vec<String>> {
        let mut list_ptr = null_mut();
        CameraStatus::check(unsafe { ACameraManager_getCameraIdList(self.handle, &mut list_ptr) })?;

        defer! {
            unsafe { ACameraManager_deleteCameraIdList(list_ptr) };
        }

        let list = unsafe { &*list_ptr };
        if list.numCameras < 1 || list.cameraIds.is_null() {
            return Ok(Vec::new());
        }

        let ids = unsafe { core::slice::from_raw_parts(list.cameraIds, list.numCameras as usize) };
        Ok(ids
            .iter()
            .map(|p| unsafe { CStr::from_ptr(*p) }.to_string_lossy().into_owned())
            .collect())
    }

    /// Opens the device with the given id; the returned handle logs
    /// disconnects and errors reported by the platform.
    pub fn open_camera(&self, id: &str) -> CameraResult<CameraDevice> {
        // Camera ids come from the platform and never contain NUL bytes.
        let id = CString::new(id).unwrap_or_default();

        let mut device = CameraDevice::new(id);
        let status = unsafe {
            ACameraManager_openCamera(
                self.handle,
                device.id.as_ptr(),
                &mut *device.state_callbacks,
                &mut device.handle,
            )
        };
        CameraStatus::check(status)?;
        Ok(device)
    }
}
