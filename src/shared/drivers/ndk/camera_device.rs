// This is free and unencumbered software released into the public domain.

use super::{CameraResult, CameraStatus};
use core::{
    ffi::{CStr, c_int, c_void},
    ptr::null_mut,
};
use ndk_sys::{ACameraDevice, ACameraDevice_StateCallbacks, ACameraDevice_close, ACameraDevice_getId};
use std::ffi::CString;

#[derive(Debug)]
pub struct CameraDevice {
    pub(crate) id: CString,
    pub(crate) handle: *mut ACameraDevice,
    // Boxed so the address handed to the platform stays put.
    pub(crate) state_callbacks: Box<ACameraDevice_StateCallbacks>,
}

impl Drop for CameraDevice {
    fn drop(&mut self) {
        let _ = self.close_handle();
    }
}

impl CameraDevice {
    pub(crate) fn new(id: CString) -> Self {
        Self {
            id,
            handle: null_mut(),
            state_callbacks: Box::new(ACameraDevice_StateCallbacks {
                context: null_mut(),
                onDisconnected: Some(on_disconnected),
                onError: Some(on_error),
            }),
        }
    }

    pub fn id(&self) -> &str {
        self.id.to_str().unwrap_or_default()
    }

    /// See: https://developer.android.com/ndk/reference/group/camera#acameradevice_close
    pub fn close(mut self) -> CameraResult {
        self.close_handle()
    }

    fn close_handle(&mut self) -> CameraResult {
        if self.handle.is_null() {
            return Ok(());
        }
        let status = unsafe { ACameraDevice_close(self.handle) };
        self.handle = null_mut();
        CameraStatus::check(status)
    }
}

fn device_id(device: *mut ACameraDevice) -> String {
    if device.is_null() {
        return String::new();
    }
    let id = unsafe { ACameraDevice_getId(device) };
    if id.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(id) }.to_string_lossy().into_owned()
}

unsafe extern "C" fn on_disconnected(_context: *mut c_void, device: *mut ACameraDevice) {
    info!("camera {} is disconnected", device_id(device));
}

unsafe extern "C" fn on_error(_context: *mut c_void, device: *mut ACameraDevice, error: c_int) {
    error!("error {error} on camera {}", device_id(device));
}
