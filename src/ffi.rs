// This is free and unencumbered software released into the public domain.

//! C ABI over a single process-wide camera.
//!
//! Every function returns `0` on success. Failures of a platform call return
//! that call's raw `camera_status_t`/`media_status_t`; all other failures
//! return one of the small negative [`DroidCameraErrorCode`] values.

use crate::shared::{Camera, CameraConfig, CameraError, open_camera};
use core::ffi::{c_char, c_int};
use std::{
    ffi::CStr,
    sync::{Mutex, MutexGuard},
};

/// Crate-level error codes. Platform status codes live at -10000 and below,
/// so these never collide with them.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DroidCameraErrorCode {
    Ok = 0,
    NoDriver = -1,
    NoCamera = -2,
    InvalidArgument = -3,
    NotOpen = -4,
    NoImage = -5,
    BufferTooSmall = -6,
    DecodeFailed = -7,
    Unsupported = -8,
    DriverError = -9,
}

impl From<&CameraError> for DroidCameraErrorCode {
    fn from(err: &CameraError) -> Self {
        use DroidCameraErrorCode::*;
        match err {
            CameraError::NoDriver => NoDriver,
            CameraError::NoCamera | CameraError::CameraIndex { .. } => NoCamera,
            CameraError::InvalidConfig(_) => InvalidArgument,
            CameraError::Closed => NotOpen,
            CameraError::NoImage => NoImage,
            CameraError::Decode(_) => DecodeFailed,
            CameraError::Unsupported(_) => Unsupported,
            CameraError::Status { .. } | CameraError::DriverError { .. } | CameraError::Other(_) => {
                DriverError
            },
        }
    }
}

/// Maps an error to the value returned across the C boundary.
pub fn error_code(err: &CameraError) -> c_int {
    err.code()
        .unwrap_or_else(|| DroidCameraErrorCode::from(err) as c_int)
}

static CAMERA: Mutex<Option<Camera>> = Mutex::new(None);

fn camera() -> MutexGuard<'static, Option<Camera>> {
    CAMERA.lock().unwrap_or_else(|p| p.into_inner())
}

fn open(device: &str, index: c_int, width: c_int, height: c_int) -> c_int {
    let (Ok(index), Ok(width), Ok(height)) = (
        u32::try_from(index),
        u32::try_from(width),
        u32::try_from(height),
    ) else {
        return DroidCameraErrorCode::InvalidArgument as c_int;
    };

    let mut slot = camera();
    if let Some(mut previous) = slot.take() {
        if let Err(err) = previous.close() {
            warn!("failed to close previous camera: {err}");
        }
    }

    let config = CameraConfig::new(width, height).with_index(index);
    match open_camera(device, config) {
        Ok(camera) => {
            *slot = Some(camera);
            DroidCameraErrorCode::Ok as c_int
        },
        Err(err) => {
            error!("can not open camera {index}: {err}");
            error_code(&err)
        },
    }
}

/// Opens the platform camera at `index` with the given output size.
#[unsafe(no_mangle)]
pub extern "C" fn droid_camera_open(index: c_int, width: c_int, height: c_int) -> c_int {
    open("", index, width, height)
}

/// Opens the camera named by a device URL (`android:<index>`, `synthetic`).
///
/// # Safety
/// `device` must be NULL or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn droid_camera_open_device(
    device: *const c_char,
    width: c_int,
    height: c_int,
) -> c_int {
    let device = if device.is_null() {
        ""
    } else {
        match unsafe { CStr::from_ptr(device) }.to_str() {
            Ok(device) => device,
            Err(_) => return DroidCameraErrorCode::InvalidArgument as c_int,
        }
    };
    open(device, 0, width, height)
}

/// Submits one capture; the image lands in the latest-image slot.
#[unsafe(no_mangle)]
pub extern "C" fn droid_camera_capture() -> c_int {
    let mut slot = camera();
    let Some(camera) = slot.as_mut() else {
        return DroidCameraErrorCode::NotOpen as c_int;
    };
    match camera.capture() {
        Ok(()) => DroidCameraErrorCode::Ok as c_int,
        Err(err) => error_code(&err),
    }
}

/// Copies the latest image, decoded, rotated, and converted to RGBA8, into
/// `out`.
///
/// `out_len`, `out_width`, and `out_height` are always written when non-NULL,
/// so a caller can pass a NULL `out` with zero capacity to learn the size;
/// that call returns `BufferTooSmall`.
///
/// # Safety
/// `out` must be valid for `capacity` bytes of writes, and each out pointer
/// must be NULL or valid for one write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn droid_camera_copy_frame(
    out: *mut u8,
    capacity: usize,
    out_len: *mut usize,
    out_width: *mut u32,
    out_height: *mut u32,
) -> c_int {
    let slot = camera();
    let Some(camera) = slot.as_ref() else {
        return DroidCameraErrorCode::NotOpen as c_int;
    };
    let image = match camera.latest_image() {
        Ok(image) => image.to_rgba8(),
        Err(err) => return error_code(&err),
    };
    let pixels = image.as_raw();

    unsafe {
        if !out_len.is_null() {
            *out_len = pixels.len();
        }
        if !out_width.is_null() {
            *out_width = image.width();
        }
        if !out_height.is_null() {
            *out_height = image.height();
        }
    }

    if out.is_null() || capacity < pixels.len() {
        return DroidCameraErrorCode::BufferTooSmall as c_int;
    }
    unsafe { core::ptr::copy_nonoverlapping(pixels.as_ptr(), out, pixels.len()) };
    DroidCameraErrorCode::Ok as c_int
}

/// Closes the camera and releases every platform resource it holds.
#[unsafe(no_mangle)]
pub extern "C" fn droid_camera_close() -> c_int {
    let Some(mut camera) = camera().take() else {
        return DroidCameraErrorCode::Ok as c_int;
    };
    match camera.close() {
        Ok(()) => DroidCameraErrorCode::Ok as c_int,
        Err(err) => {
            error!("can not close camera: {err}");
            error_code(&err)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{ffi::CString, ptr::null_mut};

    #[test]
    fn platform_status_codes_pass_through() {
        assert_eq!(error_code(&CameraError::status("open camera device", -10005)), -10005);
        assert_eq!(error_code(&CameraError::NoImage), -5);
        assert_eq!(
            error_code(&CameraError::CameraIndex { index: 2, count: 1 }),
            DroidCameraErrorCode::NoCamera as c_int
        );
    }

    // The camera is process-wide, so the whole lifecycle runs in one test.
    #[test]
    fn synthetic_lifecycle() {
        assert_eq!(droid_camera_close(), 0);
        assert_eq!(droid_camera_capture(), DroidCameraErrorCode::NotOpen as c_int);
        assert_eq!(droid_camera_open(0, -1, 480), DroidCameraErrorCode::InvalidArgument as c_int);

        let device = CString::new("synthetic").unwrap();
        assert_eq!(unsafe { droid_camera_open_device(device.as_ptr(), 4, 2) }, 0);
        assert_eq!(droid_camera_capture(), 0);

        let (mut len, mut width, mut height) = (0usize, 0u32, 0u32);
        let status =
            unsafe { droid_camera_copy_frame(null_mut(), 0, &mut len, &mut width, &mut height) };
        assert_eq!(status, DroidCameraErrorCode::BufferTooSmall as c_int);
        assert_eq!((len, width, height), (4 * 2 * 4, 4, 2));

        let mut buffer = vec![0u8; len];
        let status = unsafe {
            droid_camera_copy_frame(
                buffer.as_mut_ptr(),
                buffer.len(),
                &mut len,
                null_mut(),
                null_mut(),
            )
        };
        assert_eq!(status, 0);
        assert!(buffer.chunks(4).all(|px| px[3] == 0xff));

        assert_eq!(droid_camera_close(), 0);
        assert_eq!(droid_camera_capture(), DroidCameraErrorCode::NotOpen as c_int);
    }
}
