// This is free and unencumbered software released into the public domain.

use crate::shared::CameraError;
use derive_more::Display;
use ndk_sys::camera_status_t;

pub type CameraResult<T = ()> = core::result::Result<T, CameraStatus>;

/// A non-OK `camera_status_t` from `libcamera2ndk`.
#[derive(Clone, Copy, Debug, Display)]
#[display("{}", _0.0)]
pub struct CameraStatus(pub(crate) camera_status_t);

impl core::error::Error for CameraStatus {}

impl CameraStatus {
    pub fn code(self) -> i32 {
        self.0.0 as i32
    }

    /// Turns a raw status into `Ok(())` or an error.
    pub fn check(status: camera_status_t) -> CameraResult {
        if status == camera_status_t::ACAMERA_OK {
            Ok(())
        } else {
            Err(Self(status))
        }
    }
}

impl From<camera_status_t> for CameraStatus {
    fn from(input: camera_status_t) -> Self {
        Self(input)
    }
}

impl From<CameraStatus> for i32 {
    fn from(status: CameraStatus) -> Self {
        status.code()
    }
}

/// Logs a failed platform call and converts its status into a [`CameraError`].
pub trait StatusContext<T> {
    fn context(self, context: &'static str) -> Result<T, CameraError>;
}

impl<T, S: Into<i32> + Copy> StatusContext<T> for Result<T, S> {
    fn context(self, context: &'static str) -> Result<T, CameraError> {
        self.map_err(|status| {
            let code: i32 = status.into();
            error!("failed to {context} (reason: {code})");
            CameraError::status(context, code)
        })
    }
}
