// This is free and unencumbered software released into the public domain.

use std::error::Error as StdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("no suitable camera backend available")]
    NoDriver,

    #[error("no camera device available")]
    NoCamera,

    #[error("no camera at index {index} ({count} available)")]
    CameraIndex { index: u32, count: usize },

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("camera is closed")]
    Closed,

    #[error("no image available")]
    NoImage,

    /// A platform call returned a non-OK status code.
    #[error("failed to {context} (status {code})")]
    Status { context: &'static str, code: i32 },

    #[error("failed to decode frame")]
    Decode(#[from] image::ImageError),

    #[error("driver error while {context}")]
    DriverError {
        context: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("{0}")]
    Other(String),
}

impl CameraError {
    #[inline]
    pub fn status(context: &'static str, code: i32) -> Self {
        Self::Status { context, code }
    }

    #[inline]
    pub fn driver(context: &'static str, source: impl StdError + Send + Sync + 'static) -> Self {
        Self::DriverError {
            context,
            source: Box::new(source),
        }
    }

    #[inline]
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    #[inline]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// The raw platform status code, if this error came from a platform call.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_carry_the_platform_code() {
        let err = CameraError::status("open camera device", -10005);
        assert_eq!(err.code(), Some(-10005));
        assert_eq!(
            err.to_string(),
            "failed to open camera device (status -10005)"
        );
    }

    #[test]
    fn other_errors_have_no_platform_code() {
        assert_eq!(CameraError::NoCamera.code(), None);
        assert_eq!(CameraError::invalid_config("width").code(), None);
    }

    #[test]
    fn camera_index_message_names_the_count() {
        let err = CameraError::CameraIndex { index: 3, count: 2 };
        assert_eq!(err.to_string(), "no camera at index 3 (2 available)");
    }
}
