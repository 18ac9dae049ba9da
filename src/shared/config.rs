// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraError, PixelFormat, Rotation};
use core::time::Duration;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub device: Option<String>,
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub rotate: i32,
    pub pixel_format: PixelFormat,
    pub buffer_frames: usize,
    pub capture_timeout_ms: u64,
    pub diagnostics: bool,
    /// Attach each image's capture timestamp to the reader's output.
    pub timestamp: bool,
    pub intrinsic_parameters: Option<Intrinsics>,
    pub distortion_parameters: Option<Distortion>,
}

/// Pinhole camera intrinsics, carried through unchanged for consumers.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Intrinsics {
    pub width_px: u32,
    pub height_px: u32,
    pub fx: f64,
    pub fy: f64,
    pub ppx: f64,
    pub ppy: f64,
}

/// Brown-Conrady lens distortion coefficients, carried through unchanged.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Distortion {
    pub rk1: f64,
    pub rk2: f64,
    pub rk3: f64,
    pub tp1: f64,
    pub tp2: f64,
}

/// The image reader needs one buffer for the image held in the slot and one
/// for the image being delivered.
pub const MIN_BUFFER_FRAMES: usize = 2;

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: None,
            index: 0,
            width: 640,
            height: 480,
            rotate: 0,
            pixel_format: PixelFormat::Jpeg,
            buffer_frames: 2,
            capture_timeout_ms: 2000,
            diagnostics: false,
            timestamp: false,
            intrinsic_parameters: None,
            distortion_parameters: None,
        }
    }
}

impl CameraConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Parses a JSON configuration object. Missing keys take their defaults.
    pub fn from_json(input: &str) -> Result<Self, CameraError> {
        serde_json::from_str(input).map_err(|e| CameraError::invalid_config(e.to_string()))
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    pub fn with_rotate(mut self, degrees: i32) -> Self {
        self.rotate = degrees;
        self
    }

    pub fn with_pixel_format(mut self, fmt: PixelFormat) -> Self {
        self.pixel_format = fmt;
        self
    }

    pub fn with_buffer_frames(mut self, n: usize) -> Self {
        self.buffer_frames = n.max(MIN_BUFFER_FRAMES);
        self
    }

    pub fn with_capture_timeout(mut self, timeout: Duration) -> Self {
        self.capture_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn with_timestamp(mut self, enabled: bool) -> Self {
        self.timestamp = enabled;
        self
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms)
    }

    pub fn rotation(&self) -> Result<Rotation, CameraError> {
        Rotation::from_degrees(self.rotate)
    }

    pub fn validate(&self) -> Result<(), CameraError> {
        if self.width == 0 {
            return Err(CameraError::invalid_config("width must be greater than 0"));
        }
        if self.height == 0 {
            return Err(CameraError::invalid_config("height must be greater than 0"));
        }
        if i32::try_from(self.width).is_err() || i32::try_from(self.height).is_err() {
            return Err(CameraError::invalid_config("dimensions are too large"));
        }
        if self.buffer_frames < MIN_BUFFER_FRAMES {
            return Err(CameraError::invalid_config(format!(
                "buffer_frames must be at least {MIN_BUFFER_FRAMES}"
            )));
        }
        self.rotation()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CameraConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pixel_format, PixelFormat::Jpeg);
        assert_eq!(config.buffer_frames, 2);
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(
            CameraConfig::new(0, 480).validate(),
            Err(CameraError::InvalidConfig(_))
        ));
        assert!(matches!(
            CameraConfig::new(640, 0).validate(),
            Err(CameraError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_rotation_off_the_right_angle() {
        let config = CameraConfig::new(640, 480).with_rotate(45);
        assert!(matches!(
            config.validate(),
            Err(CameraError::InvalidConfig(_))
        ));

        let config = CameraConfig::new(640, 480).with_rotate(-270);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn buffer_frames_leave_room_for_the_held_image() {
        assert_eq!(CameraConfig::default().with_buffer_frames(0).buffer_frames, 2);
        assert_eq!(CameraConfig::default().with_buffer_frames(1).buffer_frames, 2);
        assert_eq!(CameraConfig::default().with_buffer_frames(4).buffer_frames, 4);

        for buffer_frames in [0, 1] {
            let config = CameraConfig {
                buffer_frames,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(CameraError::InvalidConfig(_))
            ));
        }
        assert!(matches!(
            CameraConfig::from_json(r#"{ "buffer_frames": 1 }"#).map(|c| c.validate()),
            Ok(Err(CameraError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn parses_json_with_defaults() {
        let config =
            CameraConfig::from_json(r#"{ "width": 1280, "height": 720, "index": 1, "rotate": 90 }"#)
                .unwrap();
        assert_eq!(config.width, 1280);
        assert_eq!(config.height, 720);
        assert_eq!(config.index, 1);
        assert_eq!(config.rotation().unwrap(), Rotation::Cw90);
        assert_eq!(config.pixel_format, PixelFormat::Jpeg);
        assert_eq!(config.capture_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn parses_pixel_format_names() {
        let config = CameraConfig::from_json(r#"{ "pixel_format": "yuv420" }"#).unwrap();
        assert_eq!(config.pixel_format, PixelFormat::Yuv420);
    }

    #[test]
    fn accepts_timestamp_and_lens_parameters() {
        let config = CameraConfig::from_json(
            r#"{
                "width": 640,
                "height": 480,
                "timestamp": true,
                "intrinsic_parameters": {
                    "width_px": 640, "height_px": 480,
                    "fx": 500.5, "fy": 501.0, "ppx": 320.0, "ppy": 240.0
                },
                "distortion_parameters": {
                    "rk1": 0.1, "rk2": -0.02, "rk3": 0.0, "tp1": 0.001, "tp2": 0.0
                }
            }"#,
        )
        .unwrap();
        assert!(config.timestamp);
        assert!(config.validate().is_ok());

        let intrinsics = config.intrinsic_parameters.unwrap();
        assert_eq!((intrinsics.width_px, intrinsics.height_px), (640, 480));
        assert_eq!(intrinsics.fx, 500.5);
        assert_eq!(config.distortion_parameters.unwrap().rk2, -0.02);
    }

    #[test]
    fn lens_parameters_default_to_absent() {
        let config = CameraConfig::from_json(r#"{ "timestamp": false }"#).unwrap();
        assert!(!config.timestamp);
        assert_eq!(config.intrinsic_parameters, None);
        assert_eq!(config.distortion_parameters, None);
    }

    #[test]
    fn rejects_unknown_json_keys() {
        assert!(matches!(
            CameraConfig::from_json(r#"{ "fps": 30 }"#),
            Err(CameraError::InvalidConfig(_))
        ));
    }
}
