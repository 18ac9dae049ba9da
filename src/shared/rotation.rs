// This is free and unencumbered software released into the public domain.

use crate::shared::CameraError;
use image::DynamicImage;

/// Clockwise rotation applied to decoded images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Accepts any multiple of 90, including negative (counter-clockwise) angles.
    pub fn from_degrees(degrees: i32) -> Result<Self, CameraError> {
        if degrees % 90 != 0 {
            return Err(CameraError::invalid_config(format!(
                "rotate must be a multiple of 90, got {degrees}"
            )));
        }
        Ok(match degrees.rem_euclid(360) {
            90 => Self::Cw90,
            180 => Self::Cw180,
            270 => Self::Cw270,
            _ => Self::None,
        })
    }

    pub fn degrees(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Cw90 => 90,
            Self::Cw180 => 180,
            Self::Cw270 => 270,
        }
    }

    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Self::None => image,
            Self::Cw90 => image.rotate90(),
            Self::Cw180 => image.rotate180(),
            Self::Cw270 => image.rotate270(),
        }
    }
}
