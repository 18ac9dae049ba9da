// This is free and unencumbered software released into the public domain.

use crate::shared::CameraError;
use bytes::Bytes;
use image::{DynamicImage, GrayImage, ImageFormat, RgbaImage};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// Compressed JPEG stream in plane 0.
    #[default]
    Jpeg,
    /// YUV 4:2:0, of which only the luma plane is carried.
    Yuv420,
    Rgba8,
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    /// Row stride in bytes. Zero for compressed formats.
    pub stride: usize,
    pub pixel_format: PixelFormat,
    pub timestamp_ns: u64,
}

impl Frame {
    pub fn new_jpeg(data: impl Into<Bytes>, width: u32, height: u32) -> Self {
        Self {
            data: data.into(),
            width,
            height,
            stride: 0,
            pixel_format: PixelFormat::Jpeg,
            timestamp_ns: 0,
        }
    }

    pub fn new_luma(data: impl Into<Bytes>, width: u32, height: u32, stride: usize) -> Self {
        Self {
            data: data.into(),
            width,
            height,
            stride,
            pixel_format: PixelFormat::Yuv420,
            timestamp_ns: 0,
        }
    }

    pub fn new_rgba(data: impl Into<Bytes>, width: u32, height: u32, stride: usize) -> Self {
        Self {
            data: data.into(),
            width,
            height,
            stride,
            pixel_format: PixelFormat::Rgba8,
            timestamp_ns: 0,
        }
    }

    pub fn with_timestamp(mut self, timestamp_ns: u64) -> Self {
        self.timestamp_ns = timestamp_ns;
        self
    }

    /// One-line summary of the frame's geometry and timing, for diagnostics.
    pub fn describe(&self) -> String {
        format!(
            "{}x{} {:?}, {} bytes, stride {}, timestamp {} ns",
            self.width,
            self.height,
            self.pixel_format,
            self.data.len(),
            self.stride,
            self.timestamp_ns
        )
    }

    /// Decodes the frame into an owned image.
    pub fn to_image(&self) -> Result<DynamicImage, CameraError> {
        match self.pixel_format {
            PixelFormat::Jpeg => Ok(image::load_from_memory_with_format(
                &self.data,
                ImageFormat::Jpeg,
            )?),
            PixelFormat::Yuv420 => {
                let pixels = self.packed_rows(1)?;
                GrayImage::from_raw(self.width, self.height, pixels)
                    .map(DynamicImage::ImageLuma8)
                    .ok_or_else(|| CameraError::other("luma plane does not match dimensions"))
            },
            PixelFormat::Rgba8 => {
                let pixels = self.packed_rows(4)?;
                RgbaImage::from_raw(self.width, self.height, pixels)
                    .map(DynamicImage::ImageRgba8)
                    .ok_or_else(|| CameraError::other("rgba plane does not match dimensions"))
            },
        }
    }

    /// Copies the visible part of each row, dropping any stride padding.
    fn packed_rows(&self, bytes_per_pixel: usize) -> Result<Vec<u8>, CameraError> {
        let row_len = self.width as usize * bytes_per_pixel;
        let height = self.height as usize;
        let stride = if self.stride == 0 { row_len } else { self.stride };
        if stride < row_len {
            return Err(CameraError::other(format!(
                "row stride {stride} is shorter than a {row_len}-byte row"
            )));
        }

        let needed = match height {
            0 => 0,
            h => stride * (h - 1) + row_len,
        };
        if self.data.len() < needed {
            return Err(CameraError::other(format!(
                "frame buffer holds {} bytes, expected at least {needed}",
                self.data.len()
            )));
        }

        if stride == row_len {
            return Ok(self.data[..row_len * height].to_vec());
        }

        let mut out = Vec::with_capacity(row_len * height);
        for row in 0..height {
            let start = row * stride;
            out.extend_from_slice(&self.data[start..start + row_len]);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageEncoder, codecs::jpeg::JpegEncoder};

    #[test]
    fn describes_geometry_and_timing() {
        let frame = Frame::new_luma(vec![0; 12], 3, 2, 6).with_timestamp(42);
        assert_eq!(
            frame.describe(),
            "3x2 Yuv420, 12 bytes, stride 6, timestamp 42 ns"
        );
    }

    #[test]
    fn decodes_padded_luma_rows() {
        // 2x2 luma with a 3-byte stride; the padding byte must be dropped.
        let data = vec![10, 20, 0xff, 30, 40];
        let frame = Frame::new_luma(data, 2, 2, 3);
        let img = frame.to_image().unwrap();
        assert_eq!(img.dimensions(), (2, 2));
        let gray = img.to_luma8();
        assert_eq!(gray.into_raw(), vec![10, 20, 30, 40]);
    }

    #[test]
    fn decodes_tightly_packed_rgba() {
        let data = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let frame = Frame::new_rgba(data.clone(), 2, 1, 0);
        let img = frame.to_image().unwrap();
        assert_eq!(img.to_rgba8().into_raw(), data);
    }

    #[test]
    fn short_buffers_are_rejected() {
        let frame = Frame::new_luma(vec![0; 5], 3, 2, 3);
        assert!(matches!(frame.to_image(), Err(CameraError::Other(_))));
    }

    #[test]
    fn stride_shorter_than_a_row_is_rejected() {
        let frame = Frame::new_rgba(vec![0; 64], 4, 2, 8);
        assert!(matches!(frame.to_image(), Err(CameraError::Other(_))));
    }

    #[test]
    fn decodes_jpeg() {
        let pixels = vec![128u8; 8 * 4 * 3];
        let mut encoded = Vec::new();
        JpegEncoder::new(&mut encoded)
            .write_image(&pixels, 8, 4, image::ExtendedColorType::Rgb8)
            .unwrap();

        let frame = Frame::new_jpeg(encoded, 8, 4);
        let img = frame.to_image().unwrap();
        assert_eq!(img.dimensions(), (8, 4));
    }

    #[test]
    fn garbage_jpeg_is_a_decode_error() {
        let frame = Frame::new_jpeg(vec![0u8, 1, 2, 3], 2, 2);
        assert!(matches!(frame.to_image(), Err(CameraError::Decode(_))));
    }
}
