// This is free and unencumbered software released into the public domain.

use super::{MediaResult, MediaStatus};
use crate::shared::{Frame, PixelFormat};
use bytes::Bytes;
use core::ptr::null_mut;
use ndk_sys::{
    AImage, AImage_delete, AImage_getHeight, AImage_getPlaneData, AImage_getPlaneRowStride,
    AImage_getTimestamp, AImage_getWidth,
};

/// An image acquired from an [`ImageReader`](super::ImageReader).
#[derive(Debug)]
pub struct Image {
    pub(crate) handle: *mut AImage,
}

// Only touched under the image slot's lock.
unsafe impl Send for Image {}

impl Drop for Image {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { AImage_delete(self.handle) };
            self.handle = null_mut();
        }
    }
}

impl Image {
    pub fn width(&self) -> MediaResult<u32> {
        let mut result = 0;
        MediaStatus::check(unsafe { AImage_getWidth(self.handle, &mut result) })?;
        Ok(result.max(0) as u32)
    }

    pub fn height(&self) -> MediaResult<u32> {
        let mut result = 0;
        MediaStatus::check(unsafe { AImage_getHeight(self.handle, &mut result) })?;
        Ok(result.max(0) as u32)
    }

    /// Capture timestamp in nanoseconds.
    pub fn timestamp(&self) -> MediaResult<i64> {
        let mut result = 0;
        MediaStatus::check(unsafe { AImage_getTimestamp(self.handle, &mut result) })?;
        Ok(result)
    }

    pub fn plane_row_stride(&self, plane: i32) -> MediaResult<usize> {
        let mut result = 0;
        MediaStatus::check(unsafe { AImage_getPlaneRowStride(self.handle, plane, &mut result) })?;
        Ok(result.max(0) as usize)
    }

    /// Borrows the pixel data of `plane`; valid for as long as the image is.
    pub fn plane_data(&self, plane: i32) -> MediaResult<&[u8]> {
        let mut data = null_mut();
        let mut len = 0;
        MediaStatus::check(unsafe { AImage_getPlaneData(self.handle, plane, &mut data, &mut len) })?;
        if data.is_null() || len <= 0 {
            return Ok(&[]);
        }
        Ok(unsafe { core::slice::from_raw_parts(data, len as usize) })
    }

    /// Copies plane 0 and its metadata into an owned frame.
    pub fn to_frame(&self, pixel_format: PixelFormat) -> MediaResult<Frame> {
        let stride = match pixel_format {
            PixelFormat::Jpeg => 0,
            _ => self.plane_row_stride(0)?,
        };
        Ok(Frame {
            data: Bytes::copy_from_slice(self.plane_data(0)?),
            width: self.width()?,
            height: self.height()?,
            stride,
            pixel_format,
            timestamp_ns: self.timestamp()?.max(0) as u64,
        })
    }
}
