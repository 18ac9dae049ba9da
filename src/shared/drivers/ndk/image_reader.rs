// This is free and unencumbered software released into the public domain.

use super::{Image, MediaResult, MediaStatus, NativeWindow};
use core::{ffi::c_void, ptr::null_mut};
use ndk_sys::{
    AImageReader, AImageReader_ImageListener, AImageReader_acquireLatestImage,
    AImageReader_delete, AImageReader_getWindow, AImageReader_new, AImageReader_setImageListener,
};

pub type ImageCallback = unsafe extern "C" fn(context: *mut c_void, reader: *mut AImageReader);

#[derive(Debug)]
pub struct ImageReader {
    pub(crate) handle: *mut AImageReader,
    listener: Option<Box<AImageReader_ImageListener>>,
}

impl Drop for ImageReader {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            // Stops listener callbacks and returns acquired buffers to the system.
            unsafe { AImageReader_delete(self.handle) };
            self.handle = null_mut();
        }
    }
}

impl ImageReader {
    /// See: https://developer.android.com/ndk/reference/group/media#aimagereader_new
    pub fn new(dimensions: (u32, u32), format: i32, max_images: i32) -> MediaResult<Self> {
        let (width, height) = dimensions;
        let mut result = Self {
            handle: null_mut(),
            listener: None,
        };
        MediaStatus::check(unsafe {
            AImageReader_new(width as _, height as _, format, max_images, &mut result.handle)
        })?;
        Ok(result)
    }

    /// Registers `callback`, invoked on a platform thread whenever an image
    /// becomes available.
    ///
    /// # Safety
    /// `context` must stay valid until this reader is dropped.
    pub unsafe fn set_image_listener(
        &mut self,
        context: *mut c_void,
        callback: ImageCallback,
    ) -> MediaResult {
        let mut listener = Box::new(AImageReader_ImageListener {
            context,
            onImageAvailable: Some(callback),
        });
        MediaStatus::check(unsafe { AImageReader_setImageListener(self.handle, &mut *listener) })?;
        self.listener = Some(listener);
        Ok(())
    }

    /// Returns a new reference on the window that feeds this reader.
    pub fn window(&self) -> MediaResult<NativeWindow> {
        let mut window = null_mut();
        MediaStatus::check(unsafe { AImageReader_getWindow(self.handle, &mut window) })?;
        Ok(unsafe { NativeWindow::acquire(window) })
    }

    /// Acquires the newest image from the raw reader handed to a listener
    /// callback, discarding older ones.
    ///
    /// See: https://developer.android.com/ndk/reference/group/media#aimagereader_acquirelatestimage
    ///
    /// # Safety
    /// `reader` must be a live reader.
    pub(crate) unsafe fn acquire_latest_image_from(reader: *mut AImageReader) -> MediaResult<Image> {
        let mut result = Image { handle: null_mut() };
        MediaStatus::check(unsafe { AImageReader_acquireLatestImage(reader, &mut result.handle) })?;
        Ok(result)
    }
}
