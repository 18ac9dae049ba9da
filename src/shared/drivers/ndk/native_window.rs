// This is free and unencumbered software released into the public domain.

use core::ptr::null_mut;
use ndk_sys::{ANativeWindow, ANativeWindow_acquire, ANativeWindow_release};

/// An owned reference on a native window.
#[derive(Debug)]
pub struct NativeWindow {
    pub(crate) handle: *mut ANativeWindow,
}

impl Drop for NativeWindow {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ANativeWindow_release(self.handle) };
            self.handle = null_mut();
        }
    }
}

impl NativeWindow {
    /// Takes out an extra reference on a window owned by someone else.
    ///
    /// # Safety
    /// `handle` must be a valid, non-null window.
    pub(crate) unsafe fn acquire(handle: *mut ANativeWindow) -> Self {
        unsafe { ANativeWindow_acquire(handle) };
        Self { handle }
    }
}
