// This is free and unencumbered software released into the public domain.

//! Camera capture through `libcamera2ndk` and `libmediandk`.
//!
//! One device, one still-capture request, one image reader output. Images
//! delivered by the reader's listener are swapped into an [`ImageSlot`].

use crate::shared::{
    CameraBackend, CameraConfig, CameraDriver, CameraError, Frame, ImageSlot, PixelFormat,
};
use core::{ffi::c_void, time::Duration};
use ndk_sys::{AIMAGE_FORMATS, AImageReader, android_get_device_api_level};
use std::{borrow::Cow, sync::Arc};

mod camera_capture_session;
pub use camera_capture_session::*;

mod camera_device;
pub use camera_device::*;

mod camera_manager;
pub use camera_manager::*;

mod camera_output_target;
pub use camera_output_target::*;

mod camera_status;
pub use camera_status::*;

mod capture_request;
pub use capture_request::*;

mod capture_session_output;
pub use capture_session_output::*;

mod capture_session_output_container;
pub use capture_session_output_container::*;

mod image;
pub use self::image::*;

mod image_reader;
pub use image_reader::*;

mod media_status;
pub use media_status::*;

mod native_window;
pub use native_window::*;

#[link(name = "camera2ndk")]
unsafe extern "C" {}

#[link(name = "mediandk")]
unsafe extern "C" {}

#[link(name = "android")]
unsafe extern "C" {}

/// Lists the ids of all cameras known to the camera service.
pub fn camera_ids() -> Result<Vec<String>, CameraError> {
    CameraManager::new()
        .camera_ids()
        .context("get camera id list")
}

/// Platform handles of an open session, in the order they are released.
#[derive(Debug)]
struct Session {
    capture_session: CameraCaptureSession,
    request: CaptureRequest,
    output_target: CameraOutputTarget,
    device: CameraDevice,
    session_output: CaptureSessionOutput,
    output_container: CaptureSessionOutputContainer,
    image_reader: ImageReader,
    window: NativeWindow,
}

#[derive(Debug)]
pub struct AndroidCameraDriver {
    config: CameraConfig,
    camera_id: String,
    api_level: u32,
    session: Option<Session>,
    slot: Arc<ImageSlot<Image>>,
}

// The raw handles are owned exclusively by this driver; the only state the
// platform thread touches is the slot, which is internally synchronized.
unsafe impl Send for AndroidCameraDriver {}

impl AndroidCameraDriver {
    pub fn open(config: CameraConfig) -> Result<Self, CameraError> {
        let index = config.index;
        let (width, height) = (config.width, config.height);
        info!("open camera (index: {index}, width: {width}, height: {height})");

        let format = image_format(config.pixel_format)?;
        let api_level = unsafe { android_get_device_api_level() }.max(0) as u32;

        let manager = CameraManager::new();
        let camera_ids = manager.camera_ids().context("get camera id list")?;
        if camera_ids.is_empty() {
            error!("no camera device detected");
            return Err(CameraError::NoCamera);
        }
        let Some(camera_id) = camera_ids.get(index as usize).cloned() else {
            error!("no camera at index {index}");
            return Err(CameraError::CameraIndex {
                index,
                count: camera_ids.len(),
            });
        };
        info!(
            "open camera (id: {camera_id}, num of cameras: {}, api level: {api_level})",
            camera_ids.len()
        );

        let device = manager
            .open_camera(&camera_id)
            .context("open camera device")?;
        info!("camera device {} opened", device.id());

        let mut request = CaptureRequest::still_capture(&device)
            .context("create still capture request")?;
        debug!("capture request created");

        let mut output_container =
            CaptureSessionOutputContainer::new().context("create session output container")?;
        debug!("session output container created");

        // Declared before the reader so it outlives the reader's listener if
        // any later step fails.
        let slot: Arc<ImageSlot<Image>> = Arc::new(ImageSlot::new());

        let max_images = i32::try_from(config.buffer_frames).unwrap_or(i32::MAX);
        let mut image_reader = ImageReader::new((width, height), format, max_images)
            .context("create image reader")?;
        debug!("image reader created");

        unsafe {
            image_reader.set_image_listener(Arc::as_ptr(&slot) as *mut c_void, on_image_available)
        }
        .context("set image listener")?;
        debug!("image listener set");

        let window = image_reader.window().context("get image reader window")?;

        let output_target = CameraOutputTarget::new(&window).context("create output target")?;
        request
            .add_target(&output_target)
            .context("add output target to request")?;

        let session_output =
            CaptureSessionOutput::new(&window).context("create session output")?;
        output_container
            .add(&session_output)
            .context("add session output to container")?;

        let capture_session = CameraCaptureSession::open(&device, &output_container)
            .context("create capture session")?;
        info!("capture session created");

        drop(manager);

        Ok(Self {
            config,
            camera_id,
            api_level,
            session: Some(Session {
                capture_session,
                request,
                output_target,
                device,
                session_output,
                output_container,
                image_reader,
                window,
            }),
            slot,
        })
    }
}

impl dogma::Named for AndroidCameraDriver {
    fn name(&self) -> Cow<'_, str> {
        "camera2ndk".into()
    }
}

impl CameraDriver for AndroidCameraDriver {
    fn backend(&self) -> CameraBackend {
        CameraBackend::Android
    }

    fn capture(&mut self) -> Result<(), CameraError> {
        debug!("capture camera");
        let Some(session) = self.session.as_mut() else {
            return Err(CameraError::Closed);
        };
        session
            .capture_session
            .capture(&session.request)
            .context("capture image")
    }

    fn frame_generation(&self) -> u64 {
        self.slot.generation()
    }

    fn wait_for_frame(&self, seen: u64, timeout: Duration) -> bool {
        self.slot.wait_newer(seen, timeout)
    }

    fn latest_frame(&self) -> Result<Option<Frame>, CameraError> {
        if self.session.is_none() {
            return Err(CameraError::Closed);
        }
        let format = self.config.pixel_format;
        let frame = self
            .slot
            .with_latest(|image| image.to_frame(format).context("read image plane"))
            .transpose()?;
        if self.config.diagnostics {
            if let Some(frame) = &frame {
                info!(
                    "camera {} image (api level {}): {}",
                    self.camera_id,
                    self.api_level,
                    frame.describe()
                );
            }
        }
        Ok(frame)
    }

    fn close(&mut self) -> Result<(), CameraError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        let Session {
            capture_session,
            request,
            output_target,
            device,
            session_output,
            output_container,
            image_reader,
            window,
        } = session;

        drop(capture_session);
        drop(request);
        drop(output_target);
        let closed = device.close().context("close camera device");
        drop(session_output);
        drop(output_container);
        drop(image_reader);
        drop(window);
        self.slot.clear();

        closed?;
        info!("camera closed");
        Ok(())
    }
}

impl Drop for AndroidCameraDriver {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn image_format(format: PixelFormat) -> Result<i32, CameraError> {
    match format {
        PixelFormat::Jpeg => Ok(AIMAGE_FORMATS::AIMAGE_FORMAT_JPEG.0 as i32),
        PixelFormat::Yuv420 => Ok(AIMAGE_FORMATS::AIMAGE_FORMAT_YUV_420_888.0 as i32),
        PixelFormat::Rgba8 => Err(CameraError::unsupported(
            "camera outputs cannot be read as RGBA",
        )),
    }
}

unsafe extern "C" fn on_image_available(context: *mut c_void, reader: *mut AImageReader) {
    debug!("image available");
    if context.is_null() {
        return;
    }
    // The driver keeps the slot alive until after the reader is deleted.
    let slot = unsafe { &*(context as *const ImageSlot<Image>) };
    match unsafe { ImageReader::acquire_latest_image_from(reader) } {
        Ok(image) => {
            slot.replace(image);
        },
        Err(status) => error!("failed to acquire next image (reason: {status})"),
    }
}
