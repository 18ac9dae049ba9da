// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraBackend, CameraConfig, CameraDriver, CameraError, Frame, Rotation};
use image::DynamicImage;

/// An open camera: a driver plus the decoding and rotation applied to what
/// it captures.
pub struct Camera {
    driver: Box<dyn CameraDriver>,
    config: CameraConfig,
    rotation: Rotation,
    closed: bool,
}

impl core::fmt::Debug for Camera {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Camera")
            .field("driver", &self.driver.name())
            .field("config", &self.config)
            .field("rotation", &self.rotation)
            .field("closed", &self.closed)
            .finish()
    }
}

impl Camera {
    pub fn new(driver: Box<dyn CameraDriver>, config: CameraConfig) -> Result<Self, CameraError> {
        let rotation = config.rotation()?;
        debug!(
            "camera ready (driver: {}, rotation: {} degrees)",
            driver.name(),
            rotation.degrees()
        );
        Ok(Self {
            driver,
            config,
            rotation,
            closed: false,
        })
    }

    pub fn backend(&self) -> CameraBackend {
        self.driver.backend()
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Submits one capture request.
    ///
    /// With a non-zero capture timeout this waits for the image produced by
    /// the request. If it does not arrive in time the slot keeps the previous
    /// image, if any.
    pub fn capture(&mut self) -> Result<(), CameraError> {
        if self.closed {
            return Err(CameraError::Closed);
        }

        let seen = self.driver.frame_generation();
        self.driver.capture()?;

        let timeout = self.config.capture_timeout();
        if !timeout.is_zero() && !self.driver.wait_for_frame(seen, timeout) {
            warn!(
                "no new image from {} within {timeout:?}",
                self.driver.name()
            );
        }
        Ok(())
    }

    /// Copies the most recent image out, undecoded.
    pub fn latest_frame(&self) -> Result<Frame, CameraError> {
        if self.closed {
            return Err(CameraError::Closed);
        }
        self.driver.latest_frame()?.ok_or(CameraError::NoImage)
    }

    /// Decodes and rotates the most recent image.
    pub fn latest_image(&self) -> Result<DynamicImage, CameraError> {
        self.decode(&self.latest_frame()?)
    }

    /// Decodes `frame` and applies the configured rotation.
    pub fn decode(&self, frame: &Frame) -> Result<DynamicImage, CameraError> {
        Ok(self.rotation.apply(frame.to_image()?))
    }

    pub fn next_frame(&mut self) -> Result<Frame, CameraError> {
        self.capture()?;
        self.latest_frame()
    }

    /// Captures, decodes, and rotates the next image.
    pub fn next_image(&mut self) -> Result<DynamicImage, CameraError> {
        self.capture()?;
        self.latest_image()
    }

    /// Releases the session. Calling it again is a no-op.
    pub fn close(&mut self) -> Result<(), CameraError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.driver.close()
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ImageSlot;
    use core::time::Duration;
    use std::{
        borrow::Cow,
        sync::{
            Arc,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
    };

    /// Records calls; `capture` fills the slot only when `deliver` is set.
    struct FakeDriver {
        slot: Arc<ImageSlot<Frame>>,
        deliver: Arc<AtomicBool>,
        fail_capture: Option<i32>,
        closes: Arc<AtomicUsize>,
    }

    impl FakeDriver {
        fn new(deliver: bool) -> Self {
            Self {
                slot: Arc::new(ImageSlot::new()),
                deliver: Arc::new(AtomicBool::new(deliver)),
                fail_capture: None,
                closes: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl dogma::Named for FakeDriver {
        fn name(&self) -> Cow<'_, str> {
            "fake".into()
        }
    }

    impl CameraDriver for FakeDriver {
        fn backend(&self) -> CameraBackend {
            CameraBackend::Synthetic
        }

        fn capture(&mut self) -> Result<(), CameraError> {
            if let Some(code) = self.fail_capture {
                return Err(CameraError::status("capture image", code));
            }
            if self.deliver.load(Ordering::SeqCst) {
                self.slot
                    .replace(Frame::new_luma(vec![1, 2, 3, 4, 5, 6], 3, 2, 3));
            }
            Ok(())
        }

        fn frame_generation(&self) -> u64 {
            self.slot.generation()
        }

        fn wait_for_frame(&self, seen: u64, timeout: Duration) -> bool {
            self.slot.wait_newer(seen, timeout)
        }

        fn latest_frame(&self) -> Result<Option<Frame>, CameraError> {
            Ok(self.slot.with_latest(Frame::clone))
        }

        fn close(&mut self) -> Result<(), CameraError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn camera(driver: FakeDriver, config: CameraConfig) -> Camera {
        Camera::new(Box::new(driver), config).unwrap()
    }

    #[test]
    fn next_image_decodes_and_rotates() {
        let config = CameraConfig::new(3, 2).with_rotate(90);
        let mut camera = camera(FakeDriver::new(true), config);
        let img = camera.next_image().unwrap();
        assert_eq!((img.width(), img.height()), (2, 3));
        assert_eq!(img.to_luma8().into_raw(), vec![4, 1, 5, 2, 6, 3]);
    }

    #[test]
    fn missing_image_is_reported() {
        let config = CameraConfig::new(3, 2).with_capture_timeout(Duration::from_millis(10));
        let mut camera = camera(FakeDriver::new(false), config);
        assert!(matches!(camera.next_image(), Err(CameraError::NoImage)));
    }

    #[test]
    fn timed_out_capture_falls_back_to_the_held_image() {
        let driver = FakeDriver::new(true);
        let deliver = driver.deliver.clone();
        let slot = driver.slot.clone();
        let config = CameraConfig::new(3, 2).with_capture_timeout(Duration::from_millis(20));
        let mut camera = camera(driver, config);

        let first = camera.next_frame().unwrap();
        assert_eq!(slot.generation(), 1);

        deliver.store(false, Ordering::SeqCst);
        let started = std::time::Instant::now();
        let second = camera.next_frame().unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(slot.generation(), 1);
        assert_eq!(second.data, first.data);
        assert_eq!((second.width, second.height), (3, 2));
    }

    #[test]
    fn capture_failures_keep_their_status_code() {
        let mut driver = FakeDriver::new(true);
        driver.fail_capture = Some(-10001);
        let mut camera = camera(driver, CameraConfig::new(3, 2));
        let err = camera.next_frame().unwrap_err();
        assert_eq!(err.code(), Some(-10001));
    }

    #[test]
    fn close_is_idempotent_and_runs_on_drop() {
        let driver = FakeDriver::new(true);
        let closes = driver.closes.clone();

        let mut camera = camera(driver, CameraConfig::new(3, 2));
        camera.close().unwrap();
        camera.close().unwrap();
        assert!(matches!(camera.next_frame(), Err(CameraError::Closed)));
        drop(camera);
        assert_eq!(closes.load(Ordering::SeqCst), 1);

        let driver = FakeDriver::new(true);
        let closes = driver.closes.clone();
        drop(self::camera(driver, CameraConfig::new(3, 2)));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}
