// This is free and unencumbered software released into the public domain.

//! Test-pattern backend that runs on every target.
//!
//! Each capture renders a gradient on a worker thread and drops it into the
//! image slot, the same way the platform's image-available callback does.

use crate::shared::{
    CameraBackend, CameraConfig, CameraDriver, CameraError, Frame, ImageSlot, PixelFormat,
};
use bytes::Bytes;
use image::{ExtendedColorType, ImageEncoder, codecs::jpeg::JpegEncoder};
use std::{
    borrow::Cow,
    sync::Arc,
    thread::JoinHandle,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

#[derive(Debug)]
pub struct SyntheticCameraDriver {
    config: CameraConfig,
    slot: Arc<ImageSlot<Frame>>,
    pending: Vec<JoinHandle<()>>,
    closed: bool,
}

impl SyntheticCameraDriver {
    pub fn open(config: CameraConfig) -> Result<Self, CameraError> {
        info!(
            "open synthetic camera (width: {}, height: {}, format: {:?})",
            config.width, config.height, config.pixel_format
        );
        Ok(Self {
            config,
            slot: Arc::new(ImageSlot::new()),
            pending: Vec::new(),
            closed: false,
        })
    }

    fn reap_finished(&mut self) {
        let (done, running): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|h| h.is_finished());
        self.pending = running;
        for handle in done {
            let _ = handle.join();
        }
    }
}

impl dogma::Named for SyntheticCameraDriver {
    fn name(&self) -> Cow<'_, str> {
        "synthetic".into()
    }
}

impl CameraDriver for SyntheticCameraDriver {
    fn backend(&self) -> CameraBackend {
        CameraBackend::Synthetic
    }

    fn capture(&mut self) -> Result<(), CameraError> {
        if self.closed {
            return Err(CameraError::Closed);
        }
        self.reap_finished();

        let slot = Arc::clone(&self.slot);
        let (width, height, format) = (
            self.config.width,
            self.config.height,
            self.config.pixel_format,
        );
        let handle = std::thread::Builder::new()
            .name("synthetic-capture".into())
            .spawn(move || match render(width, height, format) {
                Ok(frame) => {
                    slot.replace(frame);
                },
                Err(err) => error!("failed to render test pattern: {err}"),
            })
            .map_err(|e| CameraError::driver("spawning capture thread", e))?;
        self.pending.push(handle);
        Ok(())
    }

    fn frame_generation(&self) -> u64 {
        self.slot.generation()
    }

    fn wait_for_frame(&self, seen: u64, timeout: Duration) -> bool {
        self.slot.wait_newer(seen, timeout)
    }

    fn latest_frame(&self) -> Result<Option<Frame>, CameraError> {
        if self.closed {
            return Err(CameraError::Closed);
        }
        let frame = self.slot.with_latest(Frame::clone);
        if self.config.diagnostics {
            if let Some(frame) = &frame {
                info!("synthetic image: {}", frame.describe());
            }
        }
        Ok(frame)
    }

    fn close(&mut self) -> Result<(), CameraError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        for handle in self.pending.drain(..) {
            let _ = handle.join();
        }
        self.slot.clear();
        info!("synthetic camera closed");
        Ok(())
    }
}

impl Drop for SyntheticCameraDriver {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Horizontal red ramp over a vertical green ramp.
fn render(width: u32, height: u32, format: PixelFormat) -> Result<Frame, CameraError> {
    let (w, h) = (width as usize, height as usize);
    let ramp = |pos: usize, len: usize| ((pos * 255) / len.saturating_sub(1).max(1)) as u8;

    let frame = match format {
        PixelFormat::Rgba8 => {
            let mut data = Vec::with_capacity(w * h * 4);
            for y in 0..h {
                for x in 0..w {
                    data.extend_from_slice(&[ramp(x, w), ramp(y, h), 0, 0xff]);
                }
            }
            Frame::new_rgba(data, width, height, w * 4)
        },
        PixelFormat::Yuv420 => {
            let mut data = Vec::with_capacity(w * h);
            for _y in 0..h {
                for x in 0..w {
                    data.push(ramp(x, w));
                }
            }
            Frame::new_luma(data, width, height, w)
        },
        PixelFormat::Jpeg => {
            let mut rgb = Vec::with_capacity(w * h * 3);
            for y in 0..h {
                for x in 0..w {
                    rgb.extend_from_slice(&[ramp(x, w), ramp(y, h), 0]);
                }
            }
            let mut encoded = Vec::new();
            JpegEncoder::new_with_quality(&mut encoded, 90).write_image(
                &rgb,
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
            Frame::new_jpeg(Bytes::from(encoded), width, height)
        },
    };

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    Ok(frame.with_timestamp(now))
}
