// This is free and unencumbered software released into the public domain.

use super::{Camera, CameraBackend, CameraConfig, CameraDriver, CameraError};

/// Where frames come from, parsed from a device URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceUrl {
    /// The platform's own camera stack.
    Default,
    /// `android` or `android:<index>`.
    Android(Option<u32>),
    /// `synthetic`: a generated test pattern.
    Synthetic,
}

impl DeviceUrl {
    pub fn parse(input: &str) -> Result<Self, CameraError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::Default);
        }
        let (scheme, rest) = match input.split_once(':') {
            Some((scheme, rest)) => (scheme, rest.trim()),
            None => (input, ""),
        };
        match scheme {
            "android" if rest.is_empty() => Ok(Self::Android(None)),
            "android" => rest
                .parse()
                .map(|index| Self::Android(Some(index)))
                .map_err(|_| CameraError::invalid_config(format!("invalid camera index: {rest}"))),
            "synthetic" => Ok(Self::Synthetic),
            _ => Err(CameraError::unsupported(format!("device URL: {input}"))),
        }
    }
}

/// Opens a camera for `device`, falling back to `config.device` when empty.
pub fn open_camera(device: impl AsRef<str>, config: CameraConfig) -> Result<Camera, CameraError> {
    config.validate()?;
    let device = match device.as_ref().trim() {
        "" => config.device.clone().unwrap_or_default(),
        device => device.to_string(),
    };

    let driver = open_driver(DeviceUrl::parse(&device)?, config.clone())?;
    Camera::new(driver, config)
}

fn open_driver(url: DeviceUrl, config: CameraConfig) -> Result<Box<dyn CameraDriver>, CameraError> {
    match url {
        DeviceUrl::Synthetic => Ok(Box::new(
            super::drivers::synthetic::SyntheticCameraDriver::open(config)?,
        )),
        DeviceUrl::Android(index) => {
            let config = match index {
                Some(index) => config.with_index(index),
                None => config,
            };
            open_platform(config)
        },
        DeviceUrl::Default => open_platform(config),
    }
}

#[cfg(target_os = "android")]
fn open_platform(config: CameraConfig) -> Result<Box<dyn CameraDriver>, CameraError> {
    Ok(Box::new(super::drivers::ndk::AndroidCameraDriver::open(config)?))
}

#[cfg(not(target_os = "android"))]
fn open_platform(_config: CameraConfig) -> Result<Box<dyn CameraDriver>, CameraError> {
    Err(CameraError::NoDriver)
}

/// A camera that [`open_camera`] can open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Device URL to pass to [`open_camera`].
    pub url: String,
    /// Platform identifier of the camera.
    pub id: String,
    pub backend: CameraBackend,
}

/// Enumerates platform cameras, followed by the synthetic source.
pub fn list_devices() -> Result<Vec<DeviceInfo>, CameraError> {
    let mut devices = platform_devices()?;
    devices.push(DeviceInfo {
        url: "synthetic".into(),
        id: "synthetic".into(),
        backend: CameraBackend::Synthetic,
    });
    Ok(devices)
}

#[cfg(target_os = "android")]
fn platform_devices() -> Result<Vec<DeviceInfo>, CameraError> {
    Ok(super::drivers::ndk::camera_ids()?
        .into_iter()
        .enumerate()
        .map(|(index, id)| DeviceInfo {
            url: format!("android:{index}"),
            id,
            backend: CameraBackend::Android,
        })
        .collect())
}

#[cfg(not(target_os = "android"))]
fn platform_devices() -> Result<Vec<DeviceInfo>, CameraError> {
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_urls() {
        assert_eq!(DeviceUrl::parse("").unwrap(), DeviceUrl::Default);
        assert_eq!(DeviceUrl::parse("android").unwrap(), DeviceUrl::Android(None));
        assert_eq!(
            DeviceUrl::parse("android:1").unwrap(),
            DeviceUrl::Android(Some(1))
        );
        assert_eq!(DeviceUrl::parse(" synthetic: ").unwrap(), DeviceUrl::Synthetic);
    }

    #[test]
    fn rejects_bad_device_urls() {
        assert!(matches!(
            DeviceUrl::parse("android:back"),
            Err(CameraError::InvalidConfig(_))
        ));
        assert!(matches!(
            DeviceUrl::parse("file:/dev/video0"),
            Err(CameraError::Unsupported(_))
        ));
    }

    #[test]
    fn invalid_config_is_rejected_before_opening() {
        let config = CameraConfig::new(0, 480);
        assert!(matches!(
            open_camera("synthetic", config),
            Err(CameraError::InvalidConfig(_))
        ));
    }

    #[test]
    fn falls_back_to_the_configured_device() {
        let config = CameraConfig::new(8, 8).with_device("synthetic");
        let camera = open_camera("", config).unwrap();
        assert_eq!(camera.backend(), crate::shared::CameraBackend::Synthetic);
    }

    #[test]
    fn synthetic_source_is_always_listed() {
        let devices = list_devices().unwrap();
        let last = devices.last().unwrap();
        assert_eq!(last.url, "synthetic");
        assert_eq!(DeviceUrl::parse(&last.url).unwrap(), DeviceUrl::Synthetic);
    }

    #[cfg(not(target_os = "android"))]
    #[test]
    fn no_platform_driver_off_device() {
        assert!(matches!(
            open_camera("", CameraConfig::default()),
            Err(CameraError::NoDriver)
        ));
        assert!(matches!(
            open_camera("android:0", CameraConfig::default()),
            Err(CameraError::NoDriver)
        ));
    }
}
