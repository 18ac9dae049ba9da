// This is free and unencumbered software released into the public domain.

#[cfg(not(feature = "std"))]
compile_error!("droid-camera-cataloger requires the 'std' feature");

use asimov_module::SysexitsError::{self, *};
use clap::Parser;
use droid_camera::{
    cli::{handle_error, info_user, warn_user},
    shared::{CameraError, DeviceInfo, list_devices},
};
use clientele::StandardOptions;
use serde_json::json;
use std::error::Error as StdError;

/// Lists the cameras that can be opened.
#[derive(Debug, Parser)]
struct Options {
    #[clap(flatten)]
    flags: StandardOptions,

    #[arg(
        value_name = "FORMAT",
        short = 'o',
        long = "output",
        value_enum,
        default_value = "text"
    )]
    output: OutputFormat,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Jsonl,
}

pub fn main() -> Result<SysexitsError, Box<dyn StdError>> {
    asimov_module::dotenv().ok();
    let args = asimov_module::args_os()?;
    let options = Options::parse_from(args);

    if options.flags.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(EX_OK);
    }

    if options.flags.license {
        print!("{}", include_str!("../../UNLICENSE"));
        return Ok(EX_OK);
    }

    #[cfg(feature = "tracing")]
    asimov_module::init_tracing_subscriber(&options.flags).expect("failed to initialize logging");

    let exit_code = match run_cataloger(&options) {
        Ok(()) => EX_OK,
        Err(err) => handle_error(&err, &options.flags),
    };

    Ok(exit_code)
}

fn run_cataloger(options: &Options) -> Result<(), CameraError> {
    info_user(&options.flags, "enumerating camera devices");

    let devices = list_devices()?;
    if devices.is_empty() {
        warn_user(&options.flags, "no camera devices found");
        return Ok(());
    }

    for device in &devices {
        println!("{}", format_device(device, &options.output));
    }

    Ok(())
}

fn format_device(device: &DeviceInfo, output: &OutputFormat) -> String {
    match output {
        OutputFormat::Text => format!("{}: {} [{}]", device.url, device.id, device.backend),
        OutputFormat::Jsonl => json!({
            "url": device.url,
            "id": device.id,
            "backend": device.backend.to_string(),
        })
        .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droid_camera::shared::CameraBackend;

    fn device() -> DeviceInfo {
        DeviceInfo {
            url: "android:1".into(),
            id: "1".into(),
            backend: CameraBackend::Android,
        }
    }

    #[test]
    fn formats_text_lines() {
        assert_eq!(format_device(&device(), &OutputFormat::Text), "android:1: 1 [android]");
    }

    #[test]
    fn formats_json_lines() {
        let line = format_device(&device(), &OutputFormat::Jsonl);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["url"], "android:1");
        assert_eq!(value["backend"], "android");
    }
}
