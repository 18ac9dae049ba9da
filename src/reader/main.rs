// This is free and unencumbered software released into the public domain.

#[cfg(not(feature = "std"))]
compile_error!("droid-camera-reader requires the 'std' feature");

use asimov_module::SysexitsError::{self, *};
use clap::Parser;
use clientele::StandardOptions;
use droid_camera::{
    cli::{handle_error, info_user, warn_user_with_error},
    shared::{CameraConfig, CameraError, PixelFormat, open_camera},
};
use know::traits::ToJsonLd;
use std::{
    error::Error as StdError,
    io::{self, Write},
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

/// Captures images and writes each as a JSON-LD line to stdout.
#[derive(Debug, Parser)]
struct Options {
    #[clap(flatten)]
    flags: StandardOptions,

    /// Device URL: `android:<index>` or `synthetic`
    #[arg(long)]
    device: Option<String>,

    /// Camera index when no device URL is given
    #[arg(short, long)]
    index: Option<u32>,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long = "size", value_parser = parse_dimensions)]
    size: Option<(u32, u32)>,

    /// Clockwise rotation in degrees, a multiple of 90
    #[arg(short, long, allow_negative_numbers = true)]
    rotate: Option<i32>,

    #[arg(long, value_enum)]
    format: Option<PixelFormat>,

    /// Captures per second
    #[arg(short, long, value_parser = parse_frequency, default_value = "1")]
    frequency: f64,

    /// Stop after this many images
    #[arg(short = 'n', long)]
    count: Option<u64>,

    /// Include each image's capture timestamp in the output
    #[arg(short, long)]
    timestamp: bool,
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

    let exit_code = match run_reader(&options) {
        Ok(()) => EX_OK,
        Err(err) => handle_error(&err, &options.flags),
    };

    Ok(exit_code)
}

fn load_config(opts: &Options) -> Result<CameraConfig, CameraError> {
    let mut config = match &opts.config {
        Some(path) => {
            let input = std::fs::read_to_string(path)
                .map_err(|e| CameraError::driver("reading the configuration file", e))?;
            CameraConfig::from_json(&input)?
        },
        None => CameraConfig::default(),
    };

    if let Some(device) = &opts.device {
        config = config.with_device(device.clone());
    }
    if let Some(index) = opts.index {
        config = config.with_index(index);
    }
    if let Some((width, height)) = opts.size {
        config.width = width;
        config.height = height;
    }
    if let Some(rotate) = opts.rotate {
        config = config.with_rotate(rotate);
    }
    if let Some(format) = opts.format {
        config = config.with_pixel_format(format);
    }
    if opts.timestamp {
        config = config.with_timestamp(true);
    }
    config = config.with_diagnostics(opts.flags.debug || opts.flags.verbose >= 3);

    config.validate()?;
    Ok(config)
}

fn run_reader(opts: &Options) -> Result<(), CameraError> {
    info_user(&opts.flags, "starting camera reader");

    let quit = Arc::new(AtomicBool::new(false));
    {
        let quit2 = Arc::clone(&quit);
        ctrlc::set_handler(move || {
            quit2.store(true, Ordering::SeqCst);
        })
        .map_err(|e| CameraError::other(format!("{e}")))?;
    }

    let config = load_config(opts)?;
    let source = config.device.clone().unwrap_or_else(|| format!("android:{}", config.index));
    info_user(
        &opts.flags,
        &format!(
            "opening {source} at {}x{} ({:?})",
            config.width, config.height, config.pixel_format
        ),
    );

    let mut camera = open_camera("", config.clone())?;
    let interval = Duration::from_secs_f64(1.0 / opts.frequency);
    let mut emitted = 0u64;

    while !quit.load(Ordering::SeqCst) {
        if opts.count.is_some_and(|count| emitted >= count) {
            break;
        }
        let started = Instant::now();

        match camera.next_frame() {
            Ok(frame) => {
                let image = camera.decode(&frame)?.to_rgb8();
                let timestamp = config.timestamp.then_some(frame.timestamp_ns);
                if !emit(image_record(&source, image, timestamp)?)? {
                    break;
                }
                emitted += 1;
            },
            Err(CameraError::NoImage) => {
                warn_user_with_error(&opts.flags, "skipping capture", &CameraError::NoImage);
            },
            Err(err) => return Err(err),
        }

        if let Some(rest) = interval.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    camera.close()?;
    info_user(&opts.flags, &format!("captured {emitted} images"));
    Ok(())
}

/// Builds the JSON-LD record for one image, with the capture timestamp when
/// requested.
fn image_record(
    source: &str,
    image: image::RgbImage,
    timestamp_ns: Option<u64>,
) -> Result<serde_json::Value, CameraError> {
    let ts_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs();

    let img = know::classes::Image {
        id: Some(format!("{source}#{ts_secs}")),
        width: Some(image.width() as _),
        height: Some(image.height() as _),
        data: image.into_raw(),
        source: Some(source.to_string()),
    };

    let mut json = img
        .to_jsonld()
        .map_err(|e| CameraError::other(format!("{e}")))?;
    if let (Some(timestamp_ns), Some(record)) = (timestamp_ns, json.as_object_mut()) {
        record.insert("timestamp_ns".into(), timestamp_ns.into());
    }
    Ok(json)
}

/// Writes one record as a line. Returns `false` once stdout is closed.
fn emit(json: serde_json::Value) -> Result<bool, CameraError> {
    let mut out = io::stdout().lock();
    match writeln!(&mut out, "{json}") {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(false),
        Err(err) => Err(CameraError::driver("writing to stdout", err)),
    }
}

fn parse_dimensions(s: &str) -> Result<(u32, u32), String> {
    let s = s.trim().replace('×', "x");
    let parts: Vec<&str> = s.split('x').map(|t| t.trim()).collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(format!("Invalid format '{s}'. Use WxH (e.g., 1920x1080)"));
    }

    let width: u32 = parts[0].parse().map_err(|_| format!("Invalid width: {}", parts[0]))?;
    let height: u32 = parts[1].parse().map_err(|_| format!("Invalid height: {}", parts[1]))?;

    if width == 0 || height == 0 {
        return Err("Width and height must be greater than 0".to_string());
    }

    Ok((width, height))
}

fn parse_frequency(s: &str) -> Result<f64, String> {
    let freq: f64 = s.parse().map_err(|_| format!("Invalid frequency: {s}"))?;

    if !freq.is_finite() || freq <= 0.0 {
        return Err("Frequency must be positive".to_string());
    }
    if freq > 60.0 {
        return Err(format!("Frequency {freq} Hz exceeds reasonable maximum (60 Hz)"));
    }

    Ok(freq)
}
