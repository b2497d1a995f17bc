use std::fs;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use image::{ImageBuffer, Rgb};
use log::{debug, error, info, LevelFilter};

use progressive_pt::raytracing::camera::OrbitCamera;
use progressive_pt::raytracing::core::SceneDescription;
use progressive_pt::raytracing::frame::{FrameDriver, FrameInput};
use progressive_pt::raytracing::integrator::TraceSettings;
use progressive_pt::raytracing::parser::{CameraSpec, SceneFile, SceneParser};
use progressive_pt::raytracing::{Result, Vec3};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// the scene file; the built-in scene is rendered when omitted
    scene: Option<String>,
    /// where the averaged image is saved
    #[arg(short, long, default_value = "output.png")]
    output: String,
    /// the number of progressive frames (one sample per pixel each)
    #[arg(short, long, default_value_t = 64)]
    frames: u32,
    /// override the image width of the scene file
    #[arg(long)]
    width: Option<u32>,
    /// override the image height of the scene file
    #[arg(long)]
    height: Option<u32>,
    /// maximum surface interactions per path
    #[arg(long, default_value_t = 20)]
    bounces: u32,
    /// albedo multiplier applied at every bounce
    #[arg(long, default_value_t = 0.7)]
    decay: f64,
    /// sample pixel centers instead of jittered positions
    #[arg(long)]
    no_jitter: bool,
    /// seed for the per-frame random values
    #[arg(long)]
    seed: Option<u64>,
    /// camera orbit change applied per frame, in radians
    #[arg(long, default_value_t = 0.0)]
    orbit: f64,
    /// how many leading frames receive the orbit change
    #[arg(long, default_value_t = 1)]
    orbit_frames: u32,
    /// animation angle advance per frame, in radians
    #[arg(long, default_value_t = 0.0)]
    animate: f64,
    /// apply gamma correction to the final image
    #[arg(long, default_value = "false")]
    gamma_correction: bool,
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

fn gamma_correction(value: f64) -> f64 {
    if value > 0.0 {
        value.powf(1.0 / 2.2)
    } else {
        0.0
    }
}

fn to_rgb(value: Vec3) -> Rgb<u8> {
    let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb([channel(value.x), channel(value.y), channel(value.z)])
}

fn load_scene(path: Option<&str>) -> Result<SceneFile> {
    let Some(path) = path else {
        info!("no scene file given, rendering the built-in scene");
        return Ok(SceneFile {
            width: 640,
            height: 360,
            camera: CameraSpec::default(),
            scene: SceneDescription::reference(),
        });
    };

    let content = fs::read_to_string(path)?;
    let mut parser = SceneParser::new(&content);
    match parser.parse_scene() {
        Ok(file) => {
            info!("loaded {} ({} spheres)", path, file.scene.spheres.len());
            Ok(file)
        }
        Err(parser_error) => {
            error!("{}", parser_error.error_location(&content));
            Err(parser_error.into())
        }
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    render(&args)?;
    Ok(())
}

fn render(args: &Args) -> Result<()> {
    let SceneFile {
        width,
        height,
        camera,
        scene,
    } = load_scene(args.scene.as_deref())?;
    let width = args.width.unwrap_or(width);
    let height = args.height.unwrap_or(height);

    let settings = TraceSettings {
        max_bounces: args.bounces,
        decay: args.decay,
        jitter: !args.no_jitter,
        ..TraceSettings::default()
    };
    let orbit = OrbitCamera::new(
        camera.look_from,
        camera.look_at,
        camera.up,
        camera.vertical_fov_degrees,
        width as f64 / height.max(1) as f64,
    )?;
    let mut driver = FrameDriver::new(scene, orbit, width, height, settings, args.seed)?;
    info!(
        "rendering {}x{}, {} frames, {} bounces",
        width, height, args.frames, settings.max_bounces
    );

    let start = Instant::now();
    for frame in 0..args.frames {
        let input = FrameInput {
            motion_delta: if frame < args.orbit_frames {
                args.orbit
            } else {
                0.0
            },
            animation_angle: args.animate * frame as f64,
        };
        let report = driver.render_frame(input);
        debug!(
            "frame {}: {} samples{}",
            report.frame_index,
            report.sample_count,
            if report.reset { " (reset)" } else { "" }
        );
    }
    let total_time = start.elapsed();

    let pixels = driver.normalized_image();
    let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(width, height, |x, y| {
        let p = pixels[y as usize * width as usize + x as usize];
        if args.gamma_correction {
            to_rgb(p.map(gamma_correction))
        } else {
            to_rgb(p)
        }
    });
    buffer.save(&args.output)?;

    info!(
        "rendered {} in {:?} ({} samples per pixel)",
        args.output,
        total_time,
        driver.sample_count()
    );
    Ok(())
}
