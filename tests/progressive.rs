use progressive_pt::raytracing::camera::OrbitCamera;
use progressive_pt::raytracing::core::SceneDescription;
use progressive_pt::raytracing::frame::{FrameDriver, FrameInput};
use progressive_pt::raytracing::integrator::{sky_gradient, TraceSettings};
use progressive_pt::raytracing::parser::{CameraSpec, SceneParser};
use progressive_pt::raytracing::sampler::{FrameSeed, PixelCoord};
use progressive_pt::raytracing::Vec3;

const WIDTH: u32 = 8;
const HEIGHT: u32 = 6;

fn reference_driver(seed: u64) -> FrameDriver {
    let spec = CameraSpec::default();
    let camera = OrbitCamera::new(
        spec.look_from,
        spec.look_at,
        spec.up,
        spec.vertical_fov_degrees,
        WIDTH as f64 / HEIGHT as f64,
    )
    .unwrap();
    FrameDriver::new(
        SceneDescription::reference(),
        camera,
        WIDTH,
        HEIGHT,
        TraceSettings::default(),
        Some(seed),
    )
    .unwrap()
}

fn squared_distance(a: &[Vec3], b: &[Vec3]) -> f64 {
    a.iter().zip(b).map(|(a, b)| (*a - *b).squared_len()).sum()
}

#[test]
fn test_running_average_settles() {
    let mut driver = reference_driver(1);
    let mut changes = Vec::new();
    let mut previous = driver.normalized_image();
    for frame in 1..=64 {
        let report = driver.render_frame(FrameInput::default());
        assert_eq!(report.sample_count, frame);
        let current = driver.normalized_image();
        if frame > 1 {
            changes.push(squared_distance(&current, &previous));
        }
        previous = current;
    }
    let early: f64 = changes[..4].iter().sum();
    let late: f64 = changes[changes.len() - 4..].iter().sum();
    assert!(late < early, "late {} early {}", late, early);
}

#[test]
fn test_independent_runs_agree_more_with_more_samples() {
    let runs = 6;
    let mut after_two = Vec::new();
    let mut after_many = Vec::new();
    for seed in 0..runs {
        let mut driver = reference_driver(100 + seed);
        for frame in 1..=48 {
            driver.render_frame(FrameInput::default());
            if frame == 2 {
                after_two.push(driver.normalized_image());
            }
        }
        after_many.push(driver.normalized_image());
    }

    let spread = |images: &[Vec<Vec3>]| -> f64 {
        let pixels = images[0].len();
        let mut total = 0.0;
        for p in 0..pixels {
            let mean = images.iter().map(|img| img[p]).fold(Vec3::ZERO, |a, b| a + b)
                / images.len() as f64;
            total += images.iter().map(|img| (img[p] - mean).squared_len()).sum::<f64>();
        }
        total
    };
    assert!(spread(&after_many) < spread(&after_two));
}

#[test]
fn test_camera_motion_resets_to_one_sample() {
    let mut driver = reference_driver(9);
    for _ in 0..10 {
        driver.render_frame(FrameInput::default());
    }
    assert_eq!(driver.sample_count(), 10);

    for delta in [0.3, -0.05, 1.0] {
        let report = driver.render_frame(FrameInput {
            motion_delta: delta,
            animation_angle: 0.0,
        });
        assert!(report.reset);
        assert_eq!(driver.sample_count(), 1);
        driver.render_frame(FrameInput::default());
        assert_eq!(driver.sample_count(), 2);
    }
}

#[test]
fn test_empty_scene_file_renders_sky() {
    let content = "size 4 4\ncamera from (0, 0, 0) to (0, 0, -1) fov 60\n";
    let file = SceneParser::new(content).parse_scene().unwrap();
    let camera = OrbitCamera::new(
        file.camera.look_from,
        file.camera.look_at,
        file.camera.up,
        file.camera.vertical_fov_degrees,
        1.0,
    )
    .unwrap();
    let settings = TraceSettings {
        jitter: false,
        ..TraceSettings::default()
    };
    let mut driver =
        FrameDriver::new(file.scene, camera, file.width, file.height, settings, Some(3)).unwrap();
    driver.render_frame(FrameInput::default());
    driver.render_frame(FrameInput::default());

    for y in 0..file.height {
        for x in 0..file.width {
            let pixel = PixelCoord::new(x, y);
            let ray = driver.primary_ray(pixel, FrameSeed(Vec3::ZERO));
            let expected = sky_gradient(ray.direction);
            assert!((driver.normalized_output(pixel) - expected).len() < 1e-12);
        }
    }
}

#[test]
fn test_non_finite_scene_values_are_rejected_before_rendering() {
    for content in [
        "size 4 4\nsphere (nan, 0, -5) 0.5 red",
        "size 4 4\nsphere orbit (0, 0, -1) inf 0.3 white",
        "size 4 4\nsphere (0, 0, -1) 0.5 emissive: (inf, 0, 0)",
    ] {
        let file = SceneParser::new(content).parse_scene().unwrap();
        let camera = OrbitCamera::new(
            file.camera.look_from,
            file.camera.look_at,
            file.camera.up,
            file.camera.vertical_fov_degrees,
            1.0,
        )
        .unwrap();
        let driver = FrameDriver::new(
            file.scene,
            camera,
            file.width,
            file.height,
            TraceSettings::default(),
            Some(1),
        );
        assert!(driver.is_err(), "accepted {:?}", content);
    }
}
