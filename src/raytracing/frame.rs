//! Per-frame orchestration of the progressive renderer.
//!
//! Each call to [`FrameDriver::render_frame`] adds exactly one jittered sample
//! to every pixel. Camera motion restarts the average at the frame boundary.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::accumulation::AccumulationBuffer;
use super::camera::{CameraBasis, OrbitCamera};
use super::core::SceneDescription;
use super::error::{Error, Result};
use super::integrator::{trace, TraceSettings};
use super::math::{Ray, Vec3};
use super::sampler::{pixel_jitter, FrameSeed, PixelCoord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulationState {
    /// Samples add to the running average
    Accumulating,
    /// The next frame starts from an empty buffer
    Reset,
}

/// What the host loop feeds into a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Orbit-angle change since the last frame, radians
    pub motion_delta: f64,
    /// Animation angle for time-driven sphere centers
    pub animation_angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    pub sample_count: u32,
    /// Whether this frame started from an empty buffer
    pub reset: bool,
    pub seed: FrameSeed,
}

/// Screen mapping of one frame, copied out so pixels can be sampled while
/// the buffer is borrowed mutably.
#[derive(Debug, Clone, Copy)]
struct PixelRays {
    basis: CameraBasis,
    width: u32,
    height: u32,
    jitter: bool,
}

impl PixelRays {
    fn ray(&self, pixel: PixelCoord, seed: FrameSeed) -> Ray {
        let (jx, jy) = if self.jitter {
            pixel_jitter(pixel, seed)
        } else {
            (0.5, 0.5)
        };
        // screen t grows upwards, buffer rows grow downwards
        let row_from_bottom = (self.height - 1 - pixel.y) as f64;
        let s = (pixel.x as f64 + jx) / self.width as f64;
        let t = (row_from_bottom + jy) / self.height as f64;
        self.basis.generate_ray(s, t)
    }
}

pub struct FrameDriver {
    scene: SceneDescription,
    camera: OrbitCamera,
    basis: CameraBasis,
    settings: TraceSettings,
    buffer: AccumulationBuffer,
    state: AccumulationState,
    rng: StdRng,
    frame_index: u64,
}

impl FrameDriver {
    /// Validates the whole configuration up front; frames cannot fail later.
    /// A `seed` makes the sequence of frame seeds reproducible.
    pub fn new(
        scene: SceneDescription,
        camera: OrbitCamera,
        width: u32,
        height: u32,
        settings: TraceSettings,
        seed: Option<u64>,
    ) -> Result<FrameDriver> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidSettings(format!(
                "render surface must not be empty, got {}x{}",
                width, height
            )));
        }
        settings.validate()?;
        scene.validate()?;
        let basis = camera.basis()?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        debug!(
            "frame driver ready: {}x{}, {} spheres, {:?}",
            width,
            height,
            scene.spheres.len(),
            settings
        );
        Ok(FrameDriver {
            scene,
            camera,
            basis,
            settings,
            buffer: AccumulationBuffer::new(width, height),
            state: AccumulationState::Reset,
            rng,
            frame_index: 0,
        })
    }

    pub fn state(&self) -> AccumulationState {
        self.state
    }

    pub fn basis(&self) -> &CameraBasis {
        &self.basis
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn settings(&self) -> &TraceSettings {
        &self.settings
    }

    pub fn buffer(&self) -> &AccumulationBuffer {
        &self.buffer
    }

    pub fn sample_count(&self) -> u32 {
        self.buffer.sample_count()
    }

    pub fn normalized_output(&self, pixel: PixelCoord) -> Vec3 {
        self.buffer.normalized_output(pixel)
    }

    pub fn normalized_image(&self) -> Vec<Vec3> {
        self.buffer.normalized_image()
    }

    /// Drops accumulated samples at the next frame boundary.
    pub fn reset(&mut self) {
        self.state = AccumulationState::Reset;
    }

    /// Follows a render-surface resize; the aspect ratio tracks the surface.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidSettings(format!(
                "render surface must not be empty, got {}x{}",
                width, height
            )));
        }
        self.basis = self
            .camera
            .set_aspect_ratio(width as f64 / height as f64)?;
        self.buffer.resize(width, height);
        self.state = AccumulationState::Reset;
        Ok(())
    }

    fn pixel_rays(&self) -> PixelRays {
        PixelRays {
            basis: self.basis,
            width: self.buffer.width(),
            height: self.buffer.height(),
            jitter: self.settings.jitter,
        }
    }

    /// Primary ray of `pixel` for the given frame seed.
    pub fn primary_ray(&self, pixel: PixelCoord, seed: FrameSeed) -> Ray {
        self.pixel_rays().ray(pixel, seed)
    }

    pub fn render_frame(&mut self, input: FrameInput) -> FrameReport {
        let seed = FrameSeed::random(&mut self.rng);
        self.render_frame_with_seed(input, seed)
    }

    /// Same as [`FrameDriver::render_frame`] with an explicit frame seed.
    pub fn render_frame_with_seed(&mut self, input: FrameInput, seed: FrameSeed) -> FrameReport {
        if input.motion_delta.abs() > self.settings.motion_epsilon {
            match self.camera.rotate(input.motion_delta) {
                Ok(basis) => self.basis = basis,
                Err(err) => warn!("ignoring camera motion {}: {}", input.motion_delta, err),
            }
            self.state = AccumulationState::Reset;
        }

        let reset = self.state == AccumulationState::Reset;
        if reset {
            debug!("restarting accumulation at frame {}", self.frame_index);
            self.buffer.reset();
        }

        let scene = self.scene.at(input.animation_angle);
        let settings = self.settings;
        let rays = self.pixel_rays();
        self.buffer.accumulate_frame(|pixel| {
            trace(&scene, rays.ray(pixel, seed), pixel, seed, &settings)
        });

        self.state = AccumulationState::Accumulating;
        let report = FrameReport {
            frame_index: self.frame_index,
            sample_count: self.buffer.sample_count(),
            reset,
            seed,
        };
        self.frame_index += 1;
        log::trace!("{:?}", report);
        report
    }
}
