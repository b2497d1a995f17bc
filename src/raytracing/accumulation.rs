use rayon::prelude::*;

use super::math::Vec3;
use super::sampler::PixelCoord;

/// Running per-pixel radiance sums plus one sample counter shared by all
/// pixels. Row 0 is the top of the image.
#[derive(Debug, Clone)]
pub struct AccumulationBuffer {
    width: u32,
    height: u32,
    sum: Vec<Vec3>,
    count: u32,
}

impl AccumulationBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        AccumulationBuffer {
            width,
            height,
            sum: vec![Vec3::ZERO; width as usize * height as usize],
            count: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Full frames accumulated since the last reset.
    pub fn sample_count(&self) -> u32 {
        self.count
    }

    #[inline(always)]
    fn index(&self, pixel: PixelCoord) -> usize {
        debug_assert!(pixel.x < self.width && pixel.y < self.height);
        pixel.y as usize * self.width as usize + pixel.x as usize
    }

    /// Adds radiance to one pixel. The counter only moves with
    /// `commit_frame`, once every pixel of the frame has its sample.
    pub fn add_sample(&mut self, pixel: PixelCoord, radiance: Vec3) {
        let index = self.index(pixel);
        self.sum[index] += radiance;
    }

    /// Saturates instead of wrapping on very long still runs.
    pub fn commit_frame(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    /// Samples every pixel once in parallel, then bumps the counter.
    pub fn accumulate_frame<F>(&mut self, sample: F)
    where
        F: Fn(PixelCoord) -> Vec3 + Sync,
    {
        let width = self.width as usize;
        if width > 0 {
            self.sum
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, sum) in row.iter_mut().enumerate() {
                        *sum += sample(PixelCoord::new(x as u32, y as u32));
                    }
                });
        }
        self.commit_frame();
    }

    pub fn reset(&mut self) {
        self.sum.fill(Vec3::ZERO);
        self.count = 0;
    }

    /// Reallocates for a new surface size; previous samples are dropped.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.sum = vec![Vec3::ZERO; width as usize * height as usize];
        self.count = 0;
    }

    /// Mean radiance of a pixel, black before the first frame.
    pub fn normalized_output(&self, pixel: PixelCoord) -> Vec3 {
        if self.count == 0 {
            return Vec3::ZERO;
        }
        self.sum[self.index(pixel)] / self.count as f64
    }

    /// Mean radiance of every pixel in row-major order.
    pub fn normalized_image(&self) -> Vec<Vec3> {
        if self.count == 0 {
            return vec![Vec3::ZERO; self.sum.len()];
        }
        let scale = 1.0 / self.count as f64;
        self.sum.par_iter().map(|sum| *sum * scale).collect()
    }
}
