// run parameters and the coordinate window shared by every benchmark mode

use crate::shape::VecLevel;
use serde::Serialize;

/// Largest per-axis sample count the vectorized engine accepts. Lane indices
/// are carried as f32, which represents every integer below 2^24 exactly.
pub const MAX_VEC_SAMPLES: usize = 4096;

/// Threshold used by the ascii preview.
pub const THRESHOLD: f32 = 0.5;

/// Coordinate window covered by the whole grid: `[offset, offset + scale)` on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Window {
    pub scale_x: f32,
    pub scale_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for Window {
    // [-2, 2) x [-2, 2), wide enough to show every shape's boundary
    fn default() -> Self {
        Window {
            scale_x: 4.0,
            scale_y: 4.0,
            offset_x: -2.0,
            offset_y: -2.0,
        }
    }
}

impl Window {
    pub fn new(scale_x: f32, scale_y: f32, offset_x: f32, offset_y: f32) -> Self {
        Window {
            scale_x,
            scale_y,
            offset_x,
            offset_y,
        }
    }

    /// Sub-window of the pixel at `(x, y)` when this window is split into `size` x `size` cells.
    #[inline]
    pub fn cell(&self, size: usize, x: usize, y: usize) -> Window {
        let scale_x_p = self.scale_x / size as f32;
        let scale_y_p = self.scale_y / size as f32;
        Window {
            scale_x: scale_x_p,
            scale_y: scale_y_p,
            offset_x: self.offset_x + x as f32 * scale_x_p,
            offset_y: self.offset_y + y as f32 * scale_y_p,
        }
    }
}

/// Immutable description of one benchmark run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunParams {
    pub vec_level: VecLevel,
    pub samples: usize,
    pub size: usize,
    pub threads: usize,
}

impl RunParams {
    /// Validates and builds run parameters. Invalid combinations are rejected
    /// here so the schedulers never start threads on bad input.
    pub fn new(vec_level: VecLevel, samples: usize, size: usize, threads: usize) -> Result<Self, String> {
        if size == 0 {
            return Err("grid size must be at least 1".to_string());
        }
        if samples == 0 {
            return Err("samples per axis must be at least 1".to_string());
        }
        if threads == 0 {
            return Err("thread count must be at least 1".to_string());
        }
        if vec_level == VecLevel::Avx2 && samples > MAX_VEC_SAMPLES {
            return Err(format!(
                "vectorized evaluation supports at most {} samples per axis, got {}",
                MAX_VEC_SAMPLES, samples
            ));
        }

        // every product the engine and the reports take later must fit
        let samples2 = samples
            .checked_mul(samples)
            .ok_or_else(|| format!("samples per axis ({}) too large, samples^2 overflows", samples))?;
        size
            .checked_mul(size)
            .ok_or_else(|| format!("grid size ({}) too large, size^2 overflows", size))?;
        (samples as u64)
            .checked_mul(size as u64)
            .and_then(|n| n.checked_mul(n))
            .ok_or_else(|| {
                format!(
                    "samples ({}) x size ({}) too large, total calculation count overflows",
                    samples, size
                )
            })?;

        if samples2 % vec_level.width() != 0 {
            return Err(format!(
                "samples^2 ({}) must be a multiple of {} for vectorized evaluation",
                samples2,
                vec_level.width()
            ));
        }
        Ok(RunParams {
            vec_level,
            samples,
            size,
            threads,
        })
    }

    /// Same parameters with a different thread count.
    pub fn with_threads(&self, threads: usize) -> Result<Self, String> {
        RunParams::new(self.vec_level, self.samples, self.size, threads)
    }

    pub fn pixel_count(&self) -> usize {
        self.size * self.size
    }

    // total number of shape evaluations in one multisample run
    pub fn total_calculations(&self) -> u64 {
        let n = (self.samples * self.size) as u64;
        n * n
    }
}
