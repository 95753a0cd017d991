// --- grid storage ---
//
// `SharedGrid` is what the workers write into while a run is in flight: one
// atomic slot per pixel, so index-partitioned writes need no lock. once all
// workers have joined it is frozen into a plain `Grid`.

use crate::params::THRESHOLD;
use std::sync::atomic::{AtomicU32, Ordering};

/// Finished size x size grid of per-pixel averages, index = x + y * size.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    size: usize,
    values: Vec<f32>,
}

impl Grid {
    pub(crate) fn from_values(size: usize, values: Vec<f32>) -> Self {
        assert_eq!(values.len(), size * size, "grid needs size^2 values");
        Grid { size, values }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[x + y * self.size]
    }

    /// Mean of all pixel values ("avg value" in the run report).
    pub fn mean(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f32>() / self.values.len() as f32
    }

    /// Thresholded preview, highest row first so +y points up.
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity(self.size * (self.size * 2 + 1));
        for y in (0..self.size).rev() {
            for x in 0..self.size {
                out.push_str(if self.get(x, y) > THRESHOLD { "X " } else { ". " });
            }
            out.push('\n');
        }
        out
    }
}

/// Grid under construction, shared by reference between worker threads.
pub struct SharedGrid {
    size: usize,
    slots: Vec<AtomicU32>,
}

impl SharedGrid {
    pub fn new(size: usize) -> Self {
        let slots = (0..size * size).map(|_| AtomicU32::new(0f32.to_bits())).collect();
        SharedGrid { size, slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // relaxed is enough: the thread join that precedes `into_grid` orders every store
    #[inline]
    pub fn store(&self, index: usize, value: f32) {
        self.slots[index].store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn into_grid(self) -> Grid {
        let values = self
            .slots
            .into_iter()
            .map(|slot| f32::from_bits(slot.into_inner()))
            .collect();
        Grid {
            size: self.size,
            values,
        }
    }
}
