// --- sampling engine ---
//
// averages a shape over an S x S lattice of sub-samples inside one window.
// sample i sits at column i % S, row i / S, and the coordinate on each axis is
// `c * (scale / S) + offset`. both strategies compute coordinates with the same
// two float ops, so for 0/1 shapes they produce bit-identical averages.

use crate::grid::Grid;
use crate::params::Window;
use crate::shape::{Shape, VecLevel, LANES};
use wide::f32x8;

// lane k of a vector step handles flattened index base + k
const LANE_OFFSETS: [f32; LANES] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];

/// Mean shape membership over `samples` x `samples` points of `window`.
///
/// With [`VecLevel::Avx2`] the caller must guarantee `samples^2 % 8 == 0`
/// (enforced by `RunParams::new`); any remainder samples are not evaluated.
#[inline]
pub fn sample_average(shape: Shape, level: VecLevel, samples: usize, window: &Window) -> f32 {
    match level {
        VecLevel::Scalar => sample_average_scalar(shape, samples, window),
        VecLevel::Avx2 => sample_average_vec8(shape, samples, window),
    }
}

// the shape match is hoisted out of the hot loop: each arm gets its own
// monomorphized kernel with the predicate inlined.

pub fn sample_average_scalar(shape: Shape, samples: usize, window: &Window) -> f32 {
    match shape {
        Shape::Empty => scalar_kernel(samples, window, |x, y| Shape::Empty.eval_scalar(x, y)),
        Shape::Circle => scalar_kernel(samples, window, |x, y| Shape::Circle.eval_scalar(x, y)),
        Shape::Hyperbola => scalar_kernel(samples, window, |x, y| Shape::Hyperbola.eval_scalar(x, y)),
        Shape::Square => scalar_kernel(samples, window, |x, y| Shape::Square.eval_scalar(x, y)),
    }
}

pub fn sample_average_vec8(shape: Shape, samples: usize, window: &Window) -> f32 {
    match shape {
        Shape::Empty => vec8_kernel(samples, window, |x, y| Shape::Empty.eval_vec8(x, y)),
        Shape::Circle => vec8_kernel(samples, window, |x, y| Shape::Circle.eval_vec8(x, y)),
        Shape::Hyperbola => vec8_kernel(samples, window, |x, y| Shape::Hyperbola.eval_vec8(x, y)),
        Shape::Square => vec8_kernel(samples, window, |x, y| Shape::Square.eval_vec8(x, y)),
    }
}

#[inline(always)]
fn scalar_kernel<F: Fn(f32, f32) -> f32>(samples: usize, w: &Window, eval: F) -> f32 {
    let samples2 = samples * samples;
    let step_x = w.scale_x / samples as f32;
    let step_y = w.scale_y / samples as f32;

    let mut sum = 0.0f32;
    for i in 0..samples2 {
        let cx = i % samples;
        let cy = i / samples;

        let x = cx as f32 * step_x + w.offset_x;
        let y = cy as f32 * step_y + w.offset_y;

        sum += eval(x, y);
    }

    sum / samples2 as f32
}

#[inline(always)]
fn vec8_kernel<F: Fn(f32x8, f32x8) -> f32x8>(samples: usize, w: &Window, eval: F) -> f32 {
    let samples2 = samples * samples;
    debug_assert_eq!(samples2 % LANES, 0, "samples^2 must be a multiple of {}", LANES);

    let size_v = f32x8::splat(samples as f32);
    let step_x_v = f32x8::splat(w.scale_x / samples as f32);
    let step_y_v = f32x8::splat(w.scale_y / samples as f32);
    let offset_x_v = f32x8::splat(w.offset_x);
    let offset_y_v = f32x8::splat(w.offset_y);
    let advance_v = f32x8::splat(LANES as f32);

    let mut i_v = f32x8::from(LANE_OFFSETS);
    let mut sum_v = f32x8::ZERO;

    for _ in 0..samples2 / LANES {
        // cy = floor(i / S), cx = i - cy * S
        let cy_v = (i_v / size_v).floor();
        let cx_v = i_v - cy_v * size_v;

        let x_v = cx_v * step_x_v + offset_x_v;
        let y_v = cy_v * step_y_v + offset_y_v;

        sum_v += eval(x_v, y_v);
        i_v += advance_v;
    }

    sum_v.to_array().iter().sum::<f32>() / samples2 as f32
}

/// Point-sampled grid: one evaluation per pixel at the pixel's origin, no
/// averaging. Cheap enough to preview a shape before benchmarking it.
pub fn graph_direct(shape: Shape, level: VecLevel, size: usize, window: &Window) -> Grid {
    let size2 = size * size;
    let step_x = window.scale_x / size as f32;
    let step_y = window.scale_y / size as f32;
    let mut values = vec![0.0f32; size2];

    let mut start = 0;
    if level == VecLevel::Avx2 {
        let size_v = f32x8::splat(size as f32);
        let step_x_v = f32x8::splat(step_x);
        let step_y_v = f32x8::splat(step_y);
        let offset_x_v = f32x8::splat(window.offset_x);
        let offset_y_v = f32x8::splat(window.offset_y);

        for (n, chunk) in values.chunks_exact_mut(LANES).enumerate() {
            let i_v = f32x8::splat((n * LANES) as f32) + f32x8::from(LANE_OFFSETS);
            let cy_v = (i_v / size_v).floor();
            let cx_v = i_v - cy_v * size_v;
            let r_v = shape.eval_vec8(cx_v * step_x_v + offset_x_v, cy_v * step_y_v + offset_y_v);
            chunk.copy_from_slice(&r_v.to_array());
        }
        start = size2 - size2 % LANES;
    }

    // scalar mode, or the tail that does not fill a full vector
    for (i, value) in values.iter_mut().enumerate().skip(start) {
        let x = (i % size) as f32 * step_x + window.offset_x;
        let y = (i / size) as f32 * step_y + window.offset_y;
        *value = shape.eval_scalar(x, y);
    }

    Grid::from_values(size, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cell(x: f32, y: f32) -> Window {
        Window::new(1.0, 1.0, x, y)
    }

    #[test]
    fn test_fully_inside_and_outside() {
        // [0, 0.5) x [0, 0.5) lies inside every non-empty shape
        let inside = Window::new(0.5, 0.5, 0.0, 0.0);
        // [3, 4) x [3, 4) lies outside the circle and the square
        let outside = unit_cell(3.0, 3.0);
        for level in [VecLevel::Scalar, VecLevel::Avx2] {
            assert_eq!(sample_average(Shape::Circle, level, 8, &inside), 1.0);
            assert_eq!(sample_average(Shape::Square, level, 8, &inside), 1.0);
            assert_eq!(sample_average(Shape::Hyperbola, level, 8, &inside), 1.0);
            assert_eq!(sample_average(Shape::Circle, level, 8, &outside), 0.0);
            assert_eq!(sample_average(Shape::Square, level, 8, &outside), 0.0);
            assert_eq!(sample_average(Shape::Empty, level, 8, &inside), 0.0);
        }
    }

    #[test]
    fn test_square_edge_cell() {
        // cell [-1, 0)^2: the column and row at exactly -1 are outside the open square
        let w = unit_cell(-1.0, -1.0);
        let expected = (7.0 * 7.0) / 64.0;
        assert_eq!(sample_average_scalar(Shape::Square, 8, &w), expected);
        assert_eq!(sample_average_vec8(Shape::Square, 8, &w), expected);
    }

    #[test]
    fn test_lanes_straddle_rows() {
        // S = 4: each 8-lane step covers two rows of the lattice
        let w = Window::new(2.0, 2.0, -1.0, -1.0);
        for shape in Shape::ALL {
            assert_eq!(
                sample_average_scalar(shape, 4, &w),
                sample_average_vec8(shape, 4, &w),
                "{:?}",
                shape
            );
        }
    }

    #[test]
    fn test_scalar_handles_odd_samples() {
        let w = Window::new(0.5, 0.5, 0.0, 0.0);
        assert_eq!(sample_average_scalar(Shape::Circle, 3, &w), 1.0);
    }

    #[test]
    fn test_graph_direct_scalar_matches_vec8() {
        let w = Window::default();
        // 6^2 = 36 leaves a 4-pixel scalar tail in vec8 mode
        for size in [4, 6, 16] {
            for shape in Shape::ALL {
                let s = graph_direct(shape, VecLevel::Scalar, size, &w);
                let v = graph_direct(shape, VecLevel::Avx2, size, &w);
                assert_eq!(s, v, "{:?} size {}", shape, size);
            }
        }
    }

    #[test]
    fn test_graph_direct_circle_center() {
        let g = graph_direct(Shape::Circle, VecLevel::Scalar, 4, &Window::default());
        // pixel (2, 2) has its origin at (0, 0)
        assert_eq!(g.get(2, 2), 1.0);
        assert_eq!(g.get(0, 0), 0.0);
    }
}
