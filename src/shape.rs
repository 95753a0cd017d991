// --- shape evaluators ---
//
// every shape is a pure membership predicate returning 1.0 (inside) or 0.0 (outside).
// the scalar and 8-lane forms of each shape must agree lane for lane.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use wide::{f32x8, CmpGt, CmpLt};

/// Number of lanes processed per step by the vectorized evaluators.
pub const LANES: usize = 8;

/// Which membership predicate to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// always outside, measures pure loop overhead
    Empty,
    Circle,
    Hyperbola,
    Square,
}

/// How samples are evaluated: one at a time, or eight per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VecLevel {
    #[value(name = "none", alias = "scalar")]
    #[serde(rename = "none")]
    Scalar,
    #[value(name = "avx2", alias = "vec8")]
    Avx2,
}

impl VecLevel {
    // samples evaluated per inner step
    pub fn width(self) -> usize {
        match self {
            VecLevel::Scalar => 1,
            VecLevel::Avx2 => LANES,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Shape::Empty => "NONE",
            Shape::Circle => "Circle [x^2 + y^2 < 1]",
            Shape::Hyperbola => "Hyperbola [x^2 - y^2 < 1]",
            Shape::Square => "Square [-1 < x < 1 && -1 < y < 1]",
        };
        f.write_str(s)
    }
}

impl fmt::Display for VecLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VecLevel::Scalar => "No defined vectorization",
            VecLevel::Avx2 => "AVX2 (256 bit)",
        };
        f.write_str(s)
    }
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Empty, Shape::Circle, Shape::Hyperbola, Shape::Square];

    /// Evaluates the shape at a single point.
    #[inline(always)]
    pub fn eval_scalar(self, x: f32, y: f32) -> f32 {
        let inside = match self {
            Shape::Empty => false,
            Shape::Circle => x * x + y * y < 1.0,
            Shape::Hyperbola => x * x - y * y < 1.0,
            Shape::Square => x > -1.0 && x < 1.0 && y > -1.0 && y < 1.0,
        };
        if inside {
            1.0
        } else {
            0.0
        }
    }

    /// Evaluates the shape at eight points at once, lane k of the result
    /// belongs to `(x[k], y[k])`.
    #[inline(always)]
    pub fn eval_vec8(self, x: f32x8, y: f32x8) -> f32x8 {
        let one = f32x8::ONE;
        let zero = f32x8::ZERO;
        match self {
            Shape::Empty => zero,
            Shape::Circle => (x * x + y * y).cmp_lt(one).blend(one, zero),
            Shape::Hyperbola => (x * x - y * y).cmp_lt(one).blend(one, zero),
            Shape::Square => {
                let neg_one = f32x8::splat(-1.0);
                let mask = x.cmp_gt(neg_one) & x.cmp_lt(one) & y.cmp_gt(neg_one) & y.cmp_lt(one);
                mask.blend(one, zero)
            }
        }
    }
}
