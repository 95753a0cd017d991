// --- cross-module tests: engine, scheduler and drivers together ---

use crate::{BenchArgs, Cli, Commands};
use clap::Parser;
use drawxy::params::{RunParams, Window};
use drawxy::runner::{run_multisample_single, Console, RunOptions};
use drawxy::sampling::{sample_average, sample_average_scalar, sample_average_vec8};
use drawxy::scheduler::{run_fixedtime, run_multisample, run_multisample_direct};
use drawxy::shape::{Shape, VecLevel};
use proptest::prelude::*;
use std::time::Duration;

// --- common test helpers ---

fn params(level: VecLevel, samples: usize, size: usize, threads: usize) -> RunParams {
    RunParams::new(level, samples, size, threads).expect("valid test parameters")
}

// relative error with an absolute floor, so exact zeros compare cleanly
fn assert_close(a: f32, b: f32, what: &str) {
    let tol = 1e-5 * a.abs().max(b.abs()).max(1.0);
    assert!((a - b).abs() <= tol, "{}: {} vs {}", what, a, b);
}

// --- grid determinism ---

#[test]
fn test_single_and_multi_thread_grids_identical() {
    let w = Window::default();
    for shape in Shape::ALL {
        for level in [VecLevel::Scalar, VecLevel::Avx2] {
            let (st, _) = run_multisample(shape, &params(level, 8, 9, 1), &w).unwrap();
            let (mt, _) = run_multisample(shape, &params(level, 8, 9, 4), &w).unwrap();
            assert_eq!(st, mt, "{:?} {:?}", shape, level);
        }
    }
}

#[test]
fn test_repeated_runs_identical() {
    let p = params(VecLevel::Avx2, 16, 8, 1);
    let w = Window::default();
    let (first, _) = run_multisample(Shape::Hyperbola, &p, &w).unwrap();
    let (second, _) = run_multisample(Shape::Hyperbola, &p, &w).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_scalar_and_vec8_grids_agree() {
    let w = Window::default();
    for shape in Shape::ALL {
        let (s, _) = run_multisample(shape, &params(VecLevel::Scalar, 16, 6, 2), &w).unwrap();
        let (v, _) = run_multisample(shape, &params(VecLevel::Avx2, 16, 6, 2), &w).unwrap();
        for (i, (a, b)) in s.values().iter().zip(v.values()).enumerate() {
            assert_close(*a, *b, &format!("{:?} pixel {}", shape, i));
        }
    }
}

// --- concrete scenarios ---

#[test]
fn test_circle_4x4_corners_and_square_center() {
    let w = Window::default();
    let p = params(VecLevel::Avx2, 8, 4, 1);

    // the four corner cells of [-2, 2)^2 lie entirely outside the unit circle
    let (circle, _) = run_multisample(Shape::Circle, &p, &w).unwrap();
    for (x, y) in [(0, 0), (3, 0), (0, 3), (3, 3)] {
        assert_eq!(circle.get(x, y), 0.0, "corner ({}, {})", x, y);
    }
    // inner cells are partially covered
    for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
        let v = circle.get(x, y);
        assert!(v > 0.0 && v < 1.0, "inner ({}, {}) = {}", x, y, v);
    }

    // cell [0, 1)^2 samples 0..0.875 on both axes, all strictly inside the square
    let (square, _) = run_multisample(Shape::Square, &p, &w).unwrap();
    assert_eq!(square.get(2, 2), 1.0);
}

#[test]
fn test_circle_cells_inside_unit_circle_are_one() {
    // 8x8 over [-2, 2): the four central cells cover [-0.5, 0.5)^2
    let (grid, _) = run_multisample(Shape::Circle, &params(VecLevel::Scalar, 8, 8, 2), &Window::default()).unwrap();
    for (x, y) in [(3, 3), (4, 3), (3, 4), (4, 4)] {
        assert_eq!(grid.get(x, y), 1.0, "center ({}, {})", x, y);
    }
}

#[test]
fn test_empty_shape_is_all_zero() {
    let p = params(VecLevel::Avx2, 8, 5, 3);
    let (grid, result) = run_multisample(Shape::Empty, &p, &Window::default()).unwrap();
    assert!(grid.values().iter().all(|&v| v == 0.0));
    assert_eq!(grid.mean(), 0.0);
    // the score only depends on timing
    assert_eq!(result.score(), (1e13 / result.total_time as f64) as u64);
}

#[test]
fn test_multisample_timing_invariants() {
    let p = params(VecLevel::Scalar, 16, 6, 3);
    let (_, result) = run_multisample(Shape::Square, &p, &Window::default()).unwrap();
    assert!(result.total_time > 0);
    assert!(result.best_single_time <= result.sum_single_time);

    let (_, direct) = run_multisample_direct(Shape::Square, &p, &Window::default()).unwrap();
    assert!(direct.total_time > 0);
    assert!(direct.best_single_time <= direct.sum_single_time);
}

#[test]
fn test_fixedtime_count_grows_with_duration() {
    let p = params(VecLevel::Avx2, 8, 8, 2);
    let w = Window::default();
    let short = run_fixedtime(Shape::Circle, &p, &w, Duration::from_millis(2)).unwrap();
    let long = run_fixedtime(Shape::Circle, &p, &w, Duration::from_millis(200)).unwrap();
    assert!(long.count > short.count, "{} vs {}", long.count, short.count);
    assert!(long.time > short.time);
}

#[test]
fn test_driver_reports_grid() {
    let p = params(VecLevel::Avx2, 8, 4, 2);
    let opts = RunOptions {
        loops: 1,
        preview: true,
        quiet: true,
    };
    let (grid, result) =
        run_multisample_single(Shape::Square, &p, &Window::default(), &opts, &Console::hidden()).unwrap();
    assert_eq!(grid.size(), 4);
    assert!(result.score() > 0);
}

// --- cli ---

#[test]
fn test_cli_parses_fixed_time() {
    let cli = Cli::try_parse_from([
        "drawxy",
        "fixed-time",
        "--shape",
        "hyperbola",
        "--vec-level",
        "none",
        "--threads",
        "3",
        "--time-ms",
        "250",
    ])
    .unwrap();
    match cli.command {
        Some(Commands::FixedTime { bench, time_ms }) => {
            assert_eq!(bench.shape, Shape::Hyperbola);
            assert_eq!(bench.vec_level, VecLevel::Scalar);
            assert_eq!(bench.threads, Some(3));
            assert_eq!(bench.samples, 4096);
            assert_eq!(time_ms, 250);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_cli_rejects_unaligned_samples() {
    let cli = Cli::try_parse_from(["drawxy", "multisample", "--samples", "3", "--threads", "1"]).unwrap();
    let bench = match cli.command {
        Some(Commands::Multisample { bench }) => bench,
        other => panic!("unexpected command {:?}", other),
    };
    // avx2 is the default and 3^2 is not a multiple of 8
    assert!(bench.run_params().is_err());
}

#[test]
fn test_json_flag_silences_text_report() {
    let cli = Cli::try_parse_from(["drawxy", "multisample", "--json", "--loops", "2"]).unwrap();
    let bench = match cli.command {
        Some(Commands::Multisample { bench }) => bench,
        other => panic!("unexpected command {:?}", other),
    };
    assert!(bench.json);
    let opts = bench.run_options();
    assert!(opts.quiet);
    assert_eq!(opts.loops, 2);
    // the flag takes no file argument
    assert!(Cli::try_parse_from(["drawxy", "multisample", "--json", "out.json"]).is_err());
}

#[test]
fn test_no_command_is_allowed() {
    let cli = Cli::try_parse_from(["drawxy"]).unwrap();
    assert!(cli.command.is_none());
    assert_eq!(BenchArgs::default().loops, 5);
}

// --- properties ---

fn any_shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        Just(Shape::Empty),
        Just(Shape::Circle),
        Just(Shape::Hyperbola),
        Just(Shape::Square),
    ]
}

fn any_window() -> impl Strategy<Value = Window> {
    (0.01f32..4.0, 0.01f32..4.0, -3.0f32..3.0, -3.0f32..3.0)
        .prop_map(|(sx, sy, ox, oy)| Window::new(sx, sy, ox, oy))
}

proptest! {
    #[test]
    fn prop_scalar_and_vec8_agree(
        shape in any_shape(),
        window in any_window(),
        samples in prop_oneof![Just(4usize), Just(8), Just(12), Just(16), Just(24), Just(32)],
    ) {
        let s = sample_average_scalar(shape, samples, &window);
        let v = sample_average_vec8(shape, samples, &window);
        prop_assert!((s - v).abs() <= 1e-5 * s.abs().max(v.abs()).max(1.0), "{} vs {}", s, v);
    }

    #[test]
    fn prop_average_in_unit_range(
        shape in any_shape(),
        window in any_window(),
        samples in 1usize..24,
    ) {
        let s = sample_average(shape, VecLevel::Scalar, samples, &window);
        prop_assert!((0.0..=1.0).contains(&s));
        if (samples * samples) % 8 == 0 {
            let v = sample_average(shape, VecLevel::Avx2, samples, &window);
            prop_assert!((0.0..=1.0).contains(&v));
        }
    }
}
