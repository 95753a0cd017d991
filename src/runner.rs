// --- benchmark drivers and loop orchestration ---
//
// a driver wraps one scheduler run and prints its report; a loop repeats a
// driver and keeps the best score; a comparison runs the same loop with one
// thread and then with the requested thread count.

use crate::grid::Grid;
use crate::params::{RunParams, Window};
use crate::report::{self, Comparison, FixedTimeLoopSummary, MultisampleLoopSummary};
use crate::result::{FixedTimeResult, MultisampleResult};
use crate::scheduler::{run_fixedtime, run_multisample};
use crate::shape::Shape;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Repetitions per loop.
    pub loops: usize,
    /// Print the thresholded grid after every multisample run.
    pub preview: bool,
    /// Suppress console output and the progress bar.
    pub quiet: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            loops: 5,
            preview: cfg!(feature = "print-result"),
            quiet: false,
        }
    }
}

// stdout report text interleaved with a stderr progress bar
pub struct Console {
    bar: ProgressBar,
    quiet: bool,
}

impl Console {
    pub fn new(runs: usize, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(runs as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}/{len:3} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
            bar
        };
        Console { bar, quiet }
    }

    pub fn hidden() -> Self {
        Console::new(0, true)
    }

    pub fn emit(&self, text: &str) {
        if !self.quiet {
            self.bar.suspend(|| print!("{}", text));
        }
    }
}

fn check_loops(opts: &RunOptions) -> Result<(), String> {
    if opts.loops == 0 {
        return Err("loop count must be at least 1".to_string());
    }
    Ok(())
}

/// One multisample run plus its report.
pub fn run_multisample_single(
    shape: Shape,
    params: &RunParams,
    window: &Window,
    opts: &RunOptions,
    console: &Console,
) -> Result<(Grid, MultisampleResult), String> {
    let (grid, result) = run_multisample(shape, params, window)?;

    console.emit(&report::multisample_run(params, &result, grid.mean()));
    if opts.preview {
        console.emit(&format!("{}\n", grid.render_ascii()));
    }

    Ok((grid, result))
}

pub fn run_multisample_loop(
    shape: Shape,
    params: &RunParams,
    window: &Window,
    opts: &RunOptions,
) -> Result<MultisampleLoopSummary, String> {
    check_loops(opts)?;
    let console = Console::new(opts.loops, opts.quiet);
    console.bar.set_message(format!("multisample, {} thread(s)", params.threads));
    console.emit(&report::multisample_header(shape, params, opts.loops));

    let mut hi_score = 0u64;
    let mut sum_time = 0u64;
    let mut best_time = u64::MAX;

    for _ in 0..opts.loops {
        let (_, result) = run_multisample_single(shape, params, window, opts, &console)?;

        hi_score = hi_score.max(result.score());
        sum_time += result.total_time;
        best_time = best_time.min(result.total_time);
        console.bar.inc(1);
    }
    console.bar.finish_and_clear();

    let summary = MultisampleLoopSummary {
        runs: opts.loops,
        hi_score,
        avg_time: sum_time / opts.loops as u64,
        best_time,
    };
    info!(
        "multisample loop done: threads={} hi_score={} best_time={}ns",
        params.threads, summary.hi_score, summary.best_time
    );
    console.emit(&report::multisample_loop(&summary));

    Ok(summary)
}

/// One fixed-time run plus its report. `run` is 1-based, for display only.
pub fn run_fixedtime_single(
    shape: Shape,
    params: &RunParams,
    window: &Window,
    duration: Duration,
    (run, runs): (usize, usize),
    console: &Console,
) -> Result<FixedTimeResult, String> {
    let result = run_fixedtime(shape, params, window, duration)?;
    console.emit(&report::fixedtime_run(run, runs, &result));
    Ok(result)
}

pub fn run_fixedtime_loop(
    shape: Shape,
    params: &RunParams,
    window: &Window,
    duration: Duration,
    opts: &RunOptions,
) -> Result<FixedTimeLoopSummary, String> {
    check_loops(opts)?;
    let console = Console::new(opts.loops, opts.quiet);
    console.bar.set_message(format!("fixed time, {} thread(s)", params.threads));
    console.emit(&report::fixedtime_header(shape, params, duration.as_millis() as u64));

    let mut hi_score = 0u64;
    let mut sum_count = 0u64;

    for run in 0..opts.loops {
        let result = run_fixedtime_single(shape, params, window, duration, (run + 1, opts.loops), &console)?;

        hi_score = hi_score.max(result.score());
        sum_count += result.count;
        console.bar.inc(1);
    }
    console.bar.finish_and_clear();

    let summary = FixedTimeLoopSummary {
        runs: opts.loops,
        hi_score,
        avg_count: sum_count / opts.loops as u64,
    };
    info!(
        "fixed-time loop done: threads={} hi_score={} avg_count={}",
        params.threads, summary.hi_score, summary.avg_count
    );
    console.emit(&report::fixedtime_loop(&summary));

    Ok(summary)
}

/// Multisample loop with one thread, then with `params.threads`.
pub fn compare_multisample(
    shape: Shape,
    params: &RunParams,
    window: &Window,
    opts: &RunOptions,
) -> Result<Comparison<MultisampleLoopSummary>, String> {
    let single = run_multisample_loop(shape, &params.with_threads(1)?, window, opts)?;
    let multi = run_multisample_loop(shape, params, window, opts)?;

    let cmp = Comparison::new(single, multi, single.hi_score, multi.hi_score);
    if !opts.quiet {
        print!("{}", report::comparison(&cmp));
    }
    Ok(cmp)
}

/// Fixed-time loop with one thread, then with `params.threads`.
pub fn compare_fixedtime(
    shape: Shape,
    params: &RunParams,
    window: &Window,
    duration: Duration,
    opts: &RunOptions,
) -> Result<Comparison<FixedTimeLoopSummary>, String> {
    let single = run_fixedtime_loop(shape, &params.with_threads(1)?, window, duration, opts)?;
    let multi = run_fixedtime_loop(shape, params, window, duration, opts)?;

    let cmp = Comparison::new(single, multi, single.hi_score, multi.hi_score);
    if !opts.quiet {
        print!("{}", report::comparison(&cmp));
    }
    Ok(cmp)
}
