// console text and json output for runs, loops and st/mt comparisons.
// durations are stored in nanoseconds and shown in milliseconds.

use crate::params::{RunParams, Window};
use crate::result::{FixedTimeResult, MultisampleResult};
use crate::shape::Shape;
use serde::Serialize;
use serde_json::to_writer_pretty;
use std::fmt::Write;
use std::io;

/// Aggregate of one multisample loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MultisampleLoopSummary {
    pub runs: usize,
    pub hi_score: u64,
    pub avg_time: u64,
    pub best_time: u64,
}

/// Aggregate of one fixed-time loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FixedTimeLoopSummary {
    pub runs: usize,
    pub hi_score: u64,
    pub avg_count: u64,
}

/// Single-thread loop against multi-thread loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison<T> {
    pub single: T,
    pub multi: T,
    pub st_score: u64,
    pub mt_score: u64,
    pub ratio: f64,
}

impl<T> Comparison<T> {
    pub fn new(single: T, multi: T, st_score: u64, mt_score: u64) -> Self {
        let ratio = if st_score == 0 {
            0.0
        } else {
            mt_score as f64 / st_score as f64
        };
        Comparison {
            single,
            multi,
            st_score,
            mt_score,
            ratio,
        }
    }
}

/// Everything printed by `--json`.
#[derive(Debug, Serialize)]
pub struct BenchmarkSummary<'a, T> {
    pub mode: &'static str,
    pub shape: Shape,
    pub params: RunParams,
    pub window: Window,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub comparison: &'a Comparison<T>,
}

/// Pretty json followed by a newline. Nothing is written to disk, the caller
/// hands in stdout.
pub fn write_json<W: io::Write, T: Serialize>(mut out: W, summary: &T) -> Result<(), String> {
    to_writer_pretty(&mut out, summary).map_err(|e| format!("failed to write json summary: {}", e))?;
    out.write_all(b"\n").map_err(|e| format!("failed to write json summary: {}", e))
}

fn ms(ns: f64) -> f64 {
    ns / 1e6
}

// `label` padded to the report's value column
macro_rules! field {
    ($out:expr, $label:expr, $($arg:tt)*) => {
        let _ = writeln!($out, "{:<22}{}", $label, format_args!($($arg)*));
    };
}

pub fn multisample_header(shape: Shape, params: &RunParams, runs: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Multisample Benchmark");
    field!(out, "Shape:", "{}", shape);
    field!(out, "Vectorization level:", "{}", params.vec_level);
    field!(out, "Samples Per Unit:", "{}", params.samples);
    field!(out, "Display Size:", "{}", params.size);
    field!(out, "Threads:", "{}", params.threads);
    field!(out, "Total Calculations:", "{}", params.total_calculations());
    field!(out, "Runs:", "{}", runs);
    out.push('\n');
    out
}

pub fn multisample_run(params: &RunParams, result: &MultisampleResult, avg_value: f32) -> String {
    let mut out = String::new();
    field!(out, "Score:", "{}", result.score());
    field!(out, "Total time:", "{} ms", ms(result.total_time as f64));
    field!(out, "Avg time/unit:", "{} ms", ms(result.avg_time_per_unit(params)));
    field!(out, "Best time/unit:", "{} ms", ms(result.best_single_time as f64));
    field!(out, "ST total time:", "{} ms", ms(result.sum_single_time as f64));
    field!(out, "Est MT total time:", "{} ms", ms(result.est_mt_time(params)));
    field!(out, "Overhead:", "{}%", result.overhead_percent(params));
    field!(out, "Avg value:", "{}", avg_value);
    field!(out, "Performance:", "{} calc/s", result.performance(params));
    out.push('\n');
    out
}

pub fn multisample_loop(summary: &MultisampleLoopSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Loop finished");
    field!(out, "Score:", "{}", summary.hi_score);
    field!(out, "Avg time:", "{} ms", ms(summary.avg_time as f64));
    field!(out, "Best time:", "{} ms", ms(summary.best_time as f64));
    out.push('\n');
    out
}

pub fn fixedtime_header(shape: Shape, params: &RunParams, time_ms: u64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Fixed Time Benchmark");
    field!(out, "Shape:", "{}", shape);
    field!(out, "Vectorization level:", "{}", params.vec_level);
    field!(out, "Threads:", "{}", params.threads);
    field!(out, "Time:", "{} ms", time_ms);
    out.push('\n');
    out
}

pub fn fixedtime_run(run: usize, runs: usize, result: &FixedTimeResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Run {}/{}", run, runs);
    field!(out, "Score:", "{}", result.score());
    field!(out, "Units processed:", "{}", result.count);
    field!(out, "Precise time:", "{} ms", ms(result.time as f64));
    out.push('\n');
    out
}

pub fn fixedtime_loop(summary: &FixedTimeLoopSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Loop finished");
    field!(out, "Score:", "{}", summary.hi_score);
    out.push('\n');
    out
}

pub fn comparison<T>(cmp: &Comparison<T>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "All loops finished");
    field!(out, "ST Score:", "{}", cmp.st_score);
    field!(out, "MT Score:", "{}", cmp.mt_score);
    field!(out, "ST:MT Ratio:", "{}", cmp.ratio);
    out
}
