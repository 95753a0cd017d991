use clap::{Args, Parser, Subcommand};
use drawxy::params::{RunParams, Window};
use drawxy::report::{self, BenchmarkSummary};
use drawxy::runner::{compare_fixedtime, compare_multisample, RunOptions};
use drawxy::sampling::graph_direct;
use drawxy::shape::{Shape, VecLevel};
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::time::Duration;

#[cfg(test)] // for testing
mod test;

const DRAWXY_VERSION: &str = env!("CARGO_PKG_VERSION");

// defaults: 32x32 grid, 4096^2 samples per pixel
const DEFAULT_SIZE: usize = 32;
const DEFAULT_SAMPLES: usize = 4096;
const DEFAULT_LOOPS: usize = 5;
const DEFAULT_TIME_MS: u64 = 5000;

#[derive(Parser, Debug)]
#[command(name = "drawxy", version = DRAWXY_VERSION,
    about = "drawxy - cpu throughput benchmark. renders a shape with heavy multisampling, \
             scalar or simd, single or multi-threaded, and scores the machine.\n\
             run without a command to be prompted for the benchmark type.",
    long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fixed total work: render the grid once per run, score by wall time.
    Multisample {
        #[command(flatten)]
        bench: BenchArgs,
    },
    /// Fixed wall-clock time: render continuously, score by pixels completed.
    FixedTime {
        #[command(flatten)]
        bench: BenchArgs,
        /// Duration of each run in milliseconds.
        #[arg(long, default_value_t = DEFAULT_TIME_MS)]
        time_ms: u64,
    },
    /// Prints a point-sampled ascii preview of a shape and exits.
    Preview {
        #[arg(long, value_enum, default_value_t = Shape::Circle)]
        shape: Shape,
        #[arg(long, value_enum, default_value_t = VecLevel::Avx2)]
        vec_level: VecLevel,
        #[arg(long, default_value_t = DEFAULT_SIZE)]
        size: usize,
    },
}

#[derive(Args, Debug, Clone)]
struct BenchArgs {
    /// Shape to render.
    #[arg(long, value_enum, default_value_t = Shape::Circle)]
    shape: Shape,
    /// Evaluate one sample at a time (none) or eight per step (avx2).
    #[arg(long, value_enum, default_value_t = VecLevel::Avx2)]
    vec_level: VecLevel,
    /// Sub-samples per pixel along each axis.
    #[arg(long, default_value_t = DEFAULT_SAMPLES)]
    samples: usize,
    /// Grid size in pixels along each axis.
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    size: usize,
    /// Worker threads for the multi-threaded loop (default: logical cpu count).
    #[arg(long)]
    threads: Option<usize>,
    /// Runs per loop.
    #[arg(long, default_value_t = DEFAULT_LOOPS)]
    loops: usize,
    /// Print the thresholded grid after each multisample run.
    #[arg(long)]
    preview: bool,
    /// No console report, no progress bar.
    #[arg(long)]
    quiet: bool,
    /// Print the summary as pretty json on stdout instead of the text report.
    #[arg(long)]
    json: bool,
}

impl Default for BenchArgs {
    fn default() -> Self {
        BenchArgs {
            shape: Shape::Circle,
            vec_level: VecLevel::Avx2,
            samples: DEFAULT_SAMPLES,
            size: DEFAULT_SIZE,
            threads: None,
            loops: DEFAULT_LOOPS,
            preview: false,
            quiet: false,
            json: false,
        }
    }
}

impl BenchArgs {
    fn run_params(&self) -> Result<RunParams, String> {
        let threads = self.threads.unwrap_or_else(num_cpus::get);
        RunParams::new(self.vec_level, self.samples, self.size, threads)
    }

    fn run_options(&self) -> RunOptions {
        let defaults = RunOptions::default();
        RunOptions {
            loops: self.loops,
            preview: self.preview || defaults.preview,
            // keep stdout clean for the json document
            quiet: self.quiet || self.json,
        }
    }
}

fn run_multisample_command(bench: &BenchArgs) -> Result<(), String> {
    let params = bench.run_params()?;
    let window = Window::default();
    info!("multisample benchmark: {:?}", params);

    let cmp = compare_multisample(bench.shape, &params, &window, &bench.run_options())?;

    if bench.json {
        let summary = BenchmarkSummary {
            mode: "multisample",
            shape: bench.shape,
            params,
            window,
            duration_ms: None,
            comparison: &cmp,
        };
        report::write_json(io::stdout().lock(), &summary)?;
    }
    Ok(())
}

fn run_fixedtime_command(bench: &BenchArgs, time_ms: u64) -> Result<(), String> {
    let params = bench.run_params()?;
    let window = Window::default();
    let duration = Duration::from_millis(time_ms);
    info!("fixed-time benchmark: {:?}, {} ms per run", params, time_ms);

    let cmp = compare_fixedtime(bench.shape, &params, &window, duration, &bench.run_options())?;

    if bench.json {
        let summary = BenchmarkSummary {
            mode: "fixed-time",
            shape: bench.shape,
            params,
            window,
            duration_ms: Some(time_ms),
            comparison: &cmp,
        };
        report::write_json(io::stdout().lock(), &summary)?;
    }
    Ok(())
}

// no subcommand: prompt for the benchmark type, 0 = multisample, 1 = fixed time
fn prompt_bench_type() -> Result<u32, String> {
    print!("Enter benchmark type: ");
    io::stdout().flush().map_err(|e| format!("failed to flush stdout: {}", e))?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| format!("failed to read benchmark type: {}", e))?;
    println!();

    line.trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid benchmark type '{}', expected 0 (multisample) or 1 (fixed time)", line.trim()))
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cfg!(debug_assertions) {
        warn!("debug build, scores are not comparable with release builds");
    }

    match cli.command {
        Some(Commands::Multisample { bench }) => run_multisample_command(&bench),
        Some(Commands::FixedTime { bench, time_ms }) => run_fixedtime_command(&bench, time_ms),
        Some(Commands::Preview {
            shape,
            vec_level,
            size,
        }) => {
            if size == 0 {
                return Err("grid size must be at least 1".to_string());
            }
            let grid = graph_direct(shape, vec_level, size, &Window::default());
            println!("{}", shape);
            print!("{}", grid.render_ascii());
            Ok(())
        }
        None => match prompt_bench_type()? {
            0 => run_multisample_command(&BenchArgs::default()),
            1 => run_fixedtime_command(&BenchArgs::default(), DEFAULT_TIME_MS),
            other => Err(format!(
                "unknown benchmark type {}, expected 0 (multisample) or 1 (fixed time)",
                other
            )),
        },
    }
}
