// --- grid scheduler ---
//
// a fresh set of os threads per run, all released by one start gate. workers
// claim pixel indices from a shared atomic counter (claim-next-index), so the
// fastest thread simply takes more pixels. every claimed index belongs to
// exactly one worker, which is what lets the grid be written without locks.

use crate::grid::{Grid, SharedGrid};
use crate::params::{RunParams, Window};
use crate::result::{FixedTimeResult, MultisampleResult};
use crate::sampling::sample_average;
use crate::shape::Shape;
use crate::sync::{CountDownOnDrop, Latch, StartGate};
use crossbeam_utils::thread;
use crossbeam_utils::CachePadded;
use log::{debug, trace};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Renders the full grid once with `params.threads` workers, timing every pixel.
pub fn run_multisample(
    shape: Shape,
    params: &RunParams,
    window: &Window,
) -> Result<(Grid, MultisampleResult), String> {
    let size = params.size;
    let size2 = params.pixel_count();

    debug!(
        "multisample run: shape={:?} vec={:?} samples={} size={} threads={}",
        shape, params.vec_level, params.samples, size, params.threads
    );

    let grid = SharedGrid::new(size);
    let next = CachePadded::new(AtomicUsize::new(0));
    let sum_single_time = CachePadded::new(AtomicU64::new(0));
    let best_single_time = CachePadded::new(AtomicU64::new(u64::MAX));

    let worker = |worker_id: usize| {
        let mut done = 0usize;
        loop {
            let i = next.fetch_add(1, Ordering::Relaxed);
            if i >= size2 {
                break;
            }

            let cell = window.cell(size, i % size, i / size);

            let begin = Instant::now();
            let value = sample_average(shape, params.vec_level, params.samples, &cell);
            let elapsed = begin.elapsed().as_nanos() as u64;

            grid.store(i, value);
            sum_single_time.fetch_add(elapsed, Ordering::Relaxed);
            best_single_time.fetch_min(elapsed, Ordering::Relaxed);
            done += 1;
        }
        trace!("multisample worker {} finished after {} pixels", worker_id, done);
    };

    // the timed region ends at the last written pixel: the latch trips only
    // after every worker has stored its final value and left the claim loop
    let total_time = run_workers("multisample", params.threads, worker, |start, finished| {
        finished.wait();
        start.elapsed().as_nanos() as u64
    })?;

    let result = MultisampleResult {
        sum_single_time: sum_single_time.load(Ordering::Relaxed),
        best_single_time: best_single_time.load(Ordering::Relaxed),
        total_time: total_time.max(1),
    };
    debug!("multisample run finished: {:?}", result);

    Ok((grid.into_grid(), result))
}

/// Keeps every worker rendering (wrapping around the grid) for `duration`,
/// then reports how many pixels were claimed.
///
/// The stop flag is checked after each claim, so the count includes the one
/// claim per worker that was abandoned when the flag cleared.
pub fn run_fixedtime(
    shape: Shape,
    params: &RunParams,
    window: &Window,
    duration: Duration,
) -> Result<FixedTimeResult, String> {
    let size = params.size;
    let size2 = params.pixel_count() as u64;

    debug!(
        "fixed-time run: shape={:?} vec={:?} samples={} size={} threads={} duration={:?}",
        shape, params.vec_level, params.samples, size, params.threads, duration
    );

    // scratch only, pixels get overwritten many times over
    let scratch = SharedGrid::new(size);
    let next = CachePadded::new(AtomicU64::new(0));
    let running = CachePadded::new(AtomicBool::new(true));

    let worker = |worker_id: usize| {
        let mut done = 0u64;
        loop {
            let n = next.fetch_add(1, Ordering::Relaxed);
            if !running.load(Ordering::Acquire) {
                break;
            }

            let i = (n % size2) as usize;
            let cell = window.cell(size, i % size, i / size);
            scratch.store(i, sample_average(shape, params.vec_level, params.samples, &cell));
            done += 1;
        }
        trace!("fixed-time worker {} stopped after {} pixels", worker_id, done);
    };

    let time = run_workers("fixedtime", params.threads, worker, |start, _| {
        let deadline = start + duration;
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        running.store(false, Ordering::Release);
        start.elapsed().as_nanos() as u64
    })?;

    let result = FixedTimeResult {
        count: next.load(Ordering::Relaxed),
        time: time.max(1),
    };
    debug!("fixed-time run finished: {:?}", result);

    Ok(result)
}

/// Single-threaded row-major reference renderer with the same per-pixel
/// timing as [`run_multisample`]. `params.threads` is ignored.
pub fn run_multisample_direct(
    shape: Shape,
    params: &RunParams,
    window: &Window,
) -> Result<(Grid, MultisampleResult), String> {
    let size = params.size;
    let mut values = vec![0.0f32; params.pixel_count()];
    let mut sum_single_time = 0u64;
    let mut best_single_time = u64::MAX;

    let begin_time = Instant::now();

    for y in 0..size {
        for x in 0..size {
            let cell = window.cell(size, x, y);

            let begin = Instant::now();
            values[x + y * size] = sample_average(shape, params.vec_level, params.samples, &cell);
            let elapsed = begin.elapsed().as_nanos() as u64;

            sum_single_time += elapsed;
            best_single_time = best_single_time.min(elapsed);
        }
    }

    let result = MultisampleResult {
        sum_single_time,
        best_single_time,
        total_time: (begin_time.elapsed().as_nanos() as u64).max(1),
    };
    debug!("direct multisample run finished: {:?}", result);

    Ok((Grid::from_values(size, values), result))
}

// spawns `threads` scoped workers behind a start gate, hands the release
// instant to `control` on the calling thread, then joins everything.
// a worker panic turns the whole run into an error.
fn run_workers<W, C, R>(label: &str, threads: usize, worker: W, control: C) -> Result<R, String>
where
    W: Fn(usize) + Sync,
    C: FnOnce(Instant, &Latch) -> R,
{
    let gate = StartGate::new();
    let finished = Latch::new(threads);

    let worker = &worker;
    let gate_ref = &gate;
    let finished_ref = &finished;

    let outcome = thread::scope(|s| {
        let mut spawned = 0;
        let mut spawn_error = None;

        for worker_id in 0..threads {
            let handle = s
                .builder()
                .name(format!("{}-{}", label, worker_id))
                .spawn(move |_| {
                    let _done = CountDownOnDrop(finished_ref);
                    gate_ref.wait();
                    trace!("{} worker {} released", label, worker_id);
                    worker(worker_id);
                });

            match handle {
                Ok(_) => spawned += 1,
                Err(e) => {
                    spawn_error = Some(format!("failed to spawn {} worker {}: {}", label, worker_id, e));
                    break;
                }
            }
        }

        // workers that never started must not hold up the latch
        for _ in spawned..threads {
            finished.count_down();
        }

        let start = gate.open_when_ready(spawned);
        let value = control(start, &finished);
        (value, spawn_error)
    });

    match outcome {
        Ok((value, None)) => Ok(value),
        Ok((_, Some(e))) => Err(e),
        Err(_) => Err(format!("{} worker thread panicked, run aborted", label)),
    }
}
