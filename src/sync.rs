// one-shot synchronisation used around a benchmark run:
// `StartGate` holds workers back until every one of them is parked, then
// releases them together; `Latch` lets the controller wait for the last worker
// to leave its claim loop without joining.

use parking_lot::{Condvar, Mutex};
use std::time::Instant;

struct GateState {
    arrived: usize,
    open: bool,
}

pub struct StartGate {
    state: Mutex<GateState>,
    cv: Condvar,
}

impl StartGate {
    pub fn new() -> Self {
        StartGate {
            state: Mutex::new(GateState {
                arrived: 0,
                open: false,
            }),
            cv: Condvar::new(),
        }
    }

    /// Called by each worker. Blocks until the gate is opened.
    pub fn wait(&self) {
        let mut state = self.state.lock();
        state.arrived += 1;
        self.cv.notify_all();
        while !state.open {
            self.cv.wait(&mut state);
        }
    }

    /// Called by the controller. Waits until `workers` threads are parked in
    /// [`StartGate::wait`], then opens the gate and returns the release instant.
    pub fn open_when_ready(&self, workers: usize) -> Instant {
        let mut state = self.state.lock();
        while state.arrived < workers {
            self.cv.wait(&mut state);
        }
        state.open = true;
        let start = Instant::now();
        self.cv.notify_all();
        start
    }
}

impl Default for StartGate {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Latch {
    remaining: Mutex<usize>,
    cv: Condvar,
}

impl Latch {
    pub fn new(count: usize) -> Self {
        Latch {
            remaining: Mutex::new(count),
            cv: Condvar::new(),
        }
    }

    pub fn count_down(&self) {
        let mut remaining = self.remaining.lock();
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.cv.notify_all();
        }
    }

    pub fn wait(&self) {
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            self.cv.wait(&mut remaining);
        }
    }
}

// counts the latch down when dropped, so a panicking worker cannot leave the controller waiting
pub struct CountDownOnDrop<'a>(pub &'a Latch);

impl Drop for CountDownOnDrop<'_> {
    fn drop(&mut self) {
        self.0.count_down();
    }
}
