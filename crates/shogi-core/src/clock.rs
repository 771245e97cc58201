use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};
use thiserror::Error;

use crate::types::Side;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("failed to spawn clock thread: {0}")]
    Spawn(String),
}

/// Starting time per side and the length of one tick. Zero seconds means
/// the game is untimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeControl {
    pub seconds: u32,
    pub tick: Duration,
}

impl TimeControl {
    pub const fn new(seconds: u32) -> Self {
        Self {
            seconds,
            tick: Duration::from_secs(1),
        }
    }

    pub const fn with_tick(self, tick: Duration) -> Self {
        Self { tick, ..self }
    }

    pub const fn is_timed(&self) -> bool {
        self.seconds > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    Tick { side: Side, remaining: u32 },
    Expired { side: Side },
}

#[derive(Debug)]
struct ClockState {
    remaining: [u32; 2],
    paused: [bool; 2],
    // Running time already spent toward each side's next tick.
    elapsed: [Duration; 2],
}

#[derive(Debug)]
struct Shared {
    running: Arc<AtomicBool>,
    tick: Duration,
    state: Mutex<ClockState>,
    wake: Condvar,
    subscribers: Mutex<Vec<Sender<ClockEvent>>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn emit(&self, event: ClockEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

/// The pair of countdown clocks for one game. Each side's clock runs on
/// its own thread; at most one of them is unpaused at a time while the
/// game moves through `switch_to`.
#[derive(Debug)]
pub struct Clocks {
    shared: Arc<Shared>,
    handles: Vec<JoinHandle<()>>,
}

impl Clocks {
    /// Spawns both clock threads with `active`'s clock running. `running`
    /// is the game's shared flag: clearing it stops both clocks, and a
    /// clock reaching zero clears it.
    pub fn start(
        control: TimeControl,
        remaining: [u32; 2],
        active: Side,
        running: Arc<AtomicBool>,
    ) -> Result<Self, ClockError> {
        let shared = Arc::new(Shared {
            running,
            tick: control.tick,
            state: Mutex::new(ClockState {
                remaining,
                paused: [active != Side::Sente, active != Side::Gote],
                elapsed: [Duration::ZERO; 2],
            }),
            wake: Condvar::new(),
            subscribers: Mutex::new(Vec::new()),
        });

        let mut clocks = Self {
            shared,
            handles: Vec::with_capacity(2),
        };
        for side in Side::ALL {
            let shared = Arc::clone(&clocks.shared);
            let spawned = thread::Builder::new()
                .name(format!("clock-{}", side.to_string().to_lowercase()))
                .spawn(move || countdown(&shared, side));
            match spawned {
                Ok(handle) => clocks.handles.push(handle),
                Err(err) => {
                    clocks.stop();
                    return Err(ClockError::Spawn(err.to_string()));
                }
            }
        }
        log::debug!("clocks started at {remaining:?} with {active} to move");
        Ok(clocks)
    }

    pub fn remaining(&self, side: Side) -> u32 {
        self.shared.lock().remaining[side.index()]
    }

    pub fn is_paused(&self, side: Side) -> bool {
        self.shared.lock().paused[side.index()]
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// The side whose clock ran out, if any.
    pub fn expired(&self) -> Option<Side> {
        let state = self.shared.lock();
        Side::ALL
            .into_iter()
            .find(|side| state.remaining[side.index()] == 0)
    }

    pub fn pause(&self, side: Side) {
        let mut state = self.shared.lock();
        state.paused[side.index()] = true;
        self.shared.wake.notify_all();
    }

    pub fn resume(&self, side: Side) {
        let mut state = self.shared.lock();
        state.paused[side.index()] = false;
        self.shared.wake.notify_all();
    }

    /// Runs `side`'s clock and pauses the other in one step.
    pub fn switch_to(&self, side: Side) {
        let mut state = self.shared.lock();
        state.paused[side.index()] = false;
        state.paused[side.opposite().index()] = true;
        self.shared.wake.notify_all();
    }

    pub fn subscribe(&self) -> Receiver<ClockEvent> {
        let (tx, rx) = channel::unbounded();
        self.shared
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Clears the running flag, wakes both threads and waits for them to
    /// exit. Calling it again does nothing.
    pub fn stop(&mut self) {
        {
            let _state = self.shared.lock();
            self.shared.running.store(false, Ordering::Release);
            self.shared.wake.notify_all();
        }
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::warn!("clock thread panicked");
            }
        }
    }
}

impl Drop for Clocks {
    fn drop(&mut self) {
        self.stop();
    }
}

fn countdown(shared: &Shared, side: Side) {
    let idx = side.index();
    let mut state = shared.lock();
    loop {
        if !shared.is_running() {
            return;
        }
        if state.paused[idx] {
            state = shared
                .wake
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
            continue;
        }

        // Sleep out the rest of the tick. A pause or stop arriving meanwhile
        // banks the time already run so the next resume continues from it.
        let started = Instant::now();
        let deadline = started + shared.tick.saturating_sub(state.elapsed[idx]);
        let mut interrupted = false;
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            state = shared
                .wake
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
            if !shared.is_running() || state.paused[idx] {
                interrupted = true;
                break;
            }
        }
        if interrupted {
            state.elapsed[idx] += started.elapsed();
            continue;
        }
        state.elapsed[idx] = Duration::ZERO;

        state.remaining[idx] = state.remaining[idx].saturating_sub(1);
        let remaining = state.remaining[idx];
        log::trace!("{side} clock: {remaining}");
        shared.emit(ClockEvent::Tick { side, remaining });

        if remaining == 0 {
            if shared.running.swap(false, Ordering::AcqRel) {
                log::info!("{side} ran out of time");
                shared.emit(ClockEvent::Expired { side });
            }
            shared.wake.notify_all();
            return;
        }
    }
}
