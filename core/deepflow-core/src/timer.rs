//! Timer engine: a persisted stopwatch with a completion target.
//!
//! ## State Machine
//!
//! ```text
//! Idle    --start-->  Running
//! Running --pause-->  Paused
//! Paused  --start-->  Running
//! Running --stop/target reached--> Idle   (returns elapsed)
//! Paused  --stop-->   Idle                (returns elapsed)
//! any     --reset-->  Idle
//! ```
//!
//! Elapsed time is never accumulated tick by tick. It is recomputed from the
//! persisted start time on every read, so a tick that arrives late, or a
//! process that was suspended or restarted, lands on the wall-clock value.
//!
//! ## Persistence Ordering
//!
//! Every transition flips the in-memory state first and then writes the full
//! snapshot to the local store. A failed write is logged; the in-memory state
//! stays authoritative for the rest of the process.
//!
//! ## Shared Store
//!
//! Several processes may drive the same store (a foreground `run` loop and a
//! one-shot `stop`). [`TimerEngine::reload`] adopts a snapshot written by
//! someone else; the engine remembers the last snapshot it read or wrote
//! successfully so a failed local write is never mistaken for a foreign one.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{FocusError, Result};
use crate::local::LocalStore;
use crate::types::TimerState;

// ═══════════════════════════════════════════════════════════════════════════════
// Target Duration
// ═══════════════════════════════════════════════════════════════════════════════

pub const MIN_TARGET_MINUTES: u32 = 1;
pub const MAX_TARGET_MINUTES: u32 = 240;
pub const DEFAULT_TARGET_MINUTES: u32 = 30;
pub const TARGET_PRESETS: [u32; 4] = [15, 30, 45, 60];

/// Target session length in minutes, always within 1-240.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDuration(u32);

impl TargetDuration {
    pub fn new(minutes: u32) -> Result<Self> {
        if (MIN_TARGET_MINUTES..=MAX_TARGET_MINUTES).contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(FocusError::InvalidTarget { minutes })
        }
    }

    /// Saturates into range instead of rejecting.
    pub fn clamped(minutes: u32) -> Self {
        Self(minutes.clamp(MIN_TARGET_MINUTES, MAX_TARGET_MINUTES))
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    pub fn seconds(&self) -> u64 {
        u64::from(self.0) * 60
    }
}

impl Default for TargetDuration {
    fn default() -> Self {
        Self(DEFAULT_TARGET_MINUTES)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Engine
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
}

/// Result of a periodic tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Paused { elapsed: u64 },
    Running { elapsed: u64 },
    /// The target was reached: the engine has already stopped itself and
    /// persisted the idle state. `elapsed` is the final value.
    Completed { elapsed: u64 },
}

pub struct TimerEngine {
    store: Arc<LocalStore>,
    clock: Arc<dyn Clock>,
    state: TimerState,
    /// Last snapshot known to be in the store.
    on_disk: TimerState,
    target: TargetDuration,
}

impl TimerEngine {
    /// Rebuilds the engine from the persisted snapshot.
    ///
    /// A snapshot persisted while running keeps accruing time across the gap
    /// exactly as if the process had never stopped.
    pub fn restore(store: Arc<LocalStore>, clock: Arc<dyn Clock>, target: TargetDuration) -> Self {
        let persisted = store.timer_state();
        let mut engine = Self {
            store,
            clock,
            state: persisted,
            on_disk: persisted,
            target,
        };

        if !persisted.is_consistent() {
            // Running without a start time cannot be recomputed; keep what was banked.
            warn!(
                is_running = persisted.is_running,
                has_start = persisted.start_time.is_some(),
                "Inconsistent timer state on disk, normalizing to paused"
            );
            engine.state = TimerState::paused(persisted.accumulated_time);
            engine.persist();
        }

        debug!(
            phase = ?engine.phase(),
            elapsed = engine.elapsed(),
            "Timer restored"
        );
        engine
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn target(&self) -> TargetDuration {
        self.target
    }

    pub fn set_target(&mut self, target: TargetDuration) {
        self.target = target;
    }

    /// Elapsed whole seconds for the current cycle, read from the clock.
    pub fn elapsed(&self) -> u64 {
        self.state.elapsed_at(self.clock.now_millis())
    }

    pub fn phase(&self) -> TimerPhase {
        if self.state.is_running {
            TimerPhase::Running
        } else if self.state.accumulated_time > 0 {
            TimerPhase::Paused
        } else {
            TimerPhase::Idle
        }
    }

    /// Starts or resumes. No-op if already running.
    pub fn start(&mut self) {
        if self.state.is_running {
            return;
        }
        let now = self.clock.now_millis();
        self.state = TimerState::running(now, self.state.accumulated_time);
        self.persist();
        info!(accumulated = self.state.accumulated_time, "Timer started");
    }

    /// Banks the running segment. No-op if not running.
    pub fn pause(&mut self) {
        if !self.state.is_running {
            return;
        }
        let elapsed = self.elapsed();
        self.state = TimerState::paused(elapsed);
        self.persist();
        info!(elapsed, "Timer paused");
    }

    /// Returns the final elapsed seconds and resets to idle.
    ///
    /// Always succeeds; returning 0 is valid and the caller decides whether
    /// the cycle is worth recording.
    pub fn stop(&mut self) -> u64 {
        let elapsed = self.elapsed();
        self.state = TimerState::idle();
        self.persist();
        info!(elapsed, "Timer stopped");
        elapsed
    }

    /// Forces idle regardless of the current state.
    pub fn reset(&mut self) {
        self.state = TimerState::idle();
        self.persist();
        info!("Timer reset");
    }

    /// Recomputes elapsed time from the clock and fires completion once the
    /// target is reached while running.
    pub fn tick(&mut self) -> Tick {
        match self.phase() {
            TimerPhase::Idle => Tick::Idle,
            TimerPhase::Paused => Tick::Paused {
                elapsed: self.state.accumulated_time,
            },
            TimerPhase::Running => {
                let elapsed = self.elapsed();
                if elapsed >= self.target.seconds() {
                    let elapsed = self.stop();
                    info!(
                        elapsed,
                        target_minutes = self.target.minutes(),
                        "Target reached"
                    );
                    Tick::Completed { elapsed }
                } else {
                    Tick::Running { elapsed }
                }
            }
        }
    }

    /// Adopts the persisted snapshot if another writer changed it since this
    /// engine last read or wrote it. Returns true when the state changed.
    pub fn reload(&mut self) -> bool {
        let persisted = self.store.timer_state();
        if persisted == self.on_disk {
            return false;
        }

        self.on_disk = persisted;
        self.state = if persisted.is_consistent() {
            persisted
        } else {
            TimerState::paused(persisted.accumulated_time)
        };
        info!(
            phase = ?self.phase(),
            elapsed = self.elapsed(),
            "Timer changed by another writer, adopting stored state"
        );
        true
    }

    fn persist(&mut self) {
        match self.store.save_timer_state(&self.state) {
            Ok(()) => self.on_disk = self.state,
            Err(err) => warn!(error = %err, "Failed to persist timer state"),
        }
    }
}
