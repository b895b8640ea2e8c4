//! Tracker - the session lifecycle the application shell drives.
//!
//! Owns the timer engine and the sync coordinator. A cycle that ends, either
//! by the user stopping it or by the target being reached on a tick, becomes a
//! recorded session only when it lasted more than [`MIN_RECORDED_SECS`];
//! shorter cycles are discarded and the timer is simply back to idle.
//!
//! Both entry points first adopt any timer change another process wrote to
//! the store, so a cycle stopped elsewhere is never recorded a second time.

use std::sync::Arc;

use tracing::{debug, info};

use crate::clock::Clock;
use crate::sync::SyncCoordinator;
use crate::timer::{TargetDuration, Tick, TimerEngine};
use crate::types::Session;

/// Cycles of this many seconds or fewer are not recorded.
pub const MIN_RECORDED_SECS: u64 = 10;

pub struct Tracker {
    timer: TimerEngine,
    sync: SyncCoordinator,
    clock: Arc<dyn Clock>,
    sessions: Vec<Session>,
}

impl Tracker {
    /// Restores the timer from the local store and loads the session list
    /// from whichever store is authoritative.
    pub async fn new(sync: SyncCoordinator, clock: Arc<dyn Clock>, target: TargetDuration) -> Self {
        let timer = TimerEngine::restore(sync.local().clone(), clock.clone(), target);
        let sessions = sync.fetch_sessions().await;
        Self {
            timer,
            sync,
            clock,
            sessions,
        }
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut TimerEngine {
        &mut self.timer
    }

    /// Last session list seen, newest first.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Re-fetches sessions, e.g. after the identity changed.
    pub async fn refresh(&mut self) -> &[Session] {
        self.sessions = self.sync.fetch_sessions().await;
        &self.sessions
    }

    /// User-initiated stop. Returns the elapsed seconds that were judged and
    /// the recorded session, if any.
    pub async fn finish(&mut self) -> (u64, Option<Session>) {
        self.timer.reload();
        let elapsed = self.timer.stop();
        (elapsed, self.record(elapsed).await)
    }

    /// Periodic tick. When the target is reached the cycle is finished and
    /// recorded exactly as a user stop would be.
    pub async fn tick(&mut self) -> (Tick, Option<Session>) {
        self.timer.reload();
        let tick = self.timer.tick();
        let recorded = match tick {
            Tick::Completed { elapsed } => self.record(elapsed).await,
            _ => None,
        };
        (tick, recorded)
    }

    async fn record(&mut self, elapsed: u64) -> Option<Session> {
        if elapsed <= MIN_RECORDED_SECS {
            debug!(elapsed, "Discarding short session");
            return None;
        }

        let session = Session::new(elapsed, self.clock.now_millis());
        info!(id = %session.id, duration = session.duration, "Recording session");
        self.sessions = self.sync.add_session(session.clone()).await;
        Some(session)
    }
}
