//! # deepflow-core
//!
//! Core library for Deepflow, a personal focus-session tracker: a persisted
//! countdown/stopwatch, a log of completed sessions and free-form notes,
//! optionally synchronized to a remote account store.
//!
//! ## Design Principles
//!
//! - **Wall-clock accounting**: elapsed time is always recomputed from the
//!   persisted start time, so reloads, crashes and missed ticks self-correct.
//! - **Graceful degradation**: missing or malformed local data reads as
//!   defaults; remote failures fall back to the local snapshot or are logged.
//! - **Explicit ownership**: the timer engine, local store and sync
//!   coordinator are plain values handed to whoever needs them.
//! - **Authority per call**: each sync operation resolves the current identity
//!   once and picks the local or remote backend for that call only.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use deepflow_core::{LocalStore, NoIdentity, StorageConfig, SyncCoordinator, SystemClock, Tracker};
//!
//! let store = Arc::new(LocalStore::open(StorageConfig::from_env()?));
//! let sync = SyncCoordinator::local_only(store, Arc::new(NoIdentity));
//! let mut tracker = Tracker::new(sync, Arc::new(SystemClock), Default::default()).await;
//! tracker.timer_mut().start();
//! // ... later
//! let (elapsed, recorded) = tracker.finish().await;
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod local;
pub mod notes;
pub mod remote;
pub mod stats;
pub mod storage;
pub mod sync;
pub mod timer;
pub mod tracker;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{FocusConfig, RemoteConfig};
pub use error::{FocusError, Result};
pub use identity::{IdentityProvider, NoIdentity, SharedIdentity, UserIdentity};
pub use local::{LocalKey, LocalStore};
pub use remote::{MemoryRemoteStore, RemoteStore};
pub use stats::{daily_totals, format_clock, format_duration, DailyTotal, SessionStats};
pub use storage::StorageConfig;
pub use sync::{Entity, EntityBackend, Source, SyncCoordinator};
pub use timer::{TargetDuration, Tick, TimerEngine, TimerPhase};
pub use tracker::{Tracker, MIN_RECORDED_SECS};
pub use types::{Note, Session, Theme, TimerState};
