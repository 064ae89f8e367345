//! # DropApp Core Library
//!
//! Core logic for DropApp, a hydration reminder: a countdown that, once
//! it runs out, nags across every available channel until the user
//! drinks. This crate keeps the state machine, the alert fan-out, and
//! storage independent of any rendering surface; the CLI is one consumer.
//!
//! ## Architecture
//!
//! - **Timer Engine**: wall-clock state machine; the caller feeds `now`
//!   into `tick()` periodically, the engine never reads the clock itself
//! - **Alert Coordinator**: turns tick outcomes into per-channel commands
//!   (scheduled notification, flashlight, vibration, alarm sound), with
//!   channels failing independently
//! - **Storage**: SQLite drink log plus kv state, and TOML configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core countdown state machine
//! - [`AlertCoordinator`]: Channel fan-out with flashlight dedupe
//! - [`Database`]: Drink log and persisted state
//! - [`Config`]: Application configuration management

pub mod alert;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use alert::{AlertCoordinator, AlertSettings, ChannelSet, DesktopNotifier};
pub use error::{ChannelError, ConfigError, CoreError, DatabaseError, Result};
pub use events::Event;
pub use storage::{Config, Database, Stats};
pub use timer::{DerivedState, Phase, TickOutcome, TimerEngine};
