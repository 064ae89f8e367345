mod display;
mod engine;

pub use display::{format_hms, progress_pct};
pub use engine::{
    now_ms, DerivedState, Phase, TickOutcome, TimerEngine, DEFAULT_INTERVAL_MS,
    MAX_INTERVAL_HOURS,
};
