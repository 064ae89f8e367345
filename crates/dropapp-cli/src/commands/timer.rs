use std::error::Error;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use chrono::Utc;
use clap::Subcommand;
use crossterm::cursor;
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode, ClearType};
use crossterm::{execute, queue};
use tracing::warn;

use dropapp_core::alert::{
    AlertCoordinator, ChannelSet, DesktopNotifier, Flashlight, Notifier, NullAudio,
    NullFlashlight, NullVibration, PendingReminder, TerminalBell, TerminalFlashlight,
};
use dropapp_core::storage::{Config, Database};
use dropapp_core::timer::{format_hms, now_ms, progress_pct, DerivedState, Phase, TimerEngine};
use dropapp_core::Event;

const ENGINE_KEY: &str = "timer_engine";
const REMINDER_KEY: &str = "pending_reminder";
/// Watch-mode tick and redraw cadence.
const TICK_RATE: Duration = Duration::from_millis(50);

#[derive(Subcommand)]
pub enum TimerAction {
    /// Begin a fresh countdown cycle
    Start,
    /// Log a drink and restart the countdown
    Drink,
    /// Print the current timer state as JSON
    Status,
    /// Run the live countdown in the terminal
    Watch,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let mut engine = load_engine(&db, &config);
    let mut coordinator = AlertCoordinator::new(config.alert_settings());

    match action {
        TimerAction::Start => {
            let now = now_ms();
            let event = engine.start(now);
            let mut channels = oneshot_channels(&db);
            coordinator.on_start(engine.interval_ms(), &mut channels);
            save_reminder(&db, channels.notifier.pending())?;
            save_engine(&db, &engine)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Drink => {
            let now = now_ms();
            let event = engine.acknowledge(now);
            if let Event::DrinkLogged {
                interval_ms,
                response_ms,
                ..
            } = &event
            {
                db.record_drink(*interval_ms, *response_ms, Utc::now())?;
            }
            let mut channels = oneshot_channels(&db);
            coordinator.on_acknowledge(engine.interval_ms(), &mut channels);
            save_reminder(&db, channels.notifier.pending())?;
            save_engine(&db, &engine)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Status => {
            let now = now_ms();
            // Tick first so a countdown that ran out while no process was
            // running still crosses into the alert phase.
            let outcome = engine.tick(now);
            println!("{}", serde_json::to_string_pretty(&engine.snapshot(now))?);
            if let Some(event) = outcome.event {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
            // Deliver a due reminder even without a live watch session.
            let mut notifier = DesktopNotifier::with_pending(load_reminder(&db));
            if let Err(e) = notifier.pump(now) {
                warn!(error = %e, "reminder delivery failed");
            }
            save_reminder(&db, notifier.pending())?;
            save_engine(&db, &engine)?;
        }
        TimerAction::Watch => {
            watch(&db, &mut engine, &mut coordinator)?;
        }
    }

    Ok(())
}

fn load_engine(db: &Database, config: &Config) -> TimerEngine {
    let mut engine = match db.kv_get(ENGINE_KEY) {
        Ok(Some(json)) => serde_json::from_str(&json)
            .unwrap_or_else(|_| TimerEngine::new(config.timer.interval_hours)),
        _ => TimerEngine::new(config.timer.interval_hours),
    };
    // Re-apply the configured interval; an out-of-range config value
    // leaves the persisted engine untouched.
    engine.configure(config.timer.interval_hours);
    engine
}

fn save_engine(db: &Database, engine: &TimerEngine) -> Result<(), Box<dyn Error>> {
    db.kv_set(ENGINE_KEY, &serde_json::to_string(engine)?)?;
    Ok(())
}

fn load_reminder(db: &Database) -> Option<PendingReminder> {
    db.kv_get(REMINDER_KEY)
        .ok()
        .flatten()
        .and_then(|json| serde_json::from_str::<Option<PendingReminder>>(&json).ok())
        .flatten()
}

fn save_reminder(db: &Database, pending: Option<PendingReminder>) -> Result<(), Box<dyn Error>> {
    db.kv_set(REMINDER_KEY, &serde_json::to_string(&pending)?)?;
    Ok(())
}

/// One-shot commands have no live terminal surface to flash or beep at;
/// only the scheduled-notification channel is real.
fn oneshot_channels(db: &Database) -> ChannelSet {
    ChannelSet {
        notifier: Box::new(DesktopNotifier::with_pending(load_reminder(db))),
        flashlight: Box::new(NullFlashlight),
        vibration: Box::new(NullVibration),
        audio: Box::new(NullAudio),
    }
}

fn watch(
    db: &Database,
    engine: &mut TimerEngine,
    coordinator: &mut AlertCoordinator,
) -> Result<(), Box<dyn Error>> {
    let mut channels = ChannelSet {
        notifier: Box::new(DesktopNotifier::with_pending(load_reminder(db))),
        flashlight: Box::new(TerminalFlashlight),
        vibration: Box::new(NullVibration),
        audio: Box::new(TerminalBell),
    };

    enable_raw_mode()?;
    execute!(io::stdout(), cursor::Hide)?;

    let result = watch_loop(db, engine, coordinator, &mut channels);

    // Leave the terminal the way we found it, whatever happened.
    let _ = channels.flashlight.disable();
    let _ = execute!(io::stdout(), cursor::Show);
    let _ = disable_raw_mode();
    println!();

    save_reminder(db, channels.notifier.pending())?;
    save_engine(db, engine)?;
    result
}

fn watch_loop(
    db: &Database,
    engine: &mut TimerEngine,
    coordinator: &mut AlertCoordinator,
    channels: &mut ChannelSet,
) -> Result<(), Box<dyn Error>> {
    let mut stdout = io::stdout();
    let mut last_tick = Instant::now();

    loop {
        let now = now_ms();
        let outcome = engine.tick(now);
        coordinator.dispatch(&outcome, channels);
        if let Err(e) = channels.notifier.pump(now) {
            warn!(error = %e, "reminder delivery failed");
        }
        render_line(&mut stdout, &outcome.state, engine.interval_ms())?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let TermEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            break
                        }
                        KeyCode::Char('s') => {
                            engine.start(now);
                            coordinator.on_start(engine.interval_ms(), channels);
                            persist(db, engine, channels);
                        }
                        KeyCode::Char('d') | KeyCode::Char(' ') => {
                            let event = engine.acknowledge(now);
                            if let Event::DrinkLogged {
                                interval_ms,
                                response_ms,
                                ..
                            } = &event
                            {
                                if let Err(e) =
                                    db.record_drink(*interval_ms, *response_ms, Utc::now())
                                {
                                    warn!(error = %e, "drink log write failed");
                                }
                            }
                            coordinator.on_acknowledge(engine.interval_ms(), channels);
                            persist(db, engine, channels);
                        }
                        KeyCode::Char('r') => {
                            let config = Config::load_or_default();
                            engine.configure(config.timer.interval_hours);
                            coordinator.set_settings(config.alert_settings());
                        }
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            last_tick = Instant::now();
        }
    }

    Ok(())
}

/// Persistence inside the watch loop never kills the session; failures
/// are logged and the loop keeps running.
fn persist(db: &Database, engine: &TimerEngine, channels: &ChannelSet) {
    if let Err(e) = save_engine(db, engine) {
        warn!(error = %e, "engine state write failed");
    }
    if let Err(e) = save_reminder(db, channels.notifier.pending()) {
        warn!(error = %e, "reminder state write failed");
    }
}

fn render_line(out: &mut impl Write, state: &DerivedState, interval_ms: u64) -> io::Result<()> {
    let line = match state.phase {
        Phase::Idle => format!("idle      {}   [s]tart  [q]uit", format_hms(interval_ms)),
        Phase::Counting => format!(
            "counting  {}   {:>5.1}%   [d]rink  [r]eload  [q]uit",
            format_hms(state.remaining_ms),
            progress_pct(state.remaining_ms, interval_ms)
        ),
        Phase::Alerting => format!(
            "DRINK NOW!  alerting for {}   [d]rink  [q]uit",
            format_hms(state.alert_elapsed_ms)
        ),
    };
    queue!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine)
    )?;
    write!(out, "{line}")?;
    out.flush()
}
