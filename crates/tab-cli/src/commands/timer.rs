use clap::Subcommand;
use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tab_core::notify::format_clock;
use tab_core::timer::DEFAULT_TICK_INTERVAL;
use tab_core::Phase;
use tokio::time::MissedTickBehavior;

use super::{open_engine, print_event, CliEngine};

/// A wake-up later than this after the previous one means the process was
/// suspended (Ctrl-Z, system sleep) and is treated as hidden -> visible.
const SUSPEND_GAP: Duration = Duration::from_secs(1);

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Restore the full duration of the current phase
    Reset,
    /// Switch to the other phase without completing this one
    Skip,
    /// Start a full-length break immediately
    Break,
    /// Print current timer state as JSON
    Status,
    /// Run the countdown in the foreground until the phase completes
    Run {
        /// Start the break right away when a focus phase completes
        #[arg(long)]
        auto_break: bool,
        /// Only attach to an already running timer
        #[arg(long)]
        no_start: bool,
    },
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    if let TimerAction::Run {
        auto_break,
        no_start,
    } = action
    {
        return run_foreground(auto_break, no_start);
    }

    let mut engine = open_engine(|_| {});
    let event = match action {
        TimerAction::Start => engine.start(),
        TimerAction::Pause => engine.pause(),
        TimerAction::Reset => engine.reset(),
        TimerAction::Skip => engine.skip(),
        TimerAction::Break => engine.start_break(),
        TimerAction::Status => {
            // Tick to resynchronize with the deadline
            if let Some(completed) = engine.tick() {
                print_event(&completed)?;
            }
            Some(engine.snapshot())
        }
        TimerAction::Run { .. } => unreachable!("handled above"),
    };

    match event {
        Some(event) => print_event(&event)?,
        None => print_event(&engine.snapshot())?,
    }
    Ok(())
}

fn run_foreground(auto_break: bool, no_start: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ended: Rc<Cell<Option<Phase>>> = Rc::default();
    let sink = Rc::clone(&ended);
    let mut engine = open_engine(move |phase| sink.set(Some(phase)));

    if !engine.is_running() && !no_start {
        if let Some(event) = engine.start() {
            tracing::debug!(?event, "started for foreground run");
        }
    }
    if !engine.is_running() {
        return print_event(&engine.snapshot());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(&mut engine, auto_break, &ended))
}

/// Cooperative tick loop: one engine, one task, ticks every 100ms until the
/// timer stops or the user interrupts.
async fn drive(
    engine: &mut CliEngine,
    auto_break: bool,
    ended: &Cell<Option<Phase>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut interval = tokio::time::interval(DEFAULT_TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut last_wake = Instant::now();
    let mut shown = None;

    while engine.tick_interval().is_some() {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!();
                eprintln!("detached; the timer keeps running and resumes on the next command");
                return Ok(());
            }
            _ = interval.tick() => {}
        }

        let gap = last_wake.elapsed();
        last_wake = Instant::now();
        let completed = if gap > SUSPEND_GAP {
            tracing::debug!(?gap, "woke up late, resynchronizing");
            engine.set_visibility(false);
            engine.set_visibility(true)
        } else {
            engine.tick()
        };

        if let Some(event) = completed {
            println!();
            print_event(&event)?;
            shown = None;
            if auto_break && ended.take() == Some(Phase::Focus) {
                if let Some(started) = engine.start_break() {
                    print_event(&started)?;
                }
            }
            continue;
        }

        let current = (engine.phase(), engine.remaining_secs());
        if shown != Some(current) {
            render(current.0, current.1)?;
            shown = Some(current);
        }
    }
    Ok(())
}

fn render(phase: Phase, remaining_secs: u64) -> std::io::Result<()> {
    let label = match phase {
        Phase::Focus => "Deep Work Session",
        Phase::Break => "Recharge Break",
    };
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "\r{label}  {}  ", format_clock(remaining_secs))?;
    stdout.flush()
}
