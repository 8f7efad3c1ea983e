//! Integration tests for the timer engine running on a simulated clock.
//!
//! Covers phase completion, manual overrides, drift robustness and the
//! resume-from-storage scenarios.

use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use tab_core::storage::TIMER_STATE_KEY;
use tab_core::{Config, ManualClock, MemoryStore, Phase, StateStore, TimerEngine, TimerSnapshot};

const T: u64 = 1_700_000_000_000;

// ============================================================================
// Test Helpers
// ============================================================================

type Completions = Rc<RefCell<Vec<Phase>>>;

struct Harness {
    engine: TimerEngine<MemoryStore, ManualClock>,
    clock: ManualClock,
    completions: Completions,
}

fn harness_with(store: MemoryStore, now: u64) -> Harness {
    let clock = ManualClock::new(now);
    let completions: Completions = Rc::default();
    let sink = Rc::clone(&completions);
    let mut engine = TimerEngine::new(store, clock.clone(), move |phase| {
        sink.borrow_mut().push(phase);
    });
    engine.resume_from_storage();
    Harness {
        engine,
        clock,
        completions,
    }
}

fn store_with_config(focus: u32, brk: u32) -> MemoryStore {
    let mut store = MemoryStore::new();
    store.save_config(&Config {
        focus_duration: focus,
        break_duration: brk,
        ..Config::default()
    });
    store
}

fn store_with_snapshot(snapshot: TimerSnapshot) -> MemoryStore {
    let mut store = MemoryStore::new();
    store.save_snapshot(&snapshot);
    store
}

/// Tick every 100ms of simulated time for `secs` seconds.
fn run_for(h: &mut Harness, secs: u64) {
    for _ in 0..secs * 10 {
        h.clock.advance_ms(100);
        h.engine.tick();
    }
}

fn state(h: &Harness) -> (Phase, bool, u64) {
    (h.engine.phase(), h.engine.is_running(), h.engine.remaining_secs())
}

// ============================================================================
// Phase completion
// ============================================================================

#[test]
fn focus_runs_to_completion_then_break_waits() {
    let mut h = harness_with(store_with_config(1, 2), T);
    h.engine.start();
    run_for(&mut h, 60);

    assert_eq!(*h.completions.borrow(), vec![Phase::Focus]);
    assert_eq!(state(&h), (Phase::Break, false, 120));
    assert!(h.engine.store().read_snapshot().is_none());
}

#[test]
fn break_completion_returns_to_focus() {
    let mut h = harness_with(store_with_config(3, 1), T);
    h.engine.start_break();
    run_for(&mut h, 60);

    assert_eq!(*h.completions.borrow(), vec![Phase::Break]);
    assert_eq!(state(&h), (Phase::Focus, false, 180));
}

#[test]
fn countdown_is_not_complete_one_tick_early() {
    let mut h = harness_with(store_with_config(1, 1), T);
    h.engine.start();
    h.clock.advance_ms(59_999);
    assert!(h.engine.tick().is_none());
    assert_eq!(h.engine.remaining_secs(), 1);
    h.clock.advance_ms(1);
    assert!(h.engine.tick().is_some());
}

// ============================================================================
// Drift robustness
// ============================================================================

#[test]
fn delayed_tick_reads_the_deadline() {
    let mut h = harness_with(MemoryStore::new(), T);
    h.engine.start();
    // Several intervals pass before the tick fires.
    h.clock.advance_ms(7_350);
    h.engine.tick();
    assert_eq!(h.engine.remaining_secs(), 1500 - 7);
    h.engine.tick();
    assert_eq!(h.engine.remaining_secs(), 1500 - 7);
}

#[test]
fn at_most_one_tick_registration() {
    let mut h = harness_with(MemoryStore::new(), T);
    h.engine.start();
    let first = h.engine.ticker().active();
    h.engine.start_break();
    h.engine.start();
    let last = h.engine.ticker().active();
    assert!(last.is_some());
    assert_ne!(first, last);
    h.engine.skip();
    assert!(h.engine.ticker().active().is_none());
    assert!(h.engine.tick_interval().is_none());
}

// ============================================================================
// Persistence on every command
// ============================================================================

#[test]
fn commands_write_through_synchronously() {
    let mut h = harness_with(MemoryStore::new(), T);

    h.engine.start();
    let s = h.engine.store().read_snapshot().unwrap();
    assert_eq!(
        (s.phase, s.running, s.remaining_secs, s.saved_at_ms),
        (Phase::Focus, true, 1500, T)
    );

    h.clock.advance_ms(4_200);
    h.engine.tick();
    h.engine.pause();
    let s = h.engine.store().read_snapshot().unwrap();
    assert_eq!((s.running, s.remaining_secs), (false, 1496));

    h.engine.skip();
    let s = h.engine.store().read_snapshot().unwrap();
    assert_eq!((s.phase, s.running, s.remaining_secs), (Phase::Break, false, 300));

    h.engine.reset();
    h.engine.start_break();
    let s = h.engine.store().read_snapshot().unwrap();
    assert_eq!((s.phase, s.running, s.remaining_secs), (Phase::Break, true, 300));
}

#[test]
fn ordinary_ticks_do_not_write() {
    let mut h = harness_with(MemoryStore::new(), T);
    h.engine.start();
    let writes = h.engine.store().writes();
    run_for(&mut h, 5);
    assert_eq!(h.engine.store().writes(), writes);
}

// ============================================================================
// Resume from storage
// ============================================================================

fn running_focus_120() -> TimerSnapshot {
    TimerSnapshot {
        phase: Phase::Focus,
        running: true,
        remaining_secs: 120,
        saved_at_ms: T,
    }
}

#[test]
fn resume_after_deadline_lands_in_next_phase_silently() {
    let h = harness_with(store_with_snapshot(running_focus_120()), T + 150_000);
    assert_eq!(state(&h), (Phase::Break, false, 300));
    assert!(h.completions.borrow().is_empty());
    assert!(h.engine.tick_interval().is_none());
}

#[test]
fn resume_before_deadline_keeps_running() {
    let mut h = harness_with(store_with_snapshot(running_focus_120()), T + 50_000);
    assert_eq!(state(&h), (Phase::Focus, true, 70));
    assert_eq!(h.engine.scheduled_end_ms(), Some(T + 50_000 + 70_000));

    h.clock.advance_ms(70_000);
    h.engine.tick();
    assert_eq!(*h.completions.borrow(), vec![Phase::Focus]);
}

#[test]
fn resume_paused_snapshot_verbatim() {
    let snapshot = TimerSnapshot {
        phase: Phase::Break,
        running: false,
        remaining_secs: 99,
        saved_at_ms: T,
    };
    let h = harness_with(store_with_snapshot(snapshot), T + 86_400_000);
    assert_eq!(state(&h), (Phase::Break, false, 99));
}

#[test]
fn resume_without_snapshot_starts_fresh_focus() {
    let h = harness_with(store_with_config(40, 10), T);
    assert_eq!(state(&h), (Phase::Focus, false, 2400));
}

#[test]
fn resume_with_corrupt_snapshot_starts_fresh_focus() {
    let mut store = MemoryStore::new();
    store.insert_raw(TIMER_STATE_KEY, "{\"mode\":\"focus\",\"isActive\":tru");
    let h = harness_with(store, T);
    assert_eq!(state(&h), (Phase::Focus, false, 1500));
}

#[test]
fn save_then_load_round_trip() {
    let mut store = MemoryStore::new();
    let s = running_focus_120();
    store.save_snapshot(&s);
    assert_eq!(store.load_snapshot(1500, 300, T), s);
}

// ============================================================================
// Configuration changes
// ============================================================================

#[test]
fn idle_config_change_resizes_current_phase() {
    let mut h = harness_with(store_with_config(10, 5), T);
    assert_eq!(state(&h), (Phase::Focus, false, 600));

    let config = Config {
        focus_duration: 25,
        ..*h.engine.config()
    };
    h.engine.update_config(config);
    assert_eq!(state(&h), (Phase::Focus, false, 1500));
    assert_eq!(h.engine.store().load_config().focus_duration, 25);
    assert_eq!(h.engine.store().read_snapshot().unwrap().remaining_secs, 1500);
}

#[test]
fn running_countdown_ignores_config_change() {
    let mut h = harness_with(MemoryStore::new(), T);
    h.engine.start();
    h.clock.advance_ms(10_000);
    h.engine.tick();
    h.engine.update_config(Config {
        focus_duration: 50,
        ..Config::default()
    });
    assert_eq!(state(&h), (Phase::Focus, true, 1490));
}

#[test]
fn other_phase_change_keeps_remaining() {
    let mut h = harness_with(MemoryStore::new(), T);
    h.engine.start();
    h.clock.advance_ms(10_000);
    h.engine.tick();
    h.engine.pause();
    h.engine.update_config(Config {
        break_duration: 15,
        ..Config::default()
    });
    assert_eq!(state(&h), (Phase::Focus, false, 1490));

    h.engine.skip();
    assert_eq!(h.engine.remaining_secs(), 900);
}

#[test]
fn config_change_is_clamped() {
    let mut h = harness_with(MemoryStore::new(), T);
    h.engine.update_config(Config {
        focus_duration: 0,
        break_duration: 400,
        ..Config::default()
    });
    assert_eq!(h.engine.config().focus_duration, 1);
    assert_eq!(h.engine.config().break_duration, 30);
    assert_eq!(h.engine.remaining_secs(), 60);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn full_focus_yields_one_completion(focus in 1u32..=120, brk in 1u32..=30) {
        let mut h = harness_with(store_with_config(focus, brk), T);
        h.engine.start();
        let focus_ms = u64::from(focus) * 60_000;
        h.clock.advance_ms(focus_ms - 1);
        h.engine.tick();
        prop_assert!(h.completions.borrow().is_empty());
        h.clock.advance_ms(1);
        h.engine.tick();
        h.engine.tick();
        prop_assert_eq!(h.completions.borrow().clone(), vec![Phase::Focus]);
        prop_assert_eq!(state(&h), (Phase::Break, false, u64::from(brk) * 60));
    }

    #[test]
    fn skip_from_any_state_never_completes(
        running in any::<bool>(),
        on_break in any::<bool>(),
        elapsed_ms in 0u64..200_000,
    ) {
        let mut h = harness_with(MemoryStore::new(), T);
        if on_break {
            h.engine.skip();
        }
        if running {
            h.engine.start();
            h.clock.advance_ms(elapsed_ms);
            h.engine.tick();
        }
        let completed_before = h.completions.borrow().len();
        let phase = h.engine.phase();
        h.engine.skip();
        prop_assert_eq!(h.completions.borrow().len(), completed_before);
        let expected = if phase.other() == Phase::Focus { 1500 } else { 300 };
        prop_assert_eq!(state(&h), (phase.other(), false, expected));
    }

    #[test]
    fn tick_matches_deadline_formula(delay_ms in 0u64..2_000_000) {
        let mut h = harness_with(MemoryStore::new(), T);
        h.engine.start();
        let deadline = h.engine.scheduled_end_ms().unwrap();
        h.clock.advance_ms(delay_ms);
        h.engine.tick();
        let now = T + delay_ms;
        if now < deadline {
            prop_assert_eq!(h.engine.remaining_secs(), (deadline - now).div_ceil(1000));
        } else {
            prop_assert_eq!(state(&h), (Phase::Break, false, 300));
        }
    }
}
