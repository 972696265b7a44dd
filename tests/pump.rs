//! End-to-end behaviour of the controller stack, nested pumps and sleep,
//! driven by a scripted platform on virtual time.

#![allow(clippy::unwrap_used)]

use std::{cell::Cell, cell::RefCell, rc::Rc, time::Duration};

use modalpump::{
    Controller, EventHandler, Key, PumpError, Wait, Waitable, WaitableController,
    controller::{ReadChoiceController, WaitController, controller_ref},
    platform::{InputEvent, ScriptedPlatform},
};

type Log = Rc<RefCell<Vec<String>>>;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn handler(platform: ScriptedPlatform, base_tick_ms: u64) -> EventHandler {
    EventHandler::new(Box::new(platform), ms(base_tick_ms)).unwrap()
}

fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

type ProbeFn = Box<dyn FnMut(&mut EventHandler, Key, &mut Waitable<char>) -> bool>;

/// A waitable controller whose key handling is supplied by the test.
struct Probe {
    on_key: ProbeFn,
    waitable: Waitable<char>,
}

impl Probe {
    fn new<F>(on_key: F) -> Rc<RefCell<Self>>
    where
        F: FnMut(&mut EventHandler, Key, &mut Waitable<char>) -> bool + 'static,
    {
        Rc::new(RefCell::new(Self {
            on_key: Box::new(on_key),
            waitable: Waitable::new(),
        }))
    }
}

impl Controller for Probe {
    fn key_pressed(&mut self, events: &mut EventHandler, key: Key) -> bool {
        (self.on_key)(events, key, &mut self.waitable)
    }
}

impl WaitableController for Probe {
    type Output = char;

    fn waitable(&self) -> &Waitable<char> {
        &self.waitable
    }

    fn waitable_mut(&mut self) -> &mut Waitable<char> {
        &mut self.waitable
    }
}

/// Bottom controller with a configurable tick rate.
struct Ticker {
    interval: Option<u32>,
    ticks: Rc<Cell<u32>>,
    on_key: Box<dyn FnMut(&mut EventHandler, Key) -> bool>,
}

impl Controller for Ticker {
    fn key_pressed(&mut self, events: &mut EventHandler, key: Key) -> bool {
        (self.on_key)(events, key)
    }

    fn timer_fired(&mut self, _events: &mut EventHandler) {
        self.ticks.set(self.ticks.get() + 1);
    }

    fn tick_interval(&self) -> Option<u32> {
        self.interval
    }
}

#[test]
fn choice_read_inside_game_mode_returns_to_caller() {
    let platform = ScriptedPlatform::new()
        .key_at(10, Key::char('x'))
        .key_at(20, Key::char('q'))
        .key_at(30, Key::char('y'));
    let mut events = handler(platform, 100);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let record = Rc::clone(&seen);
    events.push_key_handler(move |events, key| {
        if key != Key::char('x') {
            return false;
        }
        let choice = Rc::new(RefCell::new(ReadChoiceController::new("yn")));
        let answer = choice.wait(events).unwrap();
        record.borrow_mut().push((answer, events.stack_depth()));
        true
    });

    events.run().unwrap();

    assert_eq!(*seen.borrow(), vec![('y', 1)]);
    assert_eq!(events.stack_depth(), 1);
    assert_eq!(events.pump_depth(), 0);
}

#[test]
fn inner_completion_only_stops_inner_pump() {
    let platform = ScriptedPlatform::new()
        .key_at(10, Key::char('x'))
        .key_at(20, Key::char('b'))
        .key_at(30, Key::char('i'))
        .key_at(40, Key::char('z'))
        .key_at(50, Key::char('o'));
    let mut events = handler(platform, 100);
    let trace = log();

    let outer_log = Rc::clone(&trace);
    let outer = Probe::new(move |events, key, waitable| match key.as_char() {
        Some('b') => {
            let inner = Rc::new(RefCell::new(ReadChoiceController::new("i")));
            let answer = inner.wait(events).unwrap();
            outer_log
                .borrow_mut()
                .push(format!("inner {answer} at depth {}", events.pump_depth()));
            true
        }
        Some('o') => {
            waitable.mark_done(events.signals(), 'o');
            true
        }
        Some(c) => {
            outer_log.borrow_mut().push(format!("outer saw {c}"));
            true
        }
        None => false,
    });

    let game_log = Rc::clone(&trace);
    events.push_key_handler(move |events, key| {
        if key == Key::char('x') {
            let answer = outer.wait(events).unwrap();
            game_log.borrow_mut().push(format!("outer {answer}"));
        }
        true
    });

    events.run().unwrap();

    assert_eq!(
        entries(&trace),
        vec!["inner i at depth 2", "outer saw z", "outer o"]
    );
}

#[test]
fn ending_unwinds_every_pump_inside_out() {
    let platform = ScriptedPlatform::new()
        .key_at(10, Key::char('a'))
        .key_at(20, Key::char('b'))
        .key_at(30, Key::char('e'))
        .key_at(30, Key::char('z'));
    let mut events = handler(platform, 100);
    let trace = log();

    let inner_log = Rc::clone(&trace);
    let inner = Probe::new(move |events, key, _| {
        inner_log.borrow_mut().push(format!("inner key {key}"));
        if key == Key::char('e') {
            events.end();
        }
        true
    });

    let middle_log = Rc::clone(&trace);
    let middle = Probe::new(move |events, key, _| {
        if key == Key::char('b') {
            let result = inner.wait(events);
            assert!(matches!(result, Err(PumpError::Cancelled)));
            middle_log.borrow_mut().push("middle unwound".to_string());
        }
        true
    });

    let game_log = Rc::clone(&trace);
    events.push_key_handler(move |events, key| {
        if key == Key::char('a') {
            let result = middle.wait(events);
            assert!(matches!(result, Err(PumpError::Cancelled)));
            game_log.borrow_mut().push("game unwound".to_string());
        }
        true
    });

    events.run().unwrap();

    let trace = entries(&trace);
    assert_eq!(trace[0], format!("inner key {}", Key::char('e')));
    assert_eq!(&trace[1..], ["middle unwound", "game unwound"]);
    assert!(events.is_ended());
    assert_eq!(events.pump_depth(), 0);
}

#[test]
fn self_removing_timer_fires_three_times() {
    let mut events = handler(ScriptedPlatform::new(), 100);
    let fired = Rc::new(Cell::new(0));

    let count = Rc::clone(&fired);
    events.timers_mut().add(5, move |timers, me| {
        count.set(count.get() + 1);
        if count.get() == 3 {
            timers.remove(me);
        }
    });

    for _ in 0..20 {
        events.timers_mut().tick();
    }

    assert_eq!(fired.get(), 3);
    assert!(events.timers().is_empty());
}

#[test]
fn sleep_discards_input_but_keeps_timers_running() {
    let platform = ScriptedPlatform::new()
        .key_at(0, Key::char('s'))
        .key_at(100, Key::char('a'))
        .key_at(600, Key::char('b'))
        .key_at(1500, Key::char('k'));
    let mut events = handler(platform, 250);

    let fired = Rc::new(Cell::new(0));
    let count = Rc::clone(&fired);
    events.timers_mut().add(1, move |_, _| count.set(count.get() + 1));

    let keys = Rc::new(RefCell::new(Vec::new()));
    let during_sleep = Rc::new(Cell::new(None));

    let seen = Rc::clone(&keys);
    let counter = Rc::clone(&fired);
    let delta = Rc::clone(&during_sleep);
    events.push_key_handler(move |events, key| {
        seen.borrow_mut().push(key);
        if key == Key::char('s') {
            let before = counter.get();
            events.sleep(ms(1000)).unwrap();
            delta.set(Some(counter.get() - before));
        }
        true
    });

    events.run().unwrap();

    assert_eq!(during_sleep.get(), Some(4));
    assert_eq!(*keys.borrow(), vec![Key::char('s'), Key::char('k')]);
}

#[test]
fn sleep_discards_keys_fetched_in_the_same_batch() {
    let platform = ScriptedPlatform::new()
        .key_at(0, Key::char('s'))
        .key_at(0, Key::char('a'))
        .key_at(1500, Key::char('k'));
    let mut events = handler(platform, 250);

    let keys = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&keys);
    events.push_key_handler(move |events, key| {
        seen.borrow_mut().push((key, events.now()));
        if key == Key::char('s') {
            events.sleep(ms(1000)).unwrap();
        }
        true
    });

    events.run().unwrap();

    assert_eq!(
        *keys.borrow(),
        vec![(Key::char('s'), Duration::ZERO), (Key::char('k'), ms(1500))]
    );
}

#[test]
fn quit_queued_before_sleep_still_ends_the_pump() {
    let platform = ScriptedPlatform::new()
        .key_at(0, Key::char('s'))
        .at(Duration::ZERO, InputEvent::Quit);
    let mut events = handler(platform, 100);

    events.push_key_handler(|events, key| {
        if key == Key::char('s') {
            events.sleep(ms(10_000)).unwrap();
        }
        true
    });

    events.run().unwrap();

    assert!(events.is_ended());
    assert_eq!(events.now(), Duration::ZERO);
}

#[test]
fn quit_request_cuts_sleep_short() {
    let platform = ScriptedPlatform::new().at(ms(300), InputEvent::Quit);
    let mut events = handler(platform, 100);

    events.sleep(ms(10_000)).unwrap();

    assert!(events.is_ended());
    assert_eq!(events.now(), ms(300));
}

#[test]
fn interceptor_sees_keys_first() {
    let platform = ScriptedPlatform::new()
        .key_at(10, Key::char('a'))
        .key_at(20, Key::ctrl('c'))
        .key_at(30, Key::char('b'));
    let mut events = handler(platform, 100);

    events.set_key_interceptor(|signals, key| {
        if key == Key::ctrl('c') {
            signals.end();
            true
        } else {
            false
        }
    });

    let keys = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&keys);
    events.push_key_handler(move |_, key| {
        seen.borrow_mut().push(key);
        true
    });

    events.run().unwrap();

    assert_eq!(*keys.borrow(), vec![Key::char('a')]);
}

#[test]
fn unconsumed_keys_reach_the_default_handler_only() {
    let platform = ScriptedPlatform::new()
        .key_at(10, Key::char('a'))
        .key_at(20, Key::char('b'));
    let mut events = handler(platform, 100);

    let unhandled = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&unhandled);
    events.set_unhandled_key_handler(move |key| sink.borrow_mut().push(key));

    events.push_key_handler(|_, key| key == Key::char('a'));

    events.run().unwrap();

    assert_eq!(*unhandled.borrow(), vec![Key::char('b')]);
}

#[test]
fn typed_ahead_keys_go_to_the_next_controller() {
    let platform = ScriptedPlatform::new().type_at(10, "xyz");
    let mut events = handler(platform, 100);

    let keys = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&keys);
    events.push_key_handler(move |events, key| {
        seen.borrow_mut().push(key.as_char());
        if key == Key::char('x') {
            let choice = Rc::new(RefCell::new(ReadChoiceController::new("y")));
            choice.wait(events).unwrap();
        }
        true
    });

    events.run().unwrap();

    assert_eq!(*keys.borrow(), vec![Some('x'), Some('z')]);
}

#[test]
fn same_batch_keys_after_completion_are_not_lost() {
    // All three keys arrive in a single platform wait
    let platform = ScriptedPlatform::new()
        .key_at(10, Key::char('x'))
        .key_at(10, Key::char('y'))
        .key_at(10, Key::char('z'));
    let mut events = handler(platform, 100);

    let keys = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&keys);
    events.push_key_handler(move |events, key| {
        seen.borrow_mut().push(key.as_char());
        if key == Key::char('x') {
            let choice = Rc::new(RefCell::new(ReadChoiceController::new("y")));
            assert_eq!(choice.wait(events).unwrap(), 'y');
        }
        true
    });

    events.run().unwrap();

    assert_eq!(*keys.borrow(), vec![Some('x'), Some('z')]);
}

#[test]
fn set_controller_discards_modal_state() {
    let platform = ScriptedPlatform::new()
        .key_at(10, Key::char('x'))
        .key_at(20, Key::char('r'))
        .key_at(30, Key::char('m'));
    let mut events = handler(platform, 100);

    let mode_keys = Rc::new(RefCell::new(Vec::new()));
    let mode_seen = Rc::clone(&mode_keys);
    let mode = modalpump::controller::key_handler(move |_, key| {
        mode_seen.borrow_mut().push(key);
        true
    });

    let replacement = Rc::clone(&mode);
    let prompt = Probe::new(move |events, key, waitable| {
        if key == Key::char('r') {
            events.set_controller(Rc::clone(&replacement));
            waitable.mark_done(events.signals(), 'r');
        }
        true
    });

    let depth_after = Rc::new(Cell::new(0));
    let depth = Rc::clone(&depth_after);
    events.push_key_handler(move |events, key| {
        if key == Key::char('x') {
            assert_eq!(prompt.wait(events).unwrap(), 'r');
            depth.set(events.stack_depth());
        }
        true
    });

    events.run().unwrap();

    assert_eq!(depth_after.get(), 1);
    assert!(events.is_on_stack(&mode));
    assert_eq!(*mode_keys.borrow(), vec![Key::char('m')]);
}

#[test]
fn controller_ticks_at_its_own_rate() {
    let platform = ScriptedPlatform::new().idle_when_exhausted();
    let mut events = handler(platform, 100);

    let base_ticks = Rc::new(Cell::new(0));
    let count = Rc::clone(&base_ticks);
    events.timers_mut().add(1, move |_, _| count.set(count.get() + 1));

    let signals = events.signals().clone();
    events.timers_mut().add(10, move |_, _| signals.end());

    let ticks = Rc::new(Cell::new(0));
    events.push_controller(controller_ref(Ticker {
        interval: Some(2),
        ticks: Rc::clone(&ticks),
        on_key: Box::new(|_: &mut EventHandler, _: Key| true),
    }));

    events.run().unwrap();

    assert_eq!(base_ticks.get(), 10);
    assert_eq!(ticks.get(), 5);
    assert_eq!(events.now(), ms(1000));
}

#[test]
fn only_the_top_controller_ticks() {
    let platform = ScriptedPlatform::new()
        .key_at(0, Key::char('w'))
        .idle_when_exhausted();
    let mut events = handler(platform, 100);

    let signals = events.signals().clone();
    events.timers_mut().add(5, move |_, _| signals.end());

    let ticks = Rc::new(Cell::new(0));
    let during_wait = Rc::new(Cell::new(None));
    let observed = Rc::clone(&ticks);
    let during = Rc::clone(&during_wait);
    events.push_controller(controller_ref(Ticker {
        interval: Some(1),
        ticks: Rc::clone(&ticks),
        on_key: Box::new(move |events: &mut EventHandler, _: Key| {
            let wait = Rc::new(RefCell::new(WaitController::new(3)));
            wait.wait(events).unwrap();
            during.set(Some(observed.get()));
            true
        }),
    }));

    events.run().unwrap();

    assert_eq!(during_wait.get(), Some(0));
    assert_eq!(ticks.get(), 2);
}

#[test]
fn refresh_runs_once_per_handled_iteration() {
    let platform = ScriptedPlatform::new()
        .key_at(5, Key::char('a'))
        .key_at(5, Key::char('b'))
        .key_at(5, Key::char('c'));
    let frames = platform.frames();
    let mut events = handler(platform, 100);

    let refreshes = Rc::new(Cell::new(0));
    let count = Rc::clone(&refreshes);
    events.set_screen_update(move || count.set(count.get() + 1));
    events.push_key_handler(|_, _| true);

    events.run().unwrap();

    // One iteration for the three keys, one for the quit request
    assert_eq!(refreshes.get(), 2);
    assert_eq!(frames.get(), 2);
}

#[test]
fn controller_done_is_cleared_for_the_next_pump() {
    let platform = ScriptedPlatform::new()
        .key_at(10, Key::char('x'))
        .key_at(20, Key::char('y'))
        .key_at(30, Key::char('x'))
        .key_at(40, Key::char('n'));
    let mut events = handler(platform, 100);

    let answers = Rc::new(RefCell::new(Vec::new()));
    let record = Rc::clone(&answers);
    events.push_key_handler(move |events, key| {
        if key == Key::char('x') {
            let choice = Rc::new(RefCell::new(ReadChoiceController::new("yn")));
            record.borrow_mut().push(choice.wait(events).unwrap());
        }
        true
    });

    events.run().unwrap();

    assert_eq!(*answers.borrow(), vec!['y', 'n']);
    assert!(!events.signals().is_controller_done());
}

#[test]
fn base_tick_reset_rescales_timers() {
    let platform = ScriptedPlatform::new().idle_when_exhausted();
    let mut events = handler(platform, 100);

    let fired = Rc::new(Cell::new(0));
    let count = Rc::clone(&fired);
    events.timers_mut().add(2, move |_, _| count.set(count.get() + 1));

    events.sleep(ms(1000)).unwrap();
    assert_eq!(fired.get(), 5);

    events.reset_base_tick(ms(50)).unwrap();
    events.sleep(ms(1000)).unwrap();
    assert_eq!(fired.get(), 15);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "empty controller stack")]
fn dispatch_with_empty_stack_is_a_programmer_error() {
    let mut events = handler(ScriptedPlatform::new(), 100);
    events.dispatch_key(Key::char('a'));
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "already finished")]
fn waiting_twice_is_a_programmer_error() {
    let platform = ScriptedPlatform::new().key_at(10, Key::char('y'));
    let mut events = handler(platform, 100);
    events.push_key_handler(|_, _| true);

    let choice = Rc::new(RefCell::new(ReadChoiceController::new("y")));
    choice.wait(&mut events).unwrap();
    let _ = choice.wait(&mut events);
}
