#![forbid(unsafe_code)]

//! End-to-end lifecycle tests for animated components on a deterministic host.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use glitch_core::capabilities::{EnvSignals, MotionPreference};
use glitch_runtime::{
    AnimatedComponent, AnimatedVisual, ElementId, FrameError, FrameOutcome, FrameRates,
    Lifecycle, ManualHost,
};
use proptest::prelude::*;
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// Visual that counts frames through a shared counter.
struct Counter {
    frames: Rc<Cell<u32>>,
    rates: FrameRates,
}

impl Counter {
    fn new() -> (Self, Rc<Cell<u32>>) {
        let frames = Rc::new(Cell::new(0));
        (
            Self {
                frames: Rc::clone(&frames),
                rates: FrameRates::uniform(60),
            },
            frames,
        )
    }
}

impl AnimatedVisual for Counter {
    fn render_frame(&mut self, _now_ms: f64) -> Result<bool, FrameError> {
        self.frames.set(self.frames.get() + 1);
        Ok(true)
    }

    fn frame_rates(&self) -> FrameRates {
        self.rates
    }
}

const EL: ElementId = ElementId::new(42);

fn host_with_element() -> Rc<ManualHost> {
    let host = Rc::new(ManualHost::new());
    host.attach(EL);
    host
}

/// Deliver up to `n` pending frames, 20 ms apart starting at `t0`.
fn pump<V: AnimatedVisual>(
    c: &mut AnimatedComponent<V, Rc<ManualHost>>,
    host: &ManualHost,
    t0: f64,
    n: usize,
) -> Vec<FrameOutcome> {
    let mut outcomes = Vec::new();
    for i in 0..n {
        let Some(token) = host.take_frame() else {
            break;
        };
        outcomes.push(c.on_frame(token, t0 + 20.0 * i as f64));
    }
    outcomes
}

fn make_visible(c: &mut AnimatedComponent<Counter, Rc<ManualHost>>, host: &ManualHost) {
    let token = host.observer_for(EL).expect("observing");
    c.on_intersection(token, 1.0);
}

/// Counts WARN-level events.
struct WarnCounter(Arc<Mutex<Vec<String>>>);

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::WARN {
            self.0
                .lock()
                .unwrap()
                .push(event.metadata().target().to_string());
        }
    }
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn detach_while_running_stops_all_callbacks() {
    let host = host_with_element();
    let (visual, frames) = Counter::new();
    let mut c = AnimatedComponent::new(visual, Rc::clone(&host), EL);
    c.on_attach(&EnvSignals::desktop());
    make_visible(&mut c, &host);

    pump(&mut c, &host, 0.0, 5);
    let before = frames.get();
    assert!(before > 0, "loop should have rendered");

    // A frame is in flight when detach happens.
    let in_flight = host.pending_frames();
    assert_eq!(in_flight.len(), 1);
    c.on_detach();

    for token in in_flight {
        assert_eq!(c.on_frame(token, 10_000.0), FrameOutcome::Stale);
    }
    assert!(pump(&mut c, &host, 20_000.0, 10).is_empty());
    assert_eq!(frames.get(), before);
}

#[test]
fn reduced_motion_never_animates_even_when_forced_visible() {
    let host = host_with_element();
    let (visual, frames) = Counter::new();
    let mut c = AnimatedComponent::new(visual, Rc::clone(&host), EL);
    c.on_attach(&EnvSignals::desktop().with_motion(MotionPreference::Reduce));

    make_visible(&mut c, &host);
    assert!(!c.start());
    assert!(!c.trigger());
    pump(&mut c, &host, 0.0, 10);

    assert_eq!(host.frame_requests(), 0);
    assert_eq!(frames.get(), 0);
}

#[test]
fn double_start_requests_one_frame() {
    let host = host_with_element();
    let (visual, _frames) = Counter::new();
    let mut c = AnimatedComponent::new(visual, Rc::clone(&host), EL);
    c.on_attach(&EnvSignals::desktop());
    make_visible(&mut c, &host);

    assert!(!c.start(), "already started by visibility");
    assert!(!c.start());
    assert_eq!(host.frame_requests(), 1);
    assert_eq!(host.pending_frames().len(), 1);
}

#[test]
fn unattached_element_never_animates() {
    let host = Rc::new(ManualHost::new());
    let (visual, frames) = Counter::new();
    let mut c = AnimatedComponent::new(visual, Rc::clone(&host), EL);

    assert!(!c.start());
    c.on_attach(&EnvSignals::desktop());
    assert!(host.observations().is_empty(), "detached element is not observed");
    assert!(!c.start());
    c.trigger();
    assert_eq!(host.frame_requests(), 0);
    assert_eq!(frames.get(), 0);
}

#[test]
fn hide_then_show_resumes() {
    let host = host_with_element();
    let (visual, frames) = Counter::new();
    let mut c = AnimatedComponent::new(visual, Rc::clone(&host), EL);
    c.on_attach(&EnvSignals::desktop());
    make_visible(&mut c, &host);
    pump(&mut c, &host, 0.0, 3);

    let token = host.observer_for(EL).expect("observing");
    c.on_intersection(token, 0.0);
    assert!(!c.is_running());
    let paused_at = frames.get();
    assert!(pump(&mut c, &host, 100.0, 5).is_empty());
    assert_eq!(frames.get(), paused_at);

    c.on_intersection(token, 0.5);
    pump(&mut c, &host, 200.0, 3);
    assert!(frames.get() > paused_at);
}

#[test]
fn failing_visual_stops_loop_without_propagating() {
    struct Broken;
    impl AnimatedVisual for Broken {
        fn render_frame(&mut self, now_ms: f64) -> Result<bool, FrameError> {
            if now_ms >= 40.0 {
                panic!("renderer exploded at {now_ms}");
            }
            Ok(true)
        }
    }

    let host = host_with_element();
    let mut c = AnimatedComponent::new(Broken, Rc::clone(&host), EL);
    c.on_attach(&EnvSignals::desktop());
    let token = host.observer_for(EL).expect("observing");
    c.on_intersection(token, 1.0);

    let outcomes = pump(&mut c, &host, 0.0, 10);
    assert_eq!(outcomes.last(), Some(&FrameOutcome::Failed));
    assert!(!c.is_running());
    assert!(matches!(c.last_error(), Some(FrameError::Panicked(_))));
    assert!(host.pending_frames().is_empty());
}

#[test]
fn fail_open_animates_and_warns_once() {
    let warnings = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&warnings)));

    tracing::subscriber::with_default(subscriber, || {
        let host = Rc::new(ManualHost::without_intersection());
        host.attach(EL);
        let (visual, frames) = Counter::new();
        let mut c = AnimatedComponent::new(visual, Rc::clone(&host), EL);

        c.on_attach(&EnvSignals::desktop());
        assert!(c.is_visible());
        assert!(c.is_running());
        pump(&mut c, &host, 0.0, 3);
        assert_eq!(frames.get(), 3);

        c.on_detach();
        c.on_attach(&EnvSignals::desktop());
        assert!(c.is_running());
        c.on_detach();
    });

    let warnings = warnings.lock().unwrap();
    assert_eq!(warnings.len(), 1, "exactly one fail-open warning: {warnings:?}");
}

#[test]
fn narrow_viewport_uses_lower_rate() {
    let host = host_with_element();
    let (mut visual, frames) = Counter::new();
    visual.rates = FrameRates::new(60, 10);
    let mut c = AnimatedComponent::new(visual, Rc::clone(&host), EL);
    c.on_attach(&EnvSignals::mobile());
    make_visible(&mut c, &host);

    // 20 ms cadence against a 100 ms interval: one render per five frames.
    pump(&mut c, &host, 0.0, 11);
    assert_eq!(frames.get(), 3);
}

// ============================================================================
// Property tests
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Step {
    Ratio(f32),
    Frame,
    Start,
    Stop,
    Detach,
    Attach,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0.0f32..=1.0).prop_map(Step::Ratio),
        Just(Step::Frame),
        Just(Step::Frame),
        Just(Step::Frame),
        Just(Step::Start),
        Just(Step::Stop),
        Just(Step::Detach),
        Just(Step::Attach),
    ]
}

proptest! {
    #[test]
    fn never_renders_while_hidden_or_detached(steps in proptest::collection::vec(step(), 1..80)) {
        let host = host_with_element();
        let (visual, frames) = Counter::new();
        let mut c = AnimatedComponent::new(visual, Rc::clone(&host), EL);
        let mut now = 0.0;

        for step in steps {
            match step {
                Step::Ratio(r) => {
                    if let Some(token) = host.observer_for(EL) {
                        c.on_intersection(token, r);
                    }
                }
                Step::Frame => {
                    now += 20.0;
                    let before = frames.get();
                    let may_render = c.is_attached() && c.is_visible();
                    if let Some(token) = host.take_frame() {
                        c.on_frame(token, now);
                    }
                    if !may_render {
                        prop_assert_eq!(frames.get(), before);
                    }
                }
                Step::Start => { c.start(); }
                Step::Stop => { c.stop(); }
                Step::Detach => c.on_detach(),
                Step::Attach => c.on_attach(&EnvSignals::desktop()),
            }
            prop_assert!(host.pending_frames().len() <= 1, "at most one frame in flight");
            if !c.is_attached() {
                prop_assert!(host.pending_frames().is_empty());
                prop_assert!(host.observations().is_empty());
            }
        }
    }
}
