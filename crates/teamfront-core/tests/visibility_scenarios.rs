//! End-to-end watcher scenarios against fake viewports.
//!
//! Each test drives a `VisibilityWatcher` through a view lifecycle (bind,
//! watch, re-render with changed options, teardown) and checks the callback
//! count and the attach/detach traffic the viewport saw.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use teamfront_core::error::Result;
use teamfront_core::visibility::{
    ChangeFn, FakeElement, FakeViewport, IntersectionRecord, ObservationRequest, ObserveOptions,
    OnIntersect, RootMargin, Threshold, Unobserve, ViewportCall, Viewport, VisibilityWatcher,
    WatchState,
};
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

const EL: FakeElement = FakeElement(7);

fn counter() -> (Rc<Cell<u32>>, OnIntersect) {
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    (hits, Rc::new(move || h.set(h.get() + 1)))
}

fn mounted(fake: &FakeViewport) -> VisibilityWatcher<FakeViewport> {
    let watcher = VisibilityWatcher::new(fake.clone());
    watcher.handle().bind(EL);
    watcher
}

fn visibility_sequence(pattern: &[bool]) -> Vec<IntersectionRecord> {
    pattern
        .iter()
        .map(|&v| {
            if v {
                IntersectionRecord::visible()
            } else {
                IntersectionRecord::hidden()
            }
        })
        .collect()
}

#[test]
fn scenario_fires_on_second_and_fifth_event() {
    let fake = FakeViewport::new();
    let mut watcher = mounted(&fake);
    let (hits, cb) = counter();
    let request = ObservationRequest::from_callback(cb)
        .with_root_margin(RootMargin::parse("200px").unwrap())
        .with_threshold(Threshold::ZERO);
    watcher.watch(&request);
    assert_eq!(watcher.state(), WatchState::Observing);

    let mut after_each = Vec::new();
    for record in visibility_sequence(&[false, true, true, false, true]) {
        fake.report(EL, record);
        after_each.push(hits.get());
    }
    assert_eq!(after_each, vec![0, 1, 1, 1, 2]);
}

#[test]
fn disabled_never_fires() {
    let fake = FakeViewport::new();
    let mut watcher = mounted(&fake);
    let (hits, cb) = counter();
    watcher.watch(&ObservationRequest::from_callback(cb).with_enabled(false));

    for record in visibility_sequence(&[true, false, true, true, false, true]) {
        fake.report(EL, record);
    }
    assert_eq!(hits.get(), 0);
    assert_eq!(watcher.state(), WatchState::Inactive);
    assert!(fake.calls().is_empty());
}

#[test]
fn batch_with_several_transitions_fires_per_transition() {
    let fake = FakeViewport::new();
    let mut watcher = mounted(&fake);
    let (hits, cb) = counter();
    watcher.watch(&ObservationRequest::from_callback(cb));

    fake.report_batch(EL, &visibility_sequence(&[true, false, true, true]));
    assert_eq!(hits.get(), 2);
}

#[test]
fn threshold_gates_partial_visibility() {
    let fake = FakeViewport::new();
    let mut watcher = mounted(&fake);
    let (hits, cb) = counter();
    watcher.watch(&ObservationRequest::from_callback(cb).with_threshold(Threshold::new(0.5).unwrap()));

    fake.report(EL, IntersectionRecord::partial(0.2));
    assert_eq!(hits.get(), 0);
    fake.report(EL, IntersectionRecord::partial(0.6));
    assert_eq!(hits.get(), 1);
    // Dropping below the threshold but still intersecting re-arms.
    fake.report(EL, IntersectionRecord::partial(0.3));
    fake.report(EL, IntersectionRecord::partial(0.9));
    assert_eq!(hits.get(), 2);
}

#[test]
fn threshold_change_is_one_detach_then_one_attach() {
    let fake = FakeViewport::new();
    let mut watcher = mounted(&fake);
    let (_, cb) = counter();
    let request = ObservationRequest::from_callback(cb);
    watcher.watch(&request);
    fake.clear_calls();

    let quarter = Threshold::new(0.25).unwrap();
    watcher.watch(&request.clone().with_threshold(quarter));

    let calls = fake.calls();
    assert_eq!(calls.len(), 2, "{calls:?}");
    assert!(calls[0].is_detach());
    assert!(calls[1].is_attach());
    assert_eq!(
        fake.live_options(EL),
        vec![ObserveOptions {
            root_margin: RootMargin::default(),
            threshold: quarter,
        }]
    );
}

#[test]
fn new_callback_identity_reattaches() {
    let fake = FakeViewport::new();
    let mut watcher = mounted(&fake);

    // A closure rebuilt on every render counts as a new callback.
    watcher.watch(&ObservationRequest::new(|| {}));
    watcher.watch(&ObservationRequest::new(|| {}));

    let attaches = fake.calls().iter().filter(|c| c.is_attach()).count();
    let detaches = fake.calls().iter().filter(|c| c.is_detach()).count();
    assert_eq!((attaches, detaches), (2, 1));
    assert_eq!(fake.live_observers(), 1);
}

#[test]
fn disabling_detaches_and_reenabling_reattaches() {
    let fake = FakeViewport::new();
    let mut watcher = mounted(&fake);
    let (hits, cb) = counter();
    let request = ObservationRequest::from_callback(cb);

    watcher.watch(&request);
    watcher.watch(&request.clone().with_enabled(false));
    assert_eq!(watcher.state(), WatchState::Inactive);
    assert_eq!(fake.live_observers(), 0);
    fake.report(EL, IntersectionRecord::visible());
    assert_eq!(hits.get(), 0);

    watcher.watch(&request);
    assert_eq!(watcher.state(), WatchState::Observing);
    fake.report(EL, IntersectionRecord::visible());
    assert_eq!(hits.get(), 1);
}

#[test]
fn drop_detaches_exactly_once() {
    let fake = FakeViewport::new();
    let (hits, cb) = counter();
    {
        let mut watcher = mounted(&fake);
        watcher.watch(&ObservationRequest::from_callback(cb));
    }
    let detaches: Vec<_> = fake.calls().into_iter().filter(ViewportCall::is_detach).collect();
    assert_eq!(detaches.len(), 1);
    assert_eq!(fake.report(EL, IntersectionRecord::visible()), 0);
    assert_eq!(hits.get(), 0);
}

#[test]
fn rebinding_does_not_restart_observation() {
    let fake = FakeViewport::new();
    let mut watcher = mounted(&fake);
    let (_, cb) = counter();
    let request = ObservationRequest::from_callback(cb);
    watcher.watch(&request);

    watcher.handle().bind(FakeElement(99));
    watcher.watch(&request);
    assert_eq!(fake.live_options(EL).len(), 1);
    assert!(fake.live_options(FakeElement(99)).is_empty());
}

#[test]
fn shared_handle_holds_one_observation() {
    let fake = FakeViewport::new();
    let mut first = mounted(&fake);
    let handle = first.handle();
    let mut second = VisibilityWatcher::with_handle(fake.clone(), handle.clone());
    let (hits, cb) = counter();
    let request = ObservationRequest::from_callback(cb);

    first.watch(&request);
    second.watch(&request);
    assert!(first.is_observing());
    assert_eq!(second.state(), WatchState::Inactive);
    assert_eq!(fake.live_observers(), 1);

    fake.report(EL, IntersectionRecord::visible());
    assert_eq!(hits.get(), 1);

    drop(first);
    assert!(!handle.is_claimed());
    second.watch(&request.clone().with_threshold(Threshold::new(0.5).unwrap()));
    assert!(second.is_observing());
    assert_eq!(fake.live_observers(), 1);
}

#[test]
fn callback_can_tear_down_its_own_watcher() {
    let fake = FakeViewport::new();
    let watcher = Rc::new(RefCell::new(mounted(&fake)));
    let hits = Rc::new(Cell::new(0));

    let cb: OnIntersect = {
        let watcher = Rc::downgrade(&watcher);
        let hits = Rc::clone(&hits);
        Rc::new(move || {
            hits.set(hits.get() + 1);
            if let Some(w) = watcher.upgrade() {
                w.borrow_mut().teardown();
            }
        })
    };
    watcher.borrow_mut().watch(&ObservationRequest::from_callback(cb));

    // Second rising edge in the same batch must be swallowed.
    fake.report_batch(EL, &visibility_sequence(&[true, false, true]));
    assert_eq!(hits.get(), 1);
    assert_eq!(watcher.borrow().state(), WatchState::Inactive);
    assert_eq!(fake.live_observers(), 0);
}

// ── A viewport that ignores unobserve ───────────────────────────────────

/// Keeps every callback forever, as a misbehaving host might.
#[derive(Clone, Default)]
struct LeakyViewport {
    callbacks: Rc<RefCell<Vec<ChangeFn>>>,
    releases: Rc<Cell<u32>>,
}

impl LeakyViewport {
    fn report(&self, record: IntersectionRecord) {
        for cb in self.callbacks.borrow_mut().iter_mut() {
            cb(&[record]);
        }
    }
}

impl Viewport for LeakyViewport {
    type Target = ();

    fn observe(&self, _target: &(), _options: &ObserveOptions, on_change: ChangeFn) -> Result<Unobserve> {
        self.callbacks.borrow_mut().push(on_change);
        let releases = Rc::clone(&self.releases);
        Ok(Unobserve::new(move || releases.set(releases.get() + 1)))
    }
}

#[test]
fn no_calls_after_teardown_even_if_host_keeps_reporting() {
    let leaky = LeakyViewport::default();
    let mut watcher = VisibilityWatcher::new(leaky.clone());
    watcher.handle().bind(());
    let (hits, cb) = counter();
    watcher.watch(&ObservationRequest::from_callback(cb));

    leaky.report(IntersectionRecord::visible());
    assert_eq!(hits.get(), 1);

    drop(watcher);
    assert_eq!(leaky.releases.get(), 1);

    leaky.report(IntersectionRecord::hidden());
    leaky.report(IntersectionRecord::visible());
    assert_eq!(hits.get(), 1);
}

// ── Failure path + logging ──────────────────────────────────────────────

#[derive(Default)]
struct Seen {
    messages: Vec<String>,
}

struct Capture {
    seen: Arc<Mutex<Seen>>,
}

impl<S> Layer<S> for Capture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct Msg {
            message: Option<String>,
        }
        impl tracing::field::Visit for Msg {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    self.message = Some(value.to_string());
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = Some(format!("{value:?}").trim_matches('"').to_string());
                }
            }
        }
        let mut msg = Msg { message: None };
        event.record(&mut msg);
        if let Some(message) = msg.message {
            self.seen.lock().expect("capture lock").messages.push(message);
        }
    }
}

#[test]
fn refused_observation_stays_inactive_and_warns() {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let subscriber = tracing_subscriber::registry().with(Capture {
        seen: Arc::clone(&seen),
    });
    let _guard = tracing::subscriber::set_default(subscriber);

    let fake = FakeViewport::new();
    fake.fail_next_observe("SyntaxError: rootMargin");
    let mut watcher = mounted(&fake);
    let (hits, cb) = counter();
    let request = ObservationRequest::from_callback(cb);
    watcher.watch(&request);

    assert_eq!(watcher.state(), WatchState::Inactive);
    fake.report(EL, IntersectionRecord::visible());
    assert_eq!(hits.get(), 0);

    // A changed request retries.
    watcher.watch(&request.clone().with_threshold(Threshold::FULL));
    assert_eq!(watcher.state(), WatchState::Observing);
    watcher.teardown();

    let messages = seen.lock().expect("capture lock").messages.clone();
    assert!(messages.iter().any(|m| m == "visibility.observe_failed"), "{messages:?}");
    assert!(messages.iter().any(|m| m == "visibility.attach"), "{messages:?}");
    assert!(messages.iter().any(|m| m == "visibility.detach"), "{messages:?}");
}
