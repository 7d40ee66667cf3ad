#![forbid(unsafe_code)]

//! The visibility watcher: an [`Effect`] whose guard is a live observation.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::reactive::Effect;
use crate::visibility::request::{ObservationRequest, Threshold, WatchDeps};
use crate::visibility::viewport::{ChangeFn, IntersectionRecord, Unobserve, Viewport};

// ─── WatchHandle ────────────────────────────────────────────────────────────

/// Caller-owned slot for the element being watched.
///
/// Cloning shares the slot. Bind the element before calling
/// [`VisibilityWatcher::watch`]; rebinding alone does not restart an
/// observation, only a request change does.
///
/// At most one observation holds a slot at a time. A second watcher built
/// on a clone stays inactive until the first one releases it.
pub struct WatchHandle<T> {
    target: Rc<RefCell<Option<T>>>,
    claimed: Rc<Cell<bool>>,
}

impl<T> Clone for WatchHandle<T> {
    fn clone(&self) -> Self {
        Self {
            target: Rc::clone(&self.target),
            claimed: Rc::clone(&self.claimed),
        }
    }
}

impl<T> Default for WatchHandle<T> {
    fn default() -> Self {
        Self {
            target: Rc::new(RefCell::new(None)),
            claimed: Rc::new(Cell::new(false)),
        }
    }
}

impl<T> std::fmt::Debug for WatchHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle")
            .field("bound", &self.target.borrow().is_some())
            .field("claimed", &self.claimed.get())
            .finish()
    }
}

impl<T: Clone> WatchHandle<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the visual element. Replaces any previous binding.
    pub fn bind(&self, target: T) {
        *self.target.borrow_mut() = Some(target);
    }

    /// Detach the visual element, returning it.
    pub fn unbind(&self) -> Option<T> {
        self.target.borrow_mut().take()
    }

    /// The currently bound element.
    #[must_use]
    pub fn target(&self) -> Option<T> {
        self.target.borrow().clone()
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.target.borrow().is_some()
    }

    /// Whether a live observation currently holds this slot.
    #[must_use]
    pub fn is_claimed(&self) -> bool {
        self.claimed.get()
    }

    /// Whether both handles share the same slot.
    #[must_use]
    pub fn same_slot(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.target, &other.target)
    }

    fn try_claim(&self) -> Option<SlotClaim> {
        if self.claimed.replace(true) {
            return None;
        }
        Some(SlotClaim(Rc::clone(&self.claimed)))
    }
}

/// Exclusive hold on a handle's slot; released on drop.
struct SlotClaim(Rc<Cell<bool>>);

impl Drop for SlotClaim {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

// ─── Observation guard ──────────────────────────────────────────────────────

/// Observable state of a watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Not observing: disabled, unbound, torn down, or never watched.
    Inactive,
    /// Attached to the viewport.
    Observing,
}

/// A live observation. Dropping it silences the callback, detaches, then
/// frees the handle's slot.
struct Observation {
    live: Rc<Cell<bool>>,
    _unobserve: Unobserve,
    _claim: SlotClaim,
}

impl Drop for Observation {
    fn drop(&mut self) {
        self.live.set(false);
        tracing::debug!(message = "visibility.detach");
    }
}

/// Turns a stream of records into rising edges.
struct RisingEdge {
    threshold: Threshold,
    visible: bool,
}

impl RisingEdge {
    fn new(threshold: Threshold) -> Self {
        Self {
            threshold,
            visible: false,
        }
    }

    fn step(&mut self, record: &IntersectionRecord) -> bool {
        let now = record.meets(self.threshold);
        let rose = now && !self.visible;
        self.visible = now;
        rose
    }
}

// ─── VisibilityWatcher ──────────────────────────────────────────────────────

/// Fires a callback each time a bound element scrolls into view.
///
/// Owned by the view. Call [`watch`](Self::watch) on every render with the
/// current request; the observation is rebuilt only when the request's
/// dependencies (enabled flag, root margin, threshold, callback identity)
/// change. Dropping the watcher, or calling [`teardown`](Self::teardown),
/// releases the observation.
///
/// # Example
///
/// ```
/// use teamfront_core::visibility::{
///     FakeElement, FakeViewport, IntersectionRecord, ObservationRequest, VisibilityWatcher,
/// };
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let viewport = FakeViewport::new();
/// let mut watcher = VisibilityWatcher::new(viewport.clone());
/// watcher.handle().bind(FakeElement(1));
///
/// let hits = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&hits);
/// watcher.watch(&ObservationRequest::new(move || counter.set(counter.get() + 1)));
///
/// viewport.report(FakeElement(1), IntersectionRecord::visible());
/// assert_eq!(hits.get(), 1);
/// ```
pub struct VisibilityWatcher<V: Viewport> {
    // Declared first: fields drop in order, so the observation detaches
    // while the viewport is still alive.
    effect: Effect<WatchDeps, Observation>,
    viewport: V,
    handle: WatchHandle<V::Target>,
}

impl<V: Viewport> std::fmt::Debug for VisibilityWatcher<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityWatcher")
            .field("handle", &self.handle)
            .field("state", &self.state())
            .field("effect", &self.effect)
            .finish()
    }
}

impl<V: Viewport> VisibilityWatcher<V> {
    /// Create a watcher with a fresh, unbound handle.
    #[must_use]
    pub fn new(viewport: V) -> Self {
        Self::with_handle(viewport, WatchHandle::new())
    }

    /// Create a watcher around a handle the caller already holds.
    ///
    /// If another watcher is observing through the same slot, this one
    /// stays inactive until a dependency change after that slot is freed.
    #[must_use]
    pub fn with_handle(viewport: V, handle: WatchHandle<V::Target>) -> Self {
        Self {
            effect: Effect::new(),
            viewport,
            handle,
        }
    }

    /// The handle to bind the watched element to.
    #[must_use]
    pub fn handle(&self) -> WatchHandle<V::Target> {
        self.handle.clone()
    }

    /// Apply `request`, re-establishing the observation if it changed.
    ///
    /// A disabled request, an unbound handle, or a viewport that refuses the
    /// observation all leave the watcher [`Inactive`](WatchState::Inactive)
    /// until the next dependency change.
    pub fn watch(&mut self, request: &ObservationRequest) -> WatchHandle<V::Target> {
        let viewport = &self.viewport;
        let handle = &self.handle;
        self.effect
            .run(request.deps(), |deps| establish(viewport, handle, deps));
        self.handle.clone()
    }

    /// Release the observation as the owning view goes away.
    ///
    /// A later [`watch`](Self::watch) starts over, as on a fresh mount.
    pub fn teardown(&mut self) {
        self.effect.dispose();
    }

    #[must_use]
    pub fn state(&self) -> WatchState {
        if self.effect.is_active() {
            WatchState::Observing
        } else {
            WatchState::Inactive
        }
    }

    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.state() == WatchState::Observing
    }

    /// How many times an observation has been (re)configured.
    #[must_use]
    pub fn reconfigurations(&self) -> u64 {
        self.effect.runs()
    }
}

fn establish<V: Viewport>(
    viewport: &V,
    handle: &WatchHandle<V::Target>,
    deps: &WatchDeps,
) -> Option<Observation> {
    if !deps.enabled {
        tracing::trace!(message = "visibility.skip", reason = "disabled");
        return None;
    }
    let Some(target) = handle.target() else {
        tracing::trace!(message = "visibility.skip", reason = "unbound");
        return None;
    };
    let Some(claim) = handle.try_claim() else {
        tracing::trace!(message = "visibility.skip", reason = "claimed");
        return None;
    };

    let options = deps.options();
    let live = Rc::new(Cell::new(true));
    let on_change: ChangeFn = {
        let live = Rc::clone(&live);
        let on_intersect = Rc::clone(&deps.on_intersect);
        let mut edge = RisingEdge::new(options.threshold);
        Box::new(move |records: &[IntersectionRecord]| {
            for record in records {
                // The callback may tear the watcher down mid-batch.
                if !live.get() {
                    return;
                }
                if edge.step(record) {
                    tracing::trace!(message = "visibility.intersect");
                    on_intersect();
                }
            }
        })
    };

    match viewport.observe(&target, &options, on_change) {
        Ok(unobserve) => {
            tracing::debug!(
                message = "visibility.attach",
                root_margin = %options.root_margin,
                threshold = options.threshold.value()
            );
            Some(Observation {
                live,
                _unobserve: unobserve,
                _claim: claim,
            })
        }
        Err(err) => {
            tracing::warn!(message = "visibility.observe_failed", error = %err);
            None
        }
    }
}
