#![forbid(unsafe_code)]

//! Deterministic in-memory [`Viewport`] for tests and headless hosts.
//!
//! Nothing here measures layout. The owner synthesizes intersection records
//! with [`FakeViewport::report`] and inspects the attach/detach traffic with
//! [`FakeViewport::calls`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Result, WatchError};
use crate::visibility::viewport::{ChangeFn, IntersectionRecord, ObserveOptions, Unobserve, Viewport};

/// Stand-in for a DOM element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FakeElement(pub u32);

/// One attach or detach, in the order the viewport saw them.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportCall {
    Attach {
        observer: u64,
        target: FakeElement,
        options: ObserveOptions,
    },
    Detach {
        observer: u64,
    },
}

impl ViewportCall {
    #[must_use]
    pub fn is_attach(&self) -> bool {
        matches!(self, Self::Attach { .. })
    }

    #[must_use]
    pub fn is_detach(&self) -> bool {
        matches!(self, Self::Detach { .. })
    }
}

struct Slot {
    id: u64,
    target: FakeElement,
    options: ObserveOptions,
    /// `None` while the callback is executing.
    on_change: Option<ChangeFn>,
}

#[derive(Default)]
struct FakeState {
    next_id: u64,
    slots: Vec<Slot>,
    calls: Vec<ViewportCall>,
    fail_next: Option<String>,
}

/// Shared-handle fake viewport. Clones observe the same state.
#[derive(Clone, Default)]
pub struct FakeViewport {
    state: Rc<RefCell<FakeState>>,
}

impl std::fmt::Debug for FakeViewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FakeViewport")
            .field("live", &state.slots.len())
            .field("calls", &state.calls.len())
            .finish()
    }
}

impl FakeViewport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach/detach history.
    #[must_use]
    pub fn calls(&self) -> Vec<ViewportCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Number of observations not yet released.
    #[must_use]
    pub fn live_observers(&self) -> usize {
        self.state.borrow().slots.len()
    }

    /// Options of every live observation on `target`, oldest first.
    #[must_use]
    pub fn live_options(&self, target: FakeElement) -> Vec<ObserveOptions> {
        self.state
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.target == target)
            .map(|slot| slot.options)
            .collect()
    }

    /// Make the next `observe` call fail with [`WatchError::ObserveFailed`].
    pub fn fail_next_observe(&self, reason: impl Into<String>) {
        self.state.borrow_mut().fail_next = Some(reason.into());
    }

    /// Deliver one record to every live observer of `target`.
    ///
    /// Returns how many observers received it.
    pub fn report(&self, target: FakeElement, record: IntersectionRecord) -> usize {
        self.report_batch(target, &[record])
    }

    /// Deliver a batch of records to every live observer of `target`.
    ///
    /// Callbacks run without the internal borrow held, so they may release
    /// their own observation or start new ones.
    pub fn report_batch(&self, target: FakeElement, records: &[IntersectionRecord]) -> usize {
        let ids: Vec<u64> = self
            .state
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.target == target)
            .map(|slot| slot.id)
            .collect();

        let mut delivered = 0;
        for id in ids {
            let Some(mut on_change) = self.take_callback(id) else {
                continue;
            };
            on_change(records);
            delivered += 1;

            let orphaned = {
                let mut state = self.state.borrow_mut();
                match state.slots.iter_mut().find(|slot| slot.id == id) {
                    Some(slot) => {
                        slot.on_change = Some(on_change);
                        None
                    }
                    // Released during the callback.
                    None => Some(on_change),
                }
            };
            drop(orphaned);
        }
        delivered
    }

    fn take_callback(&self, id: u64) -> Option<ChangeFn> {
        self.state
            .borrow_mut()
            .slots
            .iter_mut()
            .find(|slot| slot.id == id)
            .and_then(|slot| slot.on_change.take())
    }
}

impl Viewport for FakeViewport {
    type Target = FakeElement;

    fn observe(
        &self,
        target: &FakeElement,
        options: &ObserveOptions,
        on_change: ChangeFn,
    ) -> Result<Unobserve> {
        let id = {
            let mut state = self.state.borrow_mut();
            if let Some(reason) = state.fail_next.take() {
                return Err(WatchError::observe_failed(reason));
            }
            state.next_id += 1;
            let id = state.next_id;
            state.slots.push(Slot {
                id,
                target: *target,
                options: *options,
                on_change: Some(on_change),
            });
            state.calls.push(ViewportCall::Attach {
                observer: id,
                target: *target,
                options: *options,
            });
            id
        };

        let weak = Rc::downgrade(&self.state);
        Ok(Unobserve::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let removed = {
                let mut state = state.borrow_mut();
                state.calls.push(ViewportCall::Detach { observer: id });
                let idx = state.slots.iter().position(|slot| slot.id == id);
                idx.map(|idx| state.slots.remove(idx))
            };
            // Callback captures are dropped outside the borrow.
            drop(removed);
        }))
    }
}
