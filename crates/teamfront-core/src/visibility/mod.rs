#![forbid(unsafe_code)]

//! Viewport visibility watching.
//!
//! - [`VisibilityWatcher`]: calls a callback once each time a bound element
//!   becomes visible within a margin and threshold.
//! - [`Viewport`]: the host's intersection primitive
//!   (`observe(target, on_change, options) -> unobserve`).
//! - [`FakeViewport`]: a deterministic viewport driven by hand.
//!
//! # State
//!
//! A watcher is either `Inactive` or `Observing`. It starts `Inactive`,
//! becomes `Observing` only when the request is enabled and the handle is
//! bound, and ends `Inactive` when the view drops it.
//!
//! # Invariants
//!
//! 1. At most one live observation per handle.
//! 2. The old observation is detached before a new one attaches.
//! 3. The callback fires once per transition into visibility, never while
//!    continuously visible and never on the way out.
//! 4. After detach the callback never fires, even if the viewport keeps
//!    delivering records.
//!
//! All of this is single-threaded: `Rc`, `Cell` and `RefCell` throughout.

pub mod fake;
pub mod request;
pub mod viewport;
pub mod watcher;

pub use fake::{FakeElement, FakeViewport, ViewportCall};
pub use request::{MarginLength, ObservationRequest, OnIntersect, RootMargin, Threshold};
pub use viewport::{
    ChangeFn, IntersectionRecord, ObserveOptions, RATIO_TOLERANCE, Unobserve, Viewport,
};
pub use watcher::{VisibilityWatcher, WatchHandle, WatchState};
