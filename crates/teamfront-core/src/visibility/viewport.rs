#![forbid(unsafe_code)]

//! The viewport-intersection primitive the watcher depends on.
//!
//! A [`Viewport`] delivers intersection records for one target to one
//! callback until the returned [`Unobserve`] guard is released. Browsers
//! implement it with `IntersectionObserver`; tests use
//! [`FakeViewport`](crate::visibility::FakeViewport).

use crate::error::Result;
use crate::visibility::request::{RootMargin, Threshold};

/// Options passed to [`Viewport::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObserveOptions {
    pub root_margin: RootMargin,
    pub threshold: Threshold,
}

/// One intersection sample for an observed target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionRecord {
    /// Whether the target overlaps the (margin-adjusted) root at all.
    pub is_intersecting: bool,
    /// Visible fraction of the target's area, in `[0, 1]`.
    pub intersection_ratio: f64,
}

impl IntersectionRecord {
    /// Fully visible sample.
    #[must_use]
    pub const fn visible() -> Self {
        Self {
            is_intersecting: true,
            intersection_ratio: 1.0,
        }
    }

    /// Fully hidden sample.
    #[must_use]
    pub const fn hidden() -> Self {
        Self {
            is_intersecting: false,
            intersection_ratio: 0.0,
        }
    }

    /// Partially visible sample; a ratio of zero counts as edge-adjacent.
    #[must_use]
    pub fn partial(ratio: f64) -> Self {
        Self {
            is_intersecting: ratio > 0.0,
            intersection_ratio: ratio.clamp(0.0, 1.0),
        }
    }

    /// Whether this sample satisfies `threshold`.
    ///
    /// Ratios within [`RATIO_TOLERANCE`] below the threshold count as met:
    /// hosts report a fully visible element as e.g. `0.99999`.
    #[must_use]
    pub fn meets(&self, threshold: Threshold) -> bool {
        self.is_intersecting && self.intersection_ratio + RATIO_TOLERANCE >= threshold.value()
    }
}

/// Slack applied when comparing a reported ratio against a threshold.
pub const RATIO_TOLERANCE: f64 = 1e-4;

/// Receives every batch of records for one observation, in delivery order.
pub type ChangeFn = Box<dyn FnMut(&[IntersectionRecord])>;

/// Release half of an observation.
///
/// Runs its release action exactly once: on [`release`](Unobserve::release)
/// or on drop, whichever comes first.
#[must_use = "dropping Unobserve immediately stops the observation"]
pub struct Unobserve {
    release: Option<Box<dyn FnOnce()>>,
}

impl Unobserve {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A guard with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Release now instead of at drop.
    pub fn release(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Unobserve {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Unobserve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unobserve")
            .field("pending", &self.release.is_some())
            .finish()
    }
}

/// Host capability that reports a target's visibility within a root.
pub trait Viewport {
    /// The element type observations attach to.
    type Target: Clone + 'static;

    /// Start delivering intersection records for `target` to `on_change`.
    ///
    /// Delivery stops once the returned guard is released or dropped.
    fn observe(
        &self,
        target: &Self::Target,
        options: &ObserveOptions,
        on_change: ChangeFn,
    ) -> Result<Unobserve>;
}
