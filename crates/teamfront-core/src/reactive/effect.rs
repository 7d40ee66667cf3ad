#![forbid(unsafe_code)]

//! Keyed effects with guard-based cleanup.
//!
//! # Design
//!
//! [`Effect<D, G>`] remembers the dependency list `D` of its last run and the
//! guard `G` that run produced. Calling [`run`](Effect::run) with an equal
//! list is a no-op; a different list drops the old guard first and then
//! invokes the new setup.
//!
//! # Failure Modes
//!
//! - **Setup panics**: the previous guard has already been dropped and the
//!   stored dependencies are cleared, so the next `run()` retries setup
//!   regardless of its dependency list.
//! - **Setup declines**: returning `None` records the dependencies without a
//!   guard. The effect is idle until the dependencies change again.

/// A side effect keyed on a dependency list.
///
/// # Invariants
///
/// 1. At most one guard is alive at any time.
/// 2. `runs` increments by 1 per setup invocation.
/// 3. The guard from run *n* is dropped before setup *n + 1* begins.
pub struct Effect<D, G> {
    deps: Option<D>,
    guard: Option<G>,
    runs: u64,
}

impl<D, G> Default for Effect<D, G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, G> std::fmt::Debug for Effect<D, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("armed", &self.deps.is_some())
            .field("active", &self.guard.is_some())
            .field("runs", &self.runs)
            .finish()
    }
}

impl<D, G> Effect<D, G> {
    /// Create an effect that has not run yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            deps: None,
            guard: None,
            runs: 0,
        }
    }

    /// Whether the last setup produced a guard that is still held.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.guard.is_some()
    }

    /// Borrow the live guard, if any.
    #[must_use]
    pub fn guard(&self) -> Option<&G> {
        self.guard.as_ref()
    }

    /// Number of times setup has been invoked.
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Release the live guard and forget the dependency list.
    ///
    /// The next [`run`](Effect::run) will invoke setup unconditionally.
    pub fn dispose(&mut self) {
        self.deps = None;
        self.guard = None;
    }
}

impl<D: PartialEq, G> Effect<D, G> {
    /// Run `setup` if `deps` differs from the previous run.
    ///
    /// Returns `true` when setup was invoked.
    pub fn run(&mut self, deps: D, setup: impl FnOnce(&D) -> Option<G>) -> bool {
        if self.deps.as_ref() == Some(&deps) {
            return false;
        }

        // Cleanup strictly precedes the next setup.
        self.deps = None;
        self.guard = None;

        self.runs += 1;
        let guard = setup(&deps);
        self.deps = Some(deps);
        self.guard = guard;
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
