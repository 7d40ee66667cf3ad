#![forbid(unsafe_code)]

//! Lifecycle primitives for view-owned resources.
//!
//! - [`Effect`]: a keyed side effect. Runs a setup function after attach,
//!   re-runs it whenever its dependency list changes, and releases whatever
//!   the previous run produced before the next run or on final detach.
//!
//! # Architecture
//!
//! Cleanup is ownership: the setup function returns a guard value and the
//! effect simply drops it. Any type with a `Drop` impl can act as the
//! cleanup half, so there is no separate cleanup closure to forget.
//!
//! # Invariants
//!
//! 1. The previous guard is dropped before the next setup starts.
//! 2. Equal dependency lists never re-run setup.
//! 3. Dropping the effect drops the live guard exactly once.

pub mod effect;

pub use effect::Effect;
