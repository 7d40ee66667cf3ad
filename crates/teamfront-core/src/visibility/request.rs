#![forbid(unsafe_code)]

//! Observation request and its validated option types.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WatchError};
use crate::visibility::viewport::ObserveOptions;

/// Callback fired on each transition into the visible state.
///
/// Identity matters: two requests share a callback only when they hold the
/// same `Rc` allocation. A freshly built closure is always a new callback.
pub type OnIntersect = Rc<dyn Fn()>;

// ─── Lengths ────────────────────────────────────────────────────────────────

/// One side of a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginLength {
    /// Absolute CSS pixels.
    Px(f64),
    /// Percentage of the root's corresponding dimension.
    Percent(f64),
}

impl MarginLength {
    fn parse(input: &str, token: &str) -> Result<Self> {
        if token == "0" {
            return Ok(Self::Px(0.0));
        }
        let (number, make): (&str, fn(f64) -> Self) = if let Some(n) = token.strip_suffix("px") {
            (n, Self::Px)
        } else if let Some(n) = token.strip_suffix('%') {
            (n, Self::Percent)
        } else {
            return Err(WatchError::root_margin(
                input,
                format!("{token:?} must end in px or %"),
            ));
        };
        let value: f64 = number
            .parse()
            .map_err(|_| WatchError::root_margin(input, format!("{token:?} is not a number")))?;
        if !value.is_finite() {
            return Err(WatchError::root_margin(
                input,
                format!("{token:?} is not finite"),
            ));
        }
        Ok(make(value))
    }
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}px"),
            Self::Percent(v) => write!(f, "{v}%"),
        }
    }
}

// ─── RootMargin ─────────────────────────────────────────────────────────────

/// Expansion (or, when negative, contraction) of the reference viewport
/// before overlap is computed.
///
/// Parsed from CSS margin shorthand: one to four lengths, expanded
/// top/right/bottom/left the way CSS does. Compared by value, so `"10px"` and
/// `"10px 10px"` are the same margin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl RootMargin {
    /// Same length on every side.
    #[must_use]
    pub const fn uniform(length: MarginLength) -> Self {
        Self {
            top: length,
            right: length,
            bottom: length,
            left: length,
        }
    }

    /// No expansion at all.
    #[must_use]
    pub const fn zero() -> Self {
        Self::uniform(MarginLength::Px(0.0))
    }

    /// Parse CSS margin shorthand.
    pub fn parse(input: &str) -> Result<Self> {
        let lengths = input
            .split_whitespace()
            .map(|token| MarginLength::parse(input, token))
            .collect::<Result<Vec<_>>>()?;

        let (top, right, bottom, left) = match lengths.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            [] => return Err(WatchError::root_margin(input, "margin is empty")),
            _ => {
                return Err(WatchError::root_margin(
                    input,
                    format!("expected 1 to 4 lengths, got {}", lengths.len()),
                ));
            }
        };

        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::uniform(MarginLength::Px(200.0))
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

impl FromStr for RootMargin {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RootMargin {
    type Error = WatchError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<RootMargin> for String {
    fn from(margin: RootMargin) -> Self {
        margin.to_string()
    }
}

// ─── Threshold ──────────────────────────────────────────────────────────────

/// Fraction of the target's area that must be visible to count as visible.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    /// Any overlap at all.
    pub const ZERO: Self = Self(0.0);
    /// Entire target visible.
    pub const FULL: Self = Self(1.0);

    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(WatchError::InvalidThreshold { value })
        }
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Threshold {
    type Error = WatchError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}

// ─── ObservationRequest ─────────────────────────────────────────────────────

/// Input to [`VisibilityWatcher::watch`](crate::visibility::VisibilityWatcher::watch).
#[derive(Clone)]
pub struct ObservationRequest {
    pub enabled: bool,
    pub root_margin: RootMargin,
    pub threshold: Threshold,
    pub on_intersect: OnIntersect,
}

impl fmt::Debug for ObservationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationRequest")
            .field("enabled", &self.enabled)
            .field("root_margin", &self.root_margin)
            .field("threshold", &self.threshold)
            .field("on_intersect", &Rc::as_ptr(&self.on_intersect).cast::<()>())
            .finish()
    }
}

impl ObservationRequest {
    /// Request with default options (enabled, `200px`, threshold 0) and a new
    /// callback.
    #[must_use]
    pub fn new(on_intersect: impl Fn() + 'static) -> Self {
        Self::from_callback(Rc::new(on_intersect))
    }

    /// Request with default options around an existing callback, keeping its
    /// identity.
    #[must_use]
    pub fn from_callback(on_intersect: OnIntersect) -> Self {
        Self {
            enabled: true,
            root_margin: RootMargin::default(),
            threshold: Threshold::ZERO,
            on_intersect,
        }
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_root_margin(mut self, root_margin: RootMargin) -> Self {
        self.root_margin = root_margin;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub(crate) fn deps(&self) -> WatchDeps {
        WatchDeps {
            enabled: self.enabled,
            root_margin: self.root_margin,
            threshold: self.threshold,
            on_intersect: Rc::clone(&self.on_intersect),
        }
    }
}

/// Dependency list of the watch effect.
#[derive(Clone)]
pub(crate) struct WatchDeps {
    pub(crate) enabled: bool,
    pub(crate) root_margin: RootMargin,
    pub(crate) threshold: Threshold,
    pub(crate) on_intersect: OnIntersect,
}

impl WatchDeps {
    pub(crate) fn options(&self) -> ObserveOptions {
        ObserveOptions {
            root_margin: self.root_margin,
            threshold: self.threshold,
        }
    }
}

impl PartialEq for WatchDeps {
    fn eq(&self, other: &Self) -> bool {
        self.enabled == other.enabled
            && self.root_margin == other.root_margin
            && self.threshold == other.threshold
            && Rc::ptr_eq(&self.on_intersect, &other.on_intersect)
    }
}
