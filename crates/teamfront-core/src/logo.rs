#![forbid(unsafe_code)]

//! Branding logo sizing.
//!
//! The logo asset is drawn at one base size and scaled by CSS transform, so
//! the only per-size state is the scale factor.

use serde::{Deserialize, Serialize};

/// Display size of the logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoSize {
    Sm,
    #[default]
    Md,
    Lg,
}

impl LogoSize {
    /// Display scale relative to the asset's base size.
    #[must_use]
    pub const fn scale(self) -> f32 {
        match self {
            Self::Sm => 0.75,
            Self::Md => 1.0,
            Self::Lg => 1.25,
        }
    }
}

/// A sized logo with its accessible label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logo {
    size: LogoSize,
    alt: String,
}

impl Default for Logo {
    fn default() -> Self {
        Self::new(LogoSize::default())
    }
}

impl Logo {
    #[must_use]
    pub fn new(size: LogoSize) -> Self {
        Self {
            size,
            alt: "Logo".to_string(),
        }
    }

    #[must_use]
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = alt.into();
        self
    }

    #[must_use]
    pub fn size(&self) -> LogoSize {
        self.size
    }

    #[must_use]
    pub fn alt(&self) -> &str {
        &self.alt
    }

    /// CSS `transform` value, e.g. `scale(0.75)`.
    #[must_use]
    pub fn transform(&self) -> String {
        format!("scale({})", self.size.scale())
    }

    /// Rendered pixel dimensions for an asset of `base` pixels, rounded.
    ///
    /// Results past `u32::MAX` saturate at `u32::MAX`.
    #[must_use]
    pub fn pixel_size(&self, base: (u32, u32)) -> (u32, u32) {
        let s = f64::from(self.size.scale());
        let scale = |v: u32| (f64::from(v) * s).round() as u32;
        (scale(base.0), scale(base.1))
    }
}
