#![forbid(unsafe_code)]

//! Browser backend for teamfront visibility watching.
//!
//! On `wasm32`, [`DomViewport`] implements
//! [`Viewport`](teamfront_core::visibility::Viewport) on top of the DOM
//! `IntersectionObserver`, using the document viewport as root. The option
//! conversion in [`ObserverInitParts`] is host-independent so it can be
//! tested natively.

use teamfront_core::visibility::ObserveOptions;

#[cfg(target_arch = "wasm32")]
mod dom;

#[cfg(target_arch = "wasm32")]
pub use dom::DomViewport;

/// The `IntersectionObserverInit` values derived from [`ObserveOptions`].
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverInitParts {
    /// `rootMargin`, in the four-value CSS form.
    pub root_margin: String,
    /// `threshold`, a single ratio.
    pub threshold: f64,
}

impl From<&ObserveOptions> for ObserverInitParts {
    fn from(options: &ObserveOptions) -> Self {
        Self {
            root_margin: options.root_margin.to_string(),
            threshold: options.threshold.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use teamfront_core::visibility::{RootMargin, Threshold};

    #[test]
    fn default_options_convert() {
        let parts = ObserverInitParts::from(&ObserveOptions::default());
        assert_eq!(
            parts,
            ObserverInitParts {
                root_margin: "200px 200px 200px 200px".to_string(),
                threshold: 0.0,
            }
        );
    }

    #[test]
    fn mixed_units_and_threshold_convert() {
        let options = ObserveOptions {
            root_margin: RootMargin::parse("-10px 5%").unwrap(),
            threshold: Threshold::new(0.75).unwrap(),
        };
        let parts = ObserverInitParts::from(&options);
        assert_eq!(parts.root_margin, "-10px 5% -10px 5%");
        assert_eq!(parts.threshold, 0.75);
    }
}
