#![forbid(unsafe_code)]

//! `IntersectionObserver`-backed viewport.

use js_sys::Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use teamfront_core::error::{Result, WatchError};
use teamfront_core::visibility::{
    ChangeFn, IntersectionRecord, ObserveOptions, Unobserve, Viewport,
};

use crate::ObserverInitParts;

/// The document viewport, observed through one `IntersectionObserver` per
/// observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomViewport;

impl DomViewport {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Viewport for DomViewport {
    type Target = Element;

    fn observe(
        &self,
        target: &Element,
        options: &ObserveOptions,
        mut on_change: ChangeFn,
    ) -> Result<Unobserve> {
        let parts = ObserverInitParts::from(options);
        let init = IntersectionObserverInit::new();
        init.set_root_margin(&parts.root_margin);
        init.set_threshold(&JsValue::from_f64(parts.threshold));

        let closure = Closure::<dyn FnMut(Array)>::new(move |entries: Array| {
            let records: Vec<IntersectionRecord> = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|entry| IntersectionRecord {
                    is_intersecting: entry.is_intersecting(),
                    intersection_ratio: entry.intersection_ratio(),
                })
                .collect();
            on_change(&records);
        });

        let observer =
            IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init)
                .map_err(|err| WatchError::observe_failed(describe(&err)))?;
        observer.observe(target);
        tracing::trace!(message = "dom.observe", root_margin = %parts.root_margin);

        Ok(Unobserve::new(move || {
            observer.disconnect();
            // The JS callback must outlive the observer.
            drop(closure);
        }))
    }
}

fn describe(err: &JsValue) -> String {
    if let Some(err) = err.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
