#![no_main]

use std::cell::Cell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use teamfront_core::visibility::{
    FakeElement, FakeViewport, IntersectionRecord, ObservationRequest, OnIntersect, Threshold,
    VisibilityWatcher,
};

#[derive(Arbitrary, Debug)]
enum Step {
    Report { visible: bool, ratio: u8 },
    Enable(bool),
    Threshold(u8),
    NewCallback,
    Bind(bool),
    Teardown,
}

const EL: FakeElement = FakeElement(1);

fuzz_target!(|steps: Vec<Step>| {
    let fake = FakeViewport::new();
    let mut watcher = VisibilityWatcher::new(fake.clone());
    let hits = Rc::new(Cell::new(0u32));
    let make_cb = |hits: &Rc<Cell<u32>>| -> OnIntersect {
        let hits = Rc::clone(hits);
        Rc::new(move || hits.set(hits.get() + 1))
    };
    let mut request = ObservationRequest::from_callback(make_cb(&hits));

    for step in steps {
        match step {
            Step::Report { visible, ratio } => {
                let record = if visible {
                    IntersectionRecord::partial(f64::from(ratio) / 255.0)
                } else {
                    IntersectionRecord::hidden()
                };
                let before = hits.get();
                fake.report(EL, record);
                assert!(hits.get() - before <= 1);
                if !watcher.is_observing() {
                    assert_eq!(hits.get(), before);
                }
            }
            Step::Enable(on) => request = request.clone().with_enabled(on),
            Step::Threshold(t) => {
                let threshold = Threshold::new(f64::from(t) / 255.0).expect("in range");
                request = request.clone().with_threshold(threshold);
            }
            Step::NewCallback => request.on_intersect = make_cb(&hits),
            Step::Bind(bound) => {
                if bound {
                    watcher.handle().bind(EL);
                } else {
                    watcher.handle().unbind();
                }
            }
            Step::Teardown => watcher.teardown(),
        }
        watcher.watch(&request);
        assert!(fake.live_observers() <= 1);
    }
});
