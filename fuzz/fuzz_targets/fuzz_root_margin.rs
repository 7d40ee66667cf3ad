#![no_main]

use libfuzzer_sys::fuzz_target;
use teamfront_core::visibility::RootMargin;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(margin) = RootMargin::parse(input) {
        // Normalized output must be accepted again and mean the same thing.
        let reparsed = RootMargin::parse(&margin.to_string()).expect("normalized margin parses");
        assert_eq!(reparsed, margin);
    }
});
