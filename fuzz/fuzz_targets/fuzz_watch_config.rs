#![no_main]

use libfuzzer_sys::fuzz_target;
use teamfront_core::config::WatchConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = WatchConfig::from_json(input) {
        let json = config.to_json().expect("valid config serializes");
        assert_eq!(WatchConfig::from_json(&json).expect("round trip"), config);
    }
});
