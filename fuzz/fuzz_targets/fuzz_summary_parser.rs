#![no_main]

use libfuzzer_sys::fuzz_target;
use xcob_adapters_summary::parse_summary;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // Decode errors are expected and acceptable; panics are not.
        let _ = parse_summary(text);
    }
});
