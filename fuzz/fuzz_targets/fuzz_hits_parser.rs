#![no_main]

use libfuzzer_sys::fuzz_target;
use xcob_adapters_archive::parse_line_hits;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to string, lossy is fine for fuzzing
    if let Ok(text) = std::str::from_utf8(data) {
        // The parser is tolerant by contract: any input yields a (possibly
        // empty) hit map. Panics are bugs.
        let _ = parse_line_hits(text);
    }
});
