//! Fuzz target for replay script decoding
//!
//! Arbitrary text must either be rejected as an invalid script or replay
//! without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use prism_replay::{ReplayOptions, Script, replay};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(script) = Script::from_json(text) else {
        return;
    };

    let outcome = replay(&script, &ReplayOptions::default()).expect("lenient replay never fails");
    assert_eq!(outcome.steps, script.len());
});
