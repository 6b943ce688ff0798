//! Fuzz target for text value normalization.
//!
//! Normalization must be total over arbitrary text: no panics, no
//! surprises from date- or number-looking strings.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ps_common::value::{normalize, AttrValue};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = normalize(&AttrValue::Text(s.to_string()));
    }
});
