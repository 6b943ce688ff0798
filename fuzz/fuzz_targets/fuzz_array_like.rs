//! Fuzz target for pseudo-list string parsing.
//!
//! Tests that array-like string coercion handles arbitrary input without
//! panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ps_common::value::parse_array_like;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_array_like(s);
    }
});
