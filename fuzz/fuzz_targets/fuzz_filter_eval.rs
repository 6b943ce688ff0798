//! Fuzz target for filter evaluation.
//!
//! Deserializes a (filter, sample value) pair from arbitrary JSON and
//! evaluates it. Evaluation may return a typed error but must never
//! panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ps_common::value::AttrValue;
use ps_core::Filter;

fuzz_target!(|data: &[u8]| {
    if let Ok((filter, value)) = serde_json::from_slice::<(Filter, Option<AttrValue>)>(data) {
        let _ = filter.evaluate(value.as_ref());
    }
});
