//! Fuzz target for TOML engine configuration parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ps_core::EngineConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = EngineConfig::from_toml_str(s);
    }
});
