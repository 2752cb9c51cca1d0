#![no_main]
use libfuzzer_sys::fuzz_target;

use shapecast::{CastingMode, CoerceOptions};

fuzz_target!(|schema_and_instance: (shapecast::Schema, bool, Vec<u8>)| {
    let (schema, lenient, instance) = schema_and_instance;
    let mode = if lenient {
        CastingMode::Lenient
    } else {
        CastingMode::Strict
    };

    // Arbitrary schemas can nest without bound.
    let options = CoerceOptions::new().with_mode(mode).with_max_depth(32);

    if let Ok(instance) = serde_json::from_slice(&instance) {
        let _ = shapecast::coerce(&schema, &instance, options);
    }
});
