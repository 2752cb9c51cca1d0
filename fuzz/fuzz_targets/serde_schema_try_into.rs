#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(serde_schema) = serde_json::from_slice::<shapecast::SerdeSchema>(data) {
        let _: Result<shapecast::Schema, shapecast::FromSerdeSchemaError> =
            shapecast::Schema::from_serde_schema(serde_schema);
    }
});
