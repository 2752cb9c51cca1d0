//! Coerce untyped JSON into records declared with a compact schema language.
//!
//! ```
//! use serde_json::json;
//! use shapecast::{coerce, CastingMode, Coerced, CoerceOptions, Schema};
//!
//! let schema = Schema::from_serde_schema(
//!     serde_json::from_value(json!({
//!         "ids": "int[]",
//!         "limit": "int?",
//!         "items": [{ "id": "int", "value": ["float", "null"] }],
//!     }))
//!     .unwrap(),
//! )
//! .unwrap();
//!
//! let options = CoerceOptions::new().with_mode(CastingMode::Lenient);
//! let coerced = coerce(
//!     &schema,
//!     &json!({ "ids": "1,2,3", "items": [{ "id": "9", "value": "null" }] }),
//!     options,
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     Some(json!({ "ids": [1, 2, 3], "items": [{ "id": 9, "value": null }] })),
//!     coerced.into_data().map(serde_json::Value::Object)
//! );
//!
//! let rejected = coerce(&schema, &json!({ "ids": [1, "x"] }), CoerceOptions::new()).unwrap();
//! assert!(matches!(rejected, Coerced::Rejected(_)));
//! ```

mod coerce;
mod form;
mod schema;
mod serde_schema;

pub use coerce::*;
pub use form::*;
pub use schema::*;
pub use serde_schema::*;
