use crate::form::Form;
use crate::schema::Schema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A JSON representation of shapecast schemas, compatible with `serde_json`.
///
/// To convert this into a [`Schema`][`crate::Schema`], see
/// [`Schema::from_serde_schema`][`crate::Schema::from_serde_schema`].
///
/// ```
/// use shapecast::{SerdeSchema, SerdeType};
/// use serde_json::json;
///
/// let serde_schema: SerdeSchema = serde_json::from_value(json!({
///     "id": "int",
///     "tags": "string[]?",
///     "score": ["float", "null"],
/// }))
/// .unwrap();
///
/// assert_eq!(Some(&SerdeType::Tag("int".to_owned())), serde_schema.fields.get("id"));
/// assert_eq!(
///     Some(&SerdeType::Union(vec!["float".to_owned(), "null".to_owned()])),
///     serde_schema.fields.get("score")
/// );
/// ```
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct SerdeSchema {
    pub fields: IndexMap<String, SerdeType>,
}

/// The JSON shape of a single field's type: a tag string, a list of tags, or
/// a one-element list holding a nested schema.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum SerdeType {
    Tag(String),
    Union(Vec<String>),
    Nested(Vec<SerdeSchema>),
}

impl From<Schema> for SerdeSchema {
    fn from(schema: Schema) -> SerdeSchema {
        let fields = schema
            .fields
            .into_iter()
            .map(|(name, form)| {
                let type_ = match form {
                    Form::Scalar(tag) => SerdeType::Tag(tag.to_string()),
                    Form::Union(kinds) => SerdeType::Union(
                        kinds.iter().map(|kind| kind.as_str().to_owned()).collect(),
                    ),
                    Form::Nested(schema) => SerdeType::Nested(vec![(*schema).into()]),
                };

                (name, type_)
            })
            .collect();

        SerdeSchema { fields }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    #[test]
    fn parse_empty() {
        assert_eq!(
            super::SerdeSchema::default(),
            serde_json::from_value(json!({})).unwrap()
        );
    }

    #[test]
    fn parse_full() {
        use super::SerdeType;

        assert_eq!(
            super::SerdeSchema {
                fields: vec![
                    ("a".to_owned(), SerdeType::Tag("int?".to_owned())),
                    (
                        "b".to_owned(),
                        SerdeType::Union(vec!["int".to_owned(), "string".to_owned()])
                    ),
                    (
                        "c".to_owned(),
                        SerdeType::Nested(vec![super::SerdeSchema {
                            fields: vec![("d".to_owned(), SerdeType::Tag("mixed[]".to_owned()))]
                                .into_iter()
                                .collect()
                        }])
                    ),
                ]
                .into_iter()
                .collect()
            },
            serde_json::from_value(json!({
                "a": "int?",
                "b": ["int", "string"],
                "c": [{ "d": "mixed[]" }],
            }))
            .unwrap()
        );
    }

    #[test]
    fn parse_rejects_other_shapes() {
        assert!(serde_json::from_value::<super::SerdeSchema>(json!({ "a": 1 })).is_err());
        assert!(serde_json::from_value::<super::SerdeSchema>(json!({ "a": ["int", {}] })).is_err());
        assert!(serde_json::from_value::<super::SerdeSchema>(json!(["int"])).is_err());
    }

    #[test]
    fn serialize_keeps_order() {
        let serde_schema: super::SerdeSchema =
            serde_json::from_str(r#"{"z":"int","a":["int","null"],"m":[{"x":"float?"}]}"#)
                .unwrap();

        assert_eq!(
            r#"{"z":"int","a":["int","null"],"m":[{"x":"float?"}]}"#,
            serde_json::to_string(&serde_schema).unwrap()
        );
    }

    #[test]
    fn from_scalar() {
        assert_roundtrip_try_into_from(json!({ "a": "int" }));
        assert_roundtrip_try_into_from(json!({ "a": "float?" }));
        assert_roundtrip_try_into_from(json!({ "a": "boolean[]" }));
        assert_roundtrip_try_into_from(json!({ "a": "null[]?" }));
        assert_roundtrip_try_into_from(json!({ "a": "string", "b": "mixed?" }));
    }

    #[test]
    fn from_union() {
        assert_roundtrip_try_into_from(json!({ "a": ["int", "string"] }));
        assert_roundtrip_try_into_from(json!({ "a": ["mixed", "null", "boolean"] }));
    }

    #[test]
    fn from_nested() {
        assert_roundtrip_try_into_from(json!({ "items": [{ "id": "int" }] }));
        assert_roundtrip_try_into_from(json!({
            "items": [{
                "id": "int",
                "children": [{ "name": "string?" }],
            }],
        }));
    }

    fn assert_roundtrip_try_into_from(json: serde_json::Value) {
        let serde_schema: super::SerdeSchema = serde_json::from_value(json).unwrap();
        let schema = crate::Schema::from_serde_schema(serde_schema.clone()).unwrap();

        assert_eq!(serde_schema, schema.into());
    }
}
