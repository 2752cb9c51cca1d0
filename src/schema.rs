use crate::form::{Form, ScalarKind, Tag};
use crate::serde_schema::{SerdeSchema, SerdeType};
use indexmap::IndexMap;
use thiserror::Error;

/// An ordered mapping from field name to the [`Form`] that field must satisfy.
///
/// Schemas are immutable once built and can be shared by any number of
/// [`coerce`][`crate::coerce`] calls. Field order decides which failing field
/// is reported first.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct Schema {
    pub fields: IndexMap<String, Form>,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FromSerdeSchemaError {
    #[error("invalid tag: {0:?}")]
    InvalidTag(String),

    #[error("empty type list for field {0:?}")]
    EmptyList(String),

    #[error("union members must be plain scalar tags, got {0:?}")]
    InvalidUnionMember(String),

    #[error("nested type list must hold exactly one schema, got {0}")]
    InvalidNestedArity(usize),
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, form: Form) -> Self {
        self.fields.insert(name.into(), form);
        self
    }

    pub fn from_serde_schema(serde_schema: SerdeSchema) -> Result<Self, FromSerdeSchemaError> {
        let mut fields = IndexMap::with_capacity(serde_schema.fields.len());

        for (name, type_) in serde_schema.fields {
            let form = match type_ {
                SerdeType::Tag(tag) => Form::Scalar(
                    tag.parse()
                        .map_err(|_| FromSerdeSchemaError::InvalidTag(tag))?,
                ),
                SerdeType::Union(tags) => {
                    if tags.is_empty() {
                        return Err(FromSerdeSchemaError::EmptyList(name));
                    }

                    Form::Union(
                        tags.into_iter()
                            .map(union_member)
                            .collect::<Result<_, _>>()?,
                    )
                }
                SerdeType::Nested(mut schemas) => {
                    if schemas.len() != 1 {
                        return Err(FromSerdeSchemaError::InvalidNestedArity(schemas.len()));
                    }

                    Form::Nested(Box::new(Self::from_serde_schema(schemas.remove(0))?))
                }
            };

            fields.insert(name, form);
        }

        Ok(Self { fields })
    }
}

fn union_member(tag: String) -> Result<ScalarKind, FromSerdeSchemaError> {
    match tag.parse::<Tag>() {
        Ok(Tag {
            kind,
            array: false,
            optional: false,
        }) => Ok(kind),
        Ok(_) => Err(FromSerdeSchemaError::InvalidUnionMember(tag)),
        Err(()) => Err(FromSerdeSchemaError::InvalidTag(tag)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn from_json(value: serde_json::Value) -> Result<Schema, FromSerdeSchemaError> {
        Schema::from_serde_schema(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn from_serde_schema_scalar() {
        assert_eq!(
            Schema::new()
                .with_field("a", Form::Scalar(Tag::new(ScalarKind::Int)))
                .with_field("b", Form::Scalar(Tag::new(ScalarKind::String).optional()))
                .with_field("c", Form::Scalar(Tag::new(ScalarKind::Mixed).array())),
            from_json(json!({ "a": "int", "b": "string?", "c": "mixed[]" })).unwrap()
        );
    }

    #[test]
    fn from_serde_schema_union() {
        assert_eq!(
            Schema::new().with_field(
                "a",
                Form::Union(vec![ScalarKind::Int, ScalarKind::String])
            ),
            from_json(json!({ "a": ["int", "string"] })).unwrap()
        );
    }

    #[test]
    fn from_serde_schema_nested() {
        assert_eq!(
            Schema::new().with_field(
                "items",
                Form::Nested(Box::new(
                    Schema::new().with_field("id", Form::Scalar(Tag::new(ScalarKind::Int)))
                ))
            ),
            from_json(json!({ "items": [{ "id": "int" }] })).unwrap()
        );
    }

    #[test]
    fn from_serde_schema_keeps_declaration_order() {
        let schema = from_json(json!({ "z": "int", "a": "int", "m": "int" })).unwrap();
        let names: Vec<_> = schema.fields.keys().map(String::as_str).collect();

        assert_eq!(vec!["z", "a", "m"], names);
    }

    #[test]
    fn from_serde_schema_errors() {
        assert_eq!(
            FromSerdeSchemaError::InvalidTag("integer".to_owned()),
            from_json(json!({ "a": "integer" })).unwrap_err()
        );

        assert_eq!(
            FromSerdeSchemaError::InvalidTag("bool".to_owned()),
            from_json(json!({ "a": ["int", "bool"] })).unwrap_err()
        );

        assert_eq!(
            FromSerdeSchemaError::EmptyList("a".to_owned()),
            from_json(json!({ "a": [] })).unwrap_err()
        );

        assert_eq!(
            FromSerdeSchemaError::InvalidUnionMember("int[]".to_owned()),
            from_json(json!({ "a": ["int[]", "string"] })).unwrap_err()
        );

        assert_eq!(
            FromSerdeSchemaError::InvalidUnionMember("string?".to_owned()),
            from_json(json!({ "a": ["int", "string?"] })).unwrap_err()
        );

        assert_eq!(
            FromSerdeSchemaError::InvalidNestedArity(2),
            from_json(json!({ "a": [{ "b": "int" }, { "c": "int" }] })).unwrap_err()
        );

        assert_eq!(
            FromSerdeSchemaError::InvalidTag("nope".to_owned()),
            from_json(json!({ "a": [{ "b": [{ "c": "nope" }] }] })).unwrap_err()
        );
    }
}
