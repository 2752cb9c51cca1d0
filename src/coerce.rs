use crate::form::{Form, ScalarKind, Tag};
use crate::schema::Schema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

/// Separator used to split text into array elements in lenient mode.
const ARRAY_DELIMITER: char = ',';

/// Largest integer an `f64` holds without loss (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// How far a value may stray from its native JSON representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastingMode {
    /// Only native JSON representations are accepted.
    Strict,

    /// Textual and numeric stand-ins such as `"true"`, `"1"` or `"null"` are
    /// accepted as well, and arrays may be given as comma-separated text.
    Lenient,
}

impl Default for CastingMode {
    fn default() -> Self {
        CastingMode::Strict
    }
}

/// Settings for one [`coerce`] call: casting mode and depth limit.
#[derive(Clone, Debug, Default)]
pub struct CoerceOptions {
    mode: CastingMode,
    max_depth: usize,
}

impl CoerceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: CastingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Limits how many records deep a schema may nest. Zero, the default,
    /// means no limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Faults raised when the schema or calling code is wrong, as opposed to the
/// data. These are never reported as a [`Coerced::Rejected`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CoerceError {
    #[error("value at /{} is not castable to boolean", .instance_path.join("/"))]
    NotBoolean { instance_path: Vec<String> },

    #[error("value at /{} is not castable to number", .instance_path.join("/"))]
    NotNumber { instance_path: Vec<String> },

    #[error("value at /{} is not a scalar and cannot be resolved as mixed", .instance_path.join("/"))]
    NotScalar { instance_path: Vec<String> },

    #[error("max depth exceeded")]
    MaxDepthExceeded,
}

/// Where an input was rejected. Only the first failing field is reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    pub instance_path: Vec<String>,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input rejected at /{}", self.instance_path.join("/"))
    }
}

/// The outcome of coercing one input against a schema.
#[derive(Clone, Debug, PartialEq)]
pub enum Coerced {
    Accepted(Map<String, Value>),
    Rejected(Rejection),
}

#[derive(Debug, Error)]
pub enum IntoTypedError {
    #[error("{0}")]
    Rejected(Rejection),

    #[error(transparent)]
    Deserialize(#[from] serde_json::Error),
}

impl Coerced {
    pub fn is_ok(&self) -> bool {
        matches!(self, Coerced::Accepted(_))
    }

    pub fn data(&self) -> Option<&Map<String, Value>> {
        match self {
            Coerced::Accepted(record) => Some(record),
            Coerced::Rejected(_) => None,
        }
    }

    pub fn into_data(self) -> Option<Map<String, Value>> {
        match self {
            Coerced::Accepted(record) => Some(record),
            Coerced::Rejected(_) => None,
        }
    }

    /// Deserializes an accepted record into `T`.
    ///
    /// ```
    /// use serde::Deserialize;
    /// use serde_json::json;
    /// use shapecast::{CastingMode, Coercer, Schema};
    ///
    /// #[derive(Deserialize)]
    /// struct Query {
    ///     page: i64,
    ///     tags: Vec<String>,
    ///     debug: Option<bool>,
    /// }
    ///
    /// let schema = Schema::from_serde_schema(
    ///     serde_json::from_value(json!({
    ///         "page": "int",
    ///         "tags": "string[]",
    ///         "debug": "boolean?",
    ///     }))
    ///     .unwrap(),
    /// )
    /// .unwrap();
    ///
    /// let query: Query = Coercer::new(&schema)
    ///     .with_mode(CastingMode::Lenient)
    ///     .parse(&json!({ "page": "3", "tags": "new,sale" }))
    ///     .unwrap()
    ///     .into_typed()
    ///     .unwrap();
    ///
    /// assert_eq!(3, query.page);
    /// assert_eq!(vec!["new", "sale"], query.tags);
    /// assert_eq!(None, query.debug);
    /// ```
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, IntoTypedError> {
        match self {
            Coerced::Accepted(record) => Ok(serde_json::from_value(Value::Object(record))?),
            Coerced::Rejected(rejection) => Err(IntoTypedError::Rejected(rejection)),
        }
    }
}

/// Coerces `input` into a record shaped like `schema`.
///
/// Data that does not fit the schema is reported as `Ok(Coerced::Rejected)`;
/// `Err` is reserved for [`CoerceError`] faults.
pub fn coerce(
    schema: &Schema,
    input: &Value,
    options: CoerceOptions,
) -> Result<Coerced, CoerceError> {
    let mut vm = Vm {
        mode: options.mode,
        max_depth: options.max_depth,
        depth: 0,
        instance_tokens: vec![],
    };

    match vm.record(schema, input) {
        Ok(record) => Ok(Coerced::Accepted(record)),
        Err(VmError::Rejected) => {
            debug!(instance_path = ?vm.instance_tokens, "input rejected");
            Ok(Coerced::Rejected(Rejection {
                instance_path: vm.instance_tokens,
            }))
        }
        Err(VmError::Fault(err)) => {
            debug!(error = %err, "coercion fault");
            Err(err)
        }
    }
}

/// A schema bound to a casting mode, reusable across many inputs.
///
/// ```
/// use serde_json::json;
/// use shapecast::{CastingMode, Coercer, Schema};
///
/// let schema = Schema::from_serde_schema(
///     serde_json::from_value(json!({ "active": "boolean", "note": "string?" })).unwrap(),
/// )
/// .unwrap();
///
/// let strict = Coercer::new(&schema);
/// assert!(!strict.parse(&json!({ "active": "true" })).unwrap().is_ok());
///
/// let lenient = Coercer::new(&schema).with_mode(CastingMode::Lenient);
/// let record = lenient.parse(&json!({ "active": "true" })).unwrap().into_data().unwrap();
/// assert_eq!(json!({ "active": true }), serde_json::Value::Object(record));
/// ```
#[derive(Clone, Debug)]
pub struct Coercer<'a> {
    schema: &'a Schema,
    options: CoerceOptions,
}

impl<'a> Coercer<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            options: CoerceOptions::default(),
        }
    }

    pub fn with_options(schema: &'a Schema, options: CoerceOptions) -> Self {
        Self { schema, options }
    }

    pub fn with_mode(mut self, mode: CastingMode) -> Self {
        self.options.mode = mode;
        self
    }

    pub fn mode(&self) -> CastingMode {
        self.options.mode
    }

    pub fn parse(&self, input: &Value) -> Result<Coerced, CoerceError> {
        coerce(self.schema, input, self.options.clone())
    }
}

struct Vm {
    pub mode: CastingMode,
    pub max_depth: usize,
    pub depth: usize,
    pub instance_tokens: Vec<String>,
}

enum VmError {
    Rejected,
    Fault(CoerceError),
}

impl Vm {
    fn record(&mut self, schema: &Schema, instance: &Value) -> Result<Map<String, Value>, VmError> {
        self.depth += 1;
        if self.max_depth != 0 && self.depth > self.max_depth {
            return Err(VmError::Fault(CoerceError::MaxDepthExceeded));
        }

        let obj = instance.as_object().ok_or(VmError::Rejected)?;
        let mut out = Map::new();

        for (name, form) in &schema.fields {
            self.push_instance_token(name);

            let value = match obj.get(name) {
                Some(value) => value,
                None if form.is_optional() => {
                    self.pop_instance_token();
                    continue;
                }
                None => return Err(VmError::Rejected),
            };

            trace!(field = %name, "coercing field");
            let coerced = self.field(form, value)?;
            out.insert(name.clone(), coerced);

            self.pop_instance_token();
        }

        self.depth -= 1;
        Ok(out)
    }

    fn field(&mut self, form: &Form, value: &Value) -> Result<Value, VmError> {
        match form {
            Form::Scalar(Tag {
                kind, array: false, ..
            }) => self.scalar(*kind, value),
            Form::Scalar(Tag {
                kind, array: true, ..
            }) => self.array(*kind, value),
            Form::Union(kinds) => self.union(kinds, value),
            Form::Nested(schema) => self.nested(schema, value),
        }
    }

    fn scalar(&self, kind: ScalarKind, value: &Value) -> Result<Value, VmError> {
        match kind {
            ScalarKind::Boolean => {
                if !self.is_boolean(value) {
                    return Err(VmError::Rejected);
                }

                Ok(Value::Bool(self.as_boolean(value)?))
            }
            ScalarKind::String => {
                if !value.is_string() {
                    return Err(VmError::Rejected);
                }

                Ok(value.clone())
            }
            ScalarKind::Int => {
                if !self.is_int(value) {
                    return Err(VmError::Rejected);
                }

                Ok(Value::Number(self.as_number(value)?))
            }
            ScalarKind::Float => {
                if !self.is_number(value) {
                    return Err(VmError::Rejected);
                }

                Ok(Value::Number(self.as_number(value)?))
            }
            ScalarKind::Null => {
                if !self.is_null(value) {
                    return Err(VmError::Rejected);
                }

                Ok(Value::Null)
            }
            ScalarKind::Mixed => self.mixed(value),
        }
    }

    fn array(&mut self, kind: ScalarKind, value: &Value) -> Result<Value, VmError> {
        let split: Vec<Value>;
        let elements = match value {
            Value::Array(elements) => elements,
            Value::String(text) if self.mode == CastingMode::Lenient => {
                if text.is_empty() {
                    return Err(VmError::Rejected);
                }

                split = text
                    .split(ARRAY_DELIMITER)
                    .map(|element| Value::String(element.to_owned()))
                    .collect();
                &split
            }
            _ => return Err(VmError::Rejected),
        };

        let mut out = Vec::with_capacity(elements.len());
        for (i, element) in elements.iter().enumerate() {
            self.push_instance_token(&i.to_string());
            out.push(self.scalar(kind, element)?);
            self.pop_instance_token();
        }

        Ok(Value::Array(out))
    }

    fn union(&mut self, kinds: &[ScalarKind], value: &Value) -> Result<Value, VmError> {
        if value.is_array() {
            return Err(VmError::Rejected);
        }

        for kind in kinds {
            match self.scalar(*kind, value) {
                Err(VmError::Rejected) => {
                    trace!(kind = kind.as_str(), "union branch rejected");
                }
                result => return result,
            }
        }

        Err(VmError::Rejected)
    }

    fn nested(&mut self, schema: &Schema, value: &Value) -> Result<Value, VmError> {
        let items = value.as_array().ok_or(VmError::Rejected)?;

        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            self.push_instance_token(&i.to_string());
            out.push(Value::Object(self.record(schema, item)?));
            self.pop_instance_token();
        }

        Ok(Value::Array(out))
    }

    fn mixed(&self, value: &Value) -> Result<Value, VmError> {
        if self.is_number(value) {
            Ok(Value::Number(self.as_number(value)?))
        } else if self.is_boolean(value) {
            Ok(Value::Bool(self.as_boolean(value)?))
        } else if self.is_null(value) {
            Ok(Value::Null)
        } else if value.is_string() {
            Ok(value.clone())
        } else {
            Err(VmError::Fault(CoerceError::NotScalar {
                instance_path: self.instance_tokens.clone(),
            }))
        }
    }

    fn is_boolean(&self, value: &Value) -> bool {
        match (self.mode, value) {
            (_, Value::Bool(_)) => true,
            (CastingMode::Lenient, Value::String(s)) => {
                matches!(s.as_str(), "true" | "false" | "1" | "0")
            }
            (CastingMode::Lenient, Value::Number(n)) => {
                matches!(n.as_f64(), Some(f) if f == 1.0 || f == 0.0)
            }
            _ => false,
        }
    }

    fn as_boolean(&self, value: &Value) -> Result<bool, VmError> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) if s == "true" || s == "1" => Ok(true),
            Value::String(s) if s == "false" || s == "0" => Ok(false),
            Value::Number(n) if n.as_f64() == Some(1.0) => Ok(true),
            Value::Number(n) if n.as_f64() == Some(0.0) => Ok(false),
            _ => Err(VmError::Fault(CoerceError::NotBoolean {
                instance_path: self.instance_tokens.clone(),
            })),
        }
    }

    fn numeric(&self, value: &Value) -> Option<f64> {
        match (self.mode, value) {
            (_, Value::Number(n)) => n.as_f64(),
            (CastingMode::Lenient, Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
            (CastingMode::Lenient, Value::String(s)) => parse_numeric_text(s),
            _ => None,
        }
    }

    fn is_number(&self, value: &Value) -> bool {
        self.numeric(value).is_some()
    }

    fn is_int(&self, value: &Value) -> bool {
        matches!(self.numeric(value), Some(f) if f.fract() == 0.0)
    }

    fn as_number(&self, value: &Value) -> Result<Number, VmError> {
        let number = match value {
            Value::Number(n) => Some(n.clone()),
            Value::Bool(b) => Some(Number::from(*b as i64)),
            Value::String(s) => parse_numeric_text(s).and_then(number_from_f64),
            _ => None,
        };

        number.ok_or_else(|| {
            VmError::Fault(CoerceError::NotNumber {
                instance_path: self.instance_tokens.clone(),
            })
        })
    }

    fn is_null(&self, value: &Value) -> bool {
        match (self.mode, value) {
            (_, Value::Null) => true,
            (CastingMode::Lenient, Value::String(s)) => s == "null",
            _ => false,
        }
    }

    fn push_instance_token(&mut self, token: &str) {
        self.instance_tokens.push(token.to_owned());
    }

    fn pop_instance_token(&mut self) {
        self.instance_tokens.pop();
    }
}

fn parse_numeric_text(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(f) = parse_radix_text(s) {
        return Some(f);
    }

    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Unsigned `0x`, `0o` and `0b` literals.
fn parse_radix_text(s: &str) -> Option<f64> {
    let radix = match s.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };

    let digits = &s[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    u64::from_str_radix(digits, radix).ok().map(|n| n as f64)
}

fn number_from_f64(f: f64) -> Option<Number> {
    if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
        Some(Number::from(f as i64))
    } else {
        Number::from_f64(f)
    }
}
