use crate::schema::Schema;
use std::fmt;
use std::str::FromStr;

/// The type constraint attached to one field of a [`Schema`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum Form {
    Scalar(Tag),
    Union(Vec<ScalarKind>),
    Nested(Box<Schema>),
}

impl Form {
    /// Whether the field may be absent from the input.
    pub fn is_optional(&self) -> bool {
        matches!(self, Form::Scalar(Tag { optional: true, .. }))
    }
}

/// A decoded scalar tag such as `int`, `string?` or `mixed[]?`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct Tag {
    pub kind: ScalarKind,
    pub array: bool,
    pub optional: bool,
}

impl Tag {
    pub fn new(kind: ScalarKind) -> Self {
        Self {
            kind,
            array: false,
            optional: false,
        }
    }

    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl FromStr for Tag {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (s, optional) = match s.strip_suffix('?') {
            Some(rest) => (rest, true),
            None => (s, false),
        };

        let (s, array) = match s.strip_suffix("[]") {
            Some(rest) => (rest, true),
            None => (s, false),
        };

        Ok(Self {
            kind: s.parse()?,
            array,
            optional,
        })
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        if self.array {
            f.write_str("[]")?;
        }
        if self.optional {
            f.write_str("?")?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum ScalarKind {
    Int,
    Float,
    Boolean,
    String,
    Null,
    Mixed,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Null => "null",
            Self::Mixed => "mixed",
        }
    }
}

impl FromStr for ScalarKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "boolean" => Ok(Self::Boolean),
            "string" => Ok(Self::String),
            "null" => Ok(Self::Null),
            "mixed" => Ok(Self::Mixed),
            _ => Err(()),
        }
    }
}
