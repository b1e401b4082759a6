//! Explicit record definitions.
//!
//! A [`RecordSchema`] describes the fields of one entity type and knows how
//! to build a zero-valued record of that type. Types registered with a
//! schema can always allocate new entities, even before any exist.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::collections::{LtMap, LtVec};
use crate::record::Record;
use crate::value::Value;

/// Type descriptor for a record field.
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    /// The nil type (only value: nil).
    Nil,
    /// Boolean type.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// String type.
    String,
    /// Ordered sequence of the element type.
    Seq(Box<Type>),
    /// Free-form mapping with values of the given type.
    Map(Box<Type>),
    /// Nested record with a fixed set of fields.
    Record(Vec<FieldSchema>),
}

impl Type {
    /// Creates a sequence type with the given element type.
    #[must_use]
    pub fn seq(element: Type) -> Self {
        Self::Seq(Box::new(element))
    }

    /// Creates a map type with the given value type.
    #[must_use]
    pub fn map(value: Type) -> Self {
        Self::Map(Box::new(value))
    }

    /// Returns the zero value of this type.
    #[must_use]
    pub fn zero(&self) -> Value {
        match self {
            Self::Nil => Value::Nil,
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Float => Value::Float(0.0),
            Self::String => Value::String("".into()),
            Self::Seq(_) => Value::Seq(LtVec::new()),
            Self::Map(_) => Value::Map(LtMap::new()),
            Self::Record(fields) => Value::Map(
                fields
                    .iter()
                    .map(|field| (field.name.clone(), field.initial()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
            Self::Seq(elem) => write!(f, "[{elem:?}]"),
            Self::Map(value) => write!(f, "{{_: {value:?}}}"),
            Self::Record(fields) => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {:?}", field.name, field.ty)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Schema definition for a record field.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldSchema {
    /// Field name.
    pub name: Arc<str>,
    /// Field type.
    pub ty: Type,
    /// Initial value for new entities; the type's zero when absent.
    pub default: Option<Value>,
}

impl FieldSchema {
    /// Creates a field starting at its type's zero value.
    #[must_use]
    pub fn new(name: &str, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    /// Creates a field with an explicit initial value.
    #[must_use]
    pub fn with_default(name: &str, ty: Type, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            ty,
            default: Some(default.into()),
        }
    }

    /// Returns the value a new entity starts with.
    #[must_use]
    pub fn initial(&self) -> Value {
        self.default.clone().unwrap_or_else(|| self.ty.zero())
    }
}

/// Schema definition for an entity type.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecordSchema {
    /// Field definitions, in declaration order.
    pub fields: Vec<FieldSchema>,
}

impl RecordSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Adds a field to the schema.
    #[must_use]
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the field schema by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| &*f.name == name)
    }

    /// Builds the record a newly allocated entity of this type starts with.
    #[must_use]
    pub fn zero_record(&self) -> Record {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.initial()))
            .collect()
    }
}
