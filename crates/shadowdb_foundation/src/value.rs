//! Core value type for every business field.

use std::fmt;
use std::sync::Arc;

use crate::collections::{LtMap, LtVec};
use crate::error::Error;
use crate::path::{FieldPath, PathSegment};
use crate::Result;

/// Core value type for every business field of an entity.
///
/// A value is a tree: scalars at the leaves, ordered sequences and named
/// mappings as interior nodes, nested arbitrarily deep. Values are immutable
/// and cheaply cloneable (O(1) for containers, which share structure), so a
/// clone is as good as a deep copy.
#[derive(Clone)]
pub enum Value {
    /// The nil value (represents absence).
    Nil,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value.
    String(Arc<str>),
    /// Ordered sequence.
    Seq(LtVec<Value>),
    /// Mapping from field names to values.
    Map(LtMap<Arc<str>, Value>),
}

impl Value {
    /// Returns a short name for the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Seq(_) => "seq",
            Self::Map(_) => "map",
        }
    }

    /// Returns true if this value is nil.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns true if this value is a sequence or a map.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Seq(_) | Self::Map(_))
    }

    /// Attempts to extract a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an integer value.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a float value.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a sequence reference.
    #[must_use]
    pub const fn as_seq(&self) -> Option<&LtVec<Value>> {
        match self {
            Self::Seq(v) => Some(v),
            _ => None,
        }
    }

    /// Attempts to extract a map reference.
    #[must_use]
    pub const fn as_map(&self) -> Option<&LtMap<Arc<str>, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns a zero value shaped like this one.
    ///
    /// Strings become empty, other scalars become zero (`false` for booleans,
    /// nil stays nil). Maps keep their keys with every value zeroed
    /// recursively; sequences become empty.
    #[must_use]
    pub fn zero_like(&self) -> Self {
        match self {
            Self::Nil => Self::Nil,
            Self::Bool(_) => Self::Bool(false),
            Self::Int(_) => Self::Int(0),
            Self::Float(_) => Self::Float(0.0),
            Self::String(_) => Self::String("".into()),
            Self::Seq(_) => Self::Seq(LtVec::new()),
            Self::Map(m) => Self::Map(m.iter().map(|(k, v)| (k.clone(), v.zero_like())).collect()),
        }
    }

    /// Returns an empty container of the same kind, or `None` for scalars.
    #[must_use]
    pub fn empty_like(&self) -> Option<Self> {
        match self {
            Self::Seq(_) => Some(Self::Seq(LtVec::new())),
            Self::Map(_) => Some(Self::Map(LtMap::new())),
            _ => None,
        }
    }

    /// Directional deep comparison against an earlier version of this value.
    ///
    /// Every map key present on `self` must be present on `original` with a
    /// covering value. Keys present only on `original` are not inspected.
    /// Sequences are compared position by position and must have the same
    /// length. Scalars compare by equality.
    #[must_use]
    pub fn covers(&self, original: &Self) -> bool {
        match (self, original) {
            (Self::Map(current), Self::Map(original)) => current
                .iter()
                .all(|(k, v)| original.get(k).is_some_and(|o| v.covers(o))),
            (Self::Seq(current), Self::Seq(original)) => {
                current.len() == original.len()
                    && current.iter().zip(original.iter()).all(|(v, o)| v.covers(o))
            }
            _ => self == original,
        }
    }

    /// Returns the child at one path segment.
    #[must_use]
    pub fn child(&self, segment: &PathSegment) -> Option<&Self> {
        match (self, segment) {
            (Self::Map(m), PathSegment::Key(key)) => m.get(key),
            (Self::Seq(v), PathSegment::Index(index)) => v.get(*index),
            _ => None,
        }
    }

    /// Returns a copy of this container with the child at `segment` replaced.
    ///
    /// Writing past the end of a sequence pads it with nil, up to
    /// [`MAX_PADDING`](crate::MAX_PADDING) slots. Returns `None` if the
    /// segment does not address this kind of container or the index lies
    /// further out than that.
    #[must_use]
    pub fn with_child(&self, segment: &PathSegment, value: Self) -> Option<Self> {
        match (self, segment) {
            (Self::Map(m), PathSegment::Key(key)) => Some(Self::Map(m.insert(key.clone(), value))),
            (Self::Seq(v), PathSegment::Index(index)) => {
                v.set_padded(*index, value, &Self::Nil).map(Self::Seq)
            }
            _ => None,
        }
    }

    /// Resolves a path below this value.
    #[must_use]
    pub fn get_path(&self, path: &FieldPath) -> Option<&Self> {
        path.segments()
            .iter()
            .try_fold(self, |value, segment| value.child(segment))
    }

    /// Returns a copy of this value with `value` written at `path`, using
    /// `shape` (a parallel tree) to decide which containers to create when
    /// an intermediate step is missing here.
    ///
    /// Intermediate steps must exist on `shape`; missing ones fail with
    /// `UnreachableField`. Steps missing here are materialized as empty
    /// containers of the kind found on `shape`, and a scalar on `shape` where
    /// a container is needed fails with `InvalidField`.
    ///
    /// # Errors
    ///
    /// Returns `UnreachableField` or `InvalidField` when the path does not
    /// resolve through the two trees.
    pub fn with_path_shaped_by(&self, shape: &Self, path: &FieldPath, value: Self) -> Result<Self> {
        Self::write_shaped(self, shape, path.segments(), value, path)
    }

    fn write_shaped(
        target: &Self,
        shape: &Self,
        segments: &[PathSegment],
        value: Self,
        path: &FieldPath,
    ) -> Result<Self> {
        match segments {
            [] => Err(Error::invalid_field(path)),
            [last] => target
                .with_child(last, value)
                .ok_or_else(|| Error::invalid_field(path)),
            [head, rest @ ..] => {
                let shape_child = shape
                    .child(head)
                    .ok_or_else(|| Error::unreachable_field(path))?;
                let target_child = match target.child(head) {
                    Some(existing) if existing.is_container() => existing.clone(),
                    Some(_) => return Err(Error::invalid_field(path)),
                    None => shape_child
                        .empty_like()
                        .ok_or_else(|| Error::invalid_field(path))?,
                };
                let written = Self::write_shaped(&target_child, shape_child, rest, value, path)?;
                target
                    .with_child(head, written)
                    .ok_or_else(|| Error::invalid_field(path))
            }
        }
    }
}

// Implement PartialEq manually to handle float comparison
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Seq(a), Self::Seq(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n:?}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Seq(v) => write!(f, "{v:?}"),
            Self::Map(m) => write!(f, "{m:?}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Seq(v) => {
                write!(f, "[")?;
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

// Convenience From implementations

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Self::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Seq(v.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<Arc<str>>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
