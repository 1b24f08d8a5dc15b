#[cfg(test)]
mod tests;

use crate::error::QueryError;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};
use time::PrimitiveDateTime;

///
/// ContentId
///
/// Repository-wide numeric identifier of one item.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct ContentId(pub u64);

///
/// ContentRef
///
/// Reference to another repository item, addressed by id and/or path.
/// Either side may be missing; a reference with neither cannot be used in a
/// query.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ContentRef {
    pub id: Option<ContentId>,
    pub path: Option<String>,
}

impl ContentRef {
    #[must_use]
    pub const fn by_id(id: u64) -> Self {
        Self {
            id: Some(ContentId(id)),
            path: None,
        }
    }

    #[must_use]
    pub fn by_path(path: impl Into<String>) -> Self {
        Self {
            id: None,
            path: Some(path.into()),
        }
    }

    /// Identity term used when the reference is compared against a field.
    ///
    /// The identifier wins; the path is only used when no identifier is known.
    pub fn identity(&self) -> Result<Value, QueryError> {
        match (self.id, &self.path) {
            (Some(id), _) => Ok(Value::Int(id_to_int(id))),
            (None, Some(path)) => Ok(Value::Text(path.to_lowercase())),
            (None, None) => Err(QueryError::UnresolvableReference),
        }
    }

    /// Lower-cased path term used by path-scoping keywords.
    pub fn path_term(&self) -> Result<String, QueryError> {
        self.path
            .as_deref()
            .map(str::to_lowercase)
            .ok_or(QueryError::UnresolvableReference)
    }
}

// Identifiers never exceed i64::MAX in practice; saturate instead of wrapping.
fn id_to_int(id: ContentId) -> i64 {
    i64::try_from(id.0).unwrap_or(i64::MAX)
}

///
/// Value
///
/// Literal carried by expressions and predicates.
///
/// Type        → a content type name (e.g. `typeof(User)`), compared by name.
/// Content     → a nested repository item, compared by its identity.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(PrimitiveDateTime),
    Type(String),
    Content(ContentRef),
    List(Vec<Self>),
}

impl Value {
    /// Construct a type value from a content type name.
    #[must_use]
    pub fn type_name(name: impl Into<String>) -> Self {
        Self::Type(name.into())
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert into the value a remote index compares against.
    ///
    /// Text is case-folded, type values collapse to their lower-cased name and
    /// content references collapse to their identity.
    pub fn to_comparable(&self) -> Result<Self, QueryError> {
        Ok(match self {
            Self::Text(v) | Self::Type(v) => Self::Text(v.to_lowercase()),
            Self::Content(reference) => reference.identity()?,
            Self::List(items) => Self::List(
                items
                    .iter()
                    .map(Self::to_comparable)
                    .collect::<Result<_, _>>()?,
            ),
            other => other.clone(),
        })
    }

    /// Ordering between two values of the same scalar family.
    #[must_use]
    pub fn partial_cmp_value(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            #[allow(clippy::cast_precision_loss)]
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            #[allow(clippy::cast_precision_loss)]
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) | (Self::Type(a), Self::Type(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "\"{v}\""),
            Self::DateTime(v) => write!(f, "{v}"),
            Self::Type(v) => write!(f, "typeof({v})"),
            Self::Content(reference) => match (reference.id, &reference.path) {
                (Some(id), _) => write!(f, "content({id})"),
                (None, Some(path)) => write!(f, "content({path})"),
                (None, None) => f.write_str("content(?)"),
            },
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

// ----------------------------------------------------------------------
// Conversions
// ----------------------------------------------------------------------

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<PrimitiveDateTime> for Value {
    fn from(v: PrimitiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<ContentRef> for Value {
    fn from(v: ContentRef) -> Self {
        Self::Content(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}
