use crate::{expr::Expr, retrieve::RetrieveError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// QueryError
///
/// Every failure a query can surface, from compilation through result
/// reduction. Compile-time variants are never retried; retrieval failures are
/// carried opaque so callers can apply their own transport policy.
///

#[derive(Debug, ThisError)]
pub enum QueryError {
    #[error("unsupported expression: {expr}")]
    UnsupportedExpression { expr: String },

    #[error(
        "the '{operator}' operator cannot be translated into a remote query; materialize the results eagerly first (e.g. `to_vec().await`) and apply '{operator}' in memory"
    )]
    DisallowedOperator { operator: String },

    #[error("referenced content has neither an id nor a path")]
    UnresolvableReference,

    #[error("sequence contains no elements")]
    NoElements,

    #[error("index was out of range (index {index})")]
    IndexOutOfRange { index: u32 },

    #[error("sequence contains more than one element")]
    MoreThanOneElement,

    #[error(transparent)]
    Retrieve(#[from] RetrieveError),

    #[error("retrieved content could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

impl QueryError {
    /// Construct an unsupported-expression error naming the offending subtree.
    pub(crate) fn unsupported(expr: &Expr) -> Self {
        Self::UnsupportedExpression {
            expr: expr.to_string(),
        }
    }

    pub(crate) fn disallowed(operator: impl Into<String>) -> Self {
        Self::DisallowedOperator {
            operator: operator.into(),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedExpression { .. }
            | Self::DisallowedOperator { .. }
            | Self::UnresolvableReference => ErrorClass::Unsupported,
            Self::NoElements | Self::IndexOutOfRange { .. } => ErrorClass::NotFound,
            Self::MoreThanOneElement => ErrorClass::Conflict,
            Self::Retrieve(_) => ErrorClass::Transport,
            Self::Decode(_) => ErrorClass::Decode,
        }
    }

    /// True for errors raised before any remote call is made.
    #[must_use]
    pub const fn is_compile_error(&self) -> bool {
        matches!(self.class(), ErrorClass::Unsupported)
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Unsupported,
    NotFound,
    Conflict,
    Transport,
    Decode,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unsupported => "unsupported",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Transport => "transport",
            Self::Decode => "decode",
        };
        f.write_str(label)
    }
}
