//! Core runtime for contentrepo: the query expression AST, the query
//! compiler that lowers it into remote query text plus execution directives,
//! and the typed collection proxy that executes compiled queries against a
//! retrieval collaborator.

pub(crate) mod logging;

// public exports are one module level down
pub mod config;
pub mod content;
pub mod error;
pub mod expr;
pub mod query;
pub mod repository;
pub mod retrieve;
pub mod set;
pub mod value;

///
/// CONSTANTS
///

/// Field used by the synthetic "match everything" clause.
///
/// Every repository item carries a positive identifier, so `Id:>0` selects
/// the whole repository.
pub const MATCH_ALL_FIELD: &str = "Id";

pub use error::{ErrorClass, QueryError};

///
/// Prelude
///
/// Prelude contains only query-building vocabulary.
/// No executors, retrievers, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        content::{Content, ContentType},
        expr::{
            Expr, IntoExpr, MemberKind, captured, constant, field, if_then_else, in_folder,
            in_tree, is_type, lambda, param, project, reference, type_is,
        },
        query::{ExecutionMode, FilterStatus},
        set::ContentSet,
        value::{ContentRef, Value},
    };
}
