//! ## Crate layout
//! - `core`: expression AST, query compiler, collection proxy, and the
//!   retrieval contract.
//!
//! The `prelude` module mirrors the surface used by application code:
//! expression builders, the repository handle, and the typed proxy.

pub use contentrepo_core as core;

/// re-exports
///
/// stops the user having to specify the dependencies needed to implement a
/// retriever or a content type in the Cargo.toml file manually
pub mod __reexports {
    pub use async_trait;
    pub use serde;
    pub use serde_json;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::{
    ErrorClass, QueryError,
    config::{ClientConfig, ConfigError},
    repository::Repository,
    retrieve::{RetrieveError, RetrieveRequest, RetrieveResponse, Retriever},
};

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        ErrorClass, QueryError,
        config::ClientConfig,
        content::{Content, ContentType},
        expr::{
            Expr, IntoExpr as _, captured, constant, field, if_then_else, in_folder, in_tree,
            is_type, lambda, param, project, reference, type_is,
        },
        query::{ExecutionMode, FilterStatus},
        repository::Repository,
        retrieve::Retriever,
        set::ContentSet,
        value::{ContentId, ContentRef, Value},
    };
    pub use serde::{Deserialize, Serialize};
}
