//! Retrieval contract: the single remote call a terminal operator makes.

use crate::query::{CompiledQuery, FilterStatus};
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use thiserror::Error as ThisError;

///
/// InlineCount
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum InlineCount {
    #[default]
    None,
    /// Ask for the total match count across all pages.
    AllPages,
}

///
/// RetrieveRequest
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RetrieveRequest {
    pub query_text: String,
    pub autofilters: FilterStatus,
    pub lifespan: FilterStatus,
    pub expand: Vec<String>,
    pub select: Vec<String>,
    pub top: Option<u32>,
    pub skip: Option<u32>,
    pub inline_count: InlineCount,
}

impl RetrieveRequest {
    #[must_use]
    pub fn from_compiled(query: &CompiledQuery) -> Self {
        Self {
            query_text: query.to_text(),
            autofilters: query.autofilter_mode,
            lifespan: query.lifespan_filter_mode,
            expand: query.expand_fields.clone(),
            select: query.select_fields.clone(),
            top: query.top,
            skip: query.skip,
            inline_count: if query.count_only {
                InlineCount::AllPages
            } else {
                InlineCount::None
            },
        }
    }
}

///
/// RetrieveResponse
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RetrieveResponse {
    pub items: Vec<serde_json::Value>,
    pub total_count: u64,
}

///
/// RetrieveError
///
/// Transport-level failures are carried opaque; the query layer never
/// interprets or retries them.
///

#[derive(Debug, ThisError)]
pub enum RetrieveError {
    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

impl RetrieveError {
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }
}

///
/// Retriever
///

#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, request: RetrieveRequest) -> Result<RetrieveResponse, RetrieveError>;
}

///
/// MemoryRetriever
///
/// Serves a fixed item list, applying only the paging directives.
/// Every request is recorded so callers can inspect what was sent.
///

#[derive(Debug, Default)]
pub struct MemoryRetriever {
    items: Vec<serde_json::Value>,
    requests: Mutex<Vec<RetrieveRequest>>,
}

impl MemoryRetriever {
    #[must_use]
    pub fn new(items: Vec<serde_json::Value>) -> Self {
        Self {
            items,
            requests: Mutex::default(),
        }
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RetrieveRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Retriever for MemoryRetriever {
    async fn retrieve(&self, request: RetrieveRequest) -> Result<RetrieveResponse, RetrieveError> {
        let skip = request.skip.map_or(0, |skip| skip as usize);
        let top = request.top.map_or(usize::MAX, |top| top as usize);

        let items = self.items.iter().skip(skip).take(top).cloned().collect();
        let total_count = self.items.len() as u64;

        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        Ok(RetrieveResponse { items, total_count })
    }
}
