use crate::query::{Predicate, QueryFingerprint};
use serde::{Deserialize, Serialize};

///
/// ElementSelection
///
/// Which single item, if any, a terminal call extracts from the result.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ElementSelection {
    #[default]
    None,
    First,
    Single,
    Last,
    ElementAt,
}

///
/// FilterStatus
///
/// Tri-state switch for a server-side filter.
/// `Default` leaves the decision to the server.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStatus {
    #[default]
    Default,
    Enabled,
    Disabled,
}

///
/// ExecutionMode
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Default,
    /// Ask the server to answer from its index without permission resolution.
    Quick,
}

///
/// QueryOptions
///
/// Settings carried alongside an expression chain.
/// Explicit `expand`/`select` lists override the projection-derived ones.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QueryOptions {
    pub autofilters: FilterStatus,
    pub lifespan: FilterStatus,
    pub execution_mode: ExecutionMode,
    pub all_versions: bool,
    pub expand: Option<Vec<String>>,
    pub select: Option<Vec<String>>,
}

///
/// CompiledQuery
///
/// Output of one compile call: the predicate tree plus every execution
/// directive the retrieval side needs.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledQuery {
    pub predicate: Option<Predicate>,
    /// Sort keys in priority order; `true` means descending.
    pub sort: Vec<(String, bool)>,
    pub top: Option<u32>,
    pub skip: Option<u32>,
    pub count_only: bool,
    pub existence_only: bool,
    pub element_selection: ElementSelection,
    /// Requested position for `ElementAt`, relative to the chain's paging.
    pub element_index: Option<u32>,
    pub throw_if_empty: bool,
    pub expand_fields: Vec<String>,
    pub select_fields: Vec<String>,
    pub autofilter_mode: FilterStatus,
    pub lifespan_filter_mode: FilterStatus,
    pub execution_mode: ExecutionMode,
    pub all_versions: bool,
}

impl CompiledQuery {
    /// Serialized query text, the wire contract of the search endpoint.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    #[must_use]
    pub fn fingerprint(&self) -> QueryFingerprint {
        QueryFingerprint::of_text(&self.to_text())
    }

    pub(crate) fn apply_options(&mut self, options: &QueryOptions) {
        self.autofilter_mode = options.autofilters;
        self.lifespan_filter_mode = options.lifespan;
        self.execution_mode = options.execution_mode;
        self.all_versions = options.all_versions;

        if let Some(expand) = &options.expand {
            self.expand_fields.clone_from(expand);
        }
        if let Some(select) = &options.select {
            self.select_fields.clone_from(select);
        }
    }
}
