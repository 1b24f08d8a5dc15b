//! Entry point handing out collection proxies bound to one retriever.

use crate::{
    config::ClientConfig,
    content::{Content, ContentType},
    query::QueryOptions,
    retrieve::Retriever,
    set::ContentSet,
};
use std::{fmt, sync::Arc};

///
/// Repository
///
/// Every proxy it creates starts from the configured query defaults.
///

#[derive(Clone)]
pub struct Repository {
    retriever: Arc<dyn Retriever>,
    config: ClientConfig,
}

impl Repository {
    #[must_use]
    pub fn new(retriever: Arc<dyn Retriever>, config: ClientConfig) -> Self {
        Self { retriever, config }
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Query every item, untyped.
    #[must_use]
    pub fn content(&self) -> ContentSet<Content> {
        self.content_of()
    }

    /// Query every item of type `T`.
    #[must_use]
    pub fn content_of<T: ContentType>(&self) -> ContentSet<T> {
        ContentSet::with_options(Arc::clone(&self.retriever), self.default_options())
    }

    fn default_options(&self) -> QueryOptions {
        self.config.query.options()
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        expr::field,
        query::{ExecutionMode, FilterStatus},
        retrieve::MemoryRetriever,
    };
    use futures::executor::block_on;
    use serde_json::json;

    fn repository(config: ClientConfig) -> (Arc<MemoryRetriever>, Repository) {
        let retriever = Arc::new(MemoryRetriever::new(vec![
            json!({ "Id": 1, "Path": "/Root/Users/Admin", "Name": "Admin", "Type": "User" }),
            json!({
                "Id": 2,
                "Path": "/Root/Users/Jane",
                "Name": "Jane",
                "Type": "User",
                "Email": "jane@example.com",
            }),
        ]));

        (retriever.clone(), Repository::new(retriever, config))
    }

    #[test]
    fn proxies_start_from_configured_defaults() {
        let config = ClientConfig::from_toml_str(
            "[query]\nautofilters = \"disabled\"\nexecution_mode = \"quick\"\n",
        )
        .unwrap();
        let (_, repo) = repository(config);

        let set = repo.content();
        assert_eq!(set.options().autofilters, FilterStatus::Disabled);
        assert_eq!(set.options().execution_mode, ExecutionMode::Quick);
        assert_eq!(set.query_text().unwrap(), "Id:>0 .AUTOFILTERS:OFF .QUICK");
    }

    #[test]
    fn proxy_settings_do_not_leak_back_into_the_repository() {
        let (_, repo) = repository(ClientConfig::default());

        let _ = repo.content().all_versions(true);
        assert!(!repo.content().options().all_versions);
    }

    #[test]
    fn untyped_content_keeps_extra_fields() {
        let (retriever, repo) = repository(ClientConfig::default());

        let items = block_on(repo.content().filter(field("Name").eq("Jane")).to_vec()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].name.as_deref(), Some("Jane"));
        assert_eq!(items[1].field("Email"), Some(&json!("jane@example.com")));
        assert_eq!(retriever.requests()[0].query_text, "Name:jane");
    }
}
