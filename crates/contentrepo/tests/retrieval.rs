//! Terminal operators against a retriever implemented outside the crate.

use contentrepo::{
    RetrieveError, RetrieveRequest, RetrieveResponse,
    __reexports::{async_trait::async_trait, serde_json::json},
    prelude::*,
};
use futures::executor::block_on;
use std::sync::{Arc, Mutex};

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct Article {
    id: u64,
    name: String,
    #[serde(default)]
    rating: Option<u32>,
}

impl ContentType for Article {
    const TYPE_NAME: &'static str = "Article";
}

///
/// PagingRetriever
///
/// Serves a fixed catalog and reports a total larger than one page, the way
/// a paging server does.
///

#[derive(Debug, Default)]
struct PagingRetriever {
    catalog: Vec<serde_json::Value>,
    sent: Mutex<Vec<String>>,
    offline: bool,
}

impl PagingRetriever {
    fn with_catalog(size: u64) -> Self {
        let catalog = (1..=size)
            .map(|id| json!({ "Id": id, "Name": format!("article-{id}"), "Rating": id % 5 }))
            .collect();

        Self {
            catalog,
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for PagingRetriever {
    async fn retrieve(&self, request: RetrieveRequest) -> Result<RetrieveResponse, RetrieveError> {
        if self.offline {
            return Err(RetrieveError::transport(std::io::Error::other("connection refused")));
        }
        self.sent.lock().unwrap().push(request.query_text.clone());

        let skip = request.skip.unwrap_or(0) as usize;
        let top = request.top.map_or(usize::MAX, |top| top as usize);
        let page_size = if request.query_text.contains(".COUNTONLY") {
            0
        } else {
            top
        };

        Ok(RetrieveResponse {
            items: self.catalog.iter().skip(skip).take(page_size).cloned().collect(),
            total_count: self.catalog.len() as u64,
        })
    }
}

fn articles(retriever: &Arc<PagingRetriever>) -> ContentSet<Article> {
    Repository::new(retriever.clone(), ClientConfig::default()).content_of()
}

#[test]
fn count_uses_the_server_total() {
    let retriever = Arc::new(PagingRetriever::with_catalog(42));

    let count = block_on(articles(&retriever).count()).unwrap();
    assert_eq!(count, 42);
    assert_eq!(retriever.sent(), vec!["Id:>0 .COUNTONLY"]);
}

#[test]
fn any_is_true_when_the_total_is_positive() {
    let retriever = Arc::new(PagingRetriever::with_catalog(3));
    assert!(block_on(articles(&retriever).any_where(field("Rating").gt(1))).unwrap());

    let empty = Arc::new(PagingRetriever::default());
    assert!(!block_on(articles(&empty).any()).unwrap());
}

#[test]
fn first_decodes_the_leading_item() {
    let retriever = Arc::new(PagingRetriever::with_catalog(3));

    let article = block_on(articles(&retriever).order_by(field("Name")).first()).unwrap();
    assert_eq!(
        article,
        Article {
            id: 1,
            name: "article-1".to_string(),
            rating: Some(1),
        }
    );
    assert_eq!(retriever.sent(), vec!["Id:>0 .TOP:1 .SORT:Name"]);
}

#[test]
fn page_then_element_at() {
    let retriever = Arc::new(PagingRetriever::with_catalog(10));
    let page = articles(&retriever).skip(4);

    assert_eq!(block_on(page.element_at(2)).unwrap().id, 7);
    assert_eq!(block_on(page.element_at_or_default(20)).unwrap(), None);

    let err = block_on(page.element_at(20)).unwrap_err();
    assert!(matches!(err, QueryError::IndexOutOfRange { index: 20 }));
}

#[test]
fn single_requests_two_to_detect_duplicates() {
    let retriever = Arc::new(PagingRetriever::with_catalog(5));

    let err = block_on(articles(&retriever).single()).unwrap_err();
    assert!(matches!(err, QueryError::MoreThanOneElement));
    assert_eq!(err.class(), ErrorClass::Conflict);
    assert_eq!(retriever.sent(), vec!["Id:>0 .TOP:2"]);
}

#[test]
fn to_vec_returns_one_page() {
    let retriever = Arc::new(PagingRetriever::with_catalog(50));

    let page = block_on(articles(&retriever).take(5).to_vec()).unwrap();
    assert_eq!(page.len(), 5);
    assert_eq!(page.last().map(|a| a.id), Some(5));
}

#[test]
fn transport_failures_are_classified() {
    let retriever = Arc::new(PagingRetriever {
        offline: true,
        ..PagingRetriever::default()
    });

    let err = block_on(articles(&retriever).to_vec()).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Transport);
    assert!(err.to_string().contains("connection refused"));
}

#[test]
fn disallowed_operators_never_reach_the_retriever() {
    let retriever = Arc::new(PagingRetriever::with_catalog(5));

    let err = articles(&retriever).apply("Reverse", Vec::new()).unwrap_err();
    assert!(matches!(err, QueryError::DisallowedOperator { .. }));
    assert!(retriever.sent().is_empty());
}
