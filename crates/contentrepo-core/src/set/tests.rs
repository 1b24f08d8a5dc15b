use super::*;
use crate::{
    error::ErrorClass,
    expr::{field, reference},
    retrieve::{InlineCount, MemoryRetriever, RetrieveError},
};
use async_trait::async_trait;
use futures::executor::block_on;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct User {
    id: u64,
    name: String,
}

impl ContentType for User {
    const TYPE_NAME: &'static str = "User";
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct Administrator {
    id: u64,
}

impl ContentType for Administrator {
    const TYPE_NAME: &'static str = "Administrator";
}

fn user(id: u64, name: &str) -> serde_json::Value {
    json!({ "Id": id, "Name": name })
}

fn users(items: Vec<serde_json::Value>) -> (Arc<MemoryRetriever>, ContentSet<User>) {
    let retriever = Arc::new(MemoryRetriever::new(items));
    let set = ContentSet::new(retriever.clone());

    (retriever, set)
}

fn last_request(retriever: &MemoryRetriever) -> RetrieveRequest {
    retriever.requests().pop().expect("a request was sent")
}

///
/// FailingRetriever
///

#[derive(Debug)]
struct FailingRetriever;

#[async_trait]
impl Retriever for FailingRetriever {
    async fn retrieve(&self, _: RetrieveRequest) -> Result<RetrieveResponse, RetrieveError> {
        Err(RetrieveError::Rejected {
            status: 503,
            message: "unavailable".to_string(),
        })
    }
}

// ----------------------------------------------------------------------
// Chaining
// ----------------------------------------------------------------------

#[test]
fn chaining_never_mutates_the_source_set() {
    let (_, base) = users(Vec::new());
    let filtered = base.filter(field("Name").eq("Admin"));
    let paged = base.take(5);

    assert_eq!(base.query_text().unwrap(), "Id:>0");
    assert_eq!(filtered.query_text().unwrap(), "Name:admin");
    assert_eq!(paged.query_text().unwrap(), "Id:>0 .TOP:5");
}

#[test]
fn settings_carry_across_chained_calls() {
    let (_, base) = users(Vec::new());
    let set = base
        .autofilters(FilterStatus::Disabled)
        .lifespan(FilterStatus::Enabled)
        .filter(field("Name").eq("Admin"))
        .execution_mode(ExecutionMode::Quick)
        .order_by(field("Name"));

    assert_eq!(
        set.query_text().unwrap(),
        "Name:admin .SORT:Name .AUTOFILTERS:OFF .LIFESPAN:ON .QUICK"
    );
    assert_eq!(base.options(), &QueryOptions::default());
}

#[test]
fn of_type_scopes_to_the_subtype() {
    let (_, base) = users(Vec::new());
    let admins = base
        .filter(field("Name").starts_with("A"))
        .of_type::<Administrator>()
        .all_versions(true);

    assert_eq!(
        admins.query_text().unwrap(),
        "+Name:A* +TypeIs:administrator .ALLVERSIONS"
    );
}

#[test]
fn apply_refuses_collection_only_operators_immediately() {
    let (_, base) = users(Vec::new());

    let err = base.apply("GroupBy", vec![lambda(field("Name"))]).unwrap_err();
    assert!(matches!(err, QueryError::DisallowedOperator { .. }));

    let taken = base.apply("Take", vec![constant(2)]).unwrap();
    assert_eq!(taken.query_text().unwrap(), "Id:>0 .TOP:2");
}

#[test]
fn unknown_applied_operator_fails_at_compile_time() {
    let (_, base) = users(Vec::new());
    let set = base.apply("Shuffle", Vec::new()).unwrap();

    assert!(matches!(
        set.compile(),
        Err(QueryError::UnsupportedExpression { .. })
    ));
}

#[test]
fn explicit_lists_override_projection_in_request() {
    let (retriever, base) = users(vec![user(1, "a")]);
    let set = base
        .project([field("Id"), reference("Manager").member("Name")])
        .select(["Id", "Name"]);

    block_on(set.to_vec()).unwrap();
    let request = last_request(&retriever);
    assert_eq!(request.select, vec!["Id", "Name"]);
    assert_eq!(request.expand, vec!["Manager"]);
}

// ----------------------------------------------------------------------
// Terminals
// ----------------------------------------------------------------------

#[test]
fn to_vec_decodes_every_item() {
    let (retriever, base) = users(vec![user(1, "a"), user(2, "b")]);

    let items = block_on(base.to_vec()).unwrap();
    assert_eq!(
        items,
        vec![
            User {
                id: 1,
                name: "a".to_string()
            },
            User {
                id: 2,
                name: "b".to_string()
            },
        ]
    );
    assert_eq!(retriever.requests().len(), 1);
}

#[test]
fn first_on_empty_raises_and_or_default_does_not() {
    let (_, base) = users(Vec::new());

    let err = block_on(base.first()).unwrap_err();
    assert!(matches!(err, QueryError::NoElements));
    assert_eq!(err.to_string(), "sequence contains no elements");
    assert_eq!(err.class(), ErrorClass::NotFound);

    assert_eq!(block_on(base.first_or_default()).unwrap(), None);
}

#[test]
fn first_sends_top_one() {
    let (retriever, base) = users(vec![user(1, "a"), user(2, "b")]);

    let first = block_on(base.first_where(field("Name").eq("A"))).unwrap();
    assert_eq!(first.id, 1);

    let request = last_request(&retriever);
    assert_eq!(request.query_text, "Name:a .TOP:1");
    assert_eq!(request.top, Some(1));
    assert_eq!(request.inline_count, InlineCount::None);
}

#[test]
fn single_detects_a_second_element() {
    let (_, two) = users(vec![user(1, "a"), user(2, "b")]);
    let err = block_on(two.single()).unwrap_err();
    assert!(matches!(err, QueryError::MoreThanOneElement));
    assert!(block_on(two.single_or_default()).is_err());

    let (_, one) = users(vec![user(7, "x")]);
    assert_eq!(block_on(one.single()).unwrap().id, 7);

    let (_, none) = users(Vec::new());
    let missing = block_on(none.single_or_default_where(field("Id").eq(3)));
    assert_eq!(missing.unwrap(), None);
}

#[test]
fn last_takes_the_final_item() {
    let (_, base) = users(vec![user(1, "a"), user(2, "b"), user(3, "c")]);

    assert_eq!(block_on(base.last()).unwrap().id, 3);
    assert_eq!(
        block_on(base.last_or_default_where(field("Name").ne("z")))
            .unwrap()
            .map(|u| u.id),
        Some(3)
    );
}

#[test]
fn element_at_reports_the_missing_index() {
    let (retriever, base) = users(vec![user(1, "a"), user(2, "b")]);

    assert_eq!(block_on(base.element_at(1)).unwrap().id, 2);
    let request = last_request(&retriever);
    assert_eq!((request.skip, request.top), (Some(1), Some(1)));

    let err = block_on(base.element_at(5)).unwrap_err();
    assert!(matches!(err, QueryError::IndexOutOfRange { index: 5 }));
    assert_eq!(block_on(base.element_at_or_default(5)).unwrap(), None);
}

#[test]
fn count_requests_inline_count() {
    let (retriever, base) = users(vec![user(1, "a"), user(2, "b"), user(3, "c")]);

    assert_eq!(block_on(base.count()).unwrap(), 3);
    let request = last_request(&retriever);
    assert_eq!(request.query_text, "Id:>0 .COUNTONLY");
    assert_eq!(request.inline_count, InlineCount::AllPages);

    assert_eq!(block_on(base.long_count()).unwrap(), 3);
    assert_eq!(block_on(base.count_where(field("Name").eq("a"))).unwrap(), 3);
    assert_eq!(last_request(&retriever).query_text, "Name:a .COUNTONLY");
}

#[test]
fn terminals_stay_inside_an_earlier_take() {
    let (_, base) = users(vec![user(1, "a"), user(2, "b"), user(3, "c")]);

    assert_eq!(block_on(base.take(0).first_or_default()).unwrap(), None);
    assert!(matches!(
        block_on(base.take(0).first()).unwrap_err(),
        QueryError::NoElements
    ));
    assert_eq!(block_on(base.take(1).single()).unwrap().id, 1);

    let err = block_on(base.take(2).element_at(2)).unwrap_err();
    assert!(matches!(err, QueryError::IndexOutOfRange { index: 2 }));
    assert_eq!(err.class().to_string(), "not_found");
    assert_eq!(block_on(base.take(2).element_at_or_default(2)).unwrap(), None);
    assert_eq!(block_on(base.take(2).element_at(1)).unwrap().id, 2);
}

#[test]
fn counts_respect_the_chain_paging() {
    let (_, base) = users(vec![user(1, "a"), user(2, "b"), user(3, "c")]);

    assert_eq!(block_on(base.take(1).count()).unwrap(), 1);
    assert_eq!(block_on(base.skip(1).count()).unwrap(), 2);
    assert_eq!(block_on(base.skip(2).take(5).long_count()).unwrap(), 1);
    assert_eq!(block_on(base.skip(5).count()).unwrap(), 0);

    assert!(!block_on(base.skip(5).any()).unwrap());
    assert!(!block_on(base.take(0).any()).unwrap());
    assert!(block_on(base.skip(2).any()).unwrap());
}

#[test]
fn any_checks_for_existence() {
    let (retriever, empty) = users(Vec::new());
    assert!(!block_on(empty.any()).unwrap());
    assert_eq!(last_request(&retriever).query_text, "Id:>0 .COUNTONLY .TOP:1");

    let (_, some) = users(vec![user(1, "a")]);
    assert!(block_on(some.any_where(field("Name").eq("a"))).unwrap());
}

#[test]
fn every_terminal_issues_exactly_one_retrieval() {
    let (retriever, base) = users(vec![user(1, "a")]);

    block_on(base.first()).unwrap();
    block_on(base.count()).unwrap();
    block_on(base.any()).unwrap();
    block_on(base.to_vec()).unwrap();

    assert_eq!(retriever.requests().len(), 4);
}

#[test]
fn compile_errors_skip_the_retrieval() {
    let (retriever, base) = users(vec![user(1, "a")]);
    let set = base.filter(field("Name").eq(field("Other")));

    let err = block_on(set.first()).unwrap_err();
    assert!(err.is_compile_error());
    assert!(retriever.requests().is_empty());
}

#[test]
fn undecodable_items_surface_as_decode_errors() {
    let (_, base) = users(vec![json!({ "Id": "not a number" })]);

    let err = block_on(base.to_vec()).unwrap_err();
    assert!(matches!(err, QueryError::Decode(_)));
    assert_eq!(err.class(), ErrorClass::Decode);
}

#[test]
fn transport_errors_are_carried_unchanged() {
    let set = ContentSet::<User>::new(Arc::new(FailingRetriever));

    let err = block_on(set.count()).unwrap_err();
    assert!(matches!(
        err,
        QueryError::Retrieve(RetrieveError::Rejected { status: 503, .. })
    ));
    assert_eq!(err.class(), ErrorClass::Transport);
}
