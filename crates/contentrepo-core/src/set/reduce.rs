use crate::{
    error::QueryError,
    query::{CompiledQuery, ElementSelection},
};
use serde_json::Value as JsonValue;

/// Extract the single item a selection terminal asked for.
///
/// Empty results raise when the terminal is not an "or default" variant.
pub(crate) fn reduce_selection(
    query: &CompiledQuery,
    mut items: Vec<JsonValue>,
) -> Result<Option<JsonValue>, QueryError> {
    let selected = match query.element_selection {
        ElementSelection::Single => {
            if items.len() > 1 {
                return Err(QueryError::MoreThanOneElement);
            }
            items.pop()
        }
        ElementSelection::Last => items.pop(),
        ElementSelection::First | ElementSelection::ElementAt | ElementSelection::None => {
            items.into_iter().next()
        }
    };

    match (selected, query.throw_if_empty) {
        (Some(item), _) => Ok(Some(item)),
        (None, false) => Ok(None),
        (None, true) => Err(match query.element_index {
            Some(index) => QueryError::IndexOutOfRange { index },
            None => QueryError::NoElements,
        }),
    }
}

/// Count reported by a count-only retrieval.
///
/// The server total spans every page; the chain's own `Skip` and `Take`
/// still apply to it.
pub(crate) fn reduce_count(query: &CompiledQuery, total_count: u64, items: &[JsonValue]) -> u64 {
    let total = total_count.max(items.len() as u64);
    let paged = total.saturating_sub(u64::from(query.skip.unwrap_or_default()));

    query.top.map_or(paged, |top| paged.min(u64::from(top)))
}
