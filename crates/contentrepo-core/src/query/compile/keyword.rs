//! Keyword functions: calls with no operator form that still translate into a
//! single predicate.

use crate::{
    error::QueryError,
    expr::Expr,
    query::{Occurrence, Predicate, compile::field_name},
    value::Value,
};

/// Translate a keyword call into its predicate.
pub(super) fn keyword_predicate(
    method: &str,
    receiver: Option<&Expr>,
    args: &[Expr],
    at: &Expr,
) -> Result<Predicate, QueryError> {
    let predicate = match (method, receiver, args) {
        ("StartsWith", Some(target), [arg]) => {
            Predicate::wildcard(field_of(target, at)?, format!("{}*", pattern(arg)?))
        }
        ("EndsWith", Some(target), [arg]) => {
            Predicate::wildcard(field_of(target, at)?, format!("*{}", pattern(arg)?))
        }
        ("Contains", Some(Expr::Constant(Value::List(items))), [arg]) => {
            any_of(field_of(arg, at)?, items)?
        }
        ("Contains", Some(target), [arg]) => {
            Predicate::wildcard(field_of(target, at)?, format!("*{}*", pattern(arg)?))
        }
        ("Equals", Some(target), [Expr::Constant(value)]) => {
            if matches!(value, Value::List(_)) {
                return Err(QueryError::unsupported(at));
            }
            Predicate::field_match(field_of(target, at)?, value.to_comparable()?)
        }
        ("InTree" | "InFolder", Some(Expr::Param), [arg]) => {
            Predicate::field_match(method, path_term(arg)?)
        }
        ("TypeIs" | "Type", Some(Expr::Param), [Expr::Constant(value)]) => {
            let name = type_term(value).ok_or_else(|| QueryError::unsupported(at))?;
            Predicate::field_match(method, name)
        }
        _ => return Err(QueryError::unsupported(at)),
    };

    Ok(predicate)
}

/// Lower-cased type name of a type or text value.
pub(super) fn type_term(value: &Value) -> Option<String> {
    match value {
        Value::Type(name) | Value::Text(name) => Some(name.to_lowercase()),
        _ => None,
    }
}

fn field_of(expr: &Expr, at: &Expr) -> Result<String, QueryError> {
    field_name(expr).ok_or_else(|| QueryError::unsupported(at))
}

// Wildcard patterns are passed through verbatim.
fn pattern(arg: &Expr) -> Result<String, QueryError> {
    match arg {
        Expr::Constant(Value::Text(text)) => Ok(text.clone()),
        other => Err(QueryError::unsupported(other)),
    }
}

fn path_term(arg: &Expr) -> Result<String, QueryError> {
    match arg {
        Expr::Constant(Value::Text(path)) => Ok(path.to_lowercase()),
        Expr::Constant(Value::Content(reference)) => reference.path_term(),
        other => Err(QueryError::unsupported(other)),
    }
}

fn any_of(field: String, items: &[Value]) -> Result<Predicate, QueryError> {
    if items.is_empty() {
        return Ok(Predicate::match_none());
    }

    let clauses = items
        .iter()
        .map(|item| {
            item.to_comparable()
                .map(|value| (Predicate::field_match(field.clone(), value), Occurrence::Should))
        })
        .collect::<Result<_, _>>()?;

    Ok(Predicate::Logical { clauses })
}
