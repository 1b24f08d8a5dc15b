//! Query text rendering.
//!
//! Output order is fixed: the predicate first, then the directives. Equal
//! compiled queries always render to byte-identical text.

use crate::{
    query::{CompiledQuery, ExecutionMode, FilterStatus, Occurrence, Predicate},
    value::Value,
};
use std::fmt;
use time::{format_description::BorrowedFormatItem, macros::format_description};

const DATETIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:4]");

const QUOTED_CHARS: &[char] = &['\'', '"', '(', ')', '[', ']', '{', '}', ':'];

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldMatch { field, value } => {
                write!(f, "{field}:")?;
                write_term(f, value)
            }
            Self::Wildcard { field, pattern } => write!(f, "{field}:{pattern}"),
            Self::Range {
                field,
                min,
                max,
                exclusive_min,
                exclusive_max,
            } => {
                write!(f, "{field}:")?;
                write_range(f, min.as_ref(), max.as_ref(), *exclusive_min, *exclusive_max)
            }
            Self::Logical { clauses } => {
                for (i, (clause, occurrence)) in clauses.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    match occurrence {
                        Occurrence::Must => f.write_str("+")?,
                        Occurrence::MustNot => f.write_str("-")?,
                        Occurrence::Should => {}
                    }
                    if matches!(clause, Self::Logical { .. }) {
                        write!(f, "({clause})")?;
                    } else {
                        write!(f, "{clause}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn write_range(
    f: &mut fmt::Formatter<'_>,
    min: Option<&Value>,
    max: Option<&Value>,
    exclusive_min: bool,
    exclusive_max: bool,
) -> fmt::Result {
    match (min, max) {
        (Some(min), None) => {
            f.write_str(if exclusive_min { ">" } else { ">=" })?;
            write_term(f, min)
        }
        (None, Some(max)) => {
            f.write_str(if exclusive_max { "<" } else { "<=" })?;
            write_term(f, max)
        }
        (Some(min), Some(max)) => {
            f.write_str(if exclusive_min { "{" } else { "[" })?;
            write_term(f, min)?;
            f.write_str(" TO ")?;
            write_term(f, max)?;
            f.write_str(if exclusive_max { "}" } else { "]" })
        }
        (None, None) => f.write_str("*"),
    }
}

fn write_term(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Bool(true) => f.write_str("yes"),
        Value::Bool(false) => f.write_str("no"),
        Value::Int(v) => write!(f, "{v}"),
        Value::Float(v) => write!(f, "{v}"),
        Value::Text(text) | Value::Type(text) => write_text(f, text),
        Value::DateTime(v) => {
            let text = v.format(DATETIME_FORMAT).map_err(|_| fmt::Error)?;
            write!(f, "'{text}'")
        }
        Value::Content(reference) => match (reference.id, &reference.path) {
            (Some(id), _) => write!(f, "{id}"),
            (None, Some(path)) => write_text(f, path),
            (None, None) => f.write_str("null"),
        },
        Value::List(items) => {
            f.write_str("(")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write_term(f, item)?;
            }
            f.write_str(")")
        }
    }
}

fn write_text(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    let needs_quotes =
        text.is_empty() || text.chars().any(|c| c.is_whitespace() || QUOTED_CHARS.contains(&c));
    if !needs_quotes {
        return f.write_str(text);
    }

    write!(f, "'{}'", text.replace('\'', "\\'"))
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.predicate {
            Some(predicate) => write!(f, "{predicate}")?,
            None => write!(f, "{}", Predicate::match_all())?,
        }

        if self.all_versions {
            f.write_str(" .ALLVERSIONS")?;
        }
        if self.count_only {
            f.write_str(" .COUNTONLY")?;
        }
        if let Some(top) = self.top {
            write!(f, " .TOP:{top}")?;
        }
        if let Some(skip) = self.skip {
            write!(f, " .SKIP:{skip}")?;
        }
        for (field, descending) in &self.sort {
            if *descending {
                write!(f, " .REVERSESORT:{field}")?;
            } else {
                write!(f, " .SORT:{field}")?;
            }
        }

        // Server defaults: autofilters on, lifespan off.
        if self.autofilter_mode == FilterStatus::Disabled {
            f.write_str(" .AUTOFILTERS:OFF")?;
        }
        if self.lifespan_filter_mode == FilterStatus::Enabled {
            f.write_str(" .LIFESPAN:ON")?;
        }
        if self.execution_mode == ExecutionMode::Quick {
            f.write_str(" .QUICK")?;
        }

        Ok(())
    }
}
