use crate::{MATCH_ALL_FIELD, value::Value};

///
/// Predicate AST
///
/// Remote-search predicate tree produced by the builder.
/// Values are already in comparable form: text is case-folded and references
/// are collapsed to their identity.
///

///
/// Occurrence
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Occurrence {
    Must,
    Should,
    MustNot,
}

///
/// Predicate
///

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    FieldMatch {
        field: String,
        value: Value,
    },
    Range {
        field: String,
        min: Option<Value>,
        max: Option<Value>,
        exclusive_min: bool,
        exclusive_max: bool,
    },
    Wildcard {
        field: String,
        pattern: String,
    },
    Logical {
        clauses: Vec<(Self, Occurrence)>,
    },
}

impl Predicate {
    #[must_use]
    pub fn field_match(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::FieldMatch {
            field: field.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn wildcard(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Wildcard {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    /// Lower bound only.
    #[must_use]
    pub fn above(field: impl Into<String>, min: impl Into<Value>, exclusive: bool) -> Self {
        Self::Range {
            field: field.into(),
            min: Some(min.into()),
            max: None,
            exclusive_min: exclusive,
            exclusive_max: false,
        }
    }

    /// Upper bound only.
    #[must_use]
    pub fn below(field: impl Into<String>, max: impl Into<Value>, exclusive: bool) -> Self {
        Self::Range {
            field: field.into(),
            min: None,
            max: Some(max.into()),
            exclusive_min: false,
            exclusive_max: exclusive,
        }
    }

    /// Matches every item: `Id:>0`.
    #[must_use]
    pub fn match_all() -> Self {
        Self::above(MATCH_ALL_FIELD, 0, true)
    }

    /// Matches no item.
    #[must_use]
    pub fn match_none() -> Self {
        Self::negate(Self::match_all())
    }

    #[must_use]
    pub fn negate(inner: Self) -> Self {
        Self::Logical {
            clauses: vec![(inner, Occurrence::MustNot)],
        }
    }

    /// Combine two operands under `Must`.
    ///
    /// A lone negation contributes its clause directly, so `a && !b` stays
    /// one flat group.
    #[must_use]
    pub fn must(left: Self, right: Self) -> Self {
        let clauses = [left, right]
            .into_iter()
            .map(|operand| match operand.into_lone_must_not() {
                Ok(inner) => (inner, Occurrence::MustNot),
                Err(operand) => (operand, Occurrence::Must),
            })
            .collect();

        Self::Logical { clauses }
    }

    /// Combine two operands under `Should`.
    #[must_use]
    pub fn should(left: Self, right: Self) -> Self {
        Self::Logical {
            clauses: vec![(left, Occurrence::Should), (right, Occurrence::Should)],
        }
    }

    /// True when this is a logical node holding exactly one `MustNot` clause.
    #[must_use]
    pub fn is_lone_must_not(&self) -> bool {
        matches!(
            self,
            Self::Logical { clauses }
                if matches!(clauses.as_slice(), [(_, Occurrence::MustNot)])
        )
    }

    fn into_lone_must_not(self) -> Result<Self, Self> {
        if !self.is_lone_must_not() {
            return Err(self);
        }
        match self {
            Self::Logical { mut clauses } => match clauses.pop() {
                Some((inner, _)) => Ok(inner),
                None => Err(Self::Logical { clauses }),
            },
            other => Err(other),
        }
    }
}
