//! Query operators recognized on a chain.

/// Collection operators with no predicate equivalent.
pub(crate) const DISALLOWED_OPERATORS: &[&str] = &[
    "Join",
    "GroupJoin",
    "SelectMany",
    "GroupBy",
    "Union",
    "Intersect",
    "Except",
    "Concat",
    "Zip",
    "Distinct",
    "Reverse",
    "Aggregate",
    "Sum",
    "Min",
    "Max",
    "Average",
    "SkipWhile",
    "TakeWhile",
    "All",
    "DefaultIfEmpty",
];

#[must_use]
pub(crate) fn is_disallowed(name: &str) -> bool {
    DISALLOWED_OPERATORS.contains(&name)
}

///
/// QueryOperator
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum QueryOperator {
    Where,
    OfType,
    OrderBy { descending: bool },
    ThenBy { descending: bool },
    Take,
    Skip,
    Select,
    Terminal(Terminal),
}

impl QueryOperator {
    pub(crate) fn parse(name: &str) -> Option<Self> {
        let op = match name {
            "Where" => Self::Where,
            "OfType" => Self::OfType,
            "OrderBy" => Self::OrderBy { descending: false },
            "OrderByDescending" => Self::OrderBy { descending: true },
            "ThenBy" => Self::ThenBy { descending: false },
            "ThenByDescending" => Self::ThenBy { descending: true },
            "Take" => Self::Take,
            "Skip" => Self::Skip,
            "Select" => Self::Select,
            other => Self::Terminal(Terminal::parse(other)?),
        };

        Some(op)
    }
}

///
/// Terminal
///
/// Reduction operators that end a chain.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Terminal {
    Count,
    Any,
    First { or_default: bool },
    Single { or_default: bool },
    Last { or_default: bool },
    ElementAt { or_default: bool },
}

impl Terminal {
    fn parse(name: &str) -> Option<Self> {
        let terminal = match name {
            "Count" | "LongCount" => Self::Count,
            "Any" => Self::Any,
            "First" => Self::First { or_default: false },
            "FirstOrDefault" => Self::First { or_default: true },
            "Single" => Self::Single { or_default: false },
            "SingleOrDefault" => Self::Single { or_default: true },
            "Last" => Self::Last { or_default: false },
            "LastOrDefault" => Self::Last { or_default: true },
            "ElementAt" => Self::ElementAt { or_default: false },
            "ElementAtOrDefault" => Self::ElementAt { or_default: true },
            _ => return None,
        };

        Some(terminal)
    }

    /// Operator name as it appears in a chain.
    #[must_use]
    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Count => "Count",
            Self::Any => "Any",
            Self::First { or_default: false } => "First",
            Self::First { or_default: true } => "FirstOrDefault",
            Self::Single { or_default: false } => "Single",
            Self::Single { or_default: true } => "SingleOrDefault",
            Self::Last { or_default: false } => "Last",
            Self::Last { or_default: true } => "LastOrDefault",
            Self::ElementAt { or_default: false } => "ElementAt",
            Self::ElementAt { or_default: true } => "ElementAtOrDefault",
        }
    }

    /// Terminals that may carry an inline predicate argument.
    #[must_use]
    pub(crate) const fn accepts_predicate(self) -> bool {
        !matches!(self, Self::ElementAt { .. })
    }
}
