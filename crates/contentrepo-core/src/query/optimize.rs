use crate::query::{Occurrence, Predicate};

/// Post-pass over the finished predicate.
///
/// A root group holding a single negation gets a match-everything sibling,
/// so `-Field:x` becomes `-Field:x +Id:>0`. No other rewrite is applied.
pub(crate) fn optimize(predicate: Predicate) -> Predicate {
    if !predicate.is_lone_must_not() {
        return predicate;
    }

    match predicate {
        Predicate::Logical { mut clauses } => {
            clauses.push((Predicate::match_all(), Occurrence::Must));
            Predicate::Logical { clauses }
        }
        other => other,
    }
}
