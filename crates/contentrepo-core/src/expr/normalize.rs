//! Executability classification and constant folding.
//!
//! A node is executable when it can be evaluated without the per-item
//! parameter. Maximal executable subtrees are folded into constants so the
//! predicate builder only ever sees parameter-dependent shapes and literals.

use crate::{
    expr::{BinaryOp, Expr},
    value::Value,
};
use std::cmp::Ordering;

///
/// NodeFlag
///
/// Classification of one node in pre-order position.
/// `span` counts the node and all of its descendants.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct NodeFlag {
    pub executable: bool,
    pub span: usize,
}

///
/// ExecutableMap
///

#[derive(Debug)]
pub(crate) struct ExecutableMap {
    pub flags: Vec<NodeFlag>,
    pub has_parameter: bool,
}

/// Classify every node of `expr` in one walk.
pub(crate) fn classify(expr: &Expr) -> ExecutableMap {
    let mut map = ExecutableMap {
        flags: Vec::new(),
        has_parameter: false,
    };
    classify_node(expr, &mut map);

    map
}

fn classify_node(expr: &Expr, map: &mut ExecutableMap) -> bool {
    let slot = map.flags.len();
    map.flags.push(NodeFlag {
        executable: true,
        span: 1,
    });

    let mut executable = true;
    for child in expr.children() {
        // Every child must be classified, even after the answer is known.
        executable &= classify_node(child, map);
    }

    match expr {
        Expr::Param | Expr::Source { .. } => {
            map.has_parameter = true;
            executable = false;
        }
        Expr::Convert { nullable: true, .. } => executable = false,
        _ => {}
    }

    let span = map.flags.len() - slot;
    if let Some(flag) = map.flags.get_mut(slot) {
        *flag = NodeFlag { executable, span };
    }

    executable
}

/// Fold every maximal executable subtree into a constant.
///
/// Trees without a parameter are returned unchanged.
pub(crate) fn normalize(expr: &Expr) -> Expr {
    let map = classify(expr);
    if !map.has_parameter {
        return expr.clone();
    }

    let mut cursor = 0;
    rewrite(expr, &map, &mut cursor)
}

fn rewrite(expr: &Expr, map: &ExecutableMap, cursor: &mut usize) -> Expr {
    let Some(flag) = map.flags.get(*cursor).copied() else {
        return expr.clone();
    };

    if flag.executable {
        *cursor += flag.span;
        return evaluate(expr).map_or_else(|| expr.clone(), Expr::Constant);
    }

    *cursor += 1;
    let children: Vec<Expr> = expr
        .children()
        .into_iter()
        .map(|child| rewrite(child, map, cursor))
        .collect();

    expr.with_children(children.into_iter())
}

/// Evaluate a parameter-free expression, or `None` when its shape has no
/// host-side meaning.
pub(crate) fn evaluate(expr: &Expr) -> Option<Value> {
    match expr {
        Expr::Constant(value) | Expr::Captured { value, .. } => Some(value.clone()),
        Expr::Binary {
            op: BinaryOp::And,
            left,
            right,
        } => Some(Value::Bool(evaluate_bool(left)? && evaluate_bool(right)?)),
        Expr::Binary {
            op: BinaryOp::Or,
            left,
            right,
        } => Some(Value::Bool(evaluate_bool(left)? || evaluate_bool(right)?)),
        Expr::Binary { op, left, right } => {
            compare(*op, &evaluate(left)?, &evaluate(right)?).map(Value::Bool)
        }
        Expr::Not(inner) => Some(Value::Bool(!evaluate_bool(inner)?)),
        Expr::Conditional {
            test,
            then,
            otherwise,
        } => {
            if evaluate_bool(test)? {
                evaluate(then)
            } else {
                evaluate(otherwise)
            }
        }
        Expr::Convert {
            operand,
            nullable: false,
        } => evaluate(operand),
        Expr::Member { target, name, .. } => match evaluate(target)? {
            Value::Content(reference) => match name.as_str() {
                "Id" => reference
                    .id
                    .and_then(|id| i64::try_from(id.0).ok())
                    .map(Value::Int),
                "Path" => reference.path.map(Value::Text),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

fn evaluate_bool(expr: &Expr) -> Option<bool> {
    evaluate(expr)?.as_bool()
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> Option<bool> {
    let ordering = left.partial_cmp_value(right);

    match op {
        BinaryOp::Eq => Some(ordering.map_or(left == right, Ordering::is_eq)),
        BinaryOp::Ne => Some(ordering.map_or(left != right, Ordering::is_ne)),
        BinaryOp::Gt => ordering.map(Ordering::is_gt),
        BinaryOp::Ge => ordering.map(Ordering::is_ge),
        BinaryOp::Lt => ordering.map(Ordering::is_lt),
        BinaryOp::Le => ordering.map(Ordering::is_le),
        BinaryOp::And | BinaryOp::Or => None,
    }
}
