//! Query expression AST.
//!
//! Callers describe queries as explicit trees: a chain of operator calls
//! rooted at a `Source`, with lambdas over the per-item `Param`. Host values
//! are captured pre-evaluated (`Captured`); the compiler never executes
//! caller code.

mod build;
pub(crate) mod normalize;


use crate::value::Value;
use std::fmt;

pub use build::{
    IntoExpr, captured, constant, field, if_then_else, in_folder, in_tree, is_type, lambda,
    param, project, reference, source, type_is,
};

///
/// BinaryOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    And,
    Or,
}

impl BinaryOp {
    /// Returns the operator that swaps the left/right side of the comparison.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Gt => Self::Lt,
            Self::Ge => Self::Le,
            Self::Lt => Self::Gt,
            Self::Le => Self::Ge,
            other => other,
        }
    }

    const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

///
/// MemberKind
///
/// Resolved type class of a member access.
/// `Reference` members point at another repository item.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum MemberKind {
    #[default]
    Scalar,
    Reference,
}

///
/// Expr
///

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Root of a query chain: the remote collection itself.
    Source { type_name: String },

    /// The per-item lambda parameter.
    Param,

    Constant(Value),

    /// Host value captured by the caller, already evaluated.
    Captured { name: String, value: Value },

    Member {
        target: Box<Self>,
        name: String,
        kind: MemberKind,
    },

    /// Indexer access, `x["Field"]`.
    Index { target: Box<Self>, key: String },

    Binary {
        op: BinaryOp,
        left: Box<Self>,
        right: Box<Self>,
    },

    Not(Box<Self>),

    Conditional {
        test: Box<Self>,
        then: Box<Self>,
        otherwise: Box<Self>,
    },

    /// Conversion; `nullable` when the target wraps a value type.
    Convert { operand: Box<Self>, nullable: bool },

    Call {
        method: String,
        receiver: Option<Box<Self>>,
        args: Vec<Self>,
    },

    Lambda(Box<Self>),
}

impl Expr {
    /// Direct children in evaluation order.
    ///
    /// Every tree walk in the compiler visits children in this order; the
    /// normalizer's pre-order flag table depends on it.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Source { .. } | Self::Param | Self::Constant(_) | Self::Captured { .. } => {
                Vec::new()
            }
            Self::Member { target, .. } | Self::Index { target, .. } => vec![target.as_ref()],
            Self::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Self::Not(inner) | Self::Lambda(inner) => vec![inner.as_ref()],
            Self::Conditional {
                test,
                then,
                otherwise,
            } => vec![test.as_ref(), then.as_ref(), otherwise.as_ref()],
            Self::Convert { operand, .. } => vec![operand.as_ref()],
            Self::Call { receiver, args, .. } => {
                let mut out: Vec<&Self> = Vec::with_capacity(args.len() + 1);
                if let Some(receiver) = receiver {
                    out.push(receiver.as_ref());
                }
                out.extend(args.iter());
                out
            }
        }
    }

    /// Rebuild this node with its children replaced, in `children()` order.
    pub(crate) fn with_children(&self, mut children: impl Iterator<Item = Self>) -> Self {
        let mut next = || Box::new(children.next().unwrap_or(Self::Param));

        match self {
            Self::Source { .. } | Self::Param | Self::Constant(_) | Self::Captured { .. } => {
                self.clone()
            }
            Self::Member { name, kind, .. } => Self::Member {
                target: next(),
                name: name.clone(),
                kind: *kind,
            },
            Self::Index { key, .. } => Self::Index {
                target: next(),
                key: key.clone(),
            },
            Self::Binary { op, .. } => Self::Binary {
                op: *op,
                left: next(),
                right: next(),
            },
            Self::Not(_) => Self::Not(next()),
            Self::Lambda(_) => Self::Lambda(next()),
            Self::Conditional { .. } => Self::Conditional {
                test: next(),
                then: next(),
                otherwise: next(),
            },
            Self::Convert { nullable, .. } => Self::Convert {
                operand: next(),
                nullable: *nullable,
            },
            Self::Call {
                method,
                receiver,
                args,
            } => {
                let receiver = receiver.as_ref().map(|_| next());
                let args = args.iter().map(|_| *next()).collect();
                Self::Call {
                    method: method.clone(),
                    receiver,
                    args,
                }
            }
        }
    }

    /// True when this expression is the per-item parameter.
    #[must_use]
    pub const fn is_param(&self) -> bool {
        matches!(self, Self::Param)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source { type_name } => write!(f, "source<{type_name}>"),
            Self::Param => f.write_str("x"),
            Self::Constant(value) => write!(f, "{value}"),
            Self::Captured { name, .. } => f.write_str(name),
            Self::Member { target, name, .. } => write!(f, "{target}.{name}"),
            Self::Index { target, key } => write!(f, "{target}[\"{key}\"]"),
            Self::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::Not(inner) => write!(f, "!{inner}"),
            Self::Conditional {
                test,
                then,
                otherwise,
            } => write!(f, "({test} ? {then} : {otherwise})"),
            Self::Convert { operand, nullable } => {
                if *nullable {
                    write!(f, "Nullable({operand})")
                } else {
                    write!(f, "Convert({operand})")
                }
            }
            Self::Call {
                method,
                receiver,
                args,
            } => {
                if let Some(receiver) = receiver {
                    write!(f, "{receiver}.")?;
                }
                write!(f, "{method}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Self::Lambda(body) => write!(f, "x => {body}"),
        }
    }
}
