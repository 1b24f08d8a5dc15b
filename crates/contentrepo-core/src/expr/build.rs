use crate::{
    expr::{BinaryOp, Expr, MemberKind},
    value::{ContentRef, Value},
};
use std::ops::{BitAnd, BitOr, Not};
use time::PrimitiveDateTime;

///
/// IntoExpr
///
/// Operand conversion for the expression builders.
/// Plain values become constants; expressions pass through.
///

pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

macro_rules! impl_into_expr_for_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoExpr for $ty {
                fn into_expr(self) -> Expr {
                    Expr::Constant(Value::from(self))
                }
            }
        )*
    };
}

impl_into_expr_for_value!(
    Value,
    bool,
    i32,
    i64,
    u32,
    f64,
    &str,
    String,
    PrimitiveDateTime,
    ContentRef,
);

// ----------------------------------------------------------------------
// Leaves
// ----------------------------------------------------------------------

/// The per-item lambda parameter.
#[must_use]
pub const fn param() -> Expr {
    Expr::Param
}

/// Root of a query chain over items of `type_name`.
#[must_use]
pub fn source(type_name: impl Into<String>) -> Expr {
    Expr::Source {
        type_name: type_name.into(),
    }
}

#[must_use]
pub fn constant(value: impl Into<Value>) -> Expr {
    Expr::Constant(value.into())
}

/// A host value captured by name, evaluated by the caller.
#[must_use]
pub fn captured(name: impl Into<String>, value: impl Into<Value>) -> Expr {
    Expr::Captured {
        name: name.into(),
        value: value.into(),
    }
}

/// Scalar field of the current item, `x.Name`.
#[must_use]
pub fn field(name: impl Into<String>) -> Expr {
    param().member(name)
}

/// Reference field of the current item, `x.Manager`.
#[must_use]
pub fn reference(name: impl Into<String>) -> Expr {
    param().reference(name)
}

#[must_use]
pub fn lambda(body: impl IntoExpr) -> Expr {
    Expr::Lambda(Box::new(body.into_expr()))
}

/// `test ? then : otherwise`.
#[must_use]
pub fn if_then_else(test: impl IntoExpr, then: impl IntoExpr, otherwise: impl IntoExpr) -> Expr {
    Expr::Conditional {
        test: Box::new(test.into_expr()),
        then: Box::new(then.into_expr()),
        otherwise: Box::new(otherwise.into_expr()),
    }
}

// ----------------------------------------------------------------------
// Keyword functions
// ----------------------------------------------------------------------

/// Item lives anywhere below `path` (inclusive).
#[must_use]
pub fn in_tree(path: impl IntoExpr) -> Expr {
    param().call("InTree", [path.into_expr()])
}

/// Item is a direct child of `path`.
#[must_use]
pub fn in_folder(path: impl IntoExpr) -> Expr {
    param().call("InFolder", [path.into_expr()])
}

/// Item is of `type_name` or any of its subtypes.
#[must_use]
pub fn type_is(type_name: &str) -> Expr {
    param().call("TypeIs", [constant(Value::type_name(type_name))])
}

/// Item is exactly of `type_name`.
#[must_use]
pub fn is_type(type_name: &str) -> Expr {
    param().call("Type", [constant(Value::type_name(type_name))])
}

/// Projection factory body for `Select`: one argument per requested field.
#[must_use]
pub fn project<I>(fields: I) -> Expr
where
    I: IntoIterator<Item = Expr>,
{
    Expr::Call {
        method: "Project".to_string(),
        receiver: None,
        args: fields.into_iter().collect(),
    }
}

// ----------------------------------------------------------------------
// Fluent builders
// ----------------------------------------------------------------------

impl Expr {
    #[must_use]
    pub fn member(self, name: impl Into<String>) -> Self {
        Self::Member {
            target: Box::new(self),
            name: name.into(),
            kind: MemberKind::Scalar,
        }
    }

    #[must_use]
    pub fn reference(self, name: impl Into<String>) -> Self {
        Self::Member {
            target: Box::new(self),
            name: name.into(),
            kind: MemberKind::Reference,
        }
    }

    #[must_use]
    pub fn index(self, key: impl Into<String>) -> Self {
        Self::Index {
            target: Box::new(self),
            key: key.into(),
        }
    }

    #[must_use]
    pub fn call<const N: usize>(self, method: &str, args: [Self; N]) -> Self {
        Self::Call {
            method: method.to_string(),
            receiver: Some(Box::new(self)),
            args: args.into(),
        }
    }

    fn binary(self, op: BinaryOp, rhs: impl IntoExpr) -> Self {
        Self::Binary {
            op,
            left: Box::new(self),
            right: Box::new(rhs.into_expr()),
        }
    }

    #[must_use]
    pub fn eq(self, rhs: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Eq, rhs)
    }

    #[must_use]
    pub fn ne(self, rhs: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Ne, rhs)
    }

    #[must_use]
    pub fn gt(self, rhs: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Gt, rhs)
    }

    #[must_use]
    pub fn ge(self, rhs: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Ge, rhs)
    }

    #[must_use]
    pub fn lt(self, rhs: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Lt, rhs)
    }

    #[must_use]
    pub fn le(self, rhs: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Le, rhs)
    }

    #[must_use]
    pub fn and(self, rhs: impl IntoExpr) -> Self {
        self.binary(BinaryOp::And, rhs)
    }

    #[must_use]
    pub fn or(self, rhs: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Or, rhs)
    }

    #[must_use]
    pub fn starts_with(self, prefix: impl IntoExpr) -> Self {
        self.call("StartsWith", [prefix.into_expr()])
    }

    #[must_use]
    pub fn ends_with(self, suffix: impl IntoExpr) -> Self {
        self.call("EndsWith", [suffix.into_expr()])
    }

    /// Substring match on a text field, or membership when the receiver is a
    /// constant list.
    #[must_use]
    pub fn contains(self, item: impl IntoExpr) -> Self {
        self.call("Contains", [item.into_expr()])
    }

    #[must_use]
    pub fn equals(self, value: impl IntoExpr) -> Self {
        self.call("Equals", [value.into_expr()])
    }

    /// Plain conversion.
    #[must_use]
    pub fn convert(self) -> Self {
        Self::Convert {
            operand: Box::new(self),
            nullable: false,
        }
    }

    /// Conversion into a nullable wrapper around a value type.
    #[must_use]
    pub fn nullable(self) -> Self {
        Self::Convert {
            operand: Box::new(self),
            nullable: true,
        }
    }
}

impl Not for Expr {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}

impl BitAnd for Expr {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitOr for Expr {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}
