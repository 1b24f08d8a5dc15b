//! Expression chain → compiled query.
//!
//! The builder walks the normalized chain from its source outward. Filter
//! bodies are walked with an explicit LIFO predicate stack; chain operators
//! write execution directives directly.

mod keyword;
pub(crate) mod operator;


use crate::{
    error::QueryError,
    expr::{BinaryOp, Expr, MemberKind, normalize::normalize},
    logging::repo_log,
    query::{
        CompiledQuery, ElementSelection, Occurrence, Predicate, QueryOptions,
        optimize::optimize,
        projection::compile_projection,
    },
    value::Value,
};
use keyword::{keyword_predicate, type_term};
use operator::{QueryOperator, Terminal, is_disallowed};

/// Compile an expression chain into a query descriptor.
///
/// The input is never modified; every call starts from a fresh builder.
pub fn compile(expr: &Expr, options: &QueryOptions) -> Result<CompiledQuery, QueryError> {
    let normalized = normalize(expr);

    let mut builder = Builder::default();
    builder.visit(&normalized)?;
    let mut compiled = builder.finish(&normalized)?;
    compiled.apply_options(options);

    repo_log!(
        log::Level::Debug,
        "query_compiled",
        "fingerprint={} text={}",
        compiled.fingerprint(),
        compiled
    );

    Ok(compiled)
}

///
/// StackEntry
///
/// A finished predicate, or a bare boolean field whose lowering is deferred
/// so a wrapping negation can flip it in place.
///

#[derive(Debug)]
enum StackEntry {
    Predicate(Predicate),
    Marker { field: String, value: bool },
}

impl StackEntry {
    fn into_predicate(self) -> Predicate {
        match self {
            Self::Predicate(predicate) => predicate,
            Self::Marker { field, value } => Predicate::field_match(field, value),
        }
    }
}

///
/// Builder
///

#[derive(Debug, Default)]
struct Builder {
    stack: Vec<StackEntry>,
    query: CompiledQuery,
    terminal: Option<Terminal>,
}

impl Builder {
    // ------------------------------------------------------------------
    // Chain
    // ------------------------------------------------------------------

    fn visit(&mut self, expr: &Expr) -> Result<(), QueryError> {
        match expr {
            Expr::Source { .. } => Ok(()),
            Expr::Call {
                method,
                receiver: Some(receiver),
                args,
            } => {
                if is_disallowed(method) {
                    return Err(QueryError::disallowed(method.as_str()));
                }
                match QueryOperator::parse(method) {
                    Some(op) => {
                        self.visit(receiver)?;
                        self.apply_operator(op, args, expr)
                    }
                    None => self.visit_predicate(expr),
                }
            }
            _ => self.visit_predicate(expr),
        }
    }

    fn apply_operator(
        &mut self,
        op: QueryOperator,
        args: &[Expr],
        at: &Expr,
    ) -> Result<(), QueryError> {
        // Nothing may follow a reduction.
        if self.terminal.is_some() {
            return Err(QueryError::unsupported(at));
        }

        match op {
            QueryOperator::Where => {
                let [body] = args else {
                    return Err(QueryError::unsupported(at));
                };
                self.visit_predicate(body)?;
                self.merge_filter(at)
            }
            QueryOperator::OfType => {
                let [Expr::Constant(value)] = args else {
                    return Err(QueryError::unsupported(at));
                };
                let name = type_term(value).ok_or_else(|| QueryError::unsupported(at))?;
                self.push(Predicate::field_match("TypeIs", name));
                self.merge_filter(at)
            }
            QueryOperator::OrderBy { descending } => {
                let key = sort_key(args, at)?;
                self.query.sort = vec![(key, descending)];
                Ok(())
            }
            QueryOperator::ThenBy { descending } => {
                let key = sort_key(args, at)?;
                self.query.sort.push((key, descending));
                Ok(())
            }
            QueryOperator::Take => {
                self.query.top = Some(count_arg(args, at)?);
                Ok(())
            }
            QueryOperator::Skip => {
                self.query.skip = Some(count_arg(args, at)?);
                Ok(())
            }
            QueryOperator::Select => {
                let [arg] = args else {
                    return Err(QueryError::unsupported(at));
                };
                let projection = compile_projection(lambda_body(arg))?;
                self.query.select_fields = projection.select;
                self.query.expand_fields = projection.expand;
                Ok(())
            }
            QueryOperator::Terminal(terminal) => self.apply_terminal(terminal, args, at),
        }
    }

    fn apply_terminal(
        &mut self,
        terminal: Terminal,
        args: &[Expr],
        at: &Expr,
    ) -> Result<(), QueryError> {
        let index = match (terminal, args) {
            (Terminal::ElementAt { .. }, _) => Some(count_arg(args, at)?),
            (_, []) => None,
            (_, [predicate]) if terminal.accepts_predicate() => {
                self.visit_predicate(predicate)?;
                self.merge_filter(at)?;
                None
            }
            _ => return Err(QueryError::unsupported(at)),
        };

        self.lower_markers();
        self.terminal = Some(terminal);

        let query = &mut self.query;
        match terminal {
            Terminal::Count => query.count_only = true,
            Terminal::Any => {
                query.count_only = true;
                query.existence_only = true;
                query.top = Some(narrowed_top(query.top, 1));
            }
            Terminal::First { or_default } => {
                query.element_selection = ElementSelection::First;
                query.top = Some(narrowed_top(query.top, 1));
                query.throw_if_empty = !or_default;
            }
            Terminal::Single { or_default } => {
                // Two rows are enough to detect a second match.
                query.element_selection = ElementSelection::Single;
                query.top = Some(narrowed_top(query.top, 2));
                query.throw_if_empty = !or_default;
            }
            Terminal::Last { or_default } => {
                query.element_selection = ElementSelection::Last;
                query.throw_if_empty = !or_default;
            }
            Terminal::ElementAt { or_default } => {
                let index = index.unwrap_or_default();
                query.element_selection = ElementSelection::ElementAt;
                query.element_index = Some(index);
                query.skip = Some(query.skip.unwrap_or_default().saturating_add(index));
                // An index past an earlier `Take` addresses nothing.
                query.top = Some(match query.top {
                    Some(top) if index >= top => 0,
                    _ => 1,
                });
                query.throw_if_empty = !or_default;
            }
        }

        Ok(())
    }

    fn finish(mut self, at: &Expr) -> Result<CompiledQuery, QueryError> {
        self.lower_markers();

        let predicate = match self.stack.len() {
            0 => None,
            1 => Some(self.pop(at)?),
            _ => return Err(QueryError::unsupported(at)),
        };
        self.query.predicate = predicate.map(optimize);

        Ok(self.query)
    }

    // ------------------------------------------------------------------
    // Predicates
    // ------------------------------------------------------------------

    fn visit_predicate(&mut self, expr: &Expr) -> Result<(), QueryError> {
        match expr {
            Expr::Lambda(body) => self.visit_predicate(body),
            Expr::Binary {
                op: op @ (BinaryOp::And | BinaryOp::Or),
                left,
                right,
            } => {
                self.visit_predicate(left)?;
                self.visit_predicate(right)?;
                let occurrence = if *op == BinaryOp::And {
                    Occurrence::Must
                } else {
                    Occurrence::Should
                };
                self.combine(occurrence, expr)
            }
            Expr::Binary { op, left, right } => self.visit_comparison(*op, left, right, expr),
            Expr::Not(inner) => {
                self.visit_predicate(inner)?;
                self.negate(expr)
            }
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => {
                let test = test.as_ref().clone();
                let rewritten = test
                    .clone()
                    .and(then.as_ref().clone())
                    .or((!test).and(otherwise.as_ref().clone()));
                self.visit_predicate(&rewritten)
            }
            Expr::Constant(Value::Bool(value)) => {
                self.push(if *value {
                    Predicate::match_all()
                } else {
                    Predicate::match_none()
                });
                Ok(())
            }
            Expr::Call {
                method,
                receiver,
                args,
            } => {
                if is_disallowed(method) {
                    return Err(QueryError::disallowed(method.as_str()));
                }
                let predicate = keyword_predicate(method, receiver.as_deref(), args, expr)?;
                self.push(predicate);
                Ok(())
            }
            other => {
                let field = field_name(other).ok_or_else(|| QueryError::unsupported(other))?;
                self.stack.push(StackEntry::Marker { field, value: true });
                Ok(())
            }
        }
    }

    fn visit_comparison(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        at: &Expr,
    ) -> Result<(), QueryError> {
        let (left, right) = (strip_convert(left), strip_convert(right));

        // A constant on the left flips the operator.
        let (field, op, value) =
            if let (Some(field), Expr::Constant(value)) = (field_name(left), right) {
                (field, op, value)
            } else if let (Expr::Constant(value), Some(field)) = (left, field_name(right)) {
                (field, op.flipped(), value)
            } else {
                return Err(QueryError::unsupported(at));
            };
        let value = value.to_comparable()?;

        let predicate =
            comparison_predicate(field, op, value).ok_or_else(|| QueryError::unsupported(at))?;
        self.push(predicate);

        Ok(())
    }

    // ------------------------------------------------------------------
    // Stack
    // ------------------------------------------------------------------

    fn push(&mut self, predicate: Predicate) {
        self.stack.push(StackEntry::Predicate(predicate));
    }

    fn pop(&mut self, at: &Expr) -> Result<Predicate, QueryError> {
        self.stack
            .pop()
            .map(StackEntry::into_predicate)
            .ok_or_else(|| QueryError::unsupported(at))
    }

    fn combine(&mut self, occurrence: Occurrence, at: &Expr) -> Result<(), QueryError> {
        let right = self.pop(at)?;
        let left = self.pop(at)?;

        self.push(match occurrence {
            Occurrence::Should => Predicate::should(left, right),
            Occurrence::Must | Occurrence::MustNot => Predicate::must(left, right),
        });

        Ok(())
    }

    // A new filter joins what the chain already holds; the earlier filter stays first.
    fn merge_filter(&mut self, at: &Expr) -> Result<(), QueryError> {
        if self.stack.len() > 1 {
            self.combine(Occurrence::Must, at)?;
        }

        Ok(())
    }

    fn negate(&mut self, at: &Expr) -> Result<(), QueryError> {
        match self.stack.last_mut() {
            Some(StackEntry::Marker { value, .. }) => {
                *value = !*value;
                Ok(())
            }
            Some(StackEntry::Predicate(_)) => {
                let inner = self.pop(at)?;
                self.push(Predicate::negate(inner));
                Ok(())
            }
            None => Err(QueryError::unsupported(at)),
        }
    }

    // Idempotent: lowered entries are plain predicates.
    fn lower_markers(&mut self) {
        self.stack = std::mem::take(&mut self.stack)
            .into_iter()
            .map(|entry| StackEntry::Predicate(entry.into_predicate()))
            .collect();
    }
}

// ----------------------------------------------------------------------
// Shapes
// ----------------------------------------------------------------------

/// Field name of a member or indexer access rooted at the parameter.
///
/// One level of aliasing is resolved: `ContentType.Name` reads `Type`, and
/// `<Reference>.Id` reads the reference field itself.
pub(crate) fn field_name(expr: &Expr) -> Option<String> {
    match strip_convert(expr) {
        Expr::Member { target, name, .. } => match target.as_ref() {
            Expr::Param => Some(name.clone()),
            Expr::Member {
                target: inner,
                name: parent,
                kind,
            } if inner.is_param() => match (parent.as_str(), kind, name.as_str()) {
                ("ContentType", _, "Name") => Some("Type".to_string()),
                (_, MemberKind::Reference, "Id") => Some(parent.clone()),
                _ => None,
            },
            _ => None,
        },
        Expr::Index { target, key } if target.is_param() => Some(key.clone()),
        _ => None,
    }
}

fn strip_convert(mut expr: &Expr) -> &Expr {
    while let Expr::Convert { operand, .. } = expr {
        expr = operand.as_ref();
    }

    expr
}

fn lambda_body(expr: &Expr) -> &Expr {
    match expr {
        Expr::Lambda(body) => body.as_ref(),
        other => other,
    }
}

fn sort_key(args: &[Expr], at: &Expr) -> Result<String, QueryError> {
    let [arg] = args else {
        return Err(QueryError::unsupported(at));
    };
    let body = lambda_body(arg);

    field_name(body).ok_or_else(|| QueryError::unsupported(body))
}

fn count_arg(args: &[Expr], at: &Expr) -> Result<u32, QueryError> {
    let [Expr::Constant(Value::Int(count))] = args else {
        return Err(QueryError::unsupported(at));
    };

    u32::try_from(*count).map_err(|_| QueryError::unsupported(at))
}

// A terminal's row limit never widens an earlier `Take`.
fn narrowed_top(existing: Option<u32>, limit: u32) -> u32 {
    existing.map_or(limit, |top| top.min(limit))
}

fn comparison_predicate(field: String, op: BinaryOp, value: Value) -> Option<Predicate> {
    if matches!(value, Value::List(_)) {
        return None;
    }

    match op {
        BinaryOp::Eq => Some(Predicate::field_match(field, value)),
        BinaryOp::Ne => Some(Predicate::negate(Predicate::field_match(field, value))),
        _ if value.is_null() => None,
        BinaryOp::Gt => Some(Predicate::above(field, value, true)),
        BinaryOp::Ge => Some(Predicate::above(field, value, false)),
        BinaryOp::Lt => Some(Predicate::below(field, value, true)),
        BinaryOp::Le => Some(Predicate::below(field, value, false)),
        BinaryOp::And | BinaryOp::Or => None,
    }
}
