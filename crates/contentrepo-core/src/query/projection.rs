use crate::{
    error::QueryError,
    expr::{Expr, MemberKind},
};

///
/// Projection
///
/// Field lists derived from a `Select` body.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Projection {
    pub select: Vec<String>,
    pub expand: Vec<String>,
}

/// Compile a projection body into select/expand lists.
///
/// The body must be a `Project(...)` call whose arguments are member chains
/// rooted at the parameter, each optionally wrapped in one conversion.
pub(crate) fn compile_projection(body: &Expr) -> Result<Projection, QueryError> {
    let Expr::Call {
        method,
        receiver: None,
        args,
    } = body
    else {
        return Err(QueryError::unsupported(body));
    };
    if method != "Project" {
        return Err(QueryError::unsupported(body));
    }

    let mut projection = Projection::default();
    for (position, arg) in args.iter().enumerate() {
        let segments = member_chain(arg).ok_or_else(|| QueryError::UnsupportedExpression {
            expr: format!("{} argument of projection: {arg}", ordinal(position)),
        })?;

        let mut path = String::new();
        for (name, kind) in segments {
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(&name.replace('.', "/"));

            if kind == MemberKind::Reference {
                push_unique(&mut projection.expand, &path);
            }
        }
        push_unique(&mut projection.select, &path);
    }

    // A requested child field already brings its container.
    let requested = projection.select.clone();
    projection.select.retain(|candidate| {
        let prefix = format!("{candidate}/");
        !requested.iter().any(|other| other.starts_with(&prefix))
    });

    Ok(projection)
}

// Segments from the parameter outward, or `None` for any other shape.
fn member_chain(arg: &Expr) -> Option<Vec<(String, MemberKind)>> {
    let mut current = match arg {
        Expr::Convert { operand, .. } => operand.as_ref(),
        other => other,
    };

    let mut segments = Vec::new();
    loop {
        match current {
            Expr::Member { target, name, kind } => {
                segments.push((name.clone(), *kind));
                current = target.as_ref();
            }
            Expr::Index { target, key } => {
                segments.push((key.clone(), MemberKind::Scalar));
                current = target.as_ref();
            }
            Expr::Param if !segments.is_empty() => break,
            _ => return None,
        }
    }
    segments.reverse();

    Some(segments)
}

fn push_unique(list: &mut Vec<String>, path: &str) {
    if !list.iter().any(|existing| existing == path) {
        list.push(path.to_string());
    }
}

fn ordinal(position: usize) -> String {
    const NAMES: [&str; 10] = [
        "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth",
        "tenth",
    ];

    NAMES
        .get(position)
        .map_or_else(|| format!("{}th", position + 1), ToString::to_string)
}
