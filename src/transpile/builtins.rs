//! Compile-time builtin functions.
//!
//! A builtin rewrites its call into a syntax node (or a sequence of them)
//! that is then lowered like user code. User functions of the same name
//! take precedence.

use super::{Result, Transpiler};
use crate::ast::{Expr, Owid, ParamType};
use crate::error::CompileError;
use crate::span::{Span, Spanned};

/// Unrolling more elements than this is rejected.
const MAX_RANGE_LEN: i128 = 1 << 16;

pub(crate) enum BuiltinValue {
    Node(Spanned<Expr>),
    Sequence(Vec<Spanned<Expr>>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Produces {
    Node,
    Sequence,
}

type BuiltinFn = fn(&mut Transpiler, &[Spanned<Expr>], Span) -> Result<BuiltinValue>;

pub(crate) struct Builtin {
    pub name: &'static str,
    pub produces: Produces,
    pub run: BuiltinFn,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "range",
        produces: Produces::Sequence,
        run: range,
    },
    Builtin {
        name: "ceil",
        produces: Produces::Node,
        run: ceil,
    },
    Builtin {
        name: "floor",
        produces: Produces::Node,
        run: floor,
    },
];

pub(crate) fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

fn args_error(name: &str, reason: String, span: Span) -> CompileError {
    CompileError::BuiltinArgs {
        name: name.to_string(),
        reason,
        span,
    }
}

/// `range(stop)`, `range(start, stop)`, `range(start, stop, step)` over
/// integer literals, with half-open bounds.
fn range(t: &mut Transpiler, args: &[Spanned<Expr>], span: Span) -> Result<BuiltinValue> {
    let mut bounds = Vec::with_capacity(args.len());
    for arg in args {
        let text = t.lower_expr(arg)?;
        let value = text.parse::<i64>().map_err(|_| {
            args_error("range", format!("'{}' is not an integer literal", text), arg.span)
        })?;
        bounds.push(value);
    }

    let (start, stop, step) = match *bounds.as_slice() {
        [stop] => (0, stop, 1),
        [start, stop] => (start, stop, 1),
        [start, stop, step] => (start, stop, step),
        _ => {
            return Err(args_error(
                "range",
                format!("expected 1 to 3 arguments, received {}", args.len()),
                span,
            ))
        }
    };
    if step == 0 {
        return Err(args_error("range", "step must not be zero".to_string(), span));
    }

    let (start, stop, step) = (i128::from(start), i128::from(stop), i128::from(step));
    let len = if step > 0 {
        (stop - start + step - 1).div_euclid(step)
    } else {
        (start - stop - step - 1).div_euclid(-step)
    }
    .max(0);
    if len > MAX_RANGE_LEN {
        return Err(args_error(
            "range",
            format!("{} elements exceed the unroll limit of {}", len, MAX_RANGE_LEN),
            span,
        ));
    }

    let elements = (0..len)
        .map(|k| Spanned::new(Expr::Numeral((start + k * step).to_string()), span))
        .collect();
    Ok(BuiltinValue::Sequence(elements))
}

/// `Round To Integer(x, <direction>)`.
fn round_to_integer(
    name: &str,
    direction: &str,
    args: &[Spanned<Expr>],
    span: Span,
) -> Result<BuiltinValue> {
    let [value] = args else {
        return Err(CompileError::Arity {
            name: name.to_string(),
            expected: 1,
            received: args.len(),
            span,
        });
    };
    let rounding = ParamType {
        name: "Rounding".to_string(),
        values: ["UP", "DOWN", "TO NEAREST"].map(String::from).to_vec(),
    };
    Ok(BuiltinValue::Node(Spanned::new(
        Expr::Owid(Owid {
            name: "Round To Integer".to_string(),
            params: vec![None, Some(rounding)],
            args: vec![
                value.clone(),
                Spanned::new(Expr::Constant(direction.to_string()), span),
            ],
        }),
        span,
    )))
}

fn ceil(_: &mut Transpiler, args: &[Spanned<Expr>], span: Span) -> Result<BuiltinValue> {
    round_to_integer("ceil", "Up", args, span)
}

fn floor(_: &mut Transpiler, args: &[Spanned<Expr>], span: Span) -> Result<BuiltinValue> {
    round_to_integer("floor", "Down", args, span)
}
