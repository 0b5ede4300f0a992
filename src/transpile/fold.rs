//! Literal constant folding.
//!
//! Integer operands use integer arithmetic, anything else is `f64`. True
//! division always produces a float and modulo takes the sign of the
//! divisor. Division or modulo by zero folds to `0`. Overflow and
//! non-finite results are left for the runtime.

use std::fmt;

use crate::ast::BinOp;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub fn parse(text: &str) -> Option<Num> {
        let text = text.trim();
        if let Ok(i) = text.parse::<i64>() {
            return Some(Num::Int(i));
        }
        text.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Num::Float)
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Num::Int(i) => i == 0,
            Num::Float(f) => f == 0.0,
        }
    }

    pub fn neg(self) -> Option<Num> {
        match self {
            Num::Int(i) => i.checked_neg().map(Num::Int),
            Num::Float(f) => Some(Num::Float(-f)),
        }
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Num::Int(i) => write!(f, "{}", i),
            Num::Float(x) if x.fract() == 0.0 && x.abs() < 1e16 => write!(f, "{:.1}", x),
            Num::Float(x) => write!(f, "{}", x),
        }
    }
}

fn float(value: f64) -> Option<Num> {
    value.is_finite().then_some(Num::Float(value))
}

/// Fold `a op b`, or `None` if the operator does not fold or the result
/// cannot be represented as a literal.
pub(crate) fn fold(op: BinOp, a: Num, b: Num) -> Option<Num> {
    use Num::Int;

    match op {
        BinOp::Add => match (a, b) {
            (Int(x), Int(y)) => x.checked_add(y).map(Int),
            _ => float(a.as_f64() + b.as_f64()),
        },
        BinOp::Sub => match (a, b) {
            (Int(x), Int(y)) => x.checked_sub(y).map(Int),
            _ => float(a.as_f64() - b.as_f64()),
        },
        BinOp::Mul => match (a, b) {
            (Int(x), Int(y)) => x.checked_mul(y).map(Int),
            _ => float(a.as_f64() * b.as_f64()),
        },
        BinOp::Div => {
            if b.is_zero() {
                return Some(Int(0));
            }
            float(a.as_f64() / b.as_f64())
        }
        BinOp::Mod => {
            if b.is_zero() {
                return Some(Int(0));
            }
            match (a, b) {
                (Int(x), Int(y)) => {
                    let r = x.checked_rem(y)?;
                    Some(Int(if r != 0 && (r < 0) != (y < 0) { r + y } else { r }))
                }
                _ => {
                    let (x, y) = (a.as_f64(), b.as_f64());
                    let r = x % y;
                    float(if r != 0.0 && (r < 0.0) != (y < 0.0) { r + y } else { r })
                }
            }
        }
        BinOp::Pow => {
            // 0 raised to a negative power is a division by zero.
            if a.is_zero() && b.as_f64() < 0.0 {
                return Some(Int(0));
            }
            match (a, b) {
                (Int(x), Int(y)) if y >= 0 => {
                    let exp = u32::try_from(y).ok()?;
                    x.checked_pow(exp).map(Int)
                }
                _ => float(a.as_f64().powf(b.as_f64())),
            }
        }
        BinOp::Or | BinOp::And => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold_str(op: BinOp, a: &str, b: &str) -> Option<String> {
        fold(op, Num::parse(a)?, Num::parse(b)?).map(|n| n.to_string())
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(fold_str(BinOp::Add, "2", "3").as_deref(), Some("5"));
        assert_eq!(fold_str(BinOp::Sub, "2", "3").as_deref(), Some("-1"));
        assert_eq!(fold_str(BinOp::Mul, "4", "-3").as_deref(), Some("-12"));
        assert_eq!(fold_str(BinOp::Pow, "2", "10").as_deref(), Some("1024"));
    }

    #[test]
    fn test_division_is_true_division() {
        assert_eq!(fold_str(BinOp::Div, "7", "2").as_deref(), Some("3.5"));
        assert_eq!(fold_str(BinOp::Div, "6", "3").as_deref(), Some("2.0"));
    }

    #[test]
    fn test_division_by_zero_folds_to_zero() {
        assert_eq!(fold_str(BinOp::Div, "5", "0").as_deref(), Some("0"));
        assert_eq!(fold_str(BinOp::Div, "5.5", "0.0").as_deref(), Some("0"));
        assert_eq!(fold_str(BinOp::Mod, "5", "0").as_deref(), Some("0"));
        assert_eq!(fold_str(BinOp::Pow, "0", "-1").as_deref(), Some("0"));
    }

    #[test]
    fn test_modulo_takes_sign_of_divisor() {
        assert_eq!(fold_str(BinOp::Mod, "7", "3").as_deref(), Some("1"));
        assert_eq!(fold_str(BinOp::Mod, "-7", "3").as_deref(), Some("2"));
        assert_eq!(fold_str(BinOp::Mod, "7", "-3").as_deref(), Some("-2"));
        assert_eq!(fold_str(BinOp::Mod, "7.5", "2").as_deref(), Some("1.5"));
    }

    #[test]
    fn test_float_operands() {
        assert_eq!(fold_str(BinOp::Add, "1.5", "1").as_deref(), Some("2.5"));
        assert_eq!(fold_str(BinOp::Mul, "0.5", "4").as_deref(), Some("2.0"));
        assert_eq!(fold_str(BinOp::Pow, "2", "-1").as_deref(), Some("0.5"));
    }

    #[test]
    fn test_overflow_is_not_folded() {
        assert_eq!(fold_str(BinOp::Mul, "9223372036854775807", "2"), None);
        assert_eq!(fold_str(BinOp::Pow, "10", "40"), None);
    }

    #[test]
    fn test_logical_operators_never_fold() {
        assert_eq!(fold_str(BinOp::Or, "1", "0"), None);
        assert_eq!(fold_str(BinOp::And, "1", "1"), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Num::parse("42"), Some(Num::Int(42)));
        assert_eq!(Num::parse("-3"), Some(Num::Int(-3)));
        assert_eq!(Num::parse("0.25"), Some(Num::Float(0.25)));
        assert_eq!(Num::parse("Event Player"), None);
        assert_eq!(Num::parse("inf"), None);
    }
}
