//! Expression lowering: every expression becomes one Workshop value string.

use super::arrays;
use super::fold::{fold, Num};
use super::helpers::{duration_seconds, quote, title_case};
use super::scope::Bound;
use super::{Place, Result, Transpiler, NULL};
use crate::ast::*;
use crate::error::CompileError;
use crate::span::{Span, Spanned};

/// Positional format arguments of a string literal.
const STRING_SLOTS: usize = 3;

/// Workshop value for a player attribute, with `{}` standing for the player.
fn attribute_template(name: &str) -> Option<&'static str> {
    let template = match name.to_ascii_lowercase().as_str() {
        "x" => "X Component Of({})",
        "y" => "Y Component Of({})",
        "z" => "Z Component Of({})",
        "facing" => "Facing Direction Of({})",
        "pos" => "Position Of({})",
        "eyepos" => "Eye Position({})",
        "hero" => "Hero Of({})",
        "team" => "Team Of({})",
        "jumping" => "Is Button Held({}, Jump)",
        "crouching" => "Is Button Held({}, Crouch)",
        "interacting" => "Is Button Held({}, Interact)",
        "lmb" => "Is Button Held({}, Primary Fire)",
        "rmb" => "Is Button Held({}, Secondary Fire)",
        "moving" => "Compare(Speed Of({}), >, 0)",
        _ => return None,
    };
    Some(template)
}

/// `[a, b]` becomes `Append To Array(Append To Array(Empty Array, a), b)`.
pub(crate) fn array_text(elements: &[String]) -> String {
    elements.iter().fold("Empty Array".to_string(), |acc, value| {
        format!("Append To Array({}, {})", acc, value)
    })
}

impl Transpiler {
    pub(crate) fn lower_expr(&mut self, expr: &Spanned<Expr>) -> Result<String> {
        match &expr.node {
            Expr::Numeral(n) => Ok(n.trim().to_string()),
            Expr::Constant(c) => Ok(title_case(c.trim())),
            Expr::Time(t) => duration_seconds(t).ok_or_else(|| CompileError::InvalidLiteral {
                kind: "time",
                text: t.clone(),
                span: expr.span,
            }),
            Expr::String { value, args } => self.lower_string(value, args, expr.span),
            Expr::Vector(components) => self.lower_vector(components, expr.span),
            Expr::GlobalVar { name } => {
                if let Some(bound) = self.scopes.lookup(self.scope, name).cloned() {
                    return self.lower_bound(&bound);
                }
                let place = Place::global(name);
                let slot = self.slot_of(&place, expr.span)?;
                Ok(place.read(slot))
            }
            Expr::PlayerVar { name, player } => {
                let place = self.player_place(name, player.as_deref())?;
                let slot = self.slot_of(&place, expr.span)?;
                Ok(place.read(slot))
            }
            Expr::Item { array, index } => self.lower_item(array, index),
            Expr::Array(elements) => {
                let elements: Vec<Bound> = elements
                    .iter()
                    .map(|e| Bound::new(e.clone(), self.scope))
                    .collect();
                self.lower_elements(&elements)
            }
            Expr::BinaryOp { op, lhs, rhs } => self.lower_binary(*op, lhs, rhs),
            Expr::UnaryOp { op, operand } => self.lower_unary(*op, operand),
            Expr::Compare { op, lhs, rhs } => {
                let l = self.lower_expr(lhs)?;
                let r = self.lower_expr(rhs)?;
                Ok(match op {
                    CmpOp::In => format!("Array Contains({}, {})", r, l),
                    CmpOp::NotIn => format!("Not(Array Contains({}, {}))", r, l),
                    _ => format!("Compare({}, {}, {})", l, op.as_str(), r),
                })
            }
            Expr::Call { callee, args } => self.lower_call_expr(callee, args, expr.span),
            Expr::Attribute { receiver, name } => {
                let template = attribute_template(&name.node).ok_or_else(|| {
                    CompileError::UnknownAttribute {
                        name: name.node.clone(),
                        span: name.span,
                    }
                })?;
                let receiver = self.lower_expr(receiver)?;
                Ok(template.replace("{}", &receiver))
            }
            Expr::Owid(owid) => self.lower_owid(owid, expr.span),
        }
    }

    // ── Literals ──────────────────────────────────────────────────

    fn lower_string(&mut self, value: &str, args: &[Spanned<Expr>], span: Span) -> Result<String> {
        if args.len() > STRING_SLOTS {
            return Err(CompileError::Arity {
                name: "String".to_string(),
                expected: STRING_SLOTS,
                received: args.len(),
                span,
            });
        }
        let mut slots = Vec::with_capacity(STRING_SLOTS);
        for arg in args {
            slots.push(self.lower_expr(arg)?);
        }
        slots.resize(STRING_SLOTS, NULL.to_string());
        Ok(format!(
            "String({}, {})",
            quote(&title_case(value)),
            slots.join(", ")
        ))
    }

    fn lower_vector(&mut self, components: &[Spanned<Expr>], span: Span) -> Result<String> {
        if components.len() != 3 {
            return Err(CompileError::Arity {
                name: "Vector".to_string(),
                expected: 3,
                received: components.len(),
                span,
            });
        }
        let mut parts = Vec::with_capacity(3);
        for c in components {
            parts.push(self.lower_expr(c)?);
        }
        Ok(format!("Vector({})", parts.join(", ")))
    }

    /// Lower each element as it is stored. Strings cannot be stored in
    /// arrays and become `Null`.
    pub(crate) fn freeze_elements(&mut self, elements: &[Bound]) -> Result<Vec<String>> {
        let mut frozen = Vec::with_capacity(elements.len());
        for element in elements {
            let resolved = self.resolve_bound(element.clone());
            frozen.push(match resolved.node.node {
                Expr::String { .. } => NULL.to_string(),
                _ => self.lower_bound(element)?,
            });
        }
        Ok(frozen)
    }

    pub(crate) fn lower_elements(&mut self, elements: &[Bound]) -> Result<String> {
        Ok(array_text(&self.freeze_elements(elements)?))
    }

    // ── Operators ─────────────────────────────────────────────────

    /// Arithmetic on two compile-time numbers is folded; anything else
    /// maps onto the Workshop instruction.
    fn lower_binary(&mut self, op: BinOp, lhs: &Spanned<Expr>, rhs: &Spanned<Expr>) -> Result<String> {
        let l = self.lower_expr(lhs)?;
        let r = self.lower_expr(rhs)?;
        if op.is_arithmetic() {
            if let (Some(a), Some(b)) = (Num::parse(&l), Num::parse(&r)) {
                if let Some(folded) = fold(op, a, b) {
                    return Ok(folded.to_string());
                }
            }
        }
        Ok(format!("{}({}, {})", op.instruction(), l, r))
    }

    fn lower_unary(&mut self, op: UnaryOp, operand: &Spanned<Expr>) -> Result<String> {
        let value = self.lower_expr(operand)?;
        Ok(match op {
            UnaryOp::Neg => match Num::parse(&value).and_then(Num::neg) {
                Some(negated) => negated.to_string(),
                None => format!("Subtract(0, {})", value),
            },
            UnaryOp::Pos => format!("Abs({})", value),
            UnaryOp::Not => format!("Not({})", value),
        })
    }

    // ── Array reads ───────────────────────────────────────────────

    /// A literal index into a statically known array folds to a numeric
    /// element; past the end it folds to `0`.
    fn lower_item(&mut self, array: &Spanned<Expr>, index: &Spanned<Expr>) -> Result<String> {
        let Some(place) = self.place(array)? else {
            let array = self.lower_expr(array)?;
            let index = self.lower_expr(index)?;
            return Ok(format!("Value In Array({}, {})", array, index));
        };

        let slot = self.slot_of(&place, array.span)?;
        if let Some(position) = self.literal_index(index) {
            if let Some(elements) = self.arrays.get(&place.key) {
                match elements.get(position) {
                    None => return Ok("0".to_string()),
                    Some(element) => {
                        if let Some(value) = arrays::literal(element) {
                            return Ok(value.to_string());
                        }
                    }
                }
            }
        }
        let index = self.lower_expr(index)?;
        Ok(format!("Value In Array({}, {})", place.read(slot), index))
    }

    // ── Workshop values ───────────────────────────────────────────

    fn lower_owid(&mut self, owid: &Owid, span: Span) -> Result<String> {
        let name = title_case(owid.name.trim());
        if owid.params.len() != owid.args.len() {
            let types = owid
                .params
                .iter()
                .map(|p| p.as_ref().map_or("Any", |t| t.name.as_str()))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(CompileError::OwidArity {
                name,
                expected: owid.params.len(),
                types,
                received: owid.args.len(),
                span,
            });
        }

        let mut args = Vec::with_capacity(owid.args.len());
        for (i, (param, arg)) in owid.params.iter().zip(&owid.args).enumerate() {
            let value = self.lower_expr(arg)?;
            if let Some(ty) = param {
                if !ty.accepts(&value) {
                    return Err(CompileError::InvalidParameter {
                        name,
                        expected: ty.name.clone(),
                        position: i + 1,
                        received: arg.node.kind_name(),
                        span: arg.span,
                    });
                }
            }
            args.push(value);
        }

        if args.is_empty() {
            Ok(name)
        } else {
            Ok(format!("{}({})", name, args.join(", ")))
        }
    }
}
