//! Calls: inline expansion of user functions, builtins, methods, and
//! compile-time sequences.

use tracing::debug;

use super::arrays;
use super::builtins::{self, BuiltinValue, Produces};
use super::scope::{Bound, Scopes};
use super::{Line, Place, Result, Transpiler};
use crate::ast::*;
use crate::error::CompileError;
use crate::span::{Span, Spanned};

impl Transpiler {
    pub(crate) fn declare(&mut self, function: &Function) {
        debug!(
            function = %function.name.node,
            params = function.params.len(),
            "registered function"
        );
        self.functions
            .insert(function.name.node.clone(), function.clone());
    }

    /// `name(args)` when `name` is a declared function.
    pub(crate) fn user_call<'a>(
        &self,
        expr: &'a Spanned<Expr>,
    ) -> Option<(&'a str, &'a [Spanned<Expr>])> {
        let Expr::Call { callee, args } = &expr.node else {
            return None;
        };
        match &callee.node {
            Expr::GlobalVar { name } if self.functions.contains_key(name) => {
                Some((name.as_str(), args.as_slice()))
            }
            _ => None,
        }
    }

    // ── Inlining ──────────────────────────────────────────────────

    /// Expand the body of `name` at the call site. Parameters are bound
    /// by name: each argument is lowered where the parameter is used, in
    /// the caller's scope.
    pub(crate) fn inline_call(
        &mut self,
        name: &str,
        args: &[Spanned<Expr>],
        span: Span,
        depth: usize,
    ) -> Result<Vec<Line>> {
        let Some(function) = self.functions.get(name).cloned() else {
            return Err(CompileError::UndefinedFunction {
                name: name.to_string(),
                span,
            });
        };
        if function.params.len() != args.len() {
            return Err(CompileError::Arity {
                name: name.to_string(),
                expected: function.params.len(),
                received: args.len(),
                span,
            });
        }
        if self.inlining.iter().any(|f| f == name) {
            return Err(CompileError::RecursiveInline {
                name: name.to_string(),
                span,
            });
        }

        let scope = self.scopes.push(name, self.scope);
        debug!(
            function = name,
            scope = self.scopes.name(scope),
            depth,
            "inlining call"
        );
        for (param, arg) in function.params.iter().zip(args) {
            self.scopes
                .bind(scope, &param.node, Bound::new(arg.clone(), self.scope));
        }

        self.inlining.push(name.to_string());
        let lines = self.with_scope(scope, |t| t.lower_block(&function.body, depth));
        self.inlining.pop();
        lines
    }

    pub(crate) fn lower_call_expr(
        &mut self,
        callee: &Spanned<Expr>,
        args: &[Spanned<Expr>],
        span: Span,
    ) -> Result<String> {
        let name = match &callee.node {
            Expr::Attribute { receiver, name } => {
                return self.lower_method(receiver, name, args, span)
            }
            Expr::GlobalVar { name } => name,
            other => {
                return Err(CompileError::InvalidCallee {
                    kind: other.kind_name(),
                    span: callee.span,
                })
            }
        };

        if self.functions.contains_key(name) {
            let mut lines = self.inline_call(name, args, span, 0)?;
            if lines.len() != 1 {
                return Err(CompileError::InlineNotExpression {
                    name: name.clone(),
                    lines: lines.len(),
                    span,
                });
            }
            return Ok(lines.remove(0).text);
        }

        let Some(builtin) = builtins::lookup(name) else {
            return Err(CompileError::UndefinedFunction {
                name: name.clone(),
                span: callee.span,
            });
        };
        match (builtin.run)(self, args, span)? {
            BuiltinValue::Node(node) => self.lower_expr(&node),
            BuiltinValue::Sequence(elements) => {
                let elements: Vec<Bound> = elements
                    .into_iter()
                    .map(|e| Bound::new(e, Scopes::ROOT))
                    .collect();
                self.lower_elements(&elements)
            }
        }
    }

    // ── Methods ───────────────────────────────────────────────────

    fn lower_method(
        &mut self,
        receiver: &Spanned<Expr>,
        name: &Spanned<String>,
        args: &[Spanned<Expr>],
        span: Span,
    ) -> Result<String> {
        let method = name.node.to_ascii_lowercase();
        let expected = match method.as_str() {
            "append" | "index" => 1,
            "halt" => 0,
            _ => {
                return Err(CompileError::UnknownMethod {
                    name: name.node.clone(),
                    span: name.span,
                })
            }
        };
        if args.len() != expected {
            return Err(CompileError::Arity {
                name: name.node.clone(),
                expected,
                received: args.len(),
                span,
            });
        }

        match method.as_str() {
            "append" => self.lower_append(receiver, &args[0]),
            "index" => self.lower_index_of(receiver, &args[0]),
            _ => {
                let player = self.lower_expr(receiver)?;
                Ok(format!(
                    "Apply Impulse({}, Down, Multiply(0.001, 0.001), To World, Cancel Contrary Motion)",
                    player
                ))
            }
        }
    }

    /// `arr.append(v)` appends at runtime and to the shadow. A variable
    /// appended to before any assignment starts from an empty shadow.
    fn lower_append(&mut self, receiver: &Spanned<Expr>, element: &Spanned<Expr>) -> Result<String> {
        let place = self.receiver_place(receiver)?;
        let value = self.lower_expr(element)?;
        let fresh = self.vars.get(&place.key).is_none();
        let slot = self.vars.allocate_or_get(&place.key);
        if fresh || self.arrays.get(&place.key).is_some() {
            self.arrays.push(&place.key, value.clone());
        }
        Ok(place.append(slot, &value))
    }

    /// `arr.index(v)` is resolved against the shadow: the position of the
    /// first element stored with the same text, or `-1`. An array without
    /// a shadow is searched as if empty.
    fn lower_index_of(&mut self, receiver: &Spanned<Expr>, needle: &Spanned<Expr>) -> Result<String> {
        let place = self.receiver_place(receiver)?;
        let needle = self.lower_expr(needle)?;
        let position = self
            .arrays
            .get(&place.key)
            .and_then(|elements| elements.iter().position(|element| *element == needle));
        Ok(position.map_or_else(|| "-1".to_string(), |i| i.to_string()))
    }

    fn receiver_place(&mut self, receiver: &Spanned<Expr>) -> Result<Place> {
        match self.place(receiver)? {
            Some(place) => Ok(place),
            None => Err(CompileError::InvalidAssignTarget {
                kind: self.resolve(receiver).node.node.kind_name(),
                span: receiver.span,
            }),
        }
    }

    // ── Compile-time sequences ────────────────────────────────────

    /// Elements of `node` if they are known at compile time: an array
    /// literal, a sequence builtin, or a variable with a shadow. A shadowed
    /// element that is not a number is read back from the array.
    pub(crate) fn static_sequence(&mut self, node: &Spanned<Expr>) -> Result<Option<Vec<Bound>>> {
        let resolved = self.resolve(node);
        match &resolved.node.node {
            Expr::Array(elements) => Ok(Some(
                elements
                    .iter()
                    .map(|e| Bound::new(e.clone(), resolved.scope))
                    .collect(),
            )),
            Expr::Call { callee, args } => {
                let Expr::GlobalVar { name } = &callee.node else {
                    return Ok(None);
                };
                if self.functions.contains_key(name) {
                    return Ok(None);
                }
                let Some(builtin) = builtins::lookup(name) else {
                    return Ok(None);
                };
                if builtin.produces != Produces::Sequence {
                    return Ok(None);
                }
                let span = resolved.node.span;
                match self.with_scope(resolved.scope, |t| (builtin.run)(t, args, span))? {
                    BuiltinValue::Sequence(elements) => Ok(Some(
                        elements
                            .into_iter()
                            .map(|e| Bound::new(e, Scopes::ROOT))
                            .collect(),
                    )),
                    BuiltinValue::Node(_) => Ok(None),
                }
            }
            Expr::GlobalVar { .. } | Expr::PlayerVar { .. } => {
                let Some(elements) = self.shadow_of(&resolved)? else {
                    return Ok(None);
                };
                let span = resolved.node.span;
                let elements = elements
                    .into_iter()
                    .enumerate()
                    .map(|(i, element)| {
                        let node = match arrays::literal(&element) {
                            Some(value) => Expr::Numeral(value.to_string()),
                            None => Expr::Item {
                                array: Box::new(resolved.node.clone()),
                                index: Box::new(Spanned::new(Expr::Numeral(i.to_string()), span)),
                            },
                        };
                        Bound::new(Spanned::new(node, span), resolved.scope)
                    })
                    .collect();
                Ok(Some(elements))
            }
            _ => Ok(None),
        }
    }

    /// Frozen shadow of the variable `bound` names, if it has one.
    pub(crate) fn shadow_of(&mut self, bound: &Bound) -> Result<Option<Vec<String>>> {
        let place = self.with_scope(bound.scope, |t| t.var_place(&bound.node))?;
        Ok(place.and_then(|p| self.arrays.get(&p.key).map(<[String]>::to_vec)))
    }
}
