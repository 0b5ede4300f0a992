//! Statement lowering: assignments, conditionals, loops.
//!
//! Control flow is expressed with relative skips, so every count emitted
//! here is the exact number of lines produced for the skipped region.

use tracing::debug;

use super::expr::array_text;
use super::{Line, Result, Transpiler};
use crate::ast::*;
use crate::error::CompileError;
use crate::span::{Span, Spanned};

/// Lowered right-hand side of an assignment.
struct Assigned {
    text: String,
    /// Frozen elements of the value, when statically known.
    sequence: Option<Vec<String>>,
    span: Span,
}

impl Transpiler {
    pub(crate) fn lower_block(&mut self, block: &Block, depth: usize) -> Result<Vec<Line>> {
        let mut lines = Vec::new();
        for stmt in &block.stmts {
            lines.extend(self.lower_stmt(stmt, depth)?);
        }
        Ok(lines)
    }

    fn lower_stmt(&mut self, stmt: &Spanned<Stmt>, depth: usize) -> Result<Vec<Line>> {
        match &stmt.node {
            Stmt::Assign { target, op, value } => {
                self.lower_assign(target, *op, value, stmt.span, depth)
            }
            Stmt::If(if_stmt) => self.lower_if(if_stmt, depth),
            Stmt::While { cond, body } => self.lower_while(cond, &body.node, depth),
            Stmt::For {
                var,
                iterable,
                body,
            } => self.lower_for(var, iterable, &body.node, depth),
            Stmt::Expr(expr) => {
                if let Some((name, args)) = self.user_call(expr) {
                    return self.inline_call(name, args, expr.span, depth);
                }
                Ok(vec![Line::new(depth, self.lower_expr(expr)?)])
            }
        }
    }

    // ── Assignment ────────────────────────────────────────────────

    fn lower_assign(
        &mut self,
        target: &Spanned<Expr>,
        op: AssignOp,
        value: &Spanned<Expr>,
        span: Span,
        depth: usize,
    ) -> Result<Vec<Line>> {
        // `x op= v` is `x = x op v`.
        let value = match op.binary() {
            Some(bin) => Spanned::new(
                Expr::BinaryOp {
                    op: bin,
                    lhs: Box::new(target.clone()),
                    rhs: Box::new(value.clone()),
                },
                span,
            ),
            None => value.clone(),
        };

        // The value is lowered before the target allocates, so `x = x`
        // on a fresh `x` is an undefined read.
        let resolved = self.resolve(&value);
        let (text, sequence) = if resolved.node.node.is_variable() {
            let text = self.lower_expr(&value)?;
            (text, self.shadow_of(&resolved)?)
        } else {
            match self.static_sequence(&value)? {
                Some(elements) => {
                    let frozen = self.freeze_elements(&elements)?;
                    (array_text(&frozen), Some(frozen))
                }
                None => (self.lower_expr(&value)?, None),
            }
        };
        let assigned = Assigned {
            text,
            sequence,
            span: value.span,
        };

        let target = self.resolve(target);
        self.with_scope(target.scope, |t| t.assign_to(&target.node, assigned, depth))
    }

    fn assign_to(
        &mut self,
        target: &Spanned<Expr>,
        assigned: Assigned,
        depth: usize,
    ) -> Result<Vec<Line>> {
        if let Some(place) = self.var_place(target)? {
            let slot = self.vars.allocate_or_get(&place.key);
            match assigned.sequence {
                Some(elements) => self.arrays.record(place.key.clone(), elements),
                None => self.arrays.forget(&place.key),
            }
            return Ok(vec![Line::new(depth, place.set(slot, &assigned.text))]);
        }
        match &target.node {
            Expr::Item { array, index } => self.assign_item(array, index, assigned, depth),
            other => Err(CompileError::InvalidAssignTarget {
                kind: other.kind_name(),
                span: target.span,
            }),
        }
    }

    /// `arr[i] = v` copies the array to the scratch variable, writes the
    /// element there and copies it back.
    fn assign_item(
        &mut self,
        array: &Spanned<Expr>,
        index: &Spanned<Expr>,
        assigned: Assigned,
        depth: usize,
    ) -> Result<Vec<Line>> {
        let Some(place) = self.place(array)? else {
            return Err(CompileError::InvalidAssignTarget {
                kind: self.resolve(array).node.node.kind_name(),
                span: array.span,
            });
        };
        let Some(position) = self.literal_index(index) else {
            return Err(CompileError::NonLiteralIndexAssign { span: index.span });
        };
        if assigned.sequence.is_some() {
            return Err(CompileError::NestedArrayWrite {
                span: assigned.span,
            });
        }
        let slot = self.slot_of(&place, array.span)?;
        self.arrays.set(&place.key, position, assigned.text.clone());
        Ok(place
            .write_element(slot, position, &assigned.text)
            .into_iter()
            .map(|text| Line::new(depth, text))
            .collect())
    }

    // ── Control flow ──────────────────────────────────────────────

    /// ```text
    /// Skip If(Not(c), T + 1)    // T + 0 without an else branch
    ///   <then: T lines>
    /// Skip(F)
    /// <else: F lines>
    /// ```
    /// A chained `elif` is lowered as the else branch at the same depth.
    ///
    /// Each branch starts from the shadows known before the `if`. Shadows
    /// written in either branch are forgotten afterwards.
    fn lower_if(&mut self, if_stmt: &IfStmt, depth: usize) -> Result<Vec<Line>> {
        let cond = self.lower_expr(&if_stmt.cond)?;

        let before = self.arrays.clone();
        let mark = self.arrays.mark();
        let then_lines = self.lower_block(&if_stmt.then_block.node, depth + 1)?;
        let then_written = self.arrays.written_since(mark);
        self.arrays = before;

        let mark = self.arrays.mark();
        let else_lines = match &if_stmt.else_branch {
            None => None,
            Some(ElseBranch::Block(block)) => Some(self.lower_block(&block.node, depth + 1)?),
            Some(ElseBranch::If(nested)) => Some(self.lower_if(&nested.node, depth)?),
        };
        for key in &then_written {
            self.arrays.forget(key);
        }
        self.arrays.forget_since(mark);

        let skip = then_lines.len() + usize::from(else_lines.is_some());
        let mut lines = Vec::with_capacity(skip + 1);
        lines.push(Line::new(depth, format!("Skip If(Not({}), {})", cond, skip)));
        lines.extend(then_lines);
        if let Some(else_lines) = else_lines {
            lines.push(Line::new(depth, format!("Skip({})", else_lines.len())));
            lines.extend(else_lines);
        }
        Ok(lines)
    }

    /// ```text
    /// Skip If(Not(c), B + 2)
    ///   <body: B lines>
    /// Wait(0.001, Ignore Condition)
    /// Loop If(c)
    /// ```
    /// `Loop If` restarts the whole action list, so the guard in front of
    /// the body is what makes the loop resume in place.
    ///
    /// Any shadow the body writes may differ between iterations. A first
    /// pass finds those keys; they are forgotten before the condition and
    /// body are lowered for real, and again after the loop.
    fn lower_while(&mut self, cond: &Spanned<Expr>, body: &Block, depth: usize) -> Result<Vec<Line>> {
        let before = self.arrays.clone();
        let mark = self.arrays.mark();
        let scan = self
            .lower_expr(cond)
            .and_then(|_| self.lower_block(body, depth + 1));
        let written = scan.ok().map(|_| self.arrays.written_since(mark));
        self.arrays = before;

        let mark = self.arrays.mark();
        match written {
            Some(keys) => {
                for key in &keys {
                    self.arrays.forget(key);
                }
            }
            None => self.arrays.forget_all(),
        }

        let cond = self.lower_expr(cond)?;
        let body = self.lower_block(body, depth + 1)?;
        self.arrays.forget_since(mark);
        let mut lines = Vec::with_capacity(body.len() + 3);
        lines.push(Line::new(
            depth,
            format!("Skip If(Not({}), {})", cond, body.len() + 2),
        ));
        lines.extend(body);
        lines.push(Line::new(depth, "Wait(0.001, Ignore Condition)".to_string()));
        lines.push(Line::new(depth, format!("Loop If({})", cond)));
        Ok(lines)
    }

    /// Unroll over a compile-time sequence. Each iteration gets its own
    /// scope binding the loop variable to one unevaluated element.
    fn lower_for(
        &mut self,
        var: &Spanned<String>,
        iterable: &Spanned<Expr>,
        body: &Block,
        depth: usize,
    ) -> Result<Vec<Line>> {
        let Some(elements) = self.static_sequence(iterable)? else {
            // A variable without a shadow: report it as undefined if it
            // was never assigned, otherwise as a runtime value.
            if let Some(place) = self.place(iterable)? {
                self.slot_of(&place, iterable.span)?;
            }
            return Err(CompileError::RuntimeIterable {
                kind: self.resolve(iterable).node.node.kind_name(),
                span: iterable.span,
            });
        };

        debug!(var = %var.node, iterations = elements.len(), "unrolling for loop");
        let mut lines = Vec::new();
        for element in elements {
            let scope = self.scopes.push(&var.node, self.scope);
            self.scopes.bind(scope, &var.node, element);
            lines.extend(self.with_scope(scope, |t| t.lower_block(body, depth))?);
        }
        Ok(lines)
    }
}
