//! Transpiler: lowers an OWScript syntax tree into Workshop rule text.
//!
//! The target has no blocks, no call stack and no heap arrays. Every
//! statement therefore lowers to a flat run of [`Line`]s:
//! - `if`/`while` become `Skip If`/`Skip`/`Loop If` sequences whose counts
//!   are the exact lengths of the lowered branches.
//! - `for` loops over compile-time sequences are unrolled.
//! - user functions are expanded inline at every call site.
//! - variables live at dense indices of the Workshop variable `A`.
//!
//! A `Transpiler` is one compile session. `run` consumes it, so tables
//! never leak between compiles.

mod alloc;
mod arrays;
mod builtins;
mod call;
mod expr;
mod fold;
mod helpers;
mod scope;
mod stmt;

use std::collections::HashMap;

use tracing::debug;

use crate::ast::*;
use crate::error::CompileError;
use crate::span::{Span, Spanned};
use crate::CompileOptions;

use self::alloc::{VarAllocator, VarKey};
use self::arrays::ShadowArrays;
use self::helpers::{quote, title_case};
use self::scope::{Bound, ScopeId, Scopes};

/// First rule of every output, identifying the generator.
pub const PREAMBLE: &str = r#"rule("Generated by owsc") { Event { Ongoing - Global; }}"#;

/// Workshop variable holding every allocated slot.
const STORE: &str = "A";
/// Workshop variable used as scratch space for indexed writes.
const SCRATCH: &str = "B";
/// Placeholder for values the target cannot express inline.
const NULL: &str = "Null";

pub(crate) type Result<T> = std::result::Result<T, CompileError>;

/// One emitted statement, before indentation and the trailing `;`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Line {
    /// Nesting depth relative to the enclosing rule block.
    pub depth: usize,
    pub text: String,
}

impl Line {
    pub fn new(depth: usize, text: String) -> Self {
        Self { depth, text }
    }
}

/// A resolved variable: its slot key plus the lowered player expression.
#[derive(Clone, Debug)]
pub(crate) struct Place {
    pub key: VarKey,
    player: Option<String>,
}

impl Place {
    fn global(name: &str) -> Self {
        Self {
            key: VarKey::global(name),
            player: None,
        }
    }

    fn player(name: &str, player: String) -> Self {
        Self {
            key: VarKey::player(name, &player),
            player: Some(player),
        }
    }

    fn variable(&self, var: &str) -> String {
        match &self.player {
            None => format!("Global Variable({})", var),
            Some(p) => format!("Player Variable({}, {})", p, var),
        }
    }

    pub fn read(&self, slot: u32) -> String {
        format!("Value In Array({}, {})", self.variable(STORE), slot)
    }

    fn set_at(&self, var: &str, index: impl std::fmt::Display, value: &str) -> String {
        match &self.player {
            None => format!("Set Global Variable At Index({}, {}, {})", var, index, value),
            Some(p) => format!(
                "Set Player Variable At Index({}, {}, {}, {})",
                p, var, index, value
            ),
        }
    }

    pub fn set(&self, slot: u32, value: &str) -> String {
        self.set_at(STORE, slot, value)
    }

    pub fn append(&self, slot: u32, value: &str) -> String {
        match &self.player {
            None => format!(
                "Modify Global Variable At Index({}, {}, Append To Array, {})",
                STORE, slot, value
            ),
            Some(p) => format!(
                "Modify Player Variable At Index({}, {}, {}, Append To Array, {})",
                p, STORE, slot, value
            ),
        }
    }

    /// Read-modify-write of one array element through the scratch variable.
    pub fn write_element(&self, slot: u32, index: usize, value: &str) -> [String; 3] {
        let copy = match &self.player {
            None => format!("Set Global Variable({}, {})", SCRATCH, self.read(slot)),
            Some(p) => format!("Set Player Variable({}, {}, {})", p, SCRATCH, self.read(slot)),
        };
        [
            copy,
            self.set_at(SCRATCH, index, value),
            self.set_at(STORE, slot, &self.variable(SCRATCH)),
        ]
    }
}

// ─── Transpiler ────────────────────────────────────────────────────

/// One compile session.
pub struct Transpiler {
    options: CompileOptions,
    /// Lexical environments of inlined calls and unrolled loops.
    scopes: Scopes,
    /// Scope the current node is lowered in.
    scope: ScopeId,
    /// Slot indices of global and player variables.
    vars: VarAllocator,
    /// Statically known array contents, by variable.
    arrays: ShadowArrays,
    /// Declared functions: name -> definition.
    functions: HashMap<String, Function>,
    /// Functions currently being expanded, innermost last.
    inlining: Vec<String>,
}

impl Transpiler {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            scopes: Scopes::new(),
            scope: Scopes::ROOT,
            vars: VarAllocator::new(),
            arrays: ShadowArrays::new(),
            functions: HashMap::new(),
            inlining: Vec::new(),
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // ── Top-level entry: run ──────────────────────────────────────
    // ═══════════════════════════════════════════════════════════════

    /// Lower a whole script. Items are visited in source order, so a
    /// function must be declared before the rules that call it.
    pub fn run(mut self, script: &Script) -> std::result::Result<String, CompileError> {
        let mut out = String::new();
        if self.options.preamble {
            out.push_str(PREAMBLE);
            out.push('\n');
        }
        for item in &script.items {
            match &item.node {
                Decl::Function(function) => self.declare(function),
                Decl::Rule(rule) => out.push_str(&self.lower_rule(rule)?),
            }
        }
        let len = out.trim_end_matches('\n').len();
        out.truncate(len);
        debug!(variables = self.vars.len(), "lowering finished");
        Ok(out)
    }

    fn lower_rule(&mut self, rule: &Rule) -> Result<String> {
        debug!(rule = %rule.name.node, blocks = rule.blocks.len(), "lowering rule");
        let mut out = String::new();
        if rule.disabled {
            out.push_str("disabled ");
        }
        out.push_str(&format!("rule({}) {{\n", quote(&rule.name.node)));
        for block in &rule.blocks {
            out.push_str(&self.lower_ruleblock(&block.node)?);
        }
        out.push_str("}\n");
        Ok(out)
    }

    fn lower_ruleblock(&mut self, block: &Ruleblock) -> Result<String> {
        let kind = block.kind.node.trim();
        let conditions = kind.eq_ignore_ascii_case("conditions");
        let mut out = format!("{}{} {{\n", self.indent(1), title_case(kind));
        for line in self.lower_block(&block.body, 0)? {
            out.push_str(&self.indent(2 + line.depth));
            out.push_str(&line.text);
            if conditions {
                out.push_str(" == True");
            }
            out.push_str(";\n");
        }
        out.push_str(&self.indent(1));
        out.push_str("}\n");
        Ok(out)
    }

    fn indent(&self, level: usize) -> String {
        " ".repeat(self.options.indent_size * level)
    }

    // ── Scope helpers ─────────────────────────────────────────────

    /// Run `f` with `scope` as the current scope.
    pub(crate) fn with_scope<T>(
        &mut self,
        scope: ScopeId,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let saved = std::mem::replace(&mut self.scope, scope);
        let out = f(self);
        self.scope = saved;
        out
    }

    /// Follow name bindings until reaching a node that is not a bound name.
    ///
    /// Every binding points into a scope created before the one holding it,
    /// so the walk terminates.
    pub(crate) fn resolve_bound(&self, bound: Bound) -> Bound {
        let mut current = bound;
        while let Expr::GlobalVar { name } = &current.node.node {
            match self.scopes.lookup(current.scope, name) {
                Some(next) => current = next.clone(),
                None => break,
            }
        }
        current
    }

    pub(crate) fn resolve(&self, node: &Spanned<Expr>) -> Bound {
        self.resolve_bound(Bound::new(node.clone(), self.scope))
    }

    pub(crate) fn lower_bound(&mut self, bound: &Bound) -> Result<String> {
        self.with_scope(bound.scope, |t| t.lower_expr(&bound.node))
    }

    // ── Variable places ───────────────────────────────────────────

    /// Place of a `GlobalVar`/`PlayerVar` node as written, lowering the
    /// player expression in the current scope.
    pub(crate) fn var_place(&mut self, node: &Spanned<Expr>) -> Result<Option<Place>> {
        match &node.node {
            Expr::GlobalVar { name } => Ok(Some(Place::global(name))),
            Expr::PlayerVar { name, player } => {
                Ok(Some(self.player_place(name, player.as_deref())?))
            }
            _ => Ok(None),
        }
    }

    pub(crate) fn player_place(&mut self, name: &str, player: Option<&Spanned<Expr>>) -> Result<Place> {
        let player = match player {
            Some(p) => self.lower_expr(p)?,
            None => "Event Player".to_string(),
        };
        Ok(Place::player(name, player))
    }

    /// Place of `node` after following name bindings.
    pub(crate) fn place(&mut self, node: &Spanned<Expr>) -> Result<Option<Place>> {
        let resolved = self.resolve(node);
        self.with_scope(resolved.scope, |t| t.var_place(&resolved.node))
    }

    /// Slot of a variable that must already have been assigned.
    pub(crate) fn slot_of(&self, place: &Place, span: Span) -> Result<u32> {
        self.vars
            .get(&place.key)
            .ok_or_else(|| CompileError::UndefinedVariable {
                name: place.key.name().to_string(),
                player: place.key.is_player(),
                span,
            })
    }

    /// A compile-time integer index, if `node` is one.
    pub(crate) fn literal_index(&self, node: &Spanned<Expr>) -> Option<usize> {
        match &self.resolve(node).node.node {
            Expr::Numeral(n) => n.trim().parse::<usize>().ok(),
            _ => None,
        }
    }
}
