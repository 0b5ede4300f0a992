//! Lexical environments for function parameters and loop variables.
//!
//! Scopes live in an append-only arena owned by the compile session and
//! refer to their parent by index. A bound name maps to an unevaluated
//! node together with the scope that node must be lowered in.

use std::collections::HashMap;

use crate::ast::Expr;
use crate::span::Spanned;

pub(crate) type ScopeId = usize;

/// An unevaluated node and the environment it belongs to.
#[derive(Clone, Debug)]
pub(crate) struct Bound {
    pub node: Spanned<Expr>,
    pub scope: ScopeId,
}

impl Bound {
    pub fn new(node: Spanned<Expr>, scope: ScopeId) -> Self {
        Self { node, scope }
    }

    /// A bare `name` reference to a global of the same name. Such a binding
    /// would resolve back onto itself.
    fn refers_to(&self, name: &str) -> bool {
        matches!(&self.node.node, Expr::GlobalVar { name: n } if n == name)
    }
}

#[derive(Debug)]
struct ScopeRecord {
    name: String,
    parent: Option<ScopeId>,
    names: HashMap<String, Bound>,
}

#[derive(Debug)]
pub(crate) struct Scopes {
    records: Vec<ScopeRecord>,
}

impl Scopes {
    pub const ROOT: ScopeId = 0;

    pub fn new() -> Self {
        Self {
            records: vec![ScopeRecord {
                name: "global".to_string(),
                parent: None,
                names: HashMap::new(),
            }],
        }
    }

    /// Create an empty child of `parent`.
    pub fn push(&mut self, name: &str, parent: ScopeId) -> ScopeId {
        self.records.push(ScopeRecord {
            name: name.to_string(),
            parent: Some(parent),
            names: HashMap::new(),
        });
        self.records.len() - 1
    }

    /// Bind `name` in `scope` only, replacing any previous binding there.
    pub fn bind(&mut self, scope: ScopeId, name: &str, value: Bound) {
        self.records[scope].names.insert(name.to_string(), value);
    }

    /// Nearest enclosing binding of `name`, skipping self-referential ones.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Bound> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let record = &self.records[id];
            if let Some(bound) = record.names.get(name) {
                if !bound.refers_to(name) {
                    return Some(bound);
                }
            }
            current = record.parent;
        }
        None
    }

    pub fn name(&self, scope: ScopeId) -> &str {
        &self.records[scope].name
    }
}
