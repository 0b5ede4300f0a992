//! Syntax tree handed over by the OWScript front end.
//!
//! The tree is a closed set of enums; every node carries its source span.
//! Operators serialize as their source tokens so a front end can emit the
//! tree as plain JSON.

use serde::{Deserialize, Serialize};

use crate::span::Spanned;

/// A whole program: function declarations and rules, in source order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub items: Vec<Spanned<Decl>>,
}

/// Top-level declarations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    Function(Function),
    Rule(Rule),
}

/// `%name(params)` followed by an indented body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: Spanned<String>,
    #[serde(default)]
    pub params: Vec<Spanned<String>>,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule title without surrounding quotes.
    pub name: Spanned<String>,
    #[serde(default)]
    pub disabled: bool,
    pub blocks: Vec<Spanned<Ruleblock>>,
}

/// A named rule section such as `Event`, `Conditions` or `Actions`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ruleblock {
    pub kind: Spanned<String>,
    pub body: Block,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Spanned<Stmt>>,
}

/// Statements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Assign {
        target: Spanned<Expr>,
        op: AssignOp,
        value: Spanned<Expr>,
    },
    If(IfStmt),
    While {
        cond: Spanned<Expr>,
        body: Spanned<Block>,
    },
    For {
        var: Spanned<String>,
        iterable: Spanned<Expr>,
        body: Spanned<Block>,
    },
    Expr(Spanned<Expr>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub cond: Spanned<Expr>,
    pub then_block: Spanned<Block>,
    #[serde(default)]
    pub else_branch: Option<ElseBranch>,
}

/// `else:` body, or an `elif` chained as a nested if.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ElseBranch {
    Block(Spanned<Block>),
    If(Box<Spanned<IfStmt>>),
}

/// Expressions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Numeric literal, kept as written.
    Numeral(String),
    /// Workshop constant such as `Event Player` or `Up`.
    Constant(String),
    /// Duration literal such as `500ms`, `2s`, `1min`.
    Time(String),
    String {
        value: String,
        #[serde(default)]
        args: Vec<Spanned<Expr>>,
    },
    Vector(Vec<Spanned<Expr>>),
    GlobalVar {
        name: String,
    },
    PlayerVar {
        name: String,
        /// `None` means the event player.
        #[serde(default)]
        player: Option<Box<Spanned<Expr>>>,
    },
    Item {
        array: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },
    Array(Vec<Spanned<Expr>>),
    BinaryOp {
        op: BinOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Spanned<Expr>>,
    },
    Compare {
        op: CmpOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
    /// `callee(args)`. A `GlobalVar` callee names a function or builtin,
    /// an `Attribute` callee is a method call on its receiver.
    Call {
        callee: Box<Spanned<Expr>>,
        #[serde(default)]
        args: Vec<Spanned<Expr>>,
    },
    Attribute {
        receiver: Box<Spanned<Expr>>,
        name: Spanned<String>,
    },
    Owid(Owid),
}

/// A Workshop value or action invocation with declared parameter types.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Owid {
    pub name: String,
    /// One entry per positional parameter; `None` accepts anything.
    #[serde(default)]
    pub params: Vec<Option<ParamType>>,
    #[serde(default)]
    pub args: Vec<Spanned<Expr>>,
}

/// A closed set of accepted argument values, e.g. `Rounding = [UP, DOWN]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamType {
    pub name: String,
    pub values: Vec<String>,
}

impl ParamType {
    pub const WILDCARD: &'static str = "ANY";

    pub fn is_wildcard(&self) -> bool {
        self.values
            .iter()
            .any(|v| v.eq_ignore_ascii_case(Self::WILDCARD))
    }

    /// Case-insensitive membership test against the accepted values.
    pub fn accepts(&self, value: &str) -> bool {
        self.is_wildcard() || self.values.iter().any(|v| v.eq_ignore_ascii_case(value))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "^")]
    Pow,
    #[serde(rename = "%")]
    Mod,
    #[serde(rename = "or")]
    Or,
    #[serde(rename = "and")]
    And,
}

impl BinOp {
    /// Workshop instruction implementing the operator.
    pub fn instruction(self) -> &'static str {
        match self {
            BinOp::Add => "Add",
            BinOp::Sub => "Subtract",
            BinOp::Mul => "Multiply",
            BinOp::Div => "Divide",
            BinOp::Pow => "Raise To Power",
            BinOp::Mod => "Modulo",
            BinOp::Or => "Or",
            BinOp::And => "And",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        !matches!(self, BinOp::Or | BinOp::And)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    #[serde(rename = "-")]
    Neg,
    #[serde(rename = "+")]
    Pos,
    #[serde(rename = "not")]
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not in")]
    NotIn,
}

impl CmpOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    #[serde(rename = "=")]
    Set,
    #[serde(rename = "+=")]
    Add,
    #[serde(rename = "-=")]
    Sub,
    #[serde(rename = "*=")]
    Mul,
    #[serde(rename = "/=")]
    Div,
    #[serde(rename = "^=")]
    Pow,
    #[serde(rename = "%=")]
    Mod,
}

impl AssignOp {
    /// The arithmetic operator an augmented assignment desugars to.
    pub fn binary(self) -> Option<BinOp> {
        match self {
            AssignOp::Set => None,
            AssignOp::Add => Some(BinOp::Add),
            AssignOp::Sub => Some(BinOp::Sub),
            AssignOp::Mul => Some(BinOp::Mul),
            AssignOp::Div => Some(BinOp::Div),
            AssignOp::Pow => Some(BinOp::Pow),
            AssignOp::Mod => Some(BinOp::Mod),
        }
    }
}

impl Expr {
    /// Node kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Numeral(_) => "Numeral",
            Expr::Constant(_) => "Constant",
            Expr::Time(_) => "Time",
            Expr::String { .. } => "String",
            Expr::Vector(_) => "Vector",
            Expr::GlobalVar { .. } => "GlobalVar",
            Expr::PlayerVar { .. } => "PlayerVar",
            Expr::Item { .. } => "Item",
            Expr::Array(_) => "Array",
            Expr::BinaryOp { .. } => "BinaryOp",
            Expr::UnaryOp { .. } => "UnaryOp",
            Expr::Compare { .. } => "Compare",
            Expr::Call { .. } => "Call",
            Expr::Attribute { .. } => "Attribute",
            Expr::Owid(_) => "OWID",
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Expr::GlobalVar { .. } | Expr::PlayerVar { .. })
    }
}

// ─── Construction helpers ──────────────────────────────────────────
//
// Front ends embedding the crate, benchmarks and tests build trees without
// source positions through these.

pub fn num(value: impl ToString) -> Spanned<Expr> {
    Spanned::dummy(Expr::Numeral(value.to_string()))
}

pub fn constant(name: &str) -> Spanned<Expr> {
    Spanned::dummy(Expr::Constant(name.to_string()))
}

pub fn gvar(name: &str) -> Spanned<Expr> {
    Spanned::dummy(Expr::GlobalVar {
        name: name.to_string(),
    })
}

pub fn pvar(name: &str, player: Option<Spanned<Expr>>) -> Spanned<Expr> {
    Spanned::dummy(Expr::PlayerVar {
        name: name.to_string(),
        player: player.map(Box::new),
    })
}

pub fn array(elements: Vec<Spanned<Expr>>) -> Spanned<Expr> {
    Spanned::dummy(Expr::Array(elements))
}

pub fn item(array: Spanned<Expr>, index: Spanned<Expr>) -> Spanned<Expr> {
    Spanned::dummy(Expr::Item {
        array: Box::new(array),
        index: Box::new(index),
    })
}

pub fn binary(lhs: Spanned<Expr>, op: BinOp, rhs: Spanned<Expr>) -> Spanned<Expr> {
    Spanned::dummy(Expr::BinaryOp {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

pub fn compare(lhs: Spanned<Expr>, op: CmpOp, rhs: Spanned<Expr>) -> Spanned<Expr> {
    Spanned::dummy(Expr::Compare {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

pub fn call(name: &str, args: Vec<Spanned<Expr>>) -> Spanned<Expr> {
    Spanned::dummy(Expr::Call {
        callee: Box::new(gvar(name)),
        args,
    })
}

pub fn method(receiver: Spanned<Expr>, name: &str, args: Vec<Spanned<Expr>>) -> Spanned<Expr> {
    Spanned::dummy(Expr::Call {
        callee: Box::new(attribute(receiver, name)),
        args,
    })
}

pub fn attribute(receiver: Spanned<Expr>, name: &str) -> Spanned<Expr> {
    Spanned::dummy(Expr::Attribute {
        receiver: Box::new(receiver),
        name: Spanned::dummy(name.to_string()),
    })
}

pub fn owid(name: &str, params: Vec<Option<ParamType>>, args: Vec<Spanned<Expr>>) -> Spanned<Expr> {
    Spanned::dummy(Expr::Owid(Owid {
        name: name.to_string(),
        params,
        args,
    }))
}

pub fn assign(target: Spanned<Expr>, value: Spanned<Expr>) -> Spanned<Stmt> {
    assign_op(target, AssignOp::Set, value)
}

pub fn assign_op(target: Spanned<Expr>, op: AssignOp, value: Spanned<Expr>) -> Spanned<Stmt> {
    Spanned::dummy(Stmt::Assign { target, op, value })
}

pub fn expr_stmt(expr: Spanned<Expr>) -> Spanned<Stmt> {
    Spanned::dummy(Stmt::Expr(expr))
}

pub fn block(stmts: Vec<Spanned<Stmt>>) -> Spanned<Block> {
    Spanned::dummy(Block { stmts })
}

pub fn if_stmt(
    cond: Spanned<Expr>,
    then_stmts: Vec<Spanned<Stmt>>,
    else_branch: Option<ElseBranch>,
) -> Spanned<Stmt> {
    Spanned::dummy(Stmt::If(IfStmt {
        cond,
        then_block: block(then_stmts),
        else_branch,
    }))
}

pub fn while_stmt(cond: Spanned<Expr>, body: Vec<Spanned<Stmt>>) -> Spanned<Stmt> {
    Spanned::dummy(Stmt::While {
        cond,
        body: block(body),
    })
}

pub fn for_stmt(var: &str, iterable: Spanned<Expr>, body: Vec<Spanned<Stmt>>) -> Spanned<Stmt> {
    Spanned::dummy(Stmt::For {
        var: Spanned::dummy(var.to_string()),
        iterable,
        body: block(body),
    })
}

pub fn function(name: &str, params: &[&str], body: Vec<Spanned<Stmt>>) -> Spanned<Decl> {
    Spanned::dummy(Decl::Function(Function {
        name: Spanned::dummy(name.to_string()),
        params: params.iter().map(|p| Spanned::dummy(p.to_string())).collect(),
        body: Block { stmts: body },
    }))
}

pub fn ruleblock(kind: &str, stmts: Vec<Spanned<Stmt>>) -> Spanned<Ruleblock> {
    Spanned::dummy(Ruleblock {
        kind: Spanned::dummy(kind.to_string()),
        body: Block { stmts },
    })
}

pub fn rule(name: &str, blocks: Vec<Spanned<Ruleblock>>) -> Spanned<Decl> {
    Spanned::dummy(Decl::Rule(Rule {
        name: Spanned::dummy(name.to_string()),
        disabled: false,
        blocks,
    }))
}
