//! Compile error taxonomy.
//!
//! Every error aborts the compile immediately. Variants are grouped into
//! four classes that name the error to the user.

use std::fmt;

use thiserror::Error;

use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// The user-facing class of a compile error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    Syntax,
    Name,
    InvalidParameter,
    NotImplemented,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorClass::Syntax => "SyntaxError",
            ErrorClass::Name => "NameError",
            ErrorClass::InvalidParameter => "InvalidParameter",
            ErrorClass::NotImplemented => "NotImplementedError",
        };
        f.write_str(s)
    }
}

fn storage_prefix(player: bool) -> &'static str {
    if player {
        "pvar "
    } else {
        ""
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum CompileError {
    #[error("'{name}' expected {expected} parameters, received {received}")]
    Arity {
        name: String,
        expected: usize,
        received: usize,
        span: Span,
    },

    #[error("'{name}' requires {expected} parameters ({types}), received {received}")]
    OwidArity {
        name: String,
        expected: usize,
        types: String,
        received: usize,
        span: Span,
    },

    #[error("undefined function '{name}'")]
    UndefinedFunction { name: String, span: Span },

    #[error("cannot assign to {kind}")]
    InvalidAssignTarget { kind: &'static str, span: Span },

    #[error("{kind} is not callable")]
    InvalidCallee { kind: &'static str, span: Span },

    #[error("unknown attribute '{name}'")]
    UnknownAttribute { name: String, span: Span },

    #[error("unknown method '{name}'")]
    UnknownMethod { name: String, span: Span },

    #[error("invalid parameters for function '{name}': {reason}")]
    BuiltinArgs {
        name: String,
        reason: String,
        span: Span,
    },

    #[error("malformed {kind} literal '{text}'")]
    InvalidLiteral {
        kind: &'static str,
        text: String,
        span: Span,
    },

    #[error("{}'{name}' is undefined", storage_prefix(*.player))]
    UndefinedVariable {
        name: String,
        player: bool,
        span: Span,
    },

    #[error("'{name}' expected type {expected} for parameter {position}, received {received}")]
    InvalidParameter {
        name: String,
        expected: String,
        position: usize,
        received: &'static str,
        span: Span,
    },

    #[error("array assignment only supports literal indices")]
    NonLiteralIndexAssign { span: Span },

    #[error("{kind} is not iterable at compile time")]
    RuntimeIterable { kind: &'static str, span: Span },

    #[error("nested array modification is not supported")]
    NestedArrayWrite { span: Span },

    #[error("recursive call to '{name}' cannot be inlined")]
    RecursiveInline { name: String, span: Span },

    #[error("'{name}' lowers to {lines} statements and cannot be used as a value")]
    InlineNotExpression {
        name: String,
        lines: usize,
        span: Span,
    },
}

impl CompileError {
    pub fn class(&self) -> ErrorClass {
        match self {
            CompileError::Arity { .. }
            | CompileError::OwidArity { .. }
            | CompileError::UndefinedFunction { .. }
            | CompileError::InvalidAssignTarget { .. }
            | CompileError::InvalidCallee { .. }
            | CompileError::UnknownAttribute { .. }
            | CompileError::UnknownMethod { .. }
            | CompileError::BuiltinArgs { .. }
            | CompileError::InvalidLiteral { .. } => ErrorClass::Syntax,
            CompileError::UndefinedVariable { .. } => ErrorClass::Name,
            CompileError::InvalidParameter { .. } => ErrorClass::InvalidParameter,
            CompileError::NonLiteralIndexAssign { .. }
            | CompileError::RuntimeIterable { .. }
            | CompileError::NestedArrayWrite { .. }
            | CompileError::RecursiveInline { .. }
            | CompileError::InlineNotExpression { .. } => ErrorClass::NotImplemented,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            CompileError::Arity { span, .. }
            | CompileError::OwidArity { span, .. }
            | CompileError::UndefinedFunction { span, .. }
            | CompileError::InvalidAssignTarget { span, .. }
            | CompileError::InvalidCallee { span, .. }
            | CompileError::UnknownAttribute { span, .. }
            | CompileError::UnknownMethod { span, .. }
            | CompileError::BuiltinArgs { span, .. }
            | CompileError::InvalidLiteral { span, .. }
            | CompileError::UndefinedVariable { span, .. }
            | CompileError::InvalidParameter { span, .. }
            | CompileError::NonLiteralIndexAssign { span }
            | CompileError::RuntimeIterable { span, .. }
            | CompileError::NestedArrayWrite { span }
            | CompileError::RecursiveInline { span, .. }
            | CompileError::InlineNotExpression { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string(), self.span()).with_code(self.class());
        match self {
            CompileError::NonLiteralIndexAssign { .. } => {
                diag.with_help("assign the whole array or index with a numeral".to_string())
            }
            CompileError::RuntimeIterable { .. } => diag.with_help(
                "loop over an array literal, range(...) or an array variable".to_string(),
            ),
            CompileError::RecursiveInline { .. } => {
                diag.with_note("functions are expanded inline at every call site".to_string())
            }
            _ => diag,
        }
    }
}

impl From<CompileError> for Diagnostic {
    fn from(err: CompileError) -> Self {
        err.to_diagnostic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_message_names_both_counts() {
        let err = CompileError::Arity {
            name: "heal".into(),
            expected: 2,
            received: 3,
            span: Span::dummy(),
        };
        assert_eq!(err.to_string(), "'heal' expected 2 parameters, received 3");
        assert_eq!(err.class(), ErrorClass::Syntax);
    }

    #[test]
    fn test_undefined_player_variable_message() {
        let err = CompileError::UndefinedVariable {
            name: "score".into(),
            player: true,
            span: Span::new(3, 8),
        };
        assert_eq!(err.to_string(), "pvar 'score' is undefined");
        assert_eq!(err.class(), ErrorClass::Name);
        assert_eq!(err.span(), Span::new(3, 8));
    }

    #[test]
    fn test_diagnostic_carries_class_code() {
        let err = CompileError::NestedArrayWrite {
            span: Span::new(1, 2),
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.code.as_deref(), Some("NotImplementedError"));
        assert_eq!(diag.span, Span::new(1, 2));
    }
}
