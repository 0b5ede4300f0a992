//! OWScript compiler core.
//!
//! Takes the syntax tree of an OWScript program and lowers it into the
//! flat text format of the Overwatch Workshop. The tree normally arrives
//! as JSON from a separate front end; see [`parse_ast`].

pub mod ast;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod span;
pub mod transpile;

pub use error::{CompileError, ErrorClass};
pub use transpile::{Transpiler, PREAMBLE};

use diagnostic::Diagnostic;
use span::Span;

/// Options that shape the emitted text but never its meaning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    /// Spaces per nesting level.
    pub indent_size: usize,
    /// Emit the generator preamble rule first.
    pub preamble: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            indent_size: 3,
            preamble: true,
        }
    }
}

/// Compile a script with default options.
pub fn compile(script: &ast::Script) -> Result<String, CompileError> {
    compile_with_options(script, &CompileOptions::default())
}

/// Compile a script. Every call runs a fresh session, so compiling the
/// same tree twice yields identical text.
pub fn compile_with_options(
    script: &ast::Script,
    options: &CompileOptions,
) -> Result<String, CompileError> {
    Transpiler::new(options.clone()).run(script)
}

/// Deserialize a syntax tree from its JSON form.
pub fn parse_ast(json: &str) -> Result<ast::Script, Diagnostic> {
    serde_json::from_str(json).map_err(|e| {
        Diagnostic::error(format!("malformed syntax tree: {}", e), Span::dummy())
            .with_code(ErrorClass::Syntax)
    })
}

/// Deserialize and compile a JSON syntax tree in one step.
pub fn compile_json(json: &str, options: &CompileOptions) -> Result<String, Diagnostic> {
    let script = parse_ast(json)?;
    compile_with_options(&script, options).map_err(Diagnostic::from)
}
