pub mod build;
pub mod check;

use std::path::{Path, PathBuf};
use std::process;

use owscript::config::Config;
use owscript::diagnostic::render_diagnostics;
use owscript::CompileOptions;
use tracing::Level;

/// Install the stderr log subscriber. Warnings only unless `-v` is given.
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_file(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

/// Options from the nearest `owsc.toml`, with command-line overrides applied.
pub fn resolve_options(input: &Path, indent: Option<u8>, no_preamble: bool) -> CompileOptions {
    let mut options = match Config::find(input.parent().unwrap_or(Path::new("."))) {
        Some(toml_path) => match Config::load(&toml_path) {
            Ok(config) => {
                tracing::debug!(config = %toml_path.display(), "loaded configuration");
                config.compile_options()
            }
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        },
        None => CompileOptions::default(),
    };
    if let Some(indent) = indent {
        options.indent_size = usize::from(indent);
    }
    if no_preamble {
        options.preamble = false;
    }
    options
}

/// Deserialize and lower `input`. Diagnostics are rendered to stderr;
/// compile errors are shown against `source` when it is given.
pub fn lower_input(input: &Path, source: Option<&PathBuf>, options: &CompileOptions) -> Option<String> {
    let json = read_file(input);
    let input_name = input.display().to_string();
    let script = match owscript::parse_ast(&json) {
        Ok(script) => script,
        Err(diag) => {
            render_diagnostics(&[diag], &input_name, None);
            return None;
        }
    };

    match owscript::compile_with_options(&script, options) {
        Ok(code) => Some(code),
        Err(err) => {
            let diag = err.to_diagnostic();
            match source {
                Some(path) => {
                    let text = read_file(path);
                    render_diagnostics(&[diag], &path.display().to_string(), Some(&text));
                }
                None => render_diagnostics(&[diag], &input_name, None),
            }
            None
        }
    }
}
