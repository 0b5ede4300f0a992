use std::path::PathBuf;
use std::process;

use clap::Args;

use super::{lower_input, resolve_options};

#[derive(Args)]
pub struct BuildArgs {
    /// Syntax tree of the program, as JSON
    pub input: PathBuf,
    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// The .owpy source the tree came from, used to show error locations
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,
    /// Spaces per nesting level (overrides owsc.toml)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..=16))]
    pub indent: Option<u8>,
    /// Omit the generator preamble rule
    #[arg(long)]
    pub no_preamble: bool,
}

pub fn cmd_build(args: BuildArgs) {
    let BuildArgs {
        input,
        output,
        source,
        indent,
        no_preamble,
    } = args;
    let options = resolve_options(&input, indent, no_preamble);

    let Some(code) = lower_input(&input, source.as_ref(), &options) else {
        process::exit(1);
    };

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, &code) {
                eprintln!("error: cannot write '{}': {}", path.display(), e);
                process::exit(1);
            }
            eprintln!("Compiled -> {}", path.display());
        }
        None => println!("{}", code),
    }
}
