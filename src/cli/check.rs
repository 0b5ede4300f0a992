use std::path::PathBuf;
use std::process;

use clap::Args;

use super::{lower_input, resolve_options};

#[derive(Args)]
pub struct CheckArgs {
    /// Syntax tree of the program, as JSON
    pub input: PathBuf,
    /// The .owpy source the tree came from, used to show error locations
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,
}

pub fn cmd_check(args: CheckArgs) {
    let CheckArgs { input, source } = args;
    let options = resolve_options(&input, None, false);

    match lower_input(&input, source.as_ref(), &options) {
        Some(_) => eprintln!("OK: {}", input.display()),
        None => process::exit(1),
    }
}
