use clap::{Parser, Subcommand};

mod cli;

use cli::build::{cmd_build, BuildArgs};
use cli::check::{cmd_check, CheckArgs};

#[derive(Parser)]
#[command(
    name = "owsc",
    version,
    about = "OWScript compiler: lowers syntax trees to Overwatch Workshop rules"
)]
struct Cli {
    /// Log lowering progress to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a JSON syntax tree to Workshop rules
    Build(BuildArgs),
    /// Lower a JSON syntax tree and report errors without writing output
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();
    cli::init_tracing(cli.verbose);

    match cli.command {
        Command::Build(args) => cmd_build(args),
        Command::Check(args) => cmd_check(args),
    }
}
