use clap::Parser;
use ouncebook::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
