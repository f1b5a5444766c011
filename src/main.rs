use std::process::ExitCode;

use clap::Parser;

use colorfe::cli::{self, CliArgs};

fn main() -> ExitCode {
    colorfe::logger::init();
    let args = CliArgs::parse();
    cli::run(args)
}
