//! Entry-point for the `docedit` binary.
use clap::Parser;
use docedit_cli::Cli;
use docedit_cli::run_main;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_main(cli)
}
