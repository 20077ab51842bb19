mod apply_cmd;
mod cli;
pub mod config;
mod parse_cmd;
mod reduce_cmd;
mod stream_cmd;

pub use cli::ApplyArgs;
pub use cli::Cli;
pub use cli::Command;
pub use cli::CompletionArgs;
pub use cli::ParseArgs;
pub use cli::ReduceArgs;
pub use cli::StreamArgs;

use anyhow::Context;
use clap::CommandFactory;
use clap_complete::generate;
use config::OutputFormat;
use config::load_config;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub fn run_main(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        config: config_path,
        json,
        command,
    } = cli;

    let command = match command {
        Command::Completion(args) => {
            print_completion(args);
            return Ok(());
        }
        command => command,
    };

    let config = load_config(config_path.as_deref())?;
    init_logging(&config.log_level);
    debug!(?config, "loaded config");

    let format = if json {
        OutputFormat::Json
    } else {
        config.output.format
    };

    match command {
        Command::Parse(args) => parse_cmd::run(args, format),
        Command::Stream(args) => stream_cmd::run(args, format),
        Command::Apply(args) => apply_cmd::run(args, format, &config),
        Command::Reduce(args) => reduce_cmd::run(args, format),
        Command::Completion(_) => Ok(()),
    }
}

/// Diagnostics go to stderr so stdout carries only results. `RUST_LOG` wins
/// over the configured level.
fn init_logging(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_LEVEL));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

fn print_completion(args: CompletionArgs) {
    let mut app = Cli::command();
    generate(args.shell, &mut app, "docedit", &mut std::io::stdout());
}

/// Read `path`, or stdin when it is absent or `-`.
pub(crate) fn read_input(path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match path {
        Some(path) if path != Path::new("-") => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

pub(crate) fn read_input_text(path: Option<&Path>) -> anyhow::Result<String> {
    let bytes = read_input(path)?;
    String::from_utf8(bytes).context("input is not valid UTF-8")
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
