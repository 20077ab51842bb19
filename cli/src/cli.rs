use clap::Args;
use clap::Parser;
use clap_complete::Shell;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Inspect and apply document edit blocks emitted by a model.
#[derive(Parser, Debug)]
#[command(version, bin_name = "docedit")]
pub struct Cli {
    /// Path to a config file. Defaults to `config.toml` in `$DOCEDIT_HOME`
    /// (or `~/.docedit`) when present.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of human output.
    #[arg(long = "json", default_value_t = false, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Split a whole model response into prose and edit blocks.
    Parse(ParseArgs),

    /// Feed a response through the incremental parser chunk by chunk.
    Stream(StreamArgs),

    /// Apply SEARCH/REPLACE directives to a document.
    Apply(ApplyArgs),

    /// Show the changed middle of a search/replace pair.
    Reduce(ReduceArgs),

    /// Generate shell completion scripts.
    Completion(CompletionArgs),
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Response file. Reads stdin when omitted or `-`.
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Treat the input as the complete response: an unterminated edit block
    /// is an error instead of a block still streaming in.
    #[arg(long = "final", default_value_t = false)]
    pub is_final: bool,
}

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Response file. Reads stdin when omitted or `-`.
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Bytes per pushed chunk.
    #[arg(long = "chunk-size", value_name = "N", default_value = "16")]
    pub chunk_size: NonZeroUsize,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Document to edit.
    #[arg(long = "document", value_name = "FILE")]
    pub document: PathBuf,

    /// Raw SEARCH/REPLACE instructions. Reads stdin when neither this nor
    /// `--response` is given.
    #[arg(long = "instructions", value_name = "FILE", conflicts_with = "response")]
    pub instructions: Option<PathBuf>,

    /// Model response; directives come from its completed
    /// `<replace_in_file>` blocks.
    #[arg(long = "response", value_name = "FILE")]
    pub response: Option<PathBuf>,

    /// Where to write the edited document. Defaults to stdout.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReduceArgs {
    /// Text being replaced.
    #[arg(value_name = "SEARCH")]
    pub search: String,

    /// Replacement text.
    #[arg(value_name = "REPLACE")]
    pub replace: String,
}

#[derive(Args, Debug)]
pub struct CompletionArgs {
    /// Shell to generate completions for
    #[arg(value_enum, default_value_t = Shell::Bash)]
    pub shell: Shell,
}
