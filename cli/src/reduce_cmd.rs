use docedit_apply_edit::reduce;

use crate::ReduceArgs;
use crate::config::OutputFormat;
use crate::print_json;

pub(crate) fn run(args: ReduceArgs, format: OutputFormat) -> anyhow::Result<()> {
    let reduced = reduce(&args.search, &args.replace);
    match format {
        OutputFormat::Json => print_json(&reduced),
        OutputFormat::Human => {
            println!("{reduced}");
            Ok(())
        }
    }
}
