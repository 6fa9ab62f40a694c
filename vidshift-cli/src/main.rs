// vidshift-cli/src/main.rs
//
// Entry point of the vidshift binary.
//
// Responsibilities:
// - Parsing the command-line flags.
// - Setting up logging and progress bars.
// - Running the conversion batch through vidshift-core.
// - Mapping the outcome to an exit code: 0 when the batch completes,
//   1 on fatal errors, and 1 for failed conversions with --strict.

use clap::Parser;
use console::style;
use vidshift_cli::logging::init_logging;
use vidshift_cli::progress::{TerminalReporter, create_multi_progress};
use vidshift_cli::{Cli, run_convert};

use std::process::ExitCode;

fn main() -> ExitCode {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version are reported through the error path too.
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let multi = create_multi_progress(!args.no_progress);
    init_logging(args.verbose, &multi);
    let reporter = TerminalReporter::new(multi);

    match run_convert(&args, &reporter) {
        Ok(summary) if args.strict && summary.has_failures() => {
            log::error!("{} conversion(s) failed", summary.failed);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", style("Error:").red().bold().for_stderr());
            ExitCode::FAILURE
        }
    }
}
