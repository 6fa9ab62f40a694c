// ============================================================================
// vidshift-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger Initialization for the CLI
//
// The library logs through the `log` facade; this module installs
// env_logger as the backend.
//
// KEY COMPONENTS:
// - init_logging: installs the logger with the vidshift line format
// - ProgressAwareWriter: writes log lines without tearing progress bars
//
// USAGE:
// - default: info
// - --verbose: debug
// - RUST_LOG=...: overrides both

use console::style;
use env_logger::{Builder, Env, Target};
use indicatif::MultiProgress;
use log::Level;

use std::io::{self, Write};

/// Installs the global logger.
///
/// Log lines go to stderr. While progress bars are drawn they are printed
/// above the bars.
pub fn init_logging(verbose: bool, multi: &MultiProgress) {
    let default_level = if verbose { "debug" } else { "info" };

    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));
    builder
        .target(Target::Pipe(Box::new(ProgressAwareWriter {
            multi: multi.clone(),
        })))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} {}",
                style(buf.timestamp_seconds()).dim().for_stderr(),
                styled_level(record.level()),
                record.args()
            )
        });

    // A logger may already be installed when running inside tests.
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

fn styled_level(level: Level) -> String {
    let label = format!("{level:<5}");
    let styled = match level {
        Level::Error => style(label).red().bold(),
        Level::Warn => style(label).yellow(),
        Level::Info => style(label).green(),
        Level::Debug => style(label).cyan(),
        Level::Trace => style(label).dim(),
    };
    styled.for_stderr().to_string()
}

/// Writes to stderr, suspending any drawn progress bars for the duration.
struct ProgressAwareWriter {
    multi: MultiProgress,
}

impl Write for ProgressAwareWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.multi.suspend(|| io::stderr().write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}
