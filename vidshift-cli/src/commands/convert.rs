// ============================================================================
// vidshift-cli/src/commands/convert.rs
// ============================================================================
//
// CONVERT COMMAND: Runs a vidshift-core batch from command-line flags
//
// KEY COMPONENTS:
// - config_from_args: maps parsed flags onto a CoreConfig
// - run_convert: validates, runs the batch and prints the summary

use crate::cli::Cli;

use anyhow::{Context, Result, bail};
use console::style;
use vidshift_core::config::{CoreConfig, CoreConfigBuilder};
use vidshift_core::external::{self, CrateFfprobeExecutor, SidecarSpawner};
use vidshift_core::hardware::SystemProbe;
use vidshift_core::reporting::{BatchSummary, ProgressReporter};
use vidshift_core::convert_directory;

/// Builds the core configuration from the parsed flags.
pub fn config_from_args(args: &Cli) -> CoreConfig {
    let mut builder = CoreConfigBuilder::new()
        .input_dir(args.directory.clone())
        .output_format(&args.output_format)
        .audio_codec(&args.audio_codec)
        .audio_bitrate(&args.audio_bitrate)
        .strip_metadata(args.strip_metadata)
        .debug(args.debug)
        .max_simultaneous(args.max_simultaneous)
        .delete_originals(args.delete_originals);

    if let Some(formats) = &args.input_formats {
        builder = builder.input_formats(formats.clone());
    }
    if let Some(bitrate) = &args.bitrate {
        builder = builder.bitrate(bitrate);
    }
    if let Some(resolution) = &args.resolution {
        builder = builder.resolution(resolution);
    }
    if let Some(codec) = &args.video_codec {
        builder = builder.video_codec(codec);
    }
    if let Some(preset) = &args.preset {
        builder = builder.preset(preset);
    }
    if let Some(framerate) = &args.framerate {
        builder = builder.framerate(framerate);
    }
    if let Some(crf) = args.crf {
        builder = builder.crf(crf);
    }
    if let Some(container) = &args.container_format {
        builder = builder.container_format(container);
    }
    if let Some(threads) = args.thread_count {
        builder = builder.thread_count(usize::from(threads));
    }
    if let Some(filter) = &args.audio_filter {
        builder = builder.audio_filter(filter);
    }

    builder.build()
}

/// Runs the conversion batch described by `args`.
pub fn run_convert(args: &Cli, reporter: &dyn ProgressReporter) -> Result<BatchSummary> {
    if !args.directory.is_dir() {
        bail!(
            "Directory '{}' does not exist or is not a directory",
            args.directory.display()
        );
    }

    let config = config_from_args(args);
    config.validate().context("Invalid options")?;

    // Missing ffmpeg surfaces as per-file launch failures.
    if external::check_dependency("ffmpeg").is_ok() {
        if let Some(version) = external::ffmpeg_version() {
            log::info!("{version}");
        }
    }

    let summary = convert_directory(
        &config,
        &SidecarSpawner,
        &CrateFfprobeExecutor::new(),
        &SystemProbe,
        reporter,
    )
    .with_context(|| format!("Failed to convert '{}'", config.input_dir.display()))?;

    print_summary(&summary);
    Ok(summary)
}

fn print_summary(summary: &BatchSummary) {
    if summary.total == 0 {
        return;
    }

    println!();
    println!("{}", style("Conversion summary").bold());
    println!("  {:<10} {}", "Files:", summary.total);
    println!(
        "  {:<10} {}",
        "Succeeded:",
        style(summary.succeeded).green()
    );
    if summary.has_failures() {
        println!("  {:<10} {}", "Failed:", style(summary.failed).red().bold());
        for (path, reason) in &summary.failures {
            println!("    {} {}", style(path.display()).red(), style(reason).dim());
        }
    }
    println!(
        "  {:<10} {}",
        "Elapsed:",
        vidshift_core::utils::format_elapsed(summary.elapsed)
    );
}
