// vidshift-core/tests/conversion_tests.rs
//
// End-to-end behaviour of single conversion jobs, driven through the batch
// driver with one worker and scripted ffmpeg runs.

mod common;

use common::*;
use vidshift_core::config::CoreConfigBuilder;
use vidshift_core::external::MediaInfo;
use vidshift_core::reporting::ProgressUpdate;
use vidshift_core::{CoreConfig, convert_directory};

use std::fs;
use std::path::Path;
use tempfile::tempdir;

const TEN_SECOND_RUN: &[&str] = &[
    "frame=10",
    "out_time_us=2500000",
    "progress=continue",
    "out_time_us=5000000",
    "out_time_us=10000000",
    "progress=end",
];

fn single_worker(root: &Path) -> CoreConfig {
    CoreConfigBuilder::new()
        .input_dir(root.to_path_buf())
        .max_simultaneous(1)
        .build()
}

#[test]
fn test_successful_conversion_reports_progress_and_keeps_original() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "a.mp4", b"original");

    let spawner = FakeSpawner::new(Script::success(TEN_SECOND_RUN));
    let inspector = FakeInspector::new(ten_seconds());
    let reporter = RecordingReporter::default();

    let summary = convert_directory(
        &single_worker(dir.path()),
        &spawner,
        &inspector,
        &FakeProbe::software(),
        &reporter,
    )
    .unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(
        reporter.progress_for("a.mp4"),
        vec![
            ProgressUpdate::Percent(25),
            ProgressUpdate::Percent(50),
            ProgressUpdate::Percent(99),
            ProgressUpdate::Percent(100),
        ]
    );

    assert!(dir.path().join("a.mkv").exists());
    assert!(!dir.path().join("a.mp4").exists());
    assert_eq!(fs::read(dir.path().join("old/a.mp4")).unwrap(), b"original");
}

#[test]
fn test_nonzero_exit_restores_original_and_removes_partial_output() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "a.mp4", b"original");

    let spawner = FakeSpawner::new(Script::exit_with(
        1,
        &["out_time_us=1000000", "Conversion failed!"],
    ));
    let reporter = RecordingReporter::default();

    let summary = convert_directory(
        &single_worker(dir.path()),
        &spawner,
        &FakeInspector::new(ten_seconds()),
        &FakeProbe::software(),
        &reporter,
    )
    .unwrap();

    assert_eq!(summary.failed, 1);
    assert!(summary.failures[0].1.contains("Conversion failed!"));
    assert_eq!(fs::read(dir.path().join("a.mp4")).unwrap(), b"original");
    assert!(!dir.path().join("old/a.mp4").exists());
    assert!(!dir.path().join("a.mkv").exists());
    assert!(
        !reporter
            .progress_for("a.mp4")
            .contains(&ProgressUpdate::Percent(100))
    );
}

#[test]
fn test_unknown_duration_reports_indeterminate_then_completion() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "a.mp4", b"original");

    let spawner = FakeSpawner::new(Script::success(TEN_SECOND_RUN));
    let reporter = RecordingReporter::default();

    let summary = convert_directory(
        &single_worker(dir.path()),
        &spawner,
        &FakeInspector::new(MediaInfo::default()),
        &FakeProbe::software(),
        &reporter,
    )
    .unwrap();

    assert_eq!(summary.succeeded, 1);
    let updates = reporter.progress_for("a.mp4");
    assert_eq!(updates.last(), Some(&ProgressUpdate::Percent(100)));
    assert_eq!(
        updates
            .iter()
            .filter(|u| **u == ProgressUpdate::Percent(100))
            .count(),
        1
    );
    assert!(
        updates[..updates.len() - 1]
            .iter()
            .all(|u| *u == ProgressUpdate::Indeterminate)
    );
    assert!(reporter
        .events()
        .contains(&Event::JobStarted("a.mp4".into(), false)));

    // Unknown bitrate falls back to the default.
    let args = &spawner.calls()[0];
    assert!(args.windows(2).any(|w| w[0] == "-b:v" && w[1] == "6000k"));
}

#[test]
fn test_exit_zero_without_output_is_a_failure() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "a.mp4", b"original");

    let spawner = FakeSpawner::new(Script::success(TEN_SECOND_RUN).without_output());
    let summary = convert_directory(
        &single_worker(dir.path()),
        &spawner,
        &FakeInspector::new(ten_seconds()),
        &FakeProbe::software(),
        &RecordingReporter::default(),
    )
    .unwrap();

    assert_eq!(summary.failed, 1);
    assert!(dir.path().join("a.mp4").exists());
    assert!(!dir.path().join("old/a.mp4").exists());
}

#[test]
fn test_launch_failure_restores_original() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "a.mp4", b"original");

    let summary = convert_directory(
        &single_worker(dir.path()),
        &FakeSpawner::new(Script::spawn_failure()),
        &FakeInspector::new(ten_seconds()),
        &FakeProbe::software(),
        &RecordingReporter::default(),
    )
    .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(fs::read(dir.path().join("a.mp4")).unwrap(), b"original");
}

#[test]
fn test_existing_output_is_never_overwritten() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "a.mp4", b"original");
    create_file(dir.path(), "a.mkv", b"unrelated");

    let config = CoreConfigBuilder::new()
        .input_dir(dir.path().to_path_buf())
        .input_formats(vec![".mp4".to_string()])
        .build();
    let spawner = FakeSpawner::new(Script::success(TEN_SECOND_RUN));

    let summary = convert_directory(
        &config,
        &spawner,
        &FakeInspector::new(ten_seconds()),
        &FakeProbe::software(),
        &RecordingReporter::default(),
    )
    .unwrap();

    assert_eq!(summary.failed, 1);
    assert!(spawner.calls().is_empty());
    assert_eq!(fs::read(dir.path().join("a.mkv")).unwrap(), b"unrelated");
    assert_eq!(fs::read(dir.path().join("a.mp4")).unwrap(), b"original");
}

#[test]
fn test_command_uses_hardware_defaults_and_probed_bitrate() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "shows/ep1.ts", b"original");

    let spawner = FakeSpawner::new(Script::success(TEN_SECOND_RUN));
    let probe = FakeProbe {
        nvidia: true,
        amd: true,
    };
    convert_directory(
        &single_worker(dir.path()),
        &spawner,
        &FakeInspector::new(ten_seconds()),
        &probe,
        &RecordingReporter::default(),
    )
    .unwrap();

    let calls = spawner.calls();
    assert_eq!(calls.len(), 1);
    let args = &calls[0];
    let staged = dir.path().join("old/shows/ep1.ts");
    let output = dir.path().join("shows/ep1.mkv");
    assert!(args.windows(2).any(|w| w[0] == "-i" && w[1] == staged.to_string_lossy()));
    assert!(args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "hevc_nvenc"));
    assert!(args.windows(2).any(|w| w[0] == "-preset" && w[1] == "slow"));
    assert!(args.windows(2).any(|w| w[0] == "-b:v" && w[1] == "5000k"));
    assert!(args.windows(2).any(|w| w[0] == "-progress" && w[1] == "pipe:1"));
    assert_eq!(args.last().unwrap(), &output.to_string_lossy());
    assert!(!args.iter().any(|a| a == "-map_metadata"));
}

#[test]
fn test_overrides_reach_the_command_line() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "a.mp4", b"original");

    let config = CoreConfigBuilder::new()
        .input_dir(dir.path().to_path_buf())
        .output_format("mp4")
        .bitrate("2500k")
        .resolution("1280x720")
        .video_codec("libx264")
        .preset("fast")
        .strip_metadata(true)
        .container_format("mp4")
        .build();
    let spawner = FakeSpawner::new(Script::success(TEN_SECOND_RUN));

    // a.mp4 -> a.mp4: the original is staged first, so the output path is free.
    let summary = convert_directory(
        &config,
        &spawner,
        &FakeInspector::new(ten_seconds()),
        &FakeProbe::software(),
        &RecordingReporter::default(),
    )
    .unwrap();
    assert_eq!(summary.succeeded, 1);

    let args = &spawner.calls()[0];
    assert!(args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "libx264"));
    assert!(args.windows(2).any(|w| w[0] == "-b:v" && w[1] == "2500k"));
    assert!(args.windows(2).any(|w| w[0] == "-vf" && w[1] == "scale=1280:720"));
    assert!(args.windows(2).any(|w| w[0] == "-map_metadata" && w[1] == "-1"));
    let n = args.len();
    assert_eq!(args[n - 3], "-f");
    assert_eq!(args[n - 2], "mp4");
    assert_eq!(fs::read(dir.path().join("a.mp4")).unwrap(), b"encoded");
}

#[test]
fn test_delete_originals_removes_staged_copy() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "a.mp4", b"original");

    let config = CoreConfigBuilder::new()
        .input_dir(dir.path().to_path_buf())
        .delete_originals(true)
        .build();
    let summary = convert_directory(
        &config,
        &FakeSpawner::new(Script::success(TEN_SECOND_RUN)),
        &FakeInspector::new(ten_seconds()),
        &FakeProbe::software(),
        &RecordingReporter::default(),
    )
    .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert!(!dir.path().join("old/a.mp4").exists());
    assert!(dir.path().join("a.mkv").exists());
}

#[test]
fn test_debug_mode_writes_conversion_log() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "a.mp4", b"original");

    let config = CoreConfigBuilder::new()
        .input_dir(dir.path().to_path_buf())
        .debug(true)
        .build();
    convert_directory(
        &config,
        &FakeSpawner::new(Script::success(TEN_SECOND_RUN)),
        &FakeInspector::new(ten_seconds()),
        &FakeProbe::software(),
        &RecordingReporter::default(),
    )
    .unwrap();

    let log = fs::read_to_string(dir.path().join("a_conversion.log")).unwrap();
    assert!(log.contains("out_time_us=2500000"));
    assert!(log.contains("progress=end"));
}

#[test]
fn test_failed_job_is_reported_once_finished() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "a.mp4", b"original");

    let reporter = RecordingReporter::default();
    convert_directory(
        &single_worker(dir.path()),
        &FakeSpawner::new(Script::exit_with(2, TEN_SECOND_RUN)),
        &FakeInspector::new(ten_seconds()),
        &FakeProbe::software(),
        &reporter,
    )
    .unwrap();

    let events = reporter.events();
    assert!(events.contains(&Event::JobFinished("a.mp4".into(), false)));
    assert!(events.contains(&Event::BatchProgress(1, 1)));
    assert_eq!(events.last(), Some(&Event::BatchFinished(1)));
}
