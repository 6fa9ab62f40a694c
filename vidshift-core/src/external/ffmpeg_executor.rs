// ============================================================================
// vidshift-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module provides abstractions for spawning ffmpeg and consuming its
// output. A conversion job only needs two things from a running process: a
// single line stream (the `-progress pipe:1` telemetry on stdout merged with
// the diagnostics on stderr) and the final exit status.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner / SidecarProcess: Concrete implementation using ffmpeg-sidecar
//
// ARCHITECTURE:
// The traits are the seam used by the conversion jobs, so tests can drive
// the whole pipeline with scripted processes instead of a real ffmpeg.

use crate::error::{CoreResult, command_start_error, command_wait_error};

use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;

use std::io::{BufRead, BufReader, Read};
use std::process::ExitStatus;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Feeds every line the process writes, from stdout and stderr, to
    /// `handler` until both streams reach end-of-stream.
    ///
    /// Lines from the two streams keep their relative order within each
    /// stream; the interleaving between streams is unspecified.
    fn for_each_line<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(&str);

    /// Waits for the process to exit and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an [`FfmpegProcess`].
///
/// A single spawner is shared by every worker of a batch.
pub trait FfmpegSpawner: Sync {
    type Process: FfmpegProcess;

    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around [`FfmpegChild`] implementing [`FfmpegProcess`].
pub struct SidecarProcess {
    child: FfmpegChild,
}

impl FfmpegProcess for SidecarProcess {
    fn for_each_line<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(&str),
    {
        let (tx, rx) = mpsc::channel::<String>();
        let mut readers: Vec<JoinHandle<()>> = Vec::with_capacity(2);

        if let Some(stdout) = self.child.take_stdout() {
            readers.push(forward_lines(stdout, tx.clone()));
        }
        if let Some(stderr) = self.child.take_stderr() {
            readers.push(forward_lines(stderr, tx.clone()));
        }
        // Channel closes once both reader threads have finished.
        drop(tx);

        for line in rx {
            handler(&line);
        }

        for reader in readers {
            if reader.join().is_err() {
                log::warn!("ffmpeg output reader thread panicked");
            }
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.child
            .wait()
            .map_err(|e| command_wait_error("ffmpeg", e))
    }
}

/// Reads `stream` line by line on a background thread and sends each line to `tx`.
///
/// Invalid UTF-8 is replaced rather than treated as an error.
fn forward_lines<R>(stream: R, tx: mpsc::Sender<String>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for chunk in reader.split(b'\n') {
            let Ok(bytes) = chunk else { break };
            let line = String::from_utf8_lossy(&bytes);
            let line = line.trim_end_matches('\r');
            if tx.send(line.to_string()).is_err() {
                break;
            }
        }
    })
}

/// Concrete implementation of [`FfmpegSpawner`] using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(|child| SidecarProcess { child })
            .map_err(|e| command_start_error("ffmpeg", e))
    }
}
