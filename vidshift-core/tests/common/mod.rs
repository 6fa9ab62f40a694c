// vidshift-core/tests/common/mod.rs
//
// Scripted fakes of the external collaborators, shared by the integration
// tests. Not every test file uses every helper.
#![allow(dead_code)]

use ffmpeg_sidecar::command::FfmpegCommand;
use vidshift_core::error::{CoreError, CoreResult};
use vidshift_core::external::{FfmpegProcess, FfmpegSpawner, FfprobeExecutor, MediaInfo};
use vidshift_core::hardware::HardwareProbe;
use vidshift_core::reporting::{BatchSummary, JobResult, ProgressReporter, ProgressUpdate};
use vidshift_core::CandidateFile;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

// ---- File helpers ----

/// Creates `root/rel` (and its parents) with `contents`.
pub fn create_file(root: &Path, rel: &str, contents: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&path, contents).expect("Failed to write test file");
    path
}

// ---- ffmpeg ----

/// Behaviour of one simulated ffmpeg run.
#[derive(Debug, Clone)]
pub struct Script {
    pub lines: Vec<String>,
    pub exit_code: i32,
    /// Write a file at the output path while "encoding".
    pub create_output: bool,
    /// Refuse to start, as if the binary were missing.
    pub fail_to_spawn: bool,
    /// Panic inside `spawn`.
    pub panic: bool,
}

impl Script {
    pub fn success(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| (*l).to_string()).collect(),
            exit_code: 0,
            create_output: true,
            fail_to_spawn: false,
            panic: false,
        }
    }

    pub fn exit_with(code: i32, lines: &[&str]) -> Self {
        Self {
            exit_code: code,
            ..Self::success(lines)
        }
    }

    pub fn without_output(mut self) -> Self {
        self.create_output = false;
        self
    }

    pub fn spawn_failure() -> Self {
        Self {
            fail_to_spawn: true,
            create_output: false,
            ..Self::success(&[])
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Self::success(&[])
        }
    }
}

#[derive(Default)]
struct Counters {
    running: AtomicUsize,
    max_running: AtomicUsize,
}

/// Fake spawner: picks a [`Script`] by matching the input file name.
pub struct FakeSpawner {
    default: Script,
    scripts: Vec<(String, Script)>,
    hold: Duration,
    calls: Mutex<Vec<Vec<String>>>,
    counters: Arc<Counters>,
}

impl FakeSpawner {
    pub fn new(default: Script) -> Self {
        Self {
            default,
            scripts: Vec::new(),
            hold: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Uses `script` for inputs whose file name contains `pattern`.
    pub fn with_script(mut self, pattern: &str, script: Script) -> Self {
        self.scripts.push((pattern.to_string(), script));
        self
    }

    /// Keeps every process alive for `hold` before it exits.
    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_concurrent(&self) -> usize {
        self.counters.max_running.load(Ordering::SeqCst)
    }
}

impl FfmpegSpawner for FakeSpawner {
    type Process = FakeProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<FakeProcess> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        self.calls.lock().unwrap().push(args.clone());

        let input = args
            .iter()
            .position(|a| a == "-i")
            .and_then(|i| args.get(i + 1))
            .cloned()
            .unwrap_or_default();
        let input_name = Path::new(&input)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let script = self
            .scripts
            .iter()
            .find(|(pattern, _)| input_name.contains(pattern.as_str()))
            .map(|(_, script)| script.clone())
            .unwrap_or_else(|| self.default.clone());

        if script.panic {
            panic!("simulated crash for {input_name}");
        }
        if script.fail_to_spawn {
            return Err(CoreError::CommandStart(
                "ffmpeg".to_string(),
                io::Error::new(io::ErrorKind::NotFound, "ffmpeg not found"),
            ));
        }

        let running = self.counters.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_running.fetch_max(running, Ordering::SeqCst);

        Ok(FakeProcess {
            output_path: args.last().map(PathBuf::from),
            script,
            hold: self.hold,
            counters: Arc::clone(&self.counters),
            exited: false,
        })
    }
}

pub struct FakeProcess {
    script: Script,
    output_path: Option<PathBuf>,
    hold: Duration,
    counters: Arc<Counters>,
    exited: bool,
}

impl FfmpegProcess for FakeProcess {
    fn for_each_line<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(&str),
    {
        if self.script.create_output {
            if let Some(output) = &self.output_path {
                fs::write(output, b"encoded")?;
            }
        }
        for line in &self.script.lines {
            handler(line);
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        if !self.hold.is_zero() {
            thread::sleep(self.hold);
        }
        if !self.exited {
            self.exited = true;
            self.counters.running.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(ExitStatus::from_raw(self.script.exit_code << 8))
    }
}

// ---- ffprobe ----

/// Fake inspector returning canned media info per file name.
#[derive(Default)]
pub struct FakeInspector {
    default: MediaInfo,
    by_name: HashMap<String, MediaInfo>,
}

impl FakeInspector {
    pub fn new(default: MediaInfo) -> Self {
        Self {
            default,
            by_name: HashMap::new(),
        }
    }

    pub fn with(mut self, file_name: &str, info: MediaInfo) -> Self {
        self.by_name.insert(file_name.to_string(), info);
        self
    }
}

impl FfprobeExecutor for FakeInspector {
    fn get_media_info(&self, input_path: &Path) -> MediaInfo {
        input_path
            .file_name()
            .and_then(|n| self.by_name.get(n.to_string_lossy().as_ref()))
            .copied()
            .unwrap_or(self.default)
    }
}

pub fn ten_seconds() -> MediaInfo {
    MediaInfo {
        bitrate_kbps: Some(5000),
        duration_secs: Some(10.0),
    }
}

// ---- hardware ----

pub struct FakeProbe {
    pub nvidia: bool,
    pub amd: bool,
}

impl FakeProbe {
    pub fn software() -> Self {
        Self {
            nvidia: false,
            amd: false,
        }
    }
}

impl HardwareProbe for FakeProbe {
    fn has_nvidia_gpu(&self) -> bool {
        self.nvidia
    }

    fn has_amd_gpu(&self) -> bool {
        self.amd
    }
}

// ---- reporting ----

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    BatchStarted(usize),
    JobStarted(PathBuf, bool),
    Progress(PathBuf, ProgressUpdate),
    JobFinished(PathBuf, bool),
    BatchProgress(usize, usize),
    BatchFinished(usize),
}

#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Progress updates reported for one file, in order.
    pub fn progress_for(&self, rel: &str) -> Vec<ProgressUpdate> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Progress(path, update) if path == Path::new(rel) => Some(update),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressReporter for RecordingReporter {
    fn batch_started(&self, total: usize) {
        self.push(Event::BatchStarted(total));
    }

    fn job_started(&self, candidate: &CandidateFile, determinate: bool) {
        self.push(Event::JobStarted(candidate.relative_path.clone(), determinate));
    }

    fn job_progress(&self, candidate: &CandidateFile, update: ProgressUpdate) {
        self.push(Event::Progress(candidate.relative_path.clone(), update));
    }

    fn job_finished(&self, result: &JobResult) {
        self.push(Event::JobFinished(
            result.candidate.relative_path.clone(),
            result.outcome.is_success(),
        ));
    }

    fn batch_progress(&self, completed: usize, total: usize) {
        self.push(Event::BatchProgress(completed, total));
    }

    fn batch_finished(&self, summary: &BatchSummary) {
        self.push(Event::BatchFinished(summary.total));
    }
}
