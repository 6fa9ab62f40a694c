//! Hardware encoder detection and default encoder selection.
//!
//! The host is classified once per batch into one of three classes, in
//! priority order: an NVIDIA GPU (NVENC), an AMD GPU (AMF), or software
//! encoding. Each class maps to a default HEVC encoder and preset that the
//! conversion jobs use unless the configuration overrides them.

use log::{debug, info};
use std::fmt;
use std::process::{Command, Stdio};

/// Coarse classification of the available encoding acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareClass {
    /// NVIDIA GPU reachable through `nvidia-smi` (first priority).
    Nvidia,
    /// AMD / Radeon GPU listed by `lspci` (second priority).
    Amd,
    /// No accelerator found; encode on the CPU.
    Software,
}

impl HardwareClass {
    /// Default ffmpeg encoder for this class.
    #[must_use]
    pub const fn default_encoder(self) -> &'static str {
        match self {
            Self::Nvidia => "hevc_nvenc",
            Self::Amd => "hevc_amf",
            Self::Software => "libx265",
        }
    }

    /// Default encoder preset for this class.
    #[must_use]
    pub const fn default_preset(self) -> &'static str {
        match self {
            Self::Nvidia | Self::Amd => "slow",
            Self::Software => "veryslow",
        }
    }
}

impl fmt::Display for HardwareClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nvidia => write!(f, "NVIDIA"),
            Self::Amd => write!(f, "AMD"),
            Self::Software => write!(f, "CPU"),
        }
    }
}

/// Hardware classification plus the encoder defaults derived from it.
///
/// Resolved once per batch and shared read-only with every job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareProfile {
    pub class: HardwareClass,
    pub default_encoder: String,
    pub default_preset: String,
}

impl HardwareProfile {
    /// Builds the profile for a known hardware class.
    #[must_use]
    pub fn for_class(class: HardwareClass) -> Self {
        Self {
            class,
            default_encoder: class.default_encoder().to_string(),
            default_preset: class.default_preset().to_string(),
        }
    }

    /// Logs the detected hardware and encoder defaults.
    pub fn log_capabilities(&self) {
        info!(
            "Using {} for processing (encoder: {}, preset: {})",
            self.class, self.default_encoder, self.default_preset
        );
    }
}

/// Host capability probes used by [`resolve_with`].
///
/// Implementations must treat every probe error as "not present".
pub trait HardwareProbe {
    fn has_nvidia_gpu(&self) -> bool;
    fn has_amd_gpu(&self) -> bool;
}

/// Probes the host by running `nvidia-smi -L` and `lspci`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl HardwareProbe for SystemProbe {
    fn has_nvidia_gpu(&self) -> bool {
        command_output_contains("nvidia-smi", &["-L"], &["GPU"])
    }

    fn has_amd_gpu(&self) -> bool {
        command_output_contains("lspci", &[], &["AMD", "Radeon"])
    }
}

/// Runs `program` and reports whether it succeeded with any of `needles` in its stdout.
fn command_output_contains(program: &str, args: &[&str], needles: &[&str]) -> bool {
    match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
    {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            needles.iter().any(|needle| stdout.contains(needle))
        }
        Ok(output) => {
            debug!("Hardware probe '{program}' exited with {}", output.status);
            false
        }
        Err(e) => {
            debug!("Hardware probe '{program}' unavailable: {e}");
            false
        }
    }
}

/// Resolves the hardware profile of the current host.
#[must_use]
pub fn resolve() -> HardwareProfile {
    resolve_with(&SystemProbe)
}

/// Resolves the hardware profile using the given probe. The first match wins.
#[must_use]
pub fn resolve_with<P: HardwareProbe + ?Sized>(probe: &P) -> HardwareProfile {
    let class = if probe.has_nvidia_gpu() {
        HardwareClass::Nvidia
    } else if probe.has_amd_gpu() {
        HardwareClass::Amd
    } else {
        HardwareClass::Software
    };
    HardwareProfile::for_class(class)
}
