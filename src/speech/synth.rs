//! Speech synthesizer abstraction
//!
//! Provides a unified interface over the platform speech engines. Every
//! backend renders text straight into an uncompressed WAV file; playback is
//! left to whoever fetches the file.

use crate::platform::Platform;
use crate::{Result, VoicecraftError};
use log::info;
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;

/// An installed engine voice, as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendVoice {
    /// Position in the backend's voice list
    #[serde(rename = "id")]
    pub index: usize,

    /// Display name reported by the engine
    pub name: String,

    /// Engine-specific handle used to select the voice
    #[serde(skip)]
    pub identifier: String,
}

/// Engine parameters for a single rendering
#[derive(Debug, Clone, PartialEq)]
pub struct SynthSettings {
    /// Speaking rate in words per minute
    pub rate_wpm: u32,

    /// Output gain, 0.0 to 1.0
    pub volume: f32,

    /// Engine pitch on a 0-99 scale
    pub pitch: u8,

    /// Voice to use; `None` selects the engine default
    pub voice_index: Option<usize>,
}

/// Speech synthesizer trait
///
/// All backends implement this to turn text into a WAV file.
pub trait Synth: Send {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// List the voices installed in the engine
    fn voices(&mut self) -> Result<Vec<BackendVoice>>;

    /// Render `text` into a WAV file at `path`, replacing its contents
    fn synthesize_to_file(
        &mut self,
        text: &str,
        settings: &SynthSettings,
        path: &Path,
    ) -> Result<()>;
}

/// Which backend to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Pick the best backend for the running platform
    Auto,
    /// espeak-ng subprocess
    Espeak,
    /// Windows SAPI through PowerShell
    Sapi,
}

impl FromStr for BackendKind {
    type Err = VoicecraftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(BackendKind::Auto),
            "espeak" | "espeak-ng" => Ok(BackendKind::Espeak),
            "sapi" | "windows" => Ok(BackendKind::Sapi),
            other => Err(VoicecraftError::Config(format!(
                "Unknown synthesis backend '{}' (expected auto, espeak or sapi)",
                other
            ))),
        }
    }
}

/// Create a speech synthesizer
///
/// With [`BackendKind::Auto`] the environment decides:
///
/// **WSL:**
/// 1. espeak-ng inside the Linux distribution
/// 2. Windows SAPI via PowerShell (if espeak-ng not installed)
///
/// **Windows:** SAPI
///
/// **Linux, macOS and others:** espeak-ng
pub fn create_synth(kind: BackendKind, espeak_path: Option<&str>) -> Result<Box<dyn Synth>> {
    use super::backends::espeak::EspeakSynth;
    use super::backends::sapi::SapiSynth;

    match kind {
        BackendKind::Espeak => return Ok(Box::new(EspeakSynth::new(espeak_path)?)),
        BackendKind::Sapi => return Ok(Box::new(SapiSynth::new()?)),
        BackendKind::Auto => {}
    }

    let platform = Platform::detect();

    if platform == Platform::Windows {
        info!("Detected Windows, using SAPI backend");
        return Ok(Box::new(SapiSynth::new()?));
    }

    info!("Trying espeak-ng backend on {:?}...", platform);
    let espeak_err = match EspeakSynth::new(espeak_path) {
        Ok(synth) => {
            info!("✓ Successfully initialized espeak-ng backend");
            return Ok(Box::new(synth));
        }
        Err(e) => {
            info!("✗ espeak-ng backend unavailable: {}", e);
            e
        }
    };

    if !platform.has_sapi() {
        return Err(VoicecraftError::BackendUnavailable(format!(
            "Failed to initialize speech backend for {:?}: {}",
            platform, espeak_err
        )));
    }

    info!("Trying Windows SAPI backend...");
    match SapiSynth::new() {
        Ok(synth) => {
            info!("✓ Successfully initialized Windows SAPI backend");
            Ok(Box::new(synth))
        }
        Err(e) => Err(VoicecraftError::BackendUnavailable(format!(
            "No speech backend available on WSL. Tried:\n\
             1. espeak-ng (install: sudo apt install espeak-ng)\n\
             2. Windows SAPI (PowerShell not available)\n\
             Error: {}",
            e
        ))),
    }
}
