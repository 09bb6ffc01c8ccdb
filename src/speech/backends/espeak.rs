//! espeak-ng backend
//!
//! Runs espeak-ng as a subprocess per rendering and lets it write the WAV
//! file itself (`-w`). Text is fed through stdin so it never has to survive
//! shell quoting or argument length limits.
//!
//! Dependencies:
//! - espeak-ng (install with: sudo apt install espeak-ng)

use crate::speech::{BackendVoice, Synth, SynthSettings};
use crate::{Result, VoicecraftError};
use log::{debug, error};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Voice used when no valid index is requested
const DEFAULT_VOICE: &str = "en";

/// Voices exposed by this backend, in index order
///
/// espeak-ng variants (`+f3`, `+m3`) give distinct female and male timbres
/// on top of the same language rules.
const VOICES: &[(&str, &str)] = &[
    ("en-us+f3", "English (America) Female"),  // 0
    ("en-us+m3", "English (America) Male"),    // 1
    ("en-gb+f3", "English (Britain) Female"),  // 2
    ("en-gb+m3", "English (Britain) Male"),    // 3
    ("en-gb-scotland", "English (Scotland)"),  // 4
    ("en", "English"),                         // 5
];

/// espeak-ng backend
pub struct EspeakSynth {
    /// Path to espeak-ng
    espeak_path: String,
}

impl EspeakSynth {
    /// Create a new espeak-ng synthesizer
    ///
    /// Uses `explicit_path` when given, otherwise searches the usual names.
    pub fn new(explicit_path: Option<&str>) -> Result<Self> {
        debug!("Creating espeak-ng backend");

        let espeak_path = Self::find_espeak(explicit_path)?;
        debug!("Found espeak-ng at: {}", espeak_path);

        Ok(Self { espeak_path })
    }

    /// Find a working espeak-ng executable
    fn find_espeak(explicit_path: Option<&str>) -> Result<String> {
        let paths: Vec<&str> = match explicit_path {
            Some(path) => vec![path],
            None => vec!["espeak-ng", "/usr/bin/espeak-ng", "espeak"],
        };

        for path in paths {
            if let Ok(status) = Command::new(path)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                if status.success() {
                    return Ok(path.to_string());
                }
            }
        }

        Err(VoicecraftError::BackendUnavailable(
            "espeak-ng not found. Install with: sudo apt install espeak-ng".to_string(),
        ))
    }

    /// Convert a 0.0-1.0 gain to espeak amplitude (0-200)
    fn volume_to_amplitude(volume: f32) -> u16 {
        (volume.clamp(0.0, 1.0) * 200.0).round() as u16
    }

    /// Get voice name by index
    fn get_voice_by_idx(idx: Option<usize>) -> &'static str {
        idx.and_then(|i| VOICES.get(i))
            .map(|(voice, _)| *voice)
            .unwrap_or(DEFAULT_VOICE)
    }

    /// Build the espeak-ng argument list for one rendering
    fn build_args(settings: &SynthSettings, path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            Self::get_voice_by_idx(settings.voice_index).to_string(),
            "-s".to_string(),
            settings.rate_wpm.to_string(),
            "-a".to_string(),
            Self::volume_to_amplitude(settings.volume).to_string(),
            "-p".to_string(),
            settings.pitch.min(99).to_string(),
            "-b".to_string(),
            "1".to_string(),
            "-w".to_string(),
            path.to_string_lossy().into_owned(),
            "--stdin".to_string(),
        ]
    }
}

impl Synth for EspeakSynth {
    fn name(&self) -> &str {
        "espeak-ng"
    }

    fn voices(&mut self) -> Result<Vec<BackendVoice>> {
        Ok(VOICES
            .iter()
            .enumerate()
            .map(|(index, (identifier, name))| BackendVoice {
                index,
                name: name.to_string(),
                identifier: identifier.to_string(),
            })
            .collect())
    }

    fn synthesize_to_file(
        &mut self,
        text: &str,
        settings: &SynthSettings,
        path: &Path,
    ) -> Result<()> {
        let args = Self::build_args(settings, path);
        debug!("Running {} {}", self.espeak_path, args.join(" "));

        let mut child = Command::new(&self.espeak_path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                error!("Failed to spawn espeak-ng: {}", e);
                VoicecraftError::SynthesisFailed(format!("Failed to start espeak-ng: {}", e))
            })?;

        // Dropping stdin closes the pipe so espeak-ng sees EOF
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).map_err(|e| {
                VoicecraftError::SynthesisFailed(format!(
                    "Failed to write text to espeak-ng: {}",
                    e
                ))
            })?;
        }

        let output = child.wait_with_output().map_err(|e| {
            VoicecraftError::SynthesisFailed(format!("Failed to wait for espeak-ng: {}", e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("espeak-ng exited with {}: {}", output.status, stderr.trim());
            return Err(VoicecraftError::SynthesisFailed(format!(
                "espeak-ng exited with {}",
                output.status
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_conversion() {
        assert_eq!(EspeakSynth::volume_to_amplitude(0.0), 0);
        assert_eq!(EspeakSynth::volume_to_amplitude(0.9), 180);
        assert_eq!(EspeakSynth::volume_to_amplitude(1.0), 200);
        assert_eq!(EspeakSynth::volume_to_amplitude(3.0), 200);
    }

    #[test]
    fn test_voice_selection() {
        assert_eq!(EspeakSynth::get_voice_by_idx(Some(0)), "en-us+f3");
        assert_eq!(EspeakSynth::get_voice_by_idx(Some(1)), "en-us+m3");
        assert_eq!(EspeakSynth::get_voice_by_idx(Some(999)), "en"); // Out of range defaults to en
        assert_eq!(EspeakSynth::get_voice_by_idx(None), "en");
    }

    #[test]
    fn test_build_args() {
        let settings = SynthSettings {
            rate_wpm: 160,
            volume: 0.9,
            pitch: 20,
            voice_index: Some(1),
        };
        let args = EspeakSynth::build_args(&settings, Path::new("/tmp/out.wav"));
        assert_eq!(
            args,
            vec![
                "-v", "en-us+m3", "-s", "160", "-a", "180", "-p", "20", "-b", "1", "-w",
                "/tmp/out.wav", "--stdin",
            ]
        );
    }

    #[test]
    fn test_create_espeak_synth() {
        match EspeakSynth::new(None) {
            Ok(_) => println!("✓ espeak-ng backend available"),
            Err(e) => println!("⚠ espeak-ng backend not available: {}", e),
        }
    }
}
