//! Windows TTS backend using SAPI (System.Speech.Synthesis)
//!
//! Works on Windows and on WSL with Windows interop enabled. Each rendering
//! runs a short PowerShell script that points the synthesizer at a WAV file
//! (`SetOutputToWaveFile`). Parameters travel through environment variables
//! and the text through stdin, so nothing has to be quoted into the script.

use crate::platform::is_wsl;
use crate::speech::{BackendVoice, Synth, SynthSettings};
use crate::{Result, VoicecraftError};
use log::{debug, error};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Renders stdin text into $env:VOICECRAFT_OUT
const RENDER_SCRIPT: &str = r#"
Add-Type -AssemblyName System.Speech
$synth = New-Object System.Speech.Synthesis.SpeechSynthesizer
$synth.Rate = [int]$env:VOICECRAFT_RATE
$synth.Volume = [int]$env:VOICECRAFT_VOLUME
$idx = [int]$env:VOICECRAFT_VOICE
$voices = $synth.GetInstalledVoices()
if ($idx -ge 0 -and $idx -lt $voices.Count) {
    $synth.SelectVoice($voices[$idx].VoiceInfo.Name)
}
$text = [Console]::In.ReadToEnd()
$synth.SetOutputToWaveFile($env:VOICECRAFT_OUT)
$synth.Speak($text)
$synth.SetOutputToNull()
$synth.Dispose()
"#;

/// Prints one installed voice name per line
const VOICES_SCRIPT: &str = r#"
Add-Type -AssemblyName System.Speech
$synth = New-Object System.Speech.Synthesis.SpeechSynthesizer
$synth.GetInstalledVoices() | ForEach-Object { $_.VoiceInfo.Name }
"#;

/// Windows SAPI backend
pub struct SapiSynth {
    /// Path to powershell.exe
    powershell_path: String,

    /// Installed voices, queried once
    voices: Option<Vec<BackendVoice>>,
}

impl SapiSynth {
    /// Create a new Windows SAPI synthesizer
    ///
    /// Verifies PowerShell is reachable and System.Speech loads
    pub fn new() -> Result<Self> {
        debug!("Creating Windows SAPI backend");

        let powershell_path = Self::find_powershell()?;
        debug!("Found PowerShell at: {}", powershell_path);

        Self::test_sapi(&powershell_path)?;

        Ok(Self {
            powershell_path,
            voices: None,
        })
    }

    /// Find PowerShell executable (native or through WSL interop)
    fn find_powershell() -> Result<String> {
        let paths = vec![
            "powershell.exe",
            "/mnt/c/Windows/System32/WindowsPowerShell/v1.0/powershell.exe",
        ];

        for path in paths {
            if let Ok(output) = Command::new(path)
                .arg("-Command")
                .arg("$PSVersionTable.PSVersion")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                if output.success() {
                    return Ok(path.to_string());
                }
            }
        }

        Err(VoicecraftError::BackendUnavailable(
            "PowerShell not found. WSL interop may not be enabled.".to_string(),
        ))
    }

    /// Test that Windows SAPI is available
    fn test_sapi(powershell_path: &str) -> Result<()> {
        let output = Command::new(powershell_path)
            .arg("-NoProfile")
            .arg("-NonInteractive")
            .arg("-Command")
            .arg("Add-Type -AssemblyName System.Speech")
            .output()
            .map_err(|e| {
                VoicecraftError::BackendUnavailable(format!("Failed to test SAPI: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoicecraftError::BackendUnavailable(format!(
                "Windows SAPI not available: {}",
                stderr
            )));
        }

        debug!("Windows SAPI test successful");
        Ok(())
    }

    /// Convert words per minute to the SAPI -10..10 rate scale
    ///
    /// SAPI rate 0 speaks at roughly 180 wpm; each step is about 20 wpm.
    fn wpm_to_sapi_rate(wpm: u32) -> i32 {
        let steps = (wpm as f64 - 180.0) / 20.0;
        (steps.round() as i32).clamp(-10, 10)
    }

    /// Convert a 0.0-1.0 gain to SAPI volume (0-100)
    fn volume_to_sapi(volume: f32) -> u8 {
        (volume.clamp(0.0, 1.0) * 100.0).round() as u8
    }

    /// Path as seen by the Windows side
    ///
    /// Under WSL, Linux paths are translated with `wslpath -w`.
    fn windows_path(path: &Path) -> Result<String> {
        if !is_wsl() {
            return Ok(path.to_string_lossy().into_owned());
        }

        let output = Command::new("wslpath")
            .arg("-w")
            .arg(path)
            .output()
            .map_err(|e| VoicecraftError::SynthesisFailed(format!("wslpath failed: {}", e)))?;

        if !output.status.success() {
            return Err(VoicecraftError::SynthesisFailed(format!(
                "wslpath could not translate {}",
                path.display()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Turn the voice query's result into a voice list
    ///
    /// A failed query is an error, never an empty list.
    fn voices_from_query(success: bool, stdout: &[u8], stderr: &[u8]) -> Result<Vec<BackendVoice>> {
        if !success {
            let stderr = String::from_utf8_lossy(stderr);
            return Err(VoicecraftError::Other(format!(
                "SAPI voice query failed: {}",
                stderr.trim()
            )));
        }
        Ok(Self::parse_voice_names(&String::from_utf8_lossy(stdout)))
    }

    fn parse_voice_names(stdout: &str) -> Vec<BackendVoice> {
        stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(index, name)| BackendVoice {
                index,
                name: name.to_string(),
                identifier: name.to_string(),
            })
            .collect()
    }
}

impl Synth for SapiSynth {
    fn name(&self) -> &str {
        "windows-sapi"
    }

    fn voices(&mut self) -> Result<Vec<BackendVoice>> {
        if let Some(ref voices) = self.voices {
            return Ok(voices.clone());
        }

        let output = Command::new(&self.powershell_path)
            .arg("-NoProfile")
            .arg("-NonInteractive")
            .arg("-Command")
            .arg(VOICES_SCRIPT)
            .output()
            .map_err(|e| {
                VoicecraftError::Other(format!("Failed to list SAPI voices: {}", e))
            })?;

        let voices =
            Self::voices_from_query(output.status.success(), &output.stdout, &output.stderr)?;
        debug!("SAPI reports {} voices", voices.len());
        self.voices = Some(voices.clone());
        Ok(voices)
    }

    fn synthesize_to_file(
        &mut self,
        text: &str,
        settings: &SynthSettings,
        path: &Path,
    ) -> Result<()> {
        let out = Self::windows_path(path)?;
        let voice = settings
            .voice_index
            .map(|i| i.to_string())
            .unwrap_or_else(|| "-1".to_string());
        debug!(
            "SAPI render: rate={} volume={} voice={} out={}",
            settings.rate_wpm, settings.volume, voice, out
        );

        let mut command = Command::new(&self.powershell_path);
        command
            .arg("-NoProfile")
            .arg("-NonInteractive")
            .arg("-Command")
            .arg(RENDER_SCRIPT)
            .env("VOICECRAFT_RATE", Self::wpm_to_sapi_rate(settings.rate_wpm).to_string())
            .env("VOICECRAFT_VOLUME", Self::volume_to_sapi(settings.volume).to_string())
            .env("VOICECRAFT_VOICE", voice)
            .env("VOICECRAFT_OUT", &out)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // Environment variables only cross the WSL boundary when listed in WSLENV
        if is_wsl() {
            command.env(
                "WSLENV",
                "VOICECRAFT_RATE:VOICECRAFT_VOLUME:VOICECRAFT_VOICE:VOICECRAFT_OUT",
            );
        }

        let mut child = command.spawn().map_err(|e| {
            error!("Failed to spawn PowerShell: {}", e);
            VoicecraftError::SynthesisFailed(format!("Failed to start PowerShell: {}", e))
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).map_err(|e| {
                VoicecraftError::SynthesisFailed(format!("Failed to send text to SAPI: {}", e))
            })?;
        }

        let output = child.wait_with_output().map_err(|e| {
            VoicecraftError::SynthesisFailed(format!("Failed to wait for PowerShell: {}", e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("SAPI rendering failed: {}", stderr.trim());
            return Err(VoicecraftError::SynthesisFailed(format!(
                "PowerShell exited with {}",
                output.status
            )));
        }

        Ok(())
    }
}
