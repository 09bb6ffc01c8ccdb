//! Synthesis backend adapter
//!
//! Owns the single shared speech engine, initializes it lazily, and turns a
//! text plus a voice persona into a fresh WAV artifact on disk.
//!
//! The engine is guarded by one mutex. Configuring it, rendering, and
//! reading back the result happen under the same lock, so concurrent
//! requests can never see each other's voice or rate.

use crate::audio::AudioArtifact;
use crate::speech::{BackendVoice, Synth, SynthSettings};
use crate::voices::VoiceProfile;
use crate::{Result, VoicecraftError};
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, TryLockError};

/// Output gain applied to every rendering
pub const SYNTH_VOLUME: f32 = 0.9;

/// Builds a speech engine on demand
pub type SynthFactory = Box<dyn Fn() -> Result<Box<dyn Synth>> + Send + Sync>;

/// Engine speaking rate for a persona at a given speed factor
pub fn effective_rate(base_rate: u32, speed_factor: f64) -> u32 {
    (base_rate as f64 * speed_factor).round().max(1.0) as u32
}

/// Lazily initialized speech engine plus the directory artifacts go to
pub struct SynthesisAdapter {
    factory: SynthFactory,

    /// `None` until an initialization attempt succeeds
    backend: Mutex<Option<Box<dyn Synth>>>,

    /// Last voice list the engine reported; readable while it renders
    voices: Mutex<Option<Vec<BackendVoice>>>,

    /// Directory receiving generated WAV files
    artifact_dir: PathBuf,
}

impl SynthesisAdapter {
    /// Create an adapter; no engine is started until first use
    pub fn new(factory: SynthFactory, artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            factory,
            backend: Mutex::new(None),
            voices: Mutex::new(None),
            artifact_dir: artifact_dir.into(),
        }
    }

    /// Directory receiving generated WAV files
    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn Synth>>> {
        self.backend
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` against the engine, starting it first if needed
    ///
    /// A failed start is not remembered as a permanent failure: the next
    /// call tries again. A running engine is never restarted.
    fn with_backend<T>(&self, f: impl FnOnce(&mut dyn Synth) -> Result<T>) -> Result<T> {
        let mut guard = self.lock();

        if guard.is_none() {
            debug!("Initializing speech backend");
            match (self.factory)() {
                Ok(synth) => {
                    info!("Speech backend '{}' ready", synth.name());
                    *guard = Some(synth);
                }
                Err(e) => {
                    error!("Error initializing speech backend: {}", e);
                    return Err(VoicecraftError::BackendUnavailable(e.to_string()));
                }
            }
        }

        match guard.as_deref_mut() {
            Some(synth) => f(synth),
            None => Err(VoicecraftError::BackendUnavailable(
                "speech backend not initialized".to_string(),
            )),
        }
    }

    /// Whether the engine is running or can be started now
    ///
    /// A busy engine is running, so this never waits for a rendering to
    /// finish.
    pub fn is_available(&self) -> bool {
        match self.backend.try_lock() {
            Ok(guard) if guard.is_some() => return true,
            Err(TryLockError::WouldBlock) => return true,
            Err(TryLockError::Poisoned(poisoned)) if poisoned.get_ref().is_some() => return true,
            _ => {}
        }
        self.with_backend(|_| Ok(())).is_ok()
    }

    /// Whether the engine has already been started
    pub fn is_initialized(&self) -> bool {
        self.lock().is_some()
    }

    /// Voices installed in the engine
    ///
    /// Served from the last successful listing when there is one, so a
    /// rendering in progress does not hold it up.
    pub fn backend_voices(&self) -> Result<Vec<BackendVoice>> {
        if let Some(voices) = self.cached_voices() {
            return Ok(voices);
        }
        self.with_backend(|synth| self.list_voices(synth))
    }

    fn cached_voices(&self) -> Option<Vec<BackendVoice>> {
        self.voices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Ask the engine for its voices and remember a successful answer
    fn list_voices(&self, synth: &mut dyn Synth) -> Result<Vec<BackendVoice>> {
        let voices = synth.voices()?;
        *self
            .voices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(voices.clone());
        Ok(voices)
    }

    /// Render `text` with a persona into a brand new artifact
    ///
    /// Speed is applied here and only here, as the engine's speaking rate.
    /// On any failure the partially written file is removed before
    /// returning.
    pub fn synthesize(
        &self,
        text: &str,
        profile: &VoiceProfile,
        speed_factor: f64,
    ) -> Result<AudioArtifact> {
        if text.trim().is_empty() {
            return Err(VoicecraftError::SynthesisFailed(
                "nothing to synthesize".to_string(),
            ));
        }

        fs::create_dir_all(&self.artifact_dir).map_err(|e| {
            error!(
                "Cannot create artifact directory {}: {}",
                self.artifact_dir.display(),
                e
            );
            VoicecraftError::SynthesisFailed(format!("artifact directory unavailable: {}", e))
        })?;

        // Deleted on drop unless kept below
        let staged = tempfile::Builder::new()
            .prefix("speech-")
            .suffix(".wav")
            .tempfile_in(&self.artifact_dir)
            .map_err(|e| VoicecraftError::SynthesisFailed(format!("cannot create file: {}", e)))?
            .into_temp_path();

        let rate_wpm = effective_rate(profile.base_rate, speed_factor);

        let artifact = self.with_backend(|synth| {
            let voice_index = self.guard_voice_index(synth, profile.backend_voice_index);
            let settings = SynthSettings {
                rate_wpm,
                volume: SYNTH_VOLUME,
                pitch: profile.base_pitch,
                voice_index,
            };
            debug!(
                "Synthesizing {} chars with '{}' via {}: {:?}",
                text.chars().count(),
                profile.id,
                synth.name(),
                settings
            );

            synth.synthesize_to_file(text, &settings, &staged)?;

            AudioArtifact::inspect(&staged).map_err(|e| {
                VoicecraftError::SynthesisFailed(format!("engine output unreadable: {}", e))
            })
        })?;

        if artifact.frame_count == 0 {
            warn!("Engine produced no audio for '{}'", profile.id);
            return Err(VoicecraftError::SynthesisFailed(
                "engine produced no audio".to_string(),
            ));
        }

        let path = staged
            .keep()
            .map_err(|e| VoicecraftError::SynthesisFailed(format!("cannot keep artifact: {}", e)))?;

        Ok(AudioArtifact { path, ..artifact })
    }

    /// Map a persona's voice index onto the engine's installed voices
    ///
    /// Out of range or unlistable indices select the engine default.
    fn guard_voice_index(&self, synth: &mut dyn Synth, index: usize) -> Option<usize> {
        match self.list_voices(synth) {
            Ok(voices) if index < voices.len() => Some(index),
            Ok(voices) => {
                warn!(
                    "Voice index {} out of range (have {} voices), using engine default",
                    index,
                    voices.len()
                );
                None
            }
            Err(e) => {
                warn!("Could not list engine voices, using engine default: {}", e);
                None
            }
        }
    }
}
