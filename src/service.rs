//! The speech service
//!
//! Ties the voice registry, the synthesis adapter, the pitch transform and
//! the artifact tracker together. One instance is shared by every request
//! handler and by the periodic sweeper.

use crate::artifacts::{ArtifactTracker, SweepReport};
use crate::audio::{apply_pitch, AudioArtifact};
use crate::speech::{create_synth, BackendVoice, SynthFactory, SynthesisAdapter};
use crate::state::config::Config;
use crate::voices::{self, VoiceOption, DEFAULT_VOICE_ID};
use crate::{Result, VoicecraftError};
use log::{debug, warn};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Lowest accepted speed or pitch factor
pub const MIN_FACTOR: f64 = 0.5;
/// Highest accepted speed or pitch factor
pub const MAX_FACTOR: f64 = 2.0;

/// A validated synthesis request
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    /// Trimmed, non-empty text
    pub text: String,
    /// A known voice id
    pub voice_id: String,
    /// Within [MIN_FACTOR, MAX_FACTOR]
    pub speed_factor: f64,
    /// Within [MIN_FACTOR, MAX_FACTOR]
    pub pitch_factor: f64,
}

impl SynthesisRequest {
    /// Validate and normalize caller input
    ///
    /// Text is trimmed and must be non-empty and at most `max_len`
    /// characters. Unknown or missing voices become the default voice.
    /// Factors are clamped; non-finite factors become 1.0.
    pub fn new(
        text: &str,
        voice_id: Option<&str>,
        speed_factor: f64,
        pitch_factor: f64,
        max_len: usize,
    ) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VoicecraftError::Validation("Text cannot be empty".to_string()));
        }
        if text.chars().count() > max_len {
            return Err(VoicecraftError::Validation(format!(
                "Text too long (max {} characters)",
                max_len
            )));
        }

        let voice_id = match voice_id {
            Some(id) if voices::is_known(id) => id,
            Some(id) => {
                debug!("Unknown voice '{}', using {}", id, DEFAULT_VOICE_ID);
                DEFAULT_VOICE_ID
            }
            None => DEFAULT_VOICE_ID,
        };

        Ok(Self {
            text: text.to_string(),
            voice_id: voice_id.to_string(),
            speed_factor: clamp_factor(speed_factor),
            pitch_factor: clamp_factor(pitch_factor),
        })
    }
}

/// Clamp a speed or pitch factor into the accepted range
pub fn clamp_factor(factor: f64) -> f64 {
    if !factor.is_finite() {
        return 1.0;
    }
    factor.clamp(MIN_FACTOR, MAX_FACTOR)
}

/// Voices available to clients
#[derive(Debug, Clone, Serialize)]
pub struct VoiceListing {
    /// Engine voices; empty when the engine cannot start
    pub voices: Vec<BackendVoice>,
    /// Personas, in display order
    pub voice_options: Vec<VoiceOption>,
}

/// Text-to-speech service shared across request handlers
pub struct SpeechService {
    adapter: SynthesisAdapter,
    tracker: Arc<ArtifactTracker>,
    max_text_length: usize,
}

impl SpeechService {
    pub fn new(adapter: SynthesisAdapter, max_text_length: usize) -> Self {
        Self {
            adapter,
            tracker: Arc::new(ArtifactTracker::new()),
            max_text_length,
        }
    }

    /// Build the service described by `config`
    ///
    /// The engine itself is not started until first use.
    pub fn from_config(config: &Config) -> Result<Self> {
        let kind = config.backend()?;
        let espeak_path = config.espeak_path();
        let factory: SynthFactory = Box::new(move || create_synth(kind, espeak_path.as_deref()));

        Ok(Self::new(
            SynthesisAdapter::new(factory, config.artifact_dir()),
            config.max_text_length(),
        ))
    }

    /// Longest accepted request text, in characters
    pub fn max_text_length(&self) -> usize {
        self.max_text_length
    }

    /// The tracked set of generated artifacts
    pub fn tracker(&self) -> Arc<ArtifactTracker> {
        self.tracker.clone()
    }

    /// Personas plus whatever voices the engine reports
    pub fn list_voices(&self) -> VoiceListing {
        let voices = self.adapter.backend_voices().unwrap_or_else(|e| {
            warn!("Engine voices unavailable: {}", e);
            Vec::new()
        });

        VoiceListing {
            voices,
            voice_options: voices::options(),
        }
    }

    /// Synthesize a request into a tracked artifact
    ///
    /// Blocks until the engine finishes. A failed pitch rewrite discards the
    /// artifact and reports `TransformFailed`.
    pub fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioArtifact> {
        let artifact = self.render(request)?;
        self.tracker.register(&artifact.path);
        Ok(artifact)
    }

    /// Synthesize a request and return the WAV bytes
    ///
    /// The file is read before it is registered, so a sweep can never take
    /// it away from a request that already succeeded.
    pub fn synthesize_wav(&self, request: &SynthesisRequest) -> Result<(AudioArtifact, Vec<u8>)> {
        let artifact = self.render(request)?;
        let audio = match fs::read(&artifact.path) {
            Ok(audio) => audio,
            Err(e) => {
                discard(&artifact.path);
                return Err(e.into());
            }
        };
        self.tracker.register(&artifact.path);
        Ok((artifact, audio))
    }

    /// Produce an untracked artifact with speed and pitch applied
    fn render(&self, request: &SynthesisRequest) -> Result<AudioArtifact> {
        let profile = voices::resolve(&request.voice_id);
        let artifact = self
            .adapter
            .synthesize(&request.text, profile, request.speed_factor)?;
        let path = artifact.path.clone();

        apply_pitch(artifact, request.pitch_factor).map_err(|e| {
            discard(&path);
            e
        })
    }

    /// Whether the engine is running or can be started now
    pub fn health_check(&self) -> bool {
        self.adapter.is_available()
    }

    /// Run a sweep immediately
    pub fn cleanup_now(&self) -> SweepReport {
        self.tracker.reclaim_all()
    }
}

/// Remove an artifact that will never be handed out
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("Could not discard {}: {}", path.display(), e);
    }
}
