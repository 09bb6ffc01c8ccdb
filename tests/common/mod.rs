//! Shared helpers for integration tests
//!
//! `ToneSynth` stands in for a platform speech engine: it writes a short
//! 16-bit mono tone and records the settings it was called with.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use voicecraft::service::SpeechService;
use voicecraft::speech::{BackendVoice, Synth, SynthFactory, SynthSettings, SynthesisAdapter};
use voicecraft::{Result, VoicecraftError};

/// Native rate of the tone engine
pub const TONE_RATE: u32 = 22050;

/// Frames written per rendering (0.1 s)
pub const TONE_FRAMES: u32 = 2205;

/// Settings seen by the engine, in call order
pub type CallLog = Arc<Mutex<Vec<SynthSettings>>>;

#[derive(Clone)]
pub struct ToneSynth {
    pub voices: usize,
    pub frames: u32,
    pub fail: bool,
    /// Format of the rendered file
    pub spec: hound::WavSpec,
    /// Bytes cut from the end of the rendered file
    pub truncate: u64,
    pub calls: CallLog,
}

impl ToneSynth {
    pub fn new(calls: CallLog) -> Self {
        Self {
            voices: 2,
            frames: TONE_FRAMES,
            fail: false,
            spec: tone_spec(TONE_RATE),
            truncate: 0,
            calls,
        }
    }
}

impl Synth for ToneSynth {
    fn name(&self) -> &str {
        "tone"
    }

    fn voices(&mut self) -> Result<Vec<BackendVoice>> {
        Ok((0..self.voices)
            .map(|index| BackendVoice {
                index,
                name: format!("Tone {}", index),
                identifier: format!("tone-{}", index),
            })
            .collect())
    }

    fn synthesize_to_file(
        &mut self,
        _text: &str,
        settings: &SynthSettings,
        path: &Path,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(settings.clone());

        if self.fail {
            // Leave a half-written file behind, like a crashing engine would
            std::fs::write(path, b"RIFF")?;
            return Err(VoicecraftError::SynthesisFailed("tone engine crashed".into()));
        }

        write_wav(path, self.spec, self.frames);
        if self.truncate > 0 {
            let file = std::fs::OpenOptions::new().write(true).open(path)?;
            let len = file.metadata()?.len();
            file.set_len(len.saturating_sub(self.truncate))?;
        }
        Ok(())
    }
}

/// 16-bit mono at `sample_rate`
pub fn tone_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Write a 16-bit mono tone WAV
pub fn write_tone(path: &Path, sample_rate: u32, frames: u32) {
    write_wav(path, tone_spec(sample_rate), frames);
}

/// Write a WAV with a deterministic sawtooth in every channel
pub fn write_wav(path: &Path, spec: hound::WavSpec, frames: u32) {
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames * spec.channels as u32 {
        let step = (i % 200) as i32 - 100;
        match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Float, _) => writer.write_sample(step as f32 / 200.0).unwrap(),
            (hound::SampleFormat::Int, 8) => writer.write_sample(step as i8).unwrap(),
            (hound::SampleFormat::Int, 16) => writer.write_sample(step as i16 * 150).unwrap(),
            (hound::SampleFormat::Int, _) => writer.write_sample(step * 40_000).unwrap(),
        }
    }
    writer.finalize().unwrap();
}

/// Raw bytes of the `data` chunk of a WAV file
pub fn data_chunk(bytes: &[u8]) -> Vec<u8> {
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");

    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = u32::from_le_bytes([
            bytes[pos + 4],
            bytes[pos + 5],
            bytes[pos + 6],
            bytes[pos + 7],
        ]) as usize;
        let body = pos + 8;
        if id == b"data" {
            return bytes[body..body + size].to_vec();
        }
        pos = body + size + (size & 1);
    }
    panic!("no data chunk");
}

/// Sample rate and byte rate from a canonical fmt chunk
pub fn declared_rates(bytes: &[u8]) -> (u32, u32) {
    assert_eq!(&bytes[12..16], b"fmt ");
    let rate = u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]);
    let byte_rate = u32::from_le_bytes([bytes[28], bytes[29], bytes[30], bytes[31]]);
    (rate, byte_rate)
}

/// Service backed by a tone engine writing into `dir`
pub fn tone_service(dir: &Path) -> (SpeechService, CallLog) {
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let synth = ToneSynth::new(calls.clone());
    (service_with(dir, synth), calls)
}

/// Service backed by the given engine template
pub fn service_with(dir: &Path, synth: ToneSynth) -> SpeechService {
    let factory: SynthFactory = Box::new(move || Ok(Box::new(synth.clone()) as Box<dyn Synth>));
    SpeechService::new(SynthesisAdapter::new(factory, dir), 1000)
}

/// Service whose engine never starts
pub fn unavailable_service(dir: &Path) -> SpeechService {
    let factory: SynthFactory =
        Box::new(|| Err(VoicecraftError::BackendUnavailable("no engine installed".into())));
    SpeechService::new(SynthesisAdapter::new(factory, dir), 1000)
}
