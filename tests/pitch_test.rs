//! Pitch transform tests
//!
//! The transform only changes the declared sample rate; the frames must
//! come out byte for byte as they went in.

mod common;

use common::{data_chunk, declared_rates, write_tone, write_wav};
use std::fs;
use voicecraft::audio::{apply_pitch, AudioArtifact, PcmFormat};
use voicecraft::VoicecraftError;

#[test]
fn test_neutral_pitch_leaves_file_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("speech.wav");
    write_tone(&path, 22050, 2205);
    let before = fs::read(&path).unwrap();

    let artifact = AudioArtifact::inspect(&path).unwrap();
    let result = apply_pitch(artifact.clone(), 1.0).unwrap();

    assert_eq!(result, artifact);
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_half_pitch_halves_declared_rate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("speech.wav");
    write_tone(&path, 22050, 2205);
    let before = fs::read(&path).unwrap();

    let artifact = AudioArtifact::inspect(&path).unwrap();
    let result = apply_pitch(artifact, 0.5).unwrap();
    assert_eq!(result.sample_rate, 11025);
    assert_eq!(result.frame_count, 2205);

    let after = fs::read(&path).unwrap();
    assert_eq!(data_chunk(&after), data_chunk(&before));
    // Mono 16-bit: two bytes per frame
    assert_eq!(declared_rates(&after), (11025, 22050));

    let reread = AudioArtifact::inspect(&path).unwrap();
    assert_eq!(reread, result);
}

#[test]
fn test_declared_rate_is_rounded_product() {
    let dir = tempfile::tempdir().unwrap();

    for (i, &factor) in [0.5, 0.75, 0.9, 1.25, 1.5, 1.75, 2.0].iter().enumerate() {
        let path = dir.path().join(format!("speech-{}.wav", i));
        write_tone(&path, 22050, 1000);
        let frames_before = data_chunk(&fs::read(&path).unwrap());

        let artifact = AudioArtifact::inspect(&path).unwrap();
        let result = apply_pitch(artifact, factor).unwrap();

        let expected = (22050.0 * factor as f64).round() as u32;
        assert_eq!(result.sample_rate, expected, "factor {}", factor);
        assert_eq!(AudioArtifact::inspect(&path).unwrap().sample_rate, expected);
        assert_eq!(data_chunk(&fs::read(&path).unwrap()), frames_before, "factor {}", factor);
    }
}

#[test]
fn test_raised_pitch_keeps_channel_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    write_wav(&path, spec, 800);
    let before = fs::read(&path).unwrap();

    let result = apply_pitch(AudioArtifact::inspect(&path).unwrap(), 1.5).unwrap();
    assert_eq!(result.sample_rate, 24000);
    assert_eq!(result.channels, 2);
    assert_eq!(result.sample_width, 2);
    assert_eq!(result.frame_count, 800);

    let after = fs::read(&path).unwrap();
    assert_eq!(data_chunk(&after), data_chunk(&before));
    assert_eq!(declared_rates(&after), (24000, 24000 * 4));
}

#[test]
fn test_float_samples_survive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("float.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 24000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    write_wav(&path, spec, 500);
    let samples_before: Vec<f32> = hound::WavReader::open(&path)
        .unwrap()
        .samples::<f32>()
        .map(|s| s.unwrap())
        .collect();

    let result = apply_pitch(AudioArtifact::inspect(&path).unwrap(), 0.8).unwrap();
    assert_eq!(result.format, PcmFormat::Float);
    assert_eq!(result.sample_rate, 19200);

    let mut reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().sample_rate, 19200);
    let samples_after: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
    assert_eq!(samples_after, samples_before);
}

#[test]
fn test_eight_bit_samples_survive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("u8.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 8,
        sample_format: hound::SampleFormat::Int,
    };
    write_wav(&path, spec, 400);
    let before = fs::read(&path).unwrap();

    let result = apply_pitch(AudioArtifact::inspect(&path).unwrap(), 2.0).unwrap();
    assert_eq!(result.sample_rate, 16000);
    assert_eq!(result.sample_width, 1);
    assert_eq!(data_chunk(&fs::read(&path).unwrap()), data_chunk(&before));
}

#[test]
fn test_unreadable_header_fails_and_leaves_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.wav");
    fs::write(&path, b"RIFF\x10\x00\x00\x00WAVEjunkjunk").unwrap();

    let artifact = AudioArtifact {
        path: path.clone(),
        format: PcmFormat::Int,
        sample_rate: 22050,
        channels: 1,
        sample_width: 2,
        frame_count: 4,
    };
    let err = apply_pitch(artifact, 1.5).unwrap_err();
    assert!(matches!(err, VoicecraftError::TransformFailed(_)));

    // The failed rewrite must not truncate or replace the file
    assert_eq!(fs::read(&path).unwrap(), b"RIFF\x10\x00\x00\x00WAVEjunkjunk");
    // No staging files left behind
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}
