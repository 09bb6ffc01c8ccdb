//! Generated audio files and their post-processing

pub mod pitch;

pub use pitch::{apply_pitch, scaled_rate};

use crate::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Sample encoding inside the WAV container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PcmFormat {
    /// Signed integer PCM (unsigned for 8-bit)
    Int,
    /// IEEE float
    Float,
}

impl From<hound::SampleFormat> for PcmFormat {
    fn from(format: hound::SampleFormat) -> Self {
        match format {
            hound::SampleFormat::Int => PcmFormat::Int,
            hound::SampleFormat::Float => PcmFormat::Float,
        }
    }
}

/// One synthesized WAV file on disk
///
/// Exactly one artifact exists per synthesis call. The pitch transform
/// changes `sample_rate` only; the frame payload is never touched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub format: PcmFormat,
    /// Declared playback rate in Hz
    pub sample_rate: u32,
    pub channels: u16,
    /// Bytes per sample
    pub sample_width: u16,
    /// Samples per channel
    pub frame_count: u32,
}

impl AudioArtifact {
    /// Describe an existing WAV file
    ///
    /// Every sample is read once, so a file cut short of the frame count its
    /// header declares is rejected here rather than served.
    pub fn inspect(path: &Path) -> Result<Self> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let frame_count = reader.duration();

        match spec.sample_format {
            hound::SampleFormat::Float => {
                for sample in reader.samples::<f32>() {
                    sample?;
                }
            }
            hound::SampleFormat::Int => {
                for sample in reader.samples::<i32>() {
                    sample?;
                }
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            format: spec.sample_format.into(),
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            sample_width: (spec.bits_per_sample + 7) / 8,
            frame_count,
        })
    }

    /// Playback length at the declared rate
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fixture(path: &Path, sample_rate: u32, frames: usize) {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames * 2 {
            writer.write_sample((i % 100) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_inspect_reads_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        write_fixture(&path, 22050, 2205);

        let artifact = AudioArtifact::inspect(&path).unwrap();
        assert_eq!(artifact.path, path);
        assert_eq!(artifact.format, PcmFormat::Int);
        assert_eq!(artifact.sample_rate, 22050);
        assert_eq!(artifact.channels, 2);
        assert_eq!(artifact.sample_width, 2);
        assert_eq!(artifact.frame_count, 2205);
        assert!((artifact.duration_secs() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_inspect_rejects_truncated_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.wav");
        write_fixture(&path, 22050, 1000);

        // Header still claims 1000 frames
        let len = std::fs::metadata(&path).unwrap().len();
        let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(len - 500).unwrap();
        drop(file);

        assert!(AudioArtifact::inspect(&path).is_err());
    }

    #[test]
    fn test_inspect_rejects_non_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.wav");
        std::fs::write(&path, b"definitely not a riff file").unwrap();
        assert!(AudioArtifact::inspect(&path).is_err());
    }
}
