//! Pitch shifting by sample-rate reinterpretation
//!
//! The frames of a WAV file are kept exactly as they are and only the
//! declared sample rate changes. A player then runs through the same samples
//! faster (higher pitch, shorter) or slower (lower pitch, longer). There is
//! no resampling and no formant preservation.

use super::AudioArtifact;
use crate::{Result, VoicecraftError};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, error};
use std::io::BufWriter;
use std::path::Path;

/// Neutral pitch factor; skips all file I/O
pub const NEUTRAL_PITCH: f64 = 1.0;

/// Declared rate after scaling `rate` by `pitch_factor`
///
/// Returns `None` when the result is not a usable WAV sample rate.
pub fn scaled_rate(rate: u32, pitch_factor: f64) -> Option<u32> {
    let scaled = (rate as f64 * pitch_factor).round();
    if !scaled.is_finite() || scaled < 1.0 || scaled > u32::MAX as f64 {
        return None;
    }
    Some(scaled as u32)
}

/// Apply a pitch factor to an artifact in place
///
/// A factor of exactly 1.0 returns the artifact untouched. Any other factor
/// rewrites the file with `round(rate * factor)` as its sample rate. On
/// failure the artifact must be considered invalid.
#[allow(clippy::float_cmp)]
pub fn apply_pitch(artifact: AudioArtifact, pitch_factor: f64) -> Result<AudioArtifact> {
    if pitch_factor == NEUTRAL_PITCH {
        debug!("Neutral pitch, leaving {} untouched", artifact.path.display());
        return Ok(artifact);
    }

    let new_rate = scaled_rate(artifact.sample_rate, pitch_factor).ok_or_else(|| {
        VoicecraftError::TransformFailed(format!(
            "pitch factor {} gives no valid rate for {} Hz",
            pitch_factor, artifact.sample_rate
        ))
    })?;

    debug!(
        "Rewriting {} from {} Hz to {} Hz",
        artifact.path.display(),
        artifact.sample_rate,
        new_rate
    );

    rewrite_sample_rate(&artifact.path, new_rate).map_err(|e| {
        error!("Pitch rewrite of {} failed: {}", artifact.path.display(), e);
        VoicecraftError::TransformFailed(e.to_string())
    })?;

    Ok(AudioArtifact {
        sample_rate: new_rate,
        ..artifact
    })
}

/// Rewrite a WAV file with the same frames and a new declared rate
///
/// The new file is built next to the original and renamed over it, so a
/// failure part way leaves the original file as it was.
fn rewrite_sample_rate(path: &Path, sample_rate: u32) -> hound::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::Builder::new()
        .prefix(".pitch-")
        .suffix(".wav")
        .tempfile_in(dir)?;

    {
        let mut reader = WavReader::open(path)?;
        let spec = WavSpec {
            sample_rate,
            ..reader.spec()
        };
        let mut writer = WavWriter::new(BufWriter::new(staged.as_file_mut()), spec)?;

        match spec.sample_format {
            SampleFormat::Float => {
                for sample in reader.samples::<f32>() {
                    writer.write_sample(sample?)?;
                }
            }
            SampleFormat::Int => {
                for sample in reader.samples::<i32>() {
                    writer.write_sample(sample?)?;
                }
            }
        }

        writer.finalize()?;
    }

    staged
        .persist(path)
        .map_err(|e| hound::Error::IoError(e.error))?;

    Ok(())
}
