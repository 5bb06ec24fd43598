//! WAV container helpers built on `hound`.

use std::io::Cursor;
use std::path::Path;

use crate::audio::error::AudioError;
use crate::audio::pcm::to_i16;
use crate::audio::resample::downmix;

fn mono_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Encode mono `f32` samples as a 16-bit PCM WAV file in memory.
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, AudioError> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, mono_spec(sample_rate))?;
        for &sample in samples {
            writer.write_sample(to_i16(sample))?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Write mono `f32` samples to a 16-bit PCM WAV file at `path`.
pub fn write_wav_file(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), AudioError> {
    let mut writer = hound::WavWriter::create(path, mono_spec(sample_rate))?;
    for &sample in samples {
        writer.write_sample(to_i16(sample))?;
    }
    writer.finalize()?;
    Ok(())
}

/// Read a WAV file as mono `f32` samples and its sample rate.
///
/// Integer formats are scaled to `[-1.0, 1.0)`; multi-channel files are
/// averaged down to mono.
pub fn read_wav_file(path: &Path) -> Result<(Vec<f32>, u32), AudioError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok((downmix(&interleaved, spec.channels), spec.sample_rate))
}

/// Playback length of an in-memory WAV file in seconds.
pub fn wav_duration_secs(bytes: &[u8]) -> Result<f32, AudioError> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(AudioError::Wav("sample rate is zero".into()));
    }
    // `duration` counts frames, not interleaved samples.
    Ok(reader.duration() as f32 / spec.sample_rate as f32)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
