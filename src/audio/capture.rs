//! Microphone capture via `cpal`.
//!
//! [`AudioCapture::record`] takes one fixed-length clip from the default
//! input device and returns it as mono samples at the requested rate.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use crate::audio::resample::{downmix, resample};

/// One interleaved buffer from the cpal callback, at the device's rate.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Keeps the cpal stream alive; dropping it stops capture.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Default input device and its preferred stream configuration.
///
/// ```rust,no_run
/// use std::time::Duration;
/// use gita_voice::audio::AudioCapture;
///
/// let capture = AudioCapture::new().unwrap();
/// let clip = capture.record(Duration::from_secs(10), 16_000).unwrap();
/// println!("{} mono samples at 16 kHz", clip.len());
/// ```
pub struct AudioCapture {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_rate: u32,
    channels: u16,
}

impl AudioCapture {
    pub fn new() -> Result<Self, CaptureError> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or(CaptureError::NoDevice)?;
        let supported = device.default_input_config()?;

        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        if let Ok(name) = device.name() {
            log::info!("capture: {name} at {sample_rate} Hz, {channels} channel(s)");
        }

        Ok(Self {
            device,
            config: supported.into(),
            sample_rate,
            channels,
        })
    }

    /// Stream [`AudioChunk`]s to `tx` until the handle is dropped.
    ///
    /// A dropped receiver is ignored so the audio thread never panics.
    pub fn start(&self, tx: mpsc::Sender<AudioChunk>) -> Result<StreamHandle, CaptureError> {
        let sample_rate = self.sample_rate;
        let channels = self.channels;

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let _ = tx.send(AudioChunk {
                    samples: data.to_vec(),
                    sample_rate,
                    channels,
                });
            },
            |err: cpal::StreamError| log::error!("capture: stream error: {err}"),
            None,
        )?;

        stream.play()?;
        Ok(StreamHandle { _stream: stream })
    }

    /// Record for `duration`, blocking, and return mono samples at
    /// `target_rate` Hz. A stream that stalls ends the clip early.
    pub fn record(&self, duration: Duration, target_rate: u32) -> Result<Vec<f32>, CaptureError> {
        let (tx, rx) = mpsc::channel::<AudioChunk>();
        let handle = self.start(tx)?;

        let deadline = Instant::now() + duration;
        let wanted = interleaved_len(duration, self.sample_rate, self.channels);
        let mut interleaved: Vec<f32> = Vec::with_capacity(wanted);

        while interleaved.len() < wanted {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match rx.recv_timeout(remaining) {
                Ok(chunk) => interleaved.extend_from_slice(&chunk.samples),
                Err(_) => break,
            }
        }
        drop(handle);

        interleaved.truncate(wanted);
        let mono = downmix(&interleaved, self.channels);
        log::debug!(
            "capture: {} frames at {} Hz, resampling to {} Hz",
            mono.len(),
            self.sample_rate,
            target_rate
        );
        Ok(resample(&mono, self.sample_rate, target_rate))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

/// Interleaved sample count for `duration` of audio.
fn interleaved_len(duration: Duration, sample_rate: u32, channels: u16) -> usize {
    (duration.as_secs_f64() * sample_rate as f64) as usize * channels as usize
}
