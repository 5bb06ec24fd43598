//! File-based transcription on the local engine.
//!
//! [`LocalFileTranscriber`] reads the temporary WAV back with `hound`,
//! brings it to mono 16 kHz and runs the same [`SttEngine`] on it. It is
//! the file backend whenever a local Whisper model is loaded.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::audio::{read_wav_file, resample};
use crate::stt::engine::{SttEngine, SttError};
use crate::stt::remote::FileTranscriber;

/// Sample rate the engine expects.
const ENGINE_SAMPLE_RATE: u32 = 16_000;

pub struct LocalFileTranscriber {
    engine: Arc<dyn SttEngine>,
}

impl LocalFileTranscriber {
    pub fn new(engine: Arc<dyn SttEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl FileTranscriber for LocalFileTranscriber {
    async fn transcribe_file(&self, path: &Path) -> Result<String, SttError> {
        let path = path.to_path_buf();
        let engine = Arc::clone(&self.engine);

        tokio::task::spawn_blocking(move || {
            let (samples, rate) = read_wav_file(&path)
                .map_err(|e| SttError::Wav(format!("{}: {e}", path.display())))?;
            let samples = resample(&samples, rate, ENGINE_SAMPLE_RATE);
            engine.transcribe(&samples)
        })
        .await
        .map_err(|e| SttError::Transcription(format!("file transcription task failed: {e}")))?
    }

    fn name(&self) -> String {
        "local-wav".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::write_wav_file;
    use crate::stt::MockSttEngine;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Remembers how many samples it was given.
    struct CountingEngine {
        seen: Mutex<Option<usize>>,
    }

    impl SttEngine for CountingEngine {
        fn transcribe(&self, audio: &[f32]) -> Result<String, SttError> {
            *self.seen.lock().unwrap() = Some(audio.len());
            Ok("counted".into())
        }
    }

    #[tokio::test]
    async fn reads_the_file_and_runs_the_engine() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("turn.wav");
        write_wav_file(&path, &vec![0.2; 16_000], 16_000).unwrap();

        let local = LocalFileTranscriber::new(Arc::new(MockSttEngine::ok("from wav")));
        assert_eq!(local.transcribe_file(&path).await.unwrap(), "from wav");
    }

    #[tokio::test]
    async fn other_rates_are_resampled_to_16k() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("turn.wav");
        write_wav_file(&path, &vec![0.2; 48_000], 48_000).unwrap();

        let engine = Arc::new(CountingEngine {
            seen: Mutex::new(None),
        });
        let local = LocalFileTranscriber::new(engine.clone());
        local.transcribe_file(&path).await.unwrap();

        assert_eq!(*engine.seen.lock().unwrap(), Some(16_000));
    }

    #[tokio::test]
    async fn missing_file_is_a_wav_error() {
        let local = LocalFileTranscriber::new(Arc::new(MockSttEngine::ok("x")));
        let err = local
            .transcribe_file(Path::new("/nonexistent/turn.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, SttError::Wav(_)));
    }
}
