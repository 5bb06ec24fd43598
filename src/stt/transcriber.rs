//! [`Transcriber`]: samples first, temporary WAV file second.

use std::sync::Arc;

use crate::audio::write_wav_file;
use crate::stt::engine::{SttEngine, SttError};
use crate::stt::remote::FileTranscriber;

/// Transcribes decoded request audio.
///
/// The direct engine gets the samples first. If it is missing or fails, the
/// samples are written to a uniquely named temporary WAV file and the file
/// backends are tried in order. The file is removed when the call returns.
#[derive(Clone)]
pub struct Transcriber {
    direct: Option<Arc<dyn SttEngine>>,
    files: Vec<Arc<dyn FileTranscriber>>,
    sample_rate: u32,
}

impl Transcriber {
    pub fn new(
        direct: Option<Arc<dyn SttEngine>>,
        files: Vec<Arc<dyn FileTranscriber>>,
        sample_rate: u32,
    ) -> Self {
        Self {
            direct,
            files,
            sample_rate,
        }
    }

    /// `true` when at least one backend is present.
    pub fn is_available(&self) -> bool {
        self.direct.is_some() || !self.files.is_empty()
    }

    /// Names of the file backends, in the order they are tried.
    pub fn file_backends(&self) -> Vec<String> {
        self.files.iter().map(|f| f.name()).collect()
    }

    /// Transcribe mono `samples` at the configured rate.
    pub async fn transcribe_pcm(&self, samples: Vec<f32>) -> Result<String, SttError> {
        let direct_err = match &self.direct {
            Some(engine) => {
                let engine = Arc::clone(engine);
                let audio = samples.clone();
                match tokio::task::spawn_blocking(move || engine.transcribe(&audio)).await {
                    Ok(Ok(text)) => return Ok(text),
                    Ok(Err(e)) => e,
                    Err(e) => SttError::Transcription(format!("transcription task failed: {e}")),
                }
            }
            None => SttError::NoBackend,
        };

        if self.files.is_empty() {
            return Err(direct_err);
        }
        log::warn!("stt: direct transcription failed ({direct_err}), trying WAV file");

        let tmp = tempfile::Builder::new()
            .prefix("gita-turn-")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| SttError::Wav(e.to_string()))?;
        write_wav_file(tmp.path(), &samples, self.sample_rate)
            .map_err(|e| SttError::Wav(e.to_string()))?;

        let mut file_errors = Vec::with_capacity(self.files.len());
        for backend in &self.files {
            match backend.transcribe_file(tmp.path()).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    log::warn!("stt: {} failed on WAV file ({e})", backend.name());
                    file_errors.push(format!("{}: {e}", backend.name()));
                }
            }
        }

        Err(SttError::Transcription(format!(
            "direct: {direct_err}; file: {}",
            file_errors.join("; ")
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stt::{LocalFileTranscriber, MockSttEngine};
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records the path it was given and whether the file existed then.
    struct RecordingFileTranscriber {
        reply: Result<String, SttError>,
        seen: Mutex<Option<(PathBuf, bool)>>,
    }

    impl RecordingFileTranscriber {
        fn new(reply: Result<String, SttError>) -> Self {
            Self {
                reply,
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl FileTranscriber for RecordingFileTranscriber {
        async fn transcribe_file(&self, path: &Path) -> Result<String, SttError> {
            let is_wav = std::fs::read(path)
                .map(|b| b.starts_with(b"RIFF"))
                .unwrap_or(false);
            *self.seen.lock().unwrap() = Some((path.to_path_buf(), is_wav));
            self.reply.clone()
        }

        fn name(&self) -> String {
            "recording".into()
        }
    }

    /// Fails its first call and answers every later one, like a model that
    /// chokes on the raw buffer but accepts the re-read file.
    struct FailsFirstEngine {
        calls: AtomicUsize,
    }

    impl SttEngine for FailsFirstEngine {
        fn transcribe(&self, _audio: &[f32]) -> Result<String, SttError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(SttError::Transcription("bad buffer".into()))
            } else {
                Ok("what is dharma".into())
            }
        }
    }

    fn one_second() -> Vec<f32> {
        vec![0.0f32; 16_000]
    }

    #[tokio::test]
    async fn direct_success_skips_file_path() {
        let file = Arc::new(RecordingFileTranscriber::new(Ok("file".into())));
        let t = Transcriber::new(
            Some(Arc::new(MockSttEngine::ok("direct"))),
            vec![file.clone()],
            16_000,
        );

        assert_eq!(t.transcribe_pcm(one_second()).await.unwrap(), "direct");
        assert!(file.seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn falls_back_to_temporary_wav() {
        let file = Arc::new(RecordingFileTranscriber::new(Ok("from file".into())));
        let t = Transcriber::new(
            Some(Arc::new(MockSttEngine::err(SttError::Transcription("boom".into())))),
            vec![file.clone()],
            16_000,
        );

        assert_eq!(t.transcribe_pcm(one_second()).await.unwrap(), "from file");

        let (path, was_wav) = file.seen.lock().unwrap().clone().unwrap();
        assert!(was_wav);
        assert!(!path.exists(), "temporary WAV must be removed");
    }

    #[tokio::test]
    async fn same_engine_retries_on_the_wav_file() {
        let engine = Arc::new(FailsFirstEngine {
            calls: AtomicUsize::new(0),
        });
        let t = Transcriber::new(
            Some(engine.clone()),
            vec![Arc::new(LocalFileTranscriber::new(engine.clone()))],
            16_000,
        );

        assert_eq!(t.transcribe_pcm(one_second()).await.unwrap(), "what is dharma");
        assert_eq!(engine.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn file_backends_are_tried_in_order() {
        let first = Arc::new(RecordingFileTranscriber::new(Err(SttError::Timeout)));
        let second = Arc::new(RecordingFileTranscriber::new(Ok("second".into())));
        let t = Transcriber::new(None, vec![first.clone(), second.clone()], 16_000);

        assert_eq!(t.transcribe_pcm(one_second()).await.unwrap(), "second");
        assert!(first.seen.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn all_failing_reports_every_error() {
        let t = Transcriber::new(
            Some(Arc::new(MockSttEngine::err(SttError::Transcription("direct boom".into())))),
            vec![Arc::new(RecordingFileTranscriber::new(Err(SttError::Timeout)))],
            16_000,
        );

        let msg = t.transcribe_pcm(one_second()).await.unwrap_err().to_string();
        assert!(msg.contains("direct boom"), "{msg}");
        assert!(msg.contains("recording: transcription request timed out"), "{msg}");
    }

    #[tokio::test]
    async fn direct_failure_without_file_backend_is_returned() {
        let t = Transcriber::new(Some(Arc::new(MockSttEngine::ok("x"))), Vec::new(), 16_000);
        // Shorter than the engine's minimum.
        let err = t.transcribe_pcm(vec![0.0; 10]).await.unwrap_err();
        assert!(matches!(err, SttError::AudioTooShort));
    }

    #[tokio::test]
    async fn no_backend_is_an_error() {
        let t = Transcriber::new(None, Vec::new(), 16_000);
        assert!(!t.is_available());
        assert!(t.file_backends().is_empty());
        assert!(matches!(
            t.transcribe_pcm(one_second()).await,
            Err(SttError::NoBackend)
        ));
    }
}
