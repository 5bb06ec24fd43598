//! Whisper inference settings.

/// Settings for one Whisper inference run.
///
/// ```
/// use gita_voice::stt::TranscribeParams;
///
/// let params = TranscribeParams::for_language("hi");
/// assert_eq!(params.language, "hi");
/// ```
#[derive(Debug, Clone)]
pub struct TranscribeParams {
    /// ISO-639-1 code, or `"auto"` for Whisper's own detection.
    pub language: String,

    /// Candidates evaluated per greedy decoding step.
    pub best_of: i32,

    /// CPU threads handed to Whisper.
    pub n_threads: i32,
}

impl Default for TranscribeParams {
    fn default() -> Self {
        Self {
            language: "en".into(),
            best_of: 1,
            n_threads: optimal_threads(),
        }
    }
}

impl TranscribeParams {
    /// Default parameters with `language` overridden.
    pub fn for_language(language: &str) -> Self {
        Self {
            language: language.to_string(),
            ..Self::default()
        }
    }

    /// The language to pass to Whisper; `None` means detect.
    pub fn whisper_language(&self) -> Option<&str> {
        match self.language.trim() {
            "" | "auto" => None,
            lang => Some(lang),
        }
    }
}

/// Available parallelism capped at 8.
pub(crate) fn optimal_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8) as i32)
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_and_blank_mean_detect() {
        assert_eq!(TranscribeParams::for_language("auto").whisper_language(), None);
        assert_eq!(TranscribeParams::for_language(" ").whisper_language(), None);
        assert_eq!(TranscribeParams::for_language("en").whisper_language(), Some("en"));
    }

    #[test]
    fn thread_count_is_bounded() {
        let t = optimal_threads();
        assert!((1..=8).contains(&t));
    }
}
