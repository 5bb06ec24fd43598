//! Turn state machine.
//!
//! ```text
//! AwaitingAudio → Transcribing → Retrieving → Composing → Generating
//!               → PostProcessing → Synthesizing → Responding → Done
//!
//! Transcribing ──exit phrase──▶ Synthesizing   (farewell)
//! any state ──error──▶ Failed(reason)
//! ```

// ---------------------------------------------------------------------------
// TurnState
// ---------------------------------------------------------------------------

/// Phase of one voice turn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TurnState {
    /// Waiting for the request body.
    #[default]
    AwaitingAudio,
    /// Decoded samples are being transcribed.
    Transcribing,
    Retrieving,
    Composing,
    Generating,
    /// Citation tokens are being stripped from the raw answer.
    PostProcessing,
    /// Best-effort speech synthesis; failure leaves the audio empty.
    Synthesizing,
    /// The response bundle is being assembled.
    Responding,
    Done,
    Failed(String),
}

impl TurnState {
    /// `true` for `Done` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::Done | TurnState::Failed(_))
    }

    /// A short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            TurnState::AwaitingAudio => "AwaitingAudio",
            TurnState::Transcribing => "Transcribing",
            TurnState::Retrieving => "Retrieving",
            TurnState::Composing => "Composing",
            TurnState::Generating => "Generating",
            TurnState::PostProcessing => "PostProcessing",
            TurnState::Synthesizing => "Synthesizing",
            TurnState::Responding => "Responding",
            TurnState::Done => "Done",
            TurnState::Failed(_) => "Failed",
        }
    }
}

// ---------------------------------------------------------------------------
// TurnProgress
// ---------------------------------------------------------------------------

/// Records the states one turn passes through.
#[derive(Debug, Default)]
pub struct TurnProgress {
    history: Vec<TurnState>,
}

impl TurnProgress {
    pub fn new() -> Self {
        Self {
            history: vec![TurnState::AwaitingAudio],
        }
    }

    /// Enter `state`. Terminal states are never left.
    pub fn enter(&mut self, state: TurnState) {
        let current = self.current();
        if current.is_terminal() {
            log::warn!("turn: ignoring {} after {}", state.label(), current.label());
            return;
        }
        log::debug!("turn: {} → {}", current.label(), state.label());
        self.history.push(state);
    }

    /// Move to `Failed(reason)`.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.enter(TurnState::Failed(reason.into()));
    }

    pub fn current(&self) -> TurnState {
        self.history
            .last()
            .cloned()
            .unwrap_or(TurnState::AwaitingAudio)
    }

    pub fn history(&self) -> &[TurnState] {
        &self.history
    }

    /// The visited labels joined with arrows, for the log line on `Done`.
    pub fn path(&self) -> String {
        self.history
            .iter()
            .map(TurnState::label)
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_awaiting_audio() {
        assert_eq!(TurnState::default(), TurnState::AwaitingAudio);
    }

    #[test]
    fn failed_is_terminal() {
        let failed = TurnState::Failed("no audio".into());
        assert!(failed.is_terminal());
        assert_eq!(failed.label(), "Failed");
        assert!(!TurnState::Generating.is_terminal());
    }

    #[test]
    fn progress_records_history() {
        let mut progress = TurnProgress::new();
        progress.enter(TurnState::Transcribing);
        progress.fail("boom");
        assert_eq!(progress.current(), TurnState::Failed("boom".into()));
        assert_eq!(progress.history().len(), 3);
        assert_eq!(progress.path(), "AwaitingAudio → Transcribing → Failed");
    }

    #[test]
    fn progress_stays_in_terminal_state() {
        let mut progress = TurnProgress::new();
        progress.enter(TurnState::Done);
        progress.enter(TurnState::Transcribing);
        assert_eq!(progress.current(), TurnState::Done);
    }
}
