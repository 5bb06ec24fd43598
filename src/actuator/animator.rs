//! Timed jaw movement while a reply plays.
//!
//! ```text
//! 0 s ──open──▶ 3 s ──close──▶ 6 s ──open──▶ 9 s (repeat)
//! stop ──▶ close (up to 3 attempts)
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::actuator::link::{JawCommand, JawLink};

/// Segment length and flag polling interval of the jaw pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JawTiming {
    /// Length of each open/close/open segment.
    pub segment: Duration,
    /// How often the speaking flag is checked.
    pub poll: Duration,
}

impl Default for JawTiming {
    fn default() -> Self {
        Self {
            segment: Duration::from_secs(3),
            poll: Duration::from_millis(500),
        }
    }
}

/// Segment index (0, 1, 2) and command for `elapsed` time into the pattern.
///
/// ```
/// use std::time::Duration;
/// use gita_voice::actuator::{jaw_phase, JawCommand, JawTiming};
///
/// let t = JawTiming::default();
/// assert_eq!(jaw_phase(Duration::from_secs(1), t), (0, JawCommand::Open));
/// assert_eq!(jaw_phase(Duration::from_secs(4), t), (1, JawCommand::Close));
/// assert_eq!(jaw_phase(Duration::from_secs(7), t), (2, JawCommand::Open));
/// assert_eq!(jaw_phase(Duration::from_secs(10), t), (0, JawCommand::Open));
/// ```
pub fn jaw_phase(elapsed: Duration, timing: JawTiming) -> (u8, JawCommand) {
    let segment = timing.segment.as_millis().max(1);
    let position = elapsed.as_millis() % (segment * 3);
    match position / segment {
        0 => (0, JawCommand::Open),
        1 => (1, JawCommand::Close),
        _ => (2, JawCommand::Open),
    }
}

// ---------------------------------------------------------------------------
// JawAnimator
// ---------------------------------------------------------------------------

/// Background thread that moves the jaw until [`stop`](Self::stop) is called.
pub struct JawAnimator {
    speaking: Arc<AtomicBool>,
    done_rx: mpsc::Receiver<()>,
    handle: Option<JoinHandle<()>>,
}

impl JawAnimator {
    /// Start animating `link` with `timing`.
    pub fn start<L>(link: Arc<Mutex<L>>, timing: JawTiming) -> Self
    where
        L: JawLink + 'static,
    {
        let speaking = Arc::new(AtomicBool::new(true));
        let (done_tx, done_rx) = mpsc::channel();

        let flag = Arc::clone(&speaking);
        let handle = std::thread::Builder::new()
            .name("jaw-animator".into())
            .spawn(move || {
                animate(&link, &flag, timing);
                let _ = done_tx.send(());
            });

        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                log::warn!("actuator: could not start jaw thread ({e})");
                None
            }
        };

        Self {
            speaking,
            done_rx,
            handle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Clear the speaking flag and wait up to `timeout` for the thread.
    ///
    /// Returns `true` if the thread finished in time. Otherwise it is left to
    /// finish on its own.
    pub fn stop(mut self, timeout: Duration) -> bool {
        self.speaking.store(false, Ordering::SeqCst);
        let Some(handle) = self.handle.take() else {
            return true;
        };

        match self.done_rx.recv_timeout(timeout) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                let _ = handle.join();
                true
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                log::warn!("actuator: jaw thread did not stop within {timeout:?}");
                false
            }
        }
    }
}

fn animate<L: JawLink>(link: &Mutex<L>, speaking: &AtomicBool, timing: JawTiming) {
    let start = Instant::now();
    let mut current: Option<u8> = None;

    while speaking.load(Ordering::SeqCst) {
        let (phase, command) = jaw_phase(start.elapsed(), timing);
        if current != Some(phase) {
            match link.lock() {
                Ok(mut link) => {
                    if let Err(e) = link.send(command) {
                        log::warn!("actuator: {command:?} failed ({e})");
                    }
                }
                Err(_) => {
                    log::warn!("actuator: link lock poisoned, stopping jaw");
                    return;
                }
            }
            current = Some(phase);
        }
        std::thread::sleep(timing.poll);
    }

    if let Ok(mut link) = link.lock() {
        link.close_jaw();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
