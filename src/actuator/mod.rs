//! Jaw actuator for the client.
//!
//! A microcontroller on a serial port opens and closes a jaw on
//! single-character commands (`O\n`, `C\n`). [`JawAnimator`] drives it with a
//! fixed open/close/open timer while a reply plays. The pattern is cosmetic
//! and unrelated to the audio content.

pub mod animator;
pub mod link;

pub use animator::{jaw_phase, JawAnimator, JawTiming};
pub use link::{candidate_ports, ActuatorError, JawCommand, JawController, JawLink};
