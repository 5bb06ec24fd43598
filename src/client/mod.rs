//! Client side of a turn: record, post, play.
//!
//! ```text
//! ENTER → AudioCapture::record → AudioQuality → encode_pcm16
//!       → ServerClient::process_audio → print answer
//!       → speak (play_wav + JawAnimator)
//! ```

pub mod api;
pub mod session;

pub use api::{ClientError, ServerClient};
pub use session::{decode_audio, parse_command, record_turn, speak, ClientCommand};
