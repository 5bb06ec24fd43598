//! Gita Voice: spoken questions answered from the Bhagavad Gita.
//!
//! The server transcribes a recorded question, retrieves the closest verses
//! from a vector index, asks a language model for a cited answer, strips the
//! citations for speech and returns text plus synthesized audio. The client
//! records, posts, and plays the reply, optionally moving a jaw actuator.
//!
//! # Modules
//!
//! | Module        | Responsibility                                         |
//! |---------------|--------------------------------------------------------|
//! | [`config`]    | `settings.toml` loading and platform paths             |
//! | [`corpus`]    | verse table loading and text column selection          |
//! | [`embed`]     | text embeddings over HTTP, L2 normalisation            |
//! | [`index`]     | flat inner-product index with a fingerprinted cache    |
//! | [`retrieval`] | query → ranked verses                                  |
//! | [`llm`]       | prompt composition, generation backends, cleanup       |
//! | [`stt`]       | Whisper and HTTP transcription                         |
//! | [`tts`]       | Piper, espeak-ng and HTTP speech synthesis             |
//! | [`pipeline`]  | one voice turn, start to finish                        |
//! | [`server`]    | axum routes                                            |
//! | [`audio`]     | PCM/WAV codecs, capture, playback                      |
//! | [`actuator`]  | serial jaw controller and animator                     |
//! | [`client`]    | HTTP client and interactive loop helpers               |

pub mod actuator;
pub mod audio;
pub mod client;
pub mod config;
pub mod corpus;
pub mod embed;
pub mod index;
pub mod llm;
pub mod pipeline;
pub mod retrieval;
pub mod server;
pub mod stt;
pub mod tts;
