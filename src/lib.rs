//! subgen - automated subtitle generation
//!
//! Transcribes video files with whisper.cpp, translates the transcript in bounded chunks
//! through a chain of web translation services, and realigns the translation onto the
//! original subtitle timing.

pub mod cli;
pub mod config;
pub mod error;
pub mod subtitle;
pub mod transcribe;
pub mod transcription;
pub mod translate;
pub mod workflow;
