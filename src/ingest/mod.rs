//! Voice capture ingestion.
//!
//! Holds the per-caller session that tracks the platform recognizer. Final
//! transcripts are handed to the orchestrator as `Capture::Voice`.

pub mod session;

pub use session::{SessionState, VoiceError, VoiceInputResult, VoiceSession};
