//! Voice input session state.
//!
//! A `VoiceSession` is owned by whoever drives the platform recognizer.
//! It tracks whether that recognizer is listening and turns raw recognizer
//! callbacks (results, end of speech, errors) into typed values. Several
//! sessions can exist at once; none of them share state.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_LOCALE: &str = "en-US";

/// A final transcription delivered by the recognizer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceInputResult {
    pub transcription: String,
    /// The platform recognizer reports no score, so this is always 1.0
    pub confidence: f32,
    pub is_final: bool,
}

/// Listening state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Listening,
}

/// Recognizer errors, classified for display
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceError {
    #[error("Microphone permission is required.")]
    PermissionDenied,

    #[error("Check your internet connection.")]
    Network,

    #[error("Didn't catch that. Try again.")]
    NoSpeech,

    #[error("Something went wrong with voice input.")]
    Other(String),
}

impl VoiceError {
    /// Classify a raw recognizer error message
    pub fn from_platform_message(message: &str) -> Self {
        if message.contains("permission") {
            VoiceError::PermissionDenied
        } else if message.contains("network") {
            VoiceError::Network
        } else if message.contains("no-speech") {
            VoiceError::NoSpeech
        } else {
            VoiceError::Other(message.to_string())
        }
    }
}

/// One logical listening session
#[derive(Debug, Clone)]
pub struct VoiceSession {
    locale: String,
    state: SessionState,
}

impl Default for VoiceSession {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

impl VoiceSession {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            state: SessionState::Idle,
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == SessionState::Listening
    }

    /// Begin listening. Returns false (no-op) if already listening
    pub fn start(&mut self) -> bool {
        if self.is_listening() {
            warn!(locale = %self.locale, "Already listening");
            return false;
        }
        self.state = SessionState::Listening;
        debug!(locale = %self.locale, "Voice input started");
        true
    }

    /// Stop listening. Returns false if the session was idle
    pub fn stop(&mut self) -> bool {
        self.go_idle("stopped")
    }

    /// Abandon the session. Returns false if the session was idle
    pub fn cancel(&mut self) -> bool {
        self.go_idle("cancelled")
    }

    /// The recognizer detected the end of speech
    pub fn on_speech_end(&mut self) {
        self.go_idle("ended");
    }

    /// Recognizer results; the first non-empty alternative becomes the result
    pub fn on_results(&mut self, alternatives: &[String]) -> Option<VoiceInputResult> {
        let transcription = alternatives.first().filter(|t| !t.is_empty())?;
        debug!(%transcription, "Speech result");

        Some(VoiceInputResult {
            transcription: transcription.clone(),
            confidence: 1.0,
            is_final: true,
        })
    }

    /// A recognizer error ends the session
    pub fn on_error(&mut self, message: &str) -> VoiceError {
        self.state = SessionState::Idle;
        let error = VoiceError::from_platform_message(message);
        warn!(raw = %message, error = %error, "Speech error");
        error
    }

    fn go_idle(&mut self, reason: &str) -> bool {
        if !self.is_listening() {
            return false;
        }
        self.state = SessionState::Idle;
        debug!(locale = %self.locale, reason, "Voice input idle");
        true
    }
}
