//! Host speech capability port.

pub mod mock;

use alloc::string::String;
use core::fmt;

/// Identifies one submitted utterance. Ids are never reused within a session.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct UtteranceId(pub u32);

/// A voice offered by the host engine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Voice {
    pub name: String,
    /// BCP 47 style tag, e.g. `en-US`.
    pub lang: String,
    /// Synthesised on-device with low latency.
    pub local: bool,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>, local: bool) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            local,
        }
    }

    pub fn speaks(&self, language_prefix: &str) -> bool {
        self.lang.starts_with(language_prefix)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Utterance<'a> {
    pub id: UtteranceId,
    pub text: &'a str,
    pub voice: Option<&'a Voice>,
    pub rate: f32,
    pub pitch: f32,
}

/// Why an utterance ended without completing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpeechFailure {
    Canceled,
    Interrupted,
    SynthesisFailed,
    AudioBusy,
    Other,
}

impl SpeechFailure {
    /// Cancellation is how pause and seek stop narration, not an error.
    pub const fn is_cancellation(self) -> bool {
        matches!(self, Self::Canceled | Self::Interrupted)
    }
}

impl fmt::Display for SpeechFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Canceled => "canceled",
            Self::Interrupted => "interrupted",
            Self::SynthesisFailed => "synthesis-failed",
            Self::AudioBusy => "audio-busy",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// Completion signal delivered by the host for a submitted utterance.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NarrationEvent {
    Finished(UtteranceId),
    Failed(UtteranceId, SpeechFailure),
}

/// Abstract speech synthesis backend.
pub trait SpeechEngine {
    type Error: fmt::Debug;

    fn voices(&self) -> &[Voice];

    /// Queue an utterance. Completion arrives later as a [`NarrationEvent`].
    fn speak(&mut self, utterance: Utterance<'_>) -> Result<(), Self::Error>;

    /// Drop every queued and in-flight utterance.
    fn cancel_all(&mut self);

    fn pause(&mut self);

    fn resume(&mut self);

    fn is_speaking(&self) -> bool;
}
