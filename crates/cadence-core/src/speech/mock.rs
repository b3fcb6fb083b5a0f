use alloc::{string::String, vec::Vec};

use super::{SpeechEngine, Utterance, UtteranceId, Voice};

/// Utterance captured by [`MockSpeech`].
#[derive(Clone, Debug, PartialEq)]
pub struct SpokenUtterance {
    pub id: UtteranceId,
    pub text: String,
    pub voice: Option<String>,
    pub rate: f32,
}

/// In-memory engine that records calls instead of producing audio.
#[derive(Debug, Default)]
pub struct MockSpeech {
    voices: Vec<Voice>,
    pub spoken: Vec<SpokenUtterance>,
    pub cancels: u32,
    pub pauses: u32,
    pub resumes: u32,
    pub speaking: bool,
    pub fail_speak: bool,
}

impl MockSpeech {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self {
            voices,
            ..Self::default()
        }
    }

    pub fn set_voices(&mut self, voices: Vec<Voice>) {
        self.voices = voices;
    }

    pub fn last_spoken(&self) -> Option<&SpokenUtterance> {
        self.spoken.last()
    }
}

impl SpeechEngine for MockSpeech {
    type Error = ();

    fn voices(&self) -> &[Voice] {
        &self.voices
    }

    fn speak(&mut self, utterance: Utterance<'_>) -> Result<(), Self::Error> {
        if self.fail_speak {
            return Err(());
        }

        self.spoken.push(SpokenUtterance {
            id: utterance.id,
            text: String::from(utterance.text),
            voice: utterance.voice.map(|voice| voice.name.clone()),
            rate: utterance.rate,
        });
        self.speaking = true;
        Ok(())
    }

    fn cancel_all(&mut self) {
        self.cancels = self.cancels.saturating_add(1);
        self.speaking = false;
    }

    fn pause(&mut self) {
        self.pauses = self.pauses.saturating_add(1);
    }

    fn resume(&mut self) {
        self.resumes = self.resumes.saturating_add(1);
    }

    fn is_speaking(&self) -> bool {
        self.speaking
    }
}
