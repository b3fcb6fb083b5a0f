use std::collections::VecDeque;

use cadence_core::speech::{
    NarrationEvent, SpeechEngine, SpeechFailure, Utterance, UtteranceId, Voice,
};
use embassy_time::{Duration, Instant};
use log::info;

/// Words per minute a rate-1.0 voice speaks at.
const BASE_SPEECH_WPM: u64 = 200;

#[derive(Debug)]
struct Queued {
    id: UtteranceId,
    duration: Duration,
}

/// Speech backend that logs utterances and finishes each one after the time a
/// voice at the requested rate would need to say it.
pub(super) struct SimulatedSpeech {
    voices: Vec<Voice>,
    queue: VecDeque<Queued>,
    head_started: Option<Instant>,
    paused_at: Option<Instant>,
    events: Vec<NarrationEvent>,
}

impl SimulatedSpeech {
    pub(super) fn new(local_voice: bool) -> Self {
        Self {
            voices: vec![
                Voice::new("Simulated English", "en-US", local_voice),
                Voice::new("Simulated Português", "pt-BR", local_voice),
            ],
            queue: VecDeque::new(),
            head_started: None,
            paused_at: None,
            events: Vec::new(),
        }
    }

    /// Completion events gathered since the last poll.
    pub(super) fn poll(&mut self) -> Vec<NarrationEvent> {
        self.poll_at(Instant::now())
    }

    fn poll_at(&mut self, now: Instant) -> Vec<NarrationEvent> {
        if self.paused_at.is_none() {
            while let (Some(head), Some(started)) = (self.queue.front(), self.head_started) {
                let done_at = started + head.duration;
                if now < done_at {
                    break;
                }
                self.events.push(NarrationEvent::Finished(head.id));
                self.queue.pop_front();
                self.head_started = self.queue.front().map(|_| done_at);
            }
        }
        std::mem::take(&mut self.events)
    }

    fn speak_at(&mut self, utterance: Utterance<'_>, now: Instant) {
        let words = utterance.text.split_whitespace().count() as u64;
        let rate = f64::from(utterance.rate.max(0.1));
        let millis = (words * 60_000) as f64 / (BASE_SPEECH_WPM as f64 * rate);
        info!(
            "speech: #{} rate={:.2} voice={} \"{}\"",
            utterance.id.0,
            utterance.rate,
            utterance.voice.map_or("default", |voice| voice.name.as_str()),
            utterance.text
        );

        if self.queue.is_empty() {
            self.head_started = Some(now);
        }
        self.queue.push_back(Queued {
            id: utterance.id,
            duration: Duration::from_millis(millis as u64),
        });
    }
}

impl SpeechEngine for SimulatedSpeech {
    type Error = ();

    fn voices(&self) -> &[Voice] {
        &self.voices
    }

    fn speak(&mut self, utterance: Utterance<'_>) -> Result<(), Self::Error> {
        self.speak_at(utterance, Instant::now());
        Ok(())
    }

    fn cancel_all(&mut self) {
        for queued in self.queue.drain(..) {
            self.events
                .push(NarrationEvent::Failed(queued.id, SpeechFailure::Canceled));
        }
        self.head_started = None;
        self.paused_at = None;
    }

    fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Instant::now());
        }
    }

    fn resume(&mut self) {
        if let Some(paused_at) = self.paused_at.take()
            && let Some(started) = self.head_started.as_mut()
        {
            *started += Instant::now() - paused_at;
        }
    }

    fn is_speaking(&self) -> bool {
        !self.queue.is_empty()
    }
}
