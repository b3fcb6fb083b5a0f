//! Self-chaining narration pipeline over a [`SpeechEngine`].
//!
//! Narration runs at the engine's own pace: each utterance covers a fixed
//! number of words and its completion submits the next one. The visual cursor
//! only matters when narration (re)starts.

use alloc::string::String;

use heapless::Deque;
use log::{debug, info, warn};

use crate::{
    document::{Document, Token},
    speech::{NarrationEvent, SpeechEngine, Utterance, UtteranceId, Voice},
};

pub const NARRATION_CHUNK_WORDS: usize = 12;
pub const HEARTBEAT_MS: u64 = 10_000;
pub const LANGUAGE_SAMPLE_MAX: usize = 500;

const NARRATION_QUEUE_DEPTH: usize = 4;
const ALT_LANGUAGE_MIN_PERCENT: usize = 6;
const RATE_MIN: f32 = 0.5;
const RATE_MAX: f32 = 2.0;
/// Words per minute a rate of 1.0 roughly corresponds to.
const RATE_UNIT_WPM: f32 = 200.0;

const PT_MARKERS: &[&str] = &[
    "de", "da", "do", "das", "dos", "que", "em", "um", "uma", "não", "nao", "para", "com", "por",
    "mais", "como", "seu", "sua", "pelo", "pela", "são", "sao", "ele", "ela", "isso", "este",
    "esta", "esse", "essa", "entre", "quando", "muito", "também", "tambem", "já", "ja", "nos",
    "nas", "aos", "ter", "pode", "foi", "será", "sera", "fazer", "onde", "até", "ate", "sobre",
    "ainda", "depois", "então", "entao", "mesmo", "outro", "outra", "todos", "todas", "havia",
    "porque", "aqui", "seus", "suas", "você", "voce", "meu", "minha", "nosso", "nossa", "qual",
    "quais",
];

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Language {
    #[default]
    English,
    Portuguese,
}

impl Language {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Portuguese => "pt",
        }
    }
}

/// One submitted utterance awaiting its completion event.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NarrationChunk {
    pub id: UtteranceId,
    pub start: usize,
    /// Token index right after the last spoken word.
    pub next: usize,
    pub word_count: usize,
}

/// Samples evenly spread words and checks them against Portuguese markers.
pub fn detect_language(document: &Document) -> Language {
    let real = document.real_token_count();
    if real == 0 {
        return Language::English;
    }

    let stride = real.div_ceil(LANGUAGE_SAMPLE_MAX).max(1);
    let mut sampled = 0usize;
    let mut hits = 0usize;

    for word in document
        .tokens()
        .iter()
        .filter_map(Token::as_word)
        .step_by(stride)
    {
        let mut letters = heapless::String::<32>::new();
        let mut overflow = false;
        for ch in word.chars().filter(|ch| ch.is_alphabetic()) {
            for low in ch.to_lowercase() {
                overflow |= letters.push(low).is_err();
            }
        }

        if letters.chars().count() < 2 {
            continue;
        }
        sampled += 1;
        if !overflow && PT_MARKERS.contains(&letters.as_str()) {
            hits += 1;
        }
    }

    if sampled > 0 && hits * 100 > sampled * ALT_LANGUAGE_MIN_PERCENT {
        Language::Portuguese
    } else {
        Language::English
    }
}

/// Local voice in `language`, then any local voice, then any voice in `language`, then the first.
pub fn pick_voice(voices: &[Voice], language: Language) -> Option<&Voice> {
    let tag = language.tag();
    voices
        .iter()
        .find(|voice| voice.local && voice.speaks(tag))
        .or_else(|| voices.iter().find(|voice| voice.local))
        .or_else(|| voices.iter().find(|voice| voice.speaks(tag)))
        .or_else(|| voices.first())
}

pub fn utterance_rate(wpm: u16) -> f32 {
    (wpm as f32 / RATE_UNIT_WPM).clamp(RATE_MIN, RATE_MAX)
}

#[derive(Debug)]
pub struct NarrationSynchronizer<S> {
    engine: S,
    voice: Option<Voice>,
    language: Language,
    queue: Deque<NarrationChunk, NARRATION_QUEUE_DEPTH>,
    next_id: u32,
    heartbeat_due_ms: Option<u64>,
    active: bool,
    text: String,
}

impl<S> NarrationSynchronizer<S>
where
    S: SpeechEngine,
{
    pub fn new(engine: S) -> Self {
        Self {
            engine,
            voice: None,
            language: Language::English,
            queue: Deque::new(),
            next_id: 0,
            heartbeat_due_ms: None,
            active: false,
            text: String::new(),
        }
    }

    pub fn engine(&self) -> &S {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut S {
        &mut self.engine
    }

    pub fn voice(&self) -> Option<&Voice> {
        self.voice.as_ref()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn in_flight(&self) -> usize {
        self.queue.len()
    }

    pub fn heartbeat_armed(&self) -> bool {
        self.heartbeat_due_ms.is_some()
    }

    pub fn heartbeat_due_ms(&self) -> Option<u64> {
        self.heartbeat_due_ms
    }

    /// Re-runs language detection and voice choice; call after load or when the voice list changes.
    pub fn select_voice(&mut self, document: &Document) {
        self.language = detect_language(document);
        self.voice = pick_voice(self.engine.voices(), self.language).cloned();
        match &self.voice {
            Some(voice) => info!(
                "narration: language={} voice={} ({}) local={}",
                self.language.tag(),
                voice.name,
                voice.lang,
                voice.local
            ),
            None => info!(
                "narration: language={} no voice available",
                self.language.tag()
            ),
        }
    }

    /// Drops any prior narration and begins again from `from`.
    pub fn start(&mut self, document: &Document, from: usize, wpm: u16, now_ms: u64) {
        self.engine.cancel_all();
        self.queue.clear();
        self.active = true;
        self.enqueue(document, from, wpm);

        let local = self.voice.as_ref().is_some_and(|voice| voice.local);
        self.heartbeat_due_ms = (!local).then_some(now_ms.saturating_add(HEARTBEAT_MS));
        debug!(
            "narration: start from={} heartbeat={}",
            from,
            self.heartbeat_armed()
        );
    }

    pub fn stop(&mut self) {
        self.engine.cancel_all();
        self.queue.clear();
        self.heartbeat_due_ms = None;
        if self.active {
            debug!("narration: stop");
        }
        self.active = false;
    }

    /// Handles a completion signal. Returns the id of a chained utterance, if one was submitted.
    pub fn on_event(
        &mut self,
        document: &Document,
        event: NarrationEvent,
        wpm: u16,
    ) -> Option<UtteranceId> {
        match event {
            NarrationEvent::Finished(id) => {
                let chunk = self.take(id)?;
                if !self.active {
                    return None;
                }
                self.enqueue(document, chunk.next, wpm)
            }
            NarrationEvent::Failed(_, reason) if reason.is_cancellation() => None,
            NarrationEvent::Failed(id, reason) => {
                if let Some(chunk) = self.take(id) {
                    warn!(
                        "narration: utterance {} failed ({}), dropping words {}..{}",
                        id.0, reason, chunk.start, chunk.next
                    );
                }
                None
            }
        }
    }

    /// Fires the keep-alive heartbeat when due.
    pub fn tick(&mut self, now_ms: u64) {
        let Some(due) = self.heartbeat_due_ms else {
            return;
        };
        if now_ms < due {
            return;
        }

        if !self.engine.is_speaking() {
            debug!("narration: engine idle, heartbeat cancelled");
            self.heartbeat_due_ms = None;
            return;
        }

        self.engine.pause();
        self.engine.resume();
        let next = due.saturating_add(HEARTBEAT_MS);
        self.heartbeat_due_ms = Some(if next > now_ms {
            next
        } else {
            now_ms.saturating_add(HEARTBEAT_MS)
        });
    }

    fn take(&mut self, id: UtteranceId) -> Option<NarrationChunk> {
        let position = self.queue.iter().position(|chunk| chunk.id == id);
        let Some(position) = position else {
            debug!("narration: stale event for utterance {}", id.0);
            return None;
        };

        // Rotate the match to the front, pop it, keep the others in order.
        let mut taken = None;
        for index in 0..self.queue.len() {
            let chunk = self.queue.pop_front()?;
            if index == position {
                taken = Some(chunk);
            } else {
                let _ = self.queue.push_back(chunk);
            }
        }
        taken
    }

    fn enqueue(&mut self, document: &Document, from: usize, wpm: u16) -> Option<UtteranceId> {
        self.text.clear();
        let mut cursor = from;
        let mut word_count = 0usize;
        while word_count < NARRATION_CHUNK_WORDS {
            let Some(token) = document.token(cursor) else {
                break;
            };
            cursor += 1;
            if let Token::Word(word) = token {
                if word_count > 0 {
                    self.text.push(' ');
                }
                self.text.push_str(word);
                word_count += 1;
            }
        }

        if word_count == 0 {
            debug!("narration: reached end of document");
            return None;
        }

        let id = UtteranceId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        let utterance = Utterance {
            id,
            text: &self.text,
            voice: self.voice.as_ref(),
            rate: utterance_rate(wpm),
            pitch: 1.0,
        };
        if let Err(err) = self.engine.speak(utterance) {
            warn!("narration: speak failed for utterance {}: {:?}", id.0, err);
            return None;
        }

        if self.queue.is_full() {
            let _ = self.queue.pop_front();
        }
        let _ = self.queue.push_back(NarrationChunk {
            id,
            start: from,
            next: cursor,
            word_count,
        });
        Some(id)
    }
}
