//! Reading session orchestrator: playback, narration, telemetry and persistence.

use alloc::{string::String, vec::Vec};

use heapless::HistoryBuffer;
use log::{debug, info, warn};

use crate::{
    chunk::MAX_CHUNK_SIZE,
    document::Document,
    narration::NarrationSynchronizer,
    progress::{PROGRESS_KEY, ProgressStore, ResumeOffer, SavedProgress},
    render::{LayoutMode, RenderSpec, Screen},
    scheduler::{FrameEvent, FrameTicket, PlaybackScheduler},
    speech::{NarrationEvent, SpeechEngine},
    telemetry::{SessionSummary, TelemetryRecorder, TelemetrySnapshot},
    text_policy::{BOOKMARK_CONTEXT_CHARS, BOOKMARK_CONTEXT_WORDS, join_limited},
};

pub use crate::scheduler::PlaybackContext;

pub const STATS_REFRESH_MS: u64 = 1_000;
pub const PROGRESS_SAVE_MS: u64 = 5_000;
pub const WORD_HISTORY_LEN: usize = 15;

/// Room for a full chunk of 96-byte words with separators. Only longer words
/// are cut short with `...`.
const CENTERED_TEXT_BYTES: usize = MAX_CHUNK_SIZE * 97;
const BOOKMARK_LABEL_BYTES: usize = 128;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TickResult {
    pub render_requested: bool,
    pub stats_refreshed: bool,
    pub finished: bool,
}

impl TickResult {
    pub const NONE: Self = Self {
        render_requested: false,
        stats_refreshed: false,
        finished: false,
    };

    const RENDER: Self = Self {
        render_requested: true,
        stats_refreshed: false,
        finished: false,
    };

    pub fn merge(self, other: Self) -> Self {
        Self {
            render_requested: self.render_requested || other.render_requested,
            stats_refreshed: self.stats_refreshed || other.stats_refreshed,
            finished: self.finished || other.finished,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReaderConfig {
    pub wpm: u16,
    pub min_wpm: u16,
    pub max_wpm: u16,
    pub wpm_step: u16,
    pub chunk_size: usize,
    pub max_chunk_size: usize,
    pub blank_flash: bool,
    pub speed_ramp: bool,
    pub narration: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            wpm: 700,
            min_wpm: 100,
            max_wpm: 1_500,
            wpm_step: 10,
            chunk_size: 1,
            max_chunk_size: 5,
            blank_flash: false,
            speed_ramp: true,
            narration: false,
        }
    }
}

impl ReaderConfig {
    /// Repairs inverted bounds and pulls the initial values into range.
    pub fn normalized(mut self) -> Self {
        if self.min_wpm > self.max_wpm {
            core::mem::swap(&mut self.min_wpm, &mut self.max_wpm);
        }
        self.min_wpm = self.min_wpm.max(1);
        self.max_wpm = self.max_wpm.max(self.min_wpm);
        self.wpm_step = self.wpm_step.max(1);
        self.max_chunk_size = self.max_chunk_size.clamp(1, MAX_CHUNK_SIZE);
        self.wpm = self.clamp_wpm(self.wpm);
        self.chunk_size = self.chunk_size.clamp(1, self.max_chunk_size);
        self
    }

    /// Rounds to the nearest step, then clamps into `[min_wpm, max_wpm]`.
    pub fn clamp_wpm(&self, wpm: u16) -> u16 {
        let step = self.wpm_step.max(1) as u32;
        let rounded = (wpm as u32 + step / 2) / step * step;
        (rounded.min(u16::MAX as u32) as u16).clamp(self.min_wpm, self.max_wpm)
    }

    pub fn playback_context(&self) -> PlaybackContext {
        PlaybackContext {
            wpm: self.wpm,
            chunk_size: self.chunk_size,
            blank_flash: self.blank_flash,
            speed_ramp: self.speed_ramp,
            narration: self.narration,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bookmark {
    pub cursor_index: usize,
    pub label: String,
    pub created_at_ms: u64,
}

pub struct Reader<S, P>
where
    S: SpeechEngine,
    P: ProgressStore,
{
    document: Document,
    config: ReaderConfig,
    ctx: PlaybackContext,
    scheduler: PlaybackScheduler,
    narration: NarrationSynchronizer<S>,
    telemetry: TelemetryRecorder,
    store: P,
    history: HistoryBuffer<usize, WORD_HISTORY_LEN>,
    bookmarks: Vec<Bookmark>,
    resume_offer: Option<ResumeOffer>,
    summary: Option<SessionSummary>,
    last_snapshot: Option<TelemetrySnapshot>,
    stats_due_ms: Option<u64>,
    save_due_ms: Option<u64>,
    pending_redraw: bool,
}

include!("view.rs");
include!("runtime.rs");
include!("controls.rs");
include!("navigation.rs");
