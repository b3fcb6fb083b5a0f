//! Reading telemetry: instantaneous rate sampling, session time, snapshots.

use core::fmt;

use heapless::HistoryBuffer;
use log::debug;

use crate::{document::Document, pacing::div_round};

/// Words between two rate samples.
pub const WPM_SAMPLE_WORDS: u32 = 8;
pub const WPM_HISTORY_LEN: usize = 60;
pub const MIN_SAMPLE_WPM: u16 = 30;
pub const MAX_SAMPLE_WPM: u16 = 2_500;
pub const WORDS_PER_PAGE: usize = 250;

/// Whole seconds rendered as `m:ss`, or `h:mm:ss` past the hour.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct ClockTime {
    secs: u64,
}

impl ClockTime {
    pub const fn from_secs(secs: u64) -> Self {
        Self { secs }
    }

    pub const fn from_millis(ms: u64) -> Self {
        Self { secs: ms / 1_000 }
    }

    pub const fn as_secs(self) -> u64 {
        self.secs
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.secs / 3_600;
        let minutes = (self.secs % 3_600) / 60;
        let seconds = self.secs % 60;
        if hours > 0 {
            write!(f, "{hours}:{minutes:02}:{seconds:02}")
        } else {
            write!(f, "{minutes}:{seconds:02}")
        }
    }
}

/// Periodic stats for the telemetry panel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TelemetrySnapshot {
    pub words_read: usize,
    pub percent_complete: u8,
    pub session_time: ClockTime,
    /// `None` once nothing is left to read.
    pub estimated_remaining: Option<ClockTime>,
    pub average_wpm: u16,
}

/// One-shot report emitted when playback reaches the end.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SessionSummary {
    pub average_wpm: u16,
    pub peak_wpm: u16,
    pub total_words: usize,
    pub estimated_pages: usize,
    pub elapsed: ClockTime,
}

#[derive(Debug)]
pub struct TelemetryRecorder {
    history: HistoryBuffer<u16, WPM_HISTORY_LEN>,
    sample_words: u32,
    last_sample_ms: Option<u64>,
    played_ms: u64,
    open_since_ms: Option<u64>,
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryRecorder {
    pub const fn new() -> Self {
        Self {
            history: HistoryBuffer::new(),
            sample_words: 0,
            last_sample_ms: None,
            played_ms: 0,
            open_since_ms: None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Opens a play interval. The rate clock restarts so paused time is not sampled.
    pub fn start(&mut self, now_ms: u64) {
        if self.open_since_ms.is_none() {
            self.open_since_ms = Some(now_ms);
        }
        self.last_sample_ms = Some(now_ms);
    }

    /// Closes the open play interval, if any. Safe to call repeatedly.
    pub fn pause(&mut self, now_ms: u64) {
        if let Some(since) = self.open_since_ms.take() {
            self.played_ms = self.played_ms.saturating_add(now_ms.saturating_sub(since));
        }
    }

    pub fn is_running(&self) -> bool {
        self.open_since_ms.is_some()
    }

    pub fn played_ms(&self, now_ms: u64) -> u64 {
        let open = self
            .open_since_ms
            .map_or(0, |since| now_ms.saturating_sub(since));
        self.played_ms.saturating_add(open)
    }

    /// Counts `words` toward the next rate sample.
    pub fn record_advance(&mut self, now_ms: u64, words: usize) {
        self.sample_words = self.sample_words.saturating_add(words as u32);
        if self.sample_words < WPM_SAMPLE_WORDS {
            return;
        }
        self.sample_words = 0;

        if let Some(last) = self.last_sample_ms {
            let elapsed_ms = now_ms.saturating_sub(last);
            if elapsed_ms > 0 {
                let wpm = div_round(u64::from(WPM_SAMPLE_WORDS) * 60_000, elapsed_ms)
                    .clamp(u64::from(MIN_SAMPLE_WPM), u64::from(MAX_SAMPLE_WPM))
                    as u16;
                self.history.write(wpm);
                debug!("telemetry: sampled wpm={} elapsed_ms={}", wpm, elapsed_ms);
            }
        }
        self.last_sample_ms = Some(now_ms);
    }

    /// Rate samples, oldest first.
    pub fn wpm_history(&self) -> impl Iterator<Item = u16> + '_ {
        self.history.oldest_ordered().copied()
    }

    pub fn sample_count(&self) -> usize {
        self.history.len()
    }

    pub fn average_wpm(&self, fallback: u16) -> u16 {
        let samples = self.history.as_slice();
        if samples.is_empty() {
            return fallback;
        }

        let sum: u64 = samples.iter().map(|wpm| *wpm as u64).sum();
        div_round(sum, samples.len() as u64) as u16
    }

    pub fn peak_wpm(&self, fallback: u16) -> u16 {
        self.history.as_slice().iter().copied().max().unwrap_or(fallback)
    }

    pub fn snapshot(
        &self,
        now_ms: u64,
        document: &Document,
        cursor: usize,
        wpm: u16,
    ) -> TelemetrySnapshot {
        let total = document.len();
        let cursor = cursor.min(total);
        let percent_complete = if total == 0 {
            0
        } else {
            div_round(cursor as u64 * 100, total as u64) as u8
        };

        let remaining_words = document.real_tokens_from(cursor) as u64;
        let estimated_remaining = (remaining_words > 0)
            .then(|| ClockTime::from_secs(remaining_words * 60 / wpm.max(1) as u64));

        TelemetrySnapshot {
            words_read: cursor,
            percent_complete,
            session_time: ClockTime::from_millis(self.played_ms(now_ms)),
            estimated_remaining,
            average_wpm: self.average_wpm(wpm),
        }
    }

    pub fn summary(&self, now_ms: u64, document: &Document, wpm: u16) -> SessionSummary {
        let total_words = document.real_token_count();
        SessionSummary {
            average_wpm: self.average_wpm(wpm),
            peak_wpm: self.peak_wpm(wpm),
            total_words,
            estimated_pages: total_words.div_ceil(WORDS_PER_PAGE),
            elapsed: ClockTime::from_millis(self.played_ms(now_ms)),
        }
    }
}
