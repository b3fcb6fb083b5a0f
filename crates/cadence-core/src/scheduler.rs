//! Frame-driven playback state machine.
//!
//! The host calls [`PlaybackScheduler::on_frame`] repeatedly with a
//! [`FrameTicket`] and the current time. Each call moves the cursor by at most
//! one chunk; elapsed time beyond that is carried in the accumulator, never
//! replayed as extra advances.

use log::{debug, info};

use crate::{
    chunk::{self, PlannedChunk},
    document::Document,
    pacing::{DurationTable, base_interval_ms},
};

/// Scalar playback configuration read on every frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlaybackContext {
    pub wpm: u16,
    pub chunk_size: usize,
    pub blank_flash: bool,
    pub speed_ramp: bool,
    pub narration: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Idle,
    /// Current chunk visible, waiting out its dwell.
    Playing,
    /// Next chunk planned but hidden for `blank_ms`.
    Blanking { blank_ms: u32 },
    Done,
}

/// Handle to the single live frame callback chain.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FrameTicket(u32);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FrameEvent {
    /// Ticket no longer live, or the scheduler is not playing.
    Stale,
    Waiting,
    /// Blank interval ended and the planned chunk is now visible.
    Revealed,
    /// Cursor moved by `words`; `blank_ms > 0` means the new chunk starts hidden.
    Advanced { words: usize, blank_ms: u32 },
    Finished,
}

#[derive(Debug)]
pub struct PlaybackScheduler {
    phase: Phase,
    cursor: usize,
    accum_ms: u64,
    prev_ms: u64,
    /// Dwell fixed for the chunk on screen when it was planned.
    committed_dwell_ms: Option<u32>,
    chunk: Option<PlannedChunk>,
    visible: bool,
    durations: DurationTable,
    generation: u32,
    armed: bool,
}

impl Default for PlaybackScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackScheduler {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            cursor: 0,
            accum_ms: 0,
            prev_ms: 0,
            committed_dwell_ms: None,
            chunk: None,
            visible: true,
            durations: DurationTable::new(),
            generation: 0,
            armed: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.phase, Phase::Playing | Phase::Blanking { .. })
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn chunk(&self) -> Option<PlannedChunk> {
        self.chunk
    }

    /// `false` while a blank interval hides the planned chunk.
    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn durations(&self) -> &DurationTable {
        &self.durations
    }

    pub fn frame_ticket(&self) -> Option<FrameTicket> {
        self.armed.then_some(FrameTicket(self.generation))
    }

    pub fn rebuild_durations(&mut self, document: &Document, ctx: &PlaybackContext) {
        self.durations
            .rebuild(document.tokens(), ctx.wpm, ctx.speed_ramp);
        debug!(
            "scheduler: duration table rebuilt len={} wpm={} ramp={}",
            self.durations.len(),
            ctx.wpm,
            ctx.speed_ramp
        );
    }

    /// Re-plans the chunk at the cursor for display without touching the phase.
    pub fn replan(&mut self, document: &Document, ctx: &PlaybackContext) {
        self.chunk = chunk::plan(document.tokens(), self.cursor, ctx.chunk_size);
    }

    /// Enters `Playing` and arms a fresh ticket. Any earlier ticket turns stale.
    pub fn start(
        &mut self,
        document: &Document,
        ctx: &PlaybackContext,
        now_ms: u64,
    ) -> Option<FrameTicket> {
        if document.is_empty() {
            return None;
        }
        if self.cursor >= document.len() {
            self.cursor = 0;
        }

        self.rebuild_durations(document, ctx);
        self.accum_ms = 0;
        self.prev_ms = now_ms;
        self.phase = Phase::Playing;
        self.visible = true;
        self.replan(document, ctx);
        self.commit_dwell();
        self.arm();
        info!("scheduler: playing from {}", self.cursor);
        self.frame_ticket()
    }

    /// Cancels the frame chain. Returns whether playback was active.
    pub fn stop(&mut self) -> bool {
        let was_playing = self.is_playing();
        self.disarm();
        if was_playing {
            self.phase = Phase::Idle;
            self.visible = true;
            debug!("scheduler: stopped at {}", self.cursor);
        }
        was_playing
    }

    /// Moves the cursor, clamped to the last token. Clears any blank interval.
    pub fn seek(&mut self, document: &Document, ctx: &PlaybackContext, index: usize) {
        self.cursor = index.min(document.len().saturating_sub(1));
        self.phase = match self.phase {
            Phase::Blanking { .. } => Phase::Playing,
            Phase::Done => Phase::Idle,
            phase => phase,
        };
        self.accum_ms = 0;
        self.visible = true;
        self.replan(document, ctx);
        self.commit_dwell();
    }

    /// Back to an idle session at index 0 with no table. Used on document load.
    pub fn reset(&mut self) {
        self.disarm();
        let generation = self.generation;
        *self = Self::new();
        self.generation = generation;
    }

    pub fn on_frame(
        &mut self,
        ticket: FrameTicket,
        ctx: &PlaybackContext,
        document: &Document,
        now_ms: u64,
    ) -> FrameEvent {
        if !self.armed || ticket.0 != self.generation || !self.is_playing() {
            return FrameEvent::Stale;
        }

        let delta = now_ms.saturating_sub(self.prev_ms);
        self.prev_ms = now_ms;
        self.accum_ms = self.accum_ms.saturating_add(delta);

        if let Phase::Blanking { blank_ms } = self.phase {
            let blank_ms = blank_ms as u64;
            if self.accum_ms < blank_ms {
                return FrameEvent::Waiting;
            }
            self.accum_ms -= blank_ms;
            self.phase = Phase::Playing;
            self.visible = true;
            return FrameEvent::Revealed;
        }

        let dwell = self
            .committed_dwell_ms
            .unwrap_or_else(|| base_interval_ms(ctx.wpm)) as u64;
        if self.accum_ms < dwell {
            return FrameEvent::Waiting;
        }
        self.accum_ms -= dwell;

        let step = ctx.chunk_size.max(1);
        self.cursor = self.cursor.saturating_add(step);
        if self.cursor >= document.len() {
            self.cursor = document.len();
            self.finish();
            return FrameEvent::Finished;
        }

        self.replan(document, ctx);
        if self.chunk.is_none() {
            // Only paragraph breaks remain.
            self.cursor = document.len();
            self.finish();
            return FrameEvent::Finished;
        }
        self.commit_dwell();

        let blank_ms = chunk::blank_interval_ms(step, ctx.blank_flash, ctx.wpm);
        if blank_ms > 0 {
            self.phase = Phase::Blanking { blank_ms };
            self.visible = false;
        } else {
            self.visible = true;
        }

        FrameEvent::Advanced {
            words: step,
            blank_ms,
        }
    }

    fn finish(&mut self) {
        self.phase = Phase::Done;
        self.chunk = None;
        self.visible = true;
        self.disarm();
        info!("scheduler: done at {}", self.cursor);
    }

    fn commit_dwell(&mut self) {
        self.committed_dwell_ms = self.durations.get(self.cursor);
    }

    fn arm(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.armed = true;
    }

    fn disarm(&mut self) {
        if self.armed {
            self.generation = self.generation.wrapping_add(1);
        }
        self.armed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{document::Token, render::LayoutMode};
    use alloc::{vec, vec::Vec};

    fn ctx(wpm: u16, chunk_size: usize) -> PlaybackContext {
        PlaybackContext {
            wpm,
            chunk_size,
            blank_flash: false,
            speed_ramp: false,
            narration: false,
        }
    }

    fn doc(words: &[&str]) -> Document {
        let tokens = words
            .iter()
            .map(|text| {
                if *text == "|" {
                    Token::ParagraphBreak
                } else {
                    Token::word(*text)
                }
            })
            .collect();
        Document::new("test", tokens, vec![]).unwrap()
    }

    #[test]
    fn hello_world_plays_to_done() {
        let doc = doc(&["Hello", "world"]);
        let ctx = ctx(600, 1);
        let mut scheduler = PlaybackScheduler::new();
        let ticket = scheduler.start(&doc, &ctx, 1_000).unwrap();
        assert_eq!(scheduler.chunk().map(|c| c.start), Some(0));

        assert_eq!(scheduler.on_frame(ticket, &ctx, &doc, 1_099), FrameEvent::Waiting);
        assert_eq!(
            scheduler.on_frame(ticket, &ctx, &doc, 1_100),
            FrameEvent::Advanced {
                words: 1,
                blank_ms: 0
            }
        );
        assert_eq!(scheduler.chunk().map(|c| c.start), Some(1));
        assert!(scheduler.visible());

        assert_eq!(scheduler.on_frame(ticket, &ctx, &doc, 1_199), FrameEvent::Waiting);
        assert_eq!(scheduler.on_frame(ticket, &ctx, &doc, 1_200), FrameEvent::Finished);
        assert_eq!(scheduler.phase(), Phase::Done);
        assert_eq!(scheduler.cursor(), 2);
        assert_eq!(scheduler.frame_ticket(), None);
    }

    #[test]
    fn old_ticket_is_stale_after_restart() {
        let doc = doc(&["a", "b", "c"]);
        let ctx = ctx(600, 1);
        let mut scheduler = PlaybackScheduler::new();
        let first = scheduler.start(&doc, &ctx, 0).unwrap();
        scheduler.stop();
        assert_eq!(scheduler.on_frame(first, &ctx, &doc, 500), FrameEvent::Stale);

        let second = scheduler.start(&doc, &ctx, 500).unwrap();
        assert_ne!(first, second);
        assert_eq!(scheduler.on_frame(first, &ctx, &doc, 700), FrameEvent::Stale);
        assert_eq!(scheduler.cursor(), 0);
        assert!(matches!(
            scheduler.on_frame(second, &ctx, &doc, 700),
            FrameEvent::Advanced { .. }
        ));
    }

    #[test]
    fn only_one_advance_per_frame_after_a_stall() {
        let doc = doc(&["a", "b", "c", "d", "e"]);
        let ctx = ctx(600, 1);
        let mut scheduler = PlaybackScheduler::new();
        let ticket = scheduler.start(&doc, &ctx, 0).unwrap();

        assert!(matches!(
            scheduler.on_frame(ticket, &ctx, &doc, 450),
            FrameEvent::Advanced { .. }
        ));
        assert_eq!(scheduler.cursor(), 1);

        // Backlog of 350 ms still drains one word per frame.
        assert!(matches!(
            scheduler.on_frame(ticket, &ctx, &doc, 450),
            FrameEvent::Advanced { .. }
        ));
        assert_eq!(scheduler.cursor(), 2);
    }

    #[test]
    fn blank_exit_never_advances() {
        let doc = doc(&["a", "b", "c"]);
        let mut ctx = ctx(150, 1);
        ctx.blank_flash = true;
        let mut scheduler = PlaybackScheduler::new();
        let ticket = scheduler.start(&doc, &ctx, 0).unwrap();

        assert_eq!(
            scheduler.on_frame(ticket, &ctx, &doc, 400),
            FrameEvent::Advanced {
                words: 1,
                blank_ms: 50
            }
        );
        assert!(!scheduler.visible());
        assert_eq!(scheduler.phase(), Phase::Blanking { blank_ms: 50 });

        // Far more than one blank plus a dwell has elapsed.
        assert_eq!(scheduler.on_frame(ticket, &ctx, &doc, 2_000), FrameEvent::Revealed);
        assert_eq!(scheduler.cursor(), 1);
        assert!(scheduler.visible());
    }

    #[test]
    fn multi_word_chunks_always_blank() {
        let doc = doc(&["a", "b", "c", "d", "|", "e"]);
        let ctx = ctx(600, 2);
        let mut scheduler = PlaybackScheduler::new();
        let ticket = scheduler.start(&doc, &ctx, 0).unwrap();
        let first = scheduler.chunk().unwrap();
        assert_eq!((first.start, first.end, first.layout), (0, 2, LayoutMode::Centered));

        assert_eq!(
            scheduler.on_frame(ticket, &ctx, &doc, 100),
            FrameEvent::Advanced {
                words: 2,
                blank_ms: 25
            }
        );
        assert_eq!(scheduler.on_frame(ticket, &ctx, &doc, 125), FrameEvent::Revealed);
        assert_eq!(scheduler.chunk().map(|c| (c.start, c.end)), Some((2, 4)));
    }

    #[test]
    fn trailing_breaks_finish_playback() {
        let doc = doc(&["a", "|", "|"]);
        let ctx = ctx(600, 1);
        let mut scheduler = PlaybackScheduler::new();
        let ticket = scheduler.start(&doc, &ctx, 0).unwrap();
        assert_eq!(scheduler.on_frame(ticket, &ctx, &doc, 100), FrameEvent::Finished);
        assert_eq!(scheduler.cursor(), doc.len());
        assert!(scheduler.is_done());
    }

    #[test]
    fn committed_dwell_survives_rate_change() {
        let doc = doc(&["a", "b", "c"]);
        let slow = ctx(600, 1);
        let fast = ctx(1_200, 1);
        let mut scheduler = PlaybackScheduler::new();
        let ticket = scheduler.start(&doc, &slow, 0).unwrap();

        scheduler.on_frame(ticket, &slow, &doc, 50);
        scheduler.rebuild_durations(&doc, &fast);
        assert_eq!(scheduler.durations().len(), doc.len());

        assert_eq!(scheduler.on_frame(ticket, &fast, &doc, 60), FrameEvent::Waiting);
        assert!(matches!(
            scheduler.on_frame(ticket, &fast, &doc, 100),
            FrameEvent::Advanced { .. }
        ));
        // Next word runs on the new 50 ms table.
        assert_eq!(scheduler.on_frame(ticket, &fast, &doc, 149), FrameEvent::Waiting);
        assert!(matches!(
            scheduler.on_frame(ticket, &fast, &doc, 150),
            FrameEvent::Advanced { .. }
        ));
    }

    #[test]
    fn seek_to_current_index_keeps_content_and_clears_blank() {
        let doc = doc(&["a", "b", "c", "d"]);
        let mut ctx = ctx(150, 1);
        ctx.blank_flash = true;
        let mut scheduler = PlaybackScheduler::new();
        let ticket = scheduler.start(&doc, &ctx, 0).unwrap();
        scheduler.on_frame(ticket, &ctx, &doc, 400);
        assert!(matches!(scheduler.phase(), Phase::Blanking { .. }));

        let before = scheduler.chunk();
        scheduler.seek(&doc, &ctx, scheduler.cursor());
        assert_eq!(scheduler.chunk(), before);
        assert_eq!(scheduler.phase(), Phase::Playing);
        assert!(scheduler.visible());
    }

    #[test]
    fn seek_clamps_and_start_wraps_from_end() {
        let doc = doc(&["a", "b", "c"]);
        let ctx = ctx(600, 1);
        let mut scheduler = PlaybackScheduler::new();
        scheduler.seek(&doc, &ctx, 99);
        assert_eq!(scheduler.cursor(), 2);

        let ticket = scheduler.start(&doc, &ctx, 0).unwrap();
        assert_eq!(scheduler.on_frame(ticket, &ctx, &doc, 100), FrameEvent::Finished);
        assert_eq!(scheduler.cursor(), 3);

        scheduler.start(&doc, &ctx, 200).unwrap();
        assert_eq!(scheduler.cursor(), 0);
    }

    #[test]
    fn table_length_matches_tokens_after_every_rebuild() {
        let doc = doc(&["One", "two.", "|", "Three"]);
        let mut scheduler = PlaybackScheduler::new();
        let lengths: Vec<usize> = [(300, true), (900, false), (1_500, true)]
            .into_iter()
            .map(|(wpm, ramp)| {
                let mut ctx = ctx(wpm, 3);
                ctx.speed_ramp = ramp;
                scheduler.rebuild_durations(&doc, &ctx);
                scheduler.durations().len()
            })
            .collect();
        assert_eq!(lengths, vec![4, 4, 4]);
    }
}
