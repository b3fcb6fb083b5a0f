impl<S, P> Reader<S, P>
where
    S: SpeechEngine,
    P: ProgressStore,
{
    /// Starts playback from the cursor, or from the top when at the end.
    pub fn play(&mut self, now_ms: u64) -> bool {
        if self.scheduler.is_playing() {
            return false;
        }

        if self
            .scheduler
            .start(&self.document, &self.ctx, now_ms)
            .is_none()
        {
            return false;
        }

        self.summary = None;
        self.telemetry.start(now_ms);
        self.stats_due_ms = Some(now_ms.saturating_add(STATS_REFRESH_MS));
        self.save_due_ms = Some(now_ms.saturating_add(PROGRESS_SAVE_MS));
        self.push_history();
        if self.ctx.narration {
            self.narration
                .start(&self.document, self.scheduler.cursor(), self.ctx.wpm, now_ms);
        }
        self.pending_redraw = true;
        true
    }

    /// Stops every timeline and persists the position. Safe to call when already paused.
    pub fn pause(&mut self, now_ms: u64) -> bool {
        let was_playing = self.scheduler.stop();
        self.telemetry.pause(now_ms);
        self.narration.stop();
        self.stats_due_ms = None;
        self.save_due_ms = None;
        self.persist(now_ms);
        if was_playing {
            self.pending_redraw = true;
        }
        was_playing
    }

    pub fn toggle(&mut self, now_ms: u64) -> bool {
        if self.scheduler.is_playing() {
            self.pause(now_ms);
            false
        } else {
            self.play(now_ms)
        }
    }

    /// Frame callback entry point. A ticket from an earlier chain is ignored.
    pub fn on_frame(&mut self, ticket: FrameTicket, now_ms: u64) -> TickResult {
        match self
            .scheduler
            .on_frame(ticket, &self.ctx, &self.document, now_ms)
        {
            FrameEvent::Stale | FrameEvent::Waiting => TickResult::NONE,
            FrameEvent::Revealed => {
                self.push_history();
                TickResult::RENDER
            }
            FrameEvent::Advanced { words, blank_ms } => {
                self.telemetry.record_advance(now_ms, words);
                if blank_ms == 0 {
                    self.push_history();
                }
                TickResult::RENDER
            }
            FrameEvent::Finished => {
                self.finish_session(now_ms);
                TickResult {
                    render_requested: true,
                    stats_refreshed: false,
                    finished: true,
                }
            }
        }
    }

    pub fn on_narration_event(&mut self, event: NarrationEvent) {
        let _ = self.narration.on_event(&self.document, event, self.ctx.wpm);
    }

    /// Re-picks the narration voice after the engine's voice list changed.
    pub fn refresh_voices(&mut self) {
        self.narration.select_voice(&self.document);
    }

    fn tick_timers(&mut self, now_ms: u64) -> TickResult {
        let mut result = TickResult::NONE;

        if let Some(due) = self.stats_due_ms
            && now_ms >= due
        {
            self.last_snapshot = Some(self.snapshot(now_ms));
            self.stats_due_ms = Some(next_due(due, now_ms, STATS_REFRESH_MS));
            result.stats_refreshed = true;
        }

        if let Some(due) = self.save_due_ms
            && now_ms >= due
        {
            self.persist(now_ms);
            self.save_due_ms = Some(next_due(due, now_ms, PROGRESS_SAVE_MS));
        }

        result
    }

    fn finish_session(&mut self, now_ms: u64) {
        self.narration.stop();
        self.telemetry.pause(now_ms);
        self.stats_due_ms = None;
        self.save_due_ms = None;

        let summary = self.telemetry.summary(now_ms, &self.document, self.ctx.wpm);
        info!(
            "reader: finished words={} avg_wpm={} peak_wpm={} elapsed={}",
            summary.total_words, summary.average_wpm, summary.peak_wpm, summary.elapsed
        );
        self.summary = Some(summary);
        self.last_snapshot = Some(self.snapshot(now_ms));
        self.persist(now_ms);
    }

    /// Best-effort write of the cursor. Failures are logged, never surfaced.
    fn persist(&mut self, now_ms: u64) {
        let cursor = self.scheduler.cursor();
        if cursor == 0 {
            return;
        }

        let progress = SavedProgress {
            document_identity: String::from(self.document.identity()),
            cursor_index: cursor,
            saved_at_ms: now_ms,
        };
        match self.store.write(PROGRESS_KEY, &progress) {
            Ok(()) => debug!("reader: progress saved at {}", cursor),
            Err(err) => warn!("reader: progress write failed: {:?}", err),
        }
    }

    /// Rebuilds per-document state: table, first chunk, voice and resume offer.
    fn prepare_session(&mut self) {
        self.scheduler.rebuild_durations(&self.document, &self.ctx);
        self.scheduler.seek(&self.document, &self.ctx, 0);
        self.push_history();
        self.narration.select_voice(&self.document);
        self.resume_offer = self.read_resume_offer();
        self.pending_redraw = true;
        info!(
            "reader: loaded {} tokens={} words={} chapters={}",
            self.document.identity(),
            self.document.len(),
            self.document.real_token_count(),
            self.document.chapters().len()
        );
    }

    fn read_resume_offer(&mut self) -> Option<ResumeOffer> {
        match self.store.read(PROGRESS_KEY) {
            Ok(Some(saved)) => ResumeOffer::from_saved(&saved, &self.document),
            Ok(None) => None,
            Err(err) => {
                warn!("reader: progress read failed: {:?}", err);
                None
            }
        }
    }

    /// Records the first word of the chunk on screen, once per position.
    fn push_history(&mut self) {
        if !self.scheduler.visible() {
            return;
        }
        let Some(chunk) = self.scheduler.chunk() else {
            return;
        };
        if self.history.recent() == Some(&chunk.start) {
            return;
        }
        self.history.write(chunk.start);
    }
}

fn next_due(due: u64, now_ms: u64, period: u64) -> u64 {
    let next = due.saturating_add(period);
    if next > now_ms {
        next
    } else {
        now_ms.saturating_add(period)
    }
}
