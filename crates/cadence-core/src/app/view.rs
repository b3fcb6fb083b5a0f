impl<S, P> Reader<S, P>
where
    S: SpeechEngine,
    P: ProgressStore,
{
    pub fn new(document: Document, config: ReaderConfig, speech: S, store: P) -> Self {
        let config = config.normalized();
        let ctx = config.playback_context();

        let mut reader = Self {
            document,
            config,
            ctx,
            scheduler: PlaybackScheduler::new(),
            narration: NarrationSynchronizer::new(speech),
            telemetry: TelemetryRecorder::new(),
            store,
            history: HistoryBuffer::new(),
            bookmarks: Vec::new(),
            resume_offer: None,
            summary: None,
            last_snapshot: None,
            stats_due_ms: None,
            save_due_ms: None,
            pending_redraw: true,
        };
        reader.prepare_session();
        reader
    }

    /// Runs the armed frame callback, if any, then the low-frequency timers.
    pub fn tick(&mut self, now_ms: u64) -> TickResult {
        let mut result = match self.scheduler.frame_ticket() {
            Some(ticket) => self.on_frame(ticket, now_ms),
            None => TickResult::NONE,
        };

        self.narration.tick(now_ms);
        result = result.merge(self.tick_timers(now_ms));

        if self.pending_redraw {
            self.pending_redraw = false;
            result.render_requested = true;
        }
        result
    }

    pub fn with_screen<R, F>(&self, f: F) -> R
    where
        F: FnOnce(Screen<'_>) -> R,
    {
        if let Some(summary) = &self.summary {
            return f(Screen::Finished { summary });
        }

        let Some(chunk) = self.scheduler.chunk() else {
            return f(Screen::Empty);
        };

        let tokens = self.document.tokens();
        let mut centered = [0u8; CENTERED_TEXT_BYTES];
        let spec = match chunk.layout {
            LayoutMode::Split => {
                let word = chunk.words(tokens).next().unwrap_or("");
                RenderSpec::split(word)
            }
            LayoutMode::Centered => {
                let text = join_limited(
                    chunk.words(tokens),
                    &mut centered,
                    chunk.word_count(),
                    usize::MAX,
                );
                RenderSpec::centered(text, chunk.word_count())
            }
        };

        let cursor = self.scheduler.cursor();
        let chapter = self
            .document
            .chapter_index_at(cursor)
            .and_then(|index| self.document.chapters().get(index))
            .map(|chapter| chapter.title.as_str());

        f(Screen::Reading {
            spec,
            visible: self.scheduler.visible(),
            playing: self.scheduler.is_playing(),
            wpm: self.ctx.wpm,
            cursor,
            total: self.document.len(),
            chapter,
        })
    }

    pub fn snapshot(&self, now_ms: u64) -> TelemetrySnapshot {
        self.telemetry
            .snapshot(now_ms, &self.document, self.scheduler.cursor(), self.ctx.wpm)
    }

    /// Snapshot taken by the last stats refresh.
    pub fn last_snapshot(&self) -> Option<TelemetrySnapshot> {
        self.last_snapshot
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// First word of each recently revealed chunk, oldest first.
    pub fn recent_words(&self) -> impl Iterator<Item = &str> + '_ {
        self.history
            .oldest_ordered()
            .filter_map(|index| self.document.token(*index).and_then(|token| token.as_word()))
    }

    pub fn wpm_history(&self) -> impl Iterator<Item = u16> + '_ {
        self.telemetry.wpm_history()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn context(&self) -> &PlaybackContext {
        &self.ctx
    }

    pub fn cursor(&self) -> usize {
        self.scheduler.cursor()
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    pub fn frame_ticket(&self) -> Option<FrameTicket> {
        self.scheduler.frame_ticket()
    }

    pub fn narration(&self) -> &NarrationSynchronizer<S> {
        &self.narration
    }

    pub fn speech_mut(&mut self) -> &mut S {
        self.narration.engine_mut()
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut P {
        &mut self.store
    }
}
