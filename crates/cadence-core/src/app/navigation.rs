impl<S, P> Reader<S, P>
where
    S: SpeechEngine,
    P: ProgressStore,
{
    /// Replaces the document and resets the whole session around it.
    pub fn load_document(&mut self, document: Document, now_ms: u64) {
        self.pause(now_ms);
        self.document = document;
        self.scheduler.reset();
        self.telemetry.reset();
        self.history.clear();
        self.bookmarks.clear();
        self.summary = None;
        self.last_snapshot = None;
        self.prepare_session();
    }

    pub fn resume_offer(&self) -> Option<ResumeOffer> {
        self.resume_offer
    }

    pub fn dismiss_resume(&mut self) {
        self.resume_offer = None;
    }

    pub fn accept_resume(&mut self, offer: ResumeOffer, now_ms: u64) {
        self.resume_offer = None;
        info!("reader: resuming at {}", offer.cursor_index);
        self.jump_to_index(offer.cursor_index, now_ms);
    }

    /// Pauses, rewinds to the first token and forgets the word history.
    pub fn restart(&mut self, now_ms: u64) {
        self.pause(now_ms);
        self.summary = None;
        self.history.clear();
        self.scheduler.seek(&self.document, &self.ctx, 0);
        self.push_history();
        self.pending_redraw = true;
    }

    pub fn jump_words(&mut self, delta: isize, now_ms: u64) {
        let target = self.scheduler.cursor().saturating_add_signed(delta);
        self.jump_to_index(target, now_ms);
    }

    /// Seeks to `index` (clamped) and keeps playing if playback was active.
    pub fn jump_to_index(&mut self, index: usize, now_ms: u64) {
        let was_playing = self.pause(now_ms);
        self.summary = None;
        self.scheduler.seek(&self.document, &self.ctx, index);
        self.push_history();
        self.pending_redraw = true;
        if was_playing {
            self.play(now_ms);
        }
    }

    pub fn jump_to_end(&mut self, now_ms: u64) {
        self.pause(now_ms);
        self.summary = None;
        self.scheduler
            .seek(&self.document, &self.ctx, self.document.len().saturating_sub(1));
        self.push_history();
        self.pending_redraw = true;
    }

    pub fn jump_to_chapter(&mut self, index: usize, now_ms: u64) -> bool {
        let Some(offset) = self
            .document
            .chapters()
            .get(index)
            .map(|chapter| chapter.token_offset)
        else {
            return false;
        };
        self.jump_to_index(offset, now_ms);
        true
    }

    /// Index of the chapter the cursor is in.
    pub fn current_chapter(&self) -> Option<usize> {
        self.document.chapter_index_at(self.scheduler.cursor())
    }

    /// Bookmarks the cursor, labelled with the words that follow it.
    pub fn add_bookmark(&mut self, now_ms: u64) -> usize {
        let cursor = self.scheduler.cursor();
        let mut label = [0u8; BOOKMARK_LABEL_BYTES];
        let label = join_limited(
            self.document.words_from(cursor, BOOKMARK_CONTEXT_WORDS),
            &mut label,
            BOOKMARK_CONTEXT_WORDS,
            BOOKMARK_CONTEXT_CHARS,
        );

        self.bookmarks.push(Bookmark {
            cursor_index: cursor,
            label: String::from(label),
            created_at_ms: now_ms,
        });
        debug!("reader: bookmark at {} \"{}\"", cursor, label);
        self.bookmarks.len() - 1
    }

    pub fn remove_bookmark(&mut self, index: usize) -> Option<Bookmark> {
        (index < self.bookmarks.len()).then(|| self.bookmarks.remove(index))
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn jump_to_bookmark(&mut self, index: usize, now_ms: u64) -> bool {
        let Some(cursor) = self.bookmarks.get(index).map(|bookmark| bookmark.cursor_index) else {
            return false;
        };
        self.jump_to_index(cursor, now_ms);
        true
    }
}
