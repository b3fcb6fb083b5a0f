impl<S, P> Reader<S, P>
where
    S: SpeechEngine,
    P: ProgressStore,
{
    /// Returns the applied rate after step rounding and clamping.
    pub fn set_wpm(&mut self, wpm: u16) -> u16 {
        let wpm = self.config.clamp_wpm(wpm);
        if wpm != self.ctx.wpm {
            self.config.wpm = wpm;
            self.ctx.wpm = wpm;
            self.rebuild_if_playing();
            self.pending_redraw = true;
            debug!("reader: wpm={}", wpm);
        }
        wpm
    }

    pub fn adjust_wpm(&mut self, steps: i32) -> u16 {
        let delta = steps.saturating_mul(self.config.wpm_step as i32);
        let target = (self.ctx.wpm as i32).saturating_add(delta).clamp(0, u16::MAX as i32);
        self.set_wpm(target as u16)
    }

    pub fn set_chunk_size(&mut self, chunk_size: usize) -> usize {
        let chunk_size = chunk_size.clamp(1, self.config.max_chunk_size);
        if chunk_size == self.ctx.chunk_size {
            return chunk_size;
        }

        self.config.chunk_size = chunk_size;
        self.ctx.chunk_size = chunk_size;
        self.rebuild_if_playing();
        // The visible chunk follows the new size; its committed dwell stays.
        if self.summary.is_none() {
            self.scheduler.replan(&self.document, &self.ctx);
        }
        self.pending_redraw = true;
        debug!("reader: chunk_size={}", chunk_size);
        chunk_size
    }

    pub fn set_blank_flash(&mut self, enabled: bool) {
        self.config.blank_flash = enabled;
        self.ctx.blank_flash = enabled;
    }

    pub fn set_speed_ramp(&mut self, enabled: bool) {
        if self.ctx.speed_ramp == enabled {
            return;
        }
        self.config.speed_ramp = enabled;
        self.ctx.speed_ramp = enabled;
        self.rebuild_if_playing();
    }

    /// Turning narration on mid-playback starts it from the visual cursor.
    pub fn set_narration_enabled(&mut self, enabled: bool, now_ms: u64) {
        if self.ctx.narration == enabled {
            return;
        }
        self.config.narration = enabled;
        self.ctx.narration = enabled;

        if !enabled {
            self.narration.stop();
        } else if self.scheduler.is_playing() {
            self.narration
                .start(&self.document, self.scheduler.cursor(), self.ctx.wpm, now_ms);
        }
    }

    fn rebuild_if_playing(&mut self) {
        if self.scheduler.is_playing() {
            self.scheduler.rebuild_durations(&self.document, &self.ctx);
        }
    }
}
