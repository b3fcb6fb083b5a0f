use std::path::PathBuf;

use cadence_core::app::ReaderConfig;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "cadence")]
#[command(version)]
#[command(about = "Rapid serial visual presentation reader for plain-text files")]
pub(super) struct Args {
    /// Plain-text document to read
    pub(super) path: PathBuf,

    /// Words per minute (rounded to steps of 10, clamped to 100..=1500)
    #[arg(long, default_value_t = 700)]
    pub(super) wpm: u16,

    /// Words revealed together (1..=5)
    #[arg(long, default_value_t = 1)]
    pub(super) chunk_size: usize,

    /// Blank the display briefly between single words at low rates
    #[arg(long)]
    pub(super) blank_flash: bool,

    /// Show every word for the same time
    #[arg(long)]
    pub(super) no_speed_ramp: bool,

    /// Narrate alongside the visual reveal
    #[arg(long)]
    pub(super) narrate: bool,

    /// Mark the simulated voice as local (disables the keep-alive heartbeat)
    #[arg(long)]
    pub(super) local_voice: bool,

    /// Directory holding saved reading progress
    #[arg(long, value_name = "DIR", default_value = ".cadence")]
    pub(super) state_dir: PathBuf,

    /// Continue from the saved position when one matches this document
    #[arg(long)]
    pub(super) resume: bool,

    /// Frame callback period in milliseconds
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..=1_000))]
    pub(super) frame_ms: u64,
}

impl Args {
    pub(super) fn reader_config(&self) -> ReaderConfig {
        ReaderConfig {
            wpm: self.wpm,
            chunk_size: self.chunk_size,
            blank_flash: self.blank_flash,
            speed_ramp: !self.no_speed_ramp,
            narration: self.narrate,
            ..ReaderConfig::default()
        }
    }
}
