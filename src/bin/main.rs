use std::{
    process,
    time::{SystemTime, UNIX_EPOCH},
};

use cadence_core::app::Reader;
use clap::Parser;
use embassy_executor::Spawner;
use embassy_time::{Instant, Timer};
use log::{LevelFilter, error, info, warn};

use args::Args;
use error::HostError;
use progress_file::FileProgressStore;
use speech::SimulatedSpeech;
use terminal::TerminalRenderer;

#[path = "main/args.rs"]
mod args;
#[path = "main/error.rs"]
mod error;
#[path = "main/loader.rs"]
mod loader;
#[path = "main/progress_file.rs"]
mod progress_file;
#[path = "main/speech.rs"]
mod speech;
#[path = "main/terminal.rs"]
mod terminal;

type HostReader = Reader<SimulatedSpeech, FileProgressStore>;

/// Wall-clock milliseconds, advanced by the monotonic executor clock.
struct SessionClock {
    epoch_ms: u64,
    start: Instant,
}

impl SessionClock {
    fn start() -> Self {
        let epoch_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0);
        Self {
            epoch_ms,
            start: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch_ms.saturating_add(self.start.elapsed().as_millis())
    }
}

fn open_reader(args: &Args, now_ms: u64) -> Result<HostReader, HostError> {
    let document = loader::load_text_file(&args.path)?;
    let mut reader = Reader::new(
        document,
        args.reader_config(),
        SimulatedSpeech::new(args.local_voice),
        FileProgressStore::new(&args.state_dir),
    );

    match reader.resume_offer() {
        Some(offer) if args.resume => {
            info!(
                "resume: continuing at token {} ({}%)",
                offer.cursor_index, offer.percent_complete
            );
            reader.accept_resume(offer, now_ms);
        }
        Some(offer) => {
            info!(
                "resume: saved position {}% available; pass --resume to continue",
                offer.percent_complete
            );
            reader.dismiss_resume();
        }
        None => {}
    }

    if let Some(voice) = reader.narration().voice() {
        info!(
            "narration: voice={} lang={} local={}",
            voice.name, voice.lang, voice.local
        );
    }

    Ok(reader)
}

async fn run(args: Args) -> Result<(), HostError> {
    let clock = SessionClock::start();
    let mut reader = open_reader(&args, clock.now_ms())?;
    let mut terminal = TerminalRenderer::new();
    let mut display_fault_logged = false;

    reader.play(clock.now_ms());

    loop {
        let events = reader.speech_mut().poll();
        for event in events {
            reader.on_narration_event(event);
        }

        let now_ms = clock.now_ms();
        let result = reader.tick(now_ms);

        if result.render_requested
            && let Err(err) = reader.with_screen(|screen| terminal.render(screen))
            && !display_fault_logged
        {
            warn!("terminal: draw failed: {}", err);
            display_fault_logged = true;
        }

        if result.stats_refreshed
            && let Some(snapshot) = reader.last_snapshot()
        {
            info!("stats: {}", terminal::format_stats(&snapshot));
        }

        if result.finished {
            return Ok(());
        }

        Timer::after_millis(args.frame_ms).await;
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    if let Err(err) = run(args).await {
        error!("{err}");
        process::exit(1);
    }
}
