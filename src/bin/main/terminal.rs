use core::fmt::Write as _;
use std::io::{self, Write as _};

use cadence_core::{
    render::{RenderSpec, Screen},
    telemetry::TelemetrySnapshot,
};
use heapless::String as HeaplessString;

/// Column the pivot letter of a split word is pinned to.
const PIVOT_COLUMN: usize = 16;
const LINE_BYTES: usize = 320;
const CENTER_WIDTH: usize = 40;

pub(super) type Line = HeaplessString<LINE_BYTES>;

/// Single-line terminal surface: every draw rewrites the current line.
pub(super) struct TerminalRenderer {
    out: io::Stdout,
}

impl TerminalRenderer {
    pub(super) fn new() -> Self {
        Self { out: io::stdout() }
    }

    pub(super) fn render(&mut self, screen: Screen<'_>) -> io::Result<()> {
        let mut out = self.out.lock();
        match screen {
            Screen::Finished { .. } => {
                out.write_all(b"\r\x1b[2K")?;
                for line in summary_lines(&screen) {
                    writeln!(out, "{line}")?;
                }
            }
            _ => write!(out, "\r\x1b[2K{}", format_screen(&screen))?,
        }
        out.flush()
    }
}

pub(super) fn format_screen(screen: &Screen<'_>) -> Line {
    let mut line = Line::new();
    // A full buffer truncates the line rather than failing the draw.
    let _ = match screen {
        Screen::Empty => Ok(()),
        Screen::Reading { visible: false, .. } => Ok(()),
        Screen::Reading {
            spec,
            wpm,
            cursor,
            total,
            chapter,
            playing,
            ..
        } => write_reading(&mut line, spec, *wpm, *cursor, *total, *chapter, *playing),
        Screen::Finished { summary } => write!(
            line,
            "done: {} words in {}",
            summary.total_words, summary.elapsed
        ),
    };
    line
}

fn write_reading(
    line: &mut Line,
    spec: &RenderSpec<'_>,
    wpm: u16,
    cursor: usize,
    total: usize,
    chapter: Option<&str>,
    playing: bool,
) -> core::fmt::Result {
    match spec {
        RenderSpec::Split {
            before,
            pivot,
            after,
            ..
        } => {
            let lead = before.chars().count();
            let pad = PIVOT_COLUMN.saturating_sub(lead);
            write!(line, "{:pad$}{before}[{pivot}]{after}", "")?;
            // Keep the status column steady for words of any length.
            let used = pad + lead + pivot.chars().count() + 2 + after.chars().count();
            let fill = (PIVOT_COLUMN * 2 + 2).saturating_sub(used);
            write!(line, "{:fill$}", "")?;
        }
        RenderSpec::Centered { text, .. } => {
            write!(line, "{text:^CENTER_WIDTH$}")?;
        }
    }

    write!(line, "  | {wpm} wpm {}/{}", cursor.saturating_add(1), total)?;
    if let Some(title) = chapter {
        write!(line, " | {title}")?;
    }
    if !playing {
        line.push_str(" | paused").map_err(|_| core::fmt::Error)?;
    }
    Ok(())
}

pub(super) fn summary_lines(screen: &Screen<'_>) -> Vec<Line> {
    let Screen::Finished { summary } = screen else {
        return Vec::new();
    };

    let mut lines = Vec::with_capacity(5);
    let mut push = |args: core::fmt::Arguments<'_>| {
        let mut line = Line::new();
        let _ = line.write_fmt(args);
        lines.push(line);
    };
    push(format_args!("Finished"));
    push(format_args!("  words:    {}", summary.total_words));
    push(format_args!("  pages:    ~{}", summary.estimated_pages));
    push(format_args!("  time:     {}", summary.elapsed));
    push(format_args!(
        "  wpm:      {} avg / {} peak",
        summary.average_wpm, summary.peak_wpm
    ));
    lines
}

pub(super) fn format_stats(snapshot: &TelemetrySnapshot) -> Line {
    let mut line = Line::new();
    let _ = write!(
        line,
        "read={} progress={}% session={} avg_wpm={}",
        snapshot.words_read,
        snapshot.percent_complete,
        snapshot.session_time,
        snapshot.average_wpm
    );
    if let Some(remaining) = snapshot.estimated_remaining {
        let _ = write!(line, " remaining={remaining}");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::telemetry::{ClockTime, SessionSummary};

    fn reading(spec: RenderSpec<'_>, visible: bool) -> Screen<'_> {
        Screen::Reading {
            spec,
            visible,
            playing: true,
            wpm: 300,
            cursor: 4,
            total: 10,
            chapter: Some("One"),
        }
    }

    #[test]
    fn split_word_pins_pivot_to_column() {
        let short = format_screen(&reading(RenderSpec::split("hi"), true));
        let long = format_screen(&reading(RenderSpec::split("international"), true));
        assert_eq!(short.find('['), Some(PIVOT_COLUMN));
        assert_eq!(long.find('['), Some(PIVOT_COLUMN));
        assert!(long.contains("int[e]rnational"));
        assert!(long.ends_with("| 300 wpm 5/10 | One"));
    }

    #[test]
    fn blank_interval_clears_line() {
        assert!(format_screen(&reading(RenderSpec::split("word"), false)).is_empty());
        assert!(format_screen(&Screen::Empty).is_empty());
    }

    #[test]
    fn centered_chunk_is_padded() {
        let line = format_screen(&reading(RenderSpec::centered("the quick fox", 3), true));
        assert!(line.starts_with("             the quick fox"));
    }

    #[test]
    fn summary_lists_totals() {
        let summary = SessionSummary {
            average_wpm: 280,
            peak_wpm: 340,
            total_words: 1_200,
            estimated_pages: 4,
            elapsed: ClockTime::from_secs(257),
        };
        let lines = summary_lines(&Screen::Finished { summary: &summary });
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3].as_str(), "  time:     4:17");
        assert_eq!(lines[4].as_str(), "  wpm:      280 avg / 340 peak");
    }

    #[test]
    fn stats_line_omits_remaining_when_done() {
        let snapshot = TelemetrySnapshot {
            words_read: 10,
            percent_complete: 100,
            session_time: ClockTime::from_secs(5),
            estimated_remaining: None,
            average_wpm: 120,
        };
        assert_eq!(
            format_stats(&snapshot).as_str(),
            "read=10 progress=100% session=0:05 avg_wpm=120"
        );
    }
}
