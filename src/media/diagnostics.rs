use regex::Regex;
use std::collections::VecDeque;
use std::sync::LazyLock;
use tracing::debug;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Duration:\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("valid duration pattern")
});

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"time=\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("valid time pattern")
});

/// Number of non-progress lines kept for failure messages
const TAIL_LINES: usize = 3;

/// Marker recognised in the encoder's diagnostic stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticEvent {
    /// Total source duration in seconds, reported once
    Duration(f64),
    /// Processed position in seconds
    Position(f64),
}

/// Incremental scanner for ffmpeg's stderr.
///
/// Input arrives in arbitrary chunks. Records are split on `\n` and `\r`
/// and a trailing partial record is held until the next chunk.
#[derive(Debug, Default)]
pub struct DiagnosticParser {
    pending: Vec<u8>,
    duration: Option<f64>,
    tail: VecDeque<String>,
}

impl DiagnosticParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source duration, once the first `Duration:` marker has been seen
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Feed a chunk of raw stderr output
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<DiagnosticEvent> {
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(end) = self.pending.iter().position(|b| *b == b'\n' || *b == b'\r') {
            let record: Vec<u8> = self.pending.drain(..=end).collect();
            self.scan_record(&record[..end], &mut events);
        }
        events
    }

    /// Flush whatever partial record remains at end of stream
    pub fn finish(&mut self) -> Vec<DiagnosticEvent> {
        let record = std::mem::take(&mut self.pending);
        let mut events = Vec::new();
        self.scan_record(&record, &mut events);
        events
    }

    /// Percentage for a position, using the known duration
    pub fn percentage_at(&self, position: f64) -> Option<f64> {
        self.duration.and_then(|duration| percentage(position, duration))
    }

    /// Last few diagnostic lines that were not progress updates
    pub fn tail(&self) -> String {
        self.tail.iter().cloned().collect::<Vec<_>>().join(" | ")
    }

    fn scan_record(&mut self, record: &[u8], events: &mut Vec<DiagnosticEvent>) {
        let line = String::from_utf8_lossy(record);
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        if self.duration.is_none() {
            if let Some(seconds) = capture_seconds(&DURATION_RE, line) {
                debug!("Source duration: {:.2}s", seconds);
                self.duration = Some(seconds);
                events.push(DiagnosticEvent::Duration(seconds));
            }
        }

        match capture_seconds(&TIME_RE, line) {
            Some(seconds) => events.push(DiagnosticEvent::Position(seconds)),
            None => {
                if self.tail.len() == TAIL_LINES {
                    self.tail.pop_front();
                }
                self.tail.push_back(line.to_string());
            }
        }
    }
}

fn capture_seconds(pattern: &Regex, line: &str) -> Option<f64> {
    let caps = pattern.captures(line)?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// `100 * position / duration`, clamped to 0..=100 and rounded to one decimal.
/// A non-positive duration yields nothing.
pub fn percentage(position: f64, duration: f64) -> Option<f64> {
    if duration <= 0.0 {
        return None;
    }
    let raw = (position / duration * 100.0).clamp(0.0, 100.0);
    Some((raw * 10.0).round() / 10.0)
}
