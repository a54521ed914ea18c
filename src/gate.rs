use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::Result;

/// Operator's answer at a batch boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    Halt,
}

/// Pause between batches
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BatchGate: Send + Sync {
    /// Wait until the operator allows batch `next_batch` (1-based) to start
    async fn wait_for_next(&self, next_batch: usize, total_batches: usize) -> Result<GateDecision>;
}

/// Prompts on stdout and waits for a line of input.
///
/// One line reader lives for the whole run, so answers piped in ahead of
/// time are consumed one per batch boundary.
pub struct StdinGate<R = BufReader<Stdin>> {
    lines: Mutex<Lines<R>>,
}

impl StdinGate {
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl Default for StdinGate {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: AsyncBufRead + Unpin> StdinGate<R> {
    /// Gate reading answers from `reader` instead of stdin
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
        }
    }
}

fn decide(line: &str) -> GateDecision {
    match line.trim().to_lowercase().as_str() {
        "q" | "quit" => GateDecision::Halt,
        _ => GateDecision::Continue,
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> BatchGate for StdinGate<R> {
    async fn wait_for_next(&self, next_batch: usize, total_batches: usize) -> Result<GateDecision> {
        {
            let mut stdout = std::io::stdout().lock();
            write!(
                stdout,
                "\nPress Enter to start batch {}/{} (q to stop): ",
                next_batch, total_batches
            )?;
            stdout.flush()?;
        }

        let Some(line) = self.lines.lock().await.next_line().await? else {
            warn!("Input closed before batch {}/{}, stopping", next_batch, total_batches);
            return Ok(GateDecision::Halt);
        };

        let decision = decide(&line);
        if decision == GateDecision::Halt {
            info!("Operator stopped the run before batch {}/{}", next_batch, total_batches);
        }
        Ok(decision)
    }
}

/// Starts every batch without asking
pub struct AutoContinue;

#[async_trait]
impl BatchGate for AutoContinue {
    async fn wait_for_next(&self, next_batch: usize, total_batches: usize) -> Result<GateDecision> {
        info!("Continuing with batch {}/{}", next_batch, total_batches);
        Ok(GateDecision::Continue)
    }
}
