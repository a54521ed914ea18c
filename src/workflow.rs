use chrono::{DateTime, Local};
use futures::future::join_all;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::gate::{BatchGate, GateDecision};
use crate::matcher::find_matches;
use crate::media::Encoder;
use crate::progress::ProgressTracker;
use crate::runner::{BatchResult, ConversionRunner};

/// Tally for one batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub batch: usize,
    pub total_batches: usize,
    pub succeeded: usize,
    pub failures: Vec<BatchResult>,
}

impl BatchReport {
    fn from_results(batch: usize, total_batches: usize, results: Vec<BatchResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        let failures = results.into_iter().filter(|r| !r.success).collect();
        Self {
            batch,
            total_batches,
            succeeded,
            failures,
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat(50))?;
        writeln!(f, "Batch {}/{} complete", self.batch, self.total_batches)?;
        writeln!(f, "  Succeeded: {}", self.succeeded)?;
        writeln!(f, "  Failed:    {}", self.failed())?;
        if !self.failures.is_empty() {
            writeln!(f, "  Failed files:")?;
            for failure in &self.failures {
                writeln!(
                    f,
                    "    - {}: {}",
                    failure.file,
                    failure.error.as_deref().unwrap_or("unknown error")
                )?;
            }
        }
        write!(f, "{}", "-".repeat(50))
    }
}

/// Aggregate outcome of a run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub batches_run: usize,
    pub total_batches: usize,
    /// Operator stopped the run before every batch was started
    pub halted: bool,
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
}

impl RunSummary {
    fn new(total: usize, total_batches: usize) -> Self {
        Self {
            total,
            succeeded: 0,
            failed: 0,
            batches_run: 0,
            total_batches,
            halted: false,
            started_at: Local::now(),
            elapsed: Duration::ZERO,
        }
    }

    fn absorb(&mut self, report: &BatchReport) {
        self.succeeded += report.succeeded;
        self.failed += report.failed();
        self.batches_run += 1;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f, "All processing complete")?;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f, "Total:     {}", self.total)?;
        writeln!(f, "Succeeded: {}", self.succeeded)?;
        writeln!(f, "Failed:    {}", self.failed)?;
        writeln!(f, "Batches:   {}/{}", self.batches_run, self.total_batches)?;
        if self.halted {
            writeln!(
                f,
                "Stopped early: {} pairs not started",
                self.total - self.succeeded - self.failed
            )?;
        }
        writeln!(f, "Started:   {}", self.started_at.format("%Y-%m-%d %H:%M:%S"))?;
        write!(f, "Elapsed:   {:.1}s", self.elapsed.as_secs_f64())
    }
}

/// Runs matched pairs in fixed-size batches with an operator gate in between
pub struct BatchOrchestrator {
    config: Config,
    encoder: Arc<dyn Encoder>,
    tracker: Arc<ProgressTracker>,
    gate: Box<dyn BatchGate>,
}

impl BatchOrchestrator {
    pub fn new(
        config: Config,
        encoder: Arc<dyn Encoder>,
        tracker: Arc<ProgressTracker>,
        gate: Box<dyn BatchGate>,
    ) -> Self {
        Self {
            config,
            encoder,
            tracker,
            gate,
        }
    }

    /// Convert every matched pair in `input_dir`, writing into `output_dir`.
    ///
    /// Only directory creation and scanning errors abort the run; failed
    /// conversions are counted and reported.
    pub async fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Q,
    ) -> Result<RunSummary> {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref();
        let started = Instant::now();

        fs::create_dir_all(output_dir).await?;

        let pairs = find_matches(input_dir, &self.config.matching)?;
        if pairs.is_empty() {
            println!("No matching video/subtitle pairs found in {}", input_dir.display());
            info!("Nothing to do for {}", input_dir.display());
            return Ok(RunSummary::new(0, 0));
        }

        let batch_size = self.config.batch.batch_size.max(1);
        let total_batches = pairs.len().div_ceil(batch_size);
        info!(
            "Processing {} pairs in {} batches of up to {}",
            pairs.len(),
            total_batches,
            batch_size
        );

        self.tracker.reset(pairs.len());
        let runner = ConversionRunner::new(
            Arc::clone(&self.encoder),
            Arc::clone(&self.tracker),
            output_dir.to_path_buf(),
            self.config.media.clone(),
        );

        let mut summary = RunSummary::new(pairs.len(), total_batches);
        for (index, batch) in pairs.chunks(batch_size).enumerate() {
            let batch_number = index + 1;
            info!("Starting batch {}/{} ({} pairs)", batch_number, total_batches, batch.len());

            let results = join_all(batch.iter().map(|pair| runner.run(pair))).await;
            let report = BatchReport::from_results(batch_number, total_batches, results);
            println!("{}", report);
            info!(
                "Batch {}/{} done: {} succeeded, {} failed",
                batch_number,
                total_batches,
                report.succeeded,
                report.failed()
            );
            summary.absorb(&report);
            println!(
                "Running total: {} succeeded, {} failed, {}/{} done",
                summary.succeeded,
                summary.failed,
                self.tracker.completed(),
                self.tracker.total()
            );

            if batch_number < total_batches {
                let decision = self.gate.wait_for_next(batch_number + 1, total_batches).await?;
                if decision == GateDecision::Halt {
                    summary.halted = true;
                    break;
                }
            }
        }

        summary.elapsed = started.elapsed();
        println!("{}", summary);
        info!(
            "Run finished: {} succeeded, {} failed of {}",
            summary.succeeded, summary.failed, summary.total
        );
        Ok(summary)
    }
}
