//! Shared progress state for a batch run.
//!
//! One [`ProgressTracker`] is created per invocation and shared by every
//! conversion task. Each task only touches the entry keyed by its own label;
//! the lock guards the shared counters and collections. Every state change
//! renders a fresh snapshot through the configured [`ProgressView`].

use parking_lot::Mutex;
use std::fmt;
use std::io::Write;

/// Minimum percentage change that is recorded (and rendered) for an item
pub const UPDATE_THRESHOLD: f64 = 0.1;

/// Number of finished items shown in a snapshot
pub const RECENT_RESULTS: usize = 5;

// Absorbs float noise such as 10.1 - 10.0 = 0.0999...
const THRESHOLD_EPSILON: f64 = 1e-9;

/// Destination for rendered snapshots
pub trait ProgressView: Send + Sync {
    fn render(&self, snapshot: &ProgressSnapshot);
}

/// Clears the terminal and redraws the snapshot on stdout
pub struct TerminalView;

impl ProgressView for TerminalView {
    fn render(&self, snapshot: &ProgressSnapshot) {
        let mut stdout = std::io::stdout().lock();
        // Rendering is best effort; a closed stdout must not fail a conversion.
        let _ = write!(stdout, "\x1B[2J\x1B[1;1H{}", snapshot);
        let _ = stdout.flush();
    }
}

#[derive(Debug, Default)]
struct ProgressState {
    total: usize,
    completed: usize,
    in_progress: Vec<(String, f64)>,
    results: Vec<(String, bool)>,
}

/// Point-in-time copy of the progress state
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub total: usize,
    pub completed: usize,
    pub in_progress: Vec<(String, f64)>,
    /// Most recent finished items, oldest first
    pub recent: Vec<(String, bool)>,
}

impl ProgressSnapshot {
    pub fn completion_percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 * 100.0 / self.total as f64
        }
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Subtitle burn-in progress")?;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(
            f,
            "Completed: {}/{} ({:.1}%)",
            self.completed,
            self.total,
            self.completion_percentage()
        )?;

        writeln!(f)?;
        writeln!(f, "In progress:")?;
        if self.in_progress.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for (label, percentage) in &self.in_progress {
            writeln!(f, "  {:<40} {:>5.1}%", label, percentage)?;
        }

        writeln!(f)?;
        writeln!(f, "Recently finished:")?;
        if self.recent.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for (label, success) in &self.recent {
            let marker = if *success { "✓" } else { "✗" };
            writeln!(f, "  {} {}", marker, label)?;
        }
        Ok(())
    }
}

pub struct ProgressTracker {
    state: Mutex<ProgressState>,
    view: Box<dyn ProgressView>,
}

impl ProgressTracker {
    pub fn new(view: Box<dyn ProgressView>) -> Self {
        Self {
            state: Mutex::new(ProgressState::default()),
            view,
        }
    }

    /// Tracker that redraws the terminal on every change
    pub fn terminal() -> Self {
        Self::new(Box::new(TerminalView))
    }

    /// Start a fresh run sized to `total` items
    pub fn reset(&self, total: usize) {
        let mut state = self.state.lock();
        *state = ProgressState {
            total,
            ..ProgressState::default()
        };
    }

    /// Register an in-flight item at 0%
    pub fn start(&self, label: &str) {
        let mut state = self.state.lock();
        match state.in_progress.iter().position(|(name, _)| name == label) {
            Some(index) => state.in_progress[index].1 = 0.0,
            None => state.in_progress.push((label.to_string(), 0.0)),
        }
        self.render_locked(&state);
    }

    /// Record a new percentage for an in-flight item.
    ///
    /// Changes smaller than [`UPDATE_THRESHOLD`] are dropped without a render.
    /// Returns whether the update was applied.
    pub fn update(&self, label: &str, percentage: f64) -> bool {
        let percentage = percentage.clamp(0.0, 100.0);
        let mut state = self.state.lock();
        let Some(entry) = state.in_progress.iter_mut().find(|(name, _)| name == label) else {
            return false;
        };
        if (percentage - entry.1).abs() + THRESHOLD_EPSILON < UPDATE_THRESHOLD {
            return false;
        }
        entry.1 = percentage;
        self.render_locked(&state);
        true
    }

    /// Move an item out of the in-flight set and record its outcome
    pub fn finish(&self, label: &str, success: bool) {
        let mut state = self.state.lock();
        state.in_progress.retain(|(name, _)| name != label);
        if state.results.iter().any(|(name, _)| name == label) {
            return;
        }
        state.results.push((label.to_string(), success));
        state.completed += 1;
        self.render_locked(&state);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.state.lock();
        Self::snapshot_of(&state)
    }

    pub fn total(&self) -> usize {
        self.state.lock().total
    }

    pub fn completed(&self) -> usize {
        self.state.lock().completed
    }

    #[cfg(test)]
    pub(crate) fn percentage(&self, label: &str) -> Option<f64> {
        self.state
            .lock()
            .in_progress
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, percentage)| *percentage)
    }

    #[cfg(test)]
    pub(crate) fn result(&self, label: &str) -> Option<bool> {
        self.state
            .lock()
            .results
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, success)| *success)
    }

    /// All finished items in completion order
    #[cfg(test)]
    pub(crate) fn results(&self) -> Vec<(String, bool)> {
        self.state.lock().results.clone()
    }

    fn snapshot_of(state: &ProgressState) -> ProgressSnapshot {
        let skip = state.results.len().saturating_sub(RECENT_RESULTS);
        ProgressSnapshot {
            total: state.total,
            completed: state.completed,
            in_progress: state.in_progress.clone(),
            recent: state.results[skip..].to_vec(),
        }
    }

    fn render_locked(&self, state: &ProgressState) {
        self.view.render(&Self::snapshot_of(state));
    }
}
