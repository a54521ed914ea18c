use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::MediaConfig;
use crate::matcher::MatchedPair;
use crate::media::Encoder;
use crate::progress::ProgressTracker;

/// Outcome of one conversion attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub success: bool,
    pub file: String,
    pub error: Option<String>,
}

impl BatchResult {
    pub fn succeeded(file: String) -> Self {
        Self {
            success: true,
            file,
            error: None,
        }
    }

    pub fn failed(file: String, error: String) -> Self {
        Self {
            success: false,
            file,
            error: Some(error),
        }
    }
}

/// Output location for a video: `<stem><suffix>.<extension>` inside `output_dir`
pub fn output_path_for(video_path: &Path, output_dir: &Path, media: &MediaConfig) -> PathBuf {
    let stem = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}{}.{}", stem, media.output_suffix, media.output_extension))
}

/// Drives one encode per pair and keeps the shared tracker in step.
///
/// Every call registers the item, forwards parsed progress, and finishes the
/// item exactly once whatever the encoder's outcome.
pub struct ConversionRunner {
    encoder: Arc<dyn Encoder>,
    tracker: Arc<ProgressTracker>,
    output_dir: PathBuf,
    media: MediaConfig,
}

impl ConversionRunner {
    pub fn new(
        encoder: Arc<dyn Encoder>,
        tracker: Arc<ProgressTracker>,
        output_dir: PathBuf,
        media: MediaConfig,
    ) -> Self {
        Self {
            encoder,
            tracker,
            output_dir,
            media,
        }
    }

    pub async fn run(&self, pair: &MatchedPair) -> BatchResult {
        let label = pair.label();
        let output_path = output_path_for(&pair.video_path, &self.output_dir, &self.media);

        self.tracker.start(&label);
        let on_progress = |percentage: f64| {
            self.tracker.update(&label, percentage);
        };

        match self.encoder.encode(pair, &output_path, &on_progress).await {
            Ok(()) => {
                self.tracker.finish(&label, true);
                info!("Converted {} -> {}", label, output_path.display());
                BatchResult::succeeded(label)
            }
            Err(e) => {
                self.tracker.finish(&label, false);
                warn!("Conversion failed for {}: {}", label, e);
                BatchResult::failed(label, e.to_string())
            }
        }
    }
}
