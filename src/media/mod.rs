// Encoder seam
//
// - Commands: builder for the burn-in command line
// - Diagnostics: incremental scanner for the encoder's stderr
// - Processor: ffmpeg-backed encoder driving the child process

pub mod commands;
pub mod diagnostics;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub use commands::*;
pub use diagnostics::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;
use crate::matcher::MatchedPair;

/// Burns a pair's subtitles into its video
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Encode `pair` into `output_path`, reporting progress as it is parsed.
    ///
    /// `on_progress` receives completion percentages (0-100, one decimal).
    /// Resolves once the encoder has exited: `Ok` only for a zero exit status.
    async fn encode(
        &self,
        pair: &MatchedPair,
        output_path: &Path,
        on_progress: &(dyn Fn(f64) + Send + Sync),
    ) -> Result<()>;
}

/// Factory for creating encoder instances
pub struct EncoderFactory;

impl EncoderFactory {
    /// Create the default encoder implementation (FFmpeg-based)
    pub fn create_encoder(config: MediaConfig) -> Arc<dyn Encoder> {
        Arc::new(processor::FfmpegEncoder::new(config))
    }
}
