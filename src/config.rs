use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, BurnError};

fn default_concurrency() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub batch: BatchConfig,
    pub matching: MatchConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of pairs converted together before the next operator gate
    pub batch_size: usize,
    /// Worker hint (CPU count minus one). Reported at startup only;
    /// batches run fully parallel regardless of this value.
    pub concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Extensions recognised as video files, compared case-insensitively
    pub video_extensions: Vec<String>,
    /// Extensions recognised as subtitle files, compared case-insensitively
    pub subtitle_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Hardware decode hint passed to `-hwaccel`
    pub hwaccel: String,
    /// ASS style override used when burning subtitles in
    pub subtitle_style: String,
    pub video_codec: String,
    /// Encoding speed (ultrafast, fast, medium, slow, veryslow)
    pub preset: String,
    /// Quality (0-51, lower = better quality)
    pub crf: u32,
    /// Encoder threads, "0" lets ffmpeg decide
    pub threads: String,
    pub max_rate: String,
    pub buf_size: String,
    pub tune: String,
    pub max_muxing_queue_size: u32,
    /// Appended to the video's file stem to name the output
    pub output_suffix: String,
    pub output_extension: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            concurrency: default_concurrency(),
        }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            video_extensions: vec![
                ".mp4".to_string(),
                ".mkv".to_string(),
                ".avi".to_string(),
                ".mov".to_string(),
            ],
            subtitle_extensions: vec![".srt".to_string()],
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            hwaccel: "auto".to_string(),
            subtitle_style: "FontName=Arial,FontSize=24,PrimaryColour=&H00FFFFFF,OutlineColour=&H00000000,BorderStyle=1,Outline=1".to_string(),
            video_codec: "libx264".to_string(),
            preset: "ultrafast".to_string(),
            crf: 28,
            threads: "0".to_string(),
            max_rate: "1.5M".to_string(),
            buf_size: "3M".to_string(),
            tune: "fastdecode".to_string(),
            max_muxing_queue_size: 1024,
            output_suffix: "_output".to_string(),
            output_extension: "mp4".to_string(),
        }
    }
}

impl MatchConfig {
    pub fn is_video_extension(&self, extension: &str) -> bool {
        contains_extension(&self.video_extensions, extension)
    }

    pub fn is_subtitle_extension(&self, extension: &str) -> bool {
        contains_extension(&self.subtitle_extensions, extension)
    }
}

fn contains_extension(allowed: &[String], extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    allowed
        .iter()
        .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(extension))
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BurnError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch.batch_size == 0 {
            return Err(BurnError::Config("batch_size must be at least 1".to_string()));
        }
        if self.matching.video_extensions.is_empty() {
            return Err(BurnError::Config("video_extensions must not be empty".to_string()));
        }
        if self.matching.subtitle_extensions.is_empty() {
            return Err(BurnError::Config("subtitle_extensions must not be empty".to_string()));
        }
        Ok(())
    }
}
