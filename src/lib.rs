//! Subburn - Batch Subtitle Burn-in
//!
//! Pairs video files with subtitle files by normalized name and burns the
//! subtitles in with ffmpeg, a fixed-size batch at a time.

pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod matcher;
pub mod media;
pub mod progress;
pub mod runner;
pub mod workflow;
