use async_trait::async_trait;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, BurnError};
use crate::matcher::MatchedPair;
use super::{DiagnosticEvent, DiagnosticParser, Encoder, MediaCommandBuilder};

const READ_CHUNK: usize = 4096;

/// Encoder running ffmpeg as a child process
pub struct FfmpegEncoder {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl FfmpegEncoder {
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn encode(
        &self,
        pair: &MatchedPair,
        output_path: &Path,
        on_progress: &(dyn Fn(f64) + Send + Sync),
    ) -> Result<()> {
        let label = pair.label();
        info!(
            "Burning {} into {} -> {}",
            pair.subtitle_path.display(),
            pair.video_path.display(),
            output_path.display()
        );

        let command = self.command_builder.burn_subtitles(
            &pair.video_path,
            &pair.subtitle_path,
            output_path,
            &self.config,
        );

        let mut child = command
            .spawn_with_stderr()
            .map_err(|e| {
                BurnError::EncoderLaunch(format!("{}: {} ({})", self.config.binary_path, e, label))
            })?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| BurnError::Media(format!("encoder stderr not captured for {}", label)))?;

        let mut parser = DiagnosticParser::new();
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let read = stderr.read(&mut buf).await?;
            if read == 0 {
                break;
            }
            report(&parser.feed(&buf[..read]), &parser, on_progress);
        }
        report(&parser.finish(), &parser, on_progress);

        let status = child.wait().await?;
        if status.success() {
            debug!(
                "Encoder finished for {} (source duration {:?}s)",
                label,
                parser.duration()
            );
            return Ok(());
        }

        let exit = match status.code() {
            Some(code) => format!("exit code {}", code),
            None => "termination by signal".to_string(),
        };
        let tail = parser.tail();
        let message = if tail.is_empty() {
            format!("{} failed with {}", label, exit)
        } else {
            format!("{} failed with {}: {}", label, exit, tail)
        };
        Err(BurnError::EncoderFailed(message))
    }
}

fn report(
    events: &[DiagnosticEvent],
    parser: &DiagnosticParser,
    on_progress: &(dyn Fn(f64) + Send + Sync),
) {
    for event in events {
        if let DiagnosticEvent::Position(position) = event {
            if let Some(percentage) = parser.percentage_at(*position) {
                on_progress(percentage);
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use parking_lot::Mutex;
    use std::os::unix::fs::PermissionsExt;

    fn fake_encoder(dir: &TempDir, body: &str) -> String {
        let script = dir.child("fake-ffmpeg.sh");
        script.write_str(&format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(script.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
        script.path().to_string_lossy().to_string()
    }

    fn pair(dir: &TempDir) -> MatchedPair {
        MatchedPair {
            video_path: dir.path().join("movie.mp4"),
            subtitle_path: dir.path().join("movie.srt"),
        }
    }

    fn encoder(binary_path: String) -> FfmpegEncoder {
        FfmpegEncoder::new(MediaConfig {
            binary_path,
            ..MediaConfig::default()
        })
    }

    #[tokio::test]
    async fn test_progress_reported_from_stderr() {
        let dir = TempDir::new().unwrap();
        let binary = fake_encoder(
            &dir,
            "echo '  Duration: 00:00:10.00, start: 0.000000' >&2\n\
             printf 'frame=1 time=00:00:02.50 bitrate=N/A\\r' >&2\n\
             printf 'frame=2 time=00:00:05.00 bitrate=N/A\\r' >&2\n\
             exit 0",
        );
        let seen = Mutex::new(Vec::new());
        let on_progress = |p: f64| seen.lock().push(p);

        let result = encoder(binary)
            .encode(&pair(&dir), &dir.path().join("out.mp4"), &on_progress)
            .await;

        tokio_test::assert_ok!(result);
        assert_eq!(*seen.lock(), vec![25.0, 50.0]);
    }

    #[tokio::test]
    async fn test_no_duration_means_no_progress() {
        let dir = TempDir::new().unwrap();
        let binary = fake_encoder(&dir, "echo 'frame=1 time=00:00:02.50' >&2\nexit 0");
        let seen = Mutex::new(Vec::new());
        let on_progress = |p: f64| seen.lock().push(p);

        let result = encoder(binary)
            .encode(&pair(&dir), &dir.path().join("out.mp4"), &on_progress)
            .await;

        tokio_test::assert_ok!(result);
        assert!(seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_nonzero_exit_names_file() {
        let dir = TempDir::new().unwrap();
        let binary = fake_encoder(&dir, "echo 'Invalid data found when processing input' >&2\nexit 1");

        let err = encoder(binary)
            .encode(&pair(&dir), &dir.path().join("out.mp4"), &|_: f64| {})
            .await
            .unwrap_err();

        match err {
            BurnError::EncoderFailed(message) => {
                assert!(message.contains("movie.mp4"));
                assert!(message.contains("exit code 1"));
                assert!(message.contains("Invalid data found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_launch_error() {
        let dir = TempDir::new().unwrap();
        let binary = dir.path().join("no-such-ffmpeg").to_string_lossy().to_string();

        let err = encoder(binary)
            .encode(&pair(&dir), &dir.path().join("out.mp4"), &|_: f64| {})
            .await
            .unwrap_err();

        assert!(matches!(err, BurnError::EncoderLaunch(_)));
    }
}
