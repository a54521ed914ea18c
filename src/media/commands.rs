use std::path::Path;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::config::MediaConfig;

/// Media processing command: a binary plus its argument list
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add a flag followed by its value
    pub fn option<S1: Into<String>, S2: Into<String>>(self, flag: S1, value: S2) -> Self {
        self.arg(flag).arg(value)
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Hardware decode hint; must precede the input
    pub fn hwaccel<S: Into<String>>(self, mode: S) -> Self {
        self.option("-hwaccel", mode)
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.option("-c:v", codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.option("-c:a", codec)
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    /// Add video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.option("-vf", filter)
    }

    /// Spawn the command with stderr piped for progress scanning
    pub fn spawn_with_stderr(&self) -> std::io::Result<Child> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        Command::new(&self.binary_path)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
    }
}

/// Escape a path for use as a filter option value
pub fn escape_filter_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | ':' | '\'') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Builder for encoder commands
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build the subtitle burn-in command
    pub fn burn_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
        media: &MediaConfig,
    ) -> MediaCommand {
        let filter = format!(
            "subtitles={}:force_style='{}'",
            escape_filter_path(subtitle_path),
            media.subtitle_style
        );

        MediaCommand::new(&self.binary_path, "Subtitle burn-in")
            .hwaccel(&media.hwaccel)
            .input(video_path)
            .video_filter(filter)
            .video_codec(&media.video_codec)
            .option("-preset", &media.preset)
            .option("-crf", media.crf.to_string())
            .option("-threads", &media.threads)
            .copy_audio()
            .option("-maxrate", &media.max_rate)
            .option("-bufsize", &media.buf_size)
            .option("-tune", &media.tune)
            .option("-movflags", "+faststart")
            .option("-max_muxing_queue_size", media.max_muxing_queue_size.to_string())
            .overwrite()
            .output(output_path)
    }
}
