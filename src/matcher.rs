use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::MatchConfig;
use crate::error::Result;

/// A video file and the subtitle file burned into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    pub video_path: PathBuf,
    pub subtitle_path: PathBuf,
}

impl MatchedPair {
    /// Label used for progress and result reporting (the video's file name)
    pub fn label(&self) -> String {
        self.video_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.video_path.display().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaKind {
    Video,
    Subtitle,
}

/// Keyed paths that remember first-insertion order while letting later
/// entries replace the path stored under an existing key.
#[derive(Default)]
struct KeyedPaths {
    order: Vec<String>,
    paths: HashMap<String, PathBuf>,
}

impl KeyedPaths {
    fn insert(&mut self, key: String, path: PathBuf) {
        if let Some(previous) = self.paths.insert(key.clone(), path) {
            debug!("Normalized name '{}' collides, replacing {}", key, previous.display());
        } else {
            self.order.push(key);
        }
    }

    fn get(&self, key: &str) -> Option<&PathBuf> {
        self.paths.get(key)
    }

    fn iter(&self) -> impl Iterator<Item = (&String, &PathBuf)> {
        self.order.iter().filter_map(|key| self.paths.get(key).map(|path| (key, path)))
    }
}

/// Lower-case a file stem and drop whitespace, `-`, `_`, brackets and parentheses
pub fn normalize_name(stem: &str) -> String {
    stem.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '_' | '[' | ']' | '(' | ')'))
        .collect()
}

fn classify(path: &Path, matching: &MatchConfig) -> Option<MediaKind> {
    let extension = path.extension()?.to_str()?;
    if matching.is_video_extension(extension) {
        Some(MediaKind::Video)
    } else if matching.is_subtitle_extension(extension) {
        Some(MediaKind::Subtitle)
    } else {
        None
    }
}

/// Pair videos with subtitles in the immediate entries of `dir`.
///
/// Pairs follow the enumeration order of the videos. When two files of the
/// same kind normalize to the same name, the later one wins.
pub fn find_matches<P: AsRef<Path>>(dir: P, matching: &MatchConfig) -> Result<Vec<MatchedPair>> {
    let dir = dir.as_ref();
    info!("Scanning {} for video/subtitle pairs", dir.display());

    let mut videos = KeyedPaths::default();
    let mut subtitles = KeyedPaths::default();

    for entry in WalkDir::new(dir).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) if entry.depth() == 0 => continue,
            Ok(entry) => entry,
            // Only the directory itself being unreadable aborts the scan
            Err(e) if e.depth() == 0 => return Err(std::io::Error::from(e).into()),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(kind) = classify(path, matching) else {
            continue;
        };
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let key = normalize_name(stem);
        match kind {
            MediaKind::Video => videos.insert(key, path.to_path_buf()),
            MediaKind::Subtitle => subtitles.insert(key, path.to_path_buf()),
        }
    }

    let pairs: Vec<MatchedPair> = videos
        .iter()
        .filter_map(|(key, video_path)| {
            subtitles.get(key).map(|subtitle_path| MatchedPair {
                video_path: video_path.clone(),
                subtitle_path: subtitle_path.clone(),
            })
        })
        .collect();

    info!("Found {} matched pairs", pairs.len());
    Ok(pairs)
}
