use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @const: Container extensions worth probing for subtitle streams
const VIDEO_EXTENSIONS: [&str; 8] = ["mp4", "mkv", "avi", "mov", "flv", "webm", "m4v", "ts"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: Extension marks a video container
    pub fn is_video_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                VIDEO_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    /// Recursively find video files under a directory, sorted for a stable
    /// processing order
    pub fn find_video_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if path.is_file() && Self::is_video_file(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Remove files, ignoring ones already gone
    pub fn remove_files<P: AsRef<Path>>(paths: &[P]) {
        for path in paths {
            let path = path.as_ref();
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    log::warn!("Failed to remove {}: {}", path.display(), e);
                }
            }
        }
    }
}
