use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::{debug, error, warn};
use serde_json::{Value, from_str};
use tokio::process::Command;

use crate::language_utils;

// @module: Video container probing, subtitle extraction and embedding (ffmpeg)

/// Information about one subtitle stream in a container
#[derive(Debug, Clone)]
pub struct SubtitleStreamInfo {
    /// The stream index within the container
    pub index: usize,
    /// The codec name of the subtitle stream
    pub codec_name: String,
    /// The language tag if present
    pub language: Option<String>,
    /// The stream title if present
    pub title: Option<String>,
}

/// A subtitle stream extracted to its own file
#[derive(Debug, Clone)]
pub struct ExtractedSubtitle {
    /// Where the stream was written
    pub path: PathBuf,
    /// Title carried over from the stream, or the index when untitled
    pub title: String,
}

/// A translated subtitle file ready to be muxed back
#[derive(Debug, Clone)]
pub struct SubtitleTrack {
    /// Subtitle file to embed
    pub path: PathBuf,
    /// Track title metadata
    pub title: String,
    /// Track language metadata
    pub language: String,
}

/// Map a subtitle codec to the file extension of its text dialect.
/// Bitmap codecs (PGS, VobSub) have no text form and yield None.
fn extension_for_codec(codec_name: &str) -> Option<&'static str> {
    match codec_name {
        "subrip" | "srt" => Some("srt"),
        "ass" | "ssa" => Some("ass"),
        _ => None,
    }
}

/// List the subtitle streams of a video file
pub async fn probe_subtitle_streams<P: AsRef<Path>>(
    video_path: P,
) -> Result<Vec<SubtitleStreamInfo>> {
    let video_path = video_path.as_ref();

    if !video_path.exists() {
        return Err(anyhow!("Video file not found: {:?}", video_path));
    }

    let ffprobe_future = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "s",
            video_path.to_str().unwrap_or(""),
        ])
        .output();

    let timeout_duration = Duration::from_secs(60);
    let output = tokio::select! {
        result = ffprobe_future => {
            result.map_err(|e| anyhow!("Failed to execute ffprobe command: {}", e))?
        },
        _ = tokio::time::sleep(timeout_duration) => {
            return Err(anyhow!("ffprobe command timed out after 60 seconds"));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("ffprobe failed: {}", stderr);
        return Err(anyhow!("ffprobe command failed: {}", stderr));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }

    let json: Value = from_str(&stdout).context("Failed to parse ffprobe JSON output")?;

    let mut streams = Vec::new();
    if let Some(entries) = json.get("streams").and_then(|s| s.as_array()) {
        for stream in entries {
            let index = stream
                .get("index")
                .and_then(|v| v.as_u64())
                .map(|v| v as usize)
                .unwrap_or(0);

            let codec_name = stream
                .get("codec_name")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");

            let language = stream
                .get("tags")
                .and_then(|t| t.get("language"))
                .and_then(|l| l.as_str())
                .map(|s| s.to_string());

            let title = stream
                .get("tags")
                .and_then(|t| t.get("title"))
                .and_then(|l| l.as_str())
                .map(|s| s.to_string());

            streams.push(SubtitleStreamInfo {
                index,
                codec_name: codec_name.to_string(),
                language,
                title,
            });
        }
    }

    Ok(streams)
}

/// Check whether the container already carries a subtitle track in the
/// given language
pub async fn has_subtitle_language<P: AsRef<Path>>(video_path: P, language: &str) -> Result<bool> {
    let streams = probe_subtitle_streams(video_path).await?;
    Ok(streams.iter().any(|stream| {
        stream
            .language
            .as_deref()
            .is_some_and(|tag| language_utils::language_codes_match(tag, language))
    }))
}

/// Extract one subtitle stream to a file, preserving its codec
pub async fn extract_stream<P1: AsRef<Path>, P2: AsRef<Path>>(
    video_path: P1,
    stream_index: usize,
    output_path: P2,
) -> Result<()> {
    let video_path = video_path.as_ref();
    let output_path = output_path.as_ref();

    let ffmpeg_future = Command::new("ffmpeg")
        .args([
            "-y",
            "-i",
            video_path.to_str().unwrap_or_default(),
            "-map",
            &format!("0:{}", stream_index),
            "-c:s",
            "copy",
            output_path.to_str().unwrap_or_default(),
        ])
        .output();

    let timeout_duration = Duration::from_secs(120);
    let result = tokio::select! {
        result = ffmpeg_future => {
            result.map_err(|e| anyhow!("Failed to execute ffmpeg for subtitle extraction: {}", e))?
        },
        _ = tokio::time::sleep(timeout_duration) => {
            return Err(anyhow!("ffmpeg command timed out after 2 minutes"));
        }
    };

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let filtered = filter_ffmpeg_stderr(&stderr);
        error!("Subtitle extraction failed: {}", filtered);
        return Err(anyhow!("ffmpeg extraction failed: {}", filtered));
    }

    let file_size = std::fs::metadata(output_path)?.len();
    if file_size == 0 {
        return Err(anyhow!(
            "Extracted file is empty — no subtitles found in stream {}",
            stream_index
        ));
    }

    Ok(())
}

/// Extract every text subtitle stream matching the given language.
///
/// Bitmap streams are skipped with a warning; stream titles are sanitized
/// for use in the output file names.
pub async fn extract_subtitles<P: AsRef<Path>>(
    video_path: P,
    language: &str,
    output_dir: &Path,
) -> Result<Vec<ExtractedSubtitle>> {
    let video_path = video_path.as_ref();
    let streams = probe_subtitle_streams(video_path).await?;

    let stem = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());

    let mut extracted = Vec::new();
    for stream in &streams {
        let Some(tag) = stream.language.as_deref() else {
            continue;
        };
        if !language_utils::language_codes_match(tag, language) {
            continue;
        }

        let Some(extension) = extension_for_codec(&stream.codec_name) else {
            warn!(
                "Skipping bitmap subtitle stream {} ({}) — only text streams can be translated",
                stream.index, stream.codec_name
            );
            continue;
        };

        let title = stream
            .title
            .clone()
            .unwrap_or_else(|| stream.index.to_string());
        let file_name = format!(
            "{}_{}_{}.{}",
            stem,
            tag,
            sanitize_title(&title),
            extension
        );
        let output_path = output_dir.join(file_name);

        debug!(
            "Extracting stream {} ({}) to {}",
            stream.index,
            stream.codec_name,
            output_path.display()
        );
        extract_stream(video_path, stream.index, &output_path).await?;
        extracted.push(ExtractedSubtitle {
            path: output_path,
            title,
        });
    }

    Ok(extracted)
}

/// Mux translated subtitle tracks back into the container.
///
/// Video and audio streams are copied; each new track gets language and
/// title metadata. Returns the `<stem>_translated.<ext>` output path.
pub async fn embed_subtitles<P: AsRef<Path>>(
    video_path: P,
    tracks: &[SubtitleTrack],
) -> Result<PathBuf> {
    let video_path = video_path.as_ref();
    if tracks.is_empty() {
        return Err(anyhow!("No subtitle tracks to embed"));
    }

    let extension = video_path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    let output_path = video_path.with_file_name(format!("{}_translated.{}", stem, extension));

    let mut args: Vec<String> = vec!["-y".into(), "-i".into(), video_path.to_string_lossy().into()];
    for track in tracks {
        args.push("-i".into());
        args.push(track.path.to_string_lossy().into());
    }

    args.extend(["-map".into(), "0:v".into(), "-map".into(), "0:a".into()]);
    for (i, _) in tracks.iter().enumerate() {
        args.push("-map".into());
        args.push(format!("{}:s", i + 1));
    }

    args.extend(["-c:v".into(), "copy".into(), "-c:a".into(), "copy".into()]);
    for (i, track) in tracks.iter().enumerate() {
        args.push(format!("-metadata:s:s:{}", i));
        args.push(format!("language={}", track.language));
        args.push(format!("-metadata:s:s:{}", i));
        args.push(format!("title={}", track.title));
    }
    args.push(output_path.to_string_lossy().into());

    let ffmpeg_future = Command::new("ffmpeg").args(&args).output();

    let timeout_duration = Duration::from_secs(600);
    let result = tokio::select! {
        result = ffmpeg_future => {
            result.map_err(|e| anyhow!("Failed to execute ffmpeg for embedding: {}", e))?
        },
        _ = tokio::time::sleep(timeout_duration) => {
            return Err(anyhow!("ffmpeg embedding timed out after 10 minutes"));
        }
    };

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let filtered = filter_ffmpeg_stderr(&stderr);
        error!("Subtitle embedding failed: {}", filtered);
        return Err(anyhow!("ffmpeg embedding failed: {}", filtered));
    }

    Ok(output_path)
}

/// Make a stream title safe for use in a file name
fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '[' | ']' | '(' | ')' | '\'' | '"' => '\0',
            ' ' | ':' | '/' | '\\' => '-',
            other => other,
        })
        .filter(|c| *c != '\0')
        .collect()
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Output #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return false;
            }
            !noise_prefixes.iter().any(|p| trimmed.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
