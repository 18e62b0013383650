use std::path::{Path, PathBuf};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

use crate::app_config::Config;
use crate::errors::{AppError, ProviderError};
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::media::{self, SubtitleTrack};
use crate::translation::{TranslationPipeline, TranslationSession};

// @module: Application controller for the video translation workflow

/// Outcome of processing one video file
#[derive(Debug, PartialEq, Eq)]
enum VideoOutcome {
    /// Target-language track already present
    SkippedExisting,
    /// No source-language track to translate
    SkippedNoSource,
    /// Translated and embedded the given number of tracks
    Embedded(usize),
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Process a video file or every video under a directory
    pub async fn run(&self, input_path: &Path) -> Result<(), AppError> {
        let videos = if input_path.is_file() {
            if !FileManager::is_video_file(input_path) {
                return Err(AppError::File(format!(
                    "not a supported video file: {}",
                    input_path.display()
                )));
            }
            vec![input_path.to_path_buf()]
        } else if input_path.is_dir() {
            FileManager::find_video_files(input_path).map_err(AppError::from)?
        } else {
            return Err(AppError::File(format!(
                "path does not exist: {}",
                input_path.display()
            )));
        };

        if videos.is_empty() {
            return Err(AppError::File("no video files found".to_string()));
        }

        info!(
            "Processing {} video file(s): {} -> {}",
            videos.len(),
            self.config.source_language,
            self.config.target_language
        );

        let pipeline = TranslationPipeline::new(self.config.translation.batch_size)?;

        let progress_bar = ProgressBar::new(videos.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        for video in &videos {
            let name = video
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            progress_bar.set_message(name.clone());

            match self.process_video(video, &pipeline, &progress_bar).await {
                Ok(VideoOutcome::SkippedExisting) => {
                    progress_bar.println(format!(
                        "✓ Skipped ({} track exists): {}",
                        self.config.target_language, name
                    ));
                }
                Ok(VideoOutcome::SkippedNoSource) => {
                    progress_bar.println(format!(
                        "✗ No {} subtitle track: {}",
                        self.config.source_language, name
                    ));
                }
                Ok(VideoOutcome::Embedded(count)) => {
                    progress_bar.println(format!(
                        "✔ Translated & embedded {} track(s): {}",
                        count, name
                    ));
                }
                // Out of balance ends the whole run, anything else just
                // fails this file.
                Err(AppError::Provider(e @ ProviderError::QuotaExhausted(_))) => {
                    progress_bar.abandon();
                    return Err(AppError::Provider(e));
                }
                Err(e) => {
                    warn!("Failed to process {}: {}", name, e);
                }
            }
            progress_bar.inc(1);
        }

        progress_bar.finish_with_message("done");
        Ok(())
    }

    /// Translate and embed the subtitles of one video
    async fn process_video(
        &self,
        video: &Path,
        pipeline: &TranslationPipeline,
        progress_bar: &ProgressBar,
    ) -> Result<VideoOutcome, AppError> {
        let source = &self.config.source_language;
        let target = &self.config.target_language;

        if media::has_subtitle_language(video, target).await? {
            return Ok(VideoOutcome::SkippedExisting);
        }
        if !media::has_subtitle_language(video, source).await? {
            return Ok(VideoOutcome::SkippedNoSource);
        }

        // Extracted and translated files live in a temp dir that cleans
        // itself up, the video directory only ever sees the final output.
        let workdir = tempfile::tempdir().map_err(AppError::from)?;

        progress_bar.set_message(format!("extracting: {}", video.display()));
        let extracted = media::extract_subtitles(video, source, workdir.path()).await?;
        if extracted.is_empty() {
            return Ok(VideoOutcome::SkippedNoSource);
        }

        // The prompt reads better with language names than track codes
        let source_name = language_utils::language_name(source).unwrap_or(source);
        let target_name = language_utils::language_name(target).unwrap_or(target);
        let mut session = TranslationSession::builder(self.config.clone())
            .source_language(source_name)
            .target_language(target_name)
            .build()?;

        let mut tracks = Vec::with_capacity(extracted.len());
        for (i, subtitle) in extracted.iter().enumerate() {
            progress_bar.set_message(format!(
                "translating ({}/{}): {}",
                i + 1,
                extracted.len(),
                subtitle.path.display()
            ));

            let extension = subtitle
                .path
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();
            let output_path: PathBuf = workdir
                .path()
                .join(format!("translated_{}.{}", i, extension));

            let written = pipeline
                .translate_file(&mut session, &subtitle.path, Some(&output_path))
                .await?;
            debug!("Translated {} -> {}", subtitle.path.display(), written.display());

            tracks.push(SubtitleTrack {
                path: written,
                title: subtitle.title.clone(),
                language: target.clone(),
            });
        }

        progress_bar.set_message(format!("embedding {} track(s)", tracks.len()));
        let output = media::embed_subtitles(video, &tracks).await?;
        info!("Embedded translated subtitles into {}", output.display());

        Ok(VideoOutcome::Embedded(tracks.len()))
    }
}
