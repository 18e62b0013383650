/*!
 * # subtrans - AI translation for embedded video subtitles
 *
 * A Rust library and CLI for translating the subtitle tracks embedded in
 * video files through a hosted chat-completion LLM endpoint.
 *
 * ## Features
 *
 * - Extract text subtitle streams (SRT, ASS) from video containers
 * - Translate cue text through a chat session with context-window trimming
 *   and provider-failure recovery
 * - Preserve override blocks and styling envelopes across translation
 * - Batch cues per request with tolerant response reassembly
 * - Re-embed the translated tracks with language and title metadata
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: Subtitle document loading, mutation and saving
 * - `translation`: The translation core:
 *   - `translation::formatting`: Cue envelope extraction and restoration
 *   - `translation::batch`: Batch encoding and tolerant reassembly
 *   - `translation::core`: The chat translation session
 *   - `translation::pipeline`: Whole-document orchestration
 * - `providers`: Chat-completion provider clients
 * - `media`: ffmpeg/ffprobe container operations
 * - `app_controller`: The per-video workflow
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod media;
pub mod providers;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ConfigError, ProviderError, RetryClass, SubtitleError};
pub use subtitle_processor::{SubtitleDocument, SubtitleEntry, SubtitleFormat};
pub use translation::{
    BatchCodec, TranslateInput, TranslateOutput, TranslationPipeline, TranslationSession,
};
