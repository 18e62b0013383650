/*!
 * Document translation pipeline.
 *
 * Drives one subtitle document end to end: load, slice the cues into
 * batches, run each batch through the translation session, fold the results
 * back through the batch codec, and persist the mutated document.
 */

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::batch::BatchCodec;
use super::core::{TranslateInput, TranslationSession};
use crate::errors::{AppError, SubtitleError};
use crate::subtitle_processor::SubtitleDocument;

/// Progress callback: (completed batches, total batches)
pub type ProgressFn<'a> = dyn Fn(usize, usize) + 'a;

/// Pipeline settings for one document run
#[derive(Debug, Clone)]
pub struct TranslationPipeline {
    /// Cues per provider call
    batch_size: usize,
}

impl TranslationPipeline {
    /// Create a pipeline with the given batch size
    pub fn new(batch_size: usize) -> Result<Self, SubtitleError> {
        if batch_size == 0 {
            return Err(SubtitleError::InvalidBatchSize);
        }
        Ok(Self { batch_size })
    }

    /// Translate one subtitle file and write the result.
    ///
    /// The output lands at `output_path` when given, otherwise at the
    /// document's default sibling path (`translated.<ext>`). Returns the
    /// path written to.
    pub async fn translate_file(
        &self,
        session: &mut TranslationSession,
        sub_path: &Path,
        output_path: Option<&Path>,
    ) -> Result<PathBuf, AppError> {
        self.translate_file_with_progress(session, sub_path, output_path, &|_, _| {})
            .await
    }

    /// Same as `translate_file`, reporting per-batch progress
    pub async fn translate_file_with_progress(
        &self,
        session: &mut TranslationSession,
        sub_path: &Path,
        output_path: Option<&Path>,
        progress: &ProgressFn<'_>,
    ) -> Result<PathBuf, AppError> {
        let mut document = SubtitleDocument::load(sub_path)?;
        info!(
            "Translating {} ({} cues, batch size {})",
            sub_path.display(),
            document.cue_count(),
            self.batch_size
        );

        self.translate_document(session, &mut document, progress)
            .await?;

        let out_path = output_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| document.default_output_path());
        document.save(&out_path)?;
        info!("Wrote translated subtitles to {}", out_path.display());

        Ok(out_path)
    }

    /// Translate a loaded document in place
    pub async fn translate_document(
        &self,
        session: &mut TranslationSession,
        document: &mut SubtitleDocument,
        progress: &ProgressFn<'_>,
    ) -> Result<(), AppError> {
        let cue_texts = document.cue_texts();

        // Cues with no text at all cannot be translated; leave them be.
        let workable: Vec<(usize, String)> = cue_texts
            .into_iter()
            .enumerate()
            .filter(|(i, text)| {
                if text.trim().is_empty() {
                    warn!("Skipping empty cue {}", i + 1);
                    false
                } else {
                    true
                }
            })
            .collect();

        let total_batches = workable.len().div_ceil(self.batch_size);
        progress(0, total_batches);

        for (batch_index, chunk) in workable.chunks(self.batch_size).enumerate() {
            if self.batch_size == 1 {
                self.translate_single_cue(session, document, chunk).await?;
            } else {
                self.translate_batch(session, document, chunk).await?;
            }
            progress(batch_index + 1, total_batches);
        }

        Ok(())
    }

    /// Degenerate batch size of one: each cue is its own provider call
    async fn translate_single_cue(
        &self,
        session: &mut TranslationSession,
        document: &mut SubtitleDocument,
        chunk: &[(usize, String)],
    ) -> Result<(), AppError> {
        let (cue_index, raw_text) = &chunk[0];
        let mut codec = BatchCodec::new(std::slice::from_ref(raw_text))?;

        let content = codec.contents().remove(0);
        let output = session.translate(TranslateInput::Single(content)).await?;
        let outcome = codec.apply_translations(&output.into_lines());
        debug!("Cue {}: {:?}", cue_index + 1, outcome);

        let line = codec.subtitle_lines().remove(0);
        document.set_cue_text(*cue_index, line);
        Ok(())
    }

    /// Translate one batch of cues and write the results back
    async fn translate_batch(
        &self,
        session: &mut TranslationSession,
        document: &mut SubtitleDocument,
        chunk: &[(usize, String)],
    ) -> Result<(), AppError> {
        let raw_texts: Vec<String> = chunk.iter().map(|(_, text)| text.clone()).collect();
        let mut codec = BatchCodec::new(&raw_texts)?;

        let output = session
            .translate(TranslateInput::Batch(codec.contents()))
            .await?;
        codec.apply_translations(&output.into_lines());

        for ((cue_index, _), line) in chunk.iter().zip(codec.subtitle_lines()) {
            document.set_cue_text(*cue_index, line);
        }
        Ok(())
    }
}

impl Default for TranslationPipeline {
    fn default() -> Self {
        Self { batch_size: 100 }
    }
}
