/*!
 * Batch-level cue encoding for bulk translation.
 *
 * A batch exposes the clean content of an ordered group of cues as the
 * payload of one provider call, and absorbs the translated lines back with a
 * deliberately tolerant alignment policy: provider responses may echo lines,
 * drop lines, invent extra ones, or flag lines with the reserved sentinel,
 * and none of that may corrupt the document.
 */

use log::{debug, warn};

use super::formatting::{self, FormattingEnvelope};
use crate::errors::SubtitleError;

/// Reserved marker in translator output: a line carrying it is a provider
/// control/error artifact and must never be written into the document.
pub const CONTROL_SENTINEL: &str = "<CNTL>";

/// One cue split into envelope and content
#[derive(Debug, Clone)]
struct BatchLine {
    envelope: FormattingEnvelope,
    original_content: String,
    content: String,
}

/// What happened when a translated batch was folded back into its cues
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Lines written into the batch
    pub applied: usize,
    /// Lines equal to their source, left untouched
    pub echoed: usize,
    /// Lines carrying the control sentinel, left untouched
    pub rejected: usize,
    /// Cues with no corresponding translated line
    pub missing: usize,
    /// Translated lines beyond the batch length, ignored
    pub extra: usize,
}

impl ApplyOutcome {
    /// True when every line landed exactly where it should
    pub fn is_clean(&self) -> bool {
        self.echoed == 0 && self.rejected == 0 && self.missing == 0 && self.extra == 0
    }
}

/// An ordered group of cues prepared for one translation request
#[derive(Debug)]
pub struct BatchCodec {
    lines: Vec<BatchLine>,
}

impl BatchCodec {
    /// Build a batch from raw cue texts, decoding each cue's envelope
    pub fn new(raw_texts: &[String]) -> Result<Self, SubtitleError> {
        if raw_texts.is_empty() {
            return Err(SubtitleError::EmptyBatch);
        }

        let mut lines = Vec::with_capacity(raw_texts.len());
        for raw in raw_texts {
            let (envelope, content) = formatting::decode(raw)?;
            lines.push(BatchLine {
                envelope,
                original_content: content.clone(),
                content,
            });
        }

        Ok(Self { lines })
    }

    /// Number of cues in the batch
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// A batch is never empty by construction
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Clean contents in cue order, the only text the translator sees
    pub fn contents(&self) -> Vec<String> {
        self.lines.iter().map(|line| line.content.clone()).collect()
    }

    /// Fold translated lines back into the batch.
    ///
    /// For each index under both lengths: an echo of the source content or a
    /// line containing the control sentinel is skipped, anything else
    /// replaces the cue's content. Length mismatches are tolerated in both
    /// directions; the outcome records what was skipped so callers can log it.
    pub fn apply_translations(&mut self, translated: &[String]) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();

        for (line, replacement) in self.lines.iter_mut().zip(translated.iter()) {
            if replacement.contains(CONTROL_SENTINEL) {
                debug!("Translator flagged line, keeping original: {}", line.content);
                outcome.rejected += 1;
            } else if *replacement == line.original_content {
                outcome.echoed += 1;
            } else {
                line.content = replacement.clone();
                outcome.applied += 1;
            }
        }

        if translated.len() < self.lines.len() {
            outcome.missing = self.lines.len() - translated.len();
        } else {
            outcome.extra = translated.len() - self.lines.len();
        }

        if !outcome.is_clean() {
            warn!(
                "Batch alignment anomalies: {} echoed, {} rejected, {} missing, {} extra",
                outcome.echoed, outcome.rejected, outcome.missing, outcome.extra
            );
        }

        outcome
    }

    /// Final cue texts with each envelope re-applied, in original order
    pub fn subtitle_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| formatting::encode(&line.envelope, &line.content))
            .collect()
    }
}
