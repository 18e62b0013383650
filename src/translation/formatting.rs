/*!
 * Format-preserving extraction of translatable cue text.
 *
 * ASS and SRT cues wrap their visible text in override blocks such as
 * `{\an8}` or `{\i1}...{\i0}` and embed line-break control sequences
 * (`\N`, `\n`, `\h`). None of that may reach the translator: this module
 * splits a raw cue into its formatting envelope and its clean content, and
 * reassembles the two after translation.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;

/// Override block regex ({...}, non-greedy)
static OVERRIDE_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{.*?\}").unwrap());

/// Control sequences stripped from translatable content
const CONTROL_SEQUENCES: [&str; 3] = ["\\N", "\\n", "\\h"];

/// The non-translatable shell of one cue: the first and last override blocks
/// of its raw text, re-applied verbatim around the translated content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormattingEnvelope {
    /// First override block in the raw text, empty if none
    pub prefix: String,

    /// Last override block when at least two exist, empty otherwise. A lone
    /// block is restored once, on the prefix side only.
    pub suffix: String,
}

impl FormattingEnvelope {
    /// True when the raw text carried no override blocks at all
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.suffix.is_empty()
    }
}

/// Split a raw cue text into its formatting envelope and clean content.
///
/// Control sequences are stripped before the envelope substrings are removed,
/// matching how the source formats embed the markers both inside and outside
/// override blocks. Every occurrence of the envelope substrings is removed
/// from the content, not just the boundary ones.
pub fn decode(raw_text: &str) -> Result<(FormattingEnvelope, String), SubtitleError> {
    if raw_text.is_empty() {
        return Err(SubtitleError::EmptyCue);
    }

    let blocks: Vec<&str> = OVERRIDE_BLOCK_REGEX
        .find_iter(raw_text)
        .map(|m| m.as_str())
        .collect();
    let envelope = match blocks.as_slice() {
        [] => FormattingEnvelope::default(),
        [only] => FormattingEnvelope {
            prefix: only.to_string(),
            suffix: String::new(),
        },
        [first, .., last] => FormattingEnvelope {
            prefix: first.to_string(),
            suffix: last.to_string(),
        },
    };

    let mut content = raw_text.to_string();
    for seq in CONTROL_SEQUENCES {
        content = content.replace(seq, "");
    }
    if !envelope.prefix.is_empty() {
        content = content.replace(&envelope.prefix, "");
    }
    if !envelope.suffix.is_empty() {
        content = content.replace(&envelope.suffix, "");
    }

    Ok((envelope, content))
}

/// Reassemble a cue from its envelope and (possibly translated) content.
///
/// Exact inverse concatenation; control sequences are not re-inserted, so a
/// multi-line source cue comes back as a single rendered line.
pub fn encode(envelope: &FormattingEnvelope, content: &str) -> String {
    format!("{}{}{}", envelope.prefix, content, envelope.suffix)
}
