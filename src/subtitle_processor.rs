use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;

// @module: Subtitle document loading, mutation and saving

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2}),(\d{3}) --> (\d{2}):(\d{2}):(\d{2}),(\d{3})").unwrap()
});

/// Subtitle dialects this tool can read and write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    /// SubRip (.srt)
    Srt,
    /// Advanced SubStation Alpha (.ass)
    Ass,
}

impl SubtitleFormat {
    /// Determine the dialect from a file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let ext = path
            .as_ref()
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "srt" => Ok(Self::Srt),
            "ass" => Ok(Self::Ass),
            other => Err(SubtitleError::UnsupportedFormat(other.to_string())),
        }
    }

    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Ass => "ass",
        }
    }
}

// @struct: Single SRT subtitle entry
#[derive(Debug, Clone)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(
            f,
            "{} --> {}",
            Self::format_timestamp(self.start_time_ms),
            Self::format_timestamp(self.end_time_ms)
        )?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// One event row of an ASS Events section.
///
/// Every field before Text is kept verbatim, including its original spacing,
/// so an untouched event serializes back byte-for-byte.
#[derive(Debug, Clone)]
pub struct AssEvent {
    /// Line descriptor, "Dialogue" or "Comment"
    pub kind: String,

    /// All fields preceding Text, unparsed
    pub fields: Vec<String>,

    /// The Text field, everything after the last format comma
    pub text: String,
}

impl AssEvent {
    fn to_line(&self) -> String {
        format!("{}:{},{}", self.kind, self.fields.join(","), self.text)
    }
}

/// A line of an ASS script body: either an event or anything else kept as-is
#[derive(Debug, Clone)]
enum AssLine {
    Event(AssEvent),
    Raw(String),
}

/// Parsed ASS/SSA script.
///
/// Only the Text field of Dialogue events is ever rewritten; script info,
/// styles, comments and timing stay exactly as read.
#[derive(Debug, Clone)]
pub struct AssScript {
    /// Everything up to and including the Events Format line
    head: Vec<String>,
    /// Script body in original order
    body: Vec<AssLine>,
    /// Indices into `body` of the Dialogue events, in order
    dialogue_indices: Vec<usize>,
}

// Standard Events section carries 10 columns, Text last.
const ASS_EVENT_FIELDS: usize = 10;

impl AssScript {
    /// Parse ASS content. The Format line of the Events section decides how
    /// many comma-separated fields precede Text; without one the standard
    /// ten-column layout is assumed.
    pub fn parse(content: &str) -> Result<Self, SubtitleError> {
        let mut head = Vec::new();
        let mut body = Vec::new();
        let mut dialogue_indices = Vec::new();
        let mut field_count = ASS_EVENT_FIELDS;
        let mut in_events = false;
        let mut events_started = false;

        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.eq_ignore_ascii_case("[events]") {
                in_events = true;
                head.push(line.to_string());
                continue;
            }
            if !in_events {
                head.push(line.to_string());
                continue;
            }

            if let Some(event) = Self::parse_event(line, field_count) {
                if event.kind == "Dialogue" {
                    dialogue_indices.push(body.len());
                }
                events_started = true;
                body.push(AssLine::Event(event));
            } else if events_started {
                body.push(AssLine::Raw(line.to_string()));
            } else {
                // Format line and anything else preceding the first event
                if let Some(rest) = trimmed.strip_prefix("Format:") {
                    field_count = rest.split(',').count();
                }
                head.push(line.to_string());
            }
        }

        if !in_events {
            return Err(SubtitleError::Parse(
                "no [Events] section found in ASS content".to_string(),
            ));
        }
        if dialogue_indices.is_empty() {
            return Err(SubtitleError::Parse(
                "no Dialogue events found in ASS content".to_string(),
            ));
        }

        Ok(Self {
            head,
            body,
            dialogue_indices,
        })
    }

    fn parse_event(line: &str, field_count: usize) -> Option<AssEvent> {
        let (kind, rest) = if let Some(rest) = line.strip_prefix("Dialogue:") {
            ("Dialogue", rest)
        } else if let Some(rest) = line.strip_prefix("Comment:") {
            ("Comment", rest)
        } else {
            return None;
        };

        // Text is the last column and may contain commas itself.
        let parts: Vec<&str> = rest.splitn(field_count, ',').collect();
        if parts.len() < field_count {
            warn!("Malformed {} line, keeping verbatim: {}", kind, line);
            return None;
        }

        let text = parts[field_count - 1].to_string();
        let fields = parts[..field_count - 1]
            .iter()
            .map(|s| s.to_string())
            .collect();

        Some(AssEvent {
            kind: kind.to_string(),
            fields,
            text,
        })
    }

    /// Number of Dialogue events
    pub fn dialogue_count(&self) -> usize {
        self.dialogue_indices.len()
    }

    /// Text of the i-th Dialogue event
    pub fn dialogue_text(&self, index: usize) -> Option<&str> {
        let body_index = *self.dialogue_indices.get(index)?;
        match &self.body[body_index] {
            AssLine::Event(event) => Some(&event.text),
            AssLine::Raw(_) => None,
        }
    }

    /// Replace the text of the i-th Dialogue event
    pub fn set_dialogue_text(&mut self, index: usize, text: String) {
        if let Some(&body_index) = self.dialogue_indices.get(index) {
            if let AssLine::Event(event) = &mut self.body[body_index] {
                event.text = text;
            }
        }
    }

}

impl fmt::Display for AssScript {
    /// Serializes the script, untouched lines byte-for-byte
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for line in &self.head {
            writeln!(f, "{}", line)?;
        }
        for line in &self.body {
            match line {
                AssLine::Event(event) => writeln!(f, "{}", event.to_line())?,
                AssLine::Raw(raw) => writeln!(f, "{}", raw)?,
            }
        }
        Ok(())
    }
}

/// A loaded subtitle document of one of the supported dialects.
///
/// The pipeline addresses cues by position: `cue_texts` returns the raw cue
/// texts in document order and `set_cue_text` writes a replacement back to
/// the same position, leaving timing and every other field untouched.
#[derive(Debug)]
pub enum SubtitleDocument {
    Srt {
        source_file: PathBuf,
        entries: Vec<SubtitleEntry>,
    },
    Ass {
        source_file: PathBuf,
        script: AssScript,
    },
}

impl SubtitleDocument {
    /// Load a subtitle file, dispatching on its extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let format = SubtitleFormat::from_path(path)?;
        let content = fs::read_to_string(path)
            .map_err(|e| SubtitleError::Parse(format!("{}: {}", path.display(), e)))?;

        match format {
            SubtitleFormat::Srt => Ok(Self::Srt {
                source_file: path.to_path_buf(),
                entries: parse_srt_string(&content)?,
            }),
            SubtitleFormat::Ass => Ok(Self::Ass {
                source_file: path.to_path_buf(),
                script: AssScript::parse(&content)?,
            }),
        }
    }

    /// Dialect of this document
    pub fn format(&self) -> SubtitleFormat {
        match self {
            Self::Srt { .. } => SubtitleFormat::Srt,
            Self::Ass { .. } => SubtitleFormat::Ass,
        }
    }

    /// Path the document was loaded from
    pub fn source_file(&self) -> &Path {
        match self {
            Self::Srt { source_file, .. } => source_file,
            Self::Ass { source_file, .. } => source_file,
        }
    }

    /// Number of cues
    pub fn cue_count(&self) -> usize {
        match self {
            Self::Srt { entries, .. } => entries.len(),
            Self::Ass { script, .. } => script.dialogue_count(),
        }
    }

    /// Raw cue texts in document order
    pub fn cue_texts(&self) -> Vec<String> {
        match self {
            Self::Srt { entries, .. } => entries.iter().map(|e| e.text.clone()).collect(),
            Self::Ass { script, .. } => (0..script.dialogue_count())
                .filter_map(|i| script.dialogue_text(i).map(|t| t.to_string()))
                .collect(),
        }
    }

    /// Replace the text of the cue at `index`
    pub fn set_cue_text(&mut self, index: usize, text: String) {
        match self {
            Self::Srt { entries, .. } => {
                if let Some(entry) = entries.get_mut(index) {
                    entry.text = text;
                }
            }
            Self::Ass { script, .. } => script.set_dialogue_text(index, text),
        }
    }

    /// Sibling path carrying the fixed "translated" name and the original
    /// extension, used when the caller does not pick an output path
    pub fn default_output_path(&self) -> PathBuf {
        let ext = self.format().extension();
        self.source_file().with_file_name(format!("translated.{}", ext))
    }

    /// Write the document back out in its own dialect
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SubtitleError> {
        let path = path.as_ref();
        let content = match self {
            Self::Srt { entries, .. } => {
                let mut out = String::new();
                for entry in entries {
                    out.push_str(&entry.to_string());
                }
                out
            }
            Self::Ass { script, .. } => script.to_string(),
        };

        fs::write(path, content)
            .map_err(|e| SubtitleError::Parse(format!("{}: {}", path.display(), e)))
    }
}

/// Parse SRT format content into subtitle entries
pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>, SubtitleError> {
    let mut entries = Vec::new();

    let mut seq_num: Option<usize> = None;
    let mut times: Option<(u64, u64)> = None;
    let mut text = String::new();

    let mut flush =
        |seq_num: &mut Option<usize>, times: &mut Option<(u64, u64)>, text: &mut String| {
            if let (Some(num), Some((start, end))) = (seq_num.take(), times.take()) {
                if text.trim().is_empty() {
                    warn!("Skipping empty subtitle entry {}", num);
                } else {
                    entries.push(SubtitleEntry::new(num, start, end, text.trim().to_string()));
                }
            }
            text.clear();
        };

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            flush(&mut seq_num, &mut times, &mut text);
            continue;
        }

        // A bare number opens a new entry, but only between entries
        if seq_num.is_none() && text.is_empty() {
            if let Ok(num) = trimmed.parse::<usize>() {
                seq_num = Some(num);
                continue;
            }
        }

        if seq_num.is_some() && times.is_none() {
            if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                let start = timestamp_caps_to_ms(&caps, 1);
                let end = timestamp_caps_to_ms(&caps, 5);
                times = Some((start, end));
                continue;
            }
        }

        if seq_num.is_some() && times.is_some() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(trimmed);
        } else {
            warn!("Unexpected SRT line outside any entry: {}", trimmed);
        }
    }
    flush(&mut seq_num, &mut times, &mut text);

    if entries.is_empty() {
        return Err(SubtitleError::Parse(
            "no valid subtitle entries found in SRT content".to_string(),
        ));
    }

    // Stable order and sequential numbering regardless of how the file counted
    entries.sort_by_key(|entry| entry.start_time_ms);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.seq_num = i + 1;
    }

    Ok(entries)
}

fn timestamp_caps_to_ms(caps: &regex::Captures, start_idx: usize) -> u64 {
    let field = |idx: usize| -> u64 {
        caps.get(start_idx + idx)
            .map_or(0, |m| m.as_str().parse().unwrap_or(0))
    };
    (field(0) * 3600 + field(1) * 60 + field(2)) * 1000 + field(3)
}
