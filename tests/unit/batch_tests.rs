/*!
 * Tests for batch encoding and tolerant reassembly
 */

use subtrans::errors::SubtitleError;
use subtrans::translation::BatchCodec;

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// An empty batch is a caller error
#[test]
fn test_new_withEmptyBatch_shouldFail() {
    let result = BatchCodec::new(&[]);
    assert!(matches!(result, Err(SubtitleError::EmptyBatch)));
}

/// A batch containing an empty cue text fails like the single-cue codec
#[test]
fn test_new_withEmptyCueText_shouldFail() {
    let result = BatchCodec::new(&texts(&["ok", ""]));
    assert!(matches!(result, Err(SubtitleError::EmptyCue)));
}

/// Contents expose clean text in cue order
#[test]
fn test_contents_withStyledCues_shouldExposeCleanText() {
    let codec = BatchCodec::new(&texts(&["{\\an8}Hello\\Nworld", "Goodbye"])).unwrap();
    assert_eq!(codec.contents(), vec!["Helloworld", "Goodbye"]);
}

/// Sentinel lines never overwrite the original content
#[test]
fn test_applyTranslations_withSentinelLine_shouldKeepOriginal() {
    let mut codec = BatchCodec::new(&texts(&["a", "b", "c"])).unwrap();
    let outcome = codec.apply_translations(&texts(&["A", "<CNTL>", "C"]));

    assert_eq!(codec.contents(), vec!["A", "b", "C"]);
    assert_eq!(outcome.applied, 2);
    assert_eq!(outcome.rejected, 1);
}

/// Fewer translated lines than cues: the tail keeps its originals
#[test]
fn test_applyTranslations_withShortResponse_shouldKeepTail() {
    let mut codec = BatchCodec::new(&texts(&["a", "b", "c"])).unwrap();
    let outcome = codec.apply_translations(&texts(&["A"]));

    assert_eq!(codec.contents(), vec!["A", "b", "c"]);
    assert_eq!(outcome.applied, 1);
    assert_eq!(outcome.missing, 2);
}

/// Extra translated lines beyond the batch are ignored
#[test]
fn test_applyTranslations_withLongResponse_shouldIgnoreExtra() {
    let mut codec = BatchCodec::new(&texts(&["a", "b"])).unwrap();
    let outcome = codec.apply_translations(&texts(&["A", "B", "hallucinated"]));

    assert_eq!(codec.contents(), vec!["A", "B"]);
    assert_eq!(outcome.applied, 2);
    assert_eq!(outcome.extra, 1);
}

/// Lines echoing their source are counted but not rewritten
#[test]
fn test_applyTranslations_withEchoedLine_shouldSkip() {
    let mut codec = BatchCodec::new(&texts(&["alpha", "beta"])).unwrap();
    let outcome = codec.apply_translations(&texts(&["alpha", "BETA"]));

    assert_eq!(codec.contents(), vec!["alpha", "BETA"]);
    assert_eq!(outcome.echoed, 1);
    assert_eq!(outcome.applied, 1);
    assert!(!outcome.is_clean());
}

/// A fully aligned response reports a clean outcome
#[test]
fn test_applyTranslations_withAlignedResponse_shouldBeClean() {
    let mut codec = BatchCodec::new(&texts(&["a", "b"])).unwrap();
    let outcome = codec.apply_translations(&texts(&["A", "B"]));
    assert!(outcome.is_clean());
}

/// Envelopes come back around the translated content
#[test]
fn test_subtitleLines_withTranslations_shouldReapplyEnvelopes() {
    let mut codec = BatchCodec::new(&texts(&["{\\an8}Hello\\Nworld", "Goodbye"])).unwrap();
    codec.apply_translations(&texts(&["Bonjour", "Au revoir"]));

    assert_eq!(codec.subtitle_lines(), vec!["{\\an8}Bonjour", "Au revoir"]);
}

/// Without any applied translation the lines reproduce the decoded cues
#[test]
fn test_subtitleLines_withoutTranslations_shouldKeepContent() {
    let codec = BatchCodec::new(&texts(&["{\\i1}one{\\i0}", "two"])).unwrap();
    assert_eq!(codec.subtitle_lines(), vec!["{\\i1}one{\\i0}", "two"]);
}
