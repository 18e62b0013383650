/*!
 * Tests for the cue envelope codec
 */

use subtrans::errors::SubtitleError;
use subtrans::translation::formatting::{decode, encode};

/// Empty input is a caller error
#[test]
fn test_decode_withEmptyInput_shouldFail() {
    let result = decode("");
    assert!(matches!(result, Err(SubtitleError::EmptyCue)));
}

/// No override block: content is the text with control sequences stripped
#[test]
fn test_decode_withNoBlock_shouldStripControlSequences() {
    let (envelope, content) = decode("Hello\\Nworld").unwrap();
    assert!(envelope.is_empty());
    assert_eq!(content, "Helloworld");
}

/// Plain text round-trips unchanged
#[test]
fn test_roundtrip_withPlainText_shouldBeIdentity() {
    let raw = "Just a plain line.";
    let (envelope, content) = decode(raw).unwrap();
    assert_eq!(encode(&envelope, &content), raw);
}

/// A lone leading block becomes the prefix and is restored exactly once
#[test]
fn test_decode_withSingleLeadingBlock_shouldUsePrefixOnly() {
    let raw = "{\\an8}Hello";
    let (envelope, content) = decode(raw).unwrap();
    assert_eq!(envelope.prefix, "{\\an8}");
    assert_eq!(envelope.suffix, "");
    assert_eq!(content, "Hello");
    assert_eq!(encode(&envelope, &content), raw);
}

/// Two blocks keep first/last semantics and round-trip exactly
#[test]
fn test_roundtrip_withTwoBlocks_shouldBeIdentity() {
    let raw = "{\\i1}test{\\i0}";
    let (envelope, content) = decode(raw).unwrap();
    assert_eq!(envelope.prefix, "{\\i1}");
    assert_eq!(envelope.suffix, "{\\i0}");
    assert_eq!(content, "test");
    assert_eq!(encode(&envelope, &content), raw);
}

/// Control sequences inside a styled cue are stripped from the content
#[test]
fn test_decode_withBlockAndControlSequences_shouldStripBoth() {
    let (envelope, content) = decode("{\\an8}Hello\\Nworld").unwrap();
    assert_eq!(envelope.prefix, "{\\an8}");
    assert_eq!(content, "Helloworld");
    assert_eq!(encode(&envelope, "Bonjour"), "{\\an8}Bonjour");
}

/// All three control sequences are recognized
#[test]
fn test_decode_withAllControlSequences_shouldStripAll() {
    let (_, content) = decode("a\\Nb\\nc\\hd").unwrap();
    assert_eq!(content, "abcd");
}

/// SRT-style cue with trailing italic-off block after a comma
#[test]
fn test_decode_withSrtStyleBlocks_shouldExtractFirstAndLast() {
    let (envelope, content) = decode("{\\i1}test\\Ntext,{\\i0}").unwrap();
    assert_eq!(envelope.prefix, "{\\i1}");
    assert_eq!(envelope.suffix, "{\\i0}");
    assert_eq!(content, "testtext,");
}

/// Three blocks: only the first and last form the envelope, the middle one
/// stays in the translatable content
#[test]
fn test_decode_withThreeBlocks_shouldKeepMiddleInContent() {
    let (envelope, content) = decode("{\\a}x{\\b}y{\\c}").unwrap();
    assert_eq!(envelope.prefix, "{\\a}");
    assert_eq!(envelope.suffix, "{\\c}");
    assert_eq!(content, "x{\\b}y");
}

/// Encoding does not re-insert line-break markers; a translated multi-line
/// cue deliberately comes back as a single line
#[test]
fn test_encode_withTranslatedContent_shouldNotReinsertLineBreaks() {
    let (envelope, _) = decode("{\\an8}one\\Ntwo").unwrap();
    let restored = encode(&envelope, "uno dos");
    assert_eq!(restored, "{\\an8}uno dos");
    assert!(!restored.contains("\\N"));
}
