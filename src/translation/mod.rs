/*!
 * AI-powered subtitle translation.
 *
 * - `formatting`: envelope extraction and restoration for one cue
 * - `batch`: cue-group encoding and tolerant response reassembly
 * - `core`: the chat session driving the provider
 * - `pipeline`: whole-document orchestration
 */

pub mod batch;
pub mod core;
pub mod formatting;
pub mod pipeline;

pub use batch::{ApplyOutcome, BatchCodec, CONTROL_SENTINEL};
pub use core::{SessionBuilder, TranslateInput, TranslateOutput, TranslationSession};
pub use formatting::FormattingEnvelope;
pub use pipeline::TranslationPipeline;
