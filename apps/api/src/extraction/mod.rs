//! CV extraction pipeline: the tag-delimited wire format exchanged with the
//! LLM, its deterministic parser, and the batched, retrying extractor.

pub mod batch;
pub mod prompts;
pub mod protocol;

pub use batch::{BatchExtractor, ExtractError};
pub use protocol::ExtractionRecord;
