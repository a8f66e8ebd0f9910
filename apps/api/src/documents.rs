//! Document normalization — merges per-page text fragments into one text
//! blob per source file before extraction.

use serde::{Deserialize, Serialize};

/// One page/unit of text produced by the file-reading collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    pub text: String,
    pub source_file_name: String,
    /// Extraction order within the source file, as reported by the reader.
    pub sequence_index: u32,
}

/// All text of one source file, pages joined in extraction order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    pub text: String,
    pub source_file_name: String,
}

/// Groups raw documents by source file name and merges each group into a
/// single document, joining page texts with a newline.
///
/// The sort is stable, so page order within a file follows the input order.
/// Across files the output is alphabetical by file name — an artifact of the
/// grouping sort, not an ordering guarantee.
pub fn normalize_documents(mut docs: Vec<RawDocument>) -> Vec<NormalizedDocument> {
    docs.sort_by(|a, b| a.source_file_name.cmp(&b.source_file_name));

    let mut merged: Vec<NormalizedDocument> = Vec::new();
    for doc in docs {
        match merged.last_mut() {
            Some(last) if last.source_file_name == doc.source_file_name => {
                last.text.push('\n');
                last.text.push_str(&doc.text);
            }
            _ => merged.push(NormalizedDocument {
                text: doc.text,
                source_file_name: doc.source_file_name,
            }),
        }
    }
    merged
}
