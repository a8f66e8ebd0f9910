//! Batched CV extraction with per-chunk retry.
//!
//! Input texts are processed in consecutive chunks of at most
//! [`DEFAULT_BATCH_SIZE`], strictly in order, one protocol exchange per
//! chunk. A reply with zero `<ParsedCV>` blocks is malformed and the chunk
//! is retried; once [`MAX_ATTEMPTS`] tries are exhausted the whole
//! extraction call fails with no partial results.

use thiserror::Error;
use tracing::{debug, warn};

use crate::extraction::prompts::{CV_EXTRACTION_PROMPT_TEMPLATE, CV_EXTRACTION_SYSTEM};
use crate::extraction::protocol::{build_request, parse_record, parsed_cv_blocks, ExtractionRecord};
use crate::llm_client::{ExtractionModel, LlmError};

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("extraction model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("no well-formed <ParsedCV> blocks after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

pub struct BatchExtractor<'a> {
    model: &'a dyn ExtractionModel,
    batch_size: usize,
    max_attempts: u32,
}

impl<'a> BatchExtractor<'a> {
    pub fn new(model: &'a dyn ExtractionModel) -> Self {
        Self {
            model,
            batch_size: DEFAULT_BATCH_SIZE,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Extracts one record per `<ParsedCV>` block across all chunks,
    /// preserving input order. Fails the whole call on chunk exhaustion.
    pub async fn extract(&self, texts: &[String]) -> Result<Vec<ExtractionRecord>, ExtractError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            cv_count = texts.len(),
            batch_size = self.batch_size,
            "starting CV extraction"
        );

        let mut records = Vec::new();
        for chunk in texts.chunks(self.batch_size) {
            records.extend(self.extract_chunk(chunk).await?);
        }
        Ok(records)
    }

    async fn extract_chunk(
        &self,
        chunk: &[String],
    ) -> Result<Vec<ExtractionRecord>, ExtractError> {
        let request = build_request(chunk);
        let prompt = CV_EXTRACTION_PROMPT_TEMPLATE.replace("{cv_text}", &request);

        for attempt in 1..=self.max_attempts {
            let reply = self.model.complete(CV_EXTRACTION_SYSTEM, &prompt).await?;

            // Raw exchange to the observability sink; best-effort only.
            debug!(
                target: "extraction::exchange",
                request = %request,
                reply = %reply,
                attempt,
                "extraction exchange"
            );

            let blocks = parsed_cv_blocks(&reply);
            if blocks.is_empty() {
                warn!(
                    attempt,
                    max_attempts = self.max_attempts,
                    "malformed extraction reply: no <ParsedCV> blocks"
                );
                continue;
            }

            return Ok(blocks.into_iter().map(parse_record).collect());
        }

        Err(ExtractError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted model: pops one canned reply per call and records prompts.
    struct ScriptedModel {
        replies: Mutex<Vec<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(replies: &[&str]) -> Self {
            let mut replies: Vec<String> = replies.iter().map(|s| s.to_string()).collect();
            replies.reverse(); // pop() returns them in script order
            Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExtractionModel for ScriptedModel {
        async fn complete(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .ok_or(LlmError::EmptyContent)
        }
    }

    fn reply_with_names(names: &[&str]) -> String {
        names
            .iter()
            .map(|n| format!("<ParsedCV><ApplicationName>{n}</ApplicationName></ParsedCV>"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("cv {i}")).collect()
    }

    #[tokio::test]
    async fn test_batching_issues_ceil_n_over_b_calls_in_order() {
        // 7 texts, batch size 3 => 3 exchanges over contiguous slices.
        let model = ScriptedModel::new(&[
            &reply_with_names(&["a", "b", "c"]),
            &reply_with_names(&["d", "e", "f"]),
            &reply_with_names(&["g"]),
        ]);
        let extractor = BatchExtractor::new(&model).with_batch_size(3);

        let records = extractor.extract(&texts(7)).await.unwrap();

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].contains("<CV>cv 0</CV>\n<CV>cv 1</CV>\n<CV>cv 2</CV>"));
        assert!(prompts[1].contains("<CV>cv 3</CV>"));
        assert!(prompts[2].contains("<CV>cv 6</CV>"));
        assert!(!prompts[2].contains("<CV>cv 5</CV>"));

        // Concatenated output preserves input order.
        let names: Vec<_> = records.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e", "f", "g"]);
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt() {
        let model = ScriptedModel::new(&[
            "sorry, I cannot parse these",
            "still nothing useful",
            &reply_with_names(&["late bloomer"]),
        ]);
        let extractor = BatchExtractor::new(&model);

        let records = extractor.extract(&texts(1)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("late bloomer"));
        assert_eq!(model.prompts().len(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_after_max_attempts() {
        let model = ScriptedModel::new(&["bad", "worse", "worst"]);
        let extractor = BatchExtractor::new(&model);

        let err = extractor.extract(&texts(1)).await.unwrap_err();
        assert!(matches!(err, ExtractError::Exhausted { attempts: 3 }));
        assert_eq!(model.prompts().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_chunk_aborts_whole_call() {
        // First chunk parses; second chunk never does. No partial results.
        let model = ScriptedModel::new(&[
            &reply_with_names(&["ok"]),
            "bad",
            "bad",
            "bad",
        ]);
        let extractor = BatchExtractor::new(&model).with_batch_size(1);

        let result = extractor.extract(&texts(2)).await;
        assert!(matches!(
            result,
            Err(ExtractError::Exhausted { attempts: 3 })
        ));
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let model = ScriptedModel::new(&[]);
        let extractor = BatchExtractor::new(&model);

        let records = extractor.extract(&[]).await.unwrap();
        assert!(records.is_empty());
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_block_with_missing_fields_does_not_invalidate_batch() {
        let reply = "<ParsedCV><ApplicationName>Jane</ApplicationName></ParsedCV>\
                     <ParsedCV></ParsedCV>";
        let model = ScriptedModel::new(&[reply]);
        let extractor = BatchExtractor::new(&model);

        let records = extractor.extract(&texts(2)).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name.as_deref(), Some("Jane"));
        assert_eq!(records[1].name, None);
    }
}
