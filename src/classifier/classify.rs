use super::parser::parse_batch_response;
use super::prompt::build_batch_prompt;
use super::types::{Classification, GenerationOptions, LlmClient};

/// Token budget per word in a batch response.
///
/// One "true"/"false" line per word needs very few tokens; five per word
/// leaves room for stray numbering or punctuation without letting the
/// model ramble.
pub const NUM_PREDICT_PER_WORD: i32 = 5;

/// Classifies one batch of words with a single LLM request.
#[derive(Debug)]
pub struct BatchClassifier {
    model: String,
    prompt_template: String,
    temperature: f32,
}

impl BatchClassifier {
    pub fn new(model: &str, prompt_template: &str, temperature: f32) -> Self {
        Self {
            model: model.to_string(),
            prompt_template: prompt_template.to_string(),
            temperature,
        }
    }

    /// Classify a batch of words, one verdict per word, in order.
    ///
    /// Never fails: any request or response problem marks the whole batch
    /// `Unknown` and the run moves on. There is no retry; an interrupted
    /// run re-covers these words only if they were never checkpointed.
    pub fn classify(&self, client: &dyn LlmClient, batch: &[String]) -> Vec<Classification> {
        if batch.is_empty() {
            return Vec::new();
        }

        let prompt = build_batch_prompt(&self.prompt_template, batch);
        let options = GenerationOptions {
            temperature: self.temperature,
            num_predict: Some(batch.len() as i32 * NUM_PREDICT_PER_WORD),
        };

        match client.generate(&self.model, &prompt, &options) {
            Ok(text) => parse_batch_response(&text, batch.len()),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    batch_len = batch.len(),
                    "Batch request failed, marking whole batch unknown"
                );
                vec![Classification::Unknown; batch.len()]
            }
        }
    }
}
