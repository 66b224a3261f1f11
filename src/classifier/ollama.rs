use std::cell::RefCell;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::types::{GenerationOptions, LlmClient};
use super::ClassifierError;

/// Ollama HTTP client for local LLM inference.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a new OllamaClient pointing at an Ollama instance.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Default Ollama instance at localhost:11434 with 2-minute timeout.
    pub fn default_local() -> Self {
        Self::new("http://localhost:11434", 120)
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerationOptions,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl LlmClient for OllamaClient {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ClassifierError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model,
            prompt,
            stream: false,
            options,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    ClassifierError::OllamaConnection(self.base_url.clone())
                } else if e.is_timeout() {
                    ClassifierError::Timeout(self.timeout_secs)
                } else {
                    ClassifierError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClassifierError::OllamaError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| ClassifierError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }

    fn is_model_available(&self, model: &str) -> Result<bool, ClassifierError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|m| m.starts_with(model)))
    }

    fn list_models(&self) -> Result<Vec<String>, ClassifierError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().map_err(|e| {
            if e.is_connect() {
                ClassifierError::OllamaConnection(self.base_url.clone())
            } else {
                ClassifierError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClassifierError::OllamaError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| ClassifierError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

/// Validate a model name against the Ollama naming convention.
///
/// Prevents path traversal, shell metacharacters, and other garbage in a
/// config value that ends up inside a JSON request body.
///
/// Supports community namespace format: `namespace/model:tag`
/// Valid: `deepseek-r1:1.5b`, `llama3.1:8b`, `alibayram/medgemma`
/// Invalid: `../etc/passwd`, `; rm -rf /`, `a/b/c` (double namespace)
pub fn validate_model_name(name: &str) -> Result<(), ClassifierError> {
    if name.is_empty() {
        return Err(ClassifierError::InvalidModelName(name.to_string()));
    }

    // Format: [namespace/]model[:tag]
    // Each segment starts alphanumeric, then alphanumeric/._-
    // At most ONE `/` allowed (no nested namespaces).
    let valid = regex::Regex::new(
        r"^[a-zA-Z0-9][a-zA-Z0-9._-]*(/[a-zA-Z0-9][a-zA-Z0-9._-]*)?(:[a-zA-Z0-9._-]+)?$",
    )
    .expect("static regex");

    if !valid.is_match(name) {
        return Err(ClassifierError::InvalidModelName(name.to_string()));
    }

    Ok(())
}

/// Mock LLM client for testing with configurable responses.
///
/// Responses queued with `with_responses` are consumed one per `generate`
/// call; once the queue is empty every call returns the fallback response.
/// Received prompts are recorded for assertions.
pub struct MockLlmClient {
    fallback: String,
    queued: RefCell<VecDeque<String>>,
    prompts: RefCell<Vec<String>>,
    available_models: Vec<String>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            fallback: response.to_string(),
            queued: RefCell::new(VecDeque::new()),
            prompts: RefCell::new(Vec::new()),
            available_models: vec!["deepseek-r1:1.5b".to_string()],
        }
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.available_models = models;
        self
    }

    pub fn with_responses(self, responses: Vec<&str>) -> Self {
        self.queued
            .borrow_mut()
            .extend(responses.into_iter().map(|s| s.to_string()));
        self
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    /// Number of generate calls received so far.
    pub fn calls(&self) -> usize {
        self.prompts.borrow().len()
    }
}

impl LlmClient for MockLlmClient {
    fn generate(
        &self,
        _model: &str,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, ClassifierError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        let next = self.queued.borrow_mut().pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }

    fn is_model_available(&self, model: &str) -> Result<bool, ClassifierError> {
        Ok(self.available_models.iter().any(|m| m.starts_with(model)))
    }

    fn list_models(&self) -> Result<Vec<String>, ClassifierError> {
        Ok(self.available_models.clone())
    }
}
