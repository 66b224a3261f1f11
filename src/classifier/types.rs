use serde::{Deserialize, Serialize};

use super::ClassifierError;

// ═══════════════════════════════════════════
// Classification
// ═══════════════════════════════════════════

/// The verdict for a single word, one per response line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// The model answered "true": the word matches an exclusion category.
    Excluded,
    /// The model answered "false": the word stays in the dictionary.
    Valid,
    /// No usable answer for this position: garbage line, short response,
    /// or a failed request.
    Unknown,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excluded => "excluded",
            Self::Valid => "valid",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "excluded" => Some(Self::Excluded),
            "valid" => Some(Self::Valid),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn all() -> &'static [Classification] {
        &[Self::Excluded, Self::Valid, Self::Unknown]
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ═══════════════════════════════════════════
// Generation options
// ═══════════════════════════════════════════

/// Generation parameters for Ollama `/api/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Sampling temperature. 0.0 for deterministic true/false answers.
    pub temperature: f32,
    /// Maximum tokens in the generated response.
    /// None = model default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            num_predict: None,
        }
    }
}

// ═══════════════════════════════════════════
// LLM client abstraction
// ═══════════════════════════════════════════

/// Ollama LLM client abstraction (allows mocking)
pub trait LlmClient {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ClassifierError>;

    fn is_model_available(&self, model: &str) -> Result<bool, ClassifierError>;

    fn list_models(&self) -> Result<Vec<String>, ClassifierError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_roundtrip() {
        for c in Classification::all() {
            let s = c.as_str();
            let parsed = Classification::from_str(s);
            assert_eq!(parsed, Some(*c), "Roundtrip failed for {s}");
        }
    }

    #[test]
    fn classification_display() {
        assert_eq!(Classification::Excluded.to_string(), "excluded");
        assert_eq!(Classification::Valid.to_string(), "valid");
        assert_eq!(Classification::Unknown.to_string(), "unknown");
    }

    #[test]
    fn classification_from_invalid() {
        assert_eq!(Classification::from_str("true"), None);
        assert_eq!(Classification::from_str(""), None);
    }

    #[test]
    fn classification_serde_roundtrip() {
        let c = Classification::Excluded;
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"excluded\"");
        let parsed: Classification = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn generation_options_default_deterministic() {
        let opts = GenerationOptions::default();
        assert!(opts.temperature.abs() < f32::EPSILON, "Default temperature should be 0.0");
        assert!(opts.num_predict.is_none());
    }

    #[test]
    fn generation_options_serializes_num_predict() {
        let opts = GenerationOptions {
            temperature: 0.0,
            num_predict: Some(275),
        };
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["num_predict"], 275);
    }

    #[test]
    fn generation_options_skips_absent_num_predict() {
        let opts = GenerationOptions::default();
        let json = serde_json::to_value(&opts).unwrap();
        assert!(json.get("num_predict").is_none());
    }
}
