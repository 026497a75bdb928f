//! Optional conversational collaborator.
//!
//! The service can hold an [`AnswerGenerator`] next to the resolver, but the
//! resolve path never calls it: every reply comes from the deterministic
//! matcher. [`PromptAssistant`] only renders the prompt it would send.

use std::fmt;

use thiserror::Error;

pub const DEFAULT_PROMPT: &str = "You are a helpful assistant that provides district and taluka \
information for villages in Delhi. Answer based on the provided dataset: {query}";

const QUERY_PLACEHOLDER: &str = "{query}";

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("prompt template is missing the {{query}} placeholder")]
    MissingPlaceholder,
    #[error("empty query")]
    EmptyQuery,
}

pub trait AnswerGenerator: Send + Sync {
    fn generate(&self, query: &str) -> Result<String, AnswerError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Result<Self, AnswerError> {
        let text = text.into();
        if !text.contains(QUERY_PLACEHOLDER) {
            return Err(AnswerError::MissingPlaceholder);
        }
        Ok(Self { text })
    }

    pub fn render(&self, query: &str) -> String {
        self.text.replace(QUERY_PLACEHOLDER, query)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            text: DEFAULT_PROMPT.to_string(),
        }
    }
}

/// API credential for the external service; never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Blank keys are treated as absent.
    pub fn new(raw: &str) -> Option<Self> {
        let key = raw.trim();
        (!key.is_empty()).then(|| Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct PromptAssistant {
    credential: Credential,
    template: PromptTemplate,
}

impl PromptAssistant {
    pub fn new(credential: Credential, template: PromptTemplate) -> Self {
        Self {
            credential,
            template,
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }
}

impl AnswerGenerator for PromptAssistant {
    fn generate(&self, query: &str) -> Result<String, AnswerError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AnswerError::EmptyQuery);
        }
        Ok(self.template.render(query))
    }
}
