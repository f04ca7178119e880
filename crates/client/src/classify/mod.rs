//! Activity classification client.
//!
//! Sends raw user text to a chat-completions endpoint with a fixed system
//! instruction at temperature 0, so that repeated calls on equivalent input
//! tend toward the same canonical string.
//!
//! ### Contract
//!
//! - The instruction preserves the sector type implied by the user's
//!   wording (trade, agriculture, industry, service); cross-sector
//!   conversion is a classification bug.
//! - Inputs that are not plausible economic activities come back as the
//!   wire sentinel `REFUSED`, converted to [`ClassificationOutcome::Rejected`]
//!   here and never exposed as a string.
//! - Any provider failure degrades to `Accepted(raw_input)`: downstream
//!   caching still functions with a less-normalized key, so classifier
//!   unavailability must not fail the request.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use dirasa_core::{CanonicalActivity, ClassificationOutcome, Classify};

use crate::error::ProviderError;

/// Default base URL for the chat-completions API.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default classification model.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Wire sentinel the model replies with for non-activity input.
///
/// Exists only on the wire; `classify` converts it to the outcome enum
/// before anything else sees it.
const REFUSAL_SENTINEL: &str = "REFUSED";

/// Fixed system instruction, sent verbatim with every classification call.
///
/// Sector preservation is spelled out explicitly: a shop stays a
/// trade-sector name, a farm stays agricultural, a factory stays industrial,
/// a clinic stays a service. Turning a livestock farm into a meat-processing
/// factory is exactly the bug this wording guards against.
const SYSTEM_INSTRUCTION: &str = "\
أنت مصنف أنشطة اقتصادية. حوّل وصف النشاط إلى اسم نشاط موحد ودقيق \
(مثال: \"مصنع شيبسي\" -> \"صناعة المقرمشات الغذائية\").
القواعد:
- حافظ على نوع القطاع كما ورد في الوصف: المحل أو التجارة -> اسم من قطاع التجارة، \
المزرعة أو الزراعة أو المواشي -> اسم من القطاع الزراعي أو الحيواني، \
المصنع أو الورشة أو الصناعة -> اسم من القطاع الصناعي، \
الخدمة أو العيادة أو المركز -> اسم من قطاع الخدمات. \
لا تحوّل نشاطاً من قطاع إلى قطاع آخر أبداً.
- إذا لم يكن النص وصفاً لنشاط اقتصادي حقيقي (شتائم، كلام عام، سياسة، رياضة، \
أسئلة عامة، كلام غير مفهوم) فأجب بكلمة REFUSED فقط.
- الرد يكون الاسم فقط بدون أي مقدمات أو شرح.";

/// Classifier client configuration.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// API key for the classification provider.
    pub api_key: String,
    /// Base URL (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Model name (default: gpt-4o-mini).
    pub model: String,
    /// Request timeout (default: 15s).
    pub timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClassifierConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads DIRASA_CLASSIFIER_API_KEY from environment. Returns error if not set.
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = std::env::var("DIRASA_CLASSIFIER_API_KEY")
            .map_err(|_| ProviderError::MissingApiKey("DIRASA_CLASSIFIER_API_KEY"))?;

        Ok(Self { api_key, ..Default::default() })
    }
}

/// Chat-completions classification client.
#[derive(Debug, Clone)]
pub struct ClassifierClient {
    http: reqwest::Client,
    config: ClassifierConfig,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl ClassifierClient {
    /// Create a new classifier client with the given configuration.
    pub fn new(config: ClassifierConfig) -> Result<Self, ProviderError> {
        if config.api_key.is_empty() {
            return Err(ProviderError::MissingApiKey("DIRASA_CLASSIFIER_API_KEY"));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Network(std::sync::Arc::new(e)))?;

        Ok(Self { http, config })
    }

    /// Create a new classifier client from environment variables.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(ClassifierConfig::from_env()?)
    }

    /// One classification round-trip, returning the model's raw reply text.
    async fn request_canonical(&self, raw_input: &str) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                { "role": "user", "content": raw_input }
            ],
            "temperature": 0.0,
        });

        tracing::debug!(model = %self.config.model, "classifying activity input");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::from)?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(ProviderError::AuthError);
        }
        if status == 429 {
            return Err(ProviderError::RateLimited);
        }
        if status.is_client_error() || status.is_server_error() {
            return Err(ProviderError::HttpError { status: status.as_u16() });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let reply = chat
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or(ProviderError::EmptyCompletion)?;

        if reply.is_empty() {
            return Err(ProviderError::EmptyCompletion);
        }

        Ok(reply)
    }
}

/// Convert a raw model reply into an outcome, with the raw user input as
/// the fallback key when the reply is unusable.
fn outcome_from_reply(reply: Result<String, ProviderError>, raw_input: &str) -> ClassificationOutcome {
    match reply {
        Ok(reply) if reply == REFUSAL_SENTINEL => ClassificationOutcome::Rejected,
        Ok(reply) => match CanonicalActivity::new(reply) {
            Ok(name) => ClassificationOutcome::Accepted(name),
            Err(_) => fallback(raw_input),
        },
        Err(e) => {
            tracing::warn!(error = %e, "classifier unavailable, falling back to raw input");
            fallback(raw_input)
        }
    }
}

/// Treat the raw input as if it were already canonical.
///
/// Caching still works with the less-normalized key. Input that cannot even
/// form a non-empty name is rejected outright.
fn fallback(raw_input: &str) -> ClassificationOutcome {
    match CanonicalActivity::new(raw_input) {
        Ok(name) => ClassificationOutcome::Accepted(name),
        Err(_) => ClassificationOutcome::Rejected,
    }
}

#[async_trait]
impl Classify for ClassifierClient {
    async fn classify(&self, raw_input: &str) -> ClassificationOutcome {
        outcome_from_reply(self.request_canonical(raw_input).await, raw_input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_missing_key() {
        let original = std::env::var("DIRASA_CLASSIFIER_API_KEY").ok();
        unsafe {
            std::env::remove_var("DIRASA_CLASSIFIER_API_KEY");
        }

        let result = ClassifierConfig::from_env();
        assert!(matches!(result, Err(ProviderError::MissingApiKey(_))));

        if let Some(key) = original {
            unsafe {
                std::env::set_var("DIRASA_CLASSIFIER_API_KEY", key);
            }
        }
    }

    #[test]
    fn test_client_new_missing_key() {
        let config = ClassifierConfig::default();
        let result = ClassifierClient::new(config);
        assert!(matches!(result, Err(ProviderError::MissingApiKey(_))));
    }

    #[test]
    fn test_refusal_sentinel_becomes_rejected() {
        let outcome = outcome_from_reply(Ok("REFUSED".to_string()), "نكتة");
        assert_eq!(outcome, ClassificationOutcome::Rejected);
    }

    #[test]
    fn test_accepted_reply_is_canonical() {
        let outcome = outcome_from_reply(Ok("تجارة الملابس الجاهزة".to_string()), "محل ملابس");
        assert_eq!(
            outcome,
            ClassificationOutcome::Accepted(CanonicalActivity::new("تجارة الملابس الجاهزة").unwrap())
        );
    }

    #[test]
    fn test_activity_named_like_sentinel_is_not_confused() {
        // Only the exact sentinel token means rejection; a reply that merely
        // contains it is a name like any other.
        let outcome = outcome_from_reply(Ok("REFUSED GOODS TRADING".to_string()), "x");
        assert!(matches!(outcome, ClassificationOutcome::Accepted(_)));
    }

    #[test]
    fn test_provider_failure_falls_back_to_raw_input() {
        let outcome = outcome_from_reply(Err(ProviderError::Timeout), "محل ملابس");
        assert_eq!(
            outcome,
            ClassificationOutcome::Accepted(CanonicalActivity::new("محل ملابس").unwrap())
        );
    }

    #[test]
    fn test_empty_reply_falls_back_to_raw_input() {
        let outcome = outcome_from_reply(Ok("   ".to_string()), "محل ملابس");
        assert_eq!(
            outcome,
            ClassificationOutcome::Accepted(CanonicalActivity::new("محل ملابس").unwrap())
        );
    }

    #[test]
    fn test_fallback_with_unusable_input_rejects() {
        let outcome = outcome_from_reply(Err(ProviderError::Timeout), "  ");
        assert_eq!(outcome, ClassificationOutcome::Rejected);
    }

    #[test]
    fn test_system_instruction_carries_policy() {
        // The rejection token and the sector rules must be present verbatim.
        assert!(SYSTEM_INSTRUCTION.contains(REFUSAL_SENTINEL));
        assert!(SYSTEM_INSTRUCTION.contains("القطاع"));
    }
}
