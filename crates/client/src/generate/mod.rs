//! Market-study generation client.
//!
//! Sends a fixed structured prompt to a generateContent endpoint and
//! post-processes the completion into the raw HTML-subset body the archive
//! stores: the contract promises headings, lists, and tables with no
//! code-fence decoration, so any fence markers the model wraps its output
//! in are stripped before the content leaves this module.
//!
//! A generation failure propagates to the caller as a user-visible error;
//! there is no sensible fallback content.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use dirasa_core::{CanonicalActivity, Error, Generate};

use crate::error::ProviderError;

/// Default base URL for the generateContent API.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model.
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default request timeout. Long-form generation is slow.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Build the fixed study prompt for a canonical activity name.
///
/// Seven fixed sections, output restricted to an HTML subset (h3, ul,
/// table): overview, products, market structure, operating cycle, costs and
/// margins, SWOT, recommendation.
fn study_prompt(name: &CanonicalActivity) -> String {
    format!(
        "أنت مستشار ائتماني. اكتب \"دراسة سوق تفصيلية\" لنشاط: \"{name}\".

المتطلبات:
1. المخرج HTML فقط (h3, ul, table) بدون أي تنسيق آخر.
2. اكتب باستفاضة شديدة وأرقام تقديرية.

الهيكل:
<h3>1️⃣ نظرة عامة</h3> (فقرة طويلة).
<h3>2️⃣ المنتجات</h3> (قائمة).
<h3>3️⃣ هيكل السوق</h3> (عدد المنشآت، المنافسة).
<h3>4️⃣ دورة التشغيل (أرقام)</h3> (جدول أيام تشغيل).
<h3>5️⃣ التكاليف والهوامش</h3> (نسب مئوية).
<h3>6️⃣ SWOT</h3> (تحليل كامل).
<h3>7️⃣ التوصية</h3> (رأي ائتماني)."
    )
}

/// Fence markers, matched case-insensitively (```html, ```HTML, bare ```).
/// Compiled once; this runs on every generation.
static FENCE_MARKERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)```(?:html)?").unwrap());

/// Strip code-fence wrappers from a model completion.
///
/// Providers decorate structured output with fences regardless of the
/// "raw HTML only" instruction; the contract promises undecorated markup.
pub fn strip_fences(content: &str) -> String {
    FENCE_MARKERS.replace_all(content, "").trim().to_string()
}

/// Generator client configuration.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// API key for the generation provider.
    pub api_key: String,
    /// Base URL (default: https://generativelanguage.googleapis.com/v1beta).
    pub base_url: String,
    /// Model name (default: gemini-2.5-flash).
    pub model: String,
    /// Request timeout (default: 120s).
    pub timeout: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads DIRASA_GENERATOR_API_KEY from environment. Returns error if not set.
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = std::env::var("DIRASA_GENERATOR_API_KEY")
            .map_err(|_| ProviderError::MissingApiKey("DIRASA_GENERATOR_API_KEY"))?;

        Ok(Self { api_key, ..Default::default() })
    }
}

/// generateContent client for long-form study bodies.
#[derive(Debug, Clone)]
pub struct GeneratorClient {
    http: reqwest::Client,
    config: GeneratorConfig,
}

#[derive(Deserialize)]
struct GeneratedPart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GeneratedContent {
    #[serde(default)]
    parts: Vec<GeneratedPart>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<GeneratedContent>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GeneratorClient {
    /// Create a new generator client with the given configuration.
    pub fn new(config: GeneratorConfig) -> Result<Self, ProviderError> {
        if config.api_key.is_empty() {
            return Err(ProviderError::MissingApiKey("DIRASA_GENERATOR_API_KEY"));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Network(std::sync::Arc::new(e)))?;

        Ok(Self { http, config })
    }

    /// Create a new generator client from environment variables.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(GeneratorConfig::from_env()?)
    }

    /// One generation round-trip, returning the fence-stripped study body.
    async fn request_study(&self, name: &CanonicalActivity) -> Result<String, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );
        let body = serde_json::json!({
            "contents": [
                { "parts": [ { "text": study_prompt(name) } ] }
            ],
        });

        tracing::debug!(model = %self.config.model, activity = %name, "generating market study");
        let start = std::time::Instant::now();

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
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

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let text: String = generated
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
            .ok_or(ProviderError::EmptyCompletion)?;

        let content = strip_fences(&text);
        if content.is_empty() {
            return Err(ProviderError::EmptyCompletion);
        }

        tracing::debug!(
            activity = %name,
            elapsed_ms = start.elapsed().as_millis() as u64,
            bytes = content.len(),
            "study generated"
        );

        Ok(content)
    }
}

#[async_trait]
impl Generate for GeneratorClient {
    async fn generate(&self, name: &CanonicalActivity) -> Result<String, Error> {
        self.request_study(name)
            .await
            .map_err(|e| Error::Generation(e.to_string()))
    }
}
