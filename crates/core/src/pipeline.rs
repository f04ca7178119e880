//! The normalize–classify–memoize–generate pipeline.
//!
//! Composes a classifier, the archive, and a generator into the
//! request-handling contract: validate → lookup → (hit: return) or
//! (miss: generate, store, return). Providers are injected at construction
//! through the [`Classify`] and [`Generate`] traits so tests can substitute
//! fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::activity::{CanonicalActivity, ClassificationOutcome};
use crate::archive::{ArchiveDb, StudyRecord};
use crate::error::Error;

/// Normalizes and validates raw user text into a canonical activity name.
///
/// Infallible by contract: implementations that call a remote service must
/// degrade to `Accepted(raw_input)` on provider failure rather than
/// propagate an error, since downstream caching still functions with a
/// less-normalized key.
#[async_trait]
pub trait Classify: Send + Sync {
    async fn classify(&self, raw_input: &str) -> ClassificationOutcome;
}

/// Produces the long-form study body for a canonical activity name.
///
/// There is no sensible fallback content, so failures propagate.
#[async_trait]
pub trait Generate: Send + Sync {
    async fn generate(&self, name: &CanonicalActivity) -> Result<String, Error>;
}

/// Where the served content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Archive,
    Generated,
}

/// Successful pipeline response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyResponse {
    /// The study body (constrained HTML subset).
    pub content: String,
    /// Whether the content was served from the archive or freshly generated.
    pub source: Source,
    /// The canonical activity name the content is keyed under.
    pub official_name: CanonicalActivity,
}

/// The pipeline orchestrator.
///
/// Holds no mutable state of its own; the archive is the only shared
/// resource, and its write is a single atomic insert. Concurrent requests
/// for the same activity may race into duplicate generations — an accepted
/// bounded cost resolved by the archive's uniqueness constraint at write
/// time.
pub struct StudyPipeline<C, G> {
    classifier: C,
    generator: G,
    archive: ArchiveDb,
}

impl<C: Classify, G: Generate> StudyPipeline<C, G> {
    pub fn new(classifier: C, generator: G, archive: ArchiveDb) -> Self {
        Self { classifier, generator, archive }
    }

    /// Handle one study request end to end.
    ///
    /// 1. Reject empty input before any remote call.
    /// 2. Classify; a rejection short-circuits with no archive or generator
    ///    interaction, keeping garbage keys out of the archive.
    /// 3. Serve from the archive on a hit. A lookup failure is fatal to the
    ///    request: the cache state cannot be determined safely.
    /// 4. On a miss, generate, then insert best-effort. An insert failure is
    ///    logged and swallowed — the generated content is still returned,
    ///    because content delivery takes priority over persistence.
    pub async fn handle_study_request(&self, raw_input: &str) -> Result<StudyResponse, Error> {
        let raw_input = raw_input.trim();
        if raw_input.is_empty() {
            return Err(Error::InvalidInput("activity text cannot be empty".into()));
        }

        let name = match self.classifier.classify(raw_input).await {
            ClassificationOutcome::Accepted(name) => name,
            ClassificationOutcome::Rejected => {
                tracing::info!(input = raw_input, "rejected non-activity input");
                return Err(Error::Rejected(
                    "the submitted text does not describe an economic activity; \
                     describe a business such as a shop, farm, factory, or service"
                        .into(),
                ));
            }
        };

        if let Some(record) = self.archive.lookup_study(name.as_str()).await? {
            tracing::debug!(activity = %name, "archive hit");
            return Ok(StudyResponse { content: record.content, source: Source::Archive, official_name: name });
        }

        tracing::debug!(activity = %name, "archive miss, generating");
        let content = self.generator.generate(&name).await?;

        // Insert only after a successful generation, so a failed request
        // never leaves a partial record behind. A duplicate-key race with a
        // concurrent request is benign: the first writer wins and this
        // caller still gets its own in-memory copy.
        if let Err(e) = self.archive.insert_study(name.as_str(), &content).await {
            tracing::warn!(activity = %name, error = %e, "failed to archive generated study");
        }

        Ok(StudyResponse { content, source: Source::Generated, official_name: name })
    }

    /// List every archived study, newest first.
    pub async fn list_studies(&self) -> Result<Vec<StudyRecord>, Error> {
        self.archive.list_studies().await
    }
}
