//! End-to-end `ask` pipeline: tender id + question → relevant context →
//! LLM answer.

use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};

use tenderlens_llm::{GeminiClient, GenerationParams};
use tenderlens_relevance::combine;
use tenderlens_shared::{AppConfig, DocumentPayload, Result, TenderLensError};
use tenderlens_storage::Storage;

/// Fixed user-facing message when the LLM call fails or returns nothing.
///
/// The real cause is logged but never surfaced to the caller; a model
/// outage reads as a soft apology rather than an error code.
pub const FALLBACK_ANSWER: &str = "I'm sorry, I encountered an error while processing \
your question. Please try again later or with a more specific question.";

/// How one ask request concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// The model (or the answer cache) produced an answer.
    Answered(String),
    /// No tender exists under the given identifier.
    TenderNotFound,
    /// The tender exists but holds no usable text.
    EmptyDocuments,
}

impl AskOutcome {
    /// User-facing message for this outcome.
    pub fn message(&self, tender_id: &str) -> String {
        match self {
            Self::Answered(answer) => answer.clone(),
            Self::TenderNotFound => format!(
                "No tender found with ID: {tender_id}. Please check the tender ID and try again."
            ),
            Self::EmptyDocuments => "No file texts found for this tender. The document may be \
empty or not properly processed."
                .into(),
        }
    }
}

/// Result of one ask request.
#[derive(Debug)]
pub struct AskResult {
    pub outcome: AskOutcome,
    /// Characters of combined context handed to the model.
    pub context_chars: usize,
    /// Whether the answer came from the cache instead of a live call.
    pub cache_hit: bool,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
}

/// The user prompt wrapping the combined context and the question.
pub fn build_user_prompt(tender_id: &str, combined_text: &str, question: &str) -> String {
    format!(
        "Here is the tender document with ID {tender_id}:\n\n{combined_text}\n\nQuestion: {question}"
    )
}

/// Cache key over everything that determines the answer.
fn prompt_hash(system_prompt: &str, user_prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(system_prompt.as_bytes());
    hasher.update(user_prompt.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Run the full ask pipeline.
///
/// 1. Look up the tender's documents
/// 2. Select and combine the relevant context
/// 3. Serve from the answer cache when possible
/// 4. Otherwise call the model, falling back to a fixed apology on failure
#[instrument(skip_all, fields(tender_id = %tender_id))]
pub async fn ask(
    storage: &Storage,
    llm: &GeminiClient,
    config: &AppConfig,
    tender_id: &str,
    question: &str,
    progress: &dyn ProgressReporter,
) -> Result<AskResult> {
    let start = Instant::now();

    if tender_id.trim().is_empty() {
        return Err(TenderLensError::validation("tender id must not be empty"));
    }
    if question.trim().is_empty() {
        return Err(TenderLensError::validation("question must not be empty"));
    }

    // --- Phase 1: Lookup ---
    progress.phase("Looking up tender");
    let Some(raw) = storage.get_tender(tender_id).await? else {
        info!("tender not found");
        return Ok(AskResult {
            outcome: AskOutcome::TenderNotFound,
            context_chars: 0,
            cache_hit: false,
            elapsed: start.elapsed(),
        });
    };

    let payload = DocumentPayload::from_json(&raw);
    if payload.is_empty() {
        info!("tender has no usable text");
        return Ok(AskResult {
            outcome: AskOutcome::EmptyDocuments,
            context_chars: 0,
            cache_hit: false,
            elapsed: start.elapsed(),
        });
    }

    // --- Phase 2: Context selection ---
    progress.phase("Selecting relevant document context");
    let combined = combine(&payload, &config.processing);
    let context_chars = combined.chars().count();
    info!(context_chars, "context assembled");

    let system_prompt = &config.generation.system_prompt;
    let user_prompt = build_user_prompt(tender_id, &combined, question);
    let hash = prompt_hash(system_prompt, &user_prompt);

    // --- Phase 3: Answer cache ---
    progress.phase("Checking answer cache");
    if let Some(cached) = storage
        .get_cached_answer(tender_id, &hash, llm.model())
        .await?
    {
        info!("answer cache hit");
        return Ok(AskResult {
            outcome: AskOutcome::Answered(cached),
            context_chars,
            cache_hit: true,
            elapsed: start.elapsed(),
        });
    }

    // --- Phase 4: Model call ---
    progress.phase("Asking the model");
    let params = GenerationParams::from(&config.generation);
    let outcome = match llm.generate(system_prompt, &user_prompt, params).await {
        Ok(answer) => {
            // A cache write failure must not fail the request.
            if let Err(e) = storage
                .set_cached_answer(tender_id, &hash, llm.model(), &answer)
                .await
            {
                warn!(error = %e, "failed to cache answer");
            }
            AskOutcome::Answered(answer)
        }
        Err(e) => {
            warn!(error = %e, "LLM call failed, returning fallback answer");
            AskOutcome::Answered(FALLBACK_ANSWER.to_string())
        }
    };

    let result = AskResult {
        outcome,
        context_chars,
        cache_hit: false,
        elapsed: start.elapsed(),
    };

    info!(
        context_chars = result.context_chars,
        elapsed_ms = result.elapsed.as_millis(),
        "ask complete"
    );

    Ok(result)
}
