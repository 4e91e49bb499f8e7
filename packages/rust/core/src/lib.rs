//! Ask-pipeline orchestration for tenderlens.
//!
//! Ties together the document store, the relevance pipeline, and the LLM
//! client into the end-to-end question-answering workflow.

pub mod answer;

pub use answer::{AskOutcome, AskResult, FALLBACK_ANSWER, ProgressReporter, SilentProgress, ask};
