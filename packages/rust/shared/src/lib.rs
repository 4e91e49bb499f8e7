//! Shared types, error model, and configuration for tenderlens.
//!
//! This crate is the foundation depended on by all other tenderlens crates.
//! It provides:
//! - [`TenderLensError`] — the unified error type
//! - Domain types ([`Category`], [`DocumentSet`], [`Chunk`], [`ChunkingResult`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, GeminiConfig, GenerationConfig, ProcessingConfig, StorageConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_path, validate_api_key,
};
pub use error::{Result, TenderLensError};
pub use types::{
    Category, Chunk, ChunkingMetadata, ChunkingResult, CriteriaSection, DocumentPayload,
    DocumentSet, ProcessingStatus,
};
