//! Shared types, error model, and configuration for arxiv-digest.
//!
//! This crate is the foundation depended on by all other arxiv-digest crates.
//! It provides:
//! - [`DigestError`]: the unified error type
//! - Domain types ([`Keyword`], [`Entry`], [`Match`], [`Report`])
//! - Configuration ([`AppConfig`], [`MatcherConfig`], [`SlackConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, MatcherConfig, SlackConfig, config_dir, config_file_path, load_config,
    load_config_from,
};
pub use error::{DigestError, Result, error_chain};
pub use types::{Entry, Keyword, Match, MatchMode, Report};
