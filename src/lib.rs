//! # ai-seo-rs
//!
//! AI-assisted SEO metadata optimizer for content-management records.
//!
//! Page content is sent to an OpenAI-compatible chat API, the free-text reply is
//! parsed into structured SEO fields, and a heuristic score is attached. The
//! results can then be applied back onto stored content records, either field by
//! field or all at once.

pub mod config;
pub mod content;
pub mod error;
pub mod llm;
pub mod logging;
pub mod seo;
pub mod server;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use seo::{SeoAnalysis, SeoOptimizer};
