// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod canonical;
pub mod config;
pub mod curated;
pub mod ingest;
pub mod metrics;
pub mod rejections;
pub mod relevance;
pub mod scoring;
pub mod single_flight;
pub mod text;
pub mod transform;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::ingest::types::{Article, RawItem, SourceDescriptor, Tag};
pub use crate::ingest::NewsService;
