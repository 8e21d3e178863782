//! Quake Feed Pipeline
//!
//! Resilient fetch pipeline for the USGS FDSN earthquake catalog. One
//! bounded request per invocation, a single-slot fallback snapshot
//! refreshed on every success and substituted on failure, and
//! normalization of the GeoJSON feature collection into flat records
//! served over a small HTTP API.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading and validation
//! - [`query`] - Outbound query parameter derivation
//! - [`fetcher`] - Single-attempt catalog fetch
//! - [`fallback`] - Single-slot snapshot persistence
//! - [`normalize`] - Raw feature flattening
//! - [`pipeline`] - Fetch-or-fallback orchestration
//! - [`handlers`] / [`router`] - HTTP surface
//! - [`error`] - Error types and HTTP mapping

pub mod config;
pub mod error;
pub mod fallback;
pub mod fetcher;
pub mod handlers;
pub mod normalize;
pub mod pipeline;
pub mod query;
pub mod router;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use normalize::QuakeRecord;
pub use pipeline::FetchPipeline;
pub use router::AppState;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
