//! # GameFit Engine
//!
//! Hardware-to-game compatibility matching:
//! - Catalog of games, requirement sets and benchmarked CPUs/GPUs (SQLite)
//! - Minimum-tier filtering and performance headroom ranking
//! - Per-user hardware profiles
//! - Typo-tolerant title search
//! - Multiple interfaces: Rust library, HTTP API, CLI
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gamefit_engine::{MatchEngine, MatchRequest, SqliteCatalog};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let catalog = Arc::new(SqliteCatalog::new("gamefit.db").await?);
//!     let engine = MatchEngine::new(catalog);
//!
//!     let response = engine
//!         .find_matches(MatchRequest::new(16.0, 8192.0).with_cpu(3).with_gpu(7))
//!         .await?;
//!
//!     for result in &response.games {
//!         println!("{} - score {:.2}", result.game.title, result.score);
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod matching;
pub mod search;

// Re-export primary types
pub use catalog::{CatalogReader, CatalogSeed, CatalogSnapshot, SqliteCatalog};
pub use config::Config;
pub use crate::core::{Component, ComponentKind, Game, HardwareProfile, Headroom, MatchResult, RequirementSet};
pub use engine::{MatchEngine, MatchResponse};
pub use error::{GameFitError, Result};
pub use matching::{evaluate, MatchFilters, MatchInput, MatchOptions, MatchRequest, MatchStats, SelectionPolicy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
