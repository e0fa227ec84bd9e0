use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::catalog::CatalogReader;
use crate::core::{MatchResult, UserId};
use crate::error::{GameFitError, Result};
use crate::matching::{evaluate, MatchFilters, MatchOptions, MatchRequest, MatchStats, SelectionPolicy};

/// Message returned alongside an empty, valid result set
pub const NO_MATCHES_MESSAGE: &str = "No games match the given hardware and filters";

/// Main matching orchestrator: loads a catalog snapshot and ranks it
pub struct MatchEngine {
    catalog: Arc<dyn CatalogReader>,
    options: MatchOptions,
}

/// Ranked matches with diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub games: Vec<MatchResult>,

    pub stats: MatchStats,

    /// Evaluation latency in milliseconds
    pub latency_ms: f64,

    pub policy: SelectionPolicy,

    /// Set only when nothing matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MatchResponse {
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl MatchEngine {
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self::with_options(catalog, MatchOptions::default())
    }

    pub fn with_options(catalog: Arc<dyn CatalogReader>, options: MatchOptions) -> Self {
        Self { catalog, options }
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Rank the catalog for explicit hardware parameters
    pub async fn find_matches(&self, request: MatchRequest) -> Result<MatchResponse> {
        let start = Instant::now();

        let input = request.validate()?;
        let snapshot = self.catalog.snapshot().await?;
        let outcome = evaluate(&input, &snapshot, &self.options)?;

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        tracing::info!(
            "Matched {} games in {:.2}ms ({})",
            outcome.results.len(),
            latency_ms,
            self.options.policy
        );
        tracing::debug!("{}", outcome.stats.summary());
        if let Some(top) = outcome.results.first() {
            tracing::debug!("Top match: {}", top.display());
        }

        let message = outcome
            .results
            .is_empty()
            .then(|| NO_MATCHES_MESSAGE.to_string());

        Ok(MatchResponse {
            games: outcome.results,
            stats: outcome.stats,
            latency_ms,
            policy: self.options.policy,
            message,
        })
    }

    /// Rank the catalog for a user's stored hardware profile
    pub async fn matches_for_user(&self, user_id: UserId, filters: MatchFilters) -> Result<MatchResponse> {
        let profile = self
            .catalog
            .hardware_profile(user_id)
            .await?
            .ok_or_else(|| GameFitError::NotFound(format!("hardware profile for user {}", user_id)))?;

        self.find_matches(MatchRequest::from_profile(&profile, &filters)).await
    }
}
