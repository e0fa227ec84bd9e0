pub mod seed;
pub mod sqlite;

use async_trait::async_trait;
use std::collections::HashMap;

use crate::core::{Component, ComponentId, Game, HardwareProfile, UserId};
use crate::error::Result;

pub use seed::{CatalogSeed, SeedReport};
pub use sqlite::{CatalogStats, NewComponent, NewGame, NewRequirement, SqliteCatalog};

/// Read access to the catalog, injected into the engine
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Load every game with its requirement sets plus every component, in one consistent read
    async fn snapshot(&self) -> Result<CatalogSnapshot>;

    /// Get a user's stored hardware profile
    async fn hardware_profile(&self, user_id: UserId) -> Result<Option<HardwareProfile>>;
}

/// Point-in-time copy of the catalog the matcher evaluates against
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub components: HashMap<ComponentId, Component>,
    /// Games in catalog order
    pub games: Vec<Game>,
}

impl CatalogSnapshot {
    pub fn new(components: Vec<Component>, games: Vec<Game>) -> Self {
        Self {
            components: components.into_iter().map(|c| (c.id, c)).collect(),
            games,
        }
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    pub fn requirement_count(&self) -> usize {
        self.games.iter().map(|g| g.requirements.len()).sum()
    }
}
