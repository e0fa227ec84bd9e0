use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::catalog::sqlite::{NewComponent, NewGame, NewRequirement, SqliteCatalog};
use crate::core::game::deserialize_year;
use crate::core::{ComponentId, ComponentKind, RequirementSet};
use crate::error::Result;

fn default_benchmark_score() -> u32 {
    1000
}

/// Catalog bootstrap document. Requirement sets reference components by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSeed {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub manufacturers: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub components: Vec<SeedComponent>,
    #[serde(default)]
    pub games: Vec<SeedGame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedComponent {
    pub name: String,
    pub kind: ComponentKind,
    pub manufacturer: String,
    #[serde(default = "default_benchmark_score")]
    pub benchmark_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedGame {
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_year")]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<SeedRequirement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRequirement {
    pub min_cpu: String,
    pub min_gpu: String,
    pub rec_cpu: String,
    pub rec_gpu: String,
    pub min_ram: f64,
    pub min_vram: f64,
    pub rec_ram: f64,
    pub rec_vram: f64,
}

/// What a seed run wrote and what it had to skip
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub components_added: usize,
    pub components_reused: usize,
    pub games_added: usize,
    pub games_reused: usize,
    pub requirements_added: usize,
    pub requirements_reused: usize,
    pub requirements_skipped: usize,
}

impl CatalogSeed {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| crate::error::GameFitError::Other(format!("Cannot read seed {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

impl SqliteCatalog {
    /// Load a seed document. Applying the same document twice changes nothing.
    ///
    /// Components already present (same name and kind) and games already present
    /// (same title and release year) are reused, and a requirement set identical
    /// to one the game already has is not added again. Requirement sets naming
    /// unknown components are skipped with a warning.
    pub async fn apply_seed(&self, seed: &CatalogSeed) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        for name in &seed.genres {
            self.add_genre(name).await?;
        }
        for name in &seed.platforms {
            self.add_platform(name).await?;
        }
        for name in &seed.manufacturers {
            self.add_manufacturer(name).await?;
        }
        for name in &seed.tags {
            self.add_tag(name).await?;
        }

        let mut component_ids: HashMap<(String, ComponentKind), ComponentId> = HashMap::new();
        for component in &seed.components {
            let id = match self.find_component(&component.name, component.kind).await? {
                Some(existing) => {
                    report.components_reused += 1;
                    existing.id
                }
                None => {
                    let added = self
                        .add_component(&NewComponent {
                            name: component.name.clone(),
                            kind: component.kind,
                            manufacturer: component.manufacturer.clone(),
                            benchmark_score: component.benchmark_score,
                        })
                        .await?;
                    report.components_added += 1;
                    added.id
                }
            };
            component_ids.insert((component.name.trim().to_string(), component.kind), id);
        }

        for game in &seed.games {
            let (game_id, mut existing) = match self.find_game(&game.title, game.release_year).await? {
                Some(id) => {
                    report.games_reused += 1;
                    let requirements = self.game(id).await?.map(|g| g.requirements).unwrap_or_default();
                    (id, requirements)
                }
                None => {
                    let id = self
                        .add_game(&NewGame {
                            title: game.title.clone(),
                            release_year: game.release_year,
                            genre: game.genre.clone(),
                            platform: game.platform.clone(),
                            tags: game.tags.clone(),
                            image: None,
                        })
                        .await?;
                    report.games_added += 1;
                    (id, Vec::new())
                }
            };

            for requirement in &game.requirements {
                let lookup = |name: &str, kind: ComponentKind| component_ids.get(&(name.trim().to_string(), kind)).copied();

                let resolved = (
                    lookup(&requirement.min_cpu, ComponentKind::Cpu),
                    lookup(&requirement.min_gpu, ComponentKind::Gpu),
                    lookup(&requirement.rec_cpu, ComponentKind::Cpu),
                    lookup(&requirement.rec_gpu, ComponentKind::Gpu),
                );

                let (Some(min_cpu_id), Some(min_gpu_id), Some(rec_cpu_id), Some(rec_gpu_id)) = resolved else {
                    tracing::warn!(
                        "Skipping requirement set of {}: unknown component in {} / {} / {} / {}",
                        game.title,
                        requirement.min_cpu,
                        requirement.min_gpu,
                        requirement.rec_cpu,
                        requirement.rec_gpu
                    );
                    report.requirements_skipped += 1;
                    continue;
                };

                let new_requirement = NewRequirement {
                    min_cpu_id,
                    min_gpu_id,
                    rec_cpu_id,
                    rec_gpu_id,
                    min_ram: requirement.min_ram,
                    min_vram: requirement.min_vram,
                    rec_ram: requirement.rec_ram,
                    rec_vram: requirement.rec_vram,
                };

                if existing.iter().any(|set| same_requirement(set, &new_requirement)) {
                    report.requirements_reused += 1;
                    continue;
                }

                let added = self.add_requirement(game_id, &new_requirement).await?;
                existing.push(added);
                report.requirements_added += 1;
            }
        }

        tracing::info!(
            "Seed applied: {} components (+{} reused), {} games (+{} reused), {} requirement sets (+{} reused, {} skipped)",
            report.components_added,
            report.components_reused,
            report.games_added,
            report.games_reused,
            report.requirements_added,
            report.requirements_reused,
            report.requirements_skipped
        );

        Ok(report)
    }
}

fn same_requirement(set: &RequirementSet, new: &NewRequirement) -> bool {
    set.min_cpu_id == new.min_cpu_id
        && set.min_gpu_id == new.min_gpu_id
        && set.rec_cpu_id == new.rec_cpu_id
        && set.rec_gpu_id == new.rec_gpu_id
        && set.min_ram == new.min_ram
        && set.min_vram == new.min_vram
        && set.rec_ram == new.rec_ram
        && set.rec_vram == new.rec_vram
}
