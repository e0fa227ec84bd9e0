//! Hardware-to-game matching.
//!
//! [`evaluate`] filters every game's requirement sets against the minimum tier,
//! measures headroom against the recommended tier and ranks the survivors.
//! It is a pure function over a [`CatalogSnapshot`]; loading the snapshot is the
//! caller's job (see [`crate::engine::MatchEngine`]).

pub mod input;
pub mod requirement;
pub mod score;
pub mod stats;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::catalog::CatalogSnapshot;
use crate::core::{ComponentId, ComponentKind, Game, GameId, MatchResult};
use crate::error::{GameFitError, Result};

pub use input::{MatchFilters, MatchInput, MatchRequest};
pub use requirement::{ResolvedRequirement, UserHardware};
pub use score::{tier_score, ResourceRatios};
pub use stats::{MatchStats, MinimumMiss};

/// How a game with several requirement sets is scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Stop at the first set that clears the minimum tier. If that set then
    /// misses the performance floor the game is dropped, even when a later
    /// set would have cleared it.
    ///
    /// This is the documented legacy behavior. The legacy matcher's code
    /// differs: it moves on to the next set after a floor miss and only stops
    /// once a set clears both the minimum tier and the floor.
    FirstEligible,
    /// Evaluate every set and keep the highest-scoring one that clears both
    /// the minimum tier and the performance floor.
    #[default]
    BestEligible,
}

impl SelectionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionPolicy::FirstEligible => "first_eligible",
            SelectionPolicy::BestEligible => "best_eligible",
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionPolicy {
    type Err = GameFitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first_eligible" => Ok(SelectionPolicy::FirstEligible),
            "best" | "best_eligible" => Ok(SelectionPolicy::BestEligible),
            other => Err(GameFitError::invalid_input(format!(
                "Unknown selection policy: {}",
                other
            ))),
        }
    }
}

/// Matching options/configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOptions {
    pub policy: SelectionPolicy,
}

/// Ranked results plus the counters gathered while producing them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    pub results: Vec<MatchResult>,
    pub stats: MatchStats,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Scored {
    score: f64,
    performance_ratio: f64,
}

/// Rank the catalog for one hardware description.
///
/// Returns `InvalidInput` when `cpu_id`/`gpu_id` do not name a component of the
/// right kind. Broken requirement sets are skipped and counted, never fatal.
/// An empty result is a normal outcome.
pub fn evaluate(input: &MatchInput, catalog: &CatalogSnapshot, options: &MatchOptions) -> Result<MatchOutcome> {
    let user = UserHardware {
        cpu_score: user_benchmark(catalog, input.cpu_id(), ComponentKind::Cpu)?,
        gpu_score: user_benchmark(catalog, input.gpu_id(), ComponentKind::Gpu)?,
        ram: input.ram(),
        vram: input.vram(),
    };

    let mut stats = MatchStats::default();
    let mut results: Vec<MatchResult> = Vec::new();
    let mut positions: HashMap<GameId, usize> = HashMap::new();

    for game in &catalog.games {
        stats.games_considered += 1;

        if let Some(genre_id) = input.genre_id() {
            if game.genre_id() != Some(genre_id) {
                stats.filtered_by_genre += 1;
                continue;
            }
        }

        let Some(scored) = select_requirement(
            game,
            &user,
            input.min_performance_ratio(),
            catalog,
            options.policy,
            &mut stats,
        ) else {
            continue;
        };

        match positions.get(&game.id) {
            Some(&index) => {
                if scored.score > results[index].score {
                    results[index] = MatchResult::new(game.clone(), scored.score, scored.performance_ratio);
                }
            }
            None => {
                positions.insert(game.id, results.len());
                results.push(MatchResult::new(game.clone(), scored.score, scored.performance_ratio));
            }
        }
    }

    stats.games_matched = results.len();
    sort_results(&mut results);

    Ok(MatchOutcome { results, stats })
}

/// Descending score, then newest release first; unknown years sort last
pub fn sort_results(results: &mut [MatchResult]) {
    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.game.sort_year().cmp(&a.game.sort_year()))
    });
}

fn user_benchmark(catalog: &CatalogSnapshot, id: Option<ComponentId>, kind: ComponentKind) -> Result<Option<u32>> {
    let Some(id) = id else {
        return Ok(None);
    };

    let component = catalog
        .component(id)
        .ok_or_else(|| GameFitError::invalid_input(format!("Unknown {} id: {}", kind, id)))?;

    if component.kind != kind {
        return Err(GameFitError::invalid_input(format!(
            "Component {} is a {}, expected a {}",
            id, component.kind, kind
        )));
    }

    tracing::debug!(component = %component.display_name(), "Resolved user {}", kind);
    Ok(Some(component.benchmark_score))
}

fn select_requirement(
    game: &Game,
    user: &UserHardware,
    min_performance_ratio: f64,
    catalog: &CatalogSnapshot,
    policy: SelectionPolicy,
    stats: &mut MatchStats,
) -> Option<Scored> {
    let mut best: Option<Scored> = None;

    for set in &game.requirements {
        stats.requirement_sets_evaluated += 1;

        let resolved = match ResolvedRequirement::resolve(set, catalog) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!("Skipping requirement set for {}: {}", game.title, e);
                stats.integrity_errors += 1;
                continue;
            }
        };

        if let Err(miss) = resolved.check_minimum(user) {
            stats.record_miss(miss);
            continue;
        }
        stats.passed_minimum += 1;

        let performance_ratio = resolved.ratios(user).performance_ratio();

        if performance_ratio < min_performance_ratio {
            stats.below_performance_floor += 1;
            match policy {
                SelectionPolicy::FirstEligible => break,
                SelectionPolicy::BestEligible => continue,
            }
        }

        let scored = Scored {
            score: tier_score(performance_ratio),
            performance_ratio,
        };

        match policy {
            SelectionPolicy::FirstEligible => return Some(scored),
            SelectionPolicy::BestEligible => {
                if best.map_or(true, |b| scored.score > b.score) {
                    best = Some(scored);
                }
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Component, Genre, RequirementSet};

    const MIN_CPU: ComponentId = 1;
    const USER_CPU: ComponentId = 2;
    const FAST_CPU: ComponentId = 3;
    const WEAK_CPU: ComponentId = 4;
    const MIN_GPU: ComponentId = 11;
    const USER_GPU: ComponentId = 12;
    const FAST_GPU: ComponentId = 13;
    const WEAK_GPU: ComponentId = 14;

    fn components() -> Vec<Component> {
        vec![
            Component::new(MIN_CPU, "Core i5-4460", ComponentKind::Cpu, 3000),
            Component::new(USER_CPU, "Ryzen 5 3600", ComponentKind::Cpu, 5000),
            Component::new(FAST_CPU, "Ryzen 9 7950X", ComponentKind::Cpu, 10000),
            Component::new(WEAK_CPU, "Core 2 Duo", ComponentKind::Cpu, 2000),
            Component::new(MIN_GPU, "GTX 970", ComponentKind::Gpu, 6000),
            Component::new(USER_GPU, "RTX 2070", ComponentKind::Gpu, 8000),
            Component::new(FAST_GPU, "RTX 4090", ComponentKind::Gpu, 12000),
            Component::new(WEAK_GPU, "GTX 750 Ti", ComponentKind::Gpu, 4000),
        ]
    }

    /// Scenario 1 requirement set: min (3000, 6000, 8 GB, 2048 MB), rec (5000, 8000, 16 GB, 4096 MB)
    fn baseline(id: i64, game_id: GameId) -> RequirementSet {
        RequirementSet {
            id,
            game_id,
            min_cpu_id: MIN_CPU,
            min_gpu_id: MIN_GPU,
            rec_cpu_id: USER_CPU,
            rec_gpu_id: USER_GPU,
            min_ram: 8.0,
            min_vram: 2048.0,
            rec_ram: 16.0,
            rec_vram: 4096.0,
        }
    }

    fn game(id: GameId, title: &str, year: Option<i32>, requirements: Vec<RequirementSet>) -> Game {
        let mut game = Game::new(id, title);
        game.release_year = year;
        game.requirements = requirements;
        game
    }

    fn snapshot(games: Vec<Game>) -> CatalogSnapshot {
        CatalogSnapshot::new(components(), games)
    }

    fn user_request() -> MatchRequest {
        MatchRequest::new(16.0, 4096.0).with_cpu(USER_CPU).with_gpu(USER_GPU)
    }

    fn run(request: MatchRequest, catalog: &CatalogSnapshot, policy: SelectionPolicy) -> MatchOutcome {
        let input = request.validate().unwrap();
        evaluate(&input, catalog, &MatchOptions { policy }).unwrap()
    }

    fn run_default(request: MatchRequest, catalog: &CatalogSnapshot) -> MatchOutcome {
        run(request, catalog, SelectionPolicy::default())
    }

    #[test]
    fn test_exact_recommended_scores_two() {
        let catalog = snapshot(vec![game(1, "Baseline", Some(2020), vec![baseline(1, 1)])]);
        let outcome = run_default(user_request(), &catalog);

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].performance_ratio, 1.0);
        assert_eq!(outcome.results[0].score, 2.0);
    }

    #[test]
    fn test_cpu_bottleneck_lands_in_minimum_band() {
        let mut set = baseline(1, 1);
        set.rec_cpu_id = FAST_CPU;
        let catalog = snapshot(vec![game(1, "CPU Heavy", None, vec![set])]);

        let outcome = run_default(user_request(), &catalog);
        assert_eq!(outcome.results[0].performance_ratio, 0.5);
        assert_eq!(outcome.results[0].score, 0.5);
    }

    #[test]
    fn test_performance_floor_excludes_game() {
        let mut set = baseline(1, 1);
        set.rec_cpu_id = FAST_CPU;
        let catalog = snapshot(vec![game(1, "CPU Heavy", None, vec![set])]);

        let outcome = run_default(user_request().with_min_performance_ratio(0.8), &catalog);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.stats.below_performance_floor, 1);
        assert_eq!(outcome.stats.games_matched, 0);
    }

    #[test]
    fn test_minimum_ram_is_a_hard_gate() {
        let catalog = snapshot(vec![game(1, "Baseline", None, vec![baseline(1, 1)])]);
        let request = MatchRequest::new(4.0, 4096.0).with_cpu(FAST_CPU).with_gpu(FAST_GPU);

        let outcome = run_default(request, &catalog);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.stats.filtered_by_ram, 1);
        assert_eq!(outcome.stats.passed_minimum, 0);
    }

    #[test]
    fn test_omitted_components_are_non_factors() {
        let catalog = snapshot(vec![game(1, "Baseline", None, vec![baseline(1, 1)])]);
        let outcome = run_default(MatchRequest::new(32.0, 8192.0), &catalog);

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].performance_ratio, 1.0);
        assert_eq!(outcome.results[0].score, 2.0);
    }

    #[test]
    fn test_omitted_cpu_skips_cpu_gate() {
        let catalog = snapshot(vec![game(1, "Baseline", None, vec![baseline(1, 1)])]);

        let weak = run_default(MatchRequest::new(16.0, 4096.0).with_cpu(WEAK_CPU), &catalog);
        assert!(weak.results.is_empty());
        assert_eq!(weak.stats.filtered_by_cpu, 1);

        let omitted = run_default(MatchRequest::new(16.0, 4096.0), &catalog);
        assert_eq!(omitted.results.len(), 1);
    }

    #[test]
    fn test_minimum_gpu_gate_is_counted() {
        let catalog = snapshot(vec![game(1, "Baseline", None, vec![baseline(1, 1)])]);
        let request = MatchRequest::new(16.0, 4096.0).with_cpu(USER_CPU).with_gpu(WEAK_GPU);

        let outcome = run_default(request, &catalog);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.stats.filtered_by_gpu, 1);
        assert_eq!(outcome.stats.filtered_by_cpu, 0);
        assert_eq!(outcome.stats.filtered_by_minimum(), 1);
    }

    #[test]
    fn test_gate_order_reports_first_miss() {
        let catalog = snapshot(vec![game(1, "Baseline", None, vec![baseline(1, 1)])]);
        let request = MatchRequest::new(16.0, 1024.0).with_cpu(WEAK_CPU);

        let outcome = run_default(request, &catalog);
        assert_eq!(outcome.stats.filtered_by_vram, 1);
        assert_eq!(outcome.stats.filtered_by_cpu, 0);
    }

    #[test]
    fn test_ratio_is_minimum_of_resources() {
        let catalog = snapshot(vec![game(1, "Baseline", None, vec![baseline(1, 1)])]);
        // cpu 10000/5000 = 2.0, gpu 12000/8000 = 1.5, ram 24/16 = 1.5, vram 3072/4096 = 0.75
        let request = MatchRequest::new(24.0, 3072.0).with_cpu(FAST_CPU).with_gpu(FAST_GPU);

        let outcome = run_default(request, &catalog);
        assert_eq!(outcome.results[0].performance_ratio, 0.75);
        assert_eq!(outcome.results[0].score, 0.75);
    }

    #[test]
    fn test_game_with_failing_second_set_appears_once() {
        let mut strict = baseline(2, 1);
        strict.min_ram = 64.0;
        let catalog = snapshot(vec![game(1, "Two Editions", None, vec![baseline(1, 1), strict])]);

        for policy in [SelectionPolicy::FirstEligible, SelectionPolicy::BestEligible] {
            let outcome = run(user_request(), &catalog, policy);
            assert_eq!(outcome.results.len(), 1, "policy {}", policy);
        }
    }

    #[test]
    fn test_duplicate_game_rows_keep_highest_score() {
        let mut heavy = baseline(2, 1);
        heavy.rec_cpu_id = FAST_CPU;
        let catalog = snapshot(vec![
            game(1, "Listed Twice", None, vec![heavy]),
            game(1, "Listed Twice", None, vec![baseline(1, 1)]),
        ]);

        let outcome = run_default(user_request(), &catalog);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].score, 2.0);
        assert_eq!(outcome.stats.games_matched, 1);
    }

    #[test]
    fn test_first_eligible_drops_game_below_floor() {
        let mut remaster = baseline(1, 1);
        remaster.rec_cpu_id = FAST_CPU;
        let catalog = snapshot(vec![game(1, "Remastered", None, vec![remaster, baseline(2, 1)])]);
        let request = user_request().with_min_performance_ratio(0.8);

        let first = run(request.clone(), &catalog, SelectionPolicy::FirstEligible);
        assert!(first.results.is_empty());
        assert_eq!(first.stats.requirement_sets_evaluated, 1);

        let best = run(request, &catalog, SelectionPolicy::BestEligible);
        assert_eq!(best.results.len(), 1);
        assert_eq!(best.results[0].score, 2.0);
        assert_eq!(best.stats.requirement_sets_evaluated, 2);
    }

    #[test]
    fn test_first_eligible_keeps_first_passing_set() {
        let mut remaster = baseline(1, 1);
        remaster.rec_cpu_id = FAST_CPU;
        let catalog = snapshot(vec![game(1, "Remastered", None, vec![remaster, baseline(2, 1)])]);

        let first = run(user_request(), &catalog, SelectionPolicy::FirstEligible);
        assert_eq!(first.results[0].score, 0.5);

        let best = run(user_request(), &catalog, SelectionPolicy::BestEligible);
        assert_eq!(best.results[0].score, 2.0);
    }

    #[test]
    fn test_missing_component_skips_only_that_set() {
        let mut broken = baseline(1, 1);
        broken.rec_gpu_id = 99;
        let catalog = snapshot(vec![
            game(1, "Broken Row", None, vec![broken.clone()]),
            game(2, "Recovers", None, vec![RequirementSet { game_id: 2, ..broken }, baseline(3, 2)]),
            game(3, "Healthy", None, vec![baseline(4, 3)]),
        ]);

        let outcome = run_default(user_request(), &catalog);
        let titles: Vec<&str> = outcome.results.iter().map(|r| r.game.title.as_str()).collect();
        assert_eq!(titles.len(), 2);
        assert!(titles.contains(&"Recovers"));
        assert!(titles.contains(&"Healthy"));
        assert_eq!(outcome.stats.integrity_errors, 2);
    }

    #[test]
    fn test_wrong_component_kind_is_integrity_error() {
        let mut swapped = baseline(1, 1);
        swapped.min_cpu_id = MIN_GPU;
        let catalog = snapshot(vec![game(1, "Swapped", None, vec![swapped])]);

        let outcome = run_default(user_request(), &catalog);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.stats.integrity_errors, 1);
    }

    #[test]
    fn test_zero_recommended_memory_is_integrity_error() {
        let mut zero = baseline(1, 1);
        zero.rec_vram = 0.0;
        let catalog = snapshot(vec![game(1, "Zero", None, vec![zero])]);

        let outcome = run_default(user_request(), &catalog);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.stats.integrity_errors, 1);
    }

    #[test]
    fn test_unknown_user_component_is_invalid_input() {
        let catalog = snapshot(vec![game(1, "Baseline", None, vec![baseline(1, 1)])]);

        let unknown = MatchRequest::new(16.0, 4096.0).with_cpu(404).validate().unwrap();
        let result = evaluate(&unknown, &catalog, &MatchOptions::default());
        assert!(matches!(result, Err(GameFitError::InvalidInput(_))));

        let wrong_kind = MatchRequest::new(16.0, 4096.0).with_gpu(USER_CPU).validate().unwrap();
        let result = evaluate(&wrong_kind, &catalog, &MatchOptions::default());
        assert!(matches!(result, Err(GameFitError::InvalidInput(_))));
    }

    #[test]
    fn test_sorted_by_score_then_year() {
        let mut heavy = baseline(1, 1);
        heavy.rec_cpu_id = FAST_CPU;
        let catalog = snapshot(vec![
            game(1, "Heavy", Some(2024), vec![heavy]),
            game(2, "Undated", None, vec![baseline(2, 2)]),
            game(3, "Older", Some(2015), vec![baseline(3, 3)]),
            game(4, "Newer", Some(2020), vec![baseline(4, 4)]),
        ]);

        let outcome = run_default(user_request(), &catalog);
        let titles: Vec<&str> = outcome.results.iter().map(|r| r.game.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older", "Undated", "Heavy"]);
    }

    #[test]
    fn test_genre_filter() {
        let mut shooter = game(1, "Shooter", None, vec![baseline(1, 1)]);
        shooter.genre = Some(Genre { id: 1, name: "FPS".into() });
        let mut puzzle = game(2, "Puzzle", None, vec![baseline(2, 2)]);
        puzzle.genre = Some(Genre { id: 2, name: "Puzzle".into() });
        let untagged = game(3, "Untagged", None, vec![baseline(3, 3)]);
        let catalog = snapshot(vec![shooter, puzzle, untagged]);

        let outcome = run_default(user_request().with_genre(2), &catalog);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].game.title, "Puzzle");
        assert_eq!(outcome.stats.filtered_by_genre, 2);
    }

    #[test]
    fn test_empty_catalog_is_not_an_error() {
        let catalog = CatalogSnapshot::default();
        let outcome = run_default(MatchRequest::new(16.0, 4096.0), &catalog);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.stats, MatchStats::default());
    }

    #[test]
    fn test_idempotent() {
        let mut heavy = baseline(1, 1);
        heavy.rec_gpu_id = FAST_GPU;
        let catalog = snapshot(vec![
            game(1, "A", Some(2019), vec![heavy]),
            game(2, "B", Some(2021), vec![baseline(2, 2)]),
            game(3, "C", Some(2021), vec![baseline(3, 3)]),
        ]);

        let first = run_default(user_request(), &catalog);
        let second = run_default(user_request(), &catalog);
        assert_eq!(first, second);
    }

    #[test]
    fn test_more_memory_never_lowers_ratio() {
        let catalog = snapshot(vec![game(1, "Baseline", None, vec![baseline(1, 1)])]);

        let mut previous = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for ram in [8.0, 10.0, 12.0, 16.0, 24.0, 32.0, 64.0] {
            let request = MatchRequest::new(ram, 4096.0).with_cpu(USER_CPU).with_gpu(USER_GPU);
            let outcome = run_default(request, &catalog);
            let result = &outcome.results[0];
            assert!(result.performance_ratio >= previous.0);
            assert!(result.score >= previous.1);
            previous = (result.performance_ratio, result.score);
        }
    }

    #[test]
    fn test_more_vram_never_lowers_ratio() {
        let catalog = snapshot(vec![game(1, "Baseline", None, vec![baseline(1, 1)])]);

        let mut previous = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for vram in [2048.0, 3072.0, 4096.0, 6144.0, 8192.0, 16384.0] {
            let request = MatchRequest::new(16.0, vram).with_cpu(USER_CPU).with_gpu(USER_GPU);
            let outcome = run_default(request, &catalog);
            let result = &outcome.results[0];
            assert!(result.performance_ratio >= previous.0);
            assert!(result.score >= previous.1);
            previous = (result.performance_ratio, result.score);
        }
    }

    #[test]
    fn test_faster_cpu_never_lowers_score() {
        let catalog = snapshot(vec![game(1, "Baseline", None, vec![baseline(1, 1)])]);
        let request = |cpu| MatchRequest::new(64.0, 16384.0).with_cpu(cpu).with_gpu(FAST_GPU);

        let mut previous = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for cpu in [MIN_CPU, USER_CPU, FAST_CPU] {
            let outcome = run_default(request(cpu), &catalog);
            let result = &outcome.results[0];
            assert!(result.performance_ratio >= previous.0);
            assert!(result.score >= previous.1);
            previous = (result.performance_ratio, result.score);
        }
        assert_eq!(previous.0, 1.5);
    }

    #[test]
    fn test_faster_gpu_never_lowers_score() {
        let catalog = snapshot(vec![game(1, "Baseline", None, vec![baseline(1, 1)])]);
        let request = |gpu| MatchRequest::new(64.0, 16384.0).with_cpu(FAST_CPU).with_gpu(gpu);

        let slower = run_default(request(MIN_GPU), &catalog);
        let faster = run_default(request(FAST_GPU), &catalog);
        assert!(faster.results[0].performance_ratio >= slower.results[0].performance_ratio);
        assert!(faster.results[0].score >= slower.results[0].score);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("first".parse::<SelectionPolicy>().unwrap(), SelectionPolicy::FirstEligible);
        assert_eq!("BEST_ELIGIBLE".parse::<SelectionPolicy>().unwrap(), SelectionPolicy::BestEligible);
        assert!("random".parse::<SelectionPolicy>().is_err());
        assert_eq!(SelectionPolicy::default(), SelectionPolicy::BestEligible);
    }
}
