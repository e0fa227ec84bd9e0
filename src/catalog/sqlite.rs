use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::catalog::{CatalogReader, CatalogSnapshot};
use crate::core::{
    Component, ComponentId, ComponentKind, Game, GameId, GameImage, Genre, HardwareProfile, Manufacturer,
    Platform, RequirementSet, Tag, UserId,
};
use crate::error::{GameFitError, Result};
use crate::search::{TitleHit, TitleMatcher};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS manufacturers (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS genres (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS platforms (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS components (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('CPU', 'GPU')),
    manufacturer_id INTEGER NOT NULL REFERENCES manufacturers(id),
    benchmark_score INTEGER NOT NULL CHECK (benchmark_score > 0),
    UNIQUE (name, kind)
);
CREATE TABLE IF NOT EXISTS games (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    release_year INTEGER,
    genre_id INTEGER REFERENCES genres(id),
    platform_id INTEGER REFERENCES platforms(id),
    image_type TEXT,
    image_data BLOB
);
CREATE TABLE IF NOT EXISTS game_tags (
    game_id INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (game_id, tag_id)
);
CREATE TABLE IF NOT EXISTS requirements (
    id INTEGER PRIMARY KEY,
    game_id INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
    min_cpu_id INTEGER NOT NULL REFERENCES components(id),
    min_gpu_id INTEGER NOT NULL REFERENCES components(id),
    rec_cpu_id INTEGER NOT NULL REFERENCES components(id),
    rec_gpu_id INTEGER NOT NULL REFERENCES components(id),
    min_ram REAL NOT NULL,
    min_vram REAL NOT NULL,
    rec_ram REAL NOT NULL,
    rec_vram REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS hardware_profiles (
    user_id INTEGER PRIMARY KEY,
    cpu_id INTEGER NOT NULL REFERENCES components(id),
    gpu_id INTEGER NOT NULL REFERENCES components(id),
    ram REAL NOT NULL,
    vram REAL NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_requirements_game ON requirements(game_id);
CREATE INDEX IF NOT EXISTS idx_games_genre ON games(genre_id);
";

/// A component to add to the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct NewComponent {
    pub name: String,
    pub kind: ComponentKind,
    pub manufacturer: String,
    pub benchmark_score: u32,
}

/// A game to add to the catalog. Genre, platform and tags are resolved by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewGame {
    pub title: String,
    pub release_year: Option<i32>,
    pub genre: Option<String>,
    pub platform: Option<String>,
    pub tags: Vec<String>,
    pub image: Option<GameImage>,
}

/// A requirement set to attach to an existing game
#[derive(Debug, Clone, PartialEq)]
pub struct NewRequirement {
    pub min_cpu_id: ComponentId,
    pub min_gpu_id: ComponentId,
    pub rec_cpu_id: ComponentId,
    pub rec_gpu_id: ComponentId,
    pub min_ram: f64,
    pub min_vram: f64,
    pub rec_ram: f64,
    pub rec_vram: f64,
}

/// Catalog row counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStats {
    pub games: u64,
    pub requirement_sets: u64,
    pub components: u64,
    pub hardware_profiles: u64,
}

/// Lookup tables addressed by name
#[derive(Debug, Clone, Copy)]
enum NamedTable {
    Manufacturers,
    Genres,
    Platforms,
    Tags,
}

impl NamedTable {
    fn name(&self) -> &'static str {
        match self {
            NamedTable::Manufacturers => "manufacturers",
            NamedTable::Genres => "genres",
            NamedTable::Platforms => "platforms",
            NamedTable::Tags => "tags",
        }
    }
}

/// SQLite-backed catalog store
///
/// Holds the curated catalog (components, games, requirement sets and their
/// lookup tables) and users' hardware profiles. Use `":memory:"` for tests.
pub struct SqliteCatalog {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalog {
    /// Open (or create) the catalog database
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;

        tracing::debug!("Catalog schema ready at {}", db_path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| GameFitError::Catalog("catalog connection lock poisoned".to_string()))
    }

    /// Get or create a manufacturer by name
    pub async fn add_manufacturer(&self, name: &str) -> Result<i64> {
        let conn = self.conn()?;
        ensure_named(&conn, NamedTable::Manufacturers, name)
    }

    /// Get or create a genre by name
    pub async fn add_genre(&self, name: &str) -> Result<i64> {
        let conn = self.conn()?;
        ensure_named(&conn, NamedTable::Genres, name)
    }

    /// Get or create a platform by name
    pub async fn add_platform(&self, name: &str) -> Result<i64> {
        let conn = self.conn()?;
        ensure_named(&conn, NamedTable::Platforms, name)
    }

    /// Get or create a tag by name
    pub async fn add_tag(&self, name: &str) -> Result<i64> {
        let conn = self.conn()?;
        ensure_named(&conn, NamedTable::Tags, name)
    }

    pub async fn add_component(&self, component: &NewComponent) -> Result<Component> {
        if component.name.trim().is_empty() {
            return Err(GameFitError::invalid_input("component name is required"));
        }
        if component.benchmark_score == 0 {
            return Err(GameFitError::invalid_input(format!(
                "benchmark score of {} must be positive",
                component.name
            )));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let manufacturer_id = ensure_named(&tx, NamedTable::Manufacturers, &component.manufacturer)?;

        tx.execute(
            "INSERT INTO components (name, kind, manufacturer_id, benchmark_score) VALUES (?1, ?2, ?3, ?4)",
            params![
                component.name.trim(),
                component.kind.as_str(),
                manufacturer_id,
                component.benchmark_score
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Component {
            id,
            name: component.name.trim().to_string(),
            kind: component.kind,
            manufacturer_id,
            manufacturer: component.manufacturer.trim().to_string(),
            benchmark_score: component.benchmark_score,
        })
    }

    pub async fn add_game(&self, game: &NewGame) -> Result<GameId> {
        if game.title.trim().is_empty() {
            return Err(GameFitError::invalid_input("game title is required"));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let genre_id = game
            .genre
            .as_deref()
            .map(|name| ensure_named(&tx, NamedTable::Genres, name))
            .transpose()?;
        let platform_id = game
            .platform
            .as_deref()
            .map(|name| ensure_named(&tx, NamedTable::Platforms, name))
            .transpose()?;

        tx.execute(
            "INSERT INTO games (title, release_year, genre_id, platform_id, image_type, image_data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                game.title.trim(),
                game.release_year,
                genre_id,
                platform_id,
                game.image.as_ref().map(|i| i.content_type.as_str()),
                game.image.as_ref().map(|i| i.data.as_slice()),
            ],
        )?;
        let game_id = tx.last_insert_rowid();

        for tag in &game.tags {
            let tag_id = ensure_named(&tx, NamedTable::Tags, tag)?;
            tx.execute(
                "INSERT OR IGNORE INTO game_tags (game_id, tag_id) VALUES (?1, ?2)",
                params![game_id, tag_id],
            )?;
        }

        tx.commit()?;
        Ok(game_id)
    }

    /// Attach a requirement set to a game. Components must exist with the matching kind.
    pub async fn add_requirement(&self, game_id: GameId, requirement: &NewRequirement) -> Result<RequirementSet> {
        for (label, value) in [("minRam", requirement.min_ram), ("minVram", requirement.min_vram)] {
            if !value.is_finite() || value < 0.0 {
                return Err(GameFitError::invalid_input(format!(
                    "{} must be a non-negative number, got {}",
                    label, value
                )));
            }
        }
        // Recommended amounts are ratio denominators
        for (label, value) in [("recRam", requirement.rec_ram), ("recVram", requirement.rec_vram)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GameFitError::invalid_input(format!(
                    "{} must be a positive number, got {}",
                    label, value
                )));
            }
        }

        let conn = self.conn()?;

        let game_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM games WHERE id = ?1)",
            params![game_id],
            |row| row.get(0),
        )?;
        if !game_exists {
            return Err(GameFitError::NotFound(format!("game {}", game_id)));
        }

        expect_kind(&conn, requirement.min_cpu_id, ComponentKind::Cpu)?;
        expect_kind(&conn, requirement.min_gpu_id, ComponentKind::Gpu)?;
        expect_kind(&conn, requirement.rec_cpu_id, ComponentKind::Cpu)?;
        expect_kind(&conn, requirement.rec_gpu_id, ComponentKind::Gpu)?;

        conn.execute(
            "INSERT INTO requirements
                (game_id, min_cpu_id, min_gpu_id, rec_cpu_id, rec_gpu_id, min_ram, min_vram, rec_ram, rec_vram)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                game_id,
                requirement.min_cpu_id,
                requirement.min_gpu_id,
                requirement.rec_cpu_id,
                requirement.rec_gpu_id,
                requirement.min_ram,
                requirement.min_vram,
                requirement.rec_ram,
                requirement.rec_vram,
            ],
        )?;

        Ok(RequirementSet {
            id: conn.last_insert_rowid(),
            game_id,
            min_cpu_id: requirement.min_cpu_id,
            min_gpu_id: requirement.min_gpu_id,
            rec_cpu_id: requirement.rec_cpu_id,
            rec_gpu_id: requirement.rec_gpu_id,
            min_ram: requirement.min_ram,
            min_vram: requirement.min_vram,
            rec_ram: requirement.rec_ram,
            rec_vram: requirement.rec_vram,
        })
    }

    /// Delete a game with its requirement sets and tag links. Returns whether it existed.
    pub async fn delete_game(&self, game_id: GameId) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM games WHERE id = ?1", params![game_id])?;
        Ok(deleted > 0)
    }

    /// List components ordered by name, optionally restricted to one kind
    pub async fn components(&self, kind: Option<ComponentKind>) -> Result<Vec<Component>> {
        let conn = self.conn()?;
        load_components(&conn, kind)
    }

    pub async fn component(&self, id: ComponentId) -> Result<Option<Component>> {
        let conn = self.conn()?;
        let component = conn
            .query_row(
                &format!("{} WHERE c.id = ?1", COMPONENT_SELECT),
                params![id],
                component_from_row,
            )
            .optional()?;
        Ok(component)
    }

    /// Find a component by its exact name and kind
    pub async fn find_component(&self, name: &str, kind: ComponentKind) -> Result<Option<Component>> {
        let conn = self.conn()?;
        let component = conn
            .query_row(
                &format!("{} WHERE c.name = ?1 AND c.kind = ?2", COMPONENT_SELECT),
                params![name.trim(), kind.as_str()],
                component_from_row,
            )
            .optional()?;
        Ok(component)
    }

    pub async fn manufacturers(&self) -> Result<Vec<Manufacturer>> {
        let conn = self.conn()?;
        load_named(&conn, NamedTable::Manufacturers, |id, name| Manufacturer { id, name })
    }

    pub async fn genres(&self) -> Result<Vec<Genre>> {
        let conn = self.conn()?;
        load_named(&conn, NamedTable::Genres, |id, name| Genre { id, name })
    }

    pub async fn platforms(&self) -> Result<Vec<Platform>> {
        let conn = self.conn()?;
        load_named(&conn, NamedTable::Platforms, |id, name| Platform { id, name })
    }

    pub async fn tags(&self) -> Result<Vec<Tag>> {
        let conn = self.conn()?;
        load_named(&conn, NamedTable::Tags, |id, name| Tag { id, name })
    }

    /// Find a game by exact title and release year (both must match, including an unknown year)
    pub async fn find_game(&self, title: &str, release_year: Option<i32>) -> Result<Option<GameId>> {
        let conn = self.conn()?;
        let id = conn
            .query_row(
                "SELECT id FROM games WHERE title = ?1 AND release_year IS ?2 ORDER BY id LIMIT 1",
                params![title.trim(), release_year],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Get one game with its relations and requirement sets
    pub async fn game(&self, game_id: GameId) -> Result<Option<Game>> {
        let conn = self.conn()?;
        Ok(load_games(&conn, Some(game_id))?.into_iter().next())
    }

    /// Case-insensitive, typo-tolerant title search
    pub async fn search_games(&self, query: &str, limit: usize) -> Result<Vec<TitleHit>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, title FROM games")?;
        let titles = stmt
            .query_map([], |row| Ok((row.get::<_, GameId>(0)?, row.get::<_, String>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(TitleMatcher::new().rank(query, titles, limit))
    }

    /// Create or replace a user's hardware profile
    pub async fn upsert_hardware_profile(&self, profile: &HardwareProfile) -> Result<HardwareProfile> {
        for (label, value) in [("ram", profile.ram), ("vram", profile.vram)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GameFitError::invalid_input(format!(
                    "{} must be a positive number, got {}",
                    label, value
                )));
            }
        }

        let conn = self.conn()?;
        expect_kind(&conn, profile.cpu_id, ComponentKind::Cpu)?;
        expect_kind(&conn, profile.gpu_id, ComponentKind::Gpu)?;

        let updated_at = Utc::now();
        conn.execute(
            "INSERT INTO hardware_profiles (user_id, cpu_id, gpu_id, ram, vram, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(user_id) DO UPDATE SET
                cpu_id = excluded.cpu_id,
                gpu_id = excluded.gpu_id,
                ram = excluded.ram,
                vram = excluded.vram,
                updated_at = excluded.updated_at",
            params![
                profile.user_id,
                profile.cpu_id,
                profile.gpu_id,
                profile.ram,
                profile.vram,
                updated_at.to_rfc3339(),
            ],
        )?;

        Ok(HardwareProfile {
            updated_at,
            ..profile.clone()
        })
    }

    /// Get catalog statistics
    pub async fn stats(&self) -> Result<CatalogStats> {
        let conn = self.conn()?;
        let count = |table: &str| -> Result<u64> {
            let n: u64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(n)
        };

        Ok(CatalogStats {
            games: count("games")?,
            requirement_sets: count("requirements")?,
            components: count("components")?,
            hardware_profiles: count("hardware_profiles")?,
        })
    }
}

#[async_trait]
impl CatalogReader for SqliteCatalog {
    async fn snapshot(&self) -> Result<CatalogSnapshot> {
        let conn = self.conn()?;

        let components = load_components(&conn, None)?;
        let games = load_games(&conn, None)?;

        tracing::debug!(
            "Loaded catalog snapshot: {} games, {} components",
            games.len(),
            components.len()
        );

        Ok(CatalogSnapshot::new(components, games))
    }

    async fn hardware_profile(&self, user_id: UserId) -> Result<Option<HardwareProfile>> {
        let conn = self.conn()?;

        let profile = conn
            .query_row(
                "SELECT user_id, cpu_id, gpu_id, ram, vram, updated_at FROM hardware_profiles WHERE user_id = ?1",
                params![user_id],
                |row| {
                    let updated_at: String = row.get(5)?;
                    Ok(HardwareProfile {
                        user_id: row.get(0)?,
                        cpu_id: row.get(1)?,
                        gpu_id: row.get(2)?,
                        ram: row.get(3)?,
                        vram: row.get(4)?,
                        updated_at: DateTime::parse_from_rfc3339(&updated_at)
                            .map(|dt| dt.with_timezone(&Utc))
                            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
                    })
                },
            )
            .optional()?;

        Ok(profile)
    }
}

const COMPONENT_SELECT: &str = "SELECT c.id, c.name, c.kind, c.manufacturer_id, m.name, c.benchmark_score
     FROM components c JOIN manufacturers m ON m.id = c.manufacturer_id";

fn component_from_row(row: &Row<'_>) -> rusqlite::Result<Component> {
    let kind: String = row.get(2)?;
    let kind = kind
        .parse::<ComponentKind>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(Component {
        id: row.get(0)?,
        name: row.get(1)?,
        kind,
        manufacturer_id: row.get(3)?,
        manufacturer: row.get(4)?,
        benchmark_score: row.get(5)?,
    })
}

fn load_components(conn: &Connection, kind: Option<ComponentKind>) -> Result<Vec<Component>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE (?1 IS NULL OR c.kind = ?1) ORDER BY c.name",
        COMPONENT_SELECT
    ))?;
    let components = stmt
        .query_map(params![kind.map(|k| k.as_str())], component_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(components)
}

fn ensure_named(conn: &Connection, table: NamedTable, name: &str) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GameFitError::invalid_input(format!(
            "{} name is required",
            table.name()
        )));
    }

    conn.execute(
        &format!("INSERT OR IGNORE INTO {} (name) VALUES (?1)", table.name()),
        params![name],
    )?;
    let id = conn.query_row(
        &format!("SELECT id FROM {} WHERE name = ?1", table.name()),
        params![name],
        |row| row.get(0),
    )?;
    Ok(id)
}

fn load_named<T>(conn: &Connection, table: NamedTable, build: impl Fn(i64, String) -> T) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(&format!("SELECT id, name FROM {} ORDER BY name", table.name()))?;
    let rows = stmt
        .query_map([], |row| Ok(build(row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn expect_kind(conn: &Connection, id: ComponentId, expected: ComponentKind) -> Result<()> {
    let kind: Option<String> = conn
        .query_row("SELECT kind FROM components WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?;

    match kind {
        None => Err(GameFitError::NotFound(format!("component {}", id))),
        Some(kind) if kind == expected.as_str() => Ok(()),
        Some(kind) => Err(GameFitError::invalid_input(format!(
            "component {} is a {}, expected {}",
            id, kind, expected
        ))),
    }
}

/// Load games (all, or one by id) with genre, platform, tags, image and requirement sets
fn load_games(conn: &Connection, only: Option<GameId>) -> Result<Vec<Game>> {
    let mut tags: HashMap<GameId, Vec<Tag>> = HashMap::new();
    {
        let mut stmt = conn.prepare(
            "SELECT gt.game_id, t.id, t.name FROM game_tags gt JOIN tags t ON t.id = gt.tag_id
             WHERE (?1 IS NULL OR gt.game_id = ?1) ORDER BY t.name",
        )?;
        let rows = stmt.query_map(params![only], |row| {
            Ok((row.get::<_, GameId>(0)?, Tag { id: row.get(1)?, name: row.get(2)? }))
        })?;
        for row in rows {
            let (game_id, tag) = row?;
            tags.entry(game_id).or_default().push(tag);
        }
    }

    let mut requirements: HashMap<GameId, Vec<RequirementSet>> = HashMap::new();
    {
        let mut stmt = conn.prepare(
            "SELECT id, game_id, min_cpu_id, min_gpu_id, rec_cpu_id, rec_gpu_id, min_ram, min_vram, rec_ram, rec_vram
             FROM requirements WHERE (?1 IS NULL OR game_id = ?1) ORDER BY id",
        )?;
        let rows = stmt.query_map(params![only], |row| {
            Ok(RequirementSet {
                id: row.get(0)?,
                game_id: row.get(1)?,
                min_cpu_id: row.get(2)?,
                min_gpu_id: row.get(3)?,
                rec_cpu_id: row.get(4)?,
                rec_gpu_id: row.get(5)?,
                min_ram: row.get(6)?,
                min_vram: row.get(7)?,
                rec_ram: row.get(8)?,
                rec_vram: row.get(9)?,
            })
        })?;
        for row in rows {
            let set = row?;
            requirements.entry(set.game_id).or_default().push(set);
        }
    }

    let mut stmt = conn.prepare(
        "SELECT g.id, g.title, g.release_year, ge.id, ge.name, p.id, p.name, g.image_type, g.image_data
         FROM games g
         LEFT JOIN genres ge ON ge.id = g.genre_id
         LEFT JOIN platforms p ON p.id = g.platform_id
         WHERE (?1 IS NULL OR g.id = ?1)
         ORDER BY g.id",
    )?;
    let rows = stmt.query_map(params![only], |row| {
        let genre = match (row.get::<_, Option<i64>>(3)?, row.get::<_, Option<String>>(4)?) {
            (Some(id), Some(name)) => Some(Genre { id, name }),
            _ => None,
        };
        let platform = match (row.get::<_, Option<i64>>(5)?, row.get::<_, Option<String>>(6)?) {
            (Some(id), Some(name)) => Some(Platform { id, name }),
            _ => None,
        };
        let image = match (row.get::<_, Option<String>>(7)?, row.get::<_, Option<Vec<u8>>>(8)?) {
            (Some(content_type), Some(data)) => Some(GameImage { content_type, data }),
            _ => None,
        };

        let mut game = Game::new(row.get(0)?, row.get::<_, String>(1)?);
        game.release_year = row.get(2)?;
        game.genre = genre;
        game.platform = platform;
        game.image = image;
        Ok(game)
    })?;

    let mut games = Vec::new();
    for row in rows {
        let mut game = row?;
        game.tags = tags.remove(&game.id).unwrap_or_default();
        game.requirements = requirements.remove(&game.id).unwrap_or_default();
        games.push(game);
    }

    Ok(games)
}
