use clap::{Parser, Subcommand};
use std::sync::Arc;

use gamefit_engine::catalog::CatalogReader;
use gamefit_engine::search::DEFAULT_SEARCH_LIMIT;
use gamefit_engine::{
    CatalogSeed, ComponentKind, HardwareProfile, MatchEngine, MatchOptions, MatchRequest, SelectionPolicy,
    SqliteCatalog,
};

#[derive(Parser)]
#[command(name = "gamefit-cli")]
#[command(about = "GameFit matching engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database path
    #[arg(short, long, default_value = "gamefit.db")]
    db: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a JSON seed document into the catalog
    Seed {
        /// Seed file path
        file: String,
    },

    /// Rank games for the given hardware
    Match {
        /// CPU component id
        #[arg(long)]
        cpu: Option<i64>,

        /// GPU component id
        #[arg(long)]
        gpu: Option<i64>,

        /// System memory in GB
        #[arg(long)]
        ram: f64,

        /// Video memory in MB
        #[arg(long)]
        vram: f64,

        /// Minimum performance ratio
        #[arg(long)]
        min_ratio: Option<f64>,

        /// Restrict to one genre id
        #[arg(long)]
        genre: Option<i64>,

        /// Requirement-set selection policy (best, first)
        #[arg(long, default_value = "best")]
        policy: String,
    },

    /// Search games by title
    Search {
        /// Search query
        query: String,

        /// Maximum results
        #[arg(short, long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },

    /// List components
    Components {
        /// Only CPU or GPU
        #[arg(long)]
        kind: Option<String>,
    },

    /// Manage a user's hardware profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Show catalog statistics
    Stats,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Create or update a profile
    Set {
        user: i64,
        #[arg(long)]
        cpu: i64,
        #[arg(long)]
        gpu: i64,
        #[arg(long)]
        ram: f64,
        #[arg(long)]
        vram: f64,
    },

    /// Show a profile
    Show { user: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let catalog = Arc::new(SqliteCatalog::new(&cli.db).await?);

    match cli.command {
        Commands::Seed { file } => {
            println!("🌱 Seeding from: {}", file);

            let seed = CatalogSeed::from_file(&file)?;
            let report = catalog.apply_seed(&seed).await?;

            println!("✅ Components: {} added, {} reused", report.components_added, report.components_reused);
            println!("   Games: {}", report.games_added);
            println!(
                "   Requirement sets: {} added, {} skipped",
                report.requirements_added, report.requirements_skipped
            );
        }

        Commands::Match { cpu, gpu, ram, vram, min_ratio, genre, policy } => {
            let policy: SelectionPolicy = policy.parse()?;
            let engine = MatchEngine::with_options(catalog.clone(), MatchOptions { policy });

            let request = MatchRequest {
                cpu_id: cpu,
                gpu_id: gpu,
                ram: Some(ram),
                vram: Some(vram),
                min_performance_ratio: min_ratio,
                genre_id: genre,
            };

            let response = engine.find_matches(request).await?;

            if let Some(message) = &response.message {
                println!("🤷 {}", message);
            } else {
                println!("🎮 {} games ({:.2}ms):", response.games.len(), response.latency_ms);
                for (i, result) in response.games.iter().enumerate() {
                    println!(
                        "   {}. {} - score {:.2}, x{:.2} ({:?})",
                        i + 1,
                        result.game.display_name(),
                        result.score,
                        result.performance_ratio,
                        result.headroom
                    );
                }
            }

            println!("\n📊 {}", response.stats.summary());
        }

        Commands::Search { query, limit } => {
            println!("🔍 Searching for: {}", query);

            let hits = catalog.search_games(&query, limit).await?;
            if hits.is_empty() {
                println!("   No titles found");
            }
            for hit in hits {
                println!("   [{}] {} ({:.0}%)", hit.id, hit.title, hit.similarity * 100.0);
            }
        }

        Commands::Components { kind } => {
            let kind = kind.as_deref().map(str::parse::<ComponentKind>).transpose()?;

            for component in catalog.components(kind).await? {
                println!("   [{}] {} {}", component.id, component.kind, component.display_name());
            }
        }

        Commands::Profile { action } => match action {
            ProfileAction::Set { user, cpu, gpu, ram, vram } => {
                let profile = HardwareProfile::new(user, cpu, gpu, ram, vram);
                let stored = catalog.upsert_hardware_profile(&profile).await?;
                println!("✅ Saved profile for user {} at {}", stored.user_id, stored.updated_at.format("%Y-%m-%d %H:%M:%S"));
            }

            ProfileAction::Show { user } => match catalog.hardware_profile(user).await? {
                Some(profile) => {
                    println!("🖥️ User {}:", profile.user_id);
                    println!("   CPU: {}", profile.cpu_id);
                    println!("   GPU: {}", profile.gpu_id);
                    println!("   RAM: {} GB", profile.ram);
                    println!("   VRAM: {} MB", profile.vram);
                }
                None => println!("   No hardware profile for user {}", user),
            },
        },

        Commands::Stats => {
            let stats = catalog.stats().await?;

            println!("📊 Catalog Statistics:");
            println!("   Games: {}", stats.games);
            println!("   Requirement sets: {}", stats.requirement_sets);
            println!("   Components: {}", stats.components);
            println!("   Hardware profiles: {}", stats.hardware_profiles);
        }
    }

    Ok(())
}
