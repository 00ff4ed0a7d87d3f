mod crawl;

use std::path::PathBuf;

use batcave_core::Environment;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "batcave")]
#[command(about = "Brand mention crawler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl every registered brand, sweep after sweep, until interrupted.
    Crawl {
        /// Run a single sweep and exit.
        #[arg(long)]
        once: bool,
    },
    /// List the brand registry.
    Brands,
    /// Upsert brands from a YAML file into the registry.
    Seed {
        /// Defaults to `BATCAVE_BRANDS_PATH`.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Show the newest stored mentions for one brand.
    Mentions {
        brand: String,
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// Apply pending database migrations.
    Migrate,
}

/// Colored log output everywhere except production, where logs go to a collector.
fn use_ansi(env: &Environment) -> bool {
    !matches!(env, Environment::Production)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = batcave_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(use_ansi(&config.env))
        .init();
    tracing::debug!(env = %config.env, ?config, "configuration loaded");

    let pool_config = batcave_db::PoolConfig::from_app_config(&config);
    let pool = batcave_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = batcave_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "database migrations applied");
    }

    match cli.command {
        Commands::Crawl { once } => crawl::run_crawl(pool, &config, once).await?,
        Commands::Brands => crawl::print_brands(&pool).await?,
        Commands::Seed { file } => {
            let path = file.unwrap_or_else(|| config.brands_path.clone());
            crawl::seed_from_file(&pool, &path).await?;
        }
        Commands::Mentions { brand, limit } => {
            crawl::print_recent_mentions(&pool, &brand, limit).await?;
        }
        Commands::Migrate => println!("migrations applied: {applied}"),
    }

    Ok(())
}
