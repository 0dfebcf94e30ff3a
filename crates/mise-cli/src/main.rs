mod analyze_cmd;
mod config;
mod dataset;
mod finalize_cmd;
mod prep_cmd;
mod run_cmd;
mod tally_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use config::MiseConfig;

#[derive(Parser)]
#[command(name = "mise", about = "Recipe-graph analyzer and meal-plan finalizer")]
struct Cli {
    /// Finalizer tick interval in seconds (overrides MISE_TICK_INTERVAL_SECS)
    #[arg(long, global = true)]
    tick: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Build and print the step DAG for a recipe JSON file
    Analyze {
        /// Path to the recipe JSON file
        file: PathBuf,
    },
    /// Infer prep tasks for a recipe and a meal event
    PrepTasks {
        /// Path to the recipe JSON file
        file: PathBuf,
        /// Event start instant (RFC 3339)
        #[arg(long)]
        starts_at: String,
        /// Meal-plan option the tasks belong to (random if omitted)
        #[arg(long)]
        option_id: Option<String>,
        /// Pin "now" instead of using the system clock (RFC 3339)
        #[arg(long)]
        now: Option<String>,
    },
    /// Print what the tally would select for one plan, without committing
    Tally {
        /// Path to a snapshot JSON file
        snapshot: PathBuf,
        /// Meal plan to tally
        #[arg(long)]
        plan: String,
    },
    /// Run one finalizer pass over a snapshot
    Finalize {
        /// Path to a snapshot JSON file
        snapshot: PathBuf,
        /// Pin "now" instead of using the system clock (RFC 3339)
        #[arg(long)]
        at: Option<String>,
    },
    /// Run the finalizer loop over a snapshot until interrupted
    Run {
        /// Path to a snapshot JSON file
        snapshot: PathBuf,
    },
}

/// Execute the `mise init` command: write a default config file.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile::default();
    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  finalizer.tick_interval_secs = {}", cfg.finalizer.tick_interval_secs);
    println!(
        "  prep.frozen_ingredient_threshold_celsius = {}",
        cfg.prep.frozen_ingredient_threshold_celsius
    );

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            cmd_init(force)?;
        }
        Commands::Analyze { file } => {
            analyze_cmd::run_analyze(&file)?;
        }
        Commands::PrepTasks {
            file,
            starts_at,
            option_id,
            now,
        } => {
            let resolved = MiseConfig::resolve(cli.tick)?;
            prep_cmd::run_prep_tasks(
                &file,
                &starts_at,
                option_id.as_deref(),
                now.as_deref(),
                &resolved.prep,
            )?;
        }
        Commands::Tally { snapshot, plan } => {
            tally_cmd::run_tally(&snapshot, &plan).await?;
        }
        Commands::Finalize { snapshot, at } => {
            let resolved = MiseConfig::resolve(cli.tick)?;
            finalize_cmd::run_finalize(&snapshot, at.as_deref(), &resolved).await?;
        }
        Commands::Run { snapshot } => {
            let resolved = MiseConfig::resolve(cli.tick)?;
            run_cmd::run_loop(&snapshot, &resolved).await?;
        }
    }

    Ok(())
}
