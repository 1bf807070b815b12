//! dexcache - browse a creature catalog from the terminal.
//!
//! Every command runs against the same local cache the library keeps on disk,
//! so details fetched once are served offline afterwards.

use std::io;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dexcache_core::models::{collect_variants, is_branching, EvolutionNode};
use dexcache_core::{Audience, CombinedDetail, Config, Dex, DisplayRow, PokemonSummary};

/// Rows printed by `list` unless told otherwise
const DEFAULT_LIST_LIMIT: usize = 40;

/// How long detail commands wait for evolution relatives to be cached
const PREFETCH_DRAIN_SECS: u64 = 5;

#[derive(Parser)]
#[command(name = "dexcache")]
#[command(author, version, about = "Cached catalog browser")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the full detail for one id and cache its evolution relatives
    Show {
        id: u32,
    },

    /// List summaries, optionally filtered by type or name
    List {
        /// Type id or name
        #[arg(long = "type", short = 't')]
        type_ref: Option<String>,

        /// Case-insensitive name search
        #[arg(long, short)]
        search: Option<String>,

        #[arg(long, short, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
    },

    /// List every type
    Types,

    /// Show today's pick
    Daily,

    /// Spin for a different daily pick
    Spin,

    /// Toggle a bookmark
    Bookmark {
        /// kid or parent
        audience: Audience,
        id: u32,
    },

    /// List bookmarks
    Bookmarks {
        /// kid or parent
        audience: Audience,
    },

    /// Show recent selections
    Recent {
        /// Forget one id
        #[arg(long, conflicts_with = "clear")]
        remove: Option<u32>,

        /// Forget all recent selections
        #[arg(long)]
        clear: bool,
    },

    /// Show cache status
    Status,

    /// Remove all cached and saved data
    Clear,

    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr, filtered by RUST_LOG (default `warn`). When
/// DEXCACHE_LOG_DIR is set they are also written to a daily log file there.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var("DEXCACHE_LOG_DIR") {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, "dexcache.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();
    let cli = Cli::parse();

    let config = Config::load()?;
    if let Commands::Config { save } = cli.command {
        return show_config(&config, save);
    }
    let dex = Dex::from_config(config)?;
    info!(base_url = %dex.config().base_url, "dexcache starting");

    match cli.command {
        Commands::Show { id } => show(&dex, id).await,
        Commands::List {
            type_ref,
            search,
            limit,
        } => list(&dex, type_ref.as_deref(), search.as_deref(), limit).await,
        Commands::Types => types(&dex).await,
        Commands::Daily => {
            let id = dex.get_or_create_daily_pick();
            println!("Today's pick (spins today: {})", dex.reroll_count());
            show(&dex, id).await
        }
        Commands::Spin => {
            let id = dex.reroll_daily_pick();
            println!("New pick (spins today: {})", dex.reroll_count());
            show(&dex, id).await
        }
        Commands::Bookmark { audience, id } => {
            if dex.toggle_bookmark(audience, id) {
                println!("Bookmarked #{} for {}", id, audience);
            } else {
                println!("Removed #{} from {} bookmarks", id, audience);
            }
            Ok(())
        }
        Commands::Bookmarks { audience } => {
            bookmarks(&dex, audience);
            Ok(())
        }
        Commands::Recent { remove, clear } => {
            if clear {
                dex.clear_recent();
            } else if let Some(id) = remove {
                dex.remove_recent(id);
            }
            recent(&dex);
            Ok(())
        }
        Commands::Status => {
            status(&dex);
            Ok(())
        }
        Commands::Clear => {
            dex.clear_all_data()?;
            println!("All cached data removed");
            Ok(())
        }
        Commands::Config { .. } => Ok(()),
    }
}

fn show_config(config: &Config, save: bool) -> Result<()> {
    let path = Config::config_path()?;
    println!("Config file: {}", path.display());
    println!("  base_url:             {}", config.base_url);
    println!("  language:             {}", config.language);
    println!("  list_limit:           {}", config.list_limit);
    println!("  max_pokemon_id:       {}", config.max_pokemon_id);
    println!("  request_timeout_secs: {}", config.request_timeout_secs);
    println!("  data_dir:             {}", config.data_dir()?.display());
    if save {
        config.save()?;
        println!("Saved");
    }
    Ok(())
}

async fn show(dex: &Dex, id: u32) -> Result<()> {
    let detail = match dex.fetch_detail(id).await {
        Ok(detail) => detail,
        Err(e) if e.is_not_found() => bail!("No entry with id {}", id),
        Err(e) => return Err(e.into()),
    };

    dex.add_recent(&PokemonSummary {
        id: detail.id(),
        name: detail.name().to_string(),
    });
    print_detail(&detail);

    // Prefetches run in the background; give them a chance to land on disk.
    if !dex
        .wait_for_background(Duration::from_secs(PREFETCH_DRAIN_SECS))
        .await
    {
        debug!("Exiting with prefetches still in flight");
    }
    Ok(())
}

fn print_detail(detail: &CombinedDetail) {
    let pokemon = &detail.pokemon;
    let species = &detail.species;
    let mut tags = Vec::new();
    if species.is_legendary {
        tags.push("legendary");
    }
    if species.is_mythical {
        tags.push("mythical");
    }

    println!("#{:04} {}", pokemon.id, title_case(&pokemon.name));
    println!("  {}", species.genus);
    if !tags.is_empty() {
        println!("  [{}]", tags.join(", "));
    }
    let types: Vec<&str> = pokemon.types.iter().map(|t| t.name.as_str()).collect();
    println!("  Types:   {}", types.join(" / "));
    println!(
        "  Height:  {:.1} m   Weight: {:.1} kg",
        pokemon.height as f32 / 10.0,
        pokemon.weight as f32 / 10.0
    );
    if let Some(habitat) = &species.habitat {
        println!("  Habitat: {}", habitat);
    }
    println!("  Sprite:  {}", pokemon.preferred_sprite());
    println!();
    println!("  {}", species.description);
    println!();

    println!("  Base stats");
    for stat in &pokemon.stats {
        println!("    {:<16} {:>3}", stat.name, stat.base);
    }
    let abilities: Vec<String> = pokemon
        .abilities
        .iter()
        .map(|a| {
            if a.is_hidden {
                format!("{} (hidden)", a.name)
            } else {
                a.name.clone()
            }
        })
        .collect();
    println!("  Abilities: {}", abilities.join(", "));

    println!();
    println!("  Evolution");
    print_tree(&detail.evolution_tree, detail.id(), 2);
    if is_branching(&detail.evolution_tree) {
        let variants: Vec<String> = collect_variants(&detail.evolution_tree)
            .iter()
            .map(|n| title_case(&n.name))
            .collect();
        println!("  Variants: {}", variants.join(", "));
    }
}

fn print_tree(node: &EvolutionNode, current: u32, depth: usize) {
    let marker = if node.id == current { "*" } else { "-" };
    println!("{}{} {} (#{})", "  ".repeat(depth), marker, title_case(&node.name), node.id);
    for child in &node.children {
        print_tree(child, current, depth + 1);
    }
}

async fn list(dex: &Dex, type_ref: Option<&str>, search: Option<&str>, limit: usize) -> Result<()> {
    let rows = match type_ref {
        Some(type_ref) => {
            dex.load_types().await?;
            dex.fetch_by_type_display(type_ref).await?
        }
        None => {
            let summaries = dex.load_summaries().await?;
            let matches: Vec<PokemonSummary> = match search {
                Some(query) => summaries.search(query, limit).into_iter().cloned().collect(),
                None => summaries.list().iter().take(limit).cloned().collect(),
            };
            dex.display_rows(&matches, None)
        }
    };

    let rows: Vec<&DisplayRow> = rows
        .iter()
        .filter(|r| match (type_ref, search) {
            (Some(_), Some(query)) => r.name.contains(&query.to_lowercase()),
            _ => true,
        })
        .take(limit)
        .collect();

    if rows.is_empty() {
        println!("Nothing found");
        return Ok(());
    }
    for row in rows {
        println!("#{:04} {:<24} {}", row.id, title_case(&row.name), row.primary_type);
    }
    Ok(())
}

async fn types(dex: &Dex) -> Result<()> {
    for t in dex.load_types().await? {
        println!("{:>3} {}", t.id, t.name);
    }
    Ok(())
}

fn bookmarks(dex: &Dex, audience: Audience) {
    let ids = dex.bookmarks(audience);
    if ids.is_empty() {
        println!("No {} bookmarks", audience);
        return;
    }

    let summaries = dex.summaries();
    for id in ids {
        let name = dex
            .cached_detail(id)
            .map(|d| d.name().to_string())
            .or_else(|| summaries.name_of(id).map(str::to_string))
            .unwrap_or_else(|| "?".to_string());
        println!("#{:04} {}", id, title_case(&name));
    }
}

fn recent(dex: &Dex) {
    let recent = dex.recent();
    if recent.is_empty() {
        println!("No recent selections");
        return;
    }
    for r in recent {
        let at = r.selected_at.with_timezone(&chrono::Local);
        println!("#{:04} {:<24} {}", r.id, title_case(&r.name), at.format("%Y-%m-%d %H:%M"));
    }
}

fn status(dex: &Dex) {
    println!("Catalog: {}", dex.config().base_url);
    match dex.config().data_dir() {
        Ok(dir) => println!("Data:    {}", dir.display()),
        Err(e) => println!("Data:    unavailable ({})", e),
    }
    println!();
    for (key, age) in dex.store_ages() {
        println!("  {:<18} {}", key.name(), age.as_deref().unwrap_or("-"));
    }

    let daily = dex.daily_state();
    println!();
    match (daily.daily_id, daily.daily_date) {
        (Some(id), Some(date)) => println!("Daily pick: #{} on {}", id, date),
        _ => println!("Daily pick: none yet"),
    }
    for audience in Audience::ALL {
        println!("{} bookmarks: {}", audience, dex.bookmarks(audience).len());
    }
    println!("Summaries cached: {}", dex.summaries().len());
}

fn title_case(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
