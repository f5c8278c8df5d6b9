use anyhow::{bail, Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;

use ayumi_core::config::AyumiConfig;
use ayumi_core::model::{Episode, EpisodeFilter, EpisodeInput, SupportLevel};
use ayumi_core::storage::{create_backend, Storage};
use ayumi_core::store::EpisodeStore;

#[derive(Parser)]
#[command(name = "ayumi", about = "Ayumi: a local childcare episode journal", version)]
enum Cli {
    /// Record a new episode
    Add {
        /// What happened
        content: String,
        /// Where it happened
        #[arg(short, long)]
        location: String,
        /// Episode category (free text, e.g. motor, language, eating)
        #[arg(short, long)]
        category: String,
        /// Support level (independent, verbal, physical, full — or the canonical label)
        #[arg(short, long)]
        support: String,
        /// Local datetime, e.g. 2024-01-01T10:00 (defaults to now)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List episodes with optional filters
    List {
        /// Filter by category ("all" for no restriction)
        #[arg(short, long)]
        category: Option<String>,
        /// Filter by support level ("all" for no restriction)
        #[arg(short, long)]
        support: Option<String>,
        /// Maximum number of results (omit for the full timeline)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the most recent episodes (the home view)
    Recent {
        /// How many episodes to show (default from config, fallback 5)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Delete an episode
    Delete {
        /// Episode ID (full UUID or unique 8-char prefix)
        id: String,
    },
    /// Delete every episode
    Clear {
        /// Required: clearing cannot be undone
        #[arg(long)]
        confirm: bool,
    },
    /// Export the journal to a JSON file
    Export {
        /// Output file path (default: childcare-records-YYYY-MM-DD.json)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Import a journal snapshot, replacing the current collection
    Import {
        /// Input file path
        path: String,
    },
    /// Show journal statistics
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = AyumiConfig::load(Some(&std::env::current_dir()?))
        .unwrap_or_default();

    let mut store = make_store(&config)?;

    match cli {
        Cli::Add {
            content,
            location,
            category,
            support,
            date,
        } => cmd_add(&mut store, content, location, category, support, date),
        Cli::List {
            category,
            support,
            limit,
            json,
        } => cmd_list(&store, category, support, limit, json),
        Cli::Recent { limit } => {
            cmd_recent(&store, limit.unwrap_or(config.journal.recent_limit))
        }
        Cli::Delete { id } => cmd_delete(&mut store, &id),
        Cli::Clear { confirm } => cmd_clear(&mut store, confirm),
        Cli::Export { output } => cmd_export(&store, output),
        Cli::Import { path } => cmd_import(&mut store, &path),
        Cli::Stats => cmd_stats(&store),
    }
}

fn make_store(config: &AyumiConfig) -> Result<EpisodeStore<Storage>> {
    let backend = create_backend(config).context("failed to open journal storage")?;
    Ok(EpisodeStore::open(backend))
}

fn cmd_add(
    store: &mut EpisodeStore<Storage>,
    content: String,
    location: String,
    category: String,
    support: String,
    date: Option<String>,
) -> Result<()> {
    let support: SupportLevel = support
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{e}"))?;
    let date =
        date.unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%dT%H:%M").to_string());

    let input = EpisodeInput {
        date,
        location,
        category,
        support: support.as_str().to_string(),
        content,
    };

    match store.add(input) {
        Ok(episode) => {
            println!(
                "Recorded episode {} ({} / {})",
                short_id(&episode.id).cyan(),
                episode.category.magenta(),
                episode.support,
            );
            Ok(())
        }
        Err(err) => Err(anyhow::Error::new(err).context(
            "episode recorded in memory only — the change may not survive a restart",
        )),
    }
}

fn cmd_list(
    store: &EpisodeStore<Storage>,
    category: Option<String>,
    support: Option<String>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let filter = EpisodeFilter { category, support };
    let mut episodes = store.query(&filter);
    if let Some(limit) = limit {
        episodes.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&episodes)?);
        return Ok(());
    }

    print_table(&episodes);
    Ok(())
}

fn cmd_recent(store: &EpisodeStore<Storage>, limit: usize) -> Result<()> {
    print_table(&store.recent(limit));
    Ok(())
}

fn print_table(episodes: &[Episode]) {
    if episodes.is_empty() {
        println!("No episodes match.");
        return;
    }

    println!(
        "  {}  {}  {}  {}  {}",
        format!("{:<8}", "ID").dimmed(),
        format!("{:<16}", "Date").dimmed(),
        format!("{:<10}", "Category").dimmed(),
        format!("{:<10}", "Support").dimmed(),
        "Content".dimmed(),
    );
    println!("{}", "─".repeat(78).dimmed());

    for episode in episodes {
        println!(
            "  {}  {:<16}  {:<10}  {:<10}  {}",
            short_id(&episode.id).cyan(),
            format_date(episode),
            episode.category.magenta(),
            episode.support,
            episode.content,
        );
    }

    println!("{}", "─".repeat(78).dimmed());
    println!(
        "  {} episode{}",
        episodes.len(),
        if episodes.len() == 1 { "" } else { "s" }
    );
}

fn cmd_delete(store: &mut EpisodeStore<Storage>, id: &str) -> Result<()> {
    let id = resolve_id(store, id)?;
    store
        .delete(&id)
        .context("episode removed in memory only — the change may not survive a restart")?;
    println!("Deleted episode {}", short_id(&id).cyan());
    Ok(())
}

fn cmd_clear(store: &mut EpisodeStore<Storage>, confirm: bool) -> Result<()> {
    if !confirm {
        bail!("clearing deletes every episode and cannot be undone; re-run with --confirm");
    }
    let removed = store.len();
    store
        .clear_all()
        .context("journal cleared in memory only — the change may not survive a restart")?;
    println!("Deleted all {removed} episodes.");
    Ok(())
}

fn cmd_export(store: &EpisodeStore<Storage>, output: Option<String>) -> Result<()> {
    let output = output.unwrap_or_else(|| {
        format!(
            "childcare-records-{}.json",
            chrono::Local::now().format("%Y-%m-%d")
        )
    });

    let snapshot = store.export_snapshot()?;
    std::fs::write(&output, &snapshot)
        .with_context(|| format!("failed to write {output}"))?;
    println!("Exported {} episodes to {output}", store.len());
    Ok(())
}

fn cmd_import(store: &mut EpisodeStore<Storage>, path: &str) -> Result<()> {
    let serialized =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;

    let accepted = store
        .import(&serialized)
        .context("journal replaced in memory only — the change may not survive a restart")?;
    if !accepted {
        bail!("import rejected: {path} is not a JSON array of episodes");
    }

    println!("Imported {} episodes from {path}", store.len());
    Ok(())
}

fn cmd_stats(store: &EpisodeStore<Storage>) -> Result<()> {
    let stats = store.stats();
    println!("  Total episodes:  {}", stats.total.to_string().cyan());
    println!("  This week:       {}", stats.this_week.to_string().cyan());
    Ok(())
}

/// Resolve a full id or a unique short prefix against the collection.
fn resolve_id(store: &EpisodeStore<Storage>, id: &str) -> Result<String> {
    let all = store.query(&EpisodeFilter::default());
    let matches: Vec<&Episode> = all.iter().filter(|ep| ep.id.starts_with(id)).collect();
    match matches.len() {
        0 => bail!("no episode matches id '{id}'"),
        1 => Ok(matches[0].id.clone()),
        n => bail!("id '{id}' is ambiguous ({n} matches); use more characters"),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// `2024/1/1 10:00`. Falls back to the raw string when the date doesn't
/// parse.
fn format_date(episode: &Episode) -> String {
    match episode.parsed_date() {
        Some(dt) => dt.format("%Y/%-m/%-d %H:%M").to_string(),
        None => episode.date.clone(),
    }
}
