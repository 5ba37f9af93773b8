use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use shotlist::sort::parse_sort_spec;
use shotlist::stats::ParentKey;
use shotlist::{load_config, EntityKind, EntityList, JsonSnapshot, Scope, ScopeRegistry};
use tracing_subscriber::EnvFilter;

type AppResult<T> = Result<T, String>;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Episode,
    Sequence,
    Shot,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Episode => EntityKind::Episode,
            KindArg::Sequence => EntityKind::Sequence,
            KindArg::Shot => EntityKind::Shot,
        }
    }
}

/// Filter, sort and page production entities from a JSON snapshot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Snapshot document with lookup tables, entities and tasks
    snapshot: PathBuf,

    /// Production id
    #[arg(short, long)]
    production: String,

    /// Episode id, for episodic productions
    #[arg(short, long)]
    episode: Option<String>,

    #[arg(short, long, value_enum, default_value = "shot")]
    kind: KindArg,

    /// Search query, e.g. `sq01 status:wip @ann`
    #[arg(short, long, default_value = "")]
    query: String,

    /// Sort keys in priority order, e.g. `frames:desc` or `task:Animation`
    #[arg(short, long)]
    sort: Vec<String>,

    /// Pages to reveal
    #[arg(long, default_value_t = 1)]
    pages: usize,

    /// Print the per-sequence status breakdown
    #[arg(long)]
    breakdown: bool,

    /// Print entities waiting for approval instead of the window
    #[arg(long)]
    pending: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SHOTLIST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> AppResult<()> {
    let config = load_config();
    let snapshot = JsonSnapshot::from_path(&cli.snapshot).map_err(|e| e.to_string())?;
    let lookups = snapshot.lookups();
    let scope = match cli.episode {
        Some(episode) => Scope::episode(cli.production, episode),
        None => Scope::production(cli.production),
    };

    let registry = ScopeRegistry::new(cli.kind.into(), config, lookups.clone());
    registry
        .load(&scope, &snapshot)
        .map_err(|e| e.to_string())?;

    let list = registry.list(&scope);
    let mut list = list.lock();

    let mut sorting = Vec::with_capacity(cli.sort.len());
    for text in &cli.sort {
        let spec = parse_sort_spec(text, &lookups).ok_or_else(|| format!("invalid sort key: {text}"))?;
        sorting.push(spec);
    }
    list.apply_search(&cli.query);
    list.apply_sort(sorting);
    for _ in 1..cli.pages {
        list.grow_window();
    }

    if cli.pending {
        return print_pending(&list, cli.json);
    }
    if cli.json {
        print_json(&list, cli.breakdown)
    } else {
        print_text(&list, cli.breakdown);
        Ok(())
    }
}

fn print_pending(list: &EntityList, json: bool) -> AppResult<()> {
    let pending = list.pending();
    if json {
        let text = serde_json::to_string_pretty(&pending).map_err(|e| e.to_string())?;
        println!("{text}");
    } else {
        for entity in pending {
            println!("{}", entity.full_name());
        }
    }
    Ok(())
}

fn print_json(list: &EntityList, breakdown: bool) -> AppResult<()> {
    let mut doc = serde_json::json!({
        "query": list.query(),
        "total": list.result_len(),
        "displayed": list.displayed(),
        "validation_columns": list.validation_columns(),
        "stats": list.stats(),
        "result_stats": list.result_stats(),
        "column_flags": list.column_flags(),
    });
    if breakdown {
        doc["breakdown"] = serde_json::to_value(list.breakdown(ParentKey::Sequence))
            .map_err(|e| e.to_string())?;
    }
    let text = serde_json::to_string_pretty(&doc).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

fn print_text(list: &EntityList, breakdown: bool) {
    let lookups = list.lookups();
    let columns = list.validation_columns();
    let header: Vec<&str> = columns
        .iter()
        .map(|id| {
            lookups
                .task_types
                .get(id)
                .map_or(id.as_str(), |t| t.name.as_str())
        })
        .collect();
    println!("{:<32} {:>7} {:>7}  {}", "name", "frames", "time", header.join("  "));

    for group in list.displayed_by_parent() {
        if let Some(parent) = group.parent_name {
            println!("# {parent}");
        }
        for entity in group.entities {
            let statuses: Vec<&str> = columns
                .iter()
                .map(|column| list.validation_status(entity, column).unwrap_or("-"))
                .collect();
            let marker = if entity.canceled { " (canceled)" } else { "" };
            println!(
                "{:<32} {:>7} {:>7}  {}{}",
                entity.name,
                entity.nb_frames,
                entity.time_spent,
                statuses.join("  "),
                marker
            );
        }
    }

    let stats = list.stats();
    println!(
        "-- {} of {} shown, {} frames, {} time spent",
        stats.count,
        list.result_len(),
        stats.total_frames,
        stats.total_time_spent
    );

    if breakdown {
        for (parent_id, parent) in list.breakdown(ParentKey::Sequence).parents {
            for (task_type_id, counts) in parent.by_task_type {
                let name = lookups
                    .task_types
                    .get(&task_type_id)
                    .map_or(task_type_id.as_str(), |t| t.name.as_str());
                println!("{parent_id} {name}: {} tasks, {} frames", counts.all.count, counts.all.frames);
            }
        }
    }
}
