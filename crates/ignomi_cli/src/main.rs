//! `ignomi` command-line entry point.
//!
//! # Responsibility
//! - Expose the storage-side launcher commands to scripts and keybinds.
//! - Load settings and logging the same way a graphical host would.
//!
//! Panel toggles need a live host and are not offered here.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ignomi_core::config::default_settings_path;
use ignomi_core::{
    init_logging, load_settings, open_db, ClearScope, HeadlessSurface, HostBindings,
    JsonFileBookmarkRepository, Launcher, PanelSurface, Settings, SqliteUsageRepository,
    StaticMonitorResolver, SystemClock, UsageRecord,
};
use log::info;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Parser, Debug)]
#[command(name = "ignomi", author, version, about, long_about = None)]
struct Cli {
    /// Settings file; defaults to `$XDG_CONFIG_HOME/ignomi/settings.toml`.
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record one launch of an item.
    RecordLaunch {
        #[arg(value_name = "ID")]
        item_id: String,
    },
    /// Print the frecency ranking.
    Top {
        /// Maximum number of rows; defaults to `frecency.max_items`.
        #[arg(short, long)]
        limit: Option<usize>,
        /// Launch threshold; defaults to `frecency.min_launches`.
        #[arg(short, long)]
        min_launches: Option<u64>,
    },
    /// Print one usage record, or every record when no id is given.
    Stats {
        #[arg(value_name = "ID")]
        item_id: Option<String>,
    },
    /// Print the sum of all launch counts.
    Total,
    /// Delete usage records.
    ClearStats(ClearArgs),
    /// Inspect or edit bookmarks.
    #[command(subcommand)]
    Bookmarks(BookmarkCommand),
}

#[derive(Args, Debug)]
struct ClearArgs {
    #[arg(
        value_name = "ID",
        conflicts_with = "all",
        required_unless_present = "all"
    )]
    item_id: Option<String>,
    /// Delete every record.
    #[arg(long)]
    all: bool,
}

#[derive(Subcommand, Debug)]
enum BookmarkCommand {
    List,
    Add {
        #[arg(value_name = "ID")]
        item_id: String,
    },
    Remove {
        #[arg(value_name = "ID")]
        item_id: String,
    },
    /// Move a bookmark to a zero-based position.
    Reorder {
        #[arg(value_name = "ID")]
        item_id: String,
        index: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_settings_path);
    let settings = load_settings(&config_path)
        .with_context(|| format!("loading settings from {}", config_path.display()))?;

    if let Err(err) = init_logging(&settings.log_level(), &settings.log_dir()) {
        eprintln!("ignomi: logging disabled: {err}");
    }

    run(cli.command, &settings)
}

fn run(command: Command, settings: &Settings) -> Result<()> {
    let db_path = settings.storage.usage_db_path();
    let conn = open_db(&db_path)
        .with_context(|| format!("opening usage database {}", db_path.display()))?;

    let mut launcher = Launcher::new(
        SqliteUsageRepository::new(&conn),
        JsonFileBookmarkRepository::new(settings.storage.bookmarks_path()),
        settings,
        HostBindings {
            clock: Rc::new(SystemClock),
            monitors: Box::new(StaticMonitorResolver::default()),
            surface_factory: |_: &str| Box::new(HeadlessSurface) as Box<dyn PanelSurface>,
        },
    )?;
    info!("event=cli_command module=cli status=start command={:?}", command);

    match command {
        Command::RecordLaunch { item_id } => {
            let record = launcher.record_launch(&item_id)?;
            println!("{}\t{}", record.item_id, record.launch_count);
        }
        Command::Top {
            limit,
            min_launches,
        } => {
            let limit = limit.unwrap_or(settings.frecency.max_items);
            let min_launches = min_launches.unwrap_or(settings.frecency.min_launches);
            for (rank, entry) in launcher.top_apps(limit, min_launches).iter().enumerate() {
                println!(
                    "{}\t{}\t{}\t{}",
                    rank + 1,
                    entry.item_id,
                    entry.score,
                    entry.launch_count
                );
            }
        }
        Command::Stats { item_id: Some(item_id) } => {
            let record = launcher
                .usage()
                .get_record(&item_id)
                .with_context(|| format!("no usage recorded for {item_id}"))?;
            println!("{}", stats_row(&record));
        }
        Command::Stats { item_id: None } => {
            for record in launcher.usage().get_all_records() {
                println!("{}", stats_row(&record));
            }
        }
        Command::Total => println!("{}", launcher.usage().total_launches()),
        Command::ClearStats(args) => {
            // clap rejects `ID` together with `--all`.
            let scope = match args.item_id {
                Some(item_id) => ClearScope::Item(item_id),
                None => ClearScope::All,
            };
            let deleted = launcher.clear_stats(&scope)?;
            println!("cleared {deleted}");
        }
        Command::Bookmarks(BookmarkCommand::List) => {
            for item_id in launcher.list_bookmarks() {
                println!("{item_id}");
            }
        }
        Command::Bookmarks(BookmarkCommand::Add { item_id }) => {
            report_change(launcher.add_bookmark(&item_id)?, "added", &item_id);
        }
        Command::Bookmarks(BookmarkCommand::Remove { item_id }) => {
            report_change(launcher.remove_bookmark(&item_id)?, "removed", &item_id);
        }
        Command::Bookmarks(BookmarkCommand::Reorder { item_id, index }) => {
            report_change(launcher.reorder_bookmark(&item_id, index)?, "moved", &item_id);
        }
    }
    Ok(())
}

/// `item_id`, `launch_count`, `last_launch_time`, `created_at`, tab separated.
fn stats_row(record: &UsageRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        record.item_id, record.launch_count, record.last_launch_time, record.created_at
    )
}

fn report_change(changed: bool, verb: &str, item_id: &str) {
    if changed {
        println!("{verb} {item_id}");
    } else {
        println!("unchanged {item_id}");
    }
}
