use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use rinkstats::config::{self, EngineConfig};
use rinkstats::store::{ImportBundle, SqliteStore};

fn main() -> Result<()> {
    config::init_logging();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = EngineConfig::load(&args)?;
    let file = config::flag_value(&args, "--file")
        .map(PathBuf::from)
        .context("missing --file <bundle.json>")?;

    let raw = fs::read_to_string(&file)
        .with_context(|| format!("read bundle {}", file.display()))?;
    let bundle: ImportBundle = serde_json::from_str(&raw)
        .with_context(|| format!("parse bundle {}", file.display()))?;

    let store = SqliteStore::open(&cfg.db_path)?;
    let summary = store.import(&bundle)?;

    println!("Import complete");
    println!("DB: {}", cfg.db_path.display());
    println!("Games upserted: {}", summary.games);
    println!("Goals upserted: {}", summary.goals);
    println!("Penalties upserted: {}", summary.penalties);
    println!("Attendance snapshots upserted: {}", summary.attendance);
    println!("Rosters upserted: {}", summary.rosters);
    Ok(())
}
