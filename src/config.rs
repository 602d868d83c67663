use std::path::PathBuf;

use anyhow::{Context, Result};

const APP_DIR: &str = "rinkstats";
const DB_FILE: &str = "rinkstats.sqlite";
const DEFAULT_SEASON: &str = "current";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub db_path: PathBuf,
    /// Stamped on player profiles whose roster has no season label.
    pub season: String,
}

impl EngineConfig {
    /// Read `.env.local`, `.env` and the process environment. A `--db` flag
    /// in `args` wins over `RINKSTATS_DB`.
    pub fn load(args: &[String]) -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let db_path = flag_value(args, "--db")
            .map(PathBuf::from)
            .or_else(|| opt_env("RINKSTATS_DB").map(PathBuf::from))
            .or_else(default_db_path)
            .context("unable to resolve sqlite path; pass --db or set RINKSTATS_DB")?;
        let season = opt_env("RINKSTATS_SEASON").unwrap_or_else(|| DEFAULT_SEASON.to_string());

        Ok(Self { db_path, season })
    }
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Some(base) = opt_env("XDG_CACHE_HOME") {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = opt_env("HOME")?;
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(DB_FILE))
}

fn opt_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Value of `--name value` or `--name=value`; blank values are ignored.
pub fn flag_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() && !next.starts_with("--") {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// Install the fmt subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();
}
