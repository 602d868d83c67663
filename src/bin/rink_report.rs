use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};

use rinkstats::config::{self, EngineConfig};
use rinkstats::pipeline;
use rinkstats::report::ReportCycle;
use rinkstats::store::SqliteStore;

fn main() -> Result<()> {
    config::init_logging();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = EngineConfig::load(&args)?;
    let division =
        config::flag_value(&args, "--division").context("missing --division <name>")?;
    let cycle = parse_cycle(&args)?;

    let store = SqliteStore::open(&cfg.db_path)?;
    let report = pipeline::publish_division_report(&store, &store, &division, &cycle)?;

    println!("{}", report.title);
    println!("Report id: {}", report.id);
    println!(
        "Games: {}  Goals: {}  Penalties: {}  PIM: {}",
        report.stats.total_games,
        report.stats.total_goals,
        report.stats.total_penalties,
        report.stats.total_pim
    );
    println!("Highlights:");
    for line in &report.highlights {
        println!(" - {line}");
    }
    if !report.standout_players.is_empty() {
        println!("Standout players:");
        for p in &report.standout_players {
            println!(" - {} ({}): {} [{}]", p.name, p.team, p.highlight, p.stats);
        }
    }
    Ok(())
}

/// `--all [label]` for an unbounded cycle, otherwise the ISO week of
/// `--week YYYY-MM-DD` (default today).
fn parse_cycle(args: &[String]) -> Result<ReportCycle> {
    if config::has_flag(args, "--all") || config::flag_value(args, "--all").is_some() {
        let label = config::flag_value(args, "--all").unwrap_or_else(|| "season".to_string());
        return Ok(ReportCycle::unbounded(&label));
    }
    let date = match config::flag_value(args, "--week") {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .with_context(|| format!("invalid --week date {raw}"))?,
        None => Utc::now().date_naive(),
    };
    Ok(ReportCycle::iso_week(date))
}
