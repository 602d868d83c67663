use anyhow::{Result, anyhow};

use rinkstats::config::{self, EngineConfig};
use rinkstats::pipeline;
use rinkstats::store::{PlayerStatSink, SqliteStore};

fn main() -> Result<()> {
    config::init_logging();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = EngineConfig::load(&args)?;
    let store = SqliteStore::open(&cfg.db_path)?;

    if let Some(team) = config::flag_value(&args, "--team") {
        let stats = pipeline::compute_team_player_stats(&store, &team, &cfg.season)?;
        let written = store.upsert_player_stats(&stats)?;
        println!("{team}: {written} player profiles updated");
        for s in &stats {
            println!(
                " - {:<24} {:>3}% ({}/{})  {:<19} {}",
                s.player_name,
                s.attendance.attendance_percentage,
                s.attendance.games_attended,
                s.attendance.total_team_games,
                s.insights.reliability.label(),
                s.insights.trend.label()
            );
        }
        return Ok(());
    }

    let Some(division) = config::flag_value(&args, "--division") else {
        return Err(anyhow!("pass --team <name> or --division <name>"));
    };
    let summary = pipeline::refresh_division_player_stats(&store, &store, &division, &cfg.season)?;
    println!("Division: {}", summary.division);
    println!("Teams: {}/{}", summary.teams_succeeded, summary.teams_total);
    println!("Player profiles updated: {}", summary.stats.len());
    if !summary.errors.is_empty() {
        println!("Errors: {}", summary.errors.len());
        for err in summary.errors.iter().take(8) {
            println!(" - {err}");
        }
    }
    Ok(())
}
