//! Engine entry points: fetch from an [`EventStore`], aggregate, generate,
//! and hand the result to a publisher or sink. Store errors propagate; there
//! is no retry here.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use chrono::Utc;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::game_stats::{GameStats, aggregate_games};
use crate::model::{AttendanceRecord, Game, Goal, Penalty, PlayerStat, RinkReport, RosterEntry};
use crate::player_stats::{TeamInputs, calculate_team_player_stats};
use crate::report::{ReportCycle, generate_report};
use crate::store::{EventStore, PlayerStatSink, RinkReportPublisher};

/// Games, goals and penalties of one division within one cycle.
#[derive(Debug, Clone, Default)]
pub struct DivisionBatch {
    pub games: Vec<Game>,
    pub goals: Vec<Goal>,
    pub penalties: Vec<Penalty>,
}

impl DivisionBatch {
    pub fn stats(&self) -> GameStats {
        aggregate_games(&self.games, &self.goals, &self.penalties)
    }
}

pub fn fetch_division_batch(
    store: &impl EventStore,
    division: &str,
    cycle: &ReportCycle,
) -> Result<DivisionBatch> {
    let games: Vec<Game> = store
        .games_for_division(division)
        .with_context(|| format!("fetch games for {division}"))?
        .into_iter()
        .filter(|g| cycle.contains(g.date))
        .collect();
    let ids: Vec<String> = games.iter().map(|g| g.id.clone()).collect();
    let goals = store
        .goals_for_games(&ids)
        .with_context(|| format!("fetch goals for {division}"))?;
    let penalties = store
        .penalties_for_games(&ids)
        .with_context(|| format!("fetch penalties for {division}"))?;
    Ok(DivisionBatch {
        games,
        goals,
        penalties,
    })
}

pub fn build_division_report(
    store: &impl EventStore,
    division: &str,
    cycle: &ReportCycle,
    generated_at: &str,
) -> Result<RinkReport> {
    let batch = fetch_division_batch(store, division, cycle)?;
    let stats = batch.stats();
    info!(
        division,
        cycle = %cycle.label,
        games = stats.total_games,
        goals = stats.total_goals,
        penalties = stats.total_penalties,
        "aggregated division batch"
    );
    Ok(generate_report(division, cycle, &stats, generated_at))
}

/// Generate and upsert. A failed upsert leaves nothing behind; run again.
pub fn publish_division_report(
    store: &impl EventStore,
    publisher: &impl RinkReportPublisher,
    division: &str,
    cycle: &ReportCycle,
) -> Result<RinkReport> {
    let report = build_division_report(store, division, cycle, &Utc::now().to_rfc3339())?;
    publisher
        .upsert_report(&report)
        .with_context(|| format!("publish rink report {}", report.id))?;
    info!(id = %report.id, highlights = report.highlights.len(), "published rink report");
    Ok(report)
}

/// Owned inputs for one team, fetched ahead of the parallel pass.
#[derive(Debug, Clone)]
pub struct TeamData {
    pub team_name: String,
    pub season: String,
    pub roster: Option<RosterEntry>,
    pub attendance: Vec<AttendanceRecord>,
    pub goals: Vec<Goal>,
    pub penalties: Vec<Penalty>,
}

impl TeamData {
    pub fn inputs(&self) -> TeamInputs<'_> {
        TeamInputs {
            team_name: &self.team_name,
            season: &self.season,
            roster: self.roster.as_ref(),
            attendance: &self.attendance,
            goals: &self.goals,
            penalties: &self.penalties,
        }
    }
}

pub fn fetch_team_data(
    store: &impl EventStore,
    team: &str,
    default_season: &str,
) -> Result<TeamData> {
    let roster = store
        .roster(team)
        .with_context(|| format!("fetch roster for {team}"))?;
    let attendance = store
        .attendance_for_team(team)
        .with_context(|| format!("fetch attendance for {team}"))?;
    let goals = store
        .goals_for_team(team)
        .with_context(|| format!("fetch goals for {team}"))?;
    let penalties = store
        .penalties_for_team(team)
        .with_context(|| format!("fetch penalties for {team}"))?;
    let season = roster
        .as_ref()
        .map(|r| r.season.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(default_season)
        .to_string();
    Ok(TeamData {
        team_name: team.to_string(),
        season,
        roster,
        attendance,
        goals,
        penalties,
    })
}

pub fn compute_team_player_stats(
    store: &impl EventStore,
    team: &str,
    default_season: &str,
) -> Result<Vec<PlayerStat>> {
    let data = fetch_team_data(store, team, default_season)?;
    Ok(calculate_team_player_stats(&data.inputs()))
}

#[derive(Debug, Clone, Default)]
pub struct DivisionStatsSummary {
    pub division: String,
    pub teams_total: usize,
    pub teams_succeeded: usize,
    pub stats: Vec<PlayerStat>,
    pub errors: Vec<String>,
}

/// Rostered teams plus any team seen in the division's games, sorted.
pub fn division_teams(store: &impl EventStore, division: &str) -> Result<Vec<String>> {
    let mut teams: BTreeSet<String> = store
        .rosters_for_division(division)
        .with_context(|| format!("fetch rosters for {division}"))?
        .into_iter()
        .map(|r| r.team_name)
        .collect();
    for game in store
        .games_for_division(division)
        .with_context(|| format!("fetch games for {division}"))?
    {
        teams.insert(game.home_team);
        teams.insert(game.away_team);
    }
    Ok(teams.into_iter().collect())
}

/// Profiles for every team of a division. A team whose reads fail is
/// recorded in `errors` and skipped; listing the teams must succeed.
pub fn compute_division_player_stats(
    store: &impl EventStore,
    division: &str,
    default_season: &str,
) -> Result<DivisionStatsSummary> {
    let teams = division_teams(store, division)?;
    let mut errors = Vec::new();
    let mut fetched = Vec::new();
    for team in &teams {
        match fetch_team_data(store, team, default_season) {
            Ok(data) => fetched.push(data),
            Err(err) => {
                warn!(team = %team, error = %format!("{err:#}"), "skipping team");
                errors.push(format!("{team}: {err:#}"));
            }
        }
    }

    let stats: Vec<PlayerStat> = fetched
        .par_iter()
        .flat_map_iter(|data| calculate_team_player_stats(&data.inputs()))
        .collect();

    Ok(DivisionStatsSummary {
        division: division.to_string(),
        teams_total: teams.len(),
        teams_succeeded: fetched.len(),
        stats,
        errors,
    })
}

pub fn refresh_division_player_stats(
    store: &impl EventStore,
    sink: &impl PlayerStatSink,
    division: &str,
    default_season: &str,
) -> Result<DivisionStatsSummary> {
    let summary = compute_division_player_stats(store, division, default_season)?;
    let written = sink
        .upsert_player_stats(&summary.stats)
        .with_context(|| format!("store player stats for {division}"))?;
    info!(
        division,
        teams = summary.teams_succeeded,
        players = written,
        errors = summary.errors.len(),
        "refreshed player stats"
    );
    Ok(summary)
}
