use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::identity::slug;
use crate::model::{AttendanceRecord, Game, Goal, Penalty, PlayerStat, RinkReport, RosterEntry};

/// Read side of the event store. Implementations return full collections for
/// the requested scope; attendance comes back in chronological order.
pub trait EventStore {
    fn games_for_division(&self, division: &str) -> Result<Vec<Game>>;
    fn goals_for_games(&self, game_ids: &[String]) -> Result<Vec<Goal>>;
    fn penalties_for_games(&self, game_ids: &[String]) -> Result<Vec<Penalty>>;
    fn goals_for_team(&self, team: &str) -> Result<Vec<Goal>>;
    fn penalties_for_team(&self, team: &str) -> Result<Vec<Penalty>>;
    fn attendance_for_team(&self, team: &str) -> Result<Vec<AttendanceRecord>>;
    fn roster(&self, team: &str) -> Result<Option<RosterEntry>>;
    fn rosters_for_division(&self, division: &str) -> Result<Vec<RosterEntry>>;
}

/// Upserts one report per id.
pub trait RinkReportPublisher {
    fn upsert_report(&self, report: &RinkReport) -> Result<()>;
}

/// Upserts player profiles keyed by `player_id`. Returns rows written.
pub trait PlayerStatSink {
    fn upsert_player_stats(&self, stats: &[PlayerStat]) -> Result<usize>;
}

/// A bundle of raw documents, as exported by the scorekeeping app.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBundle {
    #[serde(default)]
    pub games: Vec<Game>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub penalties: Vec<Penalty>,
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
    #[serde(default)]
    pub rosters: Vec<RosterEntry>,
}

/// Rows written per table by one import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub games: usize,
    pub goals: usize,
    pub penalties: usize,
    pub attendance: usize,
    pub rosters: usize,
}

pub fn roster_id(roster: &RosterEntry) -> String {
    format!("{}-{}", slug(&roster.team_name), slug(&roster.season))
}

/// Row ids for a bundle's events: the event's document key plus its
/// occurrence among events sharing that key, so two goals by one player with
/// no clock time, or a minor and a misconduct at the same moment, stay
/// separate rows. Re-importing the same bundle yields the same ids.
pub fn event_ids(keys: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    keys.into_iter()
        .map(|key| {
            let n = seen.entry(key.clone()).or_insert(0);
            let id = format!("{key}#{n}");
            *n += 1;
            id
        })
        .collect()
}

/// In-memory store; attendance is returned in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub games: Vec<Game>,
    pub goals: Vec<Goal>,
    pub penalties: Vec<Penalty>,
    pub attendance: Vec<AttendanceRecord>,
    pub rosters: Vec<RosterEntry>,
    reports: Mutex<BTreeMap<String, RinkReport>>,
    player_stats: Mutex<BTreeMap<String, PlayerStat>>,
}

impl MemoryStore {
    pub fn from_bundle(bundle: ImportBundle) -> Self {
        Self {
            games: bundle.games,
            goals: bundle.goals,
            penalties: bundle.penalties,
            attendance: bundle.attendance,
            rosters: bundle.rosters,
            ..Self::default()
        }
    }

    pub fn reports(&self) -> Vec<RinkReport> {
        self.reports
            .lock()
            .map(|g| g.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn player_stats(&self) -> Vec<PlayerStat> {
        self.player_stats
            .lock()
            .map(|g| g.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl EventStore for MemoryStore {
    fn games_for_division(&self, division: &str) -> Result<Vec<Game>> {
        Ok(self
            .games
            .iter()
            .filter(|g| g.division == division)
            .cloned()
            .collect())
    }

    fn goals_for_games(&self, game_ids: &[String]) -> Result<Vec<Goal>> {
        Ok(self
            .goals
            .iter()
            .filter(|g| game_ids.contains(&g.game_id))
            .cloned()
            .collect())
    }

    fn penalties_for_games(&self, game_ids: &[String]) -> Result<Vec<Penalty>> {
        Ok(self
            .penalties
            .iter()
            .filter(|p| game_ids.contains(&p.game_id))
            .cloned()
            .collect())
    }

    fn goals_for_team(&self, team: &str) -> Result<Vec<Goal>> {
        Ok(self.goals.iter().filter(|g| g.team == team).cloned().collect())
    }

    fn penalties_for_team(&self, team: &str) -> Result<Vec<Penalty>> {
        Ok(self
            .penalties
            .iter()
            .filter(|p| p.team == team)
            .cloned()
            .collect())
    }

    fn attendance_for_team(&self, team: &str) -> Result<Vec<AttendanceRecord>> {
        Ok(self
            .attendance
            .iter()
            .filter(|r| r.team(team).is_some())
            .cloned()
            .collect())
    }

    fn roster(&self, team: &str) -> Result<Option<RosterEntry>> {
        Ok(self.rosters.iter().find(|r| r.team_name == team).cloned())
    }

    fn rosters_for_division(&self, division: &str) -> Result<Vec<RosterEntry>> {
        Ok(self
            .rosters
            .iter()
            .filter(|r| r.division == division)
            .cloned()
            .collect())
    }
}

impl RinkReportPublisher for MemoryStore {
    fn upsert_report(&self, report: &RinkReport) -> Result<()> {
        let mut guard = self
            .reports
            .lock()
            .map_err(|_| anyhow!("report map lock poisoned"))?;
        guard.insert(report.id.clone(), report.clone());
        Ok(())
    }
}

impl PlayerStatSink for MemoryStore {
    fn upsert_player_stats(&self, stats: &[PlayerStat]) -> Result<usize> {
        let mut guard = self
            .player_stats
            .lock()
            .map_err(|_| anyhow!("player stat map lock poisoned"))?;
        for stat in stats {
            guard.insert(stat.player_id.clone(), stat.clone());
        }
        Ok(stats.len())
    }
}

/// Document tables in SQLite: one JSON body per row, upserted by id.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create db directory {}", parent.display()))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn import(&self, bundle: &ImportBundle) -> Result<ImportSummary> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin import transaction")?;
        let now = Utc::now().to_rfc3339();
        let mut summary = ImportSummary::default();

        for game in &bundle.games {
            summary.games += tx.execute(
                r#"
                INSERT INTO games (id, division, home_team, away_team, game_date, body, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(id) DO UPDATE SET
                    division = excluded.division,
                    home_team = excluded.home_team,
                    away_team = excluded.away_team,
                    game_date = excluded.game_date,
                    body = excluded.body,
                    updated_at = excluded.updated_at
                "#,
                params![
                    game.id,
                    game.division,
                    game.home_team,
                    game.away_team,
                    game.date.map(|d| d.to_string()),
                    to_body(game)?,
                    now,
                ],
            )
            .context("upsert game")?;
        }

        let goal_ids = event_ids(bundle.goals.iter().map(Goal::document_key));
        for (goal, id) in bundle.goals.iter().zip(&goal_ids) {
            summary.goals += upsert_event(
                &tx,
                "goals",
                id,
                &goal.game_id,
                &goal.team,
                &to_body(goal)?,
                &now,
            )
            .context("upsert goal")?;
        }
        let penalty_ids = event_ids(bundle.penalties.iter().map(Penalty::document_key));
        for (penalty, id) in bundle.penalties.iter().zip(&penalty_ids) {
            summary.penalties += upsert_event(
                &tx,
                "penalties",
                id,
                &penalty.game_id,
                &penalty.team,
                &to_body(penalty)?,
                &now,
            )
            .context("upsert penalty")?;
        }

        for record in &bundle.attendance {
            summary.attendance += tx.execute(
                r#"
                INSERT INTO attendance (game_id, record_date, body, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(game_id) DO UPDATE SET
                    record_date = excluded.record_date,
                    body = excluded.body,
                    updated_at = excluded.updated_at
                "#,
                params![
                    record.game_id,
                    record.date.map(|d| d.to_string()),
                    to_body(record)?,
                    now,
                ],
            )
            .context("upsert attendance")?;
            tx.execute(
                "DELETE FROM attendance_teams WHERE game_id = ?1",
                params![record.game_id],
            )
            .context("clear attendance teams")?;
            for section in &record.teams {
                tx.execute(
                    "INSERT OR IGNORE INTO attendance_teams (game_id, team_name) VALUES (?1, ?2)",
                    params![record.game_id, section.team_name],
                )
                .context("insert attendance team")?;
            }
        }

        for roster in &bundle.rosters {
            summary.rosters += tx.execute(
                r#"
                INSERT INTO rosters (id, team_name, division, season, body, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    team_name = excluded.team_name,
                    division = excluded.division,
                    season = excluded.season,
                    body = excluded.body,
                    updated_at = excluded.updated_at
                "#,
                params![
                    roster_id(roster),
                    roster.team_name,
                    roster.division,
                    roster.season,
                    to_body(roster)?,
                    now,
                ],
            )
            .context("upsert roster")?;
        }

        tx.commit().context("commit import transaction")?;
        Ok(summary)
    }

    pub fn load_report(&self, id: &str) -> Result<Option<RinkReport>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM rink_reports WHERE id = ?1",
                params![id],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("query rink report")?;
        body.map(|b| from_body(&b)).transpose()
    }

    pub fn count_rows(&self, table: &str) -> Result<usize> {
        let table = match table {
            "games" | "goals" | "penalties" | "attendance" | "rosters" | "player_stats"
            | "rink_reports" => table,
            other => return Err(anyhow!("unknown table {other}")),
        };
        let n = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get::<_, i64>(0)
            })
            .with_context(|| format!("count rows in {table}"))?;
        Ok(n as usize)
    }

    fn load_bodies<T: DeserializeOwned>(&self, sql: &str, param: &str) -> Result<Vec<T>> {
        let mut stmt = self.conn.prepare_cached(sql).context("prepare load query")?;
        let rows = stmt
            .query_map(params![param], |row| row.get::<_, String>(0))
            .context("query document bodies")?;
        let mut out = Vec::new();
        for row in rows {
            let body = row.context("decode body row")?;
            out.push(from_body(&body)?);
        }
        Ok(out)
    }

    fn load_for_games<T: DeserializeOwned>(
        &self,
        table: &str,
        game_ids: &[String],
    ) -> Result<Vec<T>> {
        let sql = format!("SELECT body FROM {table} WHERE game_id = ?1 ORDER BY id ASC");
        let mut out = Vec::new();
        for id in game_ids {
            out.extend(self.load_bodies::<T>(&sql, id)?);
        }
        Ok(out)
    }
}

impl EventStore for SqliteStore {
    fn games_for_division(&self, division: &str) -> Result<Vec<Game>> {
        self.load_bodies(
            "SELECT body FROM games WHERE division = ?1 ORDER BY game_date ASC, id ASC",
            division,
        )
        .with_context(|| format!("load games for division {division}"))
    }

    fn goals_for_games(&self, game_ids: &[String]) -> Result<Vec<Goal>> {
        self.load_for_games("goals", game_ids)
            .context("load goals for games")
    }

    fn penalties_for_games(&self, game_ids: &[String]) -> Result<Vec<Penalty>> {
        self.load_for_games("penalties", game_ids)
            .context("load penalties for games")
    }

    fn goals_for_team(&self, team: &str) -> Result<Vec<Goal>> {
        self.load_bodies("SELECT body FROM goals WHERE team = ?1 ORDER BY id ASC", team)
            .with_context(|| format!("load goals for team {team}"))
    }

    fn penalties_for_team(&self, team: &str) -> Result<Vec<Penalty>> {
        self.load_bodies(
            "SELECT body FROM penalties WHERE team = ?1 ORDER BY id ASC",
            team,
        )
        .with_context(|| format!("load penalties for team {team}"))
    }

    fn attendance_for_team(&self, team: &str) -> Result<Vec<AttendanceRecord>> {
        self.load_bodies(
            r#"
            SELECT a.body
            FROM attendance a
            JOIN attendance_teams t ON t.game_id = a.game_id
            LEFT JOIN games g ON g.id = a.game_id
            WHERE t.team_name = ?1
            ORDER BY COALESCE(g.game_date, a.record_date) ASC, a.game_id ASC
            "#,
            team,
        )
        .with_context(|| format!("load attendance for team {team}"))
    }

    fn roster(&self, team: &str) -> Result<Option<RosterEntry>> {
        let mut rosters: Vec<RosterEntry> = self
            .load_bodies(
                "SELECT body FROM rosters WHERE team_name = ?1 ORDER BY season DESC",
                team,
            )
            .with_context(|| format!("load roster for team {team}"))?;
        Ok(if rosters.is_empty() {
            None
        } else {
            Some(rosters.remove(0))
        })
    }

    fn rosters_for_division(&self, division: &str) -> Result<Vec<RosterEntry>> {
        self.load_bodies(
            "SELECT body FROM rosters WHERE division = ?1 ORDER BY team_name ASC, season DESC",
            division,
        )
        .with_context(|| format!("load rosters for division {division}"))
    }
}

impl RinkReportPublisher for SqliteStore {
    fn upsert_report(&self, report: &RinkReport) -> Result<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO rink_reports (id, division, cycle, generated_at, body, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    division = excluded.division,
                    cycle = excluded.cycle,
                    generated_at = excluded.generated_at,
                    body = excluded.body,
                    updated_at = excluded.updated_at
                "#,
                params![
                    report.id,
                    report.division,
                    report.cycle,
                    report.generated_at,
                    to_body(report)?,
                    Utc::now().to_rfc3339(),
                ],
            )
            .context("upsert rink report")?;
        Ok(())
    }
}

impl PlayerStatSink for SqliteStore {
    fn upsert_player_stats(&self, stats: &[PlayerStat]) -> Result<usize> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin player stats transaction")?;
        let now = Utc::now().to_rfc3339();
        for stat in stats {
            tx.execute(
                r#"
                INSERT INTO player_stats (id, team_name, player_name, season, body, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    team_name = excluded.team_name,
                    player_name = excluded.player_name,
                    season = excluded.season,
                    body = excluded.body,
                    updated_at = excluded.updated_at
                "#,
                params![
                    stat.player_id,
                    stat.team_name,
                    stat.player_name,
                    stat.season,
                    to_body(stat)?,
                    now,
                ],
            )
            .context("upsert player stat")?;
        }
        tx.commit().context("commit player stats transaction")?;
        Ok(stats.len())
    }
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS games (
            id TEXT PRIMARY KEY,
            division TEXT NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            game_date TEXT NULL,
            body TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_games_division ON games(division);

        CREATE TABLE IF NOT EXISTS goals (
            id TEXT PRIMARY KEY,
            game_id TEXT NOT NULL,
            team TEXT NOT NULL,
            body TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_goals_game ON goals(game_id);
        CREATE INDEX IF NOT EXISTS idx_goals_team ON goals(team);

        CREATE TABLE IF NOT EXISTS penalties (
            id TEXT PRIMARY KEY,
            game_id TEXT NOT NULL,
            team TEXT NOT NULL,
            body TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_penalties_game ON penalties(game_id);
        CREATE INDEX IF NOT EXISTS idx_penalties_team ON penalties(team);

        CREATE TABLE IF NOT EXISTS attendance (
            game_id TEXT PRIMARY KEY,
            record_date TEXT NULL,
            body TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS attendance_teams (
            game_id TEXT NOT NULL,
            team_name TEXT NOT NULL,
            PRIMARY KEY (game_id, team_name)
        );
        CREATE INDEX IF NOT EXISTS idx_attendance_teams_team ON attendance_teams(team_name);

        CREATE TABLE IF NOT EXISTS rosters (
            id TEXT PRIMARY KEY,
            team_name TEXT NOT NULL,
            division TEXT NOT NULL,
            season TEXT NOT NULL,
            body TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_rosters_division ON rosters(division);

        CREATE TABLE IF NOT EXISTS player_stats (
            id TEXT PRIMARY KEY,
            team_name TEXT NOT NULL,
            player_name TEXT NOT NULL,
            season TEXT NOT NULL,
            body TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS rink_reports (
            id TEXT PRIMARY KEY,
            division TEXT NOT NULL,
            cycle TEXT NOT NULL,
            generated_at TEXT NOT NULL,
            body TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

fn upsert_event(
    tx: &rusqlite::Transaction<'_>,
    table: &str,
    id: &str,
    game_id: &str,
    team: &str,
    body: &str,
    now: &str,
) -> Result<usize> {
    let sql = format!(
        r#"
        INSERT INTO {table} (id, game_id, team, body, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(id) DO UPDATE SET
            game_id = excluded.game_id,
            team = excluded.team,
            body = excluded.body,
            updated_at = excluded.updated_at
        "#
    );
    let changed = tx.execute(&sql, params![id, game_id, team, body, now])?;
    Ok(changed)
}

fn to_body<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("serialize document body")
}

fn from_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).context("decode document body")
}

#[cfg(test)]
mod tests {
    use super::event_ids;

    #[test]
    fn event_ids_number_repeated_keys() {
        let keys = ["g1:1::Sharks:Ann", "g1:1::Sharks:Ann", "g1:2:05:00:Jets:Dee"];
        let ids = event_ids(keys.iter().map(|k| k.to_string()));
        assert_eq!(
            ids,
            vec!["g1:1::Sharks:Ann#0", "g1:1::Sharks:Ann#1", "g1:2:05:00:Jets:Dee#0"]
        );
    }
}
