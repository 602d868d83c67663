use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Placeholder roster name for fill-in skaters. Never profiled.
pub const SUB_PLACEHOLDER: &str = "Sub";
/// Sentinel stored upstream when a player has no jersey number.
pub const JERSEY_UNKNOWN: &str = "N/A";
/// Sentinel stored upstream when a player has no specific position.
pub const POSITION_GENERIC: &str = "Player";

pub fn is_sub_placeholder(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(SUB_PLACEHOLDER)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub division: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub final_score: Option<FinalScore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScore {
    pub home: u32,
    pub away: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub game_id: String,
    #[serde(alias = "teamName")]
    pub team: String,
    #[serde(alias = "scorerName", default)]
    pub scorer: String,
    /// Ordered assisting players, first assist first. Accepts the legacy
    /// single `assist` field as well as `assistedBy`.
    #[serde(
        default,
        alias = "assistedBy",
        alias = "assist",
        deserialize_with = "one_or_many_names"
    )]
    pub assists: Vec<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub period: String,
    #[serde(default)]
    pub time_remaining: String,
    #[serde(default)]
    pub shot_type: Option<String>,
    #[serde(default)]
    pub goal_type: Option<String>,
}

impl Goal {
    /// At most two assist credits, blank names dropped.
    pub fn credited_assists(&self) -> impl Iterator<Item = &str> {
        self.assists
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .take(2)
    }

    pub fn has_scorer(&self) -> bool {
        !self.scorer.trim().is_empty()
    }

    pub fn document_key(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.game_id, self.period, self.time_remaining, self.team, self.scorer
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Penalty {
    pub game_id: String,
    #[serde(alias = "teamName")]
    pub team: String,
    #[serde(alias = "playerName")]
    pub player: String,
    #[serde(default, alias = "penaltyType")]
    pub infraction: String,
    /// Raw length in minutes as stored upstream; may be malformed.
    #[serde(default, alias = "minutes", deserialize_with = "string_or_number")]
    pub length: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub period: String,
    #[serde(default)]
    pub time_remaining: String,
}

impl Penalty {
    /// Penalty minutes, `0` when the stored length does not parse or is out
    /// of range.
    pub fn minutes(&self) -> u32 {
        parse_minutes(&self.length).unwrap_or(0)
    }

    pub fn has_player(&self) -> bool {
        !self.player.trim().is_empty()
    }

    pub fn document_key(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.game_id, self.period, self.time_remaining, self.team, self.player
        )
    }
}

/// Longest single penalty a scoresheet can carry (misconduct).
pub const MAX_PENALTY_MINUTES: u32 = 10;

/// Leading minutes of a stored length; `None` when blank, non-numeric or
/// outside `0..=MAX_PENALTY_MINUTES`.
pub fn parse_minutes(raw: &str) -> Option<u32> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    // Some submissions carry "2 min" or "5:00".
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits
        .parse::<u32>()
        .ok()
        .filter(|m| *m <= MAX_PENALTY_MINUTES)
}

/// One game's attendance snapshot, one section per participating team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub game_id: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub teams: Vec<TeamAttendance>,
}

impl AttendanceRecord {
    pub fn team(&self, team: &str) -> Option<&TeamAttendance> {
        self.teams.iter().find(|t| t.team_name == team)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAttendance {
    pub team_name: String,
    #[serde(default)]
    pub roster: Vec<String>,
    #[serde(default)]
    pub present: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub team_name: String,
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub players: Vec<RosterPlayer>,
}

impl RosterEntry {
    pub fn player(&self, name: &str) -> Option<&RosterPlayer> {
        self.players.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPlayer {
    pub name: String,
    #[serde(default, alias = "number", deserialize_with = "string_or_number")]
    pub jersey_number: String,
    #[serde(default)]
    pub position: String,
}

impl RosterPlayer {
    pub fn jersey(&self) -> Option<&str> {
        known_value(&self.jersey_number, JERSEY_UNKNOWN)
    }

    pub fn specific_position(&self) -> Option<&str> {
        known_value(&self.position, POSITION_GENERIC)
    }
}

fn known_value<'a>(raw: &'a str, sentinel: &str) -> Option<&'a str> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case(sentinel) {
        None
    } else {
        Some(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reliability {
    #[serde(rename = "Highly Reliable")]
    HighlyReliable,
    #[serde(rename = "Reliable")]
    Reliable,
    #[serde(rename = "Moderately Reliable")]
    ModeratelyReliable,
    #[serde(rename = "Inconsistent")]
    Inconsistent,
    #[serde(rename = "Unreliable")]
    Unreliable,
}

impl Reliability {
    pub fn label(self) -> &'static str {
        match self {
            Reliability::HighlyReliable => "Highly Reliable",
            Reliability::Reliable => "Reliable",
            Reliability::ModeratelyReliable => "Moderately Reliable",
            Reliability::Inconsistent => "Inconsistent",
            Reliability::Unreliable => "Unreliable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    #[serde(rename = "Hot Streak")]
    HotStreak,
    #[serde(rename = "Cold Streak")]
    ColdStreak,
    #[serde(rename = "Improving")]
    Improving,
    #[serde(rename = "Declining")]
    Declining,
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
}

impl Trend {
    pub fn label(self) -> &'static str {
        match self {
            Trend::HotStreak => "Hot Streak",
            Trend::ColdStreak => "Cold Streak",
            Trend::Improving => "Improving",
            Trend::Declining => "Declining",
            Trend::InsufficientData => "Insufficient Data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMark {
    pub game_id: String,
    pub attended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentForm {
    pub window: u32,
    pub attended: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub games_attended: u32,
    pub total_team_games: u32,
    pub attendance_percentage: u32,
    pub recent_form: RecentForm,
    #[serde(default)]
    pub history: Vec<AttendanceMark>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringTotals {
    pub goals: u32,
    pub assists: u32,
    pub points: u32,
    pub penalty_minutes: u32,
    pub games_with_point: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub reliability: Reliability,
    pub trend: Trend,
    pub announcements: Vec<String>,
    pub personality_tags: Vec<String>,
    pub storylines: Vec<String>,
    pub contextual_facts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStat {
    /// Stable upsert key, see [`crate::identity::player_key`].
    pub player_id: String,
    pub player_name: String,
    pub team_name: String,
    pub season: String,
    pub jersey_number: String,
    pub position: String,
    pub attendance: AttendanceSummary,
    pub scoring: ScoringTotals,
    pub insights: Insights,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandoutPlayer {
    pub name: String,
    pub team: String,
    pub highlight: String,
    pub stats: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub total_games: u32,
    pub total_goals: u32,
    pub total_penalties: u32,
    pub total_pim: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RinkReport {
    /// `"{division-slug}-{cycle}"`, identical across regenerations.
    pub id: String,
    pub division: String,
    pub cycle: String,
    pub generated_at: String,
    pub title: String,
    pub html_content: String,
    pub highlights: Vec<String>,
    pub standout_players: Vec<StandoutPlayer>,
    pub league_updates: Vec<String>,
    pub predictions: Vec<Prediction>,
    pub stats: ReportTotals,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

fn one_or_many_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => vec![s],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .filter(|s| !s.trim().is_empty())
            .collect(),
        _ => Vec::new(),
    })
}
