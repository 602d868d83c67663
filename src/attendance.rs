use std::collections::BTreeMap;

use crate::model::{AttendanceMark, AttendanceRecord, RosterEntry, TeamAttendance};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerAttendance {
    pub player_name: String,
    pub games_attended: u32,
    pub total_team_games: u32,
    /// One mark per record that has a section for the team, in supplied order.
    pub history: Vec<AttendanceMark>,
}

impl PlayerAttendance {
    pub fn percentage(&self) -> u32 {
        percentage(self.games_attended, self.total_team_games)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamAttendanceSummary {
    pub team_name: String,
    pub total_team_games: u32,
    pub players: BTreeMap<String, PlayerAttendance>,
}

/// `round(part / whole * 100)`, or `0` for an empty denominator.
pub fn percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

/// Fold every attendance record into per-player counts for `team`.
///
/// Players are the union of the roster entry (when supplied), each record's
/// roster section and each record's present list for the team. Names are
/// matched exactly.
pub fn aggregate_team_attendance(
    records: &[AttendanceRecord],
    team: &str,
    roster: Option<&RosterEntry>,
) -> TeamAttendanceSummary {
    let sections: Vec<(&str, &TeamAttendance)> = records
        .iter()
        .filter_map(|r| r.team(team).map(|t| (r.game_id.as_str(), t)))
        .collect();
    let total_team_games = sections.len() as u32;

    let mut names: Vec<&str> = Vec::new();
    if let Some(roster) = roster {
        names.extend(roster.players.iter().map(|p| p.name.as_str()));
    }
    for (_, section) in &sections {
        names.extend(section.roster.iter().map(String::as_str));
        names.extend(section.present.iter().map(String::as_str));
    }

    let players = names
        .into_iter()
        .filter(|n| !n.is_empty())
        .map(|name| {
            let history: Vec<AttendanceMark> = sections
                .iter()
                .map(|(game_id, section)| AttendanceMark {
                    game_id: (*game_id).to_string(),
                    attended: section.present.iter().any(|p| p == name),
                })
                .collect();
            let games_attended = history.iter().filter(|m| m.attended).count() as u32;
            (
                name.to_string(),
                PlayerAttendance {
                    player_name: name.to_string(),
                    games_attended,
                    total_team_games,
                    history,
                },
            )
        })
        .collect();

    TeamAttendanceSummary {
        team_name: team.to_string(),
        total_team_games,
        players,
    }
}
