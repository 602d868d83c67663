use rinkstats::attendance::aggregate_team_attendance;
use rinkstats::model::{AttendanceRecord, RosterEntry, RosterPlayer, TeamAttendance};

fn section(team: &str, roster: &[&str], present: &[&str]) -> TeamAttendance {
    TeamAttendance {
        team_name: team.to_string(),
        roster: roster.iter().map(|s| s.to_string()).collect(),
        present: present.iter().map(|s| s.to_string()).collect(),
    }
}

fn record(game_id: &str, teams: Vec<TeamAttendance>) -> AttendanceRecord {
    AttendanceRecord {
        game_id: game_id.to_string(),
        date: None,
        teams,
    }
}

#[test]
fn single_record_counts_present_and_absent_players() {
    let records = vec![record(
        "g1",
        vec![
            section("Sharks", &["Ann", "Bea", "Cat"], &["Ann", "Bea"]),
            section("Jets", &["Dee"], &["Dee"]),
        ],
    )];

    let summary = aggregate_team_attendance(&records, "Sharks", None);
    assert_eq!(summary.total_team_games, 1);
    assert_eq!(summary.players.len(), 3);

    for name in ["Ann", "Bea"] {
        let p = &summary.players[name];
        assert_eq!(p.games_attended, 1);
        assert_eq!(p.total_team_games, 1);
        assert_eq!(p.percentage(), 100);
    }
    let cat = &summary.players["Cat"];
    assert_eq!(cat.games_attended, 0);
    assert_eq!(cat.percentage(), 0);
    assert!(!summary.players.contains_key("Dee"));
}

#[test]
fn history_follows_supplied_record_order() {
    let records = vec![
        record("g1", vec![section("Sharks", &["Ann"], &["Ann"])]),
        record("g2", vec![section("Jets", &["Dee"], &["Dee"])]),
        record("g3", vec![section("Sharks", &["Ann"], &[])]),
        record("g4", vec![section("Sharks", &["Ann"], &["Ann"])]),
    ];
    let summary = aggregate_team_attendance(&records, "Sharks", None);
    let ann = &summary.players["Ann"];
    assert_eq!(ann.total_team_games, 3);
    assert_eq!(ann.games_attended, 2);
    let order: Vec<(&str, bool)> = ann
        .history
        .iter()
        .map(|m| (m.game_id.as_str(), m.attended))
        .collect();
    assert_eq!(order, vec![("g1", true), ("g3", false), ("g4", true)]);
}

#[test]
fn roster_only_player_without_games_is_zero_percent() {
    let roster = RosterEntry {
        team_name: "Sharks".to_string(),
        division: "A".to_string(),
        season: "2026".to_string(),
        players: vec![RosterPlayer {
            name: "Eve".to_string(),
            jersey_number: "9".to_string(),
            position: "Forward".to_string(),
        }],
    };
    let summary = aggregate_team_attendance(&[], "Sharks", Some(&roster));
    let eve = &summary.players["Eve"];
    assert_eq!(eve.total_team_games, 0);
    assert_eq!(eve.games_attended, 0);
    assert_eq!(eve.percentage(), 0);
    assert!(eve.history.is_empty());
}

#[test]
fn names_match_exactly() {
    let records = vec![
        record("g1", vec![section("Sharks", &["Ann Lee"], &["Ann Lee"])]),
        record("g2", vec![section("Sharks", &["Ann Lee"], &["ann lee"])]),
    ];
    let summary = aggregate_team_attendance(&records, "Sharks", None);
    assert_eq!(summary.players["Ann Lee"].games_attended, 1);
    assert_eq!(summary.players["ann lee"].games_attended, 1);
    assert_eq!(summary.players["ann lee"].percentage(), 50);
}

#[test]
fn present_player_missing_from_roster_is_still_counted() {
    let records = vec![record("g1", vec![section("Sharks", &["Ann"], &["Ann", "Sub"])])];
    let summary = aggregate_team_attendance(&records, "Sharks", None);
    assert_eq!(summary.players["Sub"].games_attended, 1);
}
