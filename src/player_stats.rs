use std::collections::HashSet;

use crate::attendance::{PlayerAttendance, aggregate_team_attendance, percentage};
use crate::identity::player_key;
use crate::model::{
    AttendanceMark, AttendanceRecord, AttendanceSummary, Goal, Insights, JERSEY_UNKNOWN,
    POSITION_GENERIC, Penalty, PlayerStat, RecentForm, Reliability, RosterEntry, RosterPlayer,
    ScoringTotals, Trend, is_sub_placeholder,
};
use crate::rules::{Rule, all_matches, first_match};

pub const RECENT_FORM_WINDOW: usize = 5;
pub const TREND_WINDOW: usize = 3;

/// Everything the calculator needs for one team, already fetched.
#[derive(Debug, Clone, Copy)]
pub struct TeamInputs<'a> {
    pub team_name: &'a str,
    pub season: &'a str,
    pub roster: Option<&'a RosterEntry>,
    pub attendance: &'a [AttendanceRecord],
    pub goals: &'a [Goal],
    pub penalties: &'a [Penalty],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceRates {
    pub overall: u32,
    pub recent: u32,
}

pub const RELIABILITY_RULES: &[Rule<AttendanceRates, Reliability>] = &[
    Rule {
        name: "highly-reliable",
        when: |r| r.overall >= 90 && r.recent >= 80,
        then: Reliability::HighlyReliable,
    },
    Rule {
        name: "reliable",
        when: |r| r.overall >= 70 && r.recent >= 60,
        then: Reliability::Reliable,
    },
    Rule {
        name: "moderately-reliable",
        when: |r| r.overall >= 50,
        then: Reliability::ModeratelyReliable,
    },
    Rule {
        name: "inconsistent",
        when: |r| r.overall >= 30,
        then: Reliability::Inconsistent,
    },
    Rule {
        name: "unreliable",
        when: |_| true,
        then: Reliability::Unreliable,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendWindow {
    /// Total history length, not the window length.
    pub history_len: usize,
    pub attended: usize,
}

pub const TREND_RULES: &[Rule<TrendWindow, Trend>] = &[
    Rule {
        name: "insufficient",
        when: |w| w.history_len < TREND_WINDOW,
        then: Trend::InsufficientData,
    },
    Rule {
        name: "hot",
        when: |w| w.attended == TREND_WINDOW,
        then: Trend::HotStreak,
    },
    Rule {
        name: "cold",
        when: |w| w.attended == 0,
        then: Trend::ColdStreak,
    },
    Rule {
        name: "improving",
        when: |w| w.attended >= 2,
        then: Trend::Improving,
    },
    Rule {
        name: "declining",
        when: |_| true,
        then: Trend::Declining,
    },
];

pub const PERSONALITY_RULES: &[Rule<u32, &[&str]>] = &[
    Rule {
        name: "dedicated",
        when: |pct| *pct >= 90,
        then: &["reliable", "dedicated", "team-player"],
    },
    Rule {
        name: "consistent",
        when: |pct| *pct >= 70,
        then: &["consistent", "committed"],
    },
    Rule {
        name: "sporadic",
        when: |pct| *pct >= 50,
        then: &["sporadic", "unpredictable"],
    },
    Rule {
        name: "occasional",
        when: |_| true,
        then: &["infrequent", "occasional"],
    },
];

pub const EXPERIENCE_RULES: &[Rule<u32, &str>] = &[
    Rule {
        name: "newcomer",
        when: |games| *games == 1,
        then: "newcomer",
    },
    Rule {
        name: "veteran",
        when: |games| *games >= 10,
        then: "veteran",
    },
];

/// Inputs shared by the text generators.
#[derive(Debug, Clone, Copy)]
pub struct ProfileContext<'a> {
    pub player_name: &'a str,
    pub team_name: &'a str,
    pub games_attended: u32,
    pub total_team_games: u32,
    pub percentage: u32,
    pub jersey: Option<&'a str>,
    pub position: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceCounts {
    pub percentage: u32,
    pub games_attended: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announcement {
    HighPraise,
    SolidConsistency,
    GamesPlayed,
}

pub const ANNOUNCEMENT_RULES: &[Rule<AttendanceCounts, Announcement>] = &[
    Rule {
        name: "high-praise",
        when: |c| c.percentage >= 90,
        then: Announcement::HighPraise,
    },
    Rule {
        name: "solid-consistency",
        when: |c| c.percentage >= 70,
        then: Announcement::SolidConsistency,
    },
    Rule {
        name: "games-played",
        when: |c| c.percentage < 50 && c.games_attended > 0,
        then: Announcement::GamesPlayed,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    FirstGame,
    FiveGames,
    TenGames,
}

pub const MILESTONE_RULES: &[Rule<u32, Milestone>] = &[
    Rule {
        name: "first-game",
        when: |games| *games == 1,
        then: Milestone::FirstGame,
    },
    Rule {
        name: "five-games",
        when: |games| *games == 5,
        then: Milestone::FiveGames,
    },
    Rule {
        name: "ten-games",
        when: |games| *games == 10,
        then: Milestone::TenGames,
    },
];

pub fn reliability_rating(rates: AttendanceRates) -> Reliability {
    first_match(RELIABILITY_RULES, &rates)
        .copied()
        .unwrap_or(Reliability::Unreliable)
}

pub fn recent_form(history: &[AttendanceMark]) -> RecentForm {
    let window = &history[history.len().saturating_sub(RECENT_FORM_WINDOW)..];
    let attended = window.iter().filter(|m| m.attended).count() as u32;
    let size = window.len() as u32;
    RecentForm {
        window: size,
        attended,
        percentage: percentage(attended, size),
    }
}

pub fn attendance_trend(history: &[AttendanceMark]) -> Trend {
    let window = &history[history.len().saturating_sub(TREND_WINDOW)..];
    let input = TrendWindow {
        history_len: history.len(),
        attended: window.iter().filter(|m| m.attended).count(),
    };
    first_match(TREND_RULES, &input)
        .copied()
        .unwrap_or(Trend::InsufficientData)
}

pub fn announcements(ctx: &ProfileContext<'_>) -> Vec<String> {
    let name = ctx.player_name;
    let team = ctx.team_name;
    let counts = AttendanceCounts {
        percentage: ctx.percentage,
        games_attended: ctx.games_attended,
    };
    let headline = first_match(ANNOUNCEMENT_RULES, &counts).map(|kind| match kind {
        Announcement::HighPraise => format!(
            "{name} has been a rock for {team}, showing up for {}% of games!",
            ctx.percentage
        ),
        Announcement::SolidConsistency => format!(
            "{name} brings solid consistency to {team} with {}% attendance.",
            ctx.percentage
        ),
        Announcement::GamesPlayed => format!(
            "{name} has played {} of {} games this season.",
            ctx.games_attended, ctx.total_team_games
        ),
    });
    let milestones = all_matches(MILESTONE_RULES, &counts.games_attended).map(|m| match m {
        Milestone::FirstGame => format!("{name} suited up for their first game with {team}!"),
        Milestone::FiveGames => format!("{name} just hit the 5-game milestone!"),
        Milestone::TenGames => format!("{name} reached the 10-game milestone with {team}!"),
    });
    headline.into_iter().chain(milestones).collect()
}

pub fn personality_tags(percentage: u32, games_attended: u32) -> Vec<String> {
    let mut tags: Vec<String> = first_match(PERSONALITY_RULES, &percentage)
        .map(|tags| tags.iter().map(|t| t.to_string()).collect())
        .unwrap_or_default();
    tags.extend(all_matches(EXPERIENCE_RULES, &games_attended).map(|t| t.to_string()));
    tags
}

pub fn storylines(ctx: &ProfileContext<'_>) -> Vec<String> {
    let name = ctx.player_name;
    let team = ctx.team_name;
    let mut out = Vec::new();
    if ctx.percentage == 100 {
        out.push(format!(
            "{name} hasn't missed a game, a perfect attendance run for {team}."
        ));
    }
    if ctx.percentage < 30 {
        out.push(format!(
            "{name} is chasing a comeback and more ice time with {team}."
        ));
    }
    if let Some(position) = ctx.position {
        out.push(format!("{name} anchors the {team} lineup at {position}."));
    }
    if ctx.games_attended == 5 {
        out.push(format!("{name} has five games in the books with {team}."));
    }
    out
}

pub fn contextual_facts(ctx: &ProfileContext<'_>) -> Vec<String> {
    let mut out = vec![
        format!("Attendance rate: {}%", ctx.percentage),
        format!(
            "Games played: {} of {}",
            ctx.games_attended, ctx.total_team_games
        ),
    ];
    if let Some(jersey) = ctx.jersey {
        out.push(format!("Wears #{jersey}"));
    }
    if let Some(position) = ctx.position {
        out.push(format!("Plays {position}"));
    }
    if ctx.percentage >= 80 {
        out.push("Attendance is above the league average".to_string());
    } else if ctx.percentage < 50 {
        out.push("Attendance is below the league average".to_string());
    }
    out
}

/// Goal and penalty tallies for one player of `team`.
pub fn scoring_totals(
    team: &str,
    player: &str,
    goals: &[Goal],
    penalties: &[Penalty],
) -> ScoringTotals {
    let mut point_games: HashSet<&str> = HashSet::new();
    let mut totals = ScoringTotals::default();
    for goal in goals.iter().filter(|g| g.team == team) {
        let scored = goal.scorer.trim() == player;
        let assisted = goal.credited_assists().any(|a| a == player);
        if scored {
            totals.goals += 1;
        }
        if assisted {
            totals.assists += 1;
        }
        if scored || assisted {
            point_games.insert(goal.game_id.as_str());
        }
    }
    totals.points = totals.goals + totals.assists;
    totals.penalty_minutes = penalties
        .iter()
        .filter(|p| p.team == team && p.player.trim() == player)
        .map(Penalty::minutes)
        .fold(0u32, u32::saturating_add);
    totals.games_with_point = point_games.len() as u32;
    totals
}

/// Build the full profile for one player from an attendance aggregate.
pub fn build_player_stat(
    inputs: &TeamInputs<'_>,
    attendance: &PlayerAttendance,
    roster_player: Option<&RosterPlayer>,
) -> PlayerStat {
    let name = attendance.player_name.as_str();
    let pct = attendance.percentage();
    let form = recent_form(&attendance.history);
    let ctx = ProfileContext {
        player_name: name,
        team_name: inputs.team_name,
        games_attended: attendance.games_attended,
        total_team_games: attendance.total_team_games,
        percentage: pct,
        jersey: roster_player.and_then(RosterPlayer::jersey),
        position: roster_player.and_then(RosterPlayer::specific_position),
    };

    let insights = Insights {
        reliability: reliability_rating(AttendanceRates {
            overall: pct,
            recent: form.percentage,
        }),
        trend: attendance_trend(&attendance.history),
        announcements: announcements(&ctx),
        personality_tags: personality_tags(pct, attendance.games_attended),
        storylines: storylines(&ctx),
        contextual_facts: contextual_facts(&ctx),
    };

    PlayerStat {
        player_id: player_key(inputs.team_name, name),
        player_name: name.to_string(),
        team_name: inputs.team_name.to_string(),
        season: inputs.season.to_string(),
        jersey_number: ctx.jersey.unwrap_or(JERSEY_UNKNOWN).to_string(),
        position: ctx.position.unwrap_or(POSITION_GENERIC).to_string(),
        attendance: AttendanceSummary {
            games_attended: attendance.games_attended,
            total_team_games: attendance.total_team_games,
            attendance_percentage: pct,
            recent_form: form,
            history: attendance.history.clone(),
        },
        scoring: scoring_totals(inputs.team_name, name, inputs.goals, inputs.penalties),
        insights,
    }
}

/// One [`PlayerStat`] per real player of the team, ordered by name.
pub fn calculate_team_player_stats(inputs: &TeamInputs<'_>) -> Vec<PlayerStat> {
    let summary = aggregate_team_attendance(inputs.attendance, inputs.team_name, inputs.roster);
    summary
        .players
        .values()
        .filter(|p| !is_sub_placeholder(&p.player_name))
        .map(|p| {
            let roster_player = inputs.roster.and_then(|r| r.player(&p.player_name));
            build_player_stat(inputs, p, roster_player)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        AttendanceRates, RELIABILITY_RULES, TREND_RULES, TrendWindow, personality_tags,
        reliability_rating,
    };
    use crate::model::{Reliability, Trend};
    use crate::rules::first_match;

    fn rate(overall: u32, recent: u32) -> Reliability {
        reliability_rating(AttendanceRates { overall, recent })
    }

    #[test]
    fn reliability_thresholds_first_match_wins() {
        assert_eq!(rate(90, 80), Reliability::HighlyReliable);
        assert_eq!(rate(95, 79), Reliability::Reliable);
        assert_eq!(rate(70, 60), Reliability::Reliable);
        assert_eq!(rate(85, 40), Reliability::ModeratelyReliable);
        assert_eq!(rate(50, 0), Reliability::ModeratelyReliable);
        assert_eq!(rate(30, 100), Reliability::Inconsistent);
        assert_eq!(rate(29, 100), Reliability::Unreliable);
        assert_eq!(rate(0, 0), Reliability::Unreliable);
    }

    #[test]
    fn reliability_table_ends_with_catch_all() {
        let last = RELIABILITY_RULES.last().expect("table not empty");
        assert_eq!(last.name, "unreliable");
        assert!((last.when)(&AttendanceRates { overall: 0, recent: 0 }));
    }

    #[test]
    fn trend_needs_three_games() {
        let short = TrendWindow {
            history_len: 2,
            attended: 2,
        };
        assert_eq!(first_match(TREND_RULES, &short), Some(&Trend::InsufficientData));
        let improving = TrendWindow {
            history_len: 7,
            attended: 2,
        };
        assert_eq!(first_match(TREND_RULES, &improving), Some(&Trend::Improving));
        let declining = TrendWindow {
            history_len: 3,
            attended: 1,
        };
        assert_eq!(first_match(TREND_RULES, &declining), Some(&Trend::Declining));
    }

    #[test]
    fn personality_tags_include_experience() {
        assert_eq!(
            personality_tags(100, 10),
            vec!["reliable", "dedicated", "team-player", "veteran"]
        );
        assert_eq!(personality_tags(75, 1), vec!["consistent", "committed", "newcomer"]);
        assert_eq!(personality_tags(50, 4), vec!["sporadic", "unpredictable"]);
        assert_eq!(personality_tags(0, 0), vec!["infrequent", "occasional"]);
    }
}
