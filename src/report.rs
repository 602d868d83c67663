use chrono::{Datelike, NaiveDate, Weekday};

use crate::game_stats::{GameResult, GameStats, PlayerTotals};
use crate::identity::slug;
use crate::model::{Prediction, RinkReport, StandoutPlayer, is_sub_placeholder};

pub const MAX_HIGHLIGHTS: usize = 6;
pub const MAX_STANDOUTS: usize = 3;

const THRILLER_GOALS: u32 = 8;
const PHYSICAL_PENALTIES: u32 = 8;

/// Games and dates a report covers. `label` is part of the report id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportCycle {
    pub label: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ReportCycle {
    /// Monday-to-Sunday ISO week containing `date`, labelled `"2026-W42"`.
    pub fn iso_week(date: NaiveDate) -> Self {
        let week = date.iso_week();
        let start = NaiveDate::from_isoywd_opt(week.year(), week.week(), Weekday::Mon);
        let end = NaiveDate::from_isoywd_opt(week.year(), week.week(), Weekday::Sun);
        Self {
            label: format!("{}-W{:02}", week.year(), week.week()),
            start,
            end,
        }
    }

    /// Unbounded cycle covering every game, e.g. a season recap.
    pub fn unbounded(label: &str) -> Self {
        Self {
            label: label.to_string(),
            start: None,
            end: None,
        }
    }

    /// Undated games only belong to unbounded cycles.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

pub fn report_id(division: &str, cycle: &ReportCycle) -> String {
    format!("{}-{}", slug(division), cycle.label)
}

pub fn generate_highlights(stats: &GameStats) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    for result in &stats.game_results {
        if result.total_goals >= THRILLER_GOALS {
            out.push(format!(
                "High-scoring thriller: {} combined for {} goals!",
                matchup(result),
                result.total_goals
            ));
        }
    }

    for player in stats.ranked_players() {
        if player.has_hat_trick() {
            out.push(format!(
                "Hat trick! {} ({}) scored {} goals in a single game.",
                player.name,
                player.team,
                player.best_game_goals()
            ));
        }
    }

    for result in &stats.game_results {
        if result.margin() == Some(1)
            && let [a, b] = result.teams.as_slice()
        {
            let (winner, loser) = if a.score >= b.score { (a, b) } else { (b, a) };
            out.push(format!(
                "Nail-biter: {} edged {} {}-{} in a one-goal game.",
                winner.team, loser.team, winner.score, loser.score
            ));
        }
    }

    for result in &stats.game_results {
        if result.total_penalties >= PHYSICAL_PENALTIES {
            out.push(format!(
                "Physical matchup: {} featured {} penalties.",
                matchup(result),
                result.total_penalties
            ));
        }
    }

    if out.is_empty() {
        out.push(format!("{} games were played.", stats.total_games));
        out.push(format!(
            "{} goals were scored across the division.",
            stats.total_goals
        ));
        if let Some(leader) = stats.top_scorers.first() {
            out.push(format!(
                "{} leads all scorers with {} points.",
                leader.name, leader.points
            ));
        }
    }

    out.truncate(MAX_HIGHLIGHTS);
    out
}

fn matchup(result: &GameResult) -> String {
    result
        .teams
        .iter()
        .map(|t| t.team.as_str())
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Single highlight phrase, best feat first.
pub fn standout_phrase(player: &PlayerTotals) -> &'static str {
    if player.has_hat_trick() {
        "Hat trick hero"
    } else if player.assists >= 3 {
        "Playmaker extraordinaire"
    } else if player.points >= 4 {
        "Consistent performer"
    } else {
        "Key contributor"
    }
}

pub fn generate_standout_players(stats: &GameStats) -> Vec<StandoutPlayer> {
    stats
        .top_scorers
        .iter()
        .filter(|p| !is_sub_placeholder(&p.name))
        .take(MAX_STANDOUTS)
        .map(|p| StandoutPlayer {
            name: p.name.clone(),
            team: p.team.clone(),
            highlight: standout_phrase(p).to_string(),
            stats: format!("{} goals, {} assists", p.goals, p.assists),
        })
        .collect()
}

pub fn generate_league_updates(division: &str, stats: &GameStats) -> Vec<String> {
    let mut out = vec![
        format!(
            "{division} division action continued with {} games played.",
            stats.total_games
        ),
        format!("Teams combined for {} goals.", stats.total_goals),
    ];
    if stats.total_pim > 0 {
        out.push(format!(
            "Officials handed out {} penalty minutes.",
            stats.total_pim
        ));
    }
    if let Some(avg) = stats.average_goals_per_game() {
        out.push(format!("Teams are averaging {avg:.1} goals per game."));
    }
    out.push("Playoff positioning is heating up as the season rolls on.".to_string());
    out.push("Every point matters in the race for a postseason spot.".to_string());
    out
}

/// Fixed entries; nothing here is derived from the schedule.
pub fn generate_predictions() -> Vec<Prediction> {
    vec![
        Prediction {
            title: "Playoff Race".to_string(),
            text: "Expect tight battles for the final playoff spots.".to_string(),
        },
        Prediction {
            title: "Scoring Race".to_string(),
            text: "The scoring leaders will be pushed hard in the weeks ahead.".to_string(),
        },
    ]
}

fn section_overview(division: &str, stats: &GameStats) -> Option<String> {
    Some(format!(
        "<h2>{} Division Recap</h2>\n<p>{} games played and {} goals scored.</p>",
        escape_html(division),
        stats.total_games,
        stats.total_goals
    ))
}

fn section_top_scorer(stats: &GameStats) -> Option<String> {
    let leader = stats.top_scorers.first()?;
    Some(format!(
        "<h3>Top Scorer</h3>\n<p><strong>{}</strong> ({}) leads with {} points ({} goals, {} assists).</p>",
        escape_html(&leader.name),
        escape_html(&leader.team),
        leader.points,
        leader.goals,
        leader.assists
    ))
}

fn section_top_offense(stats: &GameStats) -> Option<String> {
    let team = stats.top_offense()?;
    let gpg = team.goals_per_game()?;
    Some(format!(
        "<h3>Top Offense</h3>\n<p><strong>{}</strong> is scoring {gpg:.1} goals per game.</p>",
        escape_html(&team.name)
    ))
}

fn section_special_teams(stats: &GameStats) -> Option<String> {
    let rows: Vec<String> = stats
        .teams
        .values()
        .filter(|t| t.pp_goals > 0 || t.sh_goals > 0)
        .map(|t| {
            format!(
                "<li>{}: {} power-play, {} short-handed</li>",
                escape_html(&t.name),
                t.pp_goals,
                t.sh_goals
            )
        })
        .collect();
    if rows.is_empty() {
        return None;
    }
    Some(format!(
        "<h3>Special Teams</h3>\n<ul>\n{}\n</ul>",
        rows.join("\n")
    ))
}

fn section_discipline(stats: &GameStats) -> Option<String> {
    if stats.total_penalties == 0 {
        return None;
    }
    Some(format!(
        "<h3>Discipline</h3>\n<p>{} penalties for {} penalty minutes.</p>",
        stats.total_penalties, stats.total_pim
    ))
}

pub fn generate_html(division: &str, stats: &GameStats) -> String {
    [
        section_overview(division, stats),
        section_top_scorer(stats),
        section_top_offense(stats),
        section_special_teams(stats),
        section_discipline(stats),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Assemble the full report document. `generated_at` is the only field that
/// differs between two runs over the same batch.
pub fn generate_report(
    division: &str,
    cycle: &ReportCycle,
    stats: &GameStats,
    generated_at: &str,
) -> RinkReport {
    RinkReport {
        id: report_id(division, cycle),
        division: division.to_string(),
        cycle: cycle.label.clone(),
        generated_at: generated_at.to_string(),
        title: format!("{division} Rink Report: {}", cycle.label),
        html_content: generate_html(division, stats),
        highlights: generate_highlights(stats),
        standout_players: generate_standout_players(stats),
        league_updates: generate_league_updates(division, stats),
        predictions: generate_predictions(),
        stats: stats.totals(),
    }
}
