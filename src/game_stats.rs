use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::warn;

use crate::identity::player_key;
use crate::model::{Game, Goal, Penalty, ReportTotals, parse_minutes};

pub const TOP_SCORER_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamTotals {
    pub name: String,
    pub games: u32,
    pub goals: u32,
    pub penalties: u32,
    pub pim: u32,
    pub pp_goals: u32,
    pub sh_goals: u32,
}

impl TeamTotals {
    pub fn goals_per_game(&self) -> Option<f64> {
        if self.games == 0 {
            None
        } else {
            Some(self.goals as f64 / self.games as f64)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerTotals {
    pub name: String,
    pub team: String,
    pub goals: u32,
    pub assists: u32,
    pub points: u32,
    pub pim: u32,
    /// Goals per game id, for single-game feats such as hat tricks.
    pub goals_by_game: BTreeMap<String, u32>,
}

impl PlayerTotals {
    pub fn best_game_goals(&self) -> u32 {
        self.goals_by_game.values().copied().max().unwrap_or(0)
    }

    pub fn has_hat_trick(&self) -> bool {
        self.best_game_goals() >= 3
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamScore {
    pub team: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    pub game_id: String,
    pub teams: Vec<TeamScore>,
    pub total_goals: u32,
    pub total_penalties: u32,
}

impl GameResult {
    /// Score gap for two-team results.
    pub fn margin(&self) -> Option<u32> {
        match self.teams.as_slice() {
            [a, b] => Some(a.score.abs_diff(b.score)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameStats {
    pub total_games: u32,
    pub total_goals: u32,
    pub total_penalties: u32,
    pub total_pim: u32,
    pub teams: BTreeMap<String, TeamTotals>,
    pub players: BTreeMap<String, PlayerTotals>,
    pub game_results: Vec<GameResult>,
    pub top_scorers: Vec<PlayerTotals>,
}

impl GameStats {
    pub fn totals(&self) -> ReportTotals {
        ReportTotals {
            total_games: self.total_games,
            total_goals: self.total_goals,
            total_penalties: self.total_penalties,
            total_pim: self.total_pim,
        }
    }

    pub fn average_goals_per_game(&self) -> Option<f64> {
        if self.total_games == 0 {
            None
        } else {
            Some(self.total_goals as f64 / self.total_games as f64)
        }
    }

    /// Every player with points, in scoring order.
    pub fn ranked_players(&self) -> Vec<&PlayerTotals> {
        let mut ranked: Vec<&PlayerTotals> =
            self.players.values().filter(|p| p.points > 0).collect();
        ranked.sort_by(|a, b| scoring_order(a, b));
        ranked
    }

    /// Highest goals-per-game among teams with at least one game; ties keep
    /// the alphabetically first team.
    pub fn top_offense(&self) -> Option<&TeamTotals> {
        let mut best: Option<(&TeamTotals, f64)> = None;
        for team in self.teams.values() {
            let Some(gpg) = team.goals_per_game() else {
                continue;
            };
            if best.is_none_or(|(_, b)| gpg > b) {
                best = Some((team, gpg));
            }
        }
        best.map(|(team, _)| team)
    }
}

/// Points desc, goals desc, name asc, team asc.
pub fn scoring_order(a: &PlayerTotals, b: &PlayerTotals) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(b.goals.cmp(&a.goals))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.team.cmp(&b.team))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialTeams {
    PowerPlay,
    ShortHanded,
}

/// Classify a goal's type tag; even-strength and unknown tags return `None`.
pub fn special_teams(tag: Option<&str>) -> Option<SpecialTeams> {
    let t = tag?.trim().to_ascii_lowercase();
    let compact: String = t.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if compact == "pp" || compact.contains("powerplay") {
        Some(SpecialTeams::PowerPlay)
    } else if compact == "sh" || compact.contains("shorthanded") || compact.contains("shorty") {
        Some(SpecialTeams::ShortHanded)
    } else {
        None
    }
}

/// Running totals; every step consumes the accumulator and returns the next.
#[derive(Debug, Default)]
struct Accumulator {
    total_goals: u32,
    total_penalties: u32,
    total_pim: u32,
    teams: BTreeMap<String, TeamTotals>,
    players: BTreeMap<String, PlayerTotals>,
    game_results: Vec<GameResult>,
}

impl Accumulator {
    fn with_team(mut self, team: &str, f: impl FnOnce(&mut TeamTotals)) -> Self {
        let entry = self
            .teams
            .entry(team.to_string())
            .or_insert_with(|| TeamTotals {
                name: team.to_string(),
                ..TeamTotals::default()
            });
        f(entry);
        self
    }

    fn with_player(mut self, team: &str, name: &str, f: impl FnOnce(&mut PlayerTotals)) -> Self {
        let entry = self
            .players
            .entry(player_key(team, name))
            .or_insert_with(|| PlayerTotals {
                name: name.to_string(),
                team: team.to_string(),
                ..PlayerTotals::default()
            });
        f(entry);
        self
    }

    fn apply_goal(self, goal: &Goal) -> Self {
        let kind = special_teams(goal.goal_type.as_deref());
        let mut acc = self.with_team(&goal.team, |t| {
            t.goals += 1;
            match kind {
                Some(SpecialTeams::PowerPlay) => t.pp_goals += 1,
                Some(SpecialTeams::ShortHanded) => t.sh_goals += 1,
                None => {}
            }
        });
        acc.total_goals += 1;

        if goal.has_scorer() {
            let game_id = goal.game_id.clone();
            acc = acc.with_player(&goal.team, goal.scorer.trim(), |p| {
                p.goals += 1;
                p.points += 1;
                *p.goals_by_game.entry(game_id).or_insert(0) += 1;
            });
        } else {
            warn!(
                game_id = %goal.game_id,
                team = %goal.team,
                "goal without scorer; crediting team only"
            );
        }

        goal.credited_assists()
            .filter(|a| *a != goal.scorer.trim())
            .fold(acc, |acc, assist| {
                acc.with_player(&goal.team, assist, |p| {
                    p.assists += 1;
                    p.points += 1;
                })
            })
    }

    fn apply_penalty(self, penalty: &Penalty) -> Self {
        let parsed = parse_minutes(&penalty.length);
        let minutes = parsed.unwrap_or(0);
        if parsed.is_none() {
            warn!(
                game_id = %penalty.game_id,
                player = %penalty.player,
                length = %penalty.length,
                "penalty length did not parse or is out of range; counting 0 minutes"
            );
        }
        let mut acc = self.with_team(&penalty.team, |t| {
            t.penalties += 1;
            t.pim = t.pim.saturating_add(minutes);
        });
        acc.total_penalties += 1;
        acc.total_pim = acc.total_pim.saturating_add(minutes);

        if penalty.has_player() {
            acc.with_player(&penalty.team, penalty.player.trim(), |p| {
                p.pim = p.pim.saturating_add(minutes)
            })
        } else {
            warn!(
                game_id = %penalty.game_id,
                team = %penalty.team,
                "penalty without player; crediting team only"
            );
            acc
        }
    }

    fn apply_result(mut self, game: &Game, penalties_in_game: u32) -> Self {
        let Some(score) = game.final_score else {
            return self;
        };
        self.game_results.push(GameResult {
            game_id: game.id.clone(),
            teams: vec![
                TeamScore {
                    team: game.home_team.clone(),
                    score: score.home,
                },
                TeamScore {
                    team: game.away_team.clone(),
                    score: score.away,
                },
            ],
            total_goals: score.home + score.away,
            total_penalties: penalties_in_game,
        });
        self
    }

    fn count_team_games(self) -> Self {
        let names: Vec<String> = self
            .game_results
            .iter()
            .flat_map(|r| r.teams.iter().map(|t| t.team.clone()))
            .collect();
        names
            .iter()
            .fold(self, |acc, team| acc.with_team(team, |t| t.games += 1))
    }

    fn finish(self, total_games: u32) -> GameStats {
        let mut top_scorers: Vec<PlayerTotals> = self
            .players
            .values()
            .filter(|p| p.points > 0)
            .cloned()
            .collect();
        top_scorers.sort_by(scoring_order);
        top_scorers.truncate(TOP_SCORER_LIMIT);

        GameStats {
            total_games,
            total_goals: self.total_goals,
            total_penalties: self.total_penalties,
            total_pim: self.total_pim,
            teams: self.teams,
            players: self.players,
            game_results: self.game_results,
            top_scorers,
        }
    }
}

/// Fold one division's batch of games, goals and penalties into totals.
///
/// Goals and penalties whose game is not part of `games` are skipped.
pub fn aggregate_games(games: &[Game], goals: &[Goal], penalties: &[Penalty]) -> GameStats {
    let game_ids: HashSet<&str> = games.iter().map(|g| g.id.as_str()).collect();
    let in_batch = |game_id: &str, kind: &str| {
        let known = game_ids.contains(game_id);
        if !known {
            warn!(game_id, kind, "event references a game outside the batch; skipping");
        }
        known
    };

    let mut penalties_per_game: HashMap<&str, u32> = HashMap::new();
    for p in penalties {
        *penalties_per_game.entry(p.game_id.as_str()).or_insert(0) += 1;
    }

    let acc = goals
        .iter()
        .filter(|g| in_batch(&g.game_id, "goal"))
        .fold(Accumulator::default(), Accumulator::apply_goal);
    let acc = penalties
        .iter()
        .filter(|p| in_batch(&p.game_id, "penalty"))
        .fold(acc, Accumulator::apply_penalty);
    let acc = games.iter().fold(acc, |acc, game| {
        let count = penalties_per_game
            .get(game.id.as_str())
            .copied()
            .unwrap_or(0);
        acc.apply_result(game, count)
    });

    acc.count_team_games().finish(games.len() as u32)
}

#[cfg(test)]
mod tests {
    use super::{SpecialTeams, special_teams};

    #[test]
    fn special_teams_tags() {
        assert_eq!(special_teams(Some("PP")), Some(SpecialTeams::PowerPlay));
        assert_eq!(special_teams(Some("Power Play")), Some(SpecialTeams::PowerPlay));
        assert_eq!(special_teams(Some("short-handed")), Some(SpecialTeams::ShortHanded));
        assert_eq!(special_teams(Some("Even Strength")), None);
        assert_eq!(special_teams(None), None);
    }
}
