use rinkstats::game_stats::aggregate_games;
use rinkstats::model::{FinalScore, Game, Goal, Penalty};

fn game(id: &str, home: &str, away: &str, score: Option<(u32, u32)>) -> Game {
    Game {
        id: id.to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        division: "A".to_string(),
        date: None,
        final_score: score.map(|(home, away)| FinalScore { home, away }),
    }
}

fn goal(game_id: &str, team: &str, scorer: &str, assists: &[&str]) -> Goal {
    Goal {
        game_id: game_id.to_string(),
        team: team.to_string(),
        scorer: scorer.to_string(),
        assists: assists.iter().map(|s| s.to_string()).collect(),
        period: "1".to_string(),
        time_remaining: "12:00".to_string(),
        shot_type: None,
        goal_type: None,
    }
}

fn penalty(game_id: &str, team: &str, player: &str, length: &str) -> Penalty {
    Penalty {
        game_id: game_id.to_string(),
        team: team.to_string(),
        player: player.to_string(),
        infraction: "Slashing".to_string(),
        length: length.to_string(),
        period: "2".to_string(),
        time_remaining: "08:30".to_string(),
    }
}

#[test]
fn goals_and_assists_accumulate_across_games() {
    let games = vec![
        game("g1", "Sharks", "Jets", Some((2, 1))),
        game("g2", "Sharks", "Owls", Some((1, 0))),
    ];
    let goals = vec![
        goal("g1", "Sharks", "Ann", &["Bea", "Cat"]),
        goal("g1", "Sharks", "Bea", &["Ann"]),
        goal("g1", "Jets", "Dee", &[]),
        goal("g2", "Sharks", "Cat", &["Ann"]),
    ];
    let stats = aggregate_games(&games, &goals, &[]);

    assert_eq!(stats.total_games, 2);
    assert_eq!(stats.total_goals, 4);
    assert_eq!(stats.teams["Sharks"].goals, 3);
    assert_eq!(stats.teams["Sharks"].games, 2);
    assert_eq!(stats.teams["Jets"].games, 1);
    assert_eq!(stats.teams["Owls"].games, 1);
    assert_eq!(stats.teams["Owls"].goals, 0);

    let ann = &stats.players["sharks::ann"];
    assert_eq!((ann.goals, ann.assists, ann.points), (1, 2, 3));
    let cat = &stats.players["sharks::cat"];
    assert_eq!((cat.goals, cat.assists, cat.points), (1, 1, 2));

    let order: Vec<&str> = stats.top_scorers.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(order, vec!["Ann", "Bea", "Cat", "Dee"]);
}

#[test]
fn top_scorers_tie_break_points_goals_name() {
    let games = vec![game("g1", "Sharks", "Jets", Some((4, 0)))];
    let goals = vec![
        goal("g1", "Sharks", "Zed", &["Amy"]),
        goal("g1", "Sharks", "Yan", &["Amy"]),
        goal("g1", "Sharks", "Bob", &[]),
        goal("g1", "Sharks", "Bob", &[]),
    ];
    let stats = aggregate_games(&games, &goals, &[]);
    let rows: Vec<(&str, u32, u32)> = stats
        .top_scorers
        .iter()
        .map(|p| (p.name.as_str(), p.points, p.goals))
        .collect();
    assert_eq!(
        rows,
        vec![("Bob", 2, 2), ("Amy", 2, 0), ("Yan", 1, 1), ("Zed", 1, 1)]
    );
}

#[test]
fn top_scorers_capped_at_ten() {
    let games = vec![game("g1", "Sharks", "Jets", Some((12, 0)))];
    let goals: Vec<Goal> = (0..12)
        .map(|i| goal("g1", "Sharks", &format!("P{i:02}"), &[]))
        .collect();
    let stats = aggregate_games(&games, &goals, &[]);
    assert_eq!(stats.top_scorers.len(), 10);
    assert_eq!(stats.top_scorers[0].name, "P00");
    assert_eq!(stats.players.len(), 12);
}

#[test]
fn unparsable_penalty_length_counts_zero_minutes() {
    let games = vec![game("g1", "Sharks", "Jets", Some((1, 1)))];
    let penalties = vec![
        penalty("g1", "Sharks", "Ann", "abc"),
        penalty("g1", "Sharks", "Ann", "2"),
        penalty("g1", "Jets", "Dee", "5"),
    ];
    let stats = aggregate_games(&games, &[], &penalties);
    assert_eq!(stats.total_penalties, 3);
    assert_eq!(stats.total_pim, 7);
    assert_eq!(stats.teams["Sharks"].penalties, 2);
    assert_eq!(stats.teams["Sharks"].pim, 2);
    assert_eq!(stats.players["sharks::ann"].pim, 2);
    assert_eq!(stats.game_results[0].total_penalties, 3);
    assert!(stats.top_scorers.is_empty());
}

#[test]
fn oversized_penalty_lengths_count_zero_minutes() {
    let games = vec![game("g1", "Sharks", "Jets", Some((0, 0)))];
    let penalties = vec![
        penalty("g1", "Sharks", "Ann", "4000000000"),
        penalty("g1", "Sharks", "Ann", "4000000000"),
        penalty("g1", "Sharks", "Ann", "10"),
    ];
    let stats = aggregate_games(&games, &[], &penalties);
    assert_eq!(stats.total_penalties, 3);
    assert_eq!(stats.total_pim, 10);
    assert_eq!(stats.teams["Sharks"].pim, 10);
    assert_eq!(stats.players["sharks::ann"].pim, 10);
}

#[test]
fn penalty_without_player_credits_team_only() {
    let games = vec![game("g1", "Sharks", "Jets", Some((0, 0)))];
    let penalties = vec![penalty("g1", "Sharks", "  ", "2")];
    let stats = aggregate_games(&games, &[], &penalties);
    assert_eq!(stats.total_pim, 2);
    assert_eq!(stats.teams["Sharks"].penalties, 1);
    assert_eq!(stats.teams["Sharks"].pim, 2);
    assert!(stats.players.is_empty());
}

#[test]
fn hat_trick_needs_three_goals_in_one_game() {
    let games = vec![
        game("g1", "Sharks", "Jets", Some((1, 0))),
        game("g2", "Sharks", "Jets", Some((1, 0))),
        game("g3", "Sharks", "Jets", Some((3, 0))),
    ];
    let spread = vec![
        goal("g1", "Sharks", "Ann", &[]),
        goal("g2", "Sharks", "Ann", &[]),
        goal("g3", "Sharks", "Ann", &[]),
    ];
    let stats = aggregate_games(&games, &spread, &[]);
    let ann = &stats.players["sharks::ann"];
    assert_eq!((ann.goals, ann.assists, ann.points), (3, 0, 3));
    assert_eq!(ann.best_game_goals(), 1);
    assert!(!ann.has_hat_trick());

    let single = vec![
        goal("g3", "Sharks", "Ann", &[]),
        goal("g3", "Sharks", "Ann", &[]),
        goal("g3", "Sharks", "Ann", &[]),
    ];
    let stats = aggregate_games(&games, &single, &[]);
    assert!(stats.players["sharks::ann"].has_hat_trick());
}

#[test]
fn malformed_and_foreign_events_are_skipped() {
    let games = vec![game("g1", "Sharks", "Jets", None)];
    let goals = vec![
        goal("g1", "Sharks", "  ", &["Bea"]),
        goal("other", "Sharks", "Ann", &[]),
    ];
    let stats = aggregate_games(&games, &goals, &[]);
    assert_eq!(stats.total_goals, 1);
    assert_eq!(stats.teams["Sharks"].goals, 1);
    assert!(!stats.players.contains_key("sharks::ann"));
    assert_eq!(stats.players["sharks::bea"].assists, 1);
    // No final score, so no result and no games counted.
    assert!(stats.game_results.is_empty());
    assert_eq!(stats.teams["Sharks"].games, 0);
}

#[test]
fn special_teams_goals_are_tallied() {
    let games = vec![game("g1", "Sharks", "Jets", Some((2, 0)))];
    let mut pp = goal("g1", "Sharks", "Ann", &[]);
    pp.goal_type = Some("PP".to_string());
    let mut sh = goal("g1", "Sharks", "Bea", &[]);
    sh.goal_type = Some("Short Handed".to_string());
    let stats = aggregate_games(&games, &[pp, sh], &[]);
    assert_eq!(stats.teams["Sharks"].pp_goals, 1);
    assert_eq!(stats.teams["Sharks"].sh_goals, 1);
}
