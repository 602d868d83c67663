use criterion::{Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

use rinkstats::game_stats::aggregate_games;
use rinkstats::model::{
    AttendanceRecord, FinalScore, Game, Goal, Penalty, RosterEntry, RosterPlayer, TeamAttendance,
};
use rinkstats::player_stats::{TeamInputs, calculate_team_player_stats};
use rinkstats::report::{ReportCycle, generate_report};

const TEAMS: [&str; 8] = [
    "Sharks", "Jets", "Owls", "Bears", "Wolves", "Hawks", "Storm", "Lynx",
];
const ROSTER_SIZE: usize = 16;

struct Season {
    games: Vec<Game>,
    goals: Vec<Goal>,
    penalties: Vec<Penalty>,
    attendance: Vec<AttendanceRecord>,
}

fn skater(team: &str, idx: usize) -> String {
    format!("{team} Skater {idx:02}")
}

fn synthetic_season(seed: u64, game_count: usize) -> Season {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut season = Season {
        games: Vec::with_capacity(game_count),
        goals: Vec::new(),
        penalties: Vec::new(),
        attendance: Vec::with_capacity(game_count),
    };

    for g in 0..game_count {
        let home = TEAMS[g % TEAMS.len()];
        let away = TEAMS[(g + 1 + g / TEAMS.len()) % TEAMS.len()];
        let id = format!("g{g:04}");
        let (mut home_score, mut away_score) = (0u32, 0u32);

        for n in 0..rng.gen_range(0..10) {
            let home_side = rng.gen_bool(0.5);
            let team = if home_side { home } else { away };
            if home_side {
                home_score += 1;
            } else {
                away_score += 1;
            }
            let assists = (0..rng.gen_range(0..3))
                .map(|_| skater(team, rng.gen_range(0..ROSTER_SIZE)))
                .collect();
            season.goals.push(Goal {
                game_id: id.clone(),
                team: team.to_string(),
                scorer: skater(team, rng.gen_range(0..ROSTER_SIZE)),
                assists,
                period: format!("{}", n % 3 + 1),
                time_remaining: format!("{:02}:00", rng.gen_range(0..15)),
                shot_type: None,
                goal_type: rng.gen_bool(0.2).then(|| "PP".to_string()),
            });
        }

        for _ in 0..rng.gen_range(0..6) {
            let team = if rng.gen_bool(0.5) { home } else { away };
            season.penalties.push(Penalty {
                game_id: id.clone(),
                team: team.to_string(),
                player: skater(team, rng.gen_range(0..ROSTER_SIZE)),
                infraction: "Tripping".to_string(),
                length: if rng.gen_bool(0.9) { "2" } else { "5" }.to_string(),
                period: "2".to_string(),
                time_remaining: "07:30".to_string(),
            });
        }

        let teams = [home, away]
            .iter()
            .map(|team| {
                let roster: Vec<String> = (0..ROSTER_SIZE).map(|i| skater(team, i)).collect();
                let present = roster
                    .iter()
                    .filter(|_| rng.gen_bool(0.75))
                    .cloned()
                    .collect();
                TeamAttendance {
                    team_name: team.to_string(),
                    roster,
                    present,
                }
            })
            .collect();
        season.attendance.push(AttendanceRecord {
            game_id: id.clone(),
            date: None,
            teams,
        });

        season.games.push(Game {
            id,
            home_team: home.to_string(),
            away_team: away.to_string(),
            division: "A".to_string(),
            date: None,
            final_score: Some(FinalScore {
                home: home_score,
                away: away_score,
            }),
        });
    }
    season
}

fn bench_aggregate_games(c: &mut Criterion) {
    let season = synthetic_season(7, 240);
    c.bench_function("aggregate_games_season", |b| {
        b.iter(|| {
            let stats = aggregate_games(
                black_box(&season.games),
                black_box(&season.goals),
                black_box(&season.penalties),
            );
            black_box(stats.top_scorers.len());
        })
    });
}

fn bench_generate_report(c: &mut Criterion) {
    let season = synthetic_season(11, 240);
    let stats = aggregate_games(&season.games, &season.goals, &season.penalties);
    let cycle = ReportCycle::unbounded("season");
    c.bench_function("generate_report_season", |b| {
        b.iter(|| {
            let report = generate_report("A", &cycle, black_box(&stats), "bench");
            black_box(report.html_content.len());
        })
    });
}

fn bench_team_player_stats(c: &mut Criterion) {
    let season = synthetic_season(13, 240);
    let roster = RosterEntry {
        team_name: "Sharks".to_string(),
        division: "A".to_string(),
        season: "2026".to_string(),
        players: (0..ROSTER_SIZE)
            .map(|i| RosterPlayer {
                name: skater("Sharks", i),
                jersey_number: format!("{}", i + 2),
                position: "Forward".to_string(),
            })
            .collect(),
    };
    let inputs = TeamInputs {
        team_name: "Sharks",
        season: "2026",
        roster: Some(&roster),
        attendance: &season.attendance,
        goals: &season.goals,
        penalties: &season.penalties,
    };
    c.bench_function("team_player_stats", |b| {
        b.iter(|| {
            let stats = calculate_team_player_stats(black_box(&inputs));
            black_box(stats.len());
        })
    });
}

criterion_group!(
    perf,
    bench_aggregate_games,
    bench_generate_report,
    bench_team_player_stats
);
criterion_main!(perf);
