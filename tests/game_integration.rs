//! End-to-end tests: simulate, export, read back, summarize, learn a table
//! and play with it.
//!
//! Run with: cargo test --release game_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::fs::File;
use std::io::{BufReader, BufWriter};

use shutbox::policy::{learn_table, TablePolicy};
use shutbox::record::{read_scores, read_steps, write_scores, write_steps};
use shutbox::stats::best;
use shutbox::{
    simulate, simulate_strategies, summarize, GameConfig, Policy, PolicyTable, RunRecord, ScoreRow,
    SimulationConfig, Strategy,
};

fn builtin_policies() -> Vec<Box<dyn Policy>> {
    Strategy::BUILTIN
        .into_iter()
        .map(|s| s.policy(None).unwrap())
        .collect()
}

fn rows(records: &[RunRecord]) -> Vec<ScoreRow> {
    records.iter().map(RunRecord::score_row).collect()
}

#[test]
fn test_heuristics_beat_random() {
    let config = SimulationConfig {
        games: 2000,
        seed: 1,
        ..SimulationConfig::default()
    };
    let records = simulate_strategies(&builtin_policies(), &config).unwrap();
    assert_eq!(records.len(), 8000);

    let summaries = summarize(&rows(&records));
    assert_eq!(summaries.len(), 4);
    assert!(summaries.windows(2).all(|w| w[0].mean <= w[1].mean));

    let random = summaries.iter().find(|s| s.strategy == "random").unwrap();
    let min_remaining = summaries.iter().find(|s| s.strategy == "min-remaining").unwrap();
    assert!(min_remaining.mean < random.mean);
    assert_ne!(best(&summaries).unwrap().strategy, "random");
    assert!(summaries.iter().all(|s| s.runs == 2000 && s.max <= 45));
}

#[test]
fn test_results_independent_of_thread_count() {
    let config = SimulationConfig {
        games: 200,
        seed: 77,
        trace: true,
        ..SimulationConfig::default()
    };
    let policy = Strategy::Random.policy(None).unwrap();

    let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let single = pool.install(|| simulate(policy.as_ref(), &config).unwrap());
    let pool = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
    let multi = pool.install(|| simulate(policy.as_ref(), &config).unwrap());

    assert_eq!(single, multi);
}

#[test]
fn test_scores_file_round_trip_summarizes_the_same() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.csv");

    let config = SimulationConfig {
        games: 300,
        seed: 5,
        ..SimulationConfig::default()
    };
    let records = simulate_strategies(&builtin_policies(), &config).unwrap();
    write_scores(BufWriter::new(File::create(&path).unwrap()), &records).unwrap();

    let read_back = read_scores(BufReader::new(File::open(&path).unwrap())).unwrap();
    assert_eq!(read_back, rows(&records));
    assert_eq!(summarize(&read_back), summarize(&rows(&records)));
}

#[test]
fn test_collect_learn_and_play_table() {
    let dir = tempfile::tempdir().unwrap();
    let steps_path = dir.path().join("random_runs.csv");
    let table_path = dir.path().join("policy_table.json");

    // Collect random traces
    let config = SimulationConfig {
        games: 3000,
        seed: 11,
        trace: true,
        ..SimulationConfig::default()
    };
    let random = Strategy::Random.policy(None).unwrap();
    let records = simulate(random.as_ref(), &config).unwrap();
    write_steps(BufWriter::new(File::create(&steps_path).unwrap()), &records).unwrap();

    // Learn and save the table
    let steps = read_steps(BufReader::new(File::open(&steps_path).unwrap())).unwrap();
    let expected_steps: usize = records.iter().map(|r| r.steps.len()).sum();
    assert_eq!(steps.len(), expected_steps);
    let table = learn_table(&steps, 1).unwrap();
    assert!(!table.is_empty());
    assert_eq!(table.get("123456789", 2).map(ToString::to_string).as_deref(), Some("2"));
    table.save(&table_path).unwrap();

    // Play the loaded table against random on fresh seeds
    let loaded = PolicyTable::load(&table_path).unwrap();
    assert_eq!(loaded, table);
    let policies: Vec<Box<dyn Policy>> = vec![Box::new(TablePolicy::new(loaded)), random];
    let eval = SimulationConfig {
        games: 1000,
        seed: 9_000,
        ..SimulationConfig::default()
    };
    let summaries = summarize(&rows(&simulate_strategies(&policies, &eval).unwrap()));
    assert_eq!(summaries[0].strategy, "table");
}

#[test]
fn test_larger_board_with_auto_single_die() {
    let config = SimulationConfig {
        games: 200,
        seed: 3,
        trace: true,
        game: GameConfig {
            tiles_max: 12,
            single_die_rule: true,
            auto_single_die: true,
        },
    };
    let policy = Strategy::Human.policy(None).unwrap();
    let records = simulate(policy.as_ref(), &config).unwrap();
    for record in &records {
        assert!(record.score <= 78);
        assert_eq!(record.steps[0].tiles_before, "123456789ABC");
        // One die can only be thrown once every tile above six is closed
        for step in &record.steps {
            if step.roll == 1 {
                assert!(step.tiles_before[6..].chars().all(|c| c == 'X'));
            }
        }
    }
}
