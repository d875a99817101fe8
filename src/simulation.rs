//! Batch simulation of many independent games.
//!
//! Provides a pure function interface: `(policy, config) -> Vec<RunRecord>`
//!
//! The harness handles:
//! - Per-game seeding (dice and policy draw from separate streams)
//! - Parallel game execution with rayon
//! - Checking every policy decision against the legal moves
//! - Optional step traces for export

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

use crate::error::{ConfigError, MoveRejection};
use crate::game::{Board, Game, GameConfig, Move};
use crate::policy::Policy;
use crate::record::{join_moves, RunRecord, StepRecord};

/// Configuration for a batch of games.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    /// Games to play per strategy.
    pub games: u64,
    /// Base seed; game `i` is played from `seed + i`.
    pub seed: u64,
    /// Rules for every game.
    pub game: GameConfig,
    /// Record a step trace for every game.
    pub trace: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            games: 1000,
            seed: 0,
            game: GameConfig::default(),
            trace: false,
        }
    }
}

/// Error type for simulation runs. Every variant aborts the batch.
#[derive(Debug)]
pub enum SimulationError {
    /// The game configuration is invalid.
    Config(ConfigError),
    /// A policy returned a move that was not among the legal moves.
    PolicyViolation {
        /// Run in which it happened.
        run_id: u64,
        /// Offending strategy.
        strategy: String,
        /// Pending roll.
        roll: u8,
        /// The move the policy returned.
        chosen: Move,
        /// The moves it was offered.
        legal: Vec<Move>,
    },
    /// The engine refused a move the harness had checked as legal.
    EngineRejected {
        /// Run in which it happened.
        run_id: u64,
        /// Strategy that was playing.
        strategy: String,
        /// The engine's reason.
        rejection: MoveRejection,
    },
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid game configuration: {e}"),
            Self::PolicyViolation {
                run_id,
                strategy,
                roll,
                chosen,
                legal,
            } => write!(
                f,
                "strategy {strategy} chose illegal move {chosen} for roll {roll} in run {run_id} (legal: [{}])",
                join_moves(legal)
            ),
            Self::EngineRejected {
                run_id,
                strategy,
                rejection,
            } => write!(f, "engine rejected a move by {strategy} in run {run_id}: {rejection}"),
        }
    }
}

impl std::error::Error for SimulationError {}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Separate dice and policy streams derived from one game seed.
fn game_rngs(seed: u64) -> (SmallRng, SmallRng) {
    let mut master = SmallRng::seed_from_u64(seed);
    let dice = SmallRng::seed_from_u64(master.next_u64());
    let policy = SmallRng::seed_from_u64(master.next_u64());
    (dice, policy)
}

/// Play one game to completion.
///
/// # Determinism
///
/// Given the same policy, config and seed, this function always produces the
/// same `RunRecord`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the policy breaks its
/// contract by returning an illegal move.
pub fn play_game(
    policy: &dyn Policy,
    config: &GameConfig,
    seed: u64,
    run_id: u64,
    trace: bool,
) -> Result<RunRecord, SimulationError> {
    let runner = GameRunner::new(policy, config, seed, run_id, trace)?;
    runner.run()
}

/// Play `config.games` games with one policy.
///
/// Games run in parallel but results come back in run-id order and do not
/// depend on the thread count. The first failure aborts the batch.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the policy returns an
/// illegal move.
pub fn simulate(policy: &dyn Policy, config: &SimulationConfig) -> Result<Vec<RunRecord>, SimulationError> {
    run_batch(policy, config, 0)
}

/// Play the same game budget with every policy.
///
/// Game `i` of every strategy uses the same seed, so strategies face the same
/// dice streams wherever their boards allow. Run ids are numbered
/// consecutively across strategies.
///
/// # Errors
///
/// Returns the first error of any batch.
pub fn simulate_strategies(
    policies: &[Box<dyn Policy>],
    config: &SimulationConfig,
) -> Result<Vec<RunRecord>, SimulationError> {
    let mut records = Vec::new();
    for (index, policy) in (0u64..).zip(policies) {
        let first_run_id = index * config.games;
        records.extend(run_batch(policy.as_ref(), config, first_run_id)?);
    }
    Ok(records)
}

/// Play one batch, numbering runs from `first_run_id`.
///
/// # Errors
///
/// Returns the first error of any game.
pub fn run_batch(
    policy: &dyn Policy,
    config: &SimulationConfig,
    first_run_id: u64,
) -> Result<Vec<RunRecord>, SimulationError> {
    config.game.validate()?;
    (0..config.games)
        .into_par_iter()
        .map(|i| {
            play_game(
                policy,
                &config.game,
                config.seed.wrapping_add(i),
                first_run_id + i,
                config.trace,
            )
        })
        .collect()
}

/// Drives a single game with a policy.
struct GameRunner<'a> {
    /// The engine.
    game: Game,
    /// Decision rule.
    policy: &'a dyn Policy,
    /// Randomness handed to the policy.
    policy_rng: SmallRng,
    /// Run identifier.
    run_id: u64,
    /// Original seed.
    seed: u64,
    /// Whether to keep step rows.
    trace: bool,
    /// Step rows so far (final score filled in at the end).
    steps: Vec<StepRecord>,
}

impl<'a> GameRunner<'a> {
    fn new(
        policy: &'a dyn Policy,
        config: &GameConfig,
        seed: u64,
        run_id: u64,
        trace: bool,
    ) -> Result<Self, SimulationError> {
        let (dice_rng, policy_rng) = game_rngs(seed);
        let game = Game::new(*config, dice_rng)?;
        Ok(Self {
            game,
            policy,
            policy_rng,
            run_id,
            seed,
            trace,
            steps: Vec::new(),
        })
    }

    /// Run the game to completion.
    fn run(mut self) -> Result<RunRecord, SimulationError> {
        while !self.game.is_over() {
            if !self.execute_turn()? {
                break;
            }
        }
        Ok(self.build_result())
    }

    /// Roll, ask the policy, apply. Returns false once play stops.
    fn execute_turn(&mut self) -> Result<bool, SimulationError> {
        let before = self.game.board();
        let roll = self.game.roll();
        let legal = self.game.available_moves(roll);

        // No legal move: the roll just ended the game.
        if self.game.is_over() {
            self.record_step(roll, before, &legal, None, true);
            return Ok(false);
        }

        let Some(chosen) = self
            .policy
            .choose(&before, roll, &legal, &mut self.policy_rng)
        else {
            self.record_step(roll, before, &legal, None, true);
            return Ok(false);
        };

        if !legal.contains(&chosen) {
            return Err(SimulationError::PolicyViolation {
                run_id: self.run_id,
                strategy: self.policy.name().to_string(),
                roll,
                chosen,
                legal,
            });
        }

        self.game
            .apply_move(chosen.tiles().iter().copied())
            .map_err(|rejection| SimulationError::EngineRejected {
                run_id: self.run_id,
                strategy: self.policy.name().to_string(),
                rejection,
            })?;

        let terminal = self.game.is_over();
        self.record_step(roll, before, &legal, Some(&chosen), terminal);
        Ok(true)
    }

    fn record_step(&mut self, roll: u8, before: Board, legal: &[Move], chosen: Option<&Move>, terminal: bool) {
        if !self.trace {
            return;
        }
        let after = self.game.board();
        self.steps.push(StepRecord {
            episode: self.run_id,
            step: u32::try_from(self.steps.len()).unwrap_or(u32::MAX),
            roll,
            tiles_before: before.signature(),
            legal_moves: join_moves(legal),
            chosen_move: chosen.map(ToString::to_string).unwrap_or_default(),
            tiles_after: after.signature(),
            remaining_sum_after: after.score(),
            terminal,
            final_score: 0,
        });
    }

    /// Build the final run record.
    fn build_result(mut self) -> RunRecord {
        let score = self.game.score();
        for step in &mut self.steps {
            step.final_score = score;
        }
        RunRecord {
            run_id: self.run_id,
            strategy: self.policy.name().to_string(),
            seed: self.seed,
            score,
            steps: self.steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{GreedyMinTiles, HumanLike, MinRemainingSum, RandomPolicy};
    use crate::game::MAX_TILES;

    /// Always asks for the highest tile, legal or not.
    struct Cheater;

    impl Policy for Cheater {
        fn name(&self) -> &str {
            "cheater"
        }

        fn choose(&self, board: &Board, _roll: u8, _legal: &[Move], _rng: &mut dyn RngCore) -> Option<Move> {
            Some(Move::new([board.tiles_max()]))
        }
    }

    /// Never moves.
    struct Passer;

    impl Policy for Passer {
        fn name(&self) -> &str {
            "passer"
        }

        fn choose(&self, _board: &Board, _roll: u8, _legal: &[Move], _rng: &mut dyn RngCore) -> Option<Move> {
            None
        }
    }

    fn traced(games: u64) -> SimulationConfig {
        SimulationConfig {
            games,
            seed: 17,
            trace: true,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_simulation_config_default() {
        let config = SimulationConfig::default();
        assert_eq!(config.games, 1000);
        assert_eq!(config.game.tiles_max, 9);
        assert!(!config.trace);
    }

    #[test]
    fn test_play_game_is_deterministic() {
        let config = GameConfig::default();
        let a = play_game(&RandomPolicy, &config, 42, 0, true).unwrap();
        let b = play_game(&RandomPolicy, &config, 42, 0, true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_trace_is_consistent() {
        let records = simulate(&HumanLike, &traced(50)).unwrap();
        for record in &records {
            let steps = &record.steps;
            assert!(!steps.is_empty());
            assert_eq!(steps[0].tiles_before, "123456789");

            let last = steps.last().unwrap();
            assert!(last.terminal);
            assert!(steps[..steps.len() - 1].iter().all(|s| !s.terminal));
            assert_eq!(last.remaining_sum_after, record.score);

            for (i, step) in steps.iter().enumerate() {
                assert_eq!(step.episode, record.run_id);
                assert_eq!(step.step as usize, i);
                assert_eq!(step.final_score, record.score);
                if i > 0 {
                    assert_eq!(step.tiles_before, steps[i - 1].tiles_after);
                }
                if step.chosen_move.is_empty() {
                    assert_eq!(step.tiles_before, step.tiles_after);
                } else {
                    let legal: Vec<&str> = step.legal_moves.split(';').collect();
                    assert!(legal.contains(&step.chosen_move.as_str()));
                }
            }
        }
    }

    #[test]
    fn test_untraced_runs_have_no_steps() {
        let records = simulate(&GreedyMinTiles, &SimulationConfig { games: 10, ..SimulationConfig::default() }).unwrap();
        assert_eq!(records.len(), 10);
        assert!(records.iter().all(|r| r.steps.is_empty()));
        assert!(records.iter().all(|r| r.score <= 45));
    }

    #[test]
    fn test_results_in_run_order() {
        let records = simulate(&RandomPolicy, &traced(64)).unwrap();
        let ids: Vec<u64> = records.iter().map(|r| r.run_id).collect();
        assert_eq!(ids, (0..64).collect::<Vec<_>>());
        assert!(records.iter().all(|r| r.seed == 17 + r.run_id));
    }

    #[test]
    fn test_policy_violation_is_fatal() {
        let result = simulate(&Cheater, &traced(20));
        assert!(matches!(
            result,
            Err(SimulationError::PolicyViolation { ref strategy, .. }) if strategy == "cheater"
        ));
    }

    #[test]
    fn test_passing_policy_stops_the_game() {
        let record = play_game(&Passer, &GameConfig::default(), 3, 0, true).unwrap();
        assert_eq!(record.score, 45);
        assert_eq!(record.steps.len(), 1);
        assert!(record.steps[0].terminal);
        assert!(record.steps[0].chosen_move.is_empty());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = traced(1);
        config.game.tiles_max = MAX_TILES + 1;
        assert!(matches!(
            simulate(&RandomPolicy, &config),
            Err(SimulationError::Config(ConfigError::TileCount(13)))
        ));
    }

    #[test]
    fn test_strategies_share_seeds() {
        let policies: Vec<Box<dyn Policy>> = vec![Box::new(MinRemainingSum), Box::new(HumanLike)];
        let config = SimulationConfig {
            games: 5,
            seed: 100,
            ..SimulationConfig::default()
        };
        let records = simulate_strategies(&policies, &config).unwrap();
        assert_eq!(records.len(), 10);
        assert_eq!(records.iter().map(|r| r.run_id).collect::<Vec<_>>(), (0..10).collect::<Vec<_>>());
        assert!(records[..5].iter().all(|r| r.strategy == "min-remaining"));
        assert!(records[5..].iter().all(|r| r.strategy == "human"));
        for i in 0..5 {
            assert_eq!(records[i].seed, records[i + 5].seed);
        }
    }

    #[test]
    fn test_error_display() {
        let err = SimulationError::PolicyViolation {
            run_id: 4,
            strategy: "cheater".to_string(),
            roll: 3,
            chosen: Move::new([9]),
            legal: vec![Move::new([1, 2]), Move::new([3])],
        };
        assert_eq!(
            format!("{err}"),
            "strategy cheater chose illegal move 9 for roll 3 in run 4 (legal: [1+2;3])"
        );
    }
}
