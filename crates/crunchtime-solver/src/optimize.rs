//! Best-of-N strategy selection
//!
//! Every configured [`GroupingStrategy`] yields one candidate sequence, which
//! is simulated once. The highest score wins; on a tie the earlier strategy
//! keeps the lead. The winning candidate is then re-sorted into the order the
//! simulator actually completed it, with dropped tasks moved to the end.

use chrono::{DateTime, Utc};
use crunchtime_core::{Score, SimulationResult, Task, Workspace};

use crate::sequence::{generate_sequence, FirstRemaining, GroupingStrategy, TieBreaker};
use crate::simulate::{Simulate, TaskSimulator};

/// Optimizer settings
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
    /// Simulated "now" every candidate starts from
    pub start: DateTime<Utc>,
    /// Strategies to try, in tie-break order
    pub strategies: Vec<GroupingStrategy>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::starting_at(Utc::now())
    }
}

impl OptimizerConfig {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            strategies: GroupingStrategy::ALL.to_vec(),
        }
    }

    /// Restrict the strategies tried
    pub fn strategies(mut self, strategies: impl IntoIterator<Item = GroupingStrategy>) -> Self {
        self.strategies = strategies.into_iter().collect();
        self
    }
}

/// Outcome of simulating one strategy's candidate
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrategyTrial {
    pub strategy: GroupingStrategy,
    pub score: Score,
    /// Tasks the simulator completed
    pub completed: usize,
    /// Tasks the simulator had to drop
    pub dropped: usize,
}

/// The selected schedule and how it was chosen
#[derive(Clone, Debug)]
pub struct Optimization {
    pub strategy: GroupingStrategy,
    /// Winning candidate, re-sorted into realized completion order
    pub sequence: Vec<Task>,
    /// Simulation of the winning candidate
    pub simulation: SimulationResult,
    /// One entry per strategy tried, in trial order
    pub trials: Vec<StrategyTrial>,
}

/// Runs every strategy through a simulator and keeps the best
pub struct Optimizer<S = TaskSimulator, T = FirstRemaining> {
    config: OptimizerConfig,
    simulator: S,
    tie_breaker: T,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            config,
            simulator: TaskSimulator::new(),
            tie_breaker: FirstRemaining,
        }
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

impl<S: Simulate, T: TieBreaker> Optimizer<S, T> {
    /// Replace the simulator (e.g. with a scripted one in tests)
    pub fn with_simulator<S2: Simulate>(self, simulator: S2) -> Optimizer<S2, T> {
        Optimizer {
            config: self.config,
            simulator,
            tie_breaker: self.tie_breaker,
        }
    }

    /// Replace the tie-breaker used by the sequence generator
    pub fn with_tie_breaker<T2: TieBreaker>(self, tie_breaker: T2) -> Optimizer<S, T2> {
        Optimizer {
            config: self.config,
            simulator: self.simulator,
            tie_breaker,
        }
    }

    /// Pick the best strategy for the workspace's schedulable tasks.
    ///
    /// Returns `None` when there is nothing to schedule or no strategy is
    /// configured.
    pub fn optimize(&mut self, workspace: &Workspace) -> Option<Optimization> {
        let tasks = workspace.schedulable_tasks();
        if tasks.is_empty() {
            tracing::debug!("no schedulable tasks");
            return None;
        }

        let mut trials = Vec::with_capacity(self.config.strategies.len());
        let mut best: Option<(GroupingStrategy, Vec<Task>, SimulationResult)> = None;

        for &strategy in &self.config.strategies {
            let candidate = generate_sequence(workspace, &tasks, strategy, &mut self.tie_breaker);
            let result = self
                .simulator
                .simulate(workspace, &candidate, self.config.start);

            let trial = StrategyTrial {
                strategy,
                score: result.score,
                completed: result.completed_tasks.len(),
                dropped: candidate.len().saturating_sub(result.completed_tasks.len()),
            };
            tracing::debug!(
                strategy = %trial.strategy,
                score = %trial.score,
                completed = trial.completed,
                dropped = trial.dropped,
                "strategy simulated"
            );
            trials.push(trial);

            let improves = match &best {
                None => true,
                Some((_, _, incumbent)) => result.score > incumbent.score,
            };
            if improves {
                best = Some((strategy, candidate, result));
            }
        }

        let (strategy, mut sequence, simulation) = best?;
        sort_by_completion(&mut sequence, &simulation);

        tracing::info!(
            strategy = %strategy,
            score = %simulation.score,
            tasks = sequence.len(),
            "selected schedule"
        );

        Some(Optimization {
            strategy,
            sequence,
            simulation,
            trials,
        })
    }
}

/// Stable sort of `sequence` by each task's position in the simulation's
/// completed list; tasks the simulation dropped go last in input order.
pub fn sort_by_completion(sequence: &mut [Task], simulation: &SimulationResult) {
    let rank = simulation.completion_rank();
    sequence.sort_by_key(|task| rank.get(task.id.as_str()).copied().unwrap_or(usize::MAX));
}
