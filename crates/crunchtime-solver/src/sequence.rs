//! Candidate sequence generation by round-robin interleaving
//!
//! Each [`GroupingStrategy`] partitions tasks by one relationship (goal,
//! project, milestone, or project deadline). The generator then cycles over
//! the groups, taking one task per step, so parallel initiatives advance
//! together instead of one group finishing before the next is touched.
//!
//! Which task is taken from a group is decided by a [`TieBreaker`]. The
//! default, [`FirstRemaining`], takes the earliest task in input order.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crunchtime_core::time::iso_timestamp;
use crunchtime_core::{Task, Workspace};

/// Value that places a task in a group
pub type GroupKey = String;

/// How tasks are partitioned before interleaving
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupingStrategy {
    /// Owning goal of the task's project
    ByGoal,
    /// Owning project
    ByProject,
    /// Owning milestone
    ByMilestone,
    /// The owning project's deadline; earlier deadlines are visited first
    ByDeadline,
}

impl GroupingStrategy {
    /// Every strategy, in the order the optimizer tries them
    pub const ALL: [GroupingStrategy; 4] = [
        GroupingStrategy::ByGoal,
        GroupingStrategy::ByProject,
        GroupingStrategy::ByMilestone,
        GroupingStrategy::ByDeadline,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GroupingStrategy::ByGoal => "goals",
            GroupingStrategy::ByProject => "projects",
            GroupingStrategy::ByMilestone => "milestones",
            GroupingStrategy::ByDeadline => "deadlines",
        }
    }

    /// Group key of a task, or `None` if the relationship is absent
    pub fn key(&self, workspace: &Workspace, task: &Task) -> Option<GroupKey> {
        match self {
            GroupingStrategy::ByGoal => workspace
                .project_of_task(task)
                .and_then(|project| project.goal_id.clone()),
            GroupingStrategy::ByProject => workspace
                .project_of_task(task)
                .map(|project| project.id.clone()),
            GroupingStrategy::ByMilestone => task.milestone_id.clone(),
            GroupingStrategy::ByDeadline => workspace
                .project_of_task(task)
                .and_then(|project| project.deadline)
                .map(iso_timestamp),
        }
    }

    /// Distinct keys present among `tasks`, in visiting order
    pub fn groups(&self, workspace: &Workspace, tasks: &[Task]) -> Vec<GroupKey> {
        let mut groups: Vec<GroupKey> = Vec::new();
        for key in tasks.iter().filter_map(|task| self.key(workspace, task)) {
            if !groups.contains(&key) {
                groups.push(key);
            }
        }
        if *self == GroupingStrategy::ByDeadline {
            // ISO-8601 strings sort chronologically
            groups.sort();
        }
        groups
    }
}

impl std::fmt::Display for GroupingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for GroupingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupingStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s || strategy.name().trim_end_matches('s') == s)
            .ok_or_else(|| format!("unknown strategy '{}' (expected goals, projects, milestones or deadlines)", s))
    }
}

// ============================================================================
// Tie-breaking
// ============================================================================

/// Chooses among several tasks of the same group
pub trait TieBreaker {
    /// Index in `0..candidates` of the task to take; `candidates` is never zero
    fn pick(&mut self, candidates: usize) -> usize;
}

/// Always takes the earliest remaining task of the group
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstRemaining;

impl TieBreaker for FirstRemaining {
    fn pick(&mut self, _candidates: usize) -> usize {
        0
    }
}

/// Picks uniformly at random from an injected generator
#[derive(Clone, Debug)]
pub struct RandomTieBreaker<R> {
    rng: R,
}

impl<R: Rng> RandomTieBreaker<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomTieBreaker<ChaCha8Rng> {
    /// Reproducible generator for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> TieBreaker for RandomTieBreaker<R> {
    fn pick(&mut self, candidates: usize) -> usize {
        self.rng.gen_range(0..candidates)
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Produce one candidate order of `tasks` by cycling over the strategy's groups.
///
/// Each step starts at the current group, takes one task from the first group
/// (wrapping) that still has work, and moves the start one group forward.
/// When no group has work left but tasks remain (tasks without a key), the
/// earliest remaining task is taken so the loop always progresses.
pub fn generate_sequence<T: TieBreaker + ?Sized>(
    workspace: &Workspace,
    tasks: &[Task],
    strategy: GroupingStrategy,
    tie_breaker: &mut T,
) -> Vec<Task> {
    let groups = strategy.groups(workspace, tasks);
    let keys: Vec<Option<GroupKey>> = tasks
        .iter()
        .map(|task| strategy.key(workspace, task))
        .collect();

    let mut remaining: Vec<usize> = (0..tasks.len()).collect();
    let mut sequence = Vec::with_capacity(tasks.len());
    let mut current = 0;

    while !remaining.is_empty() {
        let mut chosen = None;

        for offset in 0..groups.len() {
            let group = &groups[(current + offset) % groups.len()];
            let candidates: Vec<usize> = remaining
                .iter()
                .enumerate()
                .filter(|(_, index)| keys[**index].as_ref() == Some(group))
                .map(|(position, _)| position)
                .collect();

            if !candidates.is_empty() {
                let pick = tie_breaker.pick(candidates.len()).min(candidates.len() - 1);
                chosen = Some(candidates[pick]);
                break;
            }
        }

        let index = remaining.remove(chosen.unwrap_or(0));
        sequence.push(tasks[index].clone());

        if !groups.is_empty() {
            current = (current + 1) % groups.len();
        }
    }

    sequence
}
