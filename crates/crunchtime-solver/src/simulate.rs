//! Discrete-event replay of a task sequence
//!
//! The simulator walks a candidate order one task at a time on a single
//! simulated clock. A task may run once every id in its `dependency_ids`
//! appears among the completed tasks; readiness is presence only, never a
//! date comparison.
//!
//! # Algorithm
//!
//! 1. Scan the remaining tasks in order; run each ready task immediately and
//!    keep scanning from the same position.
//! 2. If the pass ran at least one task, scan again.
//! 3. If a whole pass ran nothing, stop. Whatever is left (cycles, missing
//!    dependencies) is dropped from the result.
//!
//! Every productive pass removes a task, so there are at most n passes.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use crunchtime_core::time::advance_clock;
use crunchtime_core::{ProjectId, Score, SimulationResult, Task, TaskId, Workspace};

use crate::scoring::score_task_completion;

/// Replays a task sequence and reports its score and timing
pub trait Simulate {
    fn simulate(
        &self,
        workspace: &Workspace,
        sequence: &[Task],
        start: DateTime<Utc>,
    ) -> SimulationResult;
}

/// Single-worker simulator following the readiness rules above
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskSimulator;

impl TaskSimulator {
    pub fn new() -> Self {
        Self
    }
}

impl Simulate for TaskSimulator {
    fn simulate(
        &self,
        workspace: &Workspace,
        sequence: &[Task],
        start: DateTime<Utc>,
    ) -> SimulationResult {
        simulate_task_sequence(workspace, sequence, start)
    }
}

/// Mutable cursor of one simulation run
struct SimulationState {
    current_date: DateTime<Utc>,
    total_score: Score,
    completed_tasks: Vec<Task>,
    completed_ids: HashSet<TaskId>,
    project_finishes: BTreeMap<ProjectId, DateTime<Utc>>,
    finished_projects: HashSet<ProjectId>,
}

impl SimulationState {
    fn new(workspace: &Workspace, start: DateTime<Utc>) -> Self {
        let project_finishes = workspace
            .projects()
            .iter()
            .map(|project| {
                let deadline = project.deadline.unwrap_or(DateTime::<Utc>::MAX_UTC);
                (project.id.clone(), deadline)
            })
            .collect();

        Self {
            current_date: start,
            total_score: 0,
            completed_tasks: Vec::new(),
            completed_ids: HashSet::new(),
            project_finishes,
            finished_projects: HashSet::new(),
        }
    }

    fn can_start(&self, task: &Task) -> bool {
        task.dependency_ids
            .iter()
            .all(|dep| self.completed_ids.contains(dep))
    }

    fn process(&mut self, workspace: &Workspace, task: &Task) {
        let completion = advance_clock(task.duration, self.current_date).date;
        let project = workspace.project_of_task(task);

        self.current_date = completion;
        self.total_score += score_task_completion(task, completion, project);
        self.completed_tasks.push(task.completed_at(completion));
        self.completed_ids.insert(task.id.clone());

        tracing::trace!(task = %task.id, date = %completion, "task completed");

        if let Some(project) = project {
            if self.finished_projects.contains(&project.id) {
                return;
            }
            let done = workspace
                .project_task_ids(project)
                .into_iter()
                .all(|id| self.completed_ids.contains(id));
            if done {
                self.finished_projects.insert(project.id.clone());
                self.project_finishes.insert(project.id.clone(), completion);
            }
        }
    }

    fn finish(self) -> SimulationResult {
        SimulationResult {
            score: self.total_score,
            completed_tasks: self.completed_tasks,
            end_date: self.current_date,
            project_finishes: self.project_finishes,
        }
    }
}

/// Replay `sequence` starting at `start`.
///
/// Never fails: tasks whose dependencies can never be satisfied are left out
/// of `completed_tasks`.
pub fn simulate_task_sequence(
    workspace: &Workspace,
    sequence: &[Task],
    start: DateTime<Utc>,
) -> SimulationResult {
    let mut state = SimulationState::new(workspace, start);
    let mut remaining: Vec<&Task> = sequence.iter().collect();

    while !remaining.is_empty() {
        let mut processed = false;
        let mut i = 0;
        while i < remaining.len() {
            if state.can_start(remaining[i]) {
                let task = remaining.remove(i);
                state.process(workspace, task);
                processed = true;
            } else {
                i += 1;
            }
        }

        if !processed {
            let stuck: Vec<&str> = remaining.iter().map(|t| t.id.as_str()).collect();
            tracing::warn!(tasks = ?stuck, "No tasks could be processed; dropping unschedulable tasks");
            break;
        }
    }

    state.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crunchtime_core::{DeadlineType, Milestone, Project};
    use pretty_assertions::assert_eq;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn workspace(tasks: Vec<Task>) -> Workspace {
        Workspace::linked(
            vec![],
            vec![Project::new("p", "P").deadline(day(20), DeadlineType::Hard)],
            vec![Milestone::new("m", "M").project("p")],
            tasks,
        )
    }

    fn ids(result: &SimulationResult) -> Vec<&str> {
        result.completed_tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn runs_independent_tasks_in_order() {
        let tasks = vec![
            Task::new("a").duration(3.0).milestone("m"),
            Task::new("b").duration(6.0).milestone("m"),
        ];
        let ws = workspace(tasks.clone());
        let result = simulate_task_sequence(&ws, &tasks, start());

        assert_eq!(ids(&result), vec!["a", "b"]);
        assert_eq!(result.completed_tasks[0].completion_date, Some(day(2)));
        assert_eq!(result.completed_tasks[1].completion_date, Some(day(4)));
        assert_eq!(result.end_date, day(4));
    }

    #[test]
    fn dependency_pulled_forward_within_pass() {
        // b waits for a; a runs later in the same pass, b is picked up next pass
        let tasks = vec![
            Task::new("b").duration(3.0).milestone("m").depends_on("a"),
            Task::new("a").duration(3.0).milestone("m"),
            Task::new("c").duration(3.0).milestone("m"),
        ];
        let ws = workspace(tasks.clone());
        let result = simulate_task_sequence(&ws, &tasks, start());

        assert_eq!(ids(&result), vec!["a", "c", "b"]);
    }

    #[test]
    fn scanning_continues_after_removal() {
        // After a is removed, the next element must not be skipped
        let tasks = vec![
            Task::new("a").milestone("m"),
            Task::new("b").milestone("m").depends_on("a"),
            Task::new("c").milestone("m").depends_on("b"),
        ];
        let ws = workspace(tasks.clone());
        let result = simulate_task_sequence(&ws, &tasks, start());

        assert_eq!(ids(&result), vec!["a", "b", "c"]);
    }

    #[test]
    fn cycle_is_dropped_without_error() {
        let tasks = vec![
            Task::new("x").duration(3.0).milestone("m").depends_on("y"),
            Task::new("y").duration(3.0).milestone("m").depends_on("x"),
            Task::new("z").duration(3.0).milestone("m"),
        ];
        let ws = workspace(tasks.clone());
        let result = simulate_task_sequence(&ws, &tasks, start());

        assert_eq!(ids(&result), vec!["z"]);
        assert_eq!(result.dropped(&tasks), vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn dependency_outside_sequence_is_dropped() {
        let tasks = vec![Task::new("a").milestone("m").depends_on("ghost")];
        let ws = workspace(tasks.clone());
        let result = simulate_task_sequence(&ws, &tasks, start());

        assert!(result.completed_tasks.is_empty());
        assert_eq!(result.score, 0);
        assert_eq!(result.end_date, start());
    }

    #[test]
    fn empty_sequence() {
        let ws = workspace(vec![]);
        let result = simulate_task_sequence(&ws, &[], start());
        assert!(result.completed_tasks.is_empty());
        assert_eq!(result.end_date, start());
    }

    #[test]
    fn input_tasks_are_not_mutated() {
        let tasks = vec![Task::new("a").duration(3.0).milestone("m")];
        let ws = workspace(tasks.clone());
        let result = simulate_task_sequence(&ws, &tasks, start());

        assert!(tasks[0].completion_date.is_none());
        assert!(result.completed_tasks[0].completion_date.is_some());
    }

    #[test]
    fn score_accumulates_per_task() {
        // hard deadline met: 100 + 3*20 + 3*20 = 220 per task
        let tasks = vec![
            Task::new("a").duration(3.0).milestone("m"),
            Task::new("b").duration(3.0).milestone("m"),
        ];
        let ws = workspace(tasks.clone());
        let result = simulate_task_sequence(&ws, &tasks, start());
        assert_eq!(result.score, 440);
    }

    #[test]
    fn project_finish_recorded_when_last_task_completes() {
        let tasks = vec![
            Task::new("a").duration(3.0).milestone("m"),
            Task::new("b").duration(6.0).milestone("m"),
        ];
        let ws = workspace(tasks.clone());

        let partial = simulate_task_sequence(&ws, &tasks[..1], start());
        assert_eq!(partial.project_finishes["p"], day(20));

        let full = simulate_task_sequence(&ws, &tasks, start());
        assert_eq!(full.project_finishes["p"], day(4));
    }

    #[test]
    fn project_without_deadline_starts_far_future() {
        let ws = Workspace::linked(vec![], vec![Project::new("q", "Q")], vec![], vec![]);
        let result = simulate_task_sequence(&ws, &[], start());
        assert_eq!(result.project_finishes["q"], DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn trait_object_dispatch() {
        let tasks = vec![Task::new("a").duration(3.0).milestone("m")];
        let ws = workspace(tasks.clone());
        let simulator: &dyn Simulate = &TaskSimulator::new();
        let result = simulator.simulate(&ws, &tasks, start());
        assert_eq!(result.completed_tasks.len(), 1);
    }
}
