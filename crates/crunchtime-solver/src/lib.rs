//! # crunchtime-solver
//!
//! Heuristic task sequencing against project deadlines.
//!
//! This crate provides:
//! - Per-task completion scoring (hard deadline cliff, soft linear decay, ratings)
//! - A single-worker simulator that respects task dependencies
//! - Round-robin candidate generation under four grouping strategies
//! - Best-of-N strategy selection
//! - Deadline and crunch reporting for the selected schedule
//!
//! ## Example
//!
//! ```rust,ignore
//! use crunchtime_solver::run_optimization;
//!
//! let result = run_optimization(&projects, &goals, &milestones, &tasks);
//! for task in &result.optimized_sequence {
//!     println!("{}", task.name);
//! }
//! ```

pub mod optimize;
pub mod report;
pub mod scoring;
pub mod sequence;
pub mod simulate;

pub use optimize::{Optimization, Optimizer, OptimizerConfig, StrategyTrial};
pub use report::{calculate_crunch_info, check_deadline_status};
pub use scoring::score_task_completion;
pub use sequence::{generate_sequence, FirstRemaining, GroupingStrategy, RandomTieBreaker, TieBreaker};
pub use simulate::{simulate_task_sequence, Simulate, TaskSimulator};

use crunchtime_core::{Goal, Milestone, OptimizationResult, Project, Statistics, Task, Workspace};

/// Optimize flat entity lists starting now, with deterministic tie-breaking.
///
/// Owned-id sets (`project_ids`, `milestone_ids`, `task_ids`) are used in the
/// order given. When none are filled in they are rebuilt from the
/// back-references, so `goal_id`, `project_id` and `milestone_id` suffice.
pub fn run_optimization(
    projects: &[Project],
    goals: &[Goal],
    milestones: &[Milestone],
    tasks: &[Task],
) -> OptimizationResult {
    let workspace = Workspace::assemble(
        goals.to_vec(),
        projects.to_vec(),
        milestones.to_vec(),
        tasks.to_vec(),
    );
    run_optimization_with(
        &workspace,
        OptimizerConfig::default(),
        TaskSimulator::new(),
        FirstRemaining,
    )
}

/// Optimize a workspace with an explicit configuration, simulator and
/// tie-breaker.
///
/// Returns [`OptimizationResult::empty`] at the configured start when nothing
/// is schedulable.
pub fn run_optimization_with<S: Simulate, T: TieBreaker>(
    workspace: &Workspace,
    config: OptimizerConfig,
    simulator: S,
    tie_breaker: T,
) -> OptimizationResult {
    let start = config.start;
    let mut optimizer = Optimizer::new(config)
        .with_simulator(simulator)
        .with_tie_breaker(tie_breaker);

    let Some(optimization) = optimizer.optimize(workspace) else {
        tracing::info!("nothing to schedule");
        return OptimizationResult::empty(start);
    };

    let simulation = optimization.simulation;
    let deadline_status = check_deadline_status(&simulation.completed_tasks, workspace.projects());
    let crunch_info = calculate_crunch_info(workspace.projects(), simulation.end_date);

    if !deadline_status.all_met() {
        tracing::error!(
            hard = ?deadline_status.missed_hard_deadlines,
            soft = ?deadline_status.missed_soft_deadlines,
            "Some deadlines will be missed"
        );
    }

    OptimizationResult {
        optimized_sequence: optimization.sequence,
        statistics: Statistics::from(simulation),
        deadline_status,
        crunch_info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crunchtime_core::DeadlineType;

    #[test]
    fn empty_input_gives_canonical_empty_result() {
        let result = run_optimization(&[], &[], &[], &[]);
        assert!(result.is_empty());
        assert!(!result.deadline_status.all_hard_deadlines_met);
        assert!(!result.deadline_status.all_soft_deadlines_met);
        assert_eq!(result.statistics.score, 0);
    }

    #[test]
    fn empty_result_uses_configured_start() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let result = run_optimization_with(
            &Workspace::default(),
            OptimizerConfig::starting_at(start),
            TaskSimulator::new(),
            FirstRemaining,
        );
        assert_eq!(result, OptimizationResult::empty(start));
    }

    #[test]
    fn orphan_tasks_are_not_scheduled() {
        let result = run_optimization(&[], &[], &[], &[Task::new("loose").duration(3.0)]);
        assert!(result.optimized_sequence.is_empty());
    }

    #[test]
    fn links_flat_inputs() {
        let deadline = Utc::now() + chrono::Duration::days(365);
        let projects = vec![Project::new("p", "P").deadline(deadline, DeadlineType::Hard)];
        let milestones = vec![Milestone::new("m", "M").project("p")];
        let tasks = vec![Task::new("t").duration(3.0).milestone("m")];

        let result = run_optimization(&projects, &[], &milestones, &tasks);
        assert_eq!(result.optimized_sequence.len(), 1);
        assert_eq!(result.statistics.completed_tasks.len(), 1);
        assert!(result.deadline_status.all_hard_deadlines_met);
    }

    #[test]
    fn follows_supplied_milestone_order() {
        let mut project = Project::new("p", "P");
        project.milestone_ids = vec!["m2".into(), "m1".into()];
        let mut m1 = Milestone::new("m1", "M1").project("p");
        m1.task_ids = vec!["t1".into()];
        let mut m2 = Milestone::new("m2", "M2").project("p");
        m2.task_ids = vec!["t2".into()];
        let tasks = vec![
            Task::new("t1").duration(3.0).milestone("m1"),
            Task::new("t2").duration(3.0).milestone("m2"),
        ];

        let result = run_optimization(&[project], &[], &[m1, m2], &tasks);
        let ids: Vec<&str> = result.optimized_sequence.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t1"]);
    }
}
