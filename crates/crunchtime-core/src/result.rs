//! Result types produced by simulation and optimization
//!
//! Field names serialize in camelCase so the JSON form matches what host
//! applications consume (`optimizedSequence`, `crunchInfo`, ...).

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ProjectId, Task, TaskId};

/// Schedule score.
///
/// Wide enough to sum per-task scores exactly: a task of a project without a
/// deadline scores ten times `i64::MAX`, and totals must still differ by the
/// deadline components of the other tasks.
pub type Score = i128;

// ============================================================================
// Simulation
// ============================================================================

/// Outcome of replaying one task sequence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    /// Sum of every completed task's score
    pub score: Score,
    /// Copies of the input tasks in realized completion order
    pub completed_tasks: Vec<Task>,
    /// Simulated clock after the last completed task
    pub end_date: DateTime<Utc>,
    /// Effective deadline per project: the project's own deadline (or the
    /// far-future sentinel) until every task of the project is completed,
    /// then the date that happened
    pub project_finishes: BTreeMap<ProjectId, DateTime<Utc>>,
}

impl SimulationResult {
    /// Position of each completed task id in `completed_tasks`
    pub fn completion_rank(&self) -> HashMap<&str, usize> {
        let mut rank = HashMap::with_capacity(self.completed_tasks.len());
        for (position, task) in self.completed_tasks.iter().enumerate() {
            rank.entry(task.id.as_str()).or_insert(position);
        }
        rank
    }

    /// Ids from `input` that never made it into `completed_tasks`
    pub fn dropped(&self, input: &[Task]) -> Vec<TaskId> {
        let rank = self.completion_rank();
        input
            .iter()
            .filter(|task| !rank.contains_key(task.id.as_str()))
            .map(|task| task.id.clone())
            .collect()
    }
}

// ============================================================================
// Optimization
// ============================================================================

/// Score and timing of the chosen schedule
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub score: Score,
    pub completed_tasks: Vec<Task>,
    pub end_date: DateTime<Utc>,
}

impl From<SimulationResult> for Statistics {
    fn from(result: SimulationResult) -> Self {
        Self {
            score: result.score,
            completed_tasks: result.completed_tasks,
            end_date: result.end_date,
        }
    }
}

/// Which project deadlines the chosen schedule misses
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineStatus {
    pub all_hard_deadlines_met: bool,
    pub all_soft_deadlines_met: bool,
    /// `"<project name>: <ISO-8601 deadline>"`
    pub missed_hard_deadlines: Vec<String>,
    /// `"<project name>: <ISO-8601 deadline>"`
    pub missed_soft_deadlines: Vec<String>,
}

impl DeadlineStatus {
    pub fn all_met(&self) -> bool {
        self.all_hard_deadlines_met && self.all_soft_deadlines_met
    }
}

/// Slack between each project's deadline and the simulated end date
///
/// Positive values are days to spare, negative values are days of overrun.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrunchInfo {
    pub earliest_crunch: i64,
    pub latest_crunch: i64,
    pub average_crunch: f64,
    pub crunch_by_project: BTreeMap<String, i64>,
}

/// Everything the optimizer hands back to its caller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    /// Recommended execution order
    pub optimized_sequence: Vec<Task>,
    pub statistics: Statistics,
    pub deadline_status: DeadlineStatus,
    pub crunch_info: CrunchInfo,
}

impl OptimizationResult {
    /// Canonical result for degenerate input: nothing scheduled, both
    /// deadline flags false, zeroed crunch.
    pub fn empty(at: DateTime<Utc>) -> Self {
        Self {
            optimized_sequence: Vec::new(),
            statistics: Statistics {
                score: 0,
                completed_tasks: Vec::new(),
                end_date: at,
            },
            deadline_status: DeadlineStatus {
                all_hard_deadlines_met: false,
                all_soft_deadlines_met: false,
                missed_hard_deadlines: Vec::new(),
                missed_soft_deadlines: Vec::new(),
            },
            crunch_info: CrunchInfo::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.optimized_sequence.is_empty() && self.statistics.completed_tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_result_shape() {
        let result = OptimizationResult::empty(date());
        assert!(result.is_empty());
        assert_eq!(result.statistics.score, 0);
        assert_eq!(result.statistics.end_date, date());
        assert!(!result.deadline_status.all_hard_deadlines_met);
        assert!(!result.deadline_status.all_soft_deadlines_met);
        assert_eq!(result.crunch_info, CrunchInfo::default());
    }

    #[test]
    fn empty_result_serializes_camel_case() {
        let value = serde_json::to_value(OptimizationResult::empty(date())).unwrap();
        assert!(value["optimizedSequence"].as_array().unwrap().is_empty());
        assert_eq!(value["statistics"]["score"], 0);
        assert_eq!(value["deadlineStatus"]["allHardDeadlinesMet"], false);
        assert_eq!(value["crunchInfo"]["averageCrunch"], 0.0);
        assert!(value["crunchInfo"]["crunchByProject"].as_object().unwrap().is_empty());
    }

    #[test]
    fn dropped_lists_missing_ids_in_input_order() {
        let result = SimulationResult {
            score: 0,
            completed_tasks: vec![Task::new("b").completed_at(date())],
            end_date: date(),
            project_finishes: BTreeMap::new(),
        };
        let input = vec![Task::new("a"), Task::new("b"), Task::new("c")];
        assert_eq!(result.dropped(&input), vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn completion_rank_positions() {
        let result = SimulationResult {
            score: 0,
            completed_tasks: vec![Task::new("x"), Task::new("y")],
            end_date: date(),
            project_finishes: BTreeMap::new(),
        };
        let rank = result.completion_rank();
        assert_eq!(rank["x"], 0);
        assert_eq!(rank["y"], 1);
    }
}
