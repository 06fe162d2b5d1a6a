//! Post-hoc deadline and crunch analysis of a simulation
//!
//! Both reports are pure functions of the simulation output and the project
//! list; neither feeds back into scheduling.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use crunchtime_core::time::{clamp_crunch, days_until_deadline, iso_timestamp};
use crunchtime_core::{CrunchInfo, DeadlineStatus, Project, Task};

/// Latest completion timestamp among the completed tasks of `project`
pub fn last_completion(project: &Project, completed: &[Task]) -> Option<DateTime<Utc>> {
    completed
        .iter()
        .filter(|task| {
            task.milestone_id
                .as_ref()
                .is_some_and(|id| project.milestone_ids.contains(id))
        })
        .filter_map(|task| task.completion_date)
        .max()
}

/// Projects whose last completed task lands after their deadline.
///
/// Projects without a deadline, or without any completed task, never miss.
/// A missing deadline type counts as soft.
pub fn check_deadline_status(completed: &[Task], projects: &[Project]) -> DeadlineStatus {
    let mut missed_hard = Vec::new();
    let mut missed_soft = Vec::new();

    for project in projects {
        let Some(deadline) = project.deadline else {
            continue;
        };
        let Some(finished) = last_completion(project, completed) else {
            continue;
        };
        if finished <= deadline {
            continue;
        }

        let entry = format!("{}: {}", project.name, iso_timestamp(deadline));
        if project.is_hard_deadline() {
            missed_hard.push(entry);
        } else {
            missed_soft.push(entry);
        }
    }

    DeadlineStatus {
        all_hard_deadlines_met: missed_hard.is_empty(),
        all_soft_deadlines_met: missed_soft.is_empty(),
        missed_hard_deadlines: missed_hard,
        missed_soft_deadlines: missed_soft,
    }
}

/// Days of slack between each deadline and the overall `end_date`.
///
/// Values are clamped to ±3650 days. Projects without a deadline are left
/// out entirely; if none has one, everything is zero.
pub fn calculate_crunch_info(projects: &[Project], end_date: DateTime<Utc>) -> CrunchInfo {
    let mut crunch_by_project = BTreeMap::new();
    let mut total: i64 = 0;
    let mut counted: usize = 0;

    for project in projects.iter().filter(|p| p.deadline.is_some()) {
        let crunch = clamp_crunch(days_until_deadline(project.deadline, end_date));
        crunch_by_project.insert(project.name.clone(), crunch);
        total += crunch;
        counted += 1;
    }

    if counted == 0 {
        return CrunchInfo::default();
    }

    CrunchInfo {
        earliest_crunch: crunch_by_project.values().copied().min().unwrap_or(0),
        latest_crunch: crunch_by_project.values().copied().max().unwrap_or(0),
        average_crunch: total as f64 / counted as f64,
        crunch_by_project,
    }
}
