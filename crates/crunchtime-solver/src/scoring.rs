//! Desirability score for completing one task on a given date
//!
//! score = deadline component + 20 × excitement + 20 × viability (+ 50 if in-flight)
//!
//! The deadline component depends on the owning project's policy:
//!
//! | Deadline | Component |
//! |----------|-----------|
//! | hard, met (days ≥ 0) | +100 |
//! | hard, missed | −1000 |
//! | soft or untyped | max(−100, 10 × days) |
//!
//! A project without a deadline reports "infinite" days ([`NO_DEADLINE_DAYS`]),
//! so its soft component is ten times that. Scores are [`Score`] (`i128`), so
//! this never overflows and sums stay exact in any order. A hard project
//! without a date never misses.
//!
//! [`NO_DEADLINE_DAYS`]: crunchtime_core::time::NO_DEADLINE_DAYS

use chrono::{DateTime, Utc};
use crunchtime_core::time::days_until_deadline;
use crunchtime_core::{DeadlineType, Project, Score, Task};

pub const HARD_DEADLINE_MET: Score = 100;
pub const HARD_DEADLINE_MISSED: Score = -1000;
pub const SOFT_DAY_WEIGHT: Score = 10;
pub const SOFT_PENALTY_FLOOR: Score = -100;
pub const RATING_WEIGHT: Score = 20;
pub const IN_FLIGHT_BONUS: Score = 50;

/// Deadline part of the score for finishing work of `project` on `completion`
pub fn deadline_component(project: &Project, completion: DateTime<Utc>) -> Score {
    let days = Score::from(days_until_deadline(project.deadline, completion));
    match project.deadline_type {
        Some(DeadlineType::Hard) => {
            if days >= 0 {
                HARD_DEADLINE_MET
            } else {
                HARD_DEADLINE_MISSED
            }
        }
        _ => (days * SOFT_DAY_WEIGHT).max(SOFT_PENALTY_FLOOR),
    }
}

/// Score for completing `task` on `completion`.
///
/// Orphaned tasks (`project` is `None`) always score zero.
pub fn score_task_completion(
    task: &Task,
    completion: DateTime<Utc>,
    project: Option<&Project>,
) -> Score {
    let Some(project) = project else {
        return 0;
    };

    let ratings =
        Score::from(project.excitement.value() + project.viability.value()) * RATING_WEIGHT;
    let bonus = if task.is_in_flight() { IN_FLIGHT_BONUS } else { 0 };

    deadline_component(project, completion) + ratings + bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use crunchtime_core::{Rating, Status};

    fn deadline() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap()
    }

    fn rated(project: Project, excitement: i64, viability: i64) -> Project {
        project
            .excitement(Rating::try_from(excitement).unwrap())
            .viability(Rating::try_from(viability).unwrap())
    }

    #[test]
    fn orphaned_task_scores_zero() {
        let task = Task::new("t").status(Status::InFlight);
        assert_eq!(score_task_completion(&task, deadline(), None), 0);
    }

    #[test]
    fn hard_deadline_cliff() {
        let project = Project::new("p", "P").deadline(deadline(), DeadlineType::Hard);

        let day_before = deadline() - Duration::days(1);
        let day_after = deadline() + Duration::days(1);

        assert_eq!(deadline_component(&project, day_before), 100);
        assert_eq!(deadline_component(&project, deadline()), 100);
        assert_eq!(deadline_component(&project, day_after), -1000);
    }

    #[test]
    fn hard_deadline_margin_does_not_matter() {
        let project = Project::new("p", "P").deadline(deadline(), DeadlineType::Hard);
        let early = deadline() - Duration::days(90);
        let very_late = deadline() + Duration::days(400);
        assert_eq!(deadline_component(&project, early), 100);
        assert_eq!(deadline_component(&project, very_late), -1000);
    }

    #[test]
    fn soft_deadline_is_linear_with_floor() {
        let project = Project::new("p", "P").deadline(deadline(), DeadlineType::Soft);

        assert_eq!(deadline_component(&project, deadline() - Duration::days(4)), 40);
        assert_eq!(deadline_component(&project, deadline()), 0);
        assert_eq!(deadline_component(&project, deadline() + Duration::days(3)), -30);
        assert_eq!(deadline_component(&project, deadline() + Duration::days(30)), -100);
    }

    #[test]
    fn untyped_deadline_scores_like_soft() {
        let mut project = Project::new("p", "P").deadline(deadline(), DeadlineType::Soft);
        project.deadline_type = None;
        assert_eq!(deadline_component(&project, deadline() - Duration::days(2)), 20);
    }

    #[test]
    fn missing_deadline_is_ten_times_the_sentinel() {
        let project = Project::new("p", "P");
        let sentinel = Score::from(i64::MAX) * 10;
        assert_eq!(deadline_component(&project, deadline()), sentinel);

        let task = Task::new("t").status(Status::InFlight);
        // sentinel + 60 + 60 + 50
        assert_eq!(
            score_task_completion(&task, deadline(), Some(&project)),
            sentinel + 170
        );
    }

    #[test]
    fn hard_type_without_date_is_met() {
        let mut project = Project::new("p", "P");
        project.deadline_type = Some(DeadlineType::Hard);
        assert_eq!(deadline_component(&project, deadline()), HARD_DEADLINE_MET);
        assert_eq!(
            score_task_completion(&Task::new("t"), deadline(), Some(&project)),
            220
        );
    }

    #[test]
    fn totals_with_undated_projects_keep_deadline_gaps() {
        let undated = Project::new("n", "Someday");
        let urgent = Project::new("u", "Urgent").deadline(deadline(), DeadlineType::Hard);
        let task = Task::new("t");
        let late = deadline() + Duration::days(1);

        // Two undated tasks around one urgent task, summed in either order
        let met = [
            score_task_completion(&task, deadline(), Some(&undated)),
            score_task_completion(&task, deadline(), Some(&urgent)),
            score_task_completion(&task, late, Some(&undated)),
        ];
        let missed = [
            score_task_completion(&task, deadline(), Some(&undated)),
            score_task_completion(&task, late, Some(&urgent)),
            score_task_completion(&task, late, Some(&undated)),
        ];
        let forward: Score = met.iter().sum();
        let backward: Score = met.iter().rev().sum();
        assert_eq!(forward, backward);
        assert_eq!(forward - missed.iter().sum::<Score>(), 1100);
    }

    #[test]
    fn ratings_add_twenty_per_level() {
        let project = rated(
            Project::new("p", "P").deadline(deadline(), DeadlineType::Hard),
            4,
            3,
        );
        let task = Task::new("t");
        // 100 + 80 + 60
        assert_eq!(score_task_completion(&task, deadline(), Some(&project)), 240);
    }

    #[test]
    fn in_flight_scores_exactly_fifty_more() {
        let project = rated(
            Project::new("p", "P").deadline(deadline(), DeadlineType::Soft),
            2,
            5,
        );
        let completion = deadline() - Duration::days(7);
        let planned = Task::new("t").status(Status::Planned);
        let in_flight = Task::new("t").status(Status::InFlight);

        let base = score_task_completion(&planned, completion, Some(&project));
        let boosted = score_task_completion(&in_flight, completion, Some(&project));
        assert_eq!(boosted - base, 50);
    }
}
