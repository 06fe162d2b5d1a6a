//! Plain-text report for terminals

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use crunchtime_core::{OptimizationResult, RenderError, Renderer, Workspace};

/// Human-readable summary of an optimization result
#[derive(Clone, Debug)]
pub struct TextRenderer {
    /// Whether to include the per-project crunch table
    pub show_crunch: bool,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self { show_crunch: true }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave out the crunch table
    pub fn no_crunch(mut self) -> Self {
        self.show_crunch = false;
        self
    }
}

fn day(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn deadline_line(label: &str, met: bool, missed: &[String]) -> String {
    if met {
        format!("  {:<5} all met\n", label)
    } else {
        format!("  {:<5} missed {}\n", label, missed.join(", "))
    }
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(
        &self,
        workspace: &Workspace,
        result: &OptimizationResult,
    ) -> Result<String, RenderError> {
        if result.is_empty() {
            return Ok("Nothing to schedule.\n".into());
        }

        let stats = &result.statistics;
        let completed: HashMap<&str, DateTime<Utc>> = stats
            .completed_tasks
            .iter()
            .filter_map(|t| t.completion_date.map(|d| (t.id.as_str(), d)))
            .collect();

        let mut output = String::new();
        output.push_str("Optimized schedule\n");
        output.push_str("==================\n");
        output.push_str(&format!("Score:     {}\n", stats.score));
        output.push_str(&format!("Finishes:  {}\n", day(stats.end_date)));
        output.push_str(&format!(
            "Completed: {} of {} tasks\n\n",
            stats.completed_tasks.len(),
            result.optimized_sequence.len()
        ));

        output.push_str("Sequence\n");
        let name_width = result
            .optimized_sequence
            .iter()
            .map(|t| t.name.chars().count())
            .max()
            .unwrap_or(0);
        let mut position = 0;
        for task in &result.optimized_sequence {
            let project = workspace
                .project_of_task(task)
                .map_or("-", |p| p.name.as_str());
            match completed.get(task.id.as_str()) {
                Some(done) => {
                    position += 1;
                    output.push_str(&format!(
                        "  {:>3}. {}  {:<width$}  [{}]\n",
                        position,
                        day(*done),
                        task.name,
                        project,
                        width = name_width
                    ));
                }
                None => output.push_str(&format!(
                    "     - {:<10}  {:<width$}  [{}]\n",
                    "blocked",
                    task.name,
                    project,
                    width = name_width
                )),
            }
        }

        let status = &result.deadline_status;
        output.push_str("\nDeadlines\n");
        output.push_str(&deadline_line(
            "Hard:",
            status.all_hard_deadlines_met,
            &status.missed_hard_deadlines,
        ));
        output.push_str(&deadline_line(
            "Soft:",
            status.all_soft_deadlines_met,
            &status.missed_soft_deadlines,
        ));

        let crunch = &result.crunch_info;
        if self.show_crunch && !crunch.crunch_by_project.is_empty() {
            output.push_str("\nCrunch (days between finish and deadline)\n");
            let width = crunch
                .crunch_by_project
                .keys()
                .map(|k| k.chars().count())
                .max()
                .unwrap_or(0);
            for (project, days) in &crunch.crunch_by_project {
                output.push_str(&format!("  {:<width$}  {:>5}\n", project, days, width = width));
            }
            output.push_str(&format!(
                "  earliest {}, latest {}, average {:.1}\n",
                crunch.earliest_crunch, crunch.latest_crunch, crunch.average_crunch
            ));
        }

        Ok(output)
    }
}
