//! MermaidJS Gantt chart renderer
//!
//! Draws the completed part of a schedule as a Gantt chart, one section per
//! project, suitable for embedding in Markdown.
//!
//! ## Example Output
//!
//! ```text
//! gantt
//!     title Crunchtime schedule
//!     dateFormat YYYY-MM-DD
//!
//!     section Website
//!     Mockups          :active, mockups, 2024-01-01, 2d
//!     Review           :milestone, review, 2024-01-03, 0d
//!
//!     section Book
//!     Outline          :crit, outline, 2024-01-03, 3d
//! ```

use chrono::{DateTime, TimeDelta, Utc};
use crunchtime_core::time::USABLE_HOURS_PER_DAY;
use crunchtime_core::{OptimizationResult, RenderError, Renderer, Task, Workspace};

/// Section used for completed tasks that have no owning project
const UNASSIGNED_SECTION: &str = "Unassigned";

/// MermaidJS Gantt chart renderer
#[derive(Clone, Debug)]
pub struct MermaidRenderer {
    /// Chart title
    pub title: String,
    /// Whether to group tasks into one section per project
    pub show_sections: bool,
    /// Whether to mark tasks finishing after a hard deadline as `crit`
    pub mark_missed_deadlines: bool,
    /// Whether to mark in-flight tasks as `active`
    pub show_in_flight: bool,
}

impl Default for MermaidRenderer {
    fn default() -> Self {
        Self {
            title: "Crunchtime schedule".into(),
            show_sections: true,
            mark_missed_deadlines: true,
            show_in_flight: true,
        }
    }
}

impl MermaidRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Disable per-project sections
    pub fn no_sections(mut self) -> Self {
        self.show_sections = false;
        self
    }

    /// Disable `crit` marking of late tasks
    pub fn no_deadline_marks(mut self) -> Self {
        self.mark_missed_deadlines = false;
        self
    }

    /// Sanitize a name for Mermaid (colons and semicolons end a task name)
    fn sanitize_name(name: &str) -> String {
        name.replace([':', ';'], "-")
            .replace('#', "")
            .replace('\n', " ")
            .replace('\r', "")
    }

    /// Mermaid ids must be alphanumeric with underscores
    fn make_id(task_id: &str) -> String {
        task_id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
            .collect()
    }

    fn modifiers(&self, workspace: &Workspace, task: &Task, days: i64) -> Vec<&'static str> {
        let mut mods = Vec::new();
        if days == 0 {
            mods.push("milestone");
        }
        if self.mark_missed_deadlines {
            let project = workspace.project_of_task(task);
            let late = project
                .filter(|p| p.is_hard_deadline())
                .and_then(|p| p.deadline)
                .zip(task.completion_date)
                .is_some_and(|(deadline, done)| done > deadline);
            if late {
                mods.push("crit");
            }
        }
        if self.show_in_flight && task.is_in_flight() {
            mods.push("active");
        }
        mods
    }

    fn format_task_line(&self, workspace: &Workspace, bar: &Bar<'_>) -> String {
        let mut parts: Vec<String> = self
            .modifiers(workspace, bar.task, bar.days)
            .into_iter()
            .map(String::from)
            .collect();
        parts.push(Self::make_id(&bar.task.id));
        parts.push(bar.start.format("%Y-%m-%d").to_string());
        parts.push(format!("{}d", bar.days));

        format!("{} :{}", Self::sanitize_name(&bar.task.name), parts.join(", "))
    }
}

/// One completed task placed on the calendar
struct Bar<'a> {
    task: &'a Task,
    start: DateTime<Utc>,
    days: i64,
}

/// Each task runs from the previous completion to its own; the first one
/// starts its whole effort days before completing.
fn layout(completed: &[Task]) -> Vec<Bar<'_>> {
    let mut bars = Vec::with_capacity(completed.len());
    let mut previous: Option<DateTime<Utc>> = None;

    for task in completed {
        let Some(done) = task.completion_date else {
            continue;
        };
        let start = previous.unwrap_or_else(|| {
            let whole_days = (task.duration / USABLE_HOURS_PER_DAY).floor() as i64;
            TimeDelta::try_days(whole_days)
                .and_then(|delta| done.checked_sub_signed(delta))
                .unwrap_or(done)
        });
        let days = (done.date_naive() - start.date_naive()).num_days().max(0);
        bars.push(Bar { task, start, days });
        previous = Some(done);
    }
    bars
}

impl Renderer for MermaidRenderer {
    type Output = String;

    fn render(
        &self,
        workspace: &Workspace,
        result: &OptimizationResult,
    ) -> Result<String, RenderError> {
        let bars = layout(&result.statistics.completed_tasks);
        if bars.is_empty() {
            return Err(RenderError::InvalidData("No completed tasks to render".into()));
        }

        let mut output = String::new();
        output.push_str("gantt\n");
        output.push_str(&format!("    title {}\n", Self::sanitize_name(&self.title)));
        output.push_str("    dateFormat YYYY-MM-DD\n\n");

        if !self.show_sections {
            for bar in &bars {
                output.push_str(&format!("    {}\n", self.format_task_line(workspace, bar)));
            }
            return Ok(output);
        }

        // One section per project id in order of first completion; orphans share one
        let mut sections: Vec<(Option<&str>, &str, Vec<&Bar<'_>>)> = Vec::new();
        for bar in &bars {
            let project = workspace.project_of_task(bar.task);
            let id = project.map(|p| p.id.as_str());
            match sections.iter_mut().find(|(section, _, _)| *section == id) {
                Some((_, _, members)) => members.push(bar),
                None => {
                    let name = project.map_or(UNASSIGNED_SECTION, |p| p.name.as_str());
                    sections.push((id, name, vec![bar]));
                }
            }
        }

        for (_, name, members) in sections {
            output.push_str(&format!("    section {}\n", Self::sanitize_name(&name)));
            for bar in members {
                output.push_str(&format!("    {}\n", self.format_task_line(workspace, bar)));
            }
            output.push('\n');
        }

        Ok(output)
    }
}
