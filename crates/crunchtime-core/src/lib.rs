//! # crunchtime-core
//!
//! Core domain model for the crunchtime sequencing engine.
//!
//! This crate provides:
//! - Domain types: `Goal`, `Project`, `Milestone`, `Task`
//! - An id-indexed [`Workspace`] for relationship traversal
//! - Calendar arithmetic for effort units and deadlines ([`time`])
//! - Result types shared by the solver and renderers ([`result`])
//! - Error types and the `Renderer` trait
//!
//! ## Example
//!
//! ```rust
//! use crunchtime_core::{DeadlineType, Milestone, Project, Task, Workspace};
//! use chrono::{TimeZone, Utc};
//!
//! let project = Project::new("site", "Website")
//!     .deadline(Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap(), DeadlineType::Hard);
//! let milestone = Milestone::new("design", "Design").project("site");
//! let tasks = vec![
//!     Task::new("mood").duration(4.0).milestone("design"),
//!     Task::new("mockup").duration(8.0).milestone("design").depends_on("mood"),
//! ];
//!
//! let workspace = Workspace::linked(vec![], vec![project], vec![milestone], tasks);
//! assert_eq!(workspace.schedulable_tasks().len(), 2);
//! ```

pub mod result;
pub mod time;
pub mod workspace;

pub use result::{
    CrunchInfo, DeadlineStatus, OptimizationResult, Score, SimulationResult, Statistics,
};
pub use workspace::Workspace;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for a goal
pub type GoalId = String;

/// Unique identifier for a project
pub type ProjectId = String;

/// Unique identifier for a milestone
pub type MilestoneId = String;

/// Unique identifier for a task
pub type TaskId = String;

// ============================================================================
// Enumerations
// ============================================================================

/// Lifecycle stage shared by every entity kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Raw,
    #[default]
    Backlog,
    Planned,
    InFlight,
    Complete,
    Archived,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Raw,
        Status::Backlog,
        Status::Planned,
        Status::InFlight,
        Status::Complete,
        Status::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Raw => "raw",
            Status::Backlog => "backlog",
            Status::Planned => "planned",
            Status::InFlight => "in-flight",
            Status::Complete => "complete",
            Status::Archived => "archived",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ModelError::UnknownStatus(s.to_string()))
    }
}

/// How lateness against a project deadline is penalised
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineType {
    /// Missing the deadline costs a fixed, severe penalty
    Hard,
    /// Reward and penalty scale with days early or late
    Soft,
}

impl std::fmt::Display for DeadlineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeadlineType::Hard => write!(f, "hard"),
            DeadlineType::Soft => write!(f, "soft"),
        }
    }
}

impl std::str::FromStr for DeadlineType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hard" => Ok(DeadlineType::Hard),
            "soft" => Ok(DeadlineType::Soft),
            other => Err(ModelError::UnknownDeadlineType(other.to_string())),
        }
    }
}

/// Five-level rating used for project excitement and viability
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    pub fn value(self) -> i64 {
        i64::from(self.0)
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<i64> for Rating {
    type Error = ModelError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ModelError::RatingOutOfRange(value))
        }
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

// ============================================================================
// Goal
// ============================================================================

/// Top-level aspiration grouping related projects
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    pub name: String,
    pub status: Status,
    /// Projects owned by this goal (order is not significant)
    pub project_ids: Vec<ProjectId>,
}

impl Goal {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: Status::default(),
            project_ids: Vec::new(),
        }
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}

// ============================================================================
// Project
// ============================================================================

/// A deliverable with an optional deadline and desirability ratings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub status: Status,
    pub deadline: Option<DateTime<Utc>>,
    /// `None` with a deadline set is scored like a soft deadline
    pub deadline_type: Option<DeadlineType>,
    pub excitement: Rating,
    pub viability: Rating,
    pub goal_id: Option<GoalId>,
    pub milestone_ids: Vec<MilestoneId>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: Status::default(),
            deadline: None,
            deadline_type: None,
            excitement: Rating::default(),
            viability: Rating::default(),
            goal_id: None,
            milestone_ids: Vec::new(),
        }
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn deadline(mut self, deadline: DateTime<Utc>, kind: DeadlineType) -> Self {
        self.deadline = Some(deadline);
        self.deadline_type = Some(kind);
        self
    }

    pub fn excitement(mut self, rating: Rating) -> Self {
        self.excitement = rating;
        self
    }

    pub fn viability(mut self, rating: Rating) -> Self {
        self.viability = rating;
        self
    }

    pub fn goal(mut self, goal_id: impl Into<String>) -> Self {
        self.goal_id = Some(goal_id.into());
        self
    }

    pub fn is_hard_deadline(&self) -> bool {
        self.deadline.is_some() && self.deadline_type == Some(DeadlineType::Hard)
    }
}

// ============================================================================
// Milestone
// ============================================================================

/// A checkpoint inside a project that owns tasks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: MilestoneId,
    pub name: String,
    pub status: Status,
    /// Orphaned milestones (no project) are never scheduled
    pub project_id: Option<ProjectId>,
    /// Advisory only: the simulator does not gate on milestone dependencies
    pub dependency_ids: Vec<MilestoneId>,
    pub task_ids: Vec<TaskId>,
}

impl Milestone {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: Status::default(),
            project_id: None,
            dependency_ids: Vec::new(),
            task_ids: Vec::new(),
        }
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn depends_on(mut self, milestone_id: impl Into<String>) -> Self {
        self.dependency_ids.push(milestone_id.into());
        self
    }
}

// ============================================================================
// Task
// ============================================================================

/// A schedulable unit of work measured in effort units
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub status: Status,
    pub milestone_id: Option<MilestoneId>,
    /// Remaining effort in effort units (3 per calendar day)
    pub duration: f64,
    /// Effort already spent; informational
    pub time_spent: f64,
    /// Tasks that must be completed before this one may start
    pub dependency_ids: Vec<TaskId>,
    /// Set only on copies produced by the simulator
    pub completion_date: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new task; the name defaults to the id
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            status: Status::default(),
            milestone_id: None,
            duration: 0.0,
            time_spent: 0.0,
            dependency_ids: Vec::new(),
            completion_date: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn milestone(mut self, milestone_id: impl Into<String>) -> Self {
        self.milestone_id = Some(milestone_id.into());
        self
    }

    pub fn duration(mut self, effort: f64) -> Self {
        self.duration = effort.max(0.0);
        self
    }

    pub fn time_spent(mut self, effort: f64) -> Self {
        self.time_spent = effort.max(0.0);
        self
    }

    pub fn depends_on(mut self, task_id: impl Into<String>) -> Self {
        self.dependency_ids.push(task_id.into());
        self
    }

    /// Copy of this task stamped with the date the simulator completed it
    pub fn completed_at(&self, date: DateTime<Utc>) -> Self {
        Self {
            completion_date: Some(date),
            ..self.clone()
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.status == Status::InFlight
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering of an optimization outcome
pub trait Renderer {
    type Output;

    /// Render the result; the workspace supplies names and relationships
    fn render(
        &self,
        workspace: &Workspace,
        result: &OptimizationResult,
    ) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Invalid values for model enumerations and ratings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    #[error("Unknown deadline type: {0}")]
    UnknownDeadlineType(String),

    #[error("Rating out of range (1-5): {0}")]
    RatingOutOfRange(i64),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
