//! Raw records to a consistent [`Workspace`]
//!
//! Normalization never fails. Every value that had to be replaced or removed
//! is reported as an [`IngestWarning`] and logged.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crunchtime_core::{DeadlineType, Goal, Milestone, Project, Rating, Status, Task, Workspace};

use crate::raw::{RawBatch, RawGoal, RawMilestone, RawProject, RawTask};

/// Entity kinds, for warning messages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Goal,
    Project,
    Milestone,
    Task,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EntityKind::Goal => "Goal",
            EntityKind::Project => "Project",
            EntityKind::Milestone => "Milestone",
            EntityKind::Task => "Task",
        })
    }
}

/// Something in the input that was repaired during normalization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngestWarning {
    /// A later record reused an id; it was discarded
    DuplicateId { entity: EntityKind, id: String },
    /// A reference to an id that does not exist was removed
    DanglingReference {
        entity: EntityKind,
        id: String,
        target: EntityKind,
        reference: String,
    },
    /// A record listed itself as a dependency
    SelfDependency { entity: EntityKind, id: String },
    /// A field value was unusable and replaced by its default
    InvalidValue {
        entity: EntityKind,
        id: String,
        field: &'static str,
        value: String,
    },
}

impl std::fmt::Display for IngestWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestWarning::DuplicateId { entity, id } => {
                write!(f, "Duplicate {} id {}; keeping the first occurrence", entity, id)
            }
            IngestWarning::DanglingReference {
                entity,
                id,
                target,
                reference,
            } => write!(
                f,
                "{} {} not found for {} {}. Removing invalid reference.",
                target, reference, entity, id
            ),
            IngestWarning::SelfDependency { entity, id } => {
                write!(f, "{} {} depends on itself. Removing dependency.", entity, id)
            }
            IngestWarning::InvalidValue {
                entity,
                id,
                field,
                value,
            } => write!(f, "Invalid {} '{}' on {} {}; using default", field, value, entity, id),
        }
    }
}

/// Normalized workspace plus everything that was repaired
#[derive(Debug)]
pub struct Ingested {
    pub workspace: Workspace,
    pub warnings: Vec<IngestWarning>,
}

/// Normalize a raw batch.
///
/// Owned-id sets are rebuilt from the surviving back-references.
pub fn normalize(batch: RawBatch) -> Ingested {
    let mut normalizer = Normalizer::default();

    let goals = normalizer.dedupe(EntityKind::Goal, batch.goals.into_vec(), |g| &g.id);
    let projects = normalizer.dedupe(EntityKind::Project, batch.projects.into_vec(), |p| &p.id);
    let milestones =
        normalizer.dedupe(EntityKind::Milestone, batch.milestones.into_vec(), |m| &m.id);
    let tasks = normalizer.dedupe(EntityKind::Task, batch.tasks.into_vec(), |t| &t.id);

    let goal_ids: HashSet<String> = goals.iter().map(|g| g.id.clone()).collect();
    let project_ids: HashSet<String> = projects.iter().map(|p| p.id.clone()).collect();
    let milestone_ids: HashSet<String> = milestones.iter().map(|m| m.id.clone()).collect();
    let task_ids: HashSet<String> = tasks.iter().map(|t| t.id.clone()).collect();

    let goals: Vec<Goal> = goals.into_iter().map(|g| normalizer.goal(g)).collect();
    let projects: Vec<Project> = projects
        .into_iter()
        .map(|p| normalizer.project(p, &goal_ids))
        .collect();
    let milestones: Vec<Milestone> = milestones
        .into_iter()
        .map(|m| normalizer.milestone(m, &project_ids, &milestone_ids))
        .collect();
    let tasks: Vec<Task> = tasks
        .into_iter()
        .map(|t| normalizer.task(t, &milestone_ids, &task_ids))
        .collect();

    tracing::debug!(
        goals = goals.len(),
        projects = projects.len(),
        milestones = milestones.len(),
        tasks = tasks.len(),
        warnings = normalizer.warnings.len(),
        "normalized input"
    );

    Ingested {
        workspace: Workspace::linked(goals, projects, milestones, tasks),
        warnings: normalizer.warnings,
    }
}

#[derive(Default)]
struct Normalizer {
    warnings: Vec<IngestWarning>,
}

impl Normalizer {
    fn warn(&mut self, warning: IngestWarning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn dedupe<T>(&mut self, entity: EntityKind, items: Vec<T>, id: impl Fn(&T) -> &String) -> Vec<T> {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(items.len());
        for item in items {
            if seen.insert(id(&item).clone()) {
                kept.push(item);
            } else {
                self.warn(IngestWarning::DuplicateId {
                    entity,
                    id: id(&item).clone(),
                });
            }
        }
        kept
    }

    fn reference(
        &mut self,
        entity: EntityKind,
        id: &str,
        target: EntityKind,
        reference: Option<String>,
        known: &HashSet<String>,
    ) -> Option<String> {
        let reference = reference.filter(|r| !r.is_empty())?;
        if known.contains(&reference) {
            return Some(reference);
        }
        self.warn(IngestWarning::DanglingReference {
            entity,
            id: id.to_string(),
            target,
            reference,
        });
        None
    }

    fn dependencies(
        &mut self,
        entity: EntityKind,
        id: &str,
        dependencies: Vec<String>,
        known: &HashSet<String>,
    ) -> Vec<String> {
        let mut kept = Vec::with_capacity(dependencies.len());
        for dependency in dependencies {
            if dependency == id {
                self.warn(IngestWarning::SelfDependency {
                    entity,
                    id: id.to_string(),
                });
            } else if let Some(dependency) =
                self.reference(entity, id, entity, Some(dependency), known)
            {
                if !kept.contains(&dependency) {
                    kept.push(dependency);
                }
            }
        }
        kept
    }

    fn status(&mut self, entity: EntityKind, id: &str, value: Option<Value>) -> Status {
        match value {
            None | Some(Value::Null) => Status::default(),
            Some(Value::String(s)) => s.parse().unwrap_or_else(|_| {
                self.invalid(entity, id, "status", &Value::String(s));
                Status::default()
            }),
            Some(other) => {
                self.invalid(entity, id, "status", &other);
                Status::default()
            }
        }
    }

    fn rating(&mut self, id: &str, field: &'static str, value: Option<Value>) -> Rating {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return Rating::default();
        };
        match whole_number(&value).and_then(|n| Rating::try_from(n).ok()) {
            Some(rating) => rating,
            None => {
                self.invalid(EntityKind::Project, id, field, &value);
                Rating::default()
            }
        }
    }

    fn effort(&mut self, id: &str, field: &'static str, value: Option<Value>) -> f64 {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return 0.0;
        };
        match value.as_f64() {
            Some(effort) if effort.is_finite() && effort >= 0.0 => effort,
            _ => {
                self.invalid(EntityKind::Task, id, field, &value);
                0.0
            }
        }
    }

    fn deadline(&mut self, id: &str, value: Option<Value>) -> Option<DateTime<Utc>> {
        let value = value.filter(|v| !v.is_null() && v.as_str() != Some(""))?;
        let parsed = match &value {
            Value::String(s) => parse_deadline(s),
            Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
            _ => None,
        };
        if parsed.is_none() {
            self.invalid(EntityKind::Project, id, "deadline", &value);
        }
        parsed
    }

    fn deadline_type(&mut self, id: &str, value: Option<Value>) -> Option<DeadlineType> {
        let value = value.filter(|v| !v.is_null() && v.as_str() != Some(""))?;
        let parsed = value.as_str().and_then(|s| s.parse::<DeadlineType>().ok());
        if parsed.is_none() {
            self.invalid(EntityKind::Project, id, "deadline type", &value);
        }
        parsed
    }

    fn invalid(&mut self, entity: EntityKind, id: &str, field: &'static str, value: &Value) {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.warn(IngestWarning::InvalidValue {
            entity,
            id: id.to_string(),
            field,
            value,
        });
    }

    fn goal(&mut self, raw: RawGoal) -> Goal {
        let status = self.status(EntityKind::Goal, &raw.id, raw.status);
        let name = raw.name.unwrap_or_else(|| raw.id.clone());
        Goal::new(raw.id, name).status(status)
    }

    fn project(&mut self, raw: RawProject, goals: &HashSet<String>) -> Project {
        let id = raw.id;
        let mut project = Project::new(id.clone(), raw.name.unwrap_or_else(|| id.clone()))
            .status(self.status(EntityKind::Project, &id, raw.status))
            .excitement(self.rating(&id, "excitement", raw.excitement))
            .viability(self.rating(&id, "viability", raw.viability));

        project.deadline = self.deadline(&id, raw.deadline);
        project.deadline_type = self.deadline_type(&id, raw.deadline_type);
        project.goal_id = self.reference(EntityKind::Project, &id, EntityKind::Goal, raw.goal, goals);
        project
    }

    fn milestone(
        &mut self,
        raw: RawMilestone,
        projects: &HashSet<String>,
        milestones: &HashSet<String>,
    ) -> Milestone {
        let id = raw.id;
        let mut milestone = Milestone::new(id.clone(), raw.name.unwrap_or_else(|| id.clone()))
            .status(self.status(EntityKind::Milestone, &id, raw.status));

        milestone.project_id =
            self.reference(EntityKind::Milestone, &id, EntityKind::Project, raw.project, projects);
        milestone.dependency_ids =
            self.dependencies(EntityKind::Milestone, &id, raw.dependencies, milestones);
        milestone
    }

    fn task(
        &mut self,
        raw: RawTask,
        milestones: &HashSet<String>,
        tasks: &HashSet<String>,
    ) -> Task {
        let id = raw.id;
        let mut task = Task::new(id.clone())
            .name(raw.name.unwrap_or_else(|| id.clone()))
            .status(self.status(EntityKind::Task, &id, raw.status))
            .duration(self.effort(&id, "duration", raw.duration))
            .time_spent(self.effort(&id, "time spent", raw.time_spent));

        task.milestone_id =
            self.reference(EntityKind::Task, &id, EntityKind::Milestone, raw.milestone, milestones);
        task.dependency_ids = self.dependencies(EntityKind::Task, &id, raw.dependencies, tasks);
        task
    }
}

/// Integer value of a JSON number, accepting whole floats like `4.0`
fn whole_number(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(n) = number.as_i64() {
        return Some(n);
    }
    number
        .as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < 1e15)
        .map(|f| f as i64)
}

/// RFC 3339, a naive datetime (taken as UTC), or a bare date (midnight UTC)
pub fn parse_deadline(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
