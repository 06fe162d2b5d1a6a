//! Id-indexed arena over the four entity collections
//!
//! Entities reference each other only by id. The `Workspace` owns flat lists
//! and the lookup tables needed to walk goal → project → milestone → task
//! in either direction.

use std::collections::HashMap;

use crate::{Goal, Milestone, Project, Task};

/// Flat entity lists plus id lookup tables
#[derive(Clone, Debug, Default)]
pub struct Workspace {
    goals: Vec<Goal>,
    projects: Vec<Project>,
    milestones: Vec<Milestone>,
    tasks: Vec<Task>,
    goal_index: HashMap<String, usize>,
    project_index: HashMap<String, usize>,
    milestone_index: HashMap<String, usize>,
    task_index: HashMap<String, usize>,
}

fn index_by_id<T>(items: &[T], id: impl Fn(&T) -> &str) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        // First occurrence wins
        index.entry(id(item).to_string()).or_insert(position);
    }
    index
}

impl Workspace {
    /// Index the entities exactly as given.
    ///
    /// Owned-id sets (`project_ids`, `milestone_ids`, `task_ids`) are trusted
    /// as-is; use [`Workspace::linked`] to derive them from back-references.
    pub fn new(
        goals: Vec<Goal>,
        projects: Vec<Project>,
        milestones: Vec<Milestone>,
        tasks: Vec<Task>,
    ) -> Self {
        Self {
            goal_index: index_by_id(&goals, |g| &g.id),
            project_index: index_by_id(&projects, |p| &p.id),
            milestone_index: index_by_id(&milestones, |m| &m.id),
            task_index: index_by_id(&tasks, |t| &t.id),
            goals,
            projects,
            milestones,
            tasks,
        }
    }

    /// Index the entities and rebuild every owned-id set from the
    /// back-references (`goal_id`, `project_id`, `milestone_id`).
    ///
    /// References to ids that do not exist are left out of the owned sets.
    pub fn linked(
        mut goals: Vec<Goal>,
        mut projects: Vec<Project>,
        mut milestones: Vec<Milestone>,
        tasks: Vec<Task>,
    ) -> Self {
        let goal_index = index_by_id(&goals, |g| &g.id);
        let project_index = index_by_id(&projects, |p| &p.id);
        let milestone_index = index_by_id(&milestones, |m| &m.id);

        for goal in &mut goals {
            goal.project_ids.clear();
        }
        for project in &mut projects {
            project.milestone_ids.clear();
        }
        for milestone in &mut milestones {
            milestone.task_ids.clear();
        }

        for project in &projects {
            if let Some(&g) = project.goal_id.as_ref().and_then(|id| goal_index.get(id)) {
                goals[g].project_ids.push(project.id.clone());
            }
        }
        for milestone in &milestones {
            if let Some(&p) = milestone.project_id.as_ref().and_then(|id| project_index.get(id)) {
                projects[p].milestone_ids.push(milestone.id.clone());
            }
        }
        for task in &tasks {
            if let Some(&m) = task.milestone_id.as_ref().and_then(|id| milestone_index.get(id)) {
                milestones[m].task_ids.push(task.id.clone());
            }
        }

        Self::new(goals, projects, milestones, tasks)
    }

    /// Index the entities, keeping caller-supplied owned-id sets.
    ///
    /// When any goal, project or milestone lists its children, every owned
    /// set is taken as given and its order is preserved. Input that only sets
    /// back-references is [`linked`](Workspace::linked) instead.
    pub fn assemble(
        goals: Vec<Goal>,
        projects: Vec<Project>,
        milestones: Vec<Milestone>,
        tasks: Vec<Task>,
    ) -> Self {
        let owned = goals.iter().any(|g| !g.project_ids.is_empty())
            || projects.iter().any(|p| !p.milestone_ids.is_empty())
            || milestones.iter().any(|m| !m.task_ids.is_empty());

        if owned {
            Self::new(goals, projects, milestones, tasks)
        } else {
            Self::linked(goals, projects, milestones, tasks)
        }
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn goal(&self, id: &str) -> Option<&Goal> {
        self.goal_index.get(id).map(|&i| &self.goals[i])
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.project_index.get(id).map(|&i| &self.projects[i])
    }

    pub fn milestone(&self, id: &str) -> Option<&Milestone> {
        self.milestone_index.get(id).map(|&i| &self.milestones[i])
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.task_index.get(id).map(|&i| &self.tasks[i])
    }

    /// Owning project of a task, via its milestone
    pub fn project_of_task(&self, task: &Task) -> Option<&Project> {
        let milestone = self.milestone(task.milestone_id.as_deref()?)?;
        self.project(milestone.project_id.as_deref()?)
    }

    /// Owning goal of a task, via its milestone and project
    pub fn goal_of_task(&self, task: &Task) -> Option<&Goal> {
        let project = self.project_of_task(task)?;
        self.goal(project.goal_id.as_deref()?)
    }

    /// Ids of every task under a project's milestones
    pub fn project_task_ids(&self, project: &Project) -> Vec<&str> {
        project
            .milestone_ids
            .iter()
            .filter_map(|id| self.milestone(id))
            .flat_map(|milestone| milestone.task_ids.iter().map(String::as_str))
            .collect()
    }

    /// Every task reachable from a project, in project → milestone → task
    /// declaration order. Orphaned milestones and tasks are excluded.
    pub fn schedulable_tasks(&self) -> Vec<Task> {
        self.projects
            .iter()
            .flat_map(|project| self.project_task_ids(project))
            .filter_map(|id| self.task(id))
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
            && self.projects.is_empty()
            && self.milestones.is_empty()
            && self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Workspace {
        Workspace::linked(
            vec![Goal::new("g", "Grow")],
            vec![
                Project::new("p1", "Alpha").goal("g"),
                Project::new("p2", "Beta"),
            ],
            vec![
                Milestone::new("m1", "M1").project("p1"),
                Milestone::new("m2", "M2").project("p2"),
                Milestone::new("loose", "Orphan"),
            ],
            vec![
                Task::new("t1").milestone("m1"),
                Task::new("t2").milestone("m2"),
                Task::new("t3").milestone("m1"),
                Task::new("t4").milestone("loose"),
                Task::new("t5"),
            ],
        )
    }

    #[test]
    fn linked_rebuilds_owned_sets() {
        let ws = sample();
        assert_eq!(ws.goal("g").unwrap().project_ids, vec!["p1".to_string()]);
        assert_eq!(ws.project("p1").unwrap().milestone_ids, vec!["m1".to_string()]);
        assert_eq!(
            ws.milestone("m1").unwrap().task_ids,
            vec!["t1".to_string(), "t3".to_string()]
        );
    }

    #[test]
    fn linked_ignores_unknown_parents() {
        let ws = Workspace::linked(
            vec![],
            vec![Project::new("p", "P").goal("missing")],
            vec![],
            vec![],
        );
        assert!(ws.goal("missing").is_none());
        assert!(ws.project("p").is_some());
    }

    #[test]
    fn schedulable_tasks_follow_hierarchy_order() {
        let ws = sample();
        let ids: Vec<String> = ws.schedulable_tasks().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["t1", "t3", "t2"]);
    }

    #[test]
    fn relationship_lookups() {
        let ws = sample();
        let t1 = ws.task("t1").unwrap();
        assert_eq!(ws.project_of_task(t1).unwrap().id, "p1");
        assert_eq!(ws.goal_of_task(t1).unwrap().id, "g");

        let t2 = ws.task("t2").unwrap();
        assert!(ws.goal_of_task(t2).is_none());

        let t4 = ws.task("t4").unwrap();
        assert!(ws.project_of_task(t4).is_none());
    }

    #[test]
    fn duplicate_ids_resolve_to_first() {
        let ws = Workspace::new(
            vec![],
            vec![],
            vec![],
            vec![Task::new("a").name("first"), Task::new("a").name("second")],
        );
        assert_eq!(ws.task("a").unwrap().name, "first");
    }

    #[test]
    fn assemble_keeps_supplied_ownership_order() {
        let mut project = Project::new("p", "P");
        project.milestone_ids = vec!["m2".into(), "m1".into()];
        let mut m1 = Milestone::new("m1", "M1").project("p");
        m1.task_ids = vec!["t1".into()];
        let mut m2 = Milestone::new("m2", "M2").project("p");
        m2.task_ids = vec!["t2".into()];

        let ws = Workspace::assemble(
            vec![],
            vec![project],
            vec![m1, m2],
            vec![Task::new("t1").milestone("m1"), Task::new("t2").milestone("m2")],
        );
        let ids: Vec<String> = ws.schedulable_tasks().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["t2", "t1"]);
    }

    #[test]
    fn assemble_links_back_references_only_input() {
        let ws = Workspace::assemble(
            vec![Goal::new("g", "Grow")],
            vec![Project::new("p", "P").goal("g")],
            vec![Milestone::new("m", "M").project("p")],
            vec![Task::new("t").milestone("m")],
        );
        assert_eq!(ws.goal("g").unwrap().project_ids, vec!["p".to_string()]);
        assert_eq!(ws.milestone("m").unwrap().task_ids, vec!["t".to_string()]);
    }

    #[test]
    fn empty_workspace() {
        let ws = Workspace::default();
        assert!(ws.is_empty());
        assert!(ws.schedulable_tasks().is_empty());
    }
}
