//! Random seed-data generation: task counts, statuses, payload fields, subtasks and links.

use core::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use time::macros::format_description;
use time::{Date, Duration};

use crate::error::EngineError;

pub const TASK_DESCRIPTION: &str = "Auto-generated seed task for testing.";

const START_OFFSET_DAYS: (i64, i64) = (-3, 10);
const DUE_OFFSET_DAYS: (i64, i64) = (3, 45);
const MAX_SUBTASKS_PER_PARENT: usize = 3;
/// One in this many open tasks becomes a subtask parent.
const PARENT_RATIO: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Backlog,
    Pending,
    InProgress,
    InReview,
    Blocked,
    Completed,
    Removed,
    Closed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 8] = [
        TaskStatus::Backlog,
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::InReview,
        TaskStatus::Blocked,
        TaskStatus::Completed,
        TaskStatus::Removed,
        TaskStatus::Closed,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Backlog => "Backlog",
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::InReview => "In Review",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::Completed => "Completed",
            TaskStatus::Removed => "Removed",
            TaskStatus::Closed => "Closed",
        }
    }

    /// Closed, completed and removed tasks cannot take subtasks.
    pub const fn is_open(self) -> bool {
        !matches!(
            self,
            TaskStatus::Closed | TaskStatus::Completed | TaskStatus::Removed
        )
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipType {
    Related,
    BlockingDependency,
    EpicFeatureParent,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 3] = [
        RelationshipType::Related,
        RelationshipType::BlockingDependency,
        RelationshipType::EpicFeatureParent,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            RelationshipType::Related => "Related",
            RelationshipType::BlockingDependency => "Blocking Dependency",
            RelationshipType::EpicFeatureParent => "Epic/Feature Parent",
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Picklist API values for `Project__c.Status__c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectStatus {
    NotStarted,
    ResearchAndDevelopment,
    Proposal,
    Development,
    QualityAssurance,
    Deployed,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 7] = [
        ProjectStatus::NotStarted,
        ProjectStatus::ResearchAndDevelopment,
        ProjectStatus::Proposal,
        ProjectStatus::Development,
        ProjectStatus::QualityAssurance,
        ProjectStatus::Deployed,
        ProjectStatus::Cancelled,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "Not Started",
            ProjectStatus::ResearchAndDevelopment => "R&D",
            ProjectStatus::Proposal => "Proposal",
            ProjectStatus::Development => "Development",
            ProjectStatus::QualityAssurance => "Q&A",
            ProjectStatus::Deployed => "Deployed",
            ProjectStatus::Cancelled => "Cancelled",
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Inclusive range for the number of top-level tasks seeded per account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskCountRange {
    min: usize,
    max: usize,
}

impl TaskCountRange {
    pub fn new(min: usize, max: usize) -> Result<Self, EngineError> {
        if min < 1 || max < min {
            return Err(EngineError::invalid(format!(
                "task range {min}..={max} must satisfy 1 <= min <= max"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(self.min..=self.max)
    }
}

/// Statuses for `total` tasks: every status once in shuffled order, then uniform picks.
///
/// When `total` is below the number of statuses the full set is still returned so that each
/// status is represented.
pub fn status_sequence<R: Rng + ?Sized>(total: usize, rng: &mut R) -> Vec<TaskStatus> {
    let mut statuses = TaskStatus::ALL.to_vec();
    statuses.shuffle(rng);
    while statuses.len() < total {
        statuses.push(TaskStatus::random(rng));
    }
    statuses
}

/// Formats a date as `YYYYMMDD`, used in generated project names.
pub fn compact_date(date: Date) -> Result<String, EngineError> {
    date.format(format_description!("[year][month][day]"))
        .map_err(|err| EngineError::invalid(format!("cannot format {date}: {err}")))
}

/// Inputs that identify one task to generate.
#[derive(Debug, Clone, Copy)]
pub struct TaskSeed<'a> {
    pub account_id: &'a str,
    pub account_name: &'a str,
    pub project_id: &'a str,
    pub status: TaskStatus,
    pub developer_id: Option<&'a str>,
    pub suffix: &'a str,
}

/// Field values for one `Project_Task__c` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPayload {
    pub name: String,
    pub account_id: String,
    pub project_id: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub start_date: Date,
    pub due_date: Date,
    pub developer_id: Option<String>,
    pub parent_task_id: Option<String>,
}

impl TaskPayload {
    pub fn generate<R: Rng + ?Sized>(seed: TaskSeed<'_>, today: Date, rng: &mut R) -> Self {
        let start_offset = rng.gen_range(START_OFFSET_DAYS.0..=START_OFFSET_DAYS.1);
        let due_offset = rng.gen_range(DUE_OFFSET_DAYS.0..=DUE_OFFSET_DAYS.1);
        Self {
            name: format!("{} Task {}", seed.account_name, seed.suffix),
            account_id: seed.account_id.to_string(),
            project_id: seed.project_id.to_string(),
            status: seed.status,
            priority: Priority::random(rng),
            start_date: today + Duration::days(start_offset),
            due_date: today + Duration::days(due_offset),
            developer_id: seed.developer_id.map(str::to_string),
            parent_task_id: None,
        }
    }

    pub fn with_parent(mut self, parent_task_id: impl Into<String>) -> Self {
        self.parent_task_id = Some(parent_task_id.into());
        self
    }

    /// Record fields in the order they are written.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("Name", self.name.clone()),
            ("Account__c", self.account_id.clone()),
            ("Project__c", self.project_id.clone()),
            ("Status__c", self.status.as_str().to_string()),
            ("Priority__c", self.priority.as_str().to_string()),
            ("Start_Date__c", self.start_date.to_string()),
            ("Due_Date__c", self.due_date.to_string()),
            ("Description__c", TASK_DESCRIPTION.to_string()),
        ];
        if let Some(developer) = &self.developer_id {
            fields.push(("Developer__c", developer.clone()));
        }
        if let Some(parent) = &self.parent_task_id {
            fields.push(("Parent_Task__c", parent.clone()));
        }
        fields
    }
}

/// A task created during a run, as far as later planning steps care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededTask {
    pub id: String,
    pub status: TaskStatus,
}

/// Chooses which tasks get subtasks: one in five open tasks, at least one if any are open.
pub fn pick_subtask_parents<'a, R: Rng + ?Sized>(
    tasks: &'a [SeededTask],
    rng: &mut R,
) -> Vec<&'a SeededTask> {
    let open: Vec<&SeededTask> = tasks.iter().filter(|task| task.status.is_open()).collect();
    if open.is_empty() {
        return Vec::new();
    }
    let amount = (open.len() / PARENT_RATIO).max(1);
    open.choose_multiple(rng, amount).copied().collect()
}

pub fn subtasks_per_parent<R: Rng + ?Sized>(rng: &mut R) -> usize {
    rng.gen_range(1..=MAX_SUBTASKS_PER_PARENT)
}

/// A link to create between two distinct tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipPick {
    pub task_a: String,
    pub task_b: String,
    pub kind: RelationshipType,
}

impl RelationshipPick {
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Task_A__c", self.task_a.clone()),
            ("Task_B__c", self.task_b.clone()),
            ("Relationship_Type__c", self.kind.as_str().to_string()),
        ]
    }
}

/// Draws `count` random links, each between two distinct tasks. Needs at least two tasks.
pub fn pick_relationships<R: Rng + ?Sized>(
    task_ids: &[String],
    count: usize,
    rng: &mut R,
) -> Vec<RelationshipPick> {
    if task_ids.len() < 2 {
        return Vec::new();
    }
    (0..count)
        .map(|_| {
            let pair: Vec<&String> = task_ids.choose_multiple(rng, 2).collect();
            RelationshipPick {
                task_a: pair[0].clone(),
                task_b: pair[1].clone(),
                kind: RelationshipType::random(rng),
            }
        })
        .collect()
}
