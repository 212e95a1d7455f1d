//! Spreads the tasks of one project across several projects of the same account.

use orgseed_core::distribute::{Placed, distribute};
use orgseed_core::plan::{ProjectStatus, compact_date};
use rand::Rng;
use serde::Serialize;
use time::Date;
use tracing::{Level, event};

use crate::error::RunError;
use crate::org::{
    Account, OrgClient, PROJECT_SOBJECT, Project, ProjectTask, TASK_SOBJECT, fetch, soql_literal,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    pub project_id: String,
    /// Total number of projects to spread across, the origin included.
    pub num_projects: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitSummary {
    pub original_project: String,
    pub total_projects: usize,
    pub tasks_moved: usize,
    pub tasks_remaining_in_original: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectShare {
    pub project_id: String,
    pub tasks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    pub project_name: String,
    pub account_name: String,
    pub projects_created: usize,
    pub shares: Vec<ProjectShare>,
    pub summary: SplitSummary,
}

/// Loads the origin project and its tasks, then redistributes them.
///
/// Returns `Ok(None)` when the project has no tasks.
pub fn run_split<C, R>(
    client: &mut C,
    options: &SplitOptions,
    today: Date,
    rng: &mut R,
) -> Result<Option<SplitOutcome>, RunError>
where
    C: OrgClient + ?Sized,
    R: Rng + ?Sized,
{
    let origin_literal = soql_literal(&options.project_id);
    let origin: Project = fetch::<Project, _>(
        client,
        "project",
        &format!("SELECT Id, Name, Account__c FROM Project__c WHERE Id = {origin_literal}"),
    )?
    .into_iter()
    .next()
    .ok_or_else(|| RunError::ProjectNotFound(options.project_id.clone()))?;

    let account_id = origin
        .account_id
        .clone()
        .ok_or_else(|| RunError::ProjectWithoutAccount(origin.id.clone()))?;
    let account_literal = soql_literal(&account_id);
    let account: Account = fetch::<Account, _>(
        client,
        "account",
        &format!("SELECT Id, Name FROM Account WHERE Id = {account_literal}"),
    )?
    .into_iter()
    .next()
    .ok_or_else(|| RunError::AccountNotFound(account_id.clone()))?;

    let tasks: Vec<ProjectTask> = fetch(
        client,
        "task",
        &format!(
            "SELECT Id, Name, Project__c FROM Project_Task__c WHERE Project__c = {origin_literal}"
        ),
    )?;
    event!(
        target: "orgseed::split",
        Level::INFO,
        project = %origin.name,
        account = %account.name,
        tasks = tasks.len(),
        "loaded origin project"
    );
    if tasks.is_empty() {
        return Ok(None);
    }

    let existing: Vec<Project> = fetch(
        client,
        "project",
        &format!("SELECT Id, Name FROM Project__c WHERE Account__c = {account_literal}"),
    )?;
    let mut targets = target_projects(
        &origin.id,
        existing.iter().map(|project| project.id.as_str()),
        options.num_projects,
    );

    let mut projects_created = 0;
    while targets.len() < options.num_projects {
        let position = targets.len() + 1;
        let name = format!(
            "{} Project {} - {position}",
            account.name,
            compact_date(today)?
        );
        let id = client.create(
            PROJECT_SOBJECT,
            &[
                ("Name", name.clone()),
                ("Account__c", account_id.clone()),
                ("Status__c", ProjectStatus::random(rng).as_str().to_string()),
            ],
        )?;
        event!(
            target: "orgseed::split",
            Level::INFO,
            project = %name,
            id = %id,
            "created target project"
        );
        targets.push(id);
        projects_created += 1;
    }

    let items = tasks
        .into_iter()
        .map(|task| {
            let bucket = task.project_id.clone().unwrap_or_else(|| origin.id.clone());
            Placed::new(task, bucket)
        })
        .collect();
    let distribution = distribute(items, &targets, rng)?;

    let shares: Vec<ProjectShare> = distribution
        .shares()
        .iter()
        .map(|share| ProjectShare {
            project_id: share.bucket.clone(),
            tasks: share.items.len(),
        })
        .collect();

    let mut tasks_moved = 0;
    for mv in distribution.moves() {
        client.update(TASK_SOBJECT, &mv.item.id, &[("Project__c", mv.to.clone())])?;
        event!(
            target: "orgseed::split",
            Level::DEBUG,
            task = %mv.item.id,
            name = %mv.item.name,
            from = %mv.from,
            to = %mv.to,
            "task moved"
        );
        tasks_moved += 1;
    }

    let summary = SplitSummary {
        original_project: origin.id.clone(),
        total_projects: targets.len(),
        tasks_moved,
        tasks_remaining_in_original: distribution.count_for(&origin.id),
    };

    Ok(Some(SplitOutcome {
        project_name: origin.name,
        account_name: account.name,
        projects_created,
        shares,
        summary,
    }))
}

/// The origin first, then other existing projects, capped at `wanted`.
pub fn target_projects<'a>(
    origin: &str,
    existing: impl IntoIterator<Item = &'a str>,
    wanted: usize,
) -> Vec<String> {
    let mut targets = vec![origin.to_string()];
    for id in existing {
        if targets.len() >= wanted {
            break;
        }
        if !targets.iter().any(|known| known == id) {
            targets.push(id.to_string());
        }
    }
    targets
}
