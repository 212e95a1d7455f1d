//! Seeds projects, tasks, subtasks and task relationships for every account.

use std::collections::HashMap;

use orgseed_core::owner::{OwnerCandidate, OwnerRoster};
use orgseed_core::plan::{
    ProjectStatus, SeededTask, TaskCountRange, TaskPayload, TaskSeed, TaskStatus, compact_date,
    pick_relationships, pick_subtask_parents, status_sequence, subtasks_per_parent,
};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use time::Date;
use tracing::{Level, event};

use crate::config::{OwnersConfig, SeedConfig};
use crate::error::RunError;
use crate::org::{
    Account, OrgClient, PROJECT_SOBJECT, Project, RELATIONSHIP_SOBJECT, TASK_SOBJECT, UserRecord,
    fetch, soql_contains,
};

const RELATIONSHIP_TYPE_FIELD: &str = "Relationship_Type__c";

/// Knobs for one seeding run.
#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub org: String,
    pub tasks: TaskCountRange,
    pub owners: OwnersConfig,
    pub relationships_per_account: usize,
    pub skip_relationships: bool,
}

impl SeedOptions {
    pub fn from_config(config: &SeedConfig, skip_relationships: bool) -> Result<Self, RunError> {
        Ok(Self {
            org: config.org.clone(),
            tasks: TaskCountRange::new(config.tasks.min, config.tasks.max)?,
            owners: config.owners.clone(),
            relationships_per_account: config.relationships_per_account,
            skip_relationships,
        })
    }
}

/// Counts of records written (or, in a dry run, planned).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub org: String,
    pub projects_created: usize,
    pub tasks_created: usize,
    pub subtasks_created: usize,
    pub relationships_created: usize,
}

/// Builds the owner roster: the authenticated user is always eligible, configured colleagues are
/// added when a matching user exists.
pub fn build_roster<C: OrgClient + ?Sized>(
    client: &mut C,
    owners: &OwnersConfig,
) -> Result<OwnerRoster, RunError> {
    let me = client.current_user_id()?;
    let mut roster = OwnerRoster::new(OwnerCandidate::new(me, owners.current_user_weight));

    for owner in &owners.optional {
        let Some(user) = find_user(client, &owner.name)? else {
            event!(
                target: "orgseed::seed",
                Level::WARN,
                owner = %owner.name,
                "no user matches owner name; leaving them out"
            );
            continue;
        };

        let mut candidate = OwnerCandidate::new(user.id.clone(), owner.weight);
        if let Some(contact) = &user.contact_id {
            candidate = candidate.with_contact(contact.clone());
        }
        if owner.restrict_to_account {
            match user.account_id() {
                Some(account) => candidate = candidate.restricted_to(account),
                None => {
                    event!(
                        target: "orgseed::seed",
                        Level::WARN,
                        owner = %owner.name,
                        "account-restricted owner has no contact account; leaving them out"
                    );
                    continue;
                }
            }
        }

        event!(
            target: "orgseed::seed",
            Level::INFO,
            owner = %owner.name,
            user_id = %candidate.user_id,
            scope = ?candidate.scope,
            weight = candidate.weight,
            quota = ?owner.quota,
            "owner added to roster"
        );
        roster.push(candidate, owner.quota);
    }

    Ok(roster)
}

/// Most recently modified user whose name contains `fragment`.
pub fn find_user<C: OrgClient + ?Sized>(
    client: &mut C,
    fragment: &str,
) -> Result<Option<UserRecord>, RunError> {
    let soql = format!(
        "SELECT Id, Name, Username, ContactId, Contact.AccountId FROM User \
         WHERE Name LIKE {} ORDER BY LastModifiedDate DESC LIMIT 1",
        soql_contains(fragment)
    );
    let users: Vec<UserRecord> = fetch(client, "user", &soql)?;
    Ok(users.into_iter().next())
}

/// Runs the whole seeding pass against `client`.
pub fn run_seed<C, R>(
    client: &mut C,
    options: &SeedOptions,
    today: Date,
    rng: &mut R,
) -> Result<SeedSummary, RunError>
where
    C: OrgClient + ?Sized,
    R: Rng + ?Sized,
{
    let mut summary = SeedSummary {
        org: options.org.clone(),
        ..SeedSummary::default()
    };
    event!(
        target: "orgseed::seed",
        Level::INFO,
        org = %options.org,
        min_tasks = options.tasks.min(),
        max_tasks = options.tasks.max(),
        "seeding started"
    );
    let mut roster = build_roster(client, &options.owners)?;

    let accounts: Vec<Account> = fetch(client, "account", "SELECT Id, Name FROM Account")?;
    let projects: Vec<Project> = fetch(
        client,
        "project",
        "SELECT Id, Name, Account__c FROM Project__c",
    )?;
    let mut projects_by_account: HashMap<String, Vec<Project>> = HashMap::new();
    for project in projects {
        if let Some(account_id) = project.account_id.clone() {
            projects_by_account
                .entry(account_id)
                .or_default()
                .push(project);
        }
    }

    for account in &accounts {
        if projects_by_account.contains_key(&account.id) {
            continue;
        }
        let project = create_account_project(client, account, today, rng)?;
        summary.projects_created += 1;
        projects_by_account.insert(account.id.clone(), vec![project]);
    }

    let relationships_enabled = if options.skip_relationships {
        event!(
            target: "orgseed::seed",
            Level::INFO,
            "relationship creation skipped by request"
        );
        false
    } else if client.field_exists(RELATIONSHIP_SOBJECT, RELATIONSHIP_TYPE_FIELD) {
        true
    } else {
        event!(
            target: "orgseed::seed",
            Level::WARN,
            "{RELATIONSHIP_SOBJECT}.{RELATIONSHIP_TYPE_FIELD} not available; skipping relationships"
        );
        false
    };

    for account in &accounts {
        let Some(project) = projects_by_account
            .get(&account.id)
            .and_then(|projects| projects.choose(rng))
        else {
            event!(
                target: "orgseed::seed",
                Level::WARN,
                account = %account.name,
                "account still has no project; skipping"
            );
            continue;
        };

        seed_account(
            client,
            AccountTarget {
                account,
                project_id: &project.id,
                relationships: if relationships_enabled {
                    options.relationships_per_account
                } else {
                    0
                },
            },
            options.tasks,
            &mut roster,
            today,
            rng,
            &mut summary,
        )?;
    }

    event!(
        target: "orgseed::seed",
        Level::INFO,
        projects = summary.projects_created,
        tasks = summary.tasks_created,
        subtasks = summary.subtasks_created,
        relationships = summary.relationships_created,
        "seeding finished"
    );
    Ok(summary)
}

fn create_account_project<C, R>(
    client: &mut C,
    account: &Account,
    today: Date,
    rng: &mut R,
) -> Result<Project, RunError>
where
    C: OrgClient + ?Sized,
    R: Rng + ?Sized,
{
    let name = format!("{} Project - {}", account.name, compact_date(today)?);
    let id = client.create(
        PROJECT_SOBJECT,
        &[
            ("Name", name.clone()),
            ("Account__c", account.id.clone()),
            ("Status__c", ProjectStatus::random(rng).as_str().to_string()),
        ],
    )?;
    event!(
        target: "orgseed::seed",
        Level::INFO,
        project = %name,
        account = %account.name,
        id = %id,
        "created project for account without one"
    );
    Ok(Project {
        id,
        name,
        account_id: Some(account.id.clone()),
    })
}

struct AccountTarget<'a> {
    account: &'a Account,
    project_id: &'a str,
    relationships: usize,
}

fn seed_account<C, R>(
    client: &mut C,
    target: AccountTarget<'_>,
    tasks: TaskCountRange,
    roster: &mut OwnerRoster,
    today: Date,
    rng: &mut R,
    summary: &mut SeedSummary,
) -> Result<(), RunError>
where
    C: OrgClient + ?Sized,
    R: Rng + ?Sized,
{
    let account = target.account;
    let total = tasks.sample(rng);
    let mut created: Vec<SeededTask> = Vec::new();

    for (idx, status) in status_sequence(total, rng).into_iter().enumerate() {
        let suffix = format!("#{}", idx + 1);
        let payload = task_payload(roster, &target, status, &suffix, today, rng)?;
        let id = client.create(TASK_SOBJECT, &payload.fields())?;
        created.push(SeededTask { id, status });
        summary.tasks_created += 1;
    }

    let parents: Vec<SeededTask> = pick_subtask_parents(&created, rng)
        .into_iter()
        .cloned()
        .collect();
    for parent in &parents {
        for n in 1..=subtasks_per_parent(rng) {
            let status = TaskStatus::random(rng);
            let suffix = format!("{}-sub{n}", parent.id);
            let payload = task_payload(roster, &target, status, &suffix, today, rng)?
                .with_parent(parent.id.clone());
            let id = client.create(TASK_SOBJECT, &payload.fields())?;
            created.push(SeededTask { id, status });
            summary.tasks_created += 1;
            summary.subtasks_created += 1;
        }
    }

    if target.relationships > 0 {
        let ids: Vec<String> = created.iter().map(|task| task.id.clone()).collect();
        for link in pick_relationships(&ids, target.relationships, rng) {
            client.create(RELATIONSHIP_SOBJECT, &link.fields())?;
            summary.relationships_created += 1;
        }
    }

    event!(
        target: "orgseed::seed",
        Level::INFO,
        account = %account.name,
        tasks = created.len(),
        subtask_parents = parents.len(),
        "account seeded"
    );
    Ok(())
}

fn task_payload<R: Rng + ?Sized>(
    roster: &mut OwnerRoster,
    target: &AccountTarget<'_>,
    status: TaskStatus,
    suffix: &str,
    today: Date,
    rng: &mut R,
) -> Result<TaskPayload, RunError> {
    let developer = roster.pick(&target.account.id, rng)?.contact_id.clone();
    Ok(TaskPayload::generate(
        TaskSeed {
            account_id: &target.account.id,
            account_name: &target.account.name,
            project_id: target.project_id,
            status,
            developer_id: developer.as_deref(),
            suffix,
        },
        today,
        rng,
    ))
}
