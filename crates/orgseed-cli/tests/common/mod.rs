#![allow(dead_code)]

use orgseed_cli::org::{OrgClient, OrgError};
use serde_json::{Value, json};
use time::{Date, Month};

pub fn today() -> Date {
    Date::from_calendar_date(2025, Month::March, 4).expect("valid date")
}

#[derive(Debug, Clone)]
pub struct MemUser {
    pub id: String,
    pub name: String,
    pub contact_id: Option<String>,
    pub account_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MemProject {
    pub id: String,
    pub name: String,
    pub account_id: String,
}

#[derive(Debug, Clone)]
pub struct MemTask {
    pub id: String,
    pub name: String,
    pub project_id: String,
}

#[derive(Debug, Clone)]
pub struct Created {
    pub sobject: String,
    pub id: String,
    pub fields: Vec<(String, String)>,
}

impl Created {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// An org held in memory that answers the handful of SOQL shapes the tools issue.
#[derive(Debug, Default)]
pub struct MemoryOrg {
    pub me: String,
    pub accounts: Vec<(String, String)>,
    pub projects: Vec<MemProject>,
    pub tasks: Vec<MemTask>,
    pub users: Vec<MemUser>,
    pub relationship_field: bool,
    pub created: Vec<Created>,
    pub updates: Vec<(String, String, Vec<(String, String)>)>,
    next_id: usize,
}

impl MemoryOrg {
    pub fn new(me: &str) -> Self {
        Self {
            me: me.to_string(),
            relationship_field: true,
            ..Self::default()
        }
    }

    pub fn account(mut self, id: &str, name: &str) -> Self {
        self.accounts.push((id.to_string(), name.to_string()));
        self
    }

    pub fn project(mut self, id: &str, name: &str, account_id: &str) -> Self {
        self.projects.push(MemProject {
            id: id.to_string(),
            name: name.to_string(),
            account_id: account_id.to_string(),
        });
        self
    }

    pub fn task(mut self, id: &str, project_id: &str) -> Self {
        self.tasks.push(MemTask {
            id: id.to_string(),
            name: format!("Task {id}"),
            project_id: project_id.to_string(),
        });
        self
    }

    pub fn user(mut self, id: &str, name: &str, contact: Option<&str>, account: Option<&str>) -> Self {
        self.users.push(MemUser {
            id: id.to_string(),
            name: name.to_string(),
            contact_id: contact.map(str::to_string),
            account_id: account.map(str::to_string),
        });
        self
    }

    pub fn created_of<'a>(&'a self, sobject: &'a str) -> impl Iterator<Item = &'a Created> + 'a {
        self.created.iter().filter(move |c| c.sobject == sobject)
    }

    pub fn tasks_in(&self, project_id: &str) -> usize {
        self.tasks.iter().filter(|t| t.project_id == project_id).count()
    }

    fn account_json(&self, id: &str, name: &str) -> Value {
        json!({ "attributes": { "type": "Account" }, "Id": id, "Name": name })
    }

    fn project_json(project: &MemProject) -> Value {
        json!({ "Id": project.id, "Name": project.name, "Account__c": project.account_id })
    }
}

fn first_literal(soql: &str) -> Option<String> {
    let start = soql.find('\'')? + 1;
    let end = soql[start..].find('\'')? + start;
    Some(soql[start..end].trim_matches('%').to_string())
}

impl OrgClient for MemoryOrg {
    fn query(&mut self, soql: &str) -> Result<Vec<Value>, OrgError> {
        let literal = first_literal(soql);
        let records = if soql.contains("FROM User") {
            let fragment = literal.unwrap_or_default();
            self.users
                .iter()
                .filter(|u| u.name.contains(&fragment))
                .take(1)
                .map(|u| {
                    json!({
                        "Id": u.id,
                        "Name": u.name,
                        "ContactId": u.contact_id,
                        "Contact": u.account_id.as_ref().map(|a| json!({ "AccountId": a })),
                    })
                })
                .collect()
        } else if soql.contains("FROM Account") {
            self.accounts
                .iter()
                .filter(|(id, _)| literal.as_ref().is_none_or(|wanted| wanted == id))
                .map(|(id, name)| self.account_json(id, name))
                .collect()
        } else if soql.contains("FROM Project__c WHERE Id") {
            self.projects
                .iter()
                .filter(|p| Some(&p.id) == literal.as_ref())
                .map(Self::project_json)
                .collect()
        } else if soql.contains("FROM Project__c WHERE Account__c") {
            self.projects
                .iter()
                .filter(|p| Some(&p.account_id) == literal.as_ref())
                .map(Self::project_json)
                .collect()
        } else if soql.contains("FROM Project__c") {
            self.projects.iter().map(Self::project_json).collect()
        } else if soql.contains("FROM Project_Task__c") {
            self.tasks
                .iter()
                .filter(|t| Some(&t.project_id) == literal.as_ref())
                .map(|t| json!({ "Id": t.id, "Name": t.name, "Project__c": t.project_id }))
                .collect()
        } else if soql.contains("FROM Project_Task_Relationship__c") && self.relationship_field {
            Vec::new()
        } else {
            return Err(OrgError::Command {
                command: format!("sf data query -q {soql}"),
                stderr: "INVALID_FIELD".into(),
                stdout: String::new(),
            });
        };
        Ok(records)
    }

    fn create(&mut self, sobject: &str, values: &[(&str, String)]) -> Result<String, OrgError> {
        self.next_id += 1;
        let id = format!("MEM{:04}", self.next_id);
        let fields: Vec<(String, String)> = values
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let created = Created {
            sobject: sobject.to_string(),
            id: id.clone(),
            fields,
        };
        match sobject {
            "Project__c" => self.projects.push(MemProject {
                id: id.clone(),
                name: created.field("Name").unwrap_or_default().to_string(),
                account_id: created.field("Account__c").unwrap_or_default().to_string(),
            }),
            "Project_Task__c" => self.tasks.push(MemTask {
                id: id.clone(),
                name: created.field("Name").unwrap_or_default().to_string(),
                project_id: created.field("Project__c").unwrap_or_default().to_string(),
            }),
            _ => {}
        }
        self.created.push(created);
        Ok(id)
    }

    fn update(
        &mut self,
        sobject: &str,
        record_id: &str,
        values: &[(&str, String)],
    ) -> Result<(), OrgError> {
        if sobject == "Project_Task__c" {
            if let Some((_, project)) = values.iter().find(|(k, _)| *k == "Project__c") {
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == record_id) {
                    task.project_id = project.clone();
                }
            }
        }
        self.updates.push((
            sobject.to_string(),
            record_id.to_string(),
            values
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        ));
        Ok(())
    }

    fn current_user_id(&mut self) -> Result<String, OrgError> {
        Ok(self.me.clone())
    }
}
