//! Access to the target CRM org.
//!
//! - `sf`: the real client, shelling out to the Salesforce CLI.
//! - `dry_run`: a wrapper that reads through to another client but only reports writes.
//! - `records`: typed views of the records the tools read.

mod dry_run;
mod records;
mod sf;

pub use dry_run::{DryRunClient, PlannedWrite};
pub use records::{Account, ContactRef, Project, ProjectTask, UserRecord};
pub use sf::{SfCli, encode_values};

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub const PROJECT_SOBJECT: &str = "Project__c";
pub const TASK_SOBJECT: &str = "Project_Task__c";
pub const RELATIONSHIP_SOBJECT: &str = "Project_Task_Relationship__c";

/// The four record operations the tools need, plus identity of the authenticated user.
pub trait OrgClient {
    /// Runs a SOQL query and returns the raw records.
    fn query(&mut self, soql: &str) -> Result<Vec<Value>, OrgError>;

    /// Creates a record and returns its id.
    fn create(&mut self, sobject: &str, values: &[(&str, String)]) -> Result<String, OrgError>;

    fn update(
        &mut self,
        sobject: &str,
        record_id: &str,
        values: &[(&str, String)],
    ) -> Result<(), OrgError>;

    fn current_user_id(&mut self) -> Result<String, OrgError>;

    /// Probes whether `field` exists on `sobject` by selecting it.
    fn field_exists(&mut self, sobject: &str, field: &str) -> bool {
        self.query(&format!("SELECT Id, {field} FROM {sobject} LIMIT 1"))
            .is_ok()
    }
}

/// Runs `soql` and decodes every record as `T`.
pub fn fetch<T, C>(client: &mut C, what: &'static str, soql: &str) -> Result<Vec<T>, OrgError>
where
    T: DeserializeOwned,
    C: OrgClient + ?Sized,
{
    client
        .query(soql)?
        .into_iter()
        .map(|record| serde_json::from_value(record).map_err(|source| OrgError::Decode { what, source }))
        .collect()
}

/// Quotes `value` as a SOQL string literal.
pub fn soql_literal(value: &str) -> String {
    format!("'{}'", escape_soql(value))
}

/// Quotes `fragment` as a `LIKE` pattern matching any value that contains it.
pub fn soql_contains(fragment: &str) -> String {
    format!("'%{}%'", escape_soql(fragment))
}

fn escape_soql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[derive(Debug, Error)]
pub enum OrgError {
    #[error("failed to spawn `{binary}`: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("sf command failed: {command}\nSTDERR: {stderr}\nSTDOUT: {stdout}")]
    Command {
        command: String,
        stderr: String,
        stdout: String,
    },
    #[error("could not parse sf JSON output: {output}")]
    Protocol {
        output: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{action} response is missing `{field}`")]
    MissingField {
        action: &'static str,
        field: &'static str,
    },
    #[error("update of {sobject} {record_id} was rejected: {response}")]
    UpdateRejected {
        sobject: String,
        record_id: String,
        response: String,
    },
    #[error("could not decode {what} record: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not determine the current user: {0}")]
    UnknownUser(String),
}
