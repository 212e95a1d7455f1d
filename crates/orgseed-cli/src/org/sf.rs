use std::process::Command;

use serde_json::Value;
use tracing::{Level, event};

use super::{OrgClient, OrgError, fetch, records::UserRecord, soql_literal};

/// Talks to an org through the Salesforce CLI (`sf ... --json`).
#[derive(Debug, Clone)]
pub struct SfCli {
    binary: String,
    org: String,
}

impl SfCli {
    pub fn new(binary: impl Into<String>, org: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            org: org.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Value, OrgError> {
        let command = format!("{} {}", self.binary, args.join(" "));
        event!(
            target: "orgseed::sf",
            Level::DEBUG,
            command = %command,
            "invoking sf"
        );

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|source| OrgError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OrgError::Command {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|source| OrgError::Protocol {
            output: String::from_utf8_lossy(&output.stdout).into_owned(),
            source,
        })
    }

    fn display_org(&self) -> Result<Value, OrgError> {
        self.run(&["org", "display", "--target-org", self.org.as_str(), "--json"])
    }
}

impl OrgClient for SfCli {
    fn query(&mut self, soql: &str) -> Result<Vec<Value>, OrgError> {
        let response = self.run(&[
            "data",
            "query",
            "--target-org",
            self.org.as_str(),
            "-q",
            soql,
            "--json",
        ])?;
        Ok(records_of(&response))
    }

    fn create(&mut self, sobject: &str, values: &[(&str, String)]) -> Result<String, OrgError> {
        let encoded = encode_values(values);
        let response = self.run(&[
            "data",
            "create",
            "record",
            "--target-org",
            self.org.as_str(),
            "--sobject",
            sobject,
            "--values",
            encoded.as_str(),
            "--json",
        ])?;
        result_str(&response, "id")
            .map(str::to_string)
            .ok_or(OrgError::MissingField {
                action: "create",
                field: "result.id",
            })
    }

    fn update(
        &mut self,
        sobject: &str,
        record_id: &str,
        values: &[(&str, String)],
    ) -> Result<(), OrgError> {
        let encoded = encode_values(values);
        let response = self.run(&[
            "data",
            "update",
            "record",
            "--target-org",
            self.org.as_str(),
            "--sobject",
            sobject,
            "--record-id",
            record_id,
            "--values",
            encoded.as_str(),
            "--json",
        ])?;
        if response.get("status").and_then(Value::as_i64) != Some(0) {
            return Err(OrgError::UpdateRejected {
                sobject: sobject.to_string(),
                record_id: record_id.to_string(),
                response: response.to_string(),
            });
        }
        Ok(())
    }

    fn current_user_id(&mut self) -> Result<String, OrgError> {
        let display = self.display_org()?;
        user_id_from_display(&display, self)
    }
}

/// Reads `result.userId` from an `org display` response, falling back to a `User` lookup by
/// `result.username`.
fn user_id_from_display<C: OrgClient + ?Sized>(
    display: &Value,
    client: &mut C,
) -> Result<String, OrgError> {
    if let Some(user_id) = result_str(display, "userId") {
        return Ok(user_id.to_string());
    }

    let username = result_str(display, "username")
        .ok_or_else(|| OrgError::UnknownUser("org display reported no username".into()))?;
    let users: Vec<UserRecord> = fetch(
        client,
        "user",
        &format!(
            "SELECT Id FROM User WHERE Username = {} LIMIT 1",
            soql_literal(username)
        ),
    )?;
    users
        .into_iter()
        .next()
        .map(|user| user.id)
        .ok_or_else(|| OrgError::UnknownUser(format!("no user id for {username}")))
}

/// Encodes field values the way `sf data create/update record --values` expects: `Name='x' Other='y'`.
pub fn encode_values(values: &[(&str, String)]) -> String {
    values
        .iter()
        .map(|(field, value)| format!("{field}='{}'", value.replace('\'', "\\'")))
        .collect::<Vec<_>>()
        .join(" ")
}

fn records_of(response: &Value) -> Vec<Value> {
    response
        .get("result")
        .and_then(|result| result.get("records"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn result_str<'a>(response: &'a Value, field: &str) -> Option<&'a str> {
    response
        .get("result")
        .and_then(|result| result.get(field))
        .and_then(Value::as_str)
}
