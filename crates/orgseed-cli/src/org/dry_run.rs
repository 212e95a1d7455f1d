use serde_json::Value;
use tracing::{Level, event};

use super::{OrgClient, OrgError, encode_values};

/// A write that a dry run reported instead of performing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedWrite {
    Create {
        sobject: String,
        id: String,
        values: String,
    },
    Update {
        sobject: String,
        record_id: String,
        values: String,
    },
}

/// Reads through to `inner`; creates and updates are printed and recorded but never sent.
///
/// Created records get placeholder ids (`DRY0001`, `DRY0002`, ...) so later steps can link to them.
#[derive(Debug)]
pub struct DryRunClient<C> {
    inner: C,
    planned: Vec<PlannedWrite>,
    next_id: usize,
}

impl<C: OrgClient> DryRunClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            planned: Vec::new(),
            next_id: 1,
        }
    }

    pub fn planned(&self) -> &[PlannedWrite] {
        &self.planned
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: OrgClient> OrgClient for DryRunClient<C> {
    fn query(&mut self, soql: &str) -> Result<Vec<Value>, OrgError> {
        self.inner.query(soql)
    }

    fn create(&mut self, sobject: &str, values: &[(&str, String)]) -> Result<String, OrgError> {
        let id = format!("DRY{:04}", self.next_id);
        self.next_id += 1;
        let encoded = encode_values(values);
        println!("[dry-run] Would create {sobject}: {encoded}");
        event!(
            target: "orgseed::dry_run",
            Level::DEBUG,
            sobject,
            placeholder_id = %id,
            "skipped create"
        );
        self.planned.push(PlannedWrite::Create {
            sobject: sobject.to_string(),
            id: id.clone(),
            values: encoded,
        });
        Ok(id)
    }

    fn update(
        &mut self,
        sobject: &str,
        record_id: &str,
        values: &[(&str, String)],
    ) -> Result<(), OrgError> {
        let encoded = encode_values(values);
        println!("[dry-run] Would update {sobject} {record_id}: {encoded}");
        self.planned.push(PlannedWrite::Update {
            sobject: sobject.to_string(),
            record_id: record_id.to_string(),
            values: encoded,
        });
        Ok(())
    }

    fn current_user_id(&mut self) -> Result<String, OrgError> {
        self.inner.current_user_id()
    }

    fn field_exists(&mut self, sobject: &str, field: &str) -> bool {
        self.inner.field_exists(sobject, field)
    }
}
