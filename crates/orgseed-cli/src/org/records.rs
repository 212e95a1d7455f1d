use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Account__c", default)]
    pub account_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectTask {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Project__c", default)]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContactRef {
    #[serde(rename = "AccountId", default)]
    pub account_id: Option<String>,
}

/// A `User` row together with its portal contact, if it has one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Username", default)]
    pub username: Option<String>,
    #[serde(rename = "ContactId", default)]
    pub contact_id: Option<String>,
    #[serde(rename = "Contact", default)]
    pub contact: Option<ContactRef>,
}

impl UserRecord {
    /// The account of the user's contact.
    pub fn account_id(&self) -> Option<&str> {
        self.contact
            .as_ref()
            .and_then(|contact| contact.account_id.as_deref())
    }
}
