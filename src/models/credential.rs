use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Login stored for one site.
///
/// The password is persisted under the `pass` key for compatibility with
/// existing vault files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Record {
    pub username: String,
    #[serde(rename = "pass")]
    pub password: String,
}

impl Record {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Entire persisted state: site name to record.
pub type RecordSet = BTreeMap<String, Record>;
