//! Records of changes made (or planned) by a sync run.

use serde::Serialize;
use std::fmt;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    New,
    Update,
    Delete,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::New => "new",
            ActionKind::Update => "update",
            ActionKind::Delete => "delete",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad so `{:<6}` lines up the verbs
        f.pad(self.as_str())
    }
}

/// One entry of the audit trail.
///
/// For `new` and `update` the location is the target just written; for
/// `delete` it is the redirect the object carried before removal.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ActionRecord {
    #[serde(rename = "action")]
    pub kind: ActionKind,
    pub key: String,
    pub location: String,
}

impl ActionRecord {
    pub fn new(kind: ActionKind, key: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            location: location.into(),
        }
    }
}

impl fmt::Display for ActionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<6} {} {}", self.kind, self.key, self.location)
    }
}
