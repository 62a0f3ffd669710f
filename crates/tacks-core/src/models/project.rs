//! Project model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{SyncStatus, Syncable};

/// A unique identifier for a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Create a new unique project ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }

    /// The underlying UUID, for type-erased contexts
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ProjectId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A project grouping tasks on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier
    pub id: ProjectId,
    /// Project name
    pub name: String,
    /// Display color as a `#rrggbb` hex string
    pub color: String,
    /// Server-incremented update counter
    pub version: i64,
    /// Epoch ms of the latest known mutation
    pub last_modified: i64,
    /// Informational sync tag
    #[serde(default)]
    pub sync_status: SyncStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last server-side update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project with the given name and color.
    #[must_use]
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            name: name.into(),
            color: color.into(),
            version: 1,
            last_modified: now.timestamp_millis(),
            sync_status: SyncStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Syncable for Project {
    fn merge_id(&self) -> Uuid {
        self.id.as_uuid()
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn last_modified(&self) -> i64 {
        self.last_modified
    }
}

/// Fields a caller provides when creating a project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    pub name: String,
    pub color: String,
}

/// Partial update for a project; only present fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Check whether text is a `#rrggbb` hex color.
///
/// # Examples
///
/// ```
/// use tacks_core::models::is_hex_color;
///
/// assert!(is_hex_color("#ff8800"));
/// assert!(!is_hex_color("red"));
/// ```
#[must_use]
pub fn is_hex_color(value: &str) -> bool {
    let re = Regex::new(r"^#[0-9a-fA-F]{6}$").expect("Invalid regex");
    re.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_new() {
        let project = Project::new("Inbox", "#4477aa");
        assert_eq!(project.name, "Inbox");
        assert_eq!(project.version, 1);
        assert!(project.last_modified > 0);
    }

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#000000"));
        assert!(is_hex_color("#AbCdEf"));
        assert!(!is_hex_color("#abc"));
        assert!(!is_hex_color("#gggggg"));
        assert!(!is_hex_color("4477aa"));
    }

    #[test]
    fn test_project_wire_format() {
        let project = Project::new("Wire", "#112233");
        let json = serde_json::to_value(&project).unwrap();
        assert!(json.get("lastModified").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
