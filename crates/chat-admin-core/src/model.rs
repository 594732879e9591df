use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mode::VerificationMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(pub i64);

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `chat` object embedded in every page payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: ChatId,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserName {
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl UserName {
    #[must_use]
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref() {
            Some(last_name) if !last_name.trim().is_empty() => {
                format!("{} {last_name}", self.first_name)
            }
            _ => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRecord {
    pub id: PermissionId,
    pub user: UserName,
    pub readable: bool,
    pub writable: bool,
    /// Set when this record overrides the chat default.
    pub customized: bool,
}

impl PermissionRecord {
    /// Display form of `customized`.
    #[must_use]
    pub fn kept_in_sync(&self) -> bool {
        !self.customized
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionField {
    Readable,
    Writable,
    Customized,
}

impl PermissionField {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Readable => "readable",
            Self::Writable => "writable",
            Self::Customized => "customized",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsPayload {
    pub chat: ChatSummary,
    #[serde(default)]
    pub permissions: Vec<PermissionRecord>,
}

/// Response of a single field toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionPatch {
    pub permission: PermissionRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheme {
    pub id: i64,
    #[serde(default)]
    pub verification_mode: Option<VerificationMode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemePayload {
    pub chat: ChatSummary,
    #[serde(default)]
    pub scheme: Option<Scheme>,
}

impl SchemePayload {
    /// Row id sent alongside a save; `-1` when the chat has no scheme yet.
    #[must_use]
    pub fn scheme_id_for_save(&self) -> i64 {
        self.scheme.as_ref().map_or(-1, |scheme| scheme.id)
    }
}
