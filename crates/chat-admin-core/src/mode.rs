use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::SchemePayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMode {
    Image,
    Custom,
    Arithmetic,
    Initiative,
}

impl VerificationMode {
    pub const ALL: [Self; 4] = [Self::Image, Self::Custom, Self::Arithmetic, Self::Initiative];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Custom => "custom",
            Self::Arithmetic => "arithmetic",
            Self::Initiative => "initiative",
        }
    }
}

/// What the mode selector shows. `SystemDefault` is never sent as a mode; it
/// travels as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeSelection {
    Named(VerificationMode),
    SystemDefault,
}

/// Selector options in display order.
pub const MODE_OPTIONS: [ModeSelection; 5] = [
    ModeSelection::Named(VerificationMode::Image),
    ModeSelection::Named(VerificationMode::Custom),
    ModeSelection::Named(VerificationMode::Arithmetic),
    ModeSelection::Named(VerificationMode::Initiative),
    ModeSelection::SystemDefault,
];

impl ModeSelection {
    #[must_use]
    pub fn option_value(self) -> u8 {
        match self {
            Self::Named(VerificationMode::Image) => 0,
            Self::Named(VerificationMode::Custom) => 1,
            Self::Named(VerificationMode::Arithmetic) => 2,
            Self::Named(VerificationMode::Initiative) => 3,
            Self::SystemDefault => 4,
        }
    }

    #[must_use]
    pub fn from_option_value(value: u8) -> Option<Self> {
        MODE_OPTIONS.get(usize::from(value)).copied()
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Named(VerificationMode::Image) => "图片验证",
            Self::Named(VerificationMode::Custom) => "定制验证",
            Self::Named(VerificationMode::Arithmetic) => "算术验证",
            Self::Named(VerificationMode::Initiative) => "主动验证",
            Self::SystemDefault => "系统默认",
        }
    }

    #[must_use]
    pub fn encode(self) -> Option<VerificationMode> {
        match self {
            Self::Named(mode) => Some(mode),
            Self::SystemDefault => None,
        }
    }

    #[must_use]
    pub fn decode(mode: Option<VerificationMode>) -> Self {
        mode.map_or(Self::SystemDefault, Self::Named)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown verification mode `{0}`")]
pub struct ModeParseError(pub String);

impl FromStr for ModeSelection {
    type Err = ModeParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        if matches!(normalized.as_str(), "default" | "system_default" | "system-default") {
            return Ok(Self::SystemDefault);
        }
        VerificationMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .map(Self::Named)
            .ok_or_else(|| ModeParseError(raw.to_string()))
    }
}

/// Committed selector value for a loaded (or missing) scheme payload.
#[must_use]
pub fn derive_mode_value(payload: Option<&SchemePayload>) -> ModeSelection {
    ModeSelection::decode(
        payload
            .and_then(|payload| payload.scheme.as_ref())
            .and_then(|scheme| scheme.verification_mode),
    )
}

/// Body of `PUT /admin/api/chats/{chat}/scheme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemeUpdate {
    pub verification_mode: Option<VerificationMode>,
}

impl From<ModeSelection> for SchemeUpdate {
    fn from(selection: ModeSelection) -> Self {
        Self {
            verification_mode: selection.encode(),
        }
    }
}
