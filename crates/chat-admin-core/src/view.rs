//! Render-ready projections of controller state.

use crate::mode::{MODE_OPTIONS, ModeSelection};
use crate::model::{ChatSummary, PermissionId, PermissionRecord};

pub const PERMISSIONS_TITLE: &str = "管理员权限";
pub const PERMISSIONS_SECTION: &str = "权限列表";
pub const SCHEME_TITLE: &str = "验证方案";
pub const SCHEME_MODE_SECTION: &str = "验证方式";
pub const SCHEME_PLACEHOLDER_SECTIONS: [&str; 3] = ["验证场合", "验证入口", "击杀方式"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageView<T> {
    Loading,
    /// The fetch failed; only a retry control is shown.
    Reloading,
    Loaded(T),
}

impl<T> PageView<T> {
    #[must_use]
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(view) => Some(view),
            Self::Loading | Self::Reloading => None,
        }
    }
}

#[must_use]
pub fn page_title(base: &str, chat: Option<&ChatSummary>) -> String {
    match chat {
        Some(chat) => format!("{base} / {}", chat.title),
        None => base.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Sync,
    Disable,
    Withdraw,
}

impl RowAction {
    pub const ALL: [Self; 3] = [Self::Sync, Self::Disable, Self::Withdraw];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Sync => "同步",
            Self::Disable => "禁用",
            Self::Withdraw => "撤销",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRow {
    pub id: PermissionId,
    pub display_name: String,
    pub readable: bool,
    pub writable: bool,
    pub kept_in_sync: bool,
    pub actions: [RowAction; 3],
}

impl From<&PermissionRecord> for PermissionRow {
    fn from(record: &PermissionRecord) -> Self {
        Self {
            id: record.id,
            display_name: record.user.full_name(),
            readable: record.readable,
            writable: record.writable,
            kept_in_sync: record.kept_in_sync(),
            actions: RowAction::ALL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionsView {
    pub title: String,
    pub section: &'static str,
    pub rows: Vec<PermissionRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeOption {
    pub value: u8,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeView {
    pub title: String,
    pub section: &'static str,
    pub mode_options: Vec<ModeOption>,
    pub selected: ModeSelection,
    pub show_confirm_controls: bool,
    pub placeholder_sections: [&'static str; 3],
}

#[must_use]
pub fn mode_options(selected: ModeSelection) -> Vec<ModeOption> {
    MODE_OPTIONS
        .iter()
        .map(|option| ModeOption {
            value: option.option_value(),
            label: option.label(),
            selected: *option == selected,
        })
        .collect()
}
