use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::cache::ResourceCache;
use crate::dispatch::dispatch;
use crate::envelope::decode_envelope;
use crate::error::{AdminError, TransportError};
use crate::fetcher::{ChatSelection, FetchOutcome, RemoteRecordFetcher};
use crate::model::{
    ChatSummary, PermissionField, PermissionId, PermissionPatch, PermissionRecord,
    PermissionsPayload,
};
use crate::notify::ErrorNotifier;
use crate::transport::{
    AdminTransport, ApiRequest, chat_permissions_path, permission_field_path,
    permission_withdraw_path,
};
use crate::view::{
    PERMISSIONS_SECTION, PERMISSIONS_TITLE, PageView, PermissionRow, PermissionsView, page_title,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    /// The server accepted the write but the record is no longer listed
    /// locally, so nothing was patched.
    Ignored,
}

#[derive(Debug, Default)]
struct PermissionsState {
    selection: ChatSelection,
    records: Vec<PermissionRecord>,
    loaded_chat: Option<ChatSummary>,
    rejected: Option<Vec<String>>,
    decode_error: Option<TransportError>,
}

/// Controller behind the per-user permissions table of one chat.
///
/// `records` is reset from every new payload object and otherwise only
/// changes after the server confirms a toggle or withdrawal. Writes are
/// addressed by record id: the row index given by the caller is resolved
/// when the action starts, and the result is applied to wherever that id
/// sits when the response arrives.
pub struct PermissionsPage<T, N> {
    cache: Rc<ResourceCache<T>>,
    notifier: N,
    fetcher: RemoteRecordFetcher,
    state: RefCell<PermissionsState>,
}

impl<T, N> PermissionsPage<T, N>
where
    T: AdminTransport + 'static,
    N: ErrorNotifier,
{
    #[must_use]
    pub fn new(cache: Rc<ResourceCache<T>>, notifier: N) -> Self {
        Self {
            cache,
            notifier,
            fetcher: RemoteRecordFetcher::new(chat_permissions_path),
            state: RefCell::new(PermissionsState::default()),
        }
    }

    #[must_use]
    pub fn records(&self) -> Vec<PermissionRecord> {
        self.state.borrow().records.clone()
    }

    #[must_use]
    pub fn loaded_chat(&self) -> Option<ChatSummary> {
        self.state.borrow().loaded_chat.clone()
    }

    /// Loads the permissions of the selected chat. Returns the chat summary
    /// whenever a new payload was applied so the shell can refresh its own
    /// copy of the chat.
    pub async fn sync(&self, selection: &ChatSelection) -> Result<Option<ChatSummary>, AdminError> {
        self.track_selection(selection);
        let outcome = self.fetcher.sync(&self.cache, selection).await;
        self.apply_fetch(outcome)
    }

    /// Retry control: refetches regardless of cache state.
    pub async fn reload(&self) -> Result<Option<ChatSummary>, AdminError> {
        let outcome = self.fetcher.revalidate(&self.cache).await;
        self.apply_fetch(outcome)
    }

    pub async fn toggle_field(
        &self,
        field: PermissionField,
        index: usize,
        value: bool,
    ) -> Result<MutationOutcome, AdminError> {
        let id = self.record_id(index)?;
        self.toggle_field_by_id(field, id, value).await
    }

    /// The "kept in sync" switch is the inverse of `customized`.
    pub async fn toggle_kept_in_sync(
        &self,
        index: usize,
        kept_in_sync: bool,
    ) -> Result<MutationOutcome, AdminError> {
        self.toggle_field(PermissionField::Customized, index, !kept_in_sync)
            .await
    }

    pub async fn toggle_field_by_id(
        &self,
        field: PermissionField,
        id: PermissionId,
        value: bool,
    ) -> Result<MutationOutcome, AdminError> {
        let request = ApiRequest::put(permission_field_path(id, field, value));
        let patch: PermissionPatch =
            dispatch(self.cache.transport(), &self.notifier, request).await?;

        let mut state = self.state.borrow_mut();
        let Some(slot) = state.records.iter_mut().find(|record| record.id == id) else {
            tracing::debug!(%id, field = field.as_str(), "toggled record is no longer listed");
            return Ok(MutationOutcome::Ignored);
        };
        *slot = patch.permission;
        Ok(MutationOutcome::Applied)
    }

    pub async fn withdraw(&self, index: usize) -> Result<MutationOutcome, AdminError> {
        let id = self.record_id(index)?;
        self.withdraw_by_id(id).await
    }

    pub async fn withdraw_by_id(&self, id: PermissionId) -> Result<MutationOutcome, AdminError> {
        let request = ApiRequest::delete(permission_withdraw_path(id));
        let _ack: Value = dispatch(self.cache.transport(), &self.notifier, request).await?;

        let mut state = self.state.borrow_mut();
        let before = state.records.len();
        state.records.retain(|record| record.id != id);
        if state.records.len() == before {
            tracing::debug!(%id, "withdrawn record is no longer listed");
            return Ok(MutationOutcome::Ignored);
        }
        Ok(MutationOutcome::Applied)
    }

    /// The "sync" row action has no endpoint yet.
    pub fn sync_with_default(&self, index: usize) -> Result<MutationOutcome, AdminError> {
        let id = self.record_id(index)?;
        tracing::debug!(%id, "sync action is not wired to an endpoint");
        Err(AdminError::NotImplemented("sync"))
    }

    /// The "disable" row action has no endpoint yet.
    pub fn disable(&self, index: usize) -> Result<MutationOutcome, AdminError> {
        let id = self.record_id(index)?;
        tracing::debug!(%id, "disable action is not wired to an endpoint");
        Err(AdminError::NotImplemented("disable"))
    }

    #[must_use]
    pub fn view(&self) -> PageView<PermissionsView> {
        let state = self.state.borrow();
        let fetch_failed = self.fetcher.error().is_some() || state.decode_error.is_some();

        match state.loaded_chat.as_ref() {
            Some(chat) if state.selection.is_loaded && !fetch_failed && state.rejected.is_none() => {
                PageView::Loaded(PermissionsView {
                    title: page_title(PERMISSIONS_TITLE, Some(chat)),
                    section: PERMISSIONS_SECTION,
                    rows: state.records.iter().map(PermissionRow::from).collect(),
                })
            }
            _ if fetch_failed => PageView::Reloading,
            _ => PageView::Loading,
        }
    }

    #[must_use]
    pub fn title(&self) -> String {
        match self.view() {
            PageView::Loaded(view) => view.title,
            PageView::Loading | PageView::Reloading => page_title(PERMISSIONS_TITLE, None),
        }
    }

    fn record_id(&self, index: usize) -> Result<PermissionId, AdminError> {
        self.state
            .borrow()
            .records
            .get(index)
            .map(|record| record.id)
            .ok_or(AdminError::RecordMissing(index))
    }

    fn track_selection(&self, selection: &ChatSelection) {
        let mut state = self.state.borrow_mut();
        if state.selection.active_chat() != selection.active_chat() {
            *state = PermissionsState {
                selection: *selection,
                ..PermissionsState::default()
            };
        } else {
            state.selection = *selection;
        }
    }

    fn apply_fetch(&self, outcome: FetchOutcome) -> Result<Option<ChatSummary>, AdminError> {
        match outcome {
            FetchOutcome::Idle | FetchOutcome::Unchanged => Ok(None),
            FetchOutcome::Stale => Err(AdminError::Stale),
            FetchOutcome::Failed(error) => Err(AdminError::Transport(error)),
            FetchOutcome::Fresh(value) => self.apply_payload(&value),
        }
    }

    fn apply_payload(&self, value: &Value) -> Result<Option<ChatSummary>, AdminError> {
        let decoded = decode_envelope::<PermissionsPayload>(value);
        let mut state = self.state.borrow_mut();
        match decoded {
            Ok(payload) => {
                if state.selection.active_chat() != Some(payload.chat.id) {
                    tracing::debug!(
                        chat = %payload.chat.id,
                        "dropping permissions of an unselected chat"
                    );
                    return Err(AdminError::Stale);
                }
                state.records = payload.permissions;
                state.loaded_chat = Some(payload.chat.clone());
                state.rejected = None;
                state.decode_error = None;
                tracing::debug!(
                    chat = %payload.chat.id,
                    records = state.records.len(),
                    "permissions reset from fetched payload"
                );
                Ok(Some(payload.chat))
            }
            Err(AdminError::Application(errors)) => {
                state.rejected = Some(errors.clone());
                drop(state);
                self.notifier.show_errors(&errors);
                Err(AdminError::Application(errors))
            }
            Err(AdminError::Transport(error)) => {
                state.decode_error = Some(error.clone());
                Err(AdminError::Transport(error))
            }
            Err(other) => Err(other),
        }
    }
}
