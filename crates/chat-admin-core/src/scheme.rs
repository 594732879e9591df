use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::cache::ResourceCache;
use crate::dispatch::dispatch;
use crate::envelope::decode_envelope;
use crate::error::{AdminError, TransportError};
use crate::fetcher::{ChatSelection, FetchOutcome, RemoteRecordFetcher};
use crate::mode::{ModeSelection, SchemeUpdate, derive_mode_value};
use crate::model::{ChatSummary, SchemePayload};
use crate::notify::ErrorNotifier;
use crate::transport::{AdminTransport, ApiRequest, chat_scheme_path};
use crate::view::{
    PageView, SCHEME_MODE_SECTION, SCHEME_PLACEHOLDER_SECTIONS, SCHEME_TITLE, SchemeView,
    mode_options, page_title,
};

/// Whether the selector holds an uncommitted choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditGate {
    #[default]
    Committed,
    Pending,
}

#[derive(Debug)]
struct SchemeState {
    selection: ChatSelection,
    payload: Option<SchemePayload>,
    mode: ModeSelection,
    gate: EditGate,
    rejected: Option<Vec<String>>,
    decode_error: Option<TransportError>,
}

impl Default for SchemeState {
    fn default() -> Self {
        Self {
            selection: ChatSelection::default(),
            payload: None,
            mode: ModeSelection::SystemDefault,
            gate: EditGate::Committed,
            rejected: None,
            decode_error: None,
        }
    }
}

/// Controller behind the verification scheme page.
pub struct SchemePage<T, N> {
    cache: Rc<ResourceCache<T>>,
    notifier: N,
    fetcher: RemoteRecordFetcher,
    state: RefCell<SchemeState>,
}

impl<T, N> SchemePage<T, N>
where
    T: AdminTransport + 'static,
    N: ErrorNotifier,
{
    #[must_use]
    pub fn new(cache: Rc<ResourceCache<T>>, notifier: N) -> Self {
        Self {
            cache,
            notifier,
            fetcher: RemoteRecordFetcher::new(chat_scheme_path),
            state: RefCell::new(SchemeState::default()),
        }
    }

    #[must_use]
    pub fn mode(&self) -> ModeSelection {
        self.state.borrow().mode
    }

    #[must_use]
    pub fn gate(&self) -> EditGate {
        self.state.borrow().gate
    }

    #[must_use]
    pub fn payload(&self) -> Option<SchemePayload> {
        self.state.borrow().payload.clone()
    }

    /// Mode the server currently holds for the loaded chat.
    #[must_use]
    pub fn committed_mode(&self) -> ModeSelection {
        derive_mode_value(self.state.borrow().payload.as_ref())
    }

    pub async fn sync(&self, selection: &ChatSelection) -> Result<Option<ChatSummary>, AdminError> {
        self.track_selection(selection);
        let outcome = self.fetcher.sync(&self.cache, selection).await;
        self.apply_fetch(outcome)
    }

    pub async fn reload(&self) -> Result<Option<ChatSummary>, AdminError> {
        let outcome = self.fetcher.revalidate(&self.cache).await;
        self.apply_fetch(outcome)
    }

    /// Any selector change opens the gate, including re-selecting the
    /// committed value.
    pub fn select(&self, mode: ModeSelection) {
        let mut state = self.state.borrow_mut();
        state.mode = mode;
        state.gate = EditGate::Pending;
    }

    pub fn cancel(&self) {
        let mut state = self.state.borrow_mut();
        state.mode = derive_mode_value(state.payload.as_ref());
        state.gate = EditGate::Committed;
    }

    /// Saves the tentative mode. On success the gate closes and the scheme is
    /// refetched; on failure the gate and the tentative mode stay as they are.
    /// Without a pending edit nothing is sent.
    pub async fn confirm(&self) -> Result<(), AdminError> {
        let (chat_id, mode, scheme_id) = {
            let state = self.state.borrow();
            let chat_id = state
                .selection
                .active_chat()
                .ok_or(AdminError::NoChatSelected)?;
            let payload = state.payload.as_ref().ok_or(AdminError::NotLoaded)?;
            if state.gate != EditGate::Pending {
                tracing::debug!(chat = %chat_id, "no pending scheme edit to save");
                return Ok(());
            }
            (chat_id, state.mode, payload.scheme_id_for_save())
        };

        let body = serde_json::to_value(SchemeUpdate::from(mode)).map_err(|error| {
            AdminError::Transport(TransportError::Encode {
                message: error.to_string(),
            })
        })?;
        tracing::debug!(chat = %chat_id, scheme_id, ?mode, "saving verification scheme");

        let request = ApiRequest::put(chat_scheme_path(chat_id)).with_json(body);
        let _ack: Value = dispatch(self.cache.transport(), &self.notifier, request).await?;

        {
            let mut state = self.state.borrow_mut();
            if state.selection.active_chat() != Some(chat_id) {
                tracing::debug!(
                    chat = %chat_id,
                    "scheme saved for a chat that is no longer selected"
                );
                return Ok(());
            }
            state.gate = EditGate::Committed;
        }
        tracing::info!(
            chat = %chat_id,
            mode = mode.encode().map_or("system_default", |mode| mode.as_str()),
            "verification scheme saved"
        );

        if let Err(error) = self.reload().await {
            tracing::warn!(chat = %chat_id, error = %error, "scheme refetch after save failed");
        }
        Ok(())
    }

    #[must_use]
    pub fn view(&self) -> PageView<SchemeView> {
        let state = self.state.borrow();
        let fetch_failed = self.fetcher.error().is_some() || state.decode_error.is_some();

        match state.payload.as_ref() {
            Some(payload)
                if state.selection.is_loaded && !fetch_failed && state.rejected.is_none() =>
            {
                PageView::Loaded(SchemeView {
                    title: page_title(SCHEME_TITLE, Some(&payload.chat)),
                    section: SCHEME_MODE_SECTION,
                    mode_options: mode_options(state.mode),
                    selected: state.mode,
                    show_confirm_controls: state.gate == EditGate::Pending,
                    placeholder_sections: SCHEME_PLACEHOLDER_SECTIONS,
                })
            }
            _ if fetch_failed => PageView::Reloading,
            _ => PageView::Loading,
        }
    }

    fn track_selection(&self, selection: &ChatSelection) {
        let mut state = self.state.borrow_mut();
        if state.selection.active_chat() != selection.active_chat() {
            *state = SchemeState {
                selection: *selection,
                ..SchemeState::default()
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
        let decoded = decode_envelope::<SchemePayload>(value);
        let mut state = self.state.borrow_mut();
        match decoded {
            Ok(payload) => {
                if state.selection.active_chat() != Some(payload.chat.id) {
                    tracing::debug!(
                        chat = %payload.chat.id,
                        "dropping scheme of an unselected chat"
                    );
                    return Err(AdminError::Stale);
                }
                state.mode = derive_mode_value(Some(&payload));
                state.gate = EditGate::Committed;
                state.rejected = None;
                state.decode_error = None;
                let chat = payload.chat.clone();
                state.payload = Some(payload);
                Ok(Some(chat))
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
