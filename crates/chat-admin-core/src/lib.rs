//! Page controllers for the chat admin panel.
//!
//! Two controllers share one shape: a [`fetcher::RemoteRecordFetcher`] keyed on
//! the selected chat, a local mirror of the editable part of the payload, and
//! a mutation path that writes to the server and reconciles the mirror only
//! after the server confirms.

pub mod cache;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod fetcher;
pub mod mode;
pub mod model;
pub mod notify;
pub mod permissions;
pub mod scheme;
pub mod transport;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::ResourceCache;
pub use error::{AdminError, TransportError};
pub use fetcher::{ChatSelection, FetchOutcome, RemoteRecordFetcher};
pub use mode::{ModeSelection, SchemeUpdate, VerificationMode, derive_mode_value};
pub use model::{
    ChatId, ChatSummary, PermissionField, PermissionId, PermissionRecord, PermissionsPayload,
    Scheme, SchemePayload, UserName,
};
pub use notify::{ErrorNotifier, TracingNotifier};
pub use permissions::{MutationOutcome, PermissionsPage};
pub use scheme::{EditGate, SchemePage};
pub use transport::{AdminTransport, ApiRequest, HttpMethod};
pub use view::{PageView, PermissionRow, PermissionsView, SchemeView};
