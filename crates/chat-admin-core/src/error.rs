use thiserror::Error;

/// The request itself failed: no usable response reached the page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("admin_client_base_url_missing")]
    BaseUrlMissing,
    #[error("admin_client_invalid_path")]
    InvalidPath,
    #[error("admin_request_failed:{message}")]
    Request { message: String },
    #[error("admin_read_failed:{message}")]
    Read { message: String },
    #[error("admin_http_{status}:{body}")]
    Http { status: u16, body: String },
    #[error("admin_json_encode_failed:{message}")]
    Encode { message: String },
    #[error("admin_json_decode_failed:{message}")]
    Decode { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The response decoded but carried a non-empty `errors` list.
    #[error("{}", .0.join("; "))]
    Application(Vec<String>),
    #[error("response belongs to a chat that is no longer selected")]
    Stale,
    #[error("action `{0}` is not implemented")]
    NotImplemented(&'static str),
    #[error("no chat selected")]
    NoChatSelected,
    #[error("page data has not loaded yet")]
    NotLoaded,
    #[error("no permission record at index {0}")]
    RecordMissing(usize),
}

impl AdminError {
    /// Messages in the form handed to an [`crate::ErrorNotifier`].
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Application(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }

    #[must_use]
    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application(_))
    }
}
