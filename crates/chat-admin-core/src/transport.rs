use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::model::{ChatId, PermissionField, PermissionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }
}

/// Sends one request and returns the decoded body with keys already
/// translated to camelCase. Application errors travel inside the body.
#[async_trait(?Send)]
pub trait AdminTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError>;
}

#[async_trait(?Send)]
impl<T> AdminTransport for Rc<T>
where
    T: AdminTransport + ?Sized,
{
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        (**self).send(request).await
    }
}

#[must_use]
pub fn chat_permissions_path(chat_id: ChatId) -> String {
    format!("/admin/api/chats/{chat_id}/permissions")
}

#[must_use]
pub fn chat_scheme_path(chat_id: ChatId) -> String {
    format!("/admin/api/chats/{chat_id}/scheme")
}

#[must_use]
pub fn permission_field_path(id: PermissionId, field: PermissionField, value: bool) -> String {
    format!("/admin/api/permissions/{id}/{}?value={value}", field.as_str())
}

#[must_use]
pub fn permission_withdraw_path(id: PermissionId) -> String {
    format!("/admin/api/permissions/{id}/withdraw")
}
