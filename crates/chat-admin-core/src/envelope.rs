use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AdminError, TransportError};

/// Messages of a response's `errors` field, or `None` when it carries none.
#[must_use]
pub fn application_errors(value: &Value) -> Option<Vec<String>> {
    let messages = match value.get("errors")? {
        Value::Array(errors) => errors
            .iter()
            .map(|error| match error {
                Value::String(message) => message.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>(),
        Value::String(message) if !message.trim().is_empty() => vec![message.clone()],
        _ => Vec::new(),
    };
    if messages.is_empty() {
        None
    } else {
        Some(messages)
    }
}

/// Treats a non-empty `errors` field as failure regardless of anything else
/// in the body, then decodes the success shape.
pub fn decode_envelope<T>(value: &Value) -> Result<T, AdminError>
where
    T: DeserializeOwned,
{
    if let Some(errors) = application_errors(value) {
        return Err(AdminError::Application(errors));
    }
    T::deserialize(value).map_err(|error| {
        AdminError::Transport(TransportError::Decode {
            message: error.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::PermissionPatch;

    #[test]
    fn non_empty_errors_win_over_payload() {
        let response = json!({
            "errors": ["x"],
            "permission": {
                "id": 1,
                "user": {"firstName": "a"},
                "readable": true,
                "writable": true,
                "customized": false
            }
        });
        let result = decode_envelope::<PermissionPatch>(&response);
        assert_eq!(result, Err(AdminError::Application(vec!["x".to_string()])));
    }

    #[test]
    fn empty_errors_are_not_a_failure() {
        assert_eq!(application_errors(&json!({"errors": []})), None);
        assert_eq!(application_errors(&json!({})), None);
        assert_eq!(
            application_errors(&json!({"errors": [{"code": 3}, "denied"]})),
            Some(vec!["{\"code\":3}".to_string(), "denied".to_string()])
        );
    }

    #[test]
    fn shape_mismatch_is_a_decode_failure() {
        let result = decode_envelope::<PermissionPatch>(&json!({"ok": true}));
        assert!(matches!(
            result,
            Err(AdminError::Transport(TransportError::Decode { .. }))
        ));
    }
}
