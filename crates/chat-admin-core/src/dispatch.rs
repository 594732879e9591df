use serde::de::DeserializeOwned;

use crate::envelope::decode_envelope;
use crate::error::AdminError;
use crate::notify::ErrorNotifier;
use crate::transport::{AdminTransport, ApiRequest};

/// Issues exactly one write and decodes its response.
///
/// Every failure is shown through `notifier` once before it is returned; the
/// caller only touches its local state on `Ok`.
pub async fn dispatch<T, N, R>(transport: &T, notifier: &N, request: ApiRequest) -> Result<R, AdminError>
where
    T: AdminTransport + ?Sized,
    N: ErrorNotifier + ?Sized,
    R: DeserializeOwned,
{
    let method = request.method;
    let path = request.path.clone();
    tracing::debug!(method = method.as_str(), path = %path, "dispatching admin write");

    let outcome = match transport.send(request).await {
        Ok(response) => decode_envelope::<R>(&response),
        Err(error) => Err(AdminError::Transport(error)),
    };

    if let Err(error) = &outcome {
        tracing::debug!(method = method.as_str(), path = %path, error = %error, "admin write failed");
        notifier.show_errors(&error.messages());
    }
    outcome
}
