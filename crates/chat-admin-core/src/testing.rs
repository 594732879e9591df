use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use crate::error::TransportError;
use crate::notify::ErrorNotifier;
use crate::transport::{AdminTransport, ApiRequest, HttpMethod};

type Script = VecDeque<Result<Value, TransportError>>;

/// Transport answering from per-route scripts. The last scripted answer of a
/// route repeats; earlier ones are consumed in order.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    scripts: RefCell<HashMap<(HttpMethod, String), Script>>,
    gates: RefCell<HashMap<String, Rc<Notify>>>,
    calls: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn respond(&self, method: HttpMethod, path: &str, value: Value) {
        self.replace(method, path, Ok(value));
    }

    pub(crate) fn fail(&self, method: HttpMethod, path: &str, error: TransportError) {
        self.replace(method, path, Err(error));
    }

    pub(crate) fn enqueue(&self, method: HttpMethod, path: &str, value: Value) {
        self.scripts
            .borrow_mut()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(Ok(value));
    }

    /// Holds the next request to `path` until the returned handle is notified.
    pub(crate) fn gate(&self, path: &str) -> Rc<Notify> {
        let notify = Rc::new(Notify::new());
        self.gates
            .borrow_mut()
            .insert(path.to_string(), Rc::clone(&notify));
        notify
    }

    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.calls.borrow().clone()
    }

    pub(crate) fn writes(&self) -> Vec<ApiRequest> {
        self.calls
            .borrow()
            .iter()
            .filter(|request| request.method != HttpMethod::Get)
            .cloned()
            .collect()
    }

    fn replace(&self, method: HttpMethod, path: &str, result: Result<Value, TransportError>) {
        self.scripts
            .borrow_mut()
            .insert((method, path.to_string()), VecDeque::from([result]));
    }

    fn next_answer(&self, request: &ApiRequest) -> Result<Value, TransportError> {
        let mut scripts = self.scripts.borrow_mut();
        let Some(script) = scripts.get_mut(&(request.method, request.path.clone())) else {
            return Err(TransportError::Http {
                status: 404,
                body: format!("no script for {} {}", request.method.as_str(), request.path),
            });
        };
        if script.len() > 1 {
            script.pop_front().unwrap_or_else(|| Ok(Value::Null))
        } else {
            script.front().cloned().unwrap_or_else(|| Ok(Value::Null))
        }
    }
}

#[async_trait(?Send)]
impl AdminTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        self.calls.borrow_mut().push(request.clone());
        let gate = self.gates.borrow_mut().remove(&request.path);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.next_answer(&request)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingNotifier {
    shown: Rc<RefCell<Vec<Vec<String>>>>,
}

impl RecordingNotifier {
    pub(crate) fn shown(&self) -> Vec<Vec<String>> {
        self.shown.borrow().clone()
    }
}

impl ErrorNotifier for RecordingNotifier {
    fn show_errors(&self, errors: &[String]) {
        self.shown.borrow_mut().push(errors.to_vec());
    }
}
