//! Scripted in-memory transport for tests
//!
//! `MockTransport` records every call and answers from, in order of
//! precedence: a per-action queue of canned replies, a per-action handler
//! closure, or an empty `<{action}Response/>` element.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use xmltree::Element;

use crate::{SoapError, SoapTransport};

/// One call observed by the mock transport
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub ip: String,
    pub endpoint: String,
    pub service_uri: String,
    pub action: String,
    pub payload: String,
    pub at: Instant,
}

impl RecordedCall {
    /// Text of a payload argument such as `ObjectID`, unescaped is not attempted
    pub fn arg(&self, name: &str) -> Option<String> {
        let open = format!("<{}>", name);
        let close = format!("</{}>", name);
        let start = self.payload.find(&open)? + open.len();
        let end = self.payload[start..].find(&close)? + start;
        Some(self.payload[start..end].to_string())
    }
}

type Handler = Box<dyn Fn(&RecordedCall) -> Result<Element, SoapError> + Send + Sync>;

/// Scripted SOAP transport
#[derive(Default)]
pub struct MockTransport {
    queued: Mutex<HashMap<String, VecDeque<Result<Element, SoapError>>>>,
    handlers: Mutex<HashMap<String, Handler>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply whose response element wraps `inner_xml`
    pub fn push_ok(&self, action: &str, inner_xml: &str) -> &Self {
        let element = action_response(action, inner_xml);
        lock(&self.queued)
            .entry(action.to_string())
            .or_default()
            .push_back(Ok(element));
        self
    }

    /// Queue a failure for the next call of `action`
    pub fn push_err(&self, action: &str, error: SoapError) -> &Self {
        lock(&self.queued)
            .entry(action.to_string())
            .or_default()
            .push_back(Err(error));
        self
    }

    /// Answer every otherwise unscripted call of `action` through `handler`
    pub fn on<F>(&self, action: &str, handler: F) -> &Self
    where
        F: Fn(&RecordedCall) -> Result<Element, SoapError> + Send + Sync + 'static,
    {
        lock(&self.handlers).insert(action.to_string(), Box::new(handler));
        self
    }

    /// All calls in the order they were made
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Calls of a single action in order
    pub fn calls_for(&self, action: &str) -> Vec<RecordedCall> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.action == action)
            .cloned()
            .collect()
    }

    /// Number of calls made for `action`
    pub fn count(&self, action: &str) -> usize {
        lock(&self.calls).iter().filter(|c| c.action == action).count()
    }

    /// Sequence of action names, handy for ordering assertions
    pub fn actions(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|c| c.action.clone()).collect()
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("calls", &lock(&self.calls).len())
            .finish()
    }
}

impl SoapTransport for MockTransport {
    fn call(
        &self,
        ip: &str,
        endpoint: &str,
        service_uri: &str,
        action: &str,
        payload: &str,
    ) -> Result<Element, SoapError> {
        let call = RecordedCall {
            ip: ip.to_string(),
            endpoint: endpoint.to_string(),
            service_uri: service_uri.to_string(),
            action: action.to_string(),
            payload: payload.to_string(),
            at: Instant::now(),
        };
        lock(&self.calls).push(call.clone());

        if let Some(reply) = lock(&self.queued)
            .get_mut(action)
            .and_then(|queue| queue.pop_front())
        {
            return reply;
        }

        if let Some(handler) = lock(&self.handlers).get(action) {
            return handler(&call);
        }

        Ok(action_response(action, ""))
    }
}

/// Build the `<{action}Response>` element a device would return
pub fn action_response(action: &str, inner_xml: &str) -> Element {
    let xml = format!("<{action}Response>{inner_xml}</{action}Response>");
    Element::parse(xml.as_bytes())
        .unwrap_or_else(|_| Element::new(&format!("{}Response", action)))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_takes_precedence_over_handler() {
        let mock = MockTransport::new();
        mock.on("Play", |_| Err(SoapError::fault(500)));
        mock.push_ok("Play", "");

        assert!(mock.call("10.0.0.1", "e", "s", "Play", "").is_ok());
        assert!(mock.call("10.0.0.1", "e", "s", "Play", "").is_err());
        assert_eq!(mock.count("Play"), 2);
    }

    #[test]
    fn test_default_reply_is_empty_response() {
        let mock = MockTransport::new();
        let response = mock.call("10.0.0.1", "e", "s", "Stop", "").unwrap();
        assert_eq!(response.name, "StopResponse");
    }

    #[test]
    fn test_recorded_call_arg() {
        let mock = MockTransport::new();
        mock.call("10.0.0.1", "e", "s", "Browse", "<ObjectID>FV%3A2</ObjectID><Filter>*</Filter>")
            .unwrap();
        let call = &mock.calls_for("Browse")[0];
        assert_eq!(call.arg("ObjectID").as_deref(), Some("FV%3A2"));
        assert_eq!(call.arg("Missing"), None);
    }
}
