//! Request queue that runs each GET on a worker thread with ureq.
//!
//! Completions travel back over an `mpsc` channel; the main loop drains it
//! and feeds `FetchController::complete`, so the controller itself is only
//! ever touched from one thread.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::time::Duration;

use postfeed_core::{Completion, FetchTicket, HttpMethod, HttpRequest, HttpResponse, RequestQueue, TransportError};

pub struct ThreadedQueue {
    agent: ureq::Agent,
    tx: mpsc::Sender<Completion>,
}

impl ThreadedQueue {
    /// Build the queue and the receiver its completions arrive on.
    pub fn new(timeout: Duration) -> (Self, mpsc::Receiver<Completion>) {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        let (tx, rx) = mpsc::channel();
        (Self { agent, tx }, rx)
    }
}

impl RequestQueue for ThreadedQueue {
    fn enqueue(&mut self, ticket: FetchTicket, request: HttpRequest) {
        let agent = self.agent.clone();
        let tx = self.tx.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("fetch-{}", ticket.get()))
            .spawn(move || {
                let completion = guarded(ticket, || execute(&agent, ticket, request));
                if tx.send(completion).is_err() {
                    tracing::debug!(%ticket, "completion receiver dropped");
                }
            });

        if let Err(e) = spawned {
            tracing::error!(%ticket, error = %e, "failed to spawn fetch worker");
            let _ = self.tx.send(Completion::failure(
                ticket,
                TransportError::Connection(format!("could not start request: {e}")),
            ));
        }
    }
}

/// Run a worker body so that every ticket gets exactly one completion, even
/// if the body panics. Without one the main loop would wait forever.
fn guarded(ticket: FetchTicket, work: impl FnOnce() -> Completion) -> Completion {
    catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|panic| {
        let reason = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!(%ticket, %reason, "fetch worker panicked");
        Completion::failure(
            ticket,
            TransportError::Connection(format!("request worker panicked: {reason}")),
        )
    })
}

/// Execute one request. Non-2xx statuses come back as responses; only a
/// missing response is a `TransportError` here.
fn execute(agent: &ureq::Agent, ticket: FetchTicket, request: HttpRequest) -> Completion {
    let mut builder = match request.method {
        HttpMethod::Get => agent.get(&request.url),
    };
    for (key, value) in &request.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    let mut response = match builder.call() {
        Ok(response) => response,
        Err(e) => return Completion::failure(ticket, transport_error(e)),
    };
    let status = response.status().as_u16();
    match response.body_mut().read_to_string() {
        Ok(body) => Completion::response(ticket, HttpResponse::new(status, body)),
        Err(e) => Completion::failure(ticket, transport_error(e)),
    }
}

fn transport_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        other => TransportError::Connection(other.to_string()),
    }
}
