//! The fetch-parse-render controller.
//!
//! # Design
//! The controller never performs I/O. `trigger_fetch` stamps a ticket on
//! the request and hands it to an injected `RequestQueue`; the queue later
//! returns a `Completion` that the host feeds into `complete` on the same
//! thread that owns the controller. All state changes go through
//! `&mut self`, so there is nothing to lock.
//!
//! Tickets are issued in increasing order. Under `OverlapPolicy::NewestIssued`
//! a successful completion is applied only if no newer ticket has already
//! been applied, so a slow early request cannot overwrite a fresh result.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::adapter::{ListAdapter, RenderSurface};
use crate::client::PostsClient;
use crate::error::{FetchError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::notify::{Notification, Notifier};
use crate::types::Post;

/// Sequence number of one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FetchTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a request queue delivers back for one ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub ticket: FetchTicket,
    pub outcome: Result<HttpResponse, TransportError>,
}

impl Completion {
    pub fn response(ticket: FetchTicket, response: HttpResponse) -> Self {
        Self {
            ticket,
            outcome: Ok(response),
        }
    }

    pub fn failure(ticket: FetchTicket, error: TransportError) -> Self {
        Self {
            ticket,
            outcome: Err(error),
        }
    }
}

/// Executes requests off the foreground thread.
///
/// `enqueue` must return without waiting for the network. Each enqueued
/// ticket must eventually come back to `FetchController::complete` exactly
/// once, as either a response or a `TransportError`.
pub trait RequestQueue {
    fn enqueue(&mut self, ticket: FetchTicket, request: HttpRequest);
}

/// How overlapping fetches settle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// Apply a result only if it is newer than the last applied one.
    ///
    /// This is the default, so a slow early response never overwrites a
    /// newer list. Hosts that want plain last-writer-wins, where the order
    /// of completion decides, pick `LastCompleted`.
    #[default]
    NewestIssued,
    /// Apply every successful result; whichever completes last wins.
    LastCompleted,
}

impl FromStr for OverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest-issued" => Ok(OverlapPolicy::NewestIssued),
            "last-completed" => Ok(OverlapPolicy::LastCompleted),
            other => Err(format!(
                "unknown overlap policy `{other}` (expected newest-issued or last-completed)"
            )),
        }
    }
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OverlapPolicy::NewestIssued => "newest-issued",
            OverlapPolicy::LastCompleted => "last-completed",
        })
    }
}

/// What `complete` did with a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The display collection was replaced with `len` posts.
    Applied { len: usize },
    /// Dropped: superseded by a newer result, or not an outstanding ticket.
    Stale,
    /// Transport or parse failure; the display collection is untouched.
    Failed(FetchError),
}

/// Orchestrates fetch, parse, and hand-off to the list adapter.
pub struct FetchController<Q, N, S> {
    client: PostsClient,
    queue: Q,
    notifier: N,
    adapter: ListAdapter<S>,
    policy: OverlapPolicy,
    next_ticket: u64,
    outstanding: BTreeSet<FetchTicket>,
    last_applied: Option<FetchTicket>,
}

impl<Q, N, S> FetchController<Q, N, S>
where
    Q: RequestQueue,
    N: Notifier,
    S: RenderSurface,
{
    pub fn new(client: PostsClient, queue: Q, notifier: N, surface: S) -> Self {
        Self {
            client,
            queue,
            notifier,
            adapter: ListAdapter::new(surface),
            policy: OverlapPolicy::default(),
            next_ticket: 1,
            outstanding: BTreeSet::new(),
            last_applied: None,
        }
    }

    pub fn with_policy(mut self, policy: OverlapPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Announce progress and enqueue one GET. Returns immediately.
    pub fn trigger_fetch(&mut self) -> FetchTicket {
        let ticket = FetchTicket(self.next_ticket);
        self.next_ticket += 1;
        self.outstanding.insert(ticket);

        self.notifier.notify(Notification::InProgress);
        let request = self.client.build_fetch_posts();
        tracing::info!(%ticket, url = %request.url, "fetch issued");
        self.queue.enqueue(ticket, request);
        ticket
    }

    /// Settle one fetch. Must run on the thread that owns the controller.
    pub fn complete(&mut self, completion: Completion) -> CompletionOutcome {
        let Completion { ticket, outcome } = completion;
        if !self.outstanding.remove(&ticket) {
            tracing::warn!(%ticket, "ignoring completion for unknown or settled fetch");
            return CompletionOutcome::Stale;
        }

        let parsed = outcome.map_err(FetchError::from).and_then(|response| {
            tracing::debug!(%ticket, status = response.status, body = %response.body, "response received");
            self.client.parse_posts(response)
        });

        match parsed {
            Ok(posts) => self.apply(ticket, posts),
            Err(err) => {
                match &err {
                    FetchError::Transport(TransportError::Status { status, body }) => {
                        tracing::error!(%ticket, status, %body, "fetch failed")
                    }
                    FetchError::Transport(e) => tracing::error!(%ticket, error = %e, "fetch failed"),
                    FetchError::MalformedResponse(msg) => {
                        tracing::error!(%ticket, error = %msg, "failed to parse response")
                    }
                }
                self.notifier.notify(Notification::from_error(&err));
                CompletionOutcome::Failed(err)
            }
        }
    }

    fn apply(&mut self, ticket: FetchTicket, posts: Vec<Post>) -> CompletionOutcome {
        if self.policy == OverlapPolicy::NewestIssued
            && self.last_applied.is_some_and(|last| ticket < last)
        {
            tracing::debug!(%ticket, last_applied = ?self.last_applied, "dropping superseded result");
            return CompletionOutcome::Stale;
        }

        let len = posts.len();
        self.adapter.replace_all(posts);
        self.last_applied = Some(ticket);
        self.notifier.notify(Notification::Success);
        tracing::info!(%ticket, len, "display collection updated");
        CompletionOutcome::Applied { len }
    }

    pub fn adapter(&self) -> &ListAdapter<S> {
        &self.adapter
    }

    pub fn client(&self) -> &PostsClient {
        &self.client
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// Number of fetches issued but not yet completed.
    pub fn in_flight(&self) -> usize {
        self.outstanding.len()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }
}
