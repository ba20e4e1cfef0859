//! Headless core of the post feed: fetch, parse, hand off to the list.
//!
//! # Overview
//! A trigger issues one GET for the feed endpoint. The JSON array that comes
//! back is parsed into `Post` records and handed, all at once, to a
//! `ListAdapter` that a rendering surface draws. Failures are logged and
//! turned into transient notifications; nothing is fatal.
//!
//! # Design
//! - The core never touches the network (host-does-IO). `PostsClient` builds
//!   an `HttpRequest` and parses an `HttpResponse`; a `RequestQueue` supplied
//!   by the host executes the request and returns a `Completion`.
//! - Notification display, list rendering, and the request queue are
//!   injected capabilities (`Notifier`, `RenderSurface`, `RequestQueue`), so
//!   the controller runs without any UI framework.
//! - Each fetch carries a `FetchTicket`; `OverlapPolicy` decides what happens
//!   when overlapping fetches complete out of order.

pub mod adapter;
pub mod client;
pub mod controller;
pub mod error;
pub mod http;
pub mod notify;
pub mod types;

pub use adapter::{DetachedSurface, ListAdapter, RenderSurface};
pub use client::{PostsClient, DEFAULT_ENDPOINT};
pub use controller::{
    Completion, CompletionOutcome, FetchController, FetchTicket, OverlapPolicy, RequestQueue,
};
pub use error::{FetchError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notify::{Notification, NotificationLength, Notifier};
pub use types::Post;
