//! `#[repr(C)]` types for the FFI boundary, plus the adapters that let C
//! callbacks stand in for the core's injected capabilities.
//!
//! # Design
//! The embedding app owns I/O, notifications, and list rendering. On this
//! side that becomes:
//! - `PendingRequest`: a `RequestQueue` that parks the request so
//!   `postfeed_trigger_fetch` can hand it to C.
//! - `CallbackNotifier` / `CallbackSurface`: record `FfiEvent`s in a buffer
//!   shared with the handle. The entry points hand them to the function
//!   pointers in `FfiCallbacks` once they no longer hold `&mut` to the
//!   controller, so a callback may call back into the library.
//!
//! Strings handed to C are heap `CString`s the caller frees through the
//! matching `postfeed_free_*` function.

use std::cell::RefCell;
use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::rc::Rc;

use postfeed_core::{
    CompletionOutcome, FetchController, FetchError, FetchTicket, HttpMethod, HttpRequest,
    Notification, Notifier, OverlapPolicy, Post, PostsClient, RenderSurface, RequestQueue,
};

/// Opaque handle to a controller. C callers receive a pointer to this and
/// pass it back into every FFI function.
pub struct FfiController {
    pub(crate) inner: FetchController<PendingRequest, CallbackNotifier, CallbackSurface>,
    callbacks: FfiCallbacks,
    events: EventBuffer,
}

impl FfiController {
    pub(crate) fn new(client: PostsClient, callbacks: FfiCallbacks, policy: OverlapPolicy) -> Self {
        let events = EventBuffer::default();
        let inner = FetchController::new(
            client,
            PendingRequest::default(),
            CallbackNotifier { events: Rc::clone(&events) },
            CallbackSurface { events: Rc::clone(&events) },
        )
        .with_policy(policy);
        Self {
            inner,
            callbacks,
            events,
        }
    }

    /// Drain what the controller produced since the last call. The returned
    /// `Dispatch` owns everything it needs, so the handle borrow can end
    /// before any callback runs.
    pub(crate) fn take_events(&mut self) -> Dispatch {
        Dispatch {
            callbacks: self.callbacks,
            events: std::mem::take(&mut *self.events.borrow_mut()),
        }
    }
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

/// Notification category as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiNotificationKind {
    InProgress = 0,
    Success = 1,
    Error = 2,
}

/// Called for every notification. `message` is only valid for the duration
/// of the call.
pub type FfiNotifyFn =
    extern "C" fn(kind: FfiNotificationKind, message: *const c_char, user_data: *mut c_void);

/// Called after every full replace of the list, with the new length.
pub type FfiInvalidateFn = extern "C" fn(len: u32, user_data: *mut c_void);

/// Host callbacks. Either function pointer may be null.
///
/// Callbacks run after the library has released the controller, so from
/// inside one it is fine to call `postfeed_len`, `postfeed_item`,
/// `postfeed_trigger_fetch`, `postfeed_complete`, `postfeed_fail` and the
/// `postfeed_free_post` / `postfeed_free_request` functions.
/// `postfeed_controller_free` must not be called from a callback.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FfiCallbacks {
    pub user_data: *mut c_void,
    pub on_notify: Option<FfiNotifyFn>,
    pub on_invalidate: Option<FfiInvalidateFn>,
}

/// Something C has to hear about, captured while the controller is busy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FfiEvent {
    Notify(FfiNotificationKind, CString),
    Invalidate(u32),
}

type EventBuffer = Rc<RefCell<Vec<FfiEvent>>>;

/// Events taken off a controller, ready to be sent to C.
pub(crate) struct Dispatch {
    callbacks: FfiCallbacks,
    events: Vec<FfiEvent>,
}

impl Dispatch {
    pub(crate) fn send(self) {
        let user_data = self.callbacks.user_data;
        for event in self.events {
            match event {
                FfiEvent::Notify(kind, message) => {
                    if let Some(on_notify) = self.callbacks.on_notify {
                        on_notify(kind, message.as_ptr(), user_data);
                    }
                }
                FfiEvent::Invalidate(len) => {
                    if let Some(on_invalidate) = self.callbacks.on_invalidate {
                        on_invalidate(len, user_data);
                    }
                }
            }
        }
    }
}

pub(crate) struct CallbackNotifier {
    events: EventBuffer,
}

impl Notifier for CallbackNotifier {
    fn notify(&mut self, notification: Notification) {
        let kind = match notification {
            Notification::InProgress => FfiNotificationKind::InProgress,
            Notification::Success => FfiNotificationKind::Success,
            Notification::Error(_) => FfiNotificationKind::Error,
        };
        let message = c_string(notification.message());
        self.events.borrow_mut().push(FfiEvent::Notify(kind, message));
    }
}

pub(crate) struct CallbackSurface {
    events: EventBuffer,
}

impl RenderSurface for CallbackSurface {
    fn invalidate_all(&mut self, len: usize) {
        self.events
            .borrow_mut()
            .push(FfiEvent::Invalidate(saturating_u32(len)));
    }
}

// ---------------------------------------------------------------------------
// Request hand-off
// ---------------------------------------------------------------------------

/// Holds the request produced by the last `trigger_fetch` until C takes it.
#[derive(Default)]
pub(crate) struct PendingRequest {
    slot: Option<(FetchTicket, HttpRequest)>,
}

impl PendingRequest {
    pub(crate) fn take(&mut self) -> Option<(FetchTicket, HttpRequest)> {
        self.slot.take()
    }
}

impl RequestQueue for PendingRequest {
    fn enqueue(&mut self, ticket: FetchTicket, request: HttpRequest) {
        self.slot = Some((ticket, request));
    }
}

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
        }
    }
}

/// One request for C to execute. Pass `ticket` back with the result.
#[repr(C)]
pub struct FfiFetchRequest {
    pub ticket: u64,
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
}

impl FfiFetchRequest {
    pub(crate) fn from_core(ticket: FetchTicket, req: HttpRequest) -> *mut Self {
        Box::into_raw(Box::new(FfiFetchRequest {
            ticket: ticket.get(),
            method: req.method.into(),
            url: c_string(&req.url).into_raw(),
        }))
    }
}

/// An HTTP response described as C-compatible plain data.
///
/// The C caller builds this on the stack after executing the request. The
/// FFI layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

/// Why the host could not produce a response at all.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiTransportFailure {
    Timeout = 0,
    Connection = 1,
}

/// Overlap policy as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiOverlapPolicy {
    NewestIssued = 0,
    LastCompleted = 1,
}

impl From<FfiOverlapPolicy> for OverlapPolicy {
    fn from(p: FfiOverlapPolicy) -> Self {
        match p {
            FfiOverlapPolicy::NewestIssued => OverlapPolicy::NewestIssued,
            FfiOverlapPolicy::LastCompleted => OverlapPolicy::LastCompleted,
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// What `postfeed_complete` / `postfeed_fail` did. Failure details were
/// already sent through `on_notify`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiOutcome {
    Applied = 0,
    Stale = 1,
    TransportFailed = 2,
    Malformed = 3,
    NullArg = 4,
    Panic = 5,
}

impl From<&CompletionOutcome> for FfiOutcome {
    fn from(outcome: &CompletionOutcome) -> Self {
        match outcome {
            CompletionOutcome::Applied { .. } => FfiOutcome::Applied,
            CompletionOutcome::Stale => FfiOutcome::Stale,
            CompletionOutcome::Failed(FetchError::Transport(_)) => FfiOutcome::TransportFailed,
            CompletionOutcome::Failed(FetchError::MalformedResponse(_)) => FfiOutcome::Malformed,
        }
    }
}

/// A single post exposed to C.
#[repr(C)]
pub struct FfiPost {
    pub user_id: u32,
    pub id: i64,
    pub title: *mut c_char,
    pub body: *mut c_char,
}

impl FfiPost {
    pub(crate) fn from_core(post: &Post) -> *mut Self {
        Box::into_raw(Box::new(FfiPost {
            user_id: post.user_id,
            id: post.id,
            title: c_string(&post.title).into_raw(),
            body: c_string(&post.body).into_raw(),
        }))
    }
}

/// Interior NULs cannot cross into C; drop them rather than fail.
pub(crate) fn c_string(s: &str) -> CString {
    CString::new(s.replace('\0', "")).unwrap_or_default()
}

pub(crate) fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
