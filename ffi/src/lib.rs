//! C-ABI wrapper around `postfeed-core`.
//!
//! # Overview
//! Lets a native shell (a mobile activity, a desktop window) drive the
//! fetch controller without linking to Rust's runtime or serde. The shell
//! owns the button, the HTTP client, the toast surface, and the list widget;
//! this library owns the state in between.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `postfeed_trigger_fetch` returns the request to execute, tagged with a
//!   ticket. The shell performs the GET on any thread, then calls
//!   `postfeed_complete` or `postfeed_fail` back on the UI thread.
//! - Notifications and list invalidations reach the shell through the
//!   function pointers in `FfiCallbacks`. They are buffered while the
//!   controller is borrowed and sent just before the entry point returns,
//!   so callbacks can re-enter the library.
//! - The C caller owns all returned pointers and must call the matching
//!   `postfeed_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use postfeed_core::{Completion, FetchTicket, HttpResponse, PostsClient, TransportError};

use types::*;

// ---------------------------------------------------------------------------
// Controller lifecycle
// ---------------------------------------------------------------------------

/// Create a controller that fetches from `endpoint`.
///
/// Returns null if `endpoint` is null or not UTF-8, or if an internal panic
/// occurs. The caller must free the returned pointer with
/// `postfeed_controller_free`.
#[unsafe(no_mangle)]
pub extern "C" fn postfeed_controller_new(
    endpoint: *const c_char,
    callbacks: FfiCallbacks,
    overlap: FfiOverlapPolicy,
) -> *mut FfiController {
    catch_unwind(AssertUnwindSafe(|| {
        if endpoint.is_null() {
            return std::ptr::null_mut();
        }
        let Ok(url) = unsafe { CStr::from_ptr(endpoint) }.to_str() else {
            return std::ptr::null_mut();
        };
        let controller = FfiController::new(PostsClient::new(url), callbacks, overlap.into());
        Box::into_raw(Box::new(controller))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free a controller created by `postfeed_controller_new`. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn postfeed_controller_free(controller: *mut FfiController) {
    if !controller.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(controller) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// Start a fetch: fires the in-progress notification and returns the
/// request the caller must execute.
///
/// Returns null if `controller` is null. Free the result with
/// `postfeed_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn postfeed_trigger_fetch(controller: *mut FfiController) -> *mut FfiFetchRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if controller.is_null() {
            return std::ptr::null_mut();
        }
        let (pending, dispatch) = {
            let controller = unsafe { &mut *controller };
            controller.inner.trigger_fetch();
            let pending = controller.inner.queue_mut().take();
            (pending, controller.take_events())
        };
        let req = match pending {
            Some((ticket, req)) => FfiFetchRequest::from_core(ticket, req),
            None => std::ptr::null_mut(),
        };
        dispatch.send();
        req
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Deliver the response for `ticket`. Any status is accepted; non-2xx is
/// reported as a transport failure. A null `body` reads as empty.
#[unsafe(no_mangle)]
pub extern "C" fn postfeed_complete(
    controller: *mut FfiController,
    ticket: u64,
    response: *const FfiHttpResponse,
) -> FfiOutcome {
    catch_unwind(AssertUnwindSafe(|| {
        if controller.is_null() || response.is_null() {
            return FfiOutcome::NullArg;
        }
        let resp = unsafe { &*response };
        let body = if resp.body.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(resp.body) }.to_string_lossy().into_owned()
        };
        let completion = Completion::response(
            FetchTicket::from_raw(ticket),
            HttpResponse::new(resp.status, body),
        );
        complete(controller, completion)
    }))
    .unwrap_or(FfiOutcome::Panic)
}

/// Report that the request for `ticket` produced no response. `message`
/// may be null.
#[unsafe(no_mangle)]
pub extern "C" fn postfeed_fail(
    controller: *mut FfiController,
    ticket: u64,
    failure: FfiTransportFailure,
    message: *const c_char,
) -> FfiOutcome {
    catch_unwind(AssertUnwindSafe(|| {
        if controller.is_null() {
            return FfiOutcome::NullArg;
        }
        let error = match failure {
            FfiTransportFailure::Timeout => TransportError::Timeout,
            FfiTransportFailure::Connection => {
                let text = if message.is_null() {
                    "unknown error".to_string()
                } else {
                    unsafe { CStr::from_ptr(message) }.to_string_lossy().into_owned()
                };
                TransportError::Connection(text)
            }
        };
        let completion = Completion::failure(FetchTicket::from_raw(ticket), error);
        complete(controller, completion)
    }))
    .unwrap_or(FfiOutcome::Panic)
}

/// Feed `completion` in, then send the resulting events once `controller`
/// is no longer borrowed. The caller has checked it for null.
fn complete(controller: *mut FfiController, completion: Completion) -> FfiOutcome {
    let (outcome, dispatch) = {
        let controller = unsafe { &mut *controller };
        let outcome = FfiOutcome::from(&controller.inner.complete(completion));
        (outcome, controller.take_events())
    };
    dispatch.send();
    outcome
}

// ---------------------------------------------------------------------------
// List access
// ---------------------------------------------------------------------------

/// Number of posts currently displayed. Zero for a null controller.
#[unsafe(no_mangle)]
pub extern "C" fn postfeed_len(controller: *const FfiController) -> u32 {
    catch_unwind(AssertUnwindSafe(|| {
        if controller.is_null() {
            return 0;
        }
        let controller = unsafe { &*controller };
        saturating_u32(controller.inner.adapter().len())
    }))
    .unwrap_or(0)
}

/// Copy of the post at `position`. Returns null if `controller` is null or
/// `position` is out of range. Free with `postfeed_free_post`.
#[unsafe(no_mangle)]
pub extern "C" fn postfeed_item(controller: *const FfiController, position: u32) -> *mut FfiPost {
    catch_unwind(AssertUnwindSafe(|| {
        if controller.is_null() {
            return std::ptr::null_mut();
        }
        let controller = unsafe { &*controller };
        match controller.inner.adapter().get(position as usize) {
            Some(post) => FfiPost::from_core(post),
            None => {
                tracing::warn!(position, "list position out of range");
                std::ptr::null_mut()
            }
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request returned by `postfeed_trigger_fetch`. Safe to call with
/// null.
#[unsafe(no_mangle)]
pub extern "C" fn postfeed_free_request(req: *mut FfiFetchRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
    }));
}

/// Free a post returned by `postfeed_item`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn postfeed_free_post(post: *mut FfiPost) {
    if post.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let post = unsafe { Box::from_raw(post) };
        if !post.title.is_null() {
            drop(unsafe { CString::from_raw(post.title) });
        }
        if !post.body.is_null() {
            drop(unsafe { CString::from_raw(post.body) });
        }
    }));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
