//! Callback containment.
//!
//! User callbacks run under `catch_unwind`; a panic becomes a [`CallbackError`]
//! handed to the installed handler (or logged) and playback carries on.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use crate::error::{CallbackError, Hook};

pub type ErrorHandler = Rc<dyn Fn(&CallbackError)>;

/// Runs callbacks and routes their failures.
#[derive(Clone, Default)]
pub struct Reporter {
    handler: Option<ErrorHandler>,
    log_unhandled: bool,
}

impl Reporter {
    pub fn new(handler: Option<ErrorHandler>, log_unhandled: bool) -> Self {
        Self {
            handler,
            log_unhandled,
        }
    }

    /// Drops every failure without logging.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Invoke `f`, containing a panic. Returns `None` when the callback failed.
    pub fn call<R>(&self, hook: Hook, f: impl FnOnce() -> R) -> Option<R> {
        match catch(f) {
            Ok(out) => Some(out),
            Err(message) => {
                self.report(CallbackError { hook, message });
                None
            }
        }
    }

    pub fn report(&self, err: CallbackError) {
        if let Some(handler) = &self.handler {
            handler(&err);
        } else if self.log_unhandled {
            log::warn!("{err}");
        }
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("has_handler", &self.handler.is_some())
            .field("log_unhandled", &self.log_unhandled)
            .finish()
    }
}

/// Run `f`, turning a panic into its message.
pub(crate) fn catch<R>(f: impl FnOnce() -> R) -> Result<R, String> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
