//! Single-slot status notification channel.
//!
//! The store reports transient status text through one registered callback.
//! Registering again replaces the previous handler; nothing is queued.

use std::fmt;
use std::time::{Duration, Instant};

use crate::derive::GuardNotice;

/// Status reported to the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Saved,
    Ready,
    SaveFailed,
    ImportOk,
    ImportFailed,
    ExportCreated,
    Guard(GuardNotice),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Saved => f.write_str("saved"),
            Status::Ready => f.write_str("ready"),
            Status::SaveFailed => f.write_str("save failed"),
            Status::ImportOk => f.write_str("import ok"),
            Status::ImportFailed => f.write_str("import failed"),
            Status::ExportCreated => f.write_str("export created"),
            Status::Guard(notice) => f.write_str(notice.message()),
        }
    }
}

type Handler = Box<dyn FnMut(&Status)>;

/// Callback slot plus the pending "saved → ready" revert.
pub struct StatusChannel {
    handler: Option<Handler>,
    revert_delay: Duration,
    revert_at: Option<Instant>,
}

impl StatusChannel {
    pub fn new(revert_delay: Duration) -> Self {
        Self {
            handler: None,
            revert_delay,
            revert_at: None,
        }
    }

    /// Install `handler`, replacing any earlier one.
    pub fn register(&mut self, handler: impl FnMut(&Status) + 'static) {
        self.handler = Some(Box::new(handler));
    }

    pub fn clear(&mut self) {
        self.handler = None;
    }

    pub fn notify(&mut self, status: Status) {
        if let Some(handler) = self.handler.as_mut() {
            handler(&status);
        }
    }

    /// Notify `status` and schedule the revert to [`Status::Ready`].
    pub fn notify_transient(&mut self, status: Status) {
        self.notify(status);
        self.revert_at = Some(Instant::now() + self.revert_delay);
    }

    pub fn revert_pending(&self) -> bool {
        self.revert_at.is_some()
    }

    /// Fire the pending revert once its deadline has passed.
    /// Returns `true` when `Ready` was sent.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.revert_at {
            Some(at) if now >= at => self.fire_revert(),
            _ => false,
        }
    }

    /// Fire the pending revert immediately, e.g. before the process exits.
    pub fn flush(&mut self) -> bool {
        if self.revert_at.is_some() {
            self.fire_revert()
        } else {
            false
        }
    }

    fn fire_revert(&mut self) -> bool {
        self.revert_at = None;
        self.notify(Status::Ready);
        true
    }
}

impl Default for StatusChannel {
    fn default() -> Self {
        Self::new(Duration::from_millis(600))
    }
}

impl fmt::Debug for StatusChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusChannel")
            .field("registered", &self.handler.is_some())
            .field("revert_delay", &self.revert_delay)
            .field("revert_at", &self.revert_at)
            .finish()
    }
}
