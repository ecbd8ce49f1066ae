//! Process-wide platform capability object.
//!
//! Built once at startup around a [`Host`]. It pins window-affine work
//! to the constructing thread and performs the one-time window class
//! registration that every surface shares.

use std::cell::Cell;
use std::marker::PhantomData;
use std::thread::{self, ThreadId};

use tracing::info;

use crate::error::{Result, TinyError};
use crate::host::{Host, WindowClass};

/// Owns the host and the per-process windowing setup.
///
/// Surfaces borrow a `Platform`; they cannot outlive it. A platform is
/// neither `Send` nor `Sync`, whatever host it wraps:
///
/// ```compile_fail
/// use tiny_core::{MockHost, Platform};
///
/// fn assert_send<T: Send>(_: T) {}
/// assert_send(Platform::new(MockHost::new()));
/// ```
pub struct Platform<H: Host> {
    host: H,
    owner: ThreadId,
    class: WindowClass,
    class_registered: Cell<bool>,
    _pinned: PhantomData<*const ()>,
}

impl<H: Host> Platform<H> {
    /// Wrap `host` and pin the platform to the calling thread.
    pub fn new(host: H) -> Self {
        Self::pinned_to(host, thread::current().id())
    }

    fn pinned_to(host: H, owner: ThreadId) -> Self {
        info!(thread = ?owner, "platform pinned to thread");
        Self {
            host,
            owner,
            class: WindowClass::TINY,
            class_registered: Cell::new(false),
            _pinned: PhantomData,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// The thread all window operations must originate from.
    pub fn owner_thread(&self) -> ThreadId {
        self.owner
    }

    pub fn check_thread(&self) -> Result<()> {
        if thread::current().id() == self.owner {
            Ok(())
        } else {
            Err(TinyError::WrongThread)
        }
    }

    /// Register the shared window class on first use.
    ///
    /// A host failure is returned as-is and leaves the class unregistered.
    pub fn ensure_class(&self) -> Result<&WindowClass> {
        self.check_thread()?;
        if !self.class_registered.get() {
            self.host.register_class(&self.class)?;
            self.class_registered.set(true);
            info!(class = self.class.name, "window class registered");
        }
        Ok(&self.class)
    }

    pub fn class_registered(&self) -> bool {
        self.class_registered.get()
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{HostCall, MockHost};

    #[test]
    fn class_is_registered_once() {
        let platform = Platform::new(MockHost::new());
        assert!(!platform.class_registered());
        platform.ensure_class().unwrap();
        platform.ensure_class().unwrap();
        assert!(platform.class_registered());

        let registrations = platform
            .host()
            .calls()
            .iter()
            .filter(|c| matches!(c, HostCall::RegisterClass(_)))
            .count();
        assert_eq!(registrations, 1);
    }

    #[test]
    fn registration_failure_is_fatal_and_not_memoised() {
        let host = MockHost::new();
        host.fail_class_registration("Class already exists.");
        let platform = Platform::new(host);

        let err = platform.ensure_class().unwrap_err();
        assert!(matches!(err, TinyError::Platform { call: "RegisterClassExW", .. }));
        assert!(!platform.class_registered());
    }

    #[test]
    fn foreign_thread_is_rejected() {
        let other = thread::spawn(|| thread::current().id()).join().unwrap();
        let platform = Platform::pinned_to(MockHost::new(), other);

        assert!(matches!(platform.check_thread(), Err(TinyError::WrongThread)));
        assert!(matches!(platform.ensure_class(), Err(TinyError::WrongThread)));
        assert!(platform.host().calls().is_empty());
    }

    #[test]
    fn owner_is_constructing_thread() {
        let platform = Platform::new(MockHost::new());
        assert_eq!(platform.owner_thread(), thread::current().id());
        assert!(platform.check_thread().is_ok());
    }
}
