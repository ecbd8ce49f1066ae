//! In-memory [`Host`] used by tests and headless runs.
//!
//! Emulates the parts of the Win32 contract the core depends on:
//! per-window message queues, synchronous destroy notifications, a side
//! table from window id to [`WindowState`], and device contexts. Every
//! call is logged so tests can assert on exact call sequences.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use tracing::warn;

use crate::error::{Result, TinyError};
use crate::host::{
    BitmapInfo, Host, MessageAction, Rect, WindowClass, WindowMessage, WindowState, WindowStyle,
};

/// Fake decoration sizes applied by [`MockHost::adjust_window_rect`].
pub const BORDER: i32 = 3;
pub const CAPTION: i32 = 26;

/// Handle of a mock window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MockWindow(pub u32);

/// Handle of a mock drawing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockContext(pub u32);

/// One entry in the host call log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    RegisterClass(String),
    CreateWindow(MockWindow),
    ShowWindow(MockWindow, bool),
    DrainMessages,
    Dispatch(MockWindow, WindowMessage),
    DestroyWindow(MockWindow),
    /// A close-triggered destroy failed with this diagnostic.
    DestroyFailed(MockWindow, String),
    AcquireContext(MockWindow),
    ReleaseContext(MockWindow, MockContext),
    StretchBlit(MockContext),
}

/// A blit captured by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlitRecord {
    pub context: MockContext,
    pub dest: Rect,
    pub info: BitmapInfo,
    pub pixels: Vec<u8>,
}

/// Host-side record of a created window.
#[derive(Debug, Clone)]
pub struct WindowRecord {
    pub title: String,
    pub frame: Rect,
    pub style: WindowStyle,
    pub visible: bool,
    pub destroyed: bool,
}

struct MockWindowEntry {
    record: WindowRecord,
    state: Option<Rc<WindowState>>,
    queue: VecDeque<WindowMessage>,
}

/// In-memory windowing host.
pub struct MockHost {
    screen: (i32, i32),
    next_id: Cell<u32>,
    windows: RefCell<BTreeMap<MockWindow, MockWindowEntry>>,
    open_contexts: RefCell<Vec<MockContext>>,
    calls: RefCell<Vec<HostCall>>,
    blits: RefCell<Vec<BlitRecord>>,
    blit_count: Cell<usize>,
    acquired: Cell<usize>,
    released: Cell<usize>,
    register_failure: RefCell<Option<String>>,
    create_failure: RefCell<Option<String>>,
    destroy_failure: RefCell<Option<String>>,
    acquire_failure: Cell<bool>,
    blit_failure_at: Cell<Option<usize>>,
}

impl MockHost {
    /// A host with a 1920 × 1080 primary display.
    pub fn new() -> Self {
        Self::with_screen(1920, 1080)
    }

    pub fn with_screen(width: i32, height: i32) -> Self {
        Self {
            screen: (width, height),
            next_id: Cell::new(1),
            windows: RefCell::new(BTreeMap::new()),
            open_contexts: RefCell::new(Vec::new()),
            calls: RefCell::new(Vec::new()),
            blits: RefCell::new(Vec::new()),
            blit_count: Cell::new(0),
            acquired: Cell::new(0),
            released: Cell::new(0),
            register_failure: RefCell::new(None),
            create_failure: RefCell::new(None),
            destroy_failure: RefCell::new(None),
            acquire_failure: Cell::new(false),
            blit_failure_at: Cell::new(None),
        }
    }

    // ── Fault injection ─────────────────────────────────────────

    /// Make the next class registrations fail with `diagnostic`.
    pub fn fail_class_registration(&self, diagnostic: &str) {
        *self.register_failure.borrow_mut() = Some(diagnostic.to_string());
    }

    /// Make window creation fail with `diagnostic`.
    pub fn fail_window_creation(&self, diagnostic: &str) {
        *self.create_failure.borrow_mut() = Some(diagnostic.to_string());
    }

    /// Make window destruction fail with `diagnostic`.
    pub fn fail_window_destruction(&self, diagnostic: &str) {
        *self.destroy_failure.borrow_mut() = Some(diagnostic.to_string());
    }

    pub fn fail_context_acquisition(&self, fail: bool) {
        self.acquire_failure.set(fail);
    }

    /// Fail the blit with zero-based index `index` (counted over all blits).
    pub fn fail_blit_at(&self, index: usize) {
        self.blit_failure_at.set(Some(index));
    }

    // ── Simulated input ─────────────────────────────────────────

    /// Queue `message` for `window`, as if posted by the OS.
    pub fn post(&self, window: MockWindow, message: WindowMessage) {
        if let Some(entry) = self.windows.borrow_mut().get_mut(&window) {
            entry.queue.push_back(message);
        }
    }

    // ── Inspection ──────────────────────────────────────────────

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    /// Number of logged calls matching `pred`.
    pub fn count_calls(&self, pred: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn blits(&self) -> Vec<BlitRecord> {
        self.blits.borrow().clone()
    }

    pub fn last_blit(&self) -> Option<BlitRecord> {
        self.blits.borrow().last().cloned()
    }

    pub fn window(&self, window: MockWindow) -> Option<WindowRecord> {
        self.windows.borrow().get(&window).map(|e| e.record.clone())
    }

    /// Whether a [`WindowState`] is still bound to `window`.
    pub fn is_bound(&self, window: MockWindow) -> bool {
        self.windows
            .borrow()
            .get(&window)
            .is_some_and(|e| e.state.is_some())
    }

    pub fn pending_messages(&self, window: MockWindow) -> usize {
        self.windows
            .borrow()
            .get(&window)
            .map_or(0, |e| e.queue.len())
    }

    pub fn contexts_acquired(&self) -> usize {
        self.acquired.get()
    }

    pub fn contexts_released(&self) -> usize {
        self.released.get()
    }

    /// Contexts acquired but not yet released.
    pub fn open_contexts(&self) -> usize {
        self.open_contexts.borrow().len()
    }

    fn log(&self, call: HostCall) {
        self.calls.borrow_mut().push(call);
    }

    /// Pop the next queued message across all live windows, in id order.
    fn next_message(&self) -> Option<(MockWindow, WindowMessage, Option<Rc<WindowState>>)> {
        let mut windows = self.windows.borrow_mut();
        windows.iter_mut().find_map(|(id, entry)| {
            let message = entry.queue.pop_front()?;
            Some((*id, message, entry.state.clone()))
        })
    }

    fn dispatch(&self, window: MockWindow, message: WindowMessage, state: Option<Rc<WindowState>>) {
        self.log(HostCall::Dispatch(window, message));
        let Some(state) = state else {
            return;
        };
        match state.on_message(message) {
            MessageAction::DestroyWindow => {
                if let Err(e) = self.destroy_window(window) {
                    warn!("DestroyWindow failed: {e}");
                    self.log(HostCall::DestroyFailed(window, e.to_string()));
                }
            }
            MessageAction::Handled | MessageAction::Default => {}
        }
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for MockHost {
    type Window = MockWindow;
    type Context = MockContext;

    fn register_class(&self, class: &WindowClass) -> Result<()> {
        self.log(HostCall::RegisterClass(class.name.to_string()));
        match self.register_failure.borrow().as_deref() {
            Some(diagnostic) => Err(TinyError::platform("RegisterClassExW", diagnostic)),
            None => Ok(()),
        }
    }

    fn screen_size(&self) -> (i32, i32) {
        self.screen
    }

    fn adjust_window_rect(&self, client: Rect, style: WindowStyle) -> Result<Rect> {
        let caption = if style.caption { CAPTION } else { 0 };
        Ok(Rect::new(
            client.left.saturating_sub(BORDER),
            client.top.saturating_sub(BORDER + caption),
            client.right.saturating_add(BORDER),
            client.bottom.saturating_add(BORDER),
        ))
    }

    fn create_window(
        &self,
        _class: &WindowClass,
        title: &str,
        frame: Rect,
        style: WindowStyle,
        state: Rc<WindowState>,
    ) -> Result<MockWindow> {
        if let Some(diagnostic) = self.create_failure.borrow().as_deref() {
            return Err(TinyError::platform("CreateWindowExW", diagnostic));
        }
        let id = MockWindow(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.windows.borrow_mut().insert(
            id,
            MockWindowEntry {
                record: WindowRecord {
                    title: title.to_string(),
                    frame,
                    style,
                    visible: false,
                    destroyed: false,
                },
                state: Some(state),
                queue: VecDeque::new(),
            },
        );
        self.log(HostCall::CreateWindow(id));
        Ok(id)
    }

    fn show_window(&self, window: MockWindow, visible: bool) {
        self.log(HostCall::ShowWindow(window, visible));
        if let Some(entry) = self.windows.borrow_mut().get_mut(&window) {
            entry.record.visible = visible;
        }
    }

    fn drain_messages(&self) {
        self.log(HostCall::DrainMessages);
        while let Some((window, message, state)) = self.next_message() {
            self.dispatch(window, message, state);
        }
    }

    fn destroy_window(&self, window: MockWindow) -> Result<()> {
        self.log(HostCall::DestroyWindow(window));
        if let Some(diagnostic) = self.destroy_failure.borrow().as_deref() {
            return Err(TinyError::platform("DestroyWindow", diagnostic));
        }
        let state = {
            let mut windows = self.windows.borrow_mut();
            let entry = windows
                .get_mut(&window)
                .filter(|e| !e.record.destroyed)
                .ok_or_else(|| TinyError::platform("DestroyWindow", "Invalid window handle."))?;
            entry.record.destroyed = true;
            entry.record.visible = false;
            entry.queue.clear();
            entry.state.take()
        };
        // Destroy is delivered synchronously, then the binding is released.
        self.dispatch(window, WindowMessage::Destroy, state);
        Ok(())
    }

    fn acquire_context(&self, window: MockWindow) -> Result<MockContext> {
        self.log(HostCall::AcquireContext(window));
        let live = self
            .windows
            .borrow()
            .get(&window)
            .is_some_and(|e| !e.record.destroyed);
        if self.acquire_failure.get() || !live {
            return Err(TinyError::platform("GetDC", "Invalid window handle."));
        }
        self.acquired.set(self.acquired.get() + 1);
        let context = MockContext(self.acquired.get() as u32);
        self.open_contexts.borrow_mut().push(context);
        Ok(context)
    }

    fn release_context(&self, window: MockWindow, context: MockContext) {
        self.log(HostCall::ReleaseContext(window, context));
        self.released.set(self.released.get() + 1);
        self.open_contexts.borrow_mut().retain(|c| *c != context);
    }

    fn stretch_blit(
        &self,
        context: MockContext,
        dest: Rect,
        info: &BitmapInfo,
        pixels: &[u8],
    ) -> Result<()> {
        self.log(HostCall::StretchBlit(context));
        let index = self.blit_count.get();
        self.blit_count.set(index + 1);
        if self.blit_failure_at.get() == Some(index) {
            return Err(TinyError::platform("StretchDIBits", "The parameter is incorrect."));
        }
        if pixels.len() < info.byte_len() {
            return Err(TinyError::platform("StretchDIBits", "Buffer is too small."));
        }
        self.blits.borrow_mut().push(BlitRecord {
            context,
            dest,
            info: *info,
            pixels: pixels.to_vec(),
        });
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn create(host: &MockHost) -> (MockWindow, Rc<WindowState>) {
        let state = Rc::new(WindowState::new());
        let window = host
            .create_window(
                &WindowClass::TINY,
                "test",
                Rect::from_size(10, 10),
                WindowStyle::FIXED,
                Rc::clone(&state),
            )
            .unwrap();
        (window, state)
    }

    #[test]
    fn close_message_destroys_and_unbinds() {
        let host = MockHost::new();
        let (window, state) = create(&host);

        host.post(window, WindowMessage::Close);
        host.drain_messages();

        assert!(!state.is_alive());
        assert!(!host.is_bound(window));
        assert_eq!(Rc::strong_count(&state), 1);
        assert!(host.window(window).unwrap().destroyed);
    }

    #[test]
    fn destroy_twice_reports_invalid_handle() {
        let host = MockHost::new();
        let (window, _state) = create(&host);
        host.destroy_window(window).unwrap();
        assert!(host.destroy_window(window).unwrap_err().is_platform());
    }

    #[test]
    fn failed_close_is_logged_and_window_stays_alive() {
        let host = MockHost::new();
        let (window, state) = create(&host);
        host.fail_window_destruction("Access is denied.");

        host.post(window, WindowMessage::Close);
        host.drain_messages();

        assert!(state.is_alive());
        assert!(host.is_bound(window));
        let failures = host.count_calls(|c| {
            matches!(c, HostCall::DestroyFailed(w, msg) if *w == window && msg.contains("Access is denied"))
        });
        assert_eq!(failures, 1);
    }

    #[test]
    fn adjust_saturates_at_coordinate_limits() {
        let host = MockHost::new();
        let rc = host
            .adjust_window_rect(Rect::new(i32::MIN, 0, i32::MAX, 10), WindowStyle::FIXED)
            .unwrap();
        assert_eq!((rc.left, rc.right), (i32::MIN, i32::MAX));
    }

    #[test]
    fn adjust_adds_decorations() {
        let host = MockHost::new();
        let rc = host
            .adjust_window_rect(Rect::new(10, 40, 110, 140), WindowStyle::FIXED)
            .unwrap();
        assert_eq!(rc, Rect::new(10 - BORDER, 40 - BORDER - CAPTION, 110 + BORDER, 140 + BORDER));
    }

    #[test]
    fn contexts_are_balanced() {
        let host = MockHost::new();
        let (window, _state) = create(&host);
        let dc = host.acquire_context(window).unwrap();
        assert_eq!(host.open_contexts(), 1);
        host.release_context(window, dc);
        assert_eq!(host.open_contexts(), 0);
        assert_eq!(host.contexts_acquired(), host.contexts_released());
    }
}
