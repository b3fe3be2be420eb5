//! Per-window state machine: drag capture, keyboard moves, focus, minimize/restore, and close.
//!
//! A view layer owns one [`WindowController`] per mounted window and forwards user input to its
//! methods. Every committed change is written through to the [`WindowStore`]; pointer moves only
//! clamp in memory until the gesture ends.

use std::rc::Rc;

use platform_host::ViewportSource;
use thiserror::Error;

use crate::{
    config::WindowRuntimeConfig,
    geometry::{constrain_to_viewport, default_center_position},
    model::{
        DragSession, PointerPosition, WindowConfig, WindowId, WindowPhase, WindowPosition,
        WindowSize,
    },
    persistence::{WindowRecordUpdate, WindowStore},
    registry::WindowRegistry,
};

/// Text exposed to assistive technology next to every drag handle.
pub const DRAG_INSTRUCTIONS: &str = "Press Space or Enter to pick up the window, use the arrow \
keys to move it (hold Shift for larger steps), and press Space, Enter, or Escape to drop it. \
Press Alt+M to minimize.";

/// Notifications delivered to the hosting component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// The user asked to close the window.
    CloseRequested,
    /// The user minimized the window.
    MinimizeRequested,
    /// The user restored the window.
    RestoreRequested,
    /// A pointer drag or keyboard grab started (`true`) or ended (`false`).
    DragStateChanged(bool),
}

/// Hosting-component callbacks. Unset callbacks are skipped.
#[derive(Clone, Default)]
pub struct WindowCallbacks {
    on_close: Option<Rc<dyn Fn()>>,
    on_minimize: Option<Rc<dyn Fn()>>,
    on_restore: Option<Rc<dyn Fn()>>,
    on_drag_state_changed: Option<Rc<dyn Fn(bool)>>,
}

impl WindowCallbacks {
    /// Sets the close-request callback.
    pub fn on_close(mut self, f: impl Fn() + 'static) -> Self {
        self.on_close = Some(Rc::new(f));
        self
    }

    /// Sets the minimize callback.
    pub fn on_minimize(mut self, f: impl Fn() + 'static) -> Self {
        self.on_minimize = Some(Rc::new(f));
        self
    }

    /// Sets the restore callback.
    pub fn on_restore(mut self, f: impl Fn() + 'static) -> Self {
        self.on_restore = Some(Rc::new(f));
        self
    }

    /// Sets the drag-state callback.
    pub fn on_drag_state_changed(mut self, f: impl Fn(bool) + 'static) -> Self {
        self.on_drag_state_changed = Some(Rc::new(f));
        self
    }

    /// Routes every callback into a single event sink.
    pub fn forward_to(sink: impl Fn(WindowEvent) + 'static) -> Self {
        let sink: Rc<dyn Fn(WindowEvent)> = Rc::new(sink);
        let close = sink.clone();
        let minimize = sink.clone();
        let restore = sink.clone();
        Self::default()
            .on_close(move || close(WindowEvent::CloseRequested))
            .on_minimize(move || minimize(WindowEvent::MinimizeRequested))
            .on_restore(move || restore(WindowEvent::RestoreRequested))
            .on_drag_state_changed(move |dragging| sink(WindowEvent::DragStateChanged(dragging)))
    }

    fn emit(&self, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(f) = &self.on_close {
                    f();
                }
            }
            WindowEvent::MinimizeRequested => {
                if let Some(f) = &self.on_minimize {
                    f();
                }
            }
            WindowEvent::RestoreRequested => {
                if let Some(f) = &self.on_restore {
                    f();
                }
            }
            WindowEvent::DragStateChanged(dragging) => {
                if let Some(f) = &self.on_drag_state_changed {
                    f(dragging);
                }
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Controller errors for operations the current phase does not allow.
pub enum ControllerError {
    #[error("window is closed")]
    /// The window was closed.
    Closed,
    #[error("window is not attached")]
    /// The window has not been attached yet.
    NotAttached,
    #[error("cannot {action} while {from}")]
    /// The operation does not apply in the current phase.
    InvalidTransition {
        from: WindowPhase,
        action: &'static str,
    },
}

/// Framework-neutral key press delivered to the drag handle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyInput {
    /// `KeyboardEvent.key` value.
    pub key: String,
    /// Shift held.
    pub shift: bool,
    /// Alt held.
    pub alt: bool,
    /// Control held.
    pub ctrl: bool,
    /// Meta held.
    pub meta: bool,
}

impl KeyInput {
    /// Creates a key press with no modifiers.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Adds Shift.
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Adds Alt.
    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    fn is_activation(&self) -> bool {
        matches!(self.key.as_str(), "Enter" | " " | "Spacebar")
    }

    fn is_escape(&self) -> bool {
        matches!(self.key.as_str(), "Escape" | "Esc")
    }

    fn is_minimize_shortcut(&self) -> bool {
        self.alt && !self.ctrl && !self.meta && self.key.eq_ignore_ascii_case("m")
    }

    fn arrow_delta(&self, step: i32) -> Option<(i32, i32)> {
        match self.key.as_str() {
            "ArrowUp" => Some((0, -step)),
            "ArrowDown" => Some((0, step)),
            "ArrowLeft" => Some((-step, 0)),
            "ArrowRight" => Some((step, 0)),
            _ => None,
        }
    }
}

/// Returns the DOM id of the visually hidden drag instructions for `id`.
pub fn drag_instructions_id(id: &WindowId) -> String {
    let slug: String = id
        .as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("floating-window-{slug}-drag-instructions")
}

/// State machine for one floating window.
pub struct WindowController {
    config: WindowConfig,
    runtime: Rc<WindowRuntimeConfig>,
    store: WindowStore,
    registry: WindowRegistry,
    viewport: Rc<dyn ViewportSource>,
    callbacks: WindowCallbacks,
    phase: WindowPhase,
    position: WindowPosition,
    z_index: Option<u64>,
    drag: Option<DragSession>,
    /// Position held when the keyboard grab started.
    keyboard_grab: Option<WindowPosition>,
    was_dragging: bool,
}

impl WindowController {
    /// Creates an unattached controller. Nothing is read or written until [`WindowController::attach`].
    pub fn new(
        config: WindowConfig,
        runtime: Rc<WindowRuntimeConfig>,
        store: WindowStore,
        registry: WindowRegistry,
        viewport: Rc<dyn ViewportSource>,
        callbacks: WindowCallbacks,
    ) -> Self {
        let position = config
            .default_position
            .unwrap_or(runtime.geometry.fallback_position);
        Self {
            config,
            runtime,
            store,
            registry,
            viewport,
            callbacks,
            phase: WindowPhase::Opening,
            position,
            z_index: None,
            drag: None,
            keyboard_grab: None,
            was_dragging: false,
        }
    }

    /// Caller-supplied window id.
    pub fn id(&self) -> &WindowId {
        &self.config.id
    }

    /// Configuration the window was created with.
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Fixed window size.
    pub fn size(&self) -> WindowSize {
        self.config.size
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> WindowPhase {
        self.phase
    }

    /// Current top-left position, including any uncommitted move.
    pub fn position(&self) -> WindowPosition {
        self.position
    }

    /// Assigned z-index while attached.
    pub fn z_index(&self) -> Option<u64> {
        self.z_index
    }

    /// Whether the window is minimized.
    pub fn is_minimized(&self) -> bool {
        self.phase == WindowPhase::Minimized
    }

    /// Whether a pointer drag has passed the threshold.
    pub fn is_dragging(&self) -> bool {
        self.phase == WindowPhase::Dragging
    }

    /// Whether a pointer press is being tracked, past the drag threshold or not.
    pub fn has_pointer_gesture(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether the window is picked up for keyboard moves.
    pub fn is_grabbed(&self) -> bool {
        self.keyboard_grab.is_some()
    }

    /// Whether the window was closed.
    pub fn is_closed(&self) -> bool {
        self.phase == WindowPhase::Closed
    }

    /// Set when a pointer drag just ended; styling hint only.
    pub fn was_dragging(&self) -> bool {
        self.was_dragging
    }

    /// Reads and clears the was-dragging flag.
    pub fn take_was_dragging(&mut self) -> bool {
        std::mem::take(&mut self.was_dragging)
    }

    /// Mounts the window: resolves its starting position, takes a z-index slot, and writes the
    /// record through.
    ///
    /// The position comes from a live persisted record, else the configured default, else the
    /// centered default, and is always clamped to the viewport. A persisted minimized flag is
    /// honored. Attaching an already attached window does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Closed`] after [`WindowController::close`].
    pub fn attach(&mut self) -> Result<(), ControllerError> {
        match self.phase {
            WindowPhase::Closed => return Err(ControllerError::Closed),
            WindowPhase::Opening => {}
            _ => return Ok(()),
        }

        let persisted = self.store.live_record(&self.config.id);
        let viewport = self.viewport.viewport();
        let initial = persisted
            .as_ref()
            .map(|record| record.position)
            .or(self.config.default_position)
            .unwrap_or_else(|| {
                default_center_position(self.config.size, viewport, &self.runtime.geometry)
            });
        self.position =
            constrain_to_viewport(initial, self.config.size, viewport, &self.runtime.geometry);
        self.z_index = Some(self.registry.bring_to_front(&self.config.id));

        let minimized = persisted.map(|record| record.is_minimized).unwrap_or(false);
        if minimized {
            self.phase = WindowPhase::Minimized;
        } else {
            self.phase = WindowPhase::Normal;
            if self.config.blocking {
                self.registry.retain_blocking(&self.config.id);
            }
        }
        self.persist();
        Ok(())
    }

    /// Unmounts without closing: gives up the z-index slot and backdrop reference and abandons
    /// any in-flight move. The persisted record stays.
    pub fn detach(&mut self) {
        if matches!(self.phase, WindowPhase::Opening | WindowPhase::Closed) {
            return;
        }
        self.abandon_gestures();
        self.registry.release(&self.config.id);
        self.z_index = None;
        self.phase = WindowPhase::Opening;
    }

    /// Raises the window above every other open window if it is not already topmost.
    ///
    /// Minimized windows are left alone; use [`WindowController::restore`].
    ///
    /// # Errors
    ///
    /// Returns an error when the window is closed or not attached.
    pub fn focus(&mut self) -> Result<(), ControllerError> {
        self.ensure_live()?;
        if !matches!(self.phase, WindowPhase::Normal | WindowPhase::Dragging) {
            return Ok(());
        }
        if self.registry.is_topmost(&self.config.id) {
            return Ok(());
        }
        self.z_index = Some(self.registry.bring_to_front(&self.config.id));
        if self.phase == WindowPhase::Normal {
            self.persist();
        }
        Ok(())
    }

    /// Records a press on the drag handle. The drag starts once the pointer passes the
    /// threshold in [`WindowController::update_position`].
    ///
    /// # Errors
    ///
    /// Fails unless the window is attached, in the normal phase, and not a blocking modal.
    pub fn begin_drag(&mut self, pointer: PointerPosition) -> Result<(), ControllerError> {
        self.ensure_live()?;
        if self.phase != WindowPhase::Normal || self.config.blocking {
            return Err(ControllerError::InvalidTransition {
                from: self.phase,
                action: "begin drag",
            });
        }
        self.finish_keyboard_grab();
        self.focus()?;
        self.was_dragging = false;
        self.drag = Some(DragSession {
            pointer_start: pointer,
            position_start: self.position,
            active: false,
        });
        Ok(())
    }

    /// Applies a pointer move to the current gesture and returns the clamped position.
    ///
    /// Nothing is written to storage here.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InvalidTransition`] when no press is being tracked.
    pub fn update_position(
        &mut self,
        pointer: PointerPosition,
    ) -> Result<WindowPosition, ControllerError> {
        let Some(mut session) = self.drag else {
            return Err(ControllerError::InvalidTransition {
                from: self.phase,
                action: "move",
            });
        };

        let dx = pointer.x - session.pointer_start.x;
        let dy = pointer.y - session.pointer_start.y;
        if !session.active {
            if dx.abs().max(dy.abs()) <= self.runtime.drag_threshold_px {
                return Ok(self.position);
            }
            session.active = true;
            self.drag = Some(session);
            self.phase = WindowPhase::Dragging;
            self.callbacks.emit(WindowEvent::DragStateChanged(true));
        }

        self.position = self.clamp(session.position_start.offset(dx, dy));
        Ok(self.position)
    }

    /// Ends the gesture and commits the final position. A press that never passed the threshold
    /// ends without any write.
    ///
    /// # Errors
    ///
    /// Returns an error when the window is closed.
    pub fn end_drag(&mut self) -> Result<(), ControllerError> {
        if self.phase == WindowPhase::Closed {
            return Err(ControllerError::Closed);
        }
        let Some(session) = self.drag.take() else {
            return Ok(());
        };
        if session.active {
            self.phase = WindowPhase::Normal;
            self.was_dragging = true;
            self.persist();
            self.callbacks.emit(WindowEvent::DragStateChanged(false));
        }
        Ok(())
    }

    /// Abandons the gesture and returns to the pre-drag position without writing.
    ///
    /// # Errors
    ///
    /// Returns an error when the window is closed.
    pub fn cancel_drag(&mut self) -> Result<(), ControllerError> {
        if self.phase == WindowPhase::Closed {
            return Err(ControllerError::Closed);
        }
        let Some(session) = self.drag.take() else {
            return Ok(());
        };
        if session.active {
            self.position = session.position_start;
            self.phase = WindowPhase::Normal;
            self.callbacks.emit(WindowEvent::DragStateChanged(false));
        }
        Ok(())
    }

    /// Hides the window and moves it to the front of the minimized list.
    ///
    /// # Errors
    ///
    /// Returns an error when the window is closed or not attached.
    pub fn minimize(&mut self) -> Result<(), ControllerError> {
        self.ensure_live()?;
        if self.phase == WindowPhase::Minimized {
            return Ok(());
        }
        self.abandon_gestures();
        self.phase = WindowPhase::Minimized;
        if self.config.blocking {
            self.registry.release_blocking(&self.config.id);
        }
        self.persist();
        self.callbacks.emit(WindowEvent::MinimizeRequested);
        Ok(())
    }

    /// Shows a minimized window again at its previous position, on top of the stack.
    ///
    /// # Errors
    ///
    /// Returns an error when the window is closed or not attached.
    pub fn restore(&mut self) -> Result<(), ControllerError> {
        self.ensure_live()?;
        if self.phase != WindowPhase::Minimized {
            return Ok(());
        }
        self.phase = WindowPhase::Normal;
        self.z_index = Some(self.registry.bring_to_front(&self.config.id));
        if self.config.blocking {
            self.registry.retain_blocking(&self.config.id);
        }
        self.persist();
        self.callbacks.emit(WindowEvent::RestoreRequested);
        Ok(())
    }

    /// Minimizes a visible window or restores a minimized one.
    ///
    /// # Errors
    ///
    /// Returns an error when the window is closed or not attached.
    pub fn toggle_minimized(&mut self) -> Result<(), ControllerError> {
        if self.phase == WindowPhase::Minimized {
            self.restore()
        } else {
            self.minimize()
        }
    }

    /// Closes the window for good: deletes its record and releases its registry slot.
    /// Closing twice does nothing.
    pub fn close(&mut self) {
        if self.phase == WindowPhase::Closed {
            return;
        }
        if self.drag.take().map(|d| d.active).unwrap_or(false) {
            self.callbacks.emit(WindowEvent::DragStateChanged(false));
        }
        self.keyboard_grab = None;
        self.store.remove_window(&self.config.id);
        self.registry.release(&self.config.id);
        self.z_index = None;
        self.phase = WindowPhase::Closed;
        self.callbacks.emit(WindowEvent::CloseRequested);
    }

    /// Handles a key press on the drag handle. Returns whether the key was consumed.
    ///
    /// Space/Enter picks the window up or drops it where it is, arrows move it while picked up,
    /// Escape puts it back where it was picked up (or cancels a pointer drag), and Alt+M toggles
    /// minimize.
    ///
    /// # Errors
    ///
    /// Returns an error when the window is closed or not attached.
    pub fn handle_key(&mut self, input: &KeyInput) -> Result<bool, ControllerError> {
        self.ensure_live()?;

        if input.is_minimize_shortcut() {
            self.toggle_minimized()?;
            return Ok(true);
        }
        if input.is_escape() && self.drag.is_some() {
            self.cancel_drag()?;
            return Ok(true);
        }
        if self.phase != WindowPhase::Normal || self.config.blocking {
            return Ok(false);
        }

        if self.keyboard_grab.is_some() {
            let step = if input.shift {
                self.runtime.keyboard_large_step_px
            } else {
                self.runtime.keyboard_step_px
            };
            if let Some((dx, dy)) = input.arrow_delta(step) {
                self.position = self.clamp(self.position.offset(dx, dy));
                return Ok(true);
            }
            if input.is_activation() {
                self.finish_keyboard_grab();
                return Ok(true);
            }
            if input.is_escape() {
                self.cancel_keyboard_grab();
                return Ok(true);
            }
            return Ok(false);
        }

        if input.is_activation() && self.drag.is_none() {
            self.focus()?;
            self.keyboard_grab = Some(self.position);
            self.callbacks.emit(WindowEvent::DragStateChanged(true));
            return Ok(true);
        }
        Ok(false)
    }

    /// Re-clamps the window after the viewport changed size. Returns whether it moved.
    ///
    /// # Errors
    ///
    /// Returns an error when the window is closed or not attached.
    pub fn reclamp(&mut self) -> Result<bool, ControllerError> {
        self.ensure_live()?;
        let clamped = self.clamp(self.position);
        if clamped == self.position {
            return Ok(false);
        }
        self.position = clamped;
        if self.phase != WindowPhase::Dragging && self.keyboard_grab.is_none() {
            self.persist();
        }
        Ok(true)
    }

    fn ensure_live(&self) -> Result<(), ControllerError> {
        match self.phase {
            WindowPhase::Closed => Err(ControllerError::Closed),
            WindowPhase::Opening => Err(ControllerError::NotAttached),
            _ => Ok(()),
        }
    }

    fn clamp(&self, position: WindowPosition) -> WindowPosition {
        constrain_to_viewport(
            position,
            self.config.size,
            self.viewport.viewport(),
            &self.runtime.geometry,
        )
    }

    fn finish_keyboard_grab(&mut self) {
        if self.keyboard_grab.take().is_some() {
            self.persist();
            self.callbacks.emit(WindowEvent::DragStateChanged(false));
        }
    }

    fn cancel_keyboard_grab(&mut self) {
        if let Some(start) = self.keyboard_grab.take() {
            self.position = start;
            self.callbacks.emit(WindowEvent::DragStateChanged(false));
        }
    }

    /// Reverts any uncommitted pointer or keyboard move.
    fn abandon_gestures(&mut self) {
        if let Some(session) = self.drag.take() {
            if session.active {
                self.position = session.position_start;
                self.phase = WindowPhase::Normal;
                self.callbacks.emit(WindowEvent::DragStateChanged(false));
            }
        }
        self.cancel_keyboard_grab();
    }

    fn persist(&self) {
        let Some(z_index) = self.z_index else {
            return;
        };
        self.store.save_window(WindowRecordUpdate {
            id: self.config.id.clone(),
            position: self.position,
            is_minimized: self.phase == WindowPhase::Minimized,
            z_index,
            title: Some(self.config.title.clone()),
            icon: self.config.icon.clone(),
            origin_url: self.config.origin_url.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use platform_host::{ManualClock, MemoryScrollLock, MemorySessionStorage, MemoryViewport};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{WindowId, WindowRecord, SESSION_TIMEOUT_MS};

    struct Fixture {
        store: WindowStore,
        registry: WindowRegistry,
        viewport: MemoryViewport,
        clock: ManualClock,
        runtime: Rc<WindowRuntimeConfig>,
        events: Rc<RefCell<Vec<WindowEvent>>>,
    }

    impl Fixture {
        fn new() -> Self {
            let runtime = Rc::new(WindowRuntimeConfig::default());
            let clock = ManualClock::new(1_700_000_000_000);
            Self {
                store: WindowStore::new(
                    Rc::new(MemorySessionStorage::default()),
                    Rc::new(clock.clone()),
                    &runtime,
                ),
                registry: WindowRegistry::new(1000, Rc::new(MemoryScrollLock::default())),
                viewport: MemoryViewport::new(1280, 800),
                clock,
                runtime,
                events: Rc::default(),
            }
        }

        fn controller(&self, config: WindowConfig) -> WindowController {
            let events = self.events.clone();
            WindowController::new(
                config,
                self.runtime.clone(),
                self.store.clone(),
                self.registry.clone(),
                Rc::new(self.viewport.clone()),
                WindowCallbacks::forward_to(move |event| events.borrow_mut().push(event)),
            )
        }

        fn attached(&self, config: WindowConfig) -> WindowController {
            let mut controller = self.controller(config);
            controller.attach().expect("attach");
            controller
        }

        fn record(&self, id: &str) -> Option<WindowRecord> {
            self.store.record(&WindowId::new(id))
        }

        fn take_events(&self) -> Vec<WindowEvent> {
            self.events.borrow_mut().drain(..).collect()
        }
    }

    fn notes() -> WindowConfig {
        WindowConfig::new("notes", "Progress Notes")
            .with_size(400, 300)
            .with_default_position(WindowPosition::new(200, 150))
    }

    #[test]
    fn attach_without_default_centers_and_writes_record() {
        let fixture = Fixture::new();
        let controller = fixture.attached(WindowConfig::new("labs", "Labs").with_size(400, 300));

        assert_eq!(controller.phase(), WindowPhase::Normal);
        assert_eq!(controller.position(), WindowPosition::new(440, 270));
        assert_eq!(controller.z_index(), Some(1000));

        let record = fixture.record("labs").expect("record");
        assert_eq!(record.position, controller.position());
        assert_eq!(record.title, "Labs");
        assert!(!record.is_minimized);
    }

    #[test]
    fn attach_clamps_offscreen_default_position() {
        let fixture = Fixture::new();
        let controller = fixture.attached(
            WindowConfig::new("far", "Far")
                .with_size(400, 300)
                .with_default_position(WindowPosition::new(9_000, -40)),
        );
        assert_eq!(controller.position(), WindowPosition::new(1080, 80));
    }

    #[test]
    fn persisted_position_wins_over_default() {
        let fixture = Fixture::new();
        let mut first = fixture.attached(notes());
        first.begin_drag(PointerPosition::new(0, 0)).expect("begin");
        first
            .update_position(PointerPosition::new(100, 50))
            .expect("move");
        first.end_drag().expect("end");
        first.detach();

        let second = fixture.attached(notes());
        assert_eq!(second.position(), WindowPosition::new(300, 200));
    }

    #[test]
    fn drag_waits_for_threshold_then_clamps_and_commits_on_release() {
        let fixture = Fixture::new();
        let mut controller = fixture.attached(notes());

        controller.begin_drag(PointerPosition::new(10, 10)).expect("begin");
        let still = controller
            .update_position(PointerPosition::new(12, 13))
            .expect("small move");
        assert_eq!(still, WindowPosition::new(200, 150));
        assert_eq!(controller.phase(), WindowPhase::Normal);
        assert!(fixture.take_events().is_empty());

        let moved = controller
            .update_position(PointerPosition::new(5_000, 20))
            .expect("move");
        assert_eq!(moved, WindowPosition::new(1080, 160));
        assert!(controller.is_dragging());
        // No write while the gesture is in flight.
        assert_eq!(
            fixture.record("notes").expect("record").position,
            WindowPosition::new(200, 150)
        );

        controller.end_drag().expect("end");
        assert_eq!(controller.phase(), WindowPhase::Normal);
        assert!(controller.was_dragging());
        assert!(controller.take_was_dragging());
        assert!(!controller.was_dragging());
        assert_eq!(
            fixture.record("notes").expect("record").position,
            WindowPosition::new(1080, 160)
        );
        assert_eq!(
            fixture.take_events(),
            vec![
                WindowEvent::DragStateChanged(true),
                WindowEvent::DragStateChanged(false)
            ]
        );
    }

    #[test]
    fn cancelled_drag_reverts_to_pre_drag_position() {
        let fixture = Fixture::new();
        let mut controller = fixture.attached(notes());

        controller.begin_drag(PointerPosition::new(0, 0)).expect("begin");
        controller
            .update_position(PointerPosition::new(60, 60))
            .expect("move");
        assert!(controller.handle_key(&KeyInput::new("Escape")).expect("escape"));

        assert_eq!(controller.position(), WindowPosition::new(200, 150));
        assert_eq!(controller.phase(), WindowPhase::Normal);
        assert!(!controller.was_dragging());
    }

    #[test]
    fn click_without_movement_does_not_write_or_notify() {
        let fixture = Fixture::new();
        let mut controller = fixture.attached(notes());
        let before = fixture.record("notes").expect("record");

        controller.begin_drag(PointerPosition::new(5, 5)).expect("begin");
        controller.end_drag().expect("end");

        assert_eq!(fixture.record("notes"), Some(before));
        assert!(fixture.take_events().is_empty());
    }

    #[test]
    fn update_without_press_is_rejected() {
        let fixture = Fixture::new();
        let mut controller = fixture.attached(notes());
        assert_eq!(
            controller.update_position(PointerPosition::new(1, 1)),
            Err(ControllerError::InvalidTransition {
                from: WindowPhase::Normal,
                action: "move",
            })
        );
    }

    #[test]
    fn pressing_a_background_window_brings_it_to_front() {
        let fixture = Fixture::new();
        let mut back = fixture.attached(notes());
        let front = fixture.attached(WindowConfig::new("orders", "Orders"));
        assert_eq!(front.z_index(), Some(1001));

        back.begin_drag(PointerPosition::new(0, 0)).expect("begin");
        assert_eq!(back.z_index(), Some(1002));
        assert_eq!(fixture.record("notes").expect("record").z_index, 1002);

        back.end_drag().expect("end");
        back.focus().expect("focus topmost");
        assert_eq!(back.z_index(), Some(1002));
    }

    #[test]
    fn minimize_and_restore_keep_position_and_raise_on_restore() {
        let fixture = Fixture::new();
        let mut controller = fixture.attached(notes());
        let _other = fixture.attached(WindowConfig::new("orders", "Orders"));

        controller.minimize().expect("minimize");
        assert!(controller.is_minimized());
        let record = fixture.record("notes").expect("record");
        assert!(record.is_minimized);
        assert_eq!(
            fixture.store.load().expect("store").minimized_order,
            vec![WindowId::new("notes")]
        );

        controller.focus().expect("focus minimized is a no-op");
        assert!(controller.is_minimized());

        controller.restore().expect("restore");
        assert_eq!(controller.phase(), WindowPhase::Normal);
        assert_eq!(controller.position(), WindowPosition::new(200, 150));
        assert_eq!(controller.z_index(), Some(1002));
        assert!(fixture.store.load().expect("store").minimized_order.is_empty());
        assert_eq!(
            fixture.take_events(),
            vec![WindowEvent::MinimizeRequested, WindowEvent::RestoreRequested]
        );
    }

    #[test]
    fn minimizing_mid_drag_discards_the_in_flight_position() {
        let fixture = Fixture::new();
        let mut controller = fixture.attached(notes());
        controller.begin_drag(PointerPosition::new(0, 0)).expect("begin");
        controller
            .update_position(PointerPosition::new(80, 80))
            .expect("move");

        controller.minimize().expect("minimize");
        assert_eq!(
            fixture.record("notes").expect("record").position,
            WindowPosition::new(200, 150)
        );
        assert_eq!(controller.end_drag(), Ok(()));
    }

    #[test]
    fn close_deletes_record_releases_slot_and_is_terminal() {
        let fixture = Fixture::new();
        let mut controller = fixture.attached(notes());
        controller.minimize().expect("minimize");

        controller.close();
        assert!(controller.is_closed());
        assert_eq!(fixture.record("notes"), None);
        assert!(fixture.store.load().expect("store").minimized_order.is_empty());
        assert_eq!(fixture.registry.open_window_count(), 0);

        controller.close();
        assert_eq!(controller.restore(), Err(ControllerError::Closed));
        assert_eq!(controller.attach(), Err(ControllerError::Closed));
        assert_eq!(
            fixture.take_events(),
            vec![WindowEvent::MinimizeRequested, WindowEvent::CloseRequested]
        );
    }

    #[test]
    fn operations_before_attach_report_not_attached() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller(notes());
        assert_eq!(controller.minimize(), Err(ControllerError::NotAttached));
        assert_eq!(
            controller.begin_drag(PointerPosition::new(0, 0)),
            Err(ControllerError::NotAttached)
        );
        assert_eq!(fixture.record("notes"), None);
    }

    #[test]
    fn keyboard_grab_moves_by_steps_and_commits_on_drop() {
        let fixture = Fixture::new();
        let mut controller = fixture.attached(notes());

        assert!(!controller.handle_key(&KeyInput::new("ArrowRight")).expect("key"));
        assert!(controller.handle_key(&KeyInput::new(" ")).expect("grab"));
        assert!(controller.is_grabbed());

        controller.handle_key(&KeyInput::new("ArrowRight")).expect("key");
        controller.handle_key(&KeyInput::new("ArrowDown")).expect("key");
        controller
            .handle_key(&KeyInput::new("ArrowLeft").with_shift())
            .expect("key");
        assert_eq!(controller.position(), WindowPosition::new(160, 160));
        assert_eq!(
            fixture.record("notes").expect("record").position,
            WindowPosition::new(200, 150)
        );

        assert!(controller.handle_key(&KeyInput::new("Enter")).expect("drop"));
        assert!(!controller.is_grabbed());
        assert_eq!(
            fixture.record("notes").expect("record").position,
            WindowPosition::new(160, 160)
        );
    }

    #[test]
    fn cancelling_after_release_keeps_the_committed_position() {
        let fixture = Fixture::new();
        let mut controller = fixture.attached(notes());
        controller.begin_drag(PointerPosition::new(0, 0)).expect("begin");
        controller
            .update_position(PointerPosition::new(40, 20))
            .expect("move");
        controller.end_drag().expect("end");
        fixture.take_events();

        controller.cancel_drag().expect("late cancel");
        assert_eq!(controller.phase(), WindowPhase::Normal);
        assert_eq!(controller.position(), WindowPosition::new(240, 170));
        assert_eq!(
            fixture.record("notes").expect("record").position,
            WindowPosition::new(240, 170)
        );
        assert!(fixture.take_events().is_empty());
    }

    #[test]
    fn escape_puts_a_keyboard_grabbed_window_back() {
        let fixture = Fixture::new();
        let mut controller = fixture.attached(notes());
        controller.handle_key(&KeyInput::new("Enter")).expect("grab");
        controller.handle_key(&KeyInput::new("ArrowRight")).expect("key");
        assert_eq!(controller.position(), WindowPosition::new(210, 150));
        fixture.take_events();

        assert!(controller.handle_key(&KeyInput::new("Escape")).expect("cancel"));
        assert!(!controller.is_grabbed());
        assert_eq!(controller.position(), WindowPosition::new(200, 150));
        assert_eq!(
            fixture.record("notes").expect("record").position,
            WindowPosition::new(200, 150)
        );
        assert_eq!(fixture.take_events(), vec![WindowEvent::DragStateChanged(false)]);
    }

    #[test]
    fn attach_ignores_an_expired_record_for_the_same_id() {
        let fixture = Fixture::new();
        let mut first = fixture.attached(notes());
        first.handle_key(&KeyInput::new("Enter")).expect("grab");
        first.handle_key(&KeyInput::new("ArrowDown")).expect("key");
        first.handle_key(&KeyInput::new("Enter")).expect("drop");
        first.detach();

        fixture.clock.advance(SESSION_TIMEOUT_MS + 1);
        let second = fixture.attached(notes());
        assert_eq!(second.position(), WindowPosition::new(200, 150));
    }

    #[test]
    fn keyboard_moves_are_clamped() {
        let fixture = Fixture::new();
        let mut controller = fixture.attached(
            WindowConfig::new("edge", "Edge")
                .with_size(400, 300)
                .with_default_position(WindowPosition::new(25, 85)),
        );
        controller.handle_key(&KeyInput::new("Enter")).expect("grab");
        controller
            .handle_key(&KeyInput::new("ArrowLeft").with_shift())
            .expect("key");
        controller
            .handle_key(&KeyInput::new("ArrowUp").with_shift())
            .expect("key");
        assert_eq!(controller.position(), WindowPosition::new(20, 80));
    }

    #[test]
    fn alt_m_toggles_minimize() {
        let fixture = Fixture::new();
        let mut controller = fixture.attached(notes());
        assert!(controller
            .handle_key(&KeyInput::new("m").with_alt())
            .expect("minimize"));
        assert!(controller.is_minimized());
        assert!(controller
            .handle_key(&KeyInput::new("M").with_alt())
            .expect("restore"));
        assert!(!controller.is_minimized());
    }

    #[test]
    fn blocking_modals_cannot_be_dragged() {
        let fixture = Fixture::new();
        let mut consent = fixture.attached(WindowConfig::new("consent", "Consent").blocking());
        assert!(matches!(
            consent.begin_drag(PointerPosition::new(0, 0)),
            Err(ControllerError::InvalidTransition { .. })
        ));
        assert!(!consent.handle_key(&KeyInput::new("Enter")).expect("key"));
        assert!(fixture.registry.backdrop_active());
    }

    #[test]
    fn reclamp_pulls_window_back_after_viewport_shrinks() {
        let fixture = Fixture::new();
        let mut controller = fixture.attached(
            WindowConfig::new("wide", "Wide")
                .with_size(400, 300)
                .with_default_position(WindowPosition::new(1000, 400)),
        );
        assert!(!controller.reclamp().expect("no change"));

        fixture.viewport.set(Some(platform_host::Viewport {
            width: 800,
            height: 600,
        }));
        assert!(controller.reclamp().expect("reclamp"));
        assert_eq!(controller.position(), WindowPosition::new(600, 260));
        assert_eq!(
            fixture.record("wide").expect("record").position,
            WindowPosition::new(600, 260)
        );
    }

    #[test]
    fn detach_releases_slot_but_keeps_record() {
        let fixture = Fixture::new();
        let mut controller = fixture.attached(notes());
        controller.detach();

        assert_eq!(controller.phase(), WindowPhase::Opening);
        assert_eq!(controller.z_index(), None);
        assert_eq!(fixture.registry.open_window_count(), 0);
        assert!(fixture.record("notes").is_some());

        controller.attach().expect("reattach");
        assert_eq!(controller.z_index(), Some(1001));
    }

    #[test]
    fn drag_instructions_id_is_dom_safe() {
        assert_eq!(
            drag_instructions_id(&WindowId::new("patient notes/17")),
            "floating-window-patient-notes-17-drag-instructions"
        );
    }
}
