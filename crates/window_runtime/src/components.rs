//! Leptos bindings for floating windows, the shared modal backdrop, and the minimized tray.

use std::{cell::RefCell, rc::Rc};

use leptos::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

use crate::{
    controller::{
        drag_instructions_id, ControllerError, KeyInput, WindowCallbacks, WindowController,
        WindowEvent, DRAG_INSTRUCTIONS,
    },
    manager::WindowManager,
    model::{PointerPosition, WindowConfig, WindowId, WindowPhase, WindowPosition, WindowRecord},
};

#[cfg(target_arch = "wasm32")]
fn try_set_pointer_capture(ev: &web_sys::PointerEvent) {
    if let Some(target) = ev.current_target() {
        if let Ok(element) = target.dyn_into::<web_sys::Element>() {
            let _ = element.set_pointer_capture(ev.pointer_id());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn try_set_pointer_capture(_: &web_sys::PointerEvent) {}

fn pointer_from_pointer_event(ev: &web_sys::PointerEvent) -> PointerPosition {
    PointerPosition::new(ev.client_x(), ev.client_y())
}

fn key_input_from_event(ev: &web_sys::KeyboardEvent) -> KeyInput {
    KeyInput {
        key: ev.key(),
        shift: ev.shift_key(),
        alt: ev.alt_key(),
        ctrl: ev.ctrl_key(),
        meta: ev.meta_key(),
    }
}

/// Hands a key press to the drag handle only when the handle itself is the event target.
/// Returns whether the press was consumed.
fn route_handle_key(from_handle: bool, handle: impl FnOnce() -> Option<bool>) -> bool {
    from_handle && handle() == Some(true)
}

fn stop_mouse_event(ev: &web_sys::MouseEvent) {
    ev.prevent_default();
    ev.stop_propagation();
}

#[derive(Clone, Copy)]
/// Reactive handle to the window manager shared by every window component.
pub struct WindowRuntimeContext {
    manager: StoredValue<WindowManager>,
    backdrop_active: RwSignal<bool>,
    minimized: RwSignal<Vec<WindowRecord>>,
    restore_request: RwSignal<Option<WindowId>>,
}

impl WindowRuntimeContext {
    fn new(manager: WindowManager) -> Self {
        let backdrop_active = create_rw_signal(manager.registry().backdrop_active());
        let minimized = create_rw_signal(manager.minimized_windows());
        Self {
            manager: store_value(manager),
            backdrop_active,
            minimized,
            restore_request: create_rw_signal(None),
        }
    }

    /// Returns a handle to the shared window manager.
    pub fn manager(&self) -> WindowManager {
        self.manager.get_value()
    }

    /// Whether any blocking modal currently holds the shared backdrop.
    pub fn backdrop_active(&self) -> Signal<bool> {
        self.backdrop_active.into()
    }

    /// Minimized windows, most recently minimized first.
    pub fn minimized_windows(&self) -> Signal<Vec<WindowRecord>> {
        self.minimized.into()
    }

    /// Asks the mounted window with `id` to restore itself.
    pub fn request_restore(&self, id: WindowId) {
        self.restore_request.set(Some(id));
    }

    /// Re-reads backdrop and minimized-list state after a lifecycle change.
    fn refresh(&self) {
        let Some((backdrop_active, minimized)) = self.manager.try_with_value(|manager| {
            (
                manager.registry().backdrop_active(),
                manager.minimized_windows(),
            )
        }) else {
            return;
        };
        let _ = self.backdrop_active.try_set(backdrop_active);
        let _ = self.minimized.try_set(minimized);
    }
}

/// Installs a [`WindowRuntimeContext`] for `manager` into the current reactive scope.
pub fn provide_window_runtime(manager: WindowManager) -> WindowRuntimeContext {
    let context = WindowRuntimeContext::new(manager);
    provide_context(context);
    context
}

/// Returns the [`WindowRuntimeContext`] installed by [`provide_window_runtime`].
pub fn use_window_runtime() -> WindowRuntimeContext {
    use_context::<WindowRuntimeContext>().expect("WindowRuntimeContext not provided")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowViewState {
    phase: WindowPhase,
    position: WindowPosition,
    z_index: u64,
    grabbed: bool,
}

impl WindowViewState {
    fn of(controller: &WindowController) -> Self {
        Self {
            phase: controller.phase(),
            position: controller.position(),
            z_index: controller.z_index().unwrap_or_default(),
            grabbed: controller.is_grabbed(),
        }
    }
}

#[derive(Clone, Copy, Default)]
struct WindowHandlers {
    on_close: Option<Callback<()>>,
    on_minimize: Option<Callback<()>>,
    on_restore: Option<Callback<()>>,
    on_drag_state_changed: Option<Callback<bool>>,
}

impl WindowHandlers {
    fn dispatch(&self, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(cb) = self.on_close {
                    cb.call(());
                }
            }
            WindowEvent::MinimizeRequested => {
                if let Some(cb) = self.on_minimize {
                    cb.call(());
                }
            }
            WindowEvent::RestoreRequested => {
                if let Some(cb) = self.on_restore {
                    cb.call(());
                }
            }
            WindowEvent::DragStateChanged(dragging) => {
                if let Some(cb) = self.on_drag_state_changed {
                    cb.call(dragging);
                }
            }
        }
    }
}

/// Glue between DOM events and one [`WindowController`].
///
/// Controller callbacks only queue into `outbox`; queued events are delivered to the host's
/// callbacks after the controller borrow ends, so a host may unmount the window from inside a
/// callback.
#[derive(Clone)]
struct WindowBinding {
    controller: StoredValue<WindowController>,
    outbox: Rc<RefCell<Vec<WindowEvent>>>,
    view_state: RwSignal<WindowViewState>,
    runtime: WindowRuntimeContext,
    handlers: WindowHandlers,
}

impl WindowBinding {
    fn apply<T>(
        &self,
        action: &'static str,
        f: impl FnOnce(&mut WindowController) -> Result<T, ControllerError>,
    ) -> Option<T> {
        let result = self.controller.try_update_value(f)?;
        let before = self.view_state.get_untracked();
        let after = self.controller.with_value(WindowViewState::of);
        if after != before {
            self.view_state.set(after);
        }
        if after.phase != before.phase {
            self.runtime.refresh();
        }

        let events: Vec<WindowEvent> = self.outbox.borrow_mut().drain(..).collect();
        for event in events {
            self.handlers.dispatch(event);
        }

        match result {
            Ok(value) => Some(value),
            Err(err) => {
                logging::debug_warn!("window {action} ignored: {err}");
                None
            }
        }
    }
}

/// Draggable, minimizable window frame hosting arbitrary content.
#[component]
pub fn FloatingWindow(
    /// Identity, title, and placement of the window.
    config: WindowConfig,
    /// Called after the window closes.
    #[prop(optional)]
    on_close: Option<Callback<()>>,
    /// Called after the window minimizes.
    #[prop(optional)]
    on_minimize: Option<Callback<()>>,
    /// Called after the window is restored.
    #[prop(optional)]
    on_restore: Option<Callback<()>>,
    /// Called when a pointer drag or keyboard grab starts or ends.
    #[prop(optional)]
    on_drag_state_changed: Option<Callback<bool>>,
    /// Window body.
    children: Children,
) -> impl IntoView {
    let runtime = use_window_runtime();
    let window_id = config.id.clone();
    let title = config.title.clone();
    let size = config.size;
    let blocking = config.blocking;
    let instructions_id = drag_instructions_id(&window_id);

    let outbox: Rc<RefCell<Vec<WindowEvent>>> = Rc::default();
    let callbacks = WindowCallbacks::forward_to({
        let outbox = outbox.clone();
        move |event| outbox.borrow_mut().push(event)
    });
    let controller = runtime.manager().controller(config, callbacks);
    let view_state = create_rw_signal(WindowViewState::of(&controller));
    let binding = WindowBinding {
        controller: store_value(controller),
        outbox,
        view_state,
        runtime,
        handlers: WindowHandlers {
            on_close,
            on_minimize,
            on_restore,
            on_drag_state_changed,
        },
    };

    binding.apply("attach", |c| c.attach());

    let resize_listener = window_event_listener(ev::resize, {
        let binding = binding.clone();
        move |_| {
            binding.apply("reclamp", |c| c.reclamp());
        }
    });
    on_cleanup({
        let binding = binding.clone();
        move || {
            resize_listener.remove();
            let _ = binding.controller.try_update_value(|c| c.detach());
            binding.runtime.refresh();
        }
    });

    create_effect({
        let binding = binding.clone();
        let window_id = window_id.clone();
        move |_| {
            if runtime.restore_request.get().as_ref() == Some(&window_id) {
                runtime.restore_request.set(None);
                binding.apply("restore", |c| c.restore());
            }
        }
    });

    let focus = {
        let binding = binding.clone();
        move |_: web_sys::PointerEvent| {
            binding.apply("focus", |c| c.focus());
        }
    };
    let begin_drag = {
        let binding = binding.clone();
        move |ev: web_sys::PointerEvent| {
            if blocking {
                return;
            }
            if ev.pointer_type() == "mouse" && ev.button() != 0 {
                return;
            }
            if ev.pointer_type() != "mouse" && !ev.is_primary() {
                return;
            }
            try_set_pointer_capture(&ev);
            ev.stop_propagation();
            binding.apply("begin drag", |c| c.begin_drag(pointer_from_pointer_event(&ev)));
        }
    };
    let update_drag = {
        let binding = binding.clone();
        move |ev: web_sys::PointerEvent| {
            if binding.controller.with_value(WindowController::has_pointer_gesture) {
                binding.apply("drag", |c| c.update_position(pointer_from_pointer_event(&ev)));
            }
        }
    };
    let end_drag = {
        let binding = binding.clone();
        move |_: web_sys::PointerEvent| {
            binding.apply("end drag", |c| c.end_drag());
        }
    };
    let cancel_drag = {
        let binding = binding.clone();
        move |_: web_sys::PointerEvent| {
            binding.apply("cancel drag", |c| c.cancel_drag());
        }
    };
    // Fires after pointerup too, when the gesture is already over and this is a no-op.
    let lost_capture = {
        let binding = binding.clone();
        move |_: web_sys::PointerEvent| {
            binding.apply("lost capture", |c| c.cancel_drag());
        }
    };
    let keydown = {
        let binding = binding.clone();
        move |ev: web_sys::KeyboardEvent| {
            let from_handle = ev.target() == ev.current_target();
            let input = key_input_from_event(&ev);
            if route_handle_key(from_handle, || binding.apply("key", |c| c.handle_key(&input))) {
                ev.prevent_default();
                ev.stop_propagation();
            }
        }
    };
    let minimize = {
        let binding = binding.clone();
        move |ev: web_sys::MouseEvent| {
            stop_mouse_event(&ev);
            binding.apply("minimize", |c| c.minimize());
        }
    };
    let close = {
        let binding = binding.clone();
        move |ev: web_sys::MouseEvent| {
            stop_mouse_event(&ev);
            binding.apply("close", |c| {
                c.close();
                Ok(())
            });
        }
    };

    let style = move || {
        let state = view_state.get();
        format!(
            "left:{}px;top:{}px;width:{}px;height:{}px;z-index:{};",
            state.position.x, state.position.y, size.width, size.height, state.z_index
        )
    };
    let hidden = move || {
        matches!(
            view_state.get().phase,
            WindowPhase::Minimized | WindowPhase::Closed | WindowPhase::Opening
        )
    };
    let handle_label = format!("Move {title}");

    view! {
        <section
            class="floating-window"
            class:blocking=blocking
            class:dragging=move || view_state.get().phase == WindowPhase::Dragging
            class:grabbed=move || view_state.get().grabbed
            class:minimized=hidden
            style=style
            role="dialog"
            aria-modal=if blocking { "true" } else { "false" }
            aria-label=title.clone()
            aria-hidden=move || if hidden() { "true" } else { "false" }
            on:pointerdown=focus
        >
            <header class="floating-window-titlebar">
                <div
                    class="floating-window-drag-handle"
                    tabindex="0"
                    role="button"
                    aria-label=handle_label
                    aria-describedby=instructions_id.clone()
                    aria-pressed=move || if view_state.get().grabbed { "true" } else { "false" }
                    on:pointerdown=begin_drag
                    on:pointermove=update_drag
                    on:pointerup=end_drag
                    on:pointercancel=cancel_drag
                    on:lostpointercapture=lost_capture
                    on:keydown=keydown
                >
                    <span class="floating-window-title">{title.clone()}</span>
                </div>
                <div class="floating-window-controls">
                    <button type="button" aria-label="Minimize window" on:click=minimize>
                        "\u{2013}"
                    </button>
                    <button type="button" aria-label="Close window" on:click=close>
                        "\u{00d7}"
                    </button>
                </div>
            </header>
            <p id=instructions_id class="visually-hidden">
                {DRAG_INSTRUCTIONS}
            </p>
            <div class="floating-window-body">{children()}</div>
        </section>
    }
}

/// Single page-level overlay shown while any blocking modal is open.
#[component]
pub fn ModalBackdrop() -> impl IntoView {
    let runtime = use_window_runtime();
    let active = runtime.backdrop_active();

    view! {
        <Show when=move || active.get() fallback=|| ()>
            <div class="modal-backdrop" aria-hidden="true"></div>
        </Show>
    }
}

/// Restore buttons for minimized windows, most recently minimized first.
#[component]
pub fn MinimizedWindowTray() -> impl IntoView {
    let runtime = use_window_runtime();
    let minimized = runtime.minimized_windows();

    view! {
        <nav class="minimized-window-tray" aria-label="Minimized windows">
            <For
                each=move || minimized.get()
                key=|record| record.id.clone()
                children=move |record: WindowRecord| {
                    let id = record.id.clone();
                    let label = format!("Restore {}", record.title);
                    view! {
                        <button
                            type="button"
                            class="minimized-window-tray-item"
                            aria-label=label
                            on:click=move |_| runtime.request_restore(id.clone())
                        >
                            {record.title.clone()}
                        </button>
                    }
                }
            />
        </nav>
    }
}
