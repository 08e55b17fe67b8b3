use std::cell::RefCell;
use std::rc::{Rc, Weak};

use chip8_console::probe::{probe_set, ProbeAccessor};
use chip8_console::program::ProgramDescriptor;
use chip8_console::{ConsoleConfig, RunState, SessionController};
use leptos::prelude::*;

mod catalog;
mod engine;
mod scheduler;
mod sink;

use crate::ui_model::{
    description_lines, instruction_element_id, is_backdrop_click, keypad_rows,
    pause_button_disabled, pause_button_label, probe_element_id, register_label,
    start_button_label, SETTINGS_MENU_ID,
};
use engine::ModuleEngine;
use scheduler::{FrameTarget, RafScheduler};
use sink::{SignalSink, CURRENT_INSTRUCTION_CLASS};

type Controller = SessionController<ModuleEngine, SignalSink, RafScheduler>;

pub fn start() {
    mount_to_body(|| view! { <App /> });
}

/// Builds the controller and routes fired animation frames back into it.
fn build_controller(cfg: &ConsoleConfig, sink: SignalSink) -> Rc<RefCell<Controller>> {
    let target: FrameTarget = Rc::new(RefCell::new(None));
    let controller = Rc::new(RefCell::new(SessionController::new(
        cfg,
        ModuleEngine,
        sink,
        RafScheduler::new(Rc::clone(&target)),
    )));

    let weak: Weak<RefCell<Controller>> = Rc::downgrade(&controller);
    *target.borrow_mut() = Some(Box::new(move |handle| {
        let Some(c) = weak.upgrade() else {
            return;
        };
        match c.try_borrow_mut() {
            Ok(mut c) => {
                c.on_frame(handle);
            }
            // No follow-up frame is requested; the next start or resume re-arms the loop.
            Err(_) => web_sys::console::warn_1(
                &format!("frame {} dropped: controller busy", handle.raw()).into(),
            ),
        }
    }));
    controller
}

#[component]
fn App() -> impl IntoView {
    let cfg = ConsoleConfig::default();
    let probes = probe_set(cfg.register_count, cfg.stack_size);
    let sink = SignalSink::new(probes.iter().map(|p| p.identifier.as_str()));
    let view_sink = sink.clone();
    let controller = build_controller(&cfg, sink);

    let programs = RwSignal::new(Vec::<ProgramDescriptor>::new());
    let selected = RwSignal::new(None::<usize>);
    let listing = RwSignal::new(Vec::<String>::new());
    let keypad_visible = RwSignal::new(false);
    let settings_open = RwSignal::new(false);
    let settings_ref = NodeRef::<leptos::html::Dialog>::new();

    // Keeps the modal in step with `settings_open`.
    Effect::new(move |_| {
        let open = settings_open.get();
        let Some(dialog) = settings_ref.get() else {
            return;
        };
        if open && !dialog.open() {
            if dialog.show_modal().is_err() {
                web_sys::console::error_1(&"settings dialog failed to open".into());
                settings_open.set(false);
            }
        } else if !open && dialog.open() {
            dialog.close();
        }
    });

    let refresh_listing: Rc<dyn Fn()> = {
        let controller = Rc::clone(&controller);
        Rc::new(move || {
            let l = controller.borrow_mut().instruction_listing();
            listing.set(l.lines().to_vec());
        })
    };

    let select: Rc<dyn Fn(Option<usize>)> = {
        let controller = Rc::clone(&controller);
        let refresh_listing = Rc::clone(&refresh_listing);
        Rc::new(move |index: Option<usize>| {
            selected.set(index);
            let program = index.and_then(|i| programs.with_untracked(|p| p.get(i).cloned()));
            let active = {
                let mut c = controller.borrow_mut();
                c.select_program(program);
                c.run_state().is_active()
            };
            if active {
                refresh_listing();
            }
        })
    };

    // Startup: fetch metadata, select the first program, show initial values.
    {
        let controller = Rc::clone(&controller);
        let select = Rc::clone(&select);
        let metadata_path = cfg.metadata_path.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let list = catalog::fetch_programs(&metadata_path).await;
            let first = (!list.is_empty()).then_some(0);
            programs.set(list);
            select(first);
            let mut c = controller.borrow_mut();
            c.publish_controls();
            c.refresh();
        });
    }

    let on_start = {
        let controller = Rc::clone(&controller);
        let refresh_listing = Rc::clone(&refresh_listing);
        move |_| {
            let state = controller.borrow_mut().press_start();
            if state == RunState::Running {
                refresh_listing();
            }
        }
    };

    let on_pause = {
        let controller = Rc::clone(&controller);
        move |_| {
            controller.borrow_mut().press_pause();
        }
    };

    let on_select = {
        let select = Rc::clone(&select);
        move |ev| {
            let v = event_target_value(&ev);
            select(v.parse::<usize>().ok());
        }
    };

    let press: Rc<dyn Fn(usize)> = {
        let controller = Rc::clone(&controller);
        Rc::new(move |slot| {
            controller.borrow_mut().press_key(slot);
        })
    };
    let release: Rc<dyn Fn(usize)> = {
        let controller = Rc::clone(&controller);
        Rc::new(move |slot| {
            controller.borrow_mut().release_key(slot);
        })
    };

    let is_running = view_sink.is_running;
    let is_paused = view_sink.is_paused;
    let stack_top = view_sink.stack_top;
    let current_instruction = view_sink.current_instruction;

    let description = move || {
        selected
            .get()
            .and_then(|i| programs.with(|p| p.get(i).map(|p| p.description.clone())))
            .unwrap_or_default()
    };

    let special_rows = probes
        .iter()
        .filter(|p| !matches!(p.accessor, ProbeAccessor::StackSlot(_)))
        .map(|p| {
            let value = view_sink.value(&p.identifier);
            let label = register_label(&p.identifier);
            let id = probe_element_id(&p.identifier);
            view! {
                <tr>
                    <th>{label}</th>
                    <td id=id class="probe-value">{move || value.get()}</td>
                </tr>
            }
        })
        .collect_view();

    let stack_rows = probes
        .iter()
        .filter(|p| matches!(p.accessor, ProbeAccessor::StackSlot(_)))
        .enumerate()
        .map(|(level, p)| {
            let value = view_sink.value(&p.identifier);
            let id = probe_element_id(&p.identifier);
            view! {
                <li
                    id=format!("stack-level-{level}")
                    class:stack-top=move || stack_top.get() == Some(level)
                >
                    <span id=id class="probe-value">{move || value.get()}</span>
                </li>
            }
        })
        .collect_view();

    let keypad_buttons = keypad_rows()
        .into_iter()
        .flatten()
        .map(|(slot, label)| {
            let down = Rc::clone(&press);
            let touch_down = Rc::clone(&press);
            let up = Rc::clone(&release);
            let leave = Rc::clone(&release);
            let touch_up = Rc::clone(&release);
            view! {
                <button
                    type="button"
                    class="keypad-button"
                    on:mousedown=move |_| down(slot)
                    on:mouseup=move |_| up(slot)
                    on:mouseleave=move |_| leave(slot)
                    on:touchstart=move |ev| {
                        ev.prevent_default();
                        touch_down(slot)
                    }
                    on:touchend=move |ev| {
                        ev.prevent_default();
                        touch_up(slot)
                    }
                    on:contextmenu=move |ev| ev.prevent_default()
                >
                    {label.to_string()}
                </button>
            }
        })
        .collect_view();

    view! {
        <main class="main-grid" class:keypad-enabled=move || keypad_visible.get()>
            <section id="controls-card">
                <select id="rom-select" on:change=on_select>
                    {move || {
                        programs
                            .get()
                            .into_iter()
                            .enumerate()
                            .map(|(i, p)| view! { <option value=i.to_string()>{p.title}</option> })
                            .collect_view()
                    }}
                </select>
                <p id="rom-description">
                    {move || {
                        let text = description();
                        description_lines(&text)
                            .into_iter()
                            .map(|line| view! { <span class="description-line">{line.to_string()}</span> })
                            .collect_view()
                    }}
                </p>
                <div class="controls">
                    <button id="start-button" on:click=on_start>
                        {move || start_button_label(is_running.get())}
                    </button>
                    <button
                        id="pause-button"
                        on:click=on_pause
                        prop:disabled=move || pause_button_disabled(is_running.get())
                    >
                        {move || pause_button_label(is_paused.get())}
                    </button>
                    <button id="settings-button" on:click=move |_| settings_open.set(true)>
                        "Settings"
                    </button>
                </div>
            </section>

            <dialog
                id=SETTINGS_MENU_ID
                node_ref=settings_ref
                on:click=move |ev| {
                    let target = event_target::<web_sys::Element>(&ev);
                    if is_backdrop_click(&target.id()) {
                        settings_open.set(false);
                    }
                }
                on:close=move |_| settings_open.set(false)
            >
                <div class="settings-content">
                    <label>
                        <input
                            type="checkbox"
                            id="keypad-toggle"
                            prop:checked=move || keypad_visible.get()
                            on:change=move |ev| keypad_visible.set(event_target_checked(&ev))
                        />
                        "Keypad"
                    </label>
                    <button
                        id="settings-menu-close-button"
                        on:click=move |_| settings_open.set(false)
                    >
                        "Close"
                    </button>
                </div>
            </dialog>

            <div id="keypad" class:hidden=move || !keypad_visible.get()>
                {keypad_buttons}
            </div>

            <section id="registers-card">
                <table>{special_rows}</table>
            </section>

            <section id="stack-card">
                <ol>{stack_rows}</ol>
            </section>

            <section id="instructions-container">
                {move || {
                    let current = current_instruction.get_untracked();
                    listing
                        .get()
                        .into_iter()
                        .enumerate()
                        .map(|(i, line)| {
                            let class = if current == Some(i) {
                                CURRENT_INSTRUCTION_CLASS
                            } else {
                                ""
                            };
                            view! { <div id=instruction_element_id(i) class=class>{line}</div> }
                        })
                        .collect_view()
                }}
            </section>
        </main>
    }
}
