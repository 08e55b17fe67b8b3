use std::collections::HashMap;

use chip8_console::sink::PresentationSink;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::ui_model::{instruction_element_id, LISTING_SCROLL_MARGIN};

/// Sink backed by Leptos signals; the view re-renders only what was set.
#[derive(Clone)]
pub(super) struct SignalSink {
    pub(super) values: HashMap<String, RwSignal<String>>,
    pub(super) stack_top: RwSignal<Option<usize>>,
    pub(super) current_instruction: RwSignal<Option<usize>>,
    pub(super) is_running: RwSignal<bool>,
    pub(super) is_paused: RwSignal<bool>,
}

impl SignalSink {
    pub(super) fn new<'a>(identifiers: impl IntoIterator<Item = &'a str>) -> Self {
        let values = identifiers
            .into_iter()
            .map(|id| (id.to_string(), RwSignal::new(String::new())))
            .collect();
        Self {
            values,
            stack_top: RwSignal::new(None),
            current_instruction: RwSignal::new(None),
            is_running: RwSignal::new(false),
            is_paused: RwSignal::new(false),
        }
    }

    pub(super) fn value(&self, identifier: &str) -> RwSignal<String> {
        self.values
            .get(identifier)
            .copied()
            .unwrap_or_else(|| RwSignal::new(String::new()))
    }
}

pub(super) const CURRENT_INSTRUCTION_CLASS: &str = "current-instruction";

fn listing_row(doc: &web_sys::Document, entry: usize) -> Option<web_sys::HtmlElement> {
    doc.get_element_by_id(&instruction_element_id(entry))
        .and_then(|e| e.dyn_into::<web_sys::HtmlElement>().ok())
}

/// Moves the current-instruction marker between listing rows and scrolls the
/// new row into view. Done on the DOM directly so a frame touches two rows
/// instead of notifying every row of the listing.
fn move_instruction_marker(previous: Option<usize>, next: Option<usize>) {
    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(row) = previous.and_then(|e| listing_row(&doc, e)) {
        let _ = row.class_list().remove_1(CURRENT_INSTRUCTION_CLASS);
    }
    let Some(row) = next.and_then(|e| listing_row(&doc, e)) else {
        return;
    };
    let _ = row.class_list().add_1(CURRENT_INSTRUCTION_CLASS);

    let Some(container) = doc
        .get_element_by_id("instructions-container")
        .and_then(|e| e.dyn_into::<web_sys::HtmlElement>().ok())
    else {
        return;
    };
    container.set_scroll_top(row.offset_top() - container.offset_top() - LISTING_SCROLL_MARGIN);
}

impl PresentationSink for SignalSink {
    fn render_value(&mut self, identifier: &str, formatted: &str) {
        if let Some(sig) = self.values.get(identifier) {
            sig.set(formatted.to_string());
        }
    }

    fn set_stack_highlight(&mut self, index: Option<usize>) {
        if self.stack_top.get_untracked() != index {
            self.stack_top.set(index);
        }
    }

    fn set_current_instruction(&mut self, _address: u32, entry: Option<usize>) {
        let previous = self.current_instruction.get_untracked();
        if previous == entry {
            return;
        }
        self.current_instruction.set(entry);
        move_instruction_marker(previous, entry);
    }

    fn set_start_button_state(&mut self, is_running: bool) {
        self.is_running.set(is_running);
    }

    fn set_pause_button_state(&mut self, is_paused: bool, _is_running: bool) {
        self.is_paused.set(is_paused);
    }
}
