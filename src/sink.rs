//! Presentation Sink: where rendered telemetry and control state go.
//!
//! The core never touches display structures; it only emits these semantic
//! updates. Implementations decide how (or whether) to draw them.

pub trait PresentationSink {
    /// A probe's value changed; `formatted` is its `0x`-prefixed hex text.
    fn render_value(&mut self, identifier: &str, formatted: &str);

    /// Index into the stack-slot display that is "current", or `None` when
    /// the stack pointer is outside the displayed slots.
    fn set_stack_highlight(&mut self, index: Option<usize>);

    /// Current program counter and the listing entry it maps to, if any.
    fn set_current_instruction(&mut self, address: u32, entry: Option<usize>);

    fn set_start_button_state(&mut self, is_running: bool);

    fn set_pause_button_state(&mut self, is_paused: bool, is_running: bool);
}

impl<S: PresentationSink + ?Sized> PresentationSink for Box<S> {
    fn render_value(&mut self, identifier: &str, formatted: &str) {
        (**self).render_value(identifier, formatted)
    }

    fn set_stack_highlight(&mut self, index: Option<usize>) {
        (**self).set_stack_highlight(index)
    }

    fn set_current_instruction(&mut self, address: u32, entry: Option<usize>) {
        (**self).set_current_instruction(address, entry)
    }

    fn set_start_button_state(&mut self, is_running: bool) {
        (**self).set_start_button_state(is_running)
    }

    fn set_pause_button_state(&mut self, is_paused: bool, is_running: bool) {
        (**self).set_pause_button_state(is_paused, is_running)
    }
}
