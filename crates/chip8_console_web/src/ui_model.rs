//! UI models that should be available on both wasm and native.
//!
//! Keeping these out of the wasm-only `web` module allows us to unit-test the
//! labels, element ids and layout on the host.

use chip8_console::keypad::{key_label, KEYPAD_LAYOUT};

/// Pixels kept above the current instruction when the listing scrolls.
pub const LISTING_SCROLL_MARGIN: i32 = 60;

/// Element id of the settings `<dialog>`.
pub const SETTINGS_MENU_ID: &str = "settings-menu";

/// A click whose target is the dialog element itself landed on the backdrop,
/// outside the dialog's content.
pub fn is_backdrop_click(target_id: &str) -> bool {
    target_id == SETTINGS_MENU_ID
}

pub fn start_button_label(is_running: bool) -> &'static str {
    if is_running {
        "Stop"
    } else {
        "Start"
    }
}

pub fn pause_button_label(is_paused: bool) -> &'static str {
    if is_paused {
        "Resume"
    } else {
        "Pause"
    }
}

/// The pause control only means something while a session exists.
pub fn pause_button_disabled(is_running: bool) -> bool {
    !is_running
}

pub fn probe_element_id(identifier: &str) -> String {
    format!("{identifier}-output")
}

pub fn instruction_element_id(entry: usize) -> String {
    format!("instruction-{entry}")
}

/// Description text split for display with line breaks.
pub fn description_lines(description: &str) -> Vec<&str> {
    description.split('\n').collect()
}

/// Keypad buttons as `(slot, label)` rows of four.
pub fn keypad_rows() -> Vec<Vec<(usize, char)>> {
    (0..KEYPAD_LAYOUT.len())
        .filter_map(|slot| key_label(slot).map(|label| (slot, label)))
        .collect::<Vec<_>>()
        .chunks(4)
        .map(<[_]>::to_vec)
        .collect()
}

/// Row label for the register table (`V0`..`VF`).
pub fn register_label(identifier: &str) -> String {
    identifier.to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_state() {
        assert_eq!(start_button_label(false), "Start");
        assert_eq!(start_button_label(true), "Stop");
        assert_eq!(pause_button_label(false), "Pause");
        assert_eq!(pause_button_label(true), "Resume");
        assert!(pause_button_disabled(false));
        assert!(!pause_button_disabled(true));
    }

    #[test]
    fn element_ids_are_stable() {
        assert_eq!(probe_element_id("pc"), "pc-output");
        assert_eq!(probe_element_id("vA"), "vA-output");
        assert_eq!(instruction_element_id(12), "instruction-12");
        assert_eq!(register_label("vA"), "VA");
    }

    #[test]
    fn only_backdrop_clicks_close_settings() {
        assert!(is_backdrop_click(SETTINGS_MENU_ID));
        assert!(!is_backdrop_click("keypad-toggle"));
        assert!(!is_backdrop_click("settings-menu-close-button"));
        assert!(!is_backdrop_click(""));
    }

    #[test]
    fn description_keeps_empty_lines() {
        assert_eq!(description_lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(description_lines(""), vec![""]);
    }

    #[test]
    fn keypad_is_four_by_four() {
        let rows = keypad_rows();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.len() == 4));
        assert_eq!(rows[0][3], (3, 'C'));
        assert_eq!(rows[3][1], (13, '0'));
    }
}
