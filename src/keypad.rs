//! On-screen hex keypad.
//!
//! The engine reads input as host keyboard characters, so each hex key is
//! translated to the character the engine's keyboard mapping expects before it
//! is pushed across the boundary.

use crate::boundary::{BoundaryAdapter, EngineCalls};

/// Hex keys in on-screen order, four per row.
pub const KEYPAD_LAYOUT: [u8; 16] = [
    0x1, 0x2, 0x3, 0xC, //
    0x4, 0x5, 0x6, 0xD, //
    0x7, 0x8, 0x9, 0xE, //
    0xA, 0x0, 0xB, 0xF,
];

/// Host keyboard character for a hex key.
pub fn keyboard_char(key: u8) -> Option<char> {
    let c = match key {
        0x0 => 'x',
        0x1 => '1',
        0x2 => '2',
        0x3 => '3',
        0x4 => 'q',
        0x5 => 'w',
        0x6 => 'e',
        0x7 => 'a',
        0x8 => 's',
        0x9 => 'd',
        0xA => 'z',
        0xB => 'c',
        0xC => '4',
        0xD => 'r',
        0xE => 'f',
        0xF => 'v',
        _ => return None,
    };
    Some(c)
}

/// Label shown on the button at `slot`.
pub fn key_label(slot: usize) -> Option<char> {
    KEYPAD_LAYOUT
        .get(slot)
        .and_then(|k| char::from_digit(u32::from(*k), 16))
        .map(|c| c.to_ascii_uppercase())
}

/// Tracks which on-screen buttons are held so a release is only forwarded
/// for a button that was actually pressed.
#[derive(Debug, Default, Clone)]
pub struct Keypad {
    pressed: [bool; 16],
}

impl Keypad {
    pub fn is_pressed(&self, slot: usize) -> bool {
        self.pressed.get(slot).copied().unwrap_or(false)
    }

    pub fn press<E: EngineCalls>(&mut self, slot: usize, adapter: &mut BoundaryAdapter<E>) -> bool {
        let Some(code) = slot_code(slot) else {
            return false;
        };
        adapter.push_key_event(code, true);
        self.pressed[slot] = true;
        true
    }

    pub fn release<E: EngineCalls>(
        &mut self,
        slot: usize,
        adapter: &mut BoundaryAdapter<E>,
    ) -> bool {
        if !self.is_pressed(slot) {
            return false;
        }
        let Some(code) = slot_code(slot) else {
            return false;
        };
        adapter.push_key_event(code, false);
        self.pressed[slot] = false;
        true
    }
}

fn slot_code(slot: usize) -> Option<u32> {
    KEYPAD_LAYOUT
        .get(slot)
        .and_then(|k| keyboard_char(*k))
        .map(u32::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeEngine};

    #[test]
    fn labels_follow_layout() {
        let labels: String = (0..16).filter_map(key_label).collect();
        assert_eq!(labels, "123C456D789EA0BF");
        assert_eq!(key_label(16), None);
    }

    #[test]
    fn release_requires_prior_press() {
        let mut adapter = BoundaryAdapter::new(FakeEngine::default(), "roms/", 0x200);
        let mut pad = Keypad::default();

        // Slot 4 is hex key 4, mapped to 'q'.
        assert!(!pad.release(4, &mut adapter));
        assert!(pad.press(4, &mut adapter));
        assert!(pad.is_pressed(4));
        assert!(pad.release(4, &mut adapter));
        assert!(!pad.release(4, &mut adapter));

        let q = u32::from('q');
        assert_eq!(
            adapter.engine().calls,
            vec![Call::Key(q, true), Call::Key(q, false)]
        );
    }

    #[test]
    fn out_of_range_slot_is_ignored() {
        let mut adapter = BoundaryAdapter::new(FakeEngine::default(), "roms/", 0x200);
        let mut pad = Keypad::default();
        assert!(!pad.press(16, &mut adapter));
        assert!(adapter.engine().calls.is_empty());
    }
}
