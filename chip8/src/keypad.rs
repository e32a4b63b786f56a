//! Keyboard input state.
use crate::constants::KEY_COUNT;

/// State of the 16 hexadecimal keys.
///
/// Written by the host's input device, read by the interpreter.
/// Pressed is a 1 bit, released is a 0 bit.
#[derive(Debug, Default, Clone)]
pub struct Keypad {
    state: u16,
    /// Keys that went from released to pressed since the edges were last cleared.
    pressed_edges: u16,
}

impl Keypad {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set_key(&mut self, key_id: u8, pressed: bool) {
        if key_id < KEY_COUNT {
            let bit = 1 << key_id;
            if pressed {
                if self.state & bit == 0 {
                    self.pressed_edges |= bit;
                }
                self.state |= bit;
            } else {
                self.state &= !bit;
            }
        }
    }

    pub fn is_pressed(&self, key_id: u8) -> bool {
        if key_id < KEY_COUNT {
            self.state & (1 << key_id) > 0
        } else {
            false
        }
    }

    /// Check whether any key is pressed down.
    #[inline(always)]
    pub fn any_key(&self) -> bool {
        self.state > 0
    }

    /// Forget press transitions observed so far.
    ///
    /// Keys held down at this point must be released and pressed again
    /// before [`Keypad::take_pressed`] reports them.
    pub fn clear_edges(&mut self) {
        self.pressed_edges = 0;
    }

    /// Consume the lowest key that transitioned to pressed.
    pub fn take_pressed(&mut self) -> Option<u8> {
        if self.pressed_edges == 0 {
            return None;
        }
        let key_id = self.pressed_edges.trailing_zeros() as u8;
        self.pressed_edges &= !(1 << key_id);
        Some(key_id)
    }

    /// Clear the keyboard input state, setting all keys to up.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.state = 0;
        self.pressed_edges = 0;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut keypad = Keypad::default();

        keypad.set_key(0, true);
        assert_eq!(keypad.state, 0b00000000_00000001);
        assert!(keypad.is_pressed(0));
        assert!(!keypad.is_pressed(1));
        assert!(!keypad.is_pressed(7));

        keypad.set_key(7, true);
        assert_eq!(keypad.state, 0b00000000_10000001);
        assert!(keypad.is_pressed(7));

        keypad.set_key(0, false);
        assert_eq!(keypad.state, 0b00000000_10000000);
        assert!(!keypad.is_pressed(0));
        assert!(keypad.is_pressed(7));

        keypad.set_key(15, true);
        assert_eq!(keypad.state, 0b10000000_10000000);
        assert!(keypad.is_pressed(15));

        // Out of range keys are ignored
        keypad.set_key(16, true);
        assert!(!keypad.is_pressed(16));
        assert_eq!(keypad.state, 0b10000000_10000000);
    }

    #[test]
    fn test_pressed_edges() {
        let mut keypad = Keypad::default();

        keypad.set_key(3, true);
        keypad.clear_edges();
        // Held key is not a transition
        keypad.set_key(3, true);
        assert_eq!(keypad.take_pressed(), None);

        keypad.set_key(3, false);
        keypad.set_key(3, true);
        keypad.set_key(9, true);
        assert_eq!(keypad.take_pressed(), Some(3));
        assert_eq!(keypad.take_pressed(), Some(9));
        assert_eq!(keypad.take_pressed(), None);
    }
}
