//! Devices for running without a window.
use chip8::{constants::*, Chip8DisplayBuffer, Devices, Keypad};
use log::{debug, info};

use crate::config::KeyEvent;

/// Replays scripted key events, and records output instead of presenting it.
pub struct HeadlessDevices {
    frame: u64,
    script: Vec<KeyEvent>,
    cursor: usize,
    /// Copy of the last presented frame.
    screen: Box<[bool; DISPLAY_BUFFER_SIZE]>,
    buzzer: bool,
    draws: u64,
}

impl HeadlessDevices {
    /// Script must be sorted by frame.
    pub fn new(script: Vec<KeyEvent>) -> Self {
        Self {
            frame: 0,
            script,
            cursor: 0,
            screen: Box::new([false; DISPLAY_BUFFER_SIZE]),
            buzzer: false,
            draws: 0,
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn screen(&self) -> &[bool; DISPLAY_BUFFER_SIZE] {
        &self.screen
    }

    pub fn buzzer(&self) -> bool {
        self.buzzer
    }

    pub fn draw_count(&self) -> u64 {
        self.draws
    }
}

impl Devices for HeadlessDevices {
    fn poll_keys(&mut self, keypad: &mut Keypad) {
        while let Some(event) = self.script.get(self.cursor) {
            if event.frame > self.frame {
                break;
            }
            let direction = if event.pressed { "down" } else { "up" };
            debug!("frame {}: {} {direction}", self.frame, event.key);
            keypad.set_key(event.key.as_u8(), event.pressed);
            self.cursor += 1;
        }
        self.frame += 1;
    }

    fn draw(&mut self, display: Chip8DisplayBuffer<'_>) {
        self.screen.copy_from_slice(display);
        self.draws += 1;
    }

    fn buzz(&mut self, state: bool) {
        info!("buzzer {}", if state { "on" } else { "off" });
        self.buzzer = state;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chip8::KeyCode;

    fn key(frame: u64, key: KeyCode, pressed: bool) -> KeyEvent {
        KeyEvent { frame, key, pressed }
    }

    #[test]
    fn test_replay_keys() {
        let mut devices = HeadlessDevices::new(vec![
            key(0, KeyCode::Key1, true),
            key(2, KeyCode::Key1, false),
            key(2, KeyCode::Key2, true),
        ]);
        let mut keypad = Keypad::new();

        devices.poll_keys(&mut keypad);
        assert!(keypad.is_pressed(1));

        devices.poll_keys(&mut keypad);
        assert!(keypad.is_pressed(1));

        devices.poll_keys(&mut keypad);
        assert!(!keypad.is_pressed(1));
        assert!(keypad.is_pressed(2));
        assert_eq!(devices.frame(), 3);
    }

    #[test]
    fn test_buzz_and_draw() {
        let mut devices = HeadlessDevices::new(Vec::new());
        let mut buffer = [false; DISPLAY_BUFFER_SIZE];
        buffer[3] = true;

        devices.buzz(true);
        devices.draw(&buffer);

        assert!(devices.buzzer());
        assert!(devices.screen()[3]);
        assert_eq!(devices.draw_count(), 1);
    }
}
