//! Delay and sound timers.

/// Two 8-bit counters that count down to zero at 60Hz.
#[derive(Debug, Default, Clone)]
pub struct Timers {
    /// (DT) Delay timer that counts down to 0.
    delay: u8,
    /// (ST) Sound timer that counts down to 0. When it has a non-zero value, a beep is played.
    sound: u8,
    /// Switch tracking whether the buzzer should be on or off.
    buzzer_state: bool,
}

impl Timers {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn delay(&self) -> u8 {
        self.delay
    }

    pub fn sound(&self) -> u8 {
        self.sound
    }

    pub fn buzzer(&self) -> bool {
        self.buzzer_state
    }

    /// Count down both timers, stopping at zero.
    ///
    /// Returns the new buzzer state when the sound timer crossed zero.
    #[inline]
    pub fn tick(&mut self) -> Option<bool> {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
        self.sync_buzzer()
    }

    /// Set the sound timer, returning the new buzzer state when it changed.
    pub fn set_sound(&mut self, value: u8) -> Option<bool> {
        self.sound = value;
        self.sync_buzzer()
    }

    pub fn set_delay(&mut self, value: u8) {
        self.delay = value;
    }

    /// Buzzer should be on while sound timer counts down,
    /// then turned off when the timer reaches zero.
    fn sync_buzzer(&mut self) -> Option<bool> {
        let on = self.sound > 0;
        if on != self.buzzer_state {
            self.buzzer_state = on;
            Some(on)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_delay_floor() {
        let mut timers = Timers::new();
        timers.set_delay(10);
        for _ in 0..10 {
            timers.tick();
        }
        assert_eq!(timers.delay(), 0);
        timers.tick();
        assert_eq!(timers.delay(), 0);
    }

    #[test]
    fn test_buzzer_transitions() {
        let mut timers = Timers::new();
        assert_eq!(timers.set_sound(2), Some(true));
        assert_eq!(timers.set_sound(3), None);
        assert_eq!(timers.tick(), None);
        assert_eq!(timers.tick(), None);
        assert_eq!(timers.tick(), Some(false));
        assert_eq!(timers.tick(), None);
        assert!(!timers.buzzer());
    }

    #[test]
    fn test_independent() {
        let mut timers = Timers::new();
        timers.set_delay(1);
        timers.set_sound(3);
        timers.tick();
        assert_eq!(timers.delay(), 0);
        assert_eq!(timers.sound(), 2);
    }
}
