//! Monochrome display buffer.
use std::fmt::{self, Write};

use crate::constants::*;

/// Read-only view of the display, handed to renderers.
pub type Chip8DisplayBuffer<'a> = &'a [bool; DISPLAY_BUFFER_SIZE];

/// 64x32 pixel grid, origin top-left, stored row by row.
pub struct Display {
    pixels: Box<[bool; DISPLAY_BUFFER_SIZE]>,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            pixels: Box::new([false; DISPLAY_BUFFER_SIZE]),
        }
    }
}

impl Display {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    /// XOR the sprite onto the buffer at the given coordinate.
    ///
    /// Sprite is encoded as 8 pixels wide, one byte per row, most significant
    /// bit leftmost. Pixels drawn outside the display area wrap around to the
    /// other side.
    ///
    /// Returns `true` when any pixel that was on has been turned off.
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let mut is_erased = false;

        for (r, row) in sprite.iter().enumerate() {
            // Each row is 8 bits representing the 8 pixels of the sprite.
            for c in 0..8 {
                let new_px = (row >> (7 - c) & 1) != 0;
                if !new_px {
                    continue;
                }

                let d = ((x + c) & DISPLAY_WIDTH_MASK)
                    + ((y + r) & DISPLAY_HEIGHT_MASK) * DISPLAY_WIDTH;

                let old_px = self.pixels[d];

                // XOR erases a pixel when both the old and new values are both 1.
                is_erased |= old_px;

                self.pixels[d] = !old_px;
            }
        }

        is_erased
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[(x & DISPLAY_WIDTH_MASK) + (y & DISPLAY_HEIGHT_MASK) * DISPLAY_WIDTH]
    }

    pub fn snapshot(&self) -> Chip8DisplayBuffer<'_> {
        &self.pixels
    }

    /// Render the buffer as text, `#` for lit pixels and `.` for dark.
    pub fn dump(&self) -> Result<String, fmt::Error> {
        let mut buf = String::with_capacity(DISPLAY_BUFFER_SIZE + DISPLAY_HEIGHT);

        for row in self.pixels.chunks(DISPLAY_WIDTH) {
            for px in row {
                buf.write_char(if *px { '#' } else { '.' })?;
            }
            writeln!(buf)?;
        }

        Ok(buf)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_draw_collision() {
        let mut display = Display::new();

        // Draw two pixels next to each other.
        // The zero bits of the second draw must not erase
        // the pixels of the first draw
        //
        // ____####, erased == false
        // ########, erased == false
        assert!(!display.draw_sprite(4, 0, &[0b11110000]));
        assert!(!display.draw_sprite(0, 0, &[0b11110000]));
        assert!((0..8).all(|x| display.pixel(x, 0)));

        // Overlapping draw erases
        assert!(display.draw_sprite(0, 0, &[0b10000000]));
        assert!(!display.pixel(0, 0));
    }

    #[test]
    fn test_draw_wraps() {
        let mut display = Display::new();
        display.draw_sprite(62, 31, &[0b11110000, 0b10000000]);

        assert!(display.pixel(62, 31));
        assert!(display.pixel(63, 31));
        assert!(display.pixel(0, 31));
        assert!(display.pixel(1, 31));
        // Second row wrapped to the top
        assert!(display.pixel(62, 0));
        assert!(!display.pixel(63, 0));
    }

    #[test]
    fn test_clear() {
        let mut display = Display::new();
        display.draw_sprite(10, 10, &[0xFF; 5]);
        display.clear();
        assert!(display.snapshot().iter().all(|px| !px));
    }

    #[test]
    fn test_dump() {
        let mut display = Display::new();
        display.draw_sprite(0, 0, &[0b10100000]);
        let text = display.dump().unwrap();
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("#.#."));
        assert_eq!(first.len(), DISPLAY_WIDTH);
        assert_eq!(text.lines().count(), DISPLAY_HEIGHT);
    }
}
