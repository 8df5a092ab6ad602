//! Test patterns
//!
//! Patterns write straight into an existing buffer, so the caller keeps
//! control over the sign size.

use crate::pixels::PixelBuffer;

/// Named pattern, for tools that pick one at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pattern {
    /// Alternating dots; `phase` 1 is the inverse of phase 0
    Checkerboard { phase: u8 },
    /// Outermost rows and columns
    Border,
    /// Every dot on
    Full,
    /// Every dot off
    Blank,
}

impl Pattern {
    /// Draw this pattern over the whole buffer
    pub fn draw(self, buffer: &mut PixelBuffer) {
        match self {
            Pattern::Checkerboard { phase } => checkerboard(buffer, phase),
            Pattern::Border => border(buffer),
            Pattern::Full => buffer.fill(true),
            Pattern::Blank => buffer.clear(),
        }
    }
}

/// Checkerboard: a dot is on when `row + col + phase` is even
///
/// Phase 0 lights (0, 0).
pub fn checkerboard(buffer: &mut PixelBuffer, phase: u8) {
    for row in 0..usize::from(buffer.height()) {
        for col in 0..usize::from(buffer.width()) {
            let on = (row + col + usize::from(phase)) % 2 == 0;
            let _ = buffer.set(row, col, on);
        }
    }
}

/// Light the outermost rows and columns, clear the rest
pub fn border(buffer: &mut PixelBuffer) {
    let last_row = usize::from(buffer.height()).saturating_sub(1);
    let last_col = usize::from(buffer.width()).saturating_sub(1);

    for row in 0..usize::from(buffer.height()) {
        for col in 0..usize::from(buffer.width()) {
            let on = row == 0 || col == 0 || row == last_row || col == last_col;
            let _ = buffer.set(row, col, on);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkerboard_phase_zero() {
        let mut buf = PixelBuffer::new(96, 16);
        checkerboard(&mut buf, 0);

        assert_eq!(buf.get(0, 0), Some(true));
        assert_eq!(buf.get(0, 1), Some(false));
        assert_eq!(buf.get(1, 0), Some(false));
        assert_eq!(buf.get(1, 1), Some(true));
        assert_eq!(buf.lit_count(), 96 * 16 / 2);
    }

    #[test]
    fn test_checkerboard_phases_are_inverse() {
        let mut even = PixelBuffer::new(5, 3);
        let mut odd = PixelBuffer::new(5, 3);
        checkerboard(&mut even, 0);
        checkerboard(&mut odd, 1);
        odd.invert();
        assert_eq!(even, odd);
    }

    #[test]
    fn test_border() {
        let mut buf = PixelBuffer::new(4, 3);
        border(&mut buf);
        assert_eq!(buf.render_text('#', '.'), "####\n#..#\n####\n");
    }

    #[test]
    fn test_pattern_draw() {
        let mut buf = PixelBuffer::new(2, 2);
        Pattern::Full.draw(&mut buf);
        assert_eq!(buf.lit_count(), 4);
        Pattern::Checkerboard { phase: 1 }.draw(&mut buf);
        assert_eq!(buf.get(0, 0), Some(false));
        Pattern::Blank.draw(&mut buf);
        assert_eq!(buf.lit_count(), 0);
    }
}
