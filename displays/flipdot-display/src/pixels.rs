//! Pixel buffer types
//!
//! A row-major boolean matrix with bounds-checked access and the
//! column-major byte packing used on the wire.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Write;

use crate::backend::DisplayError;

/// Rows packed into one wire byte
pub const ROWS_PER_BYTE: usize = 8;

/// On/off state of every dot on a sign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u16,
    height: u16,
    dots: Vec<bool>,
}

impl PixelBuffer {
    /// Create a buffer with every dot off
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            dots: vec![false; usize::from(width) * usize::from(height)],
        }
    }

    /// Number of columns
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Number of rows
    pub const fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row < usize::from(self.height) && col < usize::from(self.width) {
            Some(row * usize::from(self.width) + col)
        } else {
            None
        }
    }

    /// Get a dot, `None` when out of range
    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        self.index(row, col).map(|i| self.dots[i])
    }

    /// Set a dot
    ///
    /// Returns whether the dot changed.
    pub fn set(&mut self, row: usize, col: usize, on: bool) -> Result<bool, DisplayError> {
        let i = self.index(row, col).ok_or(DisplayError::InvalidCoordinates)?;
        let changed = self.dots[i] != on;
        self.dots[i] = on;
        Ok(changed)
    }

    /// Set every dot to the same state
    pub fn fill(&mut self, on: bool) {
        self.dots.fill(on);
    }

    /// Turn every dot off
    pub fn clear(&mut self) {
        self.fill(false);
    }

    /// Flip every dot
    pub fn invert(&mut self) {
        for dot in &mut self.dots {
            *dot = !*dot;
        }
    }

    /// Number of dots that are on
    pub fn lit_count(&self) -> usize {
        self.dots.iter().filter(|&&on| on).count()
    }

    /// One row of dots
    pub fn row(&self, row: usize) -> Option<&[bool]> {
        if row < usize::from(self.height) {
            let start = row * usize::from(self.width);
            Some(&self.dots[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// Iterate over rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        // chunks_exact panics on a zero chunk size
        let width = usize::from(self.width).max(1);
        self.dots.chunks_exact(width).take(usize::from(self.height))
    }

    /// Bytes needed to pack one column
    pub fn bytes_per_column(&self) -> usize {
        usize::from(self.height).div_ceil(ROWS_PER_BYTE)
    }

    /// Unpack column-major image bytes into the buffer
    ///
    /// Each column takes `bytes_per_column()` bytes; bit `7 - b` of byte
    /// `g` is row `g * 8 + b`. Stops quietly when the bytes run out.
    /// Returns the number of dots that changed.
    pub fn apply_column_bytes(&mut self, bytes: &[u8]) -> usize {
        let per_column = self.bytes_per_column();
        let mut updated = 0;
        let mut next = bytes.iter();

        for col in 0..usize::from(self.width) {
            for group in 0..per_column {
                let Some(&byte) = next.next() else {
                    return updated;
                };
                for bit in 0..ROWS_PER_BYTE {
                    let row = group * ROWS_PER_BYTE + bit;
                    if let Some(i) = self.index(row, col) {
                        let on = byte & (0x80 >> bit) != 0;
                        if self.dots[i] != on {
                            self.dots[i] = on;
                            updated += 1;
                        }
                    }
                }
            }
        }

        updated
    }

    /// Pack the buffer into column-major image bytes
    pub fn to_column_bytes(&self) -> Vec<u8> {
        let per_column = self.bytes_per_column();
        let mut bytes = Vec::with_capacity(usize::from(self.width) * per_column);

        for col in 0..usize::from(self.width) {
            for group in 0..per_column {
                let mut byte = 0u8;
                for bit in 0..ROWS_PER_BYTE {
                    if self.get(group * ROWS_PER_BYTE + bit, col) == Some(true) {
                        byte |= 0x80 >> bit;
                    }
                }
                bytes.push(byte);
            }
        }

        bytes
    }

    /// Rows as a JSON matrix of 0 and 1
    pub fn to_json_matrix(&self) -> String {
        let mut out = String::with_capacity(self.dots.len() * 2 + 2 * usize::from(self.height) + 2);
        out.push('[');
        for (r, row) in self.rows().enumerate() {
            if r > 0 {
                out.push(',');
            }
            out.push('[');
            for (c, &on) in row.iter().enumerate() {
                if c > 0 {
                    out.push(',');
                }
                out.push(if on { '1' } else { '0' });
            }
            out.push(']');
        }
        out.push(']');
        out
    }

    /// Render one text line per row
    pub fn render_text(&self, on: char, off: char) -> String {
        let mut out = String::new();
        for row in self.rows() {
            for &dot in row {
                out.push(if dot { on } else { off });
            }
            out.push('\n');
        }
        out
    }

    /// Short summary of the first rows, for logs
    pub fn preview(&self, max_rows: usize, max_cols: usize) -> String {
        let mut out = String::new();
        for (r, row) in self.rows().take(max_rows).enumerate() {
            let _ = write!(out, "row {:2}: ", r);
            for &dot in row.iter().take(max_cols) {
                out.push(if dot { '#' } else { '.' });
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_buffer_is_dark() {
        let buf = PixelBuffer::new(96, 16);
        assert_eq!(buf.width(), 96);
        assert_eq!(buf.height(), 16);
        assert_eq!(buf.lit_count(), 0);
        assert_eq!(buf.bytes_per_column(), 2);
    }

    #[test]
    fn test_set_and_get() {
        let mut buf = PixelBuffer::new(4, 3);
        assert_eq!(buf.set(2, 3, true), Ok(true));
        assert_eq!(buf.set(2, 3, true), Ok(false));
        assert_eq!(buf.get(2, 3), Some(true));
        assert_eq!(buf.get(0, 0), Some(false));
    }

    #[test]
    fn test_out_of_range_access() {
        let mut buf = PixelBuffer::new(4, 3);
        assert_eq!(buf.get(3, 0), None);
        assert_eq!(buf.get(0, 4), None);
        assert_eq!(buf.set(3, 0, true), Err(DisplayError::InvalidCoordinates));
        assert!(buf.row(3).is_none());
    }

    #[test]
    fn test_single_byte_sets_first_column_top_rows() {
        // 8 columns x 16 rows, one "FF" byte
        let mut buf = PixelBuffer::new(8, 16);
        assert_eq!(buf.apply_column_bytes(&[0xFF]), 8);

        for row in 0..8 {
            assert_eq!(buf.row(row).unwrap(), &[true, false, false, false, false, false, false, false]);
        }
        for row in 8..16 {
            assert!(buf.row(row).unwrap().iter().all(|&on| !on));
        }
    }

    #[test]
    fn test_bit_order_is_msb_top() {
        let mut buf = PixelBuffer::new(1, 8);
        buf.apply_column_bytes(&[0x80]);
        assert_eq!(buf.get(0, 0), Some(true));
        assert_eq!(buf.lit_count(), 1);
    }

    #[test]
    fn test_apply_counts_only_changes() {
        let mut buf = PixelBuffer::new(96, 16);
        assert_eq!(buf.apply_column_bytes(&[0xAA, 0xAA]), 8);
        assert_eq!(buf.apply_column_bytes(&[0xAA, 0xAA]), 0);
        assert_eq!(buf.apply_column_bytes(&[0xFF, 0xAA]), 4);
    }

    #[test]
    fn test_partial_height_ignores_extra_bits() {
        let mut buf = PixelBuffer::new(2, 7);
        buf.apply_column_bytes(&[0xFF, 0xFF]);
        assert_eq!(buf.lit_count(), 14);
        assert_eq!(buf.to_column_bytes(), vec![0xFE, 0xFE]);
    }

    #[test]
    fn test_fill_invert_clear() {
        let mut buf = PixelBuffer::new(3, 2);
        buf.fill(true);
        assert_eq!(buf.lit_count(), 6);
        buf.set(0, 0, false).unwrap();
        buf.invert();
        assert_eq!(buf.lit_count(), 1);
        buf.clear();
        assert_eq!(buf.lit_count(), 0);
    }

    #[test]
    fn test_json_and_text() {
        let mut buf = PixelBuffer::new(3, 2);
        buf.set(0, 1, true).unwrap();
        buf.set(1, 2, true).unwrap();
        assert_eq!(buf.to_json_matrix(), "[[0,1,0],[0,0,1]]");
        assert_eq!(buf.render_text('#', '.'), ".#.\n..#\n");
        assert_eq!(buf.preview(1, 2), "row  0: .#\n");
    }

    #[test]
    fn test_empty_buffer() {
        let buf = PixelBuffer::new(0, 0);
        assert_eq!(buf.rows().count(), 0);
        assert_eq!(buf.to_json_matrix(), "[]");
        assert!(buf.to_column_bytes().is_empty());
    }

    proptest! {
        #[test]
        fn column_bytes_round_trip(width in 1u16..40, height in 1u16..24, seed in any::<u64>()) {
            let mut buf = PixelBuffer::new(width, height);
            let mut state = seed;
            for row in 0..usize::from(height) {
                for col in 0..usize::from(width) {
                    state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                    buf.set(row, col, state >> 63 == 1).unwrap();
                }
            }

            let mut copy = PixelBuffer::new(width, height);
            copy.apply_column_bytes(&buf.to_column_bytes());
            prop_assert_eq!(copy, buf);
        }
    }
}
