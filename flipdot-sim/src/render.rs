//! Display backends for the simulator
//!
//! The terminal backend redraws the sign as text after every packet. With
//! the `window` feature the sign can also be shown in a native window.

use std::io::{self, Write};

use flipdot_display::{DisplayBackend, DisplayError, PixelBuffer};

/// Character for a dot showing its bright side
pub const DOT_ON: char = '█';

/// Character for a dot showing its dark side
pub const DOT_OFF: char = '·';

/// Prints the sign as text
pub struct TerminalBackend<W = io::Stdout> {
    out: W,
    width: u16,
    height: u16,
    frames: u64,
}

impl TerminalBackend<io::Stdout> {
    /// Print to standard output
    pub fn stdout(width: u16, height: u16) -> Self {
        Self::new(io::stdout(), width, height)
    }
}

impl<W: Write> TerminalBackend<W> {
    pub fn new(out: W, width: u16, height: u16) -> Self {
        Self {
            out,
            width,
            height,
            frames: 0,
        }
    }

    /// Number of frames shown so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplayBackend for TerminalBackend<W> {
    fn show(&mut self, pixels: &PixelBuffer) -> Result<(), DisplayError> {
        self.check_size(pixels)?;
        self.frames += 1;

        let border = "─".repeat(usize::from(self.width));
        let mut text = format!(
            "┌{}┐ frame {} ({} lit)\n",
            border,
            self.frames,
            pixels.lit_count()
        );
        for line in pixels.render_text(DOT_ON, DOT_OFF).lines() {
            text.push('│');
            text.push_str(line);
            text.push_str("│\n");
        }
        text.push_str(&format!("└{}┘\n", border));

        self.out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|_| DisplayError::Communication)
    }

    fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }
}

#[cfg(feature = "window")]
pub use window::WindowBackend;

#[cfg(feature = "window")]
mod window {
    use minifb::{Key, Window, WindowOptions};

    use flipdot_display::{DisplayBackend, DisplayError, PixelBuffer};

    /// Window pixels per dot
    const SCALE: usize = 8;
    /// Gap between dots, in window pixels
    const GAP: usize = 1;

    const COLOR_ON: u32 = 0x00F5_D000;
    const COLOR_OFF: u32 = 0x0020_2020;
    const COLOR_BACKGROUND: u32 = 0x0000_0000;

    /// Shows the sign in a native window
    pub struct WindowBackend {
        window: Window,
        width: u16,
        height: u16,
        framebuffer: Vec<u32>,
    }

    impl WindowBackend {
        /// Open a window sized for a `width` x `height` sign
        pub fn open(title: &str, width: u16, height: u16) -> Result<Self, minifb::Error> {
            let px_width = usize::from(width) * SCALE;
            let px_height = usize::from(height) * SCALE;
            let window = Window::new(title, px_width, px_height, WindowOptions::default())?;
            Ok(Self {
                window,
                width,
                height,
                framebuffer: vec![COLOR_BACKGROUND; px_width * px_height],
            })
        }
    }

    impl DisplayBackend for WindowBackend {
        fn show(&mut self, pixels: &PixelBuffer) -> Result<(), DisplayError> {
            self.check_size(pixels)?;
            if !self.is_ready() {
                return Err(DisplayError::Closed);
            }

            let px_width = usize::from(self.width) * SCALE;
            for (row, dots) in pixels.rows().enumerate() {
                for (col, &on) in dots.iter().enumerate() {
                    let color = if on { COLOR_ON } else { COLOR_OFF };
                    for y in 0..SCALE - GAP {
                        let start = (row * SCALE + y) * px_width + col * SCALE;
                        self.framebuffer[start..start + SCALE - GAP].fill(color);
                    }
                }
            }

            let px_height = usize::from(self.height) * SCALE;
            self.window
                .update_with_buffer(&self.framebuffer, px_width, px_height)
                .map_err(|_| DisplayError::Communication)
        }

        fn dimensions(&self) -> (u16, u16) {
            (self.width, self.height)
        }

        fn is_ready(&self) -> bool {
            self.window.is_open() && !self.window.is_key_down(Key::Escape)
        }

        fn poll(&mut self) {
            if self.window.is_open() {
                self.window.update();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_frame_layout() {
        let mut backend = TerminalBackend::new(Vec::new(), 3, 2);
        let mut pixels = PixelBuffer::new(3, 2);
        pixels.set(0, 0, true).unwrap();

        backend.show(&pixels).unwrap();
        assert_eq!(backend.frames(), 1);

        let text = String::from_utf8(backend.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "┌───┐ frame 1 (1 lit)");
        assert_eq!(lines[1], "│█··│");
        assert_eq!(lines[2], "│···│");
        assert_eq!(lines[3], "└───┘");
    }

    #[test]
    fn test_terminal_rejects_wrong_size() {
        let mut backend = TerminalBackend::new(Vec::new(), 3, 2);
        assert_eq!(
            backend.show(&PixelBuffer::new(2, 3)),
            Err(DisplayError::SizeMismatch)
        );
        assert_eq!(backend.frames(), 0);
    }
}
