//! Display backend trait
//!
//! Defines the interface for anything that can present a sign image.

use crate::pixels::PixelBuffer;

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with the output device
    Communication,
    /// Invalid coordinates or dimensions
    InvalidCoordinates,
    /// Buffer size differs from the backend's size
    SizeMismatch,
    /// The output was closed by the user
    Closed,
}

/// Display backend trait
///
/// Provides a device-agnostic interface for presenting a `PixelBuffer`.
/// Implementations handle the specifics of terminals, windows or real
/// hardware.
pub trait DisplayBackend {
    /// Present the buffer
    fn show(&mut self, pixels: &PixelBuffer) -> Result<(), DisplayError>;

    /// Get the display dimensions
    ///
    /// Returns (columns, rows) in dots
    fn dimensions(&self) -> (u16, u16);

    /// Check if the display can still accept frames
    fn is_ready(&self) -> bool {
        true
    }

    /// Service the output while no frame is pending
    ///
    /// Interactive outputs process input events here.
    fn poll(&mut self) {}

    /// Reject buffers that do not match this backend
    fn check_size(&self, pixels: &PixelBuffer) -> Result<(), DisplayError> {
        if (pixels.width(), pixels.height()) == self.dimensions() {
            Ok(())
        } else {
            Err(DisplayError::SizeMismatch)
        }
    }
}

impl<T: DisplayBackend + ?Sized> DisplayBackend for alloc::boxed::Box<T> {
    fn show(&mut self, pixels: &PixelBuffer) -> Result<(), DisplayError> {
        (**self).show(pixels)
    }

    fn dimensions(&self) -> (u16, u16) {
        (**self).dimensions()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn poll(&mut self) {
        (**self).poll()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;

    struct Counting {
        shown: usize,
        polls: usize,
    }

    impl DisplayBackend for Counting {
        fn show(&mut self, pixels: &PixelBuffer) -> Result<(), DisplayError> {
            self.check_size(pixels)?;
            self.shown += 1;
            Ok(())
        }

        fn dimensions(&self) -> (u16, u16) {
            (4, 2)
        }

        fn poll(&mut self) {
            self.polls += 1;
        }
    }

    #[test]
    fn test_check_size() {
        let mut backend = Counting { shown: 0, polls: 0 };
        assert_eq!(backend.show(&PixelBuffer::new(4, 2)), Ok(()));
        assert_eq!(
            backend.show(&PixelBuffer::new(2, 4)),
            Err(DisplayError::SizeMismatch)
        );
        assert_eq!(backend.shown, 1);
    }

    #[test]
    fn test_boxed_backend_forwards() {
        let mut boxed: Box<dyn DisplayBackend> = Box::new(Counting { shown: 0, polls: 0 });
        assert!(boxed.is_ready());
        assert_eq!(boxed.dimensions(), (4, 2));
        assert_eq!(boxed.show(&PixelBuffer::new(4, 2)), Ok(()));
    }

    #[test]
    fn test_boxed_backend_forwards_poll() {
        let mut boxed = Box::new(Counting { shown: 0, polls: 0 });
        DisplayBackend::poll(&mut boxed);
        assert_eq!(boxed.polls, 1);
    }
}
