//! Sign descriptor

use flipdot_display::PixelBuffer;
use flipdot_protocol::Frame;

use crate::controller::ControllerError;

/// One Hanover sign on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HanoverSign {
    /// Bus address (0-15, set on the sign's rotary switch)
    pub address: u8,
    /// Width in dots
    pub width: u16,
    /// Height in dots
    pub height: u16,
}

impl HanoverSign {
    pub const fn new(address: u8, width: u16, height: u16) -> Self {
        Self {
            address,
            width,
            height,
        }
    }

    /// Blank image of this sign's size
    pub fn create_image(&self) -> PixelBuffer {
        PixelBuffer::new(self.width, self.height)
    }

    /// Build the image frame for `image`
    pub fn image_frame(&self, image: &PixelBuffer) -> Result<Frame, ControllerError> {
        if image.width() != self.width || image.height() != self.height {
            return Err(ControllerError::ImageSizeMismatch {
                width: self.width,
                height: self.height,
                got_width: image.width(),
                got_height: image.height(),
            });
        }
        Ok(Frame::image(self.address, &image.to_column_bytes())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipdot_protocol::{decode_packet, Command};

    #[test]
    fn test_create_image_matches_sign() {
        let sign = HanoverSign::new(1, 96, 16);
        let image = sign.create_image();
        assert_eq!((image.width(), image.height()), (96, 16));
        assert_eq!(image.lit_count(), 0);
    }

    #[test]
    fn test_image_frame_decodes_back() {
        let sign = HanoverSign::new(4, 28, 7);
        let mut image = sign.create_image();
        image.set(3, 10, true).unwrap();

        let frame = sign.image_frame(&image).unwrap();
        assert_eq!(frame.command, Command::Image);
        assert_eq!(frame.payload.len(), 28);

        let packet = decode_packet(&frame.encode(), 4).unwrap();
        let mut decoded = sign.create_image();
        decoded.apply_column_bytes(&packet.pixels);
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_image_size_mismatch() {
        let sign = HanoverSign::new(1, 96, 16);
        let image = PixelBuffer::new(28, 7);
        assert!(matches!(
            sign.image_frame(&image),
            Err(ControllerError::ImageSizeMismatch { got_width: 28, got_height: 7, .. })
        ));
    }

    #[test]
    fn test_oversized_sign_cannot_be_framed() {
        // 160 x 16 needs 320 image bytes, more than one frame can carry
        let sign = HanoverSign::new(1, 160, 16);
        assert!(matches!(
            sign.image_frame(&sign.create_image()),
            Err(ControllerError::Frame(_))
        ));
    }
}
