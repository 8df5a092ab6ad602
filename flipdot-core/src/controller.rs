//! Sign controller
//!
//! Owns the serial link and a small table of named signs. Drawing packs
//! the image, frames it for the target sign and writes the frame out in
//! one go; there is no acknowledgement from the sign.

use heapless::{String as HString, Vec as HVec};
use log::{debug, info};
use thiserror::Error;

use flipdot_display::PixelBuffer;
use flipdot_hal::UartTx;
use flipdot_protocol::{Frame, FrameError};

use crate::serial::SerialError;
use crate::sign::HanoverSign;

/// Maximum sign name length
pub const MAX_SIGN_NAME_LEN: usize = 16;

/// Signs per bus (one per address)
pub const MAX_SIGNS: usize = 16;

/// Controller errors
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("a sign named '{0}' is already registered")]
    DuplicateSign(String),

    #[error("no sign named '{0}'")]
    UnknownSign(String),

    #[error("sign name '{0}' is longer than 16 characters")]
    NameTooLong(String),

    #[error("at most 16 signs can share a bus")]
    TooManySigns,

    /// No name given and the choice is ambiguous
    #[error("a sign name is required when {count} signs are registered")]
    SignRequired { count: usize },

    #[error("image is {got_width}x{got_height}, sign is {width}x{height}")]
    ImageSizeMismatch {
        width: u16,
        height: u16,
        got_width: u16,
        got_height: u16,
    },

    #[error("cannot build frame: {0:?}")]
    Frame(FrameError),

    #[error(transparent)]
    Serial(#[from] SerialError),
}

impl From<FrameError> for ControllerError {
    fn from(e: FrameError) -> Self {
        ControllerError::Frame(e)
    }
}

/// Drives one or more Hanover signs over a serial link
pub struct HanoverController<T> {
    link: T,
    signs: HVec<(HString<MAX_SIGN_NAME_LEN>, HanoverSign), MAX_SIGNS>,
}

impl<T> HanoverController<T>
where
    T: UartTx,
    SerialError: From<T::Error>,
{
    /// Create a controller with no signs
    pub fn new(link: T) -> Self {
        Self {
            link,
            signs: HVec::new(),
        }
    }

    /// Register a sign under `name`
    pub fn add_sign(&mut self, name: &str, sign: HanoverSign) -> Result<(), ControllerError> {
        if self.find(name).is_some() {
            return Err(ControllerError::DuplicateSign(name.to_owned()));
        }
        let mut key: HString<MAX_SIGN_NAME_LEN> = HString::new();
        key.push_str(name)
            .map_err(|_| ControllerError::NameTooLong(name.to_owned()))?;
        self.signs
            .push((key, sign))
            .map_err(|_| ControllerError::TooManySigns)?;

        info!(
            "Added sign '{}' at address {} ({}x{})",
            name, sign.address, sign.width, sign.height
        );
        Ok(())
    }

    /// Registered signs, in insertion order
    pub fn signs(&self) -> impl Iterator<Item = (&str, &HanoverSign)> {
        self.signs.iter().map(|(name, sign)| (name.as_str(), sign))
    }

    /// Look up a sign by name
    pub fn sign(&self, name: &str) -> Option<&HanoverSign> {
        self.find(name)
    }

    fn find(&self, name: &str) -> Option<&HanoverSign> {
        self.signs
            .iter()
            .find(|(key, _)| key.as_str() == name)
            .map(|(_, sign)| sign)
    }

    /// Draw `image` on a sign
    ///
    /// With `sign_name` of `None` the only registered sign is used.
    pub fn draw_image(
        &mut self,
        image: &PixelBuffer,
        sign_name: Option<&str>,
    ) -> Result<(), ControllerError> {
        let sign = match sign_name {
            Some(name) => *self
                .find(name)
                .ok_or_else(|| ControllerError::UnknownSign(name.to_owned()))?,
            None => match self.signs.as_slice() {
                [(_, sign)] => *sign,
                others => {
                    return Err(ControllerError::SignRequired {
                        count: others.len(),
                    })
                }
            },
        };

        let frame = sign.image_frame(image)?;
        debug!(
            "Drawing {} lit dots on sign at address {}",
            image.lit_count(),
            sign.address
        );
        self.send(&frame)
    }

    /// Start the built-in test on every sign
    pub fn start_test_signs(&mut self) -> Result<(), ControllerError> {
        info!("Starting sign test mode");
        self.send(&Frame::test_signs_start())
    }

    /// Stop the built-in test on every sign
    pub fn stop_test_signs(&mut self) -> Result<(), ControllerError> {
        info!("Stopping sign test mode");
        self.send(&Frame::test_signs_stop())
    }

    /// Write bytes verbatim
    pub fn write_raw(&mut self, data: &[u8]) -> Result<(), ControllerError> {
        self.link.write_blocking(data).map_err(SerialError::from)?;
        self.link.flush().map_err(SerialError::from)?;
        Ok(())
    }

    fn send(&mut self, frame: &Frame) -> Result<(), ControllerError> {
        let bytes = frame.encode();
        debug!("Sending {:?} frame, {} bytes", frame.command, bytes.len());
        self.write_raw(&bytes)
    }

    /// The underlying link
    pub fn link(&self) -> &T {
        &self.link
    }

    /// Give back the underlying link
    pub fn into_inner(self) -> T {
        self.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::MemoryLink;
    use flipdot_display::pattern::checkerboard;
    use flipdot_protocol::{decode_packet, PacketAssembler, ETX, STX};

    fn controller_with_dev_sign() -> HanoverController<MemoryLink> {
        let mut controller = HanoverController::new(MemoryLink::new());
        controller.add_sign("dev", HanoverSign::new(1, 96, 16)).unwrap();
        controller
    }

    #[test]
    fn test_draw_checkerboard_on_only_sign() {
        let mut controller = controller_with_dev_sign();
        let sign = *controller.sign("dev").unwrap();
        let mut image = sign.create_image();
        checkerboard(&mut image, 0);

        controller.draw_image(&image, None).unwrap();

        let written = controller.into_inner().take_written();
        let packets = PacketAssembler::new().push(&written);
        assert_eq!(packets.len(), 1);

        let packet = decode_packet(&packets[0], 1).unwrap();
        assert!(packet.resolution_matches(96, 16));
        let mut received = sign.create_image();
        received.apply_column_bytes(&packet.pixels);
        assert_eq!(received, image);
    }

    #[test]
    fn test_draw_on_named_sign() {
        let mut controller = controller_with_dev_sign();
        controller.add_sign("side", HanoverSign::new(2, 28, 7)).unwrap();

        let image = PixelBuffer::new(28, 7);
        controller.draw_image(&image, Some("side")).unwrap();
        let written = controller.link().written().to_vec();
        assert_eq!(&written[1..3], b"12");
    }

    #[test]
    fn test_sign_name_required_with_several_signs() {
        let mut controller = controller_with_dev_sign();
        controller.add_sign("side", HanoverSign::new(2, 28, 7)).unwrap();
        let image = PixelBuffer::new(96, 16);
        assert!(matches!(
            controller.draw_image(&image, None),
            Err(ControllerError::SignRequired { count: 2 })
        ));
    }

    #[test]
    fn test_sign_name_required_without_signs() {
        let mut controller = HanoverController::new(MemoryLink::new());
        let image = PixelBuffer::new(96, 16);
        assert!(matches!(
            controller.draw_image(&image, None),
            Err(ControllerError::SignRequired { count: 0 })
        ));
    }

    #[test]
    fn test_unknown_and_duplicate_signs() {
        let mut controller = controller_with_dev_sign();
        assert!(matches!(
            controller.add_sign("dev", HanoverSign::new(3, 96, 16)),
            Err(ControllerError::DuplicateSign(_))
        ));
        assert!(matches!(
            controller.draw_image(&PixelBuffer::new(96, 16), Some("nope")),
            Err(ControllerError::UnknownSign(_))
        ));
        assert!(matches!(
            controller.add_sign("a-very-long-sign-name", HanoverSign::new(3, 96, 16)),
            Err(ControllerError::NameTooLong(_))
        ));
    }

    #[test]
    fn test_too_many_signs() {
        let mut controller = HanoverController::new(MemoryLink::new());
        for address in 0..MAX_SIGNS as u8 {
            let name = format!("sign{}", address);
            controller
                .add_sign(&name, HanoverSign::new(address, 96, 16))
                .unwrap();
        }
        assert!(matches!(
            controller.add_sign("extra", HanoverSign::new(0, 96, 16)),
            Err(ControllerError::TooManySigns)
        ));
        assert_eq!(controller.signs().count(), MAX_SIGNS);
    }

    #[test]
    fn test_test_signs_frames() {
        let mut controller = controller_with_dev_sign();
        controller.start_test_signs().unwrap();
        controller.stop_test_signs().unwrap();

        let written = controller.into_inner().take_written();
        let packets = PacketAssembler::new().push(&written);
        assert_eq!(packets.len(), 2);
        assert_eq!(&packets[0][..4], &[STX, b'3', b'0', ETX]);
        assert_eq!(&packets[1][..4], &[STX, b'C', b'0', ETX]);
    }

    #[test]
    fn test_write_raw_is_verbatim() {
        let mut controller = controller_with_dev_sign();
        let packet = crate::config::default_test_packet();
        controller.write_raw(&packet).unwrap();

        let link = controller.into_inner();
        assert_eq!(link.written(), packet.as_slice());
        assert_eq!(link.flushes(), 1);
    }
}
