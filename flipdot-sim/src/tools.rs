//! Bench tool routines
//!
//! The binaries are thin wrappers around these so the loops can be tested
//! against an in-memory link.

use std::thread;
use std::time::Duration;

use log::info;

use flipdot_core::controller::ControllerError;
use flipdot_core::serial::SerialError;
use flipdot_core::{HanoverController, HanoverSign};
use flipdot_display::pattern::checkerboard;
use flipdot_hal::UartTx;

/// Pause between test packets
pub const TEST_PACKET_INTERVAL: Duration = Duration::from_secs(1);

/// Name the bench tools register their sign under
pub const SIGN_NAME: &str = "dev";

/// Write `packet` verbatim, pausing `interval` after each write
///
/// The sign table is not consulted. Runs forever when `count` is `None`.
/// Returns the number of packets sent.
pub fn send_test_packets<T>(
    controller: &mut HanoverController<T>,
    packet: &[u8],
    interval: Duration,
    count: Option<u64>,
) -> Result<u64, ControllerError>
where
    T: UartTx,
    SerialError: From<T::Error>,
{
    let mut sent = 0;
    while count.map_or(true, |limit| sent < limit) {
        controller.write_raw(packet)?;
        sent += 1;
        info!("Sent test packet #{} ({} bytes)", sent, packet.len());
        thread::sleep(interval);
    }
    Ok(sent)
}

/// Draw a checkerboard, then keep alternating its phase
///
/// `frames` is the number of images drawn; `None` alternates forever.
/// `interval` is the pause between images.
pub fn draw_checkerboards<T>(
    controller: &mut HanoverController<T>,
    sign: &HanoverSign,
    interval: Duration,
    frames: Option<u64>,
) -> Result<u64, ControllerError>
where
    T: UartTx,
    SerialError: From<T::Error>,
{
    let mut image = sign.create_image();
    let mut drawn = 0;

    while frames.map_or(true, |limit| drawn < limit) {
        if drawn > 0 {
            thread::sleep(interval);
        }
        checkerboard(&mut image, (drawn % 2) as u8);
        controller.draw_image(&image, Some(SIGN_NAME))?;
        drawn += 1;
        info!("Drew checkerboard #{}", drawn);
    }

    Ok(drawn)
}

/// Controller with the configured sign registered under [`SIGN_NAME`]
pub fn controller_for<T>(link: T, sign: HanoverSign) -> Result<HanoverController<T>, ControllerError>
where
    T: UartTx,
    SerialError: From<T::Error>,
{
    let mut controller = HanoverController::new(link);
    controller.add_sign(SIGN_NAME, sign)?;
    Ok(controller)
}
