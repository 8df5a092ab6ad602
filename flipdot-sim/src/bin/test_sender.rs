//! flipdot-test-sender
//!
//! Writes the configured test packet to the serial port once a second,
//! through the logging serial proxy. Useful for checking the wiring (or a
//! `socat` pair) before involving a real image.

use std::process;

use log::{error, info};

use flipdot_core::{Config, HanoverController, Result, SerialLink, SerialProxy};
use flipdot_sim::args::{usage, Args};
use flipdot_sim::logging;
use flipdot_sim::tools::{send_test_packets, TEST_PACKET_INTERVAL};

fn main() {
    logging::init();

    if let Err(e) = run() {
        error!("{}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::from_env()?;
    if args.help {
        println!("{}", usage("flipdot-test-sender", "[--count <n>]"));
        return Ok(());
    }

    let config = Config::load_or_default(&args.config)?;
    let link = SerialLink::open(&config.serial_port, &config.uart_config())?;
    let proxy = SerialProxy::new(link, &config.log_file)?;
    let mut controller = HanoverController::new(proxy);

    info!(
        "Sending {}-byte test packet to {} at {} baud",
        config.test_packet.len(),
        config.serial_port,
        config.baud_rate
    );
    let sent = send_test_packets(
        &mut controller,
        &config.test_packet,
        TEST_PACKET_INTERVAL,
        args.count,
    )?;
    info!("Sent {} test packets", sent);
    Ok(())
}
