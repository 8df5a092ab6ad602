//! flipdot-test-signs
//!
//! Puts every sign on the bus into its built-in test mode.

use std::process;

use log::error;

use flipdot_core::{Config, HanoverController, Result, SerialLink, SerialProxy};
use flipdot_sim::args::{usage, Args};
use flipdot_sim::logging;

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
        println!("{}", usage("flipdot-test-signs", ""));
        return Ok(());
    }

    let config = Config::load_or_default(&args.config)?;
    let link = SerialLink::open(&config.serial_port, &config.uart_config())?;
    let proxy = SerialProxy::new(link, &config.log_file)?;
    let mut controller = HanoverController::new(proxy);

    controller.start_test_signs()?;
    Ok(())
}
