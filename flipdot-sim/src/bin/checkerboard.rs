//! flipdot-checkerboard
//!
//! Draws a checkerboard on the configured sign. With `--loop` the pattern
//! flips every `checkerboard_interval` seconds.

use std::process;
use std::time::Duration;

use log::{error, info};

use flipdot_core::{Config, Result, SerialLink, SerialProxy};
use flipdot_sim::args::{usage, Args};
use flipdot_sim::logging;
use flipdot_sim::tools::{controller_for, draw_checkerboards};

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
        println!("{}", usage("flipdot-checkerboard", "[--loop] [--count <n>]"));
        return Ok(());
    }

    let config = Config::load_or_default(&args.config)?;
    let sign = config.sign();
    let link = SerialLink::open(&config.serial_port, &config.uart_config())?;
    let proxy = SerialProxy::new(link, &config.log_file)?;
    let mut controller = controller_for(proxy, sign)?;

    // A zero interval means "draw once", even with --loop
    let frames = if args.repeat && config.checkerboard_interval > 0 {
        args.count
    } else {
        Some(1)
    };
    let interval = Duration::from_secs(config.checkerboard_interval);

    let drawn = draw_checkerboards(&mut controller, &sign, interval, frames)?;
    info!("Drew {} checkerboard(s) on {}", drawn, config.serial_port);
    Ok(())
}
