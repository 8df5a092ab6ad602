//! flipdot-sim
//!
//! Pretends to be a Hanover sign: listens on the configured serial port,
//! reassembles and decodes the packets it receives and shows the resulting
//! image. Every packet is appended to the JSON-lines packet log, and the
//! sign is served as a live web page on `web_port`.

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use log::{error, info};

use flipdot_core::{Config, Error, Result, SerialLink};
use flipdot_display::DisplayBackend;
use flipdot_sim::args::{usage, Args};
use flipdot_sim::channels::packet_channel;
use flipdot_sim::packet_log::read_log;
use flipdot_sim::render::TerminalBackend;
use flipdot_sim::tasks::serial_rx::serial_rx_loop;
use flipdot_sim::web::{self, LiveView, WebView};
use flipdot_sim::{logging, PacketLog, PacketProcessor, PacketRecord};

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
        println!(
            "{}",
            usage("flipdot-sim", "[--self-test] [--window] [--replay <packet_log.json>]")
        );
        return Ok(());
    }

    let config = Config::load_or_default(&args.config)?;
    info!(
        "Simulating a {}x{} sign at address {}",
        config.columns, config.rows, config.address
    );

    let view = LiveView::new(config.columns, config.rows, config.history_len).shared();
    let mut processor = PacketProcessor::new(&config, display_backend(&args, &config)?)
        .with_log(PacketLog::open(&config.packet_log)?)
        .with_view(Arc::clone(&view));

    let running = Arc::new(AtomicBool::new(true));
    let web = match web::bind_address(&config.web_port) {
        Some(addr) => {
            let server = WebView::bind(&addr)?;
            let running = Arc::clone(&running);
            let view = Arc::clone(&view);
            Some(
                thread::Builder::new()
                    .name("web-view".into())
                    .spawn(move || server.serve(&view, &running))?,
            )
        }
        None => None,
    };

    if let Some(path) = &args.replay {
        let records = read_log(path)?;
        info!("Replaying {} packets from {}", records.len(), path.display());
        processor.replay(records);
        if args.window {
            info!("Replay finished, close the window to exit");
            processor.wait_for_close();
        }
    } else {
        listen(&args, &config, &mut processor, &running)?;
    }

    running.store(false, Ordering::Relaxed);
    if let Some(web) = web {
        if web.join().is_err() {
            return Err(Error::Other("web view thread panicked".into()));
        }
    }
    Ok(())
}

/// Read the serial port until the display is closed
fn listen(
    args: &Args,
    config: &Config,
    processor: &mut PacketProcessor<Box<dyn DisplayBackend>>,
    running: &Arc<AtomicBool>,
) -> Result<()> {
    let (packets_tx, packets_rx) = packet_channel();

    if args.self_test {
        info!("Queueing self-test packet ({} bytes)", config.test_packet.len());
        packets_tx
            .send(PacketRecord::now(config.test_packet.clone()))
            .map_err(|_| Error::Other("packet channel closed".into()))?;
    }

    let link = SerialLink::open(&config.serial_port, &config.uart_config())?;
    info!("Started reading from serial port {}", link.name());

    let reader = {
        let running = Arc::clone(running);
        thread::Builder::new()
            .name("serial-rx".into())
            .spawn(move || serial_rx_loop(link, packets_tx, &running))?
    };

    processor.run(packets_rx);

    running.store(false, Ordering::Relaxed);
    if reader.join().is_err() {
        return Err(Error::Other("serial RX thread panicked".into()));
    }
    Ok(())
}

#[cfg(feature = "window")]
fn display_backend(args: &Args, config: &Config) -> Result<Box<dyn DisplayBackend>> {
    use flipdot_sim::render::WindowBackend;

    if args.window {
        let window = WindowBackend::open("Flip-dot simulator", config.columns, config.rows)
            .map_err(|e| Error::Other(format!("cannot open window: {}", e)))?;
        return Ok(Box::new(window));
    }
    Ok(Box::new(TerminalBackend::stdout(config.columns, config.rows)))
}

#[cfg(not(feature = "window"))]
fn display_backend(args: &Args, config: &Config) -> Result<Box<dyn DisplayBackend>> {
    if args.window {
        return Err(Error::Other(
            "built without the `window` feature, rebuild with --features window".into(),
        ));
    }
    Ok(Box::new(TerminalBackend::stdout(config.columns, config.rows)))
}
