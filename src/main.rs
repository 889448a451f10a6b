mod analyser;
mod ui;

use analyser::containers::StreamId;
use analyser::core::Sniffer;
use analyser::mux::StreamPair;
use analyser::source::{PortSettings, SerialSource, DEFAULT_TIMEOUT};
use analyser::utils::SystemClock;
use clap::{ArgAction, Parser};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::io;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use ui::output;

/// Exit status after a second termination signal.
const ABORT_EXIT_CODE: i32 = 99;

/// viscasniff dumps the VISCA traffic between a controller and a camera.
/// The TX line of each device must be connected to its own serial port.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serial port connected to the sender (controller)
    #[arg(short = 's', long, value_parser)]
    sender: Option<String>,

    /// Serial port connected to the receiver (camera)
    #[arg(short = 'r', long, value_parser)]
    receiver: Option<String>,

    /// Read timeout in seconds, 0 selects the default of 1 second
    #[arg(short = 't', long, default_value_t = 0, value_parser)]
    timeout: u64,

    /// Lock the serial ports for exclusive access
    #[arg(short = 'l', long, action = ArgAction::SetTrue)]
    lock: bool,

    /// Enable debug logging
    #[arg(short = 'D', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Print the session summary as formatted JSON
    #[arg(short = 'j', long, action = ArgAction::SetTrue)]
    json: bool,
}

impl Args {
    fn port_settings(&self) -> PortSettings {
        let timeout = match self.timeout {
            0 => DEFAULT_TIMEOUT,
            secs => Duration::from_secs(secs),
        };
        PortSettings {
            timeout,
            lock: self.lock,
        }
    }
}

/// First signal asks the capture loop to stop, a second one aborts.
fn install_signal_handler(shutdown: Arc<AtomicBool>) {
    let result = ctrlc::set_handler(move || {
        if shutdown.swap(true, Ordering::SeqCst) {
            eprintln!("**ABORT**");
            std::process::exit(ABORT_EXIT_CODE);
        }
    });
    if let Err(e) = result {
        log::warn!("Could not install signal handler: {e}");
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.debug { LevelFilter::Debug } else { LevelFilter::Info };
    if let Err(e) = SimpleLogger::new().with_level(level).env().init() {
        eprintln!("Logger setup failed: {e}");
    }

    output::print_banner();

    let (Some(sender), Some(receiver)) = (args.sender.as_deref(), args.receiver.as_deref()) else {
        log::error!("Both a sender port (-s) and a receiver port (-r) are required.");
        return ExitCode::from(1);
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    install_signal_handler(Arc::clone(&shutdown));

    let settings = args.port_settings();
    let master = match SerialSource::open(StreamId::Master, sender, &settings) {
        Ok(source) => source,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::from(1);
        }
    };
    let slave = match SerialSource::open(StreamId::Slave, receiver, &settings) {
        Ok(source) => source,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::from(1);
        }
    };

    let mut sniffer = Sniffer::new(StreamPair::new(master, slave), SystemClock, io::stdout());

    output::print_separator();
    let result = sniffer.run(&shutdown);
    output::print_separator();

    let summary = sniffer.summary();
    // Closes both ports.
    drop(sniffer);

    // ---- Output ----
    if args.json {
        match output::data_as_json(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Could not serialise summary: {e}"),
        }
    } else {
        output::print_results(&summary);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Capture aborted: {e}");
            ExitCode::from(1)
        }
    }
}
