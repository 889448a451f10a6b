use crate::analyser::containers::{Packet, StreamId, StreamState, Timing};
use crate::analyser::core::SessionSummary;
use crate::analyser::correlator::LatencySummary;
use crate::analyser::framer::Capture;
use crate::analyser::patterns::{PatternId, UNKNOWN_NAME};
use crate::analyser::utils::log_time;
use crate::analyser::MAX_SIZE;
use ansi_term::Colour;

/// Fixed-width hex dump, one `XX ` column per possible packet byte.
fn hex_columns(bytes: &[u8]) -> String {
    (0..MAX_SIZE)
        .map(|i| match bytes.get(i) {
            Some(byte) => format!("{byte:02X} "),
            None => "   ".to_string(),
        })
        .collect()
}

fn latency_field(timing: Option<&Timing>) -> String {
    match timing {
        Some(t) => format!("{{{:04}/{:6.2}{}}} ", t.elapsed_ms, t.mean_ms, t.class.tag()),
        None => "{    /       } ".to_string(),
    }
}

/// One traced packet:
///
/// ```text
/// HH:MM:SS[mmmm] CTL: 81 01 04 07 02 FF ...  {eeee/mmm.mmT}  - CMD: Zoom
/// ```
pub fn trace_line(packet: &Packet, timing: Option<&Timing>, pattern: Option<PatternId>) -> String {
    format!(
        "{} {}: {}{} - {}",
        log_time(&packet.received_at),
        packet.source.label(),
        hex_columns(&packet.bytes),
        latency_field(timing),
        pattern.map_or(UNKNOWN_NAME, |p| p.name()),
    )
}

/// Raw dump of a packet that could not be framed.
pub fn diagnostic_line(stream: StreamId, capture: &Capture) -> String {
    format!(
        "{} {}: {}ERROR",
        log_time(&capture.started_at),
        stream.label(),
        hex_columns(&capture.bytes)
    )
}

pub fn aggregate_line(summary: &SessionSummary) -> String {
    format!(
        concat!(
            "~~~~~~~~~~~~~~~~~~~ ack={:.2} ({}) | done={:.2} ({}) [ms] ",
            "| unknown={}/{} | errors={}/{} | outliers={}/{}"
        ),
        summary.ack.mean_ms,
        summary.ack.samples,
        summary.completion.mean_ms,
        summary.completion.samples,
        summary.master.unknown,
        summary.slave.unknown,
        summary.master.errors,
        summary.slave.errors,
        summary.ack.outliers,
        summary.completion.outliers,
    )
}

pub fn print_separator() {
    println!("==============================================");
}

pub fn print_results(summary: &SessionSummary) {
    println!("\n\u{250F}\u{2501}\u{2501}\u{2501}\u{2501} Results");
    print_stream(StreamId::Master, &summary.master);
    print_stream(StreamId::Slave, &summary.slave);
    println!("\u{2503}");
    print_latency("Ack latency      ", &summary.ack);
    print_latency("Completion       ", &summary.completion);
    println!("\u{2503} ");
}

fn print_stream(stream: StreamId, state: &StreamState) {
    println!("\u{2503}");
    println!("\u{2503} Stream {}", Colour::Red.paint(stream.label()));
    println!("\u{2503} Packets          : {}", Colour::Fixed(226).paint(state.valid.to_string()));
    println!("\u{2503} Unknown          : {}", Colour::Fixed(226).paint(state.unknown.to_string()));
    println!("\u{2503} Errors           : {}", Colour::Fixed(226).paint(state.errors.to_string()));
}

fn print_latency(title: &str, latency: &LatencySummary) {
    println!(
        "\u{2503} {}: {} ms over {} samples ({} outliers)",
        title,
        Colour::Fixed(226).paint(format!("{:.2}", latency.mean_ms)),
        latency.samples,
        latency.outliers
    );
}

pub fn data_as_json(summary: &SessionSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

pub fn print_banner() {
    eprintln!(
        "{} {} -- dump VISCA communication using two ports\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
}
