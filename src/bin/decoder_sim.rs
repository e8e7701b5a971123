//! Desktop turnout decoder simulator.
//!
//! Runs the real decoder main loop against mock outputs and sensors, a
//! file-backed EEPROM image and stdin/stdout as the bus. Each input line is
//! one of:
//!
//! - a JSON bus message, e.g. `{"switch":{"address":1,"output":16,"direction":true}}`
//!   or `{"programming_start":{"article":5030,"address":65535}}`
//! - `sw <sw1> <sw2>`: raw switch request bytes in hex
//! - `sensor <byte>`: set the sensor expander port byte in hex (active low)
//! - `quit`
//!
//! Outbound messages are printed as JSON lines; switch reports also show
//! their wire bytes.
//!
//! # Run
//!
//! ```bash
//! RUST_LOG=debug cargo run --features sim --bin decoder_sim
//!
//! # Eight turnout profile, custom image
//! DECODER_PROFILE=wide DECODER_EEPROM=/tmp/wide.eeprom cargo run --features sim --bin decoder_sim
//! ```

use anyhow::{anyhow, bail, Context};
use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use turnout_decoder::hal::{ChannelBus, FileStore, MockOutputs, MockSensor, SystemClock};
use turnout_decoder::messages::{BusMessage, OutboundMessage};
use turnout_decoder::traits::{BusTransport, ByteStore, Clock, OutputBank, SensorInput};
use turnout_decoder::{wire, Decoder, DecoderConfig, Dispatcher, HardwareProfile};

/// Main loop interval in milliseconds
const LOOP_INTERVAL_MS: u64 = 5;

/// One parsed line of simulator input.
#[derive(Debug)]
enum Input {
    Bus(BusMessage),
    Sensor(u8),
    Quit,
}

fn parse_hex(s: &str) -> anyhow::Result<u8> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u8::from_str_radix(digits, 16).with_context(|| format!("not a hex byte: {s}"))
}

fn parse_line(line: &str) -> anyhow::Result<Option<Input>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    if line.starts_with('{') {
        let msg: BusMessage = serde_json::from_str(line).context("invalid bus message")?;
        return Ok(Some(Input::Bus(msg)));
    }

    let mut words = line.split_whitespace();
    match words.next() {
        Some("quit") | Some("exit") => Ok(Some(Input::Quit)),
        Some("sw") => {
            let sw1 = parse_hex(words.next().ok_or_else(|| anyhow!("sw needs two bytes"))?)?;
            let sw2 = parse_hex(words.next().ok_or_else(|| anyhow!("sw needs two bytes"))?)?;
            let cmd = wire::decode_switch_request(sw1, sw2);
            Ok(Some(Input::Bus(BusMessage::Switch(cmd))))
        }
        Some("sensor") => {
            let byte = parse_hex(words.next().ok_or_else(|| anyhow!("sensor needs a byte"))?)?;
            Ok(Some(Input::Sensor(byte)))
        }
        Some(other) => bail!("unknown command: {other}"),
        None => Ok(None),
    }
}

fn print_outbound(msg: &OutboundMessage) -> anyhow::Result<()> {
    let json = serde_json::to_string(msg)?;
    match msg {
        OutboundMessage::SwitchReport(report) => {
            let [low, high] = wire::encode_switch_report(report);
            println!("{json} # {:02X} {low:02X} {high:02X}", wire::OPC_SW_REP);
        }
        OutboundMessage::Programming(_) => println!("{json}"),
    }
    Ok(())
}

/// Poll until no message arrives and no pulse is running.
///
/// `after_pass` runs after every iteration. Returns the number of
/// iterations taken.
fn wind_down<T, C, O, S, B>(
    dispatcher: &mut Dispatcher<T, C, O, S, B>,
    mut after_pass: impl FnMut(&mut Dispatcher<T, C, O, S, B>) -> anyhow::Result<()>,
) -> anyhow::Result<usize>
where
    T: BusTransport,
    C: Clock,
    O: OutputBank,
    S: SensorInput,
    B: ByteStore,
{
    let mut passes = 0;
    loop {
        let summary = dispatcher.poll_once();
        passes += 1;
        after_pass(dispatcher)?;
        if summary.handled.is_none() && !dispatcher.decoder().drive().any_active() {
            return Ok(passes);
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    // =========================================================================
    // Configuration
    // =========================================================================
    let profile = match std::env::var("DECODER_PROFILE") {
        Ok(text) => HardwareProfile::from_text(&text)
            .ok_or_else(|| anyhow!("unknown DECODER_PROFILE: {text}"))?,
        Err(_) => HardwareProfile::BUILD,
    };
    let config = DecoderConfig::default().with_profile(profile);
    let eeprom_path =
        std::env::var("DECODER_EEPROM").unwrap_or_else(|_| "decoder.eeprom".to_string());

    let store = FileStore::open(&eeprom_path, config.storage_bytes())
        .with_context(|| format!("opening EEPROM image {eeprom_path}"))?;
    tracing::info!(path = %eeprom_path, profile = profile.as_str(), "simulator starting");

    // =========================================================================
    // Decoder + bus
    // =========================================================================
    let decoder = Decoder::new(config, MockOutputs::new(), MockSensor::new(0xFF), store);
    let (bus, bus_tx, bus_rx) = ChannelBus::new();
    let mut dispatcher = Dispatcher::new(decoder, bus, SystemClock::new());

    // =========================================================================
    // Stdin reader thread
    // =========================================================================
    let (input_tx, input_rx) = mpsc::channel::<Input>();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_line(&line) {
                Ok(Some(input)) => {
                    if input_tx.send(input).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => eprintln!("error: {e:#}"),
            }
        }
        let _ = input_tx.send(Input::Quit);
    });

    dispatcher.startup();

    // =========================================================================
    // Main loop
    // =========================================================================
    loop {
        while let Ok(input) = input_rx.try_recv() {
            match input {
                Input::Bus(msg) => bus_tx
                    .send(msg)
                    .map_err(|_| anyhow!("bus channel closed"))?,
                Input::Sensor(byte) => dispatcher.decoder_mut().sensor_mut().byte = byte,
                Input::Quit => {
                    // Let queued messages and running pulses finish first
                    wind_down(&mut dispatcher, |_| {
                        while let Ok(msg) = bus_rx.try_recv() {
                            print_outbound(&msg)?;
                        }
                        thread::sleep(Duration::from_millis(LOOP_INTERVAL_MS));
                        Ok(())
                    })?;
                    tracing::info!("simulator stopped");
                    return Ok(());
                }
            }
        }

        let summary = dispatcher.poll_once();
        if let Some(outcome) = summary.handled {
            tracing::debug!(?outcome, "handled");
        }

        while let Ok(msg) = bus_rx.try_recv() {
            print_outbound(&msg)?;
        }

        let pins = dispatcher.decoder().outputs().high_pins();
        if summary.handled.is_some() || summary.expired > 0 {
            tracing::info!(?pins, "outputs");
        }

        thread::sleep(Duration::from_millis(LOOP_INTERVAL_MS));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turnout_decoder::hal::{MockBus, MockClock, MockStore};
    use turnout_decoder::messages::SwitchCommand;

    #[test]
    fn parses_raw_switch_request() {
        match parse_line("sw 02 30").unwrap() {
            Some(Input::Bus(BusMessage::Switch(cmd))) => {
                assert_eq!(cmd, SwitchCommand::on(3, true));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_json_message() {
        let line = r#"{"programming_start":{"article":5030,"address":65535}}"#;
        match parse_line(line).unwrap() {
            Some(Input::Bus(BusMessage::ProgrammingStart { article, address })) => {
                assert_eq!(article, 5030);
                assert_eq!(address, 0xFFFF);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_sensor_and_blank() {
        assert!(matches!(parse_line("sensor 0xFE").unwrap(), Some(Input::Sensor(0xFE))));
        assert!(parse_line("   ").unwrap().is_none());
        assert!(parse_line("# comment").unwrap().is_none());
        assert!(parse_line("bogus").is_err());
    }

    #[test]
    fn quit_waits_for_running_pulse() {
        let mut bytes = MockStore::new(18);
        bytes.set_word(0, 1);
        bytes.set_word(1, 1);
        bytes.set_word(2, 3000);
        let config = DecoderConfig::default().with_profile(HardwareProfile::Sensor);
        let decoder = Decoder::new(config, MockOutputs::new(), MockSensor::new(0xFF), bytes);
        let mut dispatcher = Dispatcher::new(decoder, MockBus::new(), MockClock::new());
        dispatcher
            .transport_mut()
            .queue(BusMessage::Switch(SwitchCommand::on(1, true)));

        let passes = wind_down(&mut dispatcher, |d| {
            d.clock_mut().advance(100);
            Ok(())
        })
        .unwrap();

        assert_eq!(passes, 31);
        assert!(!dispatcher.decoder().drive().any_active());
        assert!(!dispatcher.decoder().outputs().level(2));
    }

    #[test]
    fn quit_when_idle_takes_one_pass() {
        let config = DecoderConfig::default().with_profile(HardwareProfile::Sensor);
        let bytes = MockStore::new(18);
        let decoder = Decoder::new(config, MockOutputs::new(), MockSensor::new(0xFF), bytes);
        let mut dispatcher = Dispatcher::new(decoder, MockBus::new(), MockClock::new());
        assert_eq!(wind_down(&mut dispatcher, |_| Ok(())).unwrap(), 1);
    }
}
