//! Edge case tests for the turnout decoder
//!
//! Covers address boundaries, overlapping pulses, clock anomalies,
//! programming gating, feedback corner cases and hardware faults.

use turnout_decoder::{
    hal::{MockBus, MockClock, MockOutputs, MockSensor, MockStore},
    wire, BusMessage, Decoder, DecoderConfig, DecoderError, Dispatcher, HardwareProfile,
    MessageOutcome, ProgrammingError, ProgrammingReply, SwitchCommand, SwitchOutcome,
    SwitchReport,
};

const ART: u16 = 5030;

type TestDecoder = Decoder<MockOutputs, MockSensor, MockStore>;

/// Decoder on the sensor profile with the given records already stored.
fn decoder(records: &[(u16, u16)]) -> TestDecoder {
    let mut bytes = MockStore::new(18);
    bytes.set_word(0, 1);
    for &(index, value) in records {
        bytes.set_word(index, value);
    }
    let config = DecoderConfig::default().with_profile(HardwareProfile::Sensor);
    Decoder::new(config, MockOutputs::new(), MockSensor::new(0xFF), bytes)
}

fn open_session(d: &mut TestDecoder) {
    let address = d.module_address();
    assert!(matches!(
        d.handle_programming(&BusMessage::ProgrammingStart { article: ART, address }),
        Some(ProgrammingReply::Started { .. })
    ));
}

// ============================================================================
// Address Boundaries
// ============================================================================

#[test]
fn addresses_around_module_range() {
    let mut d = decoder(&[(0, 100), (1, 2), (7, 2)]);

    assert_eq!(
        d.handle_switch(&SwitchCommand::on(99, true), 0).unwrap(),
        SwitchOutcome::AddressOutOfRange
    );
    assert_eq!(
        d.handle_switch(&SwitchCommand::on(100, true), 0).unwrap(),
        SwitchOutcome::Driven { turnout: 0 }
    );
    assert_eq!(
        d.handle_switch(&SwitchCommand::on(103, true), 0).unwrap(),
        SwitchOutcome::Driven { turnout: 3 }
    );
    assert_eq!(
        d.handle_switch(&SwitchCommand::on(104, true), 0).unwrap(),
        SwitchOutcome::AddressOutOfRange
    );
}

#[test]
fn unknown_drive_type_is_ignored() {
    let mut d = decoder(&[(1, 7)]);
    assert_eq!(
        d.handle_switch(&SwitchCommand::on(1, true), 0).unwrap(),
        SwitchOutcome::Unconfigured { turnout: 0, raw: 7 }
    );
    assert!(d.outputs().history.is_empty());
}

// ============================================================================
// Pulse Overlap
// ============================================================================

#[test]
fn duplicate_request_does_not_retrigger() {
    let mut d = decoder(&[(1, 1), (2, 100)]);

    d.handle_switch(&SwitchCommand::on(1, true), 0).unwrap();
    assert_eq!(
        d.handle_switch(&SwitchCommand::on(1, true), 80).unwrap(),
        SwitchOutcome::DuplicateActivation { channel: 0 }
    );

    // Still ends 100ms after the first request
    assert_eq!(d.expire(100).unwrap(), 1);
    assert!(!d.outputs().level(2));
}

#[test]
fn opposite_coil_waits_for_sibling() {
    let mut d = decoder(&[(1, 1), (2, 100)]);

    d.handle_switch(&SwitchCommand::on(1, true), 0).unwrap();
    assert_eq!(
        d.handle_switch(&SwitchCommand::on(1, false), 10).unwrap(),
        SwitchOutcome::SiblingActive { channel: 0 }
    );
    assert!(d.outputs().level(2));
    assert!(!d.outputs().level(3));

    d.expire(100).unwrap();
    assert_eq!(
        d.handle_switch(&SwitchCommand::on(1, false), 110).unwrap(),
        SwitchOutcome::PulseStarted { channel: 1 }
    );
    assert!(d.outputs().level(3));
}

#[test]
fn zero_delay_pulse_ends_on_next_pass() {
    let mut d = decoder(&[(1, 1), (2, 0)]);

    d.handle_switch(&SwitchCommand::on(1, false), 500).unwrap();
    assert!(d.outputs().level(3));
    assert_eq!(d.expire(500).unwrap(), 1);
    assert!(!d.outputs().level(3));
}

#[test]
fn maximum_delay_pulse() {
    let mut d = decoder(&[(1, 1), (2, u16::MAX)]);

    d.handle_switch(&SwitchCommand::on(1, true), 0).unwrap();
    assert_eq!(d.expire(u64::from(u16::MAX) - 1).unwrap(), 0);
    assert_eq!(d.expire(u64::from(u16::MAX)).unwrap(), 1);
}

#[test]
fn clock_going_backwards_never_expires_early() {
    let mut d = decoder(&[(1, 1), (2, 100)]);

    d.handle_switch(&SwitchCommand::on(1, true), 1_000).unwrap();
    assert_eq!(d.expire(500).unwrap(), 0);
    assert!(d.outputs().level(2));
    assert_eq!(d.expire(1_100).unwrap(), 1);
}

#[test]
fn large_timestamps() {
    let mut d = decoder(&[(1, 1), (2, 50)]);
    let start = u64::MAX - 10;

    d.handle_switch(&SwitchCommand::on(1, true), start).unwrap();
    assert_eq!(d.expire(u64::MAX).unwrap(), 0);
    assert!(d.outputs().level(2));
}

#[test]
fn switching_to_motor_cancels_pulse() {
    let mut d = decoder(&[(1, 1), (2, 100)]);
    d.handle_switch(&SwitchCommand::on(1, true), 0).unwrap();

    open_session(&mut d);
    d.handle_programming(&BusMessage::ProgrammingWrite { article: ART, index: 1, value: 2 });

    assert_eq!(
        d.handle_switch(&SwitchCommand::on(1, false), 10).unwrap(),
        SwitchOutcome::Driven { turnout: 0 }
    );
    assert!(!d.drive().any_active());
    assert_eq!(d.expire(1_000).unwrap(), 0);
    assert!(d.outputs().level(3));
}

// ============================================================================
// Programming Gating
// ============================================================================

#[test]
fn write_outside_session_leaves_store_untouched() {
    let mut d = decoder(&[]);
    assert_eq!(
        d.handle_programming(&BusMessage::ProgrammingWrite { article: ART, index: 0, value: 9 }),
        Some(ProgrammingReply::Rejected {
            article: ART,
            error: ProgrammingError::SessionClosed
        })
    );
    assert_eq!(d.module_address(), 1);
}

#[test]
fn index_range_is_enforced() {
    let mut d = decoder(&[]);
    open_session(&mut d);

    assert!(matches!(
        d.handle_programming(&BusMessage::ProgrammingRead { article: ART, index: 8 }),
        Some(ProgrammingReply::Value { index: 8, .. })
    ));
    assert_eq!(
        d.handle_programming(&BusMessage::ProgrammingRead { article: ART, index: 9 }),
        Some(ProgrammingReply::Rejected {
            article: ART,
            error: ProgrammingError::IndexOutOfRange
        })
    );
    assert_eq!(
        d.handle_programming(&BusMessage::ProgrammingWrite { article: ART, index: 9, value: 1 }),
        Some(ProgrammingReply::Rejected {
            article: ART,
            error: ProgrammingError::IndexOutOfRange
        })
    );
    // Record 9 would be bytes 18..20, beyond the image
    assert_eq!(d.store().bytes().len(), 18);
}

#[test]
fn start_for_other_module_is_rejected() {
    let mut d = decoder(&[(0, 5)]);
    assert_eq!(
        d.handle_programming(&BusMessage::ProgrammingStart { article: ART, address: 6 }),
        Some(ProgrammingReply::Rejected {
            article: ART,
            error: ProgrammingError::AddressMismatch
        })
    );
    assert!(!d.session().is_active());
}

#[test]
fn restart_while_active_stays_active() {
    let mut d = decoder(&[]);
    open_session(&mut d);
    open_session(&mut d);
    assert!(d.session().is_active());
}

#[test]
fn stop_without_session_is_harmless() {
    let mut d = decoder(&[]);
    assert_eq!(
        d.handle_programming(&BusMessage::ProgrammingStop { article: ART, address: 1 }),
        None
    );
    assert!(!d.session().is_active());
}

#[test]
fn custom_article_number() {
    let config = DecoderConfig::default()
        .with_profile(HardwareProfile::Sensor)
        .with_article_number(5031);
    let bytes = MockStore::uninitialized(18);
    let mut d = Decoder::new(config, MockOutputs::new(), MockSensor::new(0xFF), bytes);

    assert_eq!(
        d.handle_programming(&BusMessage::ProgrammingStart { article: ART, address: 1 }),
        None
    );
    assert_eq!(
        d.handle_programming(&BusMessage::ProgrammingStart { article: 5031, address: 1 }),
        Some(ProgrammingReply::Started { article: 5031, address: 1 })
    );
}

#[test]
fn unrecognised_messages_dropped() {
    let mut d = decoder(&[]);
    assert_eq!(d.handle_message(&BusMessage::Other, 0).unwrap(), MessageOutcome::Dropped);
}

// ============================================================================
// Feedback
// ============================================================================

#[test]
fn disabled_feedback_does_not_read_sensor() {
    let mut d = decoder(&[]);
    d.sensor_mut().byte = 0xFE;
    assert!(d.poll_feedback(false).unwrap().is_empty());
    assert!(d.poll_feedback(true).unwrap().is_empty());
    assert_eq!(d.sensor().reads, 0);
}

#[test]
fn change_while_disabled_reported_once_enabled() {
    let mut d = decoder(&[]);
    d.sensor_mut().byte = 0xFE;
    d.poll_feedback(false).unwrap();

    open_session(&mut d);
    d.handle_programming(&BusMessage::ProgrammingWrite { article: ART, index: 3, value: 1 });

    let reports = d.poll_feedback(false).unwrap();
    assert_eq!(
        reports.as_slice(),
        &[SwitchReport { address: 1, closed: true, thrown: false }]
    );
}

#[test]
fn several_changes_reported_in_turnout_order() {
    let mut d = decoder(&[(0, 40), (3, 1)]);
    d.sensor_mut().byte = 0b1011_1110;

    let reports = d.poll_feedback(false).unwrap();
    assert_eq!(
        reports.as_slice(),
        &[
            SwitchReport { address: 40, closed: true, thrown: false },
            SwitchReport { address: 43, closed: true, thrown: false },
        ]
    );
    assert_eq!(d.feedback().map(|f| f.snapshot()), Some(0b1011_1110));
}

#[test]
fn both_sensors_asserted() {
    let mut d = decoder(&[(3, 1)]);
    d.sensor_mut().byte = 0b1111_1100;
    let reports = d.poll_feedback(false).unwrap();
    assert_eq!(
        reports.as_slice(),
        &[SwitchReport { address: 1, closed: true, thrown: true }]
    );
    assert_eq!(wire::encode_switch_report(&reports[0]), [0x00, 0x30]);
}

#[test]
fn report_drops_address_bit_seven() {
    let report = SwitchReport {
        address: 129,
        closed: false,
        thrown: true,
    };
    let bytes = wire::encode_switch_report(&report);
    assert_eq!(bytes, [0x00, 0x10]);
    assert_eq!(wire::decode_switch_report(bytes).address, 1);

    // Addresses below 129 survive
    let report = SwitchReport { address: 128, ..report };
    assert_eq!(wire::decode_switch_report(wire::encode_switch_report(&report)), report);
}

// ============================================================================
// Hardware Faults
// ============================================================================

#[test]
fn failed_sensor_keeps_snapshot() {
    let mut d = decoder(&[(3, 1)]);
    d.sensor_mut().fail = true;
    d.sensor_mut().byte = 0x00;
    assert_eq!(d.poll_feedback(false), Err(DecoderError::Sensor(())));
    assert_eq!(d.feedback().map(|f| f.snapshot()), Some(0xFF));

    d.sensor_mut().fail = false;
    assert_eq!(d.poll_feedback(false).unwrap().len(), 4);
}

#[test]
fn failed_output_reported() {
    let mut d = decoder(&[(1, 1), (2, 100)]);
    d.outputs_mut().failing_pin = Some(2);
    assert!(matches!(
        d.handle_switch(&SwitchCommand::on(1, true), 0),
        Err(DecoderError::Output(_))
    ));
    assert!(!d.drive().any_active());
}

#[test]
fn dispatcher_survives_faults() {
    let mut d = decoder(&[(3, 1)]);
    d.sensor_mut().fail = true;
    let mut dispatcher = Dispatcher::new(d, MockBus::new(), MockClock::new());

    assert_eq!(dispatcher.startup(), 0);
    dispatcher.transport_mut().fail_sends = true;
    dispatcher.transport_mut().queue(BusMessage::ProgrammingStart { article: ART, address: 1 });

    let summary = dispatcher.poll_once();
    // Reply could not be sent, sensor could not be read
    assert_eq!(summary.faults, 2);
    assert!(dispatcher.decoder().session().is_active());

    dispatcher.transport_mut().fail_sends = false;
    dispatcher.decoder_mut().sensor_mut().fail = false;
    dispatcher.decoder_mut().sensor_mut().byte = 0xFE;
    let summary = dispatcher.poll_once();
    assert_eq!(summary.faults, 0);
    // Startup pass never completed, so every turnout is reported
    assert_eq!(summary.reports, 4);
    assert_eq!(dispatcher.poll_once().reports, 0);
}

#[test]
fn failed_startup_report_sent_after_recovery() {
    let mut d = decoder(&[(3, 1)]);
    d.sensor_mut().fail = true;
    let mut dispatcher = Dispatcher::new(d, MockBus::new(), MockClock::new());
    assert_eq!(dispatcher.startup(), 0);

    // Inputs idle, same as the initial snapshot
    dispatcher.decoder_mut().sensor_mut().fail = false;
    let summary = dispatcher.poll_once();
    assert_eq!(summary.reports, 4);
    let addresses: Vec<u16> = dispatcher
        .transport()
        .sent_reports()
        .iter()
        .map(|r| r.address)
        .collect();
    assert_eq!(addresses, vec![1, 2, 3, 4]);
}
