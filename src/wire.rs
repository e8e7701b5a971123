//! Bit-field encoding of the two-byte LocoNet switch payloads.
//!
//! Switch requests (`OPC_SW_REQ`) and switch reports (`OPC_SW_REP`) carry
//! an accessory address and a few flags packed into two 7-bit data bytes.
//! Addresses on the wire are 0-based; the decoder works with 1-based
//! accessory addresses.
//!
//! # Switch Request (`OPC_SW_REQ`)
//!
//! ```text
//! sw1:  0 a6 a5 a4 a3 a2 a1 a0     address bits 0..=6
//! sw2:  0  0  D  O a10 a9 a8 a7    D = direction (closed), O = output on
//! ```
//!
//! # Switch Report (`OPC_SW_REP`)
//!
//! ```text
//! low:  0 a6 a5 a4 a3 a2 a1 a0     address bits 0..=6
//! high: 0  0  C  T a11 a10 a9 a8   C = closed sensor, T = thrown sensor
//! ```
//!
//! The report high byte carries address bits 8..=11, so address bit 7 is not
//! transmitted. Decoders on one bus stay below that range in practice.
//!
//! # Example
//!
//! ```rust
//! use turnout_decoder::messages::SwitchReport;
//! use turnout_decoder::wire::{encode_switch_report, decode_switch_report};
//!
//! let report = SwitchReport { address: 5, closed: true, thrown: false };
//! let bytes = encode_switch_report(&report);
//! assert_eq!(bytes, [0x04, 0x20]);
//! assert_eq!(decode_switch_report(bytes), report);
//! ```

use crate::messages::{SwitchCommand, SwitchReport};

/// Switch request opcode.
pub const OPC_SW_REQ: u8 = 0xB0;

/// Switch report opcode.
pub const OPC_SW_REP: u8 = 0xB1;

/// Report high byte: closed-end sensor asserted.
pub const REPORT_CLOSED: u8 = 0x20;

/// Report high byte: thrown-end sensor asserted.
pub const REPORT_THROWN: u8 = 0x10;

/// Request `sw2`: direction bit (set = closed).
pub const REQUEST_DIRECTION: u8 = 0x20;

/// Request `sw2`: output-on bit. Its value is the `OUTPUT_ON` code.
pub const REQUEST_OUTPUT: u8 = 0x10;

const LOW_ADDRESS_MASK: u16 = 0x7F;
const HIGH_ADDRESS_MASK: u8 = 0x0F;

/// Encode a report as `[addr_low, addr_high]`.
pub fn encode_switch_report(report: &SwitchReport) -> [u8; 2] {
    let wire = report.address.wrapping_sub(1);
    let low = (wire & LOW_ADDRESS_MASK) as u8;
    let mut high = ((wire >> 8) as u8) & HIGH_ADDRESS_MASK;
    if report.closed {
        high |= REPORT_CLOSED;
    }
    if report.thrown {
        high |= REPORT_THROWN;
    }
    [low, high]
}

/// Decode `[addr_low, addr_high]` back into a report.
pub fn decode_switch_report(bytes: [u8; 2]) -> SwitchReport {
    let [low, high] = bytes;
    let wire = u16::from(low) & LOW_ADDRESS_MASK | u16::from(high & HIGH_ADDRESS_MASK) << 8;
    SwitchReport {
        address: wire.wrapping_add(1),
        closed: high & REPORT_CLOSED != 0,
        thrown: high & REPORT_THROWN != 0,
    }
}

/// Decode the `sw1`/`sw2` bytes of a switch request.
pub fn decode_switch_request(sw1: u8, sw2: u8) -> SwitchCommand {
    let wire = u16::from(sw1 & 0x7F) | u16::from(sw2 & HIGH_ADDRESS_MASK) << 7;
    SwitchCommand {
        address: wire + 1,
        output: sw2 & REQUEST_OUTPUT,
        direction: sw2 & REQUEST_DIRECTION != 0,
    }
}

/// Encode a switch request as `[sw1, sw2]`.
pub fn encode_switch_request(cmd: &SwitchCommand) -> [u8; 2] {
    let wire = cmd.address.wrapping_sub(1);
    let sw1 = (wire & LOW_ADDRESS_MASK) as u8;
    let mut sw2 = ((wire >> 7) as u8) & HIGH_ADDRESS_MASK;
    if cmd.is_output_on() {
        sw2 |= REQUEST_OUTPUT;
    }
    if cmd.direction {
        sw2 |= REQUEST_DIRECTION;
    }
    [sw1, sw2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::OUTPUT_ON;

    #[test]
    fn report_closed_sets_bit5_only() {
        let bytes = encode_switch_report(&SwitchReport {
            address: 100,
            closed: true,
            thrown: false,
        });
        assert_eq!(bytes[0], 99);
        assert_eq!(bytes[1] & REPORT_CLOSED, REPORT_CLOSED);
        assert_eq!(bytes[1] & REPORT_THROWN, 0);
    }

    #[test]
    fn report_thrown_sets_bit4_only() {
        let bytes = encode_switch_report(&SwitchReport {
            address: 1,
            closed: false,
            thrown: true,
        });
        assert_eq!(bytes, [0x00, 0x10]);
    }

    #[test]
    fn report_high_address_bits() {
        // wire 0x305: low byte keeps bits 0..=6, high byte bits 8..=11.
        let bytes = encode_switch_report(&SwitchReport {
            address: 0x306,
            closed: false,
            thrown: false,
        });
        assert_eq!(bytes, [0x05, 0x03]);
        assert_eq!(decode_switch_report(bytes).address, 0x306);
    }

    #[test]
    fn report_drops_address_bit7() {
        let bytes = encode_switch_report(&SwitchReport {
            address: 0x81,
            closed: false,
            thrown: false,
        });
        assert_eq!(bytes, [0x00, 0x00]);
    }

    #[test]
    fn report_data_bytes_stay_seven_bit() {
        let bytes = encode_switch_report(&SwitchReport {
            address: 0x0FFF,
            closed: true,
            thrown: true,
        });
        assert!(bytes[0] < 0x80);
        assert!(bytes[1] < 0x80);
    }

    #[test]
    fn request_decodes_address_and_flags() {
        // Address 200 -> wire 199 = 0b1_1000111
        let cmd = decode_switch_request(0x47, 0x01 | REQUEST_OUTPUT | REQUEST_DIRECTION);
        assert_eq!(cmd.address, 200);
        assert_eq!(cmd.output, OUTPUT_ON);
        assert!(cmd.direction);
    }

    #[test]
    fn request_output_off() {
        let cmd = decode_switch_request(0x00, 0x00);
        assert_eq!(cmd.address, 1);
        assert_eq!(cmd.output, 0);
        assert!(!cmd.direction);
    }

    #[test]
    fn request_encode_matches_decode() {
        let cmd = SwitchCommand::on(1500, false);
        let [sw1, sw2] = encode_switch_request(&cmd);
        assert_eq!(decode_switch_request(sw1, sw2), cmd);
    }
}
