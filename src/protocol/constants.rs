//! EMS bus constants
//!
//! Peer addresses, message type opcodes and record geometry as used by the
//! UBA/RC/BC10 generation of EMS peripherals.

use std::time::Duration;

// ============================================================================
// Peer addresses
// ============================================================================

/// Universal burner automation (the boiler controller)
pub const ADDR_UBA: u8 = 0x08;
/// BC10 base controller
pub const ADDR_BC10: u8 = 0x09;
/// The bridge itself; conventional source address for frames we originate
pub const ADDR_PC: u8 = 0x0b;
/// Room controller (RC30/RC35)
pub const ADDR_RC: u8 = 0x10;

/// Destination-byte flag on the wire marking that a response is expected
pub const RESPONSE_FLAG: u8 = 0x80;

// ============================================================================
// Message types
// ============================================================================

/// Firmware version query
pub const MSG_VERSION: u8 = 0x02;
/// UBA error log (chains into `MSG_UBA_ERRORS2`)
pub const MSG_UBA_ERRORS: u8 = 0x10;
pub const MSG_UBA_ERRORS2: u8 = 0x11;
/// RC error log (chains into `MSG_RC_ERRORS2`)
pub const MSG_RC_ERRORS: u8 = 0x12;
pub const MSG_RC_ERRORS2: u8 = 0x13;
/// UBA operating parameters (hysteresis, pump settings)
pub const MSG_UBA_PARAMETERS: u8 = 0x16;
/// UBA hot-water parameters (setpoint, circulation count)
pub const MSG_WW_PARAMETERS: u8 = 0x33;
/// UBA one-time hot-water load control
pub const MSG_WW_LOAD: u8 = 0x35;
/// RC hot-water operation settings (modes, thermal desinfection)
pub const MSG_WW_OPERATION: u8 = 0x37;
/// RC hot-water switching program
pub const MSG_WW_SCHEDULE: u8 = 0x38;
/// RC circulation-pump switching program
pub const MSG_ZIRKPUMP_SCHEDULE: u8 = 0x39;
/// RC installer contact info text block
pub const MSG_CONTACT_INFO: u8 = 0xa4;
/// Command acknowledgement; first payload byte carries success/failure
pub const MSG_ACK: u8 = 0xff;

/// First payload byte of a `MSG_ACK` frame signalling failure
pub const ACK_FAILURE: u8 = 0x04;

/// Heating-circuit parameter message types (HK1..HK4); the matching
/// schedule/holiday message type is `hk_type + 2`.
pub const HK_TYPES: [u8; 4] = [61, 71, 81, 91];

// ============================================================================
// Record geometry
// ============================================================================

/// One switching point: `[on, day, time]`
pub const SCHEDULE_ENTRY_SIZE: usize = 3;
/// One holiday boundary date: `[year - 2000, month, day]`
pub const HOLIDAY_ENTRY_SIZE: usize = 3;
/// One error-log slot, see `records::ErrorRecord` for the layout
pub const ERROR_RECORD_SIZE: usize = 12;

/// A week program holds up to 42 switching points
pub const MAX_SCHEDULE_ENTRIES: usize = 42;
/// Contact info is rendered in fixed-width 21-byte lines
pub const CONTACT_INFO_WIDTH: usize = 21;

/// Schedule read offsets above this carry holiday/vacation date pairs
pub const HOLIDAY_OFFSET_THRESHOLD: u8 = 80;

// ============================================================================
// Timing
// ============================================================================

/// Minimum spacing between consecutive requests to the same peer; the bus is
/// half-duplex and peers drop back-to-back traffic
pub const MIN_REQUEST_GAP: Duration = Duration::from_millis(100);

/// How long to wait for a peer to answer an outstanding request
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Receive watchdog on the bus link; the bus chatters constantly, so a quiet
/// link means the tunnel or adapter died
pub const LINK_WATCHDOG: Duration = Duration::from_secs(120);
