//! Parsed EMS messages and their tunnel representation
//!
//! The bridge works on already-parsed telegrams. On the tunnel each telegram
//! travels as `[src, dst, type, payload...]` where the destination byte has
//! bit 7 set when the sender expects a response; CRC and bus-level framing
//! are the adapter's job.

use super::constants::*;
use crate::utils::{BridgeError, Result};

/// One parsed EMS telegram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmsMessage {
    pub source: u8,
    pub destination: u8,
    pub msg_type: u8,
    /// Payload; on the send path `data[0]` is the register offset and for
    /// reads `data[1]` is the requested length
    pub data: Vec<u8>,
    pub expect_response: bool,
}

impl EmsMessage {
    /// Build a write command originated by the bridge
    pub fn write_command(destination: u8, msg_type: u8, offset: u8, payload: &[u8]) -> Self {
        let mut data = Vec::with_capacity(payload.len() + 1);
        data.push(offset);
        data.extend_from_slice(payload);
        Self {
            source: ADDR_PC,
            destination,
            msg_type,
            data,
            expect_response: true,
        }
    }

    /// Build a read request for `length` bytes starting at `offset`
    pub fn read_request(destination: u8, msg_type: u8, offset: u8, length: u8) -> Self {
        Self {
            source: ADDR_PC,
            destination,
            msg_type,
            data: vec![offset, length],
            expect_response: true,
        }
    }

    /// Well-known peer name, if any
    pub fn peer_name(address: u8) -> Option<&'static str> {
        match address {
            ADDR_UBA => Some("UBA"),
            ADDR_BC10 => Some("BC10"),
            ADDR_RC => Some("RC"),
            ADDR_PC => Some("PC"),
            _ => None,
        }
    }

    /// Encode for the tunnel (without the length prefix the link adds)
    pub fn to_wire(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() + 3);
        let dest = if self.expect_response {
            self.destination | RESPONSE_FLAG
        } else {
            self.destination
        };
        bytes.push(self.source);
        bytes.push(dest);
        bytes.push(self.msg_type);
        bytes.extend_from_slice(&self.data);
        bytes
    }

    /// Decode a tunnel telegram
    pub fn from_wire(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 3 {
            return Err(BridgeError::protocol(format!(
                "Telegram too short: {} bytes",
                bytes.len()
            )));
        }
        Ok(Self {
            source: bytes[0],
            destination: bytes[1] & !RESPONSE_FLAG,
            msg_type: bytes[2],
            data: bytes[3..].to_vec(),
            expect_response: bytes[1] & RESPONSE_FLAG != 0,
        })
    }
}
