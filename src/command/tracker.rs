//! Outstanding-request tracking
//!
//! Each session owns one tracker holding at most one logical request toward
//! the bus. The tracker assembles fragmented replies via continuation reads
//! (`offset + received, remaining`), chains follow-up requests (version
//! probe order, long-form error logs) and renders the response lines. It is
//! purely synchronous: every operation returns a `Step` telling the session
//! what to write to the client and what to put on the bus, so the whole
//! state machine is testable without I/O.

use crate::protocol::constants::*;
use crate::protocol::records::{ErrorRecord, HolidayEntry, ScheduleEntry};
use crate::protocol::EmsMessage;

/// Version probe chain: boiler, base controller, room controller
const VERSION_PROBE_ORDER: [(u8, &str); 3] =
    [(ADDR_UBA, "UBA"), (ADDR_BC10, "BC10"), (ADDR_RC, "RC")];

/// What the session has to do after a tracker operation
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Step {
    /// Response lines for the client, in order
    pub lines: Vec<String>,
    /// Frame to hand to the dispatcher; arms the response timeout
    pub send: Option<EmsMessage>,
}

#[derive(Debug)]
struct OutstandingRequest {
    destination: u8,
    msg_type: u8,
    base_offset: u8,
    length: usize,
    buffer: Vec<u8>,
    parse_pos: usize,
}

/// Per-session request state machine
#[derive(Debug, Default)]
pub struct RequestTracker {
    outstanding: Option<OutstandingRequest>,
    waiting: bool,
    response_counter: u32,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a request or write acknowledgement is outstanding; any
    /// further command must be rejected with `ERRBUSY`
    pub fn waiting_for_response(&self) -> bool {
        self.waiting
    }

    /// Arm a fresh tracked read
    pub fn start_read(&mut self, destination: u8, msg_type: u8, offset: u8, length: usize) -> Step {
        self.arm(destination, msg_type, offset, length, true)
    }

    /// Send a write command; only the `0xff` acknowledgement releases it
    pub fn start_write(
        &mut self,
        destination: u8,
        msg_type: u8,
        offset: u8,
        payload: &[u8],
    ) -> Step {
        self.outstanding = None;
        self.waiting = true;
        Step {
            lines: Vec::new(),
            send: Some(EmsMessage::write_command(destination, msg_type, offset, payload)),
        }
    }

    /// The armed response timeout fired
    pub fn on_timeout(&mut self) -> Step {
        self.outstanding = None;
        self.waiting = false;
        Step {
            lines: vec!["ERRTIMEOUT".to_string()],
            send: None,
        }
    }

    /// Inspect a PC-directed bus frame. `None` means the frame does not
    /// belong to this session (nothing outstanding, or unrelated traffic);
    /// the armed timeout stays untouched in that case.
    pub fn on_frame(&mut self, frame: &EmsMessage) -> Option<Step> {
        if !self.waiting {
            return None;
        }

        if frame.msg_type == MSG_ACK {
            self.outstanding = None;
            self.waiting = false;
            let verdict = if frame.data.first() == Some(&ACK_FAILURE) {
                "FAIL"
            } else {
                "OK"
            };
            return Some(Step {
                lines: vec![verdict.to_string()],
                send: None,
            });
        }

        // Everything else needs an armed read; a pending write ack treats
        // other frames as unrelated traffic.
        self.outstanding.as_ref()?;
        if !is_dispatchable(frame.msg_type) {
            return None;
        }

        // The leading payload byte echoes the requested offset.
        if let Some(request) = self.outstanding.as_mut() {
            request
                .buffer
                .extend_from_slice(frame.data.get(1..).unwrap_or(&[]));
        }

        let step = match frame.msg_type {
            MSG_VERSION => self.on_version_frame(frame),
            MSG_UBA_ERRORS | MSG_UBA_ERRORS2 | MSG_RC_ERRORS | MSG_RC_ERRORS2 => {
                self.on_error_log_frame(frame)
            }
            MSG_CONTACT_INFO => self.on_contact_info_frame(frame),
            // HK schedule/holiday windows and the two WW programs
            _ => self.on_schedule_frame(),
        };
        Some(step)
    }

    fn arm(
        &mut self,
        destination: u8,
        msg_type: u8,
        offset: u8,
        length: usize,
        new_sequence: bool,
    ) -> Step {
        if new_sequence {
            self.response_counter = 0;
        }
        self.outstanding = Some(OutstandingRequest {
            destination,
            msg_type,
            base_offset: offset,
            length,
            buffer: Vec::with_capacity(length),
            parse_pos: 0,
        });
        let send = self.continue_request();
        self.waiting = send.is_some();
        Step {
            lines: Vec::new(),
            send,
        }
    }

    /// Next continuation read, or `None` once the buffer is complete
    fn continue_request(&mut self) -> Option<EmsMessage> {
        let request = self.outstanding.as_ref()?;
        if request.buffer.len() >= request.length {
            return None;
        }
        let received = request.buffer.len();
        let offset = request.base_offset.wrapping_add(received as u8);
        let remaining = (request.length - received).min(usize::from(u8::MAX)) as u8;
        Some(EmsMessage::read_request(
            request.destination,
            request.msg_type,
            offset,
            remaining,
        ))
    }

    /// Terminate the request successfully
    fn finish(&mut self, mut lines: Vec<String>) -> Step {
        self.outstanding = None;
        self.waiting = false;
        lines.push("OK".to_string());
        Step { lines, send: None }
    }

    /// Terminate the request with a bare failure line
    fn fail(&mut self, mut lines: Vec<String>) -> Step {
        self.outstanding = None;
        self.waiting = false;
        lines.push("FAIL".to_string());
        Step { lines, send: None }
    }

    fn on_version_frame(&mut self, frame: &EmsMessage) -> Step {
        let mut lines = Vec::new();
        let position = VERSION_PROBE_ORDER
            .iter()
            .position(|&(address, _)| address == frame.source);

        if let Some(index) = position {
            if frame.data.len() >= 4 {
                lines.push(format!(
                    "{} version: {}.{:02}",
                    VERSION_PROBE_ORDER[index].1, frame.data[2], frame.data[3]
                ));
            }
            if let Some(&(next, _)) = VERSION_PROBE_ORDER.get(index + 1) {
                let chained = self.arm(next, MSG_VERSION, 0, 3, true);
                return Step {
                    lines,
                    send: chained.send,
                };
            }
        }
        self.finish(lines)
    }

    fn on_error_log_frame(&mut self, frame: &EmsMessage) -> Step {
        let prefix = match frame.msg_type {
            MSG_RC_ERRORS => "S",
            MSG_UBA_ERRORS2 => "L",
            _ => "B",
        };

        let mut lines = Vec::new();
        self.drain_error_records(prefix, &mut lines);

        if let Some(send) = self.continue_request() {
            return Step { lines, send: Some(send) };
        }

        // Short-form log drained completely: chain into the long-form log,
        // keeping the response numbering.
        if frame.msg_type == MSG_UBA_ERRORS || frame.msg_type == MSG_RC_ERRORS {
            let records = if frame.msg_type == MSG_UBA_ERRORS { 5 } else { 4 };
            let chained = self.arm(
                frame.source,
                frame.msg_type + 1,
                0,
                records * ERROR_RECORD_SIZE,
                false,
            );
            return Step {
                lines,
                send: chained.send,
            };
        }
        self.finish(lines)
    }

    fn on_schedule_frame(&mut self) -> Step {
        let base_offset = self
            .outstanding
            .as_ref()
            .map(|request| request.base_offset)
            .unwrap_or(0);

        if base_offset > HOLIDAY_OFFSET_THRESHOLD {
            return self.on_holiday_reply();
        }

        let mut lines = Vec::new();
        let exhausted = self.drain_schedule_entries(&mut lines);
        if !exhausted {
            if let Some(send) = self.continue_request() {
                return Step { lines, send: Some(send) };
            }
        }
        self.finish(lines)
    }

    /// A holiday/vacation window reply is a begin/end date pair
    fn on_holiday_reply(&mut self) -> Step {
        let pair = {
            let buffer = self
                .outstanding
                .as_ref()
                .map(|request| request.buffer.as_slice())
                .unwrap_or(&[]);
            (
                HolidayEntry::decode(buffer),
                HolidayEntry::decode(buffer.get(HOLIDAY_ENTRY_SIZE..).unwrap_or(&[])),
            )
        };

        match pair {
            (Some(begin), Some(end)) => {
                let lines = vec![begin.render("BEGIN"), end.render("END")];
                self.finish(lines)
            }
            _ => self.fail(Vec::new()),
        }
    }

    fn on_contact_info_frame(&mut self, frame: &EmsMessage) -> Step {
        // A reply carrying only the echoed offset means the peer does not
        // support contact info (the RC30 answers empty); stop asking.
        if frame.data.len() > 1 {
            if let Some(send) = self.continue_request() {
                return Step {
                    lines: Vec::new(),
                    send: Some(send),
                };
            }
        }

        let buffer = self
            .outstanding
            .take()
            .map(|request| request.buffer)
            .unwrap_or_default();
        let lines = buffer
            .chunks(CONTACT_INFO_WIDTH)
            .map(|chunk| {
                let end = chunk.iter().position(|&b| b == 0).unwrap_or(chunk.len());
                String::from_utf8_lossy(&chunk[..end]).into_owned()
            })
            .collect();
        self.finish(lines)
    }

    /// Emit numbered lines for every complete error record; empty slots
    /// advance the counter without producing a line
    fn drain_error_records(&mut self, prefix: &str, lines: &mut Vec<String>) {
        let RequestTracker {
            outstanding,
            response_counter,
            ..
        } = self;
        let Some(request) = outstanding.as_mut() else {
            return;
        };
        while request.parse_pos + ERROR_RECORD_SIZE <= request.buffer.len() {
            let record = ErrorRecord::decode(&request.buffer[request.parse_pos..]);
            request.parse_pos += ERROR_RECORD_SIZE;
            *response_counter += 1;
            if let Some(body) = record.and_then(|r| r.render()) {
                lines.push(format!("{}{:02} {}", prefix, response_counter, body));
            }
        }
    }

    /// Emit numbered lines for complete switching points. Returns true when
    /// an unset slot was hit, which ends the programmed part of the week.
    fn drain_schedule_entries(&mut self, lines: &mut Vec<String>) -> bool {
        let RequestTracker {
            outstanding,
            response_counter,
            ..
        } = self;
        let Some(request) = outstanding.as_mut() else {
            return false;
        };
        while request.parse_pos + SCHEDULE_ENTRY_SIZE <= request.buffer.len() {
            let entry = ScheduleEntry::decode(&request.buffer[request.parse_pos..]);
            request.parse_pos += SCHEDULE_ENTRY_SIZE;
            *response_counter += 1;
            match entry.and_then(|e| e.render()) {
                Some(body) => lines.push(format!("{:02} {}", response_counter, body)),
                None => return true,
            }
        }
        false
    }
}

fn is_dispatchable(msg_type: u8) -> bool {
    matches!(
        msg_type,
        MSG_VERSION
            | MSG_UBA_ERRORS
            | MSG_UBA_ERRORS2
            | MSG_RC_ERRORS
            | MSG_RC_ERRORS2
            | MSG_WW_SCHEDULE
            | MSG_ZIRKPUMP_SCHEDULE
            | MSG_CONTACT_INFO
    ) || HK_TYPES.iter().any(|&hk| hk + 2 == msg_type)
}
