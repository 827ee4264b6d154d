//! Bus-format records carried inside EMS payloads
//!
//! Switching points, holiday date pairs and error-log slots all travel as
//! fixed-size records. Decoding is infallible once enough bytes are present;
//! rendering returns `None` for empty/unset slots, which terminates the
//! enumeration of a record run.

use super::constants::*;

/// Two-letter day abbreviations in bus day order (Monday first)
pub const DAY_NAMES: [&str; 7] = ["MO", "TU", "WE", "TH", "FR", "SA", "SU"];

/// One switching point of a week program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// 1 = on, 0 = off; 7 marks an unset slot
    pub on: u8,
    /// Two times the day index (Monday = 0)
    pub day: u8,
    /// Minutes since midnight divided by ten; `>= 0x90` marks an unset slot
    pub time: u8,
}

impl ScheduleEntry {
    /// The record a peer recognises as "slot not programmed"
    pub const UNSET: ScheduleEntry = ScheduleEntry {
        on: 7,
        day: 0x0e,
        time: 0x90,
    };

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < SCHEDULE_ENTRY_SIZE {
            return None;
        }
        Some(Self {
            on: bytes[0],
            day: bytes[1],
            time: bytes[2],
        })
    }

    pub fn encode(&self) -> [u8; SCHEDULE_ENTRY_SIZE] {
        [self.on, self.day, self.time]
    }

    pub fn is_unset(&self) -> bool {
        self.time >= 0x90
    }

    /// Render as `DAY HH:MM ON|OFF`; `None` for unset slots
    pub fn render(&self) -> Option<String> {
        if self.is_unset() {
            return None;
        }
        let day = DAY_NAMES.get((self.day / 2) as usize)?;
        let minutes = u32::from(self.time) * 10;
        Some(format!(
            "{} {:02}:{:02} {}",
            day,
            minutes / 60,
            minutes % 60,
            if self.on != 0 { "ON" } else { "OFF" }
        ))
    }
}

/// One boundary date of a holiday/vacation range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HolidayEntry {
    /// Offset from year 2000
    pub year: u8,
    pub month: u8,
    pub day: u8,
}

impl HolidayEntry {
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HOLIDAY_ENTRY_SIZE {
            return None;
        }
        Some(Self {
            year: bytes[0],
            month: bytes[1],
            day: bytes[2],
        })
    }

    pub fn encode(&self) -> [u8; HOLIDAY_ENTRY_SIZE] {
        [self.year, self.month, self.day]
    }

    /// Render as `<label> DD-MM-YYYY`
    pub fn render(&self, label: &str) -> String {
        format!(
            "{} {:02}-{:02}-{:04}",
            label,
            self.day,
            self.month,
            2000 + u32::from(self.year)
        )
    }
}

/// One error-log slot
///
/// Wire layout (12 bytes): `[ascii0, ascii1, code_hi, code_lo, flags_year,
/// month, hour, day, minute, dur_hi, dur_lo, source]`. Bit 7 of `flags_year`
/// marks a valid date, the low bits are the year offset from 2000. A zero
/// first display character means the slot is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorRecord {
    pub display_code: [u8; 2],
    pub code: u16,
    pub has_date: bool,
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub duration_minutes: u16,
    pub source: u8,
}

impl ErrorRecord {
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < ERROR_RECORD_SIZE {
            return None;
        }
        Some(Self {
            display_code: [bytes[0], bytes[1]],
            code: u16::from_be_bytes([bytes[2], bytes[3]]),
            has_date: bytes[4] & 0x80 != 0,
            year: bytes[4] & 0x7f,
            month: bytes[5],
            hour: bytes[6],
            day: bytes[7],
            minute: bytes[8],
            duration_minutes: u16::from_be_bytes([bytes[9], bytes[10]]),
            source: bytes[11],
        })
    }

    pub fn is_empty(&self) -> bool {
        self.display_code[0] == 0
    }

    /// Render as `YYYY-MM-DD HH:MM <src> <AA> <code> <duration>`; the date
    /// part is literal `xxxx-xx-xx xx:xx` when the peer recorded none
    pub fn render(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let when = if self.has_date {
            format!(
                "{:04}-{:02}-{:02} {:02}:{:02}",
                2000 + u32::from(self.year),
                self.month,
                self.day,
                self.hour,
                self.minute
            )
        } else {
            "xxxx-xx-xx xx:xx".to_string()
        };
        Some(format!(
            "{} {:x} {}{} {} {}",
            when,
            self.source,
            self.display_code[0] as char,
            self.display_code[1] as char,
            self.code,
            self.duration_minutes
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_entry_renders_day_and_time() {
        let entry = ScheduleEntry {
            on: 1,
            day: 0,
            time: 39,
        };
        assert_eq!(entry.render().unwrap(), "MO 06:30 ON");

        let entry = ScheduleEntry {
            on: 0,
            day: 12,
            time: 138,
        };
        assert_eq!(entry.render().unwrap(), "SU 23:00 OFF");
    }

    #[test]
    fn unset_schedule_entry_renders_nothing() {
        assert!(ScheduleEntry::UNSET.render().is_none());
        assert!(ScheduleEntry::UNSET.is_unset());
        assert_eq!(ScheduleEntry::UNSET.encode(), [7, 0x0e, 0x90]);
    }

    #[test]
    fn schedule_entry_roundtrip() {
        let entry = ScheduleEntry {
            on: 1,
            day: 8,
            time: 100,
        };
        assert_eq!(ScheduleEntry::decode(&entry.encode()), Some(entry));
    }

    #[test]
    fn holiday_entry_roundtrip_and_render() {
        let entry = HolidayEntry {
            year: 25,
            month: 5,
            day: 2,
        };
        assert_eq!(HolidayEntry::decode(&entry.encode()), Some(entry));
        assert_eq!(entry.render("BEGIN"), "BEGIN 02-05-2025");
    }

    #[test]
    fn holiday_entries_order_by_date() {
        let a = HolidayEntry {
            year: 25,
            month: 5,
            day: 1,
        };
        let b = HolidayEntry {
            year: 25,
            month: 5,
            day: 2,
        };
        let c = HolidayEntry {
            year: 26,
            month: 1,
            day: 1,
        };
        assert!(a < b && b < c);
    }

    #[test]
    fn error_record_with_date() {
        let bytes = [
            b'A', b'0', 0x01, 0x2c, 0x80 | 24, 12, 18, 24, 30, 0x00, 0x2a, 0x08,
        ];
        let record = ErrorRecord::decode(&bytes).unwrap();
        assert_eq!(
            record.render().unwrap(),
            "2024-12-24 18:30 8 A0 300 42"
        );
    }

    #[test]
    fn error_record_without_date() {
        let bytes = [b'C', b'4', 0x00, 0x05, 23, 0, 0, 0, 0, 0x00, 0x00, 0x10];
        let record = ErrorRecord::decode(&bytes).unwrap();
        assert_eq!(record.render().unwrap(), "xxxx-xx-xx xx:xx 10 C4 5 0");
    }

    #[test]
    fn empty_error_slot_renders_nothing() {
        let bytes = [0u8; ERROR_RECORD_SIZE];
        let record = ErrorRecord::decode(&bytes).unwrap();
        assert!(record.is_empty());
        assert!(record.render().is_none());
    }
}
