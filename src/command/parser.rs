//! Operator command grammar
//!
//! Translates one whitespace-tokenized command line into a typed action:
//! a bus read, a bus write, or an informational text reply. All argument
//! validation happens here; the session maps `CommandError` onto the
//! `ERRCMD`/`ERRARGS` wire responses.

use crate::protocol::constants::*;
use crate::protocol::records::{HolidayEntry, ScheduleEntry, DAY_NAMES};

/// What a parsed command asks the session to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    /// Arm a tracked read of `length` bytes from a peer register window
    Read {
        destination: u8,
        msg_type: u8,
        offset: u8,
        length: usize,
    },
    /// Send a write command and await the acknowledgement
    Write {
        destination: u8,
        msg_type: u8,
        offset: u8,
        payload: Vec<u8>,
    },
    /// Reply with fixed text (help output)
    Info(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown category or subcommand
    UnknownCommand,
    /// Missing, malformed or out-of-range argument
    InvalidArgs,
}

type ParseResult = Result<CommandAction, CommandError>;

const TOP_HELP: &str = "Available commands (help with '<command> help'):\n\
                        hk[1|2|3|4]\n\
                        ww\n\
                        uba\n\
                        rc\n\
                        getversion";

const HK_HELP: &str = "Available subcommands:\n\
                       mode [day|night|auto]\n\
                       daytemperature <temp>\n\
                       nighttemperature <temp>\n\
                       holidaytemperature <temp>\n\
                       getholiday\n\
                       holidaymode <start:YYYY-MM-DD> <end:YYYY-MM-DD>\n\
                       getvacation\n\
                       vacationmode <start:YYYY-MM-DD> <end:YYYY-MM-DD>\n\
                       partymode <hours>\n\
                       getschedule\n\
                       schedule <index> unset\n\
                       schedule <index> [MO|TU|WE|TH|FR|SA|SU] HH:MM [ON|OFF]";

const WW_HELP: &str = "Available subcommands:\n\
                       mode [on|off|auto]\n\
                       temperature <temp>\n\
                       limittemperature <temp>\n\
                       loadonce\n\
                       cancelload\n\
                       getschedule\n\
                       schedule <index> unset\n\
                       schedule <index> [MO|TU|WE|TH|FR|SA|SU] HH:MM [ON|OFF]\n\
                       selectschedule [custom|hk]\n\
                       showloadindicator [on|off]\n\
                       thermdesinfect mode [on|off]\n\
                       thermdesinfect day [monday|...|sunday|everyday]\n\
                       thermdesinfect hour <hour>\n\
                       thermdesinfect temperature <temp>\n\
                       zirkpump mode [on|off|auto]\n\
                       zirkpump count [1|2|3|4|5|6|alwayson]\n\
                       zirkpump getschedule\n\
                       zirkpump schedule <index> unset\n\
                       zirkpump schedule <index> [MO|TU|WE|TH|FR|SA|SU] HH:MM [ON|OFF]\n\
                       zirkpump selectschedule [custom|hk]";

const RC_HELP: &str = "Available subcommands:\n\
                       geterrors\n\
                       getcontactinfo\n\
                       setcontactinfo [1|2] <text>";

const UBA_HELP: &str = "Available subcommands:\n\
                        antipendel <minutes>\n\
                        hyst [on|off] <kelvin>\n\
                        pumpmodulation <minpercent> <maxpercent>\n\
                        pumpdelay <minutes>\n\
                        geterrors";

/// Parse one command line
pub fn parse(line: &str) -> ParseResult {
    let mut tokens = line.split_whitespace();
    let category = tokens.next().ok_or(CommandError::UnknownCommand)?;

    match category {
        "help" => Ok(CommandAction::Info(TOP_HELP)),
        "hk1" => parse_hk(&mut tokens, HK_TYPES[0]),
        "hk2" => parse_hk(&mut tokens, HK_TYPES[1]),
        "hk3" => parse_hk(&mut tokens, HK_TYPES[2]),
        "hk4" => parse_hk(&mut tokens, HK_TYPES[3]),
        "ww" => parse_ww(&mut tokens),
        "rc" => parse_rc(&mut tokens),
        "uba" => parse_uba(&mut tokens),
        "getversion" => Ok(CommandAction::Read {
            destination: ADDR_UBA,
            msg_type: MSG_VERSION,
            offset: 0,
            length: 3,
        }),
        _ => Err(CommandError::UnknownCommand),
    }
}

fn parse_hk<'a, I: Iterator<Item = &'a str>>(tokens: &mut I, hk_type: u8) -> ParseResult {
    let schedule_type = hk_type + 2;
    match tokens.next().ok_or(CommandError::UnknownCommand)? {
        "help" => Ok(CommandAction::Info(HK_HELP)),
        "mode" => {
            let data = match tokens.next().ok_or(CommandError::InvalidArgs)? {
                "day" => 0x01,
                "night" => 0x00,
                "auto" => 0x02,
                _ => return Err(CommandError::InvalidArgs),
            };
            Ok(write_rc(hk_type, 7, vec![data]))
        }
        "daytemperature" => parse_hk_temperature(tokens, hk_type, 2),
        "nighttemperature" => parse_hk_temperature(tokens, hk_type, 1),
        "holidaytemperature" => parse_hk_temperature(tokens, hk_type, 3),
        "holidaymode" => parse_set_holiday(tokens, schedule_type, 93),
        "vacationmode" => parse_set_holiday(tokens, schedule_type, 87),
        "partymode" => {
            let hours = int_arg(tokens.next(), 99)?;
            Ok(write_rc(hk_type, 86, vec![hours]))
        }
        "schedule" => parse_schedule_write(tokens, schedule_type),
        "getschedule" => Ok(read_rc(
            schedule_type,
            0,
            MAX_SCHEDULE_ENTRIES * SCHEDULE_ENTRY_SIZE,
        )),
        "getvacation" => Ok(read_rc(schedule_type, 87, 2 * HOLIDAY_ENTRY_SIZE)),
        "getholiday" => Ok(read_rc(schedule_type, 93, 2 * HOLIDAY_ENTRY_SIZE)),
        _ => Err(CommandError::UnknownCommand),
    }
}

fn parse_ww<'a, I: Iterator<Item = &'a str>>(tokens: &mut I) -> ParseResult {
    match tokens.next().ok_or(CommandError::UnknownCommand)? {
        "help" => Ok(CommandAction::Info(WW_HELP)),
        "thermdesinfect" => parse_thermdesinfect(tokens),
        "zirkpump" => parse_zirkpump(tokens),
        "mode" => {
            let data = on_off_auto(tokens.next())?;
            Ok(write_rc(MSG_WW_OPERATION, 2, vec![data]))
        }
        "temperature" => {
            let temperature = int_arg(tokens.next(), 80)?;
            if temperature < 30 {
                return Err(CommandError::InvalidArgs);
            }
            Ok(write_uba(MSG_WW_PARAMETERS, 2, vec![temperature]))
        }
        "limittemperature" => {
            let temperature = int_arg(tokens.next(), 80)?;
            if temperature < 30 {
                return Err(CommandError::InvalidArgs);
            }
            Ok(write_rc(MSG_WW_OPERATION, 8, vec![temperature]))
        }
        "loadonce" => Ok(write_uba(MSG_WW_LOAD, 0, vec![35])),
        "cancelload" => Ok(write_uba(MSG_WW_LOAD, 0, vec![3])),
        "showloadindicator" => {
            let data = match tokens.next().ok_or(CommandError::InvalidArgs)? {
                "on" => 0xff,
                "off" => 0x00,
                _ => return Err(CommandError::InvalidArgs),
            };
            Ok(write_rc(MSG_WW_OPERATION, 9, vec![data]))
        }
        "getschedule" => Ok(read_rc(
            MSG_WW_SCHEDULE,
            0,
            MAX_SCHEDULE_ENTRIES * SCHEDULE_ENTRY_SIZE,
        )),
        "schedule" => parse_schedule_write(tokens, MSG_WW_SCHEDULE),
        "selectschedule" => {
            let data = custom_or_hk(tokens.next())?;
            Ok(write_rc(MSG_WW_OPERATION, 0, vec![data]))
        }
        _ => Err(CommandError::UnknownCommand),
    }
}

fn parse_thermdesinfect<'a, I: Iterator<Item = &'a str>>(tokens: &mut I) -> ParseResult {
    match tokens.next().ok_or(CommandError::UnknownCommand)? {
        "mode" => {
            let data = match tokens.next().ok_or(CommandError::InvalidArgs)? {
                "on" => 0xff,
                "off" => 0x00,
                _ => return Err(CommandError::InvalidArgs),
            };
            Ok(write_rc(MSG_WW_OPERATION, 4, vec![data]))
        }
        "day" => {
            let data = match tokens.next().ok_or(CommandError::InvalidArgs)? {
                "monday" => 0x00,
                "tuesday" => 0x01,
                "wednesday" => 0x02,
                "thursday" => 0x03,
                "friday" => 0x04,
                "saturday" => 0x05,
                "sunday" => 0x06,
                "everyday" => 0x07,
                _ => return Err(CommandError::InvalidArgs),
            };
            Ok(write_rc(MSG_WW_OPERATION, 5, vec![data]))
        }
        "hour" => {
            let hour = int_arg(tokens.next(), 23)?;
            Ok(write_rc(MSG_WW_OPERATION, 6, vec![hour]))
        }
        "temperature" => {
            let temperature = int_arg(tokens.next(), 80)?;
            if temperature < 60 {
                return Err(CommandError::InvalidArgs);
            }
            Ok(write_uba(MSG_WW_PARAMETERS, 8, vec![temperature]))
        }
        _ => Err(CommandError::UnknownCommand),
    }
}

fn parse_zirkpump<'a, I: Iterator<Item = &'a str>>(tokens: &mut I) -> ParseResult {
    match tokens.next().ok_or(CommandError::UnknownCommand)? {
        "mode" => {
            let data = on_off_auto(tokens.next())?;
            Ok(write_rc(MSG_WW_OPERATION, 3, vec![data]))
        }
        "count" => {
            let count = match tokens.next().ok_or(CommandError::InvalidArgs)? {
                "alwayson" => 0x07,
                token => {
                    let count = token.parse::<u8>().map_err(|_| CommandError::InvalidArgs)?;
                    if !(1..=6).contains(&count) {
                        return Err(CommandError::InvalidArgs);
                    }
                    count
                }
            };
            Ok(write_uba(MSG_WW_PARAMETERS, 7, vec![count]))
        }
        "getschedule" => Ok(read_rc(
            MSG_ZIRKPUMP_SCHEDULE,
            0,
            MAX_SCHEDULE_ENTRIES * SCHEDULE_ENTRY_SIZE,
        )),
        "schedule" => parse_schedule_write(tokens, MSG_ZIRKPUMP_SCHEDULE),
        "selectschedule" => {
            let data = custom_or_hk(tokens.next())?;
            Ok(write_rc(MSG_WW_OPERATION, 1, vec![data]))
        }
        _ => Err(CommandError::UnknownCommand),
    }
}

fn parse_rc<'a, I: Iterator<Item = &'a str>>(tokens: &mut I) -> ParseResult {
    match tokens.next().ok_or(CommandError::UnknownCommand)? {
        "help" => Ok(CommandAction::Info(RC_HELP)),
        "geterrors" => Ok(read_rc(MSG_RC_ERRORS, 0, 4 * ERROR_RECORD_SIZE)),
        "getcontactinfo" => Ok(read_rc(MSG_CONTACT_INFO, 0, 2 * CONTACT_INFO_WIDTH)),
        "setcontactinfo" => {
            let line = int_arg(tokens.next(), 2)?;
            if line < 1 {
                return Err(CommandError::InvalidArgs);
            }
            let mut payload = tokens.collect::<Vec<_>>().join(" ").into_bytes();
            payload.truncate(CONTACT_INFO_WIDTH);
            payload.resize(CONTACT_INFO_WIDTH, b' ');
            Ok(write_rc(MSG_CONTACT_INFO, line, payload))
        }
        _ => Err(CommandError::UnknownCommand),
    }
}

fn parse_uba<'a, I: Iterator<Item = &'a str>>(tokens: &mut I) -> ParseResult {
    match tokens.next().ok_or(CommandError::UnknownCommand)? {
        "help" => Ok(CommandAction::Info(UBA_HELP)),
        "geterrors" => Ok(CommandAction::Read {
            destination: ADDR_UBA,
            msg_type: MSG_UBA_ERRORS,
            offset: 0,
            length: 8 * ERROR_RECORD_SIZE,
        }),
        "antipendel" => {
            let minutes = int_arg(tokens.next(), 120)?;
            Ok(write_uba(MSG_UBA_PARAMETERS, 6, vec![minutes]))
        }
        "hyst" => {
            let offset = match tokens.next().ok_or(CommandError::InvalidArgs)? {
                "on" => 5,
                "off" => 4,
                _ => return Err(CommandError::InvalidArgs),
            };
            let kelvin = int_arg(tokens.next(), 20)?;
            Ok(write_uba(MSG_UBA_PARAMETERS, offset, vec![kelvin]))
        }
        "pumpmodulation" => {
            let min = int_arg(tokens.next(), 100)?;
            let max = int_arg(tokens.next(), 100)?;
            if min > max {
                return Err(CommandError::InvalidArgs);
            }
            Ok(write_uba(MSG_UBA_PARAMETERS, 9, vec![max, min]))
        }
        "pumpdelay" => {
            let minutes = int_arg(tokens.next(), 120)?;
            Ok(write_uba(MSG_UBA_PARAMETERS, 8, vec![minutes]))
        }
        _ => Err(CommandError::UnknownCommand),
    }
}

/// Setpoints are transported as half-degree steps; valid range 10.0..=30.0 °C
fn parse_hk_temperature<'a, I: Iterator<Item = &'a str>>(
    tokens: &mut I,
    hk_type: u8,
    offset: u8,
) -> ParseResult {
    let value: f32 = tokens
        .next()
        .ok_or(CommandError::InvalidArgs)?
        .parse()
        .map_err(|_| CommandError::InvalidArgs)?;
    let scaled = (value * 2.0).round();
    if !scaled.is_finite() || !(20.0..=60.0).contains(&scaled) {
        return Err(CommandError::InvalidArgs);
    }
    Ok(write_rc(hk_type, offset, vec![scaled as u8]))
}

fn parse_set_holiday<'a, I: Iterator<Item = &'a str>>(
    tokens: &mut I,
    msg_type: u8,
    offset: u8,
) -> ParseResult {
    let begin = parse_holiday_entry(tokens.next())?;
    let end = parse_holiday_entry(tokens.next())?;
    if begin > end {
        return Err(CommandError::InvalidArgs);
    }
    let mut payload = Vec::with_capacity(2 * HOLIDAY_ENTRY_SIZE);
    payload.extend_from_slice(&begin.encode());
    payload.extend_from_slice(&end.encode());
    Ok(write_rc(msg_type, offset, payload))
}

fn parse_schedule_write<'a, I: Iterator<Item = &'a str>>(
    tokens: &mut I,
    msg_type: u8,
) -> ParseResult {
    let index: usize = tokens
        .next()
        .ok_or(CommandError::InvalidArgs)?
        .parse()
        .map_err(|_| CommandError::InvalidArgs)?;
    if !(1..=MAX_SCHEDULE_ENTRIES).contains(&index) {
        return Err(CommandError::InvalidArgs);
    }
    let entry = parse_schedule_entry(tokens)?;
    let offset = ((index - 1) * SCHEDULE_ENTRY_SIZE) as u8;
    Ok(write_rc(msg_type, offset, entry.encode().to_vec()))
}

/// `unset`, or `DAY HH:MM ON|OFF` with minutes on a ten-minute grid
fn parse_schedule_entry<'a, I: Iterator<Item = &'a str>>(
    tokens: &mut I,
) -> Result<ScheduleEntry, CommandError> {
    let day = tokens.next().ok_or(CommandError::InvalidArgs)?;
    if day == "unset" {
        return Ok(ScheduleEntry::UNSET);
    }

    let time = tokens.next().ok_or(CommandError::InvalidArgs)?;
    let on = match tokens.next().ok_or(CommandError::InvalidArgs)? {
        "ON" => 1,
        "OFF" => 0,
        _ => return Err(CommandError::InvalidArgs),
    };

    let day = DAY_NAMES
        .iter()
        .position(|&name| name == day)
        .map(|index| 2 * index as u8)
        .ok_or(CommandError::InvalidArgs)?;

    let (hours, minutes) = time.split_once(':').ok_or(CommandError::InvalidArgs)?;
    let hours: u32 = hours.parse().map_err(|_| CommandError::InvalidArgs)?;
    let minutes: u32 = minutes.parse().map_err(|_| CommandError::InvalidArgs)?;
    if hours > 23 || minutes >= 60 || minutes % 10 != 0 {
        return Err(CommandError::InvalidArgs);
    }

    Ok(ScheduleEntry {
        on,
        day,
        time: ((hours * 60 + minutes) / 10) as u8,
    })
}

/// `YYYY-MM-DD` with year 2000..=2100
fn parse_holiday_entry(token: Option<&str>) -> Result<HolidayEntry, CommandError> {
    let token = token.ok_or(CommandError::InvalidArgs)?;
    let mut parts = token.splitn(3, '-');
    let year: u32 = parts
        .next()
        .ok_or(CommandError::InvalidArgs)?
        .parse()
        .map_err(|_| CommandError::InvalidArgs)?;
    let month: u32 = parts
        .next()
        .ok_or(CommandError::InvalidArgs)?
        .parse()
        .map_err(|_| CommandError::InvalidArgs)?;
    let day: u32 = parts
        .next()
        .ok_or(CommandError::InvalidArgs)?
        .parse()
        .map_err(|_| CommandError::InvalidArgs)?;
    if !(2000..=2100).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(CommandError::InvalidArgs);
    }
    Ok(HolidayEntry {
        year: (year - 2000) as u8,
        month: month as u8,
        day: day as u8,
    })
}

fn int_arg(token: Option<&str>, max: u32) -> Result<u8, CommandError> {
    let value: u32 = token
        .ok_or(CommandError::InvalidArgs)?
        .parse()
        .map_err(|_| CommandError::InvalidArgs)?;
    if value > max {
        return Err(CommandError::InvalidArgs);
    }
    Ok(value as u8)
}

fn on_off_auto(token: Option<&str>) -> Result<u8, CommandError> {
    match token.ok_or(CommandError::InvalidArgs)? {
        "on" => Ok(0x01),
        "off" => Ok(0x00),
        "auto" => Ok(0x02),
        _ => Err(CommandError::InvalidArgs),
    }
}

fn custom_or_hk(token: Option<&str>) -> Result<u8, CommandError> {
    match token.ok_or(CommandError::InvalidArgs)? {
        "custom" => Ok(0xff),
        "hk" => Ok(0x00),
        _ => Err(CommandError::InvalidArgs),
    }
}

fn write_rc(msg_type: u8, offset: u8, payload: Vec<u8>) -> CommandAction {
    CommandAction::Write {
        destination: ADDR_RC,
        msg_type,
        offset,
        payload,
    }
}

fn write_uba(msg_type: u8, offset: u8, payload: Vec<u8>) -> CommandAction {
    CommandAction::Write {
        destination: ADDR_UBA,
        msg_type,
        offset,
        payload,
    }
}

fn read_rc(msg_type: u8, offset: u8, length: usize) -> CommandAction {
    CommandAction::Read {
        destination: ADDR_RC,
        msg_type,
        offset,
        length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_write(line: &str) -> (u8, u8, u8, Vec<u8>) {
        match parse(line) {
            Ok(CommandAction::Write {
                destination,
                msg_type,
                offset,
                payload,
            }) => (destination, msg_type, offset, payload),
            other => panic!("expected write for {:?}, got {:?}", line, other),
        }
    }

    fn expect_read(line: &str) -> (u8, u8, u8, usize) {
        match parse(line) {
            Ok(CommandAction::Read {
                destination,
                msg_type,
                offset,
                length,
            }) => (destination, msg_type, offset, length),
            other => panic!("expected read for {:?}, got {:?}", line, other),
        }
    }

    #[test]
    fn hk_mode_maps_onto_operation_bytes() {
        assert_eq!(expect_write("hk1 mode day"), (ADDR_RC, 61, 7, vec![0x01]));
        assert_eq!(expect_write("hk2 mode night"), (ADDR_RC, 71, 7, vec![0x00]));
        assert_eq!(expect_write("hk4 mode auto"), (ADDR_RC, 91, 7, vec![0x02]));
        assert_eq!(parse("hk1 mode lukewarm"), Err(CommandError::InvalidArgs));
    }

    #[test]
    fn temperature_boundaries() {
        assert_eq!(
            expect_write("hk1 daytemperature 10.0"),
            (ADDR_RC, 61, 2, vec![20])
        );
        assert_eq!(
            expect_write("hk1 daytemperature 30.0"),
            (ADDR_RC, 61, 2, vec![60])
        );
        assert_eq!(
            expect_write("hk1 daytemperature 21.5"),
            (ADDR_RC, 61, 2, vec![43])
        );
        assert_eq!(
            parse("hk1 daytemperature 9.5"),
            Err(CommandError::InvalidArgs)
        );
        assert_eq!(
            parse("hk1 daytemperature 30.5"),
            Err(CommandError::InvalidArgs)
        );
        assert_eq!(
            parse("hk1 daytemperature warm"),
            Err(CommandError::InvalidArgs)
        );
    }

    #[test]
    fn night_and_holiday_temperature_offsets() {
        assert_eq!(
            expect_write("hk3 nighttemperature 16.0"),
            (ADDR_RC, 81, 1, vec![32])
        );
        assert_eq!(
            expect_write("hk3 holidaytemperature 15.0"),
            (ADDR_RC, 81, 3, vec![30])
        );
    }

    #[test]
    fn schedule_write_boundaries() {
        assert_eq!(
            expect_write("hk1 schedule 1 MO 00:00 ON"),
            (ADDR_RC, 63, 0, vec![1, 0, 0])
        );
        assert_eq!(
            expect_write("hk1 schedule 42 SU 23:50 OFF"),
            (ADDR_RC, 63, 123, vec![0, 12, 143])
        );
        assert_eq!(
            parse("hk1 schedule 0 MO 00:00 ON"),
            Err(CommandError::InvalidArgs)
        );
        assert_eq!(
            parse("hk1 schedule 43 MO 00:00 ON"),
            Err(CommandError::InvalidArgs)
        );
        assert_eq!(
            parse("hk1 schedule 1 MO 00:05 ON"),
            Err(CommandError::InvalidArgs)
        );
        assert_eq!(
            parse("hk1 schedule 1 XX 00:00 ON"),
            Err(CommandError::InvalidArgs)
        );
    }

    #[test]
    fn schedule_unset_writes_the_sentinel() {
        assert_eq!(
            expect_write("hk2 schedule 5 unset"),
            (ADDR_RC, 73, 12, vec![7, 0x0e, 0x90])
        );
    }

    #[test]
    fn schedule_parse_then_render_is_identity() {
        let mut tokens = "WE 06:30 ON".split_whitespace();
        let entry = parse_schedule_entry(&mut tokens).unwrap();
        assert_eq!(entry.render().unwrap(), "WE 06:30 ON");
    }

    #[test]
    fn holiday_mode_orders_dates() {
        assert_eq!(
            expect_write("hk1 holidaymode 2025-05-01 2025-05-02"),
            (ADDR_RC, 63, 93, vec![25, 5, 1, 25, 5, 2])
        );
        assert_eq!(
            parse("hk1 holidaymode 2025-05-02 2025-05-01"),
            Err(CommandError::InvalidArgs)
        );
        assert_eq!(
            expect_write("hk1 vacationmode 2025-05-01 2025-05-01"),
            (ADDR_RC, 63, 87, vec![25, 5, 1, 25, 5, 1])
        );
        assert_eq!(
            parse("hk1 holidaymode 1999-05-01 2025-05-01"),
            Err(CommandError::InvalidArgs)
        );
        assert_eq!(
            parse("hk1 holidaymode 2025-13-01 2025-13-02"),
            Err(CommandError::InvalidArgs)
        );
    }

    #[test]
    fn holiday_parse_then_render_is_identity() {
        let entry = parse_holiday_entry(Some("2077-01-31")).unwrap();
        assert_eq!(entry.render("BEGIN"), "BEGIN 31-01-2077");
    }

    #[test]
    fn hk_reads() {
        assert_eq!(expect_read("hk1 getschedule"), (ADDR_RC, 63, 0, 126));
        assert_eq!(expect_read("hk2 getvacation"), (ADDR_RC, 73, 87, 6));
        assert_eq!(expect_read("hk4 getholiday"), (ADDR_RC, 93, 93, 6));
    }

    #[test]
    fn ww_commands() {
        assert_eq!(
            expect_write("ww mode auto"),
            (ADDR_RC, MSG_WW_OPERATION, 2, vec![0x02])
        );
        assert_eq!(
            expect_write("ww temperature 60"),
            (ADDR_UBA, MSG_WW_PARAMETERS, 2, vec![60])
        );
        assert_eq!(parse("ww temperature 29"), Err(CommandError::InvalidArgs));
        assert_eq!(parse("ww temperature 81"), Err(CommandError::InvalidArgs));
        assert_eq!(
            expect_write("ww limittemperature 75"),
            (ADDR_RC, MSG_WW_OPERATION, 8, vec![75])
        );
        assert_eq!(
            expect_write("ww loadonce"),
            (ADDR_UBA, MSG_WW_LOAD, 0, vec![35])
        );
        assert_eq!(
            expect_write("ww cancelload"),
            (ADDR_UBA, MSG_WW_LOAD, 0, vec![3])
        );
        assert_eq!(
            expect_write("ww showloadindicator on"),
            (ADDR_RC, MSG_WW_OPERATION, 9, vec![0xff])
        );
        assert_eq!(
            expect_write("ww selectschedule custom"),
            (ADDR_RC, MSG_WW_OPERATION, 0, vec![0xff])
        );
        assert_eq!(
            expect_write("ww schedule 1 MO 06:30 ON"),
            (ADDR_RC, MSG_WW_SCHEDULE, 0, vec![1, 0, 39])
        );
        assert_eq!(
            expect_read("ww getschedule"),
            (ADDR_RC, MSG_WW_SCHEDULE, 0, 126)
        );
    }

    #[test]
    fn thermdesinfect_commands() {
        assert_eq!(
            expect_write("ww thermdesinfect mode on"),
            (ADDR_RC, MSG_WW_OPERATION, 4, vec![0xff])
        );
        assert_eq!(
            expect_write("ww thermdesinfect day everyday"),
            (ADDR_RC, MSG_WW_OPERATION, 5, vec![0x07])
        );
        assert_eq!(
            expect_write("ww thermdesinfect day wednesday"),
            (ADDR_RC, MSG_WW_OPERATION, 5, vec![0x02])
        );
        assert_eq!(
            expect_write("ww thermdesinfect hour 3"),
            (ADDR_RC, MSG_WW_OPERATION, 6, vec![3])
        );
        assert_eq!(
            parse("ww thermdesinfect hour 24"),
            Err(CommandError::InvalidArgs)
        );
        assert_eq!(
            expect_write("ww thermdesinfect temperature 70"),
            (ADDR_UBA, MSG_WW_PARAMETERS, 8, vec![70])
        );
        assert_eq!(
            parse("ww thermdesinfect temperature 59"),
            Err(CommandError::InvalidArgs)
        );
    }

    #[test]
    fn zirkpump_commands() {
        assert_eq!(
            expect_write("ww zirkpump mode off"),
            (ADDR_RC, MSG_WW_OPERATION, 3, vec![0x00])
        );
        assert_eq!(
            expect_write("ww zirkpump count 3"),
            (ADDR_UBA, MSG_WW_PARAMETERS, 7, vec![3])
        );
        assert_eq!(
            expect_write("ww zirkpump count alwayson"),
            (ADDR_UBA, MSG_WW_PARAMETERS, 7, vec![0x07])
        );
        assert_eq!(
            parse("ww zirkpump count 7"),
            Err(CommandError::InvalidArgs)
        );
        assert_eq!(
            expect_read("ww zirkpump getschedule"),
            (ADDR_RC, MSG_ZIRKPUMP_SCHEDULE, 0, 126)
        );
        assert_eq!(
            expect_write("ww zirkpump selectschedule hk"),
            (ADDR_RC, MSG_WW_OPERATION, 1, vec![0x00])
        );
    }

    #[test]
    fn rc_commands() {
        assert_eq!(
            expect_read("rc geterrors"),
            (ADDR_RC, MSG_RC_ERRORS, 0, 48)
        );
        assert_eq!(
            expect_read("rc getcontactinfo"),
            (ADDR_RC, MSG_CONTACT_INFO, 0, 42)
        );
    }

    #[test]
    fn setcontactinfo_pads_to_line_width() {
        let (destination, msg_type, offset, payload) =
            expect_write("rc setcontactinfo 1 Hello world");
        assert_eq!(
            (destination, msg_type, offset),
            (ADDR_RC, MSG_CONTACT_INFO, 1)
        );
        assert_eq!(payload.len(), CONTACT_INFO_WIDTH);
        assert_eq!(&payload[..11], b"Hello world");
        assert!(payload[11..].iter().all(|&b| b == b' '));

        let (_, _, _, long) =
            expect_write("rc setcontactinfo 2 0123456789012345678901234567");
        assert_eq!(long.len(), CONTACT_INFO_WIDTH);
        assert_eq!(parse("rc setcontactinfo 3 nope"), Err(CommandError::InvalidArgs));
        assert_eq!(parse("rc setcontactinfo 0 nope"), Err(CommandError::InvalidArgs));
    }

    #[test]
    fn uba_commands() {
        assert_eq!(
            expect_read("uba geterrors"),
            (ADDR_UBA, MSG_UBA_ERRORS, 0, 96)
        );
        assert_eq!(
            expect_write("uba antipendel 15"),
            (ADDR_UBA, MSG_UBA_PARAMETERS, 6, vec![15])
        );
        assert_eq!(parse("uba antipendel 121"), Err(CommandError::InvalidArgs));
        assert_eq!(
            expect_write("uba hyst on 5"),
            (ADDR_UBA, MSG_UBA_PARAMETERS, 5, vec![5])
        );
        assert_eq!(
            expect_write("uba hyst off 10"),
            (ADDR_UBA, MSG_UBA_PARAMETERS, 4, vec![10])
        );
        assert_eq!(parse("uba hyst up 5"), Err(CommandError::InvalidArgs));
        assert_eq!(
            expect_write("uba pumpdelay 10"),
            (ADDR_UBA, MSG_UBA_PARAMETERS, 8, vec![10])
        );
    }

    #[test]
    fn pumpmodulation_orders_min_max() {
        assert_eq!(
            expect_write("uba pumpmodulation 40 50"),
            (ADDR_UBA, MSG_UBA_PARAMETERS, 9, vec![50, 40])
        );
        assert_eq!(
            parse("uba pumpmodulation 50 40"),
            Err(CommandError::InvalidArgs)
        );
        assert_eq!(
            parse("uba pumpmodulation 40 101"),
            Err(CommandError::InvalidArgs)
        );
    }

    #[test]
    fn getversion_probes_the_boiler_first() {
        assert_eq!(
            expect_read("getversion"),
            (ADDR_UBA, MSG_VERSION, 0, 3)
        );
    }

    #[test]
    fn unknown_commands() {
        assert_eq!(parse("hk5 mode day"), Err(CommandError::UnknownCommand));
        assert_eq!(parse("hk1 defrost"), Err(CommandError::UnknownCommand));
        assert_eq!(parse("ww zirkpump spin"), Err(CommandError::UnknownCommand));
        assert_eq!(parse("frobnicate"), Err(CommandError::UnknownCommand));
    }

    #[test]
    fn help_is_informational() {
        assert!(matches!(parse("help"), Ok(CommandAction::Info(_))));
        assert!(matches!(parse("hk1 help"), Ok(CommandAction::Info(_))));
        assert!(matches!(parse("ww help"), Ok(CommandAction::Info(_))));
        assert!(matches!(parse("rc help"), Ok(CommandAction::Info(_))));
        assert!(matches!(parse("uba help"), Ok(CommandAction::Info(_))));
    }
}
