//! Script Parser
//!
//! One command per line; blank lines and `#` comments are skipped.

use chrono::{Datelike, NaiveDateTime, Timelike};
use thiserror::Error;
use watch_kernel::input::{Button, PressKind};
use watch_kernel::message::MessageKind;
use watch_platform::RtcTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Advance the clock by this many seconds.
    Tick(u32),
    Press { button: Button, press: PressKind },
    /// Raw `(kind, options, payload)` message, validated before routing.
    Route { kind: u8, options: u8, payload: Vec<u8> },
    Rtc(RtcTime),
    Connect,
    Disconnect,
    State,
    Stats,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`{0}` needs more arguments")]
    MissingArgument(&'static str),
    #[error("invalid {what} `{value}`")]
    Invalid { what: &'static str, value: String },
}

fn invalid(what: &'static str, value: &str) -> ScriptError {
    ScriptError::Invalid {
        what,
        value: value.to_string(),
    }
}

/// Decimal or `0x`-prefixed hexadecimal.
fn number<T: TryFrom<u64>>(what: &'static str, token: &str) -> Result<T, ScriptError> {
    let parsed = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => token.parse::<u64>(),
    };
    parsed
        .ok()
        .and_then(|value| T::try_from(value).ok())
        .ok_or_else(|| invalid(what, token))
}

fn button(token: &str) -> Result<Button, ScriptError> {
    Button::ALL
        .iter()
        .copied()
        .find(|button| format!("{button:?}").eq_ignore_ascii_case(token))
        .ok_or_else(|| invalid("button", token))
}

fn press_kind(token: &str) -> Result<PressKind, ScriptError> {
    match token.to_ascii_lowercase().as_str() {
        "immediate" | "i" => Ok(PressKind::Immediate),
        "pressed" | "p" => Ok(PressKind::Pressed),
        "hold" | "longhold" | "h" => Ok(PressKind::LongHold),
        "deferred" | "d" => Ok(PressKind::Deferred),
        _ => Err(invalid("press kind", token)),
    }
}

fn message_kind(token: &str) -> Result<u8, ScriptError> {
    if token.starts_with(|c: char| c.is_ascii_digit()) {
        return number("message kind", token);
    }
    MessageKind::ALL
        .iter()
        .find(|kind| format!("{kind:?}").eq_ignore_ascii_case(token))
        .map(|kind| u8::from(*kind))
        .ok_or_else(|| invalid("message kind", token))
}

fn hex_bytes(token: &str) -> Result<Vec<u8>, ScriptError> {
    if token.len() % 2 != 0 {
        return Err(invalid("payload", token));
    }
    (0..token.len())
        .step_by(2)
        .map(|i| {
            token
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| invalid("payload", token))
        })
        .collect()
}

fn rtc(date: &str, time: &str) -> Result<RtcTime, ScriptError> {
    let text = format!("{date} {time}");
    let parsed = NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S")
        .map_err(|_| invalid("date and time", &text))?;
    let year = u16::try_from(parsed.year()).map_err(|_| invalid("year", date))?;
    Ok(RtcTime::new(
        year,
        parsed.month() as u8,
        parsed.day() as u8,
        parsed.hour() as u8,
        parsed.minute() as u8,
        parsed.second() as u8,
    )
    .with_day_of_week(parsed.weekday().number_from_monday() as u8))
}

/// Parses one script line; `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<Command>, ScriptError> {
    let line = line.split('#').next().unwrap_or_default().trim();
    let mut tokens = line.split_whitespace();
    let Some(name) = tokens.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = tokens.collect();

    let command = match name.to_ascii_lowercase().as_str() {
        "tick" => Command::Tick(match args.first() {
            Some(count) => number("tick count", count)?,
            None => 1,
        }),
        "press" => {
            let button = button(args.first().ok_or(ScriptError::MissingArgument("press"))?)?;
            let press = match args.get(1) {
                Some(kind) => press_kind(kind)?,
                None => PressKind::Immediate,
            };
            Command::Press { button, press }
        }
        "route" => Command::Route {
            kind: message_kind(args.first().ok_or(ScriptError::MissingArgument("route"))?)?,
            options: match args.get(1) {
                Some(options) => number("options", options)?,
                None => 0,
            },
            payload: match args.get(2) {
                Some(payload) => hex_bytes(payload)?,
                None => Vec::new(),
            },
        },
        "rtc" => match args.as_slice() {
            [date, time, ..] => Command::Rtc(rtc(date, time)?),
            _ => return Err(ScriptError::MissingArgument("rtc")),
        },
        "connect" => Command::Connect,
        "disconnect" => Command::Disconnect,
        "state" => Command::State,
        "stats" => Command::Stats,
        _ => return Err(ScriptError::UnknownCommand(name.to_string())),
    };
    Ok(Some(command))
}
