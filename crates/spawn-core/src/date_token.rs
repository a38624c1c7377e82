//! Date token substitution.
//!
//! A date token is `{{date}}` or `{{date:FORMAT}}` inside a destination
//! name. Formats use the conventional `YYYY-MM-DD` token syntax:
//!
//! ```text
//! {{date}}                  -> 2024-01-05
//! {{date:YYYY}}             -> 2024
//! {{date:dddd, MMMM Do}}    -> Friday, January 5th
//! {{date:[Week] WW}}        -> Week 01
//! ```
//!
//! Text in `[...]` inside a format is copied literally.

use chrono::{Datelike, Month, NaiveDateTime, Timelike};

/// Format used by a bare `{{date}}` token or an empty format.
pub const DEFAULT_DATE_FORMAT: &str = "YYYY-MM-DD";

/// A piece of a tokenized name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text, copied unchanged.
    Text(&'a str),
    /// A date token with its format, `None` for the default format.
    Date(Option<&'a str>),
}

/// Split `input` into literal text and date tokens.
///
/// Anything that is not a complete token, such as `{{datetime}}` or an
/// unterminated `{{date:YYYY`, stays literal text.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut cursor = 0;

    while let Some(offset) = input[cursor..].find("{{") {
        let open = cursor + offset;
        match parse_token(&input[open..]) {
            Some((format, len)) => {
                if open > text_start {
                    segments.push(Segment::Text(&input[text_start..open]));
                }
                segments.push(Segment::Date(format));
                cursor = open + len;
                text_start = cursor;
            }
            // `{` is one byte, so stepping past it stays on a char boundary.
            None => cursor = open + 1,
        }
    }

    if text_start < input.len() {
        segments.push(Segment::Text(&input[text_start..]));
    }
    segments
}

/// Parse a token at the start of `s`, returning its format and byte length.
fn parse_token(s: &str) -> Option<(Option<&str>, usize)> {
    let inner = s.strip_prefix("{{")?.trim_start_matches(' ');
    let after_name = inner.strip_prefix("date")?.trim_start_matches(' ');

    if let Some(rest) = after_name.strip_prefix("}}") {
        return Some((None, s.len() - rest.len()));
    }

    let format_and_rest = after_name.strip_prefix(':')?;
    let close = format_and_rest.find("}}")?;
    let format = &format_and_rest[..close];
    let len = s.len() - format_and_rest.len() + close + 2;
    Some(((!format.is_empty()).then_some(format), len))
}

/// Replace every date token in `input` with `now` rendered in its format.
///
/// All tokens share the same `now`, so one name never mixes two moments.
#[must_use]
pub fn substitute(input: &str, now: &NaiveDateTime) -> String {
    let mut output = String::with_capacity(input.len());
    for segment in tokenize(input) {
        match segment {
            Segment::Text(text) => output.push_str(text),
            Segment::Date(format) => {
                output.push_str(&format_date(format.unwrap_or(DEFAULT_DATE_FORMAT), now));
            }
        }
    }
    output
}

// Longest tokens first so `YYYY` wins over `YY` and `MMMM` over `MM`.
const FORMAT_TOKENS: &[&str] = &[
    "YYYY", "GGGG", "MMMM", "DDDD", "dddd", "MMM", "DDD", "ddd", "SSS", "YY", "MM", "DD", "Do",
    "dd", "WW", "HH", "hh", "kk", "mm", "ss", "Q", "M", "D", "d", "W", "H", "h", "k", "m", "s",
    "A", "a", "X", "x",
];

/// Render `now` using a `YYYY-MM-DD` style format string.
#[must_use]
pub fn format_date(format: &str, now: &NaiveDateTime) -> String {
    let mut output = String::with_capacity(format.len() + 8);
    let mut rest = format;

    while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(close) = rest.find(']') {
                output.push_str(&rest[1..close]);
                rest = &rest[close + 1..];
                continue;
            }
        }

        match FORMAT_TOKENS.iter().find(|token| rest.starts_with(**token)) {
            Some(token) => {
                output.push_str(&render_token(token, now));
                rest = &rest[token.len()..];
            }
            None => {
                output.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    output
}

fn render_token(token: &str, now: &NaiveDateTime) -> String {
    match token {
        "YYYY" => format!("{:04}", now.year()),
        "YY" => format!("{:02}", now.year().rem_euclid(100)),
        "GGGG" => format!("{:04}", now.iso_week().year()),
        "Q" => ((now.month0() / 3) + 1).to_string(),
        "MMMM" => month_name(now.month()).to_string(),
        "MMM" => month_name(now.month()).chars().take(3).collect(),
        "MM" => format!("{:02}", now.month()),
        "M" => now.month().to_string(),
        "DDDD" => format!("{:03}", now.ordinal()),
        "DDD" => now.ordinal().to_string(),
        "DD" => format!("{:02}", now.day()),
        "Do" => format!("{}{}", now.day(), ordinal_suffix(now.day())),
        "D" => now.day().to_string(),
        "dddd" => now.format("%A").to_string(),
        "ddd" => now.format("%a").to_string(),
        "dd" => now.format("%a").to_string().chars().take(2).collect(),
        "d" => now.weekday().num_days_from_sunday().to_string(),
        "WW" => format!("{:02}", now.iso_week().week()),
        "W" => now.iso_week().week().to_string(),
        "HH" => format!("{:02}", now.hour()),
        "H" => now.hour().to_string(),
        "hh" => format!("{:02}", now.hour12().1),
        "h" => now.hour12().1.to_string(),
        "kk" => format!("{:02}", hour_1_to_24(now.hour())),
        "k" => hour_1_to_24(now.hour()).to_string(),
        "mm" => format!("{:02}", now.minute()),
        "m" => now.minute().to_string(),
        "ss" => format!("{:02}", now.second()),
        "s" => now.second().to_string(),
        "SSS" => format!("{:03}", now.nanosecond() / 1_000_000 % 1000),
        "A" => String::from(if now.hour12().0 { "PM" } else { "AM" }),
        "a" => String::from(if now.hour12().0 { "pm" } else { "am" }),
        // Wall time is read as UTC; there is no zone to convert from.
        "X" => now.and_utc().timestamp().to_string(),
        "x" => now.and_utc().timestamp_millis().to_string(),
        _ => token.to_string(),
    }
}

fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map_or("", |m| m.name())
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn hour_1_to_24(hour: u32) -> u32 {
    if hour == 0 {
        24
    } else {
        hour
    }
}
