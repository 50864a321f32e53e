//! Date formats derived from `SimpleDateFormat`-style patterns.

use chrono::format::{
    Item,
    StrftimeItems,
};
use chrono::{
    DateTime,
    TimeZone,
};
use thiserror::Error;

/// Pattern used when no translation defines a date format.
pub const DEFAULT_DATE_PATTERN: &str = "MM/dd/yyyy hh:mm a";

/// Errors produced when parsing a date pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateFormatError {
    /// Error when a pattern letter has no equivalent
    #[error("Unsupported pattern letter '{0}'")]
    UnknownField(char),
    /// Error when a quoted literal is not closed
    #[error("Unterminated quote in date pattern")]
    UnterminatedQuote,
}

/// A parsed date pattern such as `dd.MM.yyyy HH:mm`.
///
/// Letters follow `SimpleDateFormat`: `y Y M L d D E u H k h m s S a w z Z X`,
/// text in single quotes is literal and `''` is a single quote. `w` is the ISO
/// week number and `k` renders midnight as `0`. The letters `G K W F` have no
/// chrono counterpart and are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    /// Pattern as written in the translation
    pattern: String,
    /// Equivalent chrono format string
    strftime: String,
}

impl DateFormat {
    /// # Errors
    /// Returns an error for unknown pattern letters or unterminated quotes.
    pub fn parse(pattern: &str) -> Result<Self, DateFormatError> {
        let strftime = to_strftime(pattern)?;
        if StrftimeItems::new(&strftime).any(|item| matches!(item, Item::Error)) {
            return Err(DateFormatError::UnknownField('%'));
        }
        Ok(Self { pattern: pattern.to_string(), strftime })
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    /// Formats `date_time` with this pattern.
    #[must_use]
    pub fn format<Tz>(&self, date_time: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        date_time.format(&self.strftime).to_string()
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self { pattern: DEFAULT_DATE_PATTERN.to_string(), strftime: "%m/%d/%Y %I:%M %p".to_string() }
    }
}

/// Translates a pattern into a chrono format string.
fn to_strftime(pattern: &str) -> Result<String, DateFormatError> {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                if chars.next_if_eq(&'\'').is_some() {
                    out.push('\'');
                    continue;
                }
                loop {
                    match chars.next() {
                        None => return Err(DateFormatError::UnterminatedQuote),
                        Some('\'') if chars.next_if_eq(&'\'').is_some() => out.push('\''),
                        Some('\'') => break,
                        Some(literal) => push_literal(&mut out, literal),
                    }
                }
            }
            'a'..='z' | 'A'..='Z' => {
                let mut count = 1;
                while chars.next_if_eq(&c).is_some() {
                    count += 1;
                }
                out.push_str(field(c, count).ok_or(DateFormatError::UnknownField(c))?);
            }
            literal => push_literal(&mut out, literal),
        }
    }

    Ok(out)
}

/// Appends a literal character, escaping `%`.
fn push_literal(out: &mut String, literal: char) {
    if literal == '%' {
        out.push_str("%%");
    } else {
        out.push(literal);
    }
}

/// chrono specifier for `count` repetitions of a pattern letter.
const fn field(letter: char, count: usize) -> Option<&'static str> {
    let specifier = match (letter, count) {
        ('y', 2) => "%y",
        ('y', _) => "%Y",
        ('Y', 2) => "%g",
        ('Y', _) => "%G",
        ('M' | 'L', 1) => "%-m",
        ('M' | 'L', 2) => "%m",
        ('M' | 'L', 3) => "%b",
        ('M' | 'L', _) => "%B",
        ('d', 1) => "%-d",
        ('d', _) => "%d",
        ('H' | 'k', 1) => "%-H",
        ('H' | 'k', _) => "%H",
        ('h', 1) => "%-I",
        ('h', _) => "%I",
        ('m', 1) => "%-M",
        ('m', _) => "%M",
        ('s', 1) => "%-S",
        ('s', _) => "%S",
        ('S', _) => "%3f",
        ('a', _) => "%p",
        ('E', 1..=3) => "%a",
        ('E', _) => "%A",
        ('u', _) => "%u",
        ('w', 1) => "%-V",
        ('w', _) => "%V",
        ('D', _) => "%j",
        ('z', _) => "%Z",
        ('Z', _) => "%z",
        ('X', _) => "%:z",
        _ => return None,
    };
    Some(specifier)
}
