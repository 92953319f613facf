//! Line-oriented parser for take-off record files.
//!
//! Each line holds `date, time, code, airline, destination, take-off`.
//! Lines that do not have that shape are dropped rather than failing the
//! whole file.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

/// One raw take-off observation, all fields kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TakeOffRecord {
    pub date: String,
    pub time: String,
    pub code: String,
    pub airline: String,
    pub destination: String,
    #[serde(rename = "take-off")]
    pub take_off: String,
}

/// Reads every well-formed record from the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<TakeOffRecord>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open records file `{}`", path.display()))?;

    let records = parse_records(file)
        .with_context(|| format!("failed to read records file `{}`", path.display()))?;

    info!(records = records.len(), "Records loaded");
    Ok(records)
}

/// Parses records from any reader, one per line, skipping malformed lines.
///
/// # Errors
///
/// Returns an error only when the underlying reader fails.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<TakeOffRecord>> {
    let reader = BufReader::new(reader);

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                debug!(line = idx + 1, error = %e, "Skipping unreadable line");
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        match parse_line(&line) {
            Some(record) => records.push(record),
            None => {
                debug!(line = idx + 1, "Skipping malformed line");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        debug!(skipped, "Malformed lines dropped");
    }

    Ok(records)
}

/// Parses a single record line.
///
/// The destination is free text and runs up to the first comma that is
/// followed by a clock time; that time is the take-off. Anything after the
/// take-off time is ignored.
pub fn parse_line(line: &str) -> Option<TakeOffRecord> {
    let (date, rest) = take_run(line, is_date_char)?;
    let (time, rest) = take_run(separator(rest)?, is_clock_char)?;
    let (code, rest) = take_run(separator(rest)?, is_code_char)?;
    let (airline, rest) = take_run(separator(rest)?, |c| is_word_char(c) || c == ' ')?;
    let (destination, take_off) = split_destination(separator(rest)?)?;

    Some(TakeOffRecord {
        date: date.to_string(),
        time: time.to_string(),
        code: code.to_string(),
        airline: airline.to_string(),
        destination: destination.to_string(),
        take_off: take_off.to_string(),
    })
}

/// Splits off the non-empty leading run of characters matching `pred`.
fn take_run(s: &str, pred: impl Fn(char) -> bool) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !pred(c)).unwrap_or(s.len());
    (end > 0).then(|| s.split_at(end))
}

/// A comma followed by optional whitespace.
fn separator(s: &str) -> Option<&str> {
    s.strip_prefix(',').map(str::trim_start)
}

/// Destination text and take-off time from the tail of a line.
///
/// The destination starts with a word character and is at least two
/// characters long.
fn split_destination(s: &str) -> Option<(&str, &str)> {
    let first = s.chars().next()?;
    if !is_word_char(first) {
        return None;
    }

    s.char_indices()
        .skip(2)
        .take_while(|(_, c)| *c != '\n')
        .filter(|(_, c)| *c == ',')
        .find_map(|(idx, _)| {
            let (take_off, _) = take_run(separator(&s[idx..])?, is_clock_char)?;
            Some((&s[..idx], take_off))
        })
}

fn is_date_char(c: char) -> bool {
    c.is_ascii_digit() || c == '-'
}

fn is_clock_char(c: char) -> bool {
    c.is_ascii_digit() || c == ':'
}

fn is_code_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
