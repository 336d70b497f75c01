//! Ordering of nested tables read back from the device

use std::cmp::Ordering;
use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// How nested tables are ordered after a read (`dynamic_sort_subtable`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortMode {
    /// Keep the device order.
    #[default]
    #[serde(rename = "false")]
    Off,
    /// Sort by the key rendered as a string.
    #[serde(rename = "true")]
    Lexical,
    /// Sort by the key, comparing digit runs by numeric value.
    #[serde(rename = "natural")]
    Natural,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sort mode '{0}', expected one of false, true, natural")]
pub struct UnknownSortMode(pub String);

impl FromStr for SortMode {
    type Err = UnknownSortMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "false" => Ok(Self::Off),
            "true" => Ok(Self::Lexical),
            "natural" => Ok(Self::Natural),
            other => Err(UnknownSortMode(other.to_string())),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "false"),
            Self::Lexical => write!(f, "true"),
            Self::Natural => write!(f, "natural"),
        }
    }
}

fn sort_key(row: &Map<String, Value>, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

/// Compare strings so that `port2` sorts before `port10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let l = take_digits(&mut left);
                let r = take_digits(&mut right);
                let l = l.trim_start_matches('0');
                let r = r.trim_start_matches('0');
                let ord = l.len().cmp(&r.len()).then_with(|| l.cmp(r));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                left.next();
                right.next();
            }
        }
    }
}

/// Sort flattened rows by `key`. The sort is stable, so rows sharing a key
/// keep their device order.
pub fn dynamic_sort_subtable(rows: &mut [Map<String, Value>], key: &str, mode: SortMode) {
    match mode {
        SortMode::Off => {}
        SortMode::Lexical => rows.sort_by_key(|row| sort_key(row, key)),
        SortMode::Natural => {
            rows.sort_by(|a, b| natural_cmp(&sort_key(a, key), &sort_key(b, key)));
        }
    }
}
